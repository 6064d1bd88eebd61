//! ImageService - fetch a remote image and return it as base64
//!
//! TigerStyle: Outbound requests only go to public http(s) hosts.
//!
//! Every fetch:
//! 1. Parses the URL and checks the scheme against an allow-list
//! 2. Resolves the host once and rejects any non-public address
//! 3. Pins the connection to the vetted address (no second DNS lookup)
//! 4. Refuses redirects, enforces timeouts and a body size cap

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use url::{Host, Url};

// =============================================================================
// TigerStyle Constants
// =============================================================================

/// Schemes an image URL may use
pub const ALLOWED_SCHEMES: &[&str] = &["http", "https"];

/// TCP connect timeout
pub const CONNECT_TIMEOUT_SECS: u64 = 3;

/// Whole-request timeout
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Maximum image size in bytes
pub const IMAGE_BYTES_MAX: usize = 5 * 1024 * 1024;

/// Maximum URL length in bytes
pub const URL_BYTES_MAX: usize = 2048;

// =============================================================================
// Types
// =============================================================================

/// Limits applied to outbound fetches
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    /// Permit loopback/private targets (local development and tests only)
    pub allow_private_hosts: bool,
    /// TCP connect timeout
    pub connect_timeout: Duration,
    /// Whole-request timeout
    pub timeout: Duration,
    /// Body size cap
    pub body_bytes_max: usize,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            allow_private_hosts: false,
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            body_bytes_max: IMAGE_BYTES_MAX,
        }
    }
}

/// Image fetch errors
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("missing url")]
    Missing,

    #[error("url too long: {len} > {max}")]
    UrlTooLong { len: usize, max: usize },

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("scheme not allowed: {0}")]
    SchemeNotAllowed(String),

    #[error("url has no host")]
    MissingHost,

    #[error("address not allowed: {0}")]
    ForbiddenAddress(IpAddr),

    #[error("could not resolve {0}")]
    Resolve(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("upstream returned status {0}")]
    Status(u16),

    #[error("image too large: more than {max} bytes")]
    TooLarge { max: usize },
}

// =============================================================================
// Address Classification
// =============================================================================

/// True when an address is routable on the public internet
pub fn is_public_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_public_ipv4(v4),
        IpAddr::V6(v6) => is_public_ipv6(v6),
    }
}

fn is_public_ipv4(ip: Ipv4Addr) -> bool {
    let [a, b, c, _] = ip.octets();
    !(ip.is_unspecified()
        || ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_broadcast()
        || ip.is_documentation()
        || ip.is_multicast()
        // 0.0.0.0/8 "this network"
        || a == 0
        // 100.64.0.0/10 carrier-grade NAT
        || (a == 100 && (b & 0xc0) == 64)
        // 192.0.0.0/24 protocol assignments
        || (a == 192 && b == 0 && c == 0)
        // 198.18.0.0/15 benchmarking
        || (a == 198 && (b & 0xfe) == 18)
        // 240.0.0.0/4 reserved
        || a >= 240)
}

fn is_public_ipv6(ip: Ipv6Addr) -> bool {
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_public_ipv4(v4);
    }
    let segments = ip.segments();
    // 64:ff9b::/96 NAT64 embeds an IPv4 address
    if segments[..6] == [0x64, 0xff9b, 0, 0, 0, 0] {
        let [.., hi, lo] = segments;
        let embedded = (u32::from(hi) << 16) | u32::from(lo);
        return is_public_ipv4(Ipv4Addr::from(embedded));
    }
    !(ip.is_unspecified()
        || ip.is_loopback()
        || ip.is_multicast()
        // fc00::/7 unique local
        || (segments[0] & 0xfe00) == 0xfc00
        // fe80::/10 link local
        || (segments[0] & 0xffc0) == 0xfe80
        // 2001:db8::/32 documentation
        || (segments[0] == 0x2001 && segments[1] == 0x0db8)
        // ::/96 IPv4-compatible (deprecated)
        || segments[..6] == [0, 0, 0, 0, 0, 0])
}

// =============================================================================
// ImageService
// =============================================================================

/// Fetches remote images on behalf of the profile page
#[derive(Debug, Clone, Default)]
pub struct ImageService {
    policy: FetchPolicy,
}

impl ImageService {
    /// Create a service with the given policy
    pub fn new(policy: FetchPolicy) -> Self {
        Self { policy }
    }

    /// Parse and check a user-supplied URL
    pub fn validate_url(raw: &str) -> Result<Url, ImageError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ImageError::Missing);
        }
        if raw.len() > URL_BYTES_MAX {
            return Err(ImageError::UrlTooLong {
                len: raw.len(),
                max: URL_BYTES_MAX,
            });
        }

        let url = Url::parse(raw)?;
        if !ALLOWED_SCHEMES.contains(&url.scheme()) {
            return Err(ImageError::SchemeNotAllowed(url.scheme().to_string()));
        }
        if url.host().is_none() {
            return Err(ImageError::MissingHost);
        }
        Ok(url)
    }

    /// Fetch an image and return its bytes base64-encoded
    pub async fn fetch_image_data(&self, raw_url: &str) -> Result<String, ImageError> {
        let url = Self::validate_url(raw_url)?;
        let addr = self.resolve(&url).await?;

        let mut builder = reqwest::Client::builder()
            .no_proxy()
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(self.policy.connect_timeout)
            .timeout(self.policy.timeout);
        if let Some(Host::Domain(domain)) = url.host() {
            builder = builder.resolve(domain, addr);
        }
        let client = builder.build()?;

        let mut response = client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ImageError::Status(status.as_u16()));
        }

        let max = self.policy.body_bytes_max;
        if response
            .content_length()
            .is_some_and(|len| usize::try_from(len).map_or(true, |len| len > max))
        {
            return Err(ImageError::TooLarge { max });
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > max {
                return Err(ImageError::TooLarge { max });
            }
            body.extend_from_slice(&chunk);
        }

        tracing::debug!(host = ?url.host_str(), bytes = body.len(), "Fetched image");
        Ok(BASE64.encode(body))
    }

    /// Resolve the URL's host to one vetted socket address
    async fn resolve(&self, url: &Url) -> Result<SocketAddr, ImageError> {
        let port = url.port_or_known_default().ok_or(ImageError::MissingHost)?;
        let candidates: Vec<SocketAddr> = match url.host() {
            Some(Host::Ipv4(ip)) => vec![SocketAddr::new(IpAddr::V4(ip), port)],
            Some(Host::Ipv6(ip)) => vec![SocketAddr::new(IpAddr::V6(ip), port)],
            Some(Host::Domain(domain)) => tokio::net::lookup_host((domain, port))
                .await
                .map_err(|_| ImageError::Resolve(domain.to_string()))?
                .collect(),
            None => return Err(ImageError::MissingHost),
        };

        let first = *candidates
            .first()
            .ok_or_else(|| ImageError::Resolve(url.host_str().unwrap_or_default().to_string()))?;

        if !self.policy.allow_private_hosts {
            if let Some(bad) = candidates.iter().find(|a| !is_public_ip(a.ip())) {
                tracing::warn!(
                    url = %url,
                    addr = %bad.ip(),
                    "Blocked image fetch to non-public address"
                );
                return Err(ImageError::ForbiddenAddress(bad.ip()));
            }
        }

        Ok(first)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn permissive() -> ImageService {
        ImageService::new(FetchPolicy {
            allow_private_hosts: true,
            ..FetchPolicy::default()
        })
    }

    #[test]
    fn test_scheme_allow_list() {
        assert!(ImageService::validate_url("https://example.com/a.png").is_ok());
        assert!(ImageService::validate_url("HTTP://example.com/a.png").is_ok());

        for raw in [
            "file:///etc/passwd",
            "gopher://example.com/",
            "ftp://example.com/a.png",
            "jar:http://example.com/a.jar!/",
            "data:image/png;base64,AAAA",
        ] {
            assert!(
                matches!(
                    ImageService::validate_url(raw),
                    Err(ImageError::SchemeNotAllowed(_))
                ),
                "{raw} should be rejected"
            );
        }

        assert!(matches!(
            ImageService::validate_url("   "),
            Err(ImageError::Missing)
        ));
        assert!(matches!(
            ImageService::validate_url("not a url"),
            Err(ImageError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_address_classification() {
        for blocked in [
            "127.0.0.1",
            "10.1.2.3",
            "172.16.0.1",
            "192.168.1.1",
            "169.254.169.254",
            "100.64.0.1",
            "0.0.0.0",
            "255.255.255.255",
            "::1",
            "::",
            "fd00::1",
            "fe80::1",
            "::ffff:127.0.0.1",
            "::ffff:169.254.169.254",
            "64:ff9b::a9fe:a9fe",
        ] {
            let ip: IpAddr = blocked.parse().unwrap();
            assert!(!is_public_ip(ip), "{blocked} should be blocked");
        }

        for allowed in ["93.184.216.34", "8.8.8.8", "2606:4700:4700::1111"] {
            let ip: IpAddr = allowed.parse().unwrap();
            assert!(is_public_ip(ip), "{allowed} should be allowed");
        }
    }

    #[tokio::test]
    async fn test_loopback_is_blocked_by_default() {
        let images = ImageService::default();

        for url in [
            "http://127.0.0.1:8080/admin",
            "http://[::1]/",
            "http://localhost/",
            "http://169.254.169.254/latest/meta-data/",
        ] {
            let err = images.fetch_image_data(url).await.unwrap_err();
            assert!(
                matches!(err, ImageError::ForbiddenAddress(_)),
                "{url} gave {err}"
            );
        }
    }

    #[tokio::test]
    async fn test_fetch_returns_base64() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/avatar.png");
                then.status(200)
                    .header("Content-Type", "image/png")
                    .body(b"\x89PNG\r\n");
            })
            .await;

        let data = permissive()
            .fetch_image_data(&server.url("/avatar.png"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(BASE64.decode(data).unwrap(), b"\x89PNG\r\n");
    }

    #[tokio::test]
    async fn test_redirects_are_not_followed() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/hop");
                then.status(302)
                    .header("Location", "http://169.254.169.254/latest/meta-data/");
            })
            .await;

        let err = permissive()
            .fetch_image_data(&server.url("/hop"))
            .await
            .unwrap_err();
        assert!(matches!(err, ImageError::Status(302)));
    }

    #[tokio::test]
    async fn test_body_cap() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/big.png");
                then.status(200).body(vec![0u8; 4096]);
            })
            .await;

        let images = ImageService::new(FetchPolicy {
            allow_private_hosts: true,
            body_bytes_max: 1024,
            ..FetchPolicy::default()
        });
        let err = images
            .fetch_image_data(&server.url("/big.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, ImageError::TooLarge { max: 1024 }));
    }

    #[tokio::test]
    async fn test_upstream_error_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/missing.png");
                then.status(404);
            })
            .await;

        let err = permissive()
            .fetch_image_data(&server.url("/missing.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, ImageError::Status(404)));
    }

    #[tokio::test]
    async fn test_environment_proxy_is_ignored() {
        // Nothing listens on the discard port; a proxied request would fail
        std::env::set_var("HTTP_PROXY", "http://127.0.0.1:9");
        std::env::set_var("http_proxy", "http://127.0.0.1:9");

        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/direct.png");
                then.status(200).body(b"img");
            })
            .await;

        let data = permissive()
            .fetch_image_data(&server.url("/direct.png"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(BASE64.decode(data).unwrap(), b"img");
    }
}
