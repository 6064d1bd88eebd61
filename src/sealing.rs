//! Purchase Export Sealing
//!
//! TigerStyle: Purchase history leaves the server only as an authenticated
//! ciphertext and comes back only if this server sealed it.
//!
//! Security model:
//! - Exports are encrypted with AES-256-GCM
//! - Each export has a unique nonce
//! - The master key lives in the data directory (`export.key`)
//! - The owner's user id is sealed with the purchases; imports by anyone
//!   else are rejected

use std::path::Path;

use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, Utc};
use finova_store::Gadget;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tokio::fs;

// =============================================================================
// TigerStyle Constants
// =============================================================================

/// Master key file name
pub const SEAL_KEY_FILE_NAME: &str = "export.key";

/// Nonce size in bytes (96 bits for AES-GCM)
pub const NONCE_SIZE_BYTES: usize = 12;

/// Master key size in bytes (256 bits for AES-256)
pub const MASTER_KEY_SIZE_BYTES: usize = 32;

/// Current envelope format
pub const ENVELOPE_VERSION: u32 = 1;

/// Maximum accepted envelope size in bytes
pub const ENVELOPE_BYTES_MAX: usize = 1024 * 1024;

// =============================================================================
// Types
// =============================================================================

/// Decrypted export contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseExport {
    /// User the export belongs to
    pub owner_id: i32,
    /// When the export was sealed
    pub exported_at: DateTime<Utc>,
    /// Purchased gadgets, one entry per unit
    pub purchases: Vec<Gadget>,
}

impl PurchaseExport {
    /// Export of `purchases` owned by `owner_id`, stamped now
    pub fn new(owner_id: i32, purchases: Vec<Gadget>) -> Self {
        Self {
            owner_id,
            exported_at: Utc::now(),
            purchases,
        }
    }
}

/// On-the-wire export file
#[derive(Debug, Serialize, Deserialize)]
struct SealedEnvelope {
    /// Format version
    version: u32,
    /// Nonce used for encryption (base64)
    nonce: String,
    /// Encrypted `PurchaseExport` JSON (base64)
    ciphertext: String,
}

// =============================================================================
// Purchase Sealer
// =============================================================================

/// Seals and opens purchase exports
pub struct PurchaseSealer {
    /// Master encryption key
    master_key: [u8; MASTER_KEY_SIZE_BYTES],
}

impl std::fmt::Debug for PurchaseSealer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PurchaseSealer")
            .field("master_key", &"<redacted>")
            .finish()
    }
}

impl PurchaseSealer {
    /// Load the master key from `data_dir`, generating it on first start
    pub async fn load_or_create(data_dir: &Path) -> Result<Self, SealError> {
        fs::create_dir_all(data_dir).await?;

        let key_path = data_dir.join(SEAL_KEY_FILE_NAME);
        let master_key = if fs::try_exists(&key_path).await? {
            let bytes = fs::read(&key_path).await?;
            if bytes.len() != MASTER_KEY_SIZE_BYTES {
                return Err(SealError::InvalidMasterKey);
            }
            let mut key = [0u8; MASTER_KEY_SIZE_BYTES];
            key.copy_from_slice(&bytes);
            key
        } else {
            let mut key = [0u8; MASTER_KEY_SIZE_BYTES];
            OsRng.fill_bytes(&mut key);
            fs::write(&key_path, &key).await?;
            restrict_permissions(&key_path).await?;
            tracing::info!(path = %key_path.display(), "Generated new export sealing key");
            key
        };

        Ok(Self { master_key })
    }

    /// Sealer with a fresh random key that is never persisted
    pub fn ephemeral() -> Self {
        let mut master_key = [0u8; MASTER_KEY_SIZE_BYTES];
        OsRng.fill_bytes(&mut master_key);
        Self { master_key }
    }

    /// Encrypt an export into a downloadable file
    pub fn seal(&self, export: &PurchaseExport) -> Result<Vec<u8>, SealError> {
        let plaintext = serde_json::to_vec(export)?;

        let mut nonce_bytes = [0u8; NONCE_SIZE_BYTES];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher()?
            .encrypt(nonce, plaintext.as_ref())
            .map_err(|e| SealError::CryptoError(format!("encryption failed: {e}")))?;

        let envelope = SealedEnvelope {
            version: ENVELOPE_VERSION,
            nonce: BASE64.encode(nonce_bytes),
            ciphertext: BASE64.encode(ciphertext),
        };
        Ok(serde_json::to_vec(&envelope)?)
    }

    /// Authenticate and decrypt an uploaded export
    pub fn open(&self, bytes: &[u8]) -> Result<PurchaseExport, SealError> {
        if bytes.is_empty() {
            return Err(SealError::Empty);
        }
        if bytes.len() > ENVELOPE_BYTES_MAX {
            return Err(SealError::TooLarge {
                len: bytes.len(),
                max: ENVELOPE_BYTES_MAX,
            });
        }

        let envelope: SealedEnvelope =
            serde_json::from_slice(bytes).map_err(SealError::InvalidEnvelope)?;
        if envelope.version != ENVELOPE_VERSION {
            return Err(SealError::UnsupportedVersion(envelope.version));
        }

        let nonce_bytes = BASE64
            .decode(&envelope.nonce)
            .map_err(|e| SealError::CryptoError(format!("invalid nonce: {e}")))?;
        if nonce_bytes.len() != NONCE_SIZE_BYTES {
            return Err(SealError::CryptoError("invalid nonce length".to_string()));
        }
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = BASE64
            .decode(&envelope.ciphertext)
            .map_err(|e| SealError::CryptoError(format!("invalid ciphertext: {e}")))?;

        let plaintext = self
            .cipher()?
            .decrypt(nonce, ciphertext.as_ref())
            .map_err(|_| SealError::NotAuthentic)?;

        serde_json::from_slice(&plaintext).map_err(SealError::InvalidEnvelope)
    }

    fn cipher(&self) -> Result<Aes256Gcm, SealError> {
        Aes256Gcm::new_from_slice(&self.master_key)
            .map_err(|_| SealError::CryptoError("failed to create cipher".to_string()))
    }
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path) -> Result<(), SealError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await?;
    Ok(())
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path) -> Result<(), SealError> {
    Ok(())
}

// =============================================================================
// Errors
// =============================================================================

/// Export sealing errors
#[derive(Debug, thiserror::Error)]
pub enum SealError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid master key")]
    InvalidMasterKey,

    #[error("file is empty")]
    Empty,

    #[error("file too large: {len} > {max}")]
    TooLarge { len: usize, max: usize },

    #[error("not a purchase export: {0}")]
    InvalidEnvelope(serde_json::Error),

    #[error("unsupported export version {0}")]
    UnsupportedVersion(u32),

    #[error("export was not issued by this server")]
    NotAuthentic,

    #[error("crypto error: {0}")]
    CryptoError(String),
}

// =============================================================================
// Tests
// =============================================================================
