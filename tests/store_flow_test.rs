//! End-to-end flows through the gadget store router
//!
//! Drives the router in-process against the in-memory backend.

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use finova::sealing::PurchaseSealer;
use finova::services::FetchPolicy;
use finova::web::{store_router, StoreState};
use finova_store::{seed, SimStorageBackend, UserStore, STARTING_BALANCE};
use tower::ServiceExt;

// =============================================================================
// Helpers
// =============================================================================

const BOUNDARY: &str = "finova-test-boundary";

async fn app() -> (Router, SimStorageBackend) {
    let _ = tracing_subscriber::fmt().with_env_filter("debug").try_init();

    let backend = SimStorageBackend::new();
    seed::seed_gadgets(&backend).await.unwrap();

    let state = StoreState::new(
        Arc::new(backend.clone()),
        Arc::new(backend.clone()),
        Arc::new(PurchaseSealer::ephemeral()),
        FetchPolicy::default(),
    );
    (store_router(state), backend)
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_form(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::post(uri).header(CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn post_upload(uri: &str, file: &[u8], cookie: &str) -> Request<Body> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"importFile\"; filename=\"purchases.sealed\"\r\nContent-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(file);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::post(uri)
        .header(CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .header(COOKIE, cookie)
        .body(Body::from(body))
        .unwrap()
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// `finova_sid=...` pair from a `Set-Cookie` header
fn session_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_text(response: Response) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

async fn register(app: &Router, username: &str) -> String {
    let response = send(
        app,
        post_form(
            "/auth/register",
            &format!("username={username}&password=hunter2"),
            None,
        ),
    )
    .await;
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/store");
    session_cookie(&response).expect("register sets a session cookie")
}

async fn balance(backend: &SimStorageBackend, username: &str) -> f64 {
    backend
        .get_user_by_username(username)
        .await
        .unwrap()
        .unwrap()
        .balance
}

// =============================================================================
// Auth
// =============================================================================

#[tokio::test]
async fn test_root_redirects_to_store() {
    let (app, _) = app().await;
    let response = send(&app, get("/", None)).await;
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/store");
}

#[tokio::test]
async fn test_protected_routes_require_login() {
    let (app, _) = app().await;

    for request in [
        get("/profile", None),
        get("/export", None),
        get("/image?url=https://example.com/a.png", None),
        post_form("/store", "id=1&qty=1", None),
        post_form("/profile", "username=x", None),
        get("/profile", Some("finova_sid=forged")),
    ] {
        let response = send(&app, request).await;
        assert!(response.status().is_redirection());
        assert_eq!(location(&response), "/auth/login");
    }
}

#[tokio::test]
async fn test_register_login_logout() {
    let (app, _) = app().await;
    let cookie = register(&app, "alice").await;

    // Authenticated users skip the forms
    let response = send(&app, get("/auth/login", Some(&cookie))).await;
    assert_eq!(location(&response), "/store");

    let page = body_text(send(&app, get("/store", Some(&cookie))).await).await;
    assert!(page.contains("alice"));

    let response = send(&app, get("/logout", Some(&cookie))).await;
    assert_eq!(location(&response), "/auth/login");
    assert!(session_cookie(&response).unwrap().ends_with('='));

    let response = send(&app, get("/profile", Some(&cookie))).await;
    assert_eq!(location(&response), "/auth/login");

    let response = send(
        &app,
        post_form("/auth/login", "username=alice&password=hunter2", None),
    )
    .await;
    assert_eq!(location(&response), "/store");
    assert!(session_cookie(&response).is_some());
}

#[tokio::test]
async fn test_register_existing_username_fails() {
    let (app, _) = app().await;
    register(&app, "alice").await;

    let response = send(
        &app,
        post_form("/auth/register", "username=alice&password=other", None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(session_cookie(&response).is_none());
    assert!(body_text(response).await.contains("Username already exists"));
}

#[tokio::test]
async fn test_bad_login_shows_error() {
    let (app, _) = app().await;
    register(&app, "alice").await;

    for body in [
        "username=alice&password=wrong",
        "username=alice%27%20OR%20%271%27%3D%271&password=x",
        "username=&password=",
    ] {
        let response = send(&app, post_form("/auth/login", body, None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(session_cookie(&response).is_none());
        assert!(body_text(response)
            .await
            .contains("Invalid username or password"));
    }
}

#[tokio::test]
async fn test_login_rotates_session_id() {
    let (app, _) = app().await;
    register(&app, "alice").await;

    let planted = "finova_sid=planted-by-attacker";
    let response = send(
        &app,
        post_form("/auth/login", "username=alice&password=hunter2", Some(planted)),
    )
    .await;
    assert_eq!(location(&response), "/store");
    let issued = session_cookie(&response).unwrap();
    assert_ne!(issued, planted);

    let response = send(&app, get("/profile", Some(planted))).await;
    assert_eq!(location(&response), "/auth/login");
    let response = send(&app, get("/profile", Some(&issued))).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_signed_in_post_to_auth_redirects() {
    let (app, _) = app().await;
    let cookie = register(&app, "alice").await;

    for (uri, body) in [
        ("/auth/login", "username=alice&password=hunter2"),
        ("/auth/register", "username=mallory&password=hunter2"),
    ] {
        let response = send(&app, post_form(uri, body, Some(&cookie))).await;
        assert_eq!(location(&response), "/store");
        // Same session, only refreshed
        assert_eq!(session_cookie(&response).as_deref(), Some(cookie.as_str()));
    }

    let page = body_text(send(&app, get("/store", Some(&cookie))).await).await;
    assert!(page.contains("alice"));
    assert!(!page.contains("mallory"));
}

#[tokio::test]
async fn test_active_session_refreshes_cookie() {
    let (app, _) = app().await;
    let cookie = register(&app, "alice").await;

    let response = send(&app, get("/profile", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let refreshed = response
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(refreshed.starts_with(&format!("{cookie};")));
    assert!(refreshed.contains("Max-Age=1800"));
    assert!(refreshed.contains("HttpOnly"));

    // Anonymous and dead sessions get nothing
    let response = send(&app, get("/store", None)).await;
    assert!(session_cookie(&response).is_none());
    let response = send(&app, get("/store", Some("finova_sid=expired"))).await;
    assert!(session_cookie(&response).is_none());
}

// =============================================================================
// Store
// =============================================================================

#[tokio::test]
async fn test_catalog_pages() {
    let (app, _) = app().await;

    let list = body_text(send(&app, get("/store", None)).await).await;
    assert!(list.contains("Pocket Drone"));
    assert!(list.contains("Holographic Display"));

    let detail = body_text(send(&app, get("/store?id=1", None)).await).await;
    assert!(detail.contains("Pocket Drone"));
    assert!(!detail.contains("Holographic Display"));

    // Unknown or malformed ids fall back to the list
    for uri in ["/store?id=999", "/store?id=1%20OR%201%3D1"] {
        let page = body_text(send(&app, get(uri, None)).await).await;
        assert!(page.contains("Holographic Display"));
    }

    let banner = body_text(send(&app, get("/store?purchased=1", None)).await).await;
    assert!(banner.contains("Purchase successful"));
}

#[tokio::test]
async fn test_checkout_deducts_balance_once() {
    let (app, backend) = app().await;
    let cookie = register(&app, "alice").await;

    let response = send(&app, post_form("/store", "id=1&qty=2", Some(&cookie))).await;
    assert_eq!(location(&response), "/store?purchased=1");

    let expected = STARTING_BALANCE - 2.0 * 129.99;
    assert!((balance(&backend, "alice").await - expected).abs() < 1e-9);

    let profile = body_text(send(&app, get("/profile", Some(&cookie))).await).await;
    assert_eq!(profile.matches("<li>Pocket Drone").count(), 2);
}

#[tokio::test]
async fn test_checkout_outcomes() {
    let (app, backend) = app().await;
    let cookie = register(&app, "alice").await;

    // qty clamps to 100, which the starting balance cannot cover
    let response = send(&app, post_form("/store", "id=1&qty=1000", Some(&cookie))).await;
    assert_eq!(location(&response), "/store?error=insufficient");

    // Unpriced showcase item
    let response = send(&app, post_form("/store", "id=6", Some(&cookie))).await;
    assert_eq!(location(&response), "/store?error=payment");

    // Detail page round trip
    let response = send(
        &app,
        post_form("/store", "id=5&qty=1&back=detail", Some(&cookie)),
    )
    .await;
    assert_eq!(location(&response), "/store?id=5&purchased=1");

    // Missing or malformed input
    for body in ["qty=1", "id=abc", "id=1&qty=lots"] {
        let response = send(&app, post_form("/store", body, Some(&cookie))).await;
        assert_eq!(location(&response), "/store");
    }

    let expected = STARTING_BALANCE - 39.99;
    assert!((balance(&backend, "alice").await - expected).abs() < 1e-9);
}

// =============================================================================
// Profile
// =============================================================================

#[tokio::test]
async fn test_profile_update() {
    let (app, backend) = app().await;
    let cookie = register(&app, "alice").await;
    register(&app, "bob").await;

    let response = send(
        &app,
        post_form(
            "/profile",
            "username=alicia&image=https%3A%2F%2Fimg.example%2Fa.png",
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("refresh").unwrap(), "2");
    assert_eq!(body_text(response).await, "Profile updated\n");

    let user = backend.get_user_by_username("alicia").await.unwrap().unwrap();
    assert_eq!(user.image, "https://img.example/a.png");

    let response = send(
        &app,
        post_form("/profile", "username=bob", Some(&cookie)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        body_text(response).await,
        "Profile update failed: Update failed - username may already exist\n"
    );
}

#[tokio::test]
async fn test_export_import_round_trip() {
    let (app, _) = app().await;
    let cookie = register(&app, "alice").await;
    send(&app, post_form("/store", "id=2&qty=1", Some(&cookie))).await;

    let response = send(&app, get("/profile?action=export", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("attachment"));
    let sealed = body_bytes(response).await;
    assert!(!String::from_utf8_lossy(&sealed).contains("Earbuds"));

    let page = body_text(
        send(&app, post_upload("/profile?action=import", &sealed, &cookie)).await,
    )
    .await;
    assert!(page.contains("Imported 1 purchases"));
    assert!(page.contains("Noise-Cancelling Earbuds"));
}

#[tokio::test]
async fn test_import_rejects_foreign_data() {
    let (app, _) = app().await;
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    send(&app, post_form("/store", "id=2&qty=1", Some(&alice))).await;
    send(&app, post_form("/store", "id=3&qty=1", Some(&bob))).await;

    // Another user's export
    let sealed = body_bytes(send(&app, get("/export", Some(&alice))).await).await;
    let response = send(&app, post_upload("/profile?action=import", &sealed, &bob)).await;
    let page = body_text(response).await;
    assert!(page.contains("Import failed - export belongs to another account"));
    assert!(page.contains("No purchases yet."));

    // A serialized Java object stream
    let page = body_text(
        send(
            &app,
            post_upload("/profile?action=import", b"\xac\xed\x00\x05sr\x00", &alice),
        )
        .await,
    )
    .await;
    assert!(page.contains("Import failed - "));
    assert!(page.contains("No purchases yet."));
}

// =============================================================================
// Image proxy
// =============================================================================

#[tokio::test]
async fn test_image_proxy_blocks_internal_targets() {
    let (app, _) = app().await;
    let cookie = register(&app, "alice").await;

    for url in [
        "http%3A%2F%2F127.0.0.1%3A8080%2Fadmin",
        "http%3A%2F%2F169.254.169.254%2Flatest%2Fmeta-data%2F",
        "file%3A%2F%2F%2Fetc%2Fpasswd",
        "",
    ] {
        let response = send(&app, get(&format!("/image?url={url}"), Some(&cookie))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "No image found");
    }
}
