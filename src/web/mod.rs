//! HTTP surface
//!
//! TigerStyle: Two routers, one per service. Handlers stay thin: extract,
//! call a service, render or redirect.
//!
//! ```text
//! store router                      statements router
//! ├── /auth/login, /auth/register    └── /api/statements
//! ├── /logout                            ├── /search
//! ├── /store                             └── /healthz
//! ├── /profile, /export
//! └── /image
//! ```

pub mod auth;
pub mod cookie;
pub mod extract;
pub mod image;
pub mod profile;
pub mod statements;
pub mod store;
pub mod views;

use std::sync::Arc;

use axum::middleware;
use axum::response::Redirect;
use axum::routing::get;
use axum::Router;
use finova_store::{GadgetStore, StatementStore, UserStore};
use tower_http::trace::TraceLayer;

use crate::sealing::PurchaseSealer;
use crate::services::{
    CartService, FetchPolicy, GadgetService, ImageService, StatementService, UserService,
};
use crate::session::SessionStore;

// =============================================================================
// State
// =============================================================================

/// Shared state of the gadget store
#[derive(Clone)]
pub struct StoreState {
    /// Accounts
    pub users: UserService,
    /// Catalog and purchase history
    pub gadgets: GadgetService,
    /// Checkout and export/import
    pub cart: CartService,
    /// Image proxy
    pub images: ImageService,
    /// Live sessions
    pub sessions: SessionStore,
}

impl StoreState {
    /// Wire the services over the given stores
    pub fn new(
        users: Arc<dyn UserStore>,
        gadgets: Arc<dyn GadgetStore>,
        sealer: Arc<PurchaseSealer>,
        fetch_policy: FetchPolicy,
    ) -> Self {
        let sessions = SessionStore::new();
        Self {
            users: UserService::new(users.clone()),
            gadgets: GadgetService::new(gadgets.clone(), sessions.clone()),
            cart: CartService::new(gadgets, users, sessions.clone(), sealer),
            images: ImageService::new(fetch_policy),
            sessions,
        }
    }
}

/// Shared state of the statement API
#[derive(Clone)]
pub struct StatementState {
    /// Statement reads
    pub statements: StatementService,
}

impl StatementState {
    /// Wire the service over the given store
    pub fn new(statements: Arc<dyn StatementStore>) -> Self {
        Self {
            statements: StatementService::new(statements),
        }
    }
}

// =============================================================================
// Routers
// =============================================================================

/// Gadget store routes
pub fn store_router(state: StoreState) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::to("/store") }))
        .route("/auth/login", get(auth::login_form).post(auth::login))
        .route("/auth/register", get(auth::register_form).post(auth::register))
        .route("/logout", get(auth::logout).post(auth::logout))
        .route("/store", get(store::show_store).post(store::checkout))
        .route(
            "/profile",
            get(profile::show_profile).post(profile::update_profile),
        )
        .route("/export", get(profile::export))
        .route("/image", get(image::fetch_image))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            cookie::refresh_session_cookie,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Statement API routes
pub fn statements_router(state: StatementState) -> Router {
    Router::new()
        .route("/api/statements", get(statements::list_statements))
        .route("/api/statements/", get(statements::list_statements))
        .route("/api/statements/search", get(statements::search_statements))
        .route("/api/statements/healthz", get(statements::healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
