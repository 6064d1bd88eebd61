//! Login, registration and logout

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use finova_store::User;
use serde::Deserialize;

use super::extract::{MaybeUser, LOGIN_PATH};
use super::{views, StoreState};
use crate::services::AuthError;
use crate::session::{clear_session_cookie, session_cookie, session_id_from_headers};

/// Login and registration form body
#[derive(Debug, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

/// GET /auth/login
pub async fn login_form(user: MaybeUser) -> Response {
    if user.0.is_some() {
        return Redirect::to("/store").into_response();
    }
    views::login_page(None).into_response()
}

/// GET /auth/register
pub async fn register_form(user: MaybeUser) -> Response {
    if user.0.is_some() {
        return Redirect::to("/store").into_response();
    }
    views::register_page(None).into_response()
}

/// Start a fresh session for `user` and send them to the store
async fn start_session(state: &StoreState, headers: &HeaderMap, user: &User) -> Response {
    let previous = session_id_from_headers(headers);
    let session_id = state.sessions.login(previous.as_deref(), user.id).await;
    (
        [(SET_COOKIE, session_cookie(&session_id))],
        Redirect::to("/store"),
    )
        .into_response()
}

fn log_failure(action: &str, err: &AuthError) {
    match err {
        AuthError::Storage(_) | AuthError::Internal(_) => {
            tracing::error!(action, error = %err, "Authentication error");
        }
        _ => tracing::debug!(action, error = %err, "Authentication rejected"),
    }
}

/// POST /auth/login
pub async fn login(
    State(state): State<StoreState>,
    user: MaybeUser,
    headers: HeaderMap,
    Form(creds): Form<Credentials>,
) -> Response {
    if user.0.is_some() {
        return Redirect::to("/store").into_response();
    }
    match state.users.login(&creds.username, &creds.password).await {
        Ok(user) => start_session(&state, &headers, &user).await,
        Err(e) => {
            log_failure("login", &e);
            views::login_page(Some(e.user_message())).into_response()
        }
    }
}

/// POST /auth/register
pub async fn register(
    State(state): State<StoreState>,
    user: MaybeUser,
    headers: HeaderMap,
    Form(creds): Form<Credentials>,
) -> Response {
    if user.0.is_some() {
        return Redirect::to("/store").into_response();
    }
    match state.users.register(&creds.username, &creds.password).await {
        Ok(user) => start_session(&state, &headers, &user).await,
        Err(e) => {
            log_failure("register", &e);
            views::register_page(Some(e.user_message())).into_response()
        }
    }
}

/// GET|POST /logout
pub async fn logout(State(state): State<StoreState>, headers: HeaderMap) -> Response {
    if let Some(session_id) = session_id_from_headers(&headers) {
        state.sessions.destroy(&session_id).await;
    }
    (
        [(SET_COOKIE, clear_session_cookie())],
        Redirect::to(LOGIN_PATH),
    )
        .into_response()
}
