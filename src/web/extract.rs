//! Request extractors for the signed-in user

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use finova_store::User;

use super::StoreState;
use crate::session::session_id_from_headers;

/// Where unauthenticated visitors are sent
pub const LOGIN_PATH: &str = "/auth/login";

/// A request with a live session whose user still exists
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// Session id from the cookie
    pub session_id: String,
    /// Fresh user row
    pub user: User,
}

/// Rejection for protected routes
#[derive(Debug)]
pub struct LoginRedirect;

impl IntoResponse for LoginRedirect {
    fn into_response(self) -> Response {
        Redirect::to(LOGIN_PATH).into_response()
    }
}

async fn resolve(parts: &Parts, state: &StoreState) -> Option<CurrentUser> {
    let session_id = session_id_from_headers(&parts.headers)?;
    let session = state.sessions.get(&session_id).await?;

    match state.users.find_by_id(session.user_id).await {
        Ok(Some(user)) => Some(CurrentUser { session_id, user }),
        Ok(None) => {
            // Account vanished; the session is useless
            state.sessions.destroy(&session_id).await;
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, "Session user lookup failed");
            None
        }
    }
}

#[async_trait]
impl FromRequestParts<StoreState> for CurrentUser {
    type Rejection = LoginRedirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &StoreState,
    ) -> Result<Self, Self::Rejection> {
        resolve(parts, state).await.ok_or(LoginRedirect)
    }
}

/// The signed-in user, if any
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<CurrentUser>);

#[async_trait]
impl FromRequestParts<StoreState> for MaybeUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &StoreState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(resolve(parts, state).await))
    }
}
