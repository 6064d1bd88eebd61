//! Sliding session cookie
//!
//! The cookie's `Max-Age` matches the server-side idle limit, so every
//! response to a request with a live session re-issues it. Handlers that
//! set their own cookie (login, logout) are left alone.

use axum::extract::{Request, State};
use axum::http::header::SET_COOKIE;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;

use super::StoreState;
use crate::session::{session_cookie, session_id_from_headers};

/// Refresh the session cookie after the handler ran
pub async fn refresh_session_cookie(
    State(state): State<StoreState>,
    request: Request,
    next: Next,
) -> Response {
    let session_id = session_id_from_headers(request.headers());
    let mut response = next.run(request).await;

    let Some(session_id) = session_id else {
        return response;
    };
    if response.headers().contains_key(SET_COOKIE) || !state.sessions.is_live(&session_id).await
    {
        return response;
    }

    match HeaderValue::from_str(&session_cookie(&session_id)) {
        Ok(value) => {
            response.headers_mut().append(SET_COOKIE, value);
        }
        Err(e) => tracing::warn!(error = %e, "Session cookie not refreshed"),
    }
    response
}
