//! Image proxy used by the profile page

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use super::extract::CurrentUser;
use super::StoreState;

/// GET /image query
#[derive(Debug, Deserialize)]
pub struct ImageQuery {
    url: Option<String>,
}

/// GET /image
pub async fn fetch_image(
    State(state): State<StoreState>,
    current: CurrentUser,
    Query(query): Query<ImageQuery>,
) -> Response {
    let url = query.url.unwrap_or_default();
    match state.images.fetch_image_data(&url).await {
        Ok(data) => data.into_response(),
        Err(e) => {
            tracing::warn!(user_id = current.user.id, error = %e, "Image fetch failed");
            (StatusCode::BAD_REQUEST, "No image found").into_response()
        }
    }
}
