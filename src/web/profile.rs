//! Profile page, profile updates, purchase export and import

use axum::extract::{FromRequest, Multipart, Query, Request, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Form;
use serde::Deserialize;

use super::extract::CurrentUser;
use super::{views, StoreState};
use crate::error::AppError;
use crate::services::ProfileError;

/// Multipart field carrying an export file
pub const IMPORT_FIELD_NAME: &str = "importFile";

/// Download name of the export file
pub const EXPORT_FILE_NAME: &str = "purchases.sealed";

/// Seconds before the browser returns to the profile page
const REFRESH_SECS: &str = "2";

/// `?action=` on /profile
#[derive(Debug, Default, Deserialize)]
pub struct ProfileQuery {
    action: Option<String>,
}

/// Profile update form
#[derive(Debug, Default, Deserialize)]
pub struct ProfileForm {
    username: Option<String>,
    image: Option<String>,
}

/// GET /profile
pub async fn show_profile(
    State(state): State<StoreState>,
    current: CurrentUser,
    Query(query): Query<ProfileQuery>,
) -> Result<Response, AppError> {
    if query.action.as_deref() == Some("export") {
        return download(&state, &current).await;
    }
    let purchases = state.gadgets.purchases(&current.session_id).await;
    Ok(views::profile_page(&current.user, &purchases, None, None).into_response())
}

/// GET /export
pub async fn export(
    State(state): State<StoreState>,
    current: CurrentUser,
) -> Result<Response, AppError> {
    download(&state, &current).await
}

async fn download(state: &StoreState, current: &CurrentUser) -> Result<Response, AppError> {
    let sealed = state
        .cart
        .export_purchases(&current.session_id, &current.user)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok((
        [
            (CONTENT_TYPE, "application/octet-stream".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
            ),
        ],
        sealed,
    )
        .into_response())
}

/// POST /profile
pub async fn update_profile(
    State(state): State<StoreState>,
    current: CurrentUser,
    Query(query): Query<ProfileQuery>,
    request: Request,
) -> Response {
    if query.action.as_deref() == Some("import") {
        return match Multipart::from_request(request, &state).await {
            Ok(multipart) => import(&state, &current, multipart).await,
            Err(rejection) => rejection.into_response(),
        };
    }

    let form = match Form::<ProfileForm>::from_request(request, &state).await {
        Ok(Form(form)) => form,
        Err(rejection) => return rejection.into_response(),
    };

    let result = state
        .users
        .update_profile(&current.user, form.username.as_deref(), form.image.as_deref())
        .await;

    let (status, body) = match result {
        Ok(()) => (StatusCode::OK, "Profile updated\n".to_string()),
        Err(e) => {
            let status = match e {
                ProfileError::UsernameTaken => StatusCode::CONFLICT,
                ProfileError::Invalid(_) => StatusCode::BAD_REQUEST,
                ProfileError::NotFound => StatusCode::NOT_FOUND,
                ProfileError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, format!("Profile update failed: {e}\n"))
        }
    };
    (status, [("refresh", REFRESH_SECS)], body).into_response()
}

async fn import(state: &StoreState, current: &CurrentUser, mut multipart: Multipart) -> Response {
    let mut upload = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some(IMPORT_FIELD_NAME) => {
                match field.bytes().await {
                    Ok(bytes) => upload = Some(bytes),
                    Err(e) => return e.into_response(),
                }
                break;
            }
            Ok(Some(_)) => {}
            Ok(None) => break,
            Err(e) => return e.into_response(),
        }
    }

    let (message, error) = match upload {
        Some(bytes) => {
            let outcome = state
                .cart
                .import_purchases(&current.session_id, &current.user, &bytes)
                .await;
            if outcome.is_success() {
                (Some(outcome.message()), None)
            } else {
                (None, Some(outcome.message()))
            }
        }
        None => (None, Some("Import failed - no file uploaded".to_string())),
    };

    let purchases = state.gadgets.purchases(&current.session_id).await;
    views::profile_page(
        &current.user,
        &purchases,
        message.as_deref(),
        error.as_deref(),
    )
    .into_response()
}
