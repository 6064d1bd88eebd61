//! Statement REST API

use axum::extract::{Query, State};
use axum::Json;
use finova_store::Statement;

use super::StatementState;
use crate::error::AppError;
use crate::services::StatementQuery;

/// GET /api/statements
pub async fn list_statements(
    State(state): State<StatementState>,
) -> Result<Json<Vec<Statement>>, AppError> {
    Ok(Json(state.statements.all().await?))
}

/// GET /api/statements/search
pub async fn search_statements(
    State(state): State<StatementState>,
    Query(query): Query<StatementQuery>,
) -> Result<Json<Vec<Statement>>, AppError> {
    Ok(Json(state.statements.search(&query).await?))
}

/// GET /api/statements/healthz
pub async fn healthz() -> &'static str {
    "ok"
}
