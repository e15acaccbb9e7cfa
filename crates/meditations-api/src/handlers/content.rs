//! Public month documents.

use axum::{
    extract::{Path, State},
    Json,
};
use meditations_models::{MeditationsDoc, MonthKey};

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// GET /meditations/:file - Serve a month document such as `2025-09.json`.
pub async fn month_document(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Result<Json<MeditationsDoc>> {
    let not_found = || ApiError::NotFound("not found".to_string());
    let key = MonthKey::parse_file_name(&file).ok_or_else(not_found)?;
    let doc = state.content.load_month(key)?.ok_or_else(not_found)?;
    Ok(Json(doc))
}

/// Fallback for unknown paths.
pub async fn not_found() -> ApiError {
    ApiError::NotFound("not found".to_string())
}
