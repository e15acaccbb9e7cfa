//! Content admin handlers.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};
use meditations_models::MonthKey;
use tracing::info;

use crate::error::{ApiError, Result};
use crate::state::AppState;
use crate::types::{DeleteItemQuery, DocResponse, MonthQuery, SaveItemRequest};

fn parse_month(year: Option<&str>, month: Option<&str>) -> Option<MonthKey> {
    let year = year?.trim().parse::<i32>().ok()?;
    let month = month?.trim().parse::<u32>().ok()?;
    MonthKey::new(year, month)
}

/// GET /api/admin/meditations - Read a month document.
pub async fn get_month(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<DocResponse>> {
    let key = parse_month(query.year.as_deref(), query.month.as_deref())
        .ok_or_else(|| ApiError::BadRequest("year/month required".to_string()))?;

    Ok(Json(DocResponse::new(state.content.read_month(key))))
}

/// POST /api/admin/meditations - Insert or replace an item.
pub async fn save_item(
    State(state): State<AppState>,
    body: std::result::Result<Json<SaveItemRequest>, JsonRejection>,
) -> Result<Json<DocResponse>> {
    let Json(req) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let SaveItemRequest {
        item,
        previous_day,
        expected_revision,
    } = req;

    let from = match previous_day.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(day) => Some(MonthKey::from_day(day).ok_or_else(|| {
            ApiError::BadRequest(format!("invalid previousDay {:?}, expected YYYY-MM-DD", day))
        })?),
    };
    let id = item.id.clone();
    let doc = match from {
        Some(from) => state.content.move_item(item, from, expected_revision)?,
        None => state.content.upsert_item_checked(item, expected_revision)?,
    };

    info!(id = %id, revision = doc.revision, "Meditation saved");
    Ok(Json(DocResponse::new(doc)))
}

/// DELETE /api/admin/meditations - Remove an item from a month document.
pub async fn delete_item(
    State(state): State<AppState>,
    Query(query): Query<DeleteItemQuery>,
) -> Result<Json<DocResponse>> {
    let required = || ApiError::BadRequest("id/year/month required".to_string());
    let id = query
        .id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(required)?;
    let key = parse_month(query.year.as_deref(), query.month.as_deref()).ok_or_else(required)?;

    let doc = state.content.delete_item(id, key)?;
    info!(id = %id, month = %key, "Meditation deleted");
    Ok(Json(DocResponse::new(doc)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month(Some("2025"), Some("9")), MonthKey::new(2025, 9));
        assert_eq!(parse_month(Some("2025"), Some("09")), MonthKey::new(2025, 9));
        assert!(parse_month(None, Some("9")).is_none());
        assert!(parse_month(Some("2025"), None).is_none());
        assert!(parse_month(Some("abc"), Some("9")).is_none());
        assert!(parse_month(Some("0"), Some("9")).is_none());
        assert!(parse_month(Some("2025"), Some("13")).is_none());
    }
}
