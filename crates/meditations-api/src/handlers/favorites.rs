//! Favorites handlers.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};
use meditations_core::FavoriteUpdate;
use meditations_models::FavoriteAction;
use serde_json::Value;

use crate::error::{ApiError, Result};
use crate::state::AppState;
use crate::types::{FavoritesQuery, FavoritesResponse, SetFavoriteRequest};

fn telegram_id_required() -> ApiError {
    ApiError::BadRequest("telegramId is required".to_string())
}

fn parse_telegram_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|id| *id != 0)
}

/// Reads an id sent either as a JSON number or as a string.
fn coerce_telegram_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().filter(|id| *id != 0),
        Value::String(s) => parse_telegram_id(s),
        _ => None,
    }
}

fn coerce_meditation_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_action(raw: Option<&str>) -> Result<FavoriteAction> {
    match raw.map(str::trim) {
        None | Some("") | Some("toggle") => Ok(FavoriteAction::Toggle),
        Some("add") => Ok(FavoriteAction::Add),
        Some("remove") => Ok(FavoriteAction::Remove),
        Some(other) => Err(ApiError::BadRequest(format!("unknown action: {}", other))),
    }
}

/// GET /api/user/favorites - List a user's favorites.
pub async fn get_favorites(
    State(state): State<AppState>,
    Query(query): Query<FavoritesQuery>,
) -> Result<Json<FavoritesResponse>> {
    let telegram_id = query
        .telegram_id
        .as_deref()
        .and_then(parse_telegram_id)
        .ok_or_else(telegram_id_required)?;

    Ok(Json(FavoritesResponse {
        favorites: state.favorites.get_favorites(telegram_id)?,
    }))
}

/// POST /api/user/favorites - Add, remove or toggle a favorite.
pub async fn set_favorite(
    State(state): State<AppState>,
    body: std::result::Result<Json<SetFavoriteRequest>, JsonRejection>,
) -> Result<Json<FavoriteUpdate>> {
    let req = body.map(|Json(req)| req).unwrap_or_default();

    let telegram_id = coerce_telegram_id(&req.telegram_id).ok_or_else(telegram_id_required)?;
    let meditation_id = coerce_meditation_id(&req.meditation_id)
        .ok_or_else(|| ApiError::BadRequest("meditationId is required".to_string()))?;
    let action = parse_action(req.action.as_deref())?;

    let update = state
        .favorites
        .set_favorite(telegram_id, &meditation_id, action)?;
    Ok(Json(update))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_telegram_id() {
        assert_eq!(coerce_telegram_id(&json!(42)), Some(42));
        assert_eq!(coerce_telegram_id(&json!("42")), Some(42));
        assert_eq!(coerce_telegram_id(&json!(0)), None);
        assert_eq!(coerce_telegram_id(&json!("abc")), None);
        assert_eq!(coerce_telegram_id(&Value::Null), None);
    }

    #[test]
    fn test_parse_action() {
        assert_eq!(parse_action(None).unwrap(), FavoriteAction::Toggle);
        assert_eq!(parse_action(Some("add")).unwrap(), FavoriteAction::Add);
        assert_eq!(parse_action(Some("remove")).unwrap(), FavoriteAction::Remove);
        assert!(parse_action(Some("flip")).is_err());
    }
}
