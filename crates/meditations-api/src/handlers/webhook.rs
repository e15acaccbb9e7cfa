//! Telegram bot webhook.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::Utc;
use serde_json::Value;
use tracing::debug;

use crate::error::{ApiError, Result};
use crate::state::AppState;
use crate::types::{AckResponse, WebhookStatusResponse};

/// POST /api/telegram/webhook - Handle one Bot API update.
pub async fn telegram_webhook(
    State(state): State<AppState>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<AckResponse>> {
    let bot = state
        .bot
        .clone()
        .ok_or_else(|| ApiError::ServiceUnavailable("bot not configured".to_string()))?;
    let Json(update) = body.map_err(|e| ApiError::Internal(e.body_text()))?;

    debug!(update_id = ?update.get("update_id"), "Webhook update received");
    bot.process_update_json(update).await?;

    Ok(Json(AckResponse { ok: true }))
}

/// GET /api/telegram/webhook - Webhook health check.
pub async fn webhook_status(State(state): State<AppState>) -> Json<WebhookStatusResponse> {
    Json(WebhookStatusResponse {
        status: "ok".to_string(),
        timestamp: Utc::now(),
        bot_token_configured: state.bot.is_some(),
    })
}
