//! Telegram identity handshake.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};
use meditations_core::HandshakeRequest;

use crate::error::Result;
use crate::state::AppState;
use crate::types::AuthResponse;

/// Header the client may use to pass the raw `initData`.
pub const INIT_DATA_HEADER: &str = "x-telegram-init-data";

/// POST /api/auth/telegram - Resolve the launch payload to a user record.
///
/// An unreadable body counts as an empty payload.
pub async fn authenticate(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: std::result::Result<Json<HandshakeRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>> {
    let mut request = body.map(|Json(req)| req).unwrap_or_default();

    if request.init_data.as_deref().map_or(true, str::is_empty) {
        request.init_data = headers
            .get(INIT_DATA_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string);
    }
    let init_data_present = request.init_data.is_some();

    let user = state.identity.authenticate(&request)?;

    Ok(Json(AuthResponse {
        ok: true,
        user,
        init_data_present,
    }))
}
