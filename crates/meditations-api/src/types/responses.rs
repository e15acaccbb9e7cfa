//! Response DTOs for the API.

use chrono::{DateTime, Utc};
use meditations_models::{MeditationsDoc, User};
use serde::Serialize;

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
    /// Uptime in seconds.
    pub uptime_seconds: u64,
    /// Stored user records.
    pub users: usize,
}

/// `{ ok: true, doc }`.
#[derive(Debug, Clone, Serialize)]
pub struct DocResponse {
    pub ok: bool,
    pub doc: MeditationsDoc,
}

impl DocResponse {
    pub fn new(doc: MeditationsDoc) -> Self {
        Self { ok: true, doc }
    }
}

/// Handshake response.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub ok: bool,
    pub user: User,
    #[serde(rename = "initDataPresent")]
    pub init_data_present: bool,
}

/// `{ favorites }`.
#[derive(Debug, Clone, Serialize)]
pub struct FavoritesResponse {
    pub favorites: Vec<String>,
}

/// `{ ok: true }`.
#[derive(Debug, Clone, Serialize)]
pub struct AckResponse {
    pub ok: bool,
}

/// Webhook health.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookStatusResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub bot_token_configured: bool,
}
