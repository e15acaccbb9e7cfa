//! Request DTOs for the API.
//!
//! Query parameters are taken as strings and validated by the handlers so a
//! malformed value produces the endpoint's own 400 message.

use meditations_models::MeditationItem;
use serde::Deserialize;
use serde_json::Value;

/// `?year=Y&month=M`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MonthQuery {
    pub year: Option<String>,
    pub month: Option<String>,
}

/// `?id=I&year=Y&month=M`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteItemQuery {
    pub id: Option<String>,
    pub year: Option<String>,
    pub month: Option<String>,
}

/// Body of `POST /api/admin/meditations`: the item plus save options.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveItemRequest {
    #[serde(flatten)]
    pub item: MeditationItem,

    /// The day the item had when the editor loaded it. When it falls in a
    /// different month the item is moved out of that month's document.
    #[serde(rename = "previousDay", default)]
    pub previous_day: Option<String>,

    /// Revision of the target document the editor last saw.
    #[serde(rename = "expectedRevision", default)]
    pub expected_revision: Option<u64>,
}

/// `?telegramId=N`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FavoritesQuery {
    #[serde(rename = "telegramId")]
    pub telegram_id: Option<String>,
}

/// Body of `POST /api/user/favorites`.
///
/// `telegramId` and `meditationId` are accepted as numbers or strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SetFavoriteRequest {
    #[serde(rename = "telegramId", default)]
    pub telegram_id: Value,

    #[serde(rename = "meditationId", default)]
    pub meditation_id: Value,

    #[serde(default)]
    pub action: Option<String>,
}
