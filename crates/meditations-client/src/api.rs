//! HTTP client for the identity and favorites endpoints.

use std::time::Duration;

use meditations_models::{FavoriteAction, User};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::loader::DEFAULT_TIMEOUT;

#[derive(Debug, Serialize)]
struct HandshakeBody {
    #[serde(rename = "initDataUnsafe", skip_serializing_if = "Option::is_none")]
    init_data_unsafe: Option<Value>,
    #[serde(rename = "initData", skip_serializing_if = "Option::is_none")]
    init_data: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthBody {
    user: User,
}

#[derive(Debug, Deserialize)]
struct FavoritesBody {
    #[serde(default)]
    favorites: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SetFavoriteBody<'a> {
    telegram_id: i64,
    meditation_id: &'a str,
    action: FavoriteAction,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Favorites after a change.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FavoriteState {
    pub favorites: Vec<String>,
    #[serde(rename = "isFavorite")]
    pub is_favorite: bool,
}

/// Client for `/api/auth/telegram` and `/api/user/favorites`.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Runs the identity handshake and returns the stored user.
    pub async fn authenticate(
        &self,
        init_data_unsafe: Option<Value>,
        init_data: Option<String>,
    ) -> Result<User> {
        let body = HandshakeBody {
            init_data_unsafe,
            init_data,
        };
        let response = self
            .client
            .post(self.url("/api/auth/telegram"))
            .json(&body)
            .send()
            .await?;
        let auth: AuthBody = decode(response).await?;
        debug!(telegram_id = auth.user.telegram_id, "Handshake complete");
        Ok(auth.user)
    }

    /// Lists favorite meditation ids.
    pub async fn get_favorites(&self, telegram_id: i64) -> Result<Vec<String>> {
        let response = self
            .client
            .get(self.url("/api/user/favorites"))
            .query(&[("telegramId", telegram_id.to_string())])
            .send()
            .await?;
        let body: FavoritesBody = decode(response).await?;
        Ok(body.favorites)
    }

    /// Adds, removes, or toggles one favorite.
    pub async fn set_favorite(
        &self,
        telegram_id: i64,
        meditation_id: &str,
        action: FavoriteAction,
    ) -> Result<FavoriteState> {
        let body = SetFavoriteBody {
            telegram_id,
            meditation_id,
            action,
        };
        let response = self
            .client
            .post(self.url("/api/user/favorites"))
            .json(&body)
            .send()
            .await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()));
    }

    let message = match response.json::<ErrorBody>().await {
        Ok(ErrorBody { error: Some(error) }) => error,
        _ => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    };
    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handshake_body_wire_names() {
        let body = HandshakeBody {
            init_data_unsafe: Some(serde_json::json!({"user": {"id": 1}})),
            init_data: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("initDataUnsafe").is_some());
        assert!(json.get("initData").is_none());
    }

    #[test]
    fn test_set_favorite_body() {
        let body = SetFavoriteBody {
            telegram_id: 7,
            meditation_id: "m1",
            action: FavoriteAction::Add,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"telegramId": 7, "meditationId": "m1", "action": "add"})
        );
    }

    #[test]
    fn test_favorite_state_decodes() {
        let state: FavoriteState =
            serde_json::from_str(r#"{"favorites":["a"],"isFavorite":true}"#).unwrap();
        assert!(state.is_favorite);
        assert_eq!(state.favorites, vec!["a"]);
    }
}
