//! Mini-App identity handshake.
//!
//! The client posts the Telegram launch payload once per session. Unless
//! signature checks are enabled the user object is taken as-is from
//! `initDataUnsafe`, so the resulting identity is client-asserted.

use std::sync::Arc;

use meditations_models::{TelegramUser, User};
use meditations_persistence::UserStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::AuthSettings;
use crate::error::{Result, ServiceError};
use crate::init_data::InitDataVerifier;

/// Body of the handshake request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HandshakeRequest {
    /// Parsed launch payload, `{ user: {...}, ... }`.
    #[serde(rename = "initDataUnsafe", default, skip_serializing_if = "Option::is_none")]
    pub init_data_unsafe: Option<Value>,

    /// Raw signed query string.
    #[serde(rename = "initData", default, skip_serializing_if = "Option::is_none")]
    pub init_data: Option<String>,
}

impl HandshakeRequest {
    /// A request carrying only the unsigned payload.
    pub fn from_unsafe(payload: Value) -> Self {
        Self {
            init_data_unsafe: Some(payload),
            init_data: None,
        }
    }

    /// A request carrying only the raw signed string.
    pub fn from_init_data(init_data: impl Into<String>) -> Self {
        Self {
            init_data_unsafe: None,
            init_data: Some(init_data.into()),
        }
    }
}

/// Pulls the Telegram user out of an `initDataUnsafe` payload.
///
/// Returns `None` unless `user.id` is an integer.
pub fn extract_user(payload: &Value) -> Option<TelegramUser> {
    let user = payload.get("user")?;
    user.get("id")?.as_i64()?;
    serde_json::from_value(user.clone()).ok()
}

/// Resolves handshakes to persisted users.
pub struct IdentityService {
    users: Arc<UserStore>,
    verifier: Option<InitDataVerifier>,
}

impl IdentityService {
    /// Creates a service that trusts the unsigned payload.
    pub fn new(users: Arc<UserStore>) -> Self {
        Self {
            users,
            verifier: None,
        }
    }

    /// Requires every handshake to carry `initData` signed for this verifier.
    pub fn with_verifier(mut self, verifier: InitDataVerifier) -> Self {
        self.verifier = Some(verifier);
        self
    }

    /// Builds the service from runtime settings.
    pub fn from_settings(users: Arc<UserStore>, settings: &AuthSettings) -> Self {
        let service = Self::new(users);
        match settings.verification_token() {
            Some(token) => {
                let mut verifier = InitDataVerifier::new(token);
                if let Some(max_age) = settings.max_age {
                    verifier = verifier.with_max_age(max_age);
                }
                info!("Init data signature verification enabled");
                service.with_verifier(verifier)
            }
            None => {
                if settings.verify_init_data {
                    warn!("Init data verification requested but no bot token is set; accepting unsigned payloads");
                }
                service
            }
        }
    }

    /// Whether handshakes must be signed.
    pub fn requires_signature(&self) -> bool {
        self.verifier.is_some()
    }

    /// The user store behind this service.
    pub fn users(&self) -> &Arc<UserStore> {
        &self.users
    }

    /// Runs the handshake: resolves the Telegram user and upserts the record.
    pub fn authenticate(&self, request: &HandshakeRequest) -> Result<User> {
        let telegram = match &self.verifier {
            Some(verifier) => {
                let raw = request
                    .init_data
                    .as_deref()
                    .filter(|s| !s.is_empty())
                    .ok_or(ServiceError::MissingInitData)?;
                verifier.verify(raw)?.user.ok_or(ServiceError::NoUser)?
            }
            None => {
                let telegram = request
                    .init_data_unsafe
                    .as_ref()
                    .and_then(extract_user)
                    .ok_or(ServiceError::NoUser)?;
                warn!(telegram_id = telegram.id, "Accepting unverified Telegram identity");
                telegram
            }
        };

        self.upsert_telegram_user(telegram)
    }

    /// Creates the user on first sight, otherwise refreshes its snapshot.
    pub fn upsert_telegram_user(&self, telegram: TelegramUser) -> Result<User> {
        let telegram_id = telegram.id;
        let (user, created) = self.users.transact(telegram_id, |slot| {
            if let Some(user) = slot.as_mut() {
                user.refresh(telegram);
                return (user.clone(), false);
            }
            let user = User::from_telegram(telegram);
            *slot = Some(user.clone());
            (user, true)
        })?;

        if created {
            info!(telegram_id, user_id = %user.id, "User created");
        } else {
            debug!(telegram_id, "User refreshed");
        }
        Ok(user)
    }

    /// Looks up a user by Telegram id.
    pub fn get_user(&self, telegram_id: i64) -> Result<Option<User>> {
        Ok(self.users.get(telegram_id)?)
    }
}
