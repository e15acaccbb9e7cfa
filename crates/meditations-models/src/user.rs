//! User types.
//!
//! A [`User`] is created the first time a Telegram account shows up, either
//! through the Mini-App handshake or by messaging the bot. The Telegram id is
//! the external identity; [`UserId`] is the internal key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::UserId;

/// Subscription tier of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    #[default]
    Free,
    Premium,
    Trial,
}

impl SubscriptionStatus {
    /// Returns the wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Free => "free",
            SubscriptionStatus::Premium => "premium",
            SubscriptionStatus::Trial => "trial",
        }
    }
}

/// Telegram account snapshot as delivered by Telegram (snake_case fields).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelegramUser {
    pub id: i64,

    #[serde(default)]
    pub first_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_premium: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl TelegramUser {
    /// Creates a snapshot with only the required fields set.
    pub fn new(id: i64, first_name: impl Into<String>) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: None,
            username: None,
            language_code: None,
            is_premium: None,
            photo_url: None,
        }
    }

    /// Whether Telegram flagged the account as premium.
    pub fn is_premium(&self) -> bool {
        self.is_premium.unwrap_or(false)
    }
}

/// Add, remove, or flip a favorite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FavoriteAction {
    Add,
    Remove,
    #[default]
    Toggle,
}

/// A persisted user record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,

    /// External identity; unique across users.
    pub telegram_id: i64,

    /// Last-seen Telegram snapshot.
    pub telegram_data: TelegramUser,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telegram_language_code: Option<String>,

    /// Favorited meditation ids, unique, in insertion order.
    #[serde(default)]
    pub favorite_meditations: Vec<String>,

    #[serde(default)]
    pub subscription_status: SubscriptionStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_expires_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
}

impl User {
    /// Creates a new user from a Telegram snapshot.
    ///
    /// Premium Telegram accounts start on the premium tier, everyone else on free.
    pub fn from_telegram(telegram: TelegramUser) -> Self {
        let now = Utc::now();
        let subscription_status = if telegram.is_premium() {
            SubscriptionStatus::Premium
        } else {
            SubscriptionStatus::Free
        };
        Self {
            id: UserId::new(),
            telegram_id: telegram.id,
            telegram_language_code: telegram.language_code.clone(),
            telegram_data: telegram,
            favorite_meditations: Vec::new(),
            subscription_status,
            subscription_expires_at: None,
            created_at: now,
            updated_at: now,
            last_active_at: now,
        }
    }

    /// Records a re-authentication: refreshes the snapshot and activity time.
    pub fn refresh(&mut self, telegram: TelegramUser) {
        let now = Utc::now();
        self.telegram_language_code = telegram.language_code.clone();
        self.telegram_data = telegram;
        self.last_active_at = now;
        self.updated_at = now;
    }

    /// Whether the meditation is in the favorites set.
    pub fn is_favorite(&self, meditation_id: &str) -> bool {
        self.favorite_meditations.iter().any(|id| id == meditation_id)
    }

    /// Applies a favorites action and returns the resulting membership.
    ///
    /// Adding a present id and removing an absent one leave the list untouched.
    pub fn apply_favorite(&mut self, meditation_id: &str, action: FavoriteAction) -> bool {
        let present = self.is_favorite(meditation_id);
        let want = match action {
            FavoriteAction::Add => true,
            FavoriteAction::Remove => false,
            FavoriteAction::Toggle => !present,
        };

        if want && !present {
            self.favorite_meditations.push(meditation_id.to_string());
        } else if !want && present {
            self.favorite_meditations.retain(|id| id != meditation_id);
        }
        if want != present {
            self.updated_at = Utc::now();
        }
        want
    }

    /// Whether the subscription grants access at `now`.
    pub fn is_subscription_active(&self, now: DateTime<Utc>) -> bool {
        match self.subscription_status {
            SubscriptionStatus::Free | SubscriptionStatus::Premium => true,
            SubscriptionStatus::Trial => self
                .subscription_expires_at
                .is_some_and(|expires| now < expires),
        }
    }
}
