//! Bot-facing views of Telegram updates.
//!
//! The router works on these plain structs rather than teloxide types so it
//! can be driven from polling, the webhook, or tests alike.

use meditations_models::TelegramUser;
use teloxide::types::{CallbackQuery, Message, User};

/// A chat message addressed to the bot.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub chat_id: i64,
    pub text: String,
    /// Sender; absent for channel posts and service messages.
    pub from: Option<TelegramUser>,
}

impl InboundMessage {
    pub fn new(chat_id: i64, text: impl Into<String>, from: Option<TelegramUser>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            from,
        }
    }

    /// Converts a teloxide message; non-text messages get empty text.
    pub fn from_message(msg: &Message) -> Self {
        Self {
            chat_id: msg.chat.id.0,
            text: msg.text().unwrap_or_default().to_string(),
            from: msg.from.as_ref().map(telegram_user_from),
        }
    }
}

/// An inline keyboard button press.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundCallback {
    pub id: String,
    /// Chat of the message carrying the keyboard, if Telegram still has it.
    pub chat_id: Option<i64>,
    pub data: Option<String>,
    pub from: TelegramUser,
}

impl InboundCallback {
    /// Converts a teloxide callback query.
    pub fn from_query(query: &CallbackQuery) -> Self {
        Self {
            id: query.id.clone(),
            chat_id: query.message.as_ref().map(|m| m.chat().id.0),
            data: query.data.clone(),
            from: telegram_user_from(&query.from),
        }
    }
}

/// Maps a Bot API user to the snapshot stored on user records.
pub fn telegram_user_from(user: &User) -> TelegramUser {
    TelegramUser {
        id: user.id.0 as i64,
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        username: user.username.clone(),
        language_code: user.language_code.clone(),
        is_premium: Some(user.is_premium),
        photo_url: None,
    }
}
