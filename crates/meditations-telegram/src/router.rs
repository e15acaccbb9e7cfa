//! Turns inbound messages and button presses into replies.
//!
//! The router is stateless between messages: every reply is computed from the
//! inbound update plus what the stores hold.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use meditations_core::{FavoritesService, IdentityService};
use meditations_models::{MeditationItem, MeditationType, MonthKey, TelegramUser, TodaySelection, User};
use meditations_persistence::ContentStore;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, WebAppInfo};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::commands::Command;
use crate::error::Result;
use crate::inbound::{InboundCallback, InboundMessage};

const APOLOGY: &str = "Sorry, something went wrong. Please try again later.";
const USAGE_HINT: &str = "Send me a message and I'll echo it back. Try /help for options.";

/// A message the bot should send.
#[derive(Debug, Clone, PartialEq)]
pub struct BotReply {
    pub chat_id: i64,
    pub text: String,
    pub keyboard: Option<InlineKeyboardMarkup>,
}

impl BotReply {
    pub fn text(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn with_keyboard(mut self, keyboard: InlineKeyboardMarkup) -> Self {
        self.keyboard = Some(keyboard);
        self
    }
}

/// Dispatches bot commands and callbacks.
pub struct BotRouter {
    identity: Arc<IdentityService>,
    favorites: Arc<FavoritesService>,
    content: Arc<ContentStore>,
    app_url: String,
}

impl BotRouter {
    pub fn new(
        identity: Arc<IdentityService>,
        favorites: Arc<FavoritesService>,
        content: Arc<ContentStore>,
        app_url: impl Into<String>,
    ) -> Self {
        Self {
            identity,
            favorites,
            content,
            app_url: app_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Handles a chat message as of today.
    pub fn handle_message(&self, msg: &InboundMessage) -> Vec<BotReply> {
        self.handle_message_on(msg, Utc::now().date_naive())
    }

    /// Handles a chat message, using `today` to pick meditations.
    pub fn handle_message_on(&self, msg: &InboundMessage, today: NaiveDate) -> Vec<BotReply> {
        let Some(from) = &msg.from else {
            debug!(chat_id = msg.chat_id, "Message without sender ignored");
            return Vec::new();
        };

        match self.dispatch_message(msg, from, today) {
            Ok(replies) => replies,
            Err(e) => {
                error!(chat_id = msg.chat_id, error = %e, "Bot message handler failed");
                vec![BotReply::text(msg.chat_id, APOLOGY)]
            }
        }
    }

    fn dispatch_message(
        &self,
        msg: &InboundMessage,
        from: &TelegramUser,
        today: NaiveDate,
    ) -> Result<Vec<BotReply>> {
        let user = self.identity.upsert_telegram_user(from.clone())?;
        let chat_id = msg.chat_id;

        let reply = match Command::from_text(&msg.text) {
            Some(cmd) => {
                info!(chat_id, telegram_id = from.id, "Command: {:?}", cmd);
                match cmd {
                    Command::Start => self.start_reply(chat_id, &user),
                    Command::Help => BotReply::text(chat_id, Command::help_text())
                        .with_keyboard(self.main_keyboard()),
                    Command::Meditate => self.meditate_reply(chat_id, today),
                    Command::Favorites => self.favorites_reply(chat_id, from.id)?,
                    Command::Profile => self.profile_reply(chat_id, &user),
                }
            }
            None if msg.text.trim().is_empty() => BotReply::text(chat_id, USAGE_HINT),
            None => BotReply::text(chat_id, msg.text.clone()),
        };

        Ok(vec![reply])
    }

    /// Handles a button press as of today.
    ///
    /// Answering the query is left to the caller.
    pub fn handle_callback(&self, callback: &InboundCallback) -> Vec<BotReply> {
        self.handle_callback_on(callback, Utc::now().date_naive())
    }

    /// Handles a button press, using `today` to pick meditations.
    pub fn handle_callback_on(&self, callback: &InboundCallback, today: NaiveDate) -> Vec<BotReply> {
        let (Some(chat_id), Some(data)) = (callback.chat_id, callback.data.as_deref()) else {
            debug!(callback_id = %callback.id, "Callback without chat or data ignored");
            return Vec::new();
        };

        match self.dispatch_callback(chat_id, data, &callback.from, today) {
            Ok(replies) => replies,
            Err(e) => {
                error!(chat_id, data, error = %e, "Callback handler failed");
                vec![BotReply::text(chat_id, APOLOGY)]
            }
        }
    }

    fn dispatch_callback(
        &self,
        chat_id: i64,
        data: &str,
        from: &TelegramUser,
        today: NaiveDate,
    ) -> Result<Vec<BotReply>> {
        let reply = match data {
            "open_app" => BotReply::text(chat_id, "Opening Meditations app...").with_keyboard(
                InlineKeyboardMarkup::new(vec![vec![self.app_button("🧘 Open Meditations App", "")]]),
            ),
            "morning" => self.today_reply(chat_id, MeditationType::Morning, today),
            "evening" => self.today_reply(chat_id, MeditationType::Evening, today),
            "favorites" => {
                self.identity.upsert_telegram_user(from.clone())?;
                self.favorites_reply(chat_id, from.id)?
            }
            "profile" => {
                let user = self.identity.upsert_telegram_user(from.clone())?;
                self.profile_reply(chat_id, &user)
            }
            other => {
                warn!(chat_id, data = other, "Unknown callback data");
                return Ok(Vec::new());
            }
        };
        Ok(vec![reply])
    }

    fn start_reply(&self, chat_id: i64, user: &User) -> BotReply {
        let text = format!(
            "🧘 Welcome to Meditations, {}!\n\n\
            Find calm in just 3 minutes with our guided meditations designed for busy lives.\n\n\
            Choose an option below or open the full app for the complete experience.",
            user.telegram_data.first_name
        );
        BotReply::text(chat_id, text).with_keyboard(InlineKeyboardMarkup::new(vec![
            vec![self.app_button("🧘 Open Full App", "")],
            vec![
                InlineKeyboardButton::callback("🌅 Morning Meditation", "morning"),
                InlineKeyboardButton::callback("🌙 Evening Meditation", "evening"),
            ],
            vec![
                InlineKeyboardButton::callback("❤️ My Favorites", "favorites"),
                InlineKeyboardButton::callback("👤 Profile", "profile"),
            ],
        ]))
    }

    fn meditate_reply(&self, chat_id: i64, today: NaiveDate) -> BotReply {
        let doc = self.content.read_month(MonthKey::from_date(today));
        let selection = TodaySelection::resolve(&doc, today);

        let mut text = String::from("🧘 Choose your meditation:");
        if let Some(item) = selection.morning {
            text.push_str(&format!("\n\n🌅 Morning: {}", display_title(item)));
        }
        if let Some(item) = selection.evening {
            let sep = if selection.morning.is_some() { "\n" } else { "\n\n" };
            text.push_str(&format!("{}🌙 Evening: {}", sep, display_title(item)));
        }

        BotReply::text(chat_id, text).with_keyboard(InlineKeyboardMarkup::new(vec![
            vec![self.app_button("🧘 Open Meditation App", "")],
            vec![
                InlineKeyboardButton::callback("🌅 Morning Session", "morning"),
                InlineKeyboardButton::callback("🌙 Evening Session", "evening"),
            ],
        ]))
    }

    fn today_reply(&self, chat_id: i64, kind: MeditationType, today: NaiveDate) -> BotReply {
        let doc = self.content.read_month(MonthKey::from_date(today));
        let selection = TodaySelection::resolve(&doc, today);
        let (icon, label) = match kind {
            MeditationType::Morning => ("🌅", "morning"),
            MeditationType::Evening => ("🌙", "evening"),
            MeditationType::Other => ("🧘", "other"),
        };

        match selection.slot(kind) {
            Some(item) => {
                let mut text = format!("{} Today's {} meditation: {}", icon, label, display_title(item));
                if !item.about.is_empty() {
                    text.push_str("\n\n");
                    text.push_str(&item.about);
                }
                let path = format!("/meditation/{}", item.id);
                BotReply::text(chat_id, text).with_keyboard(InlineKeyboardMarkup::new(vec![vec![
                    self.app_button("▶️ Start Meditation", &path),
                ]]))
            }
            None => BotReply::text(
                chat_id,
                format!("{} No {} meditation is available yet. Please check back later.", icon, label),
            )
            .with_keyboard(self.main_keyboard()),
        }
    }

    fn favorites_reply(&self, chat_id: i64, telegram_id: i64) -> Result<BotReply> {
        let favorites = self.favorites.get_favorites(telegram_id)?;
        let reply = if favorites.is_empty() {
            BotReply::text(
                chat_id,
                "💔 You haven't favorited any meditations yet.\n\nOpen the app to explore and save your favorites!",
            )
            .with_keyboard(InlineKeyboardMarkup::new(vec![vec![self.app_button("🧘 Open App", "")]]))
        } else {
            BotReply::text(
                chat_id,
                format!(
                    "❤️ You have {} favorite meditation(s)!\n\nOpen the app to access them.",
                    favorites.len()
                ),
            )
            .with_keyboard(InlineKeyboardMarkup::new(vec![vec![
                self.app_button("❤️ View Favorites", "/favorites"),
            ]]))
        };
        Ok(reply)
    }

    fn profile_reply(&self, chat_id: i64, user: &User) -> BotReply {
        let status = user.subscription_status.as_str();
        let badge = if status == "premium" { "⭐" } else { "🆓" };
        let text = format!(
            "👤 Your Profile\n\n\
            Name: {}\n\
            Status: {} {}\n\
            Favorites: ❤️ {} meditations\n\
            Joined: {}",
            user.telegram_data.first_name,
            badge,
            status,
            user.favorite_meditations.len(),
            user.created_at.format("%Y-%m-%d"),
        );
        BotReply::text(chat_id, text).with_keyboard(InlineKeyboardMarkup::new(vec![vec![
            self.app_button("👤 Open Profile", "/profile"),
        ]]))
    }

    fn main_keyboard(&self) -> InlineKeyboardMarkup {
        InlineKeyboardMarkup::new(vec![
            vec![self.app_button("🧘 Open App", "")],
            vec![
                InlineKeyboardButton::callback("🌅 Morning", "morning"),
                InlineKeyboardButton::callback("🌙 Evening", "evening"),
            ],
        ])
    }

    /// A button opening the Mini-App at `path`.
    ///
    /// Falls back to an `open_app` callback button if the configured URL
    /// doesn't parse.
    fn app_button(&self, text: &str, path: &str) -> InlineKeyboardButton {
        match Url::parse(&format!("{}{}", self.app_url, path)) {
            Ok(url) => InlineKeyboardButton::web_app(text, WebAppInfo { url }),
            Err(e) => {
                warn!(app_url = %self.app_url, error = %e, "Invalid Mini-App URL");
                InlineKeyboardButton::callback(text, "open_app")
            }
        }
    }
}

fn display_title(item: &MeditationItem) -> &str {
    if item.title.is_empty() {
        &item.id
    } else {
        &item.title
    }
}
