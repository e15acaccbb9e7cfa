//! Telegram bot interface for Daily Meditations.
//!
//! The bot greets users, offers today's morning and evening meditations and
//! links into the Mini-App. It runs either by long polling or behind the
//! HTTP server's webhook; both feed the same [`BotService`].
//!
//! # Environment Variables
//!
//! - `TELEGRAM_BOT_TOKEN`: Bot token from @BotFather (required)
//! - `MEDITATIONS_APP_URL`: Mini-App URL used for the web-app buttons
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use meditations_core::{config, FavoritesService, IdentityService};
//! use meditations_persistence::{ContentStore, UserStore};
//! use meditations_telegram::{BotRouter, TelegramBot};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let users = Arc::new(UserStore::new(config::state_dir()));
//!     let router = BotRouter::new(
//!         Arc::new(IdentityService::new(Arc::clone(&users))),
//!         Arc::new(FavoritesService::new(users)),
//!         Arc::new(ContentStore::new(config::content_dir())),
//!         config::app_url(),
//!     );
//!
//!     let bot = TelegramBot::new(router)?;
//!     bot.start_polling().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Commands
//!
//! - `/start` - Welcome message and main menu
//! - `/help` - Show available commands
//! - `/meditate` - Today's morning and evening meditations
//! - `/favorites` - Favorites count with a link into the app
//! - `/profile` - Name, subscription status and join date

pub mod bot;
pub mod commands;
pub mod error;
pub mod inbound;
pub mod router;
pub mod sender;

pub use bot::{BotService, TelegramBot};
pub use commands::Command;
pub use error::{Result, TelegramError};
pub use inbound::{telegram_user_from, InboundCallback, InboundMessage};
pub use router::{BotReply, BotRouter};
pub use sender::{ReplySender, TeloxideSender};
