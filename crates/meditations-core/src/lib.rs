//! Daily Meditations core - business logic shared by the HTTP API and the bot.
//!
//! - **config**: paths, environment files, runtime settings
//! - **identity**: Telegram handshake and user upsert
//! - **init_data**: Telegram WebApp `initData` signature verification
//! - **favorites**: per-user favorites set

pub mod config;
pub mod error;
pub mod favorites;
pub mod identity;
pub mod init_data;

pub use config::AuthSettings;
pub use error::{Result, ServiceError};
pub use favorites::{FavoriteUpdate, FavoritesService};
pub use identity::{extract_user, HandshakeRequest, IdentityService};
pub use init_data::{InitDataVerifier, VerifiedInitData};
