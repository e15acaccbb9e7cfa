//! HTTP API for Daily Meditations.
//!
//! - Content admin: read, save and delete items of a month document (localhost only)
//! - Public month documents under `/meditations/{YYYY}-{MM}.json`
//! - Telegram identity handshake and per-user favorites
//! - Bot webhook
//!
//! # Example
//!
//! ```ignore
//! use meditations_api::{ApiConfig, AppState, serve};
//! use meditations_core::AuthSettings;
//! use meditations_persistence::{ContentStore, UserStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ApiConfig::default();
//!     let state = AppState::new(
//!         config.clone(),
//!         ContentStore::new("public"),
//!         UserStore::new("state"),
//!         &AuthSettings::from_env(),
//!     );
//!
//!     serve(config, state).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod guard;
pub mod handlers;
pub mod router;
pub mod state;
pub mod types;

pub use config::{ApiConfig, DEFAULT_PORT};
pub use error::{ApiError, Result};
pub use router::{create_router, serve};
pub use state::AppState;
