//! Mini-App side client for Daily Meditations.
//!
//! Loads month documents from the public site, picks today's morning and
//! evening items, and talks to the identity and favorites API.

pub mod api;
pub mod error;
pub mod loader;
pub mod webapp;

pub use api::{ApiClient, FavoriteState};
pub use error::{ClientError, Result};
pub use loader::{ContentLoader, FALLBACK_MONTH};
pub use meditations_models::{pick_today, TodayPick, TodaySelection};
pub use webapp::{LaunchSession, WebAppHost};
