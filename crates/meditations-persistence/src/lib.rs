//! Persistence layer for Daily Meditations.
//!
//! Two stores, both plain JSON on disk and written atomically (temp file,
//! then rename):
//!
//! - [`ContentStore`]: meditation items sharded into one document per month
//! - [`UserStore`]: one file per user, keyed by Telegram id
//!
//! # Example
//!
//! ```no_run
//! use meditations_models::{MeditationItem, MeditationType, MonthKey};
//! use meditations_persistence::ContentStore;
//!
//! let store = ContentStore::new("/srv/meditations/public");
//!
//! let item = MeditationItem::new("x1", "2025-09-03", MeditationType::Morning);
//! store.upsert_item(item).unwrap();
//!
//! let doc = store.read_month(MonthKey::new(2025, 9).unwrap());
//! assert_eq!(doc.items.len(), 1);
//! ```

pub mod atomic;
pub mod content_store;
pub mod error;
pub mod user_store;

pub use content_store::ContentStore;
pub use error::{PersistenceError, Result};
pub use user_store::UserStore;
