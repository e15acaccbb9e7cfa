//! API request handlers.

pub mod auth;
pub mod content;
pub mod favorites;
pub mod health;
pub mod meditations;
pub mod webhook;

pub use auth::*;
pub use content::*;
pub use favorites::*;
pub use health::*;
pub use meditations::*;
pub use webhook::*;
