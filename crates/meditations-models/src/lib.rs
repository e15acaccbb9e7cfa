//! Core data models for Daily Meditations.
//!
//! This crate provides the fundamental data types shared by the content
//! store, the identity and favorites services, the bot, and the client:
//! meditation items grouped into month documents, and Telegram-backed users.

pub mod ids;
pub mod meditation;
pub mod user;

// Re-export main types
pub use ids::UserId;
pub use meditation::{
    pick_today, MeditationItem, MeditationType, MeditationsDoc, MonthKey, TodayPick,
    TodaySelection,
};
pub use user::{FavoriteAction, SubscriptionStatus, TelegramUser, User};
