//! Error types for the identity and favorites services.

use meditations_persistence::PersistenceError;
use thiserror::Error;

/// Errors returned by the services in this crate.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The handshake payload carries no user with a numeric id.
    #[error("no user identity in payload")]
    NoUser,

    /// Signature checks are on but no raw `initData` was supplied.
    #[error("init data required")]
    MissingInitData,

    /// The raw `initData` failed verification.
    #[error("invalid init data: {0}")]
    InvalidInitData(String),

    /// The raw `initData` is signed correctly but too old.
    #[error("init data expired")]
    InitDataExpired,

    /// No user with this Telegram id.
    #[error("user not found: {0}")]
    UserNotFound(i64),

    /// Storage failure.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Result type for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;
