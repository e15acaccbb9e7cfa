//! Shared configuration for Daily Meditations.
//!
//! Locates the state and content directories and reads the runtime knobs
//! shared by the HTTP server and the bot.
//!
//! # Storage Structure
//!
//! ```text
//! ~/.daily-meditations/     # state dir
//! ├── config/
//! │   └── .env.local        # secrets (bot token)
//! └── users/                # one JSON file per user
//!
//! ./public/                 # content dir
//! └── meditations/
//!     └── 2025-09.json      # one document per month
//! ```
//!
//! # Environment Variables
//!
//! - `MEDITATIONS_STATE_DIR`: Override the state directory
//! - `MEDITATIONS_CONTENT_DIR`: Override the content directory
//! - `TELEGRAM_BOT_TOKEN`: Bot token from @BotFather
//! - `MEDITATIONS_APP_URL`: Public URL of the Mini-App (used in bot buttons)
//! - `MEDITATIONS_VERIFY_INIT_DATA`: `true` to require signed init data
//! - `MEDITATIONS_INIT_DATA_MAX_AGE`: Max init-data age in seconds

use std::path::PathBuf;
use std::sync::OnceLock;

use chrono::Duration;
use tracing::debug;

/// Environment variable for custom state directory.
pub const STATE_DIR_ENV: &str = "MEDITATIONS_STATE_DIR";

/// Environment variable for custom content directory.
pub const CONTENT_DIR_ENV: &str = "MEDITATIONS_CONTENT_DIR";

/// Environment variable holding the bot token.
pub const BOT_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";

/// Environment variable holding the Mini-App URL.
pub const APP_URL_ENV: &str = "MEDITATIONS_APP_URL";

/// Environment variable enabling init-data signature checks.
pub const VERIFY_INIT_DATA_ENV: &str = "MEDITATIONS_VERIFY_INIT_DATA";

/// Environment variable with the max accepted init-data age (seconds).
pub const INIT_DATA_MAX_AGE_ENV: &str = "MEDITATIONS_INIT_DATA_MAX_AGE";

/// Mini-App URL used when none is configured.
pub const DEFAULT_APP_URL: &str = "https://localhost:3000";

const DEFAULT_STATE_DIR: &str = ".daily-meditations";
const DEFAULT_CONTENT_DIR: &str = "public";

static STATE_DIR_CACHE: OnceLock<PathBuf> = OnceLock::new();

/// Get the state directory.
///
/// The state directory is determined by:
/// 1. `MEDITATIONS_STATE_DIR` environment variable if set
/// 2. `~/.daily-meditations` if home directory is available
/// 3. `.daily-meditations` in current directory as fallback
pub fn state_dir() -> PathBuf {
    STATE_DIR_CACHE
        .get_or_init(|| {
            std::env::var(STATE_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    dirs::home_dir()
                        .map(|h| h.join(DEFAULT_STATE_DIR))
                        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
                })
        })
        .clone()
}

/// Get the content directory (parent of `meditations/`).
///
/// Defaults to `./public`, the directory the Mini-App serves static files from.
pub fn content_dir() -> PathBuf {
    std::env::var(CONTENT_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONTENT_DIR))
}

/// Get the config directory.
pub fn config_dir() -> PathBuf {
    state_dir().join("config")
}

/// Get the .env.local file path for secrets.
pub fn env_file() -> PathBuf {
    config_dir().join(".env.local")
}

/// Loads environment files: the config directory's `.env.local` first, then
/// `.env.local` or `.env` in the working directory. Existing variables win.
pub fn load_env() {
    let env_path = env_file();
    if env_path.exists() {
        let _ = dotenvy::from_path(&env_path);
    }
    let _ = dotenvy::from_filename(".env.local").or_else(|_| dotenvy::dotenv());
}

/// Ensure the state and content directories exist.
///
/// # Errors
/// Returns an error if a directory cannot be created.
pub fn ensure_all_dirs() -> std::io::Result<()> {
    std::fs::create_dir_all(config_dir())?;
    std::fs::create_dir_all(state_dir().join("users"))?;
    std::fs::create_dir_all(content_dir().join("meditations"))?;
    Ok(())
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// The configured bot token, if any.
pub fn bot_token() -> Option<String> {
    non_empty_var(BOT_TOKEN_ENV)
}

/// The public Mini-App URL, without a trailing slash.
pub fn app_url() -> String {
    non_empty_var(APP_URL_ENV)
        .unwrap_or_else(|| DEFAULT_APP_URL.to_string())
        .trim_end_matches('/')
        .to_string()
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Settings for the identity handshake.
#[derive(Debug, Clone, Default)]
pub struct AuthSettings {
    /// Bot token used as the HMAC secret source.
    pub bot_token: Option<String>,
    /// Whether handshakes must carry verifiable `initData`.
    pub verify_init_data: bool,
    /// Reject init data older than this.
    pub max_age: Option<Duration>,
}

impl AuthSettings {
    /// Reads the settings from the environment.
    pub fn from_env() -> Self {
        let settings = Self {
            bot_token: bot_token(),
            verify_init_data: non_empty_var(VERIFY_INIT_DATA_ENV)
                .is_some_and(|v| parse_flag(&v)),
            max_age: non_empty_var(INIT_DATA_MAX_AGE_ENV)
                .and_then(|v| v.parse::<i64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::seconds),
        };
        debug!(
            verify_init_data = settings.verify_init_data,
            has_token = settings.bot_token.is_some(),
            "Auth settings loaded"
        );
        settings
    }

    /// Returns the token when signature checks are on and possible.
    pub fn verification_token(&self) -> Option<&str> {
        if self.verify_init_data {
            self.bot_token.as_deref()
        } else {
            None
        }
    }
}
