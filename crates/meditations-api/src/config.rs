//! Server settings: listen address, browser origins, start time.

use std::time::{Duration, Instant};

use axum::http::HeaderValue;
use tracing::warn;

/// Port the Mini-App is served from during development.
pub const DEFAULT_PORT: u16 = 3000;

/// Loopback; the content admin is only reachable locally anyway.
pub const DEFAULT_HOST: &str = "127.0.0.1";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// Origins the Mini-App may be embedded from. Empty, or any `*` entry,
    /// lets every origin through.
    pub cors_origins: Vec<String>,
    started: Instant,
}

impl ApiConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = origins
            .into_iter()
            .map(|o| o.trim().trim_end_matches('/').to_string())
            .filter(|o| !o.is_empty())
            .collect();
        self
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.is_empty() || self.cors_origins.iter().any(|o| o == "*")
    }

    /// The configured origins as header values. `None` means any origin.
    /// Entries that aren't valid header values are skipped with a warning.
    pub fn origin_headers(&self) -> Option<Vec<HeaderValue>> {
        if self.allows_any_origin() {
            return None;
        }
        let headers = self
            .cors_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        Some(headers)
    }

    /// `host:port` for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.uptime().as_secs()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            cors_origins: Vec::new(),
            started: Instant::now(),
        }
    }
}
