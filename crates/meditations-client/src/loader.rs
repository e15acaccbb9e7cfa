//! Fetches published month documents.

use std::time::Duration;

use chrono::NaiveDate;
use meditations_models::{MeditationsDoc, MonthKey};
use tracing::debug;

use crate::error::Result;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Month known to carry content; loaded when the current month has none.
pub const FALLBACK_MONTH: MonthKey = MonthKey {
    year: 2025,
    month: 9,
};

/// Loads `/meditations/{YYYY}-{MM}.json` documents from a base URL.
#[derive(Clone)]
pub struct ContentLoader {
    client: reqwest::Client,
    base_url: String,
    fallback: MonthKey,
}

impl ContentLoader {
    /// Creates a loader for the site at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Creates a loader with a custom request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            fallback: FALLBACK_MONTH,
        })
    }

    /// Overrides the fallback month.
    pub fn with_fallback_month(mut self, key: MonthKey) -> Self {
        self.fallback = key;
        self
    }

    /// URL of a month document.
    pub fn month_url(&self, key: MonthKey) -> String {
        format!("{}/meditations/{}", self.base_url, key.file_name())
    }

    /// Fetches one month document.
    ///
    /// Any failure (non-success status, network error, bad JSON) yields
    /// `None`; the cause is only logged.
    pub async fn load_meditations_doc(&self, key: MonthKey) -> Option<MeditationsDoc> {
        let url = self.month_url(key);
        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(url = %url, error = %e, "Month document request failed");
                return None;
            }
        };

        if !response.status().is_success() {
            debug!(url = %url, status = %response.status(), "Month document unavailable");
            return None;
        }

        match response.json::<MeditationsDoc>().await {
            Ok(doc) => Some(doc),
            Err(e) => {
                debug!(url = %url, error = %e, "Month document is not valid JSON");
                None
            }
        }
    }

    /// Loads the month containing `today`, else the fallback month.
    pub async fn load_with_fallback(&self, today: NaiveDate) -> Option<(MonthKey, MeditationsDoc)> {
        let current = MonthKey::from_date(today);
        if let Some(doc) = self.load_meditations_doc(current).await {
            return Some((current, doc));
        }
        if self.fallback == current {
            return None;
        }
        debug!(month = %current, fallback = %self.fallback, "Using fallback month");
        self.load_meditations_doc(self.fallback)
            .await
            .map(|doc| (self.fallback, doc))
    }
}
