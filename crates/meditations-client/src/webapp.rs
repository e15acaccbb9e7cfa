//! Mini-App launch sequence.
//!
//! On launch the host is told the app is ready and asked to expand, then the
//! identity handshake runs at most once per session, and only when the
//! launch payload carries a user id.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use meditations_models::User;
use serde_json::Value;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::error::Result;

/// The Telegram WebApp surface the app runs inside.
pub trait WebAppHost: Send + Sync {
    /// Signals the host that the app has rendered.
    fn ready(&self);
    /// Asks the host to use the full viewport.
    fn expand(&self);
    /// Raw signed launch string, if any.
    fn init_data(&self) -> Option<String>;
    /// Parsed launch payload, if any.
    fn init_data_unsafe(&self) -> Option<Value>;
}

fn payload_user_id(payload: Option<&Value>) -> Option<i64> {
    payload?.get("user")?.get("id")?.as_i64()
}

/// One Mini-App session.
pub struct LaunchSession<H: WebAppHost> {
    host: H,
    api: ApiClient,
    launched: AtomicBool,
    auth_attempted: AtomicBool,
    handshake: AsyncMutex<()>,
    user: Mutex<Option<User>>,
}

impl<H: WebAppHost> LaunchSession<H> {
    pub fn new(host: H, api: ApiClient) -> Self {
        Self {
            host,
            api,
            launched: AtomicBool::new(false),
            auth_attempted: AtomicBool::new(false),
            handshake: AsyncMutex::new(()),
            user: Mutex::new(None),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Readies and expands the host once, then authenticates.
    pub async fn launch(&self) -> Result<Option<User>> {
        if !self.launched.swap(true, Ordering::SeqCst) {
            self.host.ready();
            self.host.expand();
        }
        self.ensure_authenticated().await
    }

    /// The user from the handshake, if it has completed.
    pub fn current_user(&self) -> Option<User> {
        self.user.lock().ok().and_then(|guard| guard.clone())
    }

    /// Whether a handshake has been attempted in this session.
    pub fn auth_attempted(&self) -> bool {
        self.auth_attempted.load(Ordering::SeqCst)
    }

    /// Performs the handshake if it has not been attempted yet.
    ///
    /// Without a user id in the launch payload nothing is sent and a later
    /// call may still try. A failed handshake is not retried. Calls made
    /// while the handshake is in flight wait for it and get its user.
    pub async fn ensure_authenticated(&self) -> Result<Option<User>> {
        let payload = self.host.init_data_unsafe();
        if payload_user_id(payload.as_ref()).is_none() {
            debug!("Launch payload has no user; skipping handshake");
            return Ok(None);
        }

        let _handshake = self.handshake.lock().await;
        if self.auth_attempted.swap(true, Ordering::SeqCst) {
            return Ok(self.current_user());
        }

        let init_data = self.host.init_data().filter(|s| !s.is_empty());
        match self.api.authenticate(payload, init_data).await {
            Ok(user) => {
                if let Ok(mut slot) = self.user.lock() {
                    *slot = Some(user.clone());
                }
                Ok(Some(user))
            }
            Err(e) => {
                warn!(error = %e, "Identity handshake failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct FakeHost {
        payload: Option<Value>,
        ready_calls: AtomicUsize,
        expand_calls: AtomicUsize,
    }

    impl WebAppHost for FakeHost {
        fn ready(&self) {
            self.ready_calls.fetch_add(1, Ordering::SeqCst);
        }
        fn expand(&self) {
            self.expand_calls.fetch_add(1, Ordering::SeqCst);
        }
        fn init_data(&self) -> Option<String> {
            None
        }
        fn init_data_unsafe(&self) -> Option<Value> {
            self.payload.clone()
        }
    }

    fn unreachable_api() -> ApiClient {
        ApiClient::new("http://127.0.0.1:9").unwrap()
    }

    #[test]
    fn test_payload_user_id() {
        assert_eq!(payload_user_id(Some(&json!({"user": {"id": 3}}))), Some(3));
        assert_eq!(payload_user_id(Some(&json!({"user": {}}))), None);
        assert_eq!(payload_user_id(Some(&json!({}))), None);
        assert_eq!(payload_user_id(None), None);
    }

    #[tokio::test]
    async fn test_launch_without_user_skips_handshake() {
        let session = LaunchSession::new(FakeHost::default(), unreachable_api());

        assert!(session.launch().await.unwrap().is_none());
        assert!(session.launch().await.unwrap().is_none());

        assert_eq!(session.host().ready_calls.load(Ordering::SeqCst), 1);
        assert_eq!(session.host().expand_calls.load(Ordering::SeqCst), 1);
        assert!(!session.auth_attempted());
    }

    #[tokio::test]
    async fn test_failed_handshake_is_not_retried() {
        let host = FakeHost {
            payload: Some(json!({"user": {"id": 42, "first_name": "Ann"}})),
            ..Default::default()
        };
        let session = LaunchSession::new(host, unreachable_api());

        assert!(session.ensure_authenticated().await.is_err());
        assert!(session.auth_attempted());
        assert!(session.ensure_authenticated().await.unwrap().is_none());
    }
}
