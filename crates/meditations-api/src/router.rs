//! Router configuration and server setup.

use std::net::SocketAddr;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::info;

use crate::config::ApiConfig;
use crate::guard::local_admin_only;
use crate::handlers;
use crate::state::AppState;

fn cors_layer(config: &ApiConfig) -> CorsLayer {
    let origin = match config.origin_headers() {
        Some(origins) => AllowOrigin::list(origins),
        None => AllowOrigin::any(),
    };
    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Creates the API router with all routes configured.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        // Health
        .route("/api/health", get(handlers::health))
        // Content admin
        .route(
            "/api/admin/meditations",
            get(handlers::get_month)
                .post(handlers::save_item)
                .delete(handlers::delete_item),
        )
        // Public content
        .route("/meditations/:file", get(handlers::month_document))
        // Identity and favorites
        .route("/api/auth/telegram", post(handlers::authenticate))
        .route(
            "/api/user/favorites",
            get(handlers::get_favorites).post(handlers::set_favorite),
        )
        // Bot
        .route(
            "/api/telegram/webhook",
            get(handlers::webhook_status).post(handlers::telegram_webhook),
        )
        .fallback(handlers::not_found)
        // Apply middleware
        .layer(middleware::from_fn(local_admin_only))
        .layer(cors)
        .with_state(state)
}

/// Starts the API server.
///
/// Peer addresses are recorded so the admin guard can refuse remote callers.
pub async fn serve(config: ApiConfig, state: AppState) -> Result<(), std::io::Error> {
    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("API server listening on {}", addr);
    axum::serve(
        listener,
        create_router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::extract::ConnectInfo;
    use axum::http::{header, HeaderValue, Request, StatusCode};
    use axum_test::{TestResponse, TestServer};
    use meditations_core::AuthSettings;
    use meditations_persistence::{ContentStore, UserStore};
    use meditations_telegram::{BotReply, BotService, ReplySender};
    use serde_json::{json, Value};
    use tempfile::tempdir;
    use tower::ServiceExt;

    fn make_test_state() -> AppState {
        let dir = tempdir().unwrap();
        let path = dir.path().to_path_buf();
        std::mem::forget(dir);

        AppState::new(
            ApiConfig::default(),
            ContentStore::new(path.join("public")),
            UserStore::new(path.join("state")),
            &AuthSettings::default(),
        )
    }

    fn local() -> HeaderValue {
        HeaderValue::from_static("localhost:3000")
    }

    async fn get_local(server: &TestServer, path: &str) -> TestResponse {
        server.get(path).add_header(header::HOST, local()).await
    }

    #[derive(Default)]
    struct RecordingSender {
        sent: Mutex<Vec<BotReply>>,
    }

    #[async_trait]
    impl ReplySender for RecordingSender {
        async fn send(&self, reply: &BotReply) -> meditations_telegram::Result<()> {
            self.sent.lock().unwrap().push(reply.clone());
            Ok(())
        }

        async fn answer_callback(&self, _callback_id: &str) -> meditations_telegram::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let server = TestServer::new(create_router(make_test_state())).unwrap();

        let response = server.get("/api/health").await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["users"], 0);
    }

    #[tokio::test]
    async fn test_cors_headers() {
        let server = TestServer::new(create_router(make_test_state())).unwrap();

        let response = server
            .get("/api/health")
            .add_header(header::ORIGIN, HeaderValue::from_static("https://web.telegram.org"))
            .await;

        assert!(response.headers().contains_key("access-control-allow-origin"));
    }

    #[tokio::test]
    async fn test_admin_save_read_delete() {
        let server = TestServer::new(create_router(make_test_state())).unwrap();

        let response = server
            .post("/api/admin/meditations")
            .add_header(header::HOST, local())
            .json(&json!({
                "id": "x1",
                "day": "2025-09-03",
                "type": "morning",
                "title": "Sunrise"
            }))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["ok"], true);
        assert_eq!(body["doc"]["items"][0]["id"], "x1");

        let response = get_local(&server, "/api/admin/meditations?year=2025&month=9").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["doc"]["items"].as_array().unwrap().len(), 1);
        assert_eq!(body["doc"]["items"][0]["title"], "Sunrise");

        let response = server
            .delete("/api/admin/meditations?id=x1&year=2025&month=9")
            .add_header(header::HOST, local())
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert!(body["doc"]["items"].as_array().unwrap().is_empty());

        let response = get_local(&server, "/api/admin/meditations?year=2025&month=9").await;
        let body: Value = response.json();
        assert!(body["doc"]["items"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_admin_requires_year_and_month() {
        let server = TestServer::new(create_router(make_test_state())).unwrap();

        let response = get_local(&server, "/api/admin/meditations?year=2025").await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body, json!({"ok": false, "error": "year/month required"}));

        let response = server
            .delete("/api/admin/meditations?year=2025&month=9")
            .add_header(header::HOST, local())
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "id/year/month required");
    }

    #[tokio::test]
    async fn test_admin_rejects_invalid_day() {
        let server = TestServer::new(create_router(make_test_state())).unwrap();

        let response = server
            .post("/api/admin/meditations")
            .add_header(header::HOST, local())
            .json(&json!({"id": "x1", "day": "2025-02-30"}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["ok"], false);
    }

    #[tokio::test]
    async fn test_admin_revision_conflict() {
        let server = TestServer::new(create_router(make_test_state())).unwrap();
        let item = json!({"id": "x1", "day": "2025-09-03", "type": "evening"});

        server
            .post("/api/admin/meditations")
            .add_header(header::HOST, local())
            .json(&item)
            .await
            .assert_status_ok();

        let mut stale = item.clone();
        stale["expectedRevision"] = json!(0);
        let response = server
            .post("/api/admin/meditations")
            .add_header(header::HOST, local())
            .json(&stale)
            .await;
        response.assert_status(StatusCode::CONFLICT);

        let mut fresh = item.clone();
        fresh["expectedRevision"] = json!(1);
        server
            .post("/api/admin/meditations")
            .add_header(header::HOST, local())
            .json(&fresh)
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn test_admin_move_between_months() {
        let server = TestServer::new(create_router(make_test_state())).unwrap();

        server
            .post("/api/admin/meditations")
            .add_header(header::HOST, local())
            .json(&json!({"id": "x1", "day": "2025-09-30"}))
            .await
            .assert_status_ok();

        let response = server
            .post("/api/admin/meditations")
            .add_header(header::HOST, local())
            .json(&json!({"id": "x1", "day": "2025-10-01", "previousDay": "2025-09-30"}))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["doc"]["items"][0]["day"], "2025-10-01");

        let body: Value = get_local(&server, "/api/admin/meditations?year=2025&month=9")
            .await
            .json();
        assert!(body["doc"]["items"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_admin_rejects_invalid_previous_day() {
        let server = TestServer::new(create_router(make_test_state())).unwrap();

        server
            .post("/api/admin/meditations")
            .add_header(header::HOST, local())
            .json(&json!({"id": "x1", "day": "2025-09-30"}))
            .await
            .assert_status_ok();

        let response = server
            .post("/api/admin/meditations")
            .add_header(header::HOST, local())
            .json(&json!({"id": "x1", "day": "2025-10-01", "previousDay": "30/09/2025"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body: Value = get_local(&server, "/api/admin/meditations?year=2025&month=10")
            .await
            .json();
        assert!(body["doc"]["items"].as_array().unwrap().is_empty());
        let body: Value = get_local(&server, "/api/admin/meditations?year=2025&month=9")
            .await
            .json();
        assert_eq!(body["doc"]["items"][0]["day"], "2025-09-30");
    }

    #[tokio::test]
    async fn test_admin_refused_off_localhost() {
        let app = create_router(make_test_state());

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/admin/meditations?year=2025&month=9")
                    .header(header::HOST, "meditations.example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({"ok": false, "error": "forbidden"}));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/admin")
                    .header(header::HOST, "meditations.example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.status().is_redirection());
        assert_eq!(response.headers()[header::LOCATION], "/");
    }

    #[tokio::test]
    async fn test_admin_allowed_on_loopback_ip() {
        let app = create_router(make_test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/admin/meditations?year=2025&month=9")
                    .header(header::HOST, "127.0.0.1:3000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_admin_refused_for_remote_peer_claiming_localhost() {
        let app = create_router(make_test_state());
        let admin_request = |peer: SocketAddr| {
            let mut req = Request::builder()
                .uri("/api/admin/meditations?year=2025&month=9")
                .header(header::HOST, "localhost")
                .body(Body::empty())
                .unwrap();
            req.extensions_mut().insert(ConnectInfo(peer));
            req
        };

        let response = app
            .clone()
            .oneshot(admin_request(SocketAddr::from(([203, 0, 113, 7], 40000))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .oneshot(admin_request(SocketAddr::from(([127, 0, 0, 1], 40000))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_public_month_document() {
        let state = make_test_state();
        state
            .content
            .upsert_item(meditations_models::MeditationItem::new(
                "x1",
                "2025-09-03",
                meditations_models::MeditationType::Morning,
            ))
            .unwrap();
        let server = TestServer::new(create_router(state)).unwrap();

        let response = server.get("/meditations/2025-09.json").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["items"][0]["id"], "x1");

        server
            .get("/meditations/2025-10.json")
            .await
            .assert_status(StatusCode::NOT_FOUND);
        server
            .get("/meditations/september.json")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_auth_handshake() {
        let state = make_test_state();
        let server = TestServer::new(create_router(state.clone())).unwrap();

        let response = server
            .post("/api/auth/telegram")
            .json(&json!({"initDataUnsafe": {"user": {"id": 42, "first_name": "Ann"}}}))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["ok"], true);
        assert_eq!(body["user"]["telegramId"], 42);
        assert_eq!(body["user"]["favoriteMeditations"], json!([]));
        assert_eq!(body["initDataPresent"], false);

        // Same user again: refreshed, not duplicated.
        server
            .post("/api/auth/telegram")
            .json(&json!({"initDataUnsafe": {"user": {"id": 42, "first_name": "Anna"}}}))
            .await
            .assert_status_ok();
        assert_eq!(state.users.count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_auth_without_user() {
        let state = make_test_state();
        let server = TestServer::new(create_router(state.clone())).unwrap();

        let response = server
            .post("/api/auth/telegram")
            .json(&json!({"initDataUnsafe": {}}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body, json!({"ok": false, "error": "no_user"}));
        assert_eq!(state.users.count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_auth_signed_mode() {
        let dir = tempdir().unwrap();
        let auth = AuthSettings {
            bot_token: Some("1:abc".to_string()),
            verify_init_data: true,
            max_age: None,
        };
        let state = AppState::new(
            ApiConfig::default(),
            ContentStore::new(dir.path()),
            UserStore::new(dir.path()),
            &auth,
        );
        let server = TestServer::new(create_router(state)).unwrap();

        let signed = meditations_core::InitDataVerifier::new("1:abc")
            .sign(&[("user", r#"{"id":7,"first_name":"Bo"}"#), ("auth_date", "1")]);
        let response = server
            .post("/api/auth/telegram")
            .add_header(
                axum::http::HeaderName::from_static("x-telegram-init-data"),
                HeaderValue::from_str(&signed).unwrap(),
            )
            .json(&json!({}))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["user"]["telegramId"], 7);
        assert_eq!(body["initDataPresent"], true);

        let forged = meditations_core::InitDataVerifier::new("2:other")
            .sign(&[("user", r#"{"id":7,"first_name":"Bo"}"#)]);
        let response = server
            .post("/api/auth/telegram")
            .json(&json!({"initData": forged}))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: Value = response.json();
        assert_eq!(body["error"], "invalid_init_data");
    }

    #[tokio::test]
    async fn test_favorites_flow() {
        let state = make_test_state();
        let server = TestServer::new(create_router(state)).unwrap();

        server
            .post("/api/auth/telegram")
            .json(&json!({"initDataUnsafe": {"user": {"id": 42, "first_name": "Ann"}}}))
            .await
            .assert_status_ok();

        let response = server
            .post("/api/user/favorites")
            .json(&json!({"telegramId": 42, "meditationId": "m1", "action": "add"}))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body, json!({"favorites": ["m1"], "isFavorite": true}));

        // Toggle with a string id removes it again.
        let body: Value = server
            .post("/api/user/favorites")
            .json(&json!({"telegramId": "42", "meditationId": "m1"}))
            .await
            .json();
        assert_eq!(body, json!({"favorites": [], "isFavorite": false}));

        let body: Value = server.get("/api/user/favorites?telegramId=42").await.json();
        assert_eq!(body, json!({"favorites": []}));
    }

    #[tokio::test]
    async fn test_favorites_validation() {
        let server = TestServer::new(create_router(make_test_state())).unwrap();

        let response = server.get("/api/user/favorites").await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "telegramId is required");

        let body: Value = server.get("/api/user/favorites?telegramId=999").await.json();
        assert_eq!(body, json!({"favorites": []}));

        let response = server
            .post("/api/user/favorites")
            .json(&json!({"telegramId": 42}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = server
            .post("/api/user/favorites")
            .json(&json!({"telegramId": 42, "meditationId": "m1"}))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body, json!({"ok": false, "error": "User not found"}));
    }

    #[tokio::test]
    async fn test_webhook_without_bot() {
        let server = TestServer::new(create_router(make_test_state())).unwrap();

        let response = server
            .post("/api/telegram/webhook")
            .json(&json!({"update_id": 1}))
            .await;
        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

        let body: Value = server.get("/api/telegram/webhook").await.json();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["bot_token_configured"], false);
    }

    #[tokio::test]
    async fn test_webhook_dispatches_to_bot() {
        let state = make_test_state();
        let sender = Arc::new(RecordingSender::default());
        let bot = Arc::new(BotService::new(
            state.bot_router("https://meditations.example"),
            sender.clone(),
        ));
        let server = TestServer::new(create_router(state.with_bot(bot))).unwrap();

        let response = server
            .post("/api/telegram/webhook")
            .json(&json!({
                "update_id": 1,
                "message": {
                    "message_id": 10,
                    "date": 1_756_900_000,
                    "chat": {"id": 7, "type": "private", "first_name": "Bo"},
                    "from": {"id": 7, "is_bot": false, "first_name": "Bo"},
                    "text": "hello there"
                }
            }))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body, json!({"ok": true}));

        let sent = sender.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].text, "hello there");
    }
}
