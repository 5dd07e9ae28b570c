//! Axum router configuration with middleware.
//!
//! The webhook lives at the configured `api_path`; inspection routes are
//! under `/api/v1/`. Middleware: CORS, tracing.

use axum::Router;
use axum::extract::State;
use axum::routing::{delete, get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route(
            "/sessions",
            delete(handlers::session::reset_all_sessions),
        )
        .route(
            "/sessions/{chat_id}",
            delete(handlers::session::reset_session),
        )
        .route(
            "/sessions/{chat_id}/messages",
            get(handlers::session::get_messages),
        );

    let event_path = normalize_path(&state.config.server.api_path);

    Router::new()
        .route(&event_path, post(handlers::event::receive_event))
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim();
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// GET /health - liveness plus session and event counters.
async fn health_check(State(state): State<AppState>) -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "sessions": state.sessions.len(),
        "events": state.dispatcher.stats(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use chatbridge_core::backend::{AskBackend, BoxAskBackend};
    use chatbridge_core::bridge::BoxReplier;
    use chatbridge_infra::reply::LogReplier;
    use chatbridge_types::backend::{AskRequest, AskResponse, BackendError};
    use chatbridge_types::config::BridgeConfig;

    struct EchoBackend;

    impl AskBackend for EchoBackend {
        fn name(&self) -> &str {
            "echo"
        }

        async fn ask(&self, request: &AskRequest) -> Result<AskResponse, BackendError> {
            Ok(AskResponse::Plain {
                text: format!("echo: {}", request.question),
                conversation_id: "conv-1".to_string(),
                message_id: "msg-1".to_string(),
            })
        }
    }

    fn state_with(config: BridgeConfig) -> AppState {
        AppState::from_parts(
            config,
            BoxAskBackend::new(EchoBackend),
            BoxReplier::new(LogReplier),
        )
    }

    fn event_json(event_id: &str, chat_id: &str, text: &str) -> String {
        json!({
            "event_id": event_id,
            "chat_id": chat_id,
            "chat_kind": "direct",
            "sender_id": "ou_1",
            "text": text
        })
        .to_string()
    }

    fn post_event(path: &str, body: String, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        builder.body(Body::from(body)).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(state_with(BridgeConfig::default()));
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["sessions"], 0);
        assert_eq!(body["events"]["completed"], 0);
    }

    #[tokio::test]
    async fn test_event_is_accepted_and_answered() {
        let state = state_with(BridgeConfig::default());
        let app = build_router(state.clone());

        let response = app
            .clone()
            .oneshot(post_event("/", event_json("evt-1", "oc_1", "hello"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let body = body_json(response).await;
        assert_eq!(body["data"]["status"], "accepted");
        assert_eq!(body["data"]["event_id"], "evt-1");

        let stats = state.dispatcher.drain().await;
        assert_eq!(stats.completed, 1);

        let response = app
            .oneshot(
                Request::get("/api/v1/sessions/oc_1/messages")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let messages = body["data"]["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["text"], "hello");
        assert_eq!(messages[1]["text"], "echo: hello");
        assert_eq!(body["data"]["state"]["conversation_id"], "conv-1");
        assert_eq!(body["data"]["max_messages"], 50);
    }

    #[tokio::test]
    async fn test_event_on_configured_path() {
        let mut config = BridgeConfig::default();
        config.server.api_path = "webhook/event".to_string();
        let app = build_router(state_with(config));

        let response = app
            .oneshot(post_event(
                "/webhook/event",
                event_json("evt-1", "oc_1", "hi"),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_event_requires_token_when_configured() {
        let mut config = BridgeConfig::default();
        config.server.verification_token = Some("secret".to_string());
        let app = build_router(state_with(config));

        let missing = app
            .clone()
            .oneshot(post_event("/", event_json("evt-1", "oc_1", "hi"), None))
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(missing).await;
        assert_eq!(body["errors"][0]["code"], "UNAUTHORIZED");

        let wrong = app
            .clone()
            .oneshot(post_event("/", event_json("evt-1", "oc_1", "hi"), Some("nope")))
            .await
            .unwrap();
        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

        let ok = app
            .oneshot(post_event("/", event_json("evt-1", "oc_1", "hi"), Some("secret")))
            .await
            .unwrap();
        assert_eq!(ok.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_malformed_event_is_rejected() {
        let app = build_router(state_with(BridgeConfig::default()));
        let response = app
            .oneshot(post_event("/", "{\"event_id\": 1}".to_string(), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["errors"][0]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_event_after_shutdown_is_unavailable() {
        let state = state_with(BridgeConfig::default());
        state.dispatcher.cancel();
        let app = build_router(state);

        let response = app
            .oneshot(post_event("/", event_json("evt-1", "oc_1", "hi"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_unknown_session_messages_is_not_found() {
        let app = build_router(state_with(BridgeConfig::default()));
        let response = app
            .oneshot(
                Request::get("/api/v1/sessions/missing/messages")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["errors"][0]["code"], "SESSION_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_reset_routes() {
        let state = state_with(BridgeConfig::default());
        let app = build_router(state.clone());

        for (id, chat) in [("evt-1", "oc_1"), ("evt-2", "oc_2")] {
            app.clone()
                .oneshot(post_event("/", event_json(id, chat, "hello"), None))
                .await
                .unwrap();
        }
        state.dispatcher.drain().await;
        assert_eq!(state.sessions.len(), 2);

        let response = app
            .clone()
            .oneshot(
                Request::delete("/api/v1/sessions/oc_1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"]["remaining"], 1);
        assert!(state.sessions.get("oc_1").is_none());

        let response = app
            .oneshot(Request::delete("/api/v1/sessions").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(state.sessions.is_empty());
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("events"), "/events");
        assert_eq!(normalize_path(" /hook "), "/hook");
    }
}
