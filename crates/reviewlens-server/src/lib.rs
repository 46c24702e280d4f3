//! ReviewLens Server - HTTP API server.
//!
//! This crate exposes the review analyzer over HTTP.
//!
//! ## Endpoints
//!
//! - `POST /analyze` - Analyze one review
//! - `POST /analyze/batch` - Analyze up to 100 reviews
//! - `GET /health` - Threshold, word-set, and cache sizes
//! - `POST /cache/clear` - Empty both result caches
//!
//! ## Example
//!
//! ```no_run
//! use reviewlens_server::{AppState, Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let state = AppState::with_lexicon().unwrap();
//!     let server = Server::with_state(ServerConfig::default(), state).unwrap();
//!     server.run().await.unwrap();
//! }
//! ```

pub mod error;
pub mod extract;
mod handlers;
pub mod models;
pub mod state;

use std::net::SocketAddr;

use axum::routing::{get, post};
use axum::Router;
use socket2::{Domain, Protocol, Socket, Type};
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use reviewlens_core::ReviewAnalyzer;

pub use error::{ApiError, Result};
pub use state::AppState;

/// Default server port.
pub const DEFAULT_PORT: u16 = 8000;

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to (default: 0.0.0.0).
    pub host: String,
    /// Port to bind to (default: 8000).
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// Sets the host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

/// Server error types.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to address.
    #[error("failed to bind to {0}: {1}")]
    BindError(SocketAddr, std::io::Error),

    /// Server runtime error.
    #[error("server error: {0}")]
    Runtime(String),
}

/// Builds the API router over the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/analyze", post(handlers::analyze))
        .route("/analyze/batch", post(handlers::analyze_batch))
        .route("/health", get(handlers::health))
        .route("/cache/clear", post(handlers::clear_cache))
        .with_state(state)
}

/// The HTTP API server.
pub struct Server {
    router: Router,
    addr: SocketAddr,
}

impl Server {
    /// Creates a server around an analyzer.
    pub fn new(
        config: ServerConfig,
        analyzer: ReviewAnalyzer,
    ) -> std::result::Result<Self, ServerError> {
        Self::with_state(config, AppState::new(analyzer))
    }

    /// Creates a server with custom application state.
    pub fn with_state(
        config: ServerConfig,
        state: AppState,
    ) -> std::result::Result<Self, ServerError> {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let router = router(state).layer(cors);

        let addr = format!("{}:{}", config.host, config.port)
            .parse()
            .map_err(|e| ServerError::Runtime(format!("invalid address: {}", e)))?;

        Ok(Self { router, addr })
    }

    /// Returns the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Runs the server until shutdown.
    pub async fn run(self) -> std::result::Result<(), ServerError> {
        info!("Starting ReviewLens API server on {}", self.addr);

        let socket = Socket::new(Domain::for_address(self.addr), Type::STREAM, Some(Protocol::TCP))
            .map_err(|e| ServerError::BindError(self.addr, e))?;

        // Allow quick restarts while old sockets sit in TIME_WAIT
        socket
            .set_reuse_address(true)
            .map_err(|e| ServerError::BindError(self.addr, e))?;

        socket
            .bind(&self.addr.into())
            .map_err(|e| ServerError::BindError(self.addr, e))?;
        socket
            .listen(1024)
            .map_err(|e| ServerError::BindError(self.addr, e))?;
        socket
            .set_nonblocking(true)
            .map_err(|e| ServerError::BindError(self.addr, e))?;

        let std_listener: std::net::TcpListener = socket.into();
        let listener = tokio::net::TcpListener::from_std(std_listener)
            .map_err(|e| ServerError::BindError(self.addr, e))?;

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServerError::Runtime(e.to_string()))?;

        info!("ReviewLens API server stopped");
        Ok(())
    }

    /// Returns the router for testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use reviewlens_core::{
        AnalyzerConfig, CapabilityError, Prediction, RegexTokenizer, SentimentModel,
        TokenSequence,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    struct OfflineModel;

    impl SentimentModel for OfflineModel {
        fn classify(
            &self,
            _tokens: &TokenSequence,
        ) -> std::result::Result<Prediction, CapabilityError> {
            Err(CapabilityError::Inference("model offline".to_string()))
        }

        fn name(&self) -> &'static str {
            "offline"
        }
    }

    fn create_test_app() -> Router {
        router(AppState::with_lexicon().unwrap())
    }

    fn create_offline_app() -> Router {
        let analyzer = ReviewAnalyzer::new(
            &AnalyzerConfig::default(),
            Arc::new(RegexTokenizer::new()),
            Arc::new(OfflineModel),
        )
        .unwrap();
        router(AppState::new(analyzer))
    }

    async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_analyze_positive_review() {
        let (status, json) = send(
            create_test_app(),
            "POST",
            "/analyze",
            Some(json!({"review_id": 1, "content": "这个产品非常好用，我很喜欢！"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["review_id"], 1);
        assert_eq!(json["sentiment"], "positive");
        assert!(json["sentiment_score"].as_f64().unwrap() >= 0.75);
        assert_eq!(json["is_appropriate"], true);
        assert_eq!(json["inappropriate_reasons"], json!([]));
    }

    #[tokio::test]
    async fn test_analyze_flags_sensitive_content() {
        let (status, json) = send(
            create_test_app(),
            "POST",
            "/analyze",
            Some(json!({"review_id": 2, "content": "客服说可以赌博，联系 13812345678"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["is_appropriate"], false);
        assert_eq!(
            json["inappropriate_reasons"],
            json!(["sensitive_word:赌博", "pattern:personal_info"])
        );
    }

    #[tokio::test]
    async fn test_analyze_blank_content_is_bad_request() {
        let (status, json) = send(
            create_test_app(),
            "POST",
            "/analyze",
            Some(json!({"review_id": 3, "content": "   "})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "invalid_input");
    }

    #[tokio::test]
    async fn test_analyze_model_failure_is_service_unavailable() {
        let (status, json) = send(
            create_offline_app(),
            "POST",
            "/analyze",
            Some(json!({"review_id": 4, "content": "还行"})),
        )
        .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["code"], "scoring_unavailable");
    }

    #[tokio::test]
    async fn test_batch_preserves_order_and_isolates_failures() {
        let (status, json) = send(
            create_test_app(),
            "POST",
            "/analyze/batch",
            Some(json!({"reviews": [
                {"review_id": 10, "content": "质量很好"},
                {"review_id": 11, "content": ""},
                {"review_id": 12, "content": "诈骗"}
            ]})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total"], 3);
        assert_eq!(json["inappropriate_count"], 1);

        let results = json["results"].as_array().unwrap();
        let ids: Vec<_> = results.iter().map(|r| r["review_id"].as_i64().unwrap()).collect();
        assert_eq!(ids, vec![10, 11, 12]);
        assert_eq!(results[1]["error"]["code"], "invalid_input");
        assert_eq!(results[2]["is_appropriate"], false);
    }

    #[tokio::test]
    async fn test_batch_empty_is_bad_request() {
        let (status, json) = send(
            create_test_app(),
            "POST",
            "/analyze/batch",
            Some(json!({"reviews": []})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "empty_batch");
    }

    #[tokio::test]
    async fn test_batch_too_large_is_bad_request() {
        let reviews: Vec<_> = (0..101)
            .map(|i| json!({"review_id": i, "content": "不错"}))
            .collect();
        let (status, json) = send(
            create_test_app(),
            "POST",
            "/analyze/batch",
            Some(json!({ "reviews": reviews })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "batch_too_large");
    }

    #[tokio::test]
    async fn test_health_and_cache_clear() {
        let app = create_test_app();

        send(
            app.clone(),
            "POST",
            "/analyze",
            Some(json!({"review_id": 1, "content": "很满意"})),
        )
        .await;

        let (status, health) = send(app.clone(), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(health["status"], "healthy");
        assert_eq!(health["sentiment"]["cache_size"], 1);
        assert_eq!(health["filter"]["cache_size"], 1);
        assert_eq!(health["filter"]["sensitive_words_count"], 6);
        assert_eq!(health["filter"]["patterns_count"], 3);

        let (status, cleared) = send(app.clone(), "POST", "/cache/clear", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cleared["sentiment_cleared"], 1);
        assert_eq!(cleared["filter_cleared"], 1);

        let (_, health) = send(app, "GET", "/health", None).await;
        assert_eq!(health["sentiment"]["cache_size"], 0);
        assert_eq!(health["filter"]["cache_size"], 0);
    }

    #[tokio::test]
    async fn test_batch_reports_malformed_items_in_place() {
        let (status, json) = send(
            create_test_app(),
            "POST",
            "/analyze/batch",
            Some(json!({"reviews": [
                {"review_id": 1, "content": "很好"},
                {"review_id": 2},
                {"review_id": 3, "content": null},
                {"content": "没有编号"}
            ]})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total"], 4);
        assert_eq!(json["inappropriate_count"], 0);

        let results = json["results"].as_array().unwrap();
        assert_eq!(results.len(), 4);
        assert_eq!(results[0]["review_id"], 1);
        assert!(results[0]["sentiment"].is_string());
        assert_eq!(results[1]["review_id"], 2);
        assert_eq!(results[1]["error"]["code"], "invalid_input");
        assert_eq!(results[2]["review_id"], 3);
        assert_eq!(results[2]["error"]["code"], "invalid_input");
        assert!(results[3]["review_id"].is_null());
        assert_eq!(results[3]["error"]["code"], "invalid_input");
    }

    #[tokio::test]
    async fn test_batch_scoring_failure_keeps_filter_verdict() {
        let (status, json) = send(
            create_offline_app(),
            "POST",
            "/analyze/batch",
            Some(json!({"reviews": [{"review_id": 5, "content": "这里可以赌博"}]})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let item = &json["results"][0];
        assert_eq!(item["error"]["code"], "scoring_unavailable");
        assert_eq!(item["filter"]["is_appropriate"], false);
        assert_eq!(item["filter"]["reasons"], json!(["sensitive_word:赌博"]));
    }

    #[tokio::test]
    async fn test_malformed_json_uses_error_body() {
        let request = Request::builder()
            .method("POST")
            .uri("/analyze")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = create_test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], "invalid_input");
        assert!(json["error"].as_str().unwrap().starts_with("invalid request body"));
    }

    #[tokio::test]
    async fn test_wrong_shape_uses_error_body() {
        let (status, json) = send(
            create_test_app(),
            "POST",
            "/analyze",
            Some(json!({"review_id": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["code"], "invalid_input");

        let (status, json) = send(
            create_test_app(),
            "POST",
            "/analyze/batch",
            Some(json!({"reviews": "not a list"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["code"], "invalid_input");
    }

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
    }

    #[test]
    fn test_server_config_builders() {
        let config = ServerConfig::default().with_host("127.0.0.1").with_port(9000);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn test_invalid_address_is_rejected() {
        let state = AppState::with_lexicon().unwrap();
        let result = Server::with_state(ServerConfig::default().with_host("not a host"), state);
        assert!(matches!(result, Err(ServerError::Runtime(_))));
    }
}
