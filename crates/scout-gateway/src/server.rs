use crate::chat::{chat_handler, summarize_handler};
use crate::sanitizer::Sanitizer;
use crate::sessions;
use axum::http::{header, Method};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use scout_agent::{CompletionBackend, CompletionRelay, ModelConfig, Summarizer};
use scout_search::Aggregator;
use scout_session::SessionStore;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Default capacity of the per-request event channel.
pub const DEFAULT_EVENT_BUFFER: usize = 64;

/// Shared application state. Built once at start-up, read-only afterwards.
pub struct AppState {
    /// Search fan-out.
    pub aggregator: Arc<Aggregator>,
    /// Completion provider.
    pub backend: Arc<dyn CompletionBackend>,
    /// Model settings; the key is checked before each chat.
    pub model: Arc<ModelConfig>,
    /// Session persistence.
    pub sessions: Arc<dyn SessionStore>,
    /// Summary endpoint backend.
    pub summarizer: Summarizer,
    /// Chat input checks.
    pub sanitizer: Sanitizer,
    /// Capacity of each chat's event channel.
    pub event_buffer: usize,
}

impl AppState {
    /// State with the default sanitizer and event buffer.
    pub fn new(
        aggregator: Arc<Aggregator>,
        backend: Arc<dyn CompletionBackend>,
        model: Arc<ModelConfig>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        let summarizer = Summarizer::new(backend.clone(), model.clone());
        Self {
            aggregator,
            backend,
            model,
            sessions,
            summarizer,
            sanitizer: Sanitizer::default(),
            event_buffer: DEFAULT_EVENT_BUFFER,
        }
    }

    /// Replaces the input sanitizer.
    pub fn with_sanitizer(mut self, sanitizer: Sanitizer) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    /// Sets the event channel capacity (at least 1).
    pub fn with_event_buffer(mut self, capacity: usize) -> Self {
        self.event_buffer = capacity.max(1);
        self
    }

    /// A fresh relay for one chat request.
    pub fn relay(&self) -> CompletionRelay {
        CompletionRelay::new(
            self.aggregator.clone(),
            self.backend.clone(),
            self.model.clone(),
        )
    }
}

/// The HTTP gateway.
pub struct GatewayServer;

impl GatewayServer {
    /// The full router with CORS applied.
    pub fn build(state: AppState) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([
                Method::POST,
                Method::GET,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

        Router::new()
            .route("/health", get(health_handler))
            .route("/api/chat", post(chat_handler))
            .route("/api/summarize", post(summarize_handler))
            .merge(sessions::routes())
            .with_state(Arc::new(state))
            .layer(cors)
    }
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok", "service": "scout"}))
}
