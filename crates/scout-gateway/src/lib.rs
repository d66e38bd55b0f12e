//! HTTP gateway for Scout.
//!
//! Exposes the streaming chat endpoint, the summarizer and the session
//! management surface on one axum [`Router`](axum::Router) with permissive
//! CORS.

/// Chat streaming and summaries.
pub mod chat;
/// JSON error responses.
pub mod error;
/// Chat input checks.
pub mod sanitizer;
/// Router and shared state.
pub mod server;
/// Session REST endpoints.
pub mod sessions;

pub use error::{ApiError, ApiResult};
pub use sanitizer::{SanitizeResult, Sanitizer};
pub use server::{AppState, GatewayServer, DEFAULT_EVENT_BUFFER};
