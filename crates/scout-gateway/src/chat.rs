//! `POST /api/chat` and `POST /api/summarize`.

use crate::error::{ApiError, ApiResult};
use crate::server::AppState;
use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures_util::stream::{self, StreamExt};
use scout_agent::{ChatMessage, RelayOutcome, RelayRequest, StreamEvent, APOLOGY};
use scout_core::{Message, Role, SourceType};
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Body of `POST /api/chat`.
#[derive(Debug, Deserialize)]
pub struct ChatBody {
    /// The question. Required.
    #[serde(default)]
    pub message: Option<String>,
    /// Sources to search; web when empty.
    #[serde(default)]
    pub sources: Vec<SourceType>,
    /// Session to record the exchange in.
    #[serde(default)]
    pub session_id: Option<Uuid>,
    /// Prior turns supplied by the client. Takes precedence over the
    /// stored session history.
    #[serde(default)]
    pub history: Option<Vec<HistoryTurn>>,
}

/// One prior turn supplied by the client.
#[derive(Debug, Deserialize)]
pub struct HistoryTurn {
    /// Speaker; system turns are ignored.
    pub role: Role,
    /// Turn text.
    pub content: String,
}

pub(crate) async fn chat_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatBody>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(body) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let message = body.message.as_deref().map(str::trim).unwrap_or_default();
    if message.is_empty() {
        return Err(ApiError::bad_request("Message is required"));
    }
    let query = state
        .sanitizer
        .sanitize(message)
        .into_result()
        .map_err(ApiError::bad_request)?;

    if state.model.api_key().is_none() {
        return Err(ApiError::internal("Fireworks API key not configured"));
    }

    let history = resolve_history(&state, body.history, body.session_id).await;
    let request = RelayRequest::new(query.clone())
        .with_sources(body.sources)
        .with_history(history);
    info!(
        session_id = ?body.session_id,
        sources = ?request.effective_sources(),
        "Chat request accepted"
    );

    let (tx, rx) = mpsc::channel(state.event_buffer);
    let relay = state.relay();
    let session_id = body.session_id;
    let task_state = state.clone();
    tokio::spawn(async move {
        let outcome = relay.run(request, tx).await;
        if let Some(id) = session_id {
            record_exchange(&task_state, id, query, outcome).await;
        }
    });

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(sse_body(rx))
        .map_err(|e| ApiError::internal(e.to_string()))
}

async fn resolve_history(
    state: &AppState,
    supplied: Option<Vec<HistoryTurn>>,
    session_id: Option<Uuid>,
) -> Vec<ChatMessage> {
    if let Some(turns) = supplied {
        return turns
            .into_iter()
            .filter(|t| matches!(t.role, Role::User | Role::Assistant))
            .map(|t| ChatMessage::new(t.role, t.content))
            .collect();
    }
    let Some(id) = session_id else {
        return Vec::new();
    };
    match state.sessions.get(id).await {
        Ok(Some(session)) => session.conversation().map(ChatMessage::from).collect(),
        Ok(None) => Vec::new(),
        Err(e) => {
            warn!(session_id = %id, error = %e, "Could not load session history");
            Vec::new()
        }
    }
}

/// Stores a completed exchange. Failed or abandoned turns are not recorded.
async fn record_exchange(state: &AppState, session_id: Uuid, query: String, outcome: RelayOutcome) {
    if !outcome.is_complete() {
        info!(session_id = %session_id, state = %outcome.state, "Exchange not recorded");
        return;
    }
    let question = Message::user(query);
    let answer = Message::assistant(outcome.answer).with_sources(outcome.sources);
    if let Err(e) = state
        .sessions
        .append_exchange(session_id, question, answer)
        .await
    {
        error!(session_id = %session_id, error = %e, "Failed to record exchange");
    }
}

/// Renders relay events as an SSE body.
///
/// The body always ends with a terminal sequence: if the relay goes away
/// without sending one, an apology and `[DONE]` are appended.
fn sse_body(rx: mpsc::Receiver<StreamEvent>) -> Body {
    let frames = stream::unfold(
        (ReceiverStream::new(rx), false),
        |(mut events, finished)| async move {
            if finished {
                return None;
            }
            let event = match events.next().await {
                Some(event) => event,
                None => {
                    warn!("Relay ended without a terminal event");
                    StreamEvent::Error {
                        message: APOLOGY.to_string(),
                    }
                }
            };
            let terminal = event.is_terminal();
            Some((Ok::<_, Infallible>(event.to_frames().concat()), (events, terminal)))
        },
    );
    Body::from_stream(frames)
}

/// Body of `POST /api/summarize`.
#[derive(Debug, Deserialize)]
pub struct SummarizeBody {
    /// Conversation text to summarize. Required.
    #[serde(default)]
    pub conversation: Option<String>,
}

pub(crate) async fn summarize_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SummarizeBody>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(body) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let conversation = body.conversation.unwrap_or_default();
    if conversation.trim().is_empty() {
        return Err(ApiError::bad_request("Conversation is required"));
    }

    match state.summarizer.summarize(&conversation).await {
        Ok(summary) => Ok(Json(serde_json::json!({ "summary": summary }))),
        Err(e) => {
            error!(error = %e, "Summarization failed");
            Err(ApiError::internal("Failed to generate summary"))
        }
    }
}
