//! Session management endpoints.

use crate::error::{ApiError, ApiResult};
use crate::server::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use scout_session::{BookmarkedMessage, ExportFormat, Session};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub(crate) fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/sessions",
            get(list_sessions).delete(delete_all_sessions),
        )
        .route(
            "/api/sessions/{id}",
            get(get_session).put(put_session).delete(delete_session),
        )
        .route("/api/sessions/{id}/export", get(export_session))
        .route("/api/sessions/{id}/tags", post(add_tag))
        .route("/api/sessions/{id}/tags/{tag}", delete(remove_tag))
        .route(
            "/api/sessions/{id}/messages/{message_id}/bookmark",
            post(toggle_bookmark),
        )
        .route("/api/bookmarks", get(list_bookmarks))
}

/// Unparseable ids name no session.
fn session_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::session_not_found())
}

/// Filters for `GET /api/sessions`.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Free-text query.
    pub q: Option<String>,
    /// Required tag.
    pub tag: Option<String>,
}

async fn list_sessions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Session>>> {
    let sessions = state
        .sessions
        .search(query.q.as_deref(), query.tag.as_deref())
        .await?;
    Ok(Json(sessions))
}

async fn delete_all_sessions(State(state): State<Arc<AppState>>) -> ApiResult<StatusCode> {
    state.sessions.delete_all().await?;
    info!("All sessions deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Session>> {
    let id = session_id(&id)?;
    state
        .sessions
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(ApiError::session_not_found)
}

async fn put_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<Session>, JsonRejection>,
) -> ApiResult<Json<Session>> {
    let id = session_id(&id)?;
    let Json(mut session) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    session.id = id;
    state.sessions.save(&session).await?;
    state
        .sessions
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(ApiError::session_not_found)
}

async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = session_id(&id)?;
    if state.sessions.get(id).await?.is_none() {
        return Err(ApiError::session_not_found());
    }
    state.sessions.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Query of the export endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    /// `markdown` (default), `json` or `text`.
    pub format: Option<String>,
}

async fn export_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<ExportQuery>,
) -> ApiResult<Response> {
    let id = session_id(&id)?;
    let format = match query.format.as_deref() {
        Some(raw) => raw
            .parse::<ExportFormat>()
            .map_err(|e| ApiError::bad_request(e.to_string()))?,
        None => ExportFormat::default(),
    };
    let session = state
        .sessions
        .get(id)
        .await?
        .ok_or_else(ApiError::session_not_found)?;

    let body = format.render(&session)?;
    let disposition = format!("attachment; filename=\"{}\"", format.file_name(&session));
    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// Body of `POST /api/sessions/{id}/tags`.
#[derive(Debug, Deserialize)]
pub struct TagBody {
    /// Tag to add.
    #[serde(default)]
    pub tag: String,
}

async fn add_tag(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<TagBody>, JsonRejection>,
) -> ApiResult<Json<Session>> {
    let id = session_id(&id)?;
    let Json(body) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let tag = body.tag.trim().to_string();
    if tag.is_empty() {
        return Err(ApiError::bad_request("Tag is required"));
    }
    state
        .sessions
        .add_tag(id, tag)
        .await?
        .map(Json)
        .ok_or_else(ApiError::session_not_found)
}

async fn remove_tag(
    State(state): State<Arc<AppState>>,
    Path((id, tag)): Path<(String, String)>,
) -> ApiResult<Json<Session>> {
    let id = session_id(&id)?;
    state
        .sessions
        .remove_tag(id, tag)
        .await?
        .map(Json)
        .ok_or_else(ApiError::session_not_found)
}

async fn toggle_bookmark(
    State(state): State<Arc<AppState>>,
    Path((id, message_id)): Path<(String, String)>,
) -> ApiResult<Json<Session>> {
    let id = session_id(&id)?;
    let not_found = || ApiError::not_found("Message not found");
    let message_id = Uuid::parse_str(&message_id).map_err(|_| not_found())?;

    let session = state
        .sessions
        .get(id)
        .await?
        .ok_or_else(ApiError::session_not_found)?;
    if !session.messages.iter().any(|m| m.id == message_id) {
        return Err(not_found());
    }

    state
        .sessions
        .toggle_bookmark(id, message_id)
        .await?
        .map(Json)
        .ok_or_else(ApiError::session_not_found)
}

async fn list_bookmarks(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<BookmarkedMessage>>> {
    Ok(Json(state.sessions.bookmarked_messages().await?))
}
