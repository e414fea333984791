//! Chat HTTP handlers.
//!
//! Endpoints:
//! - POST   /api/v1/chat          - Send a message, receive the bot's reply
//! - GET    /api/v1/chat/history  - Recent stored turns
//! - DELETE /api/v1/chat/history  - Delete all turns and drop live conversations
//! - GET    /api/v1/chat/stats    - Durable-store totals

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;

use aula_types::chat::{ChatReply, ChatStats, ChatTurn};

use crate::http::error::AppError;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

const MAX_HISTORY_LIMIT: usize = 500;

/// Request body for POST /chat.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub user_id: String,
    pub topic: String,
    pub message: String,
}

/// Query parameters for GET /chat/history.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub user_id: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

/// Reject blank identifiers before they reach the conversation cache.
pub fn validate_key(user_id: &str, topic: &str) -> Result<(), AppError> {
    if user_id.trim().is_empty() {
        return Err(AppError::Validation("user_id is required".to_string()));
    }
    if topic.trim().is_empty() {
        return Err(AppError::Validation("topic is required".to_string()));
    }
    Ok(())
}

/// History link for one user, with the id percent-encoded.
pub fn history_link(user_id: &str) -> String {
    format!(
        "/api/v1/chat/history?user_id={}",
        urlencoding::encode(user_id)
    )
}

/// POST /api/v1/chat
pub async fn post_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ApiResponse<ChatReply>>, AppError> {
    let timer = RequestTimer::start();
    validate_key(&request.user_id, &request.topic)?;

    let reply = state
        .chat_service
        .handle_message(&request.user_id, &request.topic, &request.message)
        .await?;

    Ok(Json(
        timer
            .finish(reply)
            .with_link("history", &history_link(&request.user_id)),
    ))
}

/// GET /api/v1/chat/history
pub async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<Vec<ChatTurn>>>, AppError> {
    let timer = RequestTimer::start();
    let limit = query.limit.clamp(1, MAX_HISTORY_LIMIT);

    let turns = state
        .chat_service
        .history(query.user_id.as_deref(), limit)
        .await?;

    Ok(Json(timer.finish(turns)))
}

/// DELETE /api/v1/chat/history
pub async fn clear_history(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let timer = RequestTimer::start();
    state.chat_service.clear_history().await?;
    Ok(Json(timer.finish(serde_json::json!({ "cleared": true }))))
}

/// GET /api/v1/chat/stats
pub async fn get_stats(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ChatStats>>, AppError> {
    let timer = RequestTimer::start();
    let stats = state.chat_stats().await?;
    Ok(Json(timer.finish(stats)))
}
