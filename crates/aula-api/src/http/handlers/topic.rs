//! Topic registry HTTP handlers.
//!
//! Endpoints:
//! - POST /api/v1/topics        - Register a topic
//! - GET  /api/v1/topics        - List topics
//! - GET  /api/v1/topics/{name} - Get one topic

use axum::Json;
use axum::extract::{Path, State};

use aula_core::chat::repository::TopicRepository;
use aula_types::topic::{NewTopic, Topic};

use crate::http::error::AppError;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

fn validate(topic: &NewTopic) -> Result<(), AppError> {
    if topic.name.trim().is_empty() {
        return Err(AppError::Validation("name is required".to_string()));
    }
    if topic.instructions.trim().is_empty() {
        return Err(AppError::Validation("instructions are required".to_string()));
    }
    Ok(())
}

/// POST /api/v1/topics
pub async fn create_topic(
    State(state): State<AppState>,
    Json(request): Json<NewTopic>,
) -> Result<Json<ApiResponse<Topic>>, AppError> {
    let timer = RequestTimer::start();
    validate(&request)?;

    let topic = state.topic_repo.create_topic(&request.into_topic()).await?;
    tracing::info!(topic = %topic.name, subject = %topic.subject, "Topic registered");

    let link = format!("/api/v1/topics/{}", topic.name);
    Ok(Json(timer.finish(topic).with_link("self", &link)))
}

/// GET /api/v1/topics
pub async fn list_topics(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Topic>>>, AppError> {
    let timer = RequestTimer::start();
    let topics = state.topic_repo.list_topics().await?;
    Ok(Json(timer.finish(topics)))
}

/// GET /api/v1/topics/{name}
pub async fn get_topic(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<Topic>>, AppError> {
    let timer = RequestTimer::start();
    let topic = state
        .topic_repo
        .get_topic(&name)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("topic '{name}' not found")))?;
    Ok(Json(timer.finish(topic)))
}
