//! User registration HTTP handlers.
//!
//! Endpoints:
//! - POST /api/v1/users      - Register (or re-register) a user
//! - GET  /api/v1/users/{id} - Get a user profile

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;

use aula_core::chat::repository::UserRepository;
use aula_types::user::UserProfile;

use crate::http::error::AppError;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterUserRequest {
    pub user_id: String,
    pub classroom: Option<String>,
}

/// POST /api/v1/users
pub async fn register_user(
    State(state): State<AppState>,
    Json(request): Json<RegisterUserRequest>,
) -> Result<Json<ApiResponse<UserProfile>>, AppError> {
    let timer = RequestTimer::start();
    if request.user_id.trim().is_empty() {
        return Err(AppError::Validation("user_id is required".to_string()));
    }

    let profile = state
        .user_repo
        .register_user(&request.user_id, request.classroom.as_deref())
        .await?;

    let link = format!("/api/v1/users/{}", profile.user_id);
    Ok(Json(timer.finish(profile).with_link("self", &link)))
}

/// GET /api/v1/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<UserProfile>>, AppError> {
    let timer = RequestTimer::start();
    let profile = state
        .user_repo
        .get_user(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' not found")))?;
    Ok(Json(timer.finish(profile)))
}
