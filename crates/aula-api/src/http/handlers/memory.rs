//! GET /api/v1/memory/stats - Occupancy of the conversation cache.

use axum::Json;
use axum::extract::State;

use aula_types::chat::MemoryStats;

use crate::http::error::AppError;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

pub async fn get_memory_stats(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<MemoryStats>>, AppError> {
    let timer = RequestTimer::start();
    Ok(Json(timer.finish(state.memory().get_memory_stats())))
}
