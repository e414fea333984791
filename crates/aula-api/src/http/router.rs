//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`, except `/health`.
//! Middleware: CORS, tracing.

use axum::Router;
use axum::extract::State;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Chat
        .route("/chat", post(handlers::chat::post_chat))
        .route(
            "/chat/history",
            get(handlers::chat::get_history).delete(handlers::chat::clear_history),
        )
        .route("/chat/stats", get(handlers::chat::get_stats))
        // Conversation cache
        .route("/memory/stats", get(handlers::memory::get_memory_stats))
        // Topics
        .route(
            "/topics",
            get(handlers::topic::list_topics).post(handlers::topic::create_topic),
        )
        .route("/topics/{name}", get(handlers::topic::get_topic))
        // Users
        .route("/users", post(handlers::user::register_user))
        .route("/users/{id}", get(handlers::user::get_user));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Liveness plus store reachability (no auth required).
async fn health_check(State(state): State<AppState>) -> axum::Json<serde_json::Value> {
    let database = state.db_pool.ping().await;
    axum::Json(serde_json::json!({
        "status": if database { "ok" } else { "degraded" },
        "version": env!("CARGO_PKG_VERSION"),
        "database": database,
        "active_conversations": state.memory().len(),
    }))
}
