//! Axum router configuration with middleware.
//!
//! All chat routes are under `/api/v1/`. Middleware: CORS, tracing.

use axum::Router;
use axum::routing::{get, post, put};
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
        .route(
            "/chat/{session_id}/messages",
            post(handlers::chat::send_message).get(handlers::chat::list_messages),
        )
        .route("/chat/{session_id}/typing", get(handlers::chat::get_typing))
        .route(
            "/chat/{session_id}/conversation",
            put(handlers::chat::set_conversation),
        )
        .route(
            "/chat/{session_id}/history",
            get(handlers::chat::history_snapshot).post(handlers::chat::load_history),
        );

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
