//! HTTP server setup and routing
//!
//! Sets up the Axum HTTP server with routes for record keeping, the
//! broadcast relay, and the per-event SSE stream.

use crate::sse::SseBroadcaster;
use axum::{
    routing::{get, post, put},
    Router,
};
use sqlx::{Pool, Sqlite};
use tower_http::cors::CorsLayer;

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppContext {
    pub db_pool: Pool<Sqlite>,
    pub broadcaster: SseBroadcaster,
}

/// Build the router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    Router::new()
        // Health endpoint
        .route("/health", get(super::handlers::health))
        // Events
        .route("/events", get(super::handlers::list_events))
        .route("/events", post(super::handlers::create_event))
        .route("/events/:event_id/status", put(super::handlers::update_event_status))
        // Performances
        .route(
            "/events/:event_id/performances",
            get(super::handlers::list_performances),
        )
        .route(
            "/events/:event_id/performances",
            post(super::handlers::create_performance),
        )
        .route(
            "/events/:event_id/performances/order",
            put(super::handlers::reorder_performances),
        )
        .route(
            "/performances/:id/status",
            put(super::handlers::update_performance_status),
        )
        .route("/performances/:id/flag", put(super::handlers::update_flag))
        .route("/performances/:id/video", put(super::handlers::update_video))
        // Broadcast relay
        .route("/broadcast", post(super::handlers::publish_message))
        .route("/events/:event_id/stream", get(super::handlers::event_stream))
        // Attach application context
        .with_state(ctx)
        // Enable CORS for local console access
        .layer(CorsLayer::permissive())
}
