//! Route Configuration
//!
//! Configures all HTTP routes for the API.

use axum::{
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};

use super::handlers;
use crate::infrastructure::metrics;
use crate::presentation::middleware::track_http_metrics;
use crate::presentation::websocket::ws_handler;
use crate::startup::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes())
        // WebSocket gateway endpoint
        .route("/gateway", get(ws_handler))
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        // Prometheus metrics endpoint
        .route("/metrics", get(metrics_handler))
        .route_layer(middleware::from_fn(track_http_metrics))
        .with_state(state)
}

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> impl IntoResponse {
    let metrics = metrics::gather_metrics();
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        metrics,
    )
}

/// API v1 routes
fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/rooms", room_routes())
        .nest("/users", user_routes())
}

/// Room routes
fn room_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(handlers::room::create_room).get(handlers::room::list_rooms),
        )
        .route(
            "/{room_id}",
            get(handlers::room::get_room).delete(handlers::room::delete_room),
        )
        .route("/{room_id}/members", post(handlers::room::join_room))
        .route(
            "/{room_id}/members/me",
            axum::routing::delete(handlers::room::leave_room),
        )
        .route(
            "/{room_id}/participants",
            get(handlers::room::get_participants),
        )
        .route("/{room_id}/bans", post(handlers::room::kick_member))
        .route("/{room_id}/notice", put(handlers::room::update_notice))
        .route(
            "/{room_id}/messages",
            get(handlers::message::get_messages).post(handlers::message::send_message),
        )
        .route(
            "/{room_id}/read-status",
            put(handlers::message::update_read_status),
        )
}

/// Routes for the calling user
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/me/rooms", get(handlers::user::get_my_rooms))
        .route("/me/unread", get(handlers::user::get_my_unread))
}
