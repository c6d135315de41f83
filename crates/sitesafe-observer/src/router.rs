//! Axum router construction for the Observer API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled for cross-origin dashboard access.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::operator;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the Observer server.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `GET /ws/ticks` -- `WebSocket` tick summary stream
/// - `GET /api/site` -- full site snapshot
/// - `GET /api/assets` -- list assets (`?section=` filter)
/// - `GET /api/assets/{id}` -- single asset
/// - `GET /api/zones` -- danger zones (the draft while zone editing)
/// - `GET /api/risk` -- per-section risk
/// - `POST /api/commands` -- queue a site command
/// - `POST /api/operator/speed` -- set the tick interval
/// - `GET /api/operator/status` -- scheduler status
/// - `POST /api/operator/stop` -- stop the tick loop
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // WebSocket
        .route("/ws/ticks", get(ws::ws_ticks))
        // REST API
        .route("/api/site", get(handlers::get_site))
        .route("/api/assets", get(handlers::list_assets))
        .route("/api/assets/{id}", get(handlers::get_asset))
        .route("/api/zones", get(handlers::list_zones))
        .route("/api/risk", get(handlers::get_risk))
        // Commands and operator controls
        .route("/api/commands", post(operator::queue_command))
        .route("/api/operator/speed", post(operator::set_speed))
        .route("/api/operator/status", get(operator::status))
        .route("/api/operator/stop", post(operator::stop))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
