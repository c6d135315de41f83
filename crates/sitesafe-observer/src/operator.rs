//! Command intake and operator REST handlers.
//!
//! The observer never mutates the site itself. Every write is queued on
//! the shared [`OperatorState`] and applied by the runner between ticks.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/commands` | Queue a site command |
//! | `POST` | `/api/operator/speed` | Set tick interval (ms) |
//! | `GET` | `/api/operator/status` | Current scheduler status |
//! | `POST` | `/api/operator/stop` | Stop the tick loop |
//!
//! [`OperatorState`]: sitesafe_core::operator::OperatorState

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use sitesafe_core::operator::{MIN_TICK_INTERVAL_MS, OperatorState, SimulationStatus};
use sitesafe_types::SiteCommand;
use tracing::info;

use crate::error::ObserverError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/operator/speed`.
#[derive(Debug, serde::Deserialize)]
pub struct SetSpeedRequest {
    /// New tick interval in milliseconds (minimum 100).
    pub tick_interval_ms: u64,
}

/// Generic success response.
#[derive(Debug, serde::Serialize)]
struct OperatorResponse {
    /// Whether the operation succeeded.
    ok: bool,
    /// Human-readable message.
    message: String,
}

fn operator(state: &AppState) -> Result<&Arc<OperatorState>, ObserverError> {
    state
        .operator_state
        .as_ref()
        .ok_or(ObserverError::OperatorUnavailable)
}

// ---------------------------------------------------------------------------
// POST /api/commands
// ---------------------------------------------------------------------------

/// Queue a dashboard command for the next period.
///
/// The command is validated by the runner, not here: a command that is
/// invalid when it is applied (wrong edit mode, unknown zone) is logged
/// and dropped there.
pub async fn queue_command(
    State(state): State<Arc<AppState>>,
    Json(command): Json<SiteCommand>,
) -> Result<impl IntoResponse, ObserverError> {
    let operator = operator(&state)?;
    let kind = command.kind();

    operator.queue_command(command).await;
    info!(command = kind, "command queued");

    Ok(Json(OperatorResponse {
        ok: true,
        message: format!("Command '{kind}' queued for next tick"),
    }))
}

// ---------------------------------------------------------------------------
// POST /api/operator/speed
// ---------------------------------------------------------------------------

/// Change the tick interval at runtime.
///
/// The new interval takes effect before the next period's sleep.
pub async fn set_speed(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SetSpeedRequest>,
) -> Result<impl IntoResponse, ObserverError> {
    let operator = operator(&state)?;

    let prev = operator
        .set_tick_interval_ms(body.tick_interval_ms)
        .ok_or_else(|| {
            ObserverError::InvalidQuery(format!(
                "tick_interval_ms must be at least {MIN_TICK_INTERVAL_MS}"
            ))
        })?;

    Ok(Json(serde_json::json!({
        "ok": true,
        "message": format!("Tick interval changed from {}ms to {}ms", prev, body.tick_interval_ms),
        "previous_interval_ms": prev,
        "new_interval_ms": body.tick_interval_ms,
    })))
}

// ---------------------------------------------------------------------------
// GET /api/operator/status
// ---------------------------------------------------------------------------

/// Return the scheduler status: tick, speed, bounds, edit mode and the
/// number of commands waiting for the next period.
pub async fn status(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let operator = operator(&state)?;
    let snapshot = state.snapshot.read().await;

    let status = SimulationStatus {
        tick: snapshot.tick,
        stop_requested: operator.is_stop_requested(),
        tick_interval_ms: operator.tick_interval_ms(),
        elapsed_seconds: operator.elapsed_seconds(),
        max_ticks: operator.max_ticks(),
        max_real_time_seconds: operator.max_real_time_seconds(),
        assets: u64::try_from(snapshot.assets.len()).unwrap_or(u64::MAX),
        editing: snapshot.editing_sections || snapshot.editing_zones,
        pending_commands: u64::try_from(operator.pending_commands().await).unwrap_or(u64::MAX),
        end_reason: operator.end_reason().await,
        started_at: operator.started_at().to_rfc3339(),
    };

    Ok(Json(status))
}

// ---------------------------------------------------------------------------
// POST /api/operator/stop
// ---------------------------------------------------------------------------

/// Ask the tick loop to stop before its next period.
///
/// The HTTP server keeps running so the final site state stays
/// queryable.
pub async fn stop(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    operator(&state)?.request_stop();

    Ok(Json(OperatorResponse {
        ok: true,
        message: "Stop requested -- simulation will end before the next tick".to_owned(),
    }))
}
