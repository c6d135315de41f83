//! Fixed-period tick loop with operator controls.
//!
//! [`run_simulation`] drives the scheduler:
//!
//! - **Bounded runs**: stop after `max_ticks` periods or
//!   `max_real_time_seconds` of wall-clock time
//! - **Command intake**: dashboard commands queued on the [`OperatorState`]
//!   are applied before each period's tick
//! - **Variable tick speed**: the period can be changed at runtime
//! - **Operator stop**: clean stop via the observer API
//!
//! Failed commands are logged and dropped; they never end the run.

use std::sync::Arc;

use tracing::{info, warn};

use crate::operator::{OperatorState, SimulationEndReason};
use crate::tick::{self, SimulationState, TickError, TickSummary};

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick execution failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },
}

/// Result of the simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// The reason the simulation ended.
    pub end_reason: SimulationEndReason,
    /// The last tick summary, if any period completed.
    pub final_summary: Option<TickSummary>,
    /// Total number of scheduler periods, skipped ones included.
    pub total_ticks: u64,
}

/// Callback invoked after each scheduler period.
///
/// Implementations use this to refresh the observer snapshot and
/// broadcast tick summaries.
pub trait TickCallback: Send {
    /// Called after a period completes, whether or not assets moved.
    fn on_tick(&mut self, summary: &TickSummary, state: &SimulationState);
}

/// A no-op tick callback for testing.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _state: &SimulationState) {}
}

/// Apply every queued command to the state, in arrival order.
///
/// Returns the number of commands that were applied successfully.
pub async fn apply_queued_commands(state: &mut SimulationState, operator: &OperatorState) -> usize {
    let mut applied: usize = 0;
    for command in operator.drain_commands().await {
        let kind = command.kind();
        match state.apply_command(command) {
            Ok(()) => {
                info!(command = kind, "command applied");
                applied = applied.saturating_add(1);
            }
            Err(e) => warn!(command = kind, error = %e, "command rejected"),
        }
    }
    applied
}

/// Run the simulation loop until a termination condition is met.
///
/// # Errors
///
/// Returns [`RunnerError`] if a tick execution fails unrecoverably.
pub async fn run_simulation(
    state: &mut SimulationState,
    operator: &Arc<OperatorState>,
    callback: &mut dyn TickCallback,
) -> Result<SimulationResult, RunnerError> {
    let mut last_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;

    info!(
        max_ticks = operator.max_ticks(),
        max_real_time_seconds = operator.max_real_time_seconds(),
        tick_interval_ms = operator.tick_interval_ms(),
        assets = state.assets.len(),
        "Simulation starting"
    );

    loop {
        // --- Check stop request (before tick) ---
        if operator.is_stop_requested() {
            info!("Operator stop requested");
            let reason = SimulationEndReason::OperatorStop;
            operator.set_end_reason(reason.clone()).await;
            return Ok(SimulationResult {
                end_reason: reason,
                final_summary: last_summary,
                total_ticks,
            });
        }

        // --- Check time limit (before tick) ---
        if operator.time_limit_reached() {
            info!(
                max_seconds = operator.max_real_time_seconds(),
                elapsed = operator.elapsed_seconds(),
                "Real-time limit reached"
            );
            let reason = SimulationEndReason::MaxRealTimeReached;
            operator.set_end_reason(reason.clone()).await;
            return Ok(SimulationResult {
                end_reason: reason,
                final_summary: last_summary,
                total_ticks,
            });
        }

        // --- Apply queued commands, then tick ---
        apply_queued_commands(state, operator).await;
        let summary = tick::run_tick(state)?;
        total_ticks = total_ticks.saturating_add(1);

        callback.on_tick(&summary, state);

        // --- Check tick limit (after tick) ---
        if operator.tick_limit_reached(total_ticks) {
            info!(
                periods = total_ticks,
                tick = summary.tick,
                max_ticks = operator.max_ticks(),
                "Tick limit reached"
            );
            let reason = SimulationEndReason::MaxTicksReached;
            operator.set_end_reason(reason.clone()).await;
            return Ok(SimulationResult {
                end_reason: reason,
                final_summary: Some(summary),
                total_ticks,
            });
        }

        last_summary = Some(summary);

        // --- Sleep for tick interval ---
        let interval_ms = operator.tick_interval_ms();
        if interval_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(interval_ms)).await;
        }
    }
}

/// Log the end of a run. The observer keeps serving after this.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_tick = result.final_summary.as_ref().map(|s| s.tick),
        "Simulation ended"
    );

    if let Some(ref summary) = result.final_summary {
        info!(
            tick = summary.tick,
            assets = summary.assets,
            workers_in_danger = summary.workers_in_danger,
            "Final tick summary"
        );
    } else {
        warn!("Simulation ended with no ticks executed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use sitesafe_types::{LatLon, SiteCommand, ZoneId};

    use super::*;
    use crate::config::{SimulationBoundsConfig, SimulationConfig};
    use crate::tick::TickOutcome;

    fn make_state() -> SimulationState {
        SimulationState::from_config(&SimulationConfig::default())
    }

    fn bounded(max_ticks: u64) -> Arc<OperatorState> {
        let bounds = SimulationBoundsConfig {
            max_ticks,
            max_real_time_seconds: 0,
        };
        Arc::new(OperatorState::new(0, &bounds))
    }

    /// Records every summary it sees.
    #[derive(Default)]
    struct Recorder {
        outcomes: Vec<TickOutcome>,
    }

    impl TickCallback for Recorder {
        fn on_tick(&mut self, summary: &TickSummary, _state: &SimulationState) {
            self.outcomes.push(summary.outcome);
        }
    }

    #[tokio::test]
    async fn bounded_by_max_ticks() {
        let mut state = make_state();
        let operator = bounded(5);
        let mut cb = NoOpCallback;

        let result = run_simulation(&mut state, &operator, &mut cb).await.unwrap();

        assert_eq!(result.end_reason, SimulationEndReason::MaxTicksReached);
        assert_eq!(result.total_ticks, 5);
        assert_eq!(state.tick, 5);
        assert_eq!(
            operator.end_reason().await,
            Some(SimulationEndReason::MaxTicksReached)
        );
    }

    #[tokio::test]
    async fn operator_stop() {
        let mut state = make_state();
        let operator = bounded(0);
        operator.request_stop();
        let mut cb = NoOpCallback;

        let result = run_simulation(&mut state, &operator, &mut cb).await.unwrap();

        assert_eq!(result.end_reason, SimulationEndReason::OperatorStop);
        assert_eq!(result.total_ticks, 0);
        assert!(result.final_summary.is_none());
    }

    #[tokio::test]
    async fn queued_edit_pauses_motion() {
        let mut state = make_state();
        let operator = bounded(3);
        operator.queue_command(SiteCommand::BeginSectionEdit).await;
        let before = state.assets.clone();
        let mut cb = Recorder::default();

        let result = run_simulation(&mut state, &operator, &mut cb).await.unwrap();

        assert_eq!(result.total_ticks, 3);
        assert_eq!(state.tick, 0);
        assert_eq!(state.skipped_ticks, 3);
        assert_eq!(state.assets, before);
        assert!(
            cb.outcomes
                .iter()
                .all(|o| matches!(o, TickOutcome::SkippedEditing(_)))
        );
    }

    #[tokio::test]
    async fn rejected_commands_do_not_stop_the_loop() {
        let mut state = make_state();
        let operator = bounded(2);
        // Not in zone edit mode: rejected.
        operator
            .queue_command(SiteCommand::MoveZoneVertex {
                zone: ZoneId::new(1),
                vertex: 0,
                position: LatLon::new(37.5, 127.2),
            })
            .await;
        let mut cb = NoOpCallback;

        let result = run_simulation(&mut state, &operator, &mut cb).await.unwrap();

        assert_eq!(result.end_reason, SimulationEndReason::MaxTicksReached);
        assert_eq!(state.tick, 2);
    }

    #[tokio::test]
    async fn apply_queued_commands_counts_successes() {
        let mut state = make_state();
        let operator = bounded(0);
        operator.queue_command(SiteCommand::BeginZoneEdit).await;
        operator.queue_command(SiteCommand::BeginZoneEdit).await;
        operator.queue_command(SiteCommand::CancelZoneEdit).await;

        let applied = apply_queued_commands(&mut state, &operator).await;

        assert_eq!(applied, 2);
        assert!(!state.store.is_editing());
    }
}
