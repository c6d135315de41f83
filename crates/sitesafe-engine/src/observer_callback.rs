//! Tick callback that updates the Observer API state.
//!
//! After each period this callback broadcasts a [`TickBroadcast`] to all
//! connected `WebSocket` clients and replaces the [`SiteSnapshot`] the
//! REST endpoints serve.
//!
//! [`SiteSnapshot`]: sitesafe_types::SiteSnapshot

use std::sync::Arc;

use sitesafe_core::runner::TickCallback;
use sitesafe_core::tick::{SimulationState, TickSummary};
use sitesafe_observer::state::{AppState, TickBroadcast};
use tracing::debug;

/// Callback that bridges the tick loop to the Observer API.
pub struct ObserverCallback {
    state: Arc<AppState>,
}

impl ObserverCallback {
    /// Create a new observer callback backed by the given app state.
    pub const fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }
}

impl TickCallback for ObserverCallback {
    fn on_tick(&mut self, summary: &TickSummary, sim: &SimulationState) {
        let receivers = self.state.broadcast(&TickBroadcast::from(summary));
        debug!(tick = summary.tick, receivers, "Tick broadcast sent");

        // A REST handler holding the read lock makes us skip this period;
        // the next one catches up.
        if let Ok(mut snap) = self.state.snapshot.try_write() {
            *snap = sim.snapshot();
        } else {
            debug!(tick = summary.tick, "Snapshot busy, skipping update");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use sitesafe_core::config::SimulationConfig;
    use sitesafe_core::run_tick;
    use sitesafe_types::SiteCommand;

    use super::*;

    #[tokio::test]
    async fn publishes_snapshot_and_broadcast() {
        let app = Arc::new(AppState::new());
        let mut rx = app.subscribe();
        let mut callback = ObserverCallback::new(Arc::clone(&app));
        let mut sim = SimulationState::from_config(&SimulationConfig::default());

        let summary = run_tick(&mut sim).unwrap();
        callback.on_tick(&summary, &sim);

        assert_eq!(rx.recv().await.unwrap().tick, 1);
        let snap = app.snapshot.read().await;
        assert_eq!(snap.tick, 1);
        assert_eq!(snap.assets, sim.assets);
    }

    #[tokio::test]
    async fn skipped_period_still_publishes_the_draft() {
        let app = Arc::new(AppState::new());
        let mut callback = ObserverCallback::new(Arc::clone(&app));
        let mut sim = SimulationState::from_config(&SimulationConfig::default());
        sim.apply_command(SiteCommand::BeginSectionEdit).unwrap();

        let summary = run_tick(&mut sim).unwrap();
        callback.on_tick(&summary, &sim);

        let snap = app.snapshot.read().await;
        assert!(snap.editing_sections);
        assert_eq!(snap.tick, 0);
    }
}
