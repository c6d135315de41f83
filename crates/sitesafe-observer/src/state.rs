//! Shared application state for the Observer API server.
//!
//! [`AppState`] holds the broadcast channel for tick summaries and the
//! latest [`SiteSnapshot`] that the REST endpoints serve.

use std::sync::Arc;

use sitesafe_core::operator::OperatorState;
use sitesafe_core::{EditMode, TickOutcome, TickSummary};
use sitesafe_types::{SectionRisk, SiteSnapshot};
use tokio::sync::{RwLock, broadcast};

/// Capacity of the broadcast channel for tick summaries.
///
/// If a subscriber falls behind by more than this many messages it will
/// receive a [`broadcast::error::RecvError::Lagged`] and skip to the
/// newest message.
const BROADCAST_CAPACITY: usize = 256;

/// JSON-serializable tick summary pushed over the `WebSocket`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TickBroadcast {
    /// Number of advanced ticks so far.
    pub tick: u64,
    /// Whether the assets moved this period.
    pub advanced: bool,
    /// The edit mode that held the period back, if any.
    pub editing: Option<EditMode>,
    /// Number of tracked assets.
    pub assets: u32,
    /// Workers inside a danger zone of their own section.
    pub workers_in_danger: u32,
    /// Per-section risk after this period.
    pub risk: Vec<SectionRisk>,
}

impl From<&TickSummary> for TickBroadcast {
    fn from(summary: &TickSummary) -> Self {
        let editing = match summary.outcome {
            TickOutcome::Advanced => None,
            TickOutcome::SkippedEditing(mode) => Some(mode),
        };
        Self {
            tick: summary.tick,
            advanced: editing.is_none(),
            editing,
            assets: summary.assets,
            workers_in_danger: summary.workers_in_danger,
            risk: summary.risk.clone(),
        }
    }
}

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
/// The broadcast sender is used to push tick summaries to all
/// connected `WebSocket` clients. The snapshot is a read-write
/// lock protecting the latest site view.
#[derive(Clone)]
pub struct AppState {
    /// Broadcast sender for tick summary messages.
    pub tx: broadcast::Sender<TickBroadcast>,
    /// The current site snapshot (replaced every period).
    pub snapshot: Arc<RwLock<SiteSnapshot>>,
    /// Shared operator control state (present when the engine is running).
    pub operator_state: Option<Arc<OperatorState>>,
}

impl AppState {
    /// Create a new application state with an empty snapshot.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            tx,
            snapshot: Arc::new(RwLock::new(SiteSnapshot::default())),
            operator_state: None,
        }
    }

    /// Create a new application state with operator control state attached.
    pub fn with_operator(operator: Arc<OperatorState>) -> Self {
        Self {
            operator_state: Some(operator),
            ..Self::new()
        }
    }

    /// Subscribe to the tick broadcast channel.
    pub fn subscribe(&self) -> broadcast::Receiver<TickBroadcast> {
        self.tx.subscribe()
    }

    /// Publish a tick summary to all connected clients.
    ///
    /// Returns the number of receivers that received the message, which
    /// is 0 when no clients are connected.
    pub fn broadcast(&self, summary: &TickBroadcast) -> usize {
        self.tx.send(summary.clone()).unwrap_or(0)
    }

    /// Replace the snapshot the REST endpoints serve.
    pub async fn publish_snapshot(&self, snapshot: SiteSnapshot) {
        *self.snapshot.write().await = snapshot;
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
