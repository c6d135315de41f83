//! Motion and risk engine, configuration store, and tick loop for the
//! site-safety simulation.
//!
//! The runner owns a single [`SimulationState`] and executes one period at
//! a time: queued dashboard commands first, then either a motion update or,
//! while an edit is in progress, a skipped tick.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `sitesafe-config.yaml` into
//!   strongly-typed structs.
//! - [`motion`] -- The pure per-tick asset update.
//! - [`risk`] -- Per-section share of workers in danger.
//! - [`store`] -- Committed configuration and two-phase edit drafts.
//! - [`tick`] -- Coordinator state, command application, and `run_tick`.
//! - [`operator`] -- Shared stop/speed controls and the command queue.
//! - [`runner`] -- The fixed-period async tick loop.
//!
//! [`SimulationState`]: tick::SimulationState

pub mod config;
pub mod motion;
pub mod operator;
pub mod risk;
pub mod runner;
pub mod store;
pub mod tick;

pub use config::{ConfigError, SimulationConfig};
pub use operator::{OperatorState, SimulationEndReason, SimulationStatus};
pub use runner::{
    NoOpCallback, RunnerError, SimulationResult, TickCallback, log_simulation_end,
    run_simulation,
};
pub use store::{ConfigStore, EditMode, StoreError};
pub use tick::{SimulationState, TickError, TickOutcome, TickSummary, run_tick};
