//! Observer API server for the site-safety simulation.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws/ticks`) for real-time tick summary
//!   streaming via [`tokio::sync::broadcast`]
//! - **REST endpoints** for querying the site (assets, danger zones,
//!   sections, per-section risk)
//! - **Command endpoint** (`POST /api/commands`) that queues dashboard
//!   commands (counts, section edits, zone edits, work areas) for the
//!   runner
//! - **Operator REST endpoints** for runtime control (speed, status, stop)
//! - **Minimal HTML status page** (`GET /`)
//!
//! # Architecture
//!
//! The observer reads from an in-memory [`SiteSnapshot`] that is replaced
//! after every scheduler period by the engine. REST reads never touch the
//! runner's state, and commands reach the runner only through the
//! operator queue, so an edit can never interleave with a tick.
//!
//! [`SiteSnapshot`]: sitesafe_types::SiteSnapshot

pub mod error;
pub mod handlers;
pub mod operator;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

pub use router::build_router;
pub use server::{ServerConfig, ServerError, spawn_observer, start_server};
pub use state::{AppState, TickBroadcast};
