//! Shared type definitions for the site-safety simulation.
//!
//! This crate is the single source of truth for the types exchanged between
//! the engine and the dashboard. Types defined here flow downstream to
//! `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe integer wrappers for asset and zone identifiers
//! - [`commands`] -- Inbound configuration commands from the dashboard
//! - [`enums`] -- Asset types with their mobility tag, and safety status
//! - [`structs`] -- Coordinates, assets, site geometry and snapshots

pub mod commands;
pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use commands::{CaptureTarget, MapView, SiteCommand};
pub use enums::{AssetType, Mobility, Status};
pub use ids::{AssetId, ZoneId};
pub use structs::{
    Asset, AssetCounts, ConstructionArea, DangerZone, LatLon, Motion, SectionRisk, SiteSection,
    SiteSnapshot,
};
