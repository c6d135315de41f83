//! Equipment catalog and asset factory for the site-safety simulation.
//!
//! # Modules
//!
//! - [`catalog`] -- Category keys, their asset types, and default counts.
//! - [`factory`] -- Bulk asset generation and work-area reassignment.

pub mod catalog;
pub mod factory;

pub use catalog::{CATALOG, CatalogEntry, asset_type_for_key, default_counts, is_known_key};
pub use factory::{generate_initial_assets, set_work_area};
