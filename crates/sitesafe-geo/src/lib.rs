//! Geometry, danger zones, and the default site layout for the site-safety
//! simulation.
//!
//! # Modules
//!
//! - [`geometry`] -- Disk sampling, ray-casting containment, degree-space
//!   vectors, and meter conversions.
//! - [`zones`] -- Default square danger zones, vertex editing, and
//!   policy-driven regeneration after section edits.
//! - [`starting_site`] -- The three-phase demo site.
//! - [`error`] -- Error types for zone editing.

pub mod error;
pub mod geometry;
pub mod starting_site;
pub mod zones;

// Re-export primary items at crate root.
pub use error::GeoError;
pub use geometry::{
    DegreeVector, METERS_PER_DEGREE, approx_distance_m, haversine_m, point_in_polygon,
    random_point_in_circle, step_toward, vector_to,
};
pub use starting_site::{StartingSite, create_starting_site};
pub use zones::{
    DEFAULT_HALF_WIDTH_DEG, ZonePolicy, default_danger_zones, move_vertex, regenerate_zones,
    replace_bounds, square_around,
};
