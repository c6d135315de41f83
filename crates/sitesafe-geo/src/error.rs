//! Error types for the `sitesafe-geo` crate.
//!
//! Zone editing operations return [`GeoError`] when they reference a zone
//! or vertex that does not exist, or when they would leave a zone without
//! a usable polygon.

use sitesafe_types::ZoneId;

/// Errors that can occur while editing danger-zone geometry.
#[derive(Debug, thiserror::Error)]
pub enum GeoError {
    /// No zone with the given id exists in the collection.
    #[error("zone not found: {0}")]
    ZoneNotFound(ZoneId),

    /// The vertex index is outside the zone's bounds list.
    #[error("zone {zone} has no vertex {index} (it has {len})")]
    VertexOutOfRange {
        /// The zone being edited.
        zone: ZoneId,
        /// The requested vertex index.
        index: usize,
        /// Number of vertices the zone has.
        len: usize,
    },

    /// Replacement bounds have fewer than three vertices.
    #[error("zone {zone} needs at least 3 vertices, got {count}")]
    DegenerateBounds {
        /// The zone being edited.
        zone: ZoneId,
        /// Number of vertices supplied.
        count: usize,
    },

    /// A supplied vertex has a NaN or infinite component.
    #[error("zone {zone} received a non-finite vertex")]
    NonFiniteVertex {
        /// The zone being edited.
        zone: ZoneId,
    },
}
