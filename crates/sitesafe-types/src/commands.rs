//! Inbound commands sent by the dashboard.
//!
//! Every configuration change the presentation layer can make arrives as a
//! [`SiteCommand`]. Commands are queued and applied between ticks, so they
//! never race the motion update.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::{AssetId, ZoneId};
use crate::structs::LatLon;

/// The map viewport the dashboard was showing when a view was captured.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MapView {
    /// Center of the viewport.
    pub center: LatLon,
    /// Zoom level of the viewport.
    pub zoom: u8,
    /// North-east corner of the visible bounds.
    pub north_east: LatLon,
}

/// What a captured map view is applied to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum CaptureTarget {
    /// The whole construction area: center and radius.
    ConstructionArea,
    /// A named section: center and zoom.
    Section {
        /// Section name.
        name: String,
    },
}

/// A configuration change requested by the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum SiteCommand {
    /// Replace the equipment counts of one section and regenerate assets.
    SetSectionCounts {
        /// Section name.
        section: String,
        /// Category key to count.
        counts: BTreeMap<String, u32>,
    },

    // --- Section / area editing ---
    /// Enter section editing with a draft copy of the area and sections.
    BeginSectionEdit,
    /// Apply the current map view to the area or a section in the draft.
    CaptureView {
        /// Area or section to update.
        target: CaptureTarget,
        /// The captured viewport.
        view: MapView,
    },
    /// Commit the section draft and regenerate assets and zones.
    ApplySectionEdit,
    /// Discard the section draft.
    CancelSectionEdit,

    // --- Danger-zone editing ---
    /// Enter zone editing with a draft copy of the zones.
    BeginZoneEdit,
    /// Move one vertex of a draft zone.
    MoveZoneVertex {
        /// Zone being reshaped.
        zone: ZoneId,
        /// Index into the zone's bounds.
        vertex: usize,
        /// New vertex position.
        position: LatLon,
    },
    /// Replace all vertices of a draft zone.
    ReplaceZoneBounds {
        /// Zone being reshaped.
        zone: ZoneId,
        /// New polygon; at least three vertices.
        bounds: Vec<LatLon>,
    },
    /// Commit the zone draft.
    ApplyZoneEdit,
    /// Discard the zone draft.
    CancelZoneEdit,

    // --- Assets ---
    /// Move the work area of a stationary asset.
    SetWorkArea {
        /// Target asset.
        asset: AssetId,
        /// New work area.
        work_area: LatLon,
    },
}

impl SiteCommand {
    /// Short name of the command, for logging.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::SetSectionCounts { .. } => "set_section_counts",
            Self::BeginSectionEdit => "begin_section_edit",
            Self::CaptureView { .. } => "capture_view",
            Self::ApplySectionEdit => "apply_section_edit",
            Self::CancelSectionEdit => "cancel_section_edit",
            Self::BeginZoneEdit => "begin_zone_edit",
            Self::MoveZoneVertex { .. } => "move_zone_vertex",
            Self::ReplaceZoneBounds { .. } => "replace_zone_bounds",
            Self::ApplyZoneEdit => "apply_zone_edit",
            Self::CancelZoneEdit => "cancel_zone_edit",
            Self::SetWorkArea { .. } => "set_work_area",
        }
    }
}
