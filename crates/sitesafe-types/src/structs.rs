//! Core entity structs for the site-safety simulation.
//!
//! Covers geographic coordinates, tracked assets, the construction area,
//! its named sections, danger zones, and the per-tick snapshot published
//! to the dashboard.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{AssetType, Mobility, Status};
use crate::ids::{AssetId, ZoneId};

// ---------------------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------------------

/// A geographic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LatLon {
    /// Latitude in degrees, positive north.
    pub lat: f64,
    /// Longitude in degrees, positive east.
    pub lon: f64,
}

impl LatLon {
    /// Create a coordinate from latitude and longitude.
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Whether both components are finite numbers.
    pub const fn is_finite(self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

// ---------------------------------------------------------------------------
// Assets
// ---------------------------------------------------------------------------

/// Movement state of an asset, fixed by its type's [`Mobility`] at creation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Motion {
    /// Equipment that returns to and idles around a fixed work area.
    Stationary {
        /// The point the equipment operates around.
        work_area: LatLon,
    },
    /// An asset that walks or drives toward a wandering target.
    Mobile {
        /// The point currently being approached.
        target_position: LatLon,
    },
}

impl Motion {
    /// The mobility class this motion state belongs to.
    pub const fn mobility(&self) -> Mobility {
        match self {
            Self::Stationary { .. } => Mobility::Stationary,
            Self::Mobile { .. } => Mobility::Mobile,
        }
    }
}

/// A tracked worker or piece of equipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Asset {
    /// Unique identifier within the current generation.
    pub id: AssetId,
    /// Display name, e.g. `"Excavator #1"`.
    pub name: String,
    /// Kind of asset.
    pub asset_type: AssetType,
    /// Current position.
    pub position: LatLon,
    /// Work area or wandering target, depending on mobility.
    pub motion: Motion,
    /// Safety status derived on the last tick.
    pub status: Status,
    /// Name of the section this asset belongs to.
    pub section: String,
}

impl Asset {
    /// The fixed work area, for stationary assets.
    pub const fn work_area(&self) -> Option<LatLon> {
        match self.motion {
            Motion::Stationary { work_area } => Some(work_area),
            Motion::Mobile { .. } => None,
        }
    }

    /// The current wandering target, for mobile assets.
    pub const fn target_position(&self) -> Option<LatLon> {
        match self.motion {
            Motion::Mobile { target_position } => Some(target_position),
            Motion::Stationary { .. } => None,
        }
    }
}

/// Per-section asset counts: section name -> equipment category key -> count.
///
/// Category keys are the catalog keys used by the dashboard settings panel
/// (`"workers"`, `"excavators"`, `"dumpTrucks"`, ...).
pub type AssetCounts = BTreeMap<String, BTreeMap<String, u32>>;

// ---------------------------------------------------------------------------
// Site geometry
// ---------------------------------------------------------------------------

/// Radius at which the whole-site overview uses zoom level 16.
const OVERVIEW_BASE_RADIUS_M: f64 = 250.0;

/// The overall site boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ConstructionArea {
    /// Center of the site.
    pub center: LatLon,
    /// Radius of the site in meters.
    pub radius_m: f64,
}

impl ConstructionArea {
    /// Radius in meters of the circle each section's assets are placed in.
    pub const fn section_radius_m(&self) -> f64 {
        self.radius_m / 3.0
    }

    /// Map zoom level that frames the whole site: `round(16 - log2(r / 250))`.
    ///
    /// Clamped to the 0..=22 range slippy maps support.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn overview_zoom(&self) -> u8 {
        if self.radius_m <= 0.0 || !self.radius_m.is_finite() {
            return 16;
        }
        let zoom = (16.0 - (self.radius_m / OVERVIEW_BASE_RADIUS_M).log2()).round();
        zoom.clamp(0.0, 22.0) as u8
    }
}

/// A named sub-area of the site; the unit of grouping and risk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SiteSection {
    /// Unique section name.
    pub name: String,
    /// Center of the section.
    pub center: LatLon,
    /// Map zoom level used when focusing the section.
    pub zoom: u8,
}

/// A polygon scoped to one section whose interior endangers workers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DangerZone {
    /// Unique zone identifier.
    pub id: ZoneId,
    /// Name of the owning section.
    pub section: String,
    /// Ordered polygon vertices; the last connects back to the first.
    pub bounds: Vec<LatLon>,
}

// ---------------------------------------------------------------------------
// Derived aggregates
// ---------------------------------------------------------------------------

/// Share of a section's workers currently inside a danger zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SectionRisk {
    /// Section name.
    pub name: String,
    /// Number of workers assigned to the section.
    pub workers: u32,
    /// Number of those workers with [`Status::Danger`].
    pub workers_in_danger: u32,
    /// `workers_in_danger / workers * 100`, or 0 without workers.
    pub risk: f64,
}

/// Everything the dashboard renders, captured after a tick or command.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SiteSnapshot {
    /// Number of ticks executed so far.
    pub tick: u64,
    /// Current asset collection.
    pub assets: Vec<Asset>,
    /// Zones to draw: the draft while zone editing, else the committed set.
    pub zones: Vec<DangerZone>,
    /// Sections to draw: the draft while section editing, else committed.
    pub sections: Vec<SiteSection>,
    /// Area to draw: the draft while section editing, else committed.
    pub area: Option<ConstructionArea>,
    /// Per-section risk, in section order.
    pub risk: Vec<SectionRisk>,
    /// Whether section/area editing is active.
    pub editing_sections: bool,
    /// Whether danger-zone editing is active.
    pub editing_zones: bool,
}
