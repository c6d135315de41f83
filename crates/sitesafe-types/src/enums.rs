//! Enumeration types for the site-safety simulation.
//!
//! Asset types carry a static [`Mobility`] tag. The asset factory reads it
//! once when an asset is created; the tick engine only ever looks at the
//! resulting [`Motion`](crate::structs::Motion) variant.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Asset types
// ---------------------------------------------------------------------------

/// Kind of tracked asset on the construction site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum AssetType {
    /// A person on foot.
    Worker,

    // --- Earthmoving ---
    /// Tracked excavator.
    Excavator,
    /// Bulldozer.
    Dozer,
    /// Wheel loader.
    Loader,

    // --- Haulage ---
    /// Dump truck.
    DumpTruck,
    /// Forklift.
    Forklift,
    /// Concrete mixer truck.
    MixerTruck,

    // --- Lifting ---
    /// Tower crane.
    TowerCrane,
    /// Mobile crane.
    MobileCrane,
    /// Construction lift or hoist.
    LiftHoist,

    // --- Concrete and paving ---
    /// Concrete pump car.
    PumpCar,
    /// Asphalt finisher.
    AsphaltFinisher,
    /// Road roller.
    Roller,

    // --- Specialty ---
    /// Pile driver.
    PileDriver,
    /// Drill rig.
    DrillRig,
}

impl AssetType {
    /// Every asset type, in catalog order.
    pub const ALL: [Self; 15] = [
        Self::Worker,
        Self::Excavator,
        Self::Dozer,
        Self::Loader,
        Self::DumpTruck,
        Self::Forklift,
        Self::MixerTruck,
        Self::TowerCrane,
        Self::MobileCrane,
        Self::LiftHoist,
        Self::PumpCar,
        Self::AsphaltFinisher,
        Self::Roller,
        Self::PileDriver,
        Self::DrillRig,
    ];

    /// Static mobility class of this asset type.
    ///
    /// Stationary equipment orbits a fixed work area; everything else,
    /// workers included, wanders between sampled targets.
    pub const fn mobility(self) -> Mobility {
        match self {
            Self::Excavator
            | Self::Dozer
            | Self::Loader
            | Self::TowerCrane
            | Self::LiftHoist
            | Self::PumpCar
            | Self::PileDriver
            | Self::DrillRig => Mobility::Stationary,
            Self::Worker
            | Self::DumpTruck
            | Self::Forklift
            | Self::MixerTruck
            | Self::MobileCrane
            | Self::AsphaltFinisher
            | Self::Roller => Mobility::Mobile,
        }
    }

    /// Whether this asset type is a person on foot.
    ///
    /// Only workers carry a danger-zone status.
    pub const fn is_worker(self) -> bool {
        matches!(self, Self::Worker)
    }

    /// Human-readable label used when naming generated assets.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Worker => "Worker",
            Self::Excavator => "Excavator",
            Self::Dozer => "Dozer",
            Self::Loader => "Loader",
            Self::DumpTruck => "Dump Truck",
            Self::Forklift => "Forklift",
            Self::MixerTruck => "Concrete Mixer Truck",
            Self::TowerCrane => "Tower Crane",
            Self::MobileCrane => "Mobile Crane",
            Self::LiftHoist => "Lift/Hoist",
            Self::PumpCar => "Concrete Pump Car",
            Self::AsphaltFinisher => "Asphalt Finisher",
            Self::Roller => "Roller",
            Self::PileDriver => "Pile Driver",
            Self::DrillRig => "Drill Rig",
        }
    }
}

/// Movement class of an asset type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Mobility {
    /// Works around a fixed work area.
    Stationary,
    /// Roams toward randomly sampled targets.
    Mobile,
}

// ---------------------------------------------------------------------------
// Safety status
// ---------------------------------------------------------------------------

/// Safety status reported for an asset.
///
/// `Warning` is part of the dashboard vocabulary but the tick engine
/// never produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Status {
    /// Outside every danger zone of the asset's section.
    #[default]
    Safe,
    /// Reserved for the dashboard.
    Warning,
    /// Inside a danger zone of the asset's section.
    Danger,
}
