//! Per-tick motion and status update.
//!
//! [`advance_assets`] is a pure function of the previous asset list, the
//! committed site layout, the motion constants and the random source. It
//! never reads edit drafts; the caller decides whether a tick runs at all.

use rand::Rng;
use sitesafe_geo::{
    METERS_PER_DEGREE, point_in_polygon, random_point_in_circle, step_toward, vector_to,
};
use sitesafe_types::{Asset, ConstructionArea, DangerZone, LatLon, Motion, SiteSection, Status};

use crate::config::MotionConfig;

/// Committed site geometry the engine moves assets within.
#[derive(Debug, Clone, Copy)]
pub struct SiteLayout<'a> {
    /// Overall area; sets the section radius.
    pub area: &'a ConstructionArea,
    /// Sections assets belong to.
    pub sections: &'a [SiteSection],
    /// Zones that endanger workers of the same section.
    pub zones: &'a [DangerZone],
}

/// Advance every asset by one tick.
///
/// Assets whose section no longer exists, or whose coordinates are not
/// finite, come back unchanged.
pub fn advance_assets(
    assets: &[Asset],
    layout: &SiteLayout<'_>,
    params: &MotionConfig,
    rng: &mut impl Rng,
) -> Vec<Asset> {
    assets
        .iter()
        .map(|asset| advance_asset(asset, layout, params, rng))
        .collect()
}

fn advance_asset(
    asset: &Asset,
    layout: &SiteLayout<'_>,
    params: &MotionConfig,
    rng: &mut impl Rng,
) -> Asset {
    let Some(section) = layout.sections.iter().find(|s| s.name == asset.section) else {
        return asset.clone();
    };

    match asset.motion {
        Motion::Stationary { work_area } => {
            if !asset.position.is_finite() || !work_area.is_finite() {
                return asset.clone();
            }
            Asset {
                position: stationary_position(asset.position, work_area, params, rng),
                ..asset.clone()
            }
        }
        Motion::Mobile { target_position } => {
            if !asset.position.is_finite() || !target_position.is_finite() {
                return asset.clone();
            }
            let step = if asset.asset_type.is_worker() {
                params.worker_step_deg
            } else {
                params.equipment_step_deg
            };

            let v = vector_to(asset.position, target_position);
            let (position, target_position) = if v.distance < params.arrival_threshold_deg {
                let radius_m = layout.area.section_radius_m() * params.retarget_radius_factor;
                (asset.position, random_point_in_circle(section.center, radius_m, rng))
            } else {
                (step_toward(asset.position, &v, step), target_position)
            };

            let endangered = asset.asset_type.is_worker()
                && in_section_zone(position, &asset.section, layout.zones);
            let status = if endangered {
                Status::Danger
            } else {
                Status::Safe
            };

            Asset {
                position,
                motion: Motion::Mobile { target_position },
                status,
                ..asset.clone()
            }
        }
    }
}

/// Walk back toward the work area, or jitter around it once there.
fn stationary_position(
    position: LatLon,
    work_area: LatLon,
    params: &MotionConfig,
    rng: &mut impl Rng,
) -> LatLon {
    let v = vector_to(position, work_area);
    if v.distance > params.arrival_threshold_deg {
        return step_toward(position, &v, params.stationary_step_deg);
    }
    let box_deg = params.jitter_box_m / METERS_PER_DEGREE;
    let u: f64 = rng.random();
    let w: f64 = rng.random();
    LatLon::new(
        work_area.lat + (u - 0.5) * box_deg,
        work_area.lon + (w - 0.5) * box_deg,
    )
}

fn in_section_zone(position: LatLon, section: &str, zones: &[DangerZone]) -> bool {
    zones
        .iter()
        .filter(|z| z.section == section)
        .any(|z| point_in_polygon(position, &z.bounds))
}
