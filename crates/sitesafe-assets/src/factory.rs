//! Asset factory: builds the full asset collection from site geometry and
//! per-section counts.
//!
//! Generation is a full replace. Ids restart at 1 on every call and are
//! assigned in section order, then catalog order, then instance order.

use rand::Rng;
use sitesafe_geo::random_point_in_circle;
use sitesafe_types::{
    Asset, AssetCounts, AssetId, AssetType, ConstructionArea, LatLon, Mobility, Motion,
    SiteSection, Status,
};
use tracing::{debug, info};

use crate::catalog::{CATALOG, is_known_key};

/// Create every asset for the given sections and counts.
///
/// Each asset starts at a random point within a third of the area radius
/// of its section center. Stationary equipment takes its start position as
/// its work area; mobile assets draw an independent first target from the
/// same circle. Count keys not in the catalog and count entries for
/// sections that do not exist are skipped.
pub fn generate_initial_assets(
    area: &ConstructionArea,
    sections: &[SiteSection],
    counts: &AssetCounts,
    rng: &mut impl Rng,
) -> Vec<Asset> {
    let radius_m = area.section_radius_m();
    let mut assets = Vec::new();
    let mut next_id: u32 = 1;

    for name in counts.keys() {
        if !sections.iter().any(|s| &s.name == name) {
            debug!(section = %name, "ignoring counts for unknown section");
        }
    }

    for section in sections {
        let Some(section_counts) = counts.get(&section.name) else {
            debug!(section = %section.name, "no counts for section");
            continue;
        };

        for key in section_counts.keys().filter(|k| !is_known_key(k)) {
            debug!(section = %section.name, key = %key, "ignoring unknown equipment key");
        }

        for entry in &CATALOG {
            let count = section_counts.get(entry.key).copied().unwrap_or(0);
            for n in 1..=count {
                let position = random_point_in_circle(section.center, radius_m, rng);
                let motion = initial_motion(entry.asset_type, section.center, position, radius_m, rng);
                assets.push(Asset {
                    id: AssetId::new(next_id),
                    name: format!("{} #{n}", entry.asset_type.display_name()),
                    asset_type: entry.asset_type,
                    position,
                    motion,
                    status: Status::Safe,
                    section: section.name.clone(),
                });
                next_id = next_id.saturating_add(1);
            }
        }
    }

    info!(
        assets = assets.len(),
        sections = sections.len(),
        "generated initial assets"
    );
    assets
}

fn initial_motion(
    asset_type: AssetType,
    section_center: LatLon,
    position: LatLon,
    radius_m: f64,
    rng: &mut impl Rng,
) -> Motion {
    match asset_type.mobility() {
        Mobility::Stationary => Motion::Stationary {
            work_area: position,
        },
        Mobility::Mobile => Motion::Mobile {
            target_position: random_point_in_circle(section_center, radius_m, rng),
        },
    }
}

/// Point a stationary asset at a new work area.
///
/// Returns `false` without changing anything when the id is unknown or the
/// asset is mobile.
pub fn set_work_area(assets: &mut [Asset], id: AssetId, work_area: LatLon) -> bool {
    let Some(asset) = assets.iter_mut().find(|a| a.id == id) else {
        debug!(asset = %id, "set_work_area: unknown asset");
        return false;
    };
    match &mut asset.motion {
        Motion::Stationary { work_area: current } => {
            *current = work_area;
            true
        }
        Motion::Mobile { .. } => {
            debug!(asset = %id, "set_work_area: asset is mobile");
            false
        }
    }
}
