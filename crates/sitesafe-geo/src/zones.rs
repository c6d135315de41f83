//! Danger-zone generation and vertex editing.
//!
//! Every section gets one square zone centered on it. Zones can then be
//! reshaped vertex by vertex or have their bounds replaced outright. When
//! section geometry is re-applied, [`regenerate_zones`] decides per
//! [`ZonePolicy`] which custom shapes survive.

use serde::{Deserialize, Serialize};
use sitesafe_types::{DangerZone, LatLon, SiteSection, ZoneId};
use tracing::debug;

use crate::error::GeoError;
use crate::geometry::vector_to;

/// Default half-width of a generated square zone, in degrees.
pub const DEFAULT_HALF_WIDTH_DEG: f64 = 0.0005;

/// Two section centers closer than this (in degrees) count as unmoved.
const CENTER_EPSILON_DEG: f64 = 1e-9;

/// What happens to committed zones when section geometry is re-applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZonePolicy {
    /// Discard every zone and rebuild the default squares.
    Regenerate,
    /// Keep a section's zones when that section's center did not move.
    #[default]
    PreserveUnmoved,
}

/// The four corners of an axis-aligned square around `center`.
///
/// Order: north-west, north-east, south-east, south-west.
pub fn square_around(center: LatLon, half_width_deg: f64) -> Vec<LatLon> {
    let o = half_width_deg;
    vec![
        LatLon::new(center.lat + o, center.lon - o),
        LatLon::new(center.lat + o, center.lon + o),
        LatLon::new(center.lat - o, center.lon + o),
        LatLon::new(center.lat - o, center.lon - o),
    ]
}

/// One square zone per section, with ids counting up from 1 in section order.
pub fn default_danger_zones(sections: &[SiteSection], half_width_deg: f64) -> Vec<DangerZone> {
    (1_u32..)
        .zip(sections)
        .map(|(id, section)| DangerZone {
            id: ZoneId::new(id),
            section: section.name.clone(),
            bounds: square_around(section.center, half_width_deg),
        })
        .collect()
}

fn find_zone_mut(zones: &mut [DangerZone], zone_id: ZoneId) -> Result<&mut DangerZone, GeoError> {
    zones
        .iter_mut()
        .find(|z| z.id == zone_id)
        .ok_or(GeoError::ZoneNotFound(zone_id))
}

/// Move a single vertex of a zone to a new position.
pub fn move_vertex(
    zones: &mut [DangerZone],
    zone_id: ZoneId,
    vertex_index: usize,
    position: LatLon,
) -> Result<(), GeoError> {
    if !position.is_finite() {
        return Err(GeoError::NonFiniteVertex { zone: zone_id });
    }
    let zone = find_zone_mut(zones, zone_id)?;
    let len = zone.bounds.len();
    let vertex = zone
        .bounds
        .get_mut(vertex_index)
        .ok_or(GeoError::VertexOutOfRange {
            zone: zone_id,
            index: vertex_index,
            len,
        })?;
    *vertex = position;
    Ok(())
}

/// Replace all vertices of a zone. At least three finite vertices are required.
pub fn replace_bounds(
    zones: &mut [DangerZone],
    zone_id: ZoneId,
    bounds: Vec<LatLon>,
) -> Result<(), GeoError> {
    if bounds.len() < 3 {
        return Err(GeoError::DegenerateBounds {
            zone: zone_id,
            count: bounds.len(),
        });
    }
    if bounds.iter().any(|v| !v.is_finite()) {
        return Err(GeoError::NonFiniteVertex { zone: zone_id });
    }
    let zone = find_zone_mut(zones, zone_id)?;
    zone.bounds = bounds;
    Ok(())
}

/// Rebuild the zone set after the sections changed.
///
/// Under [`ZonePolicy::PreserveUnmoved`] a section whose center is the same
/// in `previous_sections` and `sections` keeps its committed zones. All other
/// sections, and every section under [`ZonePolicy::Regenerate`], get a fresh
/// default square.
pub fn regenerate_zones(
    previous_zones: &[DangerZone],
    previous_sections: &[SiteSection],
    sections: &[SiteSection],
    half_width_deg: f64,
    policy: ZonePolicy,
) -> Vec<DangerZone> {
    let defaults = default_danger_zones(sections, half_width_deg);
    if policy == ZonePolicy::Regenerate {
        return defaults;
    }

    let mut zones = Vec::with_capacity(defaults.len());
    for (section, fresh) in sections.iter().zip(defaults) {
        let unmoved = previous_sections
            .iter()
            .find(|p| p.name == section.name)
            .is_some_and(|p| vector_to(p.center, section.center).distance < CENTER_EPSILON_DEG);

        let kept: Vec<&DangerZone> = previous_zones
            .iter()
            .filter(|z| z.section == section.name)
            .collect();

        if unmoved && !kept.is_empty() {
            debug!(section = %section.name, zones = kept.len(), "keeping zones of unmoved section");
            zones.extend(kept.into_iter().cloned());
        } else {
            debug!(section = %section.name, "regenerating default zone");
            zones.push(fresh);
        }
    }
    zones
}
