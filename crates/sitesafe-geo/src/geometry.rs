//! Planar and spherical helpers for site-scale coordinates.
//!
//! Positions are plain latitude/longitude pairs. Within a construction site
//! (a few hundred meters) the engine treats degree space as flat: distances
//! and steps are measured in degrees, and meters are converted with a fixed
//! scale of [`METERS_PER_DEGREE`]. The conversion breaks down near the poles
//! and for radii of many kilometers; nothing here attempts to correct that.

use std::f64::consts::PI;

use rand::Rng;
use sitesafe_types::LatLon;

/// Approximate meters per degree of latitude.
pub const METERS_PER_DEGREE: f64 = 111_111.0;

/// Mean Earth radius used by [`haversine_m`].
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Direction and planar distance from one coordinate to another, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DegreeVector {
    /// Latitude delta.
    pub d_lat: f64,
    /// Longitude delta.
    pub d_lon: f64,
    /// Euclidean length of the delta in degree space.
    pub distance: f64,
}

/// Sample a point uniformly over a disk of `radius_m` meters around `center`.
///
/// Uses `r = R * sqrt(u)` so that density is uniform over the area rather
/// than clustered at the center. The longitude offset is widened by the
/// cosine of the center latitude.
pub fn random_point_in_circle(center: LatLon, radius_m: f64, rng: &mut impl Rng) -> LatLon {
    let u: f64 = rng.random();
    let v: f64 = rng.random();
    let r = radius_m * u.sqrt();
    let theta = 2.0 * PI * v;

    let d_lat = r * theta.cos() / METERS_PER_DEGREE;
    let d_lon = r * theta.sin() / (METERS_PER_DEGREE * center.lat.to_radians().cos());

    LatLon::new(center.lat + d_lat, center.lon + d_lon)
}

/// Even-odd ray-casting containment test.
///
/// The polygon closes implicitly from the last vertex back to the first.
/// Fewer than three vertices never contain anything.
pub fn point_in_polygon(point: LatLon, vertices: &[LatLon]) -> bool {
    if vertices.len() < 3 {
        return false;
    }
    let Some(&last) = vertices.last() else {
        return false;
    };

    let (x, y) = (point.lat, point.lon);
    let mut inside = false;

    // Pair every vertex with its predecessor, starting from (v0, v_last).
    let predecessors = std::iter::once(last).chain(vertices.iter().copied());
    for (vi, vj) in vertices.iter().copied().zip(predecessors) {
        let (xi, yi) = (vi.lat, vi.lon);
        let (xj, yj) = (vj.lat, vj.lon);

        let crosses = (yi > y) != (yj > y);
        if crosses && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
    }

    inside
}

/// Planar delta and distance from `from` to `to` in degree space.
pub fn vector_to(from: LatLon, to: LatLon) -> DegreeVector {
    let d_lat = to.lat - from.lat;
    let d_lon = to.lon - from.lon;
    DegreeVector {
        d_lat,
        d_lon,
        distance: d_lat.hypot(d_lon),
    }
}

/// Move `step` degrees from `from` along `vector`.
///
/// A zero-length vector leaves the position unchanged.
pub fn step_toward(from: LatLon, vector: &DegreeVector, step: f64) -> LatLon {
    if vector.distance <= 0.0 || !vector.distance.is_finite() {
        return from;
    }
    LatLon::new(
        from.lat + vector.d_lat / vector.distance * step,
        from.lon + vector.d_lon / vector.distance * step,
    )
}

/// Great-circle distance between two coordinates, in meters.
pub fn haversine_m(a: LatLon, b: LatLon) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Inverse of the degree/meter scaling in [`random_point_in_circle`].
pub fn approx_distance_m(center: LatLon, point: LatLon) -> f64 {
    let dy = (point.lat - center.lat) * METERS_PER_DEGREE;
    let dx = (point.lon - center.lon) * METERS_PER_DEGREE * center.lat.to_radians().cos();
    dy.hypot(dx)
}
