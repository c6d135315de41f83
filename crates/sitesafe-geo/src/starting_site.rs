//! Default demo site: one construction area with three work phases.
//!
//! Used when no site geometry is configured, and as the baseline the
//! dashboard starts from before any section edit.

use sitesafe_types::{ConstructionArea, LatLon, SiteSection};

/// Zoom level used when focusing a default section.
pub const DEFAULT_SECTION_ZOOM: u8 = 18;

/// Committed site geometry: the construction area and its ordered sections.
#[derive(Debug, Clone, PartialEq)]
pub struct StartingSite {
    /// Overall site boundary.
    pub area: ConstructionArea,
    /// Sections in display order.
    pub sections: Vec<SiteSection>,
}

fn section(name: &str, lat: f64, lon: f64) -> SiteSection {
    SiteSection {
        name: name.to_string(),
        center: LatLon::new(lat, lon),
        zoom: DEFAULT_SECTION_ZOOM,
    }
}

/// Create the default site: a 250 m area with three phases around it.
pub fn create_starting_site() -> StartingSite {
    StartingSite {
        area: ConstructionArea {
            center: LatLon::new(37.545, 127.215),
            radius_m: 250.0,
        },
        sections: vec![
            section("Phase 1", 37.5455, 127.214),
            section("Phase 2", 37.5445, 127.216),
            section("Phase 3", 37.544, 127.2145),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::approx_distance_m;

    #[test]
    fn three_uniquely_named_sections() {
        let site = create_starting_site();
        let names: Vec<&str> = site.sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Phase 1", "Phase 2", "Phase 3"]);
    }

    #[test]
    fn sections_lie_inside_the_area() {
        let site = create_starting_site();
        for s in &site.sections {
            assert!(approx_distance_m(site.area.center, s.center) < site.area.radius_m);
        }
        assert_eq!(site.area.overview_zoom(), 16);
    }
}
