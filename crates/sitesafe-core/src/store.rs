//! Committed site configuration and the two-phase edit workflow.
//!
//! The store owns the committed construction area, sections, danger zones
//! and asset counts. Section editing and zone editing each work on a draft
//! copy: `begin_*` creates it, the edit operations mutate only the draft,
//! `apply_*` swaps it in and `cancel_*` throws it away. At most one edit
//! mode is active at a time, and the motion engine only ever reads the
//! committed values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sitesafe_geo::{
    GeoError, StartingSite, default_danger_zones, haversine_m, move_vertex, regenerate_zones,
    replace_bounds,
};
use sitesafe_types::{
    AssetCounts, CaptureTarget, ConstructionArea, DangerZone, LatLon, MapView, SiteSection, ZoneId,
};
use tracing::{debug, info, warn};

use crate::config::ZoneConfig;

/// Default cap on the summed counts of one section.
pub const DEFAULT_MAX_ASSETS_PER_SECTION: u32 = 1000;

/// Total number of assets a section's counts ask for.
///
/// Every entry counts, catalog key or not.
pub fn requested_assets(counts: &BTreeMap<String, u32>) -> u64 {
    counts
        .values()
        .fold(0_u64, |acc, &n| acc.saturating_add(u64::from(n)))
}

/// The two edit modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditMode {
    /// Editing the construction area and section centers.
    Sections,
    /// Editing danger-zone polygons.
    Zones,
}

/// Errors returned by edit operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The operation needs an edit mode that is not active.
    #[error("not editing {mode:?}")]
    NotEditing {
        /// The mode the operation belongs to.
        mode: EditMode,
    },

    /// The operation is not allowed while an edit is in progress.
    #[error("an edit of {active:?} is already in progress")]
    EditInProgress {
        /// The currently active mode.
        active: EditMode,
    },

    /// No section with this name exists.
    #[error("unknown section: {0}")]
    UnknownSection(String),

    /// New counts would put a section over the asset limit.
    #[error("section {section} requests {requested} assets, limit is {limit}")]
    TooManyAssets {
        /// The section the counts were for.
        section: String,
        /// Sum of the requested counts.
        requested: u64,
        /// The store's per-section limit.
        limit: u32,
    },

    /// A captured map view had non-finite coordinates.
    #[error("captured map view has non-finite coordinates")]
    InvalidView,

    /// A zone edit was rejected by the geometry layer.
    #[error("zone edit failed: {source}")]
    Geo {
        /// The underlying geometry error.
        #[from]
        source: GeoError,
    },
}

/// Draft copy of the site geometry during section editing.
#[derive(Debug, Clone, PartialEq)]
struct SectionDraft {
    area: ConstructionArea,
    sections: Vec<SiteSection>,
}

/// Committed configuration plus the active draft, if any.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    area: ConstructionArea,
    sections: Vec<SiteSection>,
    zones: Vec<DangerZone>,
    counts: AssetCounts,
    section_draft: Option<SectionDraft>,
    zone_draft: Option<Vec<DangerZone>>,
    zone_config: ZoneConfig,
    max_assets_per_section: u32,
}

impl ConfigStore {
    /// Create a store from resolved site geometry, with default zones.
    pub fn new(site: StartingSite, counts: AssetCounts, zone_config: ZoneConfig) -> Self {
        let zones = default_danger_zones(&site.sections, zone_config.half_width_deg);
        Self {
            area: site.area,
            sections: site.sections,
            zones,
            counts,
            section_draft: None,
            zone_draft: None,
            zone_config,
            max_assets_per_section: DEFAULT_MAX_ASSETS_PER_SECTION,
        }
    }

    /// Replace the per-section asset limit enforced on count changes.
    #[must_use]
    pub const fn with_asset_limit(mut self, max_assets_per_section: u32) -> Self {
        self.max_assets_per_section = max_assets_per_section;
        self
    }

    /// The per-section asset limit.
    pub const fn asset_limit(&self) -> u32 {
        self.max_assets_per_section
    }

    // -----------------------------------------------------------------------
    // Committed state
    // -----------------------------------------------------------------------

    /// Committed construction area.
    pub const fn area(&self) -> &ConstructionArea {
        &self.area
    }

    /// Committed sections, in order.
    pub fn sections(&self) -> &[SiteSection] {
        &self.sections
    }

    /// Committed danger zones.
    pub fn zones(&self) -> &[DangerZone] {
        &self.zones
    }

    /// Committed per-section asset counts.
    pub const fn counts(&self) -> &AssetCounts {
        &self.counts
    }

    /// The active edit mode, if any.
    pub const fn edit_mode(&self) -> Option<EditMode> {
        if self.section_draft.is_some() {
            Some(EditMode::Sections)
        } else if self.zone_draft.is_some() {
            Some(EditMode::Zones)
        } else {
            None
        }
    }

    /// Whether any edit mode is active.
    pub const fn is_editing(&self) -> bool {
        self.edit_mode().is_some()
    }

    fn ensure_idle(&self) -> Result<(), StoreError> {
        match self.edit_mode() {
            Some(active) => Err(StoreError::EditInProgress { active }),
            None => Ok(()),
        }
    }

    // -----------------------------------------------------------------------
    // What the dashboard draws
    // -----------------------------------------------------------------------

    /// Zones to draw: the draft while zone editing, else the committed set.
    pub fn displayed_zones(&self) -> &[DangerZone] {
        self.zone_draft.as_deref().unwrap_or(&self.zones)
    }

    /// Area to draw: the draft while section editing, else the committed one.
    pub fn displayed_area(&self) -> &ConstructionArea {
        self.section_draft.as_ref().map_or(&self.area, |d| &d.area)
    }

    /// Sections to draw: the draft while section editing, else committed.
    pub fn displayed_sections(&self) -> &[SiteSection] {
        self.section_draft
            .as_ref()
            .map_or(self.sections.as_slice(), |d| d.sections.as_slice())
    }

    // -----------------------------------------------------------------------
    // Counts
    // -----------------------------------------------------------------------

    /// Replace the counts of one section.
    ///
    /// Counts summing past the asset limit are refused and the committed
    /// counts stay as they were. The caller regenerates assets afterwards;
    /// zones are left untouched.
    pub fn set_section_counts(
        &mut self,
        section: &str,
        counts: BTreeMap<String, u32>,
    ) -> Result<(), StoreError> {
        self.ensure_idle()?;
        if !self.sections.iter().any(|s| s.name == section) {
            return Err(StoreError::UnknownSection(section.to_string()));
        }
        let requested = requested_assets(&counts);
        if requested > u64::from(self.max_assets_per_section) {
            warn!(
                section,
                requested,
                limit = self.max_assets_per_section,
                "section counts refused"
            );
            return Err(StoreError::TooManyAssets {
                section: section.to_string(),
                requested,
                limit: self.max_assets_per_section,
            });
        }
        self.counts.insert(section.to_string(), counts);
        debug!(section, "section counts replaced");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Section editing
    // -----------------------------------------------------------------------

    /// Enter section editing with a draft copy of the area and sections.
    pub fn begin_section_edit(&mut self) -> Result<(), StoreError> {
        self.ensure_idle()?;
        self.section_draft = Some(SectionDraft {
            area: self.area,
            sections: self.sections.clone(),
        });
        info!("section editing started");
        Ok(())
    }

    /// Apply a captured map view to the draft.
    ///
    /// For the construction area the view center becomes the area center
    /// and the distance to the view's north-east corner becomes the radius.
    /// For a section the view center and zoom are taken. Returns the
    /// preview circle (center and radius of the captured view).
    pub fn capture_view(
        &mut self,
        target: &CaptureTarget,
        view: &MapView,
    ) -> Result<ConstructionArea, StoreError> {
        let draft = self.section_draft.as_mut().ok_or(StoreError::NotEditing {
            mode: EditMode::Sections,
        })?;
        if !view.center.is_finite() || !view.north_east.is_finite() {
            return Err(StoreError::InvalidView);
        }

        let preview = ConstructionArea {
            center: view.center,
            radius_m: haversine_m(view.center, view.north_east),
        };

        match target {
            CaptureTarget::ConstructionArea => {
                draft.area = preview;
                debug!(radius_m = preview.radius_m, "captured construction area");
            }
            CaptureTarget::Section { name } => {
                let section = draft
                    .sections
                    .iter_mut()
                    .find(|s| &s.name == name)
                    .ok_or_else(|| StoreError::UnknownSection(name.clone()))?;
                section.center = view.center;
                section.zoom = view.zoom;
                debug!(section = %name, zoom = view.zoom, "captured section view");
            }
        }
        Ok(preview)
    }

    /// Commit the section draft and rebuild zones per the zone policy.
    ///
    /// The caller regenerates assets afterwards.
    pub fn apply_section_edit(&mut self) -> Result<(), StoreError> {
        let draft = self.section_draft.take().ok_or(StoreError::NotEditing {
            mode: EditMode::Sections,
        })?;
        self.zones = regenerate_zones(
            &self.zones,
            &self.sections,
            &draft.sections,
            self.zone_config.half_width_deg,
            self.zone_config.policy,
        );
        self.area = draft.area;
        self.sections = draft.sections;
        info!(
            radius_m = self.area.radius_m,
            sections = self.sections.len(),
            zones = self.zones.len(),
            "section edit applied"
        );
        Ok(())
    }

    /// Discard the section draft.
    pub fn cancel_section_edit(&mut self) -> Result<(), StoreError> {
        self.section_draft.take().ok_or(StoreError::NotEditing {
            mode: EditMode::Sections,
        })?;
        info!("section edit cancelled");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Zone editing
    // -----------------------------------------------------------------------

    /// Enter zone editing with a draft copy of the zones.
    pub fn begin_zone_edit(&mut self) -> Result<(), StoreError> {
        self.ensure_idle()?;
        self.zone_draft = Some(self.zones.clone());
        info!("zone editing started");
        Ok(())
    }

    fn zone_draft_mut(&mut self) -> Result<&mut Vec<DangerZone>, StoreError> {
        self.zone_draft.as_mut().ok_or(StoreError::NotEditing {
            mode: EditMode::Zones,
        })
    }

    /// Move one vertex of a draft zone.
    pub fn move_zone_vertex(
        &mut self,
        zone: ZoneId,
        vertex: usize,
        position: LatLon,
    ) -> Result<(), StoreError> {
        let draft = self.zone_draft_mut()?;
        move_vertex(draft, zone, vertex, position)?;
        Ok(())
    }

    /// Replace all vertices of a draft zone.
    pub fn replace_zone_bounds(
        &mut self,
        zone: ZoneId,
        bounds: Vec<LatLon>,
    ) -> Result<(), StoreError> {
        let draft = self.zone_draft_mut()?;
        replace_bounds(draft, zone, bounds)?;
        Ok(())
    }

    /// Commit the zone draft.
    pub fn apply_zone_edit(&mut self) -> Result<(), StoreError> {
        let draft = self.zone_draft.take().ok_or(StoreError::NotEditing {
            mode: EditMode::Zones,
        })?;
        self.zones = draft;
        info!(zones = self.zones.len(), "zone edit applied");
        Ok(())
    }

    /// Discard the zone draft.
    pub fn cancel_zone_edit(&mut self) -> Result<(), StoreError> {
        self.zone_draft.take().ok_or(StoreError::NotEditing {
            mode: EditMode::Zones,
        })?;
        info!("zone edit cancelled");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use sitesafe_assets::default_counts;
    use sitesafe_geo::{create_starting_site, square_around};

    use super::*;

    fn store() -> ConfigStore {
        let site = create_starting_site();
        let counts = default_counts(&site.sections);
        ConfigStore::new(site, counts, ZoneConfig::default())
    }

    fn view(center: LatLon, zoom: u8) -> MapView {
        MapView {
            center,
            zoom,
            north_east: LatLon::new(center.lat + 0.002, center.lon + 0.003),
        }
    }

    // -----------------------------------------------------------------------
    // Modes
    // -----------------------------------------------------------------------

    #[test]
    fn new_store_is_idle_with_default_zones() {
        let s = store();
        assert_eq!(s.edit_mode(), None);
        assert_eq!(s.zones().len(), 3);
        assert_eq!(s.displayed_zones(), s.zones());
    }

    #[test]
    fn edit_modes_exclude_each_other() {
        let mut s = store();
        s.begin_section_edit().unwrap();
        assert!(matches!(
            s.begin_zone_edit(),
            Err(StoreError::EditInProgress {
                active: EditMode::Sections
            })
        ));
        assert!(matches!(
            s.begin_section_edit(),
            Err(StoreError::EditInProgress { .. })
        ));
        s.cancel_section_edit().unwrap();
        s.begin_zone_edit().unwrap();
        assert_eq!(s.edit_mode(), Some(EditMode::Zones));
    }

    #[test]
    fn operations_outside_their_mode_fail() {
        let mut s = store();
        let p = LatLon::new(37.5, 127.2);
        assert!(matches!(
            s.capture_view(&CaptureTarget::ConstructionArea, &view(p, 16)),
            Err(StoreError::NotEditing {
                mode: EditMode::Sections
            })
        ));
        assert!(matches!(
            s.move_zone_vertex(ZoneId::new(1), 0, p),
            Err(StoreError::NotEditing {
                mode: EditMode::Zones
            })
        ));
        assert!(s.apply_section_edit().is_err());
        assert!(s.cancel_zone_edit().is_err());
    }

    // -----------------------------------------------------------------------
    // Section editing
    // -----------------------------------------------------------------------

    #[test]
    fn capture_area_uses_distance_to_north_east_corner() {
        let mut s = store();
        s.begin_section_edit().unwrap();
        let v = view(LatLon::new(37.546, 127.216), 15);
        let preview = s.capture_view(&CaptureTarget::ConstructionArea, &v).unwrap();

        let expected = haversine_m(v.center, v.north_east);
        assert!((preview.radius_m - expected).abs() < 1e-9);
        assert_eq!(s.displayed_area().center, v.center);
        // Committed area is untouched until apply.
        assert_eq!(s.area().center, LatLon::new(37.545, 127.215));
    }

    #[test]
    fn capture_section_takes_center_and_zoom() {
        let mut s = store();
        s.begin_section_edit().unwrap();
        let target = CaptureTarget::Section {
            name: String::from("Phase 2"),
        };
        let c = LatLon::new(37.5441, 127.2163);
        s.capture_view(&target, &view(c, 19)).unwrap();

        let draft = s.displayed_sections().get(1).unwrap();
        assert_eq!((draft.center, draft.zoom), (c, 19));
        let committed = s.sections().get(1).unwrap();
        assert_eq!(committed.zoom, 18);

        let missing = CaptureTarget::Section {
            name: String::from("Phase 9"),
        };
        assert!(matches!(
            s.capture_view(&missing, &view(c, 19)),
            Err(StoreError::UnknownSection(_))
        ));
    }

    #[test]
    fn capture_rejects_non_finite_view() {
        let mut s = store();
        s.begin_section_edit().unwrap();
        let bad = view(LatLon::new(f64::NAN, 127.2), 16);
        assert!(matches!(
            s.capture_view(&CaptureTarget::ConstructionArea, &bad),
            Err(StoreError::InvalidView)
        ));
    }

    #[test]
    fn apply_section_edit_commits_and_regenerates_moved_zones() {
        let mut s = store();
        let c = LatLon::new(37.5441, 127.2163);
        s.begin_section_edit().unwrap();
        s.capture_view(
            &CaptureTarget::Section {
                name: String::from("Phase 2"),
            },
            &view(c, 19),
        )
        .unwrap();
        s.apply_section_edit().unwrap();

        assert_eq!(s.edit_mode(), None);
        assert_eq!(s.sections().get(1).map(|x| x.center), Some(c));
        let zone = s.zones().iter().find(|z| z.section == "Phase 2").unwrap();
        assert_eq!(zone.bounds, square_around(c, ZoneConfig::default().half_width_deg));
    }

    #[test]
    fn cancel_section_edit_discards_draft() {
        let mut s = store();
        let before = s.sections().to_vec();
        s.begin_section_edit().unwrap();
        s.capture_view(
            &CaptureTarget::Section {
                name: String::from("Phase 1"),
            },
            &view(LatLon::new(37.0, 127.0), 12),
        )
        .unwrap();
        s.cancel_section_edit().unwrap();
        assert_eq!(s.sections(), before.as_slice());
        assert_eq!(s.displayed_sections(), before.as_slice());
    }

    // -----------------------------------------------------------------------
    // Zone editing
    // -----------------------------------------------------------------------

    #[test]
    fn zone_edits_touch_only_the_draft_until_applied() {
        let mut s = store();
        let committed = s.zones().to_vec();
        let p = LatLon::new(37.547, 127.213);

        s.begin_zone_edit().unwrap();
        s.move_zone_vertex(ZoneId::new(1), 0, p).unwrap();
        assert_eq!(s.zones(), committed.as_slice());
        assert_eq!(
            s.displayed_zones().first().and_then(|z| z.bounds.first().copied()),
            Some(p)
        );

        s.apply_zone_edit().unwrap();
        assert_eq!(s.zones().first().and_then(|z| z.bounds.first().copied()), Some(p));
        assert_eq!(s.displayed_zones(), s.zones());
    }

    #[test]
    fn cancel_zone_edit_restores_committed_zones() {
        let mut s = store();
        let committed = s.zones().to_vec();
        s.begin_zone_edit().unwrap();
        let triangle = vec![
            LatLon::new(37.545, 127.213),
            LatLon::new(37.546, 127.215),
            LatLon::new(37.544, 127.215),
        ];
        s.replace_zone_bounds(ZoneId::new(3), triangle).unwrap();
        s.cancel_zone_edit().unwrap();
        assert_eq!(s.displayed_zones(), committed.as_slice());
    }

    #[test]
    fn invalid_zone_edits_surface_geo_errors() {
        let mut s = store();
        s.begin_zone_edit().unwrap();
        let result = s.replace_zone_bounds(ZoneId::new(1), vec![LatLon::new(0.0, 0.0)]);
        assert!(matches!(result, Err(StoreError::Geo { .. })));
    }

    // -----------------------------------------------------------------------
    // Counts
    // -----------------------------------------------------------------------

    #[test]
    fn set_counts_requires_known_section_and_idle_store() {
        let mut s = store();
        let mut c = BTreeMap::new();
        c.insert(String::from("workers"), 9);

        s.set_section_counts("Phase 3", c.clone()).unwrap();
        assert_eq!(
            s.counts().get("Phase 3").and_then(|m| m.get("workers")).copied(),
            Some(9)
        );
        assert!(matches!(
            s.set_section_counts("Nope", c.clone()),
            Err(StoreError::UnknownSection(_))
        ));

        s.begin_zone_edit().unwrap();
        assert!(matches!(
            s.set_section_counts("Phase 3", c),
            Err(StoreError::EditInProgress { .. })
        ));
    }

    #[test]
    fn counts_change_leaves_zones_alone() {
        let mut s = store();
        s.begin_zone_edit().unwrap();
        s.move_zone_vertex(ZoneId::new(2), 1, LatLon::new(37.5449, 127.2168))
            .unwrap();
        s.apply_zone_edit().unwrap();
        let edited = s.zones().to_vec();

        s.set_section_counts("Phase 2", BTreeMap::new()).unwrap();
        assert_eq!(s.zones(), edited.as_slice());
    }

    #[test]
    fn counts_over_the_asset_limit_are_refused() {
        let mut s = store().with_asset_limit(10);
        let before = s.counts().clone();

        let mut huge = BTreeMap::new();
        huge.insert(String::from("workers"), u32::MAX);
        huge.insert(String::from("excavators"), u32::MAX);
        let expected = u64::from(u32::MAX).saturating_mul(2);
        let refused = s.set_section_counts("Phase 1", huge);
        assert!(matches!(
            refused,
            Err(StoreError::TooManyAssets {
                requested,
                limit: 10,
                ..
            }) if requested == expected
        ));
        assert_eq!(s.counts(), &before);

        let mut at_limit = BTreeMap::new();
        at_limit.insert(String::from("workers"), 6);
        at_limit.insert(String::from("loaders"), 4);
        s.set_section_counts("Phase 1", at_limit).unwrap();
        assert_eq!(requested_assets(s.counts().get("Phase 1").unwrap()), 10);
    }

    #[test]
    fn new_store_uses_the_default_asset_limit() {
        assert_eq!(store().asset_limit(), DEFAULT_MAX_ASSETS_PER_SECTION);
    }
}
