//! Coordinator state and the single-tick entry point.
//!
//! [`SimulationState`] is the explicit state container the runner owns: the
//! configuration store, the current asset collection, the motion constants
//! and the seeded random source. Commands and ticks both go through it, one
//! at a time, so an edit can never interleave with a motion update.
//!
//! Each call to [`run_tick`] either advances every asset once or, while an
//! edit mode is active, skips the period entirely. Skipped periods are not
//! queued up and replayed later.

use rand::SeedableRng;
use rand::rngs::SmallRng;
use sitesafe_assets::{generate_initial_assets, set_work_area};
use sitesafe_types::{Asset, SectionRisk, SiteCommand, SiteSnapshot};
use tracing::{debug, info};

use crate::config::{MotionConfig, SimulationConfig};
use crate::motion::{SiteLayout, advance_assets};
use crate::risk::{section_risk, workers_in_danger};
use crate::store::{ConfigStore, EditMode, StoreError};

/// Errors that can occur during tick execution.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// The tick counter cannot be advanced any further.
    #[error("tick counter overflow after tick {tick}")]
    CounterOverflow {
        /// The last tick that ran.
        tick: u64,
    },
}

/// What a scheduler period did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Every asset advanced one step.
    Advanced,
    /// An edit mode was active, so nothing moved.
    SkippedEditing(EditMode),
}

/// Summary of a single scheduler period.
#[derive(Debug, Clone)]
pub struct TickSummary {
    /// Number of advanced ticks after this period.
    pub tick: u64,
    /// Whether the assets moved.
    pub outcome: TickOutcome,
    /// Number of assets in the collection.
    pub assets: u32,
    /// Workers inside a danger zone of their own section.
    pub workers_in_danger: u32,
    /// Per-section risk after this period.
    pub risk: Vec<SectionRisk>,
}

/// The mutable simulation state passed through the tick cycle.
#[derive(Debug)]
pub struct SimulationState {
    /// Committed configuration and edit drafts.
    pub store: ConfigStore,
    /// Current asset collection.
    pub assets: Vec<Asset>,
    /// Motion constants.
    pub motion: MotionConfig,
    /// Random source for sampling, jitter and retargeting.
    pub rng: SmallRng,
    /// Number of ticks that advanced assets.
    pub tick: u64,
    /// Number of periods skipped because an edit was in progress.
    pub skipped_ticks: u64,
}

impl SimulationState {
    /// Build the state from a store, generating the initial assets.
    pub fn new(store: ConfigStore, motion: MotionConfig, seed: u64) -> Self {
        let mut state = Self {
            store,
            assets: Vec::new(),
            motion,
            rng: SmallRng::seed_from_u64(seed),
            tick: 0,
            skipped_ticks: 0,
        };
        state.regenerate_assets();
        state
    }

    /// Build the state described by a loaded configuration.
    pub fn from_config(config: &SimulationConfig) -> Self {
        let (site, counts) = config.site.resolve();
        let store = ConfigStore::new(site, counts, config.zones)
            .with_asset_limit(config.site.max_assets_per_section);
        Self::new(store, config.motion, config.world.seed)
    }

    /// Replace the asset collection from the committed configuration.
    pub fn regenerate_assets(&mut self) {
        self.assets = generate_initial_assets(
            self.store.area(),
            self.store.sections(),
            self.store.counts(),
            &mut self.rng,
        );
    }

    /// Apply one dashboard command.
    ///
    /// Applying a section edit or changing counts regenerates every asset.
    /// Work-area changes are refused while an edit is in progress, like the
    /// other non-edit commands.
    pub fn apply_command(&mut self, command: SiteCommand) -> Result<(), StoreError> {
        debug!(command = command.kind(), "applying command");
        match command {
            SiteCommand::SetSectionCounts { section, counts } => {
                self.store.set_section_counts(&section, counts)?;
                self.regenerate_assets();
            }
            SiteCommand::BeginSectionEdit => self.store.begin_section_edit()?,
            SiteCommand::CaptureView { target, view } => {
                let preview = self.store.capture_view(&target, &view)?;
                debug!(
                    lat = preview.center.lat,
                    lon = preview.center.lon,
                    radius_m = preview.radius_m,
                    "view captured"
                );
            }
            SiteCommand::ApplySectionEdit => {
                self.store.apply_section_edit()?;
                self.regenerate_assets();
            }
            SiteCommand::CancelSectionEdit => self.store.cancel_section_edit()?,
            SiteCommand::BeginZoneEdit => self.store.begin_zone_edit()?,
            SiteCommand::MoveZoneVertex {
                zone,
                vertex,
                position,
            } => self.store.move_zone_vertex(zone, vertex, position)?,
            SiteCommand::ReplaceZoneBounds { zone, bounds } => {
                self.store.replace_zone_bounds(zone, bounds)?;
            }
            SiteCommand::ApplyZoneEdit => self.store.apply_zone_edit()?,
            SiteCommand::CancelZoneEdit => self.store.cancel_zone_edit()?,
            SiteCommand::SetWorkArea { asset, work_area } => {
                if let Some(active) = self.store.edit_mode() {
                    return Err(StoreError::EditInProgress { active });
                }
                set_work_area(&mut self.assets, asset, work_area);
            }
        }
        Ok(())
    }

    /// Per-section risk of the current assets.
    pub fn risk(&self) -> Vec<SectionRisk> {
        section_risk(&self.assets, self.store.sections())
    }

    /// Everything the dashboard draws, drafts included.
    pub fn snapshot(&self) -> SiteSnapshot {
        let mode = self.store.edit_mode();
        SiteSnapshot {
            tick: self.tick,
            assets: self.assets.clone(),
            zones: self.store.displayed_zones().to_vec(),
            sections: self.store.displayed_sections().to_vec(),
            area: Some(*self.store.displayed_area()),
            risk: self.risk(),
            editing_sections: mode == Some(EditMode::Sections),
            editing_zones: mode == Some(EditMode::Zones),
        }
    }
}

/// Execute one scheduler period.
///
/// Skips the motion update while any edit mode is active; otherwise
/// advances every asset against the committed layout.
pub fn run_tick(state: &mut SimulationState) -> Result<TickSummary, TickError> {
    let outcome = if let Some(mode) = state.store.edit_mode() {
        state.skipped_ticks = state.skipped_ticks.saturating_add(1);
        debug!(tick = state.tick, mode = ?mode, "tick skipped while editing");
        TickOutcome::SkippedEditing(mode)
    } else {
        let layout = SiteLayout {
            area: state.store.area(),
            sections: state.store.sections(),
            zones: state.store.zones(),
        };
        state.assets = advance_assets(&state.assets, &layout, &state.motion, &mut state.rng);
        state.tick = state
            .tick
            .checked_add(1)
            .ok_or(TickError::CounterOverflow { tick: state.tick })?;
        TickOutcome::Advanced
    };

    let risk = state.risk();
    let summary = TickSummary {
        tick: state.tick,
        outcome,
        assets: u32::try_from(state.assets.len()).unwrap_or(u32::MAX),
        workers_in_danger: workers_in_danger(&risk),
        risk,
    };

    if outcome == TickOutcome::Advanced {
        info!(
            tick = summary.tick,
            assets = summary.assets,
            workers_in_danger = summary.workers_in_danger,
            "Tick completed"
        );
    }
    Ok(summary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use sitesafe_types::{AssetId, CaptureTarget, LatLon, MapView, Mobility, Status, ZoneId};

    use super::*;

    fn state() -> SimulationState {
        SimulationState::from_config(&SimulationConfig::default())
    }

    #[test]
    fn default_state_has_demo_assets() {
        let s = state();
        // 14 equipment categories x 3 sections + 3 + 5 + 6 workers.
        assert_eq!(s.assets.len(), 14 * 3 + 14);
        let ids: Vec<u32> = s.assets.iter().map(|a| a.id.into_inner()).collect();
        let expected: Vec<u32> = (1..=56).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn tick_advances_and_counts() {
        let mut s = state();
        let before = s.assets.clone();
        let summary = run_tick(&mut s).unwrap();
        assert_eq!(summary.outcome, TickOutcome::Advanced);
        assert_eq!(summary.tick, 1);
        assert_eq!(summary.risk.len(), 3);
        assert_ne!(s.assets, before);
    }

    #[test]
    fn ticks_are_skipped_while_editing() {
        let mut s = state();
        s.apply_command(SiteCommand::BeginZoneEdit).unwrap();
        let before = s.assets.clone();

        let summary = run_tick(&mut s).unwrap();
        assert_eq!(summary.outcome, TickOutcome::SkippedEditing(EditMode::Zones));
        assert_eq!(summary.tick, 0);
        assert_eq!(s.skipped_ticks, 1);
        assert_eq!(s.assets, before);

        s.apply_command(SiteCommand::CancelZoneEdit).unwrap();
        assert_eq!(run_tick(&mut s).unwrap().outcome, TickOutcome::Advanced);
    }

    #[test]
    fn counts_command_regenerates_assets() {
        let mut s = state();
        let mut counts = BTreeMap::new();
        counts.insert(String::from("workers"), 2);
        s.apply_command(SiteCommand::SetSectionCounts {
            section: String::from("Phase 1"),
            counts,
        })
        .unwrap();
        let phase1: Vec<&Asset> = s.assets.iter().filter(|a| a.section == "Phase 1").collect();
        assert_eq!(phase1.len(), 2);
        assert_eq!(s.assets.first().map(|a| a.id), Some(AssetId::new(1)));
    }

    #[test]
    fn oversized_counts_command_leaves_assets_alone() {
        let mut config = SimulationConfig::default();
        config.site.max_assets_per_section = 50;
        let mut s = SimulationState::from_config(&config);
        let before = s.assets.clone();

        let mut counts = BTreeMap::new();
        counts.insert(String::from("workers"), u32::MAX);
        let refused = s.apply_command(SiteCommand::SetSectionCounts {
            section: String::from("Phase 2"),
            counts,
        });
        assert!(matches!(
            refused,
            Err(StoreError::TooManyAssets { limit: 50, .. })
        ));
        assert_eq!(s.assets, before);
    }

    #[test]
    fn applying_a_section_edit_regenerates_assets_around_new_center() {
        let mut s = state();
        let c = LatLon::new(37.5435, 127.2175);
        s.apply_command(SiteCommand::BeginSectionEdit).unwrap();
        s.apply_command(SiteCommand::CaptureView {
            target: CaptureTarget::Section {
                name: String::from("Phase 3"),
            },
            view: MapView {
                center: c,
                zoom: 19,
                north_east: LatLon::new(c.lat + 0.001, c.lon + 0.001),
            },
        })
        .unwrap();

        // Drafts are visible in the snapshot but not used by the engine.
        let snap = s.snapshot();
        assert!(snap.editing_sections);
        assert_eq!(snap.sections.get(2).map(|x| x.center), Some(c));
        assert_ne!(s.store.sections().get(2).map(|x| x.center), Some(c));

        s.apply_command(SiteCommand::ApplySectionEdit).unwrap();
        let limit = s.store.area().section_radius_m() + 1e-6;
        for asset in s.assets.iter().filter(|a| a.section == "Phase 3") {
            assert!(sitesafe_geo::approx_distance_m(c, asset.position) <= limit);
        }
    }

    #[test]
    fn work_area_command_is_refused_while_editing() {
        let mut s = state();
        let stationary = s
            .assets
            .iter()
            .find(|a| a.asset_type.mobility() == Mobility::Stationary)
            .map(|a| a.id)
            .unwrap();
        let spot = LatLon::new(37.5452, 127.2142);

        s.apply_command(SiteCommand::BeginZoneEdit).unwrap();
        let refused = s.apply_command(SiteCommand::SetWorkArea {
            asset: stationary,
            work_area: spot,
        });
        assert!(matches!(refused, Err(StoreError::EditInProgress { .. })));

        s.apply_command(SiteCommand::ApplyZoneEdit).unwrap();
        s.apply_command(SiteCommand::SetWorkArea {
            asset: stationary,
            work_area: spot,
        })
        .unwrap();
        let asset = s.assets.iter().find(|a| a.id == stationary).unwrap();
        assert_eq!(asset.work_area(), Some(spot));
    }

    #[test]
    fn snapshot_shows_zone_draft() {
        let mut s = state();
        let p = LatLon::new(37.5471, 127.2129);
        s.apply_command(SiteCommand::BeginZoneEdit).unwrap();
        s.apply_command(SiteCommand::MoveZoneVertex {
            zone: ZoneId::new(1),
            vertex: 0,
            position: p,
        })
        .unwrap();
        let snap = s.snapshot();
        assert!(snap.editing_zones);
        assert_eq!(
            snap.zones.first().and_then(|z| z.bounds.first().copied()),
            Some(p)
        );
        assert_ne!(
            s.store.zones().first().and_then(|z| z.bounds.first().copied()),
            Some(p)
        );
    }

    #[test]
    fn statuses_stay_in_engine_vocabulary() {
        let mut s = state();
        for _ in 0..50 {
            run_tick(&mut s).unwrap();
        }
        assert!(
            s.assets
                .iter()
                .all(|a| matches!(a.status, Status::Safe | Status::Danger))
        );
    }
}
