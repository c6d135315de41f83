//! Configuration loading and typed config structures for the site-safety
//! simulation.
//!
//! The configuration lives in `sitesafe-config.yaml` at the project root.
//! Every section and field has a default, so a partial (or empty) file
//! yields the three-phase demo site ticking once per second.

use std::collections::BTreeSet;
use std::path::Path;

use serde::Deserialize;
use sitesafe_assets::default_counts;
use sitesafe_geo::{DEFAULT_HALF_WIDTH_DEG, StartingSite, ZonePolicy, create_starting_site};
use sitesafe_types::{AssetCounts, ConstructionArea, SiteSection};

use crate::store::{DEFAULT_MAX_ASSETS_PER_SECTION, requested_assets};

/// Environment variable that overrides `infrastructure.observer_port`.
pub const OBSERVER_PORT_ENV: &str = "SITESAFE_OBSERVER_PORT";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// Two configured sections share a name.
    #[error("duplicate section name: {0}")]
    DuplicateSection(String),

    /// A section's configured counts exceed the per-section asset limit.
    #[error("section {section} requests {requested} assets, limit is {limit}")]
    TooManyAssets {
        /// The offending section.
        section: String,
        /// Sum of the configured counts.
        requested: u64,
        /// The configured limit.
        limit: u32,
    },

    /// A motion step is not a positive distance below the arrival threshold.
    #[error("motion.{field} = {value} must be positive and below arrival_threshold_deg = {threshold}")]
    InvalidMotionStep {
        /// Name of the offending field.
        field: &'static str,
        /// The configured step.
        value: f64,
        /// The configured arrival threshold.
        threshold: f64,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `sitesafe-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Name, seed and tick period.
    #[serde(default)]
    pub world: WorldConfig,

    /// Site geometry and starting asset counts.
    #[serde(default)]
    pub site: SiteConfig,

    /// Motion engine constants.
    #[serde(default)]
    pub motion: MotionConfig,

    /// Danger-zone generation.
    #[serde(default)]
    pub zones: ZoneConfig,

    /// Observer server binding.
    #[serde(default)]
    pub infrastructure: InfrastructureConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Simulation boundary parameters.
    #[serde(default)]
    pub simulation: SimulationBoundsConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `SITESAFE_OBSERVER_PORT` overrides `infrastructure.observer_port`
    /// when set to a valid port number.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// one of the validation errors listed on [`Self::validate`].
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        config.infrastructure.apply_env_overrides();
        Ok(config)
    }

    /// Check the cross-field rules deserialization cannot express.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::DuplicateSection`] if two sections share a name
    /// - [`ConfigError::TooManyAssets`] if a section's counts exceed
    ///   `site.max_assets_per_section`
    /// - [`ConfigError::InvalidMotionStep`] if a step would let an asset
    ///   overshoot its target forever
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.site.validate()?;
        self.motion.validate()
    }
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable site name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Seed for the simulation's random number generator.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Real-time milliseconds per tick.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

// ---------------------------------------------------------------------------
// Site
// ---------------------------------------------------------------------------

/// Site geometry and counts. Omitted parts fall back to the demo site.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SiteConfig {
    /// Construction area; defaults to the demo area.
    #[serde(default)]
    pub area: Option<ConstructionArea>,

    /// Ordered sections; empty means the three demo phases.
    #[serde(default)]
    pub sections: Vec<SiteSection>,

    /// Per-section counts; defaults to one of each piece of equipment
    /// plus the demo worker counts.
    #[serde(default)]
    pub counts: Option<AssetCounts>,

    /// Upper bound on the summed counts of a single section, applied to
    /// the configured counts and to later count changes.
    #[serde(default = "default_max_assets_per_section")]
    pub max_assets_per_section: u32,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            area: None,
            sections: Vec::new(),
            counts: None,
            max_assets_per_section: default_max_assets_per_section(),
        }
    }
}

impl SiteConfig {
    /// Resolve the configured site against the demo defaults.
    pub fn resolve(&self) -> (StartingSite, AssetCounts) {
        let demo = create_starting_site();
        let sections = if self.sections.is_empty() {
            demo.sections
        } else {
            self.sections.clone()
        };
        let area = self.area.unwrap_or(demo.area);
        let counts = self
            .counts
            .clone()
            .unwrap_or_else(|| default_counts(&sections));
        (StartingSite { area, sections }, counts)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = BTreeSet::new();
        for section in &self.sections {
            if !seen.insert(section.name.as_str()) {
                return Err(ConfigError::DuplicateSection(section.name.clone()));
            }
        }
        for (section, counts) in self.counts.iter().flatten() {
            let requested = requested_assets(counts);
            if requested > u64::from(self.max_assets_per_section) {
                return Err(ConfigError::TooManyAssets {
                    section: section.clone(),
                    requested,
                    limit: self.max_assets_per_section,
                });
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Motion
// ---------------------------------------------------------------------------

/// Constants of the per-tick motion update. Distances are in degrees
/// unless the name says otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct MotionConfig {
    /// Step per tick for workers.
    #[serde(default = "default_worker_step_deg")]
    pub worker_step_deg: f64,

    /// Step per tick for mobile equipment.
    #[serde(default = "default_equipment_step_deg")]
    pub equipment_step_deg: f64,

    /// Step per tick for stationary equipment returning to its work area.
    #[serde(default = "default_stationary_step_deg")]
    pub stationary_step_deg: f64,

    /// Distance below which an asset counts as arrived.
    #[serde(default = "default_arrival_threshold_deg")]
    pub arrival_threshold_deg: f64,

    /// Side of the square box, in meters, stationary equipment jitters in.
    #[serde(default = "default_jitter_box_m")]
    pub jitter_box_m: f64,

    /// Fraction of the section radius new wandering targets are drawn from.
    #[serde(default = "default_retarget_radius_factor")]
    pub retarget_radius_factor: f64,
}

impl MotionConfig {
    /// Every step must be positive and shorter than the arrival threshold,
    /// otherwise an asset can hop back and forth across its target.
    fn validate(&self) -> Result<(), ConfigError> {
        let threshold = self.arrival_threshold_deg;
        let steps = [
            ("worker_step_deg", self.worker_step_deg),
            ("equipment_step_deg", self.equipment_step_deg),
            ("stationary_step_deg", self.stationary_step_deg),
        ];
        for (field, value) in steps {
            if !(value > 0.0 && value < threshold) {
                return Err(ConfigError::InvalidMotionStep {
                    field,
                    value,
                    threshold,
                });
            }
        }
        Ok(())
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            worker_step_deg: default_worker_step_deg(),
            equipment_step_deg: default_equipment_step_deg(),
            stationary_step_deg: default_stationary_step_deg(),
            arrival_threshold_deg: default_arrival_threshold_deg(),
            jitter_box_m: default_jitter_box_m(),
            retarget_radius_factor: default_retarget_radius_factor(),
        }
    }
}

// ---------------------------------------------------------------------------
// Zones
// ---------------------------------------------------------------------------

/// Danger-zone generation settings.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ZoneConfig {
    /// Half-width of each generated square, in degrees.
    #[serde(default = "default_zone_half_width_deg")]
    pub half_width_deg: f64,

    /// What happens to edited zones when sections are re-applied.
    #[serde(default)]
    pub policy: ZonePolicy,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            half_width_deg: default_zone_half_width_deg(),
            policy: ZonePolicy::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Infrastructure, logging, bounds
// ---------------------------------------------------------------------------

/// Observer server binding.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InfrastructureConfig {
    /// Interface the observer binds to.
    #[serde(default = "default_observer_host")]
    pub observer_host: String,

    /// Observer dashboard port.
    #[serde(default = "default_observer_port")]
    pub observer_port: u16,
}

impl InfrastructureConfig {
    /// Override the observer port from `SITESAFE_OBSERVER_PORT` when it
    /// holds a valid port number.
    pub fn apply_env_overrides(&mut self) {
        if let Some(port) = std::env::var(OBSERVER_PORT_ENV)
            .ok()
            .and_then(|val| val.parse::<u16>().ok())
        {
            self.observer_port = port;
        }
    }
}

impl Default for InfrastructureConfig {
    fn default() -> Self {
        Self {
            observer_host: default_observer_host(),
            observer_port: default_observer_port(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level used when `RUST_LOG` is unset (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Simulation boundary configuration.
///
/// A value of 0 for either field means unlimited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SimulationBoundsConfig {
    /// Scheduler periods to run before stopping, skipped periods included.
    #[serde(default)]
    pub max_ticks: u64,

    /// Wall-clock seconds to run before stopping.
    #[serde(default)]
    pub max_real_time_seconds: u64,
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    String::from("SiteSafe Demo Site")
}

const fn default_seed() -> u64 {
    42
}

const fn default_tick_interval_ms() -> u64 {
    1000
}

const fn default_max_assets_per_section() -> u32 {
    DEFAULT_MAX_ASSETS_PER_SECTION
}

const fn default_worker_step_deg() -> f64 {
    0.000_015
}

const fn default_equipment_step_deg() -> f64 {
    0.000_03
}

const fn default_stationary_step_deg() -> f64 {
    0.000_03
}

const fn default_arrival_threshold_deg() -> f64 {
    0.000_05
}

const fn default_jitter_box_m() -> f64 {
    1.0
}

const fn default_retarget_radius_factor() -> f64 {
    0.95
}

const fn default_zone_half_width_deg() -> f64 {
    DEFAULT_HALF_WIDTH_DEG
}

fn default_observer_host() -> String {
    String::from("0.0.0.0")
}

const fn default_observer_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    String::from("info")
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use sitesafe_types::LatLon;

    use super::*;

    #[test]
    fn default_config_is_the_demo_site() {
        let config = SimulationConfig::default();
        assert_eq!(config.world.seed, 42);
        assert_eq!(config.world.tick_interval_ms, 1000);
        assert_eq!(config.motion.worker_step_deg, 0.000_015);
        assert_eq!(config.zones.policy, ZonePolicy::PreserveUnmoved);

        let (site, counts) = config.site.resolve();
        assert_eq!(site.sections.len(), 3);
        assert_eq!(site.area.radius_m, 250.0);
        assert_eq!(counts.len(), 3);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
world:
  name: "Test Site"
  seed: 123
  tick_interval_ms: 500

site:
  area:
    center: { lat: 37.545, lon: 127.215 }
    radius_m: 400
  sections:
    - name: "North"
      center: { lat: 37.546, lon: 127.215 }
      zoom: 17
  counts:
    North:
      workers: 4
      excavators: 2

motion:
  worker_step_deg: 0.00002
  jitter_box_m: 2.0

zones:
  half_width_deg: 0.001
  policy: regenerate

infrastructure:
  observer_host: "127.0.0.1"
  observer_port: 9090

logging:
  level: "debug"

simulation:
  max_ticks: 100
"#;

        let config = SimulationConfig::parse(yaml);
        assert!(config.is_ok(), "{config:?}");
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.world.name, "Test Site");
        assert_eq!(config.world.tick_interval_ms, 500);
        assert_eq!(config.motion.worker_step_deg, 0.00002);
        assert_eq!(config.motion.equipment_step_deg, 0.000_03);
        assert_eq!(config.zones.policy, ZonePolicy::Regenerate);
        assert_eq!(config.infrastructure.observer_host, "127.0.0.1");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.simulation.max_ticks, 100);

        let (site, counts) = config.site.resolve();
        assert_eq!(site.area.center, LatLon::new(37.545, 127.215));
        assert_eq!(site.area.radius_m, 400.0);
        assert_eq!(site.sections.len(), 1);
        assert_eq!(
            counts.get("North").and_then(|c| c.get("workers")).copied(),
            Some(4)
        );
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = SimulationConfig::parse("world:\n  seed: 7\n");
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();
        assert_eq!(config.world.seed, 7);
        assert_eq!(config.world.tick_interval_ms, 1000);
        assert_eq!(config.zones.half_width_deg, DEFAULT_HALF_WIDTH_DEG);
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(SimulationConfig::parse("").is_ok());
    }

    #[test]
    fn sections_without_counts_get_default_counts() {
        let yaml = r#"
site:
  sections:
    - name: "Only"
      center: { lat: 37.5, lon: 127.2 }
      zoom: 18
"#;
        let config = SimulationConfig::parse(yaml).ok().unwrap_or_default();
        let (site, counts) = config.site.resolve();
        assert_eq!(site.sections.len(), 1);
        assert_eq!(counts.get("Only").and_then(|c| c.get("workers")).copied(), Some(3));
    }

    #[test]
    fn duplicate_section_names_are_rejected() {
        let yaml = r#"
site:
  sections:
    - name: "A"
      center: { lat: 37.545, lon: 127.215 }
      zoom: 18
    - name: "A"
      center: { lat: 37.546, lon: 127.216 }
      zoom: 18
  counts:
    "A": { workers: 2 }
"#;
        let result = SimulationConfig::parse(yaml);
        assert!(
            matches!(&result, Err(ConfigError::DuplicateSection(name)) if name == "A"),
            "{result:?}"
        );
    }

    #[test]
    fn configured_counts_over_the_asset_limit_are_rejected() {
        let yaml = r#"
site:
  max_assets_per_section: 20
  counts:
    "Phase 1": { workers: 15, excavators: 6 }
"#;
        let result = SimulationConfig::parse(yaml);
        assert!(
            matches!(
                &result,
                Err(ConfigError::TooManyAssets {
                    section,
                    requested: 21,
                    limit: 20,
                }) if section == "Phase 1"
            ),
            "{result:?}"
        );

        let config = SimulationConfig::parse("site:\n  max_assets_per_section: 56\n");
        assert!(config.is_ok(), "{config:?}");
    }

    #[test]
    fn motion_steps_must_stay_below_arrival_threshold() {
        let overshooting = "motion:\n  equipment_step_deg: 0.0001\n";
        let result = SimulationConfig::parse(overshooting);
        assert!(
            matches!(
                &result,
                Err(ConfigError::InvalidMotionStep {
                    field: "equipment_step_deg",
                    ..
                })
            ),
            "{result:?}"
        );

        let equal = "motion:\n  worker_step_deg: 0.00005\n";
        assert!(matches!(
            SimulationConfig::parse(equal),
            Err(ConfigError::InvalidMotionStep {
                field: "worker_step_deg",
                ..
            })
        ));

        let zero = "motion:\n  stationary_step_deg: 0.0\n";
        assert!(matches!(
            SimulationConfig::parse(zero),
            Err(ConfigError::InvalidMotionStep {
                field: "stationary_step_deg",
                ..
            })
        ));

        let raised = "motion:\n  equipment_step_deg: 0.0001\n  arrival_threshold_deg: 0.0002\n";
        assert!(SimulationConfig::parse(raised).is_ok());
    }

    #[test]
    fn default_config_passes_validation() {
        assert!(SimulationConfig::default().validate().is_ok());
        assert_eq!(
            SimulationConfig::default().site.max_assets_per_section,
            DEFAULT_MAX_ASSETS_PER_SECTION
        );
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("sitesafe-config.yaml");
        if path.exists() {
            let config = SimulationConfig::from_file(&path);
            assert!(config.is_ok(), "failed to load project config: {config:?}");
        }
    }
}
