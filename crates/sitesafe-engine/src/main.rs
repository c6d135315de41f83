//! Engine binary for the site-safety simulation.
//!
//! Wires together the configuration, the coordinator state, the observer
//! server and the tick loop, then runs the loop until a termination
//! condition is met.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `$SITESAFE_CONFIG` (default
//!    `sitesafe-config.yaml`), falling back to the demo site
//! 2. Initialize structured logging (tracing)
//! 3. Build the site and generate the initial assets
//! 4. Create operator state from simulation bounds
//! 5. Start the Observer API server
//! 6. Run the tick loop
//! 7. Log the result and keep serving the final state

mod error;
mod observer_callback;

use std::path::PathBuf;
use std::sync::Arc;

use sitesafe_core::config::SimulationConfig;
use sitesafe_core::operator::OperatorState;
use sitesafe_core::runner;
use sitesafe_core::tick::SimulationState;
use sitesafe_observer::server::{ServerConfig, spawn_observer};
use sitesafe_observer::state::AppState;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::observer_callback::ObserverCallback;

/// Environment variable naming the configuration file.
const CONFIG_PATH_ENV: &str = "SITESAFE_CONFIG";

/// Configuration file used when `SITESAFE_CONFIG` is unset.
const DEFAULT_CONFIG_PATH: &str = "sitesafe-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if configuration loading, the observer bind, or the
/// tick loop fails.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Load configuration. Logging needs the configured level, so
    //    report the outcome once the subscriber is installed.
    let (config, source) = load_config()?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("sitesafe-engine starting");
    match &source {
        Some(path) => info!(path = %path.display(), "Configuration loaded"),
        None => info!("Config file not found, using defaults"),
    }
    info!(
        site = config.world.name,
        seed = config.world.seed,
        tick_interval_ms = config.world.tick_interval_ms,
        zone_policy = ?config.zones.policy,
        "Configuration resolved"
    );

    // 3. Build the site and its assets.
    let mut sim_state = SimulationState::from_config(&config);
    info!(
        sections = sim_state.store.sections().len(),
        zones = sim_state.store.zones().len(),
        assets = sim_state.assets.len(),
        radius_m = sim_state.store.area().radius_m,
        "Site initialized"
    );

    // 4. Create operator state.
    let operator = Arc::new(OperatorState::new(
        config.world.tick_interval_ms,
        &config.simulation,
    ));
    info!(
        max_ticks = operator.max_ticks(),
        max_real_time_seconds = operator.max_real_time_seconds(),
        tick_interval_ms = operator.tick_interval_ms(),
        "Operator state initialized"
    );

    // 5. Start Observer API server with the initial site published.
    let app_state = Arc::new(AppState::with_operator(Arc::clone(&operator)));
    app_state.publish_snapshot(sim_state.snapshot()).await;
    let server_config = ServerConfig::from(&config.infrastructure);
    let observer = spawn_observer(&server_config, Arc::clone(&app_state)).await?;
    info!(
        host = server_config.host,
        port = server_config.port,
        "Observer API server started"
    );

    // 6. Run the tick loop.
    let mut callback = ObserverCallback::new(app_state);
    let result = runner::run_simulation(&mut sim_state, &operator, &mut callback).await?;

    // 7. Log results; the observer keeps serving the final state.
    runner::log_simulation_end(&result);
    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        skipped_ticks = sim_state.skipped_ticks,
        "Tick loop finished, observer still serving"
    );

    observer.await?;
    Ok(())
}

/// Load the simulation configuration.
///
/// Reads the file named by `SITESAFE_CONFIG`, or `sitesafe-config.yaml`
/// in the working directory. A missing file yields the defaults; the
/// returned path is `None` in that case.
fn load_config() -> Result<(SimulationConfig, Option<PathBuf>), EngineError> {
    let path = std::env::var_os(CONFIG_PATH_ENV)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);

    if path.exists() {
        let config = SimulationConfig::from_file(&path)?;
        Ok((config, Some(path)))
    } else {
        let mut config = SimulationConfig::default();
        config.infrastructure.apply_env_overrides();
        Ok((config, None))
    }
}
