//! Tunic Sync - scripted session replay
//!
//! Runs the tunic synchronizer against the simulated host and reports whether
//! every rebuild happened in a safe window.
//!
//! # Execution Flow
//!
//! 1. Load `Tunic Sync Data/Tunic Sync.yaml` (plus `TUNIC_SYNC_*` overrides)
//! 2. Initialize logging → logs/tunic-sync.<date>
//! 3. Load the scenario named on the command line, or the built-in menu swap
//! 4. Replay it through the player actor hooks
//! 5. Log the session report and exit non-zero if the session was unclean
//!
//! # Usage
//!
//! ```text
//! tunic-sync [scenario.yaml]
//! ```

use anyhow::{Result, bail};
use tunic_sync::session::run_scenario;
use tunic_sync::{APP_NAME, ConfigManager, Scenario, VERSION};

fn main() -> Result<()> {
    let config_manager = ConfigManager::new("Tunic Sync Data")?;
    let config = config_manager.load_sync_config()?;

    // Keep the guard alive until exit so buffered log lines are flushed
    let _log_guard = tunic_sync::logging::setup_from_settings(&config.logging)?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let scenario = match std::env::args().nth(1) {
        Some(path) => config_manager.load_scenario(path.as_str())?,
        None => {
            tracing::info!("No scenario given, replaying built-in menu swap");
            Scenario::menu_swap()
        }
    };

    let report = run_scenario(&scenario, &config);

    tracing::info!(
        "Session '{}': {} ticks, {} rebuilds, model shows {}",
        report.scenario,
        report.ticks,
        report.rebuilds,
        report.model_variant
    );

    if !report.is_clean() {
        tracing::error!(
            "Unclean session: {} rebuilds while paused, {} unprepared, {} with stale equipment, consistent={}",
            report.unsafe_rebuilds,
            report.unprepared_rebuilds,
            report.stale_equipment,
            report.consistent
        );
        bail!("session '{}' left the player model in an unsafe state", report.scenario);
    }

    Ok(())
}
