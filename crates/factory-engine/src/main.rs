//! Factory engine binary.
//!
//! Wires the fleet, the automatic planner and the run loop together and
//! runs the factory until the fleet wins, `max_ticks` is reached, or
//! Ctrl-C is pressed.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `$FACTORY_CONFIG` or `factory-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Build the fleet: starting stock and seed robots
//! 4. Create run controls from the factory settings
//! 5. Install the Ctrl-C stop handler
//! 6. Run the factory loop with the auto-planner
//! 7. Log the result and the final robot panel

mod error;
mod planner;
mod report;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use factory_core::clock::{Clock as _, SystemClock};
use factory_core::config::{FactoryConfig, LoggingConfig};
use factory_core::fleet::Fleet;
use factory_core::runner::{self, RunControl};
use factory_core::shared::SharedFleet;
use factory_core::view::InventoryView;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::planner::AutoPlanner;
use crate::report::ReportCallback;

/// Environment variable naming the config file.
const CONFIG_ENV: &str = "FACTORY_CONFIG";

/// Config file looked up in the working directory.
const DEFAULT_CONFIG_PATH: &str = "factory-config.yaml";

/// Ticks between periodic inventory log lines.
const INVENTORY_EVERY: u64 = 50;

/// Application entry point for the factory engine.
///
/// # Errors
///
/// Returns an error if any initialization step or the run loop fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration.
    let config = load_config().context("loading factory configuration")?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging).context("initializing logging")?;
    info!(
        factory = %config.factory.name,
        seed_robots = config.factory.seed_robots,
        tick_interval_ms = config.factory.tick_interval_ms,
        max_ticks = config.factory.max_ticks,
        rng_seed = ?config.factory.rng_seed,
        "Configuration loaded"
    );

    // 3. Build the fleet.
    let fleet = Fleet::from_config(&config)
        .map_err(EngineError::from)
        .context("building the fleet")?;
    let shared = SharedFleet::new(fleet);

    // 4. Create run controls.
    let control = Arc::new(
        RunControl::new(config.factory.tick_interval_ms, config.factory.max_ticks)
            .with_stop_on_victory(config.factory.stop_on_victory),
    );

    // 5. Stop cleanly on Ctrl-C.
    let stopper = Arc::clone(&control);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, stopping after the current tick");
            stopper.request_stop();
        }
    });

    // 6. Run the factory.
    let clock = SystemClock;
    let mut planner = match config.factory.victory_robots {
        0 => AutoPlanner::default(),
        goal => AutoPlanner::default().with_robot_goal(usize::try_from(goal).unwrap_or(usize::MAX)),
    };
    let mut report = ReportCallback::new(INVENTORY_EVERY);
    let result = runner::run_factory(&shared, &clock, &mut planner, &control, &mut report)
        .await
        .map_err(EngineError::from)
        .context("running the factory")?;

    // 7. Log results.
    runner::log_run_end(&result);
    let inventory = InventoryView::from(shared.counts().await);
    info!(
        foo = inventory.foo,
        bar = inventory.bar,
        foobar = inventory.foobar,
        money = inventory.money,
        "Final inventory"
    );
    for view in shared.views(clock.now()).await {
        info!(
            robot_id = %view.id,
            name = view.name,
            status = view.label,
            progress = view.progress,
            "Robot"
        );
    }

    info!(total_ticks = result.total_ticks, "factory-engine shutdown complete");
    Ok(())
}

/// Install the global subscriber. `RUST_LOG` wins over `logging.level`.
fn init_tracing(logging: &LoggingConfig) -> Result<(), EngineError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .map_err(|e| EngineError::Logging {
            message: format!("invalid log filter {:?}: {e}", logging.level),
        })?;

    let installed = if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
    };
    installed.map_err(|e| EngineError::Logging {
        message: format!("{e}"),
    })
}

/// Load the factory configuration.
///
/// `$FACTORY_CONFIG` must point at an existing file when set. Otherwise
/// `factory-config.yaml` in the working directory is used if present, and
/// built-in defaults if not.
fn load_config() -> Result<FactoryConfig, EngineError> {
    if let Some(path) = std::env::var_os(CONFIG_ENV).map(PathBuf::from) {
        return Ok(FactoryConfig::from_file(&path)?);
    }
    let config_path = Path::new(DEFAULT_CONFIG_PATH);
    if config_path.exists() {
        Ok(FactoryConfig::from_file(config_path)?)
    } else {
        Ok(FactoryConfig::default())
    }
}
