//! Configuration loading with validation.
//!
//! Parses `RobotConfig` from TOML, runs every validation rule and builds the
//! routine catalog, producing a [`LoadedConfig`] ready for runtime use.

use std::path::Path;

use pilot_common::config::{ConfigError, ConfigLoader};
use pilot_common::robot::catalog::RoutineCatalog;
use pilot_common::robot::config::RobotConfig;
use tracing::{info, warn};

// ─── Loaded Config Bundle ───────────────────────────────────────────

/// Complete validated configuration bundle.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub robot: RobotConfig,
    /// Catalog built from `robot.routines`; fixed for the whole run.
    pub catalog: RoutineCatalog,
}

impl LoadedConfig {
    /// Validate `robot` and build its catalog.
    pub fn from_robot(robot: RobotConfig) -> Result<Self, ConfigError> {
        robot.validate()?;
        let catalog = robot.catalog()?;
        Ok(Self { robot, catalog })
    }
}

impl Default for LoadedConfig {
    /// The reference robot.
    fn default() -> Self {
        let robot = RobotConfig::default();
        let catalog = robot
            .catalog()
            .unwrap_or_else(|e| unreachable!("default catalog is valid: {e}"));
        Self { robot, catalog }
    }
}

// ─── Loading Functions ──────────────────────────────────────────────

/// Load and validate the robot configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<LoadedConfig, ConfigError> {
    let robot = RobotConfig::load(path)?;
    let loaded = LoadedConfig::from_robot(robot)?;
    info!(
        path = %path.display(),
        routines = loaded.catalog.len(),
        actuators = loaded.robot.mechanism.actuators.len(),
        "Configuration loaded"
    );
    Ok(loaded)
}

/// Load config from a TOML string (for testing).
pub fn load_config_from_str(content: &str) -> Result<LoadedConfig, ConfigError> {
    LoadedConfig::from_robot(RobotConfig::from_toml(content)?)
}

/// Like [`load_config`], but a missing file yields the reference robot.
/// Parse and validation errors are still returned.
pub fn load_config_or_default(path: &Path) -> Result<LoadedConfig, ConfigError> {
    match load_config(path) {
        Err(ConfigError::FileNotFound) => {
            warn!(path = %path.display(), "Config file not found, using built-in defaults");
            Ok(LoadedConfig::default())
        }
        other => other,
    }
}
