//! TOML loading for `robot.toml` and the `[shared]` table every pilot
//! binary reads.
//!
//! Any `DeserializeOwned` type gets [`ConfigLoader`] for free:
//!
//! ```rust,no_run
//! use pilot_common::config::{ConfigError, ConfigLoader, SharedConfig};
//! use serde::Deserialize;
//! use std::path::Path;
//!
//! #[derive(Debug, Deserialize)]
//! struct BenchRig {
//!     shared: SharedConfig,
//!     loop_period_ms: u64,
//! }
//!
//! fn main() -> Result<(), ConfigError> {
//!     let rig = BenchRig::load(Path::new("robot.toml"))?;
//!     println!("{} @ {}ms", rig.shared.service_name, rig.loop_period_ms);
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Why `robot.toml` could not be turned into a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No file at the given path. Callers may fall back to the reference robot.
    #[error("Configuration file not found")]
    FileNotFound,

    /// The file exists but could not be read, or is not valid TOML for the target type.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Well-formed TOML describing an impossible robot.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// `log_level` in `[shared]`; spelled lowercase in TOML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Every control cycle.
    Trace,
    Debug,
    /// Phase transitions, selector changes, routine dispatch.
    #[default]
    Info,
    /// Cycle overruns and rejected transitions.
    Warn,
    Error,
}

impl LogLevel {
    /// Same spelling as the TOML value, which `EnvFilter` also accepts.
    pub const fn as_directive(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// The `[shared]` table of `robot.toml`:
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "pilot-sim-01"
/// ```
///
/// Both keys may be omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedConfig {
    #[serde(default)]
    pub log_level: LogLevel,

    /// Tags startup logs so several robots on one bench can be told apart.
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

fn default_service_name() -> String {
    "pilot".to_string()
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            service_name: default_service_name(),
        }
    }
}

impl SharedConfig {
    /// A blank `service_name` is rejected.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Read a TOML document into `Self`. Semantic checks belong to the caller.
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// `FileNotFound` only when the path does not exist; any other read
    /// failure is a `ParseError`.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound,
            _ => ConfigError::ParseError(e.to_string()),
        })?;
        Self::from_toml(&content)
    }

    fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}
