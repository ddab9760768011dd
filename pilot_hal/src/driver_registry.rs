//! Driver registry for HAL backends.
//!
//! Provides a `DriverRegistry` struct for registering and retrieving backend
//! factories. This uses constructor-injection rather than global state.

use std::collections::HashMap;

use pilot_common::hal::error::HalError;
use pilot_common::robot::config::RobotConfig;
use tracing::info;

use crate::backend::Backend;

/// Factory function type for building a backend from the robot configuration.
pub type BackendFactory = fn(&RobotConfig) -> Result<Backend, HalError>;

/// Registry of available HAL backends.
///
/// Constructed at startup, populated via `register()`, and consulted once by
/// the binary. No global state, testable in isolation.
pub struct DriverRegistry {
    factories: HashMap<&'static str, BackendFactory>,
}

impl DriverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Create a registry holding every built-in driver.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        crate::drivers::register_builtin(&mut registry);
        registry
    }

    /// Register a backend factory.
    ///
    /// # Panics
    /// Panics if a driver with the same name is already registered.
    pub fn register(&mut self, name: &'static str, factory: BackendFactory) {
        if self.factories.contains_key(name) {
            panic!("Driver '{name}' is already registered");
        }
        self.factories.insert(name, factory);
    }

    /// Get a backend factory by name.
    pub fn get_factory(&self, name: &str) -> Option<BackendFactory> {
        self.factories.get(name).copied()
    }

    /// Build a backend by driver name.
    ///
    /// # Errors
    /// Returns `HalError::DriverNotFound` if no driver with the given name is
    /// registered, or whatever the factory reports.
    pub fn create_backend(&self, name: &str, config: &RobotConfig) -> Result<Backend, HalError> {
        let factory = self
            .get_factory(name)
            .ok_or_else(|| HalError::DriverNotFound(name.to_string()))?;
        let backend = factory(config)?;
        info!(
            driver = name,
            actuators = backend.mechanism.len(),
            "Backend created"
        );
        Ok(backend)
    }

    /// List all registered driver names, sorted.
    pub fn list_drivers(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::new()
    }
}
