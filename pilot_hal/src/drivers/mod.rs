//! HAL backend implementations.
//!
//! This module contains all backend implementations:
//!
//! - [`simulation`] - Software robot for development and testing
//!
//! # Adding New Drivers
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement the collaborator traits from `pilot_common::hal::device`
//! 3. Expose a `BackendFactory` and register it in `register_builtin()`

pub mod simulation;

use crate::driver_registry::DriverRegistry;

/// Register all built-in drivers.
pub fn register_builtin(registry: &mut DriverRegistry) {
    registry.register(simulation::DRIVER_NAME, simulation::create_backend);
}
