//! # Pilot HAL Library
//!
//! Hardware abstraction backends with a pluggable driver architecture.
//!
//! Backends implement the collaborator traits defined in
//! `pilot_common::hal` and are handed to the control unit as one
//! [`Backend`] bundle.
//!
//! # Module Structure
//!
//! - [`backend`] - The `Backend` device bundle
//! - [`driver_registry`] - Backend factory registration
//! - [`drivers`] - Backend implementations
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    pilot_hal (single crate)                  │
//! │  ┌────────────────┐    ┌─────────────┐    ┌───────────────┐  │
//! │  │ DriverRegistry │───►│  Factory    │───►│   Backend     │  │
//! │  │ name → factory │    │ (RobotConfig)│   │ trait objects │  │
//! │  └────────────────┘    └─────────────┘    └───────┬───────┘  │
//! │                                                   │          │
//! │                                                   ▼          │
//! │                                      pilot_control_unit      │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod backend;
pub mod driver_registry;
pub mod drivers;

pub use crate::backend::Backend;
pub use crate::driver_registry::{BackendFactory, DriverRegistry};
