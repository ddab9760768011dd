//! Pilot Common Library
//!
//! Shared types, collaborator traits and configuration loading for all
//! pilot workspace crates.
//!
//! # Module Structure
//!
//! - [`robot`] - Robot-state types: input snapshots, poses, mechanism actions,
//!   the routine catalog, phase/selector state and the declarative `RobotConfig`
//! - [`hal`] - Collaborator traits (motion control, actuators, pistons,
//!   controller input, display surface) and their error types
//! - [`config`] - Configuration loading traits and types
//! - [`consts`] - System-wide limits and defaults
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use pilot_common::prelude::*;
//!
//! let snapshot = InputSnapshot::IDLE.with_pressed(ControllerButton::R1);
//! assert!(snapshot.is_pressed(ControllerButton::R1));
//! ```

pub mod config;
pub mod consts;
pub mod hal;
pub mod prelude;
pub mod robot;
