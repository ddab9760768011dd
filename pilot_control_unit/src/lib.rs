//! # Pilot Control Unit Library
//!
//! Driver-facing control logic for a competition robot. Three components
//! share one [`context::RobotContext`]:
//!
//! 1. **Mechanism arbitration**: held buttons resolve to exactly one
//!    mechanism action per cycle, by fixed priority; wing toggles follow a
//!    named coupling policy
//! 2. **Autonomous selector**: a 1-indexed cyclic routine index driven by
//!    edge-triggered events and frozen when autonomous begins
//! 3. **Telemetry**: a perpetual thread pushing the pose to the screen
//!
//! All screen mutation goes through one display thread
//! ([`display::DisplayService`]); other threads send it commands.

pub mod chassis;
pub mod command;
pub mod competition;
pub mod config;
pub mod context;
pub mod cycle;
pub mod display;
pub mod drive;
pub mod error;
pub mod routine;
pub mod selector;
pub mod state;
pub mod telemetry;
