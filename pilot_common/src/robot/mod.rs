//! Robot-state types shared by the HAL backends and the control unit.
//!
//! Everything here is plain data: snapshots are captured once per cycle,
//! the catalog is fixed at startup, and the pose is owned by the motion
//! collaborator and only ever read by the core.

pub mod catalog;
pub mod config;
pub mod input;
pub mod mechanism;
pub mod pose;
pub mod state;
