//! State machine module root.
//!
//! - [`selector`]: autonomous selector (Idle → Active → Locked)
//! - [`phase`]: competition phase tracking for the lifecycle entry points

pub mod phase;
pub mod selector;
