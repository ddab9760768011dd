//! Display ownership.
//!
//! A single [`DisplayService`] thread owns the [`DisplaySurface`] and is the
//! only code that mutates it. The telemetry loop and the selector talk to it
//! through cloneable [`DisplayHandle`]s; commands are applied in send order.
//! UI that belongs to one phase lives in a [`DisplaySession`], which
//! destroys its elements exactly once.
//!
//! [`DisplaySurface`]: pilot_common::hal::display::DisplaySurface

pub mod service;
pub mod session;

pub use service::{DisplayHandle, DisplayService, DisplayStats, SpawnError};
pub use session::DisplaySession;
