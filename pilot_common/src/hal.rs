//! Collaborator interfaces consumed by the control unit.
//!
//! The core never talks to hardware directly. Backends in `pilot_hal`
//! implement these traits:
//!
//! - [`device`] - motion control, actuators, pistons and controller input
//! - [`display`] - the display surface and fixed-capacity label text
//! - [`error`] - `HalError` and `DisplayError`

pub mod device;
pub mod display;
pub mod error;
