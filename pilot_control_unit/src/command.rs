//! Operator command processing root.
//!
//! Edge detection on controller buttons, mechanism arbitration and the wing
//! toggle policy. Everything here is driven once per control cycle from a
//! single `InputSnapshot`.

pub mod arbitration;
pub mod edge;
pub mod wings;
