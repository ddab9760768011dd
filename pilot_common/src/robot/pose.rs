//! Robot pose as reported by the motion-control collaborator.

use serde::{Deserialize, Serialize};

/// Field position and heading.
///
/// Owned by the motion-control collaborator; the core only reads it.
/// `x`/`y` are in inches, `heading` in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
}

impl Pose {
    pub const ORIGIN: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, heading: f64) -> Self {
        Self { x, y, heading }
    }
}
