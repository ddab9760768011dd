//! Operator input: controller buttons and the per-cycle input snapshot.
//!
//! Buttons are packed into a `bitflags` set so that edge detection is a
//! pair of mask operations and a snapshot stays `Copy`.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::consts::PERCENT_MAX;

bitflags! {
    /// Set of controller buttons held during one cycle.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Buttons: u16 {
        const A     = 0x0001;
        const B     = 0x0002;
        const X     = 0x0004;
        const Y     = 0x0008;
        const UP    = 0x0010;
        const DOWN  = 0x0020;
        const LEFT  = 0x0040;
        const RIGHT = 0x0080;
        const L1    = 0x0100;
        const L2    = 0x0200;
        const R1    = 0x0400;
        const R2    = 0x0800;
    }
}

impl Default for Buttons {
    fn default() -> Self {
        Self::empty()
    }
}

/// A single named controller button, as written in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerButton {
    A,
    B,
    X,
    Y,
    Up,
    Down,
    Left,
    Right,
    L1,
    L2,
    R1,
    R2,
}

impl ControllerButton {
    /// Every button, in bit order.
    pub const ALL: [Self; 12] = [
        Self::A,
        Self::B,
        Self::X,
        Self::Y,
        Self::Up,
        Self::Down,
        Self::Left,
        Self::Right,
        Self::L1,
        Self::L2,
        Self::R1,
        Self::R2,
    ];

    /// The bit this button occupies in a [`Buttons`] set.
    #[inline]
    pub const fn flag(self) -> Buttons {
        match self {
            Self::A => Buttons::A,
            Self::B => Buttons::B,
            Self::X => Buttons::X,
            Self::Y => Buttons::Y,
            Self::Up => Buttons::UP,
            Self::Down => Buttons::DOWN,
            Self::Left => Buttons::LEFT,
            Self::Right => Buttons::RIGHT,
            Self::L1 => Buttons::L1,
            Self::L2 => Buttons::L2,
            Self::R1 => Buttons::R1,
            Self::R2 => Buttons::R2,
        }
    }
}

/// Analog stick axis polled by tank drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalogAxis {
    LeftY,
    RightY,
}

/// Operator input captured once per control cycle.
///
/// Axis values are signed percentages clamped to `[-100, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct InputSnapshot {
    /// Buttons held this cycle.
    pub buttons: Buttons,
    /// Left stick, vertical axis.
    pub left_y: i8,
    /// Right stick, vertical axis.
    pub right_y: i8,
}

impl InputSnapshot {
    /// Nothing pressed, sticks centred.
    pub const IDLE: Self = Self {
        buttons: Buttons::empty(),
        left_y: 0,
        right_y: 0,
    };

    /// Build a snapshot, clamping both axes into range.
    pub fn new(buttons: Buttons, left_y: i8, right_y: i8) -> Self {
        Self {
            buttons,
            left_y: clamp_percent(left_y),
            right_y: clamp_percent(right_y),
        }
    }

    /// Whether `button` is held in this snapshot.
    #[inline]
    pub const fn is_pressed(&self, button: ControllerButton) -> bool {
        self.buttons.contains(button.flag())
    }

    /// Value of one analog axis.
    #[inline]
    pub const fn axis(&self, axis: AnalogAxis) -> i8 {
        match axis {
            AnalogAxis::LeftY => self.left_y,
            AnalogAxis::RightY => self.right_y,
        }
    }

    /// Copy of this snapshot with `button` additionally held.
    #[must_use]
    pub fn with_pressed(mut self, button: ControllerButton) -> Self {
        self.buttons |= button.flag();
        self
    }
}

/// Clamp a raw axis reading into `[-100, 100]`.
#[inline]
pub fn clamp_percent(value: i8) -> i8 {
    value.clamp(-PERCENT_MAX, PERCENT_MAX)
}
