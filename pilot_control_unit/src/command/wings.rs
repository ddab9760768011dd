//! Wing toggles and the coupling policy between the two wings.
//!
//! Each wing flips on the rising edge of its own button. Under
//! [`WingPolicy::Exclusive`] toggling one wing also retracts the other, so
//! at most one wing is ever extended. When both buttons rise in the same
//! cycle they are processed left then right; from neutral that leaves only
//! the right wing extended.

use pilot_common::hal::device::Pneumatic;
use pilot_common::robot::input::{Buttons, ControllerButton};
use pilot_common::robot::state::{WingPolicy, WingSide};
use tracing::debug;

/// Extension state of both wings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WingState {
    pub left: bool,
    pub right: bool,
}

impl WingState {
    /// Both wings retracted.
    pub const NEUTRAL: Self = Self {
        left: false,
        right: false,
    };

    #[inline]
    pub const fn get(&self, side: WingSide) -> bool {
        match side {
            WingSide::Left => self.left,
            WingSide::Right => self.right,
        }
    }

    #[inline]
    pub fn set(&mut self, side: WingSide, extended: bool) {
        match side {
            WingSide::Left => self.left = extended,
            WingSide::Right => self.right = extended,
        }
    }

    /// Whether the state satisfies `policy`.
    #[inline]
    pub const fn satisfies(&self, policy: WingPolicy) -> bool {
        match policy {
            WingPolicy::Exclusive => !(self.left && self.right),
            WingPolicy::Independent => true,
        }
    }
}

/// Edge-triggered wing toggles under a named coupling policy.
#[derive(Debug, Clone)]
pub struct WingController {
    policy: WingPolicy,
    left_button: ControllerButton,
    right_button: ControllerButton,
    state: WingState,
}

impl WingController {
    pub fn new(
        policy: WingPolicy,
        left_button: ControllerButton,
        right_button: ControllerButton,
    ) -> Self {
        Self {
            policy,
            left_button,
            right_button,
            state: WingState::NEUTRAL,
        }
    }

    #[inline]
    pub const fn policy(&self) -> WingPolicy {
        self.policy
    }

    #[inline]
    pub const fn state(&self) -> WingState {
        self.state
    }

    const fn button(&self, side: WingSide) -> ControllerButton {
        match side {
            WingSide::Left => self.left_button,
            WingSide::Right => self.right_button,
        }
    }

    /// Flip `side`, then enforce the policy on the other wing.
    pub fn toggle(&mut self, side: WingSide) -> WingState {
        let extended = !self.state.get(side);
        self.state.set(side, extended);
        if self.policy == WingPolicy::Exclusive {
            self.state.set(side.opposite(), false);
        }
        debug_assert!(self.state.satisfies(self.policy));
        debug!(?side, extended, state = ?self.state, "Wing toggled");
        self.state
    }

    /// Apply this cycle's rising edges. Returns true if the state changed.
    pub fn update(&mut self, rising: Buttons) -> bool {
        let before = self.state;
        for side in WingSide::BOTH {
            if rising.contains(self.button(side).flag()) {
                self.toggle(side);
            }
        }
        self.state != before
    }

    /// Drive both pistons to the current state.
    pub fn apply(&self, left: &mut dyn Pneumatic, right: &mut dyn Pneumatic) {
        drive_piston(left, self.state.left);
        drive_piston(right, self.state.right);
    }

    /// Return to neutral (both retracted). Call [`apply`](Self::apply) to
    /// push it to the pistons.
    pub fn reset(&mut self) {
        self.state = WingState::NEUTRAL;
    }
}

/// Write `piston` only if it differs from `extended`.
fn drive_piston(piston: &mut dyn Pneumatic, extended: bool) {
    if piston.is_extended() != extended {
        piston.set_extended(extended);
    }
}
