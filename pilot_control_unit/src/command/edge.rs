//! Rising-edge detection on controller buttons.
//!
//! A button held across many cycles produces exactly one event, on the
//! cycle where it goes from released to pressed.

use pilot_common::robot::input::Buttons;

/// Remembers last cycle's buttons and reports false→true transitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeDetector {
    previous: Buttons,
}

impl EdgeDetector {
    pub const fn new() -> Self {
        Self {
            previous: Buttons::empty(),
        }
    }

    /// Feed this cycle's held buttons; returns the ones that were just pressed.
    #[inline]
    pub fn update(&mut self, held: Buttons) -> Buttons {
        let rising = held.difference(self.previous);
        self.previous = held;
        rising
    }

    /// Forget history; any button held next cycle counts as a press.
    #[inline]
    pub fn reset(&mut self) {
        self.previous = Buttons::empty();
    }

    #[inline]
    pub const fn previous(&self) -> Buttons {
        self.previous
    }
}
