//! Scripted operator controller.
//!
//! Plays a queue of [`ScriptFrame`]s, one frame cycle per `refresh()`.
//! When the queue runs dry the controller reports the held fallback input,
//! which is "nothing pressed" unless a test sets it through the probe.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use pilot_common::hal::device::InputSource;
use pilot_common::robot::config::ScriptFrame;
use pilot_common::robot::input::{AnalogAxis, ControllerButton, InputSnapshot};
use tracing::trace;

#[derive(Debug, Clone, Copy)]
struct QueuedFrame {
    remaining: u32,
    input: InputSnapshot,
}

impl From<&ScriptFrame> for QueuedFrame {
    fn from(frame: &ScriptFrame) -> Self {
        Self {
            remaining: frame.cycles,
            input: InputSnapshot::new(frame.button_set(), frame.left_y, frame.right_y),
        }
    }
}

#[derive(Debug)]
struct ControllerState {
    queue: VecDeque<QueuedFrame>,
    held: InputSnapshot,
    current: InputSnapshot,
    refreshes: u64,
}

impl ControllerState {
    fn advance(&mut self) {
        self.refreshes += 1;
        self.current = match self.queue.front_mut() {
            Some(frame) => {
                let input = frame.input;
                frame.remaining = frame.remaining.saturating_sub(1);
                if frame.remaining == 0 {
                    self.queue.pop_front();
                }
                input
            }
            None => self.held,
        };
    }
}

/// Controller implementing [`InputSource`] from a script.
pub struct ScriptedController {
    state: Arc<Mutex<ControllerState>>,
}

impl ScriptedController {
    pub(super) fn new(script: &[ScriptFrame]) -> (Self, ControllerProbe) {
        let state = Arc::new(Mutex::new(ControllerState {
            queue: script
                .iter()
                .filter(|f| f.cycles > 0)
                .map(QueuedFrame::from)
                .collect(),
            held: InputSnapshot::IDLE,
            current: InputSnapshot::IDLE,
            refreshes: 0,
        }));
        (
            Self {
                state: Arc::clone(&state),
            },
            ControllerProbe { state },
        )
    }
}

impl InputSource for ScriptedController {
    fn refresh(&mut self) {
        let mut state = self.state.lock();
        state.advance();
        trace!(buttons = ?state.current.buttons, "Controller refreshed");
    }

    fn get_digital(&self, button: ControllerButton) -> bool {
        self.state.lock().current.is_pressed(button)
    }

    fn get_analog(&self, axis: AnalogAxis) -> i8 {
        self.state.lock().current.axis(axis)
    }
}

/// Test-side handle onto a [`ScriptedController`].
#[derive(Clone)]
pub struct ControllerProbe {
    state: Arc<Mutex<ControllerState>>,
}

impl ControllerProbe {
    /// Append a frame to the script.
    pub fn enqueue(&self, frame: &ScriptFrame) {
        if frame.cycles > 0 {
            self.state.lock().queue.push_back(QueuedFrame::from(frame));
        }
    }

    /// Append `input` for `cycles` refreshes.
    pub fn enqueue_input(&self, input: InputSnapshot, cycles: u32) {
        if cycles > 0 {
            self.state.lock().queue.push_back(QueuedFrame {
                remaining: cycles,
                input,
            });
        }
    }

    /// Input reported once the script is exhausted.
    pub fn hold(&self, input: InputSnapshot) {
        self.state.lock().held = input;
    }

    /// Equivalent to `hold(InputSnapshot::IDLE)`.
    pub fn release(&self) {
        self.hold(InputSnapshot::IDLE);
    }

    /// Refreshes still covered by queued frames.
    pub fn pending_cycles(&self) -> u64 {
        self.state
            .lock()
            .queue
            .iter()
            .map(|f| u64::from(f.remaining))
            .sum()
    }

    pub fn refreshes(&self) -> u64 {
        self.state.lock().refreshes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pilot_common::robot::input::Buttons;

    #[test]
    fn plays_frames_then_falls_back_to_held() {
        let script = [
            ScriptFrame::hold(2, &[ControllerButton::A]),
            ScriptFrame {
                cycles: 1,
                buttons: vec![ControllerButton::B],
                left_y: 40,
                right_y: -40,
            },
        ];
        let (mut controller, probe) = ScriptedController::new(&script);
        assert_eq!(probe.pending_cycles(), 3);

        assert_eq!(controller.snapshot().buttons, Buttons::A);
        assert_eq!(controller.snapshot().buttons, Buttons::A);
        let third = controller.snapshot();
        assert_eq!(third.buttons, Buttons::B);
        assert_eq!((third.left_y, third.right_y), (40, -40));
        assert_eq!(controller.snapshot(), InputSnapshot::IDLE);
        assert_eq!(probe.refreshes(), 4);
        assert_eq!(probe.pending_cycles(), 0);
    }

    #[test]
    fn reads_are_latched_between_refreshes() {
        let (mut controller, probe) = ScriptedController::new(&[]);
        probe.hold(InputSnapshot::IDLE.with_pressed(ControllerButton::L1));
        assert!(!controller.get_digital(ControllerButton::L1));
        controller.refresh();
        assert!(controller.get_digital(ControllerButton::L1));
        probe.release();
        assert!(controller.get_digital(ControllerButton::L1));
        controller.refresh();
        assert!(!controller.get_digital(ControllerButton::L1));
    }

    #[test]
    fn enqueue_appends_after_script() {
        let (mut controller, probe) =
            ScriptedController::new(&[ScriptFrame::hold(1, &[ControllerButton::X])]);
        probe.enqueue_input(InputSnapshot::IDLE.with_pressed(ControllerButton::Y), 1);
        probe.enqueue(&ScriptFrame::hold(0, &[ControllerButton::A]));
        assert_eq!(controller.snapshot().buttons, Buttons::X);
        assert_eq!(controller.snapshot().buttons, Buttons::Y);
        assert_eq!(controller.snapshot().buttons, Buttons::empty());
    }
}
