//! Device traits for the motion-control and hardware collaborators.
//!
//! All methods are infallible except calibration: the core assumes reads and
//! writes succeed, and detecting a disconnected device is the backend's job.

use crate::hal::error::HalError;
use crate::robot::input::{AnalogAxis, Buttons, ControllerButton, InputSnapshot};
use crate::robot::pose::Pose;
use crate::robot::state::BrakeMode;

/// Chassis-level motion control: odometry plus tank drive.
pub trait MotionControl: Send {
    /// Current field pose.
    fn pose(&self) -> Pose;

    /// Overwrite the heading estimate, in degrees.
    fn reset_heading(&mut self, heading: f64);

    /// Command left/right drive power as signed percentages.
    fn drive(&mut self, left: i8, right: i8);

    /// Calibrate sensors. Blocks until they settle.
    ///
    /// # Errors
    /// Return `HalError::CalibrationFailed` if the sensors never settle.
    fn calibrate(&mut self) -> Result<(), HalError>;

    /// Zero the tracking-wheel encoders.
    /// Default: no-op (for chassis without tracking wheels).
    fn reset_tracking(&mut self) {}

    /// Set drive motor behaviour at zero command.
    /// Default: no-op.
    fn set_brake_mode(&mut self, _mode: BrakeMode) {}
}

/// Read-only pose access, shareable across threads.
pub trait PoseSource: Send + Sync {
    fn pose(&self) -> Pose;
}

/// A speed-controlled motor in the mechanism group.
pub trait Actuator: Send {
    fn name(&self) -> &str;

    /// Command speed as a signed percentage in `[-100, 100]`.
    fn set_speed(&mut self, percent: i8);
}

/// A two-state pneumatic actuator.
pub trait Pneumatic: Send {
    fn extend(&mut self);

    fn retract(&mut self);

    fn is_extended(&self) -> bool;

    /// Drive the piston to `extended`.
    fn set_extended(&mut self, extended: bool) {
        if extended {
            self.extend();
        } else {
            self.retract();
        }
    }
}

/// Operator controller.
pub trait InputSource: Send {
    /// Latch the controller state for the upcoming reads.
    /// Default: no-op (for sources that are always current).
    fn refresh(&mut self) {}

    fn get_digital(&self, button: ControllerButton) -> bool;

    /// Axis value as a signed percentage.
    fn get_analog(&self, axis: AnalogAxis) -> i8;

    /// Refresh and capture every button and both drive axes at once.
    fn snapshot(&mut self) -> InputSnapshot {
        self.refresh();
        let buttons = ControllerButton::ALL
            .into_iter()
            .filter(|b| self.get_digital(*b))
            .fold(Buttons::empty(), |acc, b| acc | b.flag());
        InputSnapshot::new(
            buttons,
            self.get_analog(AnalogAxis::LeftY),
            self.get_analog(AnalogAxis::RightY),
        )
    }
}
