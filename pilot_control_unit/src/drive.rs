//! Tank drive with exponential stick curves.
//!
//! Inputs and outputs are signed percentages. The curve has three regions:
//! a deadband around centre that outputs zero, a jump to `min_output` just
//! outside it so small stick movements still overcome static friction, and
//! an exponential ramp that reaches full power at full stick.

use pilot_common::consts::PERCENT_MAX;
use pilot_common::hal::device::MotionControl;
use pilot_common::robot::config::DriveConfig;
use pilot_common::robot::input::InputSnapshot;

const FULL: f64 = PERCENT_MAX as f64;

/// Exponential drive curve with deadband and minimum output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveCurve {
    deadband: f64,
    min_output: f64,
    gain: f64,
}

impl DriveCurve {
    /// `gain == 1.0` is linear outside the deadband.
    pub fn new(deadband: u8, min_output: u8, gain: f64) -> Self {
        Self {
            deadband: f64::from(deadband).min(FULL - 1.0),
            min_output: f64::from(min_output).min(FULL),
            gain,
        }
    }

    pub fn from_config(config: &DriveConfig) -> Self {
        Self::new(config.deadband, config.min_output, config.curve_gain)
    }

    pub fn apply(&self, input: i8) -> i8 {
        let x = f64::from(input).clamp(-FULL, FULL);
        let magnitude = x.abs();
        if magnitude <= self.deadband {
            return 0;
        }
        let g = magnitude - self.deadband;
        let g_max = FULL - self.deadband;
        let shaped = self.gain.powf(g - FULL) * g;
        let shaped_max = self.gain.powf(g_max - FULL) * g_max;
        let out = (FULL - self.min_output) * shaped / shaped_max + self.min_output;
        (out.round().clamp(0.0, FULL) as i8) * (input.signum())
    }
}

impl Default for DriveCurve {
    fn default() -> Self {
        Self::from_config(&DriveConfig::default())
    }
}

/// Left stick drives the left side, right stick the right side.
#[derive(Debug, Clone, Copy, Default)]
pub struct TankDrive {
    curve: DriveCurve,
}

impl TankDrive {
    pub const fn new(curve: DriveCurve) -> Self {
        Self { curve }
    }

    /// Shaped `(left, right)` power for `input`.
    pub fn command(&self, input: &InputSnapshot) -> (i8, i8) {
        (self.curve.apply(input.left_y), self.curve.apply(input.right_y))
    }

    /// Shape `input` and send it to the chassis.
    pub fn drive(&self, input: &InputSnapshot, chassis: &mut dyn MotionControl) -> (i8, i8) {
        let (left, right) = self.command(input);
        chassis.drive(left, right);
        (left, right)
    }
}
