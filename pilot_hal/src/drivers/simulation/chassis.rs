//! Simulated differential drivetrain with dead-reckoning odometry.
//!
//! Pose integrates from the last commanded wheel powers whenever the
//! chassis is touched (`pose()` or `drive()`), using wall-clock time since
//! the previous touch. Steps are clamped so a paused test does not teleport
//! the robot.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use pilot_common::hal::device::MotionControl;
use pilot_common::hal::error::HalError;
use pilot_common::robot::pose::Pose;
use pilot_common::robot::state::BrakeMode;
use tracing::{debug, info};

/// Distance between left and right wheels [in].
pub const TRACK_WIDTH_IN: f64 = 16.0;

/// Wheel surface speed at 100 % power [in/s]: 450 rpm on 2.75 in wheels.
pub const MAX_WHEEL_SPEED_IN_S: f64 = 450.0 / 60.0 * 2.75 * std::f64::consts::PI;

/// Longest integration step.
pub const MAX_STEP: Duration = Duration::from_millis(100);

/// Shared chassis state, observed through [`ChassisProbe`].
#[derive(Debug)]
pub(super) struct ChassisState {
    pose: Pose,
    left: i8,
    right: i8,
    brake_mode: BrakeMode,
    last_step: Option<Instant>,
    calibrations: u32,
    tracking_resets: u32,
    heading_resets: u32,
    drive_commands: u64,
    fail_calibration: bool,
}

impl ChassisState {
    fn new() -> Self {
        Self {
            pose: Pose::ORIGIN,
            left: 0,
            right: 0,
            brake_mode: BrakeMode::default(),
            last_step: None,
            calibrations: 0,
            tracking_resets: 0,
            heading_resets: 0,
            drive_commands: 0,
            fail_calibration: false,
        }
    }

    /// Advance the pose to `now` under the current wheel powers.
    fn step_to(&mut self, now: Instant) {
        if let Some(last) = self.last_step {
            let dt = now.saturating_duration_since(last).min(MAX_STEP);
            self.integrate(dt);
        }
        self.last_step = Some(now);
    }

    /// Differential-drive kinematics. Heading is in degrees, clockwise
    /// positive, with 0° pointing along +y.
    fn integrate(&mut self, dt: Duration) {
        let dt = dt.as_secs_f64();
        if dt <= 0.0 || (self.left == 0 && self.right == 0) {
            return;
        }
        let vl = f64::from(self.left) / 100.0 * MAX_WHEEL_SPEED_IN_S;
        let vr = f64::from(self.right) / 100.0 * MAX_WHEEL_SPEED_IN_S;
        let v = (vl + vr) / 2.0;
        let omega = (vl - vr) / TRACK_WIDTH_IN;

        let mid_heading = self.pose.heading.to_radians() + omega * dt / 2.0;
        self.pose.x += v * mid_heading.sin() * dt;
        self.pose.y += v * mid_heading.cos() * dt;
        self.pose.heading += (omega * dt).to_degrees();
    }
}

/// Simulated chassis implementing [`MotionControl`].
pub struct SimChassis {
    state: Arc<Mutex<ChassisState>>,
}

impl SimChassis {
    pub(super) fn new() -> (Self, ChassisProbe) {
        let state = Arc::new(Mutex::new(ChassisState::new()));
        (
            Self {
                state: Arc::clone(&state),
            },
            ChassisProbe { state },
        )
    }
}

impl MotionControl for SimChassis {
    fn pose(&self) -> Pose {
        let mut state = self.state.lock();
        state.step_to(Instant::now());
        state.pose
    }

    fn reset_heading(&mut self, heading: f64) {
        let mut state = self.state.lock();
        state.step_to(Instant::now());
        state.pose.heading = heading;
        state.heading_resets += 1;
        debug!(heading, "Heading reset");
    }

    fn drive(&mut self, left: i8, right: i8) {
        let mut state = self.state.lock();
        state.step_to(Instant::now());
        state.left = left;
        state.right = right;
        state.drive_commands += 1;
    }

    fn calibrate(&mut self) -> Result<(), HalError> {
        let mut state = self.state.lock();
        if state.fail_calibration {
            return Err(HalError::CalibrationFailed(
                "simulated IMU did not settle".to_string(),
            ));
        }
        state.pose = Pose::ORIGIN;
        state.left = 0;
        state.right = 0;
        state.last_step = None;
        state.calibrations += 1;
        info!("Simulated chassis calibrated");
        Ok(())
    }

    fn reset_tracking(&mut self) {
        let mut state = self.state.lock();
        state.step_to(Instant::now());
        state.tracking_resets += 1;
        debug!("Tracking wheels reset");
    }

    fn set_brake_mode(&mut self, mode: BrakeMode) {
        self.state.lock().brake_mode = mode;
    }
}

/// Test-side view of a [`SimChassis`].
#[derive(Clone)]
pub struct ChassisProbe {
    state: Arc<Mutex<ChassisState>>,
}

impl ChassisProbe {
    /// Pose without advancing the simulation.
    pub fn pose(&self) -> Pose {
        self.state.lock().pose
    }

    /// Teleport the robot.
    pub fn set_pose(&self, pose: Pose) {
        let mut state = self.state.lock();
        state.pose = pose;
        state.last_step = None;
    }

    /// Integrate the current wheel powers over `dt`, independent of the clock.
    pub fn advance(&self, dt: Duration) {
        let mut state = self.state.lock();
        state.integrate(dt);
        state.last_step = Some(Instant::now());
    }

    /// Last commanded `(left, right)` power.
    pub fn last_drive(&self) -> (i8, i8) {
        let state = self.state.lock();
        (state.left, state.right)
    }

    pub fn drive_commands(&self) -> u64 {
        self.state.lock().drive_commands
    }

    pub fn brake_mode(&self) -> BrakeMode {
        self.state.lock().brake_mode
    }

    pub fn calibrations(&self) -> u32 {
        self.state.lock().calibrations
    }

    pub fn tracking_resets(&self) -> u32 {
        self.state.lock().tracking_resets
    }

    pub fn heading_resets(&self) -> u32 {
        self.state.lock().heading_resets
    }

    /// Make the next `calibrate()` fail.
    pub fn fail_calibration(&self, fail: bool) {
        self.state.lock().fail_calibration = fail;
    }
}
