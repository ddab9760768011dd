//! Shared access to the motion-control collaborator.
//!
//! The control task drives the chassis while the telemetry thread reads its
//! pose, so the chassis sits behind a mutex. Every method holds the lock for
//! one collaborator call only.

use std::sync::Arc;

use parking_lot::Mutex;
use pilot_common::hal::device::{MotionControl, PoseSource};
use pilot_common::hal::error::HalError;
use pilot_common::robot::pose::Pose;
use pilot_common::robot::state::BrakeMode;

#[derive(Clone)]
pub struct ChassisHandle {
    inner: Arc<Mutex<Box<dyn MotionControl>>>,
}

impl ChassisHandle {
    pub fn new(chassis: Box<dyn MotionControl>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(chassis)),
        }
    }

    pub fn pose(&self) -> Pose {
        self.inner.lock().pose()
    }

    pub fn drive(&self, left: i8, right: i8) {
        self.inner.lock().drive(left, right);
    }

    /// Zero both sides.
    pub fn stop(&self) {
        self.drive(0, 0);
    }

    pub fn reset_heading(&self, heading: f64) {
        self.inner.lock().reset_heading(heading);
    }

    pub fn reset_tracking(&self) {
        self.inner.lock().reset_tracking();
    }

    pub fn set_brake_mode(&self, mode: BrakeMode) {
        self.inner.lock().set_brake_mode(mode);
    }

    /// Blocks until the sensors settle.
    pub fn calibrate(&self) -> Result<(), HalError> {
        self.inner.lock().calibrate()
    }

    /// Run `f` with exclusive access to the chassis.
    pub fn with<R>(&self, f: impl FnOnce(&mut dyn MotionControl) -> R) -> R {
        let mut chassis = self.inner.lock();
        f(chassis.as_mut())
    }
}

impl PoseSource for ChassisHandle {
    fn pose(&self) -> Pose {
        ChassisHandle::pose(self)
    }
}

impl std::fmt::Debug for ChassisHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChassisHandle")
            .field("pose", &self.pose())
            .finish()
    }
}
