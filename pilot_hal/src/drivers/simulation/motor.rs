//! Simulated mechanism motor.

use std::sync::Arc;

use parking_lot::Mutex;
use pilot_common::hal::device::Actuator;
use pilot_common::robot::input::clamp_percent;
use tracing::trace;

#[derive(Debug, Default)]
struct MotorState {
    speed: i8,
    writes: u64,
}

/// Simulated motor implementing [`Actuator`].
pub struct SimMotor {
    name: String,
    port: u8,
    reversed: bool,
    state: Arc<Mutex<MotorState>>,
}

impl SimMotor {
    pub(super) fn new(name: &str, port: u8, reversed: bool) -> (Self, MotorProbe) {
        let state = Arc::new(Mutex::new(MotorState::default()));
        (
            Self {
                name: name.to_string(),
                port,
                reversed,
                state: Arc::clone(&state),
            },
            MotorProbe {
                name: name.to_string(),
                reversed,
                state,
            },
        )
    }
}

impl Actuator for SimMotor {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_speed(&mut self, percent: i8) {
        let mut state = self.state.lock();
        state.speed = clamp_percent(percent);
        state.writes += 1;
        trace!(
            motor = %self.name,
            port = self.port,
            reversed = self.reversed,
            speed = state.speed,
            "set_speed"
        );
    }
}

/// Test-side view of a [`SimMotor`].
#[derive(Clone)]
pub struct MotorProbe {
    name: String,
    reversed: bool,
    state: Arc<Mutex<MotorState>>,
}

impl MotorProbe {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last commanded speed, as seen by the caller.
    pub fn speed(&self) -> i8 {
        self.state.lock().speed
    }

    /// Speed at the motor shaft, after port reversal.
    pub fn shaft_speed(&self) -> i8 {
        let speed = self.speed();
        if self.reversed { -speed } else { speed }
    }

    /// Number of `set_speed` calls so far.
    pub fn writes(&self) -> u64 {
        self.state.lock().writes
    }
}
