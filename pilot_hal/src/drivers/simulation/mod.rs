//! Simulation backend.
//!
//! This module provides a software robot for development and testing
//! without physical hardware: a dead-reckoning chassis, recording motors
//! and pistons, a scripted controller and a headless display. Every device
//! comes with a probe that observes (and for inputs, drives) it from tests.

mod chassis;
mod controller;
mod display;
mod motor;
mod piston;

pub use chassis::{ChassisProbe, MAX_WHEEL_SPEED_IN_S, SimChassis, TRACK_WIDTH_IN};
pub use controller::{ControllerProbe, ScriptedController};
pub use display::{DisplayProbe, ElementView, HeadlessDisplay};
pub use motor::{MotorProbe, SimMotor};
pub use piston::{PistonProbe, SimPiston};

use pilot_common::hal::device::Actuator;
use pilot_common::hal::error::HalError;
use pilot_common::robot::config::RobotConfig;
use tracing::info;

use crate::backend::Backend;

/// Registry name of this backend.
pub const DRIVER_NAME: &str = "simulation";

/// Observation handles for every simulated device.
#[derive(Clone)]
pub struct SimulationProbe {
    pub chassis: ChassisProbe,
    /// Mechanism motors, in `[mechanism] actuators` order.
    pub mechanism: Vec<MotorProbe>,
    pub left_wing: PistonProbe,
    pub right_wing: PistonProbe,
    pub controller: ControllerProbe,
    pub display: DisplayProbe,
}

impl SimulationProbe {
    /// Current speed of every mechanism motor.
    pub fn mechanism_speeds(&self) -> Vec<i8> {
        self.mechanism.iter().map(MotorProbe::speed).collect()
    }

    /// `(left, right)` wing extension.
    pub fn wings(&self) -> (bool, bool) {
        (self.left_wing.is_extended(), self.right_wing.is_extended())
    }
}

/// Build a simulated robot together with its probes.
///
/// # Errors
/// Returns `HalError::ConfigError` if the mechanism ports do not match the
/// actuator list.
pub fn build(config: &RobotConfig) -> Result<(Backend, SimulationProbe), HalError> {
    let names = &config.mechanism.actuators;
    let ports = &config.ports.mechanism;
    if names.len() != ports.len() {
        return Err(HalError::ConfigError(format!(
            "{} mechanism actuators but {} mechanism ports",
            names.len(),
            ports.len()
        )));
    }

    let (chassis, chassis_probe) = SimChassis::new();

    let mut mechanism: Vec<Box<dyn Actuator>> = Vec::with_capacity(names.len());
    let mut mechanism_probes = Vec::with_capacity(names.len());
    for (name, port) in names.iter().zip(ports) {
        let (motor, probe) = SimMotor::new(name, port.port, port.reversed);
        mechanism.push(Box::new(motor));
        mechanism_probes.push(probe);
    }

    let (left_wing, left_probe) = SimPiston::new(config.ports.left_wing);
    let (right_wing, right_probe) = SimPiston::new(config.ports.right_wing);
    let (controller, controller_probe) = ScriptedController::new(&config.simulation.script);
    let (display, display_probe) = HeadlessDisplay::new();

    info!(
        actuators = mechanism.len(),
        script_frames = config.simulation.script.len(),
        "Simulation backend built"
    );

    let backend = Backend {
        driver: DRIVER_NAME,
        chassis: Box::new(chassis),
        mechanism,
        left_wing: Box::new(left_wing),
        right_wing: Box::new(right_wing),
        controller: Box::new(controller),
        display: Box::new(display),
    };
    let probe = SimulationProbe {
        chassis: chassis_probe,
        mechanism: mechanism_probes,
        left_wing: left_probe,
        right_wing: right_probe,
        controller: controller_probe,
        display: display_probe,
    };
    Ok((backend, probe))
}

/// Factory registered under [`DRIVER_NAME`].
pub fn create_backend(config: &RobotConfig) -> Result<Backend, HalError> {
    build(config).map(|(backend, _probe)| backend)
}
