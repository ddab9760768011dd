//! Shared fixtures for the integration tests.

mod lifecycle;
mod operator_control;
mod properties;
mod selector_flow;
mod telemetry;

use std::thread;
use std::time::{Duration, Instant};

use pilot_common::robot::config::RobotConfig;
use pilot_control_unit::config::LoadedConfig;
use pilot_control_unit::context::RobotContext;
use pilot_hal::drivers::simulation::{self, SimulationProbe};

/// Reference robot on the simulation backend.
pub fn robot() -> (RobotContext, SimulationProbe) {
    robot_with(RobotConfig::default())
}

/// Simulated robot built from `robot`.
pub fn robot_with(robot: RobotConfig) -> (RobotContext, SimulationProbe) {
    let config = LoadedConfig::from_robot(robot).expect("valid test config");
    let (backend, probe) = simulation::build(&config.robot).expect("simulation backend");
    let ctx = RobotContext::new(config, backend).expect("robot context");
    (ctx, probe)
}

/// Initialized robot whose phase flag is clear, so looping entry points
/// enter their phase and return immediately.
pub fn initialized_robot() -> (RobotContext, SimulationProbe) {
    let (mut ctx, probe) = robot();
    ctx.initialize().expect("initialize");
    (ctx, probe)
}

/// Poll `condition` until it holds or `timeout` elapses.
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    condition()
}
