//! Integration test: telemetry labels.
//!
//! Validates: the pose reaches the three labels with 3 decimals, the loop
//! keeps running across phases, and it stops with the display service.

use std::time::Duration;

use pilot_common::robot::pose::Pose;
use pilot_control_unit::context::RobotContext;
use pilot_control_unit::telemetry::TelemetryLabels;
use pilot_hal::drivers::simulation::SimulationProbe;

use super::{initialized_robot, wait_until};

const TIMEOUT: Duration = Duration::from_secs(2);

fn shows(probe: &SimulationProbe, labels: &TelemetryLabels, expected: [&str; 3]) -> bool {
    [labels.x, labels.y, labels.heading]
        .into_iter()
        .zip(expected)
        .all(|(id, text)| probe.display.text(id).as_deref() == Some(text))
}

fn labels(ctx: &RobotContext) -> TelemetryLabels {
    ctx.telemetry_labels().expect("initialized")
}

#[test]
fn pose_reaches_labels() {
    let (ctx, probe) = initialized_robot();
    let labels = labels(&ctx);

    probe.chassis.set_pose(Pose::new(12.34567, -3.0, 45.5));
    assert!(wait_until(TIMEOUT, || shows(
        &probe,
        &labels,
        ["X: 12.346", "Y: -3.000", "Theta: 45.500"]
    )));

    probe.chassis.set_pose(Pose::ORIGIN);
    assert!(wait_until(TIMEOUT, || shows(
        &probe,
        &labels,
        ["X: 0.000", "Y: 0.000", "Theta: 0.000"]
    )));
}

#[test]
fn keeps_updating_across_phases() {
    let (mut ctx, probe) = initialized_robot();
    let labels = labels(&ctx);

    ctx.autonomous().unwrap();
    ctx.operator_control().unwrap();
    ctx.disabled().unwrap();

    probe.chassis.set_pose(Pose::new(1.0, 2.0, 3.0));
    assert!(wait_until(TIMEOUT, || shows(
        &probe,
        &labels,
        ["X: 1.000", "Y: 2.000", "Theta: 3.000"]
    )));
}

#[test]
fn telemetry_stops_with_display() {
    let (mut ctx, probe) = initialized_robot();
    assert!(wait_until(TIMEOUT, || probe.display.text_writes() >= 6));

    let iterations = ctx.shutdown().expect("was initialized");
    assert!(iterations >= 2);

    let writes = probe.display.text_writes();
    std::thread::sleep(Duration::from_millis(60));
    assert_eq!(probe.display.text_writes(), writes);
}
