//! Integration test: operator control through the simulated controller.
//!
//! Validates: fixed mechanism priority, wing toggles under both coupling
//! policies, tank drive output, and the loop ending when the phase flag
//! clears.

use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

use pilot_common::robot::config::{DriveConfig, RobotConfig};
use pilot_common::robot::input::{Buttons, InputSnapshot};
use pilot_common::robot::mechanism::ActionKind;
use pilot_common::robot::state::{CompetitionPhase, WingPolicy};
use pilot_control_unit::context::RobotContext;
use pilot_control_unit::drive::DriveCurve;
use pilot_hal::drivers::simulation::SimulationProbe;

use super::robot_with;

fn operator(policy: WingPolicy) -> (RobotContext, SimulationProbe) {
    let mut config = RobotConfig::default();
    config.wings.policy = policy;
    let (mut ctx, probe) = robot_with(config);
    ctx.initialize().unwrap();
    ctx.operator_control().unwrap();
    (ctx, probe)
}

fn press(ctx: &mut RobotContext, probe: &SimulationProbe, buttons: Buttons) -> ActionKind {
    probe.controller.hold(InputSnapshot::new(buttons, 0, 0));
    ctx.operator_cycle().action
}

// ── Mechanism priority ──────────────────────────────────────────────

#[test]
fn highest_priority_held_button_wins() {
    let (mut ctx, probe) = operator(WingPolicy::Exclusive);

    assert_eq!(press(&mut ctx, &probe, Buttons::L2), ActionKind::Redirect);
    assert_eq!(probe.mechanism_speeds(), vec![100, 100, 100, 0]);

    assert_eq!(press(&mut ctx, &probe, Buttons::L1 | Buttons::L2), ActionKind::MidGoal);
    assert_eq!(probe.mechanism_speeds(), vec![100, 100, -100, 100]);

    assert_eq!(press(&mut ctx, &probe, Buttons::R2 | Buttons::L1), ActionKind::Outtake);
    assert_eq!(probe.mechanism_speeds(), vec![-100, -100, 0, -100]);

    let all = Buttons::R1 | Buttons::R2 | Buttons::L1 | Buttons::L2;
    assert_eq!(press(&mut ctx, &probe, all), ActionKind::Intake);
    assert_eq!(probe.mechanism_speeds(), vec![100, 100, 0, 100]);

    assert_eq!(press(&mut ctx, &probe, Buttons::empty()), ActionKind::Idle);
    assert_eq!(probe.mechanism_speeds(), vec![0, 0, 0, 0]);
}

#[test]
fn unbound_buttons_leave_mechanism_idle() {
    let (mut ctx, probe) = operator(WingPolicy::Exclusive);
    let action = press(&mut ctx, &probe, Buttons::A | Buttons::B | Buttons::X);
    assert_eq!(action, ActionKind::Idle);
    assert_eq!(probe.mechanism_speeds(), vec![0, 0, 0, 0]);
}

// ── Wings ───────────────────────────────────────────────────────────

#[test]
fn exclusive_wings_retract_each_other() {
    let (mut ctx, probe) = operator(WingPolicy::Exclusive);

    press(&mut ctx, &probe, Buttons::LEFT);
    assert_eq!(probe.wings(), (true, false));
    press(&mut ctx, &probe, Buttons::empty());

    press(&mut ctx, &probe, Buttons::RIGHT);
    assert_eq!(probe.wings(), (false, true));
    press(&mut ctx, &probe, Buttons::empty());

    press(&mut ctx, &probe, Buttons::RIGHT);
    assert_eq!(probe.wings(), (false, false));
}

#[test]
fn exclusive_simultaneous_press_leaves_right_extended() {
    let (mut ctx, probe) = operator(WingPolicy::Exclusive);
    press(&mut ctx, &probe, Buttons::LEFT | Buttons::RIGHT);
    assert_eq!(probe.wings(), (false, true));
}

#[test]
fn independent_wings_toggle_separately() {
    let (mut ctx, probe) = operator(WingPolicy::Independent);
    press(&mut ctx, &probe, Buttons::LEFT | Buttons::RIGHT);
    assert_eq!(probe.wings(), (true, true));
    press(&mut ctx, &probe, Buttons::empty());
    press(&mut ctx, &probe, Buttons::LEFT);
    assert_eq!(probe.wings(), (false, true));
}

#[test]
fn held_wing_button_toggles_once() {
    let (mut ctx, probe) = operator(WingPolicy::Exclusive);
    for _ in 0..10 {
        press(&mut ctx, &probe, Buttons::LEFT);
    }
    assert_eq!(probe.wings(), (true, false));
    assert_eq!(probe.left_wing.actuations(), 1);
}

#[test]
fn wings_and_mechanism_are_independent() {
    let (mut ctx, probe) = operator(WingPolicy::Exclusive);
    let action = press(&mut ctx, &probe, Buttons::R2 | Buttons::LEFT);
    assert_eq!(action, ActionKind::Outtake);
    assert_eq!(probe.wings(), (true, false));
}

// ── Drive and loop ──────────────────────────────────────────────────

#[test]
fn sticks_drive_through_curve() {
    let (mut ctx, probe) = operator(WingPolicy::Exclusive);
    let curve = DriveCurve::from_config(&DriveConfig::default());

    probe.controller.hold(InputSnapshot::new(Buttons::empty(), 60, -60));
    let cycle = ctx.operator_cycle();

    let expected = (curve.apply(60), curve.apply(-60));
    assert_eq!(cycle.drive, expected);
    assert_eq!(probe.chassis.last_drive(), expected);
    assert!(expected.0 > 0 && expected.1 < 0);
}

#[test]
fn loop_runs_until_flag_clears() {
    let (mut ctx, probe) = robot_with(RobotConfig::default());
    ctx.initialize().unwrap();
    probe.controller.hold(InputSnapshot::new(Buttons::R1, 0, 0));

    let flag = ctx.phase_flag();
    flag.store(true, Ordering::SeqCst);
    let clearer = thread::spawn(move || {
        thread::sleep(Duration::from_millis(150));
        flag.store(false, Ordering::SeqCst);
    });

    let stats = ctx.operator_control().unwrap();
    clearer.join().unwrap();

    assert_eq!(ctx.phase(), CompetitionPhase::OperatorControl);
    assert!(stats.cycle_count >= 2);
    assert_eq!(probe.controller.refreshes(), stats.cycle_count);
    assert_eq!(ctx.mechanism_action(), ActionKind::Intake);
}
