//! Integration test: the competition lifecycle end to end.
//!
//! Validates: `run_match` drives every entry point in order, scripted
//! selector presses change which routine autonomous runs, phase transitions
//! return every output to neutral, and the phase rules reject replays.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use pilot_common::robot::config::{RobotConfig, ScriptFrame};
use pilot_common::robot::input::{Buttons, ControllerButton, InputSnapshot};
use pilot_common::robot::mechanism::ActionKind;
use pilot_common::robot::state::{CompetitionPhase, SelectorState};
use pilot_control_unit::command::wings::WingState;
use pilot_control_unit::competition::{MatchTimeline, run_match};
use pilot_control_unit::error::LifecycleError;
use pilot_control_unit::routine::{AutonContext, DispatchOutcome};

use super::{initialized_robot, robot, robot_with};

fn short_match() -> MatchTimeline {
    MatchTimeline {
        pre_match: Duration::from_millis(400),
        autonomous: Duration::from_millis(60),
        driver: Duration::from_millis(120),
    }
}

// ── Full match ──────────────────────────────────────────────────────

#[test]
fn full_match_runs_every_phase() {
    let (mut ctx, probe) = robot();
    let runs = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&runs);
    ctx.register_routine("red_top", move |_: &mut AutonContext<'_>| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let stop = AtomicBool::new(false);
    let report = run_match(&mut ctx, &short_match(), &stop).unwrap();

    let auton = report.autonomous.expect("autonomous ran");
    assert_eq!(auton.index.get(), 1);
    assert_eq!(auton.routine, "red_top");
    assert_eq!(auton.outcome, DispatchOutcome::Ran);
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    assert!(report.pre_match.unwrap().cycle_count > 0);
    assert!(report.operator.unwrap().cycle_count > 0);
    assert!(!report.stopped);

    assert_eq!(ctx.phase(), CompetitionPhase::Disabled);
    assert_eq!(ctx.selector().state(), SelectorState::Locked);
    assert_eq!(probe.chassis.calibrations(), 1);
    assert_eq!(probe.chassis.tracking_resets(), 1);
    assert_eq!(probe.chassis.heading_resets(), 1);

    assert!(ctx.shutdown().is_some());
}

#[test]
fn scripted_presses_choose_the_routine() {
    let mut config = RobotConfig::default();
    config.simulation.script = vec![
        ScriptFrame::hold(1, &[ControllerButton::Up]),
        ScriptFrame::hold(1, &[]),
        ScriptFrame::hold(1, &[ControllerButton::Up]),
        ScriptFrame::hold(1, &[]),
    ];
    let (mut ctx, _probe) = robot_with(config);
    let ran = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&ran);
    ctx.register_routine("blue_top", move |_: &mut AutonContext<'_>| {
        flag.store(true, Ordering::SeqCst);
    });

    let report = run_match(&mut ctx, &short_match(), &AtomicBool::new(false)).unwrap();

    let auton = report.autonomous.unwrap();
    assert_eq!(auton.index.get(), 3);
    assert_eq!(auton.routine, "blue_top");
    assert!(ran.load(Ordering::SeqCst));
}

#[test]
fn zero_pre_match_skips_selector() {
    let (mut ctx, probe) = robot();
    let timeline = MatchTimeline {
        pre_match: Duration::ZERO,
        ..short_match()
    };

    let report = run_match(&mut ctx, &timeline, &AtomicBool::new(false)).unwrap();

    assert!(report.pre_match.is_none());
    let auton = report.autonomous.unwrap();
    assert_eq!(auton.index.get(), 1);
    assert_eq!(auton.outcome, DispatchOutcome::Unassigned);
    assert_eq!(probe.chassis.tracking_resets(), 0);
}

#[test]
fn stop_before_start_only_disables() {
    let (mut ctx, _probe) = robot();
    let report = run_match(&mut ctx, &short_match(), &AtomicBool::new(true)).unwrap();

    assert!(report.stopped);
    assert!(report.pre_match.is_none());
    assert!(report.autonomous.is_none());
    assert!(report.operator.is_none());
    assert_eq!(ctx.phase(), CompetitionPhase::Disabled);
}

// ── Neutral outputs ─────────────────────────────────────────────────

#[test]
fn phase_transition_returns_outputs_to_neutral() {
    let (mut ctx, probe) = initialized_robot();
    ctx.operator_control().unwrap();
    assert_eq!(ctx.phase(), CompetitionPhase::OperatorControl);

    probe.controller.hold(InputSnapshot::new(Buttons::R1 | Buttons::LEFT, 80, 80));
    let cycle = ctx.operator_cycle();
    assert_eq!(cycle.action, ActionKind::Intake);
    assert_eq!(probe.wings(), (true, false));
    assert_eq!(probe.mechanism_speeds(), vec![100, 100, 0, 100]);
    assert_ne!(probe.chassis.last_drive(), (0, 0));

    ctx.disabled().unwrap();

    assert_eq!(probe.wings(), (false, false));
    assert_eq!(ctx.wing_state(), WingState::NEUTRAL);
    assert_eq!(probe.mechanism_speeds(), vec![0, 0, 0, 0]);
    assert_eq!(ctx.mechanism_action(), ActionKind::Idle);
    assert_eq!(probe.chassis.last_drive(), (0, 0));
}

#[test]
fn held_button_counts_as_press_after_phase_entry() {
    let (mut ctx, probe) = initialized_robot();
    ctx.operator_control().unwrap();
    probe.controller.hold(InputSnapshot::new(Buttons::LEFT, 0, 0));
    ctx.operator_cycle();
    assert_eq!(probe.wings(), (true, false));

    ctx.disabled().unwrap();
    assert_eq!(probe.wings(), (false, false));

    // Still held across the transition: the fresh phase sees a new press.
    ctx.operator_control().unwrap();
    ctx.operator_cycle();
    assert_eq!(probe.wings(), (true, false));
}

// ── Phase rules ─────────────────────────────────────────────────────

#[test]
fn repeated_autonomous_is_rejected() {
    let (mut ctx, _probe) = initialized_robot();
    ctx.autonomous().unwrap();

    let err = ctx.autonomous().unwrap_err();
    assert!(matches!(
        err,
        LifecycleError::PhaseRejected {
            from: CompetitionPhase::Autonomous,
            to: CompetitionPhase::Autonomous,
            ..
        }
    ));
}

#[test]
fn pre_match_allowed_again_after_disabled() {
    let (mut ctx, _probe) = initialized_robot();
    ctx.competition_initialize().unwrap();
    ctx.disabled().unwrap();
    ctx.competition_initialize().unwrap();
    assert_eq!(ctx.phase(), CompetitionPhase::PreMatch);

    ctx.operator_control().unwrap();
    assert!(matches!(
        ctx.competition_initialize(),
        Err(LifecycleError::PhaseRejected { .. })
    ));
}

#[test]
fn autonomous_routine_sees_phase_flag() {
    let (mut ctx, probe) = initialized_robot();
    ctx.register_routine("red_top", move |auton: &mut AutonContext<'_>| {
        auton.chassis.drive(50, 50);
        // Flag is clear, so the wait ends immediately.
        assert!(!auton.wait(Duration::from_secs(10)));
        auton.set_mechanism(&[100, 100, 0, 100]);
    });

    let report = ctx.autonomous().unwrap();
    assert_eq!(report.outcome, DispatchOutcome::Ran);
    assert_eq!(probe.chassis.last_drive(), (50, 50));
    assert_eq!(probe.mechanism_speeds(), vec![100, 100, 0, 100]);

    ctx.disabled().unwrap();
    assert_eq!(probe.chassis.last_drive(), (0, 0));
    assert_eq!(probe.mechanism_speeds(), vec![0, 0, 0, 0]);
}
