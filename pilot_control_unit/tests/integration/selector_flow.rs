//! Integration test: autonomous selector during pre-match.
//!
//! Validates: controller edges and on-screen buttons both move the
//! 1-indexed cyclic index, the label tracks it, and locking tears the UI
//! down and freezes the choice.

use std::time::Duration;

use pilot_common::robot::config::ScriptFrame;
use pilot_common::robot::input::ControllerButton;
use pilot_common::robot::state::SelectorState;
use pilot_control_unit::context::RobotContext;
use pilot_control_unit::selector::{ADVANCE_CAPTION, RETREAT_CAPTION};
use pilot_hal::drivers::simulation::SimulationProbe;

use super::{initialized_robot, wait_until};

/// Robot in pre-match with the selector shown and no loop running.
fn pre_match() -> (RobotContext, SimulationProbe) {
    let (mut ctx, probe) = initialized_robot();
    ctx.competition_initialize().unwrap();
    sync(&ctx);
    (ctx, probe)
}

fn sync(ctx: &RobotContext) {
    ctx.display().unwrap().sync().unwrap();
}

fn label_text(ctx: &RobotContext, probe: &SimulationProbe) -> String {
    sync(ctx);
    let id = ctx.selector().label_id().expect("selector shown");
    probe.display.text(id).unwrap()
}

fn run_cycles(ctx: &mut RobotContext, n: usize) -> usize {
    (0..n).map(|_| ctx.pre_match_cycle()).sum()
}

#[test]
fn shown_at_first_routine() {
    let (ctx, probe) = pre_match();
    assert_eq!(ctx.selector().state(), SelectorState::Active);
    assert_eq!(label_text(&ctx, &probe), "1: Red, top");
    assert!(probe.display.button(ADVANCE_CAPTION).is_some());
    assert!(probe.display.button(RETREAT_CAPTION).is_some());
}

#[test]
fn controller_presses_are_edge_triggered() {
    let (mut ctx, probe) = pre_match();
    for frame in [
        ScriptFrame::hold(5, &[ControllerButton::Up]),
        ScriptFrame::hold(1, &[]),
        ScriptFrame::hold(1, &[ControllerButton::Up]),
        ScriptFrame::hold(1, &[]),
        ScriptFrame::hold(3, &[ControllerButton::Down]),
    ] {
        probe.controller.enqueue(&frame);
    }

    let applied = run_cycles(&mut ctx, 11);

    // Up, Up, Down: one transition per press however long it is held.
    assert_eq!(applied, 3);
    assert_eq!(ctx.selector().index().get(), 2);
    assert_eq!(label_text(&ctx, &probe), "2: Red, bottom");
}

#[test]
fn retreat_from_first_wraps_to_last() {
    let (mut ctx, probe) = pre_match();
    probe
        .controller
        .enqueue(&ScriptFrame::hold(1, &[ControllerButton::Down]));

    assert_eq!(run_cycles(&mut ctx, 1), 1);
    assert_eq!(ctx.selector().index().get(), 6);
    assert_eq!(label_text(&ctx, &probe), "6: Blue");

    probe.controller.enqueue(&ScriptFrame::hold(1, &[]));
    probe
        .controller
        .enqueue(&ScriptFrame::hold(1, &[ControllerButton::Up]));
    run_cycles(&mut ctx, 2);
    assert_eq!(ctx.selector().index().get(), 1);
}

#[test]
fn on_screen_buttons_move_selector() {
    let (mut ctx, probe) = pre_match();
    let advance = probe.display.button(ADVANCE_CAPTION).unwrap();
    let retreat = probe.display.button(RETREAT_CAPTION).unwrap();

    probe.display.click(advance);
    probe.display.click(advance);
    probe.display.click(retreat);
    assert!(wait_until(Duration::from_secs(2), || {
        probe.display.clicks_delivered() == 3
    }));

    assert_eq!(ctx.pre_match_cycle(), 3);
    assert_eq!(ctx.selector().index().get(), 2);
    assert_eq!(label_text(&ctx, &probe), "2: Red, bottom");
}

#[test]
fn lock_removes_ui_and_freezes_index() {
    let (mut ctx, probe) = pre_match();
    probe
        .controller
        .enqueue(&ScriptFrame::hold(1, &[ControllerButton::Up]));
    run_cycles(&mut ctx, 1);
    let before = probe.display.element_count();

    let report = ctx.autonomous().unwrap();
    assert_eq!(report.index.get(), 2);
    assert_eq!(report.routine, "red_bottom");

    // Label and both buttons destroyed before autonomous returned.
    assert_eq!(probe.display.element_count(), before - 3);
    assert!(probe.display.button(ADVANCE_CAPTION).is_none());
    assert!(ctx.selector().label_id().is_none());
    assert_eq!(ctx.selector().state(), SelectorState::Locked);

    probe
        .controller
        .enqueue(&ScriptFrame::hold(1, &[ControllerButton::Down]));
    assert_eq!(run_cycles(&mut ctx, 2), 0);
    assert_eq!(ctx.selector().index().get(), 2);
}

#[test]
fn never_shown_selector_locks_at_first() {
    let (mut ctx, probe) = initialized_robot();
    let report = ctx.autonomous().unwrap();
    assert_eq!(report.index.get(), 1);
    assert_eq!(ctx.selector().state(), SelectorState::Locked);
    assert!(probe.display.button(ADVANCE_CAPTION).is_none());
}

#[test]
fn held_presses_select_then_autonomous_locks_choice() {
    use ControllerButton::{Down, Up};
    let (mut ctx, probe) = pre_match();
    for button in [Up, Up, Down, Up, Up, Up] {
        probe.controller.enqueue(&ScriptFrame::hold(3, &[button]));
        probe.controller.enqueue(&ScriptFrame::hold(1, &[]));
    }

    assert_eq!(run_cycles(&mut ctx, 24), 6);
    assert_eq!(ctx.selector().index().get(), 5);

    let report = ctx.autonomous().unwrap();
    assert_eq!(report.index.get(), 5);
    assert_eq!(report.routine, "red");
    // Only the three telemetry labels are left.
    assert_eq!(probe.display.element_count(), 3);
}
