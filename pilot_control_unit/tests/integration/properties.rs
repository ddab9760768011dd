//! Property tests for the pure control components.
//!
//! Validates: arbitration is a deterministic function of held buttons that
//! honours priority, the selector index never leaves `[1, n]` and is frozen
//! once locked, and exclusive wings never both extend.

use proptest::prelude::*;

use pilot_common::robot::config::{BindingsConfig, MechanismConfig};
use pilot_common::robot::input::{Buttons, ControllerButton, InputSnapshot};
use pilot_common::robot::mechanism::ActionKind;
use pilot_common::robot::state::{SelectorState, WingPolicy};
use pilot_control_unit::command::arbitration::MechanismArbitrator;
use pilot_control_unit::command::edge::EdgeDetector;
use pilot_control_unit::command::wings::WingController;
use pilot_control_unit::state::selector::{SelectorEvent, SelectorStateMachine, TransitionResult};

fn moves() -> impl Strategy<Value = Vec<SelectorEvent>> {
    prop::collection::vec(
        prop_oneof![Just(SelectorEvent::Advance), Just(SelectorEvent::Retreat)],
        0..64,
    )
}

fn wing_edges(left: bool, right: bool) -> Buttons {
    let mut rising = Buttons::empty();
    rising.set(Buttons::LEFT, left);
    rising.set(Buttons::RIGHT, right);
    rising
}

proptest! {
    #[test]
    fn arbitration_follows_priority(bits in any::<u16>(), left in -100i8..=100, right in -100i8..=100) {
        let bindings = BindingsConfig::default();
        let arbitrator = MechanismArbitrator::new(&MechanismConfig::default(), &bindings).unwrap();
        let input = InputSnapshot::new(Buttons::from_bits_truncate(bits), left, right);

        let expected = bindings
            .priority_slots()
            .into_iter()
            .find(|(_, button)| input.is_pressed(*button))
            .map_or(ActionKind::Idle, |(kind, _)| kind);

        let first = arbitrator.arbitrate(&input).clone();
        prop_assert_eq!(first.kind(), expected);
        prop_assert_eq!(arbitrator.arbitrate(&input), &first);
    }

    #[test]
    fn selector_index_stays_in_range(size in 1u8..=32, events in moves()) {
        let mut selector = SelectorStateMachine::new(size);
        selector.handle_event(SelectorEvent::Show);

        let mut net: i64 = 0;
        for event in &events {
            let result = selector.handle_event(*event);
            prop_assert!(matches!(result, TransitionResult::Ok(SelectorState::Active, _)));
            let index = selector.index().get();
            prop_assert!((1..=size).contains(&index));
            net += if *event == SelectorEvent::Advance { 1 } else { -1 };
        }

        let expected = net.rem_euclid(i64::from(size)) + 1;
        prop_assert_eq!(i64::from(selector.index().get()), expected);
    }

    #[test]
    fn locked_selector_is_frozen(size in 1u8..=32, before in moves(), after in moves()) {
        let mut selector = SelectorStateMachine::new(size);
        selector.handle_event(SelectorEvent::Show);
        for event in before {
            selector.handle_event(event);
        }
        selector.handle_event(SelectorEvent::Lock);
        let frozen = selector.index();

        for event in after.into_iter().chain([SelectorEvent::Show, SelectorEvent::Lock]) {
            let rejected = matches!(selector.handle_event(event), TransitionResult::Rejected(_));
            prop_assert!(rejected);
        }
        prop_assert_eq!(selector.index(), frozen);
        prop_assert!(selector.is_locked());
    }

    #[test]
    fn exclusive_wings_never_both_extended(presses in prop::collection::vec(any::<(bool, bool)>(), 0..64)) {
        let mut wings = WingController::new(
            WingPolicy::Exclusive,
            ControllerButton::Left,
            ControllerButton::Right,
        );
        for (left, right) in presses {
            wings.update(wing_edges(left, right));
            prop_assert!(!(wings.state().left && wings.state().right));
        }
    }

    #[test]
    fn independent_wings_follow_press_parity(presses in prop::collection::vec(any::<(bool, bool)>(), 0..64)) {
        let mut wings = WingController::new(
            WingPolicy::Independent,
            ControllerButton::Left,
            ControllerButton::Right,
        );
        for &(left, right) in &presses {
            wings.update(wing_edges(left, right));
        }
        let lefts = presses.iter().filter(|(l, _)| *l).count();
        let rights = presses.iter().filter(|(_, r)| *r).count();
        prop_assert_eq!(wings.state().left, lefts % 2 == 1);
        prop_assert_eq!(wings.state().right, rights % 2 == 1);
    }

    #[test]
    fn one_edge_per_press(held in prop::collection::vec(any::<bool>(), 0..64)) {
        let mut edges = EdgeDetector::new();
        let mut seen = 0;
        for &down in &held {
            let buttons = if down { Buttons::UP } else { Buttons::empty() };
            if edges.update(buttons).contains(Buttons::UP) {
                seen += 1;
            }
        }
        let presses = held
            .iter()
            .scan(false, |previous, &down| {
                let press = down && !*previous;
                *previous = down;
                Some(press)
            })
            .filter(|p| *p)
            .count();
        prop_assert_eq!(seen, presses);
    }
}
