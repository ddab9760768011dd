//! Autonomous selector state machine.
//!
//! Idle → Active when pre-match begins; Active cycles a 1-indexed routine
//! index; Idle/Active → Locked exactly once when autonomous begins. Locked
//! is terminal and freezes the index for the rest of the run.

use pilot_common::robot::catalog::RoutineIndex;
use pilot_common::robot::state::SelectorState;

/// Result of a selector transition attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionResult {
    /// Transition succeeded; state and index afterwards.
    Ok(SelectorState, RoutineIndex),
    /// Transition rejected; reason.
    Rejected(&'static str),
}

/// Events the selector reacts to. Advance/retreat must already be
/// edge-filtered: one event per physical press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorEvent {
    /// Pre-match began; selector UI is up.
    Show,
    /// Move to the next routine, wrapping to the first.
    Advance,
    /// Move to the previous routine, wrapping to the last.
    Retreat,
    /// Autonomous began; freeze the choice.
    Lock,
}

/// Selector state plus the routine index it guards.
#[derive(Debug, Clone)]
pub struct SelectorStateMachine {
    state: SelectorState,
    index: RoutineIndex,
    catalog_size: u8,
}

impl SelectorStateMachine {
    /// New selector in `Idle` at index 1.
    ///
    /// # Panics
    ///
    /// Panics if `catalog_size` is zero.
    pub fn new(catalog_size: u8) -> Self {
        assert!(catalog_size >= 1, "selector needs at least one routine");
        Self {
            state: SelectorState::Idle,
            index: RoutineIndex::FIRST,
            catalog_size,
        }
    }

    #[inline]
    pub const fn state(&self) -> SelectorState {
        self.state
    }

    #[inline]
    pub const fn index(&self) -> RoutineIndex {
        self.index
    }

    #[inline]
    pub const fn catalog_size(&self) -> u8 {
        self.catalog_size
    }

    #[inline]
    pub const fn is_locked(&self) -> bool {
        matches!(self.state, SelectorState::Locked)
    }

    /// Attempt a transition given an event.
    pub fn handle_event(&mut self, event: SelectorEvent) -> TransitionResult {
        use SelectorEvent::*;
        use SelectorState::*;

        let (next, index) = match (self.state, event) {
            (Idle, Show) => (Active, self.index),
            (Active, Advance) => (Active, self.index.next(self.catalog_size)),
            (Active, Retreat) => (Active, self.index.prev(self.catalog_size)),
            (Idle | Active, Lock) => (Locked, self.index),
            _ => {
                return TransitionResult::Rejected(invalid_transition_reason(self.state, event));
            }
        };

        self.state = next;
        self.index = index;
        TransitionResult::Ok(next, index)
    }
}

fn invalid_transition_reason(state: SelectorState, event: SelectorEvent) -> &'static str {
    use SelectorEvent::*;
    use SelectorState::*;
    match (state, event) {
        (Locked, _) => "Locked: selection is frozen",
        (Active, Show) => "Active: selector already shown",
        (Idle, _) => "Idle: only Show or Lock allowed",
        (Active, _) => "Active: invalid event for current state",
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
