//! Competition phase machine.
//!
//! Setup is the power-on phase and is never re-entered. PreMatch is only
//! reachable from Setup or Disabled (field control connects before a match
//! and after a disable). Autonomous, OperatorControl and Disabled may follow
//! any other phase, which covers skills runs and practice sessions where
//! the host skips pre-match.

use pilot_common::robot::state::CompetitionPhase;

/// Result of a phase transition attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionResult {
    /// Transition succeeded; new phase.
    Ok(CompetitionPhase),
    /// Transition rejected; reason.
    Rejected(&'static str),
}

#[derive(Debug, Clone, Default)]
pub struct PhaseMachine {
    phase: CompetitionPhase,
    transitions: u32,
}

impl PhaseMachine {
    pub const fn new() -> Self {
        Self {
            phase: CompetitionPhase::Setup,
            transitions: 0,
        }
    }

    #[inline]
    pub const fn phase(&self) -> CompetitionPhase {
        self.phase
    }

    /// Number of accepted transitions since power-on.
    #[inline]
    pub const fn transitions(&self) -> u32 {
        self.transitions
    }

    /// Attempt to enter `to`.
    pub fn enter(&mut self, to: CompetitionPhase) -> TransitionResult {
        use CompetitionPhase::*;

        let allowed = match (self.phase, to) {
            (_, Setup) => false,
            (from, to) if from == to => false,
            (Setup | Disabled, PreMatch) => true,
            (_, PreMatch) => false,
            (_, Autonomous | OperatorControl | Disabled) => true,
        };

        if !allowed {
            return TransitionResult::Rejected(invalid_transition_reason(self.phase, to));
        }
        self.phase = to;
        self.transitions += 1;
        TransitionResult::Ok(to)
    }
}

fn invalid_transition_reason(from: CompetitionPhase, to: CompetitionPhase) -> &'static str {
    use CompetitionPhase::*;
    match (from, to) {
        (_, Setup) => "Setup is only entered at power-on",
        (from, to) if from == to => "already in requested phase",
        (_, PreMatch) => "PreMatch only follows Setup or Disabled",
        _ => "invalid phase transition",
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use CompetitionPhase::*;

    #[test]
    fn starts_in_setup() {
        let pm = PhaseMachine::new();
        assert_eq!(pm.phase(), Setup);
        assert_eq!(pm.transitions(), 0);
    }

    #[test]
    fn full_match_sequence() {
        let mut pm = PhaseMachine::new();
        for phase in [PreMatch, Autonomous, Disabled, OperatorControl, Disabled] {
            assert_eq!(pm.enter(phase), TransitionResult::Ok(phase));
        }
        assert_eq!(pm.transitions(), 5);
    }

    #[test]
    fn setup_never_reentered() {
        let mut pm = PhaseMachine::new();
        assert!(matches!(pm.enter(Setup), TransitionResult::Rejected(_)));
        pm.enter(Disabled);
        assert_eq!(
            pm.enter(Setup),
            TransitionResult::Rejected("Setup is only entered at power-on")
        );
    }

    #[test]
    fn pre_match_only_from_setup_or_disabled() {
        let mut pm = PhaseMachine::new();
        pm.enter(OperatorControl);
        assert!(matches!(pm.enter(PreMatch), TransitionResult::Rejected(_)));
        pm.enter(Disabled);
        assert_eq!(pm.enter(PreMatch), TransitionResult::Ok(PreMatch));
    }

    #[test]
    fn same_phase_rejected() {
        let mut pm = PhaseMachine::new();
        pm.enter(Autonomous);
        assert!(matches!(pm.enter(Autonomous), TransitionResult::Rejected(_)));
        assert_eq!(pm.transitions(), 1);
    }

    #[test]
    fn skills_run_skips_pre_match() {
        let mut pm = PhaseMachine::new();
        assert_eq!(pm.enter(Autonomous), TransitionResult::Ok(Autonomous));
        assert_eq!(pm.enter(OperatorControl), TransitionResult::Ok(OperatorControl));
    }
}
