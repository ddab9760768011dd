//! Mechanism actions: the single command the arbitrator emits per cycle.

use heapless::Vec;
use serde::{Deserialize, Serialize};

use crate::consts::MAX_MECHANISM_ACTUATORS;

/// Per-actuator speed command, one signed percentage per actuator.
pub type ActuatorSpeeds = Vec<i8, MAX_MECHANISM_ACTUATORS>;

/// Discriminant of a [`MechanismAction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ActionKind {
    /// Mechanism stopped (all zero).
    Idle = 0,
    Intake = 1,
    Outtake = 2,
    /// Score into the middle goal.
    MidGoal = 3,
    /// Route game pieces to the alternate exit.
    Redirect = 4,
}

impl ActionKind {
    /// Non-idle kinds, in arbitration priority order.
    pub const PRIORITY: [Self; 4] = [Self::Intake, Self::Outtake, Self::MidGoal, Self::Redirect];

    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Idle),
            1 => Some(Self::Intake),
            2 => Some(Self::Outtake),
            3 => Some(Self::MidGoal),
            4 => Some(Self::Redirect),
            _ => None,
        }
    }
}

impl Default for ActionKind {
    fn default() -> Self {
        Self::Idle
    }
}

/// The mechanism command for one cycle.
///
/// Exactly one action is active per cycle; when no input condition matches
/// the arbitrator falls back to `Idle`, whose speeds are all zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MechanismAction {
    Intake(ActuatorSpeeds),
    Outtake(ActuatorSpeeds),
    MidGoal(ActuatorSpeeds),
    Redirect(ActuatorSpeeds),
    Idle(ActuatorSpeeds),
}

impl MechanismAction {
    /// Build an action of the given kind from a speed table.
    ///
    /// `Idle` ignores `speeds` apart from its length and is always all-zero.
    /// Returns `None` if `speeds` exceeds [`MAX_MECHANISM_ACTUATORS`].
    pub fn new(kind: ActionKind, speeds: &[i8]) -> Option<Self> {
        let variant: fn(ActuatorSpeeds) -> Self = match kind {
            ActionKind::Idle => return Self::idle(speeds.len()),
            ActionKind::Intake => Self::Intake,
            ActionKind::Outtake => Self::Outtake,
            ActionKind::MidGoal => Self::MidGoal,
            ActionKind::Redirect => Self::Redirect,
        };
        ActuatorSpeeds::from_slice(speeds).ok().map(variant)
    }

    /// All-zero action for `actuator_count` actuators.
    pub fn idle(actuator_count: usize) -> Option<Self> {
        let mut speeds = ActuatorSpeeds::new();
        for _ in 0..actuator_count {
            speeds.push(0).ok()?;
        }
        Some(Self::Idle(speeds))
    }

    #[inline]
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::Intake(_) => ActionKind::Intake,
            Self::Outtake(_) => ActionKind::Outtake,
            Self::MidGoal(_) => ActionKind::MidGoal,
            Self::Redirect(_) => ActionKind::Redirect,
            Self::Idle(_) => ActionKind::Idle,
        }
    }

    /// Speed command per actuator, in mechanism order.
    pub fn speeds(&self) -> &[i8] {
        match self {
            Self::Intake(s)
            | Self::Outtake(s)
            | Self::MidGoal(s)
            | Self::Redirect(s)
            | Self::Idle(s) => s.as_slice(),
        }
    }

    #[inline]
    pub const fn is_idle(&self) -> bool {
        matches!(self, Self::Idle(_))
    }
}
