//! State enums shared between the control unit and its collaborators.
//!
//! All enums use `#[repr(u8)]` with a `from_u8` conversion so they can be
//! logged and compared cheaply.

use serde::{Deserialize, Serialize};

// ─── Competition Lifecycle ──────────────────────────────────────────

/// Competition phase the host is currently running.
///
/// `Setup` is entered once at power-on and never again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CompetitionPhase {
    /// Power-on; `initialize` has not completed.
    Setup = 0,
    /// Connected to field control, waiting for the match to start.
    PreMatch = 1,
    /// Autonomous period.
    Autonomous = 2,
    /// Driver-controlled period.
    OperatorControl = 3,
    /// Robot disabled by field control.
    Disabled = 4,
}

impl CompetitionPhase {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Setup),
            1 => Some(Self::PreMatch),
            2 => Some(Self::Autonomous),
            3 => Some(Self::OperatorControl),
            4 => Some(Self::Disabled),
            _ => None,
        }
    }

    /// Whether the host keeps calling into the control loop during this phase.
    #[inline]
    pub const fn is_looping(self) -> bool {
        matches!(self, Self::PreMatch | Self::OperatorControl)
    }
}

impl Default for CompetitionPhase {
    fn default() -> Self {
        Self::Setup
    }
}

impl std::fmt::Display for CompetitionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Setup => "setup",
            Self::PreMatch => "pre-match",
            Self::Autonomous => "autonomous",
            Self::OperatorControl => "operator-control",
            Self::Disabled => "disabled",
        };
        f.write_str(name)
    }
}

// ─── Autonomous Selector ────────────────────────────────────────────

/// Autonomous selector lifecycle.
///
/// `Locked` is terminal: once the match begins the choice can no longer move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SelectorState {
    /// Selector not yet shown.
    Idle = 0,
    /// Shown and accepting advance/retreat.
    Active = 1,
    /// Choice frozen for the rest of the match.
    Locked = 2,
}

impl SelectorState {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Idle),
            1 => Some(Self::Active),
            2 => Some(Self::Locked),
            _ => None,
        }
    }
}

impl Default for SelectorState {
    fn default() -> Self {
        Self::Idle
    }
}

// ─── Wings ──────────────────────────────────────────────────────────

/// One of the two pneumatic wings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum WingSide {
    Left = 0,
    Right = 1,
}

impl WingSide {
    /// Both sides, in the order simultaneous presses are processed.
    pub const BOTH: [Self; 2] = [Self::Left, Self::Right];

    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Left),
            1 => Some(Self::Right),
            _ => None,
        }
    }

    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Coupling rule between the two wings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum WingPolicy {
    /// At most one wing extended; extending one retracts the other.
    Exclusive = 0,
    /// Each wing toggles on its own.
    Independent = 1,
}

impl WingPolicy {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Exclusive),
            1 => Some(Self::Independent),
            _ => None,
        }
    }
}

impl Default for WingPolicy {
    fn default() -> Self {
        Self::Exclusive
    }
}

// ─── Drivetrain ─────────────────────────────────────────────────────

/// Motor behaviour when commanded to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum BrakeMode {
    /// Free-spin.
    Coast = 0,
    /// Short the windings.
    Brake = 1,
    /// Actively hold position.
    Hold = 2,
}

impl BrakeMode {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Coast),
            1 => Some(Self::Brake),
            2 => Some(Self::Hold),
            _ => None,
        }
    }
}

impl Default for BrakeMode {
    fn default() -> Self {
        Self::Coast
    }
}
