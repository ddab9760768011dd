//! Prelude module for common re-exports.
//!
//! Consumers can do `use pilot_common::prelude::*;` and get the most
//! important types without listing individual paths.

use std::time::Duration;

// ─── Logging ────────────────────────────────────────────────────────
pub use crate::config::LogLevel;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, SharedConfig};
pub use crate::robot::config::{RobotConfig, ScriptFrame};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{LOOP_PERIOD_MS, MAX_MECHANISM_ACTUATORS, MAX_ROUTINES};

// ─── Robot State ────────────────────────────────────────────────────
pub use crate::robot::catalog::{RoutineCatalog, RoutineEntry, RoutineIndex};
pub use crate::robot::input::{AnalogAxis, Buttons, ControllerButton, InputSnapshot};
pub use crate::robot::mechanism::{ActionKind, MechanismAction};
pub use crate::robot::pose::Pose;
pub use crate::robot::state::{BrakeMode, CompetitionPhase, SelectorState, WingPolicy, WingSide};

// ─── Collaborators ──────────────────────────────────────────────────
pub use crate::hal::device::{Actuator, InputSource, MotionControl, Pneumatic, PoseSource};
pub use crate::hal::display::{
    Align, ClickCallback, DisplaySurface, ElementId, ElementKind, LabelText, Placement, fit_fmt,
    fit_text,
};
pub use crate::hal::error::{DisplayError, HalError};

/// Default control-loop period as Duration.
pub const DEFAULT_LOOP_PERIOD: Duration = Duration::from_millis(LOOP_PERIOD_MS);
