//! Declarative robot configuration loaded from `robot.toml`.
//!
//! Every section is optional; omitted sections fall back to the reference
//! robot (`RobotConfig::default()`).
//!
//! # TOML Example
//!
//! ```toml
//! [timing]
//! loop_period_ms = 20
//!
//! [mechanism]
//! actuators = ["intake", "lift"]
//! intake   = [100, 100]
//! outtake  = [-100, -100]
//! mid_goal = [100, -60]
//! redirect = [0, 100]
//!
//! [ports]
//! mechanism = [{ port = 10 }, { port = 11, reversed = true }]
//!
//! [wings]
//! policy = "independent"
//!
//! [[routines]]
//! id = "skills"
//! label = "Skills"
//! ```

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, SharedConfig};
use crate::consts::{
    ADI_PORT_MAX, ADI_PORT_MIN, DISPLAY_PUMP_MS, LOOP_PERIOD_MS, LOOP_PERIOD_MS_MAX,
    LOOP_PERIOD_MS_MIN, MAX_MECHANISM_ACTUATORS, PERCENT_MAX, SMART_PORT_MAX, SMART_PORT_MIN,
    TELEMETRY_INTERVAL_MS, TELEMETRY_INTERVAL_MS_MAX, TELEMETRY_INTERVAL_MS_MIN,
};
use crate::robot::catalog::{RoutineCatalog, RoutineEntry};
use crate::robot::input::{Buttons, ControllerButton};
use crate::robot::mechanism::ActionKind;
use crate::robot::state::{BrakeMode, WingPolicy};

fn validation(msg: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(msg.into())
}

// ─── Root ───────────────────────────────────────────────────────────

/// Complete robot configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    pub shared: SharedConfig,
    pub timing: TimingConfig,
    pub ports: PortsConfig,
    pub drive: DriveConfig,
    pub mechanism: MechanismConfig,
    pub bindings: BindingsConfig,
    pub wings: WingsConfig,
    pub routines: Vec<RoutineEntry>,
    pub simulation: SimulationConfig,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            shared: SharedConfig::default(),
            timing: TimingConfig::default(),
            ports: PortsConfig::default(),
            drive: DriveConfig::default(),
            mechanism: MechanismConfig::default(),
            bindings: BindingsConfig::default(),
            wings: WingsConfig::default(),
            routines: default_routines(),
            simulation: SimulationConfig::default(),
        }
    }
}

impl RobotConfig {
    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.timing.validate()?;
        self.drive.validate()?;
        self.mechanism.validate()?;
        self.ports.validate(self.mechanism.actuators.len())?;
        self.bindings.validate()?;
        self.simulation.validate()?;
        self.catalog()?;
        Ok(())
    }

    /// Build the routine catalog from `[[routines]]`.
    pub fn catalog(&self) -> Result<RoutineCatalog, ConfigError> {
        RoutineCatalog::new(self.routines.clone()).map_err(|e| validation(e.to_string()))
    }
}

fn default_routines() -> Vec<RoutineEntry> {
    [
        ("red_top", "Red, top"),
        ("red_bottom", "Red, bottom"),
        ("blue_top", "Blue, top"),
        ("blue_bottom", "Blue, bottom"),
        ("red", "Red"),
        ("blue", "Blue"),
    ]
    .into_iter()
    .map(|(id, label)| RoutineEntry::new(id, label))
    .collect()
}

// ─── Timing ─────────────────────────────────────────────────────────

/// Loop periods, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Pre-match and operator-control loop period.
    pub loop_period_ms: u64,
    /// Telemetry refresh interval.
    pub telemetry_interval_ms: u64,
    /// Display service event-pump interval.
    pub display_pump_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            loop_period_ms: LOOP_PERIOD_MS,
            telemetry_interval_ms: TELEMETRY_INTERVAL_MS,
            display_pump_ms: DISPLAY_PUMP_MS,
        }
    }
}

impl TimingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(LOOP_PERIOD_MS_MIN..=LOOP_PERIOD_MS_MAX).contains(&self.loop_period_ms) {
            return Err(validation(format!(
                "timing.loop_period_ms {} outside [{LOOP_PERIOD_MS_MIN}, {LOOP_PERIOD_MS_MAX}]",
                self.loop_period_ms
            )));
        }
        if !(TELEMETRY_INTERVAL_MS_MIN..=TELEMETRY_INTERVAL_MS_MAX)
            .contains(&self.telemetry_interval_ms)
        {
            return Err(validation(format!(
                "timing.telemetry_interval_ms {} outside [{TELEMETRY_INTERVAL_MS_MIN}, {TELEMETRY_INTERVAL_MS_MAX}]",
                self.telemetry_interval_ms
            )));
        }
        if !(1..=LOOP_PERIOD_MS_MAX).contains(&self.display_pump_ms) {
            return Err(validation(format!(
                "timing.display_pump_ms {} outside [1, {LOOP_PERIOD_MS_MAX}]",
                self.display_pump_ms
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn loop_period(&self) -> Duration {
        Duration::from_millis(self.loop_period_ms)
    }

    #[inline]
    pub fn telemetry_interval(&self) -> Duration {
        Duration::from_millis(self.telemetry_interval_ms)
    }

    #[inline]
    pub fn display_pump(&self) -> Duration {
        Duration::from_millis(self.display_pump_ms)
    }
}

// ─── Ports ──────────────────────────────────────────────────────────

/// A smart-port motor, optionally reversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotorPort {
    pub port: u8,
    #[serde(default)]
    pub reversed: bool,
}

impl MotorPort {
    pub const fn new(port: u8, reversed: bool) -> Self {
        Self { port, reversed }
    }
}

/// Static wiring data. Range-checked, not interpreted by the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortsConfig {
    pub left_drive: Vec<MotorPort>,
    pub right_drive: Vec<MotorPort>,
    pub imu: u8,
    pub horizontal_encoder: u8,
    pub vertical_encoder: u8,
    /// One port per mechanism actuator, in `[mechanism] actuators` order.
    pub mechanism: Vec<MotorPort>,
    /// Three-wire port of the left wing piston.
    pub left_wing: u8,
    /// Three-wire port of the right wing piston.
    pub right_wing: u8,
}

impl Default for PortsConfig {
    fn default() -> Self {
        Self {
            left_drive: vec![
                MotorPort::new(1, true),
                MotorPort::new(2, true),
                MotorPort::new(3, true),
            ],
            right_drive: vec![
                MotorPort::new(4, false),
                MotorPort::new(5, false),
                MotorPort::new(6, false),
            ],
            imu: 7,
            horizontal_encoder: 8,
            vertical_encoder: 9,
            mechanism: (10..=13).map(|p| MotorPort::new(p, false)).collect(),
            left_wing: 1,
            right_wing: 2,
        }
    }
}

impl PortsConfig {
    /// Validate ranges and uniqueness.
    ///
    /// # Validation Rules
    /// 1. Every smart port in `[1, 21]` and used at most once
    /// 2. Both wing ports in `[1, 8]` and distinct
    /// 3. One mechanism port per actuator
    /// 4. Both drive sides non-empty
    pub fn validate(&self, actuator_count: usize) -> Result<(), ConfigError> {
        if self.left_drive.is_empty() || self.right_drive.is_empty() {
            return Err(validation("ports: both drive sides need at least one motor"));
        }
        if self.mechanism.len() != actuator_count {
            return Err(validation(format!(
                "ports.mechanism has {} ports for {} actuators",
                self.mechanism.len(),
                actuator_count
            )));
        }

        let motors = self
            .left_drive
            .iter()
            .chain(&self.right_drive)
            .chain(&self.mechanism)
            .map(|m| m.port);
        let sensors = [self.imu, self.horizontal_encoder, self.vertical_encoder];

        let mut used = HashSet::new();
        for port in motors.chain(sensors) {
            if !(SMART_PORT_MIN..=SMART_PORT_MAX).contains(&port) {
                return Err(validation(format!(
                    "ports: smart port {port} outside [{SMART_PORT_MIN}, {SMART_PORT_MAX}]"
                )));
            }
            if !used.insert(port) {
                return Err(validation(format!("ports: smart port {port} used twice")));
            }
        }

        for port in [self.left_wing, self.right_wing] {
            if !(ADI_PORT_MIN..=ADI_PORT_MAX).contains(&port) {
                return Err(validation(format!(
                    "ports: wing port {port} outside [{ADI_PORT_MIN}, {ADI_PORT_MAX}]"
                )));
            }
        }
        if self.left_wing == self.right_wing {
            return Err(validation(format!(
                "ports: both wings on three-wire port {}",
                self.left_wing
            )));
        }
        Ok(())
    }
}

// ─── Drive ──────────────────────────────────────────────────────────

/// Tank-drive stick shaping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    /// Stick magnitude at or below which output is zero.
    pub deadband: u8,
    /// Smallest non-zero output magnitude.
    pub min_output: u8,
    /// Exponential curve gain; 1.0 is linear.
    pub curve_gain: f64,
    pub brake_mode: BrakeMode,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            deadband: 3,
            min_output: 10,
            curve_gain: 1.019,
            brake_mode: BrakeMode::Coast,
        }
    }
}

impl DriveConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let max = PERCENT_MAX as u8;
        if self.deadband >= max {
            return Err(validation(format!(
                "drive.deadband {} must be below {max}",
                self.deadband
            )));
        }
        if self.min_output > max {
            return Err(validation(format!(
                "drive.min_output {} exceeds {max}",
                self.min_output
            )));
        }
        if !self.curve_gain.is_finite() || self.curve_gain <= 0.0 {
            return Err(validation(format!(
                "drive.curve_gain {} must be finite and > 0",
                self.curve_gain
            )));
        }
        Ok(())
    }
}

// ─── Mechanism ──────────────────────────────────────────────────────

/// Mechanism actuator group and its per-action speed table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MechanismConfig {
    /// Actuator names, in command order.
    pub actuators: Vec<String>,
    pub intake: Vec<i8>,
    pub outtake: Vec<i8>,
    pub mid_goal: Vec<i8>,
    pub redirect: Vec<i8>,
}

impl Default for MechanismConfig {
    fn default() -> Self {
        Self {
            actuators: ["intake", "lift", "high", "low"]
                .into_iter()
                .map(String::from)
                .collect(),
            intake: vec![100, 100, 0, 100],
            outtake: vec![-100, -100, 0, -100],
            mid_goal: vec![100, 100, -100, 100],
            redirect: vec![100, 100, 100, 0],
        }
    }
}

impl MechanismConfig {
    /// Speed table for `kind`; `None` for `Idle`, which is always all-zero.
    pub fn speeds(&self, kind: ActionKind) -> Option<&[i8]> {
        match kind {
            ActionKind::Idle => None,
            ActionKind::Intake => Some(&self.intake),
            ActionKind::Outtake => Some(&self.outtake),
            ActionKind::MidGoal => Some(&self.mid_goal),
            ActionKind::Redirect => Some(&self.redirect),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let count = self.actuators.len();
        if count == 0 || count > MAX_MECHANISM_ACTUATORS {
            return Err(validation(format!(
                "mechanism.actuators has {count} entries (expected 1..={MAX_MECHANISM_ACTUATORS})"
            )));
        }
        let mut names = HashSet::new();
        for name in &self.actuators {
            if name.trim().is_empty() {
                return Err(validation("mechanism.actuators contains an empty name"));
            }
            if !names.insert(name.as_str()) {
                return Err(validation(format!("duplicate mechanism actuator '{name}'")));
            }
        }

        for kind in ActionKind::PRIORITY {
            let Some(table) = self.speeds(kind) else {
                continue;
            };
            if table.len() != count {
                return Err(validation(format!(
                    "mechanism {kind:?} speed table has {} entries for {count} actuators",
                    table.len()
                )));
            }
            if let Some(bad) = table.iter().find(|s| !(-PERCENT_MAX..=PERCENT_MAX).contains(*s)) {
                return Err(validation(format!(
                    "mechanism {kind:?} speed {bad} outside [-{PERCENT_MAX}, {PERCENT_MAX}]"
                )));
            }
        }
        Ok(())
    }
}

// ─── Bindings ───────────────────────────────────────────────────────

/// Controller button assignments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindingsConfig {
    pub intake: ControllerButton,
    pub outtake: ControllerButton,
    pub mid_goal: ControllerButton,
    pub redirect: ControllerButton,
    pub left_wing: ControllerButton,
    pub right_wing: ControllerButton,
    pub selector_advance: ControllerButton,
    pub selector_retreat: ControllerButton,
}

impl Default for BindingsConfig {
    fn default() -> Self {
        Self {
            intake: ControllerButton::R1,
            outtake: ControllerButton::R2,
            mid_goal: ControllerButton::L1,
            redirect: ControllerButton::L2,
            left_wing: ControllerButton::Left,
            right_wing: ControllerButton::Right,
            selector_advance: ControllerButton::Up,
            selector_retreat: ControllerButton::Down,
        }
    }
}

impl BindingsConfig {
    /// Arbitration slots, highest priority first.
    pub fn priority_slots(&self) -> [(ActionKind, ControllerButton); 4] {
        [
            (ActionKind::Intake, self.intake),
            (ActionKind::Outtake, self.outtake),
            (ActionKind::MidGoal, self.mid_goal),
            (ActionKind::Redirect, self.redirect),
        ]
    }

    /// Validate binding overlaps.
    ///
    /// Operator-control buttons (priority slots and wings) must be pairwise
    /// distinct. Selector buttons only need to differ from each other since
    /// the selector and operator control never run in the same phase.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = Buttons::empty();
        let operator = self
            .priority_slots()
            .into_iter()
            .map(|(kind, button)| (format!("{kind:?}"), button))
            .chain([
                ("left_wing".to_string(), self.left_wing),
                ("right_wing".to_string(), self.right_wing),
            ]);
        for (name, button) in operator {
            if seen.contains(button.flag()) {
                return Err(validation(format!(
                    "bindings: {button:?} bound twice (again for {name})"
                )));
            }
            seen |= button.flag();
        }
        if self.selector_advance == self.selector_retreat {
            return Err(validation(format!(
                "bindings: selector advance and retreat share {:?}",
                self.selector_advance
            )));
        }
        Ok(())
    }
}

// ─── Wings ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WingsConfig {
    pub policy: WingPolicy,
}

// ─── Simulation ─────────────────────────────────────────────────────

/// Input held for a number of control cycles by the scripted controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptFrame {
    /// How many `refresh` calls this frame lasts.
    #[serde(default = "default_frame_cycles")]
    pub cycles: u32,
    #[serde(default)]
    pub buttons: Vec<ControllerButton>,
    #[serde(default)]
    pub left_y: i8,
    #[serde(default)]
    pub right_y: i8,
}

fn default_frame_cycles() -> u32 {
    1
}

impl ScriptFrame {
    /// Frame holding `buttons` for `cycles` cycles with centred sticks.
    pub fn hold(cycles: u32, buttons: &[ControllerButton]) -> Self {
        Self {
            cycles,
            buttons: buttons.to_vec(),
            left_y: 0,
            right_y: 0,
        }
    }

    /// Button set for this frame.
    pub fn button_set(&self) -> Buttons {
        self.buttons
            .iter()
            .fold(Buttons::empty(), |acc, b| acc | b.flag())
    }
}

/// Settings for the `simulation` backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SimulationConfig {
    /// Controller input script, played once from the first refresh.
    /// After the last frame the controller reports no input.
    pub script: Vec<ScriptFrame>,
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (i, frame) in self.script.iter().enumerate() {
            if frame.cycles == 0 {
                return Err(validation(format!(
                    "simulation.script[{i}].cycles must be at least 1"
                )));
            }
            for axis in [frame.left_y, frame.right_y] {
                if !(-PERCENT_MAX..=PERCENT_MAX).contains(&axis) {
                    return Err(validation(format!(
                        "simulation.script[{i}] axis {axis} outside [-{PERCENT_MAX}, {PERCENT_MAX}]"
                    )));
                }
            }
        }
        Ok(())
    }
}
