//! Mechanism arbitration.
//!
//! Several buttons may be held at once, but the mechanism obeys exactly one
//! action per cycle. Candidates are checked in fixed priority order and the
//! first held binding wins:
//!
//! | Priority | Action     | Default button |
//! |----------|------------|----------------|
//! | 1        | `Intake`   | R1             |
//! | 2        | `Outtake`  | R2             |
//! | 3        | `MidGoal`  | L1             |
//! | 4        | `Redirect` | L2             |
//! | -        | `Idle`     | (nothing held) |
//!
//! Every actuator is written every cycle, including zeros for `Idle`, so a
//! released button always stops the mechanism on the next cycle.

use heapless::Vec;
use pilot_common::config::ConfigError;
use pilot_common::consts::MAX_MECHANISM_ACTUATORS;
use pilot_common::hal::device::Actuator;
use pilot_common::robot::config::{BindingsConfig, MechanismConfig};
use pilot_common::robot::input::{Buttons, InputSnapshot};
use pilot_common::robot::mechanism::{ActionKind, MechanismAction};
use tracing::debug;

/// One priority slot: a binding and the action it selects.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Slot {
    button: Buttons,
    action: MechanismAction,
}

/// Maps held buttons to the single mechanism action for this cycle.
#[derive(Debug, Clone)]
pub struct MechanismArbitrator {
    /// Highest priority first.
    slots: Vec<Slot, 4>,
    idle: MechanismAction,
    current: ActionKind,
}

impl MechanismArbitrator {
    /// Build from the speed table and button bindings.
    ///
    /// # Errors
    ///
    /// `ConfigError::ValidationError` if a speed table does not fit the
    /// actuator group.
    pub fn new(
        mechanism: &MechanismConfig,
        bindings: &BindingsConfig,
    ) -> Result<Self, ConfigError> {
        let count = mechanism.actuators.len();
        if count > MAX_MECHANISM_ACTUATORS {
            return Err(ConfigError::ValidationError(format!(
                "mechanism has {count} actuators (max {MAX_MECHANISM_ACTUATORS})"
            )));
        }
        let idle = MechanismAction::idle(count).ok_or_else(|| {
            ConfigError::ValidationError(format!("cannot build idle action for {count} actuators"))
        })?;

        let mut slots = Vec::new();
        for (kind, button) in bindings.priority_slots() {
            let speeds = mechanism.speeds(kind).unwrap_or_default();
            if speeds.len() != count {
                return Err(ConfigError::ValidationError(format!(
                    "mechanism {kind:?} speed table has {} entries for {count} actuators",
                    speeds.len()
                )));
            }
            let action = MechanismAction::new(kind, speeds).ok_or_else(|| {
                ConfigError::ValidationError(format!("mechanism {kind:?} speed table too long"))
            })?;
            // Capacity matches the four priority slots.
            let _ = slots.push(Slot {
                button: button.flag(),
                action,
            });
        }

        Ok(Self {
            slots,
            idle,
            current: ActionKind::Idle,
        })
    }

    /// Resolve the action for `input`. Pure: the same snapshot always
    /// yields the same action.
    pub fn arbitrate(&self, input: &InputSnapshot) -> &MechanismAction {
        self.slots
            .iter()
            .find(|slot| input.buttons.contains(slot.button))
            .map_or(&self.idle, |slot| &slot.action)
    }

    /// Action table entry for `kind`.
    pub fn action(&self, kind: ActionKind) -> &MechanismAction {
        self.slots
            .iter()
            .map(|slot| &slot.action)
            .find(|action| action.kind() == kind)
            .unwrap_or(&self.idle)
    }

    /// Arbitrate `input` and write the result to every actuator.
    pub fn cycle(&mut self, input: &InputSnapshot, actuators: &mut [Box<dyn Actuator>]) -> ActionKind {
        let kind = self.arbitrate(input).kind();
        if kind != self.current {
            debug!(from = ?self.current, to = ?kind, "Mechanism action changed");
            self.current = kind;
        }
        self.apply(actuators);
        kind
    }

    /// Write the current action's speeds to `actuators`, in table order.
    pub fn apply(&self, actuators: &mut [Box<dyn Actuator>]) {
        let speeds = self.action(self.current).speeds();
        for (actuator, &speed) in actuators.iter_mut().zip(speeds) {
            actuator.set_speed(speed);
        }
    }

    /// Action kind written on the last cycle.
    #[inline]
    pub const fn current(&self) -> ActionKind {
        self.current
    }

    /// Return to `Idle` and stop every actuator.
    pub fn reset(&mut self, actuators: &mut [Box<dyn Actuator>]) {
        self.current = ActionKind::Idle;
        self.apply(actuators);
    }
}
