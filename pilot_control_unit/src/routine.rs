//! Autonomous routine dispatch.
//!
//! Routines are registered by catalog id. The frozen selector index picks a
//! catalog entry and the dispatcher runs whatever is registered for its id;
//! an entry with nothing registered is a logged no-op.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use pilot_common::hal::device::{Actuator, Pneumatic};
use pilot_common::robot::catalog::{RoutineEntry, RoutineIndex};
use tracing::{info, warn};

use crate::chassis::ChassisHandle;

/// Everything an autonomous routine may drive.
pub struct AutonContext<'a> {
    /// Selected catalog entry.
    pub entry: &'a RoutineEntry,
    pub index: RoutineIndex,
    pub chassis: &'a ChassisHandle,
    /// Mechanism actuators, in `[mechanism] actuators` order.
    pub mechanism: &'a mut [Box<dyn Actuator>],
    pub left_wing: &'a mut dyn Pneumatic,
    pub right_wing: &'a mut dyn Pneumatic,
    active: &'a AtomicBool,
}

impl<'a> AutonContext<'a> {
    pub fn new(
        entry: &'a RoutineEntry,
        index: RoutineIndex,
        chassis: &'a ChassisHandle,
        mechanism: &'a mut [Box<dyn Actuator>],
        left_wing: &'a mut dyn Pneumatic,
        right_wing: &'a mut dyn Pneumatic,
        active: &'a AtomicBool,
    ) -> Self {
        Self {
            entry,
            index,
            chassis,
            mechanism,
            left_wing,
            right_wing,
            active,
        }
    }

    /// False once the host has ended the autonomous period.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Sleep up to `duration`, returning early if the period ends.
    /// Returns whether the full duration elapsed.
    pub fn wait(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        while self.is_active() {
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            std::thread::sleep((deadline - now).min(Duration::from_millis(10)));
        }
        false
    }

    /// Set every mechanism actuator from `speeds`, in order.
    pub fn set_mechanism(&mut self, speeds: &[i8]) {
        for (actuator, &speed) in self.mechanism.iter_mut().zip(speeds) {
            actuator.set_speed(speed);
        }
    }
}

/// An autonomous routine.
pub trait AutonRoutine: Send {
    fn run(&mut self, ctx: &mut AutonContext<'_>);
}

impl<F> AutonRoutine for F
where
    F: FnMut(&mut AutonContext<'_>) + Send,
{
    fn run(&mut self, ctx: &mut AutonContext<'_>) {
        self(ctx)
    }
}

/// Drive at fixed power for a fixed time, then stop.
#[derive(Debug, Clone, Copy)]
pub struct DriveFor {
    pub left: i8,
    pub right: i8,
    pub duration: Duration,
}

impl AutonRoutine for DriveFor {
    fn run(&mut self, ctx: &mut AutonContext<'_>) {
        ctx.chassis.drive(self.left, self.right);
        ctx.wait(self.duration);
        ctx.chassis.stop();
    }
}

/// What [`RoutineDispatcher::dispatch`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The registered routine ran to completion.
    Ran,
    /// No routine registered for the selected id.
    Unassigned,
}

#[derive(Default)]
pub struct RoutineDispatcher {
    routines: HashMap<String, Box<dyn AutonRoutine>>,
}

impl RoutineDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `routine` under catalog id `id`.
    ///
    /// # Panics
    ///
    /// Panics if a routine is already registered under `id`.
    pub fn register(&mut self, id: impl Into<String>, routine: impl AutonRoutine + 'static) {
        let id = id.into();
        if self.routines.contains_key(&id) {
            panic!("Routine '{id}' already registered");
        }
        self.routines.insert(id, Box::new(routine));
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.routines.contains_key(id)
    }

    /// Registered ids (sorted).
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.routines.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Run the routine registered for `ctx.entry`.
    pub fn dispatch(&mut self, ctx: &mut AutonContext<'_>) -> DispatchOutcome {
        let Some(routine) = self.routines.get_mut(&ctx.entry.id) else {
            warn!(
                index = %ctx.index,
                routine = %ctx.entry.id,
                "No autonomous routine assigned"
            );
            return DispatchOutcome::Unassigned;
        };
        info!(index = %ctx.index, routine = %ctx.entry.id, label = %ctx.entry.label, "Running autonomous routine");
        let started = Instant::now();
        routine.run(ctx);
        info!(
            routine = %ctx.entry.id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Autonomous routine finished"
        );
        DispatchOutcome::Ran
    }
}

impl std::fmt::Debug for RoutineDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutineDispatcher")
            .field("routines", &self.ids())
            .finish()
    }
}
