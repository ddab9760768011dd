//! Robot context and the five lifecycle entry points.
//!
//! [`RobotContext`] owns every device and every piece of control state; the
//! host runtime calls its entry points in competition order:
//!
//! | Entry point                | Phase           | Blocks while flag set |
//! |----------------------------|-----------------|-----------------------|
//! | `initialize`               | Setup           | no                    |
//! | `competition_initialize`   | PreMatch        | yes                   |
//! | `autonomous`               | Autonomous      | until routine returns |
//! | `operator_control`         | OperatorControl | yes                   |
//! | `disabled`                 | Disabled        | no                    |
//!
//! The host owns the phase flag ([`RobotContext::phase_flag`]): it sets the
//! flag before calling a looping entry point and clears it to end the phase.
//! Every accepted phase transition first returns wings, mechanism and drive
//! to neutral.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use pilot_common::hal::device::{Actuator, InputSource, Pneumatic};
use pilot_common::hal::display::DisplaySurface;
use pilot_common::robot::catalog::RoutineIndex;
use pilot_common::robot::mechanism::ActionKind;
use pilot_common::robot::state::CompetitionPhase;
use pilot_hal::Backend;
use static_assertions::assert_impl_all;
use tracing::{debug, info, trace, warn};

use crate::chassis::ChassisHandle;
use crate::command::arbitration::MechanismArbitrator;
use crate::command::edge::EdgeDetector;
use crate::command::wings::{WingController, WingState};
use crate::config::LoadedConfig;
use crate::cycle::{CycleStats, Pacer};
use crate::display::{DisplayHandle, DisplayService, service};
use crate::drive::{DriveCurve, TankDrive};
use crate::error::LifecycleError;
use crate::routine::{AutonContext, AutonRoutine, DispatchOutcome, RoutineDispatcher};
use crate::selector::Selector;
use crate::state::phase::{PhaseMachine, TransitionResult};
use crate::telemetry::{self, TelemetryLabels, TelemetryLoop};

/// Result of one operator-control cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorCycle {
    pub action: ActionKind,
    pub wings: WingState,
    /// `(left, right)` drive power after the stick curve.
    pub drive: (i8, i8),
}

/// Result of the autonomous entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutonReport {
    /// Frozen selector index.
    pub index: RoutineIndex,
    /// Catalog id at that index.
    pub routine: String,
    pub outcome: DispatchOutcome,
}

/// Threads started by `initialize`.
struct Runtime {
    display: DisplayService,
    telemetry: Option<JoinHandle<u64>>,
    labels: TelemetryLabels,
}

pub struct RobotContext {
    config: LoadedConfig,
    driver: &'static str,
    chassis: ChassisHandle,
    mechanism: Vec<Box<dyn Actuator>>,
    left_wing: Box<dyn Pneumatic>,
    right_wing: Box<dyn Pneumatic>,
    controller: Box<dyn InputSource>,
    /// Handed to the display service by `initialize`.
    surface: Option<Box<dyn DisplaySurface>>,
    runtime: Option<Runtime>,
    phases: PhaseMachine,
    edges: EdgeDetector,
    arbitrator: MechanismArbitrator,
    wings: WingController,
    tank: TankDrive,
    selector: Selector,
    routines: RoutineDispatcher,
    active: Arc<AtomicBool>,
}

// The host may run the lifecycle on a thread of its choosing.
assert_impl_all!(RobotContext: Send);

impl RobotContext {
    /// Take ownership of `backend` and build the control state from `config`.
    pub fn new(config: LoadedConfig, backend: Backend) -> Result<Self, LifecycleError> {
        let robot = &config.robot;
        let arbitrator = MechanismArbitrator::new(&robot.mechanism, &robot.bindings)?;
        let wings = WingController::new(
            robot.wings.policy,
            robot.bindings.left_wing,
            robot.bindings.right_wing,
        );
        let tank = TankDrive::new(DriveCurve::from_config(&robot.drive));
        let selector = Selector::new(config.catalog.clone(), &robot.bindings);

        debug!(
            driver = backend.driver,
            actuators = backend.mechanism.len(),
            policy = ?robot.wings.policy,
            "Robot context created"
        );

        Ok(Self {
            driver: backend.driver,
            chassis: ChassisHandle::new(backend.chassis),
            mechanism: backend.mechanism,
            left_wing: backend.left_wing,
            right_wing: backend.right_wing,
            controller: backend.controller,
            surface: Some(backend.display),
            runtime: None,
            phases: PhaseMachine::new(),
            edges: EdgeDetector::new(),
            arbitrator,
            wings,
            tank,
            selector,
            routines: RoutineDispatcher::new(),
            active: Arc::new(AtomicBool::new(false)),
            config,
        })
    }

    // ─── Accessors ──────────────────────────────────────────────────

    pub fn config(&self) -> &LoadedConfig {
        &self.config
    }

    pub fn driver(&self) -> &'static str {
        self.driver
    }

    pub fn phase(&self) -> CompetitionPhase {
        self.phases.phase()
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn wing_state(&self) -> WingState {
        self.wings.state()
    }

    /// Mechanism action written on the last cycle.
    pub fn mechanism_action(&self) -> ActionKind {
        self.arbitrator.current()
    }

    pub fn chassis(&self) -> &ChassisHandle {
        &self.chassis
    }

    /// Phase flag shared with the host: looping entry points run while set.
    pub fn phase_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.active)
    }

    pub fn is_initialized(&self) -> bool {
        self.runtime.is_some()
    }

    /// Display client, once initialized.
    pub fn display(&self) -> Option<DisplayHandle> {
        self.runtime.as_ref().map(|rt| rt.display.handle())
    }

    pub fn telemetry_labels(&self) -> Option<TelemetryLabels> {
        self.runtime.as_ref().map(|rt| rt.labels)
    }

    /// Register the autonomous routine for catalog id `id`.
    pub fn register_routine(&mut self, id: impl Into<String>, routine: impl AutonRoutine + 'static) {
        let id = id.into();
        if self.config.catalog.position(&id).is_none() {
            warn!(routine = %id, "Registered routine has no catalog entry");
        }
        self.routines.register(id, routine);
    }

    fn require_display(&self) -> Result<DisplayHandle, LifecycleError> {
        self.display().ok_or(LifecycleError::NotInitialized)
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    // ─── Lifecycle Entry Points ─────────────────────────────────────

    /// One-time setup: brake mode, calibration, display service and the
    /// telemetry loop.
    pub fn initialize(&mut self) -> Result<(), LifecycleError> {
        if self.runtime.is_some() {
            return Err(LifecycleError::AlreadyInitialized);
        }
        let timing = self.config.robot.timing;

        self.chassis.set_brake_mode(self.config.robot.drive.brake_mode);
        info!("Calibrating chassis sensors...");
        self.chassis.calibrate()?;

        let surface = self
            .surface
            .take()
            .ok_or(LifecycleError::AlreadyInitialized)?;
        let display = match DisplayService::spawn(surface, timing.display_pump()) {
            Ok(display) => display,
            Err(failed) => {
                self.surface = Some(failed.surface);
                return Err(LifecycleError::Spawn {
                    name: service::THREAD_NAME,
                    source: failed.source,
                });
            }
        };
        let handle = display.handle();
        let labels = match TelemetryLabels::create(&handle) {
            Ok(labels) => labels,
            Err(e) => {
                self.abandon_display(display, None);
                return Err(e.into());
            }
        };
        let spawned = TelemetryLoop::new(
            Arc::new(self.chassis.clone()),
            handle,
            labels,
            timing.telemetry_interval(),
        )
        .spawn();
        let telemetry = match spawned {
            Ok(telemetry) => telemetry,
            Err(source) => {
                self.abandon_display(display, Some(labels));
                return Err(LifecycleError::Spawn {
                    name: telemetry::THREAD_NAME,
                    source,
                });
            }
        };

        self.runtime = Some(Runtime {
            display,
            telemetry: Some(telemetry),
            labels,
        });
        info!(
            driver = self.driver,
            routines = self.config.catalog.len(),
            "Robot initialized"
        );
        Ok(())
    }

    /// Stop a half-started display service and keep its surface for the
    /// next `initialize`.
    fn abandon_display(&mut self, display: DisplayService, labels: Option<TelemetryLabels>) {
        if let Some(labels) = labels {
            if let Err(e) = labels.destroy(&display.handle()) {
                warn!(error = %e, "Failed to remove telemetry labels");
            }
        }
        self.surface = display.into_surface();
        if self.surface.is_none() {
            warn!("Display surface lost; initialize cannot be retried");
        }
    }

    /// Pre-match: reset tracking, show the selector, then poll selector
    /// input until the phase flag clears.
    pub fn competition_initialize(&mut self) -> Result<CycleStats, LifecycleError> {
        let display = self.require_display()?;
        self.enter_phase(CompetitionPhase::PreMatch)?;
        self.chassis.reset_tracking();
        self.selector.show(&display)?;

        let mut pacer = Pacer::new("pre-match", self.config.robot.timing.loop_period());
        while self.is_active() {
            pacer.begin();
            self.pre_match_cycle();
            pacer.finish();
        }
        log_loop_end("pre-match", pacer.stats());
        Ok(pacer.stats().clone())
    }

    /// One pre-match cycle: controller edges and on-screen clicks drive the
    /// selector. Returns the number of selector transitions applied.
    pub fn pre_match_cycle(&mut self) -> usize {
        let input = self.controller.snapshot();
        let rising = self.edges.update(input.buttons);
        self.selector.apply_edges(rising) + self.selector.poll_clicks()
    }

    /// Autonomous: lock the selector (tearing its UI down first), reset the
    /// heading and run the selected routine.
    pub fn autonomous(&mut self) -> Result<AutonReport, LifecycleError> {
        self.require_display()?;
        self.enter_phase(CompetitionPhase::Autonomous)?;

        let shown = self.selector.is_shown();
        let index = self.selector.lock()?;
        if shown {
            debug!("Selector UI torn down");
        }
        self.chassis.reset_heading(0.0);

        let entry = self.selector.catalog().get(index).clone();
        let mut ctx = AutonContext::new(
            &entry,
            index,
            &self.chassis,
            &mut self.mechanism,
            self.left_wing.as_mut(),
            self.right_wing.as_mut(),
            &self.active,
        );
        let outcome = self.routines.dispatch(&mut ctx);
        Ok(AutonReport {
            index,
            routine: entry.id,
            outcome,
        })
    }

    /// Operator control: tank drive, mechanism arbitration and wing toggles
    /// every cycle until the phase flag clears.
    pub fn operator_control(&mut self) -> Result<CycleStats, LifecycleError> {
        self.require_display()?;
        self.enter_phase(CompetitionPhase::OperatorControl)?;

        let mut pacer = Pacer::new("operator", self.config.robot.timing.loop_period());
        while self.is_active() {
            pacer.begin();
            self.operator_cycle();
            pacer.finish();
        }
        log_loop_end("operator", pacer.stats());
        Ok(pacer.stats().clone())
    }

    /// One operator-control cycle. Every output is written before returning.
    pub fn operator_cycle(&mut self) -> OperatorCycle {
        let input = self.controller.snapshot();
        let rising = self.edges.update(input.buttons);

        let tank = &self.tank;
        let drive = self.chassis.with(|chassis| tank.drive(&input, chassis));
        let action = self.arbitrator.cycle(&input, &mut self.mechanism);
        self.wings.update(rising);
        self.wings
            .apply(self.left_wing.as_mut(), self.right_wing.as_mut());

        let cycle = OperatorCycle {
            action,
            wings: self.wings.state(),
            drive,
        };
        trace!(?cycle, "Operator cycle");
        cycle
    }

    /// Disabled: neutral outputs, nothing else.
    pub fn disabled(&mut self) -> Result<(), LifecycleError> {
        self.enter_phase(CompetitionPhase::Disabled)
    }

    // ─── Internals ──────────────────────────────────────────────────

    fn enter_phase(&mut self, to: CompetitionPhase) -> Result<(), LifecycleError> {
        let from = self.phases.phase();
        if let TransitionResult::Rejected(reason) = self.phases.enter(to) {
            warn!(%from, %to, reason, "Phase transition rejected");
            return Err(LifecycleError::PhaseRejected { from, to, reason });
        }
        self.neutral();
        info!(%from, %to, "Phase transition");
        Ok(())
    }

    /// Both wings retracted, Idle re-asserted, drive stopped, edge history
    /// cleared.
    fn neutral(&mut self) {
        self.wings.reset();
        self.wings
            .apply(self.left_wing.as_mut(), self.right_wing.as_mut());
        self.arbitrator.reset(&mut self.mechanism);
        self.chassis.stop();
        self.edges.reset();
    }

    /// Stop the display service and join the telemetry thread. Returns the
    /// telemetry iteration count, or `None` if never initialized.
    pub fn shutdown(&mut self) -> Option<u64> {
        let mut runtime = self.runtime.take()?;
        if let Err(e) = self.selector.dismiss() {
            warn!(error = %e, "Failed to dismiss selector");
        }
        runtime.display.shutdown();
        let iterations = runtime.telemetry.take().and_then(|t| match t.join() {
            Ok(n) => Some(n),
            Err(_) => {
                warn!("Telemetry thread panicked");
                None
            }
        });
        info!(telemetry_iterations = ?iterations, "Robot shut down");
        iterations
    }
}

impl Drop for RobotContext {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for RobotContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RobotContext")
            .field("driver", &self.driver)
            .field("phase", &self.phases.phase())
            .field("initialized", &self.runtime.is_some())
            .field("selector", &self.selector)
            .field("wings", &self.wings.state())
            .field("action", &self.arbitrator.current())
            .field("routines", &self.routines)
            .finish_non_exhaustive()
    }
}

fn log_loop_end(name: &str, stats: &CycleStats) {
    info!(
        cycles = stats.cycle_count,
        avg_us = stats.avg_cycle_us(),
        max_us = stats.max_cycle_us,
        overruns = stats.overruns,
        "{name} loop ended"
    );
}
