//! Match driver: plays the host runtime's side of a competition.
//!
//! Calls the lifecycle entry points in match order and ends each timed phase
//! by clearing the context's phase flag from a timer thread:
//!
//! ```text
//! initialize → competition_initialize (pre_match) → autonomous (autonomous)
//!            → operator_control (driver) → disabled
//! ```
//!
//! A zero-length pre-match skips the selector, as on a practice field where
//! the robot is never connected to a field controller.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::context::{AutonReport, RobotContext};
use crate::cycle::CycleStats;
use crate::error::LifecycleError;

/// Phase lengths of one match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchTimeline {
    pub pre_match: Duration,
    pub autonomous: Duration,
    pub driver: Duration,
}

impl Default for MatchTimeline {
    /// 15 s autonomous and 1:45 driver control after a short pre-match.
    fn default() -> Self {
        Self {
            pre_match: Duration::from_secs(3),
            autonomous: Duration::from_secs(15),
            driver: Duration::from_secs(105),
        }
    }
}

/// What happened during [`run_match`].
#[derive(Debug, Clone)]
pub struct MatchReport {
    /// `None` if the match was stopped before autonomous.
    pub autonomous: Option<AutonReport>,
    pub pre_match: Option<CycleStats>,
    pub operator: Option<CycleStats>,
    /// The stop flag ended the match early.
    pub stopped: bool,
}

/// Clears the phase flag after a deadline unless cancelled first.
struct PhaseTimer {
    cancel: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl PhaseTimer {
    /// Set `flag` and start the countdown. A `stop` raised at any point,
    /// even just before arming, leaves the flag clear.
    fn start(flag: &Arc<AtomicBool>, duration: Duration, stop: &AtomicBool) -> io::Result<Self> {
        let (cancel, cancelled) = mpsc::channel::<()>();
        flag.store(true, Ordering::SeqCst);
        // Stoppers raise `stop` before clearing the flag.
        if stop.load(Ordering::SeqCst) {
            flag.store(false, Ordering::SeqCst);
        }
        let flag = Arc::clone(flag);
        let thread = thread::Builder::new()
            .name("phase-timer".to_string())
            .spawn(move || {
                if let Err(RecvTimeoutError::Timeout) = cancelled.recv_timeout(duration) {
                    flag.store(false, Ordering::SeqCst);
                }
            })?;
        Ok(Self {
            cancel: Some(cancel),
            thread: Some(thread),
        })
    }

    /// Block until the phase flag clears (timeout or external stop).
    fn wait_out(&self, flag: &AtomicBool) {
        while flag.load(Ordering::SeqCst) {
            thread::sleep(Duration::from_millis(5));
        }
    }
}

impl Drop for PhaseTimer {
    fn drop(&mut self) {
        drop(self.cancel.take());
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn timer_error(source: io::Error) -> LifecycleError {
    LifecycleError::Spawn {
        name: "phase-timer",
        source,
    }
}

/// Play one match against `ctx`. Setting `stop` (and clearing the phase
/// flag) ends the current phase and skips the rest; `disabled` always runs.
pub fn run_match(
    ctx: &mut RobotContext,
    timeline: &MatchTimeline,
    stop: &AtomicBool,
) -> Result<MatchReport, LifecycleError> {
    let flag = ctx.phase_flag();
    let started = Instant::now();
    let mut report = MatchReport {
        autonomous: None,
        pre_match: None,
        operator: None,
        stopped: false,
    };

    ctx.initialize()?;

    if !timeline.pre_match.is_zero() && !stop.load(Ordering::SeqCst) {
        let _timer = PhaseTimer::start(&flag, timeline.pre_match, stop).map_err(timer_error)?;
        report.pre_match = Some(ctx.competition_initialize()?);
    }

    if !stop.load(Ordering::SeqCst) {
        let timer = PhaseTimer::start(&flag, timeline.autonomous, stop).map_err(timer_error)?;
        let auton = ctx.autonomous()?;
        debug!(routine = %auton.routine, "Waiting out the autonomous period");
        timer.wait_out(&flag);
        report.autonomous = Some(auton);
    }

    if !stop.load(Ordering::SeqCst) {
        let _timer = PhaseTimer::start(&flag, timeline.driver, stop).map_err(timer_error)?;
        report.operator = Some(ctx.operator_control()?);
    }

    flag.store(false, Ordering::SeqCst);
    ctx.disabled()?;
    report.stopped = stop.load(Ordering::SeqCst);
    info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        stopped = report.stopped,
        "Match complete"
    );
    Ok(report)
}
