//! Display-owning thread and its message queue.
//!
//! The service thread drains [`DisplayCommand`]s in FIFO order and calls
//! `pump_events()` every pump interval, so click callbacks always run on the
//! display thread. Surface errors are logged and absorbed; they never reach
//! the control loops.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, SyncSender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use pilot_common::hal::display::{
    ClickCallback, DisplaySurface, ElementId, LabelText, Placement, fit_text,
};
use pilot_common::hal::error::DisplayError;
use static_assertions::assert_impl_all;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Thread name of the display service.
pub const THREAD_NAME: &str = "display";

// ─── Commands ───────────────────────────────────────────────────────

enum DisplayCommand {
    CreateLabel {
        id: ElementId,
        placement: Placement,
    },
    CreateButton {
        id: ElementId,
        placement: Placement,
        caption: LabelText,
    },
    SetText {
        id: ElementId,
        text: LabelText,
    },
    OnClick {
        id: ElementId,
        callback: ClickCallback,
    },
    Destroy {
        id: ElementId,
    },
    /// Acknowledged once every earlier command has been applied.
    Barrier(SyncSender<()>),
    Shutdown,
}

impl DisplayCommand {
    const fn name(&self) -> &'static str {
        match self {
            Self::CreateLabel { .. } => "create_label",
            Self::CreateButton { .. } => "create_button",
            Self::SetText { .. } => "set_text",
            Self::OnClick { .. } => "on_click",
            Self::Destroy { .. } => "destroy",
            Self::Barrier(_) => "barrier",
            Self::Shutdown => "shutdown",
        }
    }
}

// ─── Statistics ─────────────────────────────────────────────────────

/// Counters kept by the service thread, readable from any handle.
#[derive(Debug, Default)]
pub struct DisplayStats {
    commands: AtomicU64,
    errors: AtomicU64,
    pumps: AtomicU64,
}

impl DisplayStats {
    /// Commands applied to the surface (barriers excluded).
    pub fn commands(&self) -> u64 {
        self.commands.load(Ordering::Relaxed)
    }

    /// Surface operations that failed and were absorbed.
    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    pub fn pumps(&self) -> u64 {
        self.pumps.load(Ordering::Relaxed)
    }
}

// ─── Handle ─────────────────────────────────────────────────────────

/// Cloneable client of the display service.
///
/// Element ids are allocated here, so creation never waits for the service
/// thread. Every method fails with `DisplayError::ServiceStopped` once the
/// service has shut down.
#[derive(Clone)]
pub struct DisplayHandle {
    tx: Sender<DisplayCommand>,
    next_id: Arc<AtomicU32>,
    stats: Arc<DisplayStats>,
}

assert_impl_all!(DisplayHandle: Send, Clone);

impl DisplayHandle {
    fn send(&self, command: DisplayCommand) -> Result<(), DisplayError> {
        self.tx
            .send(command)
            .map_err(|_| DisplayError::ServiceStopped)
    }

    fn allocate(&self) -> ElementId {
        ElementId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    pub fn create_label(&self, placement: Placement) -> Result<ElementId, DisplayError> {
        let id = self.allocate();
        self.send(DisplayCommand::CreateLabel { id, placement })?;
        Ok(id)
    }

    pub fn create_button(
        &self,
        placement: Placement,
        caption: &str,
    ) -> Result<ElementId, DisplayError> {
        let id = self.allocate();
        self.send(DisplayCommand::CreateButton {
            id,
            placement,
            caption: fit_text(caption),
        })?;
        Ok(id)
    }

    /// Replace a label's text, truncated to the label buffer.
    pub fn set_text(&self, id: ElementId, text: &str) -> Result<(), DisplayError> {
        self.set_fitted(id, fit_text(text))
    }

    /// Replace a label's text with already-fitted text.
    pub fn set_fitted(&self, id: ElementId, text: LabelText) -> Result<(), DisplayError> {
        self.send(DisplayCommand::SetText { id, text })
    }

    /// Register a click handler. It runs on the display thread and must
    /// not block on the display service.
    pub fn on_click<F>(&self, id: ElementId, callback: F) -> Result<(), DisplayError>
    where
        F: FnMut() + Send + 'static,
    {
        self.send(DisplayCommand::OnClick {
            id,
            callback: Box::new(callback),
        })
    }

    pub fn destroy(&self, id: ElementId) -> Result<(), DisplayError> {
        self.send(DisplayCommand::Destroy { id })
    }

    /// Block until every command sent so far has been applied.
    pub fn sync(&self) -> Result<(), DisplayError> {
        let (ack_tx, ack_rx) = mpsc::sync_channel(1);
        self.send(DisplayCommand::Barrier(ack_tx))?;
        ack_rx.recv().map_err(|_| DisplayError::ServiceStopped)
    }

    pub fn stats(&self) -> &DisplayStats {
        &self.stats
    }
}

impl std::fmt::Debug for DisplayHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisplayHandle")
            .field("next_id", &self.next_id.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

// ─── Service ────────────────────────────────────────────────────────

/// The display thread could not be started. The surface is handed back.
#[derive(Error)]
#[error("failed to start display thread: {source}")]
pub struct SpawnError {
    #[source]
    pub source: io::Error,
    pub surface: Box<dyn DisplaySurface>,
}

impl std::fmt::Debug for SpawnError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpawnError")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// Owner of the display thread. Dropping it stops and joins the thread;
/// outstanding handles then fail with `ServiceStopped`.
#[derive(Debug)]
pub struct DisplayService {
    handle: DisplayHandle,
    thread: Option<JoinHandle<Option<Box<dyn DisplaySurface>>>>,
}

impl DisplayService {
    /// Move `surface` onto a new display thread pumping every `pump`.
    ///
    /// The surface crosses to the thread only once it is running, so a
    /// failed spawn returns it inside the error.
    pub fn spawn(surface: Box<dyn DisplaySurface>, pump: Duration) -> Result<Self, SpawnError> {
        let (tx, rx) = mpsc::channel();
        let (surface_tx, surface_rx) = mpsc::sync_channel::<Box<dyn DisplaySurface>>(1);
        let stats = Arc::new(DisplayStats::default());
        let worker_stats = Arc::clone(&stats);
        let spawned = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || {
                let surface = surface_rx.recv().ok()?;
                Some(run(surface, &rx, pump, &worker_stats))
            });
        let thread = match spawned {
            Ok(thread) => thread,
            Err(source) => return Err(SpawnError { source, surface }),
        };
        if let Err(mpsc::SendError(surface)) = surface_tx.send(surface) {
            let _ = thread.join();
            return Err(SpawnError {
                source: io::Error::other("display thread exited before start"),
                surface,
            });
        }
        info!(pump_ms = pump.as_millis() as u64, "Display service started");
        Ok(Self {
            handle: DisplayHandle {
                tx,
                next_id: Arc::new(AtomicU32::new(1)),
                stats,
            },
            thread: Some(thread),
        })
    }

    /// A new client handle.
    pub fn handle(&self) -> DisplayHandle {
        self.handle.clone()
    }

    /// Stop the thread and wait for it.
    pub fn shutdown(mut self) {
        let _ = self.halt();
    }

    /// Stop the thread and take the surface back. `None` if the thread
    /// panicked.
    pub fn into_surface(mut self) -> Option<Box<dyn DisplaySurface>> {
        self.halt()
    }

    fn halt(&mut self) -> Option<Box<dyn DisplaySurface>> {
        let thread = self.thread.take()?;
        let _ = self.handle.send(DisplayCommand::Shutdown);
        match thread.join() {
            Ok(surface) => surface,
            Err(_) => {
                warn!("Display service thread panicked");
                None
            }
        }
    }
}

impl Drop for DisplayService {
    fn drop(&mut self) {
        let _ = self.halt();
    }
}

fn run(
    mut surface: Box<dyn DisplaySurface>,
    rx: &Receiver<DisplayCommand>,
    pump: Duration,
    stats: &DisplayStats,
) -> Box<dyn DisplaySurface> {
    let mut next_pump = Instant::now() + pump;
    loop {
        let timeout = next_pump.saturating_duration_since(Instant::now());
        match rx.recv_timeout(timeout) {
            Ok(DisplayCommand::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            Ok(DisplayCommand::Barrier(ack)) => {
                let _ = ack.send(());
            }
            Ok(command) => {
                let name = command.name();
                stats.commands.fetch_add(1, Ordering::Relaxed);
                if let Err(e) = apply(surface.as_mut(), command) {
                    stats.errors.fetch_add(1, Ordering::Relaxed);
                    warn!(command = name, error = %e, "Display command failed");
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
        }

        let now = Instant::now();
        if now >= next_pump {
            surface.pump_events();
            stats.pumps.fetch_add(1, Ordering::Relaxed);
            next_pump = now + pump;
        }
    }
    info!(
        commands = stats.commands(),
        errors = stats.errors(),
        pumps = stats.pumps(),
        "Display service stopped"
    );
    surface
}

fn apply(surface: &mut dyn DisplaySurface, command: DisplayCommand) -> Result<(), DisplayError> {
    match command {
        DisplayCommand::CreateLabel { id, placement } => surface.create_label(id, placement),
        DisplayCommand::CreateButton {
            id,
            placement,
            caption,
        } => surface.create_button(id, placement, &caption),
        DisplayCommand::SetText { id, text } => surface.set_text(id, &text),
        DisplayCommand::OnClick { id, callback } => surface.on_click(id, callback),
        DisplayCommand::Destroy { id } => {
            debug!(%id, "Destroying display element");
            surface.destroy(id)
        }
        DisplayCommand::Barrier(_) | DisplayCommand::Shutdown => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pilot_common::hal::display::Align;
    use pilot_common::robot::config::RobotConfig;
    use pilot_hal::drivers::simulation::{self, DisplayProbe};
    use std::sync::atomic::AtomicUsize;

    const PUMP: Duration = Duration::from_millis(2);

    fn service() -> (DisplayService, DisplayProbe) {
        let (backend, probe) = simulation::build(&RobotConfig::default()).unwrap();
        let service = DisplayService::spawn(backend.display, PUMP).unwrap();
        (service, probe.display)
    }

    fn wait_until(mut done: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(2);
        while !done() {
            assert!(Instant::now() < deadline, "condition not reached in time");
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn commands_apply_in_order() {
        let (service, probe) = service();
        let display = service.handle();
        let id = display
            .create_label(Placement::new(Align::LeftMid, 0, 20))
            .unwrap();
        display.set_text(id, "first").unwrap();
        display.set_text(id, "second").unwrap();
        display.sync().unwrap();
        assert_eq!(probe.text(id).as_deref(), Some("second"));
        assert_eq!(display.stats().commands(), 3);
        assert_eq!(display.stats().errors(), 0);
    }

    #[test]
    fn ids_are_unique_across_clones() {
        let (service, _probe) = service();
        let a = service.handle();
        let b = a.clone();
        let first = a.create_label(Placement::new(Align::Center, 0, 0)).unwrap();
        let second = b.create_label(Placement::new(Align::Center, 0, 0)).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn long_text_is_truncated() {
        let (service, probe) = service();
        let display = service.handle();
        let id = display
            .create_label(Placement::new(Align::TopLeft, 0, 0))
            .unwrap();
        display.set_text(id, &"x".repeat(200)).unwrap();
        display.sync().unwrap();
        assert_eq!(
            probe.text(id).map(|t| t.len()),
            Some(pilot_common::consts::LABEL_TEXT_CAPACITY)
        );
    }

    #[test]
    fn surface_errors_are_absorbed() {
        let (service, _probe) = service();
        let display = service.handle();
        display.set_text(ElementId(999), "nobody").unwrap();
        display.destroy(ElementId(999)).unwrap();
        display.sync().unwrap();
        assert_eq!(display.stats().errors(), 2);
    }

    #[test]
    fn clicks_run_on_display_thread() {
        let (service, probe) = service();
        let display = service.handle();
        let id = display
            .create_button(Placement::new(Align::Center, 0, 0), ">")
            .unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        display
            .on_click(id, move || {
                assert_eq!(thread::current().name(), Some(THREAD_NAME));
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        display.sync().unwrap();

        probe.click(id);
        probe.click(id);
        wait_until(|| hits.load(Ordering::SeqCst) == 2);
        assert!(display.stats().pumps() > 0);
    }

    #[test]
    fn handles_fail_after_shutdown() {
        let (service, _probe) = service();
        let display = service.handle();
        service.shutdown();
        assert_eq!(
            display.create_label(Placement::new(Align::Center, 0, 0)),
            Err(DisplayError::ServiceStopped)
        );
        assert_eq!(display.sync(), Err(DisplayError::ServiceStopped));
    }

    #[test]
    fn surface_survives_restart() {
        let (backend, probe) = simulation::build(&RobotConfig::default()).unwrap();
        let service = DisplayService::spawn(backend.display, PUMP).unwrap();
        let display = service.handle();
        let id = display
            .create_label(Placement::new(Align::LeftMid, 0, 20))
            .unwrap();
        display.set_text(id, "kept").unwrap();
        display.destroy(id).unwrap();

        let surface = service.into_surface().expect("surface handed back");
        assert_eq!(probe.display.element_count(), 0);
        assert_eq!(display.sync(), Err(DisplayError::ServiceStopped));

        let restarted = DisplayService::spawn(surface, PUMP).unwrap();
        let display = restarted.handle();
        let id = display
            .create_label(Placement::new(Align::LeftMid, 0, 20))
            .unwrap();
        display.set_text(id, "again").unwrap();
        display.sync().unwrap();
        assert_eq!(probe.display.text(id).as_deref(), Some("again"));
        assert_eq!(display.stats().errors(), 0);
    }
}
