//! Autonomous selector component.
//!
//! Wraps [`SelectorStateMachine`] with the catalog and the on-screen UI:
//! one label showing `"<index>: <label>"` plus "<" and ">" buttons. Clicks
//! arrive on the display thread and are forwarded over a channel; the
//! pre-match loop drains them with [`Selector::poll_clicks`] alongside
//! controller edges, so every transition runs on the control task.

use std::sync::mpsc::{self, Receiver, Sender};

use pilot_common::hal::display::{Align, ElementId, Placement, fit_fmt};
use pilot_common::hal::error::DisplayError;
use pilot_common::robot::catalog::{RoutineCatalog, RoutineEntry, RoutineIndex};
use pilot_common::robot::config::BindingsConfig;
use pilot_common::robot::input::Buttons;
use pilot_common::robot::state::SelectorState;
use tracing::{debug, info, warn};

use crate::display::{DisplayHandle, DisplaySession};
use crate::state::selector::{SelectorEvent, SelectorStateMachine, TransitionResult};

/// Selected-routine label.
pub const LABEL_PLACEMENT: Placement = Placement::new(Align::TopRight, 0, 50);
/// "<" button.
pub const RETREAT_PLACEMENT: Placement = Placement::new(Align::Center, 100, 90);
/// ">" button.
pub const ADVANCE_PLACEMENT: Placement = Placement::new(Align::Center, 100, 130);

pub const RETREAT_CAPTION: &str = "<";
pub const ADVANCE_CAPTION: &str = ">";

struct SelectorUi {
    session: DisplaySession,
    label: ElementId,
}

pub struct Selector {
    machine: SelectorStateMachine,
    catalog: RoutineCatalog,
    advance: Buttons,
    retreat: Buttons,
    ui: Option<SelectorUi>,
    clicks_tx: Sender<SelectorEvent>,
    clicks_rx: Receiver<SelectorEvent>,
}

impl Selector {
    pub fn new(catalog: RoutineCatalog, bindings: &BindingsConfig) -> Self {
        let (clicks_tx, clicks_rx) = mpsc::channel();
        Self {
            machine: SelectorStateMachine::new(catalog.len()),
            catalog,
            advance: bindings.selector_advance.flag(),
            retreat: bindings.selector_retreat.flag(),
            ui: None,
            clicks_tx,
            clicks_rx,
        }
    }

    #[inline]
    pub fn state(&self) -> SelectorState {
        self.machine.state()
    }

    #[inline]
    pub fn index(&self) -> RoutineIndex {
        self.machine.index()
    }

    /// Routine at the current index.
    pub fn selected(&self) -> &RoutineEntry {
        self.catalog.get(self.machine.index())
    }

    pub fn catalog(&self) -> &RoutineCatalog {
        &self.catalog
    }

    /// Whether the selector UI is on screen.
    pub fn is_shown(&self) -> bool {
        self.ui.is_some()
    }

    /// Selector label id while shown.
    pub fn label_id(&self) -> Option<ElementId> {
        self.ui.as_ref().map(|ui| ui.label)
    }

    /// Enter `Active` and put the selector UI on screen.
    ///
    /// A selector that is already shown or locked is left alone.
    pub fn show(&mut self, display: &DisplayHandle) -> Result<(), DisplayError> {
        if let TransitionResult::Rejected(reason) = self.machine.handle_event(SelectorEvent::Show) {
            debug!(reason, "Selector not shown");
            return Ok(());
        }

        let mut session = DisplaySession::open("selector", display);
        let label = session.label(LABEL_PLACEMENT)?;
        let retreat = session.button(RETREAT_PLACEMENT, RETREAT_CAPTION)?;
        let advance = session.button(ADVANCE_PLACEMENT, ADVANCE_CAPTION)?;
        for (button, event) in [
            (retreat, SelectorEvent::Retreat),
            (advance, SelectorEvent::Advance),
        ] {
            let tx = self.clicks_tx.clone();
            session.on_click(button, move || {
                let _ = tx.send(event);
            })?;
        }

        self.ui = Some(SelectorUi { session, label });
        self.render();
        info!(
            routines = self.catalog.len(),
            index = %self.index(),
            "Selector shown"
        );
        Ok(())
    }

    /// Apply one event, re-rendering on index changes.
    pub fn handle(&mut self, event: SelectorEvent) -> TransitionResult {
        let before = self.machine.index();
        let result = self.machine.handle_event(event);
        match &result {
            TransitionResult::Ok(state, index) => {
                if *index != before {
                    self.render();
                }
                info!(
                    ?event,
                    ?state,
                    index = %index,
                    routine = %self.catalog.get(*index).id,
                    "Selector transition"
                );
            }
            TransitionResult::Rejected(reason) => {
                debug!(?event, reason, "Selector event rejected");
            }
        }
        result
    }

    /// Apply this cycle's rising controller edges. Returns events applied.
    pub fn apply_edges(&mut self, rising: Buttons) -> usize {
        let mut applied = 0;
        for (button, event) in [
            (self.advance, SelectorEvent::Advance),
            (self.retreat, SelectorEvent::Retreat),
        ] {
            if rising.contains(button) && matches!(self.handle(event), TransitionResult::Ok(..)) {
                applied += 1;
            }
        }
        applied
    }

    /// Apply on-screen clicks received since the last call.
    pub fn poll_clicks(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.clicks_rx.try_recv() {
            if matches!(self.handle(event), TransitionResult::Ok(..)) {
                applied += 1;
            }
        }
        applied
    }

    /// Freeze the selection and tear the UI down before returning.
    ///
    /// Locking an already-locked selector returns the frozen index.
    pub fn lock(&mut self) -> Result<RoutineIndex, DisplayError> {
        if !self.machine.is_locked() {
            self.handle(SelectorEvent::Lock);
        }
        let index = self.machine.index();

        if let Some(ui) = self.ui.take() {
            ui.session.release()?;
        }
        // Clicks delivered before teardown are stale.
        let stale = self.clicks_rx.try_iter().count();
        if stale > 0 {
            debug!(stale, "Discarded selector clicks after lock");
        }
        Ok(index)
    }

    /// Take the UI down without locking, e.g. at shutdown.
    pub fn dismiss(&mut self) -> Result<(), DisplayError> {
        match self.ui.take() {
            Some(ui) => ui.session.release(),
            None => Ok(()),
        }
    }

    fn render(&self) {
        let Some(ui) = &self.ui else {
            return;
        };
        let index = self.machine.index();
        let text = fit_fmt(format_args!("{}: {}", index, self.catalog.get(index).label));
        if let Err(e) = ui.session.set_text(ui.label, text) {
            warn!(error = %e, "Failed to render selector");
        }
    }
}

impl std::fmt::Debug for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selector")
            .field("state", &self.machine.state())
            .field("index", &self.machine.index())
            .field("shown", &self.ui.is_some())
            .finish_non_exhaustive()
    }
}
