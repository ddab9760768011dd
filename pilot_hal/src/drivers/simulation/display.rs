//! Headless display surface.
//!
//! Keeps every element in memory so tests can read back label text and
//! inject clicks. Click callbacks run inside `pump_events()` without the
//! surface lock held, so a callback may freely use the probe.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;
use pilot_common::hal::display::{
    ClickCallback, DisplaySurface, ElementId, ElementKind, Placement,
};
use pilot_common::hal::error::DisplayError;
use tracing::trace;

struct Element {
    kind: ElementKind,
    placement: Placement,
    text: String,
    callback: Option<ClickCallback>,
}

#[derive(Default)]
struct DisplayState {
    elements: BTreeMap<ElementId, Element>,
    pending_clicks: VecDeque<ElementId>,
    created: u64,
    destroyed: u64,
    text_writes: u64,
    pumps: u64,
    clicks_delivered: u64,
}

impl DisplayState {
    fn insert(&mut self, id: ElementId, element: Element) -> Result<(), DisplayError> {
        if self.elements.contains_key(&id) {
            return Err(DisplayError::DuplicateElement(id));
        }
        self.elements.insert(id, element);
        self.created += 1;
        Ok(())
    }

    fn element_mut(
        &mut self,
        id: ElementId,
        expected: ElementKind,
    ) -> Result<&mut Element, DisplayError> {
        let element = self
            .elements
            .get_mut(&id)
            .ok_or(DisplayError::UnknownElement(id))?;
        if element.kind != expected {
            return Err(DisplayError::WrongKind { id, expected });
        }
        Ok(element)
    }

    /// Take the callback of the next clickable pending click.
    fn next_click(&mut self) -> Option<(ElementId, ClickCallback)> {
        while let Some(id) = self.pending_clicks.pop_front() {
            let callback = self
                .elements
                .get_mut(&id)
                .and_then(|e| e.callback.take());
            if let Some(callback) = callback {
                return Some((id, callback));
            }
            trace!(%id, "Dropping click on element without handler");
        }
        None
    }
}

/// In-memory display implementing [`DisplaySurface`].
pub struct HeadlessDisplay {
    state: Arc<Mutex<DisplayState>>,
}

impl HeadlessDisplay {
    pub(super) fn new() -> (Self, DisplayProbe) {
        let state = Arc::new(Mutex::new(DisplayState::default()));
        (
            Self {
                state: Arc::clone(&state),
            },
            DisplayProbe { state },
        )
    }
}

impl DisplaySurface for HeadlessDisplay {
    fn create_label(&mut self, id: ElementId, placement: Placement) -> Result<(), DisplayError> {
        self.state.lock().insert(
            id,
            Element {
                kind: ElementKind::Label,
                placement,
                text: String::new(),
                callback: None,
            },
        )
    }

    fn create_button(
        &mut self,
        id: ElementId,
        placement: Placement,
        caption: &str,
    ) -> Result<(), DisplayError> {
        self.state.lock().insert(
            id,
            Element {
                kind: ElementKind::Button,
                placement,
                text: caption.to_string(),
                callback: None,
            },
        )
    }

    fn set_text(&mut self, id: ElementId, text: &str) -> Result<(), DisplayError> {
        let mut state = self.state.lock();
        let element = state.element_mut(id, ElementKind::Label)?;
        element.text.clear();
        element.text.push_str(text);
        state.text_writes += 1;
        Ok(())
    }

    fn destroy(&mut self, id: ElementId) -> Result<(), DisplayError> {
        let mut state = self.state.lock();
        state
            .elements
            .remove(&id)
            .ok_or(DisplayError::UnknownElement(id))?;
        state.destroyed += 1;
        Ok(())
    }

    fn on_click(&mut self, id: ElementId, callback: ClickCallback) -> Result<(), DisplayError> {
        self.state
            .lock()
            .element_mut(id, ElementKind::Button)?
            .callback = Some(callback);
        Ok(())
    }

    fn pump_events(&mut self) {
        self.state.lock().pumps += 1;
        loop {
            let Some((id, mut callback)) = self.state.lock().next_click() else {
                break;
            };
            callback();
            let mut state = self.state.lock();
            state.clicks_delivered += 1;
            // Restore unless the element was destroyed or re-bound meanwhile.
            if let Some(element) = state.elements.get_mut(&id) {
                if element.callback.is_none() {
                    element.callback = Some(callback);
                }
            }
        }
    }
}

/// Snapshot of one on-screen element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementView {
    pub id: ElementId,
    pub kind: ElementKind,
    pub placement: Placement,
    /// Label text or button caption.
    pub text: String,
}

/// Test-side view of a [`HeadlessDisplay`].
#[derive(Clone)]
pub struct DisplayProbe {
    state: Arc<Mutex<DisplayState>>,
}

impl DisplayProbe {
    /// Every live element, in id order.
    pub fn elements(&self) -> Vec<ElementView> {
        self.state
            .lock()
            .elements
            .iter()
            .map(|(id, e)| ElementView {
                id: *id,
                kind: e.kind,
                placement: e.placement,
                text: e.text.clone(),
            })
            .collect()
    }

    pub fn element_count(&self) -> usize {
        self.state.lock().elements.len()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.state.lock().elements.contains_key(&id)
    }

    pub fn text(&self, id: ElementId) -> Option<String> {
        self.state.lock().elements.get(&id).map(|e| e.text.clone())
    }

    /// First label whose text starts with `prefix`.
    pub fn label_starting_with(&self, prefix: &str) -> Option<ElementView> {
        self.elements()
            .into_iter()
            .find(|e| e.kind == ElementKind::Label && e.text.starts_with(prefix))
    }

    /// Button with exactly this caption.
    pub fn button(&self, caption: &str) -> Option<ElementId> {
        self.elements()
            .into_iter()
            .find(|e| e.kind == ElementKind::Button && e.text == caption)
            .map(|e| e.id)
    }

    /// Queue a click; it is delivered on the next `pump_events()`.
    pub fn click(&self, id: ElementId) {
        self.state.lock().pending_clicks.push_back(id);
    }

    pub fn pending_clicks(&self) -> usize {
        self.state.lock().pending_clicks.len()
    }

    pub fn clicks_delivered(&self) -> u64 {
        self.state.lock().clicks_delivered
    }

    pub fn pumps(&self) -> u64 {
        self.state.lock().pumps
    }

    pub fn text_writes(&self) -> u64 {
        self.state.lock().text_writes
    }

    /// `(created, destroyed)` element counts over the surface's lifetime.
    pub fn lifetime_counts(&self) -> (u64, u64) {
        let state = self.state.lock();
        (state.created, state.destroyed)
    }
}
