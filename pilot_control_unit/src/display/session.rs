//! Phase-scoped display elements.
//!
//! A [`DisplaySession`] owns every element it creates and destroys each of
//! them exactly once: synchronously through [`DisplaySession::release`], or
//! as a fire-and-forget fallback when dropped.

use std::mem;

use pilot_common::hal::display::{ElementId, LabelText, Placement};
use pilot_common::hal::error::DisplayError;
use tracing::{debug, warn};

use super::service::DisplayHandle;

pub struct DisplaySession {
    name: &'static str,
    display: DisplayHandle,
    /// Creation order.
    elements: Vec<ElementId>,
}

impl DisplaySession {
    pub fn open(name: &'static str, display: &DisplayHandle) -> Self {
        debug!(session = name, "Display session opened");
        Self {
            name,
            display: display.clone(),
            elements: Vec::new(),
        }
    }

    pub fn label(&mut self, placement: Placement) -> Result<ElementId, DisplayError> {
        let id = self.display.create_label(placement)?;
        self.elements.push(id);
        Ok(id)
    }

    pub fn button(&mut self, placement: Placement, caption: &str) -> Result<ElementId, DisplayError> {
        let id = self.display.create_button(placement, caption)?;
        self.elements.push(id);
        Ok(id)
    }

    pub fn set_text(&self, id: ElementId, text: LabelText) -> Result<(), DisplayError> {
        self.display.set_fitted(id, text)
    }

    pub fn on_click<F>(&self, id: ElementId, callback: F) -> Result<(), DisplayError>
    where
        F: FnMut() + Send + 'static,
    {
        self.display.on_click(id, callback)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Live elements, in creation order.
    pub fn elements(&self) -> &[ElementId] {
        &self.elements
    }

    /// Destroy every element and wait until the display has applied it.
    pub fn release(mut self) -> Result<(), DisplayError> {
        self.teardown();
        self.display.sync()
    }

    /// Destroy in reverse creation order. Runs at most once per element.
    fn teardown(&mut self) {
        let elements = mem::take(&mut self.elements);
        if elements.is_empty() {
            return;
        }
        let count = elements.len();
        for id in elements.into_iter().rev() {
            if let Err(e) = self.display.destroy(id) {
                warn!(session = self.name, %id, error = %e, "Failed to destroy display element");
            }
        }
        debug!(session = self.name, elements = count, "Display session released");
    }
}

impl Drop for DisplaySession {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for DisplaySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisplaySession")
            .field("name", &self.name)
            .field("elements", &self.elements)
            .finish()
    }
}
