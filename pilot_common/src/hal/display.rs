//! Display surface trait and fixed-capacity label text.
//!
//! A `DisplaySurface` is not thread-safe by contract: exactly one thread
//! (the control unit's display service) owns it and performs every
//! mutation. Element ids are allocated by the caller so that commands can
//! be queued without waiting for a reply.

use std::fmt;

use heapless::String as FixedString;
use serde::{Deserialize, Serialize};

use crate::consts::LABEL_TEXT_CAPACITY;
use crate::hal::error::DisplayError;

/// Text that fits one display label. Longer text is truncated.
pub type LabelText = FixedString<LABEL_TEXT_CAPACITY>;

/// Callback invoked from the display thread when a button is clicked.
pub type ClickCallback = Box<dyn FnMut() + Send>;

/// Handle of a label or button on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u32);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Label,
    Button,
}

/// Anchor point on the screen that a placement offset is relative to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    TopLeft,
    TopMid,
    TopRight,
    LeftMid,
    Center,
    RightMid,
    BottomLeft,
    BottomMid,
    BottomRight,
}

/// Element position: an anchor plus a pixel offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    pub align: Align,
    pub x: i16,
    pub y: i16,
}

impl Placement {
    pub const fn new(align: Align, x: i16, y: i16) -> Self {
        Self { align, x, y }
    }
}

/// Screen collaborator.
///
/// # Lifecycle
///
/// 1. `create_label()` / `create_button()` - register an element under a fresh id
/// 2. `set_text()` / `on_click()` - mutate it any number of times
/// 3. `destroy()` - remove it; the id is never reused
///
/// `pump_events()` must run once per display-loop iteration; click
/// callbacks fire from inside it.
pub trait DisplaySurface: Send {
    fn create_label(&mut self, id: ElementId, placement: Placement) -> Result<(), DisplayError>;

    fn create_button(
        &mut self,
        id: ElementId,
        placement: Placement,
        caption: &str,
    ) -> Result<(), DisplayError>;

    fn set_text(&mut self, id: ElementId, text: &str) -> Result<(), DisplayError>;

    fn destroy(&mut self, id: ElementId) -> Result<(), DisplayError>;

    /// Register a click handler on a button, replacing any previous one.
    fn on_click(&mut self, id: ElementId, callback: ClickCallback) -> Result<(), DisplayError>;

    /// Process pending UI events.
    fn pump_events(&mut self);
}

/// Copy `text` into a label buffer, truncating at a character boundary.
pub fn fit_text(text: &str) -> LabelText {
    let mut out = LabelText::new();
    for ch in text.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}

/// Format directly into a label buffer, truncating instead of overflowing.
pub fn fit_fmt(args: fmt::Arguments<'_>) -> LabelText {
    let mut out = LabelText::new();
    let mut writer = Truncating {
        buf: &mut out,
        full: false,
    };
    // The writer never fails; a failing Display impl just ends the text early.
    let _ = fmt::write(&mut writer, args);
    out
}

struct Truncating<'a> {
    buf: &'a mut LabelText,
    full: bool,
}

impl fmt::Write for Truncating<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.full {
            return Ok(());
        }
        for ch in s.chars() {
            if self.buf.push(ch).is_err() {
                self.full = true;
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_text_keeps_short_text() {
        assert_eq!(fit_text("X: 1.000").as_str(), "X: 1.000");
    }

    #[test]
    fn fit_text_truncates_to_capacity() {
        let long = "a".repeat(LABEL_TEXT_CAPACITY + 10);
        let fitted = fit_text(&long);
        assert_eq!(fitted.len(), LABEL_TEXT_CAPACITY);
    }

    #[test]
    fn fit_text_respects_char_boundaries() {
        // 'é' is two bytes; capacity is even, so an odd prefix forces a cut.
        let text = format!("x{}", "é".repeat(LABEL_TEXT_CAPACITY));
        let fitted = fit_text(&text);
        assert!(fitted.len() <= LABEL_TEXT_CAPACITY);
        assert!(fitted.as_str().starts_with('x'));
        assert!(fitted.as_str().chars().skip(1).all(|c| c == 'é'));
    }

    #[test]
    fn fit_fmt_formats_and_truncates() {
        assert_eq!(fit_fmt(format_args!("Y: {:.3}", -2.5)).as_str(), "Y: -2.500");
        let fitted = fit_fmt(format_args!("Theta: {:.3}", 1.0e40_f64));
        assert_eq!(fitted.len(), LABEL_TEXT_CAPACITY);
        assert!(fitted.as_str().starts_with("Theta: 1000"));
    }

    #[test]
    fn element_id_display() {
        assert_eq!(ElementId(12).to_string(), "#12");
    }
}
