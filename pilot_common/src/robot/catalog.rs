//! Routine catalog and the 1-indexed cyclic routine index.
//!
//! The catalog is fixed at startup. Indices wrap with 1-indexed modular
//! arithmetic, so every reachable index stays in `[1, len]` without any
//! boundary special-casing:
//!
//! - advance: `index = (index mod len) + 1`
//! - retreat: `index = ((index + len - 2) mod len) + 1`

use std::collections::HashSet;
use std::num::NonZeroU8;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::MAX_ROUTINES;

/// One selectable autonomous routine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineEntry {
    /// Stable identifier, used to look up the routine's behaviour.
    pub id: String,
    /// Human-readable label shown on the selector.
    pub label: String,
}

impl RoutineEntry {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Catalog construction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("routine catalog is empty")]
    Empty,

    #[error("routine catalog has {count} entries (max {max})")]
    TooMany { count: usize, max: usize },

    #[error("routine #{position} has an empty id")]
    EmptyId { position: usize },

    #[error("duplicate routine id '{0}'")]
    DuplicateId(String),
}

/// 1-based position in a [`RoutineCatalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoutineIndex(NonZeroU8);

impl RoutineIndex {
    /// The first routine; the selector's starting index.
    pub const FIRST: Self = Self(NonZeroU8::MIN);

    /// Index `value` in a catalog of `len` entries, if in range.
    pub fn new(value: u8, len: u8) -> Option<Self> {
        if value > len {
            return None;
        }
        NonZeroU8::new(value).map(Self)
    }

    #[inline]
    pub const fn get(self) -> u8 {
        self.0.get()
    }

    /// Wrap-forward successor in a catalog of `len` entries.
    ///
    /// # Panics
    ///
    /// Panics if `self` is outside `[1, len]`; that is a programming defect.
    #[must_use]
    pub fn next(self, len: u8) -> Self {
        self.assert_within(len);
        let i = u16::from(self.get());
        let n = u16::from(len);
        Self::from_wrapped((i % n) + 1, len)
    }

    /// Wrap-backward predecessor in a catalog of `len` entries.
    ///
    /// # Panics
    ///
    /// Panics if `self` is outside `[1, len]`; that is a programming defect.
    #[must_use]
    pub fn prev(self, len: u8) -> Self {
        self.assert_within(len);
        let i = u16::from(self.get());
        let n = u16::from(len);
        Self::from_wrapped(((i + n - 2) % n) + 1, len)
    }

    fn assert_within(self, len: u8) {
        assert!(
            len >= 1 && self.get() <= len,
            "routine index {} outside [1, {len}]",
            self.get()
        );
    }

    fn from_wrapped(value: u16, len: u8) -> Self {
        u8::try_from(value)
            .ok()
            .and_then(|v| Self::new(v, len))
            .unwrap_or_else(|| panic!("wrapped routine index {value} outside [1, {len}]"))
    }
}

impl std::fmt::Display for RoutineIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// Ordered, fixed-size list of selectable routines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutineCatalog {
    entries: Vec<RoutineEntry>,
}

impl RoutineCatalog {
    /// Build a catalog, validating size and id uniqueness.
    pub fn new(entries: Vec<RoutineEntry>) -> Result<Self, CatalogError> {
        if entries.is_empty() {
            return Err(CatalogError::Empty);
        }
        if entries.len() > MAX_ROUTINES {
            return Err(CatalogError::TooMany {
                count: entries.len(),
                max: MAX_ROUTINES,
            });
        }
        let mut ids = HashSet::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            if entry.id.trim().is_empty() {
                return Err(CatalogError::EmptyId {
                    position: position + 1,
                });
            }
            if !ids.insert(entry.id.as_str()) {
                return Err(CatalogError::DuplicateId(entry.id.clone()));
            }
        }
        Ok(Self { entries })
    }

    /// Number of routines (`catalogSize`), always at least 1.
    #[inline]
    pub fn len(&self) -> u8 {
        // Bounded by MAX_ROUTINES at construction.
        self.entries.len() as u8
    }

    /// Always false: construction rejects empty catalogs.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` does not belong to this catalog.
    pub fn get(&self, index: RoutineIndex) -> &RoutineEntry {
        assert!(
            index.get() <= self.len(),
            "routine index {index} outside [1, {}]",
            self.len()
        );
        &self.entries[usize::from(index.get()) - 1]
    }

    /// Index of the routine with the given id.
    pub fn position(&self, id: &str) -> Option<RoutineIndex> {
        self.entries
            .iter()
            .position(|e| e.id == id)
            .and_then(|p| RoutineIndex::new((p + 1) as u8, self.len()))
    }

    pub fn entries(&self) -> &[RoutineEntry] {
        &self.entries
    }

    /// Iterate `(index, entry)` pairs in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (RoutineIndex, &RoutineEntry)> {
        let len = self.len();
        self.entries.iter().enumerate().filter_map(move |(p, e)| {
            RoutineIndex::new((p + 1) as u8, len).map(|index| (index, e))
        })
    }
}
