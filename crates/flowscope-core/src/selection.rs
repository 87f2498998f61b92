//! Selection channels carried by selectable objects.
//!
//! Each selectable object holds a [`SelectorHandle`], a single-slot channel.
//! The viewer subscribes to every handle found in the scene and reacts to the
//! latest message: a [`SelectionEvent`] selects its target, a clear message
//! drops the current selection. Producers may publish on the same handle to
//! drive the selection programmatically.

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::object::ObjectId;

/// How an object was interacted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionKind {
    Clicked,
    Hovered,
}

/// An interaction with a selectable object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionEvent {
    pub target: ObjectId,
    pub kind: SelectionKind,
}

/// A message read from a selection channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSignal {
    Select(SelectionEvent),
    Clear,
}

impl From<Option<SelectionEvent>> for SelectionSignal {
    fn from(event: Option<SelectionEvent>) -> Self {
        event.map_or(SelectionSignal::Clear, SelectionSignal::Select)
    }
}

/// Cloneable handle on a single-slot selection channel.
///
/// A newer message overwrites one that has not been read yet. Clones share
/// the slot and compare equal.
#[derive(Debug, Clone, Default)]
pub struct SelectorHandle {
    slot: Arc<Mutex<Option<SelectionSignal>>>,
}

impl SelectorHandle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes a selection (`Some`) or a clear (`None`).
    pub fn emit(&self, event: Option<SelectionEvent>) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(event.into());
    }

    pub fn select(&self, target: ObjectId, kind: SelectionKind) {
        self.emit(Some(SelectionEvent { target, kind }));
    }

    pub fn clear(&self) {
        self.emit(None);
    }

    /// Takes the pending message, if any.
    #[must_use]
    pub fn take(&self) -> Option<SelectionSignal> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Returns true when both handles share one channel.
    #[must_use]
    pub fn same_channel(&self, other: &SelectorHandle) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }
}

impl PartialEq for SelectorHandle {
    fn eq(&self, other: &Self) -> bool {
        self.same_channel(other)
    }
}

impl Eq for SelectorHandle {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_slot_keeps_latest() {
        let handle = SelectorHandle::new();
        let target = ObjectId::from_raw(7);
        handle.select(target, SelectionKind::Hovered);
        handle.select(target, SelectionKind::Clicked);
        assert!(handle.is_pending());
        assert_eq!(
            handle.take(),
            Some(SelectionSignal::Select(SelectionEvent {
                target,
                kind: SelectionKind::Clicked
            }))
        );
        assert_eq!(handle.take(), None);

        handle.clear();
        assert_eq!(handle.take(), Some(SelectionSignal::Clear));
    }

    #[test]
    fn test_clones_share_channel() {
        let a = SelectorHandle::new();
        let b = a.clone();
        assert_eq!(a, b);
        assert_ne!(a, SelectorHandle::new());
        b.clear();
        assert_eq!(a.take(), Some(SelectionSignal::Clear));
    }
}
