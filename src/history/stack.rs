//! Bounded linear undo/redo over whole-state snapshots.

use std::collections::VecDeque;

/// Default number of retained entries.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Observable state of a [`HistoryStack`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HistoryState {
    /// No entries yet.
    Empty,
    /// At least one entry; the cursor marks the current one.
    Recording,
}

/// Linear history of snapshots with a cursor.
///
/// `save` discards everything after the cursor before appending, so there is
/// never a redo branch to return to. When the stack grows past its capacity
/// the oldest entries are dropped and the cursor follows the saved entry.
#[derive(Clone, Debug)]
pub struct HistoryStack<T> {
    entries: VecDeque<T>,
    cursor: usize,
    capacity: usize,
}

impl<T> Default for HistoryStack<T> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl<T> HistoryStack<T> {
    /// Empty stack retaining at most `capacity` entries (at least 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            cursor: 0,
            capacity: capacity.max(1),
        }
    }

    /// Maximum retained entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` before the first save.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the current entry, `None` when empty.
    pub fn cursor(&self) -> Option<usize> {
        (!self.entries.is_empty()).then_some(self.cursor)
    }

    /// [`HistoryState::Empty`] or [`HistoryState::Recording`].
    pub fn state(&self) -> HistoryState {
        if self.entries.is_empty() {
            HistoryState::Empty
        } else {
            HistoryState::Recording
        }
    }

    /// Entry under the cursor.
    pub fn current(&self) -> Option<&T> {
        self.entries.get(self.cursor)
    }

    /// Entries oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    /// Append `entry` after the cursor, dropping any redo tail and evicting from the front.
    pub fn save(&mut self, entry: T) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push_back(entry);
        self.cursor = self.entries.len() - 1;

        let mut evicted = 0usize;
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
            self.cursor -= 1;
            evicted += 1;
        }
        tracing::debug!(len = self.entries.len(), cursor = self.cursor, evicted, "history save");
    }

    /// An older entry exists.
    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty() && self.cursor > 0
    }

    /// A newer entry exists.
    pub fn can_redo(&self) -> bool {
        !self.entries.is_empty() && self.cursor + 1 < self.entries.len()
    }

    /// Step back and return the new current entry. `None` at the boundary.
    pub fn undo(&mut self) -> Option<&T> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    /// Step forward and return the new current entry. `None` at the boundary.
    pub fn redo(&mut self) -> Option<&T> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    /// Restore the previous entry through `restore`; the cursor moves only if it succeeds.
    ///
    /// Returns `Ok(false)` at the boundary without calling `restore`.
    pub fn undo_with<E>(&mut self, restore: impl FnOnce(&T) -> Result<(), E>) -> Result<bool, E> {
        if !self.can_undo() {
            tracing::debug!("undo at history start ignored");
            return Ok(false);
        }
        restore(&self.entries[self.cursor - 1])?;
        self.cursor -= 1;
        tracing::debug!(cursor = self.cursor, "history undo");
        Ok(true)
    }

    /// Restore the next entry through `restore`; the cursor moves only if it succeeds.
    pub fn redo_with<E>(&mut self, restore: impl FnOnce(&T) -> Result<(), E>) -> Result<bool, E> {
        if !self.can_redo() {
            tracing::debug!("redo at history end ignored");
            return Ok(false);
        }
        restore(&self.entries[self.cursor + 1])?;
        self.cursor += 1;
        tracing::debug!(cursor = self.cursor, "history redo");
        Ok(true)
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/history/stack.rs"]
mod tests;
