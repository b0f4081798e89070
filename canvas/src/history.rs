//! Linear undo/redo history over full scene snapshots.
//!
//! Every settled user-meaningful mutation appends exactly one [`Snapshot`].
//! The cursor points at the step matching the live scene; pushing after an
//! undo discards everything past the cursor, so there is never a redo branch.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use crate::doc::{Connection, Note};

/// An immutable copy of every note and connection at one point in time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    notes: Vec<Note>,
    connections: Vec<Connection>,
}

impl Snapshot {
    #[must_use]
    pub fn new(notes: Vec<Note>, connections: Vec<Connection>) -> Self {
        Self { notes, connections }
    }

    #[must_use]
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    #[must_use]
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }
}

/// Ordered steps plus a cursor at the current one.
#[derive(Debug, Clone)]
pub struct History {
    steps: Vec<Snapshot>,
    index: usize,
}

impl History {
    /// A history whose only step is `initial`.
    #[must_use]
    pub fn new(initial: Snapshot) -> Self {
        Self { steps: vec![initial], index: 0 }
    }

    /// Append a step after the cursor, discarding any redo steps.
    pub fn push(&mut self, snapshot: Snapshot) {
        self.steps.truncate(self.index + 1);
        self.steps.push(snapshot);
        self.index = self.steps.len() - 1;
        tracing::debug!(index = self.index, len = self.steps.len(), "history: step committed");
    }

    /// Move the cursor back one step and return the snapshot to restore.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        self.steps.get(self.index)
    }

    /// Move the cursor forward one step and return the snapshot to restore.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        self.steps.get(self.index)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.steps.len()
    }

    /// The step the live scene corresponds to.
    #[must_use]
    pub fn current(&self) -> Option<&Snapshot> {
        self.steps.get(self.index)
    }

    /// Cursor position.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of steps, including the initial one.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always `false`: a history holds at least its initial step.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(Snapshot::default())
    }
}
