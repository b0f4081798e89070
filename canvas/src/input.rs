//! Input model: tools, modifier keys, mouse buttons, and the gesture state machine.
//!
//! This module defines the types consumed by the input engine. `Tool` and
//! `Modifiers` capture the user's intent at the time of a pointer event.
//! `InputState` is the active gesture being tracked between pointer-down and
//! pointer-up, carrying all context needed to compute incremental deltas and
//! emit final scene mutations on release.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::camera::Point;
use crate::doc::NoteId;
use crate::hit::ResizeAnchor;
use crate::snap::SnapGuides;

/// Which tool is currently active. Only ever changed by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Select, drag, resize and box-select notes (default).
    #[default]
    Select,
    /// Pan the canvas; notes are inert.
    Hand,
    /// Drag from note to note to toggle connections.
    Connect,
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Whether the event should extend or toggle the selection rather than
    /// replace it.
    #[must_use]
    pub fn additive(self) -> bool {
        self.shift || self.ctrl || self.meta
    }

    /// Ctrl on most platforms, Command on macOS.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key.
///
/// The inner string holds the key name as reported by the browser (e.g. `"Delete"`, `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    /// Key name compared case-insensitively, so `"Z"` with Shift matches `"z"`.
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.0.eq_ignore_ascii_case(name)
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// Persistent UI state visible to the renderer. Never part of history.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Currently active tool.
    pub tool: Tool,
    /// Ids of the selected notes.
    pub selection: BTreeSet<NoteId>,
    /// Alignment guides shown while a note is dragged.
    pub guides: SnapGuides,
    /// Note that will absorb the dragged note if it is released now.
    pub merge_target: Option<NoteId>,
}

/// Internal state for the input state machine.
///
/// Each active variant carries gesture context needed to compute deltas and
/// emit final actions on pointer-up.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// The user is panning the canvas.
    Panning {
        /// Screen-space position of the previous pointer event, used to compute pan delta.
        last_screen: Point,
    },
    /// The user is dragging out a selection rectangle on empty canvas.
    SelectingBox {
        /// World-space corner recorded at press time.
        start_world: Point,
        /// World-space corner following the pointer.
        current_world: Point,
        /// Whether a modifier was held, so the result is unioned with `prior`.
        additive: bool,
        /// Selection at press time.
        prior: BTreeSet<NoteId>,
    },
    /// The user is moving a note across the canvas.
    DraggingNote {
        /// Id of the note being dragged.
        id: NoteId,
        /// Screen-space pointer position at press time.
        start_screen: Point,
        /// Note x at the start of the drag, used to apply deltas or revert.
        orig_x: f64,
        /// Note y at the start of the drag, used to apply deltas or revert.
        orig_y: f64,
    },
    /// The user is resizing a note by dragging one of its eight handles.
    ResizingNote {
        /// Id of the note being resized.
        id: NoteId,
        /// Which corner/edge handle is being dragged.
        anchor: ResizeAnchor,
        /// Screen-space pointer position at the start of the resize.
        start_screen: Point,
        /// Note x at the start of the resize.
        orig_x: f64,
        /// Note y at the start of the resize.
        orig_y: f64,
        /// Note width at the start of the resize.
        orig_w: f64,
        /// Note height at the start of the resize.
        orig_h: f64,
    },
    /// The user is dragging a connection out of a note.
    Connecting {
        /// Note the drag started on.
        from: NoteId,
        /// World-space position of the free end.
        current_world: Point,
        /// Note currently under the pointer, if any, other than `from`.
        hover: Option<NoteId>,
    },
}
