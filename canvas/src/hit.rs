#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use std::collections::BTreeSet;

use crate::camera::{Camera, Point};
use crate::consts::HANDLE_RADIUS_PX;
use crate::doc::{Note, NoteId, Scene};

/// Which part of a note was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ResizeHandle(ResizeAnchor),
}

/// Anchor position for resize handles, named by the edge or corner dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeAnchor {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl ResizeAnchor {
    pub const ALL: [ResizeAnchor; 8] = [
        Self::N,
        Self::Ne,
        Self::E,
        Self::Se,
        Self::S,
        Self::Sw,
        Self::W,
        Self::Nw,
    ];

    /// Whether dragging this handle moves the west (left) edge.
    #[must_use]
    pub fn west(self) -> bool {
        matches!(self, Self::W | Self::Nw | Self::Sw)
    }

    /// Whether dragging this handle moves the east (right) edge.
    #[must_use]
    pub fn east(self) -> bool {
        matches!(self, Self::E | Self::Ne | Self::Se)
    }

    /// Whether dragging this handle moves the north (top) edge.
    #[must_use]
    pub fn north(self) -> bool {
        matches!(self, Self::N | Self::Ne | Self::Nw)
    }

    /// Whether dragging this handle moves the south (bottom) edge.
    #[must_use]
    pub fn south(self) -> bool {
        matches!(self, Self::S | Self::Se | Self::Sw)
    }

    /// Handle position relative to the note center, in unrotated local axes.
    #[must_use]
    pub fn local_offset(self, width: f64, height: f64) -> Point {
        let x = if self.west() {
            -width / 2.0
        } else if self.east() {
            width / 2.0
        } else {
            0.0
        };
        let y = if self.north() {
            -height / 2.0
        } else if self.south() {
            height / 2.0
        } else {
            0.0
        };
        Point::new(x, y)
    }

    /// CSS cursor shown while hovering or dragging this handle.
    #[must_use]
    pub fn cursor(self) -> &'static str {
        match self {
            Self::N | Self::S => "ns-resize",
            Self::E | Self::W => "ew-resize",
            Self::Ne | Self::Sw => "nesw-resize",
            Self::Nw | Self::Se => "nwse-resize",
        }
    }
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub note_id: NoteId,
    pub part: HitPart,
}

/// Express `world_pt` in the note's local frame: origin at the note center,
/// axes rotated with the note.
#[must_use]
pub fn to_local(note: &Note, world_pt: Point) -> Point {
    let center = note.center();
    let dx = world_pt.x - center.x;
    let dy = world_pt.y - center.y;
    let (sin, cos) = (-note.rotation).to_radians().sin_cos();
    Point::new(dx * cos - dy * sin, dx * sin + dy * cos)
}

/// Test which note (if any) is under `world_pt`.
///
/// Resize handles of a lone selected note win over bodies; bodies are
/// checked top-most first. Processing notes still block the pointer, and the
/// caller decides to ignore them.
#[must_use]
pub fn hit_test(world_pt: Point, scene: &Scene, camera: &Camera, selection: &BTreeSet<NoteId>) -> Option<Hit> {
    if selection.len() == 1 {
        let selected = selection.iter().next().and_then(|id| scene.note(id));
        if let Some(note) = selected.filter(|n| !n.is_processing()) {
            if let Some(anchor) = hit_handle(note, world_pt, camera) {
                return Some(Hit { note_id: note.id, part: HitPart::ResizeHandle(anchor) });
            }
        }
    }

    scene
        .sorted_notes()
        .into_iter()
        .rev()
        .find(|note| hit_body(note, world_pt))
        .map(|note| Hit { note_id: note.id, part: HitPart::Body })
}

/// Whether `world_pt` falls inside the note's rotated rectangle.
#[must_use]
pub fn hit_body(note: &Note, world_pt: Point) -> bool {
    let local = to_local(note, world_pt);
    local.x.abs() <= note.width / 2.0 && local.y.abs() <= note.height / 2.0
}

fn hit_handle(note: &Note, world_pt: Point, camera: &Camera) -> Option<ResizeAnchor> {
    let local = to_local(note, world_pt);
    let slop = camera.screen_dist_to_world(HANDLE_RADIUS_PX);
    ResizeAnchor::ALL
        .into_iter()
        .find(|anchor| local.distance(anchor.local_offset(note.width, note.height)) <= slop)
}
