//! Alignment guides and merge-target detection for a dragged note.
//!
//! Both run on every pointer-move of a select-mode note drag, in that order:
//! the proposed position is snapped first, and merge detection sees the
//! snapped result. Processing notes are invisible to both.

#[cfg(test)]
#[path = "snap_test.rs"]
mod snap_test;

use crate::camera::Point;
use crate::doc::{Note, NoteId, Scene};
use crate::geometry::Rect;

/// Alignment lines for the renderer, at most one per axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SnapGuides {
    /// World x of a vertical guide line.
    pub vertical: Option<f64>,
    /// World y of a horizontal guide line.
    pub horizontal: Option<f64>,
}

impl SnapGuides {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertical.is_none() && self.horizontal.is_none()
    }
}

/// Best correction found so far on one axis.
#[derive(Clone, Copy)]
struct AxisSnap {
    delta: f64,
    guide: f64,
}

/// Snap a `width` x `height` note proposed at `proposed` to the nearest edges of
/// the other notes in `scene`.
///
/// On each axis the dragged note's two edges are compared against both edges
/// of every other non-processing note. The smallest correction under
/// `threshold` wins; among equal corrections the last one found wins. The
/// returned guides mark the edge that was aligned to.
#[must_use]
pub fn snap_position(
    dragged_id: &NoteId,
    proposed: Point,
    width: f64,
    height: f64,
    scene: &Scene,
    threshold: f64,
) -> (Point, SnapGuides) {
    let mut best_x: Option<AxisSnap> = None;
    let mut best_y: Option<AxisSnap> = None;

    for other in scene.notes().iter().filter(|n| n.id != *dragged_id && !n.is_processing()) {
        let other_rect = other.rect();
        for edge in [other_rect.x, other_rect.right()] {
            for own in [proposed.x, proposed.x + width] {
                consider(&mut best_x, edge - own, edge, threshold);
            }
        }
        for edge in [other_rect.y, other_rect.bottom()] {
            for own in [proposed.y, proposed.y + height] {
                consider(&mut best_y, edge - own, edge, threshold);
            }
        }
    }

    let snapped = Point::new(
        proposed.x + best_x.map_or(0.0, |s| s.delta),
        proposed.y + best_y.map_or(0.0, |s| s.delta),
    );
    let guides = SnapGuides { vertical: best_x.map(|s| s.guide), horizontal: best_y.map(|s| s.guide) };
    (snapped, guides)
}

fn consider(best: &mut Option<AxisSnap>, delta: f64, guide: f64, threshold: f64) {
    if delta.abs() >= threshold {
        return;
    }
    if best.is_none_or(|b| delta.abs() <= b.delta.abs()) {
        *best = Some(AxisSnap { delta, guide });
    }
}

/// Center distance under which `other` absorbs a dragged note of size `dragged`.
#[must_use]
pub fn merge_threshold(dragged: &Rect, other: &Note, min_distance: f64, divisor: f64) -> f64 {
    let dragged_short = dragged.width.min(dragged.height);
    let other_short = other.width.min(other.height);
    min_distance.max((dragged_short + other_short) / divisor)
}

/// The first non-processing note, top-most first, whose center lies within
/// [`merge_threshold`] of the dragged note's center.
#[must_use]
pub fn find_merge_target(
    dragged_id: &NoteId,
    dragged: &Rect,
    scene: &Scene,
    min_distance: f64,
    divisor: f64,
) -> Option<NoteId> {
    let center = dragged.center();
    scene
        .sorted_notes()
        .into_iter()
        .rev()
        .filter(|n| n.id != *dragged_id && !n.is_processing())
        .find(|n| center.distance(n.center()) < merge_threshold(dragged, n, min_distance, divisor))
        .map(|n| n.id)
}
