//! Anchored, rotation-aware resize math.
//!
//! The pointer delta arrives in screen space. It is scaled into world units,
//! then rotated into the note's local (unrotated) axes before being applied
//! to width and height, so dragging the east handle of a tilted note grows it
//! along its own x axis. When a west or north edge moves, the stored
//! top-left position shifts by the size change re-rotated into world space
//! so the opposite edge stays put.

#[cfg(test)]
#[path = "resize_test.rs"]
mod resize_test;

use crate::geometry::Rect;
use crate::hit::ResizeAnchor;

/// Minimum width and height a resize may produce.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinSize {
    pub width: f64,
    pub height: f64,
}

/// Geometry of a note after dragging `anchor` by a screen delta.
///
/// `orig` is the note's rectangle when the gesture began and `rotation_deg`
/// its tilt. The result is always computed from the gesture start, never
/// incrementally, so rounding never accumulates.
#[must_use]
pub fn resize_note(
    anchor: ResizeAnchor,
    orig: Rect,
    rotation_deg: f64,
    screen_dx: f64,
    screen_dy: f64,
    zoom: f64,
    min: MinSize,
) -> Rect {
    let dx = screen_dx / zoom;
    let dy = screen_dy / zoom;
    let (sin, cos) = rotation_deg.to_radians().sin_cos();
    let local_dx = dx * cos + dy * sin;
    let local_dy = -dx * sin + dy * cos;

    let mut out = orig;

    if anchor.east() {
        out.width = (orig.width + local_dx).max(min.width);
    }
    if anchor.west() {
        out.width = (orig.width - local_dx).max(min.width);
        let dw = out.width - orig.width;
        out.x -= dw * cos;
        out.y -= dw * sin;
    }
    if anchor.south() {
        out.height = (orig.height + local_dy).max(min.height);
    }
    if anchor.north() {
        out.height = (orig.height - local_dy).max(min.height);
        let dh = out.height - orig.height;
        out.x += dh * sin;
        out.y -= dh * cos;
    }

    out
}
