//! Axis-aligned geometry shared by placement, collision and selection.
//!
//! Everything here works on unrotated bounding boxes in world units. Note
//! rotation is a small visual tilt, so layout deliberately ignores it; only
//! hit-testing and resizing (see [`crate::hit`] and [`crate::resize`]) are
//! rotation-aware.
//!
//! The two searches that can stall, the placement spiral and the de-overlap
//! relaxation, take their randomness from a caller-supplied [`rand::Rng`] so
//! tests can seed them.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::camera::Point;
use crate::consts::{
    FALLBACK_JITTER, RESOLVE_MAX_PASSES, SPIRAL_ANGLE_STEP, SPIRAL_BASE_RADIUS, SPIRAL_MAX_ITERATIONS,
    SPIRAL_RADIUS_PER_RAD,
};

/// An axis-aligned rectangle with a top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle spanning two arbitrary corner points.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self { x, y, width: (a.x - b.x).abs(), height: (a.y - b.y).abs() }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Inclusive intersection: rectangles that merely touch still intersect.
    #[must_use]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x <= other.right() && self.right() >= other.x && self.y <= other.bottom() && self.bottom() >= other.y
    }

    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        pt.x >= self.x && pt.x <= self.right() && pt.y >= self.y && pt.y <= self.bottom()
    }

    /// Smallest rectangle covering both `self` and `other`.
    #[must_use]
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }
}

/// Whether `a` and `b` come closer than `gap` to each other.
///
/// Strict: two rectangles exactly `gap` apart do not overlap.
#[must_use]
pub fn rects_overlap(a: &Rect, b: &Rect, gap: f64) -> bool {
    a.x < b.right() + gap && a.right() + gap > b.x && a.y < b.bottom() + gap && a.bottom() + gap > b.y
}

/// Tight bounding box of `rects`, or `None` when there are none.
pub fn bounding_box<I>(rects: I) -> Option<Rect>
where
    I: IntoIterator<Item = Rect>,
{
    rects.into_iter().reduce(|acc, r| acc.union(&r))
}

/// First position near `start` where a `width` x `height` rectangle keeps
/// `gap` clear of every rectangle in `existing`.
///
/// Tries `start` itself, then walks an Archimedean spiral around it. When
/// the spiral is exhausted the result is `start` plus random jitter, which
/// may still collide.
pub fn find_free_position<R>(width: f64, height: f64, existing: &[Rect], start: Point, gap: f64, rng: &mut R) -> Point
where
    R: Rng,
{
    let is_free = |pt: Point| {
        let candidate = Rect::new(pt.x, pt.y, width, height);
        !existing.iter().any(|r| rects_overlap(&candidate, r, gap))
    };

    if is_free(start) {
        return start;
    }

    let mut angle: f64 = 0.0;
    for _ in 0..SPIRAL_MAX_ITERATIONS {
        let radius = SPIRAL_BASE_RADIUS + angle * SPIRAL_RADIUS_PER_RAD;
        let candidate = Point::new(start.x + angle.cos() * radius, start.y + angle.sin() * radius);
        if is_free(candidate) {
            return candidate;
        }
        angle += SPIRAL_ANGLE_STEP;
    }

    tracing::debug!(width, height, existing = existing.len(), "placement spiral exhausted");
    Point::new(
        start.x + rng.random_range(-FALLBACK_JITTER..=FALLBACK_JITTER),
        start.y + rng.random_range(-FALLBACK_JITTER..=FALLBACK_JITTER),
    )
}

/// Push overlapping rectangles apart until none are closer than `gap`.
///
/// Each pass visits every unordered pair; an overlapping pair is separated
/// along the axis of smaller overlap, each side moving half the overlap.
/// Stops after a pass with no movement or after [`RESOLVE_MAX_PASSES`].
/// Returns `true` if anything moved. Not guaranteed collision-free when the
/// pass cap is hit.
pub fn resolve_overlaps<R>(rects: &mut [Rect], gap: f64, rng: &mut R) -> bool
where
    R: Rng,
{
    let mut moved_any = false;
    for _ in 0..RESOLVE_MAX_PASSES {
        let mut moved = false;
        for i in 0..rects.len() {
            for j in (i + 1)..rects.len() {
                let a = rects[i];
                let b = rects[j];
                let delta_x = b.center().x - a.center().x;
                let delta_y = b.center().y - a.center().y;
                let overlap_x = (a.width + b.width) / 2.0 + gap - delta_x.abs();
                let overlap_y = (a.height + b.height) / 2.0 + gap - delta_y.abs();
                if overlap_x <= 0.0 || overlap_y <= 0.0 {
                    continue;
                }

                if overlap_x < overlap_y {
                    let push = push_sign(delta_x, rng) * overlap_x / 2.0;
                    rects[i].x -= push;
                    rects[j].x += push;
                } else {
                    let push = push_sign(delta_y, rng) * overlap_y / 2.0;
                    rects[i].y -= push;
                    rects[j].y += push;
                }
                moved = true;
            }
        }
        if !moved {
            break;
        }
        moved_any = true;
    }
    moved_any
}

fn push_sign<R>(delta: f64, rng: &mut R) -> f64
where
    R: Rng,
{
    if delta > 0.0 {
        1.0
    } else if delta < 0.0 {
        -1.0
    } else if rng.random_bool(0.5) {
        1.0
    } else {
        -1.0
    }
}
