#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use crate::consts::{FIT_PADDING, MAX_ZOOM, MIN_ZOOM};
use crate::geometry::Rect;

/// A 2D point. Whether it is in screen or world space depends on where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// The viewport: `screen = world * zoom + pan`.
///
/// Pan is in screen pixels. `zoom` stays within [`MIN_ZOOM`, `MAX_ZOOM`].
/// Not part of undo history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { pan_x: 0.0, pan_y: 0.0, zoom: 1.0 }
    }
}

impl Camera {
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point::new((screen.x - self.pan_x) / self.zoom, (screen.y - self.pan_y) / self.zoom)
    }

    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point::new(world.x * self.zoom + self.pan_x, world.y * self.zoom + self.pan_y)
    }

    /// Length of a screen-pixel span in world units, e.g. a drag delta or handle radius.
    #[must_use]
    pub fn screen_dist_to_world(&self, screen_dist: f64) -> f64 {
        screen_dist / self.zoom
    }

    /// Translate the view by a raw screen delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    /// Multiply the zoom by `factor`, keeping the world point under `screen` fixed.
    pub fn zoom_at(&mut self, screen: Point, factor: f64) {
        let anchor = self.screen_to_world(screen);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan_x = screen.x - anchor.x * self.zoom;
        self.pan_y = screen.y - anchor.y * self.zoom;
    }

    /// Camera that centers `bounds` (plus [`FIT_PADDING`]) in a viewport of the
    /// given CSS size, never zooming in past 1.0.
    ///
    /// Falls back to the identity camera when there is nothing to fit or the
    /// viewport has no area.
    #[must_use]
    pub fn fit_to(bounds: Option<Rect>, viewport_width: f64, viewport_height: f64) -> Self {
        let Some(bounds) = bounds else {
            return Self::default();
        };
        if viewport_width <= 0.0 || viewport_height <= 0.0 {
            return Self::default();
        }
        let padded_w = bounds.width + FIT_PADDING * 2.0;
        let padded_h = bounds.height + FIT_PADDING * 2.0;
        let zoom = (viewport_width / padded_w)
            .min(viewport_height / padded_h)
            .min(1.0)
            .max(MIN_ZOOM);
        let center = bounds.center();
        Self {
            pan_x: viewport_width / 2.0 - center.x * zoom,
            pan_y: viewport_height / 2.0 - center.y * zoom,
            zoom,
        }
    }
}
