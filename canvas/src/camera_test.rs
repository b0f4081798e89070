#![allow(clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-10;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn point_approx_eq(a: Point, b: Point) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

// --- Point ---

#[test]
fn point_distance_is_euclidean() {
    let a = Point::new(0.0, 0.0);
    let b = Point::new(3.0, 4.0);
    assert!(approx_eq(a.distance(b), 5.0));
    assert!(approx_eq(b.distance(a), 5.0));
}

// --- Camera defaults ---

#[test]
fn camera_default_is_identity() {
    let cam = Camera::default();
    assert_eq!(cam.pan_x, 0.0);
    assert_eq!(cam.pan_y, 0.0);
    assert_eq!(cam.zoom, 1.0);
}

// --- screen_to_world / world_to_screen ---

#[test]
fn screen_to_world_with_zoom() {
    let cam = Camera { pan_x: 0.0, pan_y: 0.0, zoom: 4.0 };
    let world = cam.screen_to_world(Point::new(40.0, 80.0));
    assert!(point_approx_eq(world, Point::new(10.0, 20.0)));
}

#[test]
fn screen_to_world_with_pan_and_zoom() {
    let cam = Camera { pan_x: 20.0, pan_y: 10.0, zoom: 2.0 };
    // (s - pan) / zoom: (20-20)/2 = 0, (10-10)/2 = 0
    let world = cam.screen_to_world(Point::new(20.0, 10.0));
    assert!(point_approx_eq(world, Point::new(0.0, 0.0)));
}

#[test]
fn screen_to_world_origin() {
    let cam = Camera { pan_x: 50.0, pan_y: 30.0, zoom: 2.0 };
    let world = cam.screen_to_world(Point::new(0.0, 0.0));
    assert!(point_approx_eq(world, Point::new(-25.0, -15.0)));
}

#[test]
fn world_to_screen_with_pan_and_zoom() {
    let cam = Camera { pan_x: 20.0, pan_y: 10.0, zoom: 3.0 };
    let screen = cam.world_to_screen(Point::new(5.0, 5.0));
    assert!(point_approx_eq(screen, Point::new(35.0, 25.0)));
}

#[test]
fn round_trip_fractional_zoom() {
    let cam = Camera { pan_x: 13.7, pan_y: -42.3, zoom: 0.75 };
    let world = Point::new(333.3, -999.9);
    let back = cam.screen_to_world(cam.world_to_screen(world));
    assert!(point_approx_eq(world, back));
}

#[test]
fn screen_dist_to_world_ignores_pan() {
    let cam = Camera { pan_x: 999.0, pan_y: -999.0, zoom: 4.0 };
    assert!(approx_eq(cam.screen_dist_to_world(8.0), 2.0));
}

// --- pan_by ---

#[test]
fn pan_by_adds_raw_delta() {
    let mut cam = Camera { pan_x: 10.0, pan_y: 10.0, zoom: 2.0 };
    cam.pan_by(5.0, -15.0);
    assert_eq!(cam.pan_x, 15.0);
    assert_eq!(cam.pan_y, -5.0);
    assert_eq!(cam.zoom, 2.0);
}

// --- zoom_at ---

#[test]
fn zoom_at_keeps_anchor_fixed() {
    let mut cam = Camera { pan_x: 40.0, pan_y: -20.0, zoom: 1.0 };
    let screen = Point::new(300.0, 200.0);
    let before = cam.screen_to_world(screen);
    cam.zoom_at(screen, 2.0);
    assert!(approx_eq(cam.zoom, 2.0));
    let after = cam.screen_to_world(screen);
    assert!(point_approx_eq(before, after));
}

#[test]
fn zoom_at_clamps_to_max() {
    let mut cam = Camera::default();
    cam.zoom_at(Point::new(0.0, 0.0), 1000.0);
    assert_eq!(cam.zoom, MAX_ZOOM);
}

#[test]
fn zoom_at_clamps_to_min() {
    let mut cam = Camera::default();
    cam.zoom_at(Point::new(0.0, 0.0), 0.0001);
    assert_eq!(cam.zoom, MIN_ZOOM);
}

// --- fit_to ---

#[test]
fn fit_to_nothing_is_identity() {
    let cam = Camera::fit_to(None, 800.0, 600.0);
    assert_eq!(cam, Camera::default());
}

#[test]
fn fit_to_zero_viewport_is_identity() {
    let cam = Camera::fit_to(Some(Rect::new(0.0, 0.0, 100.0, 100.0)), 0.0, 600.0);
    assert_eq!(cam, Camera::default());
}

#[test]
fn fit_to_small_content_never_upscales() {
    let cam = Camera::fit_to(Some(Rect::new(0.0, 0.0, 100.0, 100.0)), 800.0, 600.0);
    assert_eq!(cam.zoom, 1.0);
    // Content center (50, 50) lands on viewport center.
    let center = cam.world_to_screen(Point::new(50.0, 50.0));
    assert!(point_approx_eq(center, Point::new(400.0, 300.0)));
}

#[test]
fn fit_to_large_content_scales_down() {
    let bounds = Rect::new(-1000.0, -500.0, 3800.0, 1000.0);
    let cam = Camera::fit_to(Some(bounds), 800.0, 600.0);
    // Padded width 4000 -> 800 / 4000 = 0.2 is tighter than 600 / 1200.
    assert!(approx_eq(cam.zoom, 0.2));
    let center = cam.world_to_screen(bounds.center());
    assert!(point_approx_eq(center, Point::new(400.0, 300.0)));
}

#[test]
fn fit_to_padded_bounds_are_visible() {
    let bounds = Rect::new(200.0, 100.0, 1200.0, 900.0);
    let cam = Camera::fit_to(Some(bounds), 1024.0, 768.0);
    let top_left = cam.world_to_screen(Point::new(bounds.x, bounds.y));
    let bottom_right = cam.world_to_screen(Point::new(bounds.right(), bounds.bottom()));
    assert!(top_left.x >= 0.0 && top_left.y >= 0.0);
    assert!(bottom_right.x <= 1024.0 && bottom_right.y <= 768.0);
}
