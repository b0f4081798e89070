#![allow(clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-9;

const MIN: MinSize = MinSize { width: 120.0, height: 80.0 };

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn orig() -> Rect {
    Rect::new(100.0, 100.0, 200.0, 150.0)
}

#[test]
fn east_grows_width_only() {
    let out = resize_note(ResizeAnchor::E, orig(), 0.0, 30.0, 17.0, 1.0, MIN);
    assert_eq!(out.width, 230.0);
    assert_eq!(out.height, 150.0);
    assert_eq!(out.x, 100.0);
    assert_eq!(out.y, 100.0);
}

#[test]
fn west_shrinks_width_and_shifts_x() {
    let out = resize_note(ResizeAnchor::W, orig(), 0.0, 30.0, 0.0, 1.0, MIN);
    assert!(approx_eq(out.width, 170.0));
    let dw = out.width - 200.0;
    assert!(approx_eq(out.x, 100.0 - dw));
    assert!(approx_eq(out.y, 100.0));
    // Right edge stays fixed.
    assert!(approx_eq(out.right(), 300.0));
}

#[test]
fn south_grows_height_only() {
    let out = resize_note(ResizeAnchor::S, orig(), 0.0, 50.0, 40.0, 1.0, MIN);
    assert_eq!(out.width, 200.0);
    assert_eq!(out.height, 190.0);
    assert_eq!((out.x, out.y), (100.0, 100.0));
}

#[test]
fn north_keeps_bottom_edge_fixed() {
    let out = resize_note(ResizeAnchor::N, orig(), 0.0, 0.0, -20.0, 1.0, MIN);
    assert!(approx_eq(out.height, 170.0));
    assert!(approx_eq(out.y, 80.0));
    assert!(approx_eq(out.bottom(), 250.0));
}

#[test]
fn corner_applies_both_axes() {
    let out = resize_note(ResizeAnchor::Nw, orig(), 0.0, -10.0, -20.0, 1.0, MIN);
    assert!(approx_eq(out.width, 210.0));
    assert!(approx_eq(out.height, 170.0));
    assert!(approx_eq(out.x, 90.0));
    assert!(approx_eq(out.y, 80.0));
}

#[test]
fn delta_is_scaled_by_zoom() {
    let out = resize_note(ResizeAnchor::E, orig(), 0.0, 40.0, 0.0, 2.0, MIN);
    assert!(approx_eq(out.width, 220.0));
}

#[test]
fn width_and_height_clamp_to_minimum() {
    let out = resize_note(ResizeAnchor::Se, orig(), 0.0, -1000.0, -1000.0, 1.0, MIN);
    assert_eq!(out.width, MIN.width);
    assert_eq!(out.height, MIN.height);
}

#[test]
fn west_clamp_limits_position_shift() {
    let out = resize_note(ResizeAnchor::W, orig(), 0.0, 1000.0, 0.0, 1.0, MIN);
    assert_eq!(out.width, MIN.width);
    // Only the clamped 80 units of shrink move the left edge.
    assert!(approx_eq(out.x, 180.0));
}

#[test]
fn rotated_delta_maps_into_local_axes() {
    // At 90 degrees the note's local x axis points down the screen.
    let out = resize_note(ResizeAnchor::E, orig(), 90.0, 0.0, 25.0, 1.0, MIN);
    assert!(approx_eq(out.width, 225.0));
    assert!(approx_eq(out.height, 150.0));

    // Horizontal movement is perpendicular to local x and changes nothing.
    let out = resize_note(ResizeAnchor::E, orig(), 90.0, 25.0, 0.0, 1.0, MIN);
    assert!(approx_eq(out.width, 200.0));
}

#[test]
fn rotated_west_shift_follows_rotation() {
    let out = resize_note(ResizeAnchor::W, orig(), 90.0, 0.0, -30.0, 1.0, MIN);
    // Moving up at 90 degrees is moving "west" locally: width grows by 30.
    assert!(approx_eq(out.width, 230.0));
    // Re-rotated into world space, the 30 unit shift lands entirely on y.
    assert!(approx_eq(out.x, 100.0));
    assert!(approx_eq(out.y, 70.0));
}
