#![allow(clippy::float_cmp)]

use super::*;

fn scene_with(notes: Vec<Note>) -> Scene {
    let mut scene = Scene::new();
    for note in notes {
        scene.add_note(note);
    }
    scene
}

fn note_at(x: f64, y: f64, w: f64, h: f64) -> Note {
    let mut note = Note::new("n", x, y);
    note.width = w;
    note.height = h;
    note
}

// =============================================================
// snap_position
// =============================================================

#[test]
fn no_neighbours_no_snap() {
    let dragged = note_at(0.0, 0.0, 100.0, 100.0);
    let scene = scene_with(vec![dragged.clone()]);
    let (pos, guides) = snap_position(&dragged.id, Point::new(33.0, 44.0), 100.0, 100.0, &scene, 12.0);
    assert_eq!(pos, Point::new(33.0, 44.0));
    assert!(guides.is_empty());
}

#[test]
fn left_edge_snaps_to_left_edge() {
    let dragged = note_at(0.0, 0.0, 100.0, 100.0);
    let other = note_at(200.0, 500.0, 150.0, 100.0);
    let scene = scene_with(vec![dragged.clone(), other]);
    let (pos, guides) = snap_position(&dragged.id, Point::new(207.0, 0.0), 100.0, 100.0, &scene, 12.0);
    assert_eq!(pos.x, 200.0);
    assert_eq!(guides.vertical, Some(200.0));
}

#[test]
fn right_edge_snaps_to_left_edge() {
    let dragged = note_at(0.0, 0.0, 100.0, 100.0);
    let other = note_at(200.0, 500.0, 100.0, 100.0);
    let scene = scene_with(vec![dragged.clone(), other]);
    // Right edge at 195 is 5 short of the other's left edge.
    let (pos, guides) = snap_position(&dragged.id, Point::new(95.0, 0.0), 100.0, 100.0, &scene, 12.0);
    assert_eq!(pos.x, 100.0);
    assert_eq!(guides.vertical, Some(200.0));
}

#[test]
fn top_and_bottom_snap_independently() {
    let dragged = note_at(0.0, 0.0, 100.0, 100.0);
    let other = note_at(600.0, 300.0, 100.0, 100.0);
    let scene = scene_with(vec![dragged.clone(), other]);
    // Bottom edge 392 is 8 short of the other's bottom at 400.
    let (pos, guides) = snap_position(&dragged.id, Point::new(0.0, 292.0), 100.0, 100.0, &scene, 12.0);
    assert_eq!(pos.y, 300.0);
    assert_eq!(guides.horizontal, Some(400.0));
    assert!(guides.vertical.is_none());
}

#[test]
fn nearest_edge_wins() {
    let dragged = note_at(0.0, 0.0, 100.0, 100.0);
    let far = note_at(210.0, 800.0, 50.0, 50.0);
    let near = note_at(203.0, -800.0, 50.0, 50.0);
    let scene = scene_with(vec![dragged.clone(), far, near]);
    let (pos, guides) = snap_position(&dragged.id, Point::new(201.0, 0.0), 100.0, 100.0, &scene, 12.0);
    assert_eq!(pos.x, 203.0);
    assert_eq!(guides.vertical, Some(203.0));
}

#[test]
fn threshold_is_exclusive() {
    let dragged = note_at(0.0, 0.0, 100.0, 100.0);
    let other = note_at(200.0, 500.0, 100.0, 100.0);
    let scene = scene_with(vec![dragged.clone(), other]);
    let (pos, guides) = snap_position(&dragged.id, Point::new(212.0, 0.0), 100.0, 100.0, &scene, 12.0);
    assert_eq!(pos.x, 212.0);
    assert!(guides.vertical.is_none());
}

#[test]
fn processing_notes_do_not_attract() {
    let dragged = note_at(0.0, 0.0, 100.0, 100.0);
    let mut other = note_at(200.0, 500.0, 100.0, 100.0);
    other.processing = Some(uuid::Uuid::new_v4());
    let scene = scene_with(vec![dragged.clone(), other]);
    let (pos, guides) = snap_position(&dragged.id, Point::new(205.0, 0.0), 100.0, 100.0, &scene, 12.0);
    assert_eq!(pos.x, 205.0);
    assert!(guides.is_empty());
}

// =============================================================
// merge detection
// =============================================================

#[test]
fn merge_threshold_has_floor() {
    let dragged = Rect::new(0.0, 0.0, 100.0, 100.0);
    let other = note_at(0.0, 0.0, 100.0, 100.0);
    assert_eq!(merge_threshold(&dragged, &other, 80.0, 4.0), 80.0);
}

#[test]
fn merge_threshold_grows_with_size() {
    let dragged = Rect::new(0.0, 0.0, 400.0, 500.0);
    let other = note_at(0.0, 0.0, 600.0, 400.0);
    // (400 + 400) / 4
    assert_eq!(merge_threshold(&dragged, &other, 80.0, 4.0), 200.0);
}

#[test]
fn merge_target_found_within_threshold() {
    let dragged = note_at(0.0, 0.0, 200.0, 200.0);
    let target = note_at(50.0, 40.0, 200.0, 200.0);
    let target_id = target.id;
    let scene = scene_with(vec![dragged.clone(), target]);
    let found = find_merge_target(&dragged.id, &dragged.rect(), &scene, 80.0, 4.0);
    assert_eq!(found, Some(target_id));
}

#[test]
fn merge_target_none_when_far() {
    let dragged = note_at(0.0, 0.0, 200.0, 200.0);
    let other = note_at(150.0, 0.0, 200.0, 200.0);
    let scene = scene_with(vec![dragged.clone(), other]);
    assert!(find_merge_target(&dragged.id, &dragged.rect(), &scene, 80.0, 4.0).is_none());
}

#[test]
fn merge_target_skips_self_and_processing() {
    let dragged = note_at(0.0, 0.0, 200.0, 200.0);
    let mut busy = note_at(10.0, 10.0, 200.0, 200.0);
    busy.processing = Some(uuid::Uuid::new_v4());
    let scene = scene_with(vec![dragged.clone(), busy]);
    assert!(find_merge_target(&dragged.id, &dragged.rect(), &scene, 80.0, 4.0).is_none());
}

#[test]
fn merge_target_prefers_topmost() {
    let dragged = note_at(0.0, 0.0, 200.0, 200.0);
    let lower = note_at(5.0, 5.0, 200.0, 200.0);
    let upper = note_at(10.0, 10.0, 200.0, 200.0);
    let upper_id = upper.id;
    let scene = scene_with(vec![dragged.clone(), lower, upper]);
    assert_eq!(find_merge_target(&dragged.id, &dragged.rect(), &scene, 80.0, 4.0), Some(upper_id));
}
