use super::*;
use crate::doc::{Connection, Note};

fn step(contents: &[&str]) -> Snapshot {
    let notes: Vec<Note> = contents.iter().map(|c| Note::new(*c, 0.0, 0.0)).collect();
    let connections = notes
        .windows(2)
        .map(|pair| Connection::new(pair[0].id, pair[1].id))
        .collect();
    Snapshot::new(notes, connections)
}

#[test]
fn new_history_has_single_step() {
    let history = History::default();
    assert_eq!(history.len(), 1);
    assert_eq!(history.index(), 0);
    assert!(!history.can_undo());
    assert!(!history.can_redo());
    assert!(!history.is_empty());
}

#[test]
fn push_advances_cursor() {
    let mut history = History::default();
    history.push(step(&["a"]));
    history.push(step(&["a", "b"]));
    assert_eq!(history.len(), 3);
    assert_eq!(history.index(), 2);
    assert!(history.can_undo());
    assert!(!history.can_redo());
}

#[test]
fn undo_at_start_is_none() {
    let mut history = History::default();
    assert!(history.undo().is_none());
    assert_eq!(history.index(), 0);
}

#[test]
fn redo_at_end_is_none() {
    let mut history = History::default();
    history.push(step(&["a"]));
    assert!(history.redo().is_none());
    assert_eq!(history.index(), 1);
}

#[test]
fn undo_returns_previous_step() {
    let first = step(&["a"]);
    let mut history = History::new(first.clone());
    history.push(step(&["a", "b"]));
    assert_eq!(history.undo(), Some(&first));
}

#[test]
fn undo_then_redo_restores_identical_step() {
    let mut history = History::default();
    let steps = [step(&["a"]), step(&["a", "b"]), step(&["a", "b", "c"])];
    for s in &steps {
        history.push(s.clone());
    }
    for _ in 0..3 {
        let before = history.current().cloned();
        history.undo();
        let redone = history.redo().cloned();
        assert_eq!(redone, before);
        history.undo();
    }
    assert_eq!(history.index(), 0);
}

#[test]
fn push_after_undo_discards_forward_steps() {
    let mut history = History::default();
    history.push(step(&["a"]));
    history.push(step(&["a", "b"]));
    history.push(step(&["a", "b", "c"]));
    history.undo();
    history.undo();
    history.push(step(&["z"]));
    assert_eq!(history.len(), history.index() + 1);
    assert_eq!(history.len(), 3);
    assert!(!history.can_redo());
}

#[test]
fn snapshot_accessors_expose_contents() {
    let s = step(&["a", "b"]);
    assert_eq!(s.notes().len(), 2);
    assert_eq!(s.connections().len(), 1);
    assert!(s.connections()[0].joins(&s.notes()[1].id, &s.notes()[0].id));
}
