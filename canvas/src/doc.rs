//! Document model: notes, connections, and the in-memory scene that owns them.
//!
//! This module defines the core data types that describe what is on the
//! canvas (`Note`, `NoteColor`, `Connection`) and the runtime store that owns
//! all live entities (`Scene`). The scene also owns the z-order counter: the
//! only way to raise a note is [`Scene::bring_to_front`], and the counter
//! never moves backwards, not even when a history snapshot is restored.
//!
//! Notes are kept in insertion order so that a snapshot taken and restored
//! later compares element-for-element equal. The renderer reads
//! [`Scene::sorted_notes`] for draw order.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::camera::Point;
use crate::consts::{DEFAULT_NOTE_HEIGHT, DEFAULT_NOTE_WIDTH};
use crate::geometry::Rect;
use crate::history::Snapshot;

/// Unique identifier for a note.
pub type NoteId = Uuid;

/// Unique identifier for a connection.
pub type ConnectionId = Uuid;

/// Identifies one asynchronous operation holding notes.
pub type ClaimToken = Uuid;

/// Notes marked processing by one asynchronous operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    /// Token written into every claimed note.
    pub token: ClaimToken,
    /// Notes that were free and are now held, in request order.
    pub ids: Vec<NoteId>,
}

impl Claim {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// The fixed note palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteColor {
    #[default]
    Yellow,
    Pink,
    Blue,
    Green,
    Purple,
    Orange,
    Teal,
    Gray,
}

impl NoteColor {
    /// Every palette entry, in display order.
    pub const ALL: [NoteColor; 8] = [
        Self::Yellow,
        Self::Pink,
        Self::Blue,
        Self::Green,
        Self::Purple,
        Self::Orange,
        Self::Teal,
        Self::Gray,
    ];

    /// Fill color as a CSS hex string.
    #[must_use]
    pub fn hex(self) -> &'static str {
        match self {
            Self::Yellow => "#FEF3A0",
            Self::Pink => "#FBC4D8",
            Self::Blue => "#BFDDFC",
            Self::Green => "#C8EFC2",
            Self::Purple => "#DCCBFA",
            Self::Orange => "#FDD5AE",
            Self::Teal => "#B5EAE4",
            Self::Gray => "#E3E3E0",
        }
    }

    /// A uniformly chosen palette entry.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

/// A positioned, rotated rectangle of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Unique identifier for this note.
    pub id: NoteId,
    /// Text content.
    pub content: String,
    /// Left edge in world coordinates.
    pub x: f64,
    /// Top edge in world coordinates.
    pub y: f64,
    /// Width in world units.
    pub width: f64,
    /// Height in world units.
    pub height: f64,
    /// Clockwise visual tilt in degrees around the note center.
    pub rotation: f64,
    /// Palette color.
    pub color: NoteColor,
    /// Stacking order; higher values are drawn above lower values.
    pub z_index: i64,
    /// Token of the asynchronous operation that owns this note, if any.
    #[serde(default)]
    pub processing: Option<ClaimToken>,
}

impl Note {
    /// A default-sized, untilted yellow note with a fresh id at `(x, y)`.
    ///
    /// The z-index is assigned when the note is added to a [`Scene`].
    #[must_use]
    pub fn new(content: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            x,
            y,
            width: DEFAULT_NOTE_WIDTH,
            height: DEFAULT_NOTE_HEIGHT,
            rotation: 0.0,
            color: NoteColor::default(),
            z_index: 0,
            processing: None,
        }
    }

    /// Whether an asynchronous operation owns this note.
    #[must_use]
    pub fn is_processing(&self) -> bool {
        self.processing.is_some()
    }

    /// Unrotated bounding box.
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    #[must_use]
    pub fn center(&self) -> Point {
        self.rect().center()
    }
}

/// An undirected edge between two notes.
///
/// `from_id` / `to_id` preserve the order the user drew it in, but every
/// query treats the pair as unordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub id: ConnectionId,
    pub from_id: NoteId,
    pub to_id: NoteId,
}

impl Connection {
    #[must_use]
    pub fn new(from_id: NoteId, to_id: NoteId) -> Self {
        Self { id: Uuid::new_v4(), from_id, to_id }
    }

    /// Whether this connection links `a` and `b`, in either direction.
    #[must_use]
    pub fn joins(&self, a: &NoteId, b: &NoteId) -> bool {
        (self.from_id == *a && self.to_id == *b) || (self.from_id == *b && self.to_id == *a)
    }

    /// Whether `id` is one of the endpoints.
    #[must_use]
    pub fn touches(&self, id: &NoteId) -> bool {
        self.from_id == *id || self.to_id == *id
    }
}

/// A note taken out of a [`Scene`], with enough context to put it back.
#[derive(Debug, Clone, PartialEq)]
pub struct Removed {
    /// Position the note held in insertion order.
    pub index: usize,
    /// The note itself.
    pub note: Note,
    /// Cascade-removed connections, each with its former list index.
    pub connections: Vec<(usize, Connection)>,
}

/// In-memory store of notes and connections.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    notes: Vec<Note>,
    connections: Vec<Connection>,
    z_counter: i64,
}

impl Scene {
    /// Create an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Notes ---

    /// All notes in insertion order.
    #[must_use]
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    #[must_use]
    pub fn note(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == *id)
    }

    pub fn note_mut(&mut self, id: &NoteId) -> Option<&mut Note> {
        self.notes.iter_mut().find(|n| n.id == *id)
    }

    #[must_use]
    pub fn contains(&self, id: &NoteId) -> bool {
        self.note(id).is_some()
    }

    /// Whether `id` exists and is currently owned by an async operation.
    #[must_use]
    pub fn is_processing(&self, id: &NoteId) -> bool {
        self.note(id).is_some_and(Note::is_processing)
    }

    /// Whether `id` exists and is held by the operation behind `token`.
    #[must_use]
    pub fn holds(&self, id: &NoteId, token: ClaimToken) -> bool {
        self.note(id).is_some_and(|n| n.processing == Some(token))
    }

    /// Mark every present, free note in `ids` as held by a fresh token.
    pub fn claim(&mut self, ids: &[NoteId]) -> Claim {
        let token = Uuid::new_v4();
        let mut claimed = Vec::new();
        for id in ids {
            if let Some(note) = self.note_mut(id).filter(|n| !n.is_processing()) {
                note.processing = Some(token);
                claimed.push(*id);
            }
        }
        Claim { token, ids: claimed }
    }

    /// Release the notes still held by `claim`. Returns their ids; a missing
    /// id was deleted, restored from history or re-claimed in the meantime.
    pub fn release(&mut self, claim: &Claim) -> Vec<NoteId> {
        let mut released = Vec::new();
        for id in &claim.ids {
            if let Some(note) = self.note_mut(id).filter(|n| n.processing == Some(claim.token)) {
                note.processing = None;
                released.push(*id);
            }
        }
        released
    }

    /// Add a note on top of everything else. Returns `false` (and leaves the
    /// scene untouched) if a note with the same id already exists.
    pub fn add_note(&mut self, mut note: Note) -> bool {
        if self.contains(&note.id) {
            return false;
        }
        note.z_index = self.next_z();
        self.notes.push(note);
        true
    }

    /// Re-insert a previously removed note at its old position in insertion
    /// order, keeping its z-index. Does nothing if a note with that id is
    /// already present.
    pub fn restore_note(&mut self, index: usize, note: Note) -> bool {
        if self.contains(&note.id) {
            return false;
        }
        self.z_counter = self.z_counter.max(note.z_index);
        let index = index.min(self.notes.len());
        self.notes.insert(index, note);
        true
    }

    /// Remove a note along with every connection touching it.
    pub fn remove_note(&mut self, id: &NoteId) -> Option<Removed> {
        let index = self.notes.iter().position(|n| n.id == *id)?;
        let note = self.notes.remove(index);
        let mut connections = Vec::new();
        let mut kept = Vec::with_capacity(self.connections.len());
        for (i, connection) in self.connections.drain(..).enumerate() {
            if connection.touches(id) {
                connections.push((i, connection));
            } else {
                kept.push(connection);
            }
        }
        self.connections = kept;
        Some(Removed { index, note, connections })
    }

    /// Raise a note above every other note. Returns `false` if it doesn't exist.
    pub fn bring_to_front(&mut self, id: &NoteId) -> bool {
        if !self.contains(id) {
            return false;
        }
        let z = self.next_z();
        if let Some(note) = self.note_mut(id) {
            note.z_index = z;
        }
        true
    }

    /// Highest z-index ever handed out.
    #[must_use]
    pub fn z_counter(&self) -> i64 {
        self.z_counter
    }

    fn next_z(&mut self) -> i64 {
        self.z_counter += 1;
        self.z_counter
    }

    /// Notes sorted bottom-to-top for drawing. Among equal z-indexes the
    /// later-inserted note is drawn on top.
    #[must_use]
    pub fn sorted_notes(&self) -> Vec<&Note> {
        let mut notes: Vec<&Note> = self.notes.iter().collect();
        notes.sort_by_key(|n| n.z_index);
        notes
    }

    /// Bounding boxes of every note that takes part in collision, i.e. all
    /// notes not currently processing.
    #[must_use]
    pub fn obstacle_rects(&self) -> Vec<Rect> {
        self.notes
            .iter()
            .filter(|n| !n.is_processing())
            .map(Note::rect)
            .collect()
    }

    /// Number of notes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// Returns `true` if the scene contains no notes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    // --- Connections ---

    /// All connections in insertion order.
    #[must_use]
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// The connection linking `a` and `b`, in either direction.
    #[must_use]
    pub fn connection_between(&self, a: &NoteId, b: &NoteId) -> Option<&Connection> {
        self.connections.iter().find(|c| c.joins(a, b))
    }

    /// Connect two existing, distinct notes unless they are already connected.
    pub fn add_connection(&mut self, from: NoteId, to: NoteId) -> Option<ConnectionId> {
        if from == to || !self.contains(&from) || !self.contains(&to) {
            return None;
        }
        if self.connection_between(&from, &to).is_some() {
            return None;
        }
        let connection = Connection::new(from, to);
        let id = connection.id;
        self.connections.push(connection);
        Some(id)
    }

    /// Create the edge `a`–`b` if absent, remove it if present.
    ///
    /// Returns `Some(true)` when created, `Some(false)` when removed, and
    /// `None` when the pair is invalid (same note or a missing endpoint).
    pub fn toggle_connection(&mut self, a: NoteId, b: NoteId) -> Option<bool> {
        if a == b || !self.contains(&a) || !self.contains(&b) {
            return None;
        }
        if let Some(index) = self.connections.iter().position(|c| c.joins(&a, &b)) {
            self.connections.remove(index);
            return Some(false);
        }
        self.connections.push(Connection::new(a, b));
        Some(true)
    }

    /// Replace the connection list wholesale, dropping entries whose
    /// endpoints no longer exist.
    pub fn set_connections(&mut self, connections: Vec<Connection>) {
        self.connections = connections;
        self.prune_dangling_connections();
    }

    /// Add back cascade-removed connections that aren't already present (by
    /// id or by endpoint pair) and whose endpoints both exist.
    ///
    /// Each entry carries its index in the list it was removed from; entries
    /// go back in ascending index order so an otherwise untouched list comes
    /// out exactly as it was.
    pub fn union_connections(&mut self, mut cached: Vec<(usize, Connection)>) {
        cached.sort_by_key(|(i, _)| *i);
        for (index, connection) in cached {
            let duplicate = self
                .connections
                .iter()
                .any(|c| c.id == connection.id || c.joins(&connection.from_id, &connection.to_id));
            if !duplicate {
                let index = index.min(self.connections.len());
                self.connections.insert(index, connection);
            }
        }
        self.prune_dangling_connections();
    }

    /// Drop connections that reference a missing note. Returns how many were dropped.
    pub fn prune_dangling_connections(&mut self) -> usize {
        let before = self.connections.len();
        let notes = &self.notes;
        self.connections
            .retain(|c| notes.iter().any(|n| n.id == c.from_id) && notes.iter().any(|n| n.id == c.to_id));
        before - self.connections.len()
    }

    // --- Snapshots ---

    /// Capture the committed scene as an immutable history step.
    ///
    /// Claim tokens are cleared in the copy: they mark in-flight work,
    /// which a restored snapshot must never resurrect.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let notes = self
            .notes
            .iter()
            .map(|n| Note { processing: None, ..n.clone() })
            .collect();
        Snapshot::new(notes, self.connections.clone())
    }

    /// Replace all notes and connections with a history snapshot.
    ///
    /// The z counter is only ever raised, so a restored scene can't hand out
    /// a z-index that was already used.
    pub fn restore(&mut self, snapshot: &Snapshot) {
        self.notes = snapshot.notes().to_vec();
        self.connections = snapshot.connections().to_vec();
        let max_z = self.notes.iter().map(|n| n.z_index).max().unwrap_or(0);
        self.z_counter = self.z_counter.max(max_z);
    }
}
