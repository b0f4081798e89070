use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

use crate::camera::{Camera, Point};
use crate::consts::{
    CLICK_BOX_THRESHOLD, DEFAULT_NOTE_HEIGHT, DEFAULT_NOTE_WIDTH, MAX_NOTE_TILT_DEG, MERGE_MIN_DISTANCE,
    MERGE_SIZE_DIVISOR, MIN_NOTE_HEIGHT, MIN_NOTE_WIDTH, PLACEMENT_GAP, SNAP_THRESHOLD, ZOOM_SENSITIVITY,
};
use crate::doc::{Claim, Note, NoteColor, NoteId, Scene};
use crate::geometry::{Rect, bounding_box, find_free_position, resolve_overlaps};
use crate::hit::{HitPart, hit_test};
use crate::history::{History, Snapshot};
use crate::input::{Button, InputState, Key, Modifiers, Tool, UiState, WheelDelta};
use crate::merge::{self, MergeOutcome, MergeTicket};
use crate::resize::{MinSize, resize_note};
use crate::snap::{SnapGuides, find_merge_target, snap_position};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers and commands for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Something visible changed.
    RenderNeeded,
    /// The pointer cursor should change to the given CSS cursor name.
    SetCursor(String),
    /// The selection set changed.
    SelectionChanged,
    /// A history step was pushed; `index` is the new cursor.
    HistoryCommitted { index: usize },
    /// A note was dropped onto a merge target. The host must send the two
    /// contents to the idea service and hand the ticket back through
    /// [`Engine::complete_merge`] or [`Engine::rollback_merge`].
    MergeRequested(MergeTicket),
    /// A connection was created (`connected`) or removed.
    ConnectionToggled { from: NoteId, to: NoteId, connected: bool },
}

/// Tuned thresholds and sizes.
///
/// Every field defaults to the matching constant in [`crate::consts`].
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Snap distance in world units.
    pub snap_threshold: f64,
    /// Lower bound of the merge distance.
    pub merge_min_distance: f64,
    /// Divisor applied to the summed short sides of the two notes.
    pub merge_divisor: f64,
    /// A selection box smaller than this on both axes is a click.
    pub click_threshold: f64,
    /// Clearance kept between placed or arranged notes.
    pub placement_gap: f64,
    pub note_width: f64,
    pub note_height: f64,
    pub min_width: f64,
    pub min_height: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            snap_threshold: SNAP_THRESHOLD,
            merge_min_distance: MERGE_MIN_DISTANCE,
            merge_divisor: MERGE_SIZE_DIVISOR,
            click_threshold: CLICK_BOX_THRESHOLD,
            placement_gap: PLACEMENT_GAP,
            note_width: DEFAULT_NOTE_WIDTH,
            note_height: DEFAULT_NOTE_HEIGHT,
            min_width: MIN_NOTE_WIDTH,
            min_height: MIN_NOTE_HEIGHT,
        }
    }
}

impl EngineConfig {
    fn min_size(&self) -> MinSize {
        MinSize { width: self.min_width, height: self.min_height }
    }
}

/// The interaction engine: scene, camera, gesture state and history.
///
/// Every handler is synchronous and returns the [`Action`]s the host should
/// react to. Nothing here performs I/O.
pub struct Engine {
    pub scene: Scene,
    pub camera: Camera,
    pub ui: UiState,
    pub input: InputState,
    pub history: History,
    pub config: EngineConfig,
    pub viewport_width: f64,
    pub viewport_height: f64,
    rng: StdRng,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    /// An empty board. The history starts with one step for the empty scene.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Like [`Engine::new`] with a deterministic placement/tilt/colour source.
    #[must_use]
    pub fn with_seed(config: EngineConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: EngineConfig, rng: StdRng) -> Self {
        let scene = Scene::new();
        let history = History::new(scene.snapshot());
        Self {
            scene,
            camera: Camera::default(),
            ui: UiState::default(),
            input: InputState::default(),
            history,
            config,
            viewport_width: 0.0,
            viewport_height: 0.0,
            rng,
        }
    }

    // --- Viewport / tool ---

    /// Update the viewport size in CSS pixels.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport_width = width;
        self.viewport_height = height;
    }

    /// Switch tool. Any gesture in progress is cancelled first.
    pub fn set_tool(&mut self, tool: Tool) -> Vec<Action> {
        let mut actions = self.cancel_gesture();
        self.ui.tool = tool;
        actions.push(Action::SetCursor(tool_cursor(tool).into()));
        actions
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        if !matches!(self.input, InputState::Idle) {
            return Vec::new();
        }
        match button {
            Button::Middle => self.start_pan(screen_pt),
            Button::Secondary => Vec::new(),
            Button::Primary => match self.ui.tool {
                Tool::Hand => self.start_pan(screen_pt),
                Tool::Select => self.select_down(screen_pt, modifiers),
                Tool::Connect => self.connect_down(screen_pt),
            },
        }
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point) -> Vec<Action> {
        let world = self.camera.screen_to_world(screen_pt);
        match self.input.clone() {
            InputState::Idle => Vec::new(),
            InputState::Panning { last_screen } => {
                self.camera.pan_by(screen_pt.x - last_screen.x, screen_pt.y - last_screen.y);
                self.input = InputState::Panning { last_screen: screen_pt };
                vec![Action::RenderNeeded]
            }
            InputState::SelectingBox { start_world, additive, prior, .. } => {
                self.input = InputState::SelectingBox { start_world, current_world: world, additive, prior };
                vec![Action::RenderNeeded]
            }
            InputState::DraggingNote { id, start_screen, orig_x, orig_y } => {
                self.drag_move(id, start_screen, orig_x, orig_y, screen_pt)
            }
            InputState::ResizingNote { id, anchor, start_screen, orig_x, orig_y, orig_w, orig_h } => {
                let Some(rotation) = self.live_note(&id).map(|n| n.rotation) else {
                    return self.cancel_gesture();
                };
                let rect = resize_note(
                    anchor,
                    Rect::new(orig_x, orig_y, orig_w, orig_h),
                    rotation,
                    screen_pt.x - start_screen.x,
                    screen_pt.y - start_screen.y,
                    self.camera.zoom,
                    self.config.min_size(),
                );
                self.apply_rect(&id, rect);
                vec![Action::RenderNeeded]
            }
            InputState::Connecting { from, .. } => {
                let hover = self.note_under(world).filter(|id| *id != from);
                self.input = InputState::Connecting { from, current_world: world, hover };
                vec![Action::RenderNeeded]
            }
        }
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point) -> Vec<Action> {
        let world = self.camera.screen_to_world(screen_pt);
        let mut actions = match std::mem::take(&mut self.input) {
            InputState::Idle => return Vec::new(),
            InputState::Panning { .. } => Vec::new(),
            InputState::SelectingBox { start_world, additive, prior, .. } => {
                self.finish_box(start_world, world, additive, prior)
            }
            InputState::DraggingNote { id, orig_x, orig_y, .. } => self.finish_drag(id, orig_x, orig_y),
            InputState::ResizingNote { id, orig_x, orig_y, orig_w, orig_h, .. } => {
                let changed = self
                    .scene
                    .note(&id)
                    .is_some_and(|n| n.rect() != Rect::new(orig_x, orig_y, orig_w, orig_h));
                if changed { vec![self.commit(), Action::RenderNeeded] } else { Vec::new() }
            }
            InputState::Connecting { from, .. } => self.finish_connect(from, world),
        };
        actions.push(Action::SetCursor(tool_cursor(self.ui.tool).into()));
        actions
    }

    /// Plain wheel pans; with Ctrl/Meta held it zooms about the cursor.
    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        if modifiers.command() {
            self.camera.zoom_at(screen_pt, (-delta.dy * ZOOM_SENSITIVITY).exp());
        } else {
            self.camera.pan_by(-delta.dx, -delta.dy);
        }
        vec![Action::RenderNeeded]
    }

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        if key.is("Escape") {
            let mut actions = self.cancel_gesture();
            if !self.ui.selection.is_empty() {
                self.ui.selection.clear();
                actions.push(Action::SelectionChanged);
                actions.push(Action::RenderNeeded);
            }
            return actions;
        }
        if !matches!(self.input, InputState::Idle) {
            return Vec::new();
        }

        if modifiers.command() {
            if key.is("z") {
                return if modifiers.shift { self.redo() } else { self.undo() };
            }
            if key.is("y") {
                return self.redo();
            }
            if key.is("a") {
                return self.select_all();
            }
            return Vec::new();
        }

        if key.is("Delete") || key.is("Backspace") {
            return self.delete_selection();
        }
        if key.is("v") {
            return self.set_tool(Tool::Select);
        }
        if key.is("h") {
            return self.set_tool(Tool::Hand);
        }
        if key.is("c") {
            return self.set_tool(Tool::Connect);
        }
        Vec::new()
    }

    // --- Gestures ---

    fn start_pan(&mut self, screen_pt: Point) -> Vec<Action> {
        self.input = InputState::Panning { last_screen: screen_pt };
        vec![Action::SetCursor("grabbing".into())]
    }

    fn select_down(&mut self, screen_pt: Point, modifiers: Modifiers) -> Vec<Action> {
        let world = self.camera.screen_to_world(screen_pt);
        let additive = modifiers.additive();

        let Some(hit) = hit_test(world, &self.scene, &self.camera, &self.ui.selection) else {
            let prior = if additive { self.ui.selection.clone() } else { BTreeSet::new() };
            let mut actions = Vec::new();
            if !additive && !self.ui.selection.is_empty() {
                self.ui.selection.clear();
                actions.push(Action::SelectionChanged);
            }
            self.input = InputState::SelectingBox { start_world: world, current_world: world, additive, prior };
            actions.push(Action::RenderNeeded);
            return actions;
        };

        let Some(note) = self.live_note(&hit.note_id) else {
            return Vec::new();
        };
        let (id, x, y, width, height) = (note.id, note.x, note.y, note.width, note.height);

        if let HitPart::ResizeHandle(anchor) = hit.part {
            self.input = InputState::ResizingNote {
                id,
                anchor,
                start_screen: screen_pt,
                orig_x: x,
                orig_y: y,
                orig_w: width,
                orig_h: height,
            };
            return vec![Action::SetCursor(anchor.cursor().into())];
        }

        if additive {
            if !self.ui.selection.remove(&id) {
                self.ui.selection.insert(id);
            }
        } else if !(self.ui.selection.len() == 1 && self.ui.selection.contains(&id)) {
            self.ui.selection.clear();
            self.ui.selection.insert(id);
        }
        self.scene.bring_to_front(&id);

        let mut actions = vec![Action::SelectionChanged, Action::RenderNeeded];
        if self.ui.selection.contains(&id) {
            self.input = InputState::DraggingNote { id, start_screen: screen_pt, orig_x: x, orig_y: y };
            actions.push(Action::SetCursor("move".into()));
        }
        actions
    }

    fn drag_move(&mut self, id: NoteId, start_screen: Point, orig_x: f64, orig_y: f64, screen_pt: Point) -> Vec<Action> {
        let Some((width, height)) = self.live_note(&id).map(|n| (n.width, n.height)) else {
            return self.cancel_gesture();
        };
        let zoom = self.camera.zoom;
        let proposed = Point::new(
            orig_x + (screen_pt.x - start_screen.x) / zoom,
            orig_y + (screen_pt.y - start_screen.y) / zoom,
        );
        let (snapped, guides) = snap_position(&id, proposed, width, height, &self.scene, self.config.snap_threshold);
        let rect = Rect::new(snapped.x, snapped.y, width, height);
        self.apply_rect(&id, rect);

        self.ui.guides = guides;
        self.ui.merge_target = find_merge_target(
            &id,
            &rect,
            &self.scene,
            self.config.merge_min_distance,
            self.config.merge_divisor,
        );
        vec![Action::RenderNeeded]
    }

    fn finish_drag(&mut self, id: NoteId, orig_x: f64, orig_y: f64) -> Vec<Action> {
        self.ui.guides = SnapGuides::default();
        let target = self.ui.merge_target.take();
        let mut actions = vec![Action::RenderNeeded];

        if let Some(target) = target {
            if let Some(ticket) = merge::begin_merge(&mut self.scene, &id, &target) {
                self.ui.selection.remove(&id);
                actions.push(Action::SelectionChanged);
                actions.push(Action::MergeRequested(ticket));
                return actions;
            }
        }

        let moved = self.scene.note(&id).is_some_and(|n| n.x != orig_x || n.y != orig_y);
        if moved {
            actions.push(self.commit());
        }
        actions
    }

    fn finish_box(&mut self, start: Point, end: Point, additive: bool, prior: BTreeSet<NoteId>) -> Vec<Action> {
        let rect = Rect::from_corners(start, end);
        let threshold = self.config.click_threshold;
        let mut selection = if additive { prior } else { BTreeSet::new() };

        if rect.width >= threshold || rect.height >= threshold {
            selection.extend(
                self.scene
                    .notes()
                    .iter()
                    .filter(|n| !n.is_processing() && n.rect().intersects(&rect))
                    .map(|n| n.id),
            );
        }

        let mut actions = vec![Action::RenderNeeded];
        if selection != self.ui.selection {
            self.ui.selection = selection;
            actions.push(Action::SelectionChanged);
        }
        actions
    }

    fn connect_down(&mut self, screen_pt: Point) -> Vec<Action> {
        let world = self.camera.screen_to_world(screen_pt);
        let Some(from) = self.note_under(world) else {
            return Vec::new();
        };
        self.input = InputState::Connecting { from, current_world: world, hover: None };
        vec![Action::RenderNeeded]
    }

    fn finish_connect(&mut self, from: NoteId, world: Point) -> Vec<Action> {
        let mut actions = vec![Action::RenderNeeded];
        let Some(to) = self.note_under(world).filter(|id| *id != from) else {
            return actions;
        };
        if self.scene.is_processing(&from) {
            return actions;
        }
        if let Some(connected) = self.scene.toggle_connection(from, to) {
            tracing::debug!(from = %from, to = %to, connected, "connection toggled");
            actions.push(Action::ConnectionToggled { from, to, connected });
            actions.push(self.commit());
        }
        actions
    }

    /// Abandon the active gesture, putting a dragged or resized note back
    /// where it started. Nothing is committed.
    pub fn cancel_gesture(&mut self) -> Vec<Action> {
        let input = std::mem::take(&mut self.input);
        self.ui.guides = SnapGuides::default();
        self.ui.merge_target = None;
        match input {
            InputState::Idle => Vec::new(),
            InputState::DraggingNote { id, orig_x, orig_y, .. } => {
                if let Some(note) = self.scene.note_mut(&id) {
                    note.x = orig_x;
                    note.y = orig_y;
                }
                vec![Action::RenderNeeded]
            }
            InputState::ResizingNote { id, orig_x, orig_y, orig_w, orig_h, .. } => {
                self.apply_rect(&id, Rect::new(orig_x, orig_y, orig_w, orig_h));
                vec![Action::RenderNeeded]
            }
            InputState::Panning { .. } | InputState::SelectingBox { .. } | InputState::Connecting { .. } => {
                vec![Action::RenderNeeded]
            }
        }
    }

    // --- Commands ---

    /// Create a note centered on `world` and select it.
    pub fn create_note_at(&mut self, world: Point, content: impl Into<String>) -> Vec<Action> {
        let mut note = Note::new(
            content,
            world.x - self.config.note_width / 2.0,
            world.y - self.config.note_height / 2.0,
        );
        self.decorate(&mut note);
        let id = note.id;
        self.scene.add_note(note);
        self.ui.selection.clear();
        self.ui.selection.insert(id);
        vec![self.commit(), Action::SelectionChanged, Action::RenderNeeded]
    }

    /// Place one note per entry around the viewport center, each at the
    /// first free spot, and commit them as one step.
    pub fn add_generated_notes(&mut self, contents: &[String]) -> (Vec<NoteId>, Vec<Action>) {
        let center = self
            .camera
            .screen_to_world(Point::new(self.viewport_width / 2.0, self.viewport_height / 2.0));
        let start = Point::new(center.x - self.config.note_width / 2.0, center.y - self.config.note_height / 2.0);
        let ids = self.place_notes(contents, start);
        if ids.is_empty() {
            return (ids, Vec::new());
        }
        (ids, vec![self.commit(), Action::RenderNeeded])
    }

    /// Place notes around `source` and connect each of them to it, as one step.
    pub fn add_related_notes(&mut self, source: &NoteId, contents: &[String]) -> (Vec<NoteId>, Vec<Action>) {
        let Some(start) = self.scene.note(source).map(|n| Point::new(n.x, n.y)) else {
            return (Vec::new(), Vec::new());
        };
        let ids = self.place_notes(contents, start);
        if ids.is_empty() {
            return (ids, Vec::new());
        }
        for id in &ids {
            self.scene.add_connection(*source, *id);
        }
        (ids, vec![self.commit(), Action::RenderNeeded])
    }

    /// Place notes to the right of the bounding box of `anchors`, as one step.
    pub fn add_notes_beside(&mut self, anchors: &[NoteId], contents: &[String]) -> (Vec<NoteId>, Vec<Action>) {
        let bounds = bounding_box(anchors.iter().filter_map(|id| self.scene.note(id)).map(Note::rect));
        let Some(bounds) = bounds else {
            return (Vec::new(), Vec::new());
        };
        let start = Point::new(bounds.right() + self.config.placement_gap, bounds.y);
        let ids = self.place_notes(contents, start);
        if ids.is_empty() {
            return (ids, Vec::new());
        }
        (ids, vec![self.commit(), Action::RenderNeeded])
    }

    fn place_notes(&mut self, contents: &[String], start: Point) -> Vec<NoteId> {
        let (width, height) = (self.config.note_width, self.config.note_height);
        let mut ids = Vec::with_capacity(contents.len());
        for content in contents {
            let obstacles = self.scene.obstacle_rects();
            let pos = find_free_position(width, height, &obstacles, start, self.config.placement_gap, &mut self.rng);
            let mut note = Note::new(content.clone(), pos.x, pos.y);
            self.decorate(&mut note);
            ids.push(note.id);
            self.scene.add_note(note);
        }
        tracing::debug!(count = ids.len(), "notes placed");
        ids
    }

    fn decorate(&mut self, note: &mut Note) {
        note.width = self.config.note_width;
        note.height = self.config.note_height;
        note.rotation = self.rng.random_range(-MAX_NOTE_TILT_DEG..=MAX_NOTE_TILT_DEG);
        note.color = NoteColor::random(&mut self.rng);
    }

    /// Replace a note's text. No-op for missing or processing notes, or
    /// when the text is unchanged.
    pub fn commit_text(&mut self, id: &NoteId, content: impl Into<String>) -> Vec<Action> {
        let content = content.into();
        let Some(note) = self.scene.note_mut(id).filter(|n| !n.is_processing()) else {
            return Vec::new();
        };
        if note.content == content {
            return Vec::new();
        }
        note.content = content;
        vec![self.commit(), Action::RenderNeeded]
    }

    /// Recolour every selected, non-processing note.
    pub fn set_selection_color(&mut self, color: NoteColor) -> Vec<Action> {
        let mut changed = false;
        for id in &self.ui.selection {
            if let Some(note) = self.scene.note_mut(id).filter(|n| !n.is_processing() && n.color != color) {
                note.color = color;
                changed = true;
            }
        }
        if changed { vec![self.commit(), Action::RenderNeeded] } else { Vec::new() }
    }

    pub fn delete_note(&mut self, id: &NoteId) -> Vec<Action> {
        if self.live_note(id).is_none() {
            return Vec::new();
        }
        self.scene.remove_note(id);
        self.ui.selection.remove(id);
        vec![self.commit(), Action::SelectionChanged, Action::RenderNeeded]
    }

    /// Delete the selected notes. Processing notes stay, and stay selected.
    pub fn delete_selection(&mut self) -> Vec<Action> {
        let doomed: Vec<NoteId> = self
            .ui
            .selection
            .iter()
            .filter(|id| self.live_note(id).is_some())
            .copied()
            .collect();
        if doomed.is_empty() {
            return Vec::new();
        }
        for id in &doomed {
            self.scene.remove_note(id);
            self.ui.selection.remove(id);
        }
        tracing::debug!(count = doomed.len(), "selection deleted");
        vec![self.commit(), Action::SelectionChanged, Action::RenderNeeded]
    }

    /// Push apart overlapping notes. Processing notes neither move nor block.
    pub fn auto_arrange(&mut self) -> Vec<Action> {
        let (ids, mut rects): (Vec<NoteId>, Vec<Rect>) = self
            .scene
            .notes()
            .iter()
            .filter(|n| !n.is_processing())
            .map(|n| (n.id, n.rect()))
            .unzip();
        if !resolve_overlaps(&mut rects, self.config.placement_gap, &mut self.rng) {
            return Vec::new();
        }
        for (id, rect) in ids.iter().zip(rects) {
            self.apply_rect(id, rect);
        }
        vec![self.commit(), Action::RenderNeeded]
    }

    pub fn select_all(&mut self) -> Vec<Action> {
        let all: BTreeSet<NoteId> = self.scene.notes().iter().filter(|n| !n.is_processing()).map(|n| n.id).collect();
        if all == self.ui.selection {
            return Vec::new();
        }
        self.ui.selection = all;
        vec![Action::SelectionChanged, Action::RenderNeeded]
    }

    pub fn undo(&mut self) -> Vec<Action> {
        let Some(snapshot) = self.history.undo().cloned() else {
            return Vec::new();
        };
        self.scene.restore(&snapshot);
        tracing::debug!(index = self.history.index(), "undo");
        self.after_restore()
    }

    pub fn redo(&mut self) -> Vec<Action> {
        let Some(snapshot) = self.history.redo().cloned() else {
            return Vec::new();
        };
        self.scene.restore(&snapshot);
        tracing::debug!(index = self.history.index(), "redo");
        self.after_restore()
    }

    fn after_restore(&mut self) -> Vec<Action> {
        let mut actions = self.cancel_gesture();
        if self.prune_selection() {
            actions.push(Action::SelectionChanged);
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Frame every note in the viewport; identity when the board is empty.
    pub fn fit_view(&mut self) -> Vec<Action> {
        let bounds = bounding_box(self.scene.notes().iter().map(Note::rect));
        self.camera = Camera::fit_to(bounds, self.viewport_width, self.viewport_height);
        vec![Action::RenderNeeded]
    }

    // --- Async bookkeeping ---

    /// Mark the given notes as owned by one async operation. The returned
    /// claim lists the ids that were present and free; hand it back to
    /// [`Engine::finish_processing`] once the operation settles.
    pub fn begin_processing(&mut self, ids: &[NoteId]) -> Claim {
        self.scene.claim(ids)
    }

    /// Release the notes `claim` still holds. An id missing from the result
    /// was invalidated while the operation was in flight.
    pub fn finish_processing(&mut self, claim: &Claim) -> Vec<NoteId> {
        self.scene.release(claim)
    }

    /// Resolve a merge the service answered.
    pub fn complete_merge(&mut self, ticket: MergeTicket, merged: String) -> (MergeOutcome, Vec<Action>) {
        let outcome = merge::complete_merge(&mut self.scene, ticket, merged);
        (outcome, self.after_async(outcome))
    }

    /// Resolve a merge the service failed.
    pub fn rollback_merge(&mut self, ticket: MergeTicket) -> (MergeOutcome, Vec<Action>) {
        let outcome = merge::rollback_merge(&mut self.scene, ticket);
        (outcome, self.after_async(outcome))
    }

    fn after_async(&mut self, outcome: MergeOutcome) -> Vec<Action> {
        let mut actions = Vec::new();
        if outcome != MergeOutcome::Discarded {
            actions.push(self.commit());
        }
        if self.prune_selection() {
            actions.push(Action::SelectionChanged);
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Push the current scene as one history step.
    ///
    /// A note under an active drag or resize is recorded at its press-time
    /// geometry; the gesture commits its own step on release.
    pub fn commit(&mut self) -> Action {
        self.history.push(self.settled_snapshot());
        Action::HistoryCommitted { index: self.history.index() }
    }

    fn settled_snapshot(&self) -> Snapshot {
        let snapshot = self.scene.snapshot();
        let Some((id, origin)) = self.gesture_origin() else {
            return snapshot;
        };
        let notes = snapshot
            .notes()
            .iter()
            .map(|n| {
                if n.id == id {
                    Note { x: origin.x, y: origin.y, width: origin.width, height: origin.height, ..n.clone() }
                } else {
                    n.clone()
                }
            })
            .collect();
        Snapshot::new(notes, snapshot.connections().to_vec())
    }

    /// The note under an active drag or resize and its rect at press time.
    fn gesture_origin(&self) -> Option<(NoteId, Rect)> {
        match &self.input {
            InputState::DraggingNote { id, orig_x, orig_y, .. } => {
                let note = self.scene.note(id)?;
                Some((*id, Rect::new(*orig_x, *orig_y, note.width, note.height)))
            }
            InputState::ResizingNote { id, orig_x, orig_y, orig_w, orig_h, .. } => {
                Some((*id, Rect::new(*orig_x, *orig_y, *orig_w, *orig_h)))
            }
            InputState::Idle
            | InputState::Panning { .. }
            | InputState::SelectingBox { .. }
            | InputState::Connecting { .. } => None,
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn selection(&self) -> &BTreeSet<NoteId> {
        &self.ui.selection
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    #[must_use]
    pub fn note(&self, id: &NoteId) -> Option<&Note> {
        self.scene.note(id)
    }

    /// World rectangle of the selection box being dragged, if any.
    #[must_use]
    pub fn selection_box(&self) -> Option<Rect> {
        match &self.input {
            InputState::SelectingBox { start_world, current_world, .. } => {
                Some(Rect::from_corners(*start_world, *current_world))
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn guides(&self) -> SnapGuides {
        self.ui.guides
    }

    #[must_use]
    pub fn merge_target(&self) -> Option<NoteId> {
        self.ui.merge_target
    }

    /// Line from the source note's center to the free end of a connection drag.
    #[must_use]
    pub fn connection_preview(&self) -> Option<(Point, Point)> {
        match &self.input {
            InputState::Connecting { from, current_world, .. } => {
                self.scene.note(from).map(|n| (n.center(), *current_world))
            }
            _ => None,
        }
    }

    /// Note currently highlighted as the drop end of a connection drag.
    #[must_use]
    pub fn connection_hover(&self) -> Option<NoteId> {
        match &self.input {
            InputState::Connecting { hover, .. } => *hover,
            _ => None,
        }
    }

    // --- Helpers ---

    /// A note that exists and accepts interaction.
    fn live_note(&self, id: &NoteId) -> Option<&Note> {
        self.scene.note(id).filter(|n| !n.is_processing())
    }

    /// Top-most interactive note under `world`. A processing note on top
    /// still blocks what lies beneath it.
    fn note_under(&self, world: Point) -> Option<NoteId> {
        let hit = hit_test(world, &self.scene, &self.camera, &BTreeSet::new())?;
        self.live_note(&hit.note_id).map(|n| n.id)
    }

    fn apply_rect(&mut self, id: &NoteId, rect: Rect) {
        if let Some(note) = self.scene.note_mut(id) {
            note.x = rect.x;
            note.y = rect.y;
            note.width = rect.width;
            note.height = rect.height;
        }
    }

    /// Drop selected ids that no longer exist. Returns `true` if any were dropped.
    fn prune_selection(&mut self) -> bool {
        let before = self.ui.selection.len();
        let scene = &self.scene;
        self.ui.selection.retain(|id| scene.contains(id));
        self.ui.selection.len() != before
    }
}

fn tool_cursor(tool: Tool) -> &'static str {
    match tool {
        Tool::Select => "default",
        Tool::Hand => "grab",
        Tool::Connect => "crosshair",
    }
}
