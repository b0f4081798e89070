//! Session: drives the engine's asynchronous operations.
//!
//! DESIGN
//! ======
//! A `Session` is a cheap, cloneable handle to one board: the engine behind
//! an `Rc<RefCell<_>>` and the idea service behind an `Rc`. Every operation
//! follows the same shape:
//!
//! 1. borrow the engine, read what the request needs, claim the targets
//!    under a fresh token, release the borrow;
//! 2. await the service with no borrow held, so the host can keep feeding
//!    pointer and key events (including undo) into the same engine;
//! 3. borrow again and re-validate against the scene as it is *now*. A
//!    target that vanished or no longer carries the token means the result
//!    is stale and is dropped.
//!
//! Service failures are logged and degrade; nothing propagates to the caller.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use canvas::doc::{Claim, NoteId};
use canvas::engine::{Action, Engine};
use canvas::merge::{MergeOutcome, MergeTicket};
use tracing::{info, warn};

use crate::service::IdeaService;

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

#[derive(Clone)]
pub struct Session {
    engine: Rc<RefCell<Engine>>,
    service: Rc<dyn IdeaService>,
}

impl Session {
    #[must_use]
    pub fn new(engine: Engine, service: Rc<dyn IdeaService>) -> Self {
        Self { engine: Rc::new(RefCell::new(engine)), service }
    }

    /// Read-only view of the engine. Drop it before awaiting anything.
    #[must_use]
    pub fn engine(&self) -> Ref<'_, Engine> {
        self.engine.borrow()
    }

    /// Run `f` against the engine with a short-lived mutable borrow.
    pub fn with_engine<T>(&self, f: impl FnOnce(&mut Engine) -> T) -> T {
        f(&mut self.engine.borrow_mut())
    }

    /// Generate notes for `topic` around the viewport center.
    ///
    /// On failure a single placeholder note says so.
    pub async fn generate_ideas(&self, topic: &str) -> Vec<NoteId> {
        info!(topic_len = topic.len(), "session: generate ideas");
        let contents = match self.service.generate_ideas(topic).await {
            Ok(ideas) => ideas,
            Err(e) => {
                warn!(error = %e, "session: idea generation failed");
                vec![format!("Couldn't generate ideas for \"{topic}\"")]
            }
        };
        let (ids, _) = self.with_engine(|engine| engine.add_generated_notes(&contents));
        info!(count = ids.len(), "session: notes generated");
        ids
    }

    /// Transform the selected notes, placing the results to their right.
    pub async fn transform_selection(&self, instruction: &str) -> Vec<NoteId> {
        let (claim, contents) = self.with_engine(|engine| {
            let ids: Vec<NoteId> = engine.selection().iter().copied().collect();
            let claim = engine.begin_processing(&ids);
            let contents: Vec<String> = claim
                .ids
                .iter()
                .filter_map(|id| engine.note(id))
                .map(|n| n.content.clone())
                .collect();
            (claim, contents)
        });
        if claim.is_empty() {
            return Vec::new();
        }
        info!(count = claim.ids.len(), "session: transform selection");

        let result = self.service.transform_notes(&contents, instruction).await;

        let released = self.with_engine(|engine| engine.finish_processing(&claim));
        if released.is_empty() {
            warn!("session: transform sources invalidated, discarding result");
            return Vec::new();
        }
        match result {
            Ok(items) => self.with_engine(|engine| engine.add_notes_beside(&released, &items).0),
            Err(e) => {
                warn!(error = %e, "session: transform failed");
                Vec::new()
            }
        }
    }

    /// Add related notes around `id`, each connected to it.
    pub async fn expand_note(&self, id: NoteId) -> Vec<NoteId> {
        let Some((claim, context)) = self.claim(id) else {
            return Vec::new();
        };
        info!(note_id = %id, "session: expand note");

        let result = self.service.generate_related_notes(&context).await;

        if !self.release(&claim) {
            warn!(note_id = %id, "session: expand source invalidated, discarding result");
            return Vec::new();
        }
        match result {
            Ok(items) => self.with_engine(|engine| engine.add_related_notes(&id, &items).0),
            Err(e) => {
                warn!(note_id = %id, error = %e, "session: expand failed");
                Vec::new()
            }
        }
    }

    /// Rewrite note `id` as an outline. Returns `true` if the content changed.
    pub async fn format_outline(&self, id: NoteId) -> bool {
        let Some((claim, content)) = self.claim(id) else {
            return false;
        };
        info!(note_id = %id, "session: format outline");

        let result = self.service.format_to_outline(&content).await;

        if !self.release(&claim) {
            warn!(note_id = %id, "session: outline target invalidated, discarding result");
            return false;
        }
        match result {
            Ok(outline) => self.with_engine(|engine| !engine.commit_text(&id, outline).is_empty()),
            Err(e) => {
                warn!(note_id = %id, error = %e, "session: outline failed, keeping original");
                false
            }
        }
    }

    /// Finish a merge the engine started on drop.
    pub async fn run_merge(&self, ticket: MergeTicket) -> MergeOutcome {
        let target_id = ticket.target_id;
        info!(target_id = %target_id, "session: merge");
        let result = self
            .service
            .merge_notes(ticket.source_content(), &ticket.target_content)
            .await;

        let (outcome, _) = match result {
            Ok(merged) => self.with_engine(|engine| engine.complete_merge(ticket, merged)),
            Err(e) => {
                warn!(target_id = %target_id, error = %e, "session: merge failed, rolling back");
                self.with_engine(|engine| engine.rollback_merge(ticket))
            }
        };
        info!(target_id = %target_id, ?outcome, "session: merge resolved");
        outcome
    }

    /// Run the asynchronous work requested by a batch of engine actions.
    pub async fn dispatch(&self, actions: Vec<Action>) -> Vec<MergeOutcome> {
        let mut outcomes = Vec::new();
        for action in actions {
            if let Action::MergeRequested(ticket) = action {
                outcomes.push(self.run_merge(ticket).await);
            }
        }
        outcomes
    }

    /// Claim `id` and return the claim with its content, or `None` if it
    /// is missing or already held.
    fn claim(&self, id: NoteId) -> Option<(Claim, String)> {
        self.with_engine(|engine| {
            let content = engine.note(&id)?.content.clone();
            let claim = engine.begin_processing(&[id]);
            (!claim.is_empty()).then_some((claim, content))
        })
    }

    /// Give `claim` back. `false` means it was invalidated meanwhile.
    fn release(&self, claim: &Claim) -> bool {
        self.with_engine(|engine| !engine.finish_processing(claim).is_empty())
    }
}
