//! Optimistic merge protocol.
//!
//! Dropping a note onto a merge target runs in three phases:
//!
//! 1. **Begin** (synchronous, on pointer-up): the source note is removed
//!    together with its connections and the target is claimed under a fresh
//!    token. A [`MergeTicket`] captures everything needed to finish or undo
//!    the merge. No history step is pushed for this intermediate state.
//! 2. **Await**: the host sends both contents to the idea service. The user
//!    keeps interacting in the meantime, so the scene may change under it.
//! 3. **Complete** or **roll back**: the result is applied against the scene
//!    as it is *now*. A target that vanished or no longer carries the
//!    ticket's token means the operation was invalidated and the result is
//!    dropped.
//!
//! Only a history restore clears a claim behind the merge's back. The
//! restored step already holds the source wherever that step had it, so an
//! invalidated merge leaves the scene alone. A later merge into the same
//! target claims it under its own token and is unaffected.
//!
//! These functions never touch history; the engine pushes one step for every
//! outcome other than [`MergeOutcome::Discarded`].

#[cfg(test)]
#[path = "merge_test.rs"]
mod merge_test;

use crate::doc::{Claim, ClaimToken, Connection, Note, NoteId, Scene};

/// Everything an in-flight merge needs once the service answers.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeTicket {
    /// Note that was dragged and optimistically removed.
    pub source: Note,
    /// Position of `source` in the scene's insertion order.
    pub source_index: usize,
    /// Note absorbing the source.
    pub target_id: NoteId,
    /// Claim on the target; the result only lands while the target holds it.
    pub token: ClaimToken,
    /// Target content at drop time, the second half of the request.
    pub target_content: String,
    /// Connections removed along with the source, for rollback.
    pub removed_connections: Vec<(usize, Connection)>,
    /// The connection list right after the removal, recorded on commit.
    pub connections_after: Vec<Connection>,
}

impl MergeTicket {
    /// Source content, the first half of the request.
    #[must_use]
    pub fn source_content(&self) -> &str {
        &self.source.content
    }
}

/// How an in-flight merge was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Merged content applied.
    Committed,
    /// The target's claim was lost during the await; nothing applied.
    Discarded,
    /// The request failed and the pre-merge scene was restored.
    RolledBack,
}

/// Start merging `source_id` into `target_id`.
///
/// Returns `None` without touching the scene when the pair is invalid: the
/// same note twice, a missing note, or either one already processing.
pub fn begin_merge(scene: &mut Scene, source_id: &NoteId, target_id: &NoteId) -> Option<MergeTicket> {
    if source_id == target_id {
        return None;
    }
    let target = scene.note(target_id)?;
    if target.is_processing() || scene.note(source_id)?.is_processing() {
        return None;
    }
    let target_content = target.content.clone();

    let removed = scene.remove_note(source_id)?;
    let token = scene.claim(&[*target_id]).token;
    tracing::debug!(source_id = %source_id, target_id = %target_id, %token, "merge: started");

    Some(MergeTicket {
        source: removed.note,
        source_index: removed.index,
        target_id: *target_id,
        token,
        target_content,
        removed_connections: removed.connections,
        connections_after: scene.connections().to_vec(),
    })
}

/// Apply a successful merge result.
///
/// Re-validates against the current scene: unless the target still holds the
/// ticket's token the result is discarded. Otherwise the target takes the
/// merged content, is raised, and the connection list computed at begin time
/// replaces the live one.
pub fn complete_merge(scene: &mut Scene, ticket: MergeTicket, merged: String) -> MergeOutcome {
    if !scene.holds(&ticket.target_id, ticket.token) {
        tracing::warn!(target_id = %ticket.target_id, "merge: claim lost during request, discarding result");
        return MergeOutcome::Discarded;
    }
    release(scene, &ticket);
    if let Some(target) = scene.note_mut(&ticket.target_id) {
        target.content = merged;
    }
    scene.bring_to_front(&ticket.target_id);
    scene.set_connections(ticket.connections_after);
    tracing::debug!(target_id = %ticket.target_id, "merge: committed");
    MergeOutcome::Committed
}

/// Undo the optimistic half of a failed merge.
///
/// Releases the target, puts the source back unless a note with its id
/// already exists, and unions the cached connections back in. A merge whose
/// claim was lost is discarded without touching the scene.
pub fn rollback_merge(scene: &mut Scene, ticket: MergeTicket) -> MergeOutcome {
    if !scene.holds(&ticket.target_id, ticket.token) {
        tracing::warn!(target_id = %ticket.target_id, "merge: claim lost during request, nothing to roll back");
        return MergeOutcome::Discarded;
    }
    release(scene, &ticket);
    let source_id = ticket.source.id;
    if !scene.restore_note(ticket.source_index, ticket.source) {
        tracing::debug!(source_id = %source_id, "merge: source already present, not restoring");
    }
    scene.union_connections(ticket.removed_connections);
    tracing::debug!(target_id = %ticket.target_id, "merge: rolled back");
    MergeOutcome::RolledBack
}

fn release(scene: &mut Scene, ticket: &MergeTicket) {
    scene.release(&Claim { token: ticket.token, ids: vec![ticket.target_id] });
}
