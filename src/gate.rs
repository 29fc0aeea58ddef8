//! Checklist progress gate.
//!
//! Holds the optimistic local mirror of the document's checklists, decides
//! when forward scrolling must be blocked, and reconciles toggle responses
//! from the server — including the already-in-that-state conflict, which is
//! recoverable: a concurrent actor reached the desired end state first, so
//! the authoritative checklist is merged and a notice names them.

use std::collections::HashSet;

use crate::classify::ChunkMaps;
use crate::error::{ChunkviewError, Result};
use crate::types::{Checklist, DocumentKey};

/// Server response to a toggle request, fed back into the gate by the
/// embedding's transport.
#[derive(Clone, Debug)]
pub enum ToggleResponse {
    /// The toggle was applied; the updated checklist is authoritative.
    Updated(Checklist),
    /// A concurrent actor already put the checklist in the requested state.
    /// Carries the authoritative checklist including its performer history.
    AlreadyInThatState(Checklist),
    /// Any other rejection. Propagated, never retried.
    Failed(String),
}

/// A toggle accepted by [`ChecklistGate::begin_toggle`], waiting for its
/// server response. Captures the document identity so a response that
/// arrives after the document changed is discarded instead of applied.
#[derive(Clone, Debug)]
pub struct PendingToggle {
    pub checklist_id: String,
    pub performed: bool,
    document: DocumentKey,
}

/// Outcome of resolving a toggle response against the mirror.
#[derive(Clone, Debug)]
pub enum ToggleApplied {
    /// The mirror was patched with the authoritative checklist.
    Applied {
        checklist: Checklist,
        /// Name of the concurrent performer when the response was the
        /// already-in-that-state conflict.
        conflict_with: Option<String>,
    },
    /// The response belongs to a previously active document; nothing was
    /// mutated.
    StaleDocument,
}

/// User-facing and analytics notices emitted by the gate, drained by the
/// engine after each entry point.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GateNotice {
    /// Forward progress was just blocked; surface a transient warning.
    ProgressBlocked,
    /// The blocking warning no longer applies.
    ProgressWarningCleared,
    /// A toggle collided with a concurrent actor; informational, names them.
    ChecklistConflict {
        last_performer: String,
        performed: bool,
    },
    /// The last unperformed checklist of the document was just performed.
    ChecklistCompleted,
}

/// The progress gate for one open document view.
pub struct ChecklistGate {
    document: DocumentKey,
    progress_block_enabled: bool,
    checklists: Vec<Checklist>,
    in_flight: HashSet<String>,
    warning_shown: bool,
    notices: Vec<GateNotice>,
}

impl ChecklistGate {
    pub fn new(document: DocumentKey, progress_block_enabled: bool) -> Self {
        Self {
            document,
            progress_block_enabled,
            checklists: Vec::new(),
            in_flight: HashSet::new(),
            warning_shown: false,
            notices: Vec::new(),
        }
    }

    /// Replace the mirror with a freshly loaded collection.
    pub fn load(&mut self, checklists: Vec<Checklist>) {
        self.checklists = checklists;
    }

    pub fn checklists(&self) -> &[Checklist] {
        &self.checklists
    }

    pub fn checklist_by_chunk_id(&self, chunk_id: &str) -> Option<&Checklist> {
        self.checklists.iter().find(|c| c.chunk_id == chunk_id)
    }

    /// Checklist bound to the chunk at `index`, if any.
    pub fn checklist_for_chunk(&self, maps: &ChunkMaps, index: usize) -> Option<&Checklist> {
        let chunk_id = maps.chunk_id(index)?;
        self.checklist_by_chunk_id(chunk_id)
    }

    /// True once every checklist is performed. The collection is then
    /// read-only until the server resets it for a new run.
    pub fn is_reset(&self) -> bool {
        !self.checklists.is_empty() && self.checklists.iter().all(|c| c.performed)
    }

    pub fn warning_shown(&self) -> bool {
        self.warning_shown
    }

    /// Index of the first chunk, in document order, whose checklist is
    /// unperformed. Recomputed as a pure scan over current state — never
    /// patched incrementally, so a checklist flipping back to unperformed
    /// behind the current index is tolerated.
    pub fn blocking_chunk_index(&self, maps: &ChunkMaps) -> Option<usize> {
        (0..maps.id_by_index.len()).find(|&index| {
            self.checklist_for_chunk(maps, index)
                .is_some_and(|c| !c.performed)
        })
    }

    /// Decide whether a forward move past the current chunk must be blocked.
    ///
    /// Blocks iff progress blocking is enabled for the account, checklists
    /// exist, the reader is at the bottom of the viewport, the current chunk
    /// is not the last one, and the checklist bound to the current chunk is
    /// unperformed. The first blocking decision of an attempt emits
    /// [`GateNotice::ProgressBlocked`].
    pub fn should_block_scroll(
        &mut self,
        maps: &ChunkMaps,
        closest: usize,
        chunk_count: usize,
        at_bottom: bool,
    ) -> bool {
        let unperformed = self
            .checklist_for_chunk(maps, closest)
            .is_some_and(|c| !c.performed);
        let not_last = closest + 1 < chunk_count;
        let gate_active = self.progress_block_enabled && !self.checklists.is_empty();
        if gate_active && at_bottom && not_last && unperformed {
            if !self.warning_shown {
                self.warning_shown = true;
                self.notices.push(GateNotice::ProgressBlocked);
            }
            return true;
        }
        false
    }

    /// Clear the blocking warning, e.g. when the active chunk changes.
    pub fn hide_progress_warning(&mut self) {
        if self.warning_shown {
            self.warning_shown = false;
            self.notices.push(GateNotice::ProgressWarningCleared);
        }
    }

    /// Start a toggle. Returns `Ok(None)` (silent no-op) when no checklists
    /// are loaded or the collection is fully performed and awaiting a server
    /// reset.
    ///
    /// When the toggle would perform the last unperformed checklist,
    /// [`GateNotice::ChecklistCompleted`] is recorded here, from the
    /// pre-toggle mirror. Two near-simultaneous final toggles can therefore
    /// both record completion; deduplication is left to the analytics
    /// backend, which sees the authoritative order.
    ///
    /// # Errors
    /// [`ChunkviewError::UnknownChecklist`] for an id outside the document,
    /// [`ChunkviewError::ToggleInFlight`] when this id already has an
    /// unresolved toggle.
    pub fn begin_toggle(
        &mut self,
        checklist_id: &str,
        performed: bool,
    ) -> Result<Option<PendingToggle>> {
        if self.checklists.is_empty() || self.is_reset() {
            return Ok(None);
        }
        if !self.checklists.iter().any(|c| c.id == checklist_id) {
            return Err(ChunkviewError::UnknownChecklist(checklist_id.to_owned()));
        }
        if !self.in_flight.insert(checklist_id.to_owned()) {
            return Err(ChunkviewError::ToggleInFlight(checklist_id.to_owned()));
        }
        if performed {
            let all_others_performed = self
                .checklists
                .iter()
                .filter(|c| c.id != checklist_id)
                .all(|c| c.performed);
            if all_others_performed {
                self.notices.push(GateNotice::ChecklistCompleted);
            }
        }
        Ok(Some(PendingToggle {
            checklist_id: checklist_id.to_owned(),
            performed,
            document: self.document.clone(),
        }))
    }

    /// Resolve a server response for a pending toggle. Responses are applied
    /// in the order they resolve; a conflict always wins over the stale
    /// optimistic assumption.
    ///
    /// # Errors
    /// [`ChunkviewError::ToggleFailed`] for any rejection other than the
    /// already-in-that-state conflict.
    pub fn resolve_toggle(
        &mut self,
        pending: PendingToggle,
        response: ToggleResponse,
    ) -> Result<ToggleApplied> {
        self.in_flight.remove(&pending.checklist_id);
        if pending.document != self.document {
            return Ok(ToggleApplied::StaleDocument);
        }
        match response {
            ToggleResponse::Updated(checklist) => {
                self.patch(&checklist);
                Ok(ToggleApplied::Applied {
                    checklist,
                    conflict_with: None,
                })
            }
            ToggleResponse::AlreadyInThatState(checklist) => {
                let last_performer = checklist.last_performer_name().to_owned();
                self.patch(&checklist);
                self.notices.push(GateNotice::ChecklistConflict {
                    last_performer: last_performer.clone(),
                    performed: pending.performed,
                });
                Ok(ToggleApplied::Applied {
                    checklist,
                    conflict_with: Some(last_performer),
                })
            }
            ToggleResponse::Failed(reason) => Err(ChunkviewError::ToggleFailed(reason)),
        }
    }

    /// Take the notices accumulated since the last drain.
    pub fn drain_notices(&mut self) -> Vec<GateNotice> {
        std::mem::take(&mut self.notices)
    }

    fn patch(&mut self, authoritative: &Checklist) {
        if let Some(local) = self.checklists.iter_mut().find(|c| c.id == authoritative.id) {
            *local = authoritative.clone();
        }
    }
}
