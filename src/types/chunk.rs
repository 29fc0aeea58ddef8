//! Chunk identity and classification types.

use serde::{Deserialize, Serialize};

/// Semantic kind of a chunk, derived from its content by the classifier.
///
/// Never stored; recomputed whenever chunk content, the revision log, or the
/// checklist collection changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChunkKind {
    /// Plain rendered markup.
    Html,
    /// Chunk whose resolved id has an associated checklist.
    Checklist,
    /// Reader-feedback form chunk.
    Feedback,
    /// Authored but hidden from readers.
    Hidden,
    /// Document title chunk.
    Title,
    /// "Confirm you have read this" chunk.
    ReadConfirmation,
    /// Trailing "made with" watermark chunk.
    MadeByWatermark,
}

/// One entry of a document's revision log: the stable uuid of the chunk at a
/// given position in the current revision.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RevisionEntry {
    pub uuid: String,
    pub position: usize,
}

/// The revision log for the current document revision. Chunks not present in
/// the log (not yet persisted) have no resolvable id.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RevisionLog {
    pub current: Vec<RevisionEntry>,
}

impl RevisionLog {
    /// Resolve the stable id of the chunk at `position`, if the revision log
    /// knows about it.
    pub fn id_at(&self, position: usize) -> Option<&str> {
        self.current
            .iter()
            .find(|entry| entry.position == position)
            .map(|entry| entry.uuid.as_str())
    }
}

/// Identity of the document view an engine instance is bound to. Late async
/// results carrying a different identity must be discarded, never applied.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentKey {
    /// Id of the underlying document.
    pub binder_id: String,
    /// Id of the viewable (publication) actually open.
    pub viewable_id: String,
}

impl DocumentKey {
    pub fn new(binder_id: impl Into<String>, viewable_id: impl Into<String>) -> Self {
        Self {
            binder_id: binder_id.into(),
            viewable_id: viewable_id.into(),
        }
    }
}
