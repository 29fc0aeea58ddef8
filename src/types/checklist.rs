//! Checklist mirror types.
//!
//! The server owns checklist truth; the engine holds an optimistic local
//! mirror that is patched from toggle responses.

use serde::{Deserialize, Serialize};

/// One checklist bound to a chunk of the document.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checklist {
    pub id: String,
    /// Foreign key into the chunk's stable id.
    pub chunk_id: String,
    pub performed: bool,
    /// Performer records, most recent last.
    #[serde(default)]
    pub performed_history: Vec<ChecklistHistoryItem>,
}

/// One performer record in a checklist's history.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistHistoryItem {
    pub last_performed_by_user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_performed_by_user_name: Option<String>,
    pub performed: bool,
}

impl Checklist {
    /// Display name of the most recent performer, used when surfacing an
    /// already-in-that-state conflict.
    pub fn last_performer_name(&self) -> &str {
        self.performed_history
            .last()
            .and_then(|item| item.last_performed_by_user_name.as_deref())
            .unwrap_or("unknown")
    }
}
