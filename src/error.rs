//! Structured error types for chunkview.
//!
//! Everything fallible in the crate returns [`Result`]; the wasm boundary
//! converts into `JsValue` at the edge.

/// All errors that can occur in the navigation engine.
#[derive(Debug, thiserror::Error)]
pub enum ChunkviewError {
    /// A boundary map was requested or probed with zero measured chunks.
    /// This is a sequencing bug in the embedding, not a runtime condition:
    /// classification must complete and chunks must be rendered before any
    /// boundary math runs.
    #[error("boundary map is empty: no chunk has been measured")]
    EmptyBoundaryMap,

    /// Chunk index out of range for the current document.
    #[error("chunk index {0} out of range")]
    ChunkIndex(usize),

    /// A checklist id that is not part of the active document.
    #[error("unknown checklist: {0}")]
    UnknownChecklist(String),

    /// A second toggle was started for a checklist that already has one in
    /// flight.
    #[error("toggle already in flight for checklist {0}")]
    ToggleInFlight(String),

    /// Server rejected a checklist toggle for a reason other than the
    /// already-in-that-state conflict. Not retried.
    #[error("checklist toggle failed: {0}")]
    ToggleFailed(String),

    /// Persisted-state read/write failure.
    #[error("storage: {0}")]
    Storage(String),

    /// Catch-all.
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ChunkviewError>;

impl From<String> for ChunkviewError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for ChunkviewError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<ChunkviewError> for wasm_bindgen::JsValue {
    fn from(e: ChunkviewError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
