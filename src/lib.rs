//! chunkview - paginated chunk navigation for document readers
//!
//! Decides which paragraph-sized chunk of a document is on screen, snaps
//! scrolling to chunk boundaries, gates forward progress behind checklist
//! completion, scales fonts through pinch zoom without losing the reading
//! position, and nudges stalled readers with a twice-per-device scroll hint:
//! - Pure engine core, unit-testable with synthetic geometry
//! - Optimistic checklist mirror with server conflict recovery
//! - Explicit listener/timer teardown, nothing leaks across documents
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { ChunkNav } from 'chunkview';
//! await init();
//! const nav = new ChunkNav(rootElement, { binderId, viewableId });
//! nav.load_content(chunks, chunkImages, revisionLog, checklists);
//! nav.recalculate_boundaries();
//! ```

// Engine core
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod gate;
pub mod hint;
pub mod layout;
pub mod pinch;
pub mod scroll;
pub mod store;
pub mod types;

// DOM-bound controller (wasm32)
pub mod viewer;

use wasm_bindgen::prelude::*;

// Re-export the main controller structs
pub use engine::NavEngine;
pub use viewer::ChunkNav;

pub use types::*;

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
