//! Chunk classification.
//!
//! Assigns each chunk a semantic kind by sniffing its raw markup for the
//! reserved marker attributes, and builds the index↔id lookup maps the rest
//! of the engine works with. Pure functions of their inputs; must be rerun
//! whenever chunk content, the revision log, or the checklist collection
//! changes identity.

use std::collections::HashSet;

use crate::types::{Checklist, ChunkKind, RevisionLog};

/// Marker attribute on the trailing "made with" watermark chunk.
pub const MADE_BY_CHUNK_ATTR: &str = "data-made-by";
/// Marker attribute on reader-feedback chunks.
pub const FEEDBACK_CHUNK_ATTR: &str = "data-feedback";
/// Marker attribute on chunks hidden from readers.
pub const HIDDEN_CHUNK_ATTR: &str = "data-hidden";
/// Marker attribute on the document title chunk.
pub const TITLE_CHUNK_ATTR: &str = "data-title";
/// Marker attribute on read-confirmation chunks.
pub const READ_CONFIRMATION_CHUNK_ATTR: &str = "data-read-confirmation";

/// Lookup maps derived from the raw chunk content arrays.
#[derive(Clone, Debug, Default)]
pub struct ChunkMaps {
    /// Semantic kind per chunk, in document order.
    pub kinds: Vec<ChunkKind>,
    /// Stable chunk id per index; `None` for chunks the revision log does not
    /// resolve (e.g. not yet persisted).
    pub id_by_index: Vec<Option<String>>,
    /// For each chunk, the index of the closest preceding chunk that carries
    /// at least one image (used by image-carousel UIs).
    pub image_index_by_chunk: Vec<usize>,
    /// Whether any chunk is a feedback chunk.
    pub has_feedback_chunk: bool,
}

impl ChunkMaps {
    /// Resolved id of the chunk at `index`.
    pub fn chunk_id(&self, index: usize) -> Option<&str> {
        self.id_by_index.get(index).and_then(|id| id.as_deref())
    }
}

/// Classify every chunk and build the lookup maps.
///
/// A chunk is [`ChunkKind::Checklist`] iff no higher-precedence marker
/// matched *and* its resolved id has an associated checklist. Precedence is
/// checked in marker order: watermark, feedback, hidden, title,
/// read-confirmation.
pub fn classify(
    chunks: &[Vec<String>],
    revision_log: Option<&RevisionLog>,
    checklists: Option<&[Checklist]>,
    chunk_images: &[Vec<String>],
) -> ChunkMaps {
    let id_by_index: Vec<Option<String>> = (0..chunks.len())
        .map(|index| {
            revision_log
                .and_then(|log| log.id_at(index))
                .map(str::to_owned)
        })
        .collect();

    let checklist_chunk_ids: HashSet<&str> = checklists
        .unwrap_or_default()
        .iter()
        .map(|checklist| checklist.chunk_id.as_str())
        .collect();

    let kinds: Vec<ChunkKind> = chunks
        .iter()
        .enumerate()
        .map(|(index, chunk)| {
            if has_marker(chunk, MADE_BY_CHUNK_ATTR) {
                ChunkKind::MadeByWatermark
            } else if has_marker(chunk, FEEDBACK_CHUNK_ATTR) {
                ChunkKind::Feedback
            } else if has_marker(chunk, HIDDEN_CHUNK_ATTR) {
                ChunkKind::Hidden
            } else if has_marker(chunk, TITLE_CHUNK_ATTR) {
                ChunkKind::Title
            } else if has_marker(chunk, READ_CONFIRMATION_CHUNK_ATTR) {
                ChunkKind::ReadConfirmation
            } else if id_by_index
                .get(index)
                .and_then(|id| id.as_deref())
                .is_some_and(|id| checklist_chunk_ids.contains(id))
            {
                ChunkKind::Checklist
            } else {
                ChunkKind::Html
            }
        })
        .collect();

    let has_feedback_chunk = kinds.contains(&ChunkKind::Feedback);

    ChunkMaps {
        kinds,
        id_by_index,
        image_index_by_chunk: image_indices(chunks.len(), chunk_images),
        has_feedback_chunk,
    }
}

/// True if any paragraph of the chunk carries the marker attribute.
fn has_marker(chunk: &[String], marker: &str) -> bool {
    chunk.iter().any(|paragraph| paragraph.contains(marker))
}

/// Cumulative closest-image index: chunk 0 maps to 0, every later chunk maps
/// to the count of image-carrying chunks seen so far.
fn image_indices(chunk_count: usize, chunk_images: &[Vec<String>]) -> Vec<usize> {
    let mut last_image_index = 0;
    (0..chunk_count)
        .map(|index| {
            if index == 0 {
                return 0;
            }
            if chunk_images.get(index).is_some_and(|imgs| !imgs.is_empty()) {
                last_image_index += 1;
            }
            last_image_index
        })
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::indexing_slicing)]

    use super::*;
    use crate::types::RevisionEntry;

    fn chunk(paragraphs: &[&str]) -> Vec<String> {
        paragraphs.iter().map(|p| (*p).to_owned()).collect()
    }

    fn log(entries: &[(&str, usize)]) -> RevisionLog {
        RevisionLog {
            current: entries
                .iter()
                .map(|(uuid, position)| RevisionEntry {
                    uuid: (*uuid).to_owned(),
                    position: *position,
                })
                .collect(),
        }
    }

    fn checklist(id: &str, chunk_id: &str, performed: bool) -> Checklist {
        Checklist {
            id: id.to_owned(),
            chunk_id: chunk_id.to_owned(),
            performed,
            performed_history: Vec::new(),
        }
    }

    #[test]
    fn plain_markup_is_html() {
        let chunks = vec![chunk(&["<p>hello</p>"]), chunk(&["<p>world</p>"])];
        let maps = classify(&chunks, None, None, &[]);
        assert_eq!(maps.kinds, vec![ChunkKind::Html, ChunkKind::Html]);
        assert!(!maps.has_feedback_chunk);
    }

    #[test]
    fn marker_precedence_watermark_wins() {
        // A pathological chunk carrying several markers classifies as the
        // highest-precedence one.
        let chunks = vec![chunk(&[
            "<div data-made-by data-feedback data-title></div>",
        ])];
        let maps = classify(&chunks, None, None, &[]);
        assert_eq!(maps.kinds, vec![ChunkKind::MadeByWatermark]);
    }

    #[test]
    fn marker_beats_checklist_binding() {
        let chunks = vec![chunk(&["<div data-hidden></div>"])];
        let log = log(&[("c1", 0)]);
        let checklists = vec![checklist("a", "c1", false)];
        let maps = classify(&chunks, Some(&log), Some(&checklists), &[]);
        assert_eq!(maps.kinds, vec![ChunkKind::Hidden]);
    }

    #[test]
    fn checklist_requires_resolved_id_and_binding() {
        let chunks = vec![
            chunk(&["<p>intro</p>"]),
            chunk(&["<p>step one</p>"]),
            chunk(&["<p>unpersisted</p>"]),
        ];
        // Chunk 2 has no revision log entry, so no id and no checklist kind.
        let log = log(&[("c0", 0), ("c1", 1)]);
        let checklists = vec![checklist("a", "c1", false)];
        let maps = classify(&chunks, Some(&log), Some(&checklists), &[]);
        assert_eq!(
            maps.kinds,
            vec![ChunkKind::Html, ChunkKind::Checklist, ChunkKind::Html]
        );
        assert_eq!(maps.chunk_id(1), Some("c1"));
        assert_eq!(maps.chunk_id(2), None);
    }

    #[test]
    fn image_indices_accumulate() {
        let chunks = vec![chunk(&["a"]), chunk(&["b"]), chunk(&["c"]), chunk(&["d"])];
        let images = vec![
            vec!["i0".to_owned()],
            vec![],
            vec!["i2".to_owned()],
            vec![],
        ];
        let maps = classify(&chunks, None, None, &images);
        assert_eq!(maps.image_index_by_chunk, vec![0, 0, 1, 1]);
    }

    #[test]
    fn feedback_chunk_detected() {
        let chunks = vec![chunk(&["<p>x</p>"]), chunk(&["<div data-feedback></div>"])];
        let maps = classify(&chunks, None, None, &[]);
        assert_eq!(maps.kinds[1], ChunkKind::Feedback);
        assert!(maps.has_feedback_chunk);
    }
}
