//! Shared helpers for integration tests: synthetic viewports, geometry, and
//! checklist fixtures.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use chunkview::layout::ViewportMetrics;
use chunkview::store::{KeyValueStore, MemoryStore};
use chunkview::types::{
    Checklist, ChecklistHistoryItem, ChunkRect, FixedGeometry, RevisionEntry, RevisionLog,
};

/// Memory store with shared handles, so a test can watch what a driver that
/// owns one handle persists.
#[derive(Clone, Default)]
pub struct SharedStore(Rc<RefCell<MemoryStore>>);

impl SharedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self, key: &str) -> Option<String> {
        self.0.borrow().get(key)
    }

    pub fn write(&self, key: &str, value: &str) {
        self.0.borrow_mut().set(key, value);
    }
}

impl KeyValueStore for SharedStore {
    fn get(&self, key: &str) -> Option<String> {
        self.0.borrow().get(key)
    }

    fn set(&mut self, key: &str, value: &str) {
        self.0.borrow_mut().set(key, value);
    }
}

/// A portrait viewport with no image region: the full height is text space.
pub fn text_only_viewport(height: f32, scroll_y: f32, document_height: f32) -> ViewportMetrics {
    ViewportMetrics {
        inner_width: 400.0,
        inner_height: height,
        scroll_y,
        document_height,
        image_region_height: 0.0,
    }
}

/// Uniform stack of `count` chunks `height` px tall starting at y = 0.
pub fn uniform_geometry(count: usize, height: f32) -> FixedGeometry {
    FixedGeometry::uniform(count, height, 0.0)
}

/// Geometry from explicit (top, outer, content) triples.
pub fn geometry(rects: &[(f32, f32, f32)]) -> FixedGeometry {
    FixedGeometry::new(
        rects
            .iter()
            .map(|&(offset_top, outer_height, content_height)| ChunkRect {
                offset_top,
                outer_height,
                content_height,
            })
            .collect(),
    )
}

pub fn checklist(id: &str, chunk_id: &str, performed: bool) -> Checklist {
    Checklist {
        id: id.to_owned(),
        chunk_id: chunk_id.to_owned(),
        performed,
        performed_history: Vec::new(),
    }
}

pub fn checklist_performed_by(id: &str, chunk_id: &str, performed: bool, name: &str) -> Checklist {
    Checklist {
        id: id.to_owned(),
        chunk_id: chunk_id.to_owned(),
        performed,
        performed_history: vec![ChecklistHistoryItem {
            last_performed_by_user_id: "uid-1".to_owned(),
            last_performed_by_user_name: Some(name.to_owned()),
            performed,
        }],
    }
}

/// Revision log mapping position i to the given uuid.
pub fn revision_log(uuids: &[&str]) -> RevisionLog {
    RevisionLog {
        current: uuids
            .iter()
            .enumerate()
            .map(|(position, uuid)| RevisionEntry {
                uuid: (*uuid).to_owned(),
                position,
            })
            .collect(),
    }
}

/// Plain html chunks, one paragraph each.
pub fn html_chunks(count: usize) -> Vec<Vec<String>> {
    (0..count)
        .map(|i| vec![format!("<p>chunk {i}</p>")])
        .collect()
}
