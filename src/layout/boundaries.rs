//! Boundary map: where each chunk sits along the scroll axis.
//!
//! Measured from rendered chunk containers once per layout-affecting change
//! (font factor, orientation, content, resize). Consumers must never read a
//! map that predates the currently rendered content.

use crate::error::{ChunkviewError, Result};
use crate::layout::viewport::{ViewportMetrics, SQUARE_ASPECT_TOP_CORRECTION};
use crate::types::ChunkGeometry;

/// Pixel interval one chunk occupies along the scroll axis.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct ChunkBounds {
    pub top: f32,
    pub bottom: f32,
}

/// Ordered `[top, bottom]` intervals, one per rendered chunk, in document
/// order. Tops are monotonically non-decreasing; adjacent intervals may touch
/// or overlap slightly through margins but never regress.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundaryMap {
    intervals: Vec<ChunkBounds>,
}

impl BoundaryMap {
    /// Measure every rendered chunk container into a fresh map.
    ///
    /// In the near-square viewport regime each top is shifted by
    /// [`SQUARE_ASPECT_TOP_CORRECTION`] to compensate for the distinct layout
    /// rule there.
    ///
    /// # Errors
    /// [`ChunkviewError::EmptyBoundaryMap`] when no chunk has been rendered —
    /// a sequencing bug, classification must complete before measurement.
    pub fn measure(geometry: &dyn ChunkGeometry, viewport: &ViewportMetrics) -> Result<Self> {
        let count = geometry.chunk_count();
        if count == 0 {
            return Err(ChunkviewError::EmptyBoundaryMap);
        }
        let correction = if viewport.is_squared() {
            SQUARE_ASPECT_TOP_CORRECTION
        } else {
            0.0
        };
        let mut intervals = Vec::with_capacity(count);
        for index in 0..count {
            let Some(rect) = geometry.chunk_rect(index) else {
                break;
            };
            intervals.push(ChunkBounds {
                top: rect.offset_top - correction,
                bottom: rect.offset_top + rect.outer_height,
            });
        }
        if intervals.is_empty() {
            return Err(ChunkviewError::EmptyBoundaryMap);
        }
        Ok(Self { intervals })
    }

    /// Build a map directly from intervals. Test seam; `measure` is the
    /// production path.
    pub fn from_intervals(intervals: Vec<ChunkBounds>) -> Self {
        Self { intervals }
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<ChunkBounds> {
        self.intervals.get(index).copied()
    }

    pub fn intervals(&self) -> &[ChunkBounds] {
        &self.intervals
    }

    /// Cheap equivalence used to skip redundant downstream churn after a
    /// remeasure: same length, same first bottom, same last bottom. An
    /// intentional approximation, not a deep compare.
    pub fn roughly_equals(&self, other: &BoundaryMap) -> bool {
        if self.intervals.len() != other.intervals.len() {
            return false;
        }
        let ends = |map: &BoundaryMap| {
            Some((map.intervals.first()?.bottom, map.intervals.last()?.bottom))
        };
        match (ends(self), ends(other)) {
            (Some((first_a, last_a)), Some((first_b, last_b))) => {
                (first_a - first_b).abs() < f32::EPSILON && (last_a - last_b).abs() < f32::EPSILON
            }
            (None, None) => true,
            _ => false,
        }
    }
}
