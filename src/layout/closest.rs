//! Active-chunk resolution.
//!
//! The active chunk is the one whose interval contains the vertical midpoint
//! of the readable text area, clamped to the first/last chunk outside the
//! mapped range.

use crate::error::{ChunkviewError, Result};
use crate::layout::{BoundaryMap, ViewportMetrics};

/// Resolve the active chunk for the current scroll position.
///
/// The probe point is `scroll_y + available_text_space / 2` — the midpoint of
/// the readable text area in absolute page coordinates.
///
/// # Errors
/// [`ChunkviewError::EmptyBoundaryMap`] on an empty map; the resolver must
/// never run before boundaries exist.
pub fn closest_chunk(
    is_landscape: bool,
    map: &BoundaryMap,
    viewport: &ViewportMetrics,
) -> Result<usize> {
    let probe = viewport.scroll_y + viewport.available_text_space(is_landscape) / 2.0;
    find_closest(map, probe)
}

/// Index of the first interval containing `probe`, clamped into `[0, N-1]`.
///
/// For any non-empty map this is total over all finite probe values: before
/// the first top resolves to 0, past the last bottom resolves to `N - 1`, and
/// a probe falling in an inter-chunk margin gap resolves to the next interval
/// below it.
pub fn find_closest(map: &BoundaryMap, probe: f32) -> Result<usize> {
    let intervals = map.intervals();
    let (Some(first), Some(last)) = (intervals.first(), intervals.last()) else {
        return Err(ChunkviewError::EmptyBoundaryMap);
    };
    if probe < first.top {
        return Ok(0);
    }
    if probe >= last.bottom {
        return Ok(intervals.len() - 1);
    }
    let found = intervals
        .iter()
        .position(|bounds| bounds.top <= probe && probe < bounds.bottom)
        // Margin gap: take the first interval starting below the probe.
        .or_else(|| intervals.iter().position(|bounds| bounds.top > probe));
    match found {
        Some(index) => Ok(index),
        None => Ok(intervals.len() - 1),
    }
}
