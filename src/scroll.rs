//! Discrete chunk-to-chunk scroll planning.
//!
//! All functions here compute scroll targets from injected geometry and the
//! boundary map; performing the scroll (and smooth animation) is the
//! embedding's job. Chunks taller than the available text space are traversed
//! in partial steps before the index advances, so very long chunks read
//! correctly screen by screen.

use crate::layout::{BoundaryMap, ViewportMetrics};
use crate::types::{ChunkGeometry, ChunkRect};

/// Share of the available text space covered by one partial step inside an
/// over-tall chunk.
const SCROLL_STEP_RATIO: f32 = 0.9;

/// Bottom padding reserved under chunk content, in viewport-height percent.
const BOTTOM_PADDING_CHUNK_CONTENT_VH: f32 = 15.0;

/// Slack added to the current scroll position when testing whether an
/// over-tall chunk still has content left to traverse.
const LONG_CHUNK_SCROLL_SLACK: f32 = 5.0;

/// Fixed nudge applied by the arrow keys.
pub const KEYBOARD_SCROLL_OFFSET: f32 = 80.0;

/// Direction of a discrete move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

/// An absolute vertical scroll the embedding should perform.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollCommand {
    pub top: f32,
    pub smooth: bool,
}

impl ScrollCommand {
    fn smooth(top: f32) -> Self {
        Self { top, smooth: true }
    }

    fn instant(top: f32) -> Self {
        Self { top, smooth: false }
    }
}

/// Scroll target that puts `rect` on screen: centered when it fits in the
/// available space, top-aligned when it does not. Moving up into a tall
/// chunk lands at its end instead of its top.
pub fn snap_target(rect: ChunkRect, available_space: f32, direction: ScrollDirection) -> f32 {
    if available_space <= rect.outer_height {
        return match direction {
            ScrollDirection::Down => rect.offset_top,
            ScrollDirection::Up => {
                rect.offset_top + rect.content_height - available_space / 2.0
            }
        };
    }
    let chunk_center = rect.offset_top + rect.outer_height / 2.0;
    chunk_center - available_space / 2.0
}

/// Instant re-snap to the chunk at `index` (clamped to the last chunk), used
/// after layout-affecting changes. Snapping to the first chunk is a no-op —
/// scrolling the container there reads as the text jumping.
pub fn plan_snap(
    geometry: &dyn ChunkGeometry,
    index: usize,
    viewport: &ViewportMetrics,
    is_landscape: bool,
) -> Option<ScrollCommand> {
    let count = geometry.chunk_count();
    if count == 0 {
        return None;
    }
    let index = index.min(count - 1);
    if index == 0 {
        return None;
    }
    let rect = geometry.chunk_rect(index)?;
    let space = viewport.available_text_space(is_landscape);
    Some(ScrollCommand::instant(snap_target(
        rect,
        space,
        ScrollDirection::Down,
    )))
}

/// Plan a forward move from the active chunk.
///
/// Inside a chunk taller than the text space, steps
/// [`SCROLL_STEP_RATIO`] × space at a time, clamped to the chunk's true
/// boundary; only once the chunk is fully traversed does the move advance to
/// the next chunk. Returns `None` at the end of the document.
pub fn plan_next(
    geometry: &dyn ChunkGeometry,
    map: &BoundaryMap,
    closest: usize,
    viewport: &ViewportMetrics,
    is_landscape: bool,
) -> Option<ScrollCommand> {
    let space = viewport.available_text_space(is_landscape);
    let rect = geometry.chunk_rect(closest)?;

    let padding_factor = (100.0 - BOTTOM_PADDING_CHUNK_CONTENT_VH) / 100.0;
    if padding_factor * rect.outer_height > space {
        let current = viewport.scroll_y + LONG_CHUNK_SCROLL_SLACK;
        let half_space = 0.5 * space;
        let bounds = map.get(closest)?;
        let stop = bounds.top + rect.content_height - half_space;
        if current < stop {
            let stepped = viewport.scroll_y + SCROLL_STEP_RATIO * space;
            let target = if stepped > stop { stop } else { stepped };
            return Some(ScrollCommand::smooth(target));
        }
    }

    if closest + 1 < geometry.chunk_count() {
        let next = geometry.chunk_rect(closest + 1)?;
        return Some(ScrollCommand::smooth(snap_target(
            next,
            space,
            ScrollDirection::Down,
        )));
    }
    None
}

/// Plan a backward move from the active chunk. Mirrors [`plan_next`]: a tall
/// current chunk is first walked back to its top; a tall previous chunk is
/// entered at its end.
pub fn plan_previous(
    geometry: &dyn ChunkGeometry,
    map: &BoundaryMap,
    closest: usize,
    viewport: &ViewportMetrics,
    is_landscape: bool,
) -> Option<ScrollCommand> {
    let space = viewport.available_text_space(is_landscape);
    let rect = geometry.chunk_rect(closest)?;
    let previous = closest
        .checked_sub(1)
        .and_then(|index| geometry.chunk_rect(index));

    if rect.outer_height > space {
        let stop = map.get(closest)?.top;
        if viewport.scroll_y > stop {
            let stepped = viewport.scroll_y - SCROLL_STEP_RATIO * space;
            let target = if stepped < stop { stop } else { stepped };
            return Some(ScrollCommand::smooth(target));
        }
    }

    let prev_rect = previous?;
    if prev_rect.outer_height > space {
        // Enter the tall previous chunk at its end.
        return Some(ScrollCommand::smooth(snap_target(
            prev_rect,
            space,
            ScrollDirection::Up,
        )));
    }
    Some(ScrollCommand::smooth(snap_target(
        prev_rect,
        space,
        ScrollDirection::Down,
    )))
}

/// Arrow-key nudge downward from the last keyboard target.
pub fn nudge_down(scroll_to: f32) -> f32 {
    (scroll_to + KEYBOARD_SCROLL_OFFSET).max(0.0)
}

/// Arrow-key nudge upward, clamped at the top of the document.
pub fn nudge_up(scroll_to: f32) -> f32 {
    (scroll_to - KEYBOARD_SCROLL_OFFSET).max(0.0)
}
