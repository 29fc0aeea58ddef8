//! The navigation engine: one stateful controller per open document view.
//!
//! Composes the classifier maps, the boundary map, the active-chunk index,
//! the checklist gate, pinch zoom, and the scroll hint. Event entry points
//! return [`Effect`] values describing what the embedding should do (perform
//! a scroll, restyle for a font factor, surface a notice) — the engine never
//! touches the DOM itself, which keeps every algorithm testable against
//! synthetic geometry.

use serde::Serialize;

use crate::classify::{classify, ChunkMaps};
use crate::config::ScrollHintConfig;
use crate::error::Result;
use crate::gate::{ChecklistGate, GateNotice, PendingToggle, ToggleApplied, ToggleResponse};
use crate::hint::ScrollHint;
use crate::layout::{closest_chunk, BoundaryMap, ViewportMetrics};
use crate::pinch::{PinchUpdate, PinchZoom};
use crate::scroll::{self, ScrollCommand};
use crate::store::KeyValueStore;
use crate::types::{Checklist, ChunkGeometry, DocumentKey, RevisionLog};

/// Instruction for the embedding, produced by an engine entry point.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Effect {
    /// Perform a vertical scroll.
    Scroll(ScrollCommand),
    /// The active chunk changed.
    ChunkChanged { from: usize, to: usize },
    /// The reader scrolled upward (used to reveal the toolbar).
    ScrolledUp,
    /// Layout changed; measure a fresh boundary map and feed it back through
    /// [`NavEngine::recalculate_boundaries`].
    RecalculateBoundaries,
    /// Restyle with a live pinch preview factor.
    FontFactorPreview(f32),
    /// A pinch gesture committed; restyle, reflow, then re-snap.
    FontFactorCommitted(f32),
    /// Gate notice to surface (warning, conflict, completion analytics).
    Notice(GateNotice),
}

/// Keyboard intents the engine understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavKey {
    ArrowDown,
    ArrowUp,
    PageDown,
    PageUp,
    Space,
}

impl NavKey {
    /// Map a `KeyboardEvent.code` value.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ArrowDown" => Some(Self::ArrowDown),
            "ArrowUp" => Some(Self::ArrowUp),
            "PageDown" => Some(Self::PageDown),
            "PageUp" => Some(Self::PageUp),
            "Space" => Some(Self::Space),
            _ => None,
        }
    }
}

/// Construction options for one document view.
pub struct EngineOptions {
    pub document: DocumentKey,
    /// Account feature: block forward progress on unperformed checklists.
    pub progress_block_enabled: bool,
    pub hint_config: ScrollHintConfig,
    /// Font factor restored from the reader's size hint.
    pub initial_font_factor: f32,
}

/// Result of starting a checklist toggle: the pending handle to resolve when
/// the server answers, plus any effects raised at initiation.
pub struct ToggleStart {
    pub pending: Option<PendingToggle>,
    pub effects: Vec<Effect>,
}

/// Serializable engine state snapshot for the embedding's rendering layer.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSnapshot {
    pub closest: usize,
    pub blocking_chunk_index: Option<usize>,
    pub block_progress_warning_shown: bool,
    pub hint_visible: bool,
    pub font_factor: f32,
}

/// Navigation engine for one open document view.
pub struct NavEngine {
    chunks: Vec<Vec<String>>,
    chunk_images: Vec<Vec<String>>,
    revision_log: Option<RevisionLog>,
    maps: ChunkMaps,
    boundaries: Option<BoundaryMap>,
    closest: usize,
    gate: ChecklistGate,
    pinch: PinchZoom,
    hint: ScrollHint,
    last_scroll_top: f32,
    keyboard_scroll_to: f32,
}

impl NavEngine {
    pub fn new(options: EngineOptions, store: Box<dyn KeyValueStore>, now_ms: f64) -> Self {
        Self {
            chunks: Vec::new(),
            chunk_images: Vec::new(),
            revision_log: None,
            maps: ChunkMaps::default(),
            boundaries: None,
            closest: 0,
            gate: ChecklistGate::new(options.document, options.progress_block_enabled),
            pinch: PinchZoom::new(options.initial_font_factor),
            hint: ScrollHint::new(store, options.hint_config, now_ms),
            last_scroll_top: 0.0,
            keyboard_scroll_to: 0.0,
        }
    }

    // ------------------------------------------------------------------
    // Content

    /// Load or replace the document content. Classification runs here;
    /// boundary measurement must follow once the chunks have rendered.
    pub fn set_content(
        &mut self,
        chunks: &[Vec<String>],
        chunk_images: &[Vec<String>],
        revision_log: Option<&RevisionLog>,
        checklists: Option<&[Checklist]>,
    ) -> Vec<Effect> {
        self.chunks = chunks.to_vec();
        self.chunk_images = chunk_images.to_vec();
        self.revision_log = revision_log.cloned();
        if let Some(checklists) = checklists {
            self.gate.load(checklists.to_vec());
        }
        self.reclassify();
        self.boundaries = None;
        self.closest = self.closest.min(self.maps.kinds.len().saturating_sub(1));
        vec![Effect::RecalculateBoundaries]
    }

    /// Replace the checklist mirror (fresh load from the server). Chunk kinds
    /// depend on which chunks carry checklists, so classification reruns.
    pub fn load_checklists(&mut self, checklists: Vec<Checklist>) {
        self.gate.load(checklists);
        self.reclassify();
    }

    fn reclassify(&mut self) {
        self.maps = classify(
            &self.chunks,
            self.revision_log.as_ref(),
            Some(self.gate.checklists()),
            &self.chunk_images,
        );
    }

    /// Feed a freshly measured boundary map. Returns `true` when the map
    /// actually changed (by the cheap ends-comparison); an equivalent map is
    /// dropped to avoid downstream churn.
    pub fn recalculate_boundaries(
        &mut self,
        geometry: &dyn ChunkGeometry,
        viewport: &ViewportMetrics,
    ) -> Result<bool> {
        let fresh = BoundaryMap::measure(geometry, viewport)?;
        if let Some(current) = &self.boundaries {
            if current.roughly_equals(&fresh) {
                return Ok(false);
            }
        }
        self.boundaries = Some(fresh);
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Accessors

    pub fn closest(&self) -> usize {
        self.closest
    }

    pub fn boundaries(&self) -> Option<&BoundaryMap> {
        self.boundaries.as_ref()
    }

    pub fn maps(&self) -> &ChunkMaps {
        &self.maps
    }

    pub fn chunk_count(&self) -> usize {
        self.maps.kinds.len()
    }

    pub fn blocking_chunk_index(&self) -> Option<usize> {
        self.gate.blocking_chunk_index(&self.maps)
    }

    pub fn block_progress_warning_shown(&self) -> bool {
        self.gate.warning_shown()
    }

    pub fn font_factor(&self) -> f32 {
        self.pinch.factor()
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            closest: self.closest,
            blocking_chunk_index: self.blocking_chunk_index(),
            block_progress_warning_shown: self.block_progress_warning_shown(),
            hint_visible: self.hint.is_visible(),
            font_factor: self.font_factor(),
        }
    }

    // ------------------------------------------------------------------
    // Scrolling

    /// Continuous scroll event. Resolves the active chunk and raises the
    /// derived effects; while a pinch preview is live the event is ignored.
    pub fn on_scroll(
        &mut self,
        viewport: &ViewportMetrics,
        is_landscape: bool,
        now_ms: f64,
    ) -> Result<Vec<Effect>> {
        if self.pinch.is_previewing() {
            return Ok(Vec::new());
        }
        let mut effects = Vec::new();

        if self.last_scroll_top > viewport.scroll_y {
            effects.push(Effect::ScrolledUp);
        }
        self.last_scroll_top = viewport.scroll_y;

        let blocked = self.gate.should_block_scroll(
            &self.maps,
            self.closest,
            self.chunk_count(),
            viewport.at_bottom(),
        );
        if blocked {
            self.drain_gate(&mut effects);
            return Ok(effects);
        }

        let Some(map) = self.boundaries.as_ref() else {
            // No boundaries measured yet; layout is still settling.
            effects.push(Effect::RecalculateBoundaries);
            return Ok(effects);
        };
        let new_closest = closest_chunk(is_landscape, map, viewport)?;
        if new_closest != self.closest {
            self.gate.hide_progress_warning();
            self.hint.on_active_chunk_change(now_ms);
            effects.push(Effect::ChunkChanged {
                from: self.closest,
                to: new_closest,
            });
            effects.push(Effect::RecalculateBoundaries);
            self.closest = new_closest;
        }
        self.drain_gate(&mut effects);
        Ok(effects)
    }

    /// Discrete forward move (click, Space, PageDown). Blocked moves raise
    /// the gate warning instead of scrolling.
    pub fn next_chunk(
        &mut self,
        geometry: &dyn ChunkGeometry,
        viewport: &ViewportMetrics,
        is_landscape: bool,
    ) -> Vec<Effect> {
        let mut effects = Vec::new();
        // A forward move only makes sense from the bottom of the current
        // chunk, so the gate treats it as an at-bottom attempt.
        let blocked =
            self.gate
                .should_block_scroll(&self.maps, self.closest, self.chunk_count(), true);
        if blocked {
            self.drain_gate(&mut effects);
            return effects;
        }
        if let Some(map) = self.boundaries.as_ref() {
            if let Some(command) =
                scroll::plan_next(geometry, map, self.closest, viewport, is_landscape)
            {
                effects.push(Effect::Scroll(command));
            }
        }
        self.drain_gate(&mut effects);
        effects
    }

    /// Discrete backward move (PageUp). Never gated.
    pub fn previous_chunk(
        &mut self,
        geometry: &dyn ChunkGeometry,
        viewport: &ViewportMetrics,
        is_landscape: bool,
    ) -> Vec<Effect> {
        let Some(map) = self.boundaries.as_ref() else {
            return Vec::new();
        };
        scroll::plan_previous(geometry, map, self.closest, viewport, is_landscape)
            .map(Effect::Scroll)
            .into_iter()
            .collect()
    }

    /// Click-to-advance, with the original guards: clicks on links and
    /// clicks that end a text selection do not advance.
    pub fn click_advance(
        &mut self,
        geometry: &dyn ChunkGeometry,
        viewport: &ViewportMetrics,
        is_landscape: bool,
        is_link: bool,
        text_selection_active: bool,
    ) -> Vec<Effect> {
        if is_link || text_selection_active {
            return Vec::new();
        }
        self.next_chunk(geometry, viewport, is_landscape)
    }

    /// Instant re-snap to the chunk at `index` (or the current chunk) after
    /// a layout-affecting change.
    pub fn snap_to_chunk(
        &mut self,
        geometry: &dyn ChunkGeometry,
        viewport: &ViewportMetrics,
        is_landscape: bool,
        index: Option<usize>,
    ) -> Vec<Effect> {
        scroll::plan_snap(
            geometry,
            index.unwrap_or(self.closest),
            viewport,
            is_landscape,
        )
        .map(Effect::Scroll)
        .into_iter()
        .collect()
    }

    /// Keyboard navigation.
    pub fn on_key(
        &mut self,
        key: NavKey,
        geometry: &dyn ChunkGeometry,
        viewport: &ViewportMetrics,
        is_landscape: bool,
    ) -> Vec<Effect> {
        match key {
            NavKey::ArrowDown => {
                self.keyboard_scroll_to = scroll::nudge_down(self.keyboard_scroll_to);
                vec![Effect::Scroll(ScrollCommand {
                    top: self.keyboard_scroll_to,
                    smooth: false,
                })]
            }
            NavKey::ArrowUp => {
                self.keyboard_scroll_to = scroll::nudge_up(self.keyboard_scroll_to);
                vec![Effect::Scroll(ScrollCommand {
                    top: self.keyboard_scroll_to,
                    smooth: false,
                })]
            }
            NavKey::PageDown | NavKey::Space => self.next_chunk(geometry, viewport, is_landscape),
            NavKey::PageUp => self.previous_chunk(geometry, viewport, is_landscape),
        }
    }

    // ------------------------------------------------------------------
    // Pinch zoom

    /// Live pinch sample.
    pub fn on_pinch(&mut self, scale: f32, distance: f32, now_ms: f64) -> Vec<Effect> {
        match self.pinch.on_gesture(scale, distance, now_ms) {
            PinchUpdate::Preview(factor) => vec![Effect::FontFactorPreview(factor)],
            PinchUpdate::Ignored => Vec::new(),
        }
    }

    /// Deadline the embedding should poll [`Self::poll_pinch`] at.
    pub fn pinch_commit_deadline_ms(&self) -> Option<f64> {
        self.pinch.commit_deadline_ms()
    }

    /// Commit the pinch preview if its quiet period has elapsed.
    pub fn poll_pinch(
        &mut self,
        geometry: &dyn ChunkGeometry,
        viewport: &ViewportMetrics,
        is_landscape: bool,
        now_ms: f64,
    ) -> Vec<Effect> {
        match self.pinch.poll_commit(now_ms) {
            Some(factor) => self.committed_pinch_effects(factor, geometry, viewport, is_landscape),
            None => Vec::new(),
        }
    }

    /// The pinch gesture ended explicitly; commit immediately.
    pub fn end_pinch(
        &mut self,
        geometry: &dyn ChunkGeometry,
        viewport: &ViewportMetrics,
        is_landscape: bool,
    ) -> Vec<Effect> {
        match self.pinch.finish() {
            Some(factor) => self.committed_pinch_effects(factor, geometry, viewport, is_landscape),
            None => Vec::new(),
        }
    }

    fn committed_pinch_effects(
        &mut self,
        factor: f32,
        geometry: &dyn ChunkGeometry,
        viewport: &ViewportMetrics,
        is_landscape: bool,
    ) -> Vec<Effect> {
        let mut effects = vec![Effect::FontFactorCommitted(factor)];
        // The reflow invalidates every boundary; re-snap keeps the reading
        // position.
        effects.push(Effect::RecalculateBoundaries);
        effects.extend(self.snap_to_chunk(geometry, viewport, is_landscape, None));
        effects
    }

    // ------------------------------------------------------------------
    // Checklists

    /// Start a checklist toggle. The embedding sends the request and resolves
    /// the returned handle with the server's [`ToggleResponse`].
    pub fn toggle_checklist(&mut self, checklist_id: &str, performed: bool) -> Result<ToggleStart> {
        let pending = self.gate.begin_toggle(checklist_id, performed)?;
        let mut effects = Vec::new();
        self.drain_gate(&mut effects);
        Ok(ToggleStart { pending, effects })
    }

    /// Resolve a toggle with the server response. A response belonging to a
    /// previously active document is discarded. A performed toggle advances
    /// the reader to the next chunk.
    pub fn resolve_toggle(
        &mut self,
        pending: PendingToggle,
        response: ToggleResponse,
        geometry: &dyn ChunkGeometry,
        viewport: &ViewportMetrics,
        is_landscape: bool,
    ) -> Result<Vec<Effect>> {
        let performed = pending.performed;
        let applied = self.gate.resolve_toggle(pending, response)?;
        let mut effects = Vec::new();
        if let ToggleApplied::Applied { .. } = applied {
            if performed {
                if let Some(next) = self.closest.checked_add(1) {
                    if next < self.chunk_count() {
                        if let Some(rect) = geometry.chunk_rect(next) {
                            let space = viewport.available_text_space(is_landscape);
                            effects.push(Effect::Scroll(ScrollCommand {
                                top: scroll::snap_target(
                                    rect,
                                    space,
                                    scroll::ScrollDirection::Down,
                                ),
                                smooth: true,
                            }));
                        }
                    }
                }
            }
        }
        self.drain_gate(&mut effects);
        Ok(effects)
    }

    // ------------------------------------------------------------------
    // Scroll hint

    pub fn hint(&self) -> &ScrollHint {
        &self.hint
    }

    /// Reader engagement routed to the hint (e.g. tapping the affordance).
    pub fn hint_focus(&mut self, now_ms: f64) {
        self.hint.on_focus(now_ms);
    }

    /// Delay of the hint timer the embedding should have pending.
    pub fn hint_pending_timer_ms(&self) -> Option<u64> {
        self.hint.pending_timer_ms()
    }

    /// The pending hint timer elapsed.
    pub fn hint_timer_fired(&mut self, now_ms: f64) {
        self.hint.fire_timer(now_ms);
    }

    fn drain_gate(&mut self, effects: &mut Vec<Effect>) {
        effects.extend(self.gate.drain_notices().into_iter().map(Effect::Notice));
    }
}
