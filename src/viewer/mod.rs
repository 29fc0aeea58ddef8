//! `ChunkNav` — the wasm-exported navigation controller.
//!
//! Binds the pure [`NavEngine`](crate::engine::NavEngine) to a live document:
//! DOM-measured chunk geometry, window scroll/keydown/click listeners,
//! setTimeout scheduling for the scroll-hint and pinch-commit timers, and
//! `localStorage` persistence. Listeners are attached with stored closures
//! and removed again in `detach`/`Drop`; timers are cleared the same way.

mod events;
mod geometry;
mod storage;

pub use geometry::CHUNK_CONTAINER_CLASS;

#[cfg(target_arch = "wasm32")]
use std::cell::RefCell;
#[cfg(target_arch = "wasm32")]
use std::collections::HashMap;
#[cfg(target_arch = "wasm32")]
use std::rc::Rc;

use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use js_sys::Function;
#[cfg(target_arch = "wasm32")]
use serde::Deserialize;
#[cfg(target_arch = "wasm32")]
use serde::Serialize;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::closure::Closure;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;
#[cfg(target_arch = "wasm32")]
use web_sys::{KeyboardEvent, MouseEvent};

#[cfg(target_arch = "wasm32")]
use crate::config::ScrollHintConfig;
#[cfg(target_arch = "wasm32")]
use crate::engine::{Effect, EngineOptions, NavEngine};
#[cfg(target_arch = "wasm32")]
use crate::gate::{PendingToggle, ToggleResponse};
#[cfg(target_arch = "wasm32")]
use crate::pinch::COMMIT_DEBOUNCE_MS;
#[cfg(target_arch = "wasm32")]
use crate::types::{Checklist, DocumentKey, RevisionLog};
#[cfg(target_arch = "wasm32")]
use geometry::{capture_viewport, is_landscape, DomGeometry};
#[cfg(target_arch = "wasm32")]
use storage::LocalStore;

/// Delay (ms) after the last resize event before boundaries are remeasured
/// and the view re-snaps.
#[cfg(target_arch = "wasm32")]
const RESIZE_SETTLE_DELAY_MS: f64 = 200.0;

/// Timing helper.
#[cfg(target_arch = "wasm32")]
pub(crate) fn now_ms() -> f64 {
    if let Some(window) = web_sys::window() {
        if let Some(perf) = window.performance() {
            return perf.now();
        }
    }
    js_sys::Date::now()
}

/// Construction options passed from JavaScript.
#[cfg(target_arch = "wasm32")]
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NavOptions {
    binder_id: String,
    viewable_id: String,
    #[serde(default)]
    progress_block_enabled: bool,
    /// Raw remote-config object for the scroll hint; missing or malformed
    /// fields fall back to defaults.
    #[serde(default)]
    hint_config: serde_json::Value,
    #[serde(default = "default_font_factor")]
    initial_font_factor: f32,
}

#[cfg(target_arch = "wasm32")]
fn default_font_factor() -> f32 {
    1.0
}

/// Wire form of the server's toggle response.
#[cfg(target_arch = "wasm32")]
#[derive(Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
enum ToggleResponseWire {
    Updated { checklist: Checklist },
    AlreadyInThatState { checklist: Checklist },
    Failed { reason: String },
}

#[cfg(target_arch = "wasm32")]
impl From<ToggleResponseWire> for ToggleResponse {
    fn from(wire: ToggleResponseWire) -> Self {
        match wire {
            ToggleResponseWire::Updated { checklist } => Self::Updated(checklist),
            ToggleResponseWire::AlreadyInThatState { checklist } => {
                Self::AlreadyInThatState(checklist)
            }
            ToggleResponseWire::Failed { reason } => Self::Failed(reason),
        }
    }
}

/// Hint view pushed to the embedding whenever hint state may have changed.
#[cfg(target_arch = "wasm32")]
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HintView {
    is_visible: bool,
    should_render: bool,
}

/// Shared state reachable from event handlers and timer closures.
#[cfg(target_arch = "wasm32")]
pub(crate) struct SharedState {
    pub(crate) engine: NavEngine,
    pub(crate) root: web_sys::Element,
    pub(crate) image_region_height: f32,
    /// Embedding callback receiving effect objects.
    pub(crate) effect_callback: Option<Function>,
    pub(crate) hint_timer: Option<i32>,
    pub(crate) hint_timer_closure: Option<Closure<dyn FnMut()>>,
    pub(crate) pinch_timer: Option<i32>,
    pub(crate) pinch_timer_closure: Option<Closure<dyn FnMut()>>,
    pub(crate) resize_timer: Option<i32>,
    pub(crate) resize_timer_closure: Option<Closure<dyn FnMut()>>,
    pub(crate) pending_toggles: HashMap<u32, PendingToggle>,
    pub(crate) next_toggle_ticket: u32,
}

/// The navigation controller exported to JavaScript.
#[wasm_bindgen]
pub struct ChunkNav {
    #[cfg(target_arch = "wasm32")]
    state: Rc<RefCell<SharedState>>,
    #[cfg(target_arch = "wasm32")]
    scroll_closure: Option<Closure<dyn FnMut(web_sys::Event)>>,
    #[cfg(target_arch = "wasm32")]
    key_closure: Option<Closure<dyn FnMut(KeyboardEvent)>>,
    #[cfg(target_arch = "wasm32")]
    click_closure: Option<Closure<dyn FnMut(MouseEvent)>>,
    #[cfg(target_arch = "wasm32")]
    resize_closure: Option<Closure<dyn FnMut(web_sys::Event)>>,
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
impl ChunkNav {
    /// Create the controller for the document view rooted at `root`.
    #[wasm_bindgen(constructor)]
    pub fn new(root: web_sys::Element, options: JsValue) -> Result<ChunkNav, JsValue> {
        console_error_panic_hook::set_once();
        let options: NavOptions = serde_wasm_bindgen::from_value(options)
            .map_err(|e| JsValue::from_str(&format!("invalid options: {e}")))?;
        let engine = NavEngine::new(
            EngineOptions {
                document: DocumentKey::new(options.binder_id, options.viewable_id),
                progress_block_enabled: options.progress_block_enabled,
                hint_config: ScrollHintConfig::from_value(&options.hint_config),
                initial_font_factor: options.initial_font_factor,
            },
            Box::new(LocalStore::new()),
            now_ms(),
        );
        let state = Rc::new(RefCell::new(SharedState {
            engine,
            root,
            image_region_height: 0.0,
            effect_callback: None,
            hint_timer: None,
            hint_timer_closure: None,
            pinch_timer: None,
            pinch_timer_closure: None,
            resize_timer: None,
            resize_timer_closure: None,
            pending_toggles: HashMap::new(),
            next_toggle_ticket: 0,
        }));
        let mut nav = ChunkNav {
            state,
            scroll_closure: None,
            key_closure: None,
            click_closure: None,
            resize_closure: None,
        };
        nav.attach_listeners();
        Self::sync_hint_timer(&nav.state);
        Ok(nav)
    }

    /// Register the callback receiving effect objects
    /// (`{type: "notice" | "chunkChanged" | ...}`).
    pub fn set_effect_callback(&mut self, callback: Function) {
        self.state.borrow_mut().effect_callback = Some(callback);
    }

    /// Height of the image region, device-scaled; portrait layouts subtract
    /// it from the text space.
    pub fn set_image_region_height(&mut self, height: f32) {
        self.state.borrow_mut().image_region_height = height;
    }

    /// Load or replace document content. Classification runs synchronously;
    /// call `recalculate_boundaries` after the chunks have rendered.
    pub fn load_content(
        &mut self,
        chunks: JsValue,
        chunk_images: JsValue,
        revision_log: JsValue,
        checklists: JsValue,
    ) -> Result<(), JsValue> {
        let chunks: Vec<Vec<String>> = serde_wasm_bindgen::from_value(chunks)
            .map_err(|e| JsValue::from_str(&format!("invalid chunks: {e}")))?;
        let chunk_images: Vec<Vec<String>> = serde_wasm_bindgen::from_value(chunk_images)
            .map_err(|e| JsValue::from_str(&format!("invalid chunk images: {e}")))?;
        let revision_log: Option<RevisionLog> = serde_wasm_bindgen::from_value(revision_log)
            .map_err(|e| JsValue::from_str(&format!("invalid revision log: {e}")))?;
        let checklists: Option<Vec<Checklist>> = serde_wasm_bindgen::from_value(checklists)
            .map_err(|e| JsValue::from_str(&format!("invalid checklists: {e}")))?;
        let effects = self.state.borrow_mut().engine.set_content(
            &chunks,
            &chunk_images,
            revision_log.as_ref(),
            checklists.as_deref(),
        );
        Self::apply_effects(&self.state, effects);
        Ok(())
    }

    /// Replace the checklist mirror after a fresh server load.
    pub fn load_checklists(&mut self, checklists: JsValue) -> Result<(), JsValue> {
        let checklists: Vec<Checklist> = serde_wasm_bindgen::from_value(checklists)
            .map_err(|e| JsValue::from_str(&format!("invalid checklists: {e}")))?;
        self.state.borrow_mut().engine.load_checklists(checklists);
        Ok(())
    }

    /// Measure a fresh boundary map from the rendered chunks. Returns `true`
    /// when the map changed.
    pub fn recalculate_boundaries(&mut self) -> Result<bool, JsValue> {
        let mut s = self.state.borrow_mut();
        let geometry = DomGeometry::capture(&s.root);
        let viewport = capture_viewport(s.image_region_height);
        s.engine
            .recalculate_boundaries(&geometry, &viewport)
            .map_err(Into::into)
    }

    /// Advance to the next chunk (or step within an over-tall one).
    pub fn next_chunk(&mut self) {
        let effects = {
            let mut s = self.state.borrow_mut();
            let geometry = DomGeometry::capture(&s.root);
            let viewport = capture_viewport(s.image_region_height);
            s.engine.next_chunk(&geometry, &viewport, is_landscape())
        };
        Self::apply_effects(&self.state, effects);
    }

    /// Move back to the previous chunk.
    pub fn previous_chunk(&mut self) {
        let effects = {
            let mut s = self.state.borrow_mut();
            let geometry = DomGeometry::capture(&s.root);
            let viewport = capture_viewport(s.image_region_height);
            s.engine
                .previous_chunk(&geometry, &viewport, is_landscape())
        };
        Self::apply_effects(&self.state, effects);
    }

    /// Instant re-snap to a chunk (defaults to the active one) after a
    /// layout-affecting change.
    pub fn snap_to_chunk(&mut self, index: Option<u32>) {
        let effects = {
            let mut s = self.state.borrow_mut();
            let geometry = DomGeometry::capture(&s.root);
            let viewport = capture_viewport(s.image_region_height);
            s.engine.snap_to_chunk(
                &geometry,
                &viewport,
                is_landscape(),
                index.map(|i| i as usize),
            )
        };
        Self::apply_effects(&self.state, effects);
    }

    /// Feed one pinch gesture sample from the embedding's gesture layer.
    pub fn on_pinch(&mut self, scale: f32, distance: f32) {
        let effects = self
            .state
            .borrow_mut()
            .engine
            .on_pinch(scale, distance, now_ms());
        Self::apply_effects(&self.state, effects);
        Self::schedule_pinch_poll(&self.state, COMMIT_DEBOUNCE_MS);
    }

    /// The pinch gesture ended; commit the preview immediately.
    pub fn end_pinch(&mut self) {
        let effects = {
            let mut s = self.state.borrow_mut();
            let geometry = DomGeometry::capture(&s.root);
            let viewport = capture_viewport(s.image_region_height);
            s.engine.end_pinch(&geometry, &viewport, is_landscape())
        };
        Self::apply_effects(&self.state, effects);
    }

    /// Start a checklist toggle. Returns a ticket to resolve with the server
    /// response, or `None` when the toggle is a no-op (collection fully
    /// performed, awaiting reset).
    pub fn begin_toggle(
        &mut self,
        checklist_id: &str,
        performed: bool,
    ) -> Result<Option<u32>, JsValue> {
        let mut s = self.state.borrow_mut();
        let start = s.engine.toggle_checklist(checklist_id, performed)?;
        let ticket = start.pending.map(|pending| {
            let ticket = s.next_toggle_ticket;
            s.next_toggle_ticket = s.next_toggle_ticket.wrapping_add(1);
            s.pending_toggles.insert(ticket, pending);
            ticket
        });
        let effects = start.effects;
        drop(s);
        Self::apply_effects(&self.state, effects);
        Ok(ticket)
    }

    /// Resolve a toggle ticket with the server response
    /// (`{status: "updated" | "alreadyInThatState" | "failed", ...}`).
    pub fn resolve_toggle(&mut self, ticket: u32, response: JsValue) -> Result<(), JsValue> {
        let wire: ToggleResponseWire = serde_wasm_bindgen::from_value(response)
            .map_err(|e| JsValue::from_str(&format!("invalid toggle response: {e}")))?;
        let effects = {
            let mut s = self.state.borrow_mut();
            let Some(pending) = s.pending_toggles.remove(&ticket) else {
                return Err(JsValue::from_str("unknown toggle ticket"));
            };
            let geometry = DomGeometry::capture(&s.root);
            let viewport = capture_viewport(s.image_region_height);
            s.engine.resolve_toggle(
                pending,
                wire.into(),
                &geometry,
                &viewport,
                is_landscape(),
            )?
        };
        Self::apply_effects(&self.state, effects);
        Ok(())
    }

    /// Reader engagement routed to the scroll hint (e.g. tapping it away).
    pub fn hint_focus(&mut self) {
        self.state.borrow_mut().engine.hint_focus(now_ms());
        Self::sync_hint_timer(&self.state);
        Self::emit_hint_view(&self.state);
    }

    /// Serializable engine snapshot for the rendering layer.
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        let s = self.state.borrow();
        serde_wasm_bindgen::to_value(&s.engine.snapshot())
            .map_err(|e| JsValue::from_str(&format!("snapshot: {e}")))
    }

    /// The current boundary map as `[{top, bottom}, ...]`, or `null` before
    /// the first measurement (for progress indicators and the like).
    pub fn boundaries(&self) -> Result<JsValue, JsValue> {
        let s = self.state.borrow();
        serde_wasm_bindgen::to_value(&s.engine.boundaries().map(|map| map.intervals()))
            .map_err(|e| JsValue::from_str(&format!("boundaries: {e}")))
    }

    /// Semantic kind per chunk, for "active" styling and per-kind rendering.
    pub fn chunk_kinds(&self) -> Result<JsValue, JsValue> {
        let s = self.state.borrow();
        serde_wasm_bindgen::to_value(&s.engine.maps().kinds)
            .map_err(|e| JsValue::from_str(&format!("chunk kinds: {e}")))
    }

    /// Remove all listeners and cancel all timers. Safe to call more than
    /// once; `Drop` calls it as a backstop.
    pub fn detach(&mut self) {
        self.remove_listeners();
        let mut s = self.state.borrow_mut();
        if let (Some(window), Some(id)) = (web_sys::window(), s.hint_timer.take()) {
            window.clear_timeout_with_handle(id);
        }
        if let (Some(window), Some(id)) = (web_sys::window(), s.pinch_timer.take()) {
            window.clear_timeout_with_handle(id);
        }
        if let (Some(window), Some(id)) = (web_sys::window(), s.resize_timer.take()) {
            window.clear_timeout_with_handle(id);
        }
        s.hint_timer_closure = None;
        s.pinch_timer_closure = None;
        s.resize_timer_closure = None;
    }
}

#[cfg(target_arch = "wasm32")]
impl ChunkNav {
    /// Perform engine effects against the DOM and forward the rest to the
    /// embedding callback.
    pub(crate) fn apply_effects(state: &Rc<RefCell<SharedState>>, effects: Vec<Effect>) {
        for effect in effects {
            match &effect {
                Effect::Scroll(command) => {
                    if let Some(window) = web_sys::window() {
                        let opts = web_sys::ScrollToOptions::new();
                        opts.set_top(f64::from(command.top));
                        opts.set_behavior(if command.smooth {
                            web_sys::ScrollBehavior::Smooth
                        } else {
                            web_sys::ScrollBehavior::Auto
                        });
                        window.scroll_to_with_scroll_to_options(&opts);
                    }
                }
                Effect::FontFactorPreview(factor) | Effect::FontFactorCommitted(factor) => {
                    let s = state.borrow();
                    if let Some(html) = s.root.dyn_ref::<web_sys::HtmlElement>() {
                        let _ = html
                            .style()
                            .set_property("--font-size-factor", &factor.to_string());
                    }
                }
                Effect::RecalculateBoundaries
                | Effect::ChunkChanged { .. }
                | Effect::ScrolledUp
                | Effect::Notice(_) => {}
            }
            Self::forward_effect(state, &effect);
        }
        Self::sync_hint_timer(state);
    }

    fn forward_effect(state: &Rc<RefCell<SharedState>>, effect: &Effect) {
        let callback = state.borrow().effect_callback.clone();
        let Some(callback) = callback else {
            return;
        };
        match serde_wasm_bindgen::to_value(effect) {
            Ok(value) => {
                let _ = callback.call1(&JsValue::NULL, &value);
            }
            Err(e) => {
                web_sys::console::warn_1(&JsValue::from_str(&format!(
                    "chunkview: effect serialization failed: {e}"
                )));
            }
        }
    }

    fn emit_hint_view(state: &Rc<RefCell<SharedState>>) {
        let (callback, view) = {
            let s = state.borrow();
            let now = now_ms();
            (
                s.effect_callback.clone(),
                HintView {
                    is_visible: s.engine.hint().is_visible(),
                    should_render: s.engine.hint().should_render(now),
                },
            )
        };
        if let (Some(callback), Ok(value)) = (callback, serde_wasm_bindgen::to_value(&view)) {
            let _ = callback.call1(&JsValue::NULL, &value);
        }
    }

    /// Keep exactly one setTimeout pending, matching the hint state's timer.
    pub(crate) fn sync_hint_timer(state: &Rc<RefCell<SharedState>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let mut s = state.borrow_mut();
        if let Some(id) = s.hint_timer.take() {
            window.clear_timeout_with_handle(id);
        }
        let Some(delay) = s.engine.hint_pending_timer_ms() else {
            return;
        };
        if s.hint_timer_closure.is_none() {
            let weak = Rc::downgrade(state);
            let closure = Closure::wrap(Box::new(move || {
                if let Some(state) = weak.upgrade() {
                    state.borrow_mut().engine.hint_timer_fired(now_ms());
                    ChunkNav::sync_hint_timer(&state);
                    ChunkNav::emit_hint_view(&state);
                }
            }) as Box<dyn FnMut()>);
            s.hint_timer_closure = Some(closure);
        }
        if let Some(closure) = s.hint_timer_closure.as_ref() {
            match window.set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                delay as i32,
            ) {
                Ok(id) => s.hint_timer = Some(id),
                Err(_) => s.hint_timer = None,
            }
        }
    }

    /// Defer boundary remeasurement until resizing has settled, then re-snap
    /// to the current chunk so the reading position survives the reflow.
    pub(crate) fn schedule_resize_settle(state: &Rc<RefCell<SharedState>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let mut s = state.borrow_mut();
        if let Some(id) = s.resize_timer.take() {
            window.clear_timeout_with_handle(id);
        }
        if s.resize_timer_closure.is_none() {
            let weak = Rc::downgrade(state);
            let closure = Closure::wrap(Box::new(move || {
                let Some(state) = weak.upgrade() else {
                    return;
                };
                let effects = {
                    let mut s = state.borrow_mut();
                    s.resize_timer = None;
                    let geometry = DomGeometry::capture(&s.root);
                    let viewport = capture_viewport(s.image_region_height);
                    match s.engine.recalculate_boundaries(&geometry, &viewport) {
                        Ok(true) => {
                            s.engine
                                .snap_to_chunk(&geometry, &viewport, is_landscape(), None)
                        }
                        Ok(false) => Vec::new(),
                        Err(_) => Vec::new(), // nothing rendered yet
                    }
                };
                ChunkNav::apply_effects(&state, effects);
            }) as Box<dyn FnMut()>);
            s.resize_timer_closure = Some(closure);
        }
        if let Some(closure) = s.resize_timer_closure.as_ref() {
            match window.set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                RESIZE_SETTLE_DELAY_MS as i32,
            ) {
                Ok(id) => s.resize_timer = Some(id),
                Err(_) => s.resize_timer = None,
            }
        }
    }

    /// Schedule (or reschedule) the pinch commit poll.
    pub(crate) fn schedule_pinch_poll(state: &Rc<RefCell<SharedState>>, delay_ms: f64) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let mut s = state.borrow_mut();
        if let Some(id) = s.pinch_timer.take() {
            window.clear_timeout_with_handle(id);
        }
        if s.pinch_timer_closure.is_none() {
            let weak = Rc::downgrade(state);
            let closure = Closure::wrap(Box::new(move || {
                let Some(state) = weak.upgrade() else {
                    return;
                };
                let now = now_ms();
                // Another sample may have pushed the deadline out.
                let remaining = state
                    .borrow()
                    .engine
                    .pinch_commit_deadline_ms()
                    .map(|deadline| deadline - now);
                match remaining {
                    Some(remaining) if remaining > 0.0 => {
                        ChunkNav::schedule_pinch_poll(&state, remaining);
                    }
                    Some(_) => {
                        let effects = {
                            let mut s = state.borrow_mut();
                            s.pinch_timer = None;
                            let geometry = DomGeometry::capture(&s.root);
                            let viewport = capture_viewport(s.image_region_height);
                            s.engine
                                .poll_pinch(&geometry, &viewport, is_landscape(), now)
                        };
                        ChunkNav::apply_effects(&state, effects);
                    }
                    None => {}
                }
            }) as Box<dyn FnMut()>);
            s.pinch_timer_closure = Some(closure);
        }
        if let Some(closure) = s.pinch_timer_closure.as_ref() {
            match window.set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                delay_ms as i32,
            ) {
                Ok(id) => s.pinch_timer = Some(id),
                Err(_) => s.pinch_timer = None,
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl Drop for ChunkNav {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[wasm_bindgen]
impl ChunkNav {
    /// The DOM-bound controller only exists on wasm32; native builds use
    /// [`NavEngine`](crate::engine::NavEngine) directly.
    #[wasm_bindgen(constructor)]
    pub fn new() -> ChunkNav {
        ChunkNav {}
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Default for ChunkNav {
    fn default() -> Self {
        Self::new()
    }
}
