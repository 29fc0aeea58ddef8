//! DOM event wiring for `ChunkNav` (wasm32 only).
//!
//! Listeners are attached as explicit subscribe/unsubscribe pairs: every
//! closure is stored on the controller and removed again in
//! `remove_listeners`, so tearing down a document view leaks nothing.

#[cfg(target_arch = "wasm32")]
use std::rc::Rc;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::closure::Closure;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;
#[cfg(target_arch = "wasm32")]
use web_sys::{KeyboardEvent, MouseEvent};

#[cfg(target_arch = "wasm32")]
use super::geometry::{capture_viewport, is_landscape, DomGeometry};
#[cfg(target_arch = "wasm32")]
use super::{now_ms, ChunkNav};
#[cfg(target_arch = "wasm32")]
use crate::engine::NavKey;

/// Tags whose focus swallows keyboard navigation.
#[cfg(target_arch = "wasm32")]
const INTERACTIVE_TAGS: [&str; 3] = ["INPUT", "TEXTAREA", "SELECT"];

#[cfg(target_arch = "wasm32")]
fn keyboard_focus_is_interactive() -> bool {
    web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.active_element())
        .is_some_and(|el| INTERACTIVE_TAGS.contains(&el.tag_name().as_str()))
}

#[cfg(target_arch = "wasm32")]
impl ChunkNav {
    pub(crate) fn attach_listeners(&mut self) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // window scroll → active-chunk resolution
        {
            let state = Rc::clone(&self.state);
            let closure = Closure::wrap(Box::new(move |_event: web_sys::Event| {
                let result = {
                    let mut s = state.borrow_mut();
                    let viewport = capture_viewport(s.image_region_height);
                    s.engine.on_scroll(&viewport, is_landscape(), now_ms())
                };
                match result {
                    Ok(effects) => ChunkNav::apply_effects(&state, effects),
                    Err(e) => web_sys::console::warn_1(&wasm_bindgen::JsValue::from_str(
                        &format!("chunkview: scroll dispatch failed: {e}"),
                    )),
                }
            }) as Box<dyn FnMut(web_sys::Event)>);
            let _ = window
                .add_event_listener_with_callback("scroll", closure.as_ref().unchecked_ref());
            self.scroll_closure = Some(closure);
        }

        // document keydown → keyboard navigation
        {
            let state = Rc::clone(&self.state);
            let closure = Closure::wrap(Box::new(move |event: KeyboardEvent| {
                if keyboard_focus_is_interactive() {
                    return;
                }
                let Some(key) = NavKey::from_code(&event.code()) else {
                    return;
                };
                event.prevent_default();
                event.stop_propagation();
                let effects = {
                    let mut s = state.borrow_mut();
                    let geometry = DomGeometry::capture(&s.root);
                    let viewport = capture_viewport(s.image_region_height);
                    s.engine.on_key(key, &geometry, &viewport, is_landscape())
                };
                ChunkNav::apply_effects(&state, effects);
            }) as Box<dyn FnMut(KeyboardEvent)>);
            let _ = document
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            self.key_closure = Some(closure);
        }

        // window resize → deferred remeasure once the size has settled
        {
            let state = Rc::clone(&self.state);
            let closure = Closure::wrap(Box::new(move |_event: web_sys::Event| {
                ChunkNav::schedule_resize_settle(&state);
            }) as Box<dyn FnMut(web_sys::Event)>);
            let _ = window
                .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            self.resize_closure = Some(closure);
        }

        // root click → advance, unless the click hit a link or ended a
        // text selection
        {
            let state = Rc::clone(&self.state);
            let closure = Closure::wrap(Box::new(move |event: MouseEvent| {
                if event.detail() == 2 {
                    // Double click selects text; never advance.
                    return;
                }
                let is_link = event
                    .target()
                    .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
                    .and_then(|el| el.closest("a").ok().flatten())
                    .is_some();
                let selection_active = web_sys::window()
                    .and_then(|w| w.get_selection().ok().flatten())
                    .is_some_and(|sel| !sel.is_collapsed());
                let effects = {
                    let mut s = state.borrow_mut();
                    let geometry = DomGeometry::capture(&s.root);
                    let viewport = capture_viewport(s.image_region_height);
                    s.engine.click_advance(
                        &geometry,
                        &viewport,
                        is_landscape(),
                        is_link,
                        selection_active,
                    )
                };
                ChunkNav::apply_effects(&state, effects);
            }) as Box<dyn FnMut(MouseEvent)>);
            let root = self.state.borrow().root.clone();
            let _ =
                root.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            self.click_closure = Some(closure);
        }
    }

    pub(crate) fn remove_listeners(&mut self) {
        let window = web_sys::window();
        let document = window.as_ref().and_then(|w| w.document());

        if let (Some(window), Some(closure)) = (window.as_ref(), self.scroll_closure.take()) {
            let _ = window
                .remove_event_listener_with_callback("scroll", closure.as_ref().unchecked_ref());
        }
        if let (Some(document), Some(closure)) = (document.as_ref(), self.key_closure.take()) {
            let _ = document
                .remove_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        }
        if let (Some(window), Some(closure)) = (window.as_ref(), self.resize_closure.take()) {
            let _ = window
                .remove_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        }
        if let Some(closure) = self.click_closure.take() {
            let root = self.state.borrow().root.clone();
            let _ =
                root.remove_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        }
    }
}
