//! DOM-backed chunk geometry (wasm32 only).
//!
//! Reads the rendered chunk containers — elements carrying the
//! [`CHUNK_CONTAINER_CLASS`] class under the engine's root element — in
//! document order. This is the production implementation of the
//! [`ChunkGeometry`](crate::types::ChunkGeometry) capability; tests use the
//! synthetic one.

/// Class marking one rendered chunk container.
pub const CHUNK_CONTAINER_CLASS: &str = "chunk-content";

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;

#[cfg(target_arch = "wasm32")]
use crate::layout::ViewportMetrics;
#[cfg(target_arch = "wasm32")]
use crate::types::{ChunkGeometry, ChunkRect};

/// Snapshot of the rendered chunk containers under a root element.
///
/// Measured eagerly at construction so one engine entry point observes one
/// consistent layout, even if the DOM reflows mid-dispatch.
#[cfg(target_arch = "wasm32")]
pub struct DomGeometry {
    rects: Vec<ChunkRect>,
}

#[cfg(target_arch = "wasm32")]
impl DomGeometry {
    pub fn capture(root: &web_sys::Element) -> Self {
        let containers = root.get_elements_by_class_name(CHUNK_CONTAINER_CLASS);
        let mut rects = Vec::with_capacity(containers.length() as usize);
        for index in 0..containers.length() {
            let Some(element) = containers.item(index) else {
                break;
            };
            let Ok(html) = element.dyn_into::<web_sys::HtmlElement>() else {
                continue;
            };
            let outer_height = html.client_height() as f32;
            // First child is the text itself, without the container padding.
            let content_height = html
                .first_element_child()
                .map_or(outer_height, |child| child.client_height() as f32);
            rects.push(ChunkRect {
                offset_top: html.offset_top() as f32,
                outer_height,
                content_height,
            });
        }
        Self { rects }
    }
}

#[cfg(target_arch = "wasm32")]
impl ChunkGeometry for DomGeometry {
    fn chunk_count(&self) -> usize {
        self.rects.len()
    }

    fn chunk_rect(&self, index: usize) -> Option<ChunkRect> {
        self.rects.get(index).copied()
    }
}

/// Read the current viewport metrics from the window.
#[cfg(target_arch = "wasm32")]
pub fn capture_viewport(image_region_height: f32) -> ViewportMetrics {
    let window = web_sys::window();
    let number = |v: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>| {
        v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32
    };
    let (inner_width, inner_height, scroll_y) = match window.as_ref() {
        Some(w) => (
            number(w.inner_width()),
            number(w.inner_height()),
            w.scroll_y().unwrap_or(0.0) as f32,
        ),
        None => (0.0, 0.0, 0.0),
    };
    let document_height = window
        .and_then(|w| w.document())
        .and_then(|d| d.body())
        .map_or(0.0, |body| body.offset_height() as f32);
    ViewportMetrics {
        inner_width,
        inner_height,
        scroll_y,
        document_height,
        image_region_height,
    }
}

/// True when the viewport is wider than tall.
#[cfg(target_arch = "wasm32")]
pub fn is_landscape() -> bool {
    web_sys::window().is_some_and(|w| {
        let width = w.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let height = w
            .inner_height()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);
        width > height
    })
}
