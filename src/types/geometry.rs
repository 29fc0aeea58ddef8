//! Geometry capability consumed by the layout modules.
//!
//! The engine never reaches into a live DOM tree; it reads rendered chunk
//! geometry through this trait so the boundary and scroll-target algorithms
//! are unit-testable with synthetic layouts.

/// Measured geometry of one rendered chunk container, in page coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChunkRect {
    /// Distance from the top of the document to the container's top edge.
    pub offset_top: f32,
    /// Height of the container, margins and padding included.
    pub outer_height: f32,
    /// Height of the container's first child (the text itself, no padding).
    pub content_height: f32,
}

/// Read access to the rendered chunk containers, in document order.
pub trait ChunkGeometry {
    /// Number of rendered chunk containers.
    fn chunk_count(&self) -> usize;

    /// Geometry of the container at `index`, or `None` past the end.
    fn chunk_rect(&self, index: usize) -> Option<ChunkRect>;
}

impl<T: ChunkGeometry + ?Sized> ChunkGeometry for &T {
    fn chunk_count(&self) -> usize {
        (**self).chunk_count()
    }

    fn chunk_rect(&self, index: usize) -> Option<ChunkRect> {
        (**self).chunk_rect(index)
    }
}

/// Synthetic geometry backed by a plain vec of rects. The wasm layer provides
/// the DOM-backed counterpart; tests construct this one directly.
#[derive(Clone, Debug, Default)]
pub struct FixedGeometry {
    rects: Vec<ChunkRect>,
}

impl FixedGeometry {
    pub fn new(rects: Vec<ChunkRect>) -> Self {
        Self { rects }
    }

    /// Uniform stack of `count` chunks, each `height` tall, starting at
    /// `first_top`, with content filling the full container.
    pub fn uniform(count: usize, height: f32, first_top: f32) -> Self {
        let rects = (0..count)
            .map(|i| ChunkRect {
                offset_top: first_top + height * i as f32,
                outer_height: height,
                content_height: height,
            })
            .collect();
        Self { rects }
    }
}

impl ChunkGeometry for FixedGeometry {
    fn chunk_count(&self) -> usize {
        self.rects.len()
    }

    fn chunk_rect(&self, index: usize) -> Option<ChunkRect> {
        self.rects.get(index).copied()
    }
}
