//! Layout engine for chunk boundary measurement and active-chunk resolution.
//!
//! This module handles:
//! - Measuring rendered chunk containers into an ordered boundary map
//! - Viewport metrics (available text space, aspect regime, bottom detection)
//! - Resolving which chunk is active for a given scroll position

mod boundaries;
mod closest;
mod viewport;

pub use boundaries::{BoundaryMap, ChunkBounds};
pub use closest::{closest_chunk, find_closest};
pub use viewport::{ViewportMetrics, MAX_IMAGE_REGION_RATIO, SQUARE_ASPECT_TOP_CORRECTION};
