//! Viewport metrics consumed by boundary measurement and scroll planning.

/// Portion of the viewport height the image region may occupy in portrait.
pub const MAX_IMAGE_REGION_RATIO: f32 = 0.66;

/// Correction subtracted from each measured chunk top when the viewport is in
/// the near-square aspect regime, where the reader applies a distinct layout
/// rule with a fixed header band.
pub const SQUARE_ASPECT_TOP_CORRECTION: f32 = 48.0;

/// Aspect-ratio window treated as "approximately square".
const SQUARE_ASPECT_MIN: f32 = 0.8;
const SQUARE_ASPECT_MAX: f32 = 1.25;

/// Snapshot of the scrollable viewport, in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportMetrics {
    /// Window inner width.
    pub inner_width: f32,
    /// Window inner height.
    pub inner_height: f32,
    /// Current vertical scroll offset of the page.
    pub scroll_y: f32,
    /// Total scrollable height of the document body.
    pub document_height: f32,
    /// Rendered height of the image region, already device-scaled.
    pub image_region_height: f32,
}

impl ViewportMetrics {
    /// Vertical space available to the text column.
    ///
    /// Landscape gives the text the full viewport height; portrait stacks the
    /// image region above the text, so its height (capped at
    /// [`MAX_IMAGE_REGION_RATIO`] of the viewport) is subtracted.
    pub fn available_text_space(&self, is_landscape: bool) -> f32 {
        if is_landscape {
            return self.inner_height;
        }
        let image_region = self
            .image_region_height
            .min(MAX_IMAGE_REGION_RATIO * self.inner_height);
        self.inner_height - image_region
    }

    /// True when width and height are close enough that the square layout
    /// rule is in effect.
    pub fn is_squared(&self) -> bool {
        if self.inner_height <= 0.0 {
            return false;
        }
        let ratio = self.inner_width / self.inner_height;
        ratio > SQUARE_ASPECT_MIN && ratio < SQUARE_ASPECT_MAX
    }

    /// True when the page is scrolled to the bottom of the document.
    pub fn at_bottom(&self) -> bool {
        self.inner_height + self.scroll_y.ceil() >= self.document_height
    }
}
