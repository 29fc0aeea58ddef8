//! Pinch-zoom font scaling.
//!
//! While a pinch gesture is in progress the preview factor tracks the
//! fingers live; the factor is committed only after the gesture has been
//! quiet for [`COMMIT_DEBOUNCE_MS`], at which point the embedding reflows and
//! re-snaps to the current chunk. Scrolling is ignored during the preview.

/// Lower bound of the font size factor.
pub const MIN_FONT_SIZE_FACTOR: f32 = 0.6;
/// Upper bound of the font size factor.
pub const MAX_FONT_SIZE_FACTOR: f32 = 2.5;
/// Quantization steps per unit factor, bounding re-render frequency during a
/// continuous gesture.
pub const FONT_SIZE_RESOLUTION: f32 = 7.0;

/// Quiet time after the last gesture sample before the preview factor is
/// committed.
pub const COMMIT_DEBOUNCE_MS: f64 = 1000.0;

/// Gesture samples reporting a finger distance above this are sensor noise
/// (they would read as a sudden reverse of the zoom) and are dropped.
const MAX_PLAUSIBLE_GESTURE_DISTANCE: f32 = 100.0;

/// Clamp and quantize a raw font factor. Idempotent: applying it twice gives
/// the same result as applying it once.
pub fn clamp_font_factor(factor: f32) -> f32 {
    let quantized = (factor * FONT_SIZE_RESOLUTION).round() / FONT_SIZE_RESOLUTION;
    quantized.clamp(MIN_FONT_SIZE_FACTOR, MAX_FONT_SIZE_FACTOR)
}

/// Font scaling state for one pinch interaction.
#[derive(Clone, Copy, Debug)]
pub struct PinchZoom {
    /// Factor in effect before the gesture started.
    initial_factor: f32,
    /// Live factor shown while previewing.
    preview_factor: f32,
    /// Scale carried over from a previous gesture in the same interaction.
    previous_scale: f32,
    previewing: bool,
    commit_deadline_ms: Option<f64>,
}

/// Result of feeding one gesture sample into [`PinchZoom::on_gesture`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PinchUpdate {
    /// The preview factor changed; the embedding should restyle immediately.
    Preview(f32),
    /// The sample was implausible and dropped.
    Ignored,
}

impl PinchZoom {
    pub fn new(initial_factor: f32) -> Self {
        let factor = clamp_font_factor(initial_factor);
        Self {
            initial_factor: factor,
            preview_factor: factor,
            previous_scale: 1.0,
            previewing: false,
            commit_deadline_ms: None,
        }
    }

    /// Factor currently in effect (the preview while a gesture is live).
    pub fn factor(&self) -> f32 {
        if self.previewing {
            self.preview_factor
        } else {
            self.initial_factor
        }
    }

    /// True while a gesture preview is live; the engine ignores scroll events
    /// in this window.
    pub fn is_previewing(&self) -> bool {
        self.previewing
    }

    /// When the pending commit should fire, if a gesture is awaiting one.
    pub fn commit_deadline_ms(&self) -> Option<f64> {
        self.commit_deadline_ms
    }

    /// Feed one gesture sample. `scale` is the gesture's cumulative scale,
    /// `distance` the reported finger travel, `now_ms` a monotonic timestamp.
    pub fn on_gesture(&mut self, scale: f32, distance: f32, now_ms: f64) -> PinchUpdate {
        if distance > MAX_PLAUSIBLE_GESTURE_DISTANCE {
            return PinchUpdate::Ignored;
        }
        self.preview_factor = clamp_font_factor(self.initial_factor * self.previous_scale * scale);
        self.previewing = true;
        self.commit_deadline_ms = Some(now_ms + COMMIT_DEBOUNCE_MS);
        PinchUpdate::Preview(self.preview_factor)
    }

    /// Commit the preview if the debounce deadline has passed. Returns the
    /// committed factor exactly once per gesture.
    pub fn poll_commit(&mut self, now_ms: f64) -> Option<f32> {
        let deadline = self.commit_deadline_ms?;
        if now_ms < deadline {
            return None;
        }
        Some(self.commit())
    }

    /// Explicit end of the gesture: commit immediately.
    pub fn finish(&mut self) -> Option<f32> {
        if !self.previewing && self.commit_deadline_ms.is_none() {
            return None;
        }
        Some(self.commit())
    }

    fn commit(&mut self) -> f32 {
        self.initial_factor = self.preview_factor;
        self.previewing = false;
        self.commit_deadline_ms = None;
        self.initial_factor
    }
}

impl Default for PinchZoom {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]

    use super::*;
    use test_case::test_case;

    #[test_case(0.1, MIN_FONT_SIZE_FACTOR; "clamped to minimum")]
    #[test_case(9.0, MAX_FONT_SIZE_FACTOR; "clamped to maximum")]
    #[test_case(1.0, 1.0; "unit factor unchanged")]
    fn clamp_bounds(input: f32, expected: f32) {
        assert_eq!(clamp_font_factor(input), expected);
    }

    #[test]
    fn clamp_is_idempotent() {
        for raw in [0.0, 0.55, 0.61, 1.0, 1.3333, 2.49, 3.0] {
            let once = clamp_font_factor(raw);
            assert_eq!(clamp_font_factor(once), once);
            assert!((MIN_FONT_SIZE_FACTOR..=MAX_FONT_SIZE_FACTOR).contains(&once));
        }
    }

    #[test]
    fn quantized_to_sevenths() {
        let factor = clamp_font_factor(1.4);
        assert_eq!(factor, (1.4f32 * 7.0).round() / 7.0);
    }

    #[test]
    fn implausible_distance_is_ignored() {
        let mut pinch = PinchZoom::new(1.0);
        assert_eq!(pinch.on_gesture(2.0, 150.0, 0.0), PinchUpdate::Ignored);
        assert!(!pinch.is_previewing());
        assert_eq!(pinch.factor(), 1.0);
    }

    #[test]
    fn preview_then_deadline_commit() {
        let mut pinch = PinchZoom::new(1.0);
        let PinchUpdate::Preview(preview) = pinch.on_gesture(1.5, 10.0, 0.0) else {
            panic!("expected a preview");
        };
        assert_eq!(preview, clamp_font_factor(1.5));
        assert!(pinch.is_previewing());

        // Quiet period not yet elapsed.
        assert_eq!(pinch.poll_commit(500.0), None);
        // A new sample pushes the deadline out.
        let _ = pinch.on_gesture(1.6, 10.0, 800.0);
        assert_eq!(pinch.poll_commit(1500.0), None);

        let committed = pinch.poll_commit(1800.1);
        assert_eq!(committed, Some(clamp_font_factor(1.6)));
        assert!(!pinch.is_previewing());
        // Commit fires once.
        assert_eq!(pinch.poll_commit(5000.0), None);
    }

    #[test]
    fn explicit_finish_commits_immediately() {
        let mut pinch = PinchZoom::new(1.0);
        let _ = pinch.on_gesture(2.0, 10.0, 0.0);
        assert_eq!(pinch.finish(), Some(clamp_font_factor(2.0)));
        assert_eq!(pinch.factor(), clamp_font_factor(2.0));
        assert_eq!(pinch.finish(), None);
    }
}
