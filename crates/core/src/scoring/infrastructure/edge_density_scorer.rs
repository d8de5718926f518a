use crate::scoring::domain::interaction_scorer::InteractionScorer;
use crate::shared::frame::Frame;

const CANNY_LOW: f32 = 50.0;
const CANNY_HIGH: f32 = 150.0;

/// Model-free scorer: the fraction of ROI pixels that lie on a Canny edge.
///
/// `imageproc`'s Canny smooths its input with a Gaussian before computing
/// gradients, so the grayscale ROI is passed in unblurred.
///
/// Busy regions (hands, products being moved) produce many edges; an empty
/// shelf or floor produces few.
pub struct EdgeDensityScorer {
    low_threshold: f32,
    high_threshold: f32,
}

impl EdgeDensityScorer {
    pub fn new() -> Self {
        Self::with_thresholds(CANNY_LOW, CANNY_HIGH)
    }

    pub fn with_thresholds(low_threshold: f32, high_threshold: f32) -> Self {
        Self {
            low_threshold,
            high_threshold,
        }
    }
}

impl Default for EdgeDensityScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionScorer for EdgeDensityScorer {
    fn predict(&mut self, roi: &Frame) -> f64 {
        if roi.is_empty() {
            return 0.0;
        }

        let edges = imageproc::edges::canny(&roi.to_luma(), self.low_threshold, self.high_threshold);

        let edge_pixels = edges.pixels().filter(|p| p.0[0] > 0).count();
        let total = edges.width() as usize * edges.height() as usize;
        edge_pixels as f64 / total as f64
    }
}
