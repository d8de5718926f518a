use image::{GrayImage, Luma};
use imageproc::contours::{find_contours, BorderType};

use crate::motion::domain::motion_detector::MotionDetector;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Parameters of the per-pixel background model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackgroundModelConfig {
    /// Number of frames the model effectively remembers (learning rate is
    /// `1 / history`).
    pub history: u32,
    /// Squared Mahalanobis distance above which a pixel is foreground.
    pub var_threshold: f32,
    pub initial_variance: f32,
    pub min_variance: f32,
    pub max_variance: f32,
}

impl Default for BackgroundModelConfig {
    fn default() -> Self {
        Self {
            history: 500,
            var_threshold: 16.0,
            initial_variance: 15.0,
            min_variance: 4.0,
            max_variance: 75.0,
        }
    }
}

/// Motion detector backed by an adaptive single-Gaussian background model
/// over grayscale intensities.
///
/// The first frame (and any frame whose size differs from the model) seeds
/// the model and reports no motion. Background pixels update both mean and
/// variance; foreground pixels only drift the mean, so an object that stops
/// moving is absorbed after roughly `history` frames.
pub struct BackgroundSubtractionDetector {
    config: BackgroundModelConfig,
    mean: Vec<f32>,
    variance: Vec<f32>,
    width: u32,
    height: u32,
}

impl BackgroundSubtractionDetector {
    pub fn new(config: BackgroundModelConfig) -> Self {
        Self {
            config,
            mean: Vec::new(),
            variance: Vec::new(),
            width: 0,
            height: 0,
        }
    }

    /// Updates the model with `frame` and returns its foreground mask
    /// (255 = foreground).
    pub fn apply(&mut self, frame: &Frame) -> GrayImage {
        let luma = frame.to_luma();

        if self.width != frame.width() || self.height != frame.height() || self.mean.is_empty() {
            self.seed(&luma);
            return GrayImage::new(luma.width(), luma.height());
        }

        let alpha = 1.0 / self.config.history.max(1) as f32;
        let cfg = self.config;
        let mut mask = GrayImage::new(luma.width(), luma.height());

        for (i, (pixel, out)) in luma.pixels().zip(mask.pixels_mut()).enumerate() {
            let value = pixel.0[0] as f32;
            let diff = value - self.mean[i];
            let dist2 = diff * diff;

            if dist2 > cfg.var_threshold * self.variance[i] {
                *out = Luma([255]);
            } else {
                self.variance[i] = (self.variance[i] + alpha * (dist2 - self.variance[i]))
                    .clamp(cfg.min_variance, cfg.max_variance);
            }
            self.mean[i] += alpha * diff;
        }

        mask
    }

    fn seed(&mut self, luma: &GrayImage) {
        log::debug!(
            "Seeding background model at {}x{}",
            luma.width(),
            luma.height()
        );
        self.width = luma.width();
        self.height = luma.height();
        self.mean = luma.pixels().map(|p| p.0[0] as f32).collect();
        self.variance = vec![self.config.initial_variance; self.mean.len()];
    }
}

impl Default for BackgroundSubtractionDetector {
    fn default() -> Self {
        Self::new(BackgroundModelConfig::default())
    }
}

impl MotionDetector for BackgroundSubtractionDetector {
    fn detect(&mut self, frame: &Frame) -> Vec<Region> {
        if frame.is_empty() {
            return Vec::new();
        }
        let mask = self.apply(frame);
        external_bounding_boxes(&mask)
    }
}

/// Bounding boxes of the outermost contours of a binary mask.
fn external_bounding_boxes(mask: &GrayImage) -> Vec<Region> {
    find_contours::<i32>(mask)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .filter_map(|c| {
            let min_x = c.points.iter().map(|p| p.x).min()?;
            let max_x = c.points.iter().map(|p| p.x).max()?;
            let min_y = c.points.iter().map(|p| p.y).min()?;
            let max_y = c.points.iter().map(|p| p.y).max()?;
            Some(Region::new(
                min_x,
                min_y,
                max_x - min_x + 1,
                max_y - min_y + 1,
            ))
        })
        .collect()
}
