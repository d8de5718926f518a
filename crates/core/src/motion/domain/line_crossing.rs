use crate::shared::region::Region;

/// Per-frame result of [`LineCrossingDetector::analyze`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MotionAnalysis {
    /// Whether any blob was larger than the area threshold.
    pub motion_detected: bool,
    /// Vertical centers of the blobs that crossed the line, in detection order.
    pub crossings: Vec<i32>,
}

/// Filters motion blobs by area and reports those whose vertical center lies
/// on the counting line.
///
/// Without a debounce window every qualifying blob yields a crossing, so one
/// object may be counted on consecutive frames. With a window, crossings are
/// suppressed until the window has passed since the last reported one.
pub struct LineCrossingDetector {
    line_y: i32,
    tolerance: i32,
    area_threshold: i64,
    debounce_seconds: Option<f64>,
    last_crossing_ts: Option<f64>,
}

impl LineCrossingDetector {
    pub fn new(line_y: i32, tolerance: i32, area_threshold: i64) -> Self {
        Self {
            line_y,
            tolerance,
            area_threshold,
            debounce_seconds: None,
            last_crossing_ts: None,
        }
    }

    pub fn with_debounce(mut self, seconds: Option<f64>) -> Self {
        self.debounce_seconds = seconds;
        self
    }

    pub fn line_y(&self) -> i32 {
        self.line_y
    }

    pub fn analyze(&mut self, regions: &[Region], now: f64) -> MotionAnalysis {
        let mut analysis = MotionAnalysis::default();

        for region in regions {
            if region.area() <= self.area_threshold {
                continue;
            }
            analysis.motion_detected = true;

            let cy = region.center_y();
            if (cy - self.line_y).abs() <= self.tolerance && self.accept_crossing(now) {
                analysis.crossings.push(cy);
            }
        }

        analysis
    }

    fn accept_crossing(&mut self, now: f64) -> bool {
        if let (Some(window), Some(last)) = (self.debounce_seconds, self.last_crossing_ts) {
            if now - last < window {
                return false;
            }
        }
        self.last_crossing_ts = Some(now);
        true
    }
}
