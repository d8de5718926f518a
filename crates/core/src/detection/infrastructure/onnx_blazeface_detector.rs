//! BlazeFace face detector using ONNX Runtime via `ort`.
//!
//! A lightweight short-range detector that provides bounding boxes only.
use std::path::Path;

use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

use super::execution_provider::load_session;

/// BlazeFace model input resolution.
const INPUT_SIZE: u32 = 128;

/// Default confidence threshold.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// NMS IoU threshold.
const NMS_IOU_THRESH: f64 = 0.3;

/// Number of BlazeFace anchors (short-range model).
const NUM_ANCHORS: usize = 896;

/// Values per anchor in the regressor output (box + 6 keypoints).
const REGRESSOR_STRIDE: usize = 16;

/// BlazeFace face detector backed by an ONNX Runtime session.
///
/// Faces whose width or height is below `min_face_size` pixels are dropped.
pub struct OnnxBlazefaceDetector {
    session: ort::session::Session,
    confidence: f64,
    min_face_size: u32,
    anchors: Vec<[f32; 2]>,
}

impl OnnxBlazefaceDetector {
    /// Load a BlazeFace ONNX model.
    pub fn new(
        model_path: &Path,
        confidence: f64,
        min_face_size: u32,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let session = load_session(model_path)?;
        log::info!("Loaded face detector from {}", model_path.display());
        Ok(Self {
            session,
            confidence,
            min_face_size,
            anchors: generate_anchors(),
        })
    }
}

impl FaceDetector for OnnxBlazefaceDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
        if frame.is_empty() {
            return Ok(Vec::new());
        }

        let input_tensor = preprocess(frame, INPUT_SIZE);
        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;

        // regressors: [1, 896, 16], classificators: [1, 896, 1]
        if outputs.len() < 2 {
            return Err(
                format!("BlazeFace model expected 2 outputs, got {}", outputs.len()).into(),
            );
        }

        let regressors = outputs[0].try_extract_array::<f32>()?;
        let scores = outputs[1].try_extract_array::<f32>()?;
        let reg_data = regressors.as_slice().ok_or("Cannot get regressor slice")?;
        let score_data = scores.as_slice().ok_or("Cannot get score slice")?;

        let mut raw = decode(
            reg_data,
            score_data,
            &self.anchors,
            self.confidence as f32,
            frame.width(),
            frame.height(),
        );
        let kept = nms(&mut raw, NMS_IOU_THRESH);
        Ok(to_regions(
            &kept,
            frame.width(),
            frame.height(),
            self.min_face_size,
        ))
    }
}

/// Resize frame to `size × size` and normalize to [0,1] NCHW float32.
/// Grayscale frames are replicated across the three input channels.
fn preprocess(frame: &Frame, size: u32) -> ndarray::Array4<f32> {
    let src = frame.as_ndarray();
    let src_h = frame.height() as usize;
    let src_w = frame.width() as usize;
    let last_channel = frame.channels().max(1) as usize - 1;
    let s = size as usize;

    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, s, s));

    for y in 0..s {
        let src_y = (((y as f64 + 0.5) * src_h as f64 / s as f64) as usize).min(src_h - 1);
        for x in 0..s {
            let src_x = (((x as f64 + 0.5) * src_w as f64 / s as f64) as usize).min(src_w - 1);
            for c in 0..3 {
                tensor[[0, c, y, x]] = src[[src_y, src_x, c.min(last_channel)]] as f32 / 255.0;
            }
        }
    }

    tensor
}

/// Generate BlazeFace anchors for the short-range model.
///
/// Two feature maps: 16×16 with 2 anchors per cell and 8×8 with 6.
fn generate_anchors() -> Vec<[f32; 2]> {
    let strides = [(8, 2), (16, 6)]; // (stride, anchors_per_cell)
    let mut anchors = Vec::with_capacity(NUM_ANCHORS);

    for &(stride, num) in &strides {
        let grid_size = INPUT_SIZE as usize / stride;
        for y in 0..grid_size {
            for x in 0..grid_size {
                let cx = (x as f32 + 0.5) / grid_size as f32;
                let cy = (y as f32 + 0.5) / grid_size as f32;
                for _ in 0..num {
                    anchors.push([cx, cy]);
                }
            }
        }
    }

    anchors
}

#[derive(Clone, Debug)]
struct RawDet {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    score: f64,
}

/// Decodes anchor-relative boxes above `confidence` into frame pixels.
fn decode(
    reg_data: &[f32],
    score_data: &[f32],
    anchors: &[[f32; 2]],
    confidence: f32,
    fw: u32,
    fh: u32,
) -> Vec<RawDet> {
    let mut dets = Vec::new();
    let num_anchors = anchors.len().min(NUM_ANCHORS);
    let scale = INPUT_SIZE as f32;

    for (i, &raw_score) in score_data.iter().enumerate().take(num_anchors) {
        let score = sigmoid(raw_score);
        if score < confidence {
            continue;
        }

        let offset = i * REGRESSOR_STRIDE;
        if offset + 4 > reg_data.len() {
            break;
        }

        let anchor = anchors[i];
        let cx = anchor[0] + reg_data[offset] / scale;
        let cy = anchor[1] + reg_data[offset + 1] / scale;
        let w = reg_data[offset + 2] / scale;
        let h = reg_data[offset + 3] / scale;

        dets.push(RawDet {
            x1: ((cx - w / 2.0) * fw as f32) as f64,
            y1: ((cy - h / 2.0) * fh as f32) as f64,
            x2: ((cx + w / 2.0) * fw as f32) as f64,
            y2: ((cy + h / 2.0) * fh as f32) as f64,
            score: score as f64,
        });
    }

    dets
}

/// Clips detections to the frame and drops those smaller than `min_size`.
fn to_regions(dets: &[RawDet], fw: u32, fh: u32, min_size: u32) -> Vec<Region> {
    dets.iter()
        .map(|d| Region::from_corners(d.x1 as i32, d.y1 as i32, d.x2 as i32, d.y2 as i32))
        .map(|r| r.clip_to(fw, fh))
        .filter(|r| r.width >= min_size as i32 && r.height >= min_size as i32)
        .collect()
}

fn nms(dets: &mut [RawDet], iou_thresh: f64) -> Vec<RawDet> {
    dets.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep = Vec::new();
    let mut suppressed = vec![false; dets.len()];

    for i in 0..dets.len() {
        if suppressed[i] {
            continue;
        }
        keep.push(dets[i].clone());
        for j in (i + 1)..dets.len() {
            if !suppressed[j] && bbox_iou(&dets[i], &dets[j]) > iou_thresh {
                suppressed[j] = true;
            }
        }
    }
    keep
}

fn bbox_iou(a: &RawDet, b: &RawDet) -> f64 {
    let x1 = a.x1.max(b.x1);
    let y1 = a.y1.max(b.y1);
    let x2 = a.x2.min(b.x2);
    let y2 = a.y2.min(b.y2);

    let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    if inter == 0.0 {
        return 0.0;
    }
    let area_a = (a.x2 - a.x1) * (a.y2 - a.y1);
    let area_b = (b.x2 - b.x1) * (b.y2 - b.y1);
    inter / (area_a + area_b - inter)
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn det(x1: f64, y1: f64, x2: f64, y2: f64, score: f64) -> RawDet {
        RawDet {
            x1,
            y1,
            x2,
            y2,
            score,
        }
    }

    #[test]
    fn test_preprocess_shape_and_scale() {
        let frame = Frame::new(vec![255u8; 200 * 100 * 3], 200, 100, 3, 0);
        let tensor = preprocess(&frame, INPUT_SIZE);
        assert_eq!(tensor.shape(), &[1, 3, 128, 128]);
        assert_relative_eq!(tensor[[0, 0, 0, 0]], 1.0);
    }

    #[test]
    fn test_preprocess_replicates_grayscale_frame() {
        let frame = Frame::new(vec![51u8; 64 * 48], 64, 48, 1, 0);
        let tensor = preprocess(&frame, INPUT_SIZE);
        assert_eq!(tensor.shape(), &[1, 3, 128, 128]);
        for c in 0..3 {
            assert_relative_eq!(tensor[[0, c, 64, 64]], 0.2);
        }
    }

    #[test]
    fn test_generate_anchors_count_and_range() {
        let anchors = generate_anchors();
        // 16×16 × 2 + 8×8 × 6
        assert_eq!(anchors.len(), NUM_ANCHORS);
        assert!(anchors
            .iter()
            .all(|a| a[0] > 0.0 && a[0] < 1.0 && a[1] > 0.0 && a[1] < 1.0));
    }

    #[test]
    fn test_sigmoid() {
        assert_relative_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(10.0) > 0.999);
        assert!(sigmoid(-10.0) < 0.001);
    }

    #[test]
    fn test_decode_skips_low_scores_and_maps_to_pixels() {
        let anchors = vec![[0.5, 0.5], [0.25, 0.25]];
        let mut reg = vec![0.0f32; 2 * REGRESSOR_STRIDE];
        // anchor 0: box of 64×64 input pixels centred on the anchor
        reg[2] = 64.0;
        reg[3] = 64.0;
        let scores = [5.0, -5.0];

        let dets = decode(&reg, &scores, &anchors, 0.5, 256, 256);
        assert_eq!(dets.len(), 1);
        assert_relative_eq!(dets[0].x1, 64.0, epsilon = 1e-4);
        assert_relative_eq!(dets[0].x2, 192.0, epsilon = 1e-4);
    }

    #[test]
    fn test_to_regions_filters_small_faces() {
        let dets = [
            det(0.0, 0.0, 100.0, 100.0, 0.9),
            det(200.0, 200.0, 260.0, 260.0, 0.9),
        ];
        let regions = to_regions(&dets, 640, 480, 80);
        assert_eq!(regions, vec![Region::new(0, 0, 100, 100)]);
    }

    #[test]
    fn test_to_regions_clips_to_frame() {
        let dets = [det(-20.0, 400.0, 100.0, 520.0, 0.9)];
        let regions = to_regions(&dets, 640, 480, 0);
        assert_eq!(regions, vec![Region::new(0, 400, 100, 80)]);
    }

    #[test]
    fn test_nms_suppresses_overlapping() {
        let mut dets = vec![
            det(0.0, 0.0, 100.0, 100.0, 0.7),
            det(5.0, 5.0, 105.0, 105.0, 0.9),
        ];
        let kept = nms(&mut dets, NMS_IOU_THRESH);
        assert_eq!(kept.len(), 1);
        assert_relative_eq!(kept[0].score, 0.9);
    }

    #[test]
    fn test_nms_keeps_separate() {
        let mut dets = vec![
            det(0.0, 0.0, 50.0, 50.0, 0.9),
            det(200.0, 200.0, 250.0, 250.0, 0.8),
        ];
        assert_eq!(nms(&mut dets, NMS_IOU_THRESH).len(), 2);
    }

    #[test]
    fn test_missing_model_fails_to_load() {
        assert!(
            OnnxBlazefaceDetector::new(Path::new("/nonexistent/face.onnx"), 0.5, 80).is_err()
        );
    }
}
