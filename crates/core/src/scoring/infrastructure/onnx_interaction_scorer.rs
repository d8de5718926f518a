use std::path::Path;

use crate::detection::infrastructure::execution_provider::load_session;
use crate::scoring::domain::interaction_scorer::InteractionScorer;
use crate::shared::frame::Frame;

/// Input resolution used when the model's input shape is dynamic.
const DEFAULT_INPUT_SIZE: usize = 224;

/// Memory layout of the model's image input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TensorLayout {
    /// `[N, H, W, C]`
    Nhwc,
    /// `[N, C, H, W]`
    Nchw,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputGeometry {
    pub layout: TensorLayout,
    pub height: usize,
    pub width: usize,
}

impl InputGeometry {
    /// Reads layout and size from a 4-D input shape.
    ///
    /// A channel dimension of 3 in the last position means NHWC, in the
    /// second position NCHW. Dynamic (non-positive) spatial dims fall back to
    /// 224; anything unrecognised is treated as a 224×224 NHWC input.
    pub fn from_shape(shape: &[i64]) -> Self {
        let dim = |d: i64| {
            if d > 0 {
                d as usize
            } else {
                DEFAULT_INPUT_SIZE
            }
        };

        if shape.len() == 4 {
            if shape[3] == 3 {
                return Self {
                    layout: TensorLayout::Nhwc,
                    height: dim(shape[1]),
                    width: dim(shape[2]),
                };
            }
            if shape[1] == 3 {
                return Self {
                    layout: TensorLayout::Nchw,
                    height: dim(shape[2]),
                    width: dim(shape[3]),
                };
            }
        }

        Self::default()
    }
}

impl Default for InputGeometry {
    fn default() -> Self {
        Self {
            layout: TensorLayout::Nhwc,
            height: DEFAULT_INPUT_SIZE,
            width: DEFAULT_INPUT_SIZE,
        }
    }
}

/// Interaction scorer backed by a binary-classifier ONNX model.
///
/// The ROI is resized to the model's input size, scaled to `[0, 1]` and the
/// first value of the first output is used as the interaction probability.
pub struct OnnxInteractionScorer {
    session: ort::session::Session,
    geometry: InputGeometry,
}

impl OnnxInteractionScorer {
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let session = load_session(model_path)?;

        let geometry = session
            .inputs()
            .first()
            .and_then(|input| {
                if let ort::value::ValueType::Tensor { ref shape, .. } = input.dtype() {
                    Some(InputGeometry::from_shape(shape))
                } else {
                    None
                }
            })
            .unwrap_or_default();

        log::info!(
            "Interaction model input: {}x{} ({:?})",
            geometry.width,
            geometry.height,
            geometry.layout
        );

        Ok(Self { session, geometry })
    }

    fn infer(&mut self, roi: &Frame) -> Result<f32, Box<dyn std::error::Error>> {
        let tensor = preprocess(roi, self.geometry);
        let input_value = ort::value::Tensor::from_array(tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() < 1 {
            return Err("interaction model produced no outputs".into());
        }
        let output = outputs[0].try_extract_array::<f32>()?;
        let value = output
            .iter()
            .next()
            .copied()
            .ok_or("interaction model output is empty")?;
        Ok(value)
    }
}

impl InteractionScorer for OnnxInteractionScorer {
    fn predict(&mut self, roi: &Frame) -> f64 {
        if roi.is_empty() {
            return 0.0;
        }
        match self.infer(roi) {
            Ok(value) => to_probability(value),
            Err(e) => {
                log::warn!("Interaction model inference failed: {e}");
                0.0
            }
        }
    }
}

fn to_probability(value: f32) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    (value as f64).clamp(0.0, 1.0)
}

/// Nearest-neighbour resize to the model input, normalized to `[0, 1]`.
fn preprocess(roi: &Frame, geometry: InputGeometry) -> ndarray::Array4<f32> {
    let src = roi.as_ndarray();
    let src_h = roi.height() as usize;
    let src_w = roi.width() as usize;
    let last_channel = roi.channels().max(1) as usize - 1;
    let (h, w) = (geometry.height, geometry.width);

    let shape = match geometry.layout {
        TensorLayout::Nhwc => (1, h, w, 3),
        TensorLayout::Nchw => (1, 3, h, w),
    };
    let mut tensor = ndarray::Array4::<f32>::zeros(shape);

    for y in 0..h {
        let src_y = (((y as f64 + 0.5) * src_h as f64 / h as f64) as usize).min(src_h - 1);
        for x in 0..w {
            let src_x = (((x as f64 + 0.5) * src_w as f64 / w as f64) as usize).min(src_w - 1);
            for c in 0..3 {
                let value = src[[src_y, src_x, c.min(last_channel)]] as f32 / 255.0;
                match geometry.layout {
                    TensorLayout::Nhwc => tensor[[0, y, x, c]] = value,
                    TensorLayout::Nchw => tensor[[0, c, y, x]] = value,
                }
            }
        }
    }

    tensor
}
