use std::path::Path;

use crate::scoring::domain::interaction_scorer::InteractionScorer;

use super::edge_density_scorer::EdgeDensityScorer;
use super::onnx_interaction_scorer::OnnxInteractionScorer;

/// Creates the interaction scorer for a run, preferring the learned model.
///
/// The choice is made once: with no model configured, a missing model file,
/// or a model that fails to load, the edge-density heuristic is used for the
/// whole run. Logs which scorer is selected.
pub fn create_scorer(model_path: Option<&Path>) -> Box<dyn InteractionScorer> {
    let Some(path) = model_path else {
        log::info!("No interaction model configured, using edge-density heuristic");
        return Box::new(EdgeDensityScorer::new());
    };

    if !path.exists() {
        log::warn!(
            "Interaction model {} not found, using edge-density heuristic",
            path.display()
        );
        return Box::new(EdgeDensityScorer::new());
    }

    match OnnxInteractionScorer::new(path) {
        Ok(scorer) => {
            log::info!("Loaded interaction model from {}", path.display());
            Box::new(scorer)
        }
        Err(e) => {
            log::warn!(
                "Failed to load interaction model {}: {e}; using edge-density heuristic",
                path.display()
            );
            Box::new(EdgeDensityScorer::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::frame::Frame;

    fn stripes(width: u32, height: u32) -> Frame {
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for _ in 0..height {
            for x in 0..width {
                let v = if (x / 4) % 2 == 0 { 0 } else { 255 };
                data.extend_from_slice(&[v, v, v]);
            }
        }
        Frame::new(data, width, height, 3, 0)
    }

    fn assert_behaves_like_heuristic(scorer: &mut dyn InteractionScorer) {
        let mut heuristic = EdgeDensityScorer::new();
        let roi = stripes(48, 32);
        assert_eq!(scorer.predict(&roi), heuristic.predict(&roi));
        assert_eq!(scorer.predict(&Frame::new(Vec::new(), 0, 0, 3, 0)), 0.0);
    }

    #[test]
    fn test_no_model_uses_heuristic() {
        let mut scorer = create_scorer(None);
        assert_behaves_like_heuristic(scorer.as_mut());
    }

    #[test]
    fn test_missing_model_file_uses_heuristic() {
        let mut scorer = create_scorer(Some(Path::new("/nonexistent/interaction.onnx")));
        assert_behaves_like_heuristic(scorer.as_mut());
    }

    #[test]
    fn test_corrupt_model_file_uses_heuristic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("interaction.onnx");
        std::fs::write(&path, b"not an onnx model").unwrap();

        let mut scorer = create_scorer(Some(&path));
        assert_behaves_like_heuristic(scorer.as_mut());
    }
}
