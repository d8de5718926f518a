pub mod edge_density_scorer;
pub mod onnx_interaction_scorer;
pub mod scorer_factory;
