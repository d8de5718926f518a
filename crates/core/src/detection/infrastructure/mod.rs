pub mod execution_provider;
pub mod face_crop_capture;
pub mod model_resolver;
pub mod onnx_blazeface_detector;
