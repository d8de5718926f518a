pub mod face_capture;
pub mod face_detector;
