use std::path::PathBuf;

use crate::shared::frame::Frame;

/// Detects faces in a frame and persists one crop per face.
///
/// Returns the paths of the crops that were actually written. Failures are
/// handled inside the implementation; a failed pass yields no paths.
pub trait FaceCapture: Send {
    fn capture(&mut self, frame: &Frame, zone: &str) -> Vec<PathBuf>;
}
