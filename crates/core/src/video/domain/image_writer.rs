use std::path::Path;

use crate::shared::frame::Frame;

/// Encodes a frame (or a crop of one) as an image file.
///
/// The format follows the path's extension; evidence artifacts use `.jpg`.
pub trait ImageWriter: Send {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>>;
}
