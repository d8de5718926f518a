use std::path::Path;

use crate::shared::frame::Frame;
use crate::video::domain::image_writer::ImageWriter;

/// Encodes frames with the `image` crate, format chosen by extension.
///
/// RGB frames are written as-is; single-channel frames (e.g. motion masks)
/// are written as grayscale.
pub struct ImageFileWriter;

impl ImageFileWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageWriter for ImageFileWriter {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        if frame.is_empty() {
            return Err(format!("refusing to write empty frame to {}", path.display()).into());
        }

        let raw = frame.data().to_vec();
        match frame.channels() {
            3 => image::RgbImage::from_raw(frame.width(), frame.height(), raw)
                .ok_or("frame data does not match its RGB dimensions")?
                .save(path)?,
            1 => image::GrayImage::from_raw(frame.width(), frame.height(), raw)
                .ok_or("frame data does not match its grayscale dimensions")?
                .save(path)?,
            n => return Err(format!("unsupported channel count {n}").into()),
        }
        Ok(())
    }
}
