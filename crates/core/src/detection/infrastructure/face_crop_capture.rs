use std::path::{Path, PathBuf};

use crate::detection::domain::face_capture::FaceCapture;
use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::clock::Clock;
use crate::shared::frame::Frame;
use crate::video::domain::image_writer::ImageWriter;

/// Saves a JPEG crop of every face found in a frame.
///
/// Crops are named `face_<zone>_<unix-ms>_<idx>.jpg` inside the output
/// directory, which is created on construction.
pub struct FaceCropCapture {
    detector: Box<dyn FaceDetector>,
    writer: Box<dyn ImageWriter>,
    clock: Box<dyn Clock>,
    output_dir: PathBuf,
}

impl FaceCropCapture {
    pub fn new(
        detector: Box<dyn FaceDetector>,
        writer: Box<dyn ImageWriter>,
        clock: Box<dyn Clock>,
        output_dir: &Path,
    ) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(output_dir)?;
        Ok(Self {
            detector,
            writer,
            clock,
            output_dir: output_dir.to_path_buf(),
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

impl FaceCapture for FaceCropCapture {
    fn capture(&mut self, frame: &Frame, zone: &str) -> Vec<PathBuf> {
        let faces = match self.detector.detect(frame) {
            Ok(faces) => faces,
            Err(e) => {
                log::warn!("Face detection failed for zone {zone}: {e}");
                return Vec::new();
            }
        };

        let millis = (self.clock.now() * 1000.0) as i64;
        let zone_tag = file_safe(zone);
        let mut saved = Vec::with_capacity(faces.len());

        for (idx, face) in faces.iter().enumerate() {
            let crop = frame.crop(face);
            if crop.is_empty() {
                continue;
            }
            let target = self
                .output_dir
                .join(format!("face_{zone_tag}_{millis}_{idx}.jpg"));
            match self.writer.write(&target, &crop) {
                Ok(()) => {
                    log::info!("[FACE] {}", target.display());
                    saved.push(target);
                }
                Err(e) => log::warn!("Failed to save face crop {}: {e}", target.display()),
            }
        }

        saved
    }
}

/// Replaces characters that are unsafe in file names with `_`.
fn file_safe(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
