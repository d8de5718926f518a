use std::path::{Path, PathBuf};

use crate::events::domain::evidence_writer::EvidenceWriter;
use crate::shared::frame::Frame;
use crate::video::domain::image_writer::ImageWriter;

/// Stores the full frame behind a line-crossing incident as
/// `event_<unix-ms>.jpg`.
pub struct ThumbnailWriter {
    writer: Box<dyn ImageWriter>,
    dir: PathBuf,
}

impl ThumbnailWriter {
    /// Creates `dir` if needed.
    pub fn new(writer: Box<dyn ImageWriter>, dir: &Path) -> std::io::Result<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            writer,
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, timestamp: f64) -> PathBuf {
        let millis = (timestamp * 1000.0) as i64;
        self.dir.join(format!("event_{millis}.jpg"))
    }
}

impl EvidenceWriter for ThumbnailWriter {
    fn persist(&self, timestamp: f64, frame: &Frame) -> PathBuf {
        let path = self.path_for(timestamp);
        match self.writer.write(&path, frame) {
            Ok(()) => log::info!("[THUMB] {}", path.display()),
            Err(e) => log::warn!("Failed to write thumbnail {}: {e}", path.display()),
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::infrastructure::image_file_writer::ImageFileWriter;

    struct FailingWriter;

    impl ImageWriter for FailingWriter {
        fn write(&self, _path: &Path, _frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
            Err("disk full".into())
        }
    }

    fn frame() -> Frame {
        Frame::new(vec![128; 8 * 6 * 3], 8, 6, 3, 0)
    }

    #[test]
    fn test_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("thumbs");
        let writer = ThumbnailWriter::new(Box::new(ImageFileWriter::new()), &dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(writer.dir(), dir.as_path());
    }

    #[test]
    fn test_persist_writes_millisecond_named_jpeg() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = ThumbnailWriter::new(Box::new(ImageFileWriter::new()), tmp.path()).unwrap();

        let path = writer.persist(1_700_000_000.5, &frame());

        assert_eq!(path, tmp.path().join("event_1700000000500.jpg"));
        let img = image::open(&path).unwrap();
        assert_eq!((img.width(), img.height()), (8, 6));
    }

    #[test]
    fn test_failed_write_still_returns_path() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = ThumbnailWriter::new(Box::new(FailingWriter), tmp.path()).unwrap();

        let path = writer.persist(2.5, &frame());

        assert_eq!(path, tmp.path().join("event_2500.jpg"));
        assert!(!path.exists());
    }
}
