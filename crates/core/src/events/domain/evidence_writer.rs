use std::path::PathBuf;

use crate::shared::frame::Frame;

/// Persists the frame that triggered an incident.
///
/// Returns the target path whether or not the write succeeded; failures are
/// logged.
pub trait EvidenceWriter: Send {
    fn persist(&self, timestamp: f64, frame: &Frame) -> PathBuf;
}
