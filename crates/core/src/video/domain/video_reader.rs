use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::source_spec::SourceSpec;

/// Reads frames from a camera, stream, or file.
///
/// Implementations handle I/O details (demuxer options, codec, pixel format)
/// while the pipeline works with the abstract `Frame` and `VideoMetadata`
/// types. A reader may be closed and opened again on the same source.
pub trait VideoReader: Send {
    /// Opens the source and returns its metadata.
    fn open(&mut self, source: &SourceSpec) -> Result<VideoMetadata, Box<dyn std::error::Error>>;

    /// Decodes the next frame. `Ok(None)` means the source has no more frames.
    fn read_frame(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>>;

    /// Releases any resources held by the reader.
    fn close(&mut self);
}
