use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Finds moving blobs in a frame sequence.
///
/// Implementations keep their own background model, so frames must be fed
/// in capture order. Returns the bounding box of every external contour of
/// the foreground mask, unfiltered.
pub trait MotionDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Vec<Region>;
}
