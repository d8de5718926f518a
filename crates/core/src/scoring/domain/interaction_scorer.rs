use crate::shared::frame::Frame;

/// Estimates how much interaction is happening inside a zone's ROI.
///
/// Returns a score in `[0, 1]`; a zero-area ROI scores `0.0`. Scoring never
/// fails: implementations log their own errors and return `0.0`.
pub trait InteractionScorer: Send {
    fn predict(&mut self, roi: &Frame) -> f64;
}
