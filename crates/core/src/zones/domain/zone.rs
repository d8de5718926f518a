use serde::{Deserialize, Serialize};

use crate::shared::constants::{DEFAULT_ZONE_NAME, DEFAULT_ZONE_RECT};
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// A named rectangle in normalized frame coordinates.
///
/// All four numbers are fractions of the frame size and are clamped into
/// `[0, 1]` on construction and on deserialization, so a zone always maps
/// onto (part of) the frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "ZoneRecord")]
pub struct ZoneDefinition {
    name: String,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

/// Unvalidated wire shape of a zone.
#[derive(Deserialize)]
struct ZoneRecord {
    name: String,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl From<ZoneRecord> for ZoneDefinition {
    fn from(r: ZoneRecord) -> Self {
        Self::new(r.name, r.x, r.y, r.width, r.height)
    }
}

impl ZoneDefinition {
    pub fn new(name: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            name: name.into(),
            x: clamp_unit(x),
            y: clamp_unit(y),
            width: clamp_unit(width),
            height: clamp_unit(height),
        }
    }

    /// The zone used when no zone file is configured.
    pub fn default_zone() -> Self {
        let (x, y, width, height) = DEFAULT_ZONE_RECT;
        Self::new(DEFAULT_ZONE_NAME, x, y, width, height)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Pixel rectangle of the zone on a `frame_width × frame_height` frame.
    ///
    /// Corners are truncated toward zero and the far edge is capped at the
    /// frame size.
    pub fn as_pixels(&self, frame_width: u32, frame_height: u32) -> Region {
        let fw = frame_width as f64;
        let fh = frame_height as f64;
        let x1 = (self.x * fw) as i32;
        let y1 = (self.y * fh) as i32;
        let x2 = ((self.x + self.width) * fw).min(fw) as i32;
        let y2 = ((self.y + self.height) * fh).min(fh) as i32;
        Region::from_corners(x1, y1, x2, y2)
    }

    /// Crops the zone's region of interest out of `frame`.
    pub fn extract_roi(&self, frame: &Frame) -> Frame {
        frame.crop(&self.as_pixels(frame.width(), frame.height()))
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn frame(width: u32, height: u32) -> Frame {
        Frame::new(vec![0; (width * height * 3) as usize], width, height, 3, 0)
    }

    fn rect(zone: &ZoneDefinition) -> (f64, f64, f64, f64) {
        (zone.x(), zone.y(), zone.width(), zone.height())
    }

    #[test]
    fn test_new_pulls_values_into_unit_range() {
        let zone = ZoneDefinition::new("shelf", -0.1, 1.2, 0.5, 0.5);
        assert_relative_eq!(zone.x(), 0.0);
        assert_relative_eq!(zone.y(), 1.0);
        assert_relative_eq!(zone.width(), 0.5);
        assert_relative_eq!(zone.height(), 0.5);
        assert_eq!(zone.name(), "shelf");
    }

    #[test]
    fn test_new_clamps_nan_to_zero() {
        let zone = ZoneDefinition::new("z", 2.0, -3.0, f64::NAN, 0.25);
        assert_eq!(rect(&zone), (1.0, 0.0, 0.0, 0.25));
    }

    #[test]
    fn test_deserialize_clamps() {
        let zone: ZoneDefinition = serde_json::from_str(
            r#"{"name": "door", "x": -0.5, "y": 0.5, "width": 2, "height": 0.5}"#,
        )
        .unwrap();
        assert_eq!(zone.name(), "door");
        assert_eq!(rect(&zone), (0.0, 0.5, 1.0, 0.5));
    }

    #[test]
    fn test_serializes_field_names() {
        let value = serde_json::to_value(ZoneDefinition::new("z", 0.5, 0.25, 0.5, 0.5)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"name": "z", "x": 0.5, "y": 0.25, "width": 0.5, "height": 0.5})
        );
    }

    #[test]
    fn test_default_zone() {
        let zone = ZoneDefinition::default_zone();
        assert_eq!(zone.name(), "default");
        assert_eq!(rect(&zone), (0.25, 0.3, 0.5, 0.4));
    }

    #[rstest]
    #[case((0.25, 0.3, 0.5, 0.4), Region::new(160, 144, 320, 192))]
    #[case((0.0, 0.0, 1.0, 1.0), Region::new(0, 0, 640, 480))]
    #[case((0.9, 0.9, 0.5, 0.5), Region::new(576, 432, 64, 48))]
    #[case((1.0, 1.0, 0.5, 0.5), Region::new(640, 480, 0, 0))]
    fn test_as_pixels(#[case] rect: (f64, f64, f64, f64), #[case] expected: Region) {
        let zone = ZoneDefinition::new("z", rect.0, rect.1, rect.2, rect.3);
        assert_eq!(zone.as_pixels(640, 480), expected);
    }

    #[test]
    fn test_full_frame_zone_extracts_whole_frame() {
        let zone = ZoneDefinition::new("all", 0.0, 0.0, 1.0, 1.0);
        let roi = zone.extract_roi(&frame(640, 480));
        assert_eq!((roi.width(), roi.height()), (640, 480));
    }

    #[test]
    fn test_zone_at_frame_edge_extracts_empty_roi() {
        let zone = ZoneDefinition::new("edge", 1.0, 0.0, 0.5, 1.0);
        assert!(zone.extract_roi(&frame(64, 48)).is_empty());
    }
}
