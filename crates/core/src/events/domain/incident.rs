use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The kinds of incident the pipeline emits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    MotionStart,
    MotionEnd,
    CrossLine,
    InteractionStart,
    InteractionEnd,
    FaceCapture,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::MotionStart => "motion_start",
            EventKind::MotionEnd => "motion_end",
            EventKind::CrossLine => "cross_line",
            EventKind::InteractionStart => "interaction_start",
            EventKind::InteractionEnd => "interaction_end",
            EventKind::FaceCapture => "face_capture",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A discrete domain event, serialized as one JSON object with absent
/// optional fields omitted.
///
/// Built with [`Incident::new`] plus the `with_*` methods and immutable
/// afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    timestamp: f64,
    event: EventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    y: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    metadata: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    iso: Option<String>,
}

impl Incident {
    /// Negative or non-finite timestamps are recorded as `0.0`.
    pub fn new(timestamp: f64, event: EventKind) -> Self {
        let timestamp = if timestamp.is_finite() && timestamp > 0.0 {
            timestamp
        } else {
            0.0
        };
        Self {
            timestamp,
            event,
            y: None,
            zone: None,
            metadata: None,
            iso: None,
        }
    }

    pub fn with_y(mut self, y: i32) -> Self {
        self.y = Some(y);
        self
    }

    pub fn with_zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = Some(zone.into());
        self
    }

    pub fn with_metadata(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value.into());
        self
    }

    pub fn with_iso(mut self, iso: impl Into<String>) -> Self {
        self.iso = Some(iso.into());
        self
    }

    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn event(&self) -> EventKind {
        self.event
    }

    pub fn y(&self) -> Option<i32> {
        self.y
    }

    pub fn zone(&self) -> Option<&str> {
        self.zone.as_deref()
    }

    pub fn metadata(&self) -> Option<&Map<String, Value>> {
        self.metadata.as_ref()
    }

    pub fn iso(&self) -> Option<&str> {
        self.iso.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(EventKind::MotionStart, "motion_start")]
    #[case(EventKind::MotionEnd, "motion_end")]
    #[case(EventKind::CrossLine, "cross_line")]
    #[case(EventKind::InteractionStart, "interaction_start")]
    #[case(EventKind::InteractionEnd, "interaction_end")]
    #[case(EventKind::FaceCapture, "face_capture")]
    fn test_event_kind_wire_names(#[case] kind: EventKind, #[case] name: &str) {
        assert_eq!(serde_json::to_value(kind).unwrap(), json!(name));
        assert_eq!(kind.to_string(), name);
    }

    #[test]
    fn test_minimal_incident_omits_optionals() {
        let value = serde_json::to_value(Incident::new(12.5, EventKind::MotionStart)).unwrap();
        assert_eq!(value, json!({"timestamp": 12.5, "event": "motion_start"}));
    }

    #[test]
    fn test_cross_line_carries_y() {
        let value =
            serde_json::to_value(Incident::new(1.0, EventKind::CrossLine).with_y(302)).unwrap();
        assert_eq!(value, json!({"timestamp": 1.0, "event": "cross_line", "y": 302}));
    }

    #[test]
    fn test_interaction_carries_zone_and_score() {
        let incident = Incident::new(3.0, EventKind::InteractionStart)
            .with_zone("shelf")
            .with_metadata("score", 0.75);
        assert_eq!(incident.zone(), Some("shelf"));
        assert_eq!(
            serde_json::to_value(&incident).unwrap(),
            json!({
                "timestamp": 3.0,
                "event": "interaction_start",
                "zone": "shelf",
                "metadata": {"score": 0.75}
            })
        );
    }

    #[test]
    fn test_metadata_accumulates() {
        let incident = Incident::new(1.0, EventKind::FaceCapture)
            .with_metadata("path", "faces/a.jpg")
            .with_metadata("index", 0);
        assert_eq!(incident.metadata().unwrap().len(), 2);
    }

    #[rstest]
    #[case(-4.0)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn test_invalid_timestamp_is_zero(#[case] ts: f64) {
        assert_eq!(Incident::new(ts, EventKind::MotionEnd).timestamp(), 0.0);
    }

    #[test]
    fn test_deserializes_wire_format() {
        let incident: Incident =
            serde_json::from_str(r#"{"timestamp": 2.0, "event": "motion_end"}"#).unwrap();
        assert_eq!(incident, Incident::new(2.0, EventKind::MotionEnd));
    }
}
