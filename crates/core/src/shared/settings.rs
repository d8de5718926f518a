use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::shared::constants::{
    DEFAULT_ACTIVATION_THRESHOLD, DEFAULT_API_URL, DEFAULT_AREA_THRESHOLD,
    DEFAULT_CAPTURE_OPTIONS, DEFAULT_COOLDOWN_SECONDS, DEFAULT_DATA_DIR, DEFAULT_LINE_TOLERANCE,
    DEFAULT_LINE_Y, DEFAULT_MIN_FACE_SIZE, DEFAULT_NO_MOTION_SECONDS,
    DEFAULT_PUBLISH_TIMEOUT_SECS, DEFAULT_SOURCE,
};
use crate::video::domain::source_spec::SourceSpec;

#[derive(Error, Debug, PartialEq)]
pub enum SettingsError {
    #[error("line_y must be >= 0, got {0}")]
    NegativeLineY(i32),
    #[error("{name} must be a finite number > 0, got {value}")]
    NotPositive { name: &'static str, value: f64 },
    #[error("{name} must be a finite number >= 0, got {value}")]
    Negative { name: &'static str, value: f64 },
    #[error("activation_threshold must be within [0, 1], got {0}")]
    ThresholdOutOfRange(f64),
}

/// Immutable configuration shared by every pipeline component.
///
/// Built once at the process entry point and passed down explicitly; nothing
/// in the core reads the environment.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    /// `"0"` for the default camera, an `rtsp://` URL, or a file path.
    pub source: String,
    pub line_y: i32,
    /// Incident endpoint. `None` writes incidents to the local JSONL log.
    pub api_url: Option<String>,
    pub data_dir: PathBuf,
    pub no_motion_seconds: f64,
    /// OpenCV-style `key;value|key;value` demuxer options for stream sources.
    pub capture_options: Option<String>,
    pub zone_config_path: Option<PathBuf>,
    pub zone_model_path: Option<PathBuf>,
    pub face_model_path: Option<PathBuf>,
    /// Download location for the face model when it is not cached locally.
    pub face_model_url: Option<String>,
    pub activation_threshold: f64,
    pub cooldown_seconds: f64,
    pub area_threshold: i64,
    pub line_tolerance: i32,
    /// Suppresses repeated `cross_line` incidents inside this window.
    pub crossing_debounce_seconds: Option<f64>,
    pub publish_timeout: Duration,
    /// Zero publishes synchronously on the capture loop.
    pub publish_queue_capacity: usize,
    pub min_face_size: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
            line_y: DEFAULT_LINE_Y,
            api_url: Some(DEFAULT_API_URL.to_string()),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            no_motion_seconds: DEFAULT_NO_MOTION_SECONDS,
            capture_options: Some(DEFAULT_CAPTURE_OPTIONS.to_string()),
            zone_config_path: None,
            zone_model_path: None,
            face_model_path: None,
            face_model_url: None,
            activation_threshold: DEFAULT_ACTIVATION_THRESHOLD,
            cooldown_seconds: DEFAULT_COOLDOWN_SECONDS,
            area_threshold: DEFAULT_AREA_THRESHOLD,
            line_tolerance: DEFAULT_LINE_TOLERANCE,
            crossing_debounce_seconds: None,
            publish_timeout: Duration::from_secs_f64(DEFAULT_PUBLISH_TIMEOUT_SECS),
            publish_queue_capacity: 0,
            min_face_size: DEFAULT_MIN_FACE_SIZE,
        }
    }
}

impl Settings {
    /// Checks numeric invariants, returning the settings unchanged on success.
    pub fn validate(self) -> Result<Self, SettingsError> {
        if self.line_y < 0 {
            return Err(SettingsError::NegativeLineY(self.line_y));
        }
        require_positive("no_motion_seconds", self.no_motion_seconds)?;
        require_non_negative("cooldown_seconds", self.cooldown_seconds)?;
        if let Some(debounce) = self.crossing_debounce_seconds {
            require_non_negative("crossing_debounce_seconds", debounce)?;
        }
        if !(0.0..=1.0).contains(&self.activation_threshold) {
            return Err(SettingsError::ThresholdOutOfRange(
                self.activation_threshold,
            ));
        }
        Ok(self)
    }

    pub fn thumbs_dir(&self) -> PathBuf {
        self.data_dir.join("thumbs")
    }

    pub fn faces_dir(&self) -> PathBuf {
        self.data_dir.join("faces")
    }

    pub fn db_dir(&self) -> PathBuf {
        self.data_dir.join("db")
    }

    pub fn incidents_path(&self) -> PathBuf {
        self.db_dir().join("incidents.jsonl")
    }

    pub fn is_stream_source(&self) -> bool {
        SourceSpec::parse(&self.source).is_stream()
    }
}

fn require_positive(name: &'static str, value: f64) -> Result<(), SettingsError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SettingsError::NotPositive { name, value })
    }
}

fn require_non_negative(name: &'static str, value: f64) -> Result<(), SettingsError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SettingsError::Negative { name, value })
    }
}
