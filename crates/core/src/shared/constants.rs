/// File name the face detector model is resolved under.
pub const FACE_MODEL_NAME: &str = "blazeface_short_range.onnx";

pub const DEFAULT_SOURCE: &str = "0";
pub const DEFAULT_API_URL: &str = "http://localhost:8000/incidents";
pub const DEFAULT_DATA_DIR: &str = "aqmaq-data";
pub const DEFAULT_CAPTURE_OPTIONS: &str = "rtsp_transport;tcp";

pub const DEFAULT_LINE_Y: i32 = 300;
pub const DEFAULT_NO_MOTION_SECONDS: f64 = 5.0;
pub const DEFAULT_ACTIVATION_THRESHOLD: f64 = 0.6;
pub const DEFAULT_COOLDOWN_SECONDS: f64 = 2.0;

/// Bounding-box area (px²) a contour must exceed to count as motion.
pub const DEFAULT_AREA_THRESHOLD: i64 = 500;
/// Max distance (px) between a contour's vertical center and the line.
pub const DEFAULT_LINE_TOLERANCE: i32 = 5;

pub const DEFAULT_PUBLISH_TIMEOUT_SECS: f64 = 1.0;
pub const DEFAULT_MIN_FACE_SIZE: u32 = 80;

pub const STREAM_SCHEMES: &[&str] = &["rtsp://", "rtsps://"];

pub const REOPEN_MAX_ATTEMPTS: u32 = 5;
pub const REOPEN_DELAY_MS: u64 = 500;

pub const DEFAULT_ZONE_NAME: &str = "default";
/// `(x, y, width, height)` of the zone used when no zone file is configured.
pub const DEFAULT_ZONE_RECT: (f64, f64, f64, f64) = (0.25, 0.3, 0.5, 0.4);
