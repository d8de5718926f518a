use std::fmt;

use crate::shared::constants::STREAM_SCHEMES;

/// What a capture source points at, decided once from the configured string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceSpec {
    /// The platform's default local camera (`"0"`).
    DefaultDevice,
    /// A network stream (`rtsp://`, `rtsps://`) that gets low-latency options
    /// and bounded reconnects.
    Stream(String),
    /// Any other file path or URL.
    Path(String),
}

impl SourceSpec {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed == "0" {
            SourceSpec::DefaultDevice
        } else if STREAM_SCHEMES.iter().any(|s| trimmed.starts_with(s)) {
            SourceSpec::Stream(trimmed.to_string())
        } else {
            SourceSpec::Path(trimmed.to_string())
        }
    }

    pub fn is_stream(&self) -> bool {
        matches!(self, SourceSpec::Stream(_))
    }
}

impl fmt::Display for SourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceSpec::DefaultDevice => write!(f, "default camera"),
            SourceSpec::Stream(url) => write!(f, "{url}"),
            SourceSpec::Path(path) => write!(f, "{path}"),
        }
    }
}
