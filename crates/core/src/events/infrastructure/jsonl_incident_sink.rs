use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, SecondsFormat};

use crate::events::domain::incident::Incident;
use crate::events::domain::incident_publisher::IncidentPublisher;

/// Appends incidents to a local JSON Lines file, one object per line.
///
/// Used when no ingestion endpoint is configured. Incidents without an `iso`
/// field get one derived from their timestamp.
pub struct JsonlIncidentSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonlIncidentSink {
    pub fn new(path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| std::io::Error::other("incident file lock poisoned"))?;
        writeln!(file, "{line}")?;
        file.flush()
    }
}

fn iso_from_timestamp(timestamp: f64) -> Option<String> {
    DateTime::from_timestamp_millis((timestamp * 1000.0).round() as i64)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

impl IncidentPublisher for JsonlIncidentSink {
    fn publish(&self, incident: Incident) {
        let incident = match (incident.iso(), iso_from_timestamp(incident.timestamp())) {
            (None, Some(iso)) => incident.with_iso(iso),
            _ => incident,
        };

        let line = match serde_json::to_string(&incident) {
            Ok(line) => line,
            Err(e) => {
                log::warn!("Failed to serialize {} incident: {e}", incident.event());
                return;
            }
        };

        match self.append(&line) {
            Ok(()) => log::info!("[EVENT] {line}"),
            Err(e) => log::warn!(
                "Failed to append incident to {}: {e}",
                self.path.display()
            ),
        }
    }
}
