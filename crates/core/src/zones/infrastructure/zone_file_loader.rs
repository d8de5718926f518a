use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::zones::domain::zone::ZoneDefinition;

#[derive(Debug, thiserror::Error)]
pub enum ZoneConfigError {
    #[error("failed to read zone file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid zone file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("duplicate zone name '{0}'")]
    DuplicateName(String),
}

/// Loads zone definitions from a JSON array of `{name, x, y, width, height}`.
///
/// An unset or nonexistent path yields the single default zone. Every loaded
/// zone is clamped into the unit square.
pub fn load_zones(path: Option<&Path>) -> Result<Vec<ZoneDefinition>, ZoneConfigError> {
    let path = match path {
        Some(p) if p.exists() => p,
        Some(p) => {
            log::info!(
                "Zone file {} not found, using the default zone",
                p.display()
            );
            return Ok(vec![ZoneDefinition::default_zone()]);
        }
        None => return Ok(vec![ZoneDefinition::default_zone()]),
    };

    let content = std::fs::read_to_string(path).map_err(|source| ZoneConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let zones = parse_zones(&content).map_err(|source| ZoneConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let mut seen = HashSet::new();
    for zone in &zones {
        if !seen.insert(zone.name()) {
            return Err(ZoneConfigError::DuplicateName(zone.name().to_string()));
        }
    }

    log::info!("Loaded {} zone(s) from {}", zones.len(), path.display());
    Ok(zones)
}

fn parse_zones(content: &str) -> Result<Vec<ZoneDefinition>, serde_json::Error> {
    serde_json::from_str(content)
}
