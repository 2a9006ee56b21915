//! Zone definitions file.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use skyrace_core::records::Zone;
use skyrace_core::sinks::StoreError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ZoneFile {
    #[serde(default)]
    zones: Vec<Zone>,
}

/// Read zones from `path`. A missing file means no zones yet.
pub fn load_zones(path: &Path) -> Result<Vec<Zone>, StoreError> {
    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let file: ZoneFile = serde_json::from_str(&json)?;
    tracing::debug!(
        target: "skyrace::store",
        path = %path.display(),
        zones = file.zones.len(),
        "zones.loaded"
    );
    Ok(file.zones)
}

pub fn save_zones(path: &Path, zones: &[Zone]) -> Result<(), StoreError> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|source| StoreError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    let json = serde_json::to_string_pretty(&ZoneFile {
        zones: zones.to_vec(),
    })?;
    fs::write(path, json).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}
