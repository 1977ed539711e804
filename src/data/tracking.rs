//! The list of tracked bodies (`track_bodies.json`)
//!
//! A JSON array of Horizons command strings, e.g. `["10", "399", "301"]`.

use crate::data::files::{read_or_create, write_file, FileOutcome};
use crate::{Result, UnisimError};
use log::info;
use std::path::Path;

/// Read the tracked identifiers, creating an empty list when the file is missing
pub fn load_tracked_bodies<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let outcome = read_or_create(path, "[]")?;
    if let FileOutcome::Created(_) = outcome {
        info!("Created empty tracked bodies list at {}", path.display());
    }

    let content = outcome.into_content();
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&content).map_err(|e| {
        UnisimError::DataError(format!(
            "Tracked bodies list {} must be an array of strings: {}",
            path.display(),
            e
        ))
    })
}

/// Write the tracked identifiers back
pub fn save_tracked_bodies<P: AsRef<Path>>(path: P, ids: &[String]) -> Result<()> {
    write_file(path, &serde_json::to_string_pretty(ids)?)
}
