//! Small file helpers shared by the cache and the metadata store

use crate::Result;
use std::fs;
use std::path::Path;

/// Outcome of [`read_or_create`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// The file existed and was read
    Opened(String),
    /// The file was missing and has been created with the default content
    Created(String),
}

impl FileOutcome {
    /// The file content, whichever way it was obtained
    pub fn content(&self) -> &str {
        match self {
            FileOutcome::Opened(s) | FileOutcome::Created(s) => s,
        }
    }

    /// Consume the outcome, keeping only the content
    pub fn into_content(self) -> String {
        match self {
            FileOutcome::Opened(s) | FileOutcome::Created(s) => s,
        }
    }
}

/// Check if a file exists and is not empty
pub fn file_exists_and_not_empty<P: AsRef<Path>>(path: P) -> bool {
    match fs::metadata(path) {
        Ok(metadata) => metadata.is_file() && metadata.len() > 0,
        Err(_) => false,
    }
}

/// Read a text file, creating it (and its parent directories) with
/// `default_content` when it does not exist
pub fn read_or_create<P: AsRef<Path>>(path: P, default_content: &str) -> Result<FileOutcome> {
    let path = path.as_ref();
    if path.is_file() {
        return Ok(FileOutcome::Opened(fs::read_to_string(path)?));
    }
    write_file(path, default_content)?;
    Ok(FileOutcome::Created(default_content.to_string()))
}

/// Write a text file, creating parent directories as needed
pub fn write_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}
