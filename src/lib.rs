//! Unisim: ephemeris data pipeline for a solar system viewer
//!
//! This crate fetches one-minute state vectors of solar system bodies from the
//! JPL Horizons service, caches them per month on disk and stitches them into
//! continuous trajectories that can be sampled at any instant.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod app;
pub mod celestial;
pub mod constants;
pub mod data;
pub mod time;
pub mod trajectory;

// Re-export commonly used types
pub use app::{App, BodySnapshot, Frame};
pub use celestial::{Body, BodyCategory, State};
pub use data::{CacheStore, HttpTransport, Transport};
pub use time::{MonthKey, TdbTime};

use constants::{DEFAULT_DATA_DIR, TRACK_FILE};

/// Main error type for the unisim library
#[derive(Debug, Error)]
pub enum UnisimError {
    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Object not found: {0}")]
    NotFound(String),
}

/// Result type for unisim operations
pub type Result<T> = std::result::Result<T, UnisimError>;

/// Entry point for loading tracked bodies from the cache
pub struct Loader {
    data_dir: Option<PathBuf>,
    months: usize,
    transport: Option<Box<dyn Transport>>,
}

impl Loader {
    /// Create a new loader with default data directory
    pub fn new() -> Self {
        Self {
            data_dir: None,
            months: 2,
            transport: None,
        }
    }

    /// Set a custom data directory
    pub fn with_data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.data_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set how many consecutive months are preloaded
    pub fn with_months(mut self, months: usize) -> Self {
        self.months = months;
        self
    }

    /// Use a custom transport instead of the Horizons HTTP API
    pub fn with_transport(mut self, transport: Box<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// The data directory in use
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    }

    pub fn months(&self) -> usize {
        self.months
    }

    /// Read the list of tracked identifiers, creating it if missing
    pub fn tracked_bodies(&self) -> Result<Vec<String>> {
        data::load_tracked_bodies(self.data_dir().join(TRACK_FILE))
    }

    /// Build the cache store for the data directory
    pub fn cache_store(self) -> Result<CacheStore> {
        let data_dir = self.data_dir();
        let transport = match self.transport {
            Some(transport) => transport,
            None => Box::new(HttpTransport::new()?),
        };
        Ok(CacheStore::new(data_dir, transport))
    }

    /// Load every tracked body, starting at the month `now` falls in
    pub fn preload(self, now: DateTime<Utc>) -> Result<Vec<Body>> {
        let ids = self.tracked_bodies()?;
        let months = self.months;
        let first_month = time::query_month(now, 0);
        let store = self.cache_store()?;

        trajectory::preload_bodies(&store, store.meta(), &ids, first_month, months)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}
