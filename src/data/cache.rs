//! Month cache of Horizons vector tables
//!
//! Each tracked identifier has, per month, up to three files under
//! `<data>/<year>_<month>/`:
//!
//! * `<id>.csv.bin` packed [`State`] records, authoritative when present
//! * `<id>.csv` the vector table in upstream units (km, km/s)
//! * `<id>.txt` the raw Horizons response
//!
//! Lookups try the binary file, then the CSV, then the raw response and only
//! then the network. Every tier below the binary one writes the files above
//! it and finishes by reading the binary file back.

use crate::celestial::State;
use crate::constants::META_FILE;
use crate::data::decoder::{decode_horizons_result, DecodedResult};
use crate::data::downloader::{download_month, Transport};
use crate::data::files::{file_exists_and_not_empty, write_file};
use crate::data::meta::MetadataStore;
use crate::data::records::{load_states, load_vector_csv, save_states};
use crate::time::MonthKey;
use crate::{Result, UnisimError};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Characters that may not appear in a cache file name
const INVALID_FILENAME_CHARS: [char; 9] = ['/', '<', '>', ':', '"', '\\', '|', '?', '*'];

/// Turn a Horizons command string into a file name stem
pub fn sanitize_identifier(id: &str) -> String {
    id.chars()
        .map(|c| {
            if INVALID_FILENAME_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// The cache files of one identifier in one month
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePaths {
    pub dir: PathBuf,
    pub txt: PathBuf,
    pub csv: PathBuf,
    pub bin: PathBuf,
}

impl CachePaths {
    pub fn new<P: AsRef<Path>>(data_dir: P, id: &str, month: MonthKey) -> Self {
        let dir = data_dir.as_ref().join(month.dir_name());
        let stem = sanitize_identifier(id);
        Self {
            txt: dir.join(format!("{}.txt", stem)),
            csv: dir.join(format!("{}.csv", stem)),
            bin: dir.join(format!("{}.csv.bin", stem)),
            dir,
        }
    }

    /// Where a download is written before it is moved to [`CachePaths::txt`]
    pub fn download_tmp(&self) -> PathBuf {
        self.txt.with_extension("txt.tmp")
    }
}

/// Tiered cache over a data directory
pub struct CacheStore {
    data_dir: PathBuf,
    meta: MetadataStore,
    transport: Box<dyn Transport>,
}

impl CacheStore {
    /// Create a cache rooted at `data_dir`, keeping metadata in `meta.json`
    pub fn new<P: AsRef<Path>>(data_dir: P, transport: Box<dyn Transport>) -> Self {
        let data_dir = data_dir.as_ref().to_path_buf();
        Self {
            meta: MetadataStore::new(data_dir.join(META_FILE)),
            data_dir,
            transport,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn meta(&self) -> &MetadataStore {
        &self.meta
    }

    pub fn paths(&self, id: &str, month: MonthKey) -> CachePaths {
        CachePaths::new(&self.data_dir, id, month)
    }

    /// Rows of `id` for one month, with the final row dropped
    ///
    /// The query window closes on the first instant of the following month;
    /// that boundary row is not returned.
    pub fn month_states(&self, id: &str, month: MonthKey) -> Result<Vec<State>> {
        let mut states = self.load_rows(id, month)?;
        states.pop();
        Ok(states)
    }

    /// Every row the cache holds for `id` in one month
    ///
    /// Fails only when the network tier fails.
    pub fn load_rows(&self, id: &str, month: MonthKey) -> Result<Vec<State>> {
        let paths = self.paths(id, month);

        if paths.bin.is_file() {
            match load_states(&paths.bin) {
                Ok(states) => {
                    debug!("Loaded {} rows of {} from {}", states.len(), id, paths.bin.display());
                    return Ok(states);
                }
                Err(e) => warn!("Unreadable binary cache for {} ({}), trying CSV", id, e),
            }
        }

        if paths.csv.is_file() {
            match self.restore_from_csv(&paths) {
                Ok(states) => return Ok(states),
                Err(e) => warn!("Unreadable CSV cache for {} ({}), trying raw response", id, e),
            }
        } else {
            info!("Missing csv for {} in {}", id, month);
        }

        if file_exists_and_not_empty(&paths.txt) {
            info!("Found raw response for {}, restoring", id);
            match self.restore_from_raw(id, &paths) {
                Ok(states) => return Ok(states),
                Err(e) => warn!("Unusable raw response for {} ({}), downloading", id, e),
            }
        }

        self.fetch(id, month, &paths)
    }

    /// Tier 2: rebuild the binary file from the CSV
    fn restore_from_csv(&self, paths: &CachePaths) -> Result<Vec<State>> {
        let states = load_vector_csv(&paths.csv)?;
        save_states(&paths.bin, &states)?;
        debug!("Wrote {} rows to {}", states.len(), paths.bin.display());
        load_states(&paths.bin)
    }

    /// Tier 3: decode the raw response and rebuild CSV and binary files
    fn restore_from_raw(&self, id: &str, paths: &CachePaths) -> Result<Vec<State>> {
        let content = fs::read_to_string(&paths.txt)?;
        let decoded = decode_horizons_result(&content);
        self.persist_decoded(id, &decoded, paths)
    }

    /// Tier 4: download, keep the raw response, then derive the other files
    ///
    /// The raw response is kept even when it carries no vector table; the
    /// raw tier rejects it on the next lookup and downloads again.
    fn fetch(&self, id: &str, month: MonthKey, paths: &CachePaths) -> Result<Vec<State>> {
        let content = download_month(self.transport.as_ref(), id, month)?;
        let tmp = paths.download_tmp();
        write_file(&tmp, &content)?;
        fs::rename(&tmp, &paths.txt)?;

        let decoded = decode_horizons_result(&content);
        let states = self.persist_decoded(id, &decoded, paths)?;
        info!("Cached {} for {} in {}", id, month, paths.dir.display());
        Ok(states)
    }

    fn persist_decoded(
        &self,
        id: &str,
        decoded: &DecodedResult,
        paths: &CachePaths,
    ) -> Result<Vec<State>> {
        if !decoded.has_table() {
            return Err(UnisimError::DataError(format!(
                "Response for {} has no vector table",
                id
            )));
        }
        if let Some(category) = self.meta.merge(id, decoded)? {
            info!("Added {} ({}) to {} metadata", id, decoded.name, category.key());
        }
        write_file(&paths.csv, &decoded.csv)?;
        self.restore_from_csv(paths)
    }
}

/// Write a `.csv.bin` next to every `.csv` under the month directories of
/// `data_dir`, returning how many files were converted
///
/// Files that fail to parse are skipped with a warning.
pub fn convert_csv_tree<P: AsRef<Path>>(data_dir: P) -> Result<usize> {
    let mut converted = 0;
    for month_dir in fs::read_dir(data_dir)? {
        let month_dir = month_dir?.path();
        if !month_dir.is_dir() {
            continue;
        }
        for entry in fs::read_dir(&month_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("csv") {
                continue;
            }
            let bin = path.with_extension("csv.bin");
            match load_vector_csv(&path).and_then(|states| save_states(&bin, &states)) {
                Ok(()) => {
                    debug!("Converted {}", path.display());
                    converted += 1;
                }
                Err(e) => warn!("Skipping {}: {}", path.display(), e),
            }
        }
    }
    Ok(converted)
}
