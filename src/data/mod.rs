//! Data module for fetching, caching and loading ephemeris tables
//!
//! Vector tables come from the JPL Horizons file API and are cached per month
//! under the data directory, together with the shared metadata document and
//! the list of tracked bodies.

pub mod cache;
pub mod decoder;
pub mod downloader;
pub mod files;
pub mod meta;
pub mod records;
pub mod tracking;

pub use cache::{convert_csv_tree, sanitize_identifier, CachePaths, CacheStore};
pub use decoder::{decode_horizons_result, DecodedResult};
pub use downloader::{download_month, HorizonsRequest, HttpTransport, Transport};
pub use files::{read_or_create, FileOutcome};
pub use meta::{BodyMeta, MetaDocument, MetadataStore};
pub use tracking::{load_tracked_bodies, save_tracked_bodies};
