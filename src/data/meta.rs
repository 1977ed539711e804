//! Shared metadata document (`meta.json`)
//!
//! The document maps category (`celestial`, `comet`, `barycenter`) to
//! identifier to `{name, desc, GM, radius}`. Every mutation reads the whole
//! document from disk, changes it and writes it back. Two processes sharing
//! a data directory can therefore lose each other's updates.

use crate::celestial::{names, BodyCategory};
use crate::data::decoder::DecodedResult;
use crate::data::files::{read_or_create, write_file};
use crate::Result;
use log::{debug, warn};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

fn default_radius() -> [f64; 3] {
    [1.0, 1.0, 1.0]
}

/// Metadata of one identifier within one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub desc: String,
    /// Gravitational parameter in m^3/s^2; only stored for celestial bodies
    #[serde(rename = "GM", default, skip_serializing_if = "Option::is_none")]
    pub gm: Option<f64>,
    /// Radius in meters
    #[serde(default = "default_radius")]
    pub radius: [f64; 3],
}

impl MetaEntry {
    /// Build the entry a decoded response contributes to `category`
    pub fn from_decoded(decoded: &DecodedResult, category: BodyCategory) -> Self {
        Self {
            name: decoded.name.clone(),
            desc: decoded.desc.clone(),
            gm: match category {
                BodyCategory::Celestial => Some(decoded.gm),
                _ => None,
            },
            radius: [decoded.radius.x, decoded.radius.y, decoded.radius.z],
        }
    }
}

/// The parsed metadata document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaDocument {
    #[serde(default)]
    pub celestial: BTreeMap<String, MetaEntry>,
    #[serde(default)]
    pub comet: BTreeMap<String, MetaEntry>,
    #[serde(default)]
    pub barycenter: BTreeMap<String, MetaEntry>,
    /// Keys this crate does not know about, kept across rewrites
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Resolved metadata used to build a [`crate::celestial::Body`]
#[derive(Debug, Clone, PartialEq)]
pub struct BodyMeta {
    pub category: BodyCategory,
    pub name: String,
    pub desc: String,
    /// 0 for comets and barycenters
    pub gm: f64,
    /// `(-1, -1, -1)` for barycenters
    pub radius: Vector3<f64>,
}

impl MetaDocument {
    fn entries_mut(&mut self, category: BodyCategory) -> &mut BTreeMap<String, MetaEntry> {
        match category {
            BodyCategory::Celestial => &mut self.celestial,
            BodyCategory::Comet => &mut self.comet,
            BodyCategory::Barycenter => &mut self.barycenter,
        }
    }

    /// Insert an entry unless the identifier already has one in that category
    ///
    /// Returns whether the document changed.
    pub fn insert_if_absent(&mut self, category: BodyCategory, id: &str, entry: MetaEntry) -> bool {
        let entries = self.entries_mut(category);
        if entries.contains_key(id) {
            return false;
        }
        entries.insert(id.to_string(), entry);
        true
    }

    /// Look an identifier up, trying celestial, then comet, then barycenter
    pub fn lookup(&self, id: &str) -> Option<BodyMeta> {
        if let Some(e) = self.celestial.get(id) {
            return Some(BodyMeta {
                category: BodyCategory::Celestial,
                name: e.name.clone(),
                desc: e.desc.clone(),
                gm: e.gm.unwrap_or(0.0),
                radius: Vector3::from(e.radius),
            });
        }
        if let Some(e) = self.comet.get(id) {
            return Some(BodyMeta {
                category: BodyCategory::Comet,
                name: e.name.clone(),
                desc: e.desc.clone(),
                gm: 0.0,
                radius: Vector3::from(e.radius),
            });
        }
        self.barycenter.get(id).map(|e| BodyMeta {
            category: BodyCategory::Barycenter,
            name: e.name.clone(),
            desc: e.desc.clone(),
            gm: 0.0,
            radius: Vector3::new(-1.0, -1.0, -1.0),
        })
    }
}

/// Category a decoded response is filed under
///
/// Massive bodies go to `celestial`; otherwise known barycenter identifiers go
/// to `barycenter` and everything else to `comet`.
pub fn classify(id: &str, decoded: &DecodedResult) -> BodyCategory {
    if decoded.is_big {
        BodyCategory::Celestial
    } else if names::is_barycenter(id) {
        BodyCategory::Barycenter
    } else {
        BodyCategory::Comet
    }
}

/// Handle on the on-disk metadata document
#[derive(Debug, Clone)]
pub struct MetadataStore {
    path: PathBuf,
}

impl MetadataStore {
    /// Create a store backed by `path`; nothing is read until first use
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the backing document
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document, creating an empty file when it is missing
    ///
    /// An unparsable document is treated as empty.
    pub fn load(&self) -> Result<MetaDocument> {
        let outcome = read_or_create(&self.path, "")?;
        let content = outcome.content();
        if content.trim().is_empty() {
            return Ok(MetaDocument::default());
        }
        match serde_json::from_str(content) {
            Ok(doc) => Ok(doc),
            Err(e) => {
                warn!(
                    "Ignoring unreadable metadata document {}: {}",
                    self.path.display(),
                    e
                );
                Ok(MetaDocument::default())
            }
        }
    }

    /// Write the whole document back to disk
    pub fn save(&self, doc: &MetaDocument) -> Result<()> {
        let json = serde_json::to_string_pretty(doc)?;
        write_file(&self.path, &json)
    }

    /// Merge what a decoded response says about `id` into the document
    ///
    /// The entry is only added when `id` has none in the chosen category yet.
    /// Returns the category written, if any.
    pub fn merge(&self, id: &str, decoded: &DecodedResult) -> Result<Option<BodyCategory>> {
        let category = classify(id, decoded);
        let mut doc = self.load()?;
        let written =
            doc.insert_if_absent(category, id, MetaEntry::from_decoded(decoded, category));
        self.save(&doc)?;

        if written {
            debug!("Recorded {} as {} in {}", id, category.key(), self.path.display());
            Ok(Some(category))
        } else {
            Ok(None)
        }
    }

    /// Resolve the metadata of `id`
    pub fn lookup(&self, id: &str) -> Result<Option<BodyMeta>> {
        Ok(self.load()?.lookup(id))
    }
}
