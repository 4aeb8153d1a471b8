//! Manifest backed static storage with content-hashed URLs.
//!
//! `collectstatic` writes `staticfiles.json` into the static root:
//!
//! ```text
//! {
//!   "version": "1.1",
//!   "paths": {
//!     "css/style.css": "css/style.3f9a1c0b2d4e.css",
//!     "images/gallery/a.png": "images/gallery/a.5e1d07aa9c31.png"
//!   }
//! }
//! ```
//!
//! URLs are resolved through the `paths` map so browsers can cache the files
//! forever. Directory listings are derived from the original names in the
//! manifest, which keeps the hashed copies out of gallery listings.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::StorageError;

use super::{normalize_path, static_url, Listing, StaticStorage};

/// File name of the manifest inside the static root.
pub const MANIFEST_NAME: &str = "staticfiles.json";

/// Manifest format version written by `collectstatic`.
pub const MANIFEST_VERSION: &str = "1.1";

/// Mapping from original static paths to their hashed names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: String,
    pub paths: BTreeMap<String, String>,
}

impl Manifest {
    /// Create an empty manifest at the current version.
    pub fn new() -> Self {
        Self {
            version: MANIFEST_VERSION.to_string(),
            paths: BTreeMap::new(),
        }
    }

    /// Read and parse the manifest file in `root`.
    pub fn read_from(root: &Path) -> Result<Self, StorageError> {
        let path = root.join(MANIFEST_NAME);
        let raw = fs::read_to_string(&path).map_err(|e| {
            StorageError::Manifest(format!(
                "cannot read {}: {} (run `collectstatic` first)",
                path.display(),
                e
            ))
        })?;
        let manifest: Manifest = serde_json::from_str(&raw)
            .map_err(|e| StorageError::Manifest(format!("{}: {}", path.display(), e)))?;

        if manifest.version != MANIFEST_VERSION {
            return Err(StorageError::Manifest(format!(
                "unsupported manifest version {} (expected {})",
                manifest.version, MANIFEST_VERSION
            )));
        }

        Ok(manifest)
    }
}

/// Static storage that resolves URLs through `staticfiles.json`.
#[derive(Debug, Clone)]
pub struct ManifestStorage {
    location: PathBuf,
    base_url: String,
    manifest: Manifest,
}

impl ManifestStorage {
    /// Load the manifest from `location`.
    pub fn load(location: impl Into<PathBuf>, base_url: impl Into<String>) -> Result<Self, StorageError> {
        let location = location.into();
        let manifest = Manifest::read_from(&location)?;
        Ok(Self::with_manifest(location, base_url, manifest))
    }

    /// Build a storage around an already loaded manifest.
    pub fn with_manifest(
        location: impl Into<PathBuf>,
        base_url: impl Into<String>,
        manifest: Manifest,
    ) -> Self {
        Self {
            location: location.into(),
            base_url: base_url.into(),
            manifest,
        }
    }

    /// Directory the hashed files live in.
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// The loaded manifest.
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }
}

impl StaticStorage for ManifestStorage {
    fn list_children(&self, path: &str) -> Result<Listing, StorageError> {
        let dir = normalize_path(path)?;
        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{}/", dir)
        };

        let mut listing = Listing::default();
        let mut found = false;

        for original in self.manifest.paths.keys() {
            let Some(rest) = original.strip_prefix(&prefix) else {
                continue;
            };
            found = true;
            match rest.split_once('/') {
                Some((subdir, _)) => {
                    // Keys are sorted, so repeated subdirectories are adjacent
                    if listing.directories.last().map(String::as_str) != Some(subdir) {
                        listing.directories.push(subdir.to_string());
                    }
                }
                None => listing.files.push(rest.to_string()),
            }
        }

        if !found && !dir.is_empty() {
            return Err(StorageError::NotFound(dir));
        }

        Ok(listing)
    }

    fn url(&self, path: &str) -> String {
        let name = normalize_path(path).unwrap_or_else(|_| path.to_string());
        match self.manifest.paths.get(&name) {
            Some(hashed) => static_url(&self.base_url, hashed),
            None => {
                warn!(path = %name, "Missing staticfiles manifest entry, serving unhashed URL");
                static_url(&self.base_url, &name)
            }
        }
    }
}
