//! Static-asset storage.
//!
//! The gallery helper and the page templates only see the [`StaticStorage`]
//! trait: list the children of a static path and resolve a static path to the
//! URL a browser should fetch.
//!
//! ```text
//! ┌──────────────────────────────┐
//! │  pages / images_in helper    │
//! └──────────────┬───────────────┘
//!                │ list_children / url
//!                ▼
//! ┌──────────────────────────────┐
//! │     StaticStorage trait      │
//! └──────────────┬───────────────┘
//!        ┌───────┴────────┐
//!        ▼                ▼
//! ┌──────────────┐ ┌───────────────┐
//! │ FileSystem   │ │  Manifest     │
//! │ (plain URLs) │ │ (hashed URLs) │
//! └──────────────┘ └───────────────┘
//! ```

mod collect;
mod filesystem;
mod manifest;

use std::sync::Arc;

pub use collect::{collect_static, hashed_name, CollectReport};
pub use filesystem::FileSystemStorage;
pub use manifest::{Manifest, ManifestStorage, MANIFEST_NAME, MANIFEST_VERSION};

use crate::error::StorageError;
use crate::settings::{Settings, StaticBackend};

// =============================================================================
// StaticStorage Trait
// =============================================================================

/// Immediate children of a static directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    /// Names of subdirectories
    pub directories: Vec<String>,

    /// Names of files
    pub files: Vec<String>,
}

/// Read-only view over the static files of the site.
///
/// Paths are relative to the static root, `/`-separated, without a leading slash.
/// The empty path denotes the root itself.
pub trait StaticStorage: Send + Sync {
    /// List the subdirectories and files directly under `path`.
    fn list_children(&self, path: &str) -> Result<Listing, StorageError>;

    /// Public URL for the static file at `path`.
    fn url(&self, path: &str) -> String;
}

impl<T: StaticStorage + ?Sized> StaticStorage for Arc<T> {
    fn list_children(&self, path: &str) -> Result<Listing, StorageError> {
        (**self).list_children(path)
    }

    fn url(&self, path: &str) -> String {
        (**self).url(path)
    }
}

/// Build the storage backend selected by the settings.
pub fn create_storage(settings: &Settings) -> Result<Arc<dyn StaticStorage>, StorageError> {
    let location = settings.static_location().to_path_buf();
    let base_url = settings.static_files.url.clone();

    match settings.static_files.backend {
        StaticBackend::Plain | StaticBackend::Compressed => {
            Ok(Arc::new(FileSystemStorage::new(location, base_url)))
        }
        StaticBackend::Manifest => Ok(Arc::new(ManifestStorage::load(location, base_url)?)),
    }
}

// =============================================================================
// Path Helpers
// =============================================================================

/// Split a static path into its segments, rejecting parent references.
pub(crate) fn path_segments(path: &str) -> Result<Vec<&str>, StorageError> {
    let mut segments = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return Err(StorageError::InvalidPath(path.to_string())),
            s if s.contains('\\') => return Err(StorageError::InvalidPath(path.to_string())),
            s => segments.push(s),
        }
    }
    Ok(segments)
}

/// Normalize a static path to its canonical `a/b/c` form.
pub(crate) fn normalize_path(path: &str) -> Result<String, StorageError> {
    Ok(path_segments(path)?.join("/"))
}

/// Join a static directory and a child name.
pub fn child_path(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}

/// Prefix `path` with the static base URL, percent-encoding each segment.
pub fn static_url(base_url: &str, path: &str) -> String {
    let encoded: Vec<String> = path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| urlencoding::encode(s).into_owned())
        .collect();
    format!("{}{}", base_url, encoded.join("/"))
}
