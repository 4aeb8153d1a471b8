//! Local directory backed static storage.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StorageError;

use super::{path_segments, static_url, Listing, StaticStorage};

/// Static storage reading a local directory and serving unhashed URLs.
///
/// # Example
///
/// ```ignore
/// use ecole_biblique::storage::{FileSystemStorage, StaticStorage};
///
/// let storage = FileSystemStorage::new("static", "/static/");
/// let listing = storage.list_children("images/gallery")?;
/// assert_eq!(storage.url("images/gallery/a.png"), "/static/images/gallery/a.png");
/// ```
#[derive(Debug, Clone)]
pub struct FileSystemStorage {
    location: PathBuf,
    base_url: String,
}

impl FileSystemStorage {
    /// Create a storage over `location`, addressed under `base_url`.
    pub fn new(location: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            base_url: base_url.into(),
        }
    }

    /// Directory this storage reads from.
    pub fn location(&self) -> &Path {
        &self.location
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        let mut full = self.location.clone();
        for segment in path_segments(path)? {
            full.push(segment);
        }
        Ok(full)
    }
}

impl StaticStorage for FileSystemStorage {
    fn list_children(&self, path: &str) -> Result<Listing, StorageError> {
        let dir = self.resolve(path)?;
        let entries = fs::read_dir(&dir).map_err(|e| StorageError::from_io(path, e))?;

        let mut listing = Listing::default();
        for entry in entries {
            let entry = entry.map_err(|e| StorageError::from_io(path, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            // Follow symlinks so linked image folders are walked like real ones
            let is_dir = fs::metadata(entry.path())
                .map(|m| m.is_dir())
                .unwrap_or(false);
            if is_dir {
                listing.directories.push(name);
            } else {
                listing.files.push(name);
            }
        }

        Ok(listing)
    }

    fn url(&self, path: &str) -> String {
        static_url(&self.base_url, path)
    }
}
