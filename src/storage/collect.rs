//! The `collectstatic` step: gather static sources into the static root.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::CollectError;

use super::manifest::{Manifest, MANIFEST_NAME};

/// Number of hex digits of the content hash kept in hashed names.
const HASH_LEN: usize = 12;

/// Outcome of a collectstatic run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectReport {
    /// Files copied into the static root
    pub copied: usize,

    /// Hashed copies written for the manifest
    pub hashed: usize,

    /// Files skipped because an earlier source already provided the same path
    pub skipped: usize,
}

/// Insert the first 12 hex digits of the SHA-256 of `content` before the extension.
///
/// `css/style.css` becomes `css/style.<hash>.css`; a name without extension
/// gets the hash appended.
pub fn hashed_name(path: &str, content: &[u8]) -> String {
    let digest = hex::encode(Sha256::digest(content));
    let hash = &digest[..HASH_LEN];

    let (dir, file) = match path.rsplit_once('/') {
        Some((dir, file)) => (Some(dir), file),
        None => (None, path),
    };
    let renamed = match file.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{}.{}.{}", stem, hash, ext),
        _ => format!("{}.{}", file, hash),
    };

    match dir {
        Some(dir) => format!("{}/{}", dir, renamed),
        None => renamed,
    }
}

/// Copy every file of `source_dirs` into `root`.
///
/// Earlier source directories win when two provide the same relative path.
/// With `hashed`, content-hashed copies and `staticfiles.json` are written too.
/// With `clear`, `root` is removed first.
pub fn collect_static(
    source_dirs: &[PathBuf],
    root: &Path,
    hashed: bool,
    clear: bool,
) -> Result<CollectReport, CollectError> {
    if clear && root.exists() {
        info!(root = %root.display(), "Clearing static root");
        fs::remove_dir_all(root).map_err(|e| io_error(root, e))?;
    }
    fs::create_dir_all(root).map_err(|e| io_error(root, e))?;

    let mut report = CollectReport::default();
    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut manifest = Manifest::new();

    for source in source_dirs {
        if !source.is_dir() {
            return Err(CollectError::MissingSource(source.display().to_string()));
        }

        for entry in WalkDir::new(source).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| source.display().to_string());
                CollectError::Io {
                    path,
                    source: e.into(),
                }
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = relative_name(source, entry.path());
            if !seen.insert(relative.clone()) {
                debug!(path = %relative, "Skipping, already collected from an earlier source");
                report.skipped += 1;
                continue;
            }

            let content = fs::read(entry.path()).map_err(|e| io_error(entry.path(), e))?;
            write_file(&root.join(&relative), &content)?;
            report.copied += 1;

            if hashed {
                let hashed_path = hashed_name(&relative, &content);
                write_file(&root.join(&hashed_path), &content)?;
                manifest.paths.insert(relative, hashed_path);
                report.hashed += 1;
            }
        }
    }

    if hashed {
        let manifest_path = root.join(MANIFEST_NAME);
        let json = serde_json::to_string_pretty(&manifest)?;
        fs::write(&manifest_path, json).map_err(|e| io_error(&manifest_path, e))?;
    }

    info!(
        copied = report.copied,
        hashed = report.hashed,
        skipped = report.skipped,
        "Static files collected into {}",
        root.display()
    );

    Ok(report)
}

/// Forward-slash path of `path` relative to `source`.
fn relative_name(source: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(source).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn write_file(path: &Path, content: &[u8]) -> Result<(), CollectError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
    }
    fs::write(path, content).map_err(|e| io_error(path, e))
}

fn io_error(path: &Path, source: std::io::Error) -> CollectError {
    CollectError::Io {
        path: path.display().to_string(),
        source,
    }
}
