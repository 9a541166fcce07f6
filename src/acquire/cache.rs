//! Deterministic URL to cache path mapping.

use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Suffix of an archive being downloaded.
const PARTIAL_ARCHIVE_SUFFIX: &str = ".part";

/// Suffix of a directory being extracted into.
const PARTIAL_DIR_SUFFIX: &str = ".partial";

/// Maps source URLs to paths under a fixed cache root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    /// Create a store rooted at `root`. Nothing is created on disk yet.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Cache root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the cache root if missing.
    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to create cache dir {:?}: {}", self.root, e),
            ))
        })
    }

    /// Paths for `url`: `root/basename(path)` and `root/stem(path)`.
    pub fn entry(&self, url: &str) -> Result<CacheEntry> {
        let name = url_file_name(url)?;
        let stem = Path::new(name)
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty() && *s != name)
            .ok_or_else(|| {
                Error::configuration(format!(
                    "archive name {name:?} in {url} has no extension to strip"
                ))
            })?;
        Ok(CacheEntry {
            url: url.to_string(),
            archive_path: self.root.join(name),
            extract_dir: self.root.join(stem),
        })
    }
}

/// Cache paths derived from one URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    url: String,
    archive_path: PathBuf,
    extract_dir: PathBuf,
}

impl CacheEntry {
    /// Source URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Where the archive is stored.
    #[must_use]
    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    /// Where the archive is unpacked.
    #[must_use]
    pub fn extract_dir(&self) -> &Path {
        &self.extract_dir
    }

    /// Temporary download target, renamed onto `archive_path` when done.
    #[must_use]
    pub fn partial_archive_path(&self) -> PathBuf {
        with_suffix(&self.archive_path, PARTIAL_ARCHIVE_SUFFIX)
    }

    /// Temporary extraction target, renamed onto `extract_dir` when done.
    #[must_use]
    pub fn partial_extract_dir(&self) -> PathBuf {
        with_suffix(&self.extract_dir, PARTIAL_DIR_SUFFIX)
    }

    /// Whether the archive has been downloaded.
    #[must_use]
    pub fn is_downloaded(&self) -> bool {
        self.archive_path.is_file()
    }

    /// Whether the archive has been extracted.
    #[must_use]
    pub fn is_extracted(&self) -> bool {
        self.extract_dir.is_dir()
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

/// Last segment of the URL path, ignoring query and fragment.
fn url_file_name(url: &str) -> Result<&str> {
    let after_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path = after_scheme
        .find('/')
        .map_or("", |idx| &after_scheme[idx..]);
    let path = path.split(['?', '#']).next().unwrap_or("");
    path.rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| Error::configuration(format!("URL has no file name: {url}")))
}
