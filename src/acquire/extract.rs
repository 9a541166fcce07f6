//! Unpacking cached archives.

use super::cache::CacheEntry;
use crate::cancel::CancellationToken;
use crate::{Error, Result};
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

/// Archive formats, inferred from the archive's file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// `.zip`
    Zip,
    /// `.tar`
    Tar,
    /// `.tar.gz` / `.tgz`
    TarGz,
}

impl ArchiveFormat {
    /// Infer the format from a file name.
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        if name.ends_with(".zip") {
            Ok(ArchiveFormat::Zip)
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Ok(ArchiveFormat::TarGz)
        } else if name.ends_with(".tar") {
            Ok(ArchiveFormat::Tar)
        } else {
            Err(Error::archive(format!(
                "Unsupported archive format: {}",
                path.display()
            )))
        }
    }
}

/// Unpacks a cached archive into its extraction directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct Extractor;

impl Extractor {
    /// Create an extractor.
    pub fn new() -> Self {
        Self
    }

    /// Unpack `entry`'s archive unless its extraction directory exists.
    ///
    /// Files land in [`CacheEntry::partial_extract_dir`] first and the
    /// directory is renamed into place once unpacking succeeded.
    pub fn extract(&self, entry: &CacheEntry, cancel: &CancellationToken) -> Result<()> {
        if entry.is_extracted() {
            log::debug!("Archive already extracted: {}", entry.extract_dir().display());
            return Ok(());
        }
        cancel.check()?;

        let archive = entry.archive_path();
        let format = ArchiveFormat::from_path(archive)?;
        let staging = entry.partial_extract_dir();
        if staging.exists() {
            log::warn!("Removing stale partial extraction {}", staging.display());
            fs::remove_dir_all(&staging)?;
        }
        fs::create_dir_all(&staging)?;

        log::info!("Extracting {} to {}", archive.display(), entry.extract_dir().display());
        if let Err(e) = unpack(archive, &staging, format) {
            if let Err(rm) = fs::remove_dir_all(&staging) {
                log::warn!("Failed to remove {}: {}", staging.display(), rm);
            }
            return Err(e);
        }
        if let Err(e) = cancel.check() {
            fs::remove_dir_all(&staging)?;
            return Err(e);
        }

        fs::rename(&staging, entry.extract_dir())?;
        Ok(())
    }
}

fn unpack(archive: &Path, dest: &Path, format: ArchiveFormat) -> Result<()> {
    let file = File::open(archive)?;
    match format {
        ArchiveFormat::Zip => {
            let mut zip =
                zip::ZipArchive::new(BufReader::new(file)).map_err(|e| corrupt(archive, e))?;
            zip.extract(dest).map_err(|e| corrupt(archive, e))
        }
        ArchiveFormat::Tar => tar::Archive::new(BufReader::new(file))
            .unpack(dest)
            .map_err(|e| corrupt(archive, e)),
        ArchiveFormat::TarGz => tar::Archive::new(GzDecoder::new(BufReader::new(file)))
            .unpack(dest)
            .map_err(|e| corrupt(archive, e)),
    }
}

fn corrupt(archive: &Path, e: impl std::fmt::Display) -> Error {
    Error::archive(format!("Failed to unpack {}: {}", archive.display(), e))
}
