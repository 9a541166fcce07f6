//! Pipeline configuration.
//!
//! ```rust
//! use nli_datasets::Config;
//! use std::time::Duration;
//!
//! let config = Config::default()
//!     .with_cache_dir("/tmp/nli-cache")
//!     .with_workers(4)
//!     .with_read_timeout(Duration::from_secs(60))
//!     .with_progress(false);
//! assert!(config.validate().is_ok());
//! ```

use crate::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable overriding the default cache root.
pub const CACHE_DIR_ENV: &str = "NLI_DATASETS_CACHE";

/// Default TCP connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(3050);

/// Default timeout between bytes of a response body.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(27);

/// Default download chunk size in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Default size of the normalization worker pool.
pub const DEFAULT_WORKERS: usize = 20;

/// Settings shared by every stage of a [`crate::Pipeline`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Root directory holding archives and extraction directories.
    pub cache_dir: PathBuf,
    /// TCP connect timeout for archive downloads.
    pub connect_timeout: Duration,
    /// Read timeout for archive downloads.
    pub read_timeout: Duration,
    /// Bytes written per download chunk.
    pub chunk_size: usize,
    /// Normalization worker threads.
    pub workers: usize,
    /// Draw a download progress bar on stderr.
    pub progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            chunk_size: DEFAULT_CHUNK_SIZE,
            workers: DEFAULT_WORKERS,
            progress: true,
        }
    }
}

impl Config {
    /// Set the cache root.
    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = cache_dir.into();
        self
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the read timeout.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Set the download chunk size.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the normalization pool size.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Enable or disable the progress bar.
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Reject settings no stage can run with.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::configuration("workers must be at least 1"));
        }
        if self.chunk_size == 0 {
            return Err(Error::configuration("chunk_size must be at least 1 byte"));
        }
        if self.connect_timeout.is_zero() || self.read_timeout.is_zero() {
            return Err(Error::configuration("timeouts must be non-zero"));
        }
        if self.cache_dir.as_os_str().is_empty() {
            return Err(Error::configuration("cache_dir must not be empty"));
        }
        Ok(())
    }
}

/// `$NLI_DATASETS_CACHE`, else `<user cache>/nli-datasets/data`.
fn default_cache_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(CACHE_DIR_ENV).filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".").join(".cache"))
        .join("nli-datasets")
        .join("data")
}
