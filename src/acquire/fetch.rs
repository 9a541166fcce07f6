//! Streaming archive downloads.

use super::cache::CacheEntry;
use crate::cancel::CancellationToken;
use crate::config::Config;
use crate::{Error, Result};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::time::Duration;

/// Downloads archives into the cache, one GET per missing archive.
#[derive(Debug, Clone)]
pub struct Fetcher {
    agent: ureq::Agent,
    chunk_size: usize,
    progress: bool,
}

impl Fetcher {
    /// Create a fetcher from the timeouts, chunk size and progress flag in `config`.
    pub fn new(config: &Config) -> Self {
        Self::with_timeouts(config.connect_timeout, config.read_timeout)
            .with_chunk_size(config.chunk_size)
            .with_progress(config.progress)
    }

    /// Create a fetcher with explicit timeouts.
    pub fn with_timeouts(connect: Duration, read: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(connect)
            .timeout_read(read)
            .build();
        Self {
            agent,
            chunk_size: crate::config::DEFAULT_CHUNK_SIZE,
            progress: false,
        }
    }

    /// Set the chunk size.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Enable or disable the progress bar.
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Download `entry`'s archive unless it is already cached.
    ///
    /// The body streams into [`CacheEntry::partial_archive_path`] and is
    /// renamed into place only once complete. On failure the partial file
    /// is removed.
    pub fn fetch(&self, entry: &CacheEntry, cancel: &CancellationToken) -> Result<()> {
        if entry.is_downloaded() {
            log::debug!("Archive already cached: {}", entry.archive_path().display());
            return Ok(());
        }
        cancel.check()?;

        let partial = entry.partial_archive_path();
        match self.download(entry, cancel) {
            Ok(bytes) => {
                fs::rename(&partial, entry.archive_path())?;
                log::info!(
                    "Downloaded {} ({} bytes) to {}",
                    entry.url(),
                    bytes,
                    entry.archive_path().display()
                );
                Ok(())
            }
            Err(e) => {
                if partial.exists() {
                    if let Err(rm) = fs::remove_file(&partial) {
                        log::warn!("Failed to remove {}: {}", partial.display(), rm);
                    }
                }
                Err(e)
            }
        }
    }

    fn download(&self, entry: &CacheEntry, cancel: &CancellationToken) -> Result<u64> {
        let url = entry.url();
        log::info!("Downloading {}", url);

        let response = self.agent.get(url).call().map_err(|e| match e {
            ureq::Error::Status(code, _) => {
                Error::network(format!("HTTP {} downloading {}", code, url))
            }
            ureq::Error::Transport(t) => {
                Error::network(format!("Failed to download {}: {}", url, t))
            }
        })?;

        let total = response
            .header("content-length")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0);
        let name = entry
            .archive_path()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let pb = self.progress_bar(total, &name);

        let mut reader = response.into_reader();
        let mut writer = BufWriter::new(File::create(entry.partial_archive_path())?);
        let mut buf = vec![0u8; self.chunk_size];
        let mut written: u64 = 0;

        loop {
            cancel.check()?;
            let n = reader
                .read(&mut buf)
                .map_err(|e| Error::network(format!("Failed reading {}: {}", url, e)))?;
            if n == 0 {
                break;
            }
            writer.write_all(&buf[..n])?;
            written += n as u64;
            pb.inc(n as u64);
        }
        writer.flush()?;
        writer
            .into_inner()
            .map_err(|e| Error::Io(e.into_error()))?
            .sync_all()?;
        pb.finish_and_clear();

        if written < total {
            return Err(Error::network(format!(
                "Truncated download of {}: got {} of {} bytes",
                url, written, total
            )));
        }
        Ok(written)
    }

    fn progress_bar(&self, total: u64, name: &str) -> ProgressBar {
        if !self.progress {
            return ProgressBar::hidden();
        }
        let pb = if total > 0 {
            ProgressBar::new(total)
        } else {
            ProgressBar::new_spinner()
        };
        pb.set_draw_target(ProgressDrawTarget::stderr());
        if let Ok(style) = ProgressStyle::default_bar().template(
            "{spinner:.green} {msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes}",
        ) {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_message(format!("Downloading {}", name));
        pb
    }
}
