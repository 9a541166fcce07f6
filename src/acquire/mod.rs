//! Archive acquisition: cache layout, download and unpacking.
//!
//! The cache root holds one archive file and one extraction directory per
//! distinct source URL. There is no manifest; the existence of those paths
//! is the whole persisted state.
//!
//! ```text
//! <cache root>/
//!   snli_1.0.zip        archive  = basename(url path)
//!   snli_1.0/           extracted = stem(url path)
//!   RTE.zip
//!   RTE/
//! ```
//!
//! Both artifacts are written under a temporary name and renamed into place
//! when complete, so an interrupted run never leaves something that passes
//! the existence check. Nothing guards two processes racing on one URL.

pub mod cache;
pub mod extract;
pub mod fetch;

pub use cache::{CacheEntry, CacheStore};
pub use extract::{ArchiveFormat, Extractor};
pub use fetch::Fetcher;
