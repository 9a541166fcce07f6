//! Per-dataset loading: cache, fetch, extract, read, normalize.
//!
//! A [`Pipeline`] bundles the stages shared by every dataset (cache store,
//! HTTP agent, normalization pool, cancellation token). A [`DatasetLoader`]
//! drives those stages for one named [`DatasetSpec`].
//!
//! ```rust,no_run
//! use nli_datasets::{Config, DatasetSpec, Pipeline, Split};
//!
//! let pipeline = Pipeline::new(&Config::default())?;
//! let spec = DatasetSpec::binary("https://dl.fbaipublicfiles.com/glue/data/RTE.zip")
//!     .train("RTE/train.tsv")
//!     .validation("RTE/dev.tsv")
//!     .premise_column("sentence1")
//!     .hypothesis_column("sentence2")
//!     .build()?;
//!
//! let loader = pipeline.loader("glue/rte", spec);
//! let dev = loader.load_split(Split::Validation)?;
//! println!("{} validation records", dev.len());
//! # Ok::<(), nli_datasets::Error>(())
//! ```

use crate::acquire::{CacheEntry, CacheStore, Extractor, Fetcher};
use crate::cancel::CancellationToken;
use crate::config::Config;
use crate::normalize::Normalizer;
use crate::reader;
use crate::record::{DatasetDict, RecordCollection};
use crate::spec::DatasetSpec;
use crate::types::{LabelKind, Split};
use crate::{Error, Result};
use std::sync::Arc;

// =============================================================================
// Pipeline
// =============================================================================

/// Stages shared by all loaders built from one [`Config`].
#[derive(Debug, Clone)]
pub struct Pipeline {
    cache: CacheStore,
    fetcher: Fetcher,
    extractor: Extractor,
    normalizer: Normalizer,
    cancel: CancellationToken,
}

impl Pipeline {
    /// Build the stages described by `config`.
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            cache: CacheStore::new(&config.cache_dir),
            fetcher: Fetcher::new(config),
            extractor: Extractor::new(),
            normalizer: Normalizer::new(config.workers)?,
            cancel: CancellationToken::new(),
        })
    }

    /// Use `cancel` for every stage run through this pipeline.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// The cache store.
    #[must_use]
    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// The cancellation token.
    #[must_use]
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// A loader for `spec` under `name`.
    pub fn loader(&self, name: impl Into<String>, spec: impl Into<Arc<DatasetSpec>>) -> DatasetLoader {
        DatasetLoader {
            name: name.into(),
            spec: spec.into(),
            pipeline: self.clone(),
        }
    }

    /// Ensure the cache root exists and `spec`'s archive is downloaded and
    /// extracted. Returns the cache entry.
    pub fn prepare(&self, spec: &DatasetSpec) -> Result<CacheEntry> {
        self.cache.ensure_dir()?;
        let entry = self.cache.entry(spec.url())?;
        self.fetcher.fetch(&entry, &self.cancel)?;
        self.extractor.extract(&entry, &self.cancel)?;
        Ok(entry)
    }
}

// =============================================================================
// DatasetLoader
// =============================================================================

/// Loads one named dataset through a [`Pipeline`].
#[derive(Debug, Clone)]
pub struct DatasetLoader {
    name: String,
    spec: Arc<DatasetSpec>,
    pipeline: Pipeline,
}

impl DatasetLoader {
    /// Dataset name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The dataset's spec.
    #[must_use]
    pub fn spec(&self) -> &DatasetSpec {
        &self.spec
    }

    /// Binary or ternary.
    #[must_use]
    pub fn kind(&self) -> LabelKind {
        self.spec.kind()
    }

    /// Declared splits in canonical order.
    #[must_use]
    pub fn splits(&self) -> Vec<Split> {
        self.spec.splits()
    }

    /// Whether `split` is declared.
    #[must_use]
    pub fn has_split(&self, split: Split) -> bool {
        self.spec.files(split).is_some()
    }

    /// Load one split.
    ///
    /// Fails with [`Error::UnknownSplit`] before any download if the spec
    /// does not declare `split`.
    pub fn load_split(&self, split: Split) -> Result<RecordCollection> {
        let files = self
            .spec
            .files(split)
            .ok_or_else(|| Error::unknown_split(split.as_str(), &self.name))?;
        let format = self.spec.source_format()?;
        let entry = self.pipeline.prepare(&self.spec)?;

        log::info!("Loading {}/{}", self.name, split);
        let rows = reader::read_split(entry.extract_dir(), files, format)?;
        self.pipeline
            .normalizer
            .normalize(rows, &self.spec, &self.pipeline.cancel)
    }

    /// Load every declared split.
    pub fn load_all_splits(&self) -> Result<DatasetDict> {
        let mut dict = DatasetDict::new();
        for split in self.spec.splits() {
            dict.insert(split, self.load_split(split)?);
        }
        Ok(dict)
    }
}
