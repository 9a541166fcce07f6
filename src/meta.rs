//! Loading datasets by name.
//!
//! A [`MetaLoader`] turns a list of dataset and group names into a
//! [`Combiner`]: group aliases are expanded against a [`Registry`], one
//! [`DatasetLoader`](crate::DatasetLoader) is built per atomic name, and the
//! loaders are combined in name order.
//!
//! ```rust,no_run
//! use nli_datasets::{Config, MetaLoader, Pipeline, Registry, Split};
//!
//! let registry = Registry::builtin()?;
//! let pipeline = Pipeline::new(&Config::default())?;
//!
//! // "anli" expands to anli/r1, anli/r2, anli/r3
//! let meta = MetaLoader::new(&registry, &pipeline, &["anli", "glue/rte"])?;
//! let train = meta.load([Split::Train, Split::Train, Split::Train, Split::Validation])?;
//! println!("{} records over {:?}", train.len(), train.label_names());
//! # Ok::<(), nli_datasets::Error>(())
//! ```

use crate::combine::{Combiner, SplitSelection};
use crate::loader::Pipeline;
use crate::record::{DatasetDict, RecordCollection};
use crate::registry::Registry;
use crate::{Error, Result};

/// Combines registered datasets addressed by name.
#[derive(Debug, Clone)]
pub struct MetaLoader {
    names: Vec<String>,
    combiner: Combiner,
}

impl MetaLoader {
    /// Resolve `names` and build one loader per atomic dataset.
    ///
    /// Fails on an empty list or an unknown name; nothing is downloaded.
    pub fn new<S: AsRef<str>>(registry: &Registry, pipeline: &Pipeline, names: &[S]) -> Result<Self> {
        if names.is_empty() {
            return Err(Error::configuration("no dataset names given"));
        }
        let names = registry.resolve(names)?;
        let loaders = names
            .iter()
            .map(|name| Ok(pipeline.loader(name.as_str(), registry.spec(name)?)))
            .collect::<Result<Vec<_>>>()?;
        log::debug!("Resolved datasets: {}", names.join(", "));
        Ok(Self {
            combiner: Combiner::new(loaders)?,
            names,
        })
    }

    /// Atomic dataset names after group expansion, in load order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The underlying combiner.
    #[must_use]
    pub fn combiner(&self) -> &Combiner {
        &self.combiner
    }

    /// Load and concatenate one split per atomic dataset.
    ///
    /// A list of splits must have one entry per expanded name.
    pub fn load(&self, splits: impl Into<SplitSelection>) -> Result<RecordCollection> {
        self.combiner.combine(splits)
    }

    /// Load every split of every dataset and concatenate per split.
    pub fn load_all(&self) -> Result<DatasetDict> {
        self.combiner.combine_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::types::Split;
    use tempfile::TempDir;

    fn pipeline(tmp: &TempDir) -> Pipeline {
        Pipeline::new(&Config::default().with_cache_dir(tmp.path()).with_progress(false)).unwrap()
    }

    #[test]
    fn test_group_expansion() {
        let tmp = TempDir::new().unwrap();
        let registry = Registry::builtin().unwrap();
        let meta = MetaLoader::new(&registry, &pipeline(&tmp), &["anli", "glue/rte"]).unwrap();
        assert_eq!(meta.names(), &["anli/r1", "anli/r2", "anli/r3", "glue/rte"]);
        assert_eq!(meta.combiner().loaders().len(), 4);
    }

    #[test]
    fn test_split_count_checked_against_expanded_names() {
        let tmp = TempDir::new().unwrap();
        let registry = Registry::builtin().unwrap();
        let meta = MetaLoader::new(&registry, &pipeline(&tmp), &["anli", "glue/rte"]).unwrap();
        let result = meta.load([Split::Train, Split::Validation]);
        assert!(matches!(
            result,
            Err(Error::SplitCountMismatch {
                expected: 4,
                actual: 2
            })
        ));
        // rejected before touching the cache
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_unknown_and_empty_names() {
        let tmp = TempDir::new().unwrap();
        let registry = Registry::builtin().unwrap();
        assert!(matches!(
            MetaLoader::new(&registry, &pipeline(&tmp), &["glue/mrpc"]),
            Err(Error::UnknownDataset(_))
        ));
        assert!(matches!(
            MetaLoader::new(&registry, &pipeline(&tmp), &[] as &[&str]),
            Err(Error::Configuration(_))
        ));
    }
}
