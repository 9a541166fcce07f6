//! Concatenating matching splits across several datasets.

use crate::loader::DatasetLoader;
use crate::record::{DatasetDict, RecordCollection};
use crate::types::Split;
use crate::{Error, Result};
use std::collections::BTreeMap;

/// Which split to take from each loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitSelection {
    /// The same split from every loader.
    Single(Split),
    /// One split per loader, in loader order.
    PerLoader(Vec<Split>),
}

impl SplitSelection {
    /// Resolve to one split per loader; fails on a length mismatch.
    pub fn resolve(&self, loaders: usize) -> Result<Vec<Split>> {
        match self {
            SplitSelection::Single(split) => Ok(vec![*split; loaders]),
            SplitSelection::PerLoader(splits) if splits.len() == loaders => Ok(splits.clone()),
            SplitSelection::PerLoader(splits) => Err(Error::SplitCountMismatch {
                expected: loaders,
                actual: splits.len(),
            }),
        }
    }
}

impl From<Split> for SplitSelection {
    fn from(split: Split) -> Self {
        SplitSelection::Single(split)
    }
}

impl From<Vec<Split>> for SplitSelection {
    fn from(splits: Vec<Split>) -> Self {
        SplitSelection::PerLoader(splits)
    }
}

impl From<&[Split]> for SplitSelection {
    fn from(splits: &[Split]) -> Self {
        SplitSelection::PerLoader(splits.to_vec())
    }
}

impl<const N: usize> From<[Split; N]> for SplitSelection {
    fn from(splits: [Split; N]) -> Self {
        SplitSelection::PerLoader(splits.to_vec())
    }
}

/// Concatenates splits of several loaders, in loader order.
///
/// Loaders run one after another: several catalog datasets share a single
/// archive, and the cache has no lock.
#[derive(Debug, Clone)]
pub struct Combiner {
    loaders: Vec<DatasetLoader>,
}

impl Combiner {
    /// Create a combiner over a non-empty list of loaders.
    pub fn new(loaders: Vec<DatasetLoader>) -> Result<Self> {
        if loaders.is_empty() {
            return Err(Error::configuration("cannot combine zero datasets"));
        }
        if let Some(other) = loaders.iter().find(|l| l.kind() != loaders[0].kind()) {
            log::warn!(
                "Combining {} ({}) with {} ({}); label spaces will be merged",
                loaders[0].name(),
                loaders[0].kind(),
                other.name(),
                other.kind()
            );
        }
        Ok(Self { loaders })
    }

    /// The loaders, in order.
    #[must_use]
    pub fn loaders(&self) -> &[DatasetLoader] {
        &self.loaders
    }

    /// Load the selected split from every loader and concatenate.
    ///
    /// A split count that does not match the loader count fails before
    /// anything is loaded. No deduplication, no shuffling.
    pub fn combine(&self, splits: impl Into<SplitSelection>) -> Result<RecordCollection> {
        let splits = splits.into().resolve(self.loaders.len())?;
        let parts = self
            .loaders
            .iter()
            .zip(splits)
            .map(|(loader, split)| loader.load_split(split))
            .collect::<Result<Vec<_>>>()?;
        RecordCollection::concat(parts)
    }

    /// Load every split of every loader and concatenate per split.
    ///
    /// The result has the union of all loaders' splits; a loader without a
    /// split contributes nothing to it.
    pub fn combine_all(&self) -> Result<DatasetDict> {
        let mut parts: BTreeMap<Split, Vec<RecordCollection>> = BTreeMap::new();
        for loader in &self.loaders {
            for (split, records) in loader.load_all_splits()? {
                parts.entry(split).or_default().push(records);
            }
        }
        parts
            .into_iter()
            .map(|(split, collections)| RecordCollection::concat(collections).map(|c| (split, c)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_split_broadcasts() {
        let splits = SplitSelection::from(Split::Train).resolve(3).unwrap();
        assert_eq!(splits, vec![Split::Train; 3]);
    }

    #[test]
    fn test_per_loader_length_must_match() {
        let selection = SplitSelection::from([Split::Train, Split::Test]);
        assert!(selection.resolve(2).is_ok());
        assert!(matches!(
            selection.resolve(4),
            Err(Error::SplitCountMismatch {
                expected: 4,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_empty_combiner_rejected() {
        assert!(matches!(
            Combiner::new(Vec::new()),
            Err(Error::Configuration(_))
        ));
    }
}
