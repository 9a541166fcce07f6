//! # nli-datasets
//!
//! Natural language inference datasets for Rust: download, cache, parse and
//! normalize entailment corpora into one record shape.
//!
//! - **Acquisition**: one GET per archive, cached on disk, unpacked once
//! - **Parsing**: CSV / TSV (quoting off) and JSON lines
//! - **Normalization**: canonical columns, label filtering, index encoding
//! - **Combination**: concatenate splits across datasets and group aliases
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nli_datasets::{Config, MetaLoader, Pipeline, Registry, Split};
//!
//! let registry = Registry::builtin()?;
//! let pipeline = Pipeline::new(&Config::default())?;
//!
//! let meta = MetaLoader::new(&registry, &pipeline, &["snli", "anli"])?;
//! let train = meta.load(Split::Train)?;
//! for record in train.iter().take(3) {
//!     println!("{} => {} [{}]", record.premise, record.hypothesis,
//!         train.decode_label(record.label).unwrap_or("?"));
//! }
//! # Ok::<(), nli_datasets::Error>(())
//! ```
//!
//! ## Custom Datasets
//!
//! ```rust
//! use nli_datasets::{DatasetSpec, LabelKind, Split};
//!
//! let spec = DatasetSpec::ternary("https://example.org/my_nli.zip")
//!     .train("my_nli/train.jsonl")
//!     .test("my_nli/test.jsonl")
//!     .premise_column("context")
//!     .entailment("e")
//!     .neutral("n")
//!     .contradiction("c")
//!     .build()?;
//!
//! assert_eq!(spec.kind(), LabelKind::Ternary);
//! assert_eq!(spec.splits(), vec![Split::Train, Split::Test]);
//! # Ok::<(), nli_datasets::Error>(())
//! ```
//!
//! ## Label Encoding
//!
//! | Kind | 0 | 1 | 2 |
//! |------|---|---|---|
//! | binary | `entailment` | `not_entailment` | |
//! | ternary | `entailment` | `neutral` | `contradiction` |
//!
//! Rows whose source label is not in a dataset's vocabulary (SNLI's `"-"`,
//! missing labels) are dropped before encoding.
//!
//! Indices follow the declaration order above, **not** alphabetical order.
//! Tooling that sorts class names before encoding assigns ternary ids
//! `contradiction`=0, `entailment`=1, `neutral`=2 instead; go through
//! [`RecordCollection::label_names`] or [`RecordCollection::decode_label`]
//! rather than hard-coding ids when mixing the two.
//!
//! ## Stages
//!
//! | Stage | Type | Module |
//! |-------|------|--------|
//! | Cache layout | [`CacheStore`] | [`acquire::cache`] |
//! | Download | [`Fetcher`] | [`acquire::fetch`] |
//! | Unpack | [`Extractor`] | [`acquire::extract`] |
//! | Parse | [`SourceFormat`] | [`reader`] |
//! | Normalize | [`Normalizer`] | [`normalize`] |
//! | Per-dataset | [`DatasetLoader`] | [`loader`] |
//! | Multi-dataset | [`Combiner`], [`MetaLoader`] | [`combine`], [`meta`] |

#![warn(missing_docs)]

pub mod acquire;
pub mod cancel;
pub mod combine;
pub mod config;
mod error;
pub mod loader;
pub mod meta;
pub mod normalize;
pub mod reader;
pub mod record;
pub mod registry;
pub mod spec;
pub mod types;

pub use acquire::{ArchiveFormat, CacheEntry, CacheStore, Extractor, Fetcher};
pub use cancel::CancellationToken;
pub use combine::{Combiner, SplitSelection};
pub use config::Config;
pub use error::{Error, Result};
pub use loader::{DatasetLoader, Pipeline};
pub use meta::MetaLoader;
pub use normalize::Normalizer;
pub use reader::{RawRecord, SourceFormat};
pub use record::{DatasetDict, MappedRecord, Record, RecordCollection};
pub use registry::Registry;
pub use spec::{DataFiles, DatasetSpec, DatasetSpecBuilder, LabelVocabulary};
pub use types::{LabelKind, LabelValue, NliLabel, Split};
