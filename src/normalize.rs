//! Schema normalization: project, filter, remap, encode.
//!
//! For every raw row, in this order:
//!
//! 1. take the spec's premise / hypothesis / label source columns under
//!    their canonical names and drop everything else;
//! 2. drop the row if its label is not a key of the label vocabulary
//!    (`"-"` gold labels, missing labels, stray values);
//! 3. replace the label with its canonical [`NliLabel`];
//! 4. encode the canonical label as its index in the kind's fixed order.
//!
//! Filtering happens strictly before mapping, so the mapping never sees an
//! unknown key. Rows are independent, so the work fans out over a bounded
//! rayon pool; output order still equals input order.

use crate::cancel::CancellationToken;
use crate::reader::RawRecord;
use crate::record::{MappedRecord, Record, RecordCollection};
use crate::spec::{DatasetSpec, LabelVocabulary};
use crate::types::LabelValue;
use crate::{Error, Result};
use rayon::prelude::*;
use serde_json::Value;
use std::sync::Arc;

/// A row after step 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectedRecord {
    /// Premise text.
    pub premise: String,
    /// Hypothesis text.
    pub hypothesis: String,
    /// Raw label, `None` if missing or not a string/integer.
    pub label: Option<LabelValue>,
}

/// Runs normalization on a fixed-size worker pool.
#[derive(Debug, Clone)]
pub struct Normalizer {
    pool: Arc<rayon::ThreadPool>,
}

impl Normalizer {
    /// Create a normalizer with `workers` threads.
    pub fn new(workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(Error::configuration("normalizer needs at least one worker"));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("nli-normalize-{i}"))
            .build()
            .map_err(|e| Error::configuration(format!("Failed to build worker pool: {e}")))?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Number of worker threads.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Normalize `rows` read from a source declared by `spec`.
    pub fn normalize(
        &self,
        rows: Vec<RawRecord>,
        spec: &DatasetSpec,
        cancel: &CancellationToken,
    ) -> Result<RecordCollection> {
        let total = rows.len();
        let vocabulary = spec.vocabulary();

        let records: Vec<Record> = self.pool.install(|| {
            rows.into_par_iter()
                .filter_map(|row| {
                    if let Err(e) = cancel.check() {
                        return Some(Err(e));
                    }
                    normalize_one(&row, spec).map(Ok)
                })
                .collect::<Result<Vec<Record>>>()
        })?;

        log::info!(
            "Normalized {} of {} rows ({} dropped with labels outside the vocabulary)",
            records.len(),
            total,
            total - records.len()
        );
        RecordCollection::new(records, vocabulary.label_names())
    }
}

/// Steps 1 to 4 for one row; `None` if the row is filtered out.
#[must_use]
pub fn normalize_one(row: &RawRecord, spec: &DatasetSpec) -> Option<Record> {
    let projected = project(row, spec);
    if !keep(&projected, spec.vocabulary()) {
        return None;
    }
    let mapped = remap(projected, spec.vocabulary())?;
    encode(mapped, spec.vocabulary())
}

/// Step 1: canonical column names, other columns dropped.
#[must_use]
pub fn project(row: &RawRecord, spec: &DatasetSpec) -> ProjectedRecord {
    ProjectedRecord {
        premise: text(row.get(spec.premise_column())),
        hypothesis: text(row.get(spec.hypothesis_column())),
        label: row.get(spec.label_column()).and_then(LabelValue::from_json),
    }
}

/// Step 2: whether the label is a key of the vocabulary.
#[must_use]
pub fn keep(record: &ProjectedRecord, vocabulary: &LabelVocabulary) -> bool {
    record
        .label
        .as_ref()
        .is_some_and(|label| vocabulary.contains(label))
}

/// Step 3: source label to canonical label. Only called on kept rows.
#[must_use]
pub fn remap(record: ProjectedRecord, vocabulary: &LabelVocabulary) -> Option<MappedRecord> {
    let label = vocabulary.map(record.label.as_ref()?)?;
    Some(MappedRecord {
        premise: record.premise,
        hypothesis: record.hypothesis,
        label,
    })
}

/// Step 4: canonical label to index.
#[must_use]
pub fn encode(record: MappedRecord, vocabulary: &LabelVocabulary) -> Option<Record> {
    Some(Record {
        label: vocabulary.encode(record.label)?,
        premise: record.premise,
        hypothesis: record.hypothesis,
    })
}

fn text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
