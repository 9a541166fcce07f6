//! Normalized records and the collections handed to downstream consumers.

use crate::types::{NliLabel, Split};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::ops::Index;

// =============================================================================
// Records
// =============================================================================

/// A record after label remapping, before categorical encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappedRecord {
    /// Premise text.
    pub premise: String,
    /// Hypothesis text.
    pub hypothesis: String,
    /// Canonical label.
    pub label: NliLabel,
}

/// A fully normalized record: `{premise, hypothesis, label}` with the label
/// encoded as an index into the owning collection's label names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    /// Premise text.
    pub premise: String,
    /// Hypothesis text.
    pub hypothesis: String,
    /// Index into [`RecordCollection::label_names`].
    pub label: usize,
}

// =============================================================================
// RecordCollection
// =============================================================================

/// An ordered collection of records sharing one label space.
///
/// Every record's label indexes into [`label_names`](Self::label_names);
/// deserialization goes through [`RecordCollection::new`] and rejects
/// out-of-range labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedCollection")]
pub struct RecordCollection {
    records: Vec<Record>,
    label_names: Vec<String>,
}

/// Wire shape of [`RecordCollection`] before validation.
#[derive(Deserialize)]
struct UncheckedCollection {
    records: Vec<Record>,
    label_names: Vec<String>,
}

impl TryFrom<UncheckedCollection> for RecordCollection {
    type Error = Error;

    fn try_from(raw: UncheckedCollection) -> Result<Self> {
        RecordCollection::new(raw.records, raw.label_names)
    }
}

impl RecordCollection {
    /// Create a collection.
    ///
    /// Fails if a record's label index is outside `label_names`.
    pub fn new(records: Vec<Record>, label_names: Vec<String>) -> Result<Self> {
        if let Some(bad) = records.iter().find(|r| r.label >= label_names.len()) {
            return Err(Error::configuration(format!(
                "label index {} out of range for {} label names",
                bad.label,
                label_names.len()
            )));
        }
        Ok(Self {
            records,
            label_names,
        })
    }

    /// An empty collection over `label_names`.
    #[must_use]
    pub fn empty(label_names: Vec<String>) -> Self {
        Self {
            records: Vec::new(),
            label_names,
        }
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate records in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Record at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    /// All records.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Label names; a record's `label` indexes into this.
    #[must_use]
    pub fn label_names(&self) -> &[String] {
        &self.label_names
    }

    /// Label string for an encoded index.
    #[must_use]
    pub fn decode_label(&self, index: usize) -> Option<&str> {
        self.label_names.get(index).map(String::as_str)
    }

    /// Record count per label name.
    #[must_use]
    pub fn label_counts(&self) -> HashMap<String, usize> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for record in &self.records {
            *counts
                .entry(self.label_names[record.label].clone())
                .or_default() += 1;
        }
        counts
    }

    /// Concatenate collections in order.
    ///
    /// Parts with different label names are aligned onto the union of their
    /// names (first-seen order) and re-indexed, so every index still decodes
    /// to the record's original label string.
    pub fn concat(parts: Vec<RecordCollection>) -> Result<Self> {
        let mut parts = parts.into_iter();
        let Some(first) = parts.next() else {
            return Err(Error::configuration("cannot concatenate zero collections"));
        };
        let mut combined = first;
        for part in parts {
            combined.append(part);
        }
        Ok(combined)
    }

    fn append(&mut self, other: RecordCollection) {
        if other.label_names == self.label_names {
            self.records.extend(other.records);
            return;
        }
        log::warn!(
            "Aligning label spaces {:?} and {:?}",
            self.label_names,
            other.label_names
        );
        let remap: Vec<usize> = other
            .label_names
            .iter()
            .map(|name| match self.label_names.iter().position(|n| n == name) {
                Some(idx) => idx,
                None => {
                    self.label_names.push(name.clone());
                    self.label_names.len() - 1
                }
            })
            .collect();
        self.records
            .extend(other.records.into_iter().map(|r| Record {
                label: remap[r.label],
                ..r
            }));
    }

    /// Write records as JSON lines, labels as encoded indices.
    pub fn write_jsonl<W: Write>(&self, mut writer: W) -> Result<()> {
        for record in &self.records {
            serde_json::to_writer(&mut writer, record)
                .map_err(|e| Error::parse(format!("Failed to serialize record: {}", e)))?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl Index<usize> for RecordCollection {
    type Output = Record;

    fn index(&self, index: usize) -> &Self::Output {
        &self.records[index]
    }
}

impl<'a> IntoIterator for &'a RecordCollection {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl IntoIterator for RecordCollection {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

// =============================================================================
// DatasetDict
// =============================================================================

/// Split name to record collection, in train/validation/test order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetDict {
    splits: BTreeMap<Split, RecordCollection>,
}

impl DatasetDict {
    /// Create an empty dict.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a split.
    pub fn insert(&mut self, split: Split, records: RecordCollection) -> Option<RecordCollection> {
        self.splits.insert(split, records)
    }

    /// Collection for `split`.
    #[must_use]
    pub fn get(&self, split: Split) -> Option<&RecordCollection> {
        self.splits.get(&split)
    }

    /// Remove and return a split.
    pub fn remove(&mut self, split: Split) -> Option<RecordCollection> {
        self.splits.remove(&split)
    }

    /// Whether `split` is present.
    #[must_use]
    pub fn contains(&self, split: Split) -> bool {
        self.splits.contains_key(&split)
    }

    /// Present splits in canonical order.
    #[must_use]
    pub fn splits(&self) -> Vec<Split> {
        self.splits.keys().copied().collect()
    }

    /// Number of splits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.splits.len()
    }

    /// Whether no split is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.splits.is_empty()
    }

    /// Iterate `(split, collection)` in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Split, &RecordCollection)> {
        self.splits.iter().map(|(s, c)| (*s, c))
    }
}

impl Index<Split> for DatasetDict {
    type Output = RecordCollection;

    fn index(&self, split: Split) -> &Self::Output {
        &self.splits[&split]
    }
}

impl IntoIterator for DatasetDict {
    type Item = (Split, RecordCollection);
    type IntoIter = std::collections::btree_map::IntoIter<Split, RecordCollection>;

    fn into_iter(self) -> Self::IntoIter {
        self.splits.into_iter()
    }
}

impl FromIterator<(Split, RecordCollection)> for DatasetDict {
    fn from_iter<I: IntoIterator<Item = (Split, RecordCollection)>>(iter: I) -> Self {
        Self {
            splits: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(premise: &str, label: usize) -> Record {
        Record {
            premise: premise.into(),
            hypothesis: format!("{premise}?"),
            label,
        }
    }

    fn names(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_new_rejects_out_of_range_label() {
        let result = RecordCollection::new(vec![record("a", 2)], names(&["x", "y"]));
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_deserialize_rejects_out_of_range_label() {
        let json = r#"{"records":[{"premise":"a","hypothesis":"b","label":5}],"label_names":["entailment"]}"#;
        let err = serde_json::from_str::<RecordCollection>(json).unwrap_err();
        assert!(err.to_string().contains("out of range"));

        let json = r#"{"records":[{"premise":"a","hypothesis":"b","label":0}],"label_names":["entailment"]}"#;
        let collection: RecordCollection = serde_json::from_str(json).unwrap();
        assert_eq!(collection.label_counts()["entailment"], 1);
    }

    #[test]
    fn test_concat_same_labels_preserves_order() {
        let labels = names(&["entailment", "not_entailment"]);
        let a = RecordCollection::new(vec![record("a1", 0), record("a2", 1)], labels.clone())
            .unwrap();
        let b = RecordCollection::new(vec![record("b1", 1)], labels.clone()).unwrap();

        let combined = RecordCollection::concat(vec![a, b]).unwrap();
        let premises: Vec<_> = combined.iter().map(|r| r.premise.as_str()).collect();
        assert_eq!(premises, vec!["a1", "a2", "b1"]);
        assert_eq!(combined.label_names(), labels.as_slice());
    }

    #[test]
    fn test_concat_aligns_label_spaces() {
        let binary = RecordCollection::new(
            vec![record("b", 1)],
            names(&["entailment", "not_entailment"]),
        )
        .unwrap();
        let ternary = RecordCollection::new(
            vec![record("t0", 0), record("t1", 1), record("t2", 2)],
            names(&["entailment", "neutral", "contradiction"]),
        )
        .unwrap();

        let combined = RecordCollection::concat(vec![binary, ternary]).unwrap();
        assert_eq!(
            combined.label_names(),
            names(&["entailment", "not_entailment", "neutral", "contradiction"]).as_slice()
        );
        let decoded: Vec<_> = combined
            .iter()
            .map(|r| combined.decode_label(r.label).unwrap())
            .collect();
        assert_eq!(
            decoded,
            vec!["not_entailment", "entailment", "neutral", "contradiction"]
        );
    }

    #[test]
    fn test_concat_empty_is_error() {
        assert!(RecordCollection::concat(Vec::new()).is_err());
    }

    #[test]
    fn test_label_counts() {
        let collection = RecordCollection::new(
            vec![record("a", 0), record("b", 0), record("c", 1)],
            names(&["entailment", "not_entailment"]),
        )
        .unwrap();
        let counts = collection.label_counts();
        assert_eq!(counts["entailment"], 2);
        assert_eq!(counts["not_entailment"], 1);
    }

    #[test]
    fn test_write_jsonl() {
        let collection =
            RecordCollection::new(vec![record("a", 1)], names(&["entailment", "not_entailment"]))
                .unwrap();
        let mut out = Vec::new();
        collection.write_jsonl(&mut out).unwrap();
        let line = String::from_utf8(out).unwrap();
        assert_eq!(line, "{\"premise\":\"a\",\"hypothesis\":\"a?\",\"label\":1}\n");
    }

    #[test]
    fn test_dataset_dict_order() {
        let empty = RecordCollection::empty(names(&["entailment", "not_entailment"]));
        let dict: DatasetDict = vec![
            (Split::Test, empty.clone()),
            (Split::Train, empty.clone()),
        ]
        .into_iter()
        .collect();
        assert_eq!(dict.splits(), vec![Split::Train, Split::Test]);
        assert!(!dict.contains(Split::Validation));
    }
}
