//! Immutable, validated per-dataset configuration.
//!
//! A [`DatasetSpec`] describes where a dataset lives (archive URL and
//! per-split files inside it), which source columns hold the premise,
//! hypothesis and label, and how source label values map onto the
//! canonical labels of its [`LabelKind`].
//!
//! ```rust
//! use nli_datasets::{DatasetSpec, Split};
//!
//! let spec = DatasetSpec::ternary("https://dl.fbaipublicfiles.com/anli/anli_v0.1.zip")
//!     .train("anli_v0.1/R1/train.jsonl")
//!     .validation("anli_v0.1/R1/dev.jsonl")
//!     .premise_column("context")
//!     .entailment("e")
//!     .neutral("n")
//!     .contradiction("c")
//!     .build()
//!     .unwrap();
//! assert_eq!(spec.splits(), vec![Split::Train, Split::Validation]);
//! ```

use crate::reader::SourceFormat;
use crate::types::{LabelKind, LabelValue, NliLabel, Split};
use crate::{Error, Result};
use std::collections::HashMap;

// =============================================================================
// DataFiles
// =============================================================================

/// Files making up one split, relative to the extraction directory.
///
/// A split spanning several files is the union of their records in listed
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFiles(Vec<String>);

impl DataFiles {
    /// The relative paths in order.
    #[must_use]
    pub fn paths(&self) -> &[String] {
        &self.0
    }

    /// The first path.
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }
}

impl From<&str> for DataFiles {
    fn from(path: &str) -> Self {
        DataFiles(vec![path.to_string()])
    }
}

impl From<String> for DataFiles {
    fn from(path: String) -> Self {
        DataFiles(vec![path])
    }
}

impl From<Vec<&str>> for DataFiles {
    fn from(paths: Vec<&str>) -> Self {
        DataFiles(paths.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for DataFiles {
    fn from(paths: Vec<String>) -> Self {
        DataFiles(paths)
    }
}

impl<const N: usize> From<[&str; N]> for DataFiles {
    fn from(paths: [&str; N]) -> Self {
        DataFiles(paths.iter().map(|p| p.to_string()).collect())
    }
}

// =============================================================================
// LabelVocabulary
// =============================================================================

/// A closed mapping from source label values to canonical labels.
///
/// The mapping's co-domain is exactly the canonical label set of its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelVocabulary {
    kind: LabelKind,
    mapping: HashMap<LabelValue, NliLabel>,
}

impl LabelVocabulary {
    /// Build a vocabulary from `(source value, canonical label)` pairs.
    ///
    /// Fails if a source value is listed twice, a canonical label is
    /// missing or duplicated, or a label does not belong to `kind`.
    pub fn new(
        kind: LabelKind,
        pairs: impl IntoIterator<Item = (LabelValue, NliLabel)>,
    ) -> Result<Self> {
        let mut mapping = HashMap::new();
        let mut seen: Vec<NliLabel> = Vec::new();
        for (value, label) in pairs {
            if kind.encode(label).is_none() {
                return Err(Error::configuration(format!(
                    "label {label} is not part of the {kind} label set"
                )));
            }
            if seen.contains(&label) {
                return Err(Error::configuration(format!(
                    "canonical label {label} is mapped more than once"
                )));
            }
            if let Some(previous) = mapping.insert(value.clone(), label) {
                return Err(Error::configuration(format!(
                    "source label {value} maps to both {previous} and {label}"
                )));
            }
            seen.push(label);
        }
        if let Some(missing) = kind.labels().iter().find(|l| !seen.contains(l)) {
            return Err(Error::configuration(format!(
                "no source label maps to {missing}"
            )));
        }
        Ok(Self { kind, mapping })
    }

    /// The loader kind.
    #[must_use]
    pub fn kind(&self) -> LabelKind {
        self.kind
    }

    /// Canonical label for a source value, if the value is in the vocabulary.
    ///
    /// An exact key wins. Failing that, a string that parses as an integer
    /// is looked up as [`LabelValue::Int`], since delimited text carries no
    /// types. Integers are never looked up as strings.
    #[must_use]
    pub fn map(&self, value: &LabelValue) -> Option<NliLabel> {
        if let Some(label) = self.mapping.get(value) {
            return Some(*label);
        }
        match value {
            LabelValue::Str(s) => {
                let n = s.trim().parse::<i64>().ok()?;
                self.mapping.get(&LabelValue::Int(n)).copied()
            }
            LabelValue::Int(_) => None,
        }
    }

    /// Whether `value` maps to a canonical label.
    #[must_use]
    pub fn contains(&self, value: &LabelValue) -> bool {
        self.map(value).is_some()
    }

    /// Encoded index of a canonical label.
    #[must_use]
    pub fn encode(&self, label: NliLabel) -> Option<usize> {
        self.kind.encode(label)
    }

    /// Canonical label names in encoding order.
    #[must_use]
    pub fn label_names(&self) -> Vec<String> {
        self.kind.label_names()
    }
}

// =============================================================================
// DatasetSpec
// =============================================================================

/// Column names used when a spec does not override them.
pub const PREMISE: &str = "premise";
/// Default hypothesis column.
pub const HYPOTHESIS: &str = "hypothesis";
/// Default label column.
pub const LABEL: &str = "label";

/// Validated description of one atomic dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSpec {
    url: String,
    files: Vec<(Split, DataFiles)>,
    premise_column: String,
    hypothesis_column: String,
    label_column: String,
    vocabulary: LabelVocabulary,
}

impl DatasetSpec {
    /// Start a two-label (entailment / not_entailment) spec.
    pub fn binary(url: impl Into<String>) -> DatasetSpecBuilder {
        DatasetSpecBuilder::new(url, LabelKind::Binary)
    }

    /// Start a three-label (entailment / neutral / contradiction) spec.
    pub fn ternary(url: impl Into<String>) -> DatasetSpecBuilder {
        DatasetSpecBuilder::new(url, LabelKind::Ternary)
    }

    /// Archive URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Label kind.
    #[must_use]
    pub fn kind(&self) -> LabelKind {
        self.vocabulary.kind()
    }

    /// Declared splits in canonical order.
    #[must_use]
    pub fn splits(&self) -> Vec<Split> {
        self.files.iter().map(|(s, _)| *s).collect()
    }

    /// Files of `split`, if declared.
    #[must_use]
    pub fn files(&self, split: Split) -> Option<&DataFiles> {
        self.files.iter().find(|(s, _)| *s == split).map(|(_, f)| f)
    }

    /// Source premise column.
    #[must_use]
    pub fn premise_column(&self) -> &str {
        &self.premise_column
    }

    /// Source hypothesis column.
    #[must_use]
    pub fn hypothesis_column(&self) -> &str {
        &self.hypothesis_column
    }

    /// Source label column.
    #[must_use]
    pub fn label_column(&self) -> &str {
        &self.label_column
    }

    /// Label vocabulary.
    #[must_use]
    pub fn vocabulary(&self) -> &LabelVocabulary {
        &self.vocabulary
    }

    /// File format, chosen from the first declared file.
    pub fn source_format(&self) -> Result<SourceFormat> {
        let first = self
            .files
            .iter()
            .find_map(|(_, f)| f.first())
            .ok_or_else(|| Error::configuration("dataset declares no files"))?;
        SourceFormat::from_path(first)
    }
}

/// Builder for [`DatasetSpec`]; validation happens in [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct DatasetSpecBuilder {
    url: String,
    kind: LabelKind,
    train: Option<DataFiles>,
    validation: Option<DataFiles>,
    test: Option<DataFiles>,
    premise_column: String,
    hypothesis_column: String,
    label_column: String,
    entailment: LabelValue,
    not_entailment: LabelValue,
    neutral: LabelValue,
    contradiction: LabelValue,
}

impl DatasetSpecBuilder {
    fn new(url: impl Into<String>, kind: LabelKind) -> Self {
        Self {
            url: url.into(),
            kind,
            train: None,
            validation: None,
            test: None,
            premise_column: PREMISE.to_string(),
            hypothesis_column: HYPOTHESIS.to_string(),
            label_column: LABEL.to_string(),
            entailment: NliLabel::Entailment.as_str().into(),
            not_entailment: NliLabel::NotEntailment.as_str().into(),
            neutral: NliLabel::Neutral.as_str().into(),
            contradiction: NliLabel::Contradiction.as_str().into(),
        }
    }

    /// Files of the train split.
    pub fn train(mut self, files: impl Into<DataFiles>) -> Self {
        self.train = Some(files.into());
        self
    }

    /// Files of the validation split.
    pub fn validation(mut self, files: impl Into<DataFiles>) -> Self {
        self.validation = Some(files.into());
        self
    }

    /// Files of the test split.
    pub fn test(mut self, files: impl Into<DataFiles>) -> Self {
        self.test = Some(files.into());
        self
    }

    /// Source column holding the premise.
    pub fn premise_column(mut self, column: impl Into<String>) -> Self {
        self.premise_column = column.into();
        self
    }

    /// Source column holding the hypothesis.
    pub fn hypothesis_column(mut self, column: impl Into<String>) -> Self {
        self.hypothesis_column = column.into();
        self
    }

    /// Source column holding the label.
    pub fn label_column(mut self, column: impl Into<String>) -> Self {
        self.label_column = column.into();
        self
    }

    /// Source value meaning entailment.
    pub fn entailment(mut self, value: impl Into<LabelValue>) -> Self {
        self.entailment = value.into();
        self
    }

    /// Source value meaning not_entailment (binary only).
    pub fn not_entailment(mut self, value: impl Into<LabelValue>) -> Self {
        self.not_entailment = value.into();
        self
    }

    /// Source value meaning neutral (ternary only).
    pub fn neutral(mut self, value: impl Into<LabelValue>) -> Self {
        self.neutral = value.into();
        self
    }

    /// Source value meaning contradiction (ternary only).
    pub fn contradiction(mut self, value: impl Into<LabelValue>) -> Self {
        self.contradiction = value.into();
        self
    }

    /// Validate and freeze the spec.
    pub fn build(self) -> Result<DatasetSpec> {
        if self.url.trim().is_empty() {
            return Err(Error::configuration("dataset URL is empty"));
        }

        let files: Vec<(Split, DataFiles)> = [
            (Split::Train, self.train),
            (Split::Validation, self.validation),
            (Split::Test, self.test),
        ]
        .into_iter()
        .filter_map(|(split, files)| files.map(|f| (split, f)))
        .collect();

        if files.is_empty() {
            return Err(Error::configuration(format!(
                "{}: at least one of train, validation or test must be specified",
                self.url
            )));
        }
        if let Some((split, _)) = files.iter().find(|(_, f)| f.paths().is_empty()) {
            return Err(Error::configuration(format!(
                "{}: split {split} declares an empty file list",
                self.url
            )));
        }

        for (role, column) in [
            ("premise", &self.premise_column),
            ("hypothesis", &self.hypothesis_column),
            ("label", &self.label_column),
        ] {
            if column.is_empty() {
                return Err(Error::configuration(format!("{role} column name is empty")));
            }
        }

        let pairs = match self.kind {
            LabelKind::Binary => vec![
                (self.entailment, NliLabel::Entailment),
                (self.not_entailment, NliLabel::NotEntailment),
            ],
            LabelKind::Ternary => vec![
                (self.entailment, NliLabel::Entailment),
                (self.neutral, NliLabel::Neutral),
                (self.contradiction, NliLabel::Contradiction),
            ],
        };
        let vocabulary = LabelVocabulary::new(self.kind, pairs)?;

        Ok(DatasetSpec {
            url: self.url,
            files,
            premise_column: self.premise_column,
            hypothesis_column: self.hypothesis_column,
            label_column: self.label_column,
            vocabulary,
        })
    }
}
