//! Core value types: splits, source label values and canonical labels.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Split
// =============================================================================

/// A named partition of a dataset.
///
/// Ordering follows declaration order: train, validation, test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    /// Training data.
    Train,
    /// Held-out validation (dev) data.
    Validation,
    /// Test data.
    Test,
}

impl Split {
    /// All splits in canonical order.
    pub const ALL: [Split; 3] = [Split::Train, Split::Validation, Split::Test];

    /// Lowercase split name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Validation => "validation",
            Split::Test => "test",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Split {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "train" => Ok(Split::Train),
            "validation" => Ok(Split::Validation),
            "test" => Ok(Split::Test),
            _ => Err(Error::UnknownSplit {
                split: s.to_string(),
                dataset: None,
            }),
        }
    }
}

// =============================================================================
// Source label values
// =============================================================================

/// A label value as it appears in a source file.
///
/// Some benchmarks spell labels as strings (`"entailment"`, `"e"`), others
/// as integers (`0`, `1`). Equality is structural: `Int(1)` never equals
/// `Str("1")`. [`LabelVocabulary::map`](crate::LabelVocabulary::map) is
/// where numeric strings from delimited text meet integer keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabelValue {
    /// Integer label.
    Int(i64),
    /// String label.
    Str(String),
}

impl LabelValue {
    /// Read a label from a parsed JSON value.
    ///
    /// Returns `None` for nulls, floats, booleans and nested values; such
    /// rows never match a vocabulary and are dropped during normalization.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) => Some(LabelValue::Str(s.clone())),
            serde_json::Value::Number(n) => n.as_i64().map(LabelValue::Int),
            _ => None,
        }
    }
}

impl From<&str> for LabelValue {
    fn from(s: &str) -> Self {
        LabelValue::Str(s.to_string())
    }
}

impl From<String> for LabelValue {
    fn from(s: String) -> Self {
        LabelValue::Str(s)
    }
}

impl From<i64> for LabelValue {
    fn from(n: i64) -> Self {
        LabelValue::Int(n)
    }
}

impl From<i32> for LabelValue {
    fn from(n: i32) -> Self {
        LabelValue::Int(i64::from(n))
    }
}

impl fmt::Display for LabelValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelValue::Int(n) => write!(f, "{n}"),
            LabelValue::Str(s) => write!(f, "{s:?}"),
        }
    }
}

// =============================================================================
// Canonical labels
// =============================================================================

/// A canonical output label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NliLabel {
    /// The premise entails the hypothesis.
    Entailment,
    /// Binary negative class.
    NotEntailment,
    /// Ternary: neither entailed nor contradicted.
    Neutral,
    /// Ternary: the premise contradicts the hypothesis.
    Contradiction,
}

impl NliLabel {
    /// Canonical label string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            NliLabel::Entailment => "entailment",
            NliLabel::NotEntailment => "not_entailment",
            NliLabel::Neutral => "neutral",
            NliLabel::Contradiction => "contradiction",
        }
    }
}

impl fmt::Display for NliLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The closed label vocabulary a dataset declares.
///
/// | Kind | Canonical labels (index order) |
/// |------|--------------------------------|
/// | `Binary` | entailment, not_entailment |
/// | `Ternary` | entailment, neutral, contradiction |
///
/// The order is fixed by declaration, not sorted by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelKind {
    /// Recognizing-textual-entailment style, two labels.
    Binary,
    /// Natural-language-inference style, three labels.
    Ternary,
}

impl LabelKind {
    /// Canonical labels in encoding order.
    #[must_use]
    pub fn labels(&self) -> &'static [NliLabel] {
        match self {
            LabelKind::Binary => &[NliLabel::Entailment, NliLabel::NotEntailment],
            LabelKind::Ternary => &[
                NliLabel::Entailment,
                NliLabel::Neutral,
                NliLabel::Contradiction,
            ],
        }
    }

    /// Canonical label strings in encoding order.
    #[must_use]
    pub fn label_names(&self) -> Vec<String> {
        self.labels().iter().map(|l| l.as_str().to_string()).collect()
    }

    /// Index of `label` in this kind's canonical order.
    #[must_use]
    pub fn encode(&self, label: NliLabel) -> Option<usize> {
        self.labels().iter().position(|l| *l == label)
    }

    /// Canonical label at `index`.
    #[must_use]
    pub fn decode(&self, index: usize) -> Option<NliLabel> {
        self.labels().get(index).copied()
    }
}

impl fmt::Display for LabelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelKind::Binary => f.write_str("binary"),
            LabelKind::Ternary => f.write_str("ternary"),
        }
    }
}
