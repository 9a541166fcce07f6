//! Error types for nli-datasets.

use thiserror::Error;

/// Result type for dataset operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for dataset operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A dataset spec, registry entry or config value is invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A name is neither an atomic dataset nor a group alias.
    #[error("Unknown dataset: {0}")]
    UnknownDataset(String),

    /// A split name is not valid, or not declared by the dataset.
    #[error(
        "Unknown split: {split}{}",
        .dataset.as_ref().map(|d| format!(" (dataset {d})")).unwrap_or_default()
    )]
    UnknownSplit {
        /// The requested split.
        split: String,
        /// The dataset it was requested from, if any.
        dataset: Option<String>,
    },

    /// HTTP failure or timeout while fetching an archive.
    #[error("Network error: {0}")]
    Network(String),

    /// Archive is corrupt or its format is not supported.
    #[error("Archive error: {0}")]
    Archive(String),

    /// Data file suffix is neither delimited text nor JSON lines.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Number of splits does not match the number of datasets.
    #[error("Split count mismatch: expected a single split or {expected}, got {actual}")]
    SplitCountMismatch {
        /// Number of (expanded) datasets.
        expected: usize,
        /// Number of splits supplied.
        actual: usize,
    },

    /// Malformed row in a data file.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The operation observed a cancelled token.
    #[error("Operation cancelled")]
    Cancelled,

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }

    /// Create an unknown dataset error.
    pub fn unknown_dataset(name: impl Into<String>) -> Self {
        Error::UnknownDataset(name.into())
    }

    /// Create an unknown split error for a dataset.
    pub fn unknown_split(split: impl Into<String>, dataset: impl Into<String>) -> Self {
        Error::UnknownSplit {
            split: split.into(),
            dataset: Some(dataset.into()),
        }
    }

    /// Create a network error.
    pub fn network(msg: impl Into<String>) -> Self {
        Error::Network(msg.into())
    }

    /// Create an archive error.
    pub fn archive(msg: impl Into<String>) -> Self {
        Error::Archive(msg.into())
    }

    /// Create an unsupported format error.
    pub fn unsupported_format(msg: impl Into<String>) -> Self {
        Error::UnsupportedFormat(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }
}
