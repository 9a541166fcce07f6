//! Parsing raw data files into row-oriented record streams.
//!
//! | Suffix | Format | Notes |
//! |--------|--------|-------|
//! | `.csv` | delimited, `,` | quoting disabled |
//! | `.tsv` | delimited, `\t` | quoting disabled |
//! | `.jsonl` | JSON lines | one object per line |
//! | `.json` | JSON lines, or one top-level array of objects | |
//!
//! Quoting is disabled for delimited text: GLUE-style TSVs contain bare
//! `"` characters inside sentences, which must survive verbatim. Delimited
//! cells are always strings; integer label vocabularies still match them
//! through [`LabelVocabulary::map`](crate::LabelVocabulary::map).

use crate::spec::DataFiles;
use crate::{Error, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// One source row: column name to value.
pub type RawRecord = Map<String, Value>;

/// Source file format of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Delimited text with the given single-byte delimiter.
    Delimited(u8),
    /// Line-delimited JSON objects.
    JsonLines,
}

impl SourceFormat {
    /// Pick the format from a file's suffix.
    pub fn from_path(path: &str) -> Result<Self> {
        let suffix = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        match suffix {
            "csv" => Ok(SourceFormat::Delimited(b',')),
            "tsv" => Ok(SourceFormat::Delimited(b'\t')),
            "json" | "jsonl" => Ok(SourceFormat::JsonLines),
            _ => Err(Error::unsupported_format(format!(
                "unknown file suffix {:?} for {}",
                suffix, path
            ))),
        }
    }
}

/// Read every file of one split, relative to `dir`, as a single stream.
pub fn read_split(dir: &Path, files: &DataFiles, format: SourceFormat) -> Result<Vec<RawRecord>> {
    let mut rows = Vec::new();
    for relative in files.paths() {
        let path = dir.join(relative);
        let before = rows.len();
        rows.extend(read_file(&path, format)?);
        log::debug!("Read {} rows from {}", rows.len() - before, path.display());
    }
    Ok(rows)
}

/// Read one file.
pub fn read_file(path: &Path, format: SourceFormat) -> Result<Vec<RawRecord>> {
    let bytes = fs::read(path).map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to read {}: {}", path.display(), e),
        ))
    })?;
    let bytes = strip_bom(&bytes);
    match format {
        SourceFormat::Delimited(delimiter) => parse_delimited(bytes, delimiter, path),
        SourceFormat::JsonLines => parse_json(bytes, path),
    }
}

fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes)
}

// =============================================================================
// Delimited text
// =============================================================================

fn parse_delimited(bytes: &[u8], delimiter: u8, path: &Path) -> Result<Vec<RawRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .quoting(false)
        .has_headers(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| Error::parse(format!("{}: bad header: {}", path.display(), e)))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for (idx, row) in reader.records().enumerate() {
        let row = row.map_err(|e| {
            // header is line 1
            Error::parse(format!("{}:{}: {}", path.display(), idx + 2, e))
        })?;
        rows.push(
            headers
                .iter()
                .zip(row.iter())
                .map(|(name, cell)| (name.clone(), Value::String(cell.to_string())))
                .collect(),
        );
    }
    Ok(rows)
}

// =============================================================================
// JSON
// =============================================================================

fn parse_json(bytes: &[u8], path: &Path) -> Result<Vec<RawRecord>> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| Error::parse(format!("{}: invalid UTF-8: {}", path.display(), e)))?;

    if text.trim_start().starts_with('[') {
        let rows: Vec<RawRecord> = serde_json::from_str(text)
            .map_err(|e| Error::parse(format!("{}: {}", path.display(), e)))?;
        return Ok(rows);
    }

    let mut rows = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let row: RawRecord = serde_json::from_str(line)
            .map_err(|e| Error::parse(format!("{}:{}: {}", path.display(), idx + 1, e)))?;
        rows.push(row);
    }
    Ok(rows)
}
