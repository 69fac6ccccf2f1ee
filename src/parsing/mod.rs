//! Parsers that turn samplesheets into a [`SampleGroup`](crate::SampleGroup).
//!
//! Two input paths are supported:
//!
//! - **Delimited text** (CSV/TSV/semicolon): [`tabular`] detects the delimiter
//!   and streams rows, [`samplesheet`] groups them into the sample tree
//! - **Structured documents** (YAML/JSON): [`structured`] walks the nested
//!   `samples -> libraries -> readgroups -> reads` document
//!
//! ## Tabular columns
//!
//! | Column | Required | Notes |
//! |--------|----------|-------|
//! | sample | Yes | |
//! | library | Yes | Holds the readgroup id when `readgroup` is absent |
//! | readgroup | No | Its presence selects the current layout |
//! | R1 | Yes | |
//! | R1_md5 | Yes | Empty cells become null |
//! | R2 | Yes | Empty cells become null |
//! | R2_md5 | Yes | Empty cells become null |
//!
//! Any other column is an extra property.

use std::path::Path;

use thiserror::Error;

use crate::core::types::InputFormat;
use crate::core::SampleGroup;

pub mod samplesheet;
pub mod structured;
pub mod tabular;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not detect the delimiter of the samplesheet: {0}")]
    DialectDetection(String),

    #[error("Missing required field '{field}' {location}")]
    Schema { field: String, location: String },

    #[error("Invalid samplesheet document: {0}")]
    InvalidDocument(String),

    #[error("Duplicate readgroup id {0}")]
    DuplicateIdentifier(String),

    #[error("Conflicting values for '{column}' on {entity}: '{existing}' and '{new}'")]
    ConflictingProperty {
        column: String,
        entity: String,
        existing: String,
        new: String,
    },

    #[error("Malformed row on line {line}: expected {expected} fields, found {found}")]
    MalformedRow {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unsupported samplesheet format: {0}")]
    UnsupportedFormat(String),
}

impl ParseError {
    pub(crate) fn missing(field: impl Into<String>, location: impl Into<String>) -> Self {
        Self::Schema {
            field: field.into(),
            location: location.into(),
        }
    }
}

/// Resolve the input format from an explicit name, or else the file suffix
///
/// # Errors
///
/// Returns `ParseError::UnsupportedFormat` if neither names a known format.
pub fn resolve_format(path: &Path, explicit: Option<InputFormat>) -> Result<InputFormat, ParseError> {
    if let Some(format) = explicit {
        return Ok(format);
    }
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    InputFormat::parse(extension).ok_or_else(|| {
        ParseError::UnsupportedFormat(if extension.is_empty() {
            format!("no file extension on {}", path.display())
        } else {
            format!(".{extension}")
        })
    })
}

/// Parse a samplesheet file of the given format
///
/// # Errors
///
/// Returns any error of the tabular or structured parser.
pub fn parse_file(
    path: &Path,
    format: InputFormat,
    options: &samplesheet::SheetOptions,
) -> Result<SampleGroup, ParseError> {
    match format {
        InputFormat::Tsv | InputFormat::Csv => samplesheet::parse_samplesheet_file(path, options),
        InputFormat::Yaml => structured::parse_yaml_file(path),
        InputFormat::Json => structured::parse_json_file(path),
    }
}
