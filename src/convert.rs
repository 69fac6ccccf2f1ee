//! End-to-end conversion: samplesheet file -> checks -> output document.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::types::{ExtraColumnLevel, InputFormat, OutputEncoding, OutputShape};
use crate::core::SampleGroup;
use crate::output::{self, OutputError};
use crate::parsing::samplesheet::SheetOptions;
use crate::parsing::{self, ParseError};
use crate::utils::validation::{self, ValidationError};

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Configuration for one conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionOptions {
    /// Input format; detected from the file suffix when unset
    pub input_format: Option<InputFormat>,
    pub shape: OutputShape,
    pub encoding: OutputEncoding,
    /// Level receiving the extra columns of a delimited samplesheet
    pub extra_column_level: ExtraColumnLevel,
    /// Fail when a referenced read file does not exist
    pub check_file_presence: bool,
    /// Verify read files against the checksums given in the samplesheet
    pub check_md5sums: bool,
    /// Fail when a read file is referenced more than once
    pub check_duplicate_files: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            input_format: None,
            shape: OutputShape::default(),
            encoding: OutputEncoding::default(),
            extra_column_level: ExtraColumnLevel::default(),
            check_file_presence: true,
            check_md5sums: false,
            check_duplicate_files: true,
        }
    }
}

impl ConversionOptions {
    /// Options with every read-file check disabled
    #[must_use]
    pub fn without_checks(mut self) -> Self {
        self.check_file_presence = false;
        self.check_md5sums = false;
        self.check_duplicate_files = false;
        self
    }

    fn sheet_options(&self) -> SheetOptions {
        SheetOptions {
            extra_column_level: self.extra_column_level,
        }
    }
}

/// Parse a samplesheet and run the enabled read-file checks
///
/// # Errors
///
/// Returns `ConvertError::Parse` if the samplesheet cannot be parsed, or
/// `ConvertError::Validation` if a check fails.
pub fn load_samplesheet(
    path: &Path,
    options: &ConversionOptions,
) -> Result<SampleGroup, ConvertError> {
    let format = parsing::resolve_format(path, options.input_format)?;
    debug!("Parsing {} as {}", path.display(), format);
    let group = parsing::parse_file(path, format, &options.sheet_options())?;
    run_checks(&group, options)?;
    Ok(group)
}

/// Run the read-file checks enabled in `options`
///
/// # Errors
///
/// Returns the first failing check's `ValidationError`.
pub fn run_checks(group: &SampleGroup, options: &ConversionOptions) -> Result<(), ValidationError> {
    if options.check_file_presence {
        debug!("Checking that all read files exist");
        validation::check_existence_of_files(group.files())?;
    }
    if options.check_md5sums {
        let with_sums = group
            .files_and_md5sums()
            .into_iter()
            .filter_map(|(path, md5)| md5.map(|md5| (path, md5)));
        info!("Verifying MD5 checksums of read files");
        validation::check_md5sums(with_sums)?;
    }
    if options.check_duplicate_files {
        debug!("Checking for read files referenced more than once");
        validation::check_duplicate_files(group.files())?;
    }
    Ok(())
}

/// Convert a samplesheet file into an encoded pipeline input document.
/// Nothing is produced unless every step succeeds.
///
/// # Errors
///
/// Returns `ConvertError` from parsing, checking or encoding.
pub fn samplesheet_to_document(
    path: &Path,
    options: &ConversionOptions,
) -> Result<String, ConvertError> {
    let group = load_samplesheet(path, options)?;
    Ok(output::render(&group, options.shape, options.encoding)?)
}
