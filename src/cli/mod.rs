//! Command-line interface for biowdl-input-converter.
//!
//! ## Usage
//!
//! ```text
//! # Convert a samplesheet to pipeline input JSON on stdout
//! biowdl-input-converter samplesheet.csv
//!
//! # Old-style nested document as YAML, written to a file
//! biowdl-input-converter samplesheet.tsv --old --encoding yaml -o samples.yml
//!
//! # Only validate, verifying checksums as well
//! biowdl-input-converter samplesheet.yml --validate --check-file-md5sums
//! ```

use clap::Parser;

pub mod convert;

#[derive(Parser)]
#[command(name = "biowdl-input-converter")]
#[command(version)]
#[command(about = "Parse samplesheets for BioWDL pipelines")]
#[command(
    long_about = "biowdl-input-converter reads a samplesheet (CSV/TSV with an auto-detected delimiter, or a nested YAML/JSON document) and writes the samples, libraries and readgroups it describes as a BioWDL pipeline input document.\n\nBefore writing, it can check that every read file exists, that no read file is listed twice, and that read files match their MD5 checksums."
)]
pub struct Cli {
    #[command(flatten)]
    pub convert: convert::ConvertArgs,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}
