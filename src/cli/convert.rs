use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::{debug, info};

use crate::convert::{load_samplesheet, ConversionOptions};
use crate::core::types::{ExtraColumnLevel, InputFormat, OutputEncoding, OutputShape};
use crate::output;

#[derive(Args)]
pub struct ConvertArgs {
    /// The input samplesheet. Format is detected from the file suffix
    /// unless --format is given
    #[arg(required = true)]
    pub samplesheet: PathBuf,

    /// The input samplesheet format: tsv, csv, json, yaml or yml
    #[arg(short, long, value_parser = parse_input_format)]
    pub format: Option<InputFormat>,

    /// File the document is written to (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Do not generate output but only validate the samplesheet
    #[arg(long)]
    pub validate: bool,

    /// Shape of the output document
    #[arg(long, value_enum, default_value = "current-nested", conflicts_with = "old")]
    pub shape: OutputShape,

    /// Output the old-style nested document (same as --shape legacy-nested)
    #[arg(long)]
    pub old: bool,

    /// Encoding of the output document
    #[arg(long, value_enum, default_value = "json")]
    pub encoding: OutputEncoding,

    /// Entity that receives columns outside the fixed samplesheet schema
    #[arg(long, value_enum, default_value = "sample")]
    pub extra_columns_level: ExtraColumnLevel,

    /// Skip checking if the files in the samplesheet are present
    #[arg(long)]
    pub skip_file_check: bool,

    /// Skip the check for files listed more than once in the samplesheet
    #[arg(long)]
    pub skip_duplicate_check: bool,

    /// Check the md5sums of read files that have one in the samplesheet
    #[arg(long)]
    pub check_file_md5sums: bool,
}

fn parse_input_format(s: &str) -> Result<InputFormat, String> {
    InputFormat::parse(s).ok_or_else(|| {
        format!("unsupported format '{s}' (expected tsv, csv, json, yaml or yml)")
    })
}

impl ConvertArgs {
    /// Conversion options selected by these arguments
    pub fn options(&self) -> ConversionOptions {
        ConversionOptions {
            input_format: self.format,
            shape: if self.old {
                OutputShape::LegacyNested
            } else {
                self.shape
            },
            encoding: self.encoding,
            extra_column_level: self.extra_columns_level,
            check_file_presence: !self.skip_file_check,
            check_md5sums: self.check_file_md5sums,
            check_duplicate_files: !self.skip_duplicate_check,
        }
    }
}

/// Execute the conversion
///
/// # Errors
///
/// Returns an error if the samplesheet cannot be parsed, a check fails, or
/// the document cannot be written.
pub fn run(args: &ConvertArgs) -> anyhow::Result<()> {
    let options = args.options();
    debug!("Conversion options: {}", serde_json::to_string(&options)?);

    let group = load_samplesheet(&args.samplesheet, &options)
        .with_context(|| format!("Failed to convert {}", args.samplesheet.display()))?;

    if args.validate {
        info!("{} is a valid samplesheet", args.samplesheet.display());
        return Ok(());
    }

    let document = output::render(&group, options.shape, options.encoding)?;
    match &args.output {
        Some(path) => std::fs::write(path, format!("{document}\n"))
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{document}"),
    }

    Ok(())
}
