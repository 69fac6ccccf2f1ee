//! # biowdl-input-converter
//!
//! A library for turning sequencing samplesheets into BioWDL pipeline inputs.
//!
//! A samplesheet describes which read files belong to which readgroup,
//! library and sample. It can be a delimited table (CSV/TSV, delimiter
//! auto-detected) or a nested YAML/JSON document. Either way it is parsed
//! into a [`SampleGroup`], optionally checked against the filesystem, and
//! written back out as a JSON or YAML document in one of three shapes.
//!
//! ## Example
//!
//! ```rust
//! use biowdl_input_converter::output::render;
//! use biowdl_input_converter::parsing::samplesheet::{parse_samplesheet_text, SheetOptions};
//! use biowdl_input_converter::{OutputEncoding, OutputShape};
//!
//! let text = "sample,library,readgroup,R1,R1_md5,R2,R2_md5\n\
//!             s1,lib1,rg1,r1.fq,,r2.fq,\n";
//! let group = parse_samplesheet_text(text, &SheetOptions::default()).unwrap();
//! assert_eq!(group.counts(), (1, 1, 1));
//!
//! let yaml = render(&group, OutputShape::LegacyNested, OutputEncoding::Yaml).unwrap();
//! assert!(yaml.starts_with("samples:"));
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Sample/library/readgroup model and option enums
//! - [`parsing`]: Delimited and structured samplesheet readers
//! - [`output`]: Document shapes and encoders
//! - [`utils`]: Read-file presence, checksum and duplicate checks
//! - [`convert`]: Parse, check and render in one call
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod convert;
pub mod core;
pub mod output;
pub mod parsing;
pub mod utils;

// Re-export commonly used types for convenience
pub use convert::{samplesheet_to_document, ConversionOptions, ConvertError};
pub use core::types::*;
pub use core::{Library, ReadGroup, Sample, SampleGroup};
pub use parsing::ParseError;
