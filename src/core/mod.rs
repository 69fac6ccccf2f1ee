//! Canonical sample model.
//!
//! Every samplesheet, whatever its input format, is normalized into one tree:
//!
//! - [`SampleGroup`]: the root, owning an ordered list of samples
//! - [`Sample`]: owns an ordered list of libraries
//! - [`Library`]: owns an ordered list of readgroups
//! - [`ReadGroup`]: one sequencing run/lane with R1 (and optionally R2) files
//!
//! Each level carries an `additional_properties` map for fields outside the
//! fixed schema. Those fields are passed through to the output untouched.
//!
//! ## Identity
//!
//! | Level | Unique within |
//! |-------|---------------|
//! | Sample | SampleGroup |
//! | Library | Sample |
//! | ReadGroup | Library |
//!
//! The tabular builder enforces these. Structured documents are taken as they
//! are, so repeated ids there become sibling entities.

pub mod samplestructure;
pub mod types;

pub use samplestructure::{Library, ReadGroup, Sample, SampleGroup};
