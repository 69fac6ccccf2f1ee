//! Checks run against the read files a samplesheet references.

pub mod validation;
