//! Serializers from the canonical model to pipeline input documents.
//!
//! Three shapes share one tree walk ([`document::samplegroup_to_document`]),
//! parameterized by a [`ShapePolicy`]:
//!
//! | Shape | Layout |
//! |-------|--------|
//! | current-nested | `samples[] -> {id, libraries[] -> {id, readgroups[] -> {id, reads}}}` |
//! | legacy-nested | the same tree, child collections emitted before `id` |
//! | legacy-flattened | `samples[] -> {readgroups[] -> {id, lib_id, R1, ...}, id}` |
//!
//! The document is then encoded as JSON (pretty-printed, key order kept) or
//! YAML. Encoding is independent of the shape.

use serde_json::Value;
use thiserror::Error;

use crate::core::types::{OutputEncoding, OutputShape};
use crate::core::SampleGroup;

pub mod document;
pub mod shape;

pub use shape::ShapePolicy;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to encode YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Document tree in the current nested shape
#[must_use]
pub fn serialize_current_nested(group: &SampleGroup) -> Value {
    document::samplegroup_to_document(group, ShapePolicy::CURRENT_NESTED)
}

/// Document tree in the legacy nested shape
#[must_use]
pub fn serialize_legacy_nested(group: &SampleGroup) -> Value {
    document::samplegroup_to_document(group, ShapePolicy::LEGACY_NESTED)
}

/// Document tree in the legacy flattened shape
#[must_use]
pub fn serialize_legacy_flattened(group: &SampleGroup) -> Value {
    document::samplegroup_to_document(group, ShapePolicy::LEGACY_FLATTENED)
}

/// Encode a document tree. The result carries no trailing newline.
///
/// # Errors
///
/// Returns `OutputError` if the encoder fails.
pub fn encode(document: &Value, encoding: OutputEncoding) -> Result<String, OutputError> {
    match encoding {
        OutputEncoding::Json => Ok(serde_json::to_string_pretty(document)?),
        OutputEncoding::Yaml => {
            let yaml = serde_yaml::to_string(document)?;
            Ok(yaml.trim_end().to_string())
        }
    }
}

/// Serialize a `SampleGroup` in the given shape and encoding
///
/// # Errors
///
/// Returns `OutputError` if the encoder fails.
pub fn render(
    group: &SampleGroup,
    shape: OutputShape,
    encoding: OutputEncoding,
) -> Result<String, OutputError> {
    let document = document::samplegroup_to_document(group, ShapePolicy::for_shape(shape));
    encode(&document, encoding)
}
