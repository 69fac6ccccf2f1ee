//! Parse nested YAML/JSON samplesheets.
//!
//! The document shape is
//!
//! ```yaml
//! samples:
//!   - id: s1
//!     control: s2          # extra, kept on the sample
//!     libraries:
//!       - id: lib1
//!         readgroups:
//!           - id: rg1
//!             reads:
//!               R1: r1.fq
//!               R1_md5: 1b2c...  # optional
//!               R2: r2.fq        # optional
//!               R2_md5: 3d4e...  # optional
//! ```
//!
//! Keys outside the fixed schema are kept, in document order, as the
//! entity's additional properties. Entities are taken as they appear: a
//! repeated id becomes a sibling, never a merge.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::core::types::Properties;
use crate::core::{Library, ReadGroup, Sample, SampleGroup};
use crate::parsing::ParseError;

/// Parse a YAML samplesheet file
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, `ParseError::Yaml` if
/// it is not valid YAML, or any error of [`samplegroup_from_document`].
pub fn parse_yaml_file(path: &Path) -> Result<SampleGroup, ParseError> {
    debug!("Reading YAML samplesheet {}", path.display());
    let content = std::fs::read_to_string(path)?;
    parse_yaml_str(&content)
}

/// Parse a JSON samplesheet file
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, `ParseError::Json` if
/// it is not valid JSON, or any error of [`samplegroup_from_document`].
pub fn parse_json_file(path: &Path) -> Result<SampleGroup, ParseError> {
    debug!("Reading JSON samplesheet {}", path.display());
    let content = std::fs::read_to_string(path)?;
    parse_json_str(&content)
}

/// Parse YAML samplesheet text
///
/// # Errors
///
/// Returns `ParseError::Yaml` on invalid YAML, or any error of
/// [`samplegroup_from_document`].
pub fn parse_yaml_str(text: &str) -> Result<SampleGroup, ParseError> {
    let document: Value = serde_yaml::from_str(text)?;
    samplegroup_from_document(document)
}

/// Parse JSON samplesheet text
///
/// # Errors
///
/// Returns `ParseError::Json` on invalid JSON, or any error of
/// [`samplegroup_from_document`].
pub fn parse_json_str(text: &str) -> Result<SampleGroup, ParseError> {
    let document: Value = serde_json::from_str(text)?;
    samplegroup_from_document(document)
}

/// Walk a parsed document into a `SampleGroup`.
///
/// Extra keys at the document root are ignored; the model has no place for them.
///
/// # Errors
///
/// Returns `ParseError::Schema` if `samples`, a `libraries`, `readgroups`,
/// `reads` or `reads.R1` entry, or any `id` is absent, and
/// `ParseError::InvalidDocument` if a node has the wrong type.
pub fn samplegroup_from_document(document: Value) -> Result<SampleGroup, ParseError> {
    // An empty YAML document parses as null
    let mut root = match document {
        Value::Null => Properties::new(),
        other => into_object(other, "the document root")?,
    };
    let samples = take_list(&mut root, "samples", "the document root")?
        .into_iter()
        .map(parse_sample)
        .collect::<Result<Vec<_>, _>>()?;

    let group = SampleGroup::new(samples);
    let (samples, libraries, readgroups) = group.counts();
    info!(
        "Parsed {} samples, {} libraries and {} readgroups from document",
        samples, libraries, readgroups
    );
    Ok(group)
}

fn parse_sample(value: Value) -> Result<Sample, ParseError> {
    let mut fields = into_object(value, "a sample entry")?;
    let id = take_id(&mut fields, "a sample entry")?;
    let location = format!("sample '{id}'");

    let libraries = take_list(&mut fields, "libraries", &location)?
        .into_iter()
        .map(|library| parse_library(library, &id))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Sample::new(id, libraries).with_properties(fields))
}

fn parse_library(value: Value, sample: &str) -> Result<Library, ParseError> {
    let location = format!("a library entry of sample '{sample}'");
    let mut fields = into_object(value, &location)?;
    let id = take_id(&mut fields, &location)?;
    let location = format!("library '{id}' of sample '{sample}'");

    let readgroups = take_list(&mut fields, "readgroups", &location)?
        .into_iter()
        .map(|readgroup| parse_readgroup(readgroup, &location))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Library::new(id, readgroups).with_properties(fields))
}

fn parse_readgroup(value: Value, library: &str) -> Result<ReadGroup, ParseError> {
    let location = format!("a readgroup entry of {library}");
    let mut fields = into_object(value, &location)?;
    let id = take_id(&mut fields, &location)?;
    let location = format!("readgroup '{id}' of {library}");

    let reads = fields
        .shift_remove("reads")
        .ok_or_else(|| ParseError::missing("reads", format!("in {location}")))?;
    let reads_location = format!("the reads of {location}");
    let mut reads = into_object(reads, &reads_location)?;

    let r1 = take_scalar(&mut reads, "R1", &reads_location)?
        .ok_or_else(|| ParseError::missing("R1", format!("in {reads_location}")))?;

    let mut readgroup = ReadGroup::new(id, r1).with_properties(fields);
    readgroup.r1_md5 = take_scalar(&mut reads, "R1_md5", &reads_location)?;
    readgroup.r2 = take_scalar(&mut reads, "R2", &reads_location)?.map(PathBuf::from);
    readgroup.r2_md5 = take_scalar(&mut reads, "R2_md5", &reads_location)?;

    if !reads.is_empty() {
        warn!(
            "Ignoring unknown keys {:?} in {}",
            reads.keys().collect::<Vec<_>>(),
            reads_location
        );
    }

    Ok(readgroup)
}

fn into_object(value: Value, location: &str) -> Result<Properties, ParseError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(ParseError::InvalidDocument(format!(
            "expected a mapping for {location}, found {}",
            type_name(&other)
        ))),
    }
}

fn take_list(fields: &mut Properties, key: &str, location: &str) -> Result<Vec<Value>, ParseError> {
    match fields.shift_remove(key) {
        Some(Value::Array(items)) => Ok(items),
        Some(Value::Null) | None => Err(ParseError::missing(key, format!("in {location}"))),
        Some(other) => Err(ParseError::InvalidDocument(format!(
            "expected a list for '{key}' in {location}, found {}",
            type_name(&other)
        ))),
    }
}

fn take_id(fields: &mut Properties, location: &str) -> Result<String, ParseError> {
    take_scalar(fields, "id", location)?.ok_or_else(|| ParseError::missing("id", format!("in {location}")))
}

/// Remove a scalar field; numbers and booleans are rendered as text
fn take_scalar(fields: &mut Properties, key: &str, location: &str) -> Result<Option<String>, ParseError> {
    match fields.shift_remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(value @ (Value::Number(_) | Value::Bool(_))) => Ok(Some(value.to_string())),
        Some(other) => Err(ParseError::InvalidDocument(format!(
            "expected a scalar for '{key}' in {location}, found {}",
            type_name(&other)
        ))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const COMPLETE_WITH_CONTROL: &str = r"
samples:
  - id: s1
    libraries:
      - id: lib1
        readgroups:
          - id: rg1
            reads:
              R1: r1.fq
              R1_md5: hello
              R2: r2.fq
              R2_md5: hey
  - id: s2
    control: s1
    libraries:
      - id: lib1
        readgroups:
          - id: rg1
            reads:
              R1: r1.fq
              R1_md5: aa
              R2: r2.fq
              R2_md5: bb
";

    fn complete_with_control() -> SampleGroup {
        let mut control = Properties::new();
        control.insert("control".to_string(), json!("s1"));
        SampleGroup::new(vec![
            Sample::new(
                "s1",
                vec![Library::new(
                    "lib1",
                    vec![ReadGroup::new("rg1", "r1.fq")
                        .with_r1_md5("hello")
                        .with_r2("r2.fq")
                        .with_r2_md5("hey")],
                )],
            ),
            Sample::new(
                "s2",
                vec![Library::new(
                    "lib1",
                    vec![ReadGroup::new("rg1", "r1.fq")
                        .with_r1_md5("aa")
                        .with_r2("r2.fq")
                        .with_r2_md5("bb")],
                )],
            )
            .with_properties(control),
        ])
    }

    #[test]
    fn test_yaml_all_fields() {
        let group = parse_yaml_str(COMPLETE_WITH_CONTROL).unwrap();
        assert_eq!(group, complete_with_control());
    }

    #[test]
    fn test_json_without_md5() {
        let text = r#"{"samples": [{"id": "s1", "libraries": [{"id": "lib1",
            "readgroups": [{"id": "rg1", "reads": {"R1": "r1.fq", "R2": "r2.fq"}}]}]}]}"#;
        let group = parse_json_str(text).unwrap();
        let rg = &group[0][0][0];
        assert_eq!(rg.r1_md5, None);
        assert_eq!(rg.r2, Some(PathBuf::from("r2.fq")));
        assert_eq!(rg.r2_md5, None);
    }

    #[test]
    fn test_extras_keep_document_order() {
        let text = r"
samples:
  - id: s1
    zebra: 1
    libraries:
      - id: lib1
        platform: illumina
        readgroups:
          - id: rg1
            lane: 3
            reads: {R1: a.fq}
            flowcell: ABC
    alpha: [x, y]
";
        let group = parse_yaml_str(text).unwrap();
        let keys: Vec<_> = group[0].additional_properties.keys().collect();
        assert_eq!(keys, vec!["zebra", "alpha"]);
        assert_eq!(group[0].additional_properties["alpha"], json!(["x", "y"]));
        assert_eq!(group[0][0].additional_properties["platform"], json!("illumina"));

        let rg_keys: Vec<_> = group[0][0][0].additional_properties.keys().collect();
        assert_eq!(rg_keys, vec!["lane", "flowcell"]);
    }

    #[test]
    fn test_duplicate_ids_are_siblings() {
        let text = r"
samples:
  - id: s1
    libraries: [{id: lib1, readgroups: [{id: rg1, reads: {R1: a.fq}}]}]
  - id: s1
    libraries: [{id: lib1, readgroups: [{id: rg1, reads: {R1: a.fq}}]}]
";
        let group = parse_yaml_str(text).unwrap();
        assert_eq!(group.len(), 2);
        assert_eq!(group[0], group[1]);
    }

    #[test]
    fn test_missing_levels() {
        let err = parse_yaml_str("other: 1\n").unwrap_err();
        assert!(matches!(err, ParseError::Schema { ref field, .. } if field == "samples"));

        let err = parse_yaml_str("samples: [{id: s1}]\n").unwrap_err();
        assert!(matches!(err, ParseError::Schema { ref field, .. } if field == "libraries"));

        let err = parse_yaml_str("samples: [{id: s1, libraries: [{id: l1}]}]\n").unwrap_err();
        assert!(matches!(err, ParseError::Schema { ref field, .. } if field == "readgroups"));

        let err =
            parse_yaml_str("samples: [{id: s1, libraries: [{id: l1, readgroups: [{id: r}]}]}]\n")
                .unwrap_err();
        assert!(matches!(err, ParseError::Schema { ref field, .. } if field == "reads"));

        let err = parse_yaml_str(
            "samples: [{id: s1, libraries: [{id: l1, readgroups: [{id: r, reads: {R2: b.fq}}]}]}]\n",
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::Schema { ref field, .. } if field == "R1"));
        assert!(err.to_string().contains("readgroup 'r'"));
    }

    #[test]
    fn test_numeric_ids_become_text() {
        let group = parse_yaml_str(
            "samples: [{id: 1, libraries: [{id: 2, readgroups: [{id: 3, reads: {R1: a.fq}}]}]}]\n",
        )
        .unwrap();
        assert_eq!(group[0].id, "1");
        assert_eq!(group[0][0].id, "2");
        assert_eq!(group[0][0][0].id, "3");
    }

    #[test]
    fn test_empty_document_lacks_samples() {
        for text in ["", "---\n", "# nothing here\n"] {
            let err = parse_yaml_str(text).unwrap_err();
            assert!(matches!(err, ParseError::Schema { ref field, .. } if field == "samples"));
        }
        let err = parse_json_str("null").unwrap_err();
        assert!(matches!(err, ParseError::Schema { ref field, .. } if field == "samples"));
    }

    #[test]
    fn test_wrong_node_type() {
        let err = parse_yaml_str("samples: {id: s1}\n").unwrap_err();
        assert!(matches!(err, ParseError::InvalidDocument(_)));
    }
}
