//! Build a [`SampleGroup`] from the rows of a delimited samplesheet.
//!
//! The column layout is resolved once from the header into a [`SheetMode`].
//! Rows are then processed strictly in file order: the first occurrence of a
//! sample or library id creates the node, later occurrences append to it.

use std::collections::HashSet;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::core::samplestructure::SampleGroupIndex;
use crate::core::types::{ExtraColumnLevel, Properties, SheetMode};
use crate::core::{ReadGroup, SampleGroup};
use crate::parsing::tabular::{Header, Row, TabularReader};
use crate::parsing::ParseError;

pub const SAMPLE: &str = "sample";
pub const LIBRARY: &str = "library";
pub const READGROUP: &str = "readgroup";
pub const R1: &str = "R1";
pub const R1_MD5: &str = "R1_md5";
pub const R2: &str = "R2";
pub const R2_MD5: &str = "R2_md5";

/// Columns every samplesheet header must contain, in reporting order
pub const REQUIRED_COLUMNS: [&str; 6] = [SAMPLE, LIBRARY, R1, R1_MD5, R2, R2_MD5];

/// Options for building a sample group from a delimited samplesheet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetOptions {
    /// Level that receives columns outside the fixed schema
    pub extra_column_level: ExtraColumnLevel,
}

/// Column vocabulary of one samplesheet, resolved from its header
#[derive(Debug, Clone)]
struct SheetSchema {
    mode: SheetMode,
    extra_columns: Vec<String>,
}

/// Identifiers of one row after applying the sheet mode
struct RowIds<'r> {
    sample: &'r str,
    library: &'r str,
    readgroup: &'r str,
}

impl SheetSchema {
    fn resolve(header: &Header) -> Result<Self, ParseError> {
        if let Some(missing) = REQUIRED_COLUMNS.iter().find(|c| !header.contains(c)) {
            return Err(ParseError::missing(*missing, "in the samplesheet header"));
        }

        let mode = if header.contains(READGROUP) {
            SheetMode::Current
        } else {
            SheetMode::Legacy
        };

        // Everything outside the fixed vocabulary, first occurrence only
        let fixed: HashSet<&str> = REQUIRED_COLUMNS.iter().copied().chain([READGROUP]).collect();
        let extra_columns = header
            .names()
            .iter()
            .enumerate()
            .filter(|(index, name)| {
                !fixed.contains(name.as_str()) && header.position(name) == Some(*index)
            })
            .map(|(_, name)| name.clone())
            .collect();

        Ok(Self {
            mode,
            extra_columns,
        })
    }

    fn ids<'r>(&self, row: &'r Row) -> RowIds<'r> {
        let sample = cell(row, SAMPLE);
        match self.mode {
            SheetMode::Legacy => RowIds {
                sample,
                library: sample,
                readgroup: cell(row, LIBRARY),
            },
            SheetMode::Current => RowIds {
                sample,
                library: cell(row, LIBRARY),
                readgroup: cell(row, READGROUP),
            },
        }
    }

    fn extras(&self, row: &Row) -> Vec<(String, Value)> {
        self.extra_columns
            .iter()
            .map(|column| {
                let value = non_empty(cell(row, column))
                    .map_or(Value::Null, |v| Value::String(v.to_string()));
                (column.clone(), value)
            })
            .collect()
    }
}

/// Cell of a column known to be in the header
fn cell<'r>(row: &'r Row, column: &str) -> &'r str {
    row.get(column).unwrap_or_default()
}

fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Merge one extra column into the properties of an existing node.
///
/// A null value never overwrites, a non-null value fills a null, and two
/// different non-null values are a conflict.
fn merge_property(
    properties: &mut Properties,
    column: String,
    value: Value,
    entity: &str,
) -> Result<(), ParseError> {
    let Some(existing) = properties.get_mut(&column) else {
        properties.insert(column, value);
        return Ok(());
    };

    if value.is_null() {
        return Ok(());
    }
    if existing.is_null() {
        *existing = value;
        return Ok(());
    }
    if *existing != value {
        return Err(ParseError::ConflictingProperty {
            column,
            entity: entity.to_string(),
            existing: display_value(existing),
            new: display_value(&value),
        });
    }
    Ok(())
}

/// Accumulates rows into a `SampleGroup`
struct SampleSheetBuilder {
    schema: SheetSchema,
    options: SheetOptions,
    index: SampleGroupIndex,

    /// (sample position, library position, readgroup id) already seen
    readgroup_ids: HashSet<(usize, usize, String)>,
}

impl SampleSheetBuilder {
    fn new(schema: SheetSchema, options: SheetOptions) -> Self {
        Self {
            schema,
            options,
            index: SampleGroupIndex::new(),
            readgroup_ids: HashSet::new(),
        }
    }

    fn add_row(&mut self, row: &Row) -> Result<(), ParseError> {
        let ids = self.schema.ids(row);
        let (sample, _) = self.index.sample_entry(ids.sample);
        let (library, _) = self.index.library_entry(sample, ids.library);

        if !self
            .readgroup_ids
            .insert((sample, library, ids.readgroup.to_string()))
        {
            return Err(ParseError::DuplicateIdentifier(format!(
                "{}-{}-{}",
                ids.sample, ids.library, ids.readgroup
            )));
        }

        let mut readgroup = ReadGroup::new(ids.readgroup, cell(row, R1));
        readgroup.r1_md5 = non_empty(cell(row, R1_MD5)).map(str::to_string);
        readgroup.r2 = non_empty(cell(row, R2)).map(PathBuf::from);
        readgroup.r2_md5 = non_empty(cell(row, R2_MD5)).map(str::to_string);

        let extras = self.schema.extras(row);
        match self.options.extra_column_level {
            ExtraColumnLevel::ReadGroup => {
                readgroup.additional_properties = extras.into_iter().collect();
            }
            ExtraColumnLevel::Sample => {
                let entity = format!("sample '{}'", ids.sample);
                let properties = &mut self.index.sample_mut(sample).additional_properties;
                for (column, value) in extras {
                    merge_property(properties, column, value, &entity)?;
                }
            }
            ExtraColumnLevel::Library => {
                let entity = format!("library '{}' of sample '{}'", ids.library, ids.sample);
                let properties = &mut self
                    .index
                    .library_mut(sample, library)
                    .additional_properties;
                for (column, value) in extras {
                    merge_property(properties, column, value, &entity)?;
                }
            }
        }

        self.index
            .library_mut(sample, library)
            .append_readgroup(readgroup);
        Ok(())
    }
}

/// Consume a row stream into a `SampleGroup`
///
/// # Errors
///
/// Returns `ParseError::Schema` if a required column is missing,
/// `ParseError::DuplicateIdentifier` if a (sample, library, readgroup) triple
/// repeats, `ParseError::ConflictingProperty` if rows disagree on an extra
/// column of the same node, or any error of the row stream.
pub fn build_sample_group<R: Read>(
    reader: TabularReader<R>,
    options: &SheetOptions,
) -> Result<SampleGroup, ParseError> {
    let schema = SheetSchema::resolve(reader.header())?;
    debug!(
        "Samplesheet uses the {} layout with extra columns {:?}",
        schema.mode, schema.extra_columns
    );

    let mode = schema.mode;
    let mut builder = SampleSheetBuilder::new(schema, *options);
    for row in reader {
        builder.add_row(&row?)?;
    }

    let group = builder.index.finish();
    let (samples, libraries, readgroups) = group.counts();
    info!(
        "Parsed {} samples, {} libraries and {} readgroups ({} layout)",
        samples, libraries, readgroups, mode
    );
    Ok(group)
}

/// Parse a delimited samplesheet file
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or any error of
/// [`build_sample_group`].
pub fn parse_samplesheet_file(path: &Path, options: &SheetOptions) -> Result<SampleGroup, ParseError> {
    debug!("Reading delimited samplesheet {}", path.display());
    build_sample_group(TabularReader::open(path)?, options)
}

/// Parse delimited samplesheet text
///
/// # Errors
///
/// Returns any error of [`build_sample_group`].
pub fn parse_samplesheet_text(text: &str, options: &SheetOptions) -> Result<SampleGroup, ParseError> {
    build_sample_group(TabularReader::from_reader(Cursor::new(text.as_bytes()))?, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(text: &str) -> Result<SampleGroup, ParseError> {
        parse_samplesheet_text(text, &SheetOptions::default())
    }

    fn parse_at(text: &str, level: ExtraColumnLevel) -> Result<SampleGroup, ParseError> {
        let options = SheetOptions {
            extra_column_level: level,
        };
        parse_samplesheet_text(text, &options)
    }

    const COMPLETE: &str = "\
sample,library,readgroup,R1,R1_md5,R2,R2_md5
s1,lib1,rg1,r1.fq,hello,r2.fq,hey
s1,lib1,rg2,r1b.fq,,r2b.fq,
s1,lib2,rg1,r1c.fq,,,
s2,lib1,rg1,s2_r1.fq,aa,s2_r2.fq,bb
";

    #[test]
    fn test_current_layout() {
        let group = parse(COMPLETE).unwrap();
        assert_eq!(group.counts(), (2, 3, 4));

        let s1 = &group[0];
        assert_eq!(s1.id, "s1");
        assert_eq!(s1[0].id, "lib1");
        assert_eq!(s1[1].id, "lib2");
        let ids: Vec<_> = s1[0].iter().map(|rg| rg.id.as_str()).collect();
        assert_eq!(ids, vec!["rg1", "rg2"]);

        let rg = &s1[0][0];
        assert_eq!(rg.r1, PathBuf::from("r1.fq"));
        assert_eq!(rg.r1_md5.as_deref(), Some("hello"));
        assert_eq!(rg.r2, Some(PathBuf::from("r2.fq")));
        assert_eq!(rg.r2_md5.as_deref(), Some("hey"));
        assert!(rg.additional_properties.is_empty());
    }

    #[test]
    fn test_empty_cells_become_null() {
        let group = parse(COMPLETE).unwrap();
        let rg = &group[0][0][1];
        assert_eq!(rg.r1_md5, None);
        assert_eq!(rg.r2_md5, None);

        let rg = &group[0][1][0];
        assert_eq!(rg.r2, None);
        assert_eq!(rg.r2_md5, None);
    }

    #[test]
    fn test_empty_r1_kept_as_empty_path() {
        let group = parse("sample,library,readgroup,R1,R1_md5,R2,R2_md5\ns1,lib1,rg1,,,,\n").unwrap();
        let rg = &group[0][0][0];
        assert_eq!(rg.r1, PathBuf::from(""));
        assert_eq!(rg.r2, None);
        assert_eq!(group.files(), vec![Path::new("")]);
    }

    #[test]
    fn test_legacy_layout() {
        let text = "\
sample\tlibrary\tR1\tR1_md5\tR2\tR2_md5
s1\trg1\ts1_r1.fq\t\ts1_r2.fq\t
s2\trg1\ts2_r1.fq\t\ts2_r2.fq\t
s1\trg2\ts1b_r1.fq\t\t\t
";
        let group = parse(text).unwrap();
        assert_eq!(group.len(), 2);
        for sample in &group {
            assert_eq!(sample.len(), 1);
            assert_eq!(sample[0].id, sample.id);
        }
        let ids: Vec<_> = group[0][0].iter().map(|rg| rg.id.as_str()).collect();
        assert_eq!(ids, vec!["rg1", "rg2"]);
    }

    #[test]
    fn test_duplicate_readgroup() {
        let text = "\
sample,library,readgroup,R1,R1_md5,R2,R2_md5
s1,lib1,rg1,a.fq,,,
s2,lib1,rg1,b.fq,,,
s2,lib1,rg1,c.fq,,,
";
        let err = parse(text).unwrap_err();
        assert!(matches!(err, ParseError::DuplicateIdentifier(_)));
        assert!(err.to_string().contains("s2-lib1-rg1"));
    }

    #[test]
    fn test_duplicate_readgroup_legacy() {
        let text = "\
sample;library;R1;R1_md5;R2;R2_md5
s1;rg1;a.fq;;;
s1;rg1;b.fq;;;
";
        let err = parse(text).unwrap_err();
        assert!(err.to_string().contains("s1-s1-rg1"));
    }

    #[test]
    fn test_same_readgroup_id_in_other_library_is_allowed() {
        let group = parse(COMPLETE).unwrap();
        assert_eq!(group[0][0][0].id, "rg1");
        assert_eq!(group[0][1][0].id, "rg1");
    }

    #[test]
    fn test_missing_column() {
        let text = "library,readgroup,R1,R1_md5,R2,R2_md5\nlib1,rg1,a.fq,,,\n";
        let err = parse(text).unwrap_err();
        assert!(matches!(err, ParseError::Schema { ref field, .. } if field == "sample"));
        assert!(err.to_string().contains("sample"));

        let text = "sample,library,readgroup,R1,R2,R2_md5\ns1,lib1,rg1,a.fq,,\n";
        let err = parse(text).unwrap_err();
        assert!(matches!(err, ParseError::Schema { ref field, .. } if field == "R1_md5"));
    }

    #[test]
    fn test_extra_fields_on_sample() {
        let text = "\
sample,library,readgroup,R1,R1_md5,R2,R2_md5,extra_field1,extra_field2
s1,lib1,rg1,a.fq,,,,xf1,xf2
s2,lib1,rg1,b.fq,,,,xfI,xfII
";
        let group = parse(text).unwrap();
        assert_eq!(group[0].additional_properties["extra_field1"], json!("xf1"));
        assert_eq!(group[0].additional_properties["extra_field2"], json!("xf2"));
        assert_eq!(group[1].additional_properties["extra_field1"], json!("xfI"));
        assert_eq!(group[1].additional_properties["extra_field2"], json!("xfII"));
        assert!(group[0][0][0].additional_properties.is_empty());
    }

    #[test]
    fn test_extra_field_conflict() {
        let text = "\
sample,library,readgroup,R1,R1_md5,R2,R2_md5,extra_field1
s1,lib1,rg1,a.fq,,,,a
s1,lib1,rg2,b.fq,,,,b
";
        let err = parse(text).unwrap_err();
        assert!(matches!(err, ParseError::ConflictingProperty { .. }));
        let message = err.to_string();
        assert!(message.contains("extra_field1"));
        assert!(message.contains("s1"));
    }

    #[test]
    fn test_extra_field_null_does_not_conflict() {
        let text = "\
sample,library,readgroup,R1,R1_md5,R2,R2_md5,extra_field1,control
s1,lib1,rg1,a.fq,,,,,
s1,lib1,rg2,b.fq,,,,a,
s2,lib1,rg1,c.fq,,,,x,s1
s2,lib1,rg2,d.fq,,,,,s1
";
        let group = parse(text).unwrap();
        assert_eq!(group[0].additional_properties["extra_field1"], json!("a"));
        assert_eq!(group[0].additional_properties["control"], Value::Null);
        assert_eq!(group[1].additional_properties["extra_field1"], json!("x"));
        assert_eq!(group[1].additional_properties["control"], json!("s1"));

        // Header order is kept
        let keys: Vec<_> = group[1].additional_properties.keys().collect();
        assert_eq!(keys, vec!["extra_field1", "control"]);
    }

    #[test]
    fn test_extra_fields_on_readgroup() {
        let text = "\
sample,library,readgroup,R1,R1_md5,R2,R2_md5,lane
s1,lib1,rg1,a.fq,,,,1
s1,lib1,rg2,b.fq,,,,
";
        let group = parse_at(text, ExtraColumnLevel::ReadGroup).unwrap();
        assert!(group[0].additional_properties.is_empty());
        assert_eq!(group[0][0][0].additional_properties["lane"], json!("1"));
        assert_eq!(group[0][0][1].additional_properties["lane"], Value::Null);
    }

    #[test]
    fn test_extra_fields_on_library_conflict() {
        let text = "\
sample,library,readgroup,R1,R1_md5,R2,R2_md5,kit
s1,lib1,rg1,a.fq,,,,k1
s1,lib2,rg1,b.fq,,,,k2
s1,lib1,rg2,c.fq,,,,k3
";
        let err = parse_at(text, ExtraColumnLevel::Library).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("kit"));
        assert!(message.contains("lib1"));
        assert!(message.contains("s1"));
    }

    #[test]
    fn test_dialect_independence() {
        let comma = "sample,library,readgroup,R1,R1_md5,R2,R2_md5,cohort\n\
                     s1,lib1,rg1,a.fq,x,b.fq,,c1\n\
                     s2,lib1,rg1,c.fq,,,,c2\n";
        let semicolon = comma.replace(',', ";");
        let tab = comma.replace(',', "\t");

        let expected = parse(comma).unwrap();
        assert_eq!(parse(&semicolon).unwrap(), expected);
        assert_eq!(parse(&tab).unwrap(), expected);
    }

    #[test]
    fn test_header_only() {
        let group = parse("sample,library,readgroup,R1,R1_md5,R2,R2_md5\n").unwrap();
        assert!(group.is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(parse(""), Err(ParseError::DialectDetection(_))));
    }

    #[test]
    fn test_first_seen_order() {
        let text = "\
sample,library,readgroup,R1,R1_md5,R2,R2_md5
zeta,lib2,rg1,a.fq,,,
alpha,lib1,rg1,b.fq,,,
zeta,lib1,rg1,c.fq,,,
";
        let group = parse(text).unwrap();
        let samples: Vec<_> = group.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(samples, vec!["zeta", "alpha"]);
        let libraries: Vec<_> = group[0].iter().map(|l| l.id.as_str()).collect();
        assert_eq!(libraries, vec!["lib2", "lib1"]);
    }
}
