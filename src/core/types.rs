use serde::{Deserialize, Serialize};

/// Pass-through fields of an entity, in the order they were first seen.
///
/// Backed by `serde_json::Map` with `preserve_order`, so insertion order is kept.
pub type Properties = serde_json::Map<String, serde_json::Value>;

/// Samplesheet input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputFormat {
    Tsv,
    Csv,
    Yaml,
    Json,
}

impl InputFormat {
    /// Parse a format name or file suffix (`tsv`, `.CSV`, `yml`, ...).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim_start_matches('.').to_lowercase().as_str() {
            "tsv" => Some(Self::Tsv),
            "csv" => Some(Self::Csv),
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Whether this format goes through the delimited-text reader
    #[must_use]
    pub fn is_tabular(self) -> bool {
        matches!(self, Self::Tsv | Self::Csv)
    }
}

impl std::fmt::Display for InputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tsv => write!(f, "TSV"),
            Self::Csv => write!(f, "CSV"),
            Self::Yaml => write!(f, "YAML"),
            Self::Json => write!(f, "JSON"),
        }
    }
}

/// Document shape produced from a [`crate::SampleGroup`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OutputShape {
    /// samples -> libraries -> readgroups -> reads, `id` first
    #[default]
    CurrentNested,
    /// Same tree as `CurrentNested` with the historical key order
    LegacyNested,
    /// samples -> readgroups, library kept only as `lib_id`
    LegacyFlattened,
}

/// Encoding applied to the produced document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputEncoding {
    #[default]
    Json,
    Yaml,
}

/// Entity level that receives the extra columns of a tabular samplesheet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ExtraColumnLevel {
    #[default]
    Sample,
    Library,
    #[value(name = "readgroup")]
    #[serde(rename = "readgroup")]
    ReadGroup,
}

/// Column layout of a tabular samplesheet, resolved once from its header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetMode {
    /// No `readgroup` column: `library` holds the readgroup id and every
    /// sample has a single library named after itself.
    Legacy,
    /// `sample`, `library` and `readgroup` are independent levels.
    Current,
}

impl std::fmt::Display for SheetMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Legacy => write!(f, "legacy"),
            Self::Current => write!(f, "current"),
        }
    }
}
