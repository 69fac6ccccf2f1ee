//! Delimited-text reader with delimiter auto-detection.
//!
//! The delimiter is chosen from a bounded prefix of the input, then the
//! source is rewound and read from the start: the first record is the header
//! and every later record becomes a [`Row`] keyed by header name.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek};
use std::path::Path;
use std::rc::Rc;

use csv::StringRecord;
use tracing::{debug, warn};

use crate::parsing::ParseError;

/// Number of leading lines inspected for delimiter detection
pub const SNIFF_LINES: usize = 10;

/// Candidate delimiters, in order of preference on ties
pub const CANDIDATE_DELIMITERS: [u8; 3] = [b',', b';', b'\t'];

/// The detected layout of a delimited file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub delimiter: u8,
}

impl Dialect {
    /// Detect the delimiter from a text sample.
    ///
    /// A candidate qualifies when it splits the first line of the sample into
    /// at least two fields and at least half of the sampled lines into that
    /// same number. The qualifying candidate with the most fields wins, so a
    /// malformed row in the prefix is left for the row reader to report.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::DialectDetection` if the sample has no content or
    /// no candidate is consistently present.
    pub fn sniff(sample: &str) -> Result<Self, ParseError> {
        if sample.trim().is_empty() {
            return Err(ParseError::DialectDetection(
                "the file is empty".to_string(),
            ));
        }

        let mut best: Option<(u8, usize)> = None;
        for delimiter in CANDIDATE_DELIMITERS {
            let Some(fields) = consistent_field_count(sample, delimiter) else {
                continue;
            };
            if best.map_or(true, |(_, most)| fields > most) {
                best = Some((delimiter, fields));
            }
        }

        match best {
            Some((delimiter, fields)) => {
                debug!(
                    "Detected delimiter {:?} with {} columns",
                    char::from(delimiter),
                    fields
                );
                Ok(Self { delimiter })
            }
            None => Err(ParseError::DialectDetection(format!(
                "none of ',', ';' or tab splits the first {SNIFF_LINES} lines consistently"
            ))),
        }
    }
}

/// Field count of the first record of `sample`, if it is > 1 and shared by
/// at least half of the records
fn consistent_field_count(sample: &str, delimiter: u8) -> Option<usize> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(sample.as_bytes());

    let counts: Vec<usize> = reader
        .records()
        .map(|record| record.map(|r| r.len()))
        .collect::<Result<_, _>>()
        .ok()?;

    let expected = *counts.first()?;
    let matching = counts.iter().filter(|&&fields| fields == expected).count();
    (expected > 1 && matching * 2 >= counts.len()).then_some(expected)
}

/// Read up to `lines` lines from the start of `inner`
fn read_prefix<R: Read>(inner: &mut R, lines: usize) -> std::io::Result<String> {
    let mut reader = BufReader::new(inner);
    let mut sample = String::new();
    for _ in 0..lines {
        if reader.read_line(&mut sample)? == 0 {
            break;
        }
    }
    Ok(sample)
}

/// Column names of a delimited file, with a name -> position index
#[derive(Debug, Clone)]
pub struct Header {
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl Header {
    fn new(names: Vec<String>) -> Self {
        let mut positions = HashMap::with_capacity(names.len());
        for (index, name) in names.iter().enumerate() {
            if positions.contains_key(name) {
                warn!("Column '{}' appears more than once; using the first", name);
                continue;
            }
            positions.insert(name.clone(), index);
        }
        Self { names, positions }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// One data row: cell values keyed by the header's column names
#[derive(Debug, Clone)]
pub struct Row {
    header: Rc<Header>,
    values: StringRecord,
}

impl Row {
    /// Raw cell value of `column`
    pub fn get(&self, column: &str) -> Option<&str> {
        self.header
            .position(column)
            .and_then(|index| self.values.get(index))
    }
}

/// Pull-based stream of rows from a delimited source.
///
/// Owns the underlying source, which is released when the reader is dropped.
pub struct TabularReader<R: Read> {
    header: Rc<Header>,
    reader: csv::Reader<R>,
    record: StringRecord,
}

impl TabularReader<File> {
    /// Open a delimited file and read its header
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Io` if the file cannot be opened, or any error
    /// of [`TabularReader::from_reader`].
    pub fn open(path: &Path) -> Result<Self, ParseError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }
}

impl<R: Read + Seek> TabularReader<R> {
    /// Detect the dialect of `inner`, rewind it and read the header row
    ///
    /// # Errors
    ///
    /// Returns `ParseError::DialectDetection` if no delimiter can be detected,
    /// or `ParseError::Io`/`ParseError::Csv` on read failures.
    pub fn from_reader(mut inner: R) -> Result<Self, ParseError> {
        let sample = read_prefix(&mut inner, SNIFF_LINES)?;
        let dialect = Dialect::sniff(&sample)?;
        inner.rewind()?;

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(dialect.delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(inner);

        let mut record = StringRecord::new();
        if !reader.read_record(&mut record)? {
            return Err(ParseError::DialectDetection(
                "the file has no header row".to_string(),
            ));
        }

        let names = record
            .iter()
            .enumerate()
            .map(|(index, name)| {
                if index == 0 {
                    name.trim_start_matches('\u{feff}').to_string()
                } else {
                    name.to_string()
                }
            })
            .collect();

        Ok(Self {
            header: Rc::new(Header::new(names)),
            reader,
            record,
        })
    }
}

impl<R: Read> TabularReader<R> {
    pub fn header(&self) -> &Header {
        &self.header
    }

    fn next_row(&mut self) -> Result<Option<Row>, ParseError> {
        if !self.reader.read_record(&mut self.record)? {
            return Ok(None);
        }

        let line = self.record.position().map_or(0, csv::Position::line);
        if self.record.len() != self.header.len() {
            return Err(ParseError::MalformedRow {
                line,
                expected: self.header.len(),
                found: self.record.len(),
            });
        }

        Ok(Some(Row {
            header: Rc::clone(&self.header),
            values: self.record.clone(),
        }))
    }
}

impl<R: Read> Iterator for TabularReader<R> {
    type Item = Result<Row, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_row().transpose()
    }
}
