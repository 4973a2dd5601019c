//! Streaming access to the `;` separated operator listing.
//!
//! The header is read once; rows are then handed out one at a time and
//! written back immediately, so only the row being processed is in memory.

use std::collections::HashMap;
use std::io::{Read, Write};

use mncreach_common::{error::EnrichError, warn};

pub const DELIMITER: u8 = b';';

/// Column layout of the output: the input header followed by any columns an
/// enricher adds.
#[derive(Debug, Clone)]
pub struct Header {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    input_len: usize,
}

impl Header {
    pub fn new(columns: Vec<String>) -> Self {
        let input_len = columns.len();
        let mut index = HashMap::new();
        for (pos, name) in columns.iter().enumerate() {
            // First occurrence wins for duplicated names.
            index.entry(name.clone()).or_insert(pos);
        }
        Self {
            columns,
            index,
            input_len,
        }
    }

    /// Appends every column in `extra` that is not present yet, in order.
    pub fn with_columns(mut self, extra: &[&str]) -> Self {
        for name in extra {
            if !self.index.contains_key(*name) {
                self.index.insert(name.to_string(), self.columns.len());
                self.columns.push(name.to_string());
            }
        }
        self
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Number of columns that came from the input file.
    pub fn input_len(&self) -> usize {
        self.input_len
    }
}

/// One data row, addressed by column name.
#[derive(Debug, Clone)]
pub struct Row<'h> {
    header: &'h Header,
    values: Vec<String>,
    line: u64,
}

impl<'h> Row<'h> {
    /// Builds a row from raw fields. Short records are padded with blanks;
    /// fields beyond the input header are dropped.
    pub fn from_fields<I, S>(header: &'h Header, fields: I, line: u64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut values: Vec<String> = fields
            .into_iter()
            .map(Into::into)
            .collect();

        if values.len() > header.input_len() {
            warn!(
                "Line {line} has {} fields, header has {}; extra fields dropped",
                values.len(),
                header.input_len()
            );
            values.truncate(header.input_len());
        }
        values.resize(header.len(), String::new());

        Self {
            header,
            values,
            line,
        }
    }

    /// Value of a column, or `""` when the column does not exist.
    pub fn get(&self, name: &str) -> &str {
        self.header
            .position(name)
            .and_then(|pos| self.values.get(pos))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Sets a column. Returns `false` when the header has no such column.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self.header.position(name) {
            Some(pos) => {
                self.values[pos] = value.into();
                true
            }
            None => false,
        }
    }

    pub fn is_blank(&self, name: &str) -> bool {
        self.get(name).trim().is_empty()
    }

    /// Lenient integer read: leading sign and digits after optional
    /// whitespace, anything unparsable reads as 0. `"1"`, `" 1"` and `"1.0"`
    /// are all 1; `""` is 0.
    pub fn int(&self, name: &str) -> i64 {
        lenient_int(self.get(name))
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Line of the record in the input file (the header is line 1).
    pub fn line(&self) -> u64 {
        self.line
    }
}

fn lenient_int(raw: &str) -> i64 {
    let trimmed = raw.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().map(|n| sign * n).unwrap_or(0)
}

pub fn reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(true)
        .flexible(true)
        .from_reader(input)
}

pub fn writer<W: Write>(output: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .delimiter(DELIMITER)
        .flexible(true)
        .from_writer(output)
}

/// Reads the header row. An empty input is malformed: the header is required.
pub fn read_header<R: Read>(reader: &mut csv::Reader<R>) -> Result<Header, EnrichError> {
    let record = reader.headers().map_err(malformed)?;
    if record.is_empty() || record.iter().all(|name| name.trim().is_empty()) {
        return Err(EnrichError::InputFileMalformed {
            line: 1,
            reason: "missing header row".to_string(),
        });
    }
    Ok(Header::new(
        record.iter().map(|name| name.trim().to_string()).collect(),
    ))
}

/// Writes one record and flushes it through to the underlying writer.
pub fn write_flushed<W: Write>(
    writer: &mut csv::Writer<W>,
    fields: &[String],
) -> Result<(), EnrichError> {
    writer
        .write_record(fields)
        .map_err(|e| EnrichError::Output(e.to_string()))?;
    writer.flush()?;
    Ok(())
}

pub(crate) fn malformed(err: csv::Error) -> EnrichError {
    let line = err.position().map(|pos| pos.line()).unwrap_or(0);
    EnrichError::InputFileMalformed {
        line,
        reason: err.to_string(),
    }
}
