//! Streaming BED file parser.

use crate::interval::{Attribute, BedRecord, Strand};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during BED parsing.
#[derive(Error, Debug)]
pub enum BedError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid BED format: {0}")]
    InvalidFormat(String),
}

pub type Result<T> = std::result::Result<T, BedError>;

/// Column names for MACS2 narrowPeak columns 7-10.
pub const NARROWPEAK_COLUMNS: [&str; 4] = ["signalValue", "pValue", "qValue", "peak"];

/// How columns beyond BED6 are named in the attribute table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ColumnScheme {
    /// Extra columns are named `col7`, `col8`, ...
    #[default]
    Bed,
    /// ENCODE narrowPeak: `signalValue`, `pValue`, `qValue`, `peak`.
    NarrowPeak,
    /// Caller-supplied names for columns 7 onwards.
    Named(Vec<String>),
}

impl ColumnScheme {
    /// Attribute name for a 0-based column index >= 6.
    fn column_name(&self, idx: usize) -> String {
        let extra = idx - 6;
        let named = match self {
            ColumnScheme::Bed => None,
            ColumnScheme::NarrowPeak => NARROWPEAK_COLUMNS.get(extra).map(|s| s.to_string()),
            ColumnScheme::Named(names) => names.get(extra).cloned(),
        };
        named.unwrap_or_else(|| format!("col{}", idx + 1))
    }
}

/// A streaming BED file reader.
pub struct BedReader<R: Read> {
    reader: BufReader<R>,
    line_number: usize,
    buffer: String,
    scheme: ColumnScheme,
}

impl BedReader<File> {
    /// Open a BED file from a path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(file))
    }
}

impl<R: Read> BedReader<R> {
    /// Create a new BED reader from any readable source.
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            line_number: 0,
            buffer: String::with_capacity(1024),
            scheme: ColumnScheme::default(),
        }
    }

    /// Use a column scheme for fields beyond BED6.
    pub fn with_scheme(mut self, scheme: ColumnScheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Read the next BED record.
    pub fn read_record(&mut self) -> Result<Option<BedRecord>> {
        loop {
            self.buffer.clear();
            let bytes_read = self.reader.read_line(&mut self.buffer)?;
            if bytes_read == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            // Skip empty lines and comments
            let line = self.buffer.trim();
            if line.is_empty()
                || line.starts_with('#')
                || line.starts_with("track")
                || line.starts_with("browser")
            {
                continue;
            }

            return self.parse_line(line).map(Some);
        }
    }

    /// Parse a single BED line.
    fn parse_line(&self, line: &str) -> Result<BedRecord> {
        let fields: Vec<&str> = line.split('\t').collect();

        if fields.len() < 3 {
            return Err(BedError::Parse {
                line: self.line_number,
                message: format!("Expected at least 3 fields, got {}", fields.len()),
            });
        }

        let start = self.parse_position(fields[1], "start")?;
        let end = self.parse_position(fields[2], "end")?;

        if start > end {
            return Err(BedError::Parse {
                line: self.line_number,
                message: format!("Start ({}) > end ({})", start, end),
            });
        }

        let mut record = BedRecord::new(fields[0], start, end);

        if fields.len() > 3 && fields[3] != "." {
            record
                .attributes
                .insert("name".to_string(), Attribute::Text(fields[3].to_string()));
        }
        if fields.len() > 4 {
            if let Ok(score) = fields[4].parse::<f64>() {
                record
                    .attributes
                    .insert("score".to_string(), Attribute::Numeric(score));
            }
        }
        if fields.len() > 5 {
            record.strand = fields[5].chars().next().map(Strand::from_char);
        }
        for (idx, raw) in fields.iter().enumerate().skip(6) {
            record
                .attributes
                .insert(self.scheme.column_name(idx), Attribute::parse(raw));
        }

        Ok(record)
    }

    fn parse_position(&self, s: &str, field_name: &str) -> Result<u64> {
        s.parse().map_err(|_| BedError::Parse {
            line: self.line_number,
            message: format!("Invalid {} position: '{}'", field_name, s),
        })
    }

    /// Get an iterator over all records.
    pub fn records(self) -> BedRecordIter<R> {
        BedRecordIter { reader: self }
    }
}

/// Iterator over BED records.
pub struct BedRecordIter<R: Read> {
    reader: BedReader<R>,
}

impl<R: Read> Iterator for BedRecordIter<R> {
    type Item = Result<BedRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

/// Read all BED records from a file.
pub fn read_records<P: AsRef<Path>>(path: P, scheme: ColumnScheme) -> Result<Vec<BedRecord>> {
    let reader = BedReader::from_path(path)?.with_scheme(scheme);
    reader.records().collect()
}

/// Parse records from a string (useful for testing).
pub fn parse_records(content: &str) -> Result<Vec<BedRecord>> {
    BedReader::new(content.as_bytes()).records().collect()
}

/// Read a token list: one token per line, blank lines and `#` comments skipped.
pub fn read_tokens<R: Read>(reader: R) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    for line in BufReader::new(reader).lines() {
        let line = line?;
        let token = line.trim();
        if token.is_empty() || token.starts_with('#') {
            continue;
        }
        tokens.push(token.to_string());
    }
    Ok(tokens)
}

/// Read a token list from a file.
pub fn read_tokens_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    read_tokens(File::open(path)?)
}

/// Write BED records to a writer.
pub fn write_records<W: io::Write>(writer: &mut W, records: &[BedRecord]) -> io::Result<()> {
    for record in records {
        writeln!(writer, "{}", record)?;
    }
    Ok(())
}
