//! Core interval types for genomic region representation.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// Name of the synthetic attribute every record carries.
pub const WIDTH_ATTRIBUTE: &str = "width";

/// A genomic interval with chromosome, start, and end positions.
/// Uses 0-based, half-open coordinates (BED format).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Interval {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
}

impl Interval {
    /// Create a new interval.
    #[inline]
    pub fn new(chrom: impl Into<String>, start: u64, end: u64) -> Self {
        Self {
            chrom: chrom.into(),
            start,
            end,
        }
    }

    /// Returns the length of the interval.
    #[inline]
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    /// Returns true if the interval has zero length.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// End used for overlap tests. A zero-length interval stands for the
    /// 1-bp point at `start`, so it still overlaps whatever covers that base.
    #[inline]
    pub fn point_end(&self) -> u64 {
        self.end.max(self.start.saturating_add(1))
    }

    /// Check overlap with the span `[start, end)` on the same chromosome,
    /// with the same zero-length rule applied to the span.
    #[inline]
    pub fn overlaps_span(&self, start: u64, end: u64) -> bool {
        start < self.point_end() && self.start < end.max(start.saturating_add(1))
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.chrom, self.start, self.end)
    }
}

impl Ord for Interval {
    fn cmp(&self, other: &Self) -> Ordering {
        self.chrom
            .cmp(&other.chrom)
            .then(self.start.cmp(&other.start))
            .then(self.end.cmp(&other.end))
    }
}

impl PartialOrd for Interval {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Strand orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Strand {
    Plus,
    Minus,
    Unknown,
}

impl Strand {
    pub fn from_char(c: char) -> Self {
        match c {
            '+' => Strand::Plus,
            '-' => Strand::Minus,
            _ => Strand::Unknown,
        }
    }

    /// Two strands are compatible when equal or when either is unknown.
    #[inline]
    pub fn is_compatible(self, other: Strand) -> bool {
        self == other || self == Strand::Unknown || other == Strand::Unknown
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strand::Plus => write!(f, "+"),
            Strand::Minus => write!(f, "-"),
            Strand::Unknown => write!(f, "."),
        }
    }
}

/// A value in a record's attribute table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Attribute {
    Numeric(f64),
    Text(String),
}

impl Attribute {
    /// Parse a raw BED field, preferring a numeric reading.
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => Attribute::Numeric(v),
            _ => Attribute::Text(raw.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Attribute::Numeric(v) => Some(*v),
            Attribute::Text(_) => None,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::Numeric(v) => write!(f, "{}", v),
            Attribute::Text(s) => write!(f, "{}", s),
        }
    }
}

/// A genomic record: an interval, an optional strand and an open attribute table.
///
/// Attribute names are unique; the BED reader fills `name` and `score` from
/// columns 4 and 5 and names any further columns by its column scheme.
#[derive(Debug, Clone, PartialEq)]
pub struct BedRecord {
    pub interval: Interval,
    pub strand: Option<Strand>,
    pub attributes: BTreeMap<String, Attribute>,
}

impl BedRecord {
    /// Create a minimal BED3 record.
    pub fn new(chrom: impl Into<String>, start: u64, end: u64) -> Self {
        Self {
            interval: Interval::new(chrom, start, end),
            strand: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Set the strand.
    pub fn with_strand(mut self, strand: Strand) -> Self {
        self.strand = Some(strand);
        self
    }

    /// Add or replace an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: Attribute) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// Get the chromosome.
    #[inline]
    pub fn chrom(&self) -> &str {
        &self.interval.chrom
    }

    /// Get the start position.
    #[inline]
    pub fn start(&self) -> u64 {
        self.interval.start
    }

    /// Get the end position.
    #[inline]
    pub fn end(&self) -> u64 {
        self.interval.end
    }

    /// Get the interval length.
    #[inline]
    pub fn len(&self) -> u64 {
        self.interval.len()
    }

    /// Check if the interval is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.interval.is_empty()
    }

    /// Strand, treating a missing column as unknown.
    #[inline]
    pub fn strand_or_unknown(&self) -> Strand {
        self.strand.unwrap_or(Strand::Unknown)
    }

    /// Look up an attribute. `width` is synthesised from the interval
    /// unless the table carries its own column of that name.
    pub fn attribute(&self, name: &str) -> Option<Attribute> {
        match self.attributes.get(name) {
            Some(value) => Some(value.clone()),
            None if name == WIDTH_ATTRIBUTE => Some(Attribute::Numeric(self.len() as f64)),
            None => None,
        }
    }

    /// Stable string form used when intervals are compared as opaque tokens.
    pub fn token(&self) -> String {
        match self.strand {
            Some(Strand::Plus) | Some(Strand::Minus) => format!(
                "{}:{}-{}:{}",
                self.chrom(),
                self.start(),
                self.end(),
                self.strand_or_unknown()
            ),
            _ => format!("{}:{}-{}", self.chrom(), self.start(), self.end()),
        }
    }
}

impl fmt::Display for BedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.interval)?;
        if let Some(strand) = self.strand {
            write!(f, "\t.\t0\t{}", strand)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_overlap() {
        let a = Interval::new("chr1", 100, 200);

        assert!(a.overlaps_span(150, 250));
        assert!(!a.overlaps_span(200, 300)); // Adjacent, not overlapping
        assert!(!a.overlaps_span(0, 100));
        assert!(a.overlaps_span(50, 300)); // Containing
    }

    #[test]
    fn test_zero_length_is_a_point() {
        let point = Interval::new("chr1", 150, 150);
        assert_eq!(point.len(), 0);
        assert!(point.is_empty());
        assert_eq!(point.point_end(), 151);

        assert!(point.overlaps_span(100, 200));
        assert!(point.overlaps_span(150, 150));
        assert!(!point.overlaps_span(151, 200));
        assert!(!point.overlaps_span(100, 150));

        let a = Interval::new("chr1", 100, 200);
        assert!(a.overlaps_span(199, 199));
        assert!(!a.overlaps_span(200, 200));
    }

    #[test]
    fn test_interval_ordering() {
        let mut intervals = [
            Interval::new("chr2", 100, 200),
            Interval::new("chr1", 200, 300),
            Interval::new("chr1", 100, 200),
        ];
        intervals.sort();

        assert_eq!(intervals[0].chrom, "chr1");
        assert_eq!(intervals[0].start, 100);
        assert_eq!(intervals[1].start, 200);
        assert_eq!(intervals[2].chrom, "chr2");
    }

    #[test]
    fn test_strand_compatibility() {
        assert!(Strand::Plus.is_compatible(Strand::Plus));
        assert!(Strand::Plus.is_compatible(Strand::Unknown));
        assert!(Strand::Unknown.is_compatible(Strand::Minus));
        assert!(!Strand::Plus.is_compatible(Strand::Minus));
    }

    #[test]
    fn test_attribute_parse() {
        assert_eq!(Attribute::parse("4.5"), Attribute::Numeric(4.5));
        assert_eq!(Attribute::parse("peak_1"), Attribute::Text("peak_1".into()));
        assert_eq!(Attribute::parse("nan"), Attribute::Text("nan".into()));
    }

    #[test]
    fn test_width_is_synthetic() {
        let rec = BedRecord::new("chr1", 100, 250);
        assert_eq!(rec.attribute("width"), Some(Attribute::Numeric(150.0)));
        assert_eq!(rec.attribute("score"), None);

        let rec = rec.with_attribute("width", Attribute::Numeric(7.0));
        assert_eq!(rec.attribute("width"), Some(Attribute::Numeric(7.0)));
    }

    #[test]
    fn test_token_form() {
        let rec = BedRecord::new("chr1", 100, 200);
        assert_eq!(rec.token(), "chr1:100-200");
        let rec = rec.with_strand(Strand::Minus);
        assert_eq!(rec.token(), "chr1:100-200:-");
    }
}
