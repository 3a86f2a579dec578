//! Interval reduction into a common coordinate frame.
//!
//! Uses O(n log n) sort + O(n) single-pass sweep-line merge per
//! chromosome (and strand), the same shape as `bedtools merge -d`.

use crate::bed::{read_records, write_records, BedError, ColumnScheme};
use crate::interval::{BedRecord, Strand};
use crate::parallel::{group_records, parallel_sort_records, process_groups};
use log::debug;
use std::io::Write;
use std::path::Path;

/// Default gap width: book-ended intervals are merged.
pub const DEFAULT_GAP_WIDTH: u64 = 1;

/// Reduce command configuration.
#[derive(Debug, Clone)]
pub struct ReduceCommand {
    /// Intervals separated by fewer than this many bases are merged.
    /// Zero merges only strictly overlapping intervals.
    pub gap_width: u64,
    /// Merge across strands and drop strand from the output.
    pub ignore_strand: bool,
}

impl Default for ReduceCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl ReduceCommand {
    pub fn new() -> Self {
        Self {
            gap_width: DEFAULT_GAP_WIDTH,
            ignore_strand: true,
        }
    }

    /// Set the gap width.
    pub fn with_gap_width(mut self, gap_width: u64) -> Self {
        self.gap_width = gap_width;
        self
    }

    /// Set whether strand is ignored.
    pub fn with_ignore_strand(mut self, ignore_strand: bool) -> Self {
        self.ignore_strand = ignore_strand;
        self
    }

    /// Reduce records to the minimal covering set of non-overlapping intervals.
    ///
    /// Output carries no attributes, is sorted by chromosome, start, end,
    /// and keeps a strand only when strands are respected.
    pub fn reduce(&self, records: &[BedRecord]) -> Vec<BedRecord> {
        if records.is_empty() {
            return Vec::new();
        }

        let skeleton: Vec<BedRecord> = records
            .iter()
            .map(|r| {
                let mut rec = BedRecord::new(r.chrom(), r.start(), r.end());
                rec.strand = r.strand;
                rec
            })
            .collect();

        let groups = group_records(skeleton, self.ignore_strand);
        let reduced = process_groups(groups, |key, mut group| {
            group.sort_unstable_by(|a, b| a.start().cmp(&b.start()).then(a.end().cmp(&b.end())));
            self.sweep(&key.0, key.1, &group)
        });

        let result = parallel_sort_records(reduced.into_iter().flat_map(|(_, v)| v).collect());
        debug!(
            "reduced {} intervals to {} (gap_width={}, ignore_strand={})",
            records.len(),
            result.len(),
            self.gap_width,
            self.ignore_strand
        );
        result
    }

    /// Single-pass sweep over start-sorted records of one chromosome/strand.
    fn sweep(&self, chrom: &str, strand: Option<Strand>, records: &[BedRecord]) -> Vec<BedRecord> {
        let mut result = Vec::new();
        let Some(first) = records.first() else {
            return result;
        };

        let mut current_start = first.start();
        let mut current_end = first.end();

        for rec in &records[1..] {
            if self.should_merge(current_end, rec.start()) {
                current_end = current_end.max(rec.end());
            } else {
                result.push(Self::emit(chrom, strand, current_start, current_end));
                current_start = rec.start();
                current_end = rec.end();
            }
        }

        result.push(Self::emit(chrom, strand, current_start, current_end));
        result
    }

    #[inline]
    fn should_merge(&self, current_end: u64, next_start: u64) -> bool {
        next_start < current_end.saturating_add(self.gap_width)
    }

    fn emit(chrom: &str, strand: Option<Strand>, start: u64, end: u64) -> BedRecord {
        let rec = BedRecord::new(chrom, start, end);
        match strand {
            Some(s @ (Strand::Plus | Strand::Minus)) => rec.with_strand(s),
            _ => rec,
        }
    }

    /// Execute reduce over one or more BED files, writing BED to `output`.
    pub fn run<P: AsRef<Path>, W: Write>(&self, inputs: &[P], output: &mut W) -> Result<(), BedError> {
        let mut records = Vec::new();
        for input in inputs {
            records.extend(read_records(input, ColumnScheme::Bed)?);
        }
        let reduced = self.reduce(&records);
        write_records(output, &reduced)?;
        Ok(())
    }
}

/// Reduce `records` with the given gap width and strand handling.
pub fn reduce(records: &[BedRecord], gap_width: u64, ignore_strand: bool) -> Vec<BedRecord> {
    ReduceCommand::new()
        .with_gap_width(gap_width)
        .with_ignore_strand(ignore_strand)
        .reduce(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(records: &[BedRecord]) -> Vec<(&str, u64, u64)> {
        records.iter().map(|r| (r.chrom(), r.start(), r.end())).collect()
    }

    #[test]
    fn test_basic_reduce() {
        let records = vec![
            BedRecord::new("chr1", 100, 200),
            BedRecord::new("chr1", 150, 250),
            BedRecord::new("chr1", 300, 400),
        ];

        let reduced = reduce(&records, 1, true);

        assert_eq!(spans(&reduced), vec![("chr1", 100, 250), ("chr1", 300, 400)]);
    }

    #[test]
    fn test_adjacent_merged_by_default() {
        let records = vec![
            BedRecord::new("chr1", 100, 200),
            BedRecord::new("chr1", 200, 300),
        ];

        assert_eq!(spans(&reduce(&records, 1, true)), vec![("chr1", 100, 300)]);
        assert_eq!(reduce(&records, 0, true).len(), 2);
    }

    #[test]
    fn test_gap_width() {
        let records = vec![
            BedRecord::new("chr1", 100, 200),
            BedRecord::new("chr1", 250, 350), // Gap of 50
        ];

        assert_eq!(reduce(&records, 50, true).len(), 2);
        assert_eq!(spans(&reduce(&records, 51, true)), vec![("chr1", 100, 350)]);
    }

    #[test]
    fn test_contained_and_unsorted() {
        let records = vec![
            BedRecord::new("chr2", 10, 20),
            BedRecord::new("chr1", 300, 400),
            BedRecord::new("chr1", 100, 400),
            BedRecord::new("chr1", 150, 250),
        ];

        let reduced = reduce(&records, 1, true);

        assert_eq!(spans(&reduced), vec![("chr1", 100, 400), ("chr2", 10, 20)]);
    }

    #[test]
    fn test_strand_respected() {
        let records = vec![
            BedRecord::new("chr1", 100, 200).with_strand(Strand::Plus),
            BedRecord::new("chr1", 150, 250).with_strand(Strand::Minus),
        ];

        let stranded = reduce(&records, 1, false);
        assert_eq!(stranded.len(), 2);
        assert_eq!(stranded[0].strand, Some(Strand::Plus));
        assert_eq!(stranded[1].strand, Some(Strand::Minus));

        let unstranded = reduce(&records, 1, true);
        assert_eq!(unstranded.len(), 1);
        assert_eq!(unstranded[0].strand, None);
    }

    #[test]
    fn test_reduce_is_idempotent() {
        let records = vec![
            BedRecord::new("chr1", 0, 10),
            BedRecord::new("chr1", 12, 30),
            BedRecord::new("chr1", 25, 40),
            BedRecord::new("chr1", 45, 50),
            BedRecord::new("chr2", 5, 6),
        ];

        for gap in [0, 1, 3, 5] {
            let once = reduce(&records, gap, true);
            let twice = reduce(&once, gap, true);
            assert_eq!(once, twice, "gap_width {}", gap);
        }
    }

    #[test]
    fn test_attributes_dropped() {
        use crate::interval::Attribute;
        let records = vec![BedRecord::new("chr1", 0, 10).with_attribute("score", Attribute::Numeric(1.0))];
        assert!(reduce(&records, 1, true)[0].attributes.is_empty());
    }

    #[test]
    fn test_run_writes_bed() {
        use std::io::Write as _;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "chr1\t100\t200\nchr1\t150\t300\n").unwrap();

        let mut output = Vec::new();
        ReduceCommand::new().run(&[file.path()], &mut output).unwrap();

        assert_eq!(String::from_utf8(output).unwrap(), "chr1\t100\t300\n");
    }
}
