//! Interval indexing for fast overlap queries.

use crate::interval::{BedRecord, Interval, Strand};
use rustc_hash::FxHashMap;

/// One indexed interval: start, end, strand and position in the source slice.
///
/// `end` is the point end, so zero-length records occupy their start base.
#[derive(Debug, Clone, Copy)]
struct Entry {
    start: u64,
    end: u64,
    strand: Strand,
    idx: usize,
}

/// Per-chromosome entries sorted by start, with a running maximum of ends.
///
/// The running maximum is non-decreasing, so the first entry that can reach
/// a query is found by binary search even when long intervals contain
/// shorter ones.
#[derive(Debug, Default)]
struct ChromEntries {
    entries: Vec<Entry>,
    max_end: Vec<u64>,
}

/// An indexed collection of records organized by chromosome.
/// Uses a sorted list with binary search for efficient queries.
#[derive(Debug, Default)]
pub struct IntervalIndex {
    by_chrom: FxHashMap<String, ChromEntries>,
    len: usize,
}

impl IntervalIndex {
    /// Build an index over records; query results are indices into `records`.
    pub fn from_records(records: &[BedRecord]) -> Self {
        let mut by_chrom: FxHashMap<String, ChromEntries> = FxHashMap::default();

        for (idx, record) in records.iter().enumerate() {
            by_chrom
                .entry(record.chrom().to_string())
                .or_default()
                .entries
                .push(Entry {
                    start: record.start(),
                    end: record.interval.point_end(),
                    strand: record.strand_or_unknown(),
                    idx,
                });
        }

        for chrom in by_chrom.values_mut() {
            chrom
                .entries
                .sort_by(|a, b| a.start.cmp(&b.start).then(a.end.cmp(&b.end)));
            let mut running = 0;
            chrom.max_end = chrom
                .entries
                .iter()
                .map(|e| {
                    running = running.max(e.end);
                    running
                })
                .collect();
        }

        Self {
            by_chrom,
            len: records.len(),
        }
    }

    /// Find indices of all records overlapping the query, in start order.
    pub fn find_overlap_indices(
        &self,
        query: &Interval,
        strand: Strand,
        ignore_strand: bool,
    ) -> Vec<usize> {
        let mut results = Vec::new();
        self.scan(query, strand, ignore_strand, |idx| {
            results.push(idx);
            true
        });
        results
    }

    /// Check if any record overlaps the query.
    pub fn has_overlap(&self, query: &Interval, strand: Strand, ignore_strand: bool) -> bool {
        let mut found = false;
        self.scan(query, strand, ignore_strand, |_| {
            found = true;
            false
        });
        found
    }

    /// Visit overlapping entries until `visit` returns false.
    fn scan<F: FnMut(usize) -> bool>(
        &self,
        query: &Interval,
        strand: Strand,
        ignore_strand: bool,
        mut visit: F,
    ) {
        let Some(chrom) = self.by_chrom.get(&query.chrom) else {
            return;
        };

        let query_end = query.point_end();
        let first = chrom.max_end.partition_point(|&end| end <= query.start);

        for entry in &chrom.entries[first..] {
            if entry.start >= query_end {
                break;
            }
            if !query.overlaps_span(entry.start, entry.end) {
                continue;
            }
            if !ignore_strand && !strand.is_compatible(entry.strand) {
                continue;
            }
            if !visit(entry.idx) {
                return;
            }
        }
    }

    /// Get the total number of records.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Flag each candidate that overlaps any reference record.
pub fn overlaps(candidates: &[BedRecord], reference: &[BedRecord], ignore_strand: bool) -> Vec<bool> {
    let index = IntervalIndex::from_records(reference);
    candidates
        .iter()
        .map(|c| index.has_overlap(&c.interval, c.strand_or_unknown(), ignore_strand))
        .collect()
}
