//! Parallel processing utilities using Rayon.

use crate::interval::{BedRecord, Strand};
use rayon::prelude::*;
use rustc_hash::FxHashMap;

/// Minimum number of records before enabling parallelization.
/// Below this threshold, sequential processing is faster due to
/// thread spawn overhead.
pub const PARALLEL_THRESHOLD: usize = 10_000;

/// Grouping key: chromosome plus strand when strands are kept apart.
pub type GroupKey = (String, Option<Strand>);

/// Group records by chromosome, and by strand unless `ignore_strand` is set.
///
/// Records without a strand column fall into the unknown-strand group.
pub fn group_records(
    records: Vec<BedRecord>,
    ignore_strand: bool,
) -> FxHashMap<GroupKey, Vec<BedRecord>> {
    let mut groups: FxHashMap<GroupKey, Vec<BedRecord>> = FxHashMap::default();

    for record in records {
        let strand = if ignore_strand {
            None
        } else {
            Some(record.strand_or_unknown())
        };
        groups
            .entry((record.chrom().to_string(), strand))
            .or_default()
            .push(record);
    }

    groups
}

/// Apply `f` to every group, in parallel when the total is large.
///
/// Results come back sorted by key so output does not depend on
/// scheduling.
pub fn process_groups<F, T>(groups: FxHashMap<GroupKey, Vec<BedRecord>>, f: F) -> Vec<(GroupKey, T)>
where
    F: Fn(&GroupKey, Vec<BedRecord>) -> T + Sync + Send,
    T: Send,
{
    let total: usize = groups.values().map(|v| v.len()).sum();

    let mut results: Vec<(GroupKey, T)> = if total < PARALLEL_THRESHOLD {
        groups
            .into_iter()
            .map(|(key, records)| {
                let out = f(&key, records);
                (key, out)
            })
            .collect()
    } else {
        groups
            .into_par_iter()
            .map(|(key, records)| {
                let out = f(&key, records);
                (key, out)
            })
            .collect()
    };

    results.sort_by(|a, b| a.0.cmp(&b.0));
    results
}

/// Parallel sort of records by chromosome, start, end.
pub fn parallel_sort_records(mut records: Vec<BedRecord>) -> Vec<BedRecord> {
    records.par_sort_unstable_by(|a, b| {
        a.chrom()
            .cmp(b.chrom())
            .then(a.start().cmp(&b.start()))
            .then(a.end().cmp(&b.end()))
            .then(a.strand_or_unknown().cmp(&b.strand_or_unknown()))
    });
    records
}
