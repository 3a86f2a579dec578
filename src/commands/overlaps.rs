//! Overlap engine: Venn and UpSet diagrams over named collections.
//!
//! Interval collections are first reduced to a shared universe so that
//! overlapping-but-not-identical peaks from different sets count as one
//! element. Venn counts use duplicate-counting over concatenated
//! de-duplicated sets; UpSet groups use exact membership-row matching.

use crate::bed::{read_records, read_tokens_from_path, ColumnScheme};
use crate::colors::assign_colors;
use crate::commands::reduce::reduce;
use crate::config::{OverlapConfig, PlotType, SortPolicy, VennOptions};
use crate::diagram::{
    BoxStats, Diagram, IntersectionGroup, PairCount, SetInfo, SummaryPanel, UpSetPlot, VennDiagram,
    VennRegion,
};
use crate::error::{OverlapError, Result};
use crate::geometry::{pairwise_layout, region_anchor, single_layout, triple_layout};
use crate::index::{overlaps, IntervalIndex};
use crate::interval::{Attribute, BedRecord};
use log::{debug, info, warn};
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::Path;

/// Largest set count for which empty membership combinations are listed.
const MAX_ENUMERATED_SETS: usize = 16;

/// A named collection of elements.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedSet<T> {
    pub name: String,
    pub elements: Vec<T>,
}

impl<T> NamedSet<T> {
    pub fn new(name: impl Into<String>, elements: Vec<T>) -> Self {
        Self {
            name: name.into(),
            elements,
        }
    }
}

/// Input to the engine: all sets hold tokens, or all hold intervals.
#[derive(Debug, Clone, PartialEq)]
pub enum Collections {
    Tokens(Vec<NamedSet<String>>),
    Intervals(Vec<NamedSet<BedRecord>>),
}

/// Element kind of a `Collections` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Tokens,
    Intervals,
}

impl Collections {
    /// Build token collections from `(name, tokens)` pairs.
    pub fn tokens<N, T, I>(sets: I) -> Self
    where
        N: Into<String>,
        T: Into<String>,
        I: IntoIterator<Item = (N, Vec<T>)>,
    {
        Collections::Tokens(
            sets.into_iter()
                .map(|(name, items)| NamedSet::new(name, items.into_iter().map(Into::into).collect()))
                .collect(),
        )
    }

    /// Build interval collections from `(name, records)` pairs.
    pub fn intervals<N, I>(sets: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, Vec<BedRecord>)>,
    {
        Collections::Intervals(
            sets.into_iter()
                .map(|(name, records)| NamedSet::new(name, records))
                .collect(),
        )
    }

    /// Load one interval set per BED file.
    pub fn from_bed_files<P: AsRef<Path>>(
        paths: &[P],
        names: &[String],
        scheme: &ColumnScheme,
    ) -> Result<Self> {
        let names = resolve_names(paths, names)?;
        let mut sets = Vec::with_capacity(paths.len());
        for (path, name) in paths.iter().zip(names) {
            sets.push(NamedSet::new(name, read_records(path, scheme.clone())?));
        }
        Ok(Collections::Intervals(sets))
    }

    /// Load one token set per file, one token per line.
    pub fn from_token_files<P: AsRef<Path>>(paths: &[P], names: &[String]) -> Result<Self> {
        let names = resolve_names(paths, names)?;
        let mut sets = Vec::with_capacity(paths.len());
        for (path, name) in paths.iter().zip(names) {
            sets.push(NamedSet::new(name, read_tokens_from_path(path)?));
        }
        Ok(Collections::Tokens(sets))
    }

    pub fn kind(&self) -> InputKind {
        match self {
            Collections::Tokens(_) => InputKind::Tokens,
            Collections::Intervals(_) => InputKind::Intervals,
        }
    }

    pub fn names(&self) -> Vec<String> {
        match self {
            Collections::Tokens(sets) => sets.iter().map(|s| s.name.clone()).collect(),
            Collections::Intervals(sets) => sets.iter().map(|s| s.name.clone()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Collections::Tokens(sets) => sets.len(),
            Collections::Intervals(sets) => sets.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Set names from `names`, or file stems when none are given.
fn resolve_names<P: AsRef<Path>>(paths: &[P], names: &[String]) -> Result<Vec<String>> {
    if names.is_empty() {
        return Ok(paths
            .iter()
            .map(|p| {
                p.as_ref()
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default()
            })
            .collect());
    }
    if names.len() != paths.len() {
        return Err(OverlapError::config(format!(
            "{} names given for {} inputs",
            names.len(),
            paths.len()
        )));
    }
    Ok(names.to_vec())
}

/// Drawing strategy chosen from input shape and requested type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Venn1,
    Venn2,
    Venn3,
    UpSet,
}

/// Map input kind, set count and requested type to a strategy.
pub fn resolve_strategy(kind: InputKind, n: usize, plot_type: PlotType) -> Result<Strategy> {
    if n == 0 {
        return Err(OverlapError::config("at least one set is required"));
    }
    let venn = match plot_type {
        PlotType::Auto => n <= 3,
        PlotType::Venn => true,
        PlotType::UpSet => false,
    };
    let strategy = match (venn, n) {
        (true, 1) => Strategy::Venn1,
        (true, 2) => Strategy::Venn2,
        (true, 3) => Strategy::Venn3,
        (true, _) => {
            return Err(OverlapError::config(format!(
                "Venn diagrams support at most 3 sets, got {}",
                n
            )))
        }
        (false, 1) => {
            return Err(OverlapError::config("UpSet plots require at least two sets"));
        }
        (false, _) => Strategy::UpSet,
    };
    debug!("{:?} input with {} sets resolved to {:?}", kind, n, strategy);
    Ok(strategy)
}

/// Reject empty or repeated set names.
pub fn validate_names(names: &[String]) -> Result<()> {
    let mut seen = FxHashSet::default();
    for name in names {
        if name.trim().is_empty() {
            return Err(OverlapError::config("every set must be named"));
        }
        if !seen.insert(name.as_str()) {
            return Err(OverlapError::config(format!("duplicate set name '{}'", name)));
        }
    }
    Ok(())
}

/// Check that `var` is a numeric attribute of every record.
fn validate_var(sets: &[NamedSet<BedRecord>], var: &str) -> Result<()> {
    for set in sets {
        for record in &set.elements {
            match record.attribute(var) {
                Some(Attribute::Numeric(_)) => {}
                Some(Attribute::Text(value)) => {
                    return Err(OverlapError::config(format!(
                        "attribute '{}' is not numeric (value '{}' in set '{}')",
                        var, value, set.name
                    )))
                }
                None => {
                    return Err(OverlapError::config(format!(
                        "attribute '{}' not found in set '{}'",
                        var, set.name
                    )))
                }
            }
        }
    }
    Ok(())
}

/// Build an overlap diagram.
///
/// All validation happens before any counting; errors never leave a
/// partial diagram behind.
pub fn plot_overlaps(collections: &Collections, config: &OverlapConfig) -> Result<Diagram> {
    let names = collections.names();
    validate_names(&names)?;
    let strategy = resolve_strategy(collections.kind(), names.len(), config.plot_type)?;
    if config.upset.sort_sets == SortPolicy::Degree {
        return Err(OverlapError::config(
            "set rows cannot be sorted by degree. Use: ascending, descending, input",
        ));
    }

    let summarise = match (&config.var, collections) {
        (None, _) => None,
        (Some(var), Collections::Tokens(_)) => {
            return Err(OverlapError::config(format!(
                "attribute '{}' requested but token collections carry no attributes",
                var
            )))
        }
        (Some(var), Collections::Intervals(sets)) => {
            validate_var(sets, var)?;
            if strategy == Strategy::UpSet {
                Some(var.as_str())
            } else {
                warn!("attribute '{}' is only summarised in UpSet plots; ignored", var);
                None
            }
        }
    };

    let colors = assign_colors(
        &names,
        config.set_colors.as_deref(),
        &config.color_overrides,
    )?;

    let matrix = match collections {
        Collections::Intervals(sets) => interval_matrix(sets, config, summarise),
        Collections::Tokens(sets) => MembershipMatrix::from_tokens(&dedup_sets(sets)),
    };
    info!(
        "{} sets, {} distinct elements in the union",
        matrix.sets.len(),
        matrix.rows.len()
    );

    match strategy {
        Strategy::UpSet => Ok(Diagram::UpSet(build_upset(&matrix, &colors, config, summarise)?)),
        _ => {
            let sets = matrix.token_sets();
            Ok(Diagram::Venn(build_venn(&sets, &colors, &config.venn)?))
        }
    }
}

/// Remove within-set duplicates, keeping first occurrences.
fn dedup_sets(sets: &[NamedSet<String>]) -> Vec<NamedSet<String>> {
    sets.iter()
        .map(|set| {
            let mut seen = FxHashSet::default();
            let elements = set
                .elements
                .iter()
                .filter(|t| seen.insert(t.as_str()))
                .cloned()
                .collect();
            NamedSet::new(set.name.clone(), elements)
        })
        .collect()
}

/// Reduce all intervals to a universe and replace each set by the
/// stringified universe intervals it overlaps.
pub fn tokenize_intervals(sets: &[NamedSet<BedRecord>], config: &OverlapConfig) -> Vec<NamedSet<String>> {
    interval_matrix(sets, config, None).token_sets()
}

fn universe_of(sets: &[NamedSet<BedRecord>], config: &OverlapConfig) -> Vec<BedRecord> {
    let all: Vec<BedRecord> = sets.iter().flat_map(|s| s.elements.iter().cloned()).collect();
    reduce(&all, config.gap_width, config.ignore_strand)
}

/// Membership matrix over universe rows, with per-row summary values
/// when `var` is given.
///
/// Every universe row is built from at least one input record and overlaps
/// it, so every row has at least one member set.
fn interval_matrix(
    sets: &[NamedSet<BedRecord>],
    config: &OverlapConfig,
    var: Option<&str>,
) -> MembershipMatrix {
    let universe = universe_of(sets, config);
    let mut cells = vec![vec![false; sets.len()]; universe.len()];
    let mut contributing: Vec<Vec<f64>> = vec![Vec::new(); universe.len()];

    for (col, set) in sets.iter().enumerate() {
        match var {
            None => {
                let hits = overlaps(&universe, &set.elements, config.ignore_strand);
                for (row, hit) in hits.into_iter().enumerate() {
                    cells[row][col] = hit;
                }
            }
            Some(var) => {
                let index = IntervalIndex::from_records(&set.elements);
                for (row, record) in universe.iter().enumerate() {
                    let hits = index.find_overlap_indices(
                        &record.interval,
                        record.strand_or_unknown(),
                        config.ignore_strand,
                    );
                    cells[row][col] = !hits.is_empty();
                    contributing[row].extend(
                        hits.iter()
                            .filter_map(|&i| set.elements[i].attribute(var))
                            .filter_map(|a| a.as_f64()),
                    );
                }
            }
        }
    }

    let values = var.map(|_| {
        contributing
            .iter()
            .map(|vals| config.reducer.apply(vals))
            .collect()
    });

    MembershipMatrix {
        sets: sets.iter().map(|s| s.name.clone()).collect(),
        rows: universe.iter().map(|r| r.token()).collect(),
        cells,
        values,
    }
}

/// Rows are union elements, columns are sets.
#[derive(Debug, Clone, PartialEq)]
pub struct MembershipMatrix {
    pub sets: Vec<String>,
    pub rows: Vec<String>,
    pub cells: Vec<Vec<bool>>,
    /// Reduced summary value per row, when a summary was requested.
    pub values: Option<Vec<Option<f64>>>,
}

impl MembershipMatrix {
    /// Build from de-duplicated token sets; rows follow first appearance.
    pub fn from_tokens(sets: &[NamedSet<String>]) -> Self {
        let mut row_of: FxHashMap<&str, usize> = FxHashMap::default();
        let mut rows: Vec<String> = Vec::new();
        let mut cells: Vec<Vec<bool>> = Vec::new();

        for (col, set) in sets.iter().enumerate() {
            for token in &set.elements {
                let row = *row_of.entry(token.as_str()).or_insert_with(|| {
                    rows.push(token.clone());
                    cells.push(vec![false; sets.len()]);
                    rows.len() - 1
                });
                cells[row][col] = true;
            }
        }

        Self {
            sets: sets.iter().map(|s| s.name.clone()).collect(),
            rows,
            cells,
            values: None,
        }
    }

    /// Recover one de-duplicated token set per column.
    pub fn token_sets(&self) -> Vec<NamedSet<String>> {
        self.sets
            .iter()
            .enumerate()
            .map(|(col, name)| {
                let elements = self
                    .rows
                    .iter()
                    .zip(&self.cells)
                    .filter(|(_, cells)| cells[col])
                    .map(|(row, _)| row.clone())
                    .collect();
                NamedSet::new(name.clone(), elements)
            })
            .collect()
    }

    /// Number of rows in each column.
    pub fn column_sizes(&self) -> Vec<usize> {
        (0..self.sets.len())
            .map(|col| self.cells.iter().filter(|r| r[col]).count())
            .collect()
    }
}

/// Elements shared by two de-duplicated sets, counted as duplicates in
/// their concatenation.
pub fn count_duplicates(a: &[String], b: &[String]) -> usize {
    count_with_tally(&[a, b], 2)
}

/// Elements present in every one of the de-duplicated `sets`.
pub fn count_in_all(sets: &[&[String]]) -> usize {
    count_with_tally(sets, sets.len())
}

fn count_with_tally(sets: &[&[String]], tally: usize) -> usize {
    let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
    for token in sets.iter().flat_map(|s| s.iter()) {
        *counts.entry(token.as_str()).or_default() += 1;
    }
    counts.values().filter(|&&c| c >= tally).count()
}

fn region_label(count: usize, union: usize, options: &VennOptions) -> String {
    if options.show_percent && union > 0 {
        format!(
            "{} ({:.*}%)",
            count,
            options.label_digits,
            100.0 * count as f64 / union as f64
        )
    } else {
        count.to_string()
    }
}

/// Venn diagram from one to three de-duplicated token sets.
fn build_venn(
    sets: &[NamedSet<String>],
    colors: &[String],
    options: &VennOptions,
) -> Result<VennDiagram> {
    let areas: Vec<usize> = sets.iter().map(|s| s.elements.len()).collect();
    let names: Vec<String> = sets.iter().map(|s| s.name.clone()).collect();

    let mut pairwise = Vec::new();
    for i in 0..sets.len() {
        for j in (i + 1)..sets.len() {
            pairwise.push(PairCount {
                a: names[i].clone(),
                b: names[j].clone(),
                count: count_duplicates(&sets[i].elements, &sets[j].elements),
            });
        }
    }
    let triple = (sets.len() == 3).then(|| {
        count_in_all(&[&sets[0].elements, &sets[1].elements, &sets[2].elements])
    });

    // Exclusive region sizes by inclusion-exclusion, indexed by membership bits.
    let exclusive: Vec<(Vec<bool>, usize)> = match sets.len() {
        1 => vec![(vec![true], areas[0])],
        2 => {
            let cross = pairwise[0].count;
            vec![
                (vec![true, false], areas[0] - cross),
                (vec![false, true], areas[1] - cross),
                (vec![true, true], cross),
            ]
        }
        _ => {
            let t = triple.unwrap_or(0);
            let (n12, n13, n23) = (pairwise[0].count, pairwise[1].count, pairwise[2].count);
            vec![
                (vec![true, false, false], areas[0] + t - n12 - n13),
                (vec![false, true, false], areas[1] + t - n12 - n23),
                (vec![false, false, true], areas[2] + t - n13 - n23),
                (vec![true, true, false], n12 - t),
                (vec![true, false, true], n13 - t),
                (vec![false, true, true], n23 - t),
                (vec![true, true, true], t),
            ]
        }
    };
    let union: usize = exclusive.iter().map(|(_, n)| n).sum();

    let (circles, scaled) = match sets.len() {
        1 => (vec![single_layout(areas[0], options.scaled)?], options.scaled),
        2 => (
            pairwise_layout(areas[0], areas[1], pairwise[0].count, options.scaled)?.to_vec(),
            options.scaled,
        ),
        _ => {
            if union == 0 {
                return Err(OverlapError::render("cannot draw a Venn diagram of empty sets"));
            }
            (triple_layout().to_vec(), false)
        }
    };

    let regions = exclusive
        .into_iter()
        .map(|(members, count)| {
            let (x, y) = region_anchor(&circles, &members);
            VennRegion {
                sets: names
                    .iter()
                    .zip(&members)
                    .filter(|(_, m)| **m)
                    .map(|(n, _)| n.clone())
                    .collect(),
                count,
                label: region_label(count, union, options),
                x,
                y,
            }
        })
        .collect();

    Ok(VennDiagram {
        sets: names
            .iter()
            .zip(&areas)
            .zip(colors)
            .map(|((name, size), color)| SetInfo {
                name: name.clone(),
                size: *size,
                color: color.clone(),
            })
            .collect(),
        circles,
        pairwise,
        triple,
        regions,
        union,
        scaled,
    })
}

/// Group accumulator: first row seen, row count, summary values.
struct GroupAcc {
    first_row: usize,
    size: usize,
    values: Vec<f64>,
}

fn build_upset(
    matrix: &MembershipMatrix,
    colors: &[String],
    config: &OverlapConfig,
    var: Option<&str>,
) -> Result<UpSetPlot> {
    if matrix.rows.is_empty() {
        return Err(OverlapError::render("all sets are empty; nothing to draw"));
    }
    let options = &config.upset;
    let n_sets = matrix.sets.len();

    let mut groups: FxHashMap<&[bool], GroupAcc> = FxHashMap::default();
    for (row, cells) in matrix.cells.iter().enumerate() {
        let acc = groups.entry(cells.as_slice()).or_insert(GroupAcc {
            first_row: row,
            size: 0,
            values: Vec::new(),
        });
        acc.size += 1;
        if let Some(Some(v)) = matrix.values.as_ref().map(|vals| vals[row]) {
            acc.values.push(v);
        }
    }

    let mut listed: Vec<(Vec<bool>, GroupAcc)> = groups
        .into_iter()
        .map(|(membership, acc)| (membership.to_vec(), acc))
        .collect();

    if options.keep_empty_groups {
        if n_sets > MAX_ENUMERATED_SETS {
            return Err(OverlapError::config(format!(
                "empty groups can only be listed for up to {} sets",
                MAX_ENUMERATED_SETS
            )));
        }
        let present: FxHashSet<Vec<bool>> = listed.iter().map(|(m, _)| m.clone()).collect();
        for bits in 1u32..(1u32 << n_sets) {
            let membership: Vec<bool> = (0..n_sets).map(|i| bits & (1 << i) != 0).collect();
            if !present.contains(&membership) {
                listed.push((
                    membership,
                    GroupAcc {
                        first_row: usize::MAX,
                        size: 0,
                        values: Vec::new(),
                    },
                ));
            }
        }
    }

    listed.retain(|(_, acc)| acc.size >= options.min_size);
    sort_groups(&mut listed, options.sort_intersections);

    let groups = listed
        .into_iter()
        .map(|(membership, acc)| IntersectionGroup {
            sets: matrix
                .sets
                .iter()
                .zip(&membership)
                .filter(|(_, m)| **m)
                .map(|(n, _)| n.clone())
                .collect(),
            membership,
            size: acc.size,
            summary: var.and_then(|_| BoxStats::from_values(&acc.values)),
        })
        .collect();

    let sizes = matrix.column_sizes();
    let mut sets: Vec<SetInfo> = matrix
        .sets
        .iter()
        .zip(&sizes)
        .zip(colors)
        .map(|((name, size), color)| SetInfo {
            name: name.clone(),
            size: *size,
            color: color.clone(),
        })
        .collect();
    match options.sort_sets {
        SortPolicy::Ascending => sets.sort_by_key(|s| s.size),
        SortPolicy::Descending => sets.sort_by(|a, b| b.size.cmp(&a.size)),
        SortPolicy::Degree | SortPolicy::Input => {}
    }

    Ok(UpSetPlot {
        sets,
        groups,
        total: matrix.rows.len(),
        summary: var.map(|v| SummaryPanel {
            var: v.to_string(),
            reducer: config.reducer,
        }),
    })
}

/// Order groups by policy; ties fall back to degree, then first appearance.
fn sort_groups(groups: &mut [(Vec<bool>, GroupAcc)], policy: SortPolicy) {
    let degree = |m: &[bool]| m.iter().filter(|b| **b).count();
    groups.sort_by(|(ma, a), (mb, b)| {
        let tie = || {
            degree(ma)
                .cmp(&degree(mb))
                .then(a.first_row.cmp(&b.first_row))
                .then_with(|| mb.cmp(ma))
        };
        match policy {
            SortPolicy::Ascending => a.size.cmp(&b.size).then_with(tie),
            SortPolicy::Descending => b.size.cmp(&a.size).then_with(tie),
            SortPolicy::Degree => degree(ma)
                .cmp(&degree(mb))
                .then(b.size.cmp(&a.size))
                .then_with(tie),
            SortPolicy::Input => a.first_row.cmp(&b.first_row).then_with(tie),
        }
    });
}
