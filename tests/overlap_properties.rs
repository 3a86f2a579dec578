//! Property tests for the overlap engine.
//!
//! These tests check Venn and UpSet counts against brute-force set
//! arithmetic, on both token and interval input.

use peakviz::bed::parse_records;
use peakviz::commands::{reduce, resolve_strategy, Collections, InputKind, Strategy};
use peakviz::config::{OverlapConfig, PlotType};
use peakviz::interval::{Attribute, BedRecord};
use peakviz::reducer::Reducer;
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// Helpers
// =============================================================================

fn letters(s: &str) -> Vec<String> {
    s.chars().map(|c| c.to_string()).collect()
}

fn set_of(items: &[String]) -> BTreeSet<String> {
    items.iter().cloned().collect()
}

fn bed(content: &str) -> Vec<BedRecord> {
    parse_records(content).unwrap()
}

// =============================================================================
// Venn diagrams
// =============================================================================

#[test]
fn test_disjoint_pair_has_zero_cross_area() {
    let input = Collections::tokens([("A", letters("abcde")), ("B", letters("fghijklmnoz"))]);
    let diagram = peakviz::plot_overlaps(&input, &OverlapConfig::new()).unwrap();
    let venn = diagram.as_venn().unwrap();

    assert_eq!(venn.cross_area(), Some(0));
    assert_eq!(venn.sets[0].size, 5);
    assert_eq!(venn.sets[1].size, 11);
    assert_eq!(venn.union, 16);
}

#[test]
fn test_duplicates_within_a_set_count_once() {
    let input = Collections::tokens([("A", letters("aabbc")), ("B", letters("bccd"))]);
    let diagram = peakviz::plot_overlaps(&input, &OverlapConfig::new()).unwrap();
    let venn = diagram.as_venn().unwrap();

    assert_eq!(venn.sets[0].size, 3);
    assert_eq!(venn.sets[1].size, 3);
    assert_eq!(venn.cross_area(), Some(2));
}

#[test]
fn test_three_sets_match_brute_force() {
    let x = letters("abcdefghij");
    let y = letters("fghijklmno");
    let z = letters("adgjmpqrs");
    let input = Collections::tokens([("x", x.clone()), ("y", y.clone()), ("z", z.clone())]);

    let diagram = peakviz::plot_overlaps(&input, &OverlapConfig::new()).unwrap();
    let venn = diagram.as_venn().unwrap();

    let (sx, sy, sz) = (set_of(&x), set_of(&y), set_of(&z));
    let xy: BTreeSet<_> = sx.intersection(&sy).cloned().collect();
    let xz: BTreeSet<_> = sx.intersection(&sz).cloned().collect();
    let yz: BTreeSet<_> = sy.intersection(&sz).cloned().collect();
    let xyz: BTreeSet<_> = xy.intersection(&sz).cloned().collect();
    let union: BTreeSet<_> = sx.union(&sy).chain(sz.iter()).cloned().collect();

    assert_eq!(venn.pair("x", "y"), Some(xy.len()));
    assert_eq!(venn.pair("z", "x"), Some(xz.len()));
    assert_eq!(venn.pair("y", "z"), Some(yz.len()));
    assert_eq!(venn.triple, Some(xyz.len()));
    assert_eq!(venn.union, union.len());

    // Exclusive regions partition the union.
    let total: usize = venn.regions.iter().map(|r| r.count).sum();
    assert_eq!(total, union.len());

    let only_x = venn
        .regions
        .iter()
        .find(|r| r.sets == vec!["x".to_string()])
        .unwrap();
    let brute = sx.iter().filter(|t| !sy.contains(*t) && !sz.contains(*t)).count();
    assert_eq!(only_x.count, brute);
}

#[test]
fn test_interval_venn_uses_shared_universe() {
    // Two replicate peaks overlap but do not match exactly.
    let a = bed("chr1\t100\t200\nchr1\t500\t600\n");
    let b = bed("chr1\t150\t260\nchr2\t10\t20\n");
    let input = Collections::intervals([("rep1", a), ("rep2", b)]);

    let diagram = peakviz::plot_overlaps(&input, &OverlapConfig::new()).unwrap();
    let venn = diagram.as_venn().unwrap();

    assert_eq!(venn.cross_area(), Some(1));
    assert_eq!(venn.union, 3);
}

#[test]
fn test_color_override_wins() {
    let input = Collections::tokens([("A", letters("abc")), ("B", letters("cde"))]);
    let config = OverlapConfig::new()
        .with_set_colors(["red", "blue"])
        .with_color_override("B", "#00ff00");

    let diagram = peakviz::plot_overlaps(&input, &config).unwrap();
    let venn = diagram.as_venn().unwrap();

    assert_eq!(venn.sets[0].color, "red");
    assert_eq!(venn.sets[1].color, "#00ff00");
}

#[test]
fn test_short_palette_is_rejected() {
    let input = Collections::tokens([("A", letters("ab")), ("B", letters("bc"))]);
    let config = OverlapConfig::new().with_set_colors(["red"]);

    let err = peakviz::plot_overlaps(&input, &config).unwrap_err();
    assert!(err.is_configuration());
}

// =============================================================================
// UpSet plots
// =============================================================================

#[test]
fn test_upset_group_sizes_sum_to_union() {
    let sets = [
        ("w", letters("abcdefg")),
        ("x", letters("efghijk")),
        ("y", letters("aeikmoq")),
        ("z", letters("bdfhjlnp")),
    ];
    let union: BTreeSet<String> = sets.iter().flat_map(|(_, s)| s.iter().cloned()).collect();

    let input = Collections::tokens(sets.clone());
    let diagram = peakviz::plot_overlaps(&input, &OverlapConfig::new()).unwrap();
    let upset = diagram.as_upset().unwrap();

    let sum: usize = upset.groups.iter().map(|g| g.size).sum();
    assert_eq!(sum, union.len());
    assert_eq!(upset.total, union.len());

    // Every element lands in exactly the group of its membership.
    for group in &upset.groups {
        let brute = union
            .iter()
            .filter(|t| {
                sets.iter()
                    .zip(&group.membership)
                    .all(|((_, s), member)| s.contains(*t) == *member)
            })
            .count();
        assert_eq!(group.size, brute, "group {:?}", group.sets);
    }
}

#[test]
fn test_upset_requires_two_sets() {
    let one = Collections::tokens([("A", letters("abc"))]);
    let config = OverlapConfig::new().with_type(PlotType::UpSet);
    assert!(peakviz::plot_overlaps(&one, &config)
        .unwrap_err()
        .is_configuration());

    let two = Collections::tokens([("A", letters("abc")), ("B", letters("cd"))]);
    let diagram = peakviz::plot_overlaps(&two, &config).unwrap();
    assert_eq!(diagram.as_upset().unwrap().group_size(&["A", "B"]), Some(1));
}

#[test]
fn test_upset_summary_uses_reducer() {
    let a = vec![
        BedRecord::new("chr1", 100, 200).with_attribute("signal", Attribute::Numeric(2.0)),
        BedRecord::new("chr1", 1000, 1100).with_attribute("signal", Attribute::Numeric(9.0)),
    ];
    let b = vec![BedRecord::new("chr1", 150, 250).with_attribute("signal", Attribute::Numeric(4.0))];

    let input = Collections::intervals([("a", a), ("b", b)]);
    let config = OverlapConfig::new()
        .with_type(PlotType::UpSet)
        .with_var("signal")
        .with_reducer(Reducer::Mean);

    let diagram = peakviz::plot_overlaps(&input, &config).unwrap();
    let upset = diagram.as_upset().unwrap();
    let shared = upset
        .groups
        .iter()
        .find(|g| g.degree() == 2)
        .unwrap();

    let summary = shared.summary.as_ref().unwrap();
    assert_eq!(summary.n, 1);
    assert!((summary.median - 3.0).abs() < 1e-12);
}

#[test]
fn test_alphabet_upset_matches_brute_force() {
    let x = letters("abcde");
    let y = letters("fghijklmnoz");
    let z = letters("bjklmnopqrstuvwxy");
    let sets = [("x", x), ("y", y), ("z", z)];
    let union: BTreeSet<String> = sets.iter().flat_map(|(_, s)| s.iter().cloned()).collect();

    let input = Collections::tokens(sets.clone());
    let config = OverlapConfig::new().with_type(PlotType::UpSet);
    let diagram = peakviz::plot_overlaps(&input, &config).unwrap();
    let upset = diagram.as_upset().unwrap();

    assert_eq!(union.len(), 26);
    assert_eq!(upset.total, union.len());
    assert_eq!(upset.groups.iter().map(|g| g.size).sum::<usize>(), union.len());

    for group in &upset.groups {
        let brute = union
            .iter()
            .filter(|t| {
                sets.iter()
                    .zip(&group.membership)
                    .all(|((_, s), member)| s.contains(*t) == *member)
            })
            .count();
        assert_eq!(group.size, brute, "group {:?}", group.sets);
    }
    assert_eq!(upset.group_size(&["x", "z"]), Some(1));
    assert_eq!(upset.group_size(&["y", "z"]), Some(6));
}

fn group_sizes(diagram: &peakviz::Diagram) -> BTreeMap<Vec<String>, usize> {
    diagram
        .as_upset()
        .unwrap()
        .groups
        .iter()
        .map(|g| (g.sets.clone(), g.size))
        .collect()
}

#[test]
fn test_interval_upset_same_groups_with_and_without_summary() {
    let signal = |start: u64, end: u64, v: f64| {
        BedRecord::new("chr1", start, end).with_attribute("signal", Attribute::Numeric(v))
    };
    // Two intervals of `a` fall in the first universe row.
    let a = vec![signal(100, 150, 1.0), signal(140, 200, 3.0), signal(1000, 1100, 8.0)];
    let b = vec![signal(180, 300, 5.0), signal(2000, 2100, 2.0)];
    let c = vec![signal(2050, 2200, 6.0), signal(5000, 5100, 1.0), signal(7000, 7000, 4.0)];
    let input = Collections::intervals([("a", a), ("b", b), ("c", c)]);

    let plain = OverlapConfig::new().with_type(PlotType::UpSet);
    let expected = group_sizes(&peakviz::plot_overlaps(&input, &plain).unwrap());
    assert_eq!(expected.values().sum::<usize>(), 5);

    for reducer in [Reducer::Median, Reducer::Sd] {
        let config = plain.clone().with_var("signal").with_reducer(reducer);
        let diagram = peakviz::plot_overlaps(&input, &config).unwrap();
        assert_eq!(group_sizes(&diagram), expected, "reducer {}", reducer);

        let upset = diagram.as_upset().unwrap();
        assert_eq!(upset.total, 5);
        let shared = upset.groups.iter().find(|g| g.sets == ["a", "b"]).unwrap();
        let summary = shared.summary.as_ref().unwrap();
        match reducer {
            Reducer::Median => assert!((summary.median - 3.0).abs() < 1e-12),
            _ => assert!((summary.median - 2.0).abs() < 1e-12),
        }

        // A lone value has no sample standard deviation.
        let only_a = upset.groups.iter().find(|g| g.sets == ["a"]).unwrap();
        assert_eq!(only_a.summary.is_none(), reducer == Reducer::Sd);
    }
}

#[test]
fn test_var_on_tokens_is_rejected() {
    let input = Collections::tokens([("A", letters("ab")), ("B", letters("bc"))]);
    let config = OverlapConfig::new().with_type(PlotType::UpSet).with_var("score");

    assert!(peakviz::plot_overlaps(&input, &config)
        .unwrap_err()
        .is_configuration());
}

// =============================================================================
// Dispatch and reduction
// =============================================================================

#[test]
fn test_auto_dispatch() {
    for (n, expected) in [
        (1, Strategy::Venn1),
        (2, Strategy::Venn2),
        (3, Strategy::Venn3),
        (4, Strategy::UpSet),
        (9, Strategy::UpSet),
    ] {
        let got = resolve_strategy(InputKind::Intervals, n, PlotType::Auto).unwrap();
        assert_eq!(got, expected, "n = {}", n);
    }
    assert!(resolve_strategy(InputKind::Tokens, 4, PlotType::Venn).is_err());
}

#[test]
fn test_reduce_is_idempotent() {
    let records = bed("chr1\t100\t200\nchr1\t150\t300\nchr1\t301\t400\nchr2\t5\t10\nchr1\t500\t600\n");

    let once = reduce(&records, 1, true);
    let twice = reduce(&once, 1, true);

    assert_eq!(once, twice);
    assert_eq!(once.len(), 4);
}
