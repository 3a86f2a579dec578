//! Renderable diagram models.
//!
//! These carry everything a drawing layer needs: labels, counts, summary
//! statistics, colours, and for Venn diagrams the circle geometry.

use crate::commands::pie::PieWeight;
use crate::reducer::{quantile, Reducer};
use serde::Serialize;

/// A diagram ready for a drawing layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Diagram {
    Venn(VennDiagram),
    UpSet(UpSetPlot),
    Pie(PieChart),
}

impl Diagram {
    pub fn as_venn(&self) -> Option<&VennDiagram> {
        match self {
            Diagram::Venn(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_upset(&self) -> Option<&UpSetPlot> {
        match self {
            Diagram::UpSet(u) => Some(u),
            _ => None,
        }
    }

    pub fn as_pie(&self) -> Option<&PieChart> {
        match self {
            Diagram::Pie(p) => Some(p),
            _ => None,
        }
    }

    /// Serialise to pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// A named set with its de-duplicated size and colour.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetInfo {
    pub name: String,
    pub size: usize,
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Circle {
    pub cx: f64,
    pub cy: f64,
    pub r: f64,
}

/// Size of the overlap between two sets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairCount {
    pub a: String,
    pub b: String,
    pub count: usize,
}

/// One region of a Venn diagram: elements in exactly `sets`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VennRegion {
    pub sets: Vec<String>,
    pub count: usize,
    pub label: String,
    pub x: f64,
    pub y: f64,
}

/// Venn diagram for one to three sets.
///
/// `circles` align with `sets`. Geometry is in arbitrary units with y
/// pointing down. Only one- and two-set diagrams are area-proportional.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VennDiagram {
    pub sets: Vec<SetInfo>,
    pub circles: Vec<Circle>,
    pub pairwise: Vec<PairCount>,
    pub triple: Option<usize>,
    pub regions: Vec<VennRegion>,
    pub union: usize,
    pub scaled: bool,
}

impl VennDiagram {
    /// Overlap of the first two sets, if there are two or more.
    pub fn cross_area(&self) -> Option<usize> {
        self.pairwise.first().map(|p| p.count)
    }

    /// Count of a pairwise overlap by set names, in either order.
    pub fn pair(&self, a: &str, b: &str) -> Option<usize> {
        self.pairwise
            .iter()
            .find(|p| (p.a == a && p.b == b) || (p.a == b && p.b == a))
            .map(|p| p.count)
    }
}

/// Boxplot statistics using type-7 quantiles, with whiskers at 1.5 IQR.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub n: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub mean: f64,
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

impl BoxStats {
    /// Summarise values; `None` when there are none.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let median = quantile(values, 0.5)?;
        let q1 = quantile(values, 0.25)?;
        let q3 = quantile(values, 0.75)?;
        let iqr = q3 - q1;
        let (lo_fence, hi_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

        let inside = values.iter().copied().filter(|v| *v >= lo_fence && *v <= hi_fence);
        let lower_whisker = inside.clone().fold(f64::INFINITY, f64::min);
        let upper_whisker = inside.fold(f64::NEG_INFINITY, f64::max);
        let mut outliers: Vec<f64> = values
            .iter()
            .copied()
            .filter(|v| *v < lo_fence || *v > hi_fence)
            .collect();
        outliers.sort_by(|a, b| a.total_cmp(b));

        Some(Self {
            n: values.len(),
            min: Reducer::Min.apply(values)?,
            q1,
            median,
            q3,
            max: Reducer::Max.apply(values)?,
            mean: Reducer::Mean.apply(values)?,
            lower_whisker,
            upper_whisker,
            outliers,
        })
    }
}

/// One bar of an UpSet plot: rows whose membership is exactly `membership`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntersectionGroup {
    /// Member set names, in input order.
    pub sets: Vec<String>,
    /// One flag per input set, in input order.
    pub membership: Vec<bool>,
    pub size: usize,
    /// Present when a summary variable was requested and the group has values.
    pub summary: Option<BoxStats>,
}

impl IntersectionGroup {
    pub fn degree(&self) -> usize {
        self.membership.iter().filter(|m| **m).count()
    }
}

/// The summary panel drawn above the intersection bars.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryPanel {
    pub var: String,
    pub reducer: Reducer,
}

/// UpSet plot: set-size bars, intersection bars, optional summary panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpSetPlot {
    /// Set rows in display order.
    pub sets: Vec<SetInfo>,
    /// Intersection bars in display order.
    pub groups: Vec<IntersectionGroup>,
    /// Number of membership-matrix rows (the union).
    pub total: usize,
    pub summary: Option<SummaryPanel>,
}

impl UpSetPlot {
    /// Size of the group with exactly these member sets (any order).
    pub fn group_size(&self, sets: &[&str]) -> Option<usize> {
        self.groups
            .iter()
            .find(|g| g.sets.len() == sets.len() && sets.iter().all(|s| g.sets.iter().any(|n| n == s)))
            .map(|g| g.size)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub category: String,
    pub value: f64,
    pub proportion: f64,
    pub color: String,
    /// Radians, clockwise from twelve o'clock.
    pub start_angle: f64,
    pub end_angle: f64,
    /// Omitted for slices below the labelling threshold.
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieFacet {
    pub label: Option<String>,
    pub total: f64,
    pub slices: Vec<PieSlice>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieChart {
    pub fill: String,
    pub facet: Option<String>,
    pub weight: PieWeight,
    pub facets: Vec<PieFacet>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_stats() {
        let stats = BoxStats::from_values(&[1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();

        assert_eq!(stats.n, 5);
        assert_eq!(stats.median, 3.0);
        assert_eq!(stats.q1, 2.0);
        assert_eq!(stats.q3, 4.0);
        assert_eq!(stats.max, 100.0);
        assert_eq!(stats.upper_whisker, 4.0);
        assert_eq!(stats.lower_whisker, 1.0);
        assert_eq!(stats.outliers, vec![100.0]);
    }

    #[test]
    fn test_box_stats_empty() {
        assert!(BoxStats::from_values(&[]).is_none());
    }

    #[test]
    fn test_diagram_json_is_tagged() {
        let plot = UpSetPlot {
            sets: vec![],
            groups: vec![],
            total: 0,
            summary: None,
        };
        let json = Diagram::UpSet(plot).to_json().unwrap();
        assert!(json.contains("\"kind\": \"upset\""));
    }

    #[test]
    fn test_group_lookup_is_order_free() {
        let plot = UpSetPlot {
            sets: vec![],
            groups: vec![IntersectionGroup {
                sets: vec!["a".into(), "b".into()],
                membership: vec![true, true],
                size: 4,
                summary: None,
            }],
            total: 4,
            summary: None,
        };
        assert_eq!(plot.group_size(&["b", "a"]), Some(4));
        assert_eq!(plot.group_size(&["a"]), None);
        assert_eq!(plot.groups[0].degree(), 2);
    }
}
