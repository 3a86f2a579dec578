//! Configuration records for diagram construction.
//!
//! Every option a rendering backend accepts is a named field here, so
//! invalid combinations are rejected at the boundary rather than forwarded.

use crate::commands::reduce::DEFAULT_GAP_WIDTH;
use crate::error::OverlapError;
use crate::reducer::Reducer;
use serde::Serialize;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Requested diagram type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlotType {
    /// Venn for up to three sets, UpSet beyond.
    #[default]
    Auto,
    Venn,
    UpSet,
}

impl FromStr for PlotType {
    type Err = OverlapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(PlotType::Auto),
            "venn" => Ok(PlotType::Venn),
            "upset" => Ok(PlotType::UpSet),
            _ => Err(OverlapError::config(format!(
                "Invalid plot type '{}'. Use: auto, venn, upset",
                s
            ))),
        }
    }
}

/// Ordering of UpSet intersection groups or set rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortPolicy {
    /// Smallest first.
    #[default]
    Ascending,
    /// Largest first.
    Descending,
    /// Fewest member sets first, then largest first.
    Degree,
    /// First appearance in the data (set order for set rows).
    Input,
}

impl FromStr for SortPolicy {
    type Err = OverlapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ascending" => Ok(SortPolicy::Ascending),
            "descending" => Ok(SortPolicy::Descending),
            "degree" => Ok(SortPolicy::Degree),
            "input" | "none" => Ok(SortPolicy::Input),
            _ => Err(OverlapError::config(format!(
                "Invalid sort policy '{}'. Use: ascending, descending, degree, input",
                s
            ))),
        }
    }
}

/// Options for Venn diagrams.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VennOptions {
    /// Size two-set circles by area. Three-set diagrams are always schematic.
    pub scaled: bool,
    /// Append the share of the union to region labels.
    pub show_percent: bool,
    /// Decimal places for percentages.
    pub label_digits: usize,
}

impl Default for VennOptions {
    fn default() -> Self {
        Self {
            scaled: true,
            show_percent: false,
            label_digits: 1,
        }
    }
}

/// Options for UpSet plots.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct UpSetOptions {
    pub sort_intersections: SortPolicy,
    pub sort_sets: SortPolicy,
    /// Drop groups smaller than this from the chart (0 keeps all).
    pub min_size: usize,
    /// Also list membership combinations with no rows.
    pub keep_empty_groups: bool,
}

/// Configuration for `plot_overlaps`.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlapConfig {
    pub plot_type: PlotType,
    /// Numeric attribute summarised per intersection group (interval input only).
    pub var: Option<String>,
    pub reducer: Reducer,
    pub gap_width: u64,
    pub ignore_strand: bool,
    /// Palette assigned to sets in input order.
    pub set_colors: Option<Vec<String>>,
    /// Explicit per-set colours; these always win over the palette.
    pub color_overrides: BTreeMap<String, String>,
    pub venn: VennOptions,
    pub upset: UpSetOptions,
}

impl Default for OverlapConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlapConfig {
    pub fn new() -> Self {
        Self {
            plot_type: PlotType::Auto,
            var: None,
            reducer: Reducer::Mean,
            gap_width: DEFAULT_GAP_WIDTH,
            ignore_strand: true,
            set_colors: None,
            color_overrides: BTreeMap::new(),
            venn: VennOptions::default(),
            upset: UpSetOptions::default(),
        }
    }

    pub fn with_type(mut self, plot_type: PlotType) -> Self {
        self.plot_type = plot_type;
        self
    }

    pub fn with_var(mut self, var: impl Into<String>) -> Self {
        self.var = Some(var.into());
        self
    }

    pub fn with_reducer(mut self, reducer: Reducer) -> Self {
        self.reducer = reducer;
        self
    }

    pub fn with_gap_width(mut self, gap_width: u64) -> Self {
        self.gap_width = gap_width;
        self
    }

    pub fn with_ignore_strand(mut self, ignore_strand: bool) -> Self {
        self.ignore_strand = ignore_strand;
        self
    }

    pub fn with_set_colors<S: Into<String>>(mut self, colors: impl IntoIterator<Item = S>) -> Self {
        self.set_colors = Some(colors.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_color_override(mut self, set: impl Into<String>, color: impl Into<String>) -> Self {
        self.color_overrides.insert(set.into(), color.into());
        self
    }

    pub fn with_venn(mut self, venn: VennOptions) -> Self {
        self.venn = venn;
        self
    }

    pub fn with_upset(mut self, upset: UpSetOptions) -> Self {
        self.upset = upset;
        self
    }
}

/// Serialised output format for the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Svg,
}

impl FromStr for OutputFormat {
    type Err = OverlapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "svg" => Ok(OutputFormat::Svg),
            _ => Err(OverlapError::config(format!(
                "Invalid output format '{}'. Use: json, svg",
                s
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OverlapConfig::default();
        assert_eq!(config.plot_type, PlotType::Auto);
        assert_eq!(config.reducer, Reducer::Mean);
        assert_eq!(config.gap_width, 1);
        assert!(config.ignore_strand);
        assert_eq!(config.upset.sort_intersections, SortPolicy::Ascending);
        assert!(config.venn.scaled);
    }

    #[test]
    fn test_builders() {
        let config = OverlapConfig::new()
            .with_type(PlotType::UpSet)
            .with_var("score")
            .with_set_colors(["red", "blue"])
            .with_color_override("a", "#000000");

        assert_eq!(config.var.as_deref(), Some("score"));
        assert_eq!(config.set_colors.as_ref().unwrap().len(), 2);
        assert_eq!(config.color_overrides.get("a").unwrap(), "#000000");
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!("UpSet".parse::<PlotType>().unwrap(), PlotType::UpSet);
        assert_eq!("degree".parse::<SortPolicy>().unwrap(), SortPolicy::Degree);
        assert_eq!("svg".parse::<OutputFormat>().unwrap(), OutputFormat::Svg);
        assert!("pie".parse::<PlotType>().unwrap_err().is_configuration());
        assert!("random".parse::<SortPolicy>().is_err());
    }
}
