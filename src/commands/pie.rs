//! Pie charts of a categorical attribute, optionally faceted.

use crate::colors::assign_colors;
use crate::diagram::{Diagram, PieChart, PieFacet, PieSlice};
use crate::error::{OverlapError, Result};
use crate::interval::BedRecord;
use log::debug;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::f64::consts::TAU;
use std::str::FromStr;

/// What each record contributes to its slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PieWeight {
    /// One per record.
    #[default]
    Count,
    /// Interval width in bases.
    Width,
}

impl FromStr for PieWeight {
    type Err = OverlapError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "count" | "n" => Ok(PieWeight::Count),
            "width" => Ok(PieWeight::Width),
            _ => Err(OverlapError::config(format!(
                "Invalid pie weight '{}'. Use: count, width",
                s
            ))),
        }
    }
}

/// Pie chart configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PieConfig {
    /// Attribute whose values become slices.
    pub fill: String,
    /// Attribute whose values split the data into separate pies.
    pub facet: Option<String>,
    pub weight: PieWeight,
    /// Slices below this share get no label.
    pub min_label_proportion: f64,
    /// Palette for categories in order of first appearance.
    pub colors: Option<Vec<String>>,
}

impl PieConfig {
    pub fn new(fill: impl Into<String>) -> Self {
        Self {
            fill: fill.into(),
            facet: None,
            weight: PieWeight::Count,
            min_label_proportion: 0.01,
            colors: None,
        }
    }

    pub fn with_facet(mut self, facet: impl Into<String>) -> Self {
        self.facet = Some(facet.into());
        self
    }

    pub fn with_weight(mut self, weight: PieWeight) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_colors<S: Into<String>>(mut self, colors: impl IntoIterator<Item = S>) -> Self {
        self.colors = Some(colors.into_iter().map(Into::into).collect());
        self
    }
}

fn category(record: &BedRecord, column: &str) -> Result<String> {
    record
        .attribute(column)
        .map(|a| a.to_string())
        .ok_or_else(|| OverlapError::config(format!("attribute '{}' not found", column)))
}

/// Build a pie chart from the `fill` attribute of `records`.
///
/// Categories keep their order of first appearance across all facets, so
/// a category has the same colour in every pie. Facets are sorted by value.
pub fn plot_pie(records: &[BedRecord], config: &PieConfig) -> Result<Diagram> {
    let mut categories: Vec<String> = Vec::new();
    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut tallies: BTreeMap<Option<String>, BTreeMap<String, f64>> = BTreeMap::new();

    for record in records {
        let cat = category(record, &config.fill)?;
        let facet = match &config.facet {
            Some(column) => Some(category(record, column)?),
            None => None,
        };
        if seen.insert(cat.clone()) {
            categories.push(cat.clone());
        }
        let value = match config.weight {
            PieWeight::Count => 1.0,
            PieWeight::Width => record.len() as f64,
        };
        *tallies.entry(facet).or_default().entry(cat).or_default() += value;
    }

    if tallies.is_empty() {
        return Err(OverlapError::render("no records to draw"));
    }

    let colors = assign_colors(&categories, config.colors.as_deref(), &BTreeMap::new())?;
    let color_of: BTreeMap<&str, &str> = categories
        .iter()
        .map(String::as_str)
        .zip(colors.iter().map(String::as_str))
        .collect();

    let mut facets = Vec::with_capacity(tallies.len());
    for (label, counts) in tallies {
        let total: f64 = counts.values().sum();
        if total <= 0.0 {
            return Err(OverlapError::render(format!(
                "facet {} has zero total weight",
                label.as_deref().unwrap_or("(all)")
            )));
        }

        let mut angle = 0.0;
        let slices = categories
            .iter()
            .filter_map(|cat| counts.get(cat).map(|v| (cat, *v)))
            .map(|(cat, value)| {
                let proportion = value / total;
                let start_angle = angle;
                angle += proportion * TAU;
                PieSlice {
                    category: cat.clone(),
                    value,
                    proportion,
                    color: color_of[cat.as_str()].to_string(),
                    start_angle,
                    end_angle: angle,
                    label: (proportion >= config.min_label_proportion)
                        .then(|| format!("{} ({:.1}%)", cat, 100.0 * proportion)),
                }
            })
            .collect();

        facets.push(PieFacet {
            label,
            total,
            slices,
        });
    }
    debug!(
        "pie of '{}': {} categories over {} facets",
        config.fill,
        categories.len(),
        facets.len()
    );

    Ok(Diagram::Pie(PieChart {
        fill: config.fill.clone(),
        facet: config.facet.clone(),
        weight: config.weight,
        facets,
    }))
}
