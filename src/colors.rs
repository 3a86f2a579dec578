//! Colour assignment for sets and categories.

use crate::error::{OverlapError, Result};
use log::warn;
use std::collections::BTreeMap;

/// Okabe-Ito palette, safe for the common colour-vision deficiencies.
pub const DEFAULT_PALETTE: [&str; 8] = [
    "#E69F00", "#56B4E9", "#009E73", "#F0E442", "#0072B2", "#D55E00", "#CC79A7", "#999999",
];

/// Assign one colour per name.
///
/// Names with an explicit override keep it. The rest take the palette
/// entry at their own position, so a set's colour depends only on where it
/// sits in the input, not on which other sets were overridden. Without a
/// palette the default one is cycled.
pub fn assign_colors(
    names: &[String],
    palette: Option<&[String]>,
    overrides: &BTreeMap<String, String>,
) -> Result<Vec<String>> {
    if let Some(palette) = palette {
        if palette.len() < names.len() {
            return Err(OverlapError::config(format!(
                "{} colours supplied for {} sets",
                palette.len(),
                names.len()
            )));
        }
    }

    for name in overrides.keys() {
        if !names.contains(name) {
            warn!("colour override for unknown set '{}' ignored", name);
        }
    }

    Ok(names
        .iter()
        .enumerate()
        .map(|(i, name)| match overrides.get(name) {
            Some(color) => color.clone(),
            None => match palette {
                Some(p) => p[i].clone(),
                None => DEFAULT_PALETTE[i % DEFAULT_PALETTE.len()].to_string(),
            },
        })
        .collect())
}
