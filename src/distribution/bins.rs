//! Income groups defined by cut points on cumulative weight share

use serde::{Deserialize, Serialize};

use crate::error::{DistError, DistResult};

/// Cumulative-weight marker for units excluded from the weighting base.
/// Lies above every valid share in [0, 1].
pub const EXCLUDED: f64 = 99.0;

/// Row labels of the standard scheme, including the population total
pub const STANDARD_LABELS: [&str; 13] = [
    "Bottom decile",
    "Second decile",
    "Third decile",
    "Fourth decile",
    "Fifth decile",
    "Sixth decile",
    "Seventh decile",
    "Eighth decile",
    "Ninth decile",
    "Next 5%",
    "Next 4%",
    "Top 1%",
    "All units",
];

const UNEVEN_LABELS: [&str; 9] = [
    "Bottom quintile",
    "Second quintile",
    "Third quintile",
    "Fourth quintile",
    "Next 10%",
    "Next 5%",
    "Next 4%",
    "Top 1%",
    "All units",
];

const STANDARD_CUTS: [f64; 12] = [
    0.0, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 0.95, 0.99,
];

const UNEVEN_CUTS: [f64; 8] = [0.0, 0.2, 0.4, 0.6, 0.8, 0.9, 0.95, 0.99];

/// Grouping of units by cumulative weight share
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinScheme {
    /// `n` groups of equal weight share. A unit at a cumulative share of
    /// exactly 1 falls in the top group, like every other scheme, rather
    /// than counting only toward the population total.
    Even(usize),
    /// Quintiles with the top quintile split 10/5/4/1
    Uneven,
    /// Deciles with the top decile split 5/4/1
    Standard,
}

impl BinScheme {
    /// Lower cut point of each group, ascending and starting at zero
    pub fn cutpoints(&self) -> DistResult<Vec<f64>> {
        match *self {
            BinScheme::Even(0) => Err(DistError::invalid("even scheme needs at least one bin")),
            BinScheme::Even(n) => Ok((0..n).map(|i| i as f64 / n as f64).collect()),
            BinScheme::Uneven => Ok(UNEVEN_CUTS.to_vec()),
            BinScheme::Standard => Ok(STANDARD_CUTS.to_vec()),
        }
    }

    /// Number of income groups, not counting the population total
    pub fn bin_count(&self) -> usize {
        match *self {
            BinScheme::Even(n) => n,
            BinScheme::Uneven => UNEVEN_CUTS.len(),
            BinScheme::Standard => STANDARD_CUTS.len(),
        }
    }

    /// Row labels for each group followed by "All units"
    pub fn labels(&self) -> Vec<String> {
        match *self {
            BinScheme::Standard => STANDARD_LABELS.iter().map(|s| s.to_string()).collect(),
            BinScheme::Uneven => UNEVEN_LABELS.iter().map(|s| s.to_string()).collect(),
            BinScheme::Even(n) => (1..=n)
                .map(|i| format!("Group {} of {}", i, n))
                .chain(std::iter::once("All units".to_string()))
                .collect(),
        }
    }
}

/// Group index of a cumulative share: the last cut point not above it.
///
/// Groups are closed below and open above, except the top group which also
/// holds a share of exactly 1. Excluded units (and anything outside [0, 1])
/// belong to no group.
pub fn assign_bin(cutpoints: &[f64], cum_weight: f64) -> Option<usize> {
    if !(0.0..=1.0).contains(&cum_weight) {
        return None;
    }
    cutpoints
        .partition_point(|&cut| cut <= cum_weight)
        .checked_sub(1)
}

/// Group index for every unit
pub fn assign_bins(scheme: &BinScheme, cum_weight: &[f64]) -> DistResult<Vec<Option<usize>>> {
    let cuts = scheme.cutpoints()?;
    Ok(cum_weight.iter().map(|&c| assign_bin(&cuts, c)).collect())
}
