//! Per-group aggregation of prepared outcomes

use log::{debug, warn};

use crate::assumptions::{AnalysisOptions, ChangeType, IncomeMeasure, Measure};
use crate::error::{DistError, DistResult};
use crate::population::ScenarioPair;

use super::bins::{assign_bins, BinScheme};
use super::prepare::{prepare, PreparedData};

/// Weighted sums over one income group
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct GroupSums {
    weight: f64,
    value_a: f64,
    value_b: f64,
    change: f64,
    units: usize,
}

impl GroupSums {
    fn add(&mut self, a: f64, b: f64, w: f64) {
        self.weight += w;
        self.value_a += a * w;
        self.value_b += b * w;
        self.change += (b - a) * w;
        self.units += 1;
    }

    fn statistic(&self, change: ChangeType) -> f64 {
        match change {
            ChangeType::PercentChange => ratio(self.value_b, self.value_a) - 1.0,
            ChangeType::DollarChange => ratio(self.change, self.weight),
            ChangeType::TotalChange => self.change,
            ChangeType::Level1 => ratio(self.value_a, self.weight),
            ChangeType::Level2 => ratio(self.value_b, self.weight),
            ChangeType::Total1 => self.value_a,
            ChangeType::Total2 => self.value_b,
        }
    }
}

/// Quotient that is NaN rather than infinite when the denominator is zero
fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        f64::NAN
    } else {
        numerator / denominator
    }
}

/// Aggregate prepared data into one value per income group plus a final
/// slot for all units.
///
/// Excluded units contribute to no slot. A ratio statistic over a group
/// with a zero denominator (typically an empty group) is NaN.
pub fn aggregate(
    data: &PreparedData,
    scheme: &BinScheme,
    change: ChangeType,
) -> DistResult<Vec<f64>> {
    let n = data.len();
    DistError::check_len("baseline values", n, data.value_a.len())?;
    DistError::check_len("reform values", n, data.value_b.len())?;
    DistError::check_len("weights", n, data.weight.len())?;
    DistError::check_len("cumulative weights", n, data.cum_weight.len())?;

    let bins = assign_bins(scheme, &data.cum_weight)?;
    let k = scheme.bin_count();
    let mut groups = vec![GroupSums::default(); k];
    let mut all = GroupSums::default();

    for (i, bin) in bins.iter().enumerate() {
        if let Some(b) = *bin {
            let (a, v, w) = (data.value_a[i], data.value_b[i], data.weight[i]);
            groups[b].add(a, v, w);
            all.add(a, v, w);
        }
    }

    let mut outcome: Vec<f64> = groups.iter().map(|g| g.statistic(change)).collect();
    outcome.push(all.statistic(change));

    let empty: Vec<usize> = groups
        .iter()
        .enumerate()
        .filter(|(_, g)| g.units == 0)
        .map(|(b, _)| b)
        .collect();
    if !empty.is_empty() {
        warn!(
            "{} of {} income groups are empty ({:?}); {} gives NaN there",
            empty.len(),
            k,
            empty,
            change
        );
    }
    debug!(
        "aggregated {} units into {} groups ({}), all-units {} = {}",
        all.units, k, change, change, outcome[k]
    );

    Ok(outcome)
}

/// Prepare and aggregate one measure in a single call
pub fn dist_table(
    pair: ScenarioPair<'_>,
    scheme: &BinScheme,
    income: IncomeMeasure,
    measure: Measure,
    change: ChangeType,
    options: &AnalysisOptions,
) -> DistResult<Vec<f64>> {
    let prepared = prepare(pair, income, measure, options)?;
    aggregate(&prepared, scheme, change)
}
