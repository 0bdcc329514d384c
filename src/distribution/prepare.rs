//! Order/prepare stage: rank units by adjusted income and compute each
//! unit's cumulative weight share

use log::debug;

use crate::assumptions::{AnalysisOptions, IncomeMeasure, Measure};
use crate::error::{DistError, DistResult};
use crate::population::{fields, Scenario, ScenarioPair};

use super::bins::EXCLUDED;
use super::filters::{get_exclude, get_screen};
use super::measures::{get_income, get_measures};
use super::rank_scale::get_rank_scale;

/// Per-unit ranking inputs, index-aligned to input order
#[derive(Debug, Clone, Default)]
pub struct RankingInputs {
    /// Unadjusted income
    pub income: Vec<f64>,
    /// Divisor applied to income before ranking
    pub rank: Vec<f64>,
    /// Multiplier applied to the sampling weight
    pub scale: Vec<f64>,
    /// Raw sampling weight
    pub weight: Vec<f64>,
    /// Units removed from the cumulative-weight base
    pub drop: Vec<bool>,
    /// Units kept in the output
    pub screen: Vec<bool>,
}

impl RankingInputs {
    /// Extract ranking inputs from one scenario
    pub fn from_scenario(
        scenario: &dyn Scenario,
        income: IncomeMeasure,
        options: &AnalysisOptions,
    ) -> DistResult<Self> {
        let (rank, scale) = get_rank_scale(scenario, &options.ranking, &options.scaling)?;
        Ok(Self {
            income: get_income(scenario, income)?,
            rank,
            scale,
            weight: scenario.field(fields::WEIGHT)?,
            drop: get_exclude(scenario, &options.exclude, income)?,
            screen: get_screen(scenario, &options.screen)?,
        })
    }

    pub fn len(&self) -> usize {
        self.income.len()
    }

    pub fn is_empty(&self) -> bool {
        self.income.is_empty()
    }

    fn validate(&self) -> DistResult<()> {
        let n = self.len();
        DistError::check_len("rank", n, self.rank.len())?;
        DistError::check_len("scale", n, self.scale.len())?;
        DistError::check_len("weight", n, self.weight.len())?;
        DistError::check_len("exclusion flags", n, self.drop.len())?;
        DistError::check_len("screen flags", n, self.screen.len())?;

        if let Some(i) = self.weight.iter().position(|&w| w < 0.0 || w.is_nan()) {
            return Err(DistError::invalid(format!(
                "unit {} has invalid sampling weight {}",
                i, self.weight[i]
            )));
        }
        if let Some(i) = self.rank.iter().position(|&r| r <= 0.0 || r.is_nan()) {
            return Err(DistError::invalid(format!(
                "unit {} has non-positive ranking divisor {}",
                i, self.rank[i]
            )));
        }
        Ok(())
    }
}

/// Units in ranking order with their cumulative weight share.
///
/// Screened-out units are removed. Excluded units remain with their scaled
/// weight but carry [`EXCLUDED`] as their cumulative share.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderedUnits {
    pub income: Vec<f64>,
    /// Value columns, each reordered like `income`
    pub values: Vec<Vec<f64>>,
    pub weight: Vec<f64>,
    pub cum_weight: Vec<f64>,
}

impl OrderedUnits {
    pub fn len(&self) -> usize {
        self.income.len()
    }

    pub fn is_empty(&self) -> bool {
        self.income.is_empty()
    }
}

/// Sort units by rescaled income and compute cumulative weight shares for
/// any number of value columns.
///
/// Ties in rescaled income keep input order. Exclusion is applied before the
/// cumulative sum, screening after it.
pub fn order_units(inputs: &RankingInputs, values: &[Vec<f64>]) -> DistResult<OrderedUnits> {
    inputs.validate()?;
    let n = inputs.len();
    for column in values {
        DistError::check_len("value column", n, column.len())?;
    }
    if n == 0 {
        return Err(DistError::degenerate("population has no units"));
    }

    let rescaled: Vec<f64> = inputs
        .income
        .iter()
        .zip(&inputs.rank)
        .map(|(inc, r)| inc / r)
        .collect();

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| rescaled[a].total_cmp(&rescaled[b]));

    let weight: Vec<f64> = order
        .iter()
        .map(|&i| inputs.weight[i] * inputs.scale[i])
        .collect();

    let base: f64 = order
        .iter()
        .zip(&weight)
        .filter(|(&i, _)| !inputs.drop[i])
        .map(|(_, w)| w)
        .sum();
    if base <= 0.0 {
        return Err(DistError::degenerate(
            "no weight remains after exclusions; cumulative shares undefined",
        ));
    }

    let mut cum_weight = Vec::with_capacity(n);
    let mut running = 0.0;
    for (&i, &w) in order.iter().zip(&weight) {
        if inputs.drop[i] {
            cum_weight.push(EXCLUDED);
        } else {
            running += w;
            cum_weight.push(running / base);
        }
    }

    let kept: Vec<usize> = (0..n).filter(|&k| inputs.screen[order[k]]).collect();
    debug!(
        "ordered {} units: {} excluded, {} screened in, base weight {:.1}",
        n,
        inputs.drop.iter().filter(|&&d| d).count(),
        kept.len(),
        base
    );

    Ok(OrderedUnits {
        income: kept
            .iter()
            .map(|&k| rescaled[order[k]] * inputs.rank[order[k]])
            .collect(),
        values: values
            .iter()
            .map(|column| kept.iter().map(|&k| column[order[k]]).collect())
            .collect(),
        weight: kept.iter().map(|&k| weight[k]).collect(),
        cum_weight: kept.iter().map(|&k| cum_weight[k]).collect(),
    })
}

/// Ordered baseline and reform outcomes for one measure
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreparedData {
    pub income: Vec<f64>,
    pub value_a: Vec<f64>,
    pub value_b: Vec<f64>,
    pub weight: Vec<f64>,
    pub cum_weight: Vec<f64>,
}

impl PreparedData {
    pub fn len(&self) -> usize {
        self.income.len()
    }

    pub fn is_empty(&self) -> bool {
        self.income.is_empty()
    }
}

/// Prepare one measure for aggregation.
///
/// Ranking, exclusion and screening all come from the baseline scenario.
pub fn prepare(
    pair: ScenarioPair<'_>,
    income: IncomeMeasure,
    measure: Measure,
    options: &AnalysisOptions,
) -> DistResult<PreparedData> {
    let inputs = RankingInputs::from_scenario(pair.baseline, income, options)?;
    let (value_a, value_b) = get_measures(pair.baseline, pair.reform, measure)?;

    let ordered = order_units(&inputs, &[value_a, value_b])?;
    let OrderedUnits {
        income,
        values,
        weight,
        cum_weight,
    } = ordered;
    let mut values = values.into_iter();
    let (value_a, value_b) = match (values.next(), values.next()) {
        (Some(a), Some(b)) => (a, b),
        _ => return Err(DistError::invalid("measure produced fewer than two columns")),
    };

    Ok(PreparedData {
        income,
        value_a,
        value_b,
        weight,
        cum_weight,
    })
}
