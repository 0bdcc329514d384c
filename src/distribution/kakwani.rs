//! Kakwani progressivity index of a tax change

use log::debug;

use crate::assumptions::{AnalysisOptions, IncomeMeasure, Measure, Screen};
use crate::error::{DistError, DistResult};
use crate::population::ScenarioPair;

use super::bins::EXCLUDED;
use super::prepare::prepare;

/// Tax measures the index is defined for
pub const KAKWANI_MEASURES: [Measure; 3] = [Measure::IncomeTax, Measure::PayrollTax, Measure::TotalTax];

/// Concentration of the tax change minus concentration of income, signed by
/// the direction of the total change.
///
/// Positive values mean the change is progressive: a tax increase falling
/// more than proportionally on high incomes, or a cut falling more than
/// proportionally on low incomes. The screen in `options` is ignored.
pub fn kakwani(
    pair: ScenarioPair<'_>,
    income: IncomeMeasure,
    measure: Measure,
    options: &AnalysisOptions,
) -> DistResult<f64> {
    if !KAKWANI_MEASURES.contains(&measure) {
        return Err(DistError::invalid(format!(
            "Kakwani index needs a tax measure (iitax, payrolltax, totaltax), got `{}`",
            measure
        )));
    }

    let unscreened = options.clone().with_screen(Screen::none());
    let data = prepare(pair, income, measure, &unscreened)?;

    let mut weight = Vec::with_capacity(data.len());
    let mut inc = Vec::with_capacity(data.len());
    let mut change = Vec::with_capacity(data.len());
    for i in 0..data.len() {
        if data.cum_weight[i] < EXCLUDED {
            weight.push(data.weight[i]);
            inc.push(data.income[i]);
            change.push(data.value_b[i] - data.value_a[i]);
        }
    }

    let total_weight: f64 = weight.iter().sum();
    let total_income: f64 = inc.iter().zip(&weight).map(|(x, w)| x * w).sum();
    let total_change: f64 = change.iter().zip(&weight).map(|(x, w)| x * w).sum();
    if total_income == 0.0 {
        return Err(DistError::degenerate("total income is zero; Kakwani index undefined"));
    }
    if total_change == 0.0 {
        return Err(DistError::degenerate("total tax change is zero; Kakwani index undefined"));
    }

    let income_ineq = concentration(&inc, &weight, total_weight, total_income);
    let tax_ineq = concentration(&change, &weight, total_weight, total_change);
    let index = (tax_ineq - income_ineq) * total_change.signum();

    debug!(
        "kakwani {}: income concentration {:.6}, tax concentration {:.6}, index {:.6}",
        measure, income_ineq, tax_ineq, index
    );
    Ok(index)
}

/// Twice the weighted area between the population line and the
/// concentration curve of `values`
fn concentration(values: &[f64], weight: &[f64], total_weight: f64, total_value: f64) -> f64 {
    let mut cum_weight = 0.0;
    let mut cum_value = 0.0;
    let mut area = 0.0;
    for (v, w) in values.iter().zip(weight) {
        cum_weight += w;
        cum_value += v * w;
        area += (cum_weight / total_weight - cum_value / total_value) * w / total_weight;
    }
    2.0 * area
}
