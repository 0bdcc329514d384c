//! Income and outcome measure extraction from scenarios

use crate::assumptions::{IncomeMeasure, Measure};
use crate::error::DistResult;
use crate::population::{fields, Scenario};

/// Per-unit income under the requested concept
pub fn get_income(scenario: &dyn Scenario, income: IncomeMeasure) -> DistResult<Vec<f64>> {
    match income {
        IncomeMeasure::Expanded => scenario.field(fields::EXPANDED_INCOME),
        IncomeMeasure::Agi => scenario.field(fields::AGI),
        IncomeMeasure::Aftertax => scenario.field(fields::AFTERTAX_INCOME),
        IncomeMeasure::Market => {
            let expanded = scenario.field(fields::EXPANDED_INCOME)?;
            let benefits = scenario.field(fields::BENEFITS)?;
            let refunds = scenario.field(fields::STATE_REFUND)?;
            Ok(zip3(&expanded, &benefits, &refunds, |e, b, r| e - b - r))
        }
    }
}

/// Outcome measure under the baseline and the reform.
///
/// Indicator measures comparing the two scenarios (`fraccut`, `frachike` and
/// their $100 variants) put a unit count in the baseline slot and the
/// indicator in the reform slot, so `level2` gives the share of units.
pub fn get_measures(
    baseline: &dyn Scenario,
    reform: &dyn Scenario,
    measure: Measure,
) -> DistResult<(Vec<f64>, Vec<f64>)> {
    match measure {
        Measure::ExpandedIncome => both(baseline, reform, fields::EXPANDED_INCOME),
        Measure::IncomeTax => both(baseline, reform, fields::IITAX),
        Measure::PayrollTax => both(baseline, reform, fields::PAYROLL_TAX),
        Measure::TotalTax => both(baseline, reform, fields::COMBINED_TAX),
        Measure::AftertaxIncome => both(baseline, reform, fields::AFTERTAX_INCOME),
        Measure::AvgTaxRate => {
            let clipped = average_tax_rate(baseline)?
                .into_iter()
                .map(|r| if r.abs() > 1.0 { r.signum() } else { r })
                .collect();
            Ok((clipped, average_tax_rate(reform)?))
        }
        Measure::MargTaxRate => Ok((
            baseline.marginal_rate(fields::WAGES_PRIMARY)?,
            reform.marginal_rate(fields::WAGES_PRIMARY)?,
        )),
        Measure::AvgNetTaxRate => Ok((average_net_rate(baseline)?, average_net_rate(reform)?)),
        Measure::MargNetTaxRate => {
            let net = |s: &dyn Scenario| -> DistResult<Vec<f64>> {
                Ok(s.marginal_rate(fields::WAGES_PRIMARY)?
                    .into_iter()
                    .map(|m| 1.0 - m)
                    .collect())
            };
            Ok((net(baseline)?, net(reform)?))
        }
        Measure::FracZero => {
            let zero = |s: &dyn Scenario| -> DistResult<Vec<f64>> {
                Ok(indicator(&s.field(fields::IITAX)?, |t| t <= 0.0))
            };
            Ok((zero(baseline)?, zero(reform)?))
        }
        Measure::Filers => Ok((vec![1.0; baseline.len()], vec![1.0; reform.len()])),
        Measure::FracCut => tax_change_share(baseline, reform, |d| d < 0.0),
        Measure::FracHike => tax_change_share(baseline, reform, |d| d > 0.0),
        Measure::FracCut100 => tax_change_share(baseline, reform, |d| d < -100.0),
        Measure::FracHike100 => tax_change_share(baseline, reform, |d| d > 100.0),
        Measure::Charity => Ok((charity(baseline)?, charity(reform)?)),
        Measure::CharityAfter => Ok((charity_after(baseline)?, charity_after(reform)?)),
        Measure::StateTaxes => Ok((state_taxes(baseline)?, state_taxes(reform)?)),
        Measure::Benefits => both(baseline, reform, fields::BENEFITS),
        Measure::Medicaid => both(baseline, reform, fields::MEDICAID),
        Measure::Wages => both(baseline, reform, fields::WAGES),
        Measure::WagesAfter => Ok((wages_after(baseline)?, wages_after(reform)?)),
    }
}

/// State and local income, sales and property taxes less refunds
pub fn state_taxes(scenario: &dyn Scenario) -> DistResult<Vec<f64>> {
    let income_tax = scenario.field(fields::STATE_INCOME_TAX)?;
    let property_tax = scenario.field(fields::STATE_PROPERTY_TAX)?;
    let refunds = scenario.field(fields::STATE_REFUND)?;
    Ok(zip3(&income_tax, &property_tax, &refunds, |i, p, r| i + p - r))
}

/// Cash plus noncash charitable giving
pub fn charity(scenario: &dyn Scenario) -> DistResult<Vec<f64>> {
    let cash = scenario.field(fields::CASH_GIVING)?;
    let noncash = scenario.field(fields::NONCASH_GIVING)?;
    Ok(cash.iter().zip(&noncash).map(|(c, n)| c + n).collect())
}

fn both(baseline: &dyn Scenario, reform: &dyn Scenario, name: &str) -> DistResult<(Vec<f64>, Vec<f64>)> {
    Ok((baseline.field(name)?, reform.field(name)?))
}

/// Total tax over positive income; units without positive income get zero
fn average_tax_rate(scenario: &dyn Scenario) -> DistResult<Vec<f64>> {
    let tax = scenario.field(fields::COMBINED_TAX)?;
    let income = scenario.field(fields::EXPANDED_INCOME)?;
    Ok(tax
        .iter()
        .zip(&income)
        .map(|(&t, &i)| if i > 0.0 { t / i } else { 0.0 })
        .collect())
}

/// After-tax income over nonzero income; zero-income units get zero
fn average_net_rate(scenario: &dyn Scenario) -> DistResult<Vec<f64>> {
    let aftertax = scenario.field(fields::AFTERTAX_INCOME)?;
    let income = scenario.field(fields::EXPANDED_INCOME)?;
    Ok(aftertax
        .iter()
        .zip(&income)
        .map(|(&a, &i)| if i != 0.0 { a / i } else { 0.0 })
        .collect())
}

fn tax_change_share(
    baseline: &dyn Scenario,
    reform: &dyn Scenario,
    test: impl Fn(f64) -> bool,
) -> DistResult<(Vec<f64>, Vec<f64>)> {
    let before = baseline.field(fields::COMBINED_TAX)?;
    let after = reform.field(fields::COMBINED_TAX)?;
    let changed = after
        .iter()
        .zip(&before)
        .map(|(a, b)| if test(a - b) { 1.0 } else { 0.0 })
        .collect();
    Ok((vec![1.0; baseline.len()], changed))
}

/// Cash giving grossed up by its marginal rate, noncash giving net of its
fn charity_after(scenario: &dyn Scenario) -> DistResult<Vec<f64>> {
    let cash = scenario.field(fields::CASH_GIVING)?;
    let noncash = scenario.field(fields::NONCASH_GIVING)?;
    let mtr_cash = scenario.marginal_rate(fields::CASH_GIVING)?;
    let mtr_noncash = scenario.marginal_rate(fields::NONCASH_GIVING)?;
    Ok((0..cash.len())
        .map(|i| cash[i] * (1.0 + mtr_cash[i]) + noncash[i] * (1.0 - mtr_noncash[i]))
        .collect())
}

fn wages_after(scenario: &dyn Scenario) -> DistResult<Vec<f64>> {
    let wages = scenario.field(fields::WAGES)?;
    let mtr = scenario.marginal_rate(fields::WAGES_PRIMARY)?;
    Ok(wages.iter().zip(&mtr).map(|(w, m)| w * (1.0 - m)).collect())
}

fn indicator(values: &[f64], test: impl Fn(f64) -> bool) -> Vec<f64> {
    values.iter().map(|&v| if test(v) { 1.0 } else { 0.0 }).collect()
}

fn zip3(a: &[f64], b: &[f64], c: &[f64], f: impl Fn(f64, f64, f64) -> f64) -> Vec<f64> {
    a.iter()
        .zip(b)
        .zip(c)
        .map(|((&x, &y), &z)| f(x, y, z))
        .collect()
}
