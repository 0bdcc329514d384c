//! Household equity income response to a corporate tax change

use log::warn;

use crate::assumptions::{BurdenShares, EquityParams};
use crate::error::{DistError, DistResult};
use crate::population::{fields, Scenario};

use super::allocate;

/// Offset in the per-unit qualified-dividend ratio
const DIVIDEND_EPSILON: f64 = 1e-5;

/// Imputed equity per unit
#[derive(Debug, Clone, PartialEq)]
pub struct EquityHoldings {
    /// Total corporate equity held
    pub equity: Vec<f64>,
    /// Share of equity held directly
    pub direct_share: Vec<f64>,
    /// Share of indirect equity taxed on withdrawal
    pub taxable_withdrawal_share: Vec<f64>,
}

impl EquityHoldings {
    pub fn len(&self) -> usize {
        self.equity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.equity.is_empty()
    }

    fn validate(&self, units: usize) -> DistResult<()> {
        DistError::check_len("equity", units, self.equity.len())?;
        DistError::check_len("direct equity share", units, self.direct_share.len())?;
        DistError::check_len(
            "taxable withdrawal share",
            units,
            self.taxable_withdrawal_share.len(),
        )
    }
}

/// Per-unit changes in equity income from the household share
#[derive(Debug, Clone, PartialEq)]
pub struct HouseholdChanges {
    pub qualified_dividends: Vec<f64>,
    /// Qualified plus nonqualified dividends
    pub dividends: Vec<f64>,
    pub short_term_gains: Vec<f64>,
    pub long_term_gains: Vec<f64>,
    /// Income never taxed: unrealized gains, indirect equity not taxed on
    /// withdrawal, and taxable indirect equity net of the withdrawal tax
    pub untaxed: Vec<f64>,
}

/// Split the household share of `ctax_change` (positive for a tax hike)
/// across equity income types.
///
/// The burden is spread in proportion to equity. The direct part divides
/// into dividends and gains by `params`; the indirect part divides into
/// income taxed on withdrawal and income that is not.
pub fn household_equity_distribution(
    scenario: &dyn Scenario,
    holdings: &EquityHoldings,
    ctax_change: f64,
    burden: &BurdenShares,
    params: &EquityParams,
) -> DistResult<HouseholdChanges> {
    params.validate()?;
    holdings.validate(scenario.len())?;

    let weight = scenario.field(fields::WEIGHT)?;
    let burden_total = allocate(
        -ctax_change * burden.household,
        &holdings.equity,
        &weight,
        "equity",
    )?;

    let dividend_split = qualified_split(scenario, &weight)?;
    let withdrawal_rate = withdrawal_tax_rate(scenario, &weight)?;

    let div = params.dividend_share;
    let n = scenario.len();
    let mut changes = HouseholdChanges {
        qualified_dividends: Vec::with_capacity(n),
        dividends: Vec::with_capacity(n),
        short_term_gains: Vec::with_capacity(n),
        long_term_gains: Vec::with_capacity(n),
        untaxed: Vec::with_capacity(n),
    };

    for i in 0..n {
        let direct = burden_total[i] * holdings.direct_share[i];
        let indirect = burden_total[i] - direct;
        let retained = direct * (1.0 - div);

        changes.qualified_dividends.push(direct * div * dividend_split[i]);
        changes.dividends.push(direct * div);
        changes.short_term_gains.push(retained * params.short_term_gain_share);
        changes.long_term_gains.push(retained * params.long_term_gain_share);

        let unrealized = retained * params.unrealized_share();
        let taxed_on_withdrawal =
            indirect * holdings.taxable_withdrawal_share[i] * (1.0 - withdrawal_rate);
        let never_taxed = indirect * (1.0 - holdings.taxable_withdrawal_share[i]);
        changes.untaxed.push(unrealized + taxed_on_withdrawal + never_taxed);
    }

    Ok(changes)
}

/// Qualified share of each unit's dividends; units without dividends get
/// the population share
fn qualified_split(scenario: &dyn Scenario, weight: &[f64]) -> DistResult<Vec<f64>> {
    let qualified = scenario.field(fields::QUALIFIED_DIVIDENDS)?;
    let total = scenario.field(fields::DIVIDENDS)?;

    let weighted_total: f64 = total.iter().zip(weight).map(|(d, w)| d * w).sum();
    let population_share = if weighted_total != 0.0 {
        qualified.iter().zip(weight).map(|(q, w)| q * w).sum::<f64>() / weighted_total
    } else {
        0.0
    };

    Ok(qualified
        .iter()
        .zip(&total)
        .map(|(&q, &d)| {
            if d > 0.0 {
                q / (d + DIVIDEND_EPSILON)
            } else {
                population_share
            }
        })
        .collect())
}

/// Marginal rate on IRA distributions, averaged with distribution weights
fn withdrawal_tax_rate(scenario: &dyn Scenario, weight: &[f64]) -> DistResult<f64> {
    let ira = scenario.field(fields::IRA_DISTRIBUTIONS)?;
    let mtr = scenario.marginal_rate(fields::IRA_DISTRIBUTIONS)?;

    let base: f64 = ira.iter().zip(weight).map(|(d, w)| d * w).sum();
    if base == 0.0 {
        warn!("no IRA distributions in population; withdrawals treated as untaxed");
        return Ok(0.0);
    }
    let taxed: f64 = (0..ira.len()).map(|i| mtr[i] * ira[i] * weight[i]).sum();
    Ok(taxed / base)
}
