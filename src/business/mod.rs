//! Corporate income tax incidence
//!
//! A change in corporate tax liability is split among owner classes by
//! [`BurdenShares`]. The federal and rest-of-world shares are not
//! distributed. The remaining three are turned into per-unit changes:
//!
//! - **Nonprofits**: services, employee compensation and donor giving
//! - **State and local governments**: benefits, compensation and taxes
//! - **Households**: equity income, by payout and realization type
//!
//! The changes are applied to a scenario as [`FieldAdjustments`] through the
//! [`Recalculate`] capability and compared on after-tax income.
//!
//! [`BurdenShares`]: crate::assumptions::BurdenShares

mod government;
mod household;
mod nonprofit;

pub use government::{state_local_distribution, StateLocalChanges};
pub use household::{household_equity_distribution, EquityHoldings, HouseholdChanges};
pub use nonprofit::{nonprofit_distribution, NonprofitChanges};

use std::collections::BTreeMap;

use log::info;

use crate::assumptions::{Assumptions, ChangeType, IncomeMeasure, Measure};
use crate::distribution::{dist_table, BinScheme};
use crate::equity::advance_equity;
use crate::error::{DistError, DistResult};
use crate::population::{fields, Population, Scenario, ScenarioPair};
use crate::tables::DistTable;

/// Named per-unit deltas to add to scenario fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldAdjustments {
    units: usize,
    deltas: BTreeMap<String, Vec<f64>>,
}

impl FieldAdjustments {
    pub fn new(units: usize) -> Self {
        Self {
            units,
            deltas: BTreeMap::new(),
        }
    }

    /// Add a delta to a field; adjusting the same field twice sums the deltas
    pub fn add(&mut self, field: &str, delta: &[f64]) -> DistResult<()> {
        DistError::check_len(field, self.units, delta.len())?;
        match self.deltas.get_mut(field) {
            Some(existing) => {
                for (e, d) in existing.iter_mut().zip(delta) {
                    *e += d;
                }
            }
            None => {
                self.deltas.insert(field.to_string(), delta.to_vec());
            }
        }
        Ok(())
    }

    pub fn get(&self, field: &str) -> Option<&[f64]> {
        self.deltas.get(field).map(Vec::as_slice)
    }

    /// Adjusted fields in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.deltas.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn units(&self) -> usize {
        self.units
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }
}

/// A scenario that can be re-run with some input fields changed
pub trait Recalculate: Scenario {
    type Output: Scenario;

    fn recalculate(&self, adjustments: &FieldAdjustments) -> DistResult<Self::Output>;
}

/// Static recalculation: inputs change, liabilities stay fixed.
///
/// Deltas to income fields also flow into expanded and after-tax income,
/// and Medicaid deltas into total benefits.
impl Recalculate for Population {
    type Output = Population;

    fn recalculate(&self, adjustments: &FieldAdjustments) -> DistResult<Population> {
        DistError::check_len("adjustments", self.len(), adjustments.units())?;
        let mut updated = self.clone();
        for (field, delta) in adjustments.iter() {
            updated.increment_field(field, delta)?;
            if fields::INCOME_FIELDS.contains(&field) {
                for total in [fields::EXPANDED_INCOME, fields::AFTERTAX_INCOME] {
                    if updated.has_field(total) {
                        updated.increment_field(total, delta)?;
                    }
                }
            }
            if field == fields::MEDICAID && updated.has_field(fields::BENEFITS) {
                updated.increment_field(fields::BENEFITS, delta)?;
            }
        }
        Ok(updated)
    }
}

/// Spread `total` over units in proportion to `base`, so that the weighted
/// sum of the result equals `total`
pub(crate) fn allocate(total: f64, base: &[f64], weight: &[f64], what: &str) -> DistResult<Vec<f64>> {
    if total == 0.0 {
        return Ok(vec![0.0; base.len()]);
    }
    let denominator: f64 = base.iter().zip(weight).map(|(b, w)| b * w).sum();
    if denominator == 0.0 {
        return Err(DistError::degenerate(format!(
            "cannot allocate {:.0} by {}: weighted total is zero",
            total, what
        )));
    }
    Ok(base.iter().map(|b| total * b / denominator).collect())
}

/// Per-unit field changes implied by a corporate tax change, measured on
/// the scenario in which the change happens
pub fn incidence_adjustments(
    scenario: &dyn Scenario,
    ctax_change: f64,
    holdings: &EquityHoldings,
    assumptions: &Assumptions,
) -> DistResult<FieldAdjustments> {
    let nonprofit = nonprofit_distribution(
        scenario,
        ctax_change,
        &assumptions.burden,
        &assumptions.nonprofit_split,
    )?;
    let government = state_local_distribution(
        scenario,
        ctax_change,
        &assumptions.burden,
        &assumptions.state_local_split,
    )?;
    let household = household_equity_distribution(
        scenario,
        holdings,
        ctax_change,
        &assumptions.burden,
        &assumptions.equity,
    )?;

    let sum = |a: &[f64], b: &[f64]| -> Vec<f64> { a.iter().zip(b).map(|(x, y)| x + y).collect() };
    let compensation = sum(&nonprofit.compensation, &government.compensation);

    let mut adj = FieldAdjustments::new(scenario.len());
    adj.add(fields::MEDICAID, &sum(&nonprofit.services, &government.benefits))?;
    adj.add(fields::WAGES_PRIMARY, &compensation)?;
    adj.add(fields::WAGES, &compensation)?;
    adj.add(fields::CASH_GIVING, &nonprofit.giving)?;
    adj.add(fields::STATE_INCOME_TAX, &government.taxes)?;
    adj.add(fields::QUALIFIED_DIVIDENDS, &household.qualified_dividends)?;
    adj.add(fields::DIVIDENDS, &household.dividends)?;
    adj.add(fields::SHORT_TERM_GAINS, &household.short_term_gains)?;
    adj.add(fields::LONG_TERM_GAINS, &household.long_term_gains)?;
    adj.add(fields::EXEMPT_INTEREST, &household.untaxed)?;
    Ok(adj)
}

/// Change in after-tax income from a corporate tax change: the incidence
/// is measured on `baseline` and applied to `reform`
pub fn btax_distribution_table<R: Recalculate>(
    baseline: &dyn Scenario,
    reform: &R,
    ctax_change: f64,
    holdings: &EquityHoldings,
    assumptions: &Assumptions,
) -> DistResult<DistTable> {
    info!("distributing corporate tax change of {:.0}", ctax_change);
    let adjustments = incidence_adjustments(baseline, ctax_change, holdings, assumptions)?;
    let adjusted = reform.recalculate(&adjustments)?;
    let pair = ScenarioPair::new(baseline, &adjusted)?;
    let (pch, dch) = aftertax_change(pair, assumptions)?;

    DistTable::for_scheme(&BinScheme::Standard)
        .with_column("Percent", pch)?
        .with_column("Average ($)", dch)
}

fn aftertax_change(pair: ScenarioPair<'_>, assumptions: &Assumptions) -> DistResult<(Vec<f64>, Vec<f64>)> {
    let column = |change| {
        dist_table(
            pair,
            &BinScheme::Standard,
            IncomeMeasure::Expanded,
            Measure::AftertaxIncome,
            change,
            &assumptions.options,
        )
    };
    Ok((column(ChangeType::PercentChange)?, column(ChangeType::DollarChange)?))
}

/// Individual-only, corporate-only and combined changes in after-tax
/// income for one year.
///
/// `holdings` is the 2016 equity imputation; it is grown to `year` here.
/// `ctax_by_year` maps years to the change in corporate tax liability
/// (positive for a hike).
pub fn full_comparison_table<B, R>(
    baseline: &B,
    reform: &R,
    year: i32,
    ctax_by_year: &BTreeMap<i32, f64>,
    holdings: &EquityHoldings,
    assumptions: &Assumptions,
) -> DistResult<DistTable>
where
    B: Recalculate,
    R: Recalculate,
{
    let ctax_change = *ctax_by_year.get(&year).ok_or_else(|| {
        DistError::invalid(format!("no corporate tax change given for {}", year))
    })?;
    let grown = EquityHoldings {
        equity: advance_equity(&holdings.equity, year)?,
        ..holdings.clone()
    };

    let (iit_pch, iit_dch) = aftertax_change(ScenarioPair::new(baseline, reform)?, assumptions)?;
    let cit = btax_distribution_table(baseline, baseline, ctax_change, &grown, assumptions)?;
    let both = btax_distribution_table(baseline, reform, ctax_change, &grown, assumptions)?;

    let pick = |t: &DistTable, name: &str| -> DistResult<Vec<f64>> {
        t.column(name)
            .map(<[f64]>::to_vec)
            .ok_or_else(|| DistError::UnknownField(name.to_string()))
    };

    let mut table = DistTable::for_scheme(&BinScheme::Standard)
        .with_column("IIT, percent", iit_pch)?
        .with_column("IIT, average", iit_dch)?;
    table.push_column("CIT, percent", pick(&cit, "Percent")?)?;
    table.push_column("CIT, average", pick(&cit, "Average ($)")?)?;
    table.push_column("Both, percent", pick(&both, "Percent")?)?;
    table.push_column("Both, average", pick(&both, "Average ($)")?)?;
    table.group_header = "Income groups".to_string();
    Ok(table)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// Ten units with every field the incidence split reads
    pub(crate) fn incidence_population() -> Population {
        let n = 10;
        let ramp = |scale: f64| -> Vec<f64> { (1..=n).map(|i| scale * i as f64).collect() };
        let income = ramp(10_000.0);
        let tax: Vec<f64> = income.iter().map(|x| 0.15 * x).collect();
        let aftertax: Vec<f64> = income.iter().zip(&tax).map(|(x, t)| x - t).collect();
        Population::new(n)
            .with_field("s006", vec![100.0; n])
            .unwrap()
            .with_field("expanded_income", income)
            .unwrap()
            .with_field("aftertax_income", aftertax)
            .unwrap()
            .with_field("combined", tax)
            .unwrap()
            .with_field("XTOT", vec![1.0; n])
            .unwrap()
            .with_field("nu18", vec![0.0; n])
            .unwrap()
            .with_field("benefit_value_total", ramp(100.0).into_iter().rev().collect())
            .unwrap()
            .with_field("mcaid_ben", vec![0.0; n])
            .unwrap()
            .with_field("e00200", ramp(8_000.0))
            .unwrap()
            .with_field("e00200p", ramp(8_000.0))
            .unwrap()
            .with_field("e19800", ramp(50.0))
            .unwrap()
            .with_field("e20100", vec![0.0; n])
            .unwrap()
            .with_field("e18400", ramp(300.0))
            .unwrap()
            .with_field("e18500", ramp(200.0))
            .unwrap()
            .with_field("e00700", vec![0.0; n])
            .unwrap()
            .with_field("e00600", ramp(500.0))
            .unwrap()
            .with_field("e00650", ramp(400.0))
            .unwrap()
            .with_field("p22250", vec![0.0; n])
            .unwrap()
            .with_field("p23250", ramp(1_000.0))
            .unwrap()
            .with_field("e00400", vec![0.0; n])
            .unwrap()
            .with_field("e01400", ramp(100.0))
            .unwrap()
            .with_marginal_rate("e01400", vec![0.2; n])
            .unwrap()
    }

    pub(crate) fn holdings(n: usize) -> EquityHoldings {
        EquityHoldings {
            equity: (1..=n).map(|i| 5_000.0 * i as f64).collect(),
            direct_share: vec![0.5; n],
            taxable_withdrawal_share: vec![0.6; n],
        }
    }

    #[test]
    fn test_adjustments_accumulate() {
        let mut adj = FieldAdjustments::new(2);
        adj.add("e00200", &[1.0, 2.0]).unwrap();
        adj.add("e00200", &[0.5, 0.5]).unwrap();
        assert_eq!(adj.get("e00200"), Some(&[1.5, 2.5][..]));
        assert!(adj.add("e00600", &[1.0]).is_err());
    }

    #[test]
    fn test_static_recalculation_moves_income() {
        let pop = incidence_population();
        let mut adj = FieldAdjustments::new(10);
        adj.add("e00200", &[10.0; 10]).unwrap();
        adj.add("e00650", &[3.0; 10]).unwrap();
        adj.add("mcaid_ben", &[2.0; 10]).unwrap();
        let updated = pop.recalculate(&adj).unwrap();

        let before = pop.field("expanded_income").unwrap();
        let after = updated.field("expanded_income").unwrap();
        // wages and Medicaid count; qualified dividends are already in e00600
        assert_eq!(after[0] - before[0], 12.0);
        assert_eq!(
            updated.field("aftertax_income").unwrap()[0] - pop.field("aftertax_income").unwrap()[0],
            12.0
        );
        assert_eq!(updated.field("benefit_value_total").unwrap()[0], 1002.0);
        assert_eq!(updated.field("combined").unwrap(), pop.field("combined").unwrap());
    }

    #[test]
    fn test_allocate_preserves_total() {
        let base = [1.0, 3.0, 0.0];
        let weight = [2.0, 1.0, 5.0];
        let shares = allocate(-500.0, &base, &weight, "wages").unwrap();
        let weighted: f64 = shares.iter().zip(&weight).map(|(s, w)| s * w).sum();
        assert_abs_diff_eq!(weighted, -500.0, epsilon = 1e-9);
        assert_eq!(shares[2], 0.0);

        assert!(allocate(0.0, &[0.0; 3], &weight, "giving").unwrap().iter().all(|&x| x == 0.0));
        assert!(matches!(
            allocate(1.0, &[0.0; 3], &weight, "giving"),
            Err(DistError::DegenerateInput(_))
        ));
    }

    #[test]
    fn test_cut_raises_aftertax_income() {
        let pop = incidence_population();
        let assumptions = Assumptions::preferred();
        let table = btax_distribution_table(&pop, &pop, -1.0e6, &holdings(10), &assumptions).unwrap();

        let all = table.get("All units", "Average ($)").unwrap();
        assert!(all > 0.0);
        // a corporate cut only adds income
        for (i, v) in table.column("Average ($)").unwrap().iter().enumerate() {
            assert!(v.is_nan() || *v >= 0.0, "row {} fell: {}", i, v);
        }
    }

    #[test]
    fn test_full_comparison_columns() {
        let pop = incidence_population();
        let reform = pop
            .clone()
            .with_field("aftertax_income", pop.field("aftertax_income").unwrap().iter().map(|x| x + 100.0).collect())
            .unwrap();
        let ctax: BTreeMap<i32, f64> = [(2018, -2.0e6)].into_iter().collect();
        let table = full_comparison_table(&pop, &reform, 2018, &ctax, &holdings(10), &Assumptions::preferred()).unwrap();

        assert_eq!(
            table.column_names(),
            vec!["IIT, percent", "IIT, average", "CIT, percent", "CIT, average", "Both, percent", "Both, average"]
        );
        assert_abs_diff_eq!(table.get("All units", "IIT, average").unwrap(), 100.0, epsilon = 1e-9);
        let cit = table.get("All units", "CIT, average").unwrap();
        let both = table.get("All units", "Both, average").unwrap();
        assert_abs_diff_eq!(both, cit + 100.0, epsilon = 1e-6);

        assert!(full_comparison_table(&pop, &reform, 2030, &ctax, &holdings(10), &Assumptions::preferred()).is_err());
    }
}
