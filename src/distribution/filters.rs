//! Exclusion and screen flags
//!
//! Exclusion removes units from the cumulative-weight base, which moves
//! everyone else's position. Screening only decides which units are reported.

use crate::assumptions::{ChildScreen, Exclusion, IncomeMeasure, Screen, StatusScreen};
use crate::error::{DistError, DistResult};
use crate::population::{fields, FilingStatus, Scenario};

use super::measures::get_income;

/// Raw-income share below which `bottom5` drops a unit
const BOTTOM_SHARE: f64 = 0.05;

/// Flag units matching any of the exclusion rules
pub fn get_exclude(
    scenario: &dyn Scenario,
    exclude: &[Exclusion],
    income: IncomeMeasure,
) -> DistResult<Vec<bool>> {
    let mut drop = vec![false; scenario.len()];
    if exclude.is_empty() {
        return Ok(drop);
    }

    let inc = get_income(scenario, income)?;

    for rule in exclude {
        let matched: Vec<bool> = match rule {
            Exclusion::NegativeIncome => inc.iter().map(|&i| i < 0.0).collect(),
            Exclusion::ZeroIncome => inc.iter().map(|&i| i == 0.0).collect(),
            Exclusion::Supertax => {
                let tax = scenario.field(fields::COMBINED_TAX)?;
                tax.iter().zip(&inc).map(|(&t, &i)| t > i).collect()
            }
            Exclusion::Bottom5 => {
                let weight = scenario.field(fields::WEIGHT)?;
                raw_income_position(&inc, &weight)?
                    .into_iter()
                    .map(|c| c < BOTTOM_SHARE)
                    .collect()
            }
            Exclusion::Under5k => inc.iter().map(|&i| i < 5_000.0).collect(),
            Exclusion::Under10k => inc.iter().map(|&i| i < 10_000.0).collect(),
            Exclusion::Dependents => scenario
                .field(fields::XTOT)?
                .into_iter()
                .map(|n| n == 0.0)
                .collect(),
            Exclusion::Separate => scenario
                .field(fields::MARS)?
                .into_iter()
                .map(|m| FilingStatus::from_code(m) == Some(FilingStatus::Separate))
                .collect(),
        };
        for (d, m) in drop.iter_mut().zip(matched) {
            *d |= m;
        }
    }

    Ok(drop)
}

/// Cumulative raw-weight share of each unit when sorted by unadjusted income,
/// returned in input order. Ties sort by weight, then input position.
fn raw_income_position(income: &[f64], weight: &[f64]) -> DistResult<Vec<f64>> {
    let mut order: Vec<usize> = (0..income.len()).collect();
    order.sort_by(|&a, &b| {
        income[a]
            .total_cmp(&income[b])
            .then(weight[a].total_cmp(&weight[b]))
            .then(a.cmp(&b))
    });

    let total: f64 = weight.iter().sum();
    if total <= 0.0 {
        return Err(DistError::degenerate(
            "total weight is zero; bottom-5% position undefined",
        ));
    }

    let mut position = vec![0.0; income.len()];
    let mut running = 0.0;
    for idx in order {
        running += weight[idx];
        position[idx] = running / total;
    }
    Ok(position)
}

/// Flag units passing both halves of the screen
pub fn get_screen(scenario: &dyn Scenario, screen: &Screen) -> DistResult<Vec<bool>> {
    let status = match screen.status {
        StatusScreen::Any => vec![true; scenario.len()],
        rule => scenario
            .field(fields::MARS)?
            .into_iter()
            .map(|m| status_passes(rule, FilingStatus::from_code(m)))
            .collect(),
    };

    let children = match screen.children {
        ChildScreen::Any => vec![true; scenario.len()],
        rule => scenario
            .field(fields::CHILDREN)?
            .into_iter()
            .map(|n| children_pass(rule, n))
            .collect(),
    };

    Ok(status.into_iter().zip(children).map(|(s, c)| s && c).collect())
}

fn status_passes(rule: StatusScreen, status: Option<FilingStatus>) -> bool {
    let joint = status == Some(FilingStatus::Joint);
    let separate = status == Some(FilingStatus::Separate);
    match rule {
        StatusScreen::Any => true,
        StatusScreen::Single => status == Some(FilingStatus::Single),
        StatusScreen::Head => status == Some(FilingStatus::HeadOfHousehold),
        StatusScreen::Married => joint,
        StatusScreen::MarriedSeparate => separate,
        StatusScreen::NotJoint => !joint,
        StatusScreen::NotSeparate => !separate,
        StatusScreen::NotMarried => !joint && !separate,
    }
}

fn children_pass(rule: ChildScreen, children: f64) -> bool {
    match rule {
        ChildScreen::Any => true,
        ChildScreen::Zero => children == 0.0,
        ChildScreen::One => children == 1.0,
        ChildScreen::Two => children == 2.0,
        ChildScreen::ThreePlus => children >= 3.0,
        ChildScreen::NonZero => children > 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::population::Population;

    fn population() -> Population {
        Population::new(6)
            .with_field("expanded_income", vec![-500.0, 0.0, 3_000.0, 8_000.0, 50_000.0, 200_000.0])
            .unwrap()
            .with_field("combined", vec![0.0, 10.0, 4_000.0, 500.0, 9_000.0, 60_000.0])
            .unwrap()
            .with_field("s006", vec![1.0; 6])
            .unwrap()
            .with_field("XTOT", vec![1.0, 0.0, 3.0, 2.0, 2.0, 4.0])
            .unwrap()
            .with_field("nu18", vec![0.0, 0.0, 2.0, 0.0, 1.0, 3.0])
            .unwrap()
            .with_field("MARS", vec![1.0, 1.0, 4.0, 3.0, 2.0, 2.0])
            .unwrap()
    }

    fn excluded(rules: &[Exclusion]) -> Vec<bool> {
        get_exclude(&population(), rules, IncomeMeasure::Expanded).unwrap()
    }

    #[test]
    fn test_empty_list_drops_nobody() {
        assert_eq!(excluded(&[]), vec![false; 6]);
    }

    #[test]
    fn test_individual_rules() {
        let f = false;
        let t = true;
        assert_eq!(excluded(&[Exclusion::NegativeIncome]), vec![t, f, f, f, f, f]);
        assert_eq!(excluded(&[Exclusion::ZeroIncome]), vec![f, t, f, f, f, f]);
        assert_eq!(excluded(&[Exclusion::Supertax]), vec![t, t, t, f, f, f]);
        assert_eq!(excluded(&[Exclusion::Under5k]), vec![t, t, t, f, f, f]);
        assert_eq!(excluded(&[Exclusion::Under10k]), vec![t, t, t, t, f, f]);
        assert_eq!(excluded(&[Exclusion::Dependents]), vec![f, t, f, f, f, f]);
        assert_eq!(excluded(&[Exclusion::Separate]), vec![f, f, f, t, f, f]);
    }

    #[test]
    fn test_rules_combine_as_union() {
        let drop = excluded(&[Exclusion::NegativeIncome, Exclusion::Separate, Exclusion::ZeroIncome]);
        assert_eq!(drop, vec![true, true, false, true, false, false]);
    }

    #[test]
    fn test_negative_rule_on_nonnegative_population() {
        let pop = Population::new(3)
            .with_field("expanded_income", vec![0.0, 10.0, 1e6])
            .unwrap();
        let drop = get_exclude(&pop, &[Exclusion::NegativeIncome], IncomeMeasure::Expanded).unwrap();
        assert!(drop.iter().all(|d| !d));
    }

    #[test]
    fn test_bottom5_uses_raw_income_order() {
        // 40 units, weight 1: the two lowest incomes have cumulative share 0.025, 0.05
        let n = 40;
        let income: Vec<f64> = (0..n).rev().map(|i| i as f64 * 100.0).collect();
        let pop = Population::new(n)
            .with_field("expanded_income", income)
            .unwrap()
            .with_field("s006", vec![1.0; n])
            .unwrap();
        let drop = get_exclude(&pop, &[Exclusion::Bottom5], IncomeMeasure::Expanded).unwrap();

        // lowest income is last in input order; only it falls strictly below 5%
        assert!(drop[n - 1]);
        assert!(!drop[n - 2]);
        assert_eq!(drop.iter().filter(|&&d| d).count(), 1);
    }

    #[test]
    fn test_screen_status_and_children() {
        let pop = population();
        let married_kids = Screen::from_pair(&["married", "nonzero"]).unwrap();
        assert_eq!(
            get_screen(&pop, &married_kids).unwrap(),
            vec![false, false, false, false, true, true]
        );

        let not_married = Screen::from_pair(&["not_married", ""]).unwrap();
        assert_eq!(
            get_screen(&pop, &not_married).unwrap(),
            vec![true, true, true, false, false, false]
        );

        let three_plus = Screen::from_pair(&["", "3+"]).unwrap();
        assert_eq!(
            get_screen(&pop, &three_plus).unwrap(),
            vec![false, false, false, false, false, true]
        );

        let none = get_screen(&pop, &Screen::none()).unwrap();
        assert!(none.iter().all(|&s| s));
    }
}
