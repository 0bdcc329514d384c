//! Nonprofit pass-through of a change in corporate equity income

use crate::assumptions::{BurdenShares, NonprofitSplit};
use crate::distribution::measures::charity;
use crate::error::DistResult;
use crate::population::{fields, Scenario};

use super::allocate;

/// Per-unit income changes from the nonprofit share
#[derive(Debug, Clone, PartialEq)]
pub struct NonprofitChanges {
    /// Nontaxable services, spread like total benefits
    pub services: Vec<f64>,
    /// Employee compensation, spread like wages
    pub compensation: Vec<f64>,
    /// Donor giving, spread like cash plus noncash contributions
    pub giving: Vec<f64>,
}

/// Split the nonprofit share of `ctax_change` (positive for a tax hike)
/// into services, compensation and giving. The foreign-aid part is not
/// distributed.
pub fn nonprofit_distribution(
    scenario: &dyn Scenario,
    ctax_change: f64,
    burden: &BurdenShares,
    split: &NonprofitSplit,
) -> DistResult<NonprofitChanges> {
    split.validate()?;
    let total = -ctax_change * burden.nonprofit;
    let weight = scenario.field(fields::WEIGHT)?;

    Ok(NonprofitChanges {
        services: allocate(
            total * split.services,
            &scenario.field(fields::BENEFITS)?,
            &weight,
            "benefits",
        )?,
        compensation: allocate(
            total * split.compensation,
            &scenario.field(fields::WAGES)?,
            &weight,
            "wages",
        )?,
        giving: allocate(total * split.donors, &charity(scenario)?, &weight, "giving")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::business::tests::incidence_population;
    use approx::assert_abs_diff_eq;

    fn weighted(values: &[f64], weight: &[f64]) -> f64 {
        values.iter().zip(weight).map(|(v, w)| v * w).sum()
    }

    #[test]
    fn test_parts_add_up_net_of_foreign_aid() {
        let pop = incidence_population();
        let weight = pop.field("s006").unwrap();
        let burden = BurdenShares::default();
        let split = NonprofitSplit {
            services: 0.2,
            compensation: 0.5,
            donors: 0.25,
            foreign: 0.05,
        };
        let changes = nonprofit_distribution(&pop, 1.0e6, &burden, &split).unwrap();

        let total = -1.0e6 * burden.nonprofit;
        assert_abs_diff_eq!(weighted(&changes.services, &weight), total * 0.2, epsilon = 1e-6);
        assert_abs_diff_eq!(weighted(&changes.compensation, &weight), total * 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(weighted(&changes.giving, &weight), total * 0.25, epsilon = 1e-6);
    }

    #[test]
    fn test_follows_base_distribution() {
        let pop = incidence_population();
        let changes =
            nonprofit_distribution(&pop, -1.0e6, &BurdenShares::default(), &NonprofitSplit::default()).unwrap();
        // wages rise with the unit index, benefits fall
        assert!(changes.compensation[9] > changes.compensation[0]);
        assert!(changes.services[9] < changes.services[0]);
        assert!(changes.giving.iter().all(|&g| g == 0.0));
    }

    #[test]
    fn test_rejects_bad_split() {
        let pop = incidence_population();
        let split = NonprofitSplit {
            services: 0.5,
            compensation: 0.6,
            donors: 0.0,
            foreign: 0.0,
        };
        assert!(nonprofit_distribution(&pop, 1.0, &BurdenShares::default(), &split).is_err());
    }
}
