//! State and local government response to a change in corporate equity
//! income

use crate::assumptions::{BurdenShares, StateLocalSplit};
use crate::distribution::measures::state_taxes;
use crate::error::DistResult;
use crate::population::{fields, Scenario};

use super::allocate;

/// Per-unit changes from the state and local share
#[derive(Debug, Clone, PartialEq)]
pub struct StateLocalChanges {
    pub benefits: Vec<f64>,
    pub compensation: Vec<f64>,
    /// Change in state and local taxes paid
    pub taxes: Vec<f64>,
}

/// Split the state and local share of `ctax_change` (positive for a tax
/// hike) into benefits, compensation and taxes
pub fn state_local_distribution(
    scenario: &dyn Scenario,
    ctax_change: f64,
    burden: &BurdenShares,
    split: &StateLocalSplit,
) -> DistResult<StateLocalChanges> {
    split.validate()?;
    let total = -ctax_change * burden.state_local;
    let weight = scenario.field(fields::WEIGHT)?;

    Ok(StateLocalChanges {
        benefits: allocate(
            total * split.benefits,
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
        taxes: allocate(total * split.taxes, &state_taxes(scenario)?, &weight, "state taxes")?,
    })
}
