//! Corporate tax incidence assumptions

use serde::{Deserialize, Serialize};

use crate::error::{DistError, DistResult};

/// Published shares are rounded to nine decimal places
const SPLIT_TOLERANCE: f64 = 1e-6;

/// Share of a corporate tax change borne by each owner class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BurdenShares {
    pub household: f64,
    pub nonprofit: f64,
    pub federal: f64,
    pub state_local: f64,
    pub rest_of_world: f64,
}

impl Default for BurdenShares {
    fn default() -> Self {
        Self {
            household: 0.668920896,
            nonprofit: 0.047345087,
            federal: 0.001261413,
            state_local: 0.085778364,
            rest_of_world: 0.196694239,
        }
    }
}

impl BurdenShares {
    pub fn validate(&self) -> DistResult<()> {
        check_split(
            "burden shares",
            &[
                self.household,
                self.nonprofit,
                self.federal,
                self.state_local,
                self.rest_of_world,
            ],
        )
    }
}

/// How nonprofits pass through a change in their equity income
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NonprofitSplit {
    /// Services, distributed like government benefits
    pub services: f64,
    /// Employee compensation, distributed like wages
    pub compensation: f64,
    /// Donors, distributed like charitable giving
    pub donors: f64,
    /// Foreign aid, not distributed
    pub foreign: f64,
}

impl Default for NonprofitSplit {
    fn default() -> Self {
        Self {
            services: 0.208,
            compensation: 0.78,
            donors: 0.0,
            foreign: 0.012,
        }
    }
}

impl NonprofitSplit {
    pub fn validate(&self) -> DistResult<()> {
        check_split(
            "nonprofit split",
            &[self.services, self.compensation, self.donors, self.foreign],
        )
    }
}

/// How state and local governments spend a change in their equity income
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateLocalSplit {
    /// Benefit spending, distributed like government benefits
    pub benefits: f64,
    /// Employee compensation, distributed like wages
    pub compensation: f64,
    /// Tax changes, distributed like state and local taxes
    pub taxes: f64,
}

impl Default for StateLocalSplit {
    fn default() -> Self {
        Self {
            benefits: 0.0,
            compensation: 1.0,
            taxes: 0.0,
        }
    }
}

impl StateLocalSplit {
    pub fn validate(&self) -> DistResult<()> {
        check_split(
            "state/local split",
            &[self.benefits, self.compensation, self.taxes],
        )
    }
}

/// Payout and realization assumptions for household equity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityParams {
    /// Share of corporate income paid out as dividends
    pub dividend_share: f64,
    /// Share of retained earnings realized as short-term gains
    pub short_term_gain_share: f64,
    /// Share of retained earnings realized as long-term gains;
    /// the remainder is held until death
    pub long_term_gain_share: f64,
}

impl Default for EquityParams {
    fn default() -> Self {
        Self {
            dividend_share: 0.44,
            short_term_gain_share: 0.034,
            long_term_gain_share: 0.496,
        }
    }
}

impl EquityParams {
    pub fn validate(&self) -> DistResult<()> {
        if !(0.0..=1.0).contains(&self.dividend_share) {
            return Err(DistError::invalid(format!(
                "dividend share {} is outside [0, 1]",
                self.dividend_share
            )));
        }
        let gains = [self.short_term_gain_share, self.long_term_gain_share];
        if gains.iter().any(|&g| g < 0.0) || gains.iter().sum::<f64>() > 1.0 + SPLIT_TOLERANCE {
            return Err(DistError::invalid(format!(
                "capital gain split {:?} must be non-negative and sum to at most 1",
                gains
            )));
        }
        Ok(())
    }

    /// Share of retained earnings never realized
    pub fn unrealized_share(&self) -> f64 {
        1.0 - self.short_term_gain_share - self.long_term_gain_share
    }
}

fn check_split(what: &str, parts: &[f64]) -> DistResult<()> {
    if parts.iter().any(|&p| p < 0.0) {
        return Err(DistError::invalid(format!("{} has a negative part: {:?}", what, parts)));
    }
    let total: f64 = parts.iter().sum();
    if (total - 1.0).abs() > SPLIT_TOLERANCE {
        return Err(DistError::invalid(format!("{} sums to {}, not 1", what, total)));
    }
    Ok(())
}
