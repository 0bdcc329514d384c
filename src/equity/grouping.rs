//! Age and income groups shared by the survey statistics and the tax units

use std::fmt;
use std::str::FromStr;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{DistError, DistResult};
use crate::population::{fields, Scenario};

/// Lower age bound of each band after the first
const AGE_CUTS: [f64; 5] = [35.0, 45.0, 55.0, 65.0, 75.0];

/// Cumulative weight shares separating income groups within an age band
const INCOME_CUTS: [f64; 7] = [0.2, 0.4, 0.6, 0.8, 0.9, 0.95, 0.99];

pub const AGE_BANDS: u8 = AGE_CUTS.len() as u8 + 1;
pub const INCOME_GROUPS: u8 = INCOME_CUTS.len() as u8 + 1;

/// Age band and income group within it, written `"<age>_<income>"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GroupId {
    pub age: u8,
    pub income: u8,
}

impl GroupId {
    pub fn new(age: u8, income: u8) -> DistResult<Self> {
        if age >= AGE_BANDS || income >= INCOME_GROUPS {
            return Err(DistError::invalid(format!(
                "group {}_{} is outside {} age bands and {} income groups",
                age, income, AGE_BANDS, INCOME_GROUPS
            )));
        }
        Ok(Self { age, income })
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.age, self.income)
    }
}

impl FromStr for GroupId {
    type Err = DistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |part: &str| part.trim().parse::<u8>().ok();
        match s.split_once('_').map(|(a, i)| (parse(a), parse(i))) {
            Some((Some(age), Some(income))) => GroupId::new(age, income),
            _ => Err(DistError::invalid(format!("`{}` is not a group id", s))),
        }
    }
}

impl TryFrom<String> for GroupId {
    type Error = DistError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<GroupId> for String {
    fn from(id: GroupId) -> String {
        id.to_string()
    }
}

fn age_band(age: f64) -> u8 {
    AGE_CUTS.iter().filter(|&&cut| age >= cut).count() as u8
}

/// Assign each unit to an age band and an income group within the band.
///
/// Income groups split each band's weighted income distribution at 20, 40,
/// 60, 80, 90, 95 and 99 percent; a unit moves up a group only once its
/// cumulative share is strictly above the cut. Within a band units are
/// ordered by income, then weight, then input position. The youngest
/// band's top percent is merged into the group below it.
pub fn assign_group(age: &[f64], income: &[f64], weight: &[f64]) -> DistResult<Vec<GroupId>> {
    let n = age.len();
    DistError::check_len("comparable income", n, income.len())?;
    DistError::check_len("weight", n, weight.len())?;
    if let Some(i) = weight.iter().position(|&w| w < 0.0 || w.is_nan()) {
        return Err(DistError::invalid(format!(
            "unit {} has invalid sampling weight {}",
            i, weight[i]
        )));
    }

    let bands: Vec<u8> = age.iter().map(|&a| age_band(a)).collect();
    let mut income_group = vec![0u8; n];

    for band in 0..AGE_BANDS {
        let mut members: Vec<usize> = (0..n).filter(|&i| bands[i] == band).collect();
        if members.is_empty() {
            continue;
        }
        members.sort_by(|&a, &b| {
            income[a]
                .total_cmp(&income[b])
                .then(weight[a].total_cmp(&weight[b]))
        });

        let total: f64 = members.iter().map(|&i| weight[i]).sum();
        if total <= 0.0 {
            warn!("age band {} has no weight; all units put in income group 0", band);
            continue;
        }
        let mut running = 0.0;
        for &i in &members {
            running += weight[i];
            let share = running / total;
            income_group[i] = INCOME_CUTS.iter().filter(|&&cut| share > cut).count() as u8;
        }
    }

    let top = INCOME_GROUPS - 1;
    Ok(bands
        .iter()
        .zip(&income_group)
        .map(|(&age, &inc)| GroupId {
            age,
            income: if age == 0 && inc == top { top - 1 } else { inc },
        })
        .collect())
}

/// Income measured the same way in the survey and the tax data
pub fn comparable_income(scenario: &dyn Scenario) -> DistResult<Vec<f64>> {
    let mut total = vec![0.0; scenario.len()];
    for name in fields::COMPARABLE_INCOME_PARTS {
        for (t, v) in total.iter_mut().zip(scenario.field(name)?) {
            *t += v;
        }
    }
    Ok(total)
}

/// Groups for every unit of a scenario, from head age and comparable income
pub fn scenario_groups(scenario: &dyn Scenario) -> DistResult<Vec<GroupId>> {
    assign_group(
        &scenario.field(fields::AGE_HEAD)?,
        &comparable_income(scenario)?,
        &scenario.field(fields::WEIGHT)?,
    )
}

fn any_nonzero(scenario: &dyn Scenario, names: &[&str]) -> DistResult<Vec<bool>> {
    let mut found = vec![false; scenario.len()];
    for name in names {
        for (f, v) in found.iter_mut().zip(scenario.field(name)?) {
            *f |= v != 0.0;
        }
    }
    Ok(found)
}

/// Units with observed equity income (dividends or capital gains)
pub fn identify_stockholders(scenario: &dyn Scenario) -> DistResult<Vec<bool>> {
    any_nonzero(
        scenario,
        &[fields::DIVIDENDS, fields::SHORT_TERM_GAINS, fields::LONG_TERM_GAINS],
    )
}

/// Units with observed interest income
pub fn identify_other_assetholders(scenario: &dyn Scenario) -> DistResult<Vec<bool>> {
    any_nonzero(scenario, &[fields::TAXABLE_INTEREST, fields::EXEMPT_INTEREST])
}
