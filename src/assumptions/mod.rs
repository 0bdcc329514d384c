//! Analysis assumptions: distributional options and incidence splits

mod incidence;
mod options;

pub use incidence::{BurdenShares, EquityParams, NonprofitSplit, StateLocalSplit};
pub use options::{
    AnalysisOptions, ChangeType, ChildScreen, EquivalenceScale, Exclusion, IncomeMeasure, Measure,
    Screen, StatusScreen,
};

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DistResult;

/// Container for all analysis assumptions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assumptions {
    /// Ranking, weighting, exclusion and screen choices
    #[serde(default)]
    pub options: AnalysisOptions,

    #[serde(default)]
    pub burden: BurdenShares,

    #[serde(default)]
    pub nonprofit_split: NonprofitSplit,

    #[serde(default)]
    pub state_local_split: StateLocalSplit,

    #[serde(default)]
    pub equity: EquityParams,
}

impl Assumptions {
    /// Preferred published choices
    pub fn preferred() -> Self {
        Self {
            options: AnalysisOptions::preferred(),
            burden: BurdenShares::default(),
            nonprofit_split: NonprofitSplit::default(),
            state_local_split: StateLocalSplit::default(),
            equity: EquityParams::default(),
        }
    }

    /// Load assumptions from a JSON file; missing sections take preferred values
    pub fn from_json_path(path: &Path) -> DistResult<Self> {
        let reader = BufReader::new(File::open(path)?);
        let assumptions: Self = serde_json::from_reader(reader)?;
        assumptions.validate()?;
        Ok(assumptions)
    }

    /// Parse assumptions from a JSON string
    pub fn from_json_str(json: &str) -> DistResult<Self> {
        let assumptions: Self = serde_json::from_str(json)?;
        assumptions.validate()?;
        Ok(assumptions)
    }

    pub fn validate(&self) -> DistResult<()> {
        self.options.validate()?;
        self.burden.validate()?;
        self.nonprofit_split.validate()?;
        self.state_local_split.validate()?;
        self.equity.validate()
    }
}

impl Default for Assumptions {
    fn default() -> Self {
        Self::preferred()
    }
}
