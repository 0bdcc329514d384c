//! Analysis runner for standard table sets
//!
//! Holds one set of assumptions and builds the usual tables for one scenario
//! pair or many (one per year) without re-reading configuration.

use log::info;
use rayon::prelude::*;

use crate::assumptions::{Assumptions, ChildScreen, Screen, StatusScreen};
use crate::error::DistResult;
use crate::population::ScenarioPair;
use crate::tables::{
    avg_rate_sensitivity, change_table, demographic_table, kakwani_sensitivity, level_table,
    DistTable, SensitivityVariant,
};

/// Demographic subgroups reported by default, with file-friendly names
const DEMOGRAPHIC_SCREENS: [(&str, Screen); 6] = [
    ("married", Screen::new(StatusScreen::Married, ChildScreen::Any)),
    ("notmarried", Screen::new(StatusScreen::NotMarried, ChildScreen::Any)),
    ("nokids", Screen::new(StatusScreen::Any, ChildScreen::Zero)),
    ("1kid", Screen::new(StatusScreen::Any, ChildScreen::One)),
    ("2kids", Screen::new(StatusScreen::Any, ChildScreen::Two)),
    ("3pluskids", Screen::new(StatusScreen::Any, ChildScreen::ThreePlus)),
];

/// Level and change tables for one scenario pair
#[derive(Debug, Clone, PartialEq)]
pub struct StandardTables {
    pub level: DistTable,
    pub change: DistTable,
}

/// Runner with pre-loaded assumptions
///
/// # Example
/// ```ignore
/// let runner = AnalysisRunner::preferred();
/// let pair = ScenarioPair::new(&baseline, &reform)?;
/// let tables = runner.level_and_change(pair)?;
/// tables.change.write_csv(Path::new("change.csv"))?;
/// ```
#[derive(Debug, Clone)]
pub struct AnalysisRunner {
    assumptions: Assumptions,
}

impl AnalysisRunner {
    pub fn new(assumptions: Assumptions) -> Self {
        Self { assumptions }
    }

    /// Runner with the preferred assumptions
    pub fn preferred() -> Self {
        Self::new(Assumptions::preferred())
    }

    /// Level and change tables under the runner's options
    pub fn level_and_change(&self, pair: ScenarioPair<'_>) -> DistResult<StandardTables> {
        let options = &self.assumptions.options;
        Ok(StandardTables {
            level: level_table(pair, options)?,
            change: change_table(pair, options)?,
        })
    }

    /// Standard tables for independent pairs, in input order
    pub fn run_years(
        &self,
        pairs: &[(i32, ScenarioPair<'_>)],
    ) -> DistResult<Vec<(i32, StandardTables)>> {
        info!("running standard tables for {} years", pairs.len());
        pairs
            .par_iter()
            .map(|(year, pair)| Ok((*year, self.level_and_change(*pair)?)))
            .collect()
    }

    /// Average-rate sensitivity tables, keyed by what is varied
    pub fn sensitivity_tables(&self, pair: ScenarioPair<'_>) -> DistResult<Vec<(String, DistTable)>> {
        let base = &self.assumptions.options;
        let groups = [
            ("equivalence", SensitivityVariant::equivalence_scales(base)),
            ("weighting", SensitivityVariant::weighting(base)),
            ("income", SensitivityVariant::income_measures(base)),
            ("excluded", SensitivityVariant::exclusions(base)),
        ];
        groups
            .iter()
            .map(|(name, variants)| Ok((name.to_string(), avg_rate_sensitivity(pair, variants)?)))
            .collect()
    }

    /// One demographic table per default subgroup, using the runner's
    /// exclusions
    pub fn demographic_tables(&self, pair: ScenarioPair<'_>) -> DistResult<Vec<(String, DistTable)>> {
        let exclude = &self.assumptions.options.exclude;
        DEMOGRAPHIC_SCREENS
            .par_iter()
            .map(|(name, screen)| Ok((name.to_string(), demographic_table(pair, exclude, *screen)?)))
            .collect()
    }

    /// Kakwani index sensitivity across years
    pub fn kakwani_table(&self, pairs: &[(i32, ScenarioPair<'_>)]) -> DistResult<DistTable> {
        let variants = SensitivityVariant::kakwani_variants(&self.assumptions.options);
        kakwani_sensitivity(pairs, &variants)
    }

    pub fn assumptions(&self) -> &Assumptions {
        &self.assumptions
    }

    pub fn assumptions_mut(&mut self) -> &mut Assumptions {
        &mut self.assumptions
    }
}

impl Default for AnalysisRunner {
    fn default() -> Self {
        Self::preferred()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::individual::tests::twenty_units;

    #[test]
    fn test_run_years_keeps_order() {
        let (base, reform) = twenty_units();
        let pair = ScenarioPair::new(&base, &reform).unwrap();
        let runner = AnalysisRunner::preferred();

        let results = runner
            .run_years(&[(2020, pair), (2018, pair), (2019, pair)])
            .unwrap();
        let years: Vec<i32> = results.iter().map(|(y, _)| *y).collect();
        assert_eq!(years, vec![2020, 2018, 2019]);

        // NaN cells compare unequal, so compare the printed tables
        let single = runner.level_and_change(pair).unwrap();
        assert_eq!(format!("{:?}", results[1].1), format!("{:?}", single));
    }

    #[test]
    fn test_demographic_tables_cover_default_screens() {
        let (base, reform) = twenty_units();
        let pair = ScenarioPair::new(&base, &reform).unwrap();
        let tables = AnalysisRunner::default().demographic_tables(pair).unwrap();
        let names: Vec<&str> = tables.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["married", "notmarried", "nokids", "1kid", "2kids", "3pluskids"]);
    }

    #[test]
    fn test_assumptions_can_be_customized() {
        let mut runner = AnalysisRunner::preferred();
        runner.assumptions_mut().options.exclude.clear();
        assert!(runner.assumptions().options.exclude.is_empty());
    }
}
