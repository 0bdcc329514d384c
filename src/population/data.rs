//! Scenario capability and the in-memory population it is usually backed by

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{DistError, DistResult};

/// Read-only view of one policy scenario over a fixed population of units.
///
/// Implementations adapt an external microsimulation engine that has already
/// been advanced to the year of interest. Every array returned for the same
/// scenario has length [`Scenario::len`], and unit `i` is the same filing unit
/// in every array and in the paired scenario.
pub trait Scenario: Send + Sync {
    /// Number of units in the population
    fn len(&self) -> usize;

    /// Whether the population has no units
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Per-unit values of a named field
    fn array(&self, name: &str) -> DistResult<Vec<f64>>;

    /// Per-unit combined marginal tax rate with respect to a named field,
    /// holding everything else fixed
    fn mtr(&self, name: &str) -> DistResult<Vec<f64>>;

    /// [`Scenario::array`] with the unit count verified
    fn field(&self, name: &str) -> DistResult<Vec<f64>> {
        let values = self.array(name)?;
        DistError::check_len(name, self.len(), values.len())?;
        Ok(values)
    }

    /// [`Scenario::mtr`] with the unit count verified
    fn marginal_rate(&self, name: &str) -> DistResult<Vec<f64>> {
        let values = self.mtr(name)?;
        DistError::check_len(name, self.len(), values.len())?;
        Ok(values)
    }
}

/// Baseline and reform scenarios over the same units in the same order
#[derive(Clone, Copy)]
pub struct ScenarioPair<'a> {
    pub baseline: &'a dyn Scenario,
    pub reform: &'a dyn Scenario,
}

impl<'a> ScenarioPair<'a> {
    /// Pair two scenarios, rejecting populations of different size
    pub fn new(baseline: &'a dyn Scenario, reform: &'a dyn Scenario) -> DistResult<Self> {
        DistError::check_len("reform population", baseline.len(), reform.len())?;
        Ok(Self { baseline, reform })
    }

    /// Number of units in either scenario
    pub fn len(&self) -> usize {
        self.baseline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.baseline.is_empty()
    }
}

impl std::fmt::Debug for ScenarioPair<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScenarioPair").field("units", &self.len()).finish()
    }
}

/// Filing status (MARS code)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilingStatus {
    Single,
    Joint,
    Separate,
    HeadOfHousehold,
    Widow,
}

impl FilingStatus {
    /// Decode a MARS value; anything outside 1..=5 is unknown
    pub fn from_code(code: f64) -> Option<Self> {
        match code as i64 {
            1 => Some(FilingStatus::Single),
            2 => Some(FilingStatus::Joint),
            3 => Some(FilingStatus::Separate),
            4 => Some(FilingStatus::HeadOfHousehold),
            5 => Some(FilingStatus::Widow),
            _ => None,
        }
    }

    pub fn code(&self) -> f64 {
        match self {
            FilingStatus::Single => 1.0,
            FilingStatus::Joint => 2.0,
            FilingStatus::Separate => 3.0,
            FilingStatus::HeadOfHousehold => 4.0,
            FilingStatus::Widow => 5.0,
        }
    }
}

/// Fully materialized scenario: named per-unit fields plus marginal rates.
///
/// Used for populations loaded from CSV and for synthetic test fixtures.
#[derive(Debug, Clone, Default)]
pub struct Population {
    units: usize,
    fields: HashMap<String, Vec<f64>>,
    marginal_rates: HashMap<String, Vec<f64>>,
}

impl Population {
    /// Empty field table for `units` units
    pub fn new(units: usize) -> Self {
        Self {
            units,
            fields: HashMap::new(),
            marginal_rates: HashMap::new(),
        }
    }

    /// Add or replace a field
    pub fn with_field(mut self, name: &str, values: Vec<f64>) -> DistResult<Self> {
        self.set_field(name, values)?;
        Ok(self)
    }

    /// Add or replace the marginal rate with respect to a field
    pub fn with_marginal_rate(mut self, name: &str, values: Vec<f64>) -> DistResult<Self> {
        DistError::check_len(name, self.units, values.len())?;
        self.marginal_rates.insert(name.to_string(), values);
        Ok(self)
    }

    pub fn set_field(&mut self, name: &str, values: Vec<f64>) -> DistResult<()> {
        DistError::check_len(name, self.units, values.len())?;
        self.fields.insert(name.to_string(), values);
        Ok(())
    }

    /// Add `delta` element-wise to a field, creating it at zero if absent
    pub fn increment_field(&mut self, name: &str, delta: &[f64]) -> DistResult<()> {
        DistError::check_len(name, self.units, delta.len())?;
        let units = self.units;
        let values = self
            .fields
            .entry(name.to_string())
            .or_insert_with(|| vec![0.0; units]);
        for (v, d) in values.iter_mut().zip(delta) {
            *v += d;
        }
        Ok(())
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Field names in sorted order
    pub fn field_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.fields.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Scenario for Population {
    fn len(&self) -> usize {
        self.units
    }

    fn array(&self, name: &str) -> DistResult<Vec<f64>> {
        self.fields
            .get(name)
            .cloned()
            .ok_or_else(|| DistError::UnknownField(name.to_string()))
    }

    fn mtr(&self, name: &str) -> DistResult<Vec<f64>> {
        self.marginal_rates
            .get(name)
            .cloned()
            .ok_or_else(|| DistError::UnknownField(format!("marginal rate for {}", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_population_lookup() {
        let pop = Population::new(3)
            .with_field("s006", vec![1.0, 2.0, 3.0])
            .unwrap()
            .with_marginal_rate("e00200p", vec![0.1, 0.2, 0.3])
            .unwrap();

        assert_eq!(pop.len(), 3);
        assert_eq!(pop.field("s006").unwrap(), vec![1.0, 2.0, 3.0]);
        assert_eq!(pop.marginal_rate("e00200p").unwrap()[2], 0.3);
        assert!(matches!(pop.field("iitax"), Err(DistError::UnknownField(_))));
    }

    #[test]
    fn test_field_length_checked() {
        let result = Population::new(3).with_field("s006", vec![1.0, 2.0]);
        assert!(matches!(result, Err(DistError::ShapeMismatch { expected: 3, actual: 2, .. })));
    }

    #[test]
    fn test_increment_creates_missing_field() {
        let mut pop = Population::new(2).with_field("e00200", vec![100.0, 200.0]).unwrap();
        pop.increment_field("e00200", &[1.0, -1.0]).unwrap();
        pop.increment_field("e00400", &[5.0, 6.0]).unwrap();

        assert_eq!(pop.field("e00200").unwrap(), vec![101.0, 199.0]);
        assert_eq!(pop.field("e00400").unwrap(), vec![5.0, 6.0]);
        assert_eq!(pop.field_names(), vec!["e00200", "e00400"]);
    }

    #[test]
    fn test_pair_rejects_unequal_populations() {
        let a = Population::new(3);
        let b = Population::new(4);
        let err = ScenarioPair::new(&a, &b).unwrap_err();
        assert!(matches!(err, DistError::ShapeMismatch { expected: 3, actual: 4, .. }));
    }

    #[test]
    fn test_filing_status_codes() {
        for status in [
            FilingStatus::Single,
            FilingStatus::Joint,
            FilingStatus::Separate,
            FilingStatus::HeadOfHousehold,
            FilingStatus::Widow,
        ] {
            assert_eq!(FilingStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(FilingStatus::from_code(0.0), None);
    }
}
