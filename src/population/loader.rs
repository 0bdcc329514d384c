//! Load a population scenario from a unit-record CSV
//!
//! One row per filing unit, one column per field. Columns named
//! `mtr_<field>` hold the marginal rate with respect to `<field>`.

use std::io::Read;
use std::path::Path;

use csv::Reader;
use log::debug;

use super::{Population, Scenario};
use crate::error::{DistError, DistResult};

/// Prefix marking marginal-rate columns
pub const MTR_PREFIX: &str = "mtr_";

/// Load a population from a CSV file
pub fn load_population<P: AsRef<Path>>(path: P) -> DistResult<Population> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let population = load_population_from_reader(file)?;
    debug!("loaded {} units from {}", population.len(), path.display());
    Ok(population)
}

/// Load a population from any reader (e.g., string buffer)
pub fn load_population_from_reader<R: Read>(reader: R) -> DistResult<Population> {
    let mut csv_reader = Reader::from_reader(reader);
    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); headers.len()];

    for (row, result) in csv_reader.records().enumerate() {
        let record = result?;
        DistError::check_len(&format!("csv row {}", row + 1), headers.len(), record.len())?;
        for (col, raw) in record.iter().enumerate() {
            let value: f64 = raw.trim().parse().map_err(|_| {
                DistError::invalid(format!(
                    "row {} column `{}`: `{}` is not a number",
                    row + 1,
                    headers[col],
                    raw
                ))
            })?;
            columns[col].push(value);
        }
    }

    let units = columns.first().map(Vec::len).unwrap_or(0);
    let mut population = Population::new(units);
    for (name, values) in headers.iter().zip(columns) {
        population = match name.strip_prefix(MTR_PREFIX) {
            Some(field) => population.with_marginal_rate(field, values)?,
            None => population.with_field(name, values)?,
        };
    }

    Ok(population)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_reader() {
        let data = "s006,expanded_income,mtr_e00200p\n1.5,100,0.25\n2.0,-50,0.1\n";
        let pop = load_population_from_reader(data.as_bytes()).unwrap();

        assert_eq!(pop.len(), 2);
        assert_eq!(pop.field("s006").unwrap(), vec![1.5, 2.0]);
        assert_eq!(pop.field("expanded_income").unwrap(), vec![100.0, -50.0]);
        assert_eq!(pop.marginal_rate("e00200p").unwrap(), vec![0.25, 0.1]);
        assert!(!pop.has_field("mtr_e00200p"));
    }

    #[test]
    fn test_non_numeric_cell_rejected() {
        let data = "s006,MARS\n1.0,single\n";
        let err = load_population_from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, DistError::InvalidArgument(_)));
        assert!(err.to_string().contains("MARS"));
    }

    #[test]
    fn test_header_only_is_empty_population() {
        let pop = load_population_from_reader("s006,iitax\n".as_bytes()).unwrap();
        assert!(pop.is_empty());
    }
}
