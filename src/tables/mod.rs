//! Labelled output tables and the builders that fill them

mod business;
pub(crate) mod individual;

pub use business::{equity_distribution_table, nonprofit_shape_table, state_local_shape_table};
pub use individual::{
    avg_rate_columns, avg_rate_sensitivity, change_table, demographic_table, kakwani_sensitivity,
    level_table, SensitivityVariant,
};

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::distribution::BinScheme;
use crate::error::{DistError, DistResult};

/// Row-labelled table of named numeric columns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistTable {
    /// Header of the label column
    pub group_header: String,
    pub rows: Vec<String>,
    pub columns: Vec<(String, Vec<f64>)>,
}

impl DistTable {
    /// Empty table with the given row labels
    pub fn new(group_header: &str, rows: Vec<String>) -> Self {
        Self {
            group_header: group_header.to_string(),
            rows,
            columns: Vec::new(),
        }
    }

    /// Empty table labelled by the groups of `scheme` plus "All units"
    pub fn for_scheme(scheme: &BinScheme) -> Self {
        Self::new("Income group", scheme.labels())
    }

    /// Append a column; its length must match the row count
    pub fn push_column(&mut self, name: &str, values: Vec<f64>) -> DistResult<()> {
        DistError::check_len(name, self.rows.len(), values.len())?;
        self.columns.push((name.to_string(), values));
        Ok(())
    }

    pub fn with_column(mut self, name: &str, values: Vec<f64>) -> DistResult<Self> {
        self.push_column(name, values)?;
        Ok(self)
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    /// Value at a row label and column name
    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        let r = self.rows.iter().position(|l| l == row)?;
        self.column(column).map(|c| c[r])
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Write as CSV with a header row
    pub fn write_to<W: Write>(&self, writer: W) -> DistResult<()> {
        let mut wtr = csv::Writer::from_writer(writer);

        let mut header = vec![self.group_header.as_str()];
        header.extend(self.column_names());
        wtr.write_record(&header)?;

        for (r, label) in self.rows.iter().enumerate() {
            let mut record = vec![label.clone()];
            record.extend(self.columns.iter().map(|(_, v)| v[r].to_string()));
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn write_csv(&self, path: &Path) -> DistResult<()> {
        let file = File::create(path)?;
        self.write_to(file)
    }
}

/// Element-wise `a / b * scale`
pub(crate) fn scaled_ratio(a: &[f64], b: &[f64], scale: f64) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| x / y * scale).collect()
}

/// Each entry divided by the last (the all-units slot)
pub(crate) fn share_of_total(values: &[f64], scale: f64) -> Vec<f64> {
    let total = values.last().copied().unwrap_or(f64::NAN);
    values.iter().map(|v| v / total * scale).collect()
}
