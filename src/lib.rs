//! Incidence Analysis - distributional analysis of tax policy changes
//!
//! This library provides:
//! - Ranking of filing units by equivalence-scaled income with exclusions
//!   and demographic screens
//! - Aggregation of tax and income changes over decile and top-income groups
//! - Level, change, demographic and sensitivity tables plus the Kakwani index
//! - Corporate tax incidence split among households, nonprofits and
//!   state and local governments
//! - Equity ownership imputation from survey group statistics

pub mod assumptions;
pub mod business;
pub mod distribution;
pub mod equity;
pub mod error;
pub mod population;
pub mod runner;
pub mod tables;

// Re-export commonly used types
pub use assumptions::{AnalysisOptions, Assumptions, ChangeType, IncomeMeasure, Measure};
pub use distribution::{dist_table, kakwani, BinScheme};
pub use error::{DistError, DistResult};
pub use population::{load_population, Population, Scenario, ScenarioPair};
pub use runner::{AnalysisRunner, StandardTables};
pub use tables::DistTable;
