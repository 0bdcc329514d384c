//! Equity ownership imputation
//!
//! Tax data show equity only through the income it pays. Units are put in
//! the same age and income groups as the survey, then given the expected
//! equity of their group: the typical holding when equity income is
//! observed, and the ownership-weighted mean when it is not.

pub mod growth;
pub mod grouping;
pub mod imputation;

pub use growth::advance_equity;
pub use grouping::{
    assign_group, comparable_income, identify_other_assetholders, identify_stockholders,
    scenario_groups, GroupId,
};
pub use imputation::{
    impute_equity, impute_other_assets, load_group_stats, load_group_stats_from_reader,
    observed_holder_fractions, GroupImputation, GroupStats, ImputationTable,
};
