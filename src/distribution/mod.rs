//! Distributional engine: measures, ranking, filters, ordering, binning
//! and aggregation

pub mod aggregate;
pub mod bins;
pub mod filters;
pub mod kakwani;
pub mod measures;
pub mod prepare;
pub mod rank_scale;

pub use aggregate::{aggregate, dist_table};
pub use bins::{assign_bin, assign_bins, BinScheme, EXCLUDED, STANDARD_LABELS};
pub use filters::{get_exclude, get_screen};
pub use kakwani::{kakwani, KAKWANI_MEASURES};
pub use measures::{get_income, get_measures};
pub use prepare::{order_units, prepare, OrderedUnits, PreparedData, RankingInputs};
pub use rank_scale::get_rank_scale;
