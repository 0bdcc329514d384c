//! Filing-unit populations and the scenario capability the analysis reads from

mod data;
pub mod fields;
pub mod loader;

pub use data::{FilingStatus, Population, Scenario, ScenarioPair};
pub use loader::{load_population, load_population_from_reader};
