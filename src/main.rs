//! Incidence Analysis CLI
//!
//! Loads a baseline and a reform population from CSV and writes
//! distributional tables as CSV files.
//!
//! ```bash
//! incidence-analysis --baseline pre.csv --reform post.csv tables
//! incidence-analysis --baseline pre.csv --reform post.csv --out-dir out kakwani --year 2018
//! incidence-analysis --baseline pre.csv --reform post.csv business \
//!     --group-stats scf_groups.csv --ctax -100000000 --year 2018
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use incidence_analysis::business::full_comparison_table;
use incidence_analysis::equity::{impute_equity, load_group_stats, observed_holder_fractions};
use incidence_analysis::tables::{
    equity_distribution_table, nonprofit_shape_table, state_local_shape_table,
};
use incidence_analysis::{load_population, AnalysisRunner, Assumptions, DistTable, ScenarioPair};

#[derive(Parser, Debug)]
#[command(name = "incidence-analysis")]
#[command(about = "Distributional analysis of tax policy changes")]
#[command(version)]
struct Args {
    /// Baseline population CSV
    #[arg(long)]
    baseline: PathBuf,

    /// Reform population CSV (same units, same order)
    #[arg(long)]
    reform: PathBuf,

    /// Assumptions JSON; preferred choices when omitted
    #[arg(long)]
    assumptions: Option<PathBuf>,

    /// Directory for output tables
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Level and change tables
    Tables,
    /// Kakwani index sensitivity
    Kakwani {
        /// Column label for the pair
        #[arg(long, default_value_t = 2018)]
        year: i32,
    },
    /// Demographic subgroup tables
    Demog,
    /// Average-rate sensitivity tables
    Sensitivity,
    /// Corporate tax incidence tables
    Business {
        /// Survey group statistics CSV
        #[arg(long)]
        group_stats: PathBuf,
        /// Change in corporate tax liability, positive for a hike
        #[arg(long, allow_hyphen_values = true)]
        ctax: f64,
        #[arg(long, default_value_t = 2018)]
        year: i32,
    },
}

fn write_table(dir: &Path, name: &str, table: &DistTable) -> Result<()> {
    let path = dir.join(format!("{}.csv", name));
    table
        .write_csv(&path)
        .with_context(|| format!("writing {}", path.display()))?;
    info!("wrote {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let assumptions = match &args.assumptions {
        Some(path) => Assumptions::from_json_path(path)
            .with_context(|| format!("loading assumptions from {}", path.display()))?,
        None => Assumptions::preferred(),
    };
    let baseline = load_population(&args.baseline)
        .with_context(|| format!("loading baseline {}", args.baseline.display()))?;
    let reform = load_population(&args.reform)
        .with_context(|| format!("loading reform {}", args.reform.display()))?;
    let pair = ScenarioPair::new(&baseline, &reform)?;

    fs::create_dir_all(&args.out_dir)?;
    let out = args.out_dir.as_path();
    let runner = AnalysisRunner::new(assumptions);

    match args.command {
        Command::Tables => {
            let tables = runner.level_and_change(pair)?;
            write_table(out, "level", &tables.level)?;
            write_table(out, "change", &tables.change)?;
        }
        Command::Kakwani { year } => {
            let table = runner.kakwani_table(&[(year, pair)])?;
            write_table(out, "kakwani", &table)?;
        }
        Command::Demog => {
            for (name, table) in runner.demographic_tables(pair)? {
                write_table(out, &format!("demog_{}", name), &table)?;
            }
        }
        Command::Sensitivity => {
            for (name, table) in runner.sensitivity_tables(pair)? {
                write_table(out, &format!("sensitivity_{}", name), &table)?;
            }
        }
        Command::Business {
            group_stats,
            ctax,
            year,
        } => {
            let assumptions = runner.assumptions();
            let stats = load_group_stats(&group_stats)
                .with_context(|| format!("loading group statistics {}", group_stats.display()))?;
            let imputation = observed_holder_fractions(&baseline, &stats)?;
            let holdings = impute_equity(&baseline, &imputation)?;

            write_table(
                out,
                "equity_distribution",
                &equity_distribution_table(
                    &baseline,
                    &holdings.equity,
                    &holdings.direct_share,
                    &assumptions.options,
                )?,
            )?;
            write_table(out, "nonprofit_shape", &nonprofit_shape_table(pair, assumptions, false)?)?;
            write_table(
                out,
                "nonprofit_shape_after_tax",
                &nonprofit_shape_table(pair, assumptions, true)?,
            )?;
            write_table(
                out,
                "state_local_shape",
                &state_local_shape_table(pair, &assumptions.options)?,
            )?;

            let ctax_by_year: BTreeMap<i32, f64> = [(year, ctax)].into_iter().collect();
            let table = full_comparison_table(
                &baseline,
                &reform,
                year,
                &ctax_by_year,
                &holdings,
                assumptions,
            )?;
            write_table(out, &format!("full_comparison_{}", year), &table)?;
        }
    }

    Ok(())
}
