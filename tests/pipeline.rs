//! CSV populations through the runner to written tables

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use incidence_analysis::{load_population, AnalysisRunner, ScenarioPair};
use tempfile::tempdir;

const UNITS: usize = 40;
const HEADER: &str = "s006,expanded_income,c00100,aftertax_income,combined,iitax,XTOT,nu18,MARS,benefit_value_total,e00700";

/// Forty single filers with incomes of $2,500 steps and a 12% tax. The
/// reform cuts tax by $100 for the bottom half.
fn population_csv(reform: bool) -> String {
    let mut text = String::from(HEADER);
    text.push('\n');
    for i in 0..UNITS {
        let income = 2_500.0 * (i + 1) as f64;
        let mut tax = 0.12 * income;
        if reform && i < UNITS / 2 {
            tax -= 100.0;
        }
        let benefits = if i < 10 { 1_000.0 } else { 0.0 };
        writeln!(
            text,
            "1.5,{},{},{},{},{},1,0,1,{},0",
            income,
            income - benefits,
            income - tax,
            tax,
            tax * 0.8,
            benefits
        )
        .unwrap();
    }
    text
}

fn write_population(dir: &Path, name: &str, reform: bool) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, population_csv(reform)).unwrap();
    path
}

#[test]
fn test_tables_from_csv() {
    let dir = tempdir().unwrap();
    let baseline = load_population(write_population(dir.path(), "pre.csv", false)).unwrap();
    let reform = load_population(write_population(dir.path(), "post.csv", true)).unwrap();
    let pair = ScenarioPair::new(&baseline, &reform).unwrap();

    let runner = AnalysisRunner::preferred();
    let tables = runner.level_and_change(pair).unwrap();

    let avg = tables
        .change
        .get("All units", "Average tax change ($)")
        .unwrap();
    assert!((avg + 50.0).abs() < 1e-9);
    let cut = tables
        .change
        .get("All units", "Share receiving tax cut (%)")
        .unwrap();
    assert!((cut - 50.0).abs() < 1e-9);
    // the top half gets nothing
    assert_eq!(tables.change.get("Top 1%", "Average tax change ($)"), Some(0.0));

    let out = dir.path().join("change.csv");
    tables.change.write_csv(&out).unwrap();
    let written = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 14);
    assert!(lines[0].starts_with("Income group,Change in after-tax income (%)"));
    assert!(lines[13].starts_with("All units,"));
}

#[test]
fn test_kakwani_table_from_csv() {
    let dir = tempdir().unwrap();
    let baseline = load_population(write_population(dir.path(), "pre.csv", false)).unwrap();
    let reform = load_population(write_population(dir.path(), "post.csv", true)).unwrap();
    let pair = ScenarioPair::new(&baseline, &reform).unwrap();

    let table = AnalysisRunner::preferred()
        .kakwani_table(&[(2018, pair), (2020, pair)])
        .unwrap();
    assert_eq!(table.column_names(), vec!["2018", "2020"]);
    assert_eq!(table.rows.len(), 13);

    // a cut concentrated at the bottom is progressive
    let main = table.get("Main estimates", "2018").unwrap();
    assert!(main > 0.0);
    assert_eq!(table.get("Main estimates", "2020"), Some(main));
}

#[test]
fn test_mismatched_populations_rejected() {
    let baseline = load_population_from_text(&population_csv(false));
    let mut short = population_csv(true);
    let cut = short.trim_end().rfind('\n').unwrap();
    short.truncate(cut + 1);
    let reform = load_population_from_text(&short);
    assert!(ScenarioPair::new(&baseline, &reform).is_err());
}

fn load_population_from_text(text: &str) -> incidence_analysis::Population {
    incidence_analysis::population::load_population_from_reader(text.as_bytes()).unwrap()
}
