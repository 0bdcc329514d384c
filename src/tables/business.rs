//! Shape tables for the corporate tax incidence channels

use log::info;

use crate::assumptions::{AnalysisOptions, Assumptions, ChangeType, IncomeMeasure, Measure};
use crate::distribution::{assign_bins, dist_table, order_units, BinScheme, RankingInputs};
use crate::error::{DistError, DistResult};
use crate::population::{fields, Scenario, ScenarioPair};

use super::{share_of_total, DistTable};

fn baseline_totals(
    pair: ScenarioPair<'_>,
    measure: Measure,
    options: &AnalysisOptions,
) -> DistResult<Vec<f64>> {
    dist_table(
        pair,
        &BinScheme::Standard,
        IncomeMeasure::Expanded,
        measure,
        ChangeType::Total1,
        options,
    )
}

/// Share of each nonprofit channel's base held by each income group.
///
/// With `after_tax` the compensation and giving bases are measured net of
/// the marginal tax rate on them.
pub fn nonprofit_shape_table(
    pair: ScenarioPair<'_>,
    assumptions: &Assumptions,
    after_tax: bool,
) -> DistResult<DistTable> {
    info!("building nonprofit shape table (after tax: {})", after_tax);
    let options = &assumptions.options;
    let (wages, giving) = if after_tax {
        (Measure::WagesAfter, Measure::CharityAfter)
    } else {
        (Measure::Wages, Measure::Charity)
    };

    let services = baseline_totals(pair, Measure::Benefits, options)?;
    let compensation = baseline_totals(pair, wages, options)?;
    let charity = baseline_totals(pair, giving, options)?;

    let split = &assumptions.nonprofit_split;
    let mix: Vec<f64> = services
        .iter()
        .zip(&compensation)
        .map(|(s, c)| split.services * s + split.compensation * c)
        .collect();

    let mut table = DistTable::for_scheme(&BinScheme::Standard)
        .with_column("Reduced services", share_of_total(&services, 1.0))?
        .with_column("Reduced compensation", share_of_total(&compensation, 1.0))?
        .with_column("More giving", share_of_total(&charity, 1.0))?
        .with_column("Preferred mix", share_of_total(&mix, 1.0))?;
    table.group_header = "Income groups".to_string();
    Ok(table)
}

/// Share of each state and local channel's base held by each income group
pub fn state_local_shape_table(
    pair: ScenarioPair<'_>,
    options: &AnalysisOptions,
) -> DistResult<DistTable> {
    info!("building state/local shape table");
    let benefits = baseline_totals(pair, Measure::Benefits, options)?;
    let wages = baseline_totals(pair, Measure::Wages, options)?;
    let taxes = baseline_totals(pair, Measure::StateTaxes, options)?;

    let mut table = DistTable::for_scheme(&BinScheme::Standard)
        .with_column("Increase Medicaid spending", share_of_total(&benefits, 1.0))?
        .with_column("Increase compensation", share_of_total(&wages, 1.0))?
        .with_column("Reduce taxes", share_of_total(&taxes, 1.0))?;
    table.group_header = "Income groups".to_string();
    Ok(table)
}

/// Share of equity, direct equity, dividends and dividends plus gains held
/// by each standard income group.
///
/// Shares are of the screened-in population, excluded units included in
/// the denominator, so there is no all-units row.
pub fn equity_distribution_table(
    scenario: &dyn Scenario,
    equity: &[f64],
    direct_share: &[f64],
    options: &AnalysisOptions,
) -> DistResult<DistTable> {
    let n = scenario.len();
    DistError::check_len("equity", n, equity.len())?;
    DistError::check_len("direct equity share", n, direct_share.len())?;
    info!("building equity distribution table for {} units", n);

    let dividends = scenario.field(fields::DIVIDENDS)?;
    let short_gains = scenario.field(fields::SHORT_TERM_GAINS)?;
    let long_gains = scenario.field(fields::LONG_TERM_GAINS)?;
    let columns = vec![
        equity.to_vec(),
        equity.iter().zip(direct_share).map(|(e, d)| e * d).collect(),
        dividends.clone(),
        (0..n).map(|i| dividends[i] + short_gains[i] + long_gains[i]).collect(),
    ];

    let inputs = RankingInputs::from_scenario(scenario, IncomeMeasure::Expanded, options)?;
    let ordered = order_units(&inputs, &columns)?;
    let scheme = BinScheme::Standard;
    let bins = assign_bins(&scheme, &ordered.cum_weight)?;
    let groups = scheme.bin_count();

    let mut labels = scheme.labels();
    labels.truncate(groups);
    let mut table = DistTable::new("Income group", labels);
    let names = ["Equity", "Direct equity", "Dividends", "Dividends + CapGains"];
    for (name, values) in names.iter().zip(&ordered.values) {
        let mut by_group = vec![0.0; groups];
        let mut total = 0.0;
        for ((v, w), bin) in values.iter().zip(&ordered.weight).zip(&bins) {
            total += v * w;
            if let Some(b) = bin {
                by_group[*b] += v * w;
            }
        }
        table.push_column(name, by_group.into_iter().map(|x| x / total).collect())?;
    }
    Ok(table)
}
