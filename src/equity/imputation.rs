//! Impute equity and other financial assets to tax units from survey
//! group statistics

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use csv::Reader;
use log::{debug, info};
use serde::Deserialize;

use crate::business::EquityHoldings;
use crate::error::{DistError, DistResult};
use crate::population::{fields, Scenario};

use super::grouping::{identify_other_assetholders, identify_stockholders, scenario_groups, GroupId};

/// Survey statistics for one age and income group
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GroupStats {
    #[serde(rename = "groupid")]
    pub group: GroupId,
    /// Probability of holding equity
    pub prob_stock: f64,
    /// Mean of log equity among holders
    #[serde(rename = "m_equity")]
    pub log_equity_mean: f64,
    #[serde(rename = "s_equity")]
    pub log_equity_sd: f64,
    /// Share of equity held directly
    #[serde(rename = "deqshare")]
    pub direct_share: f64,
    #[serde(rename = "prob_oassets")]
    pub prob_other_assets: f64,
    #[serde(rename = "m_oassets")]
    pub log_other_mean: f64,
    #[serde(rename = "s_oassets")]
    pub log_other_sd: f64,
    /// Share of tax-preferred savings taxed on withdrawal
    #[serde(rename = "disttaxshare")]
    pub taxable_withdrawal_share: f64,
}

/// Load group statistics from a CSV file
pub fn load_group_stats<P: AsRef<Path>>(path: P) -> DistResult<Vec<GroupStats>> {
    let file = std::fs::File::open(path.as_ref())?;
    load_group_stats_from_reader(file)
}

pub fn load_group_stats_from_reader<R: Read>(reader: R) -> DistResult<Vec<GroupStats>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut stats = Vec::new();
    for result in csv_reader.deserialize() {
        let row: GroupStats = result?;
        stats.push(row);
    }
    debug!("loaded survey statistics for {} groups", stats.len());
    Ok(stats)
}

/// Group statistics with ownership probabilities for units whose
/// ownership is not visible in the tax data
#[derive(Debug, Clone, PartialEq)]
pub struct GroupImputation {
    pub stats: GroupStats,
    /// Weighted share of the group with equity income, capped at the
    /// survey probability
    pub observed_stock: f64,
    pub observed_other: f64,
    /// Probability of holding equity given no equity income
    pub unobserved_stock_prob: f64,
    pub unobserved_other_prob: f64,
}

pub type ImputationTable = BTreeMap<GroupId, GroupImputation>;

fn unobserved_probability(prob: f64, observed: f64) -> f64 {
    if observed >= 1.0 {
        return prob;
    }
    (prob - observed) / (1.0 - observed)
}

/// Condition each group's survey ownership probability on the units that
/// already show equity or interest income in `scenario`
pub fn observed_holder_fractions(
    scenario: &dyn Scenario,
    stats: &[GroupStats],
) -> DistResult<ImputationTable> {
    let groups = scenario_groups(scenario)?;
    let holders = identify_stockholders(scenario)?;
    let owners = identify_other_assetholders(scenario)?;
    let weight = scenario.field(fields::WEIGHT)?;

    // (total, with equity income, with interest income)
    let mut sums: BTreeMap<GroupId, (f64, f64, f64)> = BTreeMap::new();
    for i in 0..groups.len() {
        let entry = sums.entry(groups[i]).or_insert((0.0, 0.0, 0.0));
        entry.0 += weight[i];
        if holders[i] {
            entry.1 += weight[i];
        }
        if owners[i] {
            entry.2 += weight[i];
        }
    }

    let mut table = ImputationTable::new();
    for s in stats {
        let (total, stock, other) = sums.get(&s.group).copied().unwrap_or((0.0, 0.0, 0.0));
        let fraction = |part: f64| if total > 0.0 { part / total } else { 0.0 };
        let observed_stock = fraction(stock).min(s.prob_stock);
        let observed_other = fraction(other).min(s.prob_other_assets);
        table.insert(
            s.group,
            GroupImputation {
                stats: s.clone(),
                observed_stock,
                observed_other,
                unobserved_stock_prob: unobserved_probability(s.prob_stock, observed_stock),
                unobserved_other_prob: unobserved_probability(s.prob_other_assets, observed_other),
            },
        );
    }
    Ok(table)
}

fn lookup(table: &ImputationTable, group: GroupId) -> DistResult<&GroupImputation> {
    table
        .get(&group)
        .ok_or_else(|| DistError::invalid(format!("no survey statistics for group {}", group)))
}

/// Expected holding: the group's typical amount for observed holders,
/// otherwise the lognormal mean times the ownership probability
fn expected_holding(observed: bool, prob: f64, log_mean: f64, log_sd: f64) -> f64 {
    if observed {
        log_mean.exp()
    } else {
        prob * (log_mean + 0.5 * log_sd * log_sd).exp()
    }
}

/// Expected equity, direct share and taxable-withdrawal share per unit
pub fn impute_equity(scenario: &dyn Scenario, table: &ImputationTable) -> DistResult<EquityHoldings> {
    let groups = scenario_groups(scenario)?;
    let holders = identify_stockholders(scenario)?;

    let mut holdings = EquityHoldings {
        equity: Vec::with_capacity(groups.len()),
        direct_share: Vec::with_capacity(groups.len()),
        taxable_withdrawal_share: Vec::with_capacity(groups.len()),
    };
    for (&group, &holder) in groups.iter().zip(&holders) {
        let g = lookup(table, group)?;
        holdings.equity.push(expected_holding(
            holder,
            g.unobserved_stock_prob,
            g.stats.log_equity_mean,
            g.stats.log_equity_sd,
        ));
        holdings.direct_share.push(g.stats.direct_share);
        holdings.taxable_withdrawal_share.push(g.stats.taxable_withdrawal_share);
    }
    info!(
        "imputed equity to {} units ({} observed holders)",
        groups.len(),
        holders.iter().filter(|&&h| h).count()
    );
    Ok(holdings)
}

/// Expected non-equity financial assets per unit
pub fn impute_other_assets(scenario: &dyn Scenario, table: &ImputationTable) -> DistResult<Vec<f64>> {
    let groups = scenario_groups(scenario)?;
    let owners = identify_other_assetholders(scenario)?;
    groups
        .iter()
        .zip(&owners)
        .map(|(&group, &owner)| {
            let g = lookup(table, group)?;
            Ok(expected_holding(
                owner,
                g.unobserved_other_prob,
                g.stats.log_other_mean,
                g.stats.log_other_sd,
            ))
        })
        .collect()
}
