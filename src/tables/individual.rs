//! Individual income tax distribution tables

use log::info;
use rayon::prelude::*;

use crate::assumptions::{
    AnalysisOptions, ChangeType, EquivalenceScale, Exclusion, IncomeMeasure, Measure, Screen,
};
use crate::distribution::{dist_table, kakwani, BinScheme};
use crate::error::DistResult;
use crate::population::ScenarioPair;

use super::{scaled_ratio, share_of_total, DistTable};

/// One labelled configuration in a sensitivity table
#[derive(Debug, Clone, PartialEq)]
pub struct SensitivityVariant {
    pub label: String,
    /// Income concept used for ranking
    pub income: IncomeMeasure,
    pub options: AnalysisOptions,
}

impl SensitivityVariant {
    pub fn new(label: &str, income: IncomeMeasure, options: AnalysisOptions) -> Self {
        Self {
            label: label.to_string(),
            income,
            options,
        }
    }

    /// Alternative equivalence scales for ranking
    pub fn equivalence_scales(base: &AnalysisOptions) -> Vec<Self> {
        [
            ("None", EquivalenceScale::none()),
            ("Tax unit size", EquivalenceScale::size()),
            ("Square root of size", EquivalenceScale::sqrt_size()),
            ("Oxford scale", EquivalenceScale::oxford()),
            ("OECD modified scale", EquivalenceScale::oecd_modified()),
        ]
        .into_iter()
        .map(|(label, scale)| Self::new(label, IncomeMeasure::Expanded, base.clone().with_ranking(scale)))
        .collect()
    }

    /// Alternative weight multipliers
    pub fn weighting(base: &AnalysisOptions) -> Vec<Self> {
        [
            ("None", EquivalenceScale::none()),
            ("Tax unit size", EquivalenceScale::size()),
            ("Square root of size", EquivalenceScale::sqrt_size()),
            ("Number of adults", EquivalenceScale::adults()),
        ]
        .into_iter()
        .map(|(label, scale)| Self::new(label, IncomeMeasure::Expanded, base.clone().with_scaling(scale)))
        .collect()
    }

    /// Alternative income concepts for ranking
    pub fn income_measures(base: &AnalysisOptions) -> Vec<Self> {
        [
            ("Expanded income", IncomeMeasure::Expanded),
            ("AGI", IncomeMeasure::Agi),
            ("Market income", IncomeMeasure::Market),
        ]
        .into_iter()
        .map(|(label, income)| Self::new(label, income, base.clone()))
        .collect()
    }

    /// Alternative exclusion lists, each on top of negative income
    pub fn exclusions(base: &AnalysisOptions) -> Vec<Self> {
        use Exclusion::*;
        [
            ("None", vec![NegativeIncome]),
            ("Dependents", vec![NegativeIncome, Dependents]),
            ("Incomplete units", vec![NegativeIncome, Dependents, Separate]),
            ("Tax > Income", vec![NegativeIncome, Supertax]),
        ]
        .into_iter()
        .map(|(label, exclude)| Self::new(label, IncomeMeasure::Expanded, base.clone().with_exclude(exclude)))
        .collect()
    }

    /// Main estimate followed by every single-dimension departure from it
    pub fn kakwani_variants(main: &AnalysisOptions) -> Vec<Self> {
        let mut variants = vec![Self::new("Main estimates", IncomeMeasure::Expanded, main.clone())];
        let prefix = |group: &str, list: Vec<Self>| -> Vec<Self> {
            list.into_iter()
                .map(|mut v| {
                    v.label = format!("{}: {}", group, v.label);
                    v
                })
                .collect()
        };
        let scales = Self::equivalence_scales(main)
            .into_iter()
            .filter(|v| v.label != "Square root of size")
            .collect();
        let weights = Self::weighting(main)
            .into_iter()
            .filter(|v| v.label != "None")
            .collect();
        let incomes = Self::income_measures(main)
            .into_iter()
            .filter(|v| v.income != IncomeMeasure::Expanded)
            .collect();
        let excluded = Self::exclusions(main)
            .into_iter()
            .filter(|v| v.label != "None")
            .collect();
        variants.extend(prefix("Equivalence scale", scales));
        variants.extend(prefix("Weighting", weights));
        variants.extend(prefix("Income measure", incomes));
        variants.extend(prefix("Excluding", excluded));
        variants
    }
}

/// Columns of one configuration over the standard income groups
struct Tabulator<'a> {
    pair: ScenarioPair<'a>,
    income: IncomeMeasure,
    options: &'a AnalysisOptions,
}

impl<'a> Tabulator<'a> {
    fn new(pair: ScenarioPair<'a>, income: IncomeMeasure, options: &'a AnalysisOptions) -> Self {
        Self {
            pair,
            income,
            options,
        }
    }

    fn column(&self, measure: Measure, change: ChangeType) -> DistResult<Vec<f64>> {
        dist_table(
            self.pair,
            &BinScheme::Standard,
            self.income,
            measure,
            change,
            self.options,
        )
    }

    fn percent(&self, measure: Measure, change: ChangeType) -> DistResult<Vec<f64>> {
        Ok(self
            .column(measure, change)?
            .into_iter()
            .map(|v| v * 100.0)
            .collect())
    }
}

/// Average total tax rate (%) before and after, by standard income group
pub fn avg_rate_columns(
    pair: ScenarioPair<'_>,
    income: IncomeMeasure,
    options: &AnalysisOptions,
) -> DistResult<(Vec<f64>, Vec<f64>)> {
    let tab = Tabulator::new(pair, income, options);
    let tax_pre = tab.column(Measure::TotalTax, ChangeType::Total1)?;
    let tax_post = tab.column(Measure::TotalTax, ChangeType::Total2)?;
    let inc_pre = tab.column(Measure::ExpandedIncome, ChangeType::Total1)?;
    let inc_post = tab.column(Measure::ExpandedIncome, ChangeType::Total2)?;
    Ok((
        scaled_ratio(&tax_pre, &inc_pre, 100.0),
        scaled_ratio(&tax_post, &inc_post, 100.0),
    ))
}

/// Tax levels before and after: average rates, shares of liability and
/// the share of units with no income tax
pub fn level_table(pair: ScenarioPair<'_>, options: &AnalysisOptions) -> DistResult<DistTable> {
    info!("building level table for {} units", pair.len());
    let tab = Tabulator::new(pair, IncomeMeasure::Expanded, options);

    let tax_pre = tab.column(Measure::TotalTax, ChangeType::Total1)?;
    let tax_post = tab.column(Measure::TotalTax, ChangeType::Total2)?;
    let inc_pre = tab.column(Measure::ExpandedIncome, ChangeType::Total1)?;
    let inc_post = tab.column(Measure::ExpandedIncome, ChangeType::Total2)?;
    let zero_pre = tab.percent(Measure::FracZero, ChangeType::Level1)?;
    let zero_post = tab.percent(Measure::FracZero, ChangeType::Level2)?;

    DistTable::for_scheme(&BinScheme::Standard)
        .with_column("Avg tax rate, pre (%)", scaled_ratio(&tax_pre, &inc_pre, 100.0))?
        .with_column("Avg tax rate, post (%)", scaled_ratio(&tax_post, &inc_post, 100.0))?
        .with_column("Share of tax liability, pre (%)", share_of_total(&tax_pre, 100.0))?
        .with_column("Share of tax liability, post (%)", share_of_total(&tax_post, 100.0))?
        .with_column("No II tax liability, pre (%)", zero_pre)?
        .with_column("No II tax liability, post (%)", zero_post)
}

/// Changes in tax: after-tax income, average and total change, and the
/// shares of units with a cut or a hike
pub fn change_table(pair: ScenarioPair<'_>, options: &AnalysisOptions) -> DistResult<DistTable> {
    info!("building change table for {} units", pair.len());
    let tab = Tabulator::new(pair, IncomeMeasure::Expanded, options);

    let tax_pre = tab.column(Measure::TotalTax, ChangeType::Total1)?;
    let tax_post = tab.column(Measure::TotalTax, ChangeType::Total2)?;
    let inc_pre = tab.column(Measure::ExpandedIncome, ChangeType::Total1)?;
    let inc_post = tab.column(Measure::ExpandedIncome, ChangeType::Total2)?;
    let avg_change = tab.column(Measure::TotalTax, ChangeType::DollarChange)?;
    let total_change = tab.column(Measure::TotalTax, ChangeType::TotalChange)?;
    let hike = tab.percent(Measure::FracHike, ChangeType::Level2)?;
    let cut = tab.percent(Measure::FracCut, ChangeType::Level2)?;

    let aftertax_pch: Vec<f64> = (0..tax_pre.len())
        .map(|i| ((inc_post[i] - tax_post[i]) / (inc_pre[i] - tax_pre[i]) - 1.0) * 100.0)
        .collect();

    DistTable::for_scheme(&BinScheme::Standard)
        .with_column("Change in after-tax income (%)", aftertax_pch)?
        .with_column("Average tax change ($)", avg_change)?
        .with_column("Share of the tax change (%)", share_of_total(&total_change, 100.0))?
        .with_column("Share receiving tax cut (%)", cut)?
        .with_column("Share receiving tax hike (%)", hike)
}

/// Tax-unit basis table for a demographic subgroup selected by `screen`
pub fn demographic_table(
    pair: ScenarioPair<'_>,
    exclude: &[Exclusion],
    screen: Screen,
) -> DistResult<DistTable> {
    info!("building demographic table for screen {:?}", screen);
    let options = AnalysisOptions::unadjusted()
        .with_exclude(exclude.to_vec())
        .with_screen(screen);
    let tab = Tabulator::new(pair, IncomeMeasure::Expanded, &options);

    let filers = tab.column(Measure::Filers, ChangeType::Total1)?;
    let (rate_pre, rate_post) = avg_rate_columns(pair, IncomeMeasure::Expanded, &options)?;
    let avg_change = tab.column(Measure::TotalTax, ChangeType::DollarChange)?;

    DistTable::for_scheme(&BinScheme::Standard)
        .with_column("Percent of filers", share_of_total(&filers, 100.0))?
        .with_column("Avg tax rate, pre (%)", rate_pre)?
        .with_column("Avg tax rate, post (%)", rate_post)?
        .with_column("Average tax change ($)", avg_change)
}

/// Average tax rates before and after under each variant, side by side
pub fn avg_rate_sensitivity(
    pair: ScenarioPair<'_>,
    variants: &[SensitivityVariant],
) -> DistResult<DistTable> {
    info!("average-rate sensitivity over {} variants", variants.len());
    let columns: Vec<(Vec<f64>, Vec<f64>)> = variants
        .par_iter()
        .map(|v| avg_rate_columns(pair, v.income, &v.options))
        .collect::<DistResult<_>>()?;

    let mut table = DistTable::for_scheme(&BinScheme::Standard);
    for (variant, (pre, post)) in variants.iter().zip(columns) {
        table.push_column(&format!("{}, pre", variant.label), pre)?;
        table.push_column(&format!("{}, post", variant.label), post)?;
    }
    Ok(table)
}

/// Kakwani index of the total tax change for each variant (rows) and
/// year (columns)
pub fn kakwani_sensitivity(
    pairs_by_year: &[(i32, ScenarioPair<'_>)],
    variants: &[SensitivityVariant],
) -> DistResult<DistTable> {
    info!(
        "Kakwani sensitivity over {} years and {} variants",
        pairs_by_year.len(),
        variants.len()
    );
    let by_year: Vec<Vec<f64>> = pairs_by_year
        .par_iter()
        .map(|(_, pair)| {
            variants
                .iter()
                .map(|v| kakwani(*pair, v.income, Measure::TotalTax, &v.options))
                .collect::<DistResult<Vec<f64>>>()
        })
        .collect::<DistResult<_>>()?;

    let rows = variants.iter().map(|v| v.label.clone()).collect();
    let mut table = DistTable::new("Category", rows);
    for ((year, _), values) in pairs_by_year.iter().zip(by_year) {
        table.push_column(&year.to_string(), values)?;
    }
    Ok(table)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::assumptions::{ChildScreen, StatusScreen};
    use crate::population::Population;
    use approx::assert_abs_diff_eq;

    /// Twenty single-person units with rising income. The bottom half gets
    /// a $50 cut, the top quarter a $200 hike.
    pub(crate) fn twenty_units() -> (Population, Population) {
        let n = 20;
        let income: Vec<f64> = (0..n).map(|i| 1000.0 * (i + 1) as f64).collect();
        let tax_pre: Vec<f64> = income.iter().map(|x| 0.1 * x).collect();
        let tax_post: Vec<f64> = tax_pre
            .iter()
            .enumerate()
            .map(|(i, t)| match i {
                0..=9 => t - 50.0,
                15..=19 => t + 200.0,
                _ => *t,
            })
            .collect();

        let build = |tax: &[f64]| {
            let iitax: Vec<f64> = tax
                .iter()
                .enumerate()
                .map(|(i, t)| if i < 4 { 0.0 } else { *t })
                .collect();
            let aftertax: Vec<f64> = income.iter().zip(tax).map(|(x, t)| x - t).collect();
            Population::new(n)
                .with_field("s006", vec![1.0; n])
                .unwrap()
                .with_field("expanded_income", income.clone())
                .unwrap()
                .with_field("c00100", income.clone())
                .unwrap()
                .with_field("aftertax_income", aftertax)
                .unwrap()
                .with_field("combined", tax.to_vec())
                .unwrap()
                .with_field("iitax", iitax)
                .unwrap()
                .with_field("XTOT", vec![1.0; n])
                .unwrap()
                .with_field("nu18", vec![0.0; n])
                .unwrap()
                .with_field("MARS", (0..n).map(|i| (i % 2 + 1) as f64).collect())
                .unwrap()
        };
        (build(&tax_pre), build(&tax_post))
    }

    #[test]
    fn test_level_table() {
        let (base, reform) = twenty_units();
        let pair = ScenarioPair::new(&base, &reform).unwrap();
        let table = level_table(pair, &AnalysisOptions::unadjusted()).unwrap();

        assert_eq!(table.rows.len(), 13);
        assert_abs_diff_eq!(table.get("All units", "Avg tax rate, pre (%)").unwrap(), 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(table.get("All units", "Share of tax liability, pre (%)").unwrap(), 100.0, epsilon = 1e-9);

        let shares = table.column("Share of tax liability, post (%)").unwrap();
        assert_abs_diff_eq!(shares[..12].iter().sum::<f64>(), 100.0, epsilon = 1e-9);

        // four of twenty units owe no income tax
        assert_abs_diff_eq!(table.get("All units", "No II tax liability, pre (%)").unwrap(), 20.0, epsilon = 1e-9);
        assert_abs_diff_eq!(table.get("Bottom decile", "No II tax liability, pre (%)").unwrap(), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_change_table() {
        let (base, reform) = twenty_units();
        let pair = ScenarioPair::new(&base, &reform).unwrap();
        let table = change_table(pair, &AnalysisOptions::unadjusted()).unwrap();

        assert_eq!(table.get("Bottom decile", "Average tax change ($)"), Some(-50.0));
        assert_eq!(table.get("Bottom decile", "Share receiving tax cut (%)"), Some(100.0));
        assert_eq!(table.get("Top 1%", "Share receiving tax hike (%)"), Some(100.0));
        assert_eq!(table.get("All units", "Share receiving tax hike (%)"), Some(25.0));

        // -500 + 1000 overall
        assert_abs_diff_eq!(table.get("All units", "Average tax change ($)").unwrap(), 25.0, epsilon = 1e-9);
        let shares = table.column("Share of the tax change (%)").unwrap();
        assert_abs_diff_eq!(shares[..12].iter().sum::<f64>(), 100.0, epsilon = 1e-9);

        // bottom unit: after-tax 900 -> 950
        let pch = table.get("Bottom decile", "Change in after-tax income (%)").unwrap();
        assert_abs_diff_eq!(pch, 50.0 / 9.0, epsilon = 1e-9);
    }

    #[test]
    fn test_demographic_table_screens_rows() {
        let (base, reform) = twenty_units();
        let pair = ScenarioPair::new(&base, &reform).unwrap();
        let married = Screen::new(StatusScreen::Married, ChildScreen::Any);
        let table = demographic_table(pair, &[Exclusion::NegativeIncome], married).unwrap();

        let filers = table.column("Percent of filers").unwrap();
        assert_eq!(filers[12], 100.0);
        assert_abs_diff_eq!(filers[..12].iter().sum::<f64>(), 100.0, epsilon = 1e-9);
        // the lowest income unit is single, so the bottom decile has no joint filers
        assert_eq!(filers[0], 0.0);
        assert!(table.get("Bottom decile", "Avg tax rate, pre (%)").unwrap().is_nan());
    }

    #[test]
    fn test_avg_rate_sensitivity_matches_level_table() {
        let (base, reform) = twenty_units();
        let pair = ScenarioPair::new(&base, &reform).unwrap();
        let base_options = AnalysisOptions::unadjusted().with_exclude(vec![Exclusion::NegativeIncome]);
        let variants = SensitivityVariant::income_measures(&base_options)
            .into_iter()
            .filter(|v| v.income != IncomeMeasure::Market)
            .collect::<Vec<_>>();

        let table = avg_rate_sensitivity(pair, &variants).unwrap();
        assert_eq!(
            table.column_names(),
            vec!["Expanded income, pre", "Expanded income, post", "AGI, pre", "AGI, post"]
        );

        let level = level_table(pair, &base_options).unwrap();
        assert_eq!(
            table.column("Expanded income, post").unwrap(),
            level.column("Avg tax rate, post (%)").unwrap()
        );
    }

    #[test]
    fn test_kakwani_sensitivity_shape() {
        let (base, reform) = twenty_units();
        let pair = ScenarioPair::new(&base, &reform).unwrap();
        let main = AnalysisOptions::unadjusted().with_exclude(vec![Exclusion::NegativeIncome]);
        let variants = vec![
            SensitivityVariant::new("Main estimates", IncomeMeasure::Expanded, main.clone()),
            SensitivityVariant::new("AGI", IncomeMeasure::Agi, main),
        ];

        let table = kakwani_sensitivity(&[(2018, pair), (2020, pair)], &variants).unwrap();
        assert_eq!(table.group_header, "Category");
        assert_eq!(table.rows, vec!["Main estimates", "AGI"]);
        assert_eq!(table.column_names(), vec!["2018", "2020"]);
        // a hike at the top with a cut at the bottom is progressive
        assert!(table.get("Main estimates", "2018").unwrap() > 0.0);
        assert_eq!(table.column("2018"), table.column("2020"));
    }

    #[test]
    fn test_kakwani_variant_list() {
        let variants = SensitivityVariant::kakwani_variants(&AnalysisOptions::preferred());
        assert_eq!(variants.len(), 13);
        assert_eq!(variants[0].label, "Main estimates");
        assert!(variants.iter().any(|v| v.label == "Income measure: Market income"));
        assert!(variants.iter().any(|v| v.label == "Excluding: Tax > Income"));
    }
}
