//! Analysis selectors and the per-call option set
//!
//! Each selector parses from the same short strings used in configuration
//! files. Unknown strings fail with [`DistError::InvalidArgument`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DistError, DistResult};

/// Declare a closed set of string-keyed selectors with parsing and serde
macro_rules! selector {
    (
        $(#[$meta:meta])*
        $name:ident, $what:literal {
            $($(#[$vmeta:meta])* $variant:ident => $key:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Every value, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Configuration key for this value
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $key),+
                }
            }
        }

        impl FromStr for $name {
            type Err = DistError;

            fn from_str(s: &str) -> DistResult<Self> {
                match s {
                    $($key => Ok($name::$variant),)+
                    other => Err(DistError::invalid(format!(
                        "unknown {} `{}`",
                        $what, other
                    ))),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = DistError;

            fn try_from(s: String) -> DistResult<Self> {
                s.parse()
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> String {
                value.as_str().to_string()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

selector! {
    /// Income concept used to rank units
    IncomeMeasure, "income measure" {
        /// Broad income total
        Expanded => "expanded",
        /// Adjusted gross income
        Agi => "agi",
        /// Expanded income less total tax
        Aftertax => "aftertax",
        /// Expanded income less government benefits and state refunds
        Market => "market",
    }
}

selector! {
    /// Outcome whose change is aggregated per income group
    Measure, "measure" {
        ExpandedIncome => "expanded_income",
        IncomeTax => "iitax",
        PayrollTax => "payrolltax",
        TotalTax => "totaltax",
        AftertaxIncome => "aftertax_income",
        /// Total tax over positive expanded income, clipped to [-1, 1]
        AvgTaxRate => "avgtaxrate",
        /// Marginal rate on primary-earner wages
        MargTaxRate => "margtaxrate",
        /// After-tax income over nonzero expanded income
        AvgNetTaxRate => "avgnettaxrate",
        MargNetTaxRate => "margnettaxrate",
        /// Zero or negative income tax
        FracZero => "fraczero",
        /// Count of filing units
        Filers => "filers",
        /// Net tax cut
        FracCut => "fraccut",
        /// Net tax hike
        FracHike => "frachike",
        /// Tax cut of more than $100
        FracCut100 => "fraccut100",
        /// Tax hike of more than $100
        FracHike100 => "frachike100",
        Charity => "charity",
        /// Giving net of the marginal subsidy
        CharityAfter => "charity_after",
        StateTaxes => "state_taxes",
        Benefits => "benefits",
        Medicaid => "medicaid",
        Wages => "wages",
        /// Wages net of the marginal tax
        WagesAfter => "wages_after",
    }
}

selector! {
    /// Statistic computed for each income group
    ChangeType, "change type" {
        /// Weighted total in reform over baseline, less one
        PercentChange => "pch",
        /// Weighted mean difference
        DollarChange => "dch",
        /// Weighted total difference
        TotalChange => "tch",
        /// Weighted mean under the baseline
        Level1 => "level1",
        /// Weighted mean under the reform
        Level2 => "level2",
        /// Weighted total under the baseline
        Total1 => "total1",
        /// Weighted total under the reform
        Total2 => "total2",
    }
}

selector! {
    /// Rule marking units to drop from the cumulative-weight base
    Exclusion, "exclusion rule" {
        NegativeIncome => "neginc",
        ZeroIncome => "zeroinc",
        /// Total tax above income
        Supertax => "supertax",
        /// Bottom 5% of the raw income distribution
        Bottom5 => "bottom5",
        Under5k => "under5k",
        Under10k => "under10k",
        /// Units with nobody counted (dependent filers)
        Dependents => "dependents",
        /// Married filing separately
        Separate => "separate",
    }
}

selector! {
    /// Filing-status half of a screen
    StatusScreen, "filing status screen" {
        Any => "",
        Single => "single",
        Head => "head",
        Married => "married",
        MarriedSeparate => "married_sep",
        NotJoint => "not_joint",
        NotSeparate => "not_sep",
        NotMarried => "not_married",
    }
}

selector! {
    /// Child-count half of a screen
    ChildScreen, "child screen" {
        Any => "",
        Zero => "0",
        One => "1",
        Two => "2",
        ThreePlus => "3+",
        NonZero => "nonzero",
    }
}

/// Equivalence scale used for ranking (divides income) or scaling
/// (multiplies weight): `max(1 + w_adult*(adults-1) + w_child*children, 1) ^ elast_size`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquivalenceScale {
    pub w_adult: f64,
    pub w_child: f64,
    pub elast_size: f64,
}

impl EquivalenceScale {
    pub const fn new(w_adult: f64, w_child: f64, elast_size: f64) -> Self {
        Self {
            w_adult,
            w_child,
            elast_size,
        }
    }

    /// No adjustment (tax-unit basis)
    pub const fn none() -> Self {
        Self::new(1.0, 1.0, 0.0)
    }

    /// Linear in unit size (population basis)
    pub const fn size() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }

    /// Square root of unit size
    pub const fn sqrt_size() -> Self {
        Self::new(1.0, 1.0, 0.5)
    }

    /// Oxford scale
    pub const fn oxford() -> Self {
        Self::new(0.7, 0.5, 1.0)
    }

    /// OECD-modified scale
    pub const fn oecd_modified() -> Self {
        Self::new(0.5, 0.3, 1.0)
    }

    /// Count adults only
    pub const fn adults() -> Self {
        Self::new(1.0, 0.0, 1.0)
    }

    /// All three components must lie in [0, 1]
    pub fn validate(&self, role: &str) -> DistResult<()> {
        for (name, value) in [
            ("w_adult", self.w_adult),
            ("w_child", self.w_child),
            ("elast_size", self.elast_size),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(DistError::invalid(format!(
                    "{} {} = {} is outside [0, 1]",
                    role, name, value
                )));
            }
        }
        Ok(())
    }
}

/// Restriction on which units are reported, without moving anyone's
/// position in the distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Screen {
    pub status: StatusScreen,
    pub children: ChildScreen,
}

impl Screen {
    pub const fn new(status: StatusScreen, children: ChildScreen) -> Self {
        Self { status, children }
    }

    /// No restriction
    pub const fn none() -> Self {
        Self::new(StatusScreen::Any, ChildScreen::Any)
    }

    /// Parse a `[status, children]` pair; any other length is rejected
    pub fn from_pair<S: AsRef<str>>(pair: &[S]) -> DistResult<Self> {
        match pair {
            [status, children] => Ok(Self {
                status: status.as_ref().parse()?,
                children: children.as_ref().parse()?,
            }),
            _ => Err(DistError::invalid(format!(
                "screen must have exactly 2 entries, got {}",
                pair.len()
            ))),
        }
    }
}

impl Default for Screen {
    fn default() -> Self {
        Self::none()
    }
}

impl TryFrom<Vec<String>> for Screen {
    type Error = DistError;

    fn try_from(pair: Vec<String>) -> DistResult<Self> {
        Self::from_pair(&pair)
    }
}

impl From<Screen> for Vec<String> {
    fn from(screen: Screen) -> Vec<String> {
        vec![screen.status.into(), screen.children.into()]
    }
}

/// Ranking, weighting, exclusion and screening choices for one analysis call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    /// Equivalence scale dividing income before ranking
    pub ranking: EquivalenceScale,

    /// Equivalence scale multiplying sampling weights
    pub scaling: EquivalenceScale,

    /// Units dropped from the cumulative-weight base
    #[serde(default)]
    pub exclude: Vec<Exclusion>,

    /// Units reported
    #[serde(default)]
    pub screen: Screen,
}

impl AnalysisOptions {
    /// Preferred choices: square-root ranking, population weighting,
    /// negative incomes excluded, no screen
    pub fn preferred() -> Self {
        Self {
            ranking: EquivalenceScale::sqrt_size(),
            scaling: EquivalenceScale::size(),
            exclude: vec![Exclusion::NegativeIncome],
            screen: Screen::none(),
        }
    }

    /// Tax-unit basis with no exclusions or screen
    pub fn unadjusted() -> Self {
        Self {
            ranking: EquivalenceScale::none(),
            scaling: EquivalenceScale::none(),
            exclude: Vec::new(),
            screen: Screen::none(),
        }
    }

    pub fn with_ranking(mut self, ranking: EquivalenceScale) -> Self {
        self.ranking = ranking;
        self
    }

    pub fn with_scaling(mut self, scaling: EquivalenceScale) -> Self {
        self.scaling = scaling;
        self
    }

    pub fn with_exclude(mut self, exclude: Vec<Exclusion>) -> Self {
        self.exclude = exclude;
        self
    }

    pub fn with_screen(mut self, screen: Screen) -> Self {
        self.screen = screen;
        self
    }

    pub fn validate(&self) -> DistResult<()> {
        self.ranking.validate("ranking")?;
        self.scaling.validate("scaling")
    }
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self::preferred()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selectors_round_trip_through_keys() {
        for m in Measure::ALL {
            assert_eq!(m.as_str().parse::<Measure>().unwrap(), *m);
        }
        assert_eq!(Measure::ALL.len(), 22);
        assert_eq!(ChangeType::ALL.len(), 7);
        assert_eq!(Exclusion::ALL.len(), 8);
    }

    #[test]
    fn test_unknown_selector_rejected() {
        let err = "gross".parse::<IncomeMeasure>().unwrap_err();
        assert!(matches!(err, DistError::InvalidArgument(_)));
        assert!(err.to_string().contains("income measure"));
        assert!("fraccut1000".parse::<Measure>().is_err());
        assert!("4+".parse::<ChildScreen>().is_err());
    }

    #[test]
    fn test_screen_pair_shape() {
        let screen = Screen::from_pair(&["married", "3+"]).unwrap();
        assert_eq!(screen.status, StatusScreen::Married);
        assert_eq!(screen.children, ChildScreen::ThreePlus);

        assert!(Screen::from_pair(&["married"]).is_err());
        assert!(Screen::from_pair(&["", "", ""]).is_err());
        assert_eq!(Screen::from_pair(&["", ""]).unwrap(), Screen::none());
    }

    #[test]
    fn test_scale_bounds() {
        assert!(EquivalenceScale::oecd_modified().validate("ranking").is_ok());
        let err = EquivalenceScale::new(1.2, 1.0, 0.5).validate("scaling").unwrap_err();
        assert!(err.to_string().contains("scaling w_adult"));
        assert!(EquivalenceScale::new(1.0, 1.0, -0.1).validate("ranking").is_err());
    }

    #[test]
    fn test_options_deserialize_from_source_strings() {
        let json = r#"{
            "ranking": {"w_adult": 1, "w_child": 1, "elast_size": 0.5},
            "scaling": {"w_adult": 1, "w_child": 1, "elast_size": 1},
            "exclude": ["neginc", "dependents"],
            "screen": ["not_married", "nonzero"]
        }"#;
        let options: AnalysisOptions = serde_json::from_str(json).unwrap();
        assert_eq!(options.exclude, vec![Exclusion::NegativeIncome, Exclusion::Dependents]);
        assert_eq!(options.screen.status, StatusScreen::NotMarried);
        assert_eq!(options.screen.children, ChildScreen::NonZero);
        assert_eq!(options.ranking, EquivalenceScale::sqrt_size());

        let bad = r#"{"ranking": {"w_adult": 1, "w_child": 1, "elast_size": 0},
                      "scaling": {"w_adult": 1, "w_child": 1, "elast_size": 0},
                      "screen": ["married"]}"#;
        assert!(serde_json::from_str::<AnalysisOptions>(bad).is_err());
    }

    #[test]
    fn test_screen_serializes_as_pair() {
        let screen = Screen::new(StatusScreen::Head, ChildScreen::Any);
        assert_eq!(serde_json::to_string(&screen).unwrap(), r#"["head",""]"#);
    }
}
