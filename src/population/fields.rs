//! Field names understood by the microsimulation engine
//!
//! Names follow the engine's variable naming so that a scenario adapter can
//! forward lookups without translation.

/// Sampling weight
pub const WEIGHT: &str = "s006";
/// Broad income total
pub const EXPANDED_INCOME: &str = "expanded_income";
/// Adjusted gross income
pub const AGI: &str = "c00100";
/// Expanded income less total tax
pub const AFTERTAX_INCOME: &str = "aftertax_income";
/// Individual income tax plus payroll tax
pub const COMBINED_TAX: &str = "combined";
/// Individual income tax liability
pub const IITAX: &str = "iitax";
/// Payroll tax liability
pub const PAYROLL_TAX: &str = "payrolltax";
/// Consumption value of government benefits
pub const BENEFITS: &str = "benefit_value_total";
/// Medicaid benefits (actuarial value)
pub const MEDICAID: &str = "mcaid_ben";
/// State and local income tax refunds
pub const STATE_REFUND: &str = "e00700";
/// Filing status code
pub const MARS: &str = "MARS";
/// Total people in the unit
pub const XTOT: &str = "XTOT";
/// Children under 18
pub const CHILDREN: &str = "nu18";
/// Age of the unit head
pub const AGE_HEAD: &str = "age_head";

/// Wages and salaries, unit total
pub const WAGES: &str = "e00200";
/// Wages and salaries, primary earner
pub const WAGES_PRIMARY: &str = "e00200p";
/// Cash charitable contributions
pub const CASH_GIVING: &str = "e19800";
/// Noncash charitable contributions
pub const NONCASH_GIVING: &str = "e20100";
/// State and local income or sales taxes
pub const STATE_INCOME_TAX: &str = "e18400";
/// State and local real estate taxes
pub const STATE_PROPERTY_TAX: &str = "e18500";

/// Taxable interest
pub const TAXABLE_INTEREST: &str = "e00300";
/// Tax-exempt interest
pub const EXEMPT_INTEREST: &str = "e00400";
/// Ordinary dividends (qualified and nonqualified)
pub const DIVIDENDS: &str = "e00600";
/// Qualified dividends
pub const QUALIFIED_DIVIDENDS: &str = "e00650";
/// Short-term capital gain or loss
pub const SHORT_TERM_GAINS: &str = "p22250";
/// Long-term capital gain or loss
pub const LONG_TERM_GAINS: &str = "p23250";
/// Taxable IRA distributions
pub const IRA_DISTRIBUTIONS: &str = "e01400";

/// Income components summed into the survey-comparable income measure
pub const COMPARABLE_INCOME_PARTS: [&str; 10] = [
    "e00200", "e02100", "e00900", "e02000", "e00400", "e00300", "e00600", "e02300", "e01500",
    "e02400",
];

/// Fields whose adjustments flow one-for-one into expanded income.
/// Qualified dividends and primary-earner wages are subsets of other entries.
pub const INCOME_FIELDS: [&str; 6] = [
    WAGES,
    DIVIDENDS,
    SHORT_TERM_GAINS,
    LONG_TERM_GAINS,
    EXEMPT_INTEREST,
    MEDICAID,
];
