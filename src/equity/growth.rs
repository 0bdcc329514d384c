//! Grow imputed equity from the survey year to an analysis year

use crate::error::{DistError, DistResult};

const FIRST_YEAR: i32 = 2015;
const BASE_YEAR: i32 = 2016;

/// Nominal corporate profits ($bn), 2015 through 2027
const CORPORATE_PROFITS: [f64; 13] = [
    2088.1, 2085.8, 2093.9, 2097.9, 2117.7, 2148.1, 2192.6, 2252.8, 2334.8, 2424.0, 2517.1,
    2619.5, 2724.6,
];

fn profits(year: i32) -> DistResult<f64> {
    usize::try_from(year - FIRST_YEAR)
        .ok()
        .and_then(|i| CORPORATE_PROFITS.get(i).copied())
        .ok_or_else(|| {
            DistError::invalid(format!(
                "no corporate profit projection for {} (covered: {}-{})",
                year,
                FIRST_YEAR,
                FIRST_YEAR + CORPORATE_PROFITS.len() as i32 - 1
            ))
        })
}

/// Scale 2016 equity holdings to `year` with corporate profit growth
pub fn advance_equity(equity_2016: &[f64], year: i32) -> DistResult<Vec<f64>> {
    let factor = profits(year)? / profits(BASE_YEAR)?;
    Ok(equity_2016.iter().map(|e| e * factor).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_base_year_unchanged() {
        let equity = [100.0, 2500.0];
        assert_eq!(advance_equity(&equity, 2016).unwrap(), equity.to_vec());
    }

    #[test]
    fn test_growth_factor() {
        let grown = advance_equity(&[1000.0], 2027).unwrap();
        assert_relative_eq!(grown[0], 1000.0 * 2724.6 / 2085.8, max_relative = 1e-12);
        let earlier = advance_equity(&[1000.0], 2015).unwrap();
        assert!(earlier[0] > 1000.0);
    }

    #[test]
    fn test_years_outside_projection() {
        assert!(matches!(advance_equity(&[1.0], 2014), Err(DistError::InvalidArgument(_))));
        assert!(advance_equity(&[1.0], 2028).is_err());
    }
}
