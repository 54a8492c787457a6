//! Calendar helpers for expressing expiries in years.
//!
//! Every expiry in the engine is a year fraction on the Act/365 basis,
//! which is also how day counts entered by users are converted.

use chrono::NaiveDate;

/// Days per year on the Act/365 basis.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Converts a day count to years (Act/365).
///
/// # Examples
/// ```
/// use pricer_core::types::time::days_to_years;
///
/// assert!((days_to_years(73.0) - 0.2).abs() < 1e-12);
/// ```
#[inline]
pub fn days_to_years(days: f64) -> f64 {
    days / DAYS_PER_YEAR
}

/// Calculate time to maturity between two dates (Act/365).
///
/// Expired positions (`end < start`) return 0 rather than a negative
/// fraction, so the result can be fed straight into a market state.
///
/// # Examples
///
/// ```
/// use pricer_core::types::time::time_to_maturity;
/// use chrono::NaiveDate;
///
/// let valuation_date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let maturity_date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
///
/// let ttm = time_to_maturity(valuation_date, maturity_date);
/// assert!((ttm - 1.0027).abs() < 0.001); // 366 days in 2024
///
/// assert_eq!(time_to_maturity(maturity_date, valuation_date), 0.0);
/// ```
pub fn time_to_maturity(start: NaiveDate, end: NaiveDate) -> f64 {
    let days = (end - start).num_days();
    if days <= 0 {
        0.0
    } else {
        days_to_years(days as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_act_365_known_dates() {
        // 2024-01-01 to 2024-07-01 is 182 days
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        assert_relative_eq!(time_to_maturity(start, end), 182.0 / 365.0, epsilon = 1e-12);
    }

    #[test]
    fn test_same_day_is_zero() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(time_to_maturity(d, d), 0.0);
    }

    #[test]
    fn test_thirty_days() {
        assert_relative_eq!(days_to_years(30.0), 30.0 / 365.0, epsilon = 1e-15);
    }
}
