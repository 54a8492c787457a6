//! Summary risk figures derived from a [`PortfolioSnapshot`].

use super::snapshot::PortfolioSnapshot;
use pricer_core::math::distributions::norm_inv;
use pricer_core::types::{MarketState, PricingError};

/// Trading days per year used to scale annual volatility to one day.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Default VaR confidence level.
pub const DEFAULT_VAR_CONFIDENCE: f64 = 0.95;

/// Portfolio-level risk summary.
///
/// # Examples
/// ```
/// use pricer_core::types::{InstrumentSpec, MarketState};
/// use pricer_risk::aggregate;
/// use pricer_risk::portfolio::RiskMetrics;
///
/// let market = MarketState::new(100.0, 0.05, 0.0, 0.2, 1.0).unwrap();
/// let legs = vec![InstrumentSpec::future(10.0, 1.0).unwrap()];
/// let snapshot = aggregate(&legs, &market);
///
/// let metrics = RiskMetrics::from_snapshot(&snapshot, &market, 0.95).unwrap();
/// // 1.645 * 1000 * 0.2 / sqrt(252)
/// assert!((metrics.var - 20.72).abs() < 0.01);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RiskMetrics {
    /// Gross value, `Σ |quantity| * multiplier * price`
    pub portfolio_value: f64,
    /// Signed net value
    pub net_value: f64,
    /// Net delta exposure in currency units
    pub delta_exposure: f64,
    /// One-day delta-normal value at risk, reported as a positive loss
    pub var: f64,
    /// Confidence level of `var`
    pub confidence: f64,
    /// Number of priced legs
    pub position_count: usize,
    /// `1 - Σ w²` over gross-value weights
    pub diversification_score: f64,
}

impl RiskMetrics {
    /// Computes the metrics of `snapshot` valued at `market`.
    ///
    /// # Errors
    /// `PricingError::InvalidInput` when `confidence` is outside `[0.5, 1)`.
    pub fn from_snapshot(
        snapshot: &PortfolioSnapshot,
        market: &MarketState,
        confidence: f64,
    ) -> Result<Self, PricingError> {
        if !(confidence >= 0.5 && confidence < 1.0) {
            return Err(PricingError::invalid_input(
                "confidence",
                confidence,
                "must lie in [0.5, 1)",
            ));
        }

        let delta_exposure = snapshot.net_delta_exposure();
        let daily_vol = market.volatility() * (1.0 / TRADING_DAYS_PER_YEAR).sqrt();
        // z(0.5) may round below zero
        let var = (norm_inv(confidence) * delta_exposure.abs() * daily_vol).max(0.0);

        Ok(Self {
            portfolio_value: snapshot.gross_value(),
            net_value: snapshot.value(),
            delta_exposure,
            var,
            confidence,
            position_count: snapshot.positions().len(),
            diversification_score: diversification_score(snapshot),
        })
    }
}

/// `1 - Σ w²` (one minus the Herfindahl index) of gross-value weights.
///
/// Zero for a single leg, an empty book, or a book with no gross value.
pub fn diversification_score(snapshot: &PortfolioSnapshot) -> f64 {
    let gross = snapshot.gross_value();
    if snapshot.positions().len() < 2 || gross <= 0.0 {
        return 0.0;
    }
    let concentration: f64 = snapshot
        .positions()
        .iter()
        .map(|p| {
            let w = p.gross_value() / gross;
            w * w
        })
        .sum();
    1.0 - concentration
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::aggregate;
    use approx::assert_relative_eq;
    use pricer_core::types::InstrumentSpec;

    fn market() -> MarketState {
        MarketState::new(100.0, 0.0, 0.0, 0.3, 1.0).unwrap()
    }

    #[test]
    fn test_var_of_futures_book() {
        let legs = vec![InstrumentSpec::future(-4.0, 25.0).unwrap()];
        let snapshot = aggregate(&legs, &market());
        let metrics = RiskMetrics::from_snapshot(&snapshot, &market(), 0.99).unwrap();

        let expected = 2.326_347_874 * 10_000.0 * 0.3 / 252.0_f64.sqrt();
        assert_relative_eq!(metrics.var, expected, max_relative = 1e-8);
        assert_relative_eq!(metrics.delta_exposure, -10_000.0, epsilon = 1e-9);
        assert_relative_eq!(metrics.portfolio_value, 10_000.0, epsilon = 1e-9);
        assert_relative_eq!(metrics.net_value, -10_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_diversification_even_book() {
        let legs: Vec<InstrumentSpec> = (0..4).map(|_| InstrumentSpec::future(1.0, 1.0).unwrap()).collect();
        let snapshot = aggregate(&legs, &market());
        let metrics = RiskMetrics::from_snapshot(&snapshot, &market(), DEFAULT_VAR_CONFIDENCE).unwrap();

        assert_eq!(metrics.position_count, 4);
        assert_relative_eq!(metrics.diversification_score, 0.75, epsilon = 1e-12);
    }

    #[test]
    fn test_diversification_single_and_empty() {
        let single = aggregate(&[InstrumentSpec::call(100.0, 3.0, 1.0).unwrap()], &market());
        assert_eq!(diversification_score(&single), 0.0);
        assert_eq!(diversification_score(&aggregate(&[], &market())), 0.0);
    }

    #[test]
    fn test_hedged_book_has_no_var() {
        let legs = vec![
            InstrumentSpec::future(1.0, 1.0).unwrap(),
            InstrumentSpec::future(-1.0, 1.0).unwrap(),
        ];
        let snapshot = aggregate(&legs, &market());
        let metrics = RiskMetrics::from_snapshot(&snapshot, &market(), 0.95).unwrap();
        assert_eq!(metrics.var, 0.0);
        assert_relative_eq!(metrics.diversification_score, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_confidence_must_lie_in_upper_half() {
        let snapshot = aggregate(&[], &market());
        for bad in [0.0, 0.05, 0.3, 0.499, 1.0, 1.5, f64::NAN] {
            let err = RiskMetrics::from_snapshot(&snapshot, &market(), bad).unwrap_err();
            assert!(err.is_invalid_input());
        }
    }

    #[test]
    fn test_median_confidence_has_no_var() {
        let legs = vec![InstrumentSpec::future(-4.0, 25.0).unwrap()];
        let snapshot = aggregate(&legs, &market());
        let metrics = RiskMetrics::from_snapshot(&snapshot, &market(), 0.5).unwrap();

        assert!(metrics.var >= 0.0);
        assert!(metrics.var < 1e-6);
    }
}
