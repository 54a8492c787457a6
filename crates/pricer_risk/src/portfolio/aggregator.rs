//! Portfolio valuation across all legs.

use super::snapshot::{PortfolioSnapshot, PositionFailure, PositionValuation};
use crate::parallel::ParallelConfig;
use pricer_core::types::{InstrumentSpec, MarketState};
use pricer_models::{Pricer, ValuationBranch};
use tracing::{debug, warn};

/// Prices every leg of a portfolio against one market state.
///
/// Aggregation never fails as a whole. A leg that fails validation is
/// reported as a [`PositionFailure`] and the remaining legs are still
/// summed.
///
/// # Examples
/// ```
/// use pricer_core::types::{InstrumentSpec, MarketState};
/// use pricer_risk::portfolio::PortfolioAggregator;
///
/// let market = MarketState::new(100.0, 0.05, 0.0, 0.2, 1.0).unwrap();
/// let legs = vec![
///     InstrumentSpec::call(100.0, 1.0, 1.0).unwrap(),
///     InstrumentSpec::put(100.0, 1.0, 1.0).unwrap(),
/// ];
///
/// let snapshot = PortfolioAggregator::default().aggregate(&legs, &market);
/// assert_eq!(snapshot.positions().len(), 2);
/// assert!((snapshot.value() - (10.4506 + 5.5735)).abs() < 1e-3);
/// ```
#[derive(Clone, Debug, Default)]
pub struct PortfolioAggregator {
    parallel: ParallelConfig,
}

impl PortfolioAggregator {
    /// Creates an aggregator with the given parallel settings.
    pub fn new(parallel: ParallelConfig) -> Self {
        Self { parallel }
    }

    /// Parallel settings in use.
    pub fn parallel(&self) -> &ParallelConfig {
        &self.parallel
    }

    /// Values every leg of `instruments` at `market`.
    pub fn aggregate(&self, instruments: &[InstrumentSpec], market: &MarketState) -> PortfolioSnapshot {
        let outcomes = self.parallel.map_indices(instruments.len(), |index| {
            let instrument = &instruments[index];
            Pricer::price(instrument, market)
                .map(|unit| PositionValuation {
                    index,
                    instrument: instrument.clone(),
                    branch: ValuationBranch::select(instrument.kind(), market),
                    unit,
                    position: unit.scaled(instrument.weight()),
                })
                .map_err(|error| PositionFailure {
                    index,
                    instrument: instrument.clone(),
                    error,
                })
        });

        let mut positions = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(valuation) => positions.push(valuation),
                Err(failure) => {
                    warn!(
                        index = failure.index,
                        instrument = %failure.instrument.display_name(),
                        error = %failure.error,
                        "position could not be priced"
                    );
                    failures.push(failure);
                }
            }
        }

        debug!(
            priced = positions.len(),
            failed = failures.len(),
            "portfolio aggregated"
        );
        PortfolioSnapshot::new(market.spot(), positions, failures)
    }
}

/// Values `instruments` at `market` with default parallel settings.
pub fn aggregate(instruments: &[InstrumentSpec], market: &MarketState) -> PortfolioSnapshot {
    PortfolioAggregator::default().aggregate(instruments, market)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pricer_models::price;

    fn market() -> MarketState {
        MarketState::new(100.0, 0.05, 0.01, 0.25, 0.5).unwrap()
    }

    fn book() -> Vec<InstrumentSpec> {
        vec![
            InstrumentSpec::call(105.0, 10.0, 100.0).unwrap().with_label("CALL_105"),
            InstrumentSpec::put(95.0, -5.0, 100.0).unwrap().with_label("PUT_95"),
            InstrumentSpec::future(2.0, 50.0).unwrap(),
        ]
    }

    #[test]
    fn test_totals_are_weighted_sums() {
        let legs = book();
        let snapshot = aggregate(&legs, &market());

        let mut expected_price = 0.0;
        let mut expected_gamma = 0.0;
        for leg in &legs {
            let unit = price(leg, &market()).unwrap();
            expected_price += leg.weight() * unit.price;
            expected_gamma += leg.weight() * unit.gamma;
        }

        assert_relative_eq!(snapshot.value(), expected_price, epsilon = 1e-9);
        assert_relative_eq!(snapshot.total().gamma, expected_gamma, epsilon = 1e-12);
        assert_relative_eq!(
            snapshot.net_delta_exposure(),
            snapshot.net_delta() * 100.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let legs: Vec<InstrumentSpec> = (0..250)
            .map(|i| InstrumentSpec::call(80.0 + 0.2 * i as f64, 1.0, 1.0).unwrap())
            .collect();

        let sequential = PortfolioAggregator::new(ParallelConfig::sequential()).aggregate(&legs, &market());
        let parallel = PortfolioAggregator::new(ParallelConfig::new(16, 1)).aggregate(&legs, &market());

        assert_eq!(sequential, parallel);
        assert!(parallel
            .positions()
            .iter()
            .enumerate()
            .all(|(i, p)| p.index == i));
    }

    // Bypasses the validating constructor, as a hand-edited portfolio file would
    fn zero_strike_call() -> InstrumentSpec {
        serde_json::from_str(r#"{ "kind": "call", "strike": 0.0, "quantity": 3.0, "label": "BAD" }"#)
            .unwrap()
    }

    #[test]
    fn test_malformed_leg_is_collected_and_the_rest_summed() {
        let mut legs = book();
        legs.insert(1, zero_strike_call());

        let snapshot = aggregate(&legs, &market());
        let clean = aggregate(&book(), &market());

        assert!(!snapshot.is_complete());
        assert_eq!(snapshot.failures().len(), 1);
        let failure = &snapshot.failures()[0];
        assert_eq!(failure.index, 1);
        assert_eq!(failure.instrument.label(), Some("BAD"));
        assert!(failure.error.is_invalid_input());

        let indices: Vec<usize> = snapshot.positions().iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![0, 2, 3]);
        assert!(snapshot.position(1).is_none());
        assert_eq!(snapshot.position(2).unwrap().instrument.label(), Some("PUT_95"));

        assert_relative_eq!(snapshot.value(), clean.value(), epsilon = 1e-9);
        assert_relative_eq!(snapshot.net_delta(), clean.net_delta(), epsilon = 1e-12);
        assert_relative_eq!(snapshot.total().vega, clean.total().vega, epsilon = 1e-9);
    }

    #[test]
    fn test_invalid_market_fails_every_leg() {
        let bad = market().with_volatility(f64::NAN);
        let snapshot = aggregate(&book(), &bad);

        assert!(snapshot.positions().is_empty());
        assert_eq!(snapshot.failures().len(), 3);
        assert!(snapshot.failures().iter().all(|f| f.error.is_invalid_input()));
        assert_eq!(snapshot.value(), 0.0);
    }

    #[test]
    fn test_records_branch() {
        let expired = market().with_time_to_expiry(0.0);
        let snapshot = aggregate(&book(), &expired);
        assert_eq!(snapshot.positions()[0].branch, ValuationBranch::Intrinsic);
        assert_eq!(snapshot.positions()[2].branch, ValuationBranch::Analytic);
    }

    #[test]
    fn test_empty_portfolio() {
        let snapshot = aggregate(&[], &market());
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.value(), 0.0);
    }
}
