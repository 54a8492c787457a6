//! Aggregated valuation of a list of position legs.

use pricer_core::types::{InstrumentSpec, PricingError};
use pricer_models::{PricingResult, ValuationBranch};

/// Valuation of a single leg.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionValuation {
    /// Position in the input slice
    pub index: usize,
    /// The priced leg
    pub instrument: InstrumentSpec,
    /// Branch the pricer took for this leg
    pub branch: ValuationBranch,
    /// Price and Greeks per unit of underlying
    pub unit: PricingResult,
    /// `unit` scaled by `quantity * multiplier`
    pub position: PricingResult,
}

impl PositionValuation {
    /// Gross value `|quantity| * multiplier * price`.
    #[inline]
    pub fn gross_value(&self) -> f64 {
        self.instrument.weight().abs() * self.unit.price
    }

    /// `(price - entry_price) * quantity * multiplier`, if an entry price is set.
    pub fn unrealised_pnl(&self) -> Option<f64> {
        self.instrument
            .entry_price()
            .map(|entry| (self.unit.price - entry) * self.instrument.weight())
    }
}

/// A leg that could not be priced.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionFailure {
    /// Position in the input slice
    pub index: usize,
    /// The rejected leg
    pub instrument: InstrumentSpec,
    /// Why it was rejected
    pub error: PricingError,
}

/// Priced legs in input order, their weighted sum, and the legs that failed.
///
/// Built by [`PortfolioAggregator`](super::PortfolioAggregator). The total
/// covers the successfully priced legs only; check
/// [`PortfolioSnapshot::is_complete`] before relying on it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PortfolioSnapshot {
    spot: f64,
    positions: Vec<PositionValuation>,
    total: PricingResult,
    failures: Vec<PositionFailure>,
}

impl PortfolioSnapshot {
    pub(crate) fn new(
        spot: f64,
        positions: Vec<PositionValuation>,
        failures: Vec<PositionFailure>,
    ) -> Self {
        let total = positions.iter().map(|p| p.position).sum();
        Self {
            spot,
            positions,
            total,
            failures,
        }
    }

    /// Priced legs, ordered by input index.
    pub fn positions(&self) -> &[PositionValuation] {
        &self.positions
    }

    /// Legs that failed validation, ordered by input index.
    pub fn failures(&self) -> &[PositionFailure] {
        &self.failures
    }

    /// Weighted sum of price and Greeks.
    pub fn total(&self) -> &PricingResult {
        &self.total
    }

    /// Net (signed) portfolio value.
    #[inline]
    pub fn value(&self) -> f64 {
        self.total.price
    }

    /// Net delta in units of the underlying.
    #[inline]
    pub fn net_delta(&self) -> f64 {
        self.total.delta
    }

    /// Net delta exposure in currency units: `net_delta * spot`.
    #[inline]
    pub fn net_delta_exposure(&self) -> f64 {
        self.total.delta * self.spot
    }

    /// Spot the snapshot was valued at.
    pub fn spot(&self) -> f64 {
        self.spot
    }

    /// Sum of `|quantity| * multiplier * price` over priced legs.
    pub fn gross_value(&self) -> f64 {
        self.positions.iter().map(PositionValuation::gross_value).sum()
    }

    /// P&L against entry prices, over legs that carry one.
    pub fn unrealised_pnl(&self) -> f64 {
        self.positions
            .iter()
            .filter_map(PositionValuation::unrealised_pnl)
            .sum()
    }

    /// True when every leg was priced.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of input legs, priced or not.
    pub fn len(&self) -> usize {
        self.positions.len() + self.failures.len()
    }

    /// True for a snapshot of an empty portfolio.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Valuation of the leg at input `index`, if it was priced.
    pub fn position(&self, index: usize) -> Option<&PositionValuation> {
        self.positions
            .binary_search_by_key(&index, |p| p.index)
            .ok()
            .map(|i| &self.positions[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn valuation(index: usize, instrument: InstrumentSpec, price: f64, delta: f64) -> PositionValuation {
        let unit = PricingResult {
            price,
            delta,
            ..PricingResult::zero()
        };
        PositionValuation {
            index,
            position: unit.scaled(instrument.weight()),
            instrument,
            branch: ValuationBranch::Analytic,
            unit,
        }
    }

    #[test]
    fn test_totals_and_exposure() {
        let long = InstrumentSpec::call(100.0, 10.0, 1.0).unwrap();
        let short = InstrumentSpec::put(95.0, -5.0, 1.0).unwrap();
        let snapshot = PortfolioSnapshot::new(
            100.0,
            vec![valuation(0, long, 10.0, 0.6), valuation(1, short, 4.0, -0.3)],
            vec![],
        );

        assert_relative_eq!(snapshot.value(), 100.0 - 20.0, epsilon = 1e-12);
        assert_relative_eq!(snapshot.gross_value(), 120.0, epsilon = 1e-12);
        assert_relative_eq!(snapshot.net_delta(), 6.0 + 1.5, epsilon = 1e-12);
        assert_relative_eq!(snapshot.net_delta_exposure(), 750.0, epsilon = 1e-9);
        assert!(snapshot.is_complete());
        assert_eq!(snapshot.len(), 2);
    }

    #[test]
    fn test_unrealised_pnl_uses_entry_prices_only() {
        let with_entry = InstrumentSpec::call(100.0, 2.0, 100.0)
            .unwrap()
            .with_entry_price(8.0);
        let without = InstrumentSpec::put(100.0, 1.0, 100.0).unwrap();
        let snapshot = PortfolioSnapshot::new(
            100.0,
            vec![valuation(0, with_entry, 10.0, 0.5), valuation(1, without, 5.0, -0.4)],
            vec![],
        );
        assert_relative_eq!(snapshot.unrealised_pnl(), 400.0, epsilon = 1e-9);
    }

    #[test]
    fn test_position_lookup_skips_failures() {
        let leg = InstrumentSpec::future(1.0, 1.0).unwrap();
        let failure = PositionFailure {
            index: 0,
            instrument: leg.clone(),
            error: PricingError::invalid_input("spot", 0.0, "must be positive"),
        };
        let snapshot = PortfolioSnapshot::new(100.0, vec![valuation(1, leg, 100.0, 1.0)], vec![failure]);

        assert!(snapshot.position(0).is_none());
        assert_eq!(snapshot.position(1).map(|p| p.index), Some(1));
        assert!(!snapshot.is_complete());
        assert_eq!(snapshot.len(), 2);
    }
}
