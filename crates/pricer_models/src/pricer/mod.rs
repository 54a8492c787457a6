//! Instrument valuation entry points.
//!
//! [`Pricer`] validates the inputs, selects a [`ValuationBranch`] and
//! dispatches on the closed [`InstrumentKind`] set:
//!
//! | Kind | Branch | Valuation |
//! |---|---|---|
//! | Call / Put | `Analytic` | Black-Scholes with dividend yield |
//! | Call / Put | `Intrinsic` | payoff at expiry, step delta |
//! | Call / Put | `Deterministic` | discounted forward value at `σ = 0` |
//! | Future | `Analytic` | `S e^((r-q)T)`, delta 1 |

mod branch;
mod result;

pub use branch::ValuationBranch;
pub use result::PricingResult;

use crate::analytical::BlackScholes;
use pricer_core::types::{InstrumentKind, InstrumentSpec, MarketState, PricingError};
use tracing::trace;

/// Stateless valuation of single instruments.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pricer;

impl Pricer {
    /// Prices one unit of the underlying exposure of `instrument`.
    ///
    /// Quantity and multiplier are ignored here; see
    /// [`Pricer::price_position`].
    ///
    /// # Errors
    /// `PricingError::InvalidInput` when the instrument or market fails
    /// validation. No numerical work is attempted in that case.
    ///
    /// # Examples
    /// ```
    /// use pricer_core::types::{InstrumentSpec, MarketState};
    /// use pricer_models::Pricer;
    ///
    /// let market = MarketState::new(100.0, 0.05, 0.0, 0.2, 1.0).unwrap();
    /// let call = InstrumentSpec::call(100.0, 1.0, 1.0).unwrap();
    /// let result = Pricer::price(&call, &market).unwrap();
    /// assert!((result.price - 10.4506).abs() < 1e-3);
    /// assert!((result.delta - 0.6368).abs() < 1e-3);
    /// ```
    pub fn price(
        instrument: &InstrumentSpec,
        market: &MarketState,
    ) -> Result<PricingResult, PricingError> {
        instrument.validate()?;
        market.validate()?;

        let branch = ValuationBranch::select(instrument.kind(), market);
        trace!(
            kind = %instrument.kind(),
            strike = instrument.strike(),
            %branch,
            "pricing instrument"
        );

        let result = match instrument.kind() {
            InstrumentKind::Future => price_future(market),
            InstrumentKind::Call => price_option(true, instrument.strike(), market, branch)?,
            InstrumentKind::Put => price_option(false, instrument.strike(), market, branch)?,
        };
        Ok(result)
    }

    /// Prices the whole position: the unit result scaled by
    /// `quantity * multiplier`.
    pub fn price_position(
        instrument: &InstrumentSpec,
        market: &MarketState,
    ) -> Result<PricingResult, PricingError> {
        Ok(Self::price(instrument, market)?.scaled(instrument.weight()))
    }
}

/// Prices one unit of `instrument`. Shorthand for [`Pricer::price`].
pub fn price(
    instrument: &InstrumentSpec,
    market: &MarketState,
) -> Result<PricingResult, PricingError> {
    Pricer::price(instrument, market)
}

fn price_future(market: &MarketState) -> PricingResult {
    PricingResult {
        price: market.forward(),
        delta: 1.0,
        ..PricingResult::zero()
    }
}

fn price_option(
    is_call: bool,
    strike: f64,
    market: &MarketState,
    branch: ValuationBranch,
) -> Result<PricingResult, PricingError> {
    match branch {
        ValuationBranch::Intrinsic => Ok(branch::intrinsic(is_call, strike, market.spot())),
        ValuationBranch::Deterministic => Ok(branch::deterministic(is_call, strike, market)),
        ValuationBranch::Analytic => {
            let bs = BlackScholes::from_market(market)?;
            let price = if is_call {
                bs.price_call(strike)
            } else {
                bs.price_put(strike)
            };
            Ok(PricingResult {
                price,
                delta: bs.delta(strike, is_call),
                gamma: bs.gamma(strike),
                vega: bs.vega(strike),
                theta: bs.theta(strike, is_call),
                rho: bs.rho(strike, is_call),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn market() -> MarketState {
        MarketState::new(100.0, 0.05, 0.0, 0.2, 1.0).unwrap()
    }

    #[test]
    fn test_reference_call_and_put() {
        let call = price(&InstrumentSpec::call(100.0, 1.0, 1.0).unwrap(), &market()).unwrap();
        let put = price(&InstrumentSpec::put(100.0, 1.0, 1.0).unwrap(), &market()).unwrap();
        assert_relative_eq!(call.price, 10.4506, epsilon = 1e-3);
        assert_relative_eq!(call.delta, 0.6368, epsilon = 1e-3);
        assert_relative_eq!(put.price, 5.5735, epsilon = 1e-3);
        assert_relative_eq!(put.delta, -0.3632, epsilon = 1e-3);
        assert_relative_eq!(call.gamma, put.gamma, epsilon = 1e-15);
        assert_relative_eq!(call.vega, put.vega, epsilon = 1e-12);
    }

    #[test]
    fn test_future() {
        let m = MarketState::new(100.0, 0.05, 0.02, 0.3, 2.0).unwrap();
        let fut = price(&InstrumentSpec::future(1.0, 1.0).unwrap(), &m).unwrap();
        assert_relative_eq!(fut.price, 100.0 * (0.06_f64).exp(), epsilon = 1e-12);
        assert_eq!(fut.delta, 1.0);
        assert_eq!(fut.gamma, 0.0);
        assert_eq!(fut.vega, 0.0);
        assert_eq!(fut.theta, 0.0);
        assert_eq!(fut.rho, 0.0);
    }

    #[test]
    fn test_expired_option_is_intrinsic() {
        let expired = market().with_spot(110.0).with_time_to_expiry(0.0);
        let call = price(&InstrumentSpec::call(100.0, 1.0, 1.0).unwrap(), &expired).unwrap();
        assert_eq!(call.price, 10.0);
        assert_eq!(call.delta, 1.0);
        assert_eq!(call.gamma, 0.0);
        assert_eq!(call.vega, 0.0);
        assert_eq!(call.theta, 0.0);
    }

    #[test]
    fn test_zero_volatility_is_deterministic() {
        let flat = market().with_volatility(0.0);
        let call = price(&InstrumentSpec::call(100.0, 1.0, 1.0).unwrap(), &flat).unwrap();
        assert_relative_eq!(call.price, 100.0 - 100.0 * (-0.05_f64).exp(), epsilon = 1e-12);
        assert_eq!(call.delta, 1.0);
        assert_eq!(call.gamma, 0.0);
    }

    #[test]
    fn test_price_position_scales_by_weight() {
        let short = InstrumentSpec::call(100.0, -2.0, 100.0).unwrap();
        let unit = price(&short, &market()).unwrap();
        let position = Pricer::price_position(&short, &market()).unwrap();
        assert_relative_eq!(position.price, -200.0 * unit.price, epsilon = 1e-9);
        assert_relative_eq!(position.vega, -200.0 * unit.vega, epsilon = 1e-9);
    }

    #[test]
    fn test_invalid_market_rejected_before_pricing() {
        let bad = market().with_spot(0.0);
        let err = price(&InstrumentSpec::call(100.0, 1.0, 1.0).unwrap(), &bad).unwrap_err();
        assert!(err.is_invalid_input());
    }
}
