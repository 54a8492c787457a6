//! Property tests for the pricer and the implied volatility solver.

use approx::assert_relative_eq;
use pricer_core::types::{InstrumentSpec, MarketState, PricingError};
use pricer_models::{implied_volatility, price};
use proptest::prelude::*;

fn spot_strategy() -> impl Strategy<Value = f64> {
    10.0..500.0
}

fn rate_strategy() -> impl Strategy<Value = f64> {
    -0.05..0.15
}

fn dividend_strategy() -> impl Strategy<Value = f64> {
    0.0..0.1
}

// Degenerate values appear often enough to exercise every branch
fn volatility_strategy() -> impl Strategy<Value = f64> {
    prop_oneof![
        1 => Just(0.0),
        6 => 0.01..2.0,
    ]
}

fn expiry_strategy() -> impl Strategy<Value = f64> {
    prop_oneof![
        1 => Just(0.0),
        6 => 0.001..5.0,
    ]
}

fn market_strategy() -> impl Strategy<Value = MarketState> {
    (
        spot_strategy(),
        rate_strategy(),
        dividend_strategy(),
        volatility_strategy(),
        expiry_strategy(),
    )
        .prop_map(|(s, r, q, v, t)| MarketState::new(s, r, q, v, t).unwrap())
}

fn call(strike: f64) -> InstrumentSpec {
    InstrumentSpec::call(strike, 1.0, 1.0).unwrap()
}

fn put(strike: f64) -> InstrumentSpec {
    InstrumentSpec::put(strike, 1.0, 1.0).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn test_put_call_parity(market in market_strategy(), strike in spot_strategy()) {
        let c = price(&call(strike), &market).unwrap();
        let p = price(&put(strike), &market).unwrap();
        let forward = market.spot() * market.dividend_discount_factor()
            - strike * market.discount_factor();
        prop_assert!(
            (c.price - p.price - forward).abs() < 1e-8,
            "C - P = {} but forward = {}",
            c.price - p.price,
            forward
        );
    }

    #[test]
    fn test_vega_non_negative(market in market_strategy(), strike in spot_strategy()) {
        prop_assert!(price(&call(strike), &market).unwrap().vega >= 0.0);
        prop_assert!(price(&put(strike), &market).unwrap().vega >= 0.0);
    }

    #[test]
    fn test_delta_bounds(market in market_strategy(), strike in spot_strategy()) {
        let dc = price(&call(strike), &market).unwrap().delta;
        let dp = price(&put(strike), &market).unwrap().delta;
        prop_assert!((0.0..=1.0).contains(&dc), "call delta {}", dc);
        prop_assert!((-1.0..=0.0).contains(&dp), "put delta {}", dp);
    }

    #[test]
    fn test_expiry_is_exact_intrinsic(
        spot in spot_strategy(),
        strike in spot_strategy(),
        vol in 0.0..2.0_f64,
    ) {
        let market = MarketState::new(spot, 0.05, 0.0, vol, 0.0).unwrap();
        let c = price(&call(strike), &market).unwrap();
        let p = price(&put(strike), &market).unwrap();
        prop_assert_eq!(c.price, (spot - strike).max(0.0));
        prop_assert_eq!(p.price, (strike - spot).max(0.0));
        prop_assert_eq!(c.gamma, 0.0);
        prop_assert_eq!(p.vega, 0.0);
        prop_assert_eq!(c.theta, 0.0);
    }

    #[test]
    fn test_near_expiry_converges_to_intrinsic(
        spot in 50.0..200.0_f64,
        strike in 50.0..200.0_f64,
        vol in 0.05..1.0_f64,
    ) {
        let market = MarketState::new(spot, 0.05, 0.0, vol, 1e-16).unwrap();
        let c = price(&call(strike), &market).unwrap();
        let p = price(&put(strike), &market).unwrap();
        prop_assert!((c.price - (spot - strike).max(0.0)).abs() < 1e-6);
        prop_assert!((p.price - (strike - spot).max(0.0)).abs() < 1e-6);
    }

    #[test]
    fn test_implied_volatility_round_trip(
        moneyness in 0.5..2.0_f64,
        rate in -0.02..0.1_f64,
        dividend in 0.0..0.05_f64,
        vol in 0.01..=5.0_f64,
        expiry in 0.01..5.0_f64,
        is_call in any::<bool>(),
    ) {
        let market = MarketState::new(100.0, rate, dividend, vol, expiry).unwrap();
        let strike = 100.0 * moneyness;
        let instrument = if is_call { call(strike) } else { put(strike) };

        let result = price(&instrument, &market).unwrap();
        // Below this the price does not pin σ down to 1e-6 in f64
        prop_assume!(result.vega > 1e-4);

        let recovered = implied_volatility(&instrument, &market, result.price).unwrap();
        prop_assert!(
            (recovered - vol).abs() < 1e-6,
            "recovered {} for true volatility {}",
            recovered,
            vol
        );
    }
}

#[test]
fn test_reference_values() {
    let market = MarketState::new(100.0, 0.05, 0.0, 0.2, 1.0).unwrap();
    let c = price(&call(100.0), &market).unwrap();
    let p = price(&put(100.0), &market).unwrap();

    assert_relative_eq!(c.price, 10.4506, epsilon = 1e-3);
    assert_relative_eq!(c.delta, 0.6368, epsilon = 1e-3);
    assert_relative_eq!(p.price, 5.5735, epsilon = 1e-3);
    assert_relative_eq!(p.delta, -0.3632, epsilon = 1e-3);
}

#[test]
fn test_arbitrage_rejection() {
    let market = MarketState::new(120.0, 0.05, 0.0, 0.2, 1.0).unwrap();
    let err = implied_volatility(&call(100.0), &market, 5.0).unwrap_err();
    assert!(matches!(err, PricingError::ArbitrageViolation { observed, .. } if observed == 5.0));
}
