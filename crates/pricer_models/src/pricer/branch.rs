//! Valuation branches for degenerate markets.
//!
//! The analytic formula divides by `σ√T`. When either factor is zero the
//! option is valued on closed-form limits instead, without evaluating `d₁`.

use super::PricingResult;
use pricer_core::types::{InstrumentKind, MarketState};
use std::fmt;

/// Which valuation path produced a [`PricingResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ValuationBranch {
    /// Closed-form Black-Scholes (options) or cost-of-carry forward (futures)
    Analytic,
    /// Expired option (`T == 0`): intrinsic value and step delta
    Intrinsic,
    /// Zero-volatility option (`σ == 0`, `T > 0`): deterministic forward value
    Deterministic,
}

impl ValuationBranch {
    /// Selects the branch for an instrument kind and market.
    pub fn select(kind: InstrumentKind, market: &MarketState) -> Self {
        match kind {
            InstrumentKind::Future => ValuationBranch::Analytic,
            InstrumentKind::Call | InstrumentKind::Put => {
                if market.time_to_expiry() == 0.0 {
                    ValuationBranch::Intrinsic
                } else if market.volatility() == 0.0 {
                    ValuationBranch::Deterministic
                } else {
                    ValuationBranch::Analytic
                }
            }
        }
    }

    /// Lowercase name for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValuationBranch::Analytic => "analytic",
            ValuationBranch::Intrinsic => "intrinsic",
            ValuationBranch::Deterministic => "deterministic",
        }
    }
}

impl fmt::Display for ValuationBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expiry payoff. At-the-money delta is 0 on both sides.
pub(crate) fn intrinsic(is_call: bool, strike: f64, spot: f64) -> PricingResult {
    let (price, delta) = if is_call {
        if spot > strike {
            (spot - strike, 1.0)
        } else {
            (0.0, 0.0)
        }
    } else if spot < strike {
        (strike - spot, -1.0)
    } else {
        (0.0, 0.0)
    };

    PricingResult {
        price,
        delta,
        ..PricingResult::zero()
    }
}

/// Zero-volatility value on the discounted forward.
///
/// With `A = S e^(-qT)` and `B = K e^(-rT)` the call is worth `max(A - B, 0)`
/// and the put `max(B - A, 0)`, so parity `C - P = A - B` holds exactly.
/// Theta and rho are the derivatives of that value; at the forward every
/// Greek is 0.
pub(crate) fn deterministic(is_call: bool, strike: f64, market: &MarketState) -> PricingResult {
    let t = market.time_to_expiry();
    let carry_spot = market.spot() * market.dividend_discount_factor();
    let carry_strike = strike * market.discount_factor();
    let r = market.rate();
    let q = market.dividend_yield();

    let in_the_money = if is_call {
        carry_spot > carry_strike
    } else {
        carry_strike > carry_spot
    };
    if !in_the_money {
        return PricingResult::zero();
    }

    let sign = if is_call { 1.0 } else { -1.0 };
    PricingResult {
        price: sign * (carry_spot - carry_strike),
        delta: sign * market.dividend_discount_factor(),
        gamma: 0.0,
        vega: 0.0,
        theta: sign * (q * carry_spot - r * carry_strike),
        rho: sign * strike * t * market.discount_factor(),
    }
}
