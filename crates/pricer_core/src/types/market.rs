//! Market snapshot used for every valuation.

use super::error::PricingError;
use super::time::DAYS_PER_YEAR;

/// Immutable snapshot of the market inputs needed to price one underlying.
///
/// A new value is built for every valuation; the `with_*` methods return
/// shifted copies and never touch `self`. Those copies are not validated,
/// so a shock that drives a field out of range is caught by
/// [`MarketState::validate`] when the shocked state is priced.
///
/// # Examples
/// ```
/// use pricer_core::types::MarketState;
///
/// let market = MarketState::new(100.0, 0.05, 0.0, 0.2, 1.0).unwrap();
/// let bumped = market.with_spot(110.0);
/// assert_eq!(market.spot(), 100.0);
/// assert_eq!(bumped.spot(), 110.0);
///
/// assert!(MarketState::new(-1.0, 0.05, 0.0, 0.2, 1.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarketState {
    spot: f64,
    rate: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    dividend_yield: f64,
    volatility: f64,
    time_to_expiry: f64,
}

impl MarketState {
    /// Creates a validated market state.
    ///
    /// # Errors
    /// `PricingError::InvalidInput` when `spot <= 0`, `dividend_yield < 0`,
    /// `volatility < 0`, `time_to_expiry < 0`, or any field is not finite.
    pub fn new(
        spot: f64,
        rate: f64,
        dividend_yield: f64,
        volatility: f64,
        time_to_expiry: f64,
    ) -> Result<Self, PricingError> {
        let state = Self {
            spot,
            rate,
            dividend_yield,
            volatility,
            time_to_expiry,
        };
        state.validate()?;
        Ok(state)
    }

    /// Creates a market state with expiry given in calendar days (Act/365).
    pub fn from_days(
        spot: f64,
        rate: f64,
        dividend_yield: f64,
        volatility: f64,
        days_to_expiry: f64,
    ) -> Result<Self, PricingError> {
        Self::new(
            spot,
            rate,
            dividend_yield,
            volatility,
            days_to_expiry / DAYS_PER_YEAR,
        )
    }

    /// Checks every invariant.
    pub fn validate(&self) -> Result<(), PricingError> {
        check_finite("spot", self.spot)?;
        check_finite("rate", self.rate)?;
        check_finite("dividend_yield", self.dividend_yield)?;
        check_finite("volatility", self.volatility)?;
        check_finite("time_to_expiry", self.time_to_expiry)?;

        if self.spot <= 0.0 {
            return Err(PricingError::invalid_input(
                "spot",
                self.spot,
                "must be positive",
            ));
        }
        if self.dividend_yield < 0.0 {
            return Err(PricingError::invalid_input(
                "dividend_yield",
                self.dividend_yield,
                "must be non-negative",
            ));
        }
        if self.volatility < 0.0 {
            return Err(PricingError::invalid_input(
                "volatility",
                self.volatility,
                "must be non-negative",
            ));
        }
        if self.time_to_expiry < 0.0 {
            return Err(PricingError::invalid_input(
                "time_to_expiry",
                self.time_to_expiry,
                "must be non-negative",
            ));
        }
        Ok(())
    }

    /// Spot price of the underlying.
    #[inline]
    pub fn spot(&self) -> f64 {
        self.spot
    }

    /// Continuously compounded risk-free rate.
    #[inline]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Continuous dividend yield.
    #[inline]
    pub fn dividend_yield(&self) -> f64 {
        self.dividend_yield
    }

    /// Annualised volatility.
    #[inline]
    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    /// Time to expiry in years.
    #[inline]
    pub fn time_to_expiry(&self) -> f64 {
        self.time_to_expiry
    }

    /// Discount factor `e^(-rT)`.
    #[inline]
    pub fn discount_factor(&self) -> f64 {
        (-self.rate * self.time_to_expiry).exp()
    }

    /// Dividend discount factor `e^(-qT)`.
    #[inline]
    pub fn dividend_discount_factor(&self) -> f64 {
        (-self.dividend_yield * self.time_to_expiry).exp()
    }

    /// Forward price `S e^((r-q)T)`.
    #[inline]
    pub fn forward(&self) -> f64 {
        self.spot * ((self.rate - self.dividend_yield) * self.time_to_expiry).exp()
    }

    /// Copy with a different spot.
    pub fn with_spot(&self, spot: f64) -> Self {
        Self { spot, ..*self }
    }

    /// Copy with a different volatility.
    pub fn with_volatility(&self, volatility: f64) -> Self {
        Self { volatility, ..*self }
    }

    /// Copy with a different time to expiry.
    pub fn with_time_to_expiry(&self, time_to_expiry: f64) -> Self {
        Self {
            time_to_expiry,
            ..*self
        }
    }
}

fn check_finite(field: &str, value: f64) -> Result<(), PricingError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(PricingError::invalid_input(field, value, "must be finite"))
    }
}
