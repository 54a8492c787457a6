//! Black-Scholes pricing model for European options.
//!
//! This module provides the Black-Scholes-Merton model with a continuous
//! dividend yield for pricing European call and put options with analytical
//! Greeks.
//!
//! ## Mathematical Formulas
//!
//! **Call Price**: C = S·e^(-qT)·N(d₁) - K·e^(-rT)·N(d₂)
//! **Put Price**: P = C - S·e^(-qT) + K·e^(-rT) (put-call parity)
//!
//! Where:
//! - d₁ = (ln(S/K) + (r - q + σ²/2)T) / (σ√T)
//! - d₂ = d₁ - σ√T

use num_traits::Float;
use pricer_core::math::distributions::{norm_cdf, norm_pdf};
use pricer_core::types::{MarketState, PricingError};

/// Black-Scholes model for European option pricing.
///
/// Holds one market configuration with strictly positive volatility and
/// expiry. The degenerate cases (`σ = 0` or `T = 0`) have no `d₁` and are
/// valued elsewhere, so construction rejects them.
///
/// # Type Parameters
/// * `T` - Floating-point type implementing `Float` (e.g., `f64`)
///
/// # Examples
/// ```
/// use pricer_models::analytical::BlackScholes;
///
/// let bs = BlackScholes::new(100.0_f64, 0.05, 0.0, 0.2, 1.0).unwrap();
/// let call_price = bs.price_call(100.0);
/// let put_price = bs.price_put(100.0);
///
/// // Put-call parity: C - P = S - K*exp(-rT)
/// let parity = call_price - put_price - (100.0 - 100.0 * (-0.05_f64).exp());
/// assert!(parity.abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct BlackScholes<T: Float> {
    /// Spot price (S)
    spot: T,
    /// Risk-free interest rate (r)
    rate: T,
    /// Continuous dividend yield (q)
    dividend_yield: T,
    /// Volatility (σ)
    volatility: T,
    /// Time to expiry in years (T)
    expiry: T,
}

impl<T: Float> BlackScholes<T> {
    /// Creates a new Black-Scholes model.
    ///
    /// # Errors
    /// `PricingError::InvalidInput` if spot, volatility or expiry is not
    /// strictly positive, or the dividend yield is negative.
    ///
    /// # Examples
    /// ```
    /// use pricer_models::analytical::BlackScholes;
    ///
    /// assert!(BlackScholes::new(100.0_f64, 0.05, 0.0, 0.2, 1.0).is_ok());
    ///
    /// // Degenerate volatility
    /// assert!(BlackScholes::new(100.0_f64, 0.05, 0.0, 0.0, 1.0).is_err());
    /// ```
    pub fn new(
        spot: T,
        rate: T,
        dividend_yield: T,
        volatility: T,
        expiry: T,
    ) -> Result<Self, PricingError> {
        let zero = T::zero();
        let as_f64 = |v: T| v.to_f64().unwrap_or(f64::NAN);

        if !(spot > zero) {
            return Err(PricingError::invalid_input(
                "spot",
                as_f64(spot),
                "must be positive",
            ));
        }
        if !(dividend_yield >= zero) {
            return Err(PricingError::invalid_input(
                "dividend_yield",
                as_f64(dividend_yield),
                "must be non-negative",
            ));
        }
        if !(volatility > zero) {
            return Err(PricingError::invalid_input(
                "volatility",
                as_f64(volatility),
                "must be positive for the analytic formula",
            ));
        }
        if !(expiry > zero) {
            return Err(PricingError::invalid_input(
                "time_to_expiry",
                as_f64(expiry),
                "must be positive for the analytic formula",
            ));
        }
        if !rate.is_finite() {
            return Err(PricingError::invalid_input(
                "rate",
                as_f64(rate),
                "must be finite",
            ));
        }

        Ok(Self {
            spot,
            rate,
            dividend_yield,
            volatility,
            expiry,
        })
    }

    /// Returns the spot price.
    #[inline]
    pub fn spot(&self) -> T {
        self.spot
    }

    /// Returns the risk-free rate.
    #[inline]
    pub fn rate(&self) -> T {
        self.rate
    }

    /// Returns the dividend yield.
    #[inline]
    pub fn dividend_yield(&self) -> T {
        self.dividend_yield
    }

    /// Returns the volatility.
    #[inline]
    pub fn volatility(&self) -> T {
        self.volatility
    }

    /// Returns the time to expiry.
    #[inline]
    pub fn expiry(&self) -> T {
        self.expiry
    }

    #[inline]
    fn discount(&self) -> T {
        (-self.rate * self.expiry).exp()
    }

    #[inline]
    fn dividend_discount(&self) -> T {
        (-self.dividend_yield * self.expiry).exp()
    }

    /// Computes the d1 term.
    ///
    /// d₁ = (ln(S/K) + (r - q + σ²/2)T) / (σ√T)
    #[inline]
    pub fn d1(&self, strike: T) -> T {
        let half = T::from(0.5).unwrap_or_else(T::zero);
        let vol_sqrt_t = self.volatility * self.expiry.sqrt();

        let log_moneyness = (self.spot / strike).ln();
        let drift =
            (self.rate - self.dividend_yield + half * self.volatility * self.volatility) * self.expiry;

        (log_moneyness + drift) / vol_sqrt_t
    }

    /// Computes the d2 term.
    ///
    /// d₂ = d₁ - σ√T
    #[inline]
    pub fn d2(&self, strike: T) -> T {
        self.d1(strike) - self.volatility * self.expiry.sqrt()
    }

    /// Computes European call option price.
    ///
    /// C = S·e^(-qT)·N(d₁) - K·e^(-rT)·N(d₂)
    ///
    /// # Examples
    /// ```
    /// use pricer_models::analytical::BlackScholes;
    ///
    /// let bs = BlackScholes::new(100.0_f64, 0.05, 0.0, 0.2, 1.0).unwrap();
    /// assert!((bs.price_call(100.0) - 10.4506).abs() < 1e-3);
    /// ```
    #[inline]
    pub fn price_call(&self, strike: T) -> T {
        let d1 = self.d1(strike);
        let d2 = self.d2(strike);

        self.spot * self.dividend_discount() * norm_cdf(d1)
            - strike * self.discount() * norm_cdf(d2)
    }

    /// Computes European put option price through put-call parity.
    ///
    /// P = C - S·e^(-qT) + K·e^(-rT)
    ///
    /// Rounding in the subtraction can leave a deep out-of-the-money put a
    /// few ulps below zero; the result is floored at 0.
    #[inline]
    pub fn price_put(&self, strike: T) -> T {
        let put = self.price_call(strike) - self.spot * self.dividend_discount()
            + strike * self.discount();
        put.max(T::zero())
    }

    /// Computes Delta (∂V/∂S).
    ///
    /// - Call Delta = e^(-qT)·N(d₁)
    /// - Put Delta = e^(-qT)·(N(d₁) - 1)
    #[inline]
    pub fn delta(&self, strike: T, is_call: bool) -> T {
        let n_d1 = norm_cdf(self.d1(strike));
        let dq = self.dividend_discount();

        if is_call {
            dq * n_d1
        } else {
            dq * (n_d1 - T::one())
        }
    }

    /// Computes Gamma (∂²V/∂S²).
    ///
    /// Gamma = e^(-qT)·φ(d₁) / (S·σ·√T), identical for calls and puts.
    #[inline]
    pub fn gamma(&self, strike: T) -> T {
        let d1 = self.d1(strike);
        self.dividend_discount() * norm_pdf(d1)
            / (self.spot * self.volatility * self.expiry.sqrt())
    }

    /// Computes Vega (∂V/∂σ) per unit volatility.
    ///
    /// Vega = S·e^(-qT)·φ(d₁)·√T, identical for calls and puts.
    #[inline]
    pub fn vega(&self, strike: T) -> T {
        let d1 = self.d1(strike);
        self.spot * self.dividend_discount() * norm_pdf(d1) * self.expiry.sqrt()
    }

    /// Computes Theta, the calendar-time derivative per year.
    ///
    /// - Call: -S·e^(-qT)·φ(d₁)·σ/(2√T) - r·K·e^(-rT)·N(d₂) + q·S·e^(-qT)·N(d₁)
    /// - Put: -S·e^(-qT)·φ(d₁)·σ/(2√T) + r·K·e^(-rT)·N(-d₂) - q·S·e^(-qT)·N(-d₁)
    ///
    /// Usually negative (time decay).
    #[inline]
    pub fn theta(&self, strike: T, is_call: bool) -> T {
        let d1 = self.d1(strike);
        let d2 = self.d2(strike);
        let two = T::one() + T::one();
        let carry_spot = self.spot * self.dividend_discount();
        let carry_strike = strike * self.discount();

        let decay = -(carry_spot * norm_pdf(d1) * self.volatility) / (two * self.expiry.sqrt());

        if is_call {
            decay - self.rate * carry_strike * norm_cdf(d2)
                + self.dividend_yield * carry_spot * norm_cdf(d1)
        } else {
            decay + self.rate * carry_strike * norm_cdf(-d2)
                - self.dividend_yield * carry_spot * norm_cdf(-d1)
        }
    }

    /// Computes Rho (∂V/∂r).
    ///
    /// - Call Rho = K·T·e^(-rT)·N(d₂)
    /// - Put Rho = -K·T·e^(-rT)·N(-d₂)
    #[inline]
    pub fn rho(&self, strike: T, is_call: bool) -> T {
        let d2 = self.d2(strike);
        let scale = strike * self.expiry * self.discount();

        if is_call {
            scale * norm_cdf(d2)
        } else {
            -scale * norm_cdf(-d2)
        }
    }
}

impl BlackScholes<f64> {
    /// Builds the model from a market snapshot.
    ///
    /// # Errors
    /// `PricingError::InvalidInput` when the snapshot is degenerate
    /// (`σ = 0` or `T = 0`) or invalid.
    pub fn from_market(market: &MarketState) -> Result<Self, PricingError> {
        Self::new(
            market.spot(),
            market.rate(),
            market.dividend_yield(),
            market.volatility(),
            market.time_to_expiry(),
        )
    }
}
