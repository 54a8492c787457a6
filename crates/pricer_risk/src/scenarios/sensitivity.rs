//! Portfolio measures along a range of spot prices.

use crate::parallel::ParallelConfig;
use crate::portfolio::PortfolioAggregator;
use pricer_core::types::{InstrumentSpec, MarketState, PricingError};
use pricer_models::PricingResult;
use std::fmt;
use std::str::FromStr;

/// Selects one field of a [`PricingResult`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Greek {
    /// Value
    Price,
    /// ∂V/∂S
    Delta,
    /// ∂²V/∂S²
    Gamma,
    /// ∂V/∂σ
    Vega,
    /// ∂V/∂t
    Theta,
    /// ∂V/∂r
    Rho,
}

impl Greek {
    /// Reads the selected field.
    #[inline]
    pub fn of(&self, result: &PricingResult) -> f64 {
        match self {
            Self::Price => result.price,
            Self::Delta => result.delta,
            Self::Gamma => result.gamma,
            Self::Vega => result.vega,
            Self::Theta => result.theta,
            Self::Rho => result.rho,
        }
    }

    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::Delta => "delta",
            Self::Gamma => "gamma",
            Self::Vega => "vega",
            Self::Theta => "theta",
            Self::Rho => "rho",
        }
    }
}

impl fmt::Display for Greek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Greek {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "price" => Ok(Self::Price),
            "delta" => Ok(Self::Delta),
            "gamma" => Ok(Self::Gamma),
            "vega" => Ok(Self::Vega),
            "theta" => Ok(Self::Theta),
            "rho" => Ok(Self::Rho),
            other => Err(format!("unknown greek '{other}'")),
        }
    }
}

/// One point of a spot profile.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProfilePoint {
    /// Spot price
    pub spot: f64,
    /// Measure at that spot
    pub value: f64,
}

/// Default lower spot factor of a profile.
pub const DEFAULT_PROFILE_LOWER: f64 = 0.7;
/// Default upper spot factor of a profile.
pub const DEFAULT_PROFILE_UPPER: f64 = 1.3;
/// Default number of profile points.
pub const DEFAULT_PROFILE_POINTS: usize = 100;

/// Aggregated `greek` at `points` evenly spaced spots in
/// `[lower * spot, upper * spot]`.
///
/// # Errors
/// `PricingError::InvalidInput` when the market is invalid, `lower` is not
/// positive, `upper < lower`, or `points < 2`.
///
/// # Examples
/// ```
/// use pricer_core::types::{InstrumentSpec, MarketState};
/// use pricer_risk::scenarios::{sensitivity_profile, Greek};
///
/// let market = MarketState::new(100.0, 0.05, 0.0, 0.2, 1.0).unwrap();
/// let legs = vec![InstrumentSpec::call(100.0, 1.0, 1.0).unwrap()];
///
/// let profile = sensitivity_profile(&legs, &market, Greek::Delta, 0.7, 1.3, 61).unwrap();
/// assert_eq!(profile.len(), 61);
/// assert!((profile[0].spot - 70.0).abs() < 1e-12);
/// assert!(profile.windows(2).all(|w| w[1].value >= w[0].value));
/// ```
pub fn sensitivity_profile(
    instruments: &[InstrumentSpec],
    market: &MarketState,
    greek: Greek,
    lower: f64,
    upper: f64,
    points: usize,
) -> Result<Vec<ProfilePoint>, PricingError> {
    SpotProfiler::default().greek(instruments, market, greek, lower, upper, points)
}

/// Net position value relative to the base value at each spot of the
/// profile range.
///
/// # Errors
/// As [`sensitivity_profile`].
pub fn pnl_profile(
    instruments: &[InstrumentSpec],
    market: &MarketState,
    lower: f64,
    upper: f64,
    points: usize,
) -> Result<Vec<ProfilePoint>, PricingError> {
    SpotProfiler::default().pnl(instruments, market, lower, upper, points)
}

/// Evaluates portfolio measures over a spot range.
#[derive(Clone, Debug, Default)]
pub struct SpotProfiler {
    parallel: ParallelConfig,
}

impl SpotProfiler {
    /// Creates a profiler with the given parallel settings.
    pub fn new(parallel: ParallelConfig) -> Self {
        Self { parallel }
    }

    /// Aggregated `greek` along the range. See [`sensitivity_profile`].
    pub fn greek(
        &self,
        instruments: &[InstrumentSpec],
        market: &MarketState,
        greek: Greek,
        lower: f64,
        upper: f64,
        points: usize,
    ) -> Result<Vec<ProfilePoint>, PricingError> {
        self.profile(instruments, market, lower, upper, points, |total, _| greek.of(total))
    }

    /// P&L against the base value along the range. See [`pnl_profile`].
    pub fn pnl(
        &self,
        instruments: &[InstrumentSpec],
        market: &MarketState,
        lower: f64,
        upper: f64,
        points: usize,
    ) -> Result<Vec<ProfilePoint>, PricingError> {
        self.profile(instruments, market, lower, upper, points, |total, base| {
            total.price - base.price
        })
    }

    /// Evaluates `measure(total, base_total)` at each spot of the range.
    ///
    /// # Errors
    /// As [`sensitivity_profile`].
    pub fn profile<F>(
        &self,
        instruments: &[InstrumentSpec],
        market: &MarketState,
        lower: f64,
        upper: f64,
        points: usize,
        measure: F,
    ) -> Result<Vec<ProfilePoint>, PricingError>
    where
        F: Fn(&PricingResult, &PricingResult) -> f64 + Sync + Send,
    {
        market.validate()?;
        if !(lower.is_finite() && lower > 0.0) {
            return Err(PricingError::invalid_input("lower", lower, "must be positive"));
        }
        if !(upper.is_finite() && upper >= lower) {
            return Err(PricingError::invalid_input(
                "upper",
                upper,
                "must not be below the lower factor",
            ));
        }
        if points < 2 {
            return Err(PricingError::invalid_input(
                "points",
                points as f64,
                "must be at least 2",
            ));
        }

        // Legs are valued sequentially inside each point
        let aggregator = PortfolioAggregator::new(ParallelConfig::sequential());
        let base = *aggregator.aggregate(instruments, market).total();
        let start = lower * market.spot();
        let step = (upper - lower) * market.spot() / (points - 1) as f64;

        Ok(self.parallel.map_indices(points, |k| {
            let spot = start + step * k as f64;
            let total = *aggregator.aggregate(instruments, &market.with_spot(spot)).total();
            ProfilePoint {
                spot,
                value: measure(&total, &base),
            }
        }))
    }
}
