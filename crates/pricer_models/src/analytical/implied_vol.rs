//! Implied volatility inversion.
//!
//! Recovers the Black-Scholes volatility that reproduces an observed option
//! price. The search runs in two phases that share one iteration budget:
//!
//! 1. Safeguarded Newton-Raphson with vega as derivative, seeded by the
//!    Brenner-Subrahmanyam approximation
//! 2. Bisection on the bracket Newton has narrowed, entered when Newton
//!    stalls on a small vega, diverges, or steps out of the bracket
//!
//! Observed prices outside the no-arbitrage interval are rejected before any
//! iteration.

use super::BlackScholes;
use pricer_core::math::solvers::{
    BisectionSolver, Bracket, NewtonRaphsonSolver, RootResult, SolverConfig,
};
use pricer_core::types::{InstrumentKind, InstrumentSpec, MarketState, PricingError, SolverError};
use std::f64::consts::PI;
use tracing::{debug, trace};

/// Newton steps taken after the price residual is met, until the step is
/// below `vol_tolerance`.
const POLISH_STEPS: usize = 3;

/// Tolerances and search limits of the implied volatility solver.
///
/// # Examples
/// ```
/// use pricer_models::analytical::ImpliedVolConfig;
///
/// let config = ImpliedVolConfig {
///     max_iterations: 50,
///     ..ImpliedVolConfig::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ImpliedVolConfig {
    /// Newton residual test `|price(σ) - observed| < price_tolerance`,
    /// after which σ is refined until a step is below `vol_tolerance`
    pub price_tolerance: f64,
    /// Stop when a step changes σ by less than this
    pub vol_tolerance: f64,
    /// Iterations shared by the Newton and bisection phases
    pub max_iterations: usize,
    /// Largest absolute Newton step in σ
    pub max_step: f64,
    /// Vega below this hands over to bisection
    pub min_vega: f64,
    /// Lower end of the initial bracket
    pub vol_lower: f64,
    /// Upper end of the initial bracket
    pub vol_upper: f64,
    /// The upper end doubles up to this value when it does not bracket
    pub vol_ceiling: f64,
}

impl Default for ImpliedVolConfig {
    fn default() -> Self {
        Self {
            price_tolerance: 1e-6,
            vol_tolerance: 1e-8,
            max_iterations: 100,
            max_step: 0.5,
            min_vega: 1e-8,
            vol_lower: 0.0,
            vol_upper: 5.0,
            vol_ceiling: 20.0,
        }
    }
}

impl ImpliedVolConfig {
    /// Checks that tolerances are positive and the bracket is well formed.
    pub fn validate(&self) -> Result<(), PricingError> {
        let positive = [
            ("price_tolerance", self.price_tolerance),
            ("vol_tolerance", self.vol_tolerance),
            ("max_step", self.max_step),
            ("min_vega", self.min_vega),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(PricingError::invalid_input(field, value, "must be positive"));
            }
        }
        if self.max_iterations == 0 {
            return Err(PricingError::invalid_input(
                "max_iterations",
                0.0,
                "must be at least 1",
            ));
        }
        if !(self.vol_lower >= 0.0 && self.vol_upper > self.vol_lower) {
            return Err(PricingError::invalid_input(
                "vol_upper",
                self.vol_upper,
                "must exceed a non-negative vol_lower",
            ));
        }
        if !(self.vol_ceiling >= self.vol_upper && self.vol_ceiling.is_finite()) {
            return Err(PricingError::invalid_input(
                "vol_ceiling",
                self.vol_ceiling,
                "must be finite and at least vol_upper",
            ));
        }
        Ok(())
    }

    fn solver_config(&self) -> SolverConfig<f64> {
        SolverConfig {
            tolerance: self.price_tolerance,
            x_tolerance: self.vol_tolerance,
            max_iterations: self.max_iterations,
        }
    }
}

/// Implied volatility solver.
///
/// # Examples
/// ```
/// use pricer_core::types::{InstrumentSpec, MarketState};
/// use pricer_models::analytical::{ImpliedVolConfig, ImpliedVolatilitySolver};
/// use pricer_models::price;
///
/// let market = MarketState::new(100.0, 0.05, 0.0, 0.25, 0.5).unwrap();
/// let call = InstrumentSpec::call(105.0, 1.0, 1.0).unwrap();
/// let observed = price(&call, &market).unwrap().price;
///
/// let solver = ImpliedVolatilitySolver::new(ImpliedVolConfig::default());
/// let vol = solver.solve(&call, &market, observed).unwrap();
/// assert!((vol - 0.25).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ImpliedVolatilitySolver {
    config: ImpliedVolConfig,
}

impl ImpliedVolatilitySolver {
    /// Creates a solver with the given configuration.
    pub fn new(config: ImpliedVolConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ImpliedVolConfig {
        &self.config
    }

    /// Finds σ such that the model price of one unit of `instrument` equals
    /// `observed_price`. The volatility in `market` is ignored.
    ///
    /// # Errors
    /// - `PricingError::InvalidInput` for invalid inputs, futures, expired
    ///   options, or an invalid configuration
    /// - `PricingError::ArbitrageViolation` when the price lies outside the
    ///   no-arbitrage interval
    /// - `PricingError::NoConvergence` when the iteration budget runs out
    pub fn solve(
        &self,
        instrument: &InstrumentSpec,
        market: &MarketState,
        observed_price: f64,
    ) -> Result<f64, PricingError> {
        self.config.validate()?;
        instrument.validate()?;
        market.validate()?;

        let is_call = match instrument.kind() {
            InstrumentKind::Call => true,
            InstrumentKind::Put => false,
            InstrumentKind::Future => {
                return Err(PricingError::invalid_input(
                    "kind",
                    f64::NAN,
                    "futures have no volatility dependence",
                ));
            }
        };
        if market.time_to_expiry() == 0.0 {
            return Err(PricingError::invalid_input(
                "time_to_expiry",
                0.0,
                "an expired option has no volatility dependence",
            ));
        }
        if !observed_price.is_finite() {
            return Err(PricingError::invalid_input(
                "observed_price",
                observed_price,
                "must be finite",
            ));
        }

        let objective = Objective::new(is_call, instrument.strike(), market, observed_price);
        objective.check_bounds()?;

        if observed_price - objective.lower_bound <= objective.slack() {
            debug!(observed_price, lower = objective.lower_bound, "price at lower bound");
            return Ok(0.0);
        }

        let mut bracket = self.initial_bracket(&objective)?;
        let seed = bracket.clamp(objective.seed());
        trace!(
            seed,
            lower = bracket.lower(),
            upper = bracket.upper(),
            "starting Newton phase"
        );

        let newton = NewtonRaphsonSolver::new(self.config.solver_config())
            .with_max_step(self.config.max_step)
            .with_min_derivative(self.config.min_vega)
            .with_polish_steps(POLISH_STEPS);

        match newton.find_root(|v| objective.value(v), |v| objective.vega(v), seed, &mut bracket) {
            Ok(root) => {
                debug!(volatility = root.root, iterations = root.iterations, "converged (Newton)");
                Ok(root.root.max(0.0))
            }
            Err(SolverError::MaxIterationsExceeded { iterations }) => {
                let last = bracket.midpoint();
                Err(PricingError::NoConvergence {
                    iterations,
                    last_volatility: last,
                    residual: objective.value(last),
                })
            }
            Err(err) => {
                let spent = err.iterations();
                debug!(
                    reason = %err,
                    spent,
                    lower = bracket.lower(),
                    upper = bracket.upper(),
                    "falling back to bisection"
                );
                self.bisect(&objective, bracket, spent)
            }
        }
    }

    /// `[vol_lower, vol_upper]`, with the upper end doubled up to the
    /// ceiling until the model price reaches the observed price.
    fn initial_bracket(&self, objective: &Objective) -> Result<Bracket<f64>, PricingError> {
        let mut upper = self.config.vol_upper;
        let mut residual = objective.value(upper);
        while residual < 0.0 && upper < self.config.vol_ceiling {
            upper = (upper * 2.0).min(self.config.vol_ceiling);
            residual = objective.value(upper);
            trace!(upper, residual, "widening bracket");
        }
        if residual < 0.0 {
            return Err(PricingError::NoConvergence {
                iterations: 0,
                last_volatility: upper,
                residual,
            });
        }
        Ok(Bracket::new(self.config.vol_lower, upper))
    }

    fn bisect(
        &self,
        objective: &Objective,
        bracket: Bracket<f64>,
        spent: usize,
    ) -> Result<f64, PricingError> {
        // Width criterion only
        let remaining = self.config.max_iterations.saturating_sub(spent);
        let config = SolverConfig {
            tolerance: 0.0,
            ..self.config.solver_config()
        }
        .with_max_iterations(remaining);
        let solver = BisectionSolver::new(config);

        match solver.find_root(|v| objective.value(v), bracket) {
            Ok(RootResult {
                root, iterations, ..
            }) => {
                debug!(volatility = root, iterations = spent + iterations, "converged (bisection)");
                Ok(root.max(0.0))
            }
            Err(err) => {
                let last = bracket.midpoint();
                Err(PricingError::NoConvergence {
                    iterations: spent + err.iterations(),
                    last_volatility: last,
                    residual: objective.value(last),
                })
            }
        }
    }
}

/// Implied volatility with the default configuration.
///
/// # Examples
/// ```
/// use pricer_core::types::{InstrumentSpec, MarketState, PricingError};
/// use pricer_models::implied_volatility;
///
/// let market = MarketState::new(120.0, 0.05, 0.0, 0.2, 1.0).unwrap();
/// let call = InstrumentSpec::call(100.0, 1.0, 1.0).unwrap();
///
/// // Below intrinsic value
/// let err = implied_volatility(&call, &market, 5.0).unwrap_err();
/// assert!(matches!(err, PricingError::ArbitrageViolation { .. }));
/// ```
pub fn implied_volatility(
    instrument: &InstrumentSpec,
    market: &MarketState,
    observed_price: f64,
) -> Result<f64, PricingError> {
    ImpliedVolatilitySolver::default().solve(instrument, market, observed_price)
}

/// `f(σ) = price(σ) - observed`, increasing in σ.
struct Objective {
    is_call: bool,
    strike: f64,
    spot: f64,
    rate: f64,
    dividend_yield: f64,
    expiry: f64,
    observed: f64,
    carry_spot: f64,
    carry_strike: f64,
    lower_bound: f64,
    upper_bound: f64,
}

impl Objective {
    fn new(is_call: bool, strike: f64, market: &MarketState, observed: f64) -> Self {
        let carry_spot = market.spot() * market.dividend_discount_factor();
        let carry_strike = strike * market.discount_factor();
        let (lower_bound, upper_bound) = if is_call {
            ((carry_spot - carry_strike).max(0.0), carry_spot)
        } else {
            ((carry_strike - carry_spot).max(0.0), carry_strike)
        };

        Self {
            is_call,
            strike,
            spot: market.spot(),
            rate: market.rate(),
            dividend_yield: market.dividend_yield(),
            expiry: market.time_to_expiry(),
            observed,
            carry_spot,
            carry_strike,
            lower_bound,
            upper_bound,
        }
    }

    /// Rounding allowance on the no-arbitrage bounds.
    fn slack(&self) -> f64 {
        1e-12 * self.upper_bound.max(1.0)
    }

    fn check_bounds(&self) -> Result<(), PricingError> {
        let slack = self.slack();
        if self.observed < self.lower_bound - slack || self.observed > self.upper_bound + slack {
            return Err(PricingError::ArbitrageViolation {
                observed: self.observed,
                lower: self.lower_bound,
                upper: self.upper_bound,
            });
        }
        Ok(())
    }

    fn model(&self, volatility: f64) -> Option<BlackScholes<f64>> {
        BlackScholes::new(
            self.spot,
            self.rate,
            self.dividend_yield,
            volatility,
            self.expiry,
        )
        .ok()
    }

    fn value(&self, volatility: f64) -> f64 {
        // At σ = 0 the model price is the discounted forward value
        let price = match self.model(volatility) {
            Some(bs) if self.is_call => bs.price_call(self.strike),
            Some(bs) => bs.price_put(self.strike),
            None => self.lower_bound,
        };
        price - self.observed
    }

    fn vega(&self, volatility: f64) -> f64 {
        self.model(volatility)
            .map(|bs| bs.vega(self.strike))
            .unwrap_or(0.0)
    }

    /// Brenner-Subrahmanyam seed on the call-equivalent price.
    fn seed(&self) -> f64 {
        let call_price = if self.is_call {
            self.observed
        } else {
            self.observed + self.carry_spot - self.carry_strike
        };
        (2.0 * PI / self.expiry).sqrt() * call_price / self.carry_spot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::price;
    use approx::assert_relative_eq;

    fn market(spot: f64, vol: f64, expiry: f64) -> MarketState {
        MarketState::new(spot, 0.05, 0.0, vol, expiry).unwrap()
    }

    fn round_trip(instrument: &InstrumentSpec, market: &MarketState) -> f64 {
        let observed = price(instrument, market).unwrap().price;
        implied_volatility(instrument, market, observed).unwrap()
    }

    // ==========================================================
    // Round-Trip Tests
    // ==========================================================

    #[test]
    fn test_round_trip_atm_call() {
        let m = market(100.0, 0.2, 1.0);
        let call = InstrumentSpec::call(100.0, 1.0, 1.0).unwrap();
        assert_relative_eq!(round_trip(&call, &m), 0.2, epsilon = 1e-6);
    }

    #[test]
    fn test_round_trip_otm_put_with_dividend() {
        let m = MarketState::new(100.0, 0.03, 0.02, 0.35, 0.75).unwrap();
        let put = InstrumentSpec::put(90.0, 1.0, 1.0).unwrap();
        assert_relative_eq!(round_trip(&put, &m), 0.35, epsilon = 1e-6);
    }

    #[test]
    fn test_round_trip_high_volatility() {
        let m = market(100.0, 5.0, 1.0);
        let call = InstrumentSpec::call(100.0, 1.0, 1.0).unwrap();
        assert_relative_eq!(round_trip(&call, &m), 5.0, epsilon = 1e-6);
    }

    #[test]
    fn test_round_trip_low_volatility_atm() {
        let m = market(100.0, 0.02, 1.0);
        let call = InstrumentSpec::call(100.0, 1.0, 1.0).unwrap();
        assert_relative_eq!(round_trip(&call, &m), 0.02, epsilon = 1e-6);
    }

    #[test]
    fn test_round_trip_small_vega_is_accurate_in_volatility() {
        // Vega well below 1: a 1e-6 price residual alone leaves σ off by more than 1e-6
        let cases = [
            (110.0, 0.1, 0.10),
            (130.0, 0.5, 0.10),
            (80.0, 0.1, 0.20),
        ];
        for (strike, expiry, vol) in cases {
            let m = market(100.0, vol, expiry);
            let call = InstrumentSpec::call(strike, 1.0, 1.0).unwrap();
            let put = InstrumentSpec::put(strike, 1.0, 1.0).unwrap();
            assert_relative_eq!(round_trip(&call, &m), vol, epsilon = 1e-7);
            assert_relative_eq!(round_trip(&put, &m), vol, epsilon = 1e-7);
        }
    }

    #[test]
    fn test_price_just_above_lower_bound_is_positive() {
        let m = market(100.0, 0.05, 0.1);
        let call = InstrumentSpec::call(80.0, 1.0, 1.0).unwrap();
        let lower = 100.0 - 80.0 * (-0.05_f64 * 0.1).exp();
        let vol = implied_volatility(&call, &m, lower + 5e-7).unwrap();
        assert!(vol > 0.0);
    }

    #[test]
    fn test_quantity_does_not_matter() {
        let m = market(100.0, 0.3, 0.5);
        let big = InstrumentSpec::call(110.0, -25.0, 100.0).unwrap();
        assert_relative_eq!(round_trip(&big, &m), 0.3, epsilon = 1e-6);
    }

    // ==========================================================
    // Bounds Tests
    // ==========================================================

    #[test]
    fn test_arbitrage_below_intrinsic() {
        let m = market(120.0, 0.2, 1.0);
        let call = InstrumentSpec::call(100.0, 1.0, 1.0).unwrap();
        match implied_volatility(&call, &m, 5.0) {
            Err(PricingError::ArbitrageViolation {
                observed,
                lower,
                upper,
            }) => {
                assert_eq!(observed, 5.0);
                assert_relative_eq!(lower, 120.0 - 100.0 * (-0.05_f64).exp(), epsilon = 1e-12);
                assert_eq!(upper, 120.0);
            }
            other => panic!("Expected ArbitrageViolation, got {other:?}"),
        }
    }

    #[test]
    fn test_arbitrage_above_upper_bound() {
        let m = market(100.0, 0.2, 1.0);
        let put = InstrumentSpec::put(100.0, 1.0, 1.0).unwrap();
        let err = implied_volatility(&put, &m, 150.0).unwrap_err();
        assert!(matches!(err, PricingError::ArbitrageViolation { .. }));
    }

    #[test]
    fn test_price_at_lower_bound_returns_zero() {
        let m = market(120.0, 0.2, 1.0);
        let call = InstrumentSpec::call(100.0, 1.0, 1.0).unwrap();
        let lower = 120.0 - 100.0 * (-0.05_f64).exp();
        assert_eq!(implied_volatility(&call, &m, lower).unwrap(), 0.0);
    }

    // ==========================================================
    // Input Validation Tests
    // ==========================================================

    #[test]
    fn test_future_rejected() {
        let m = market(100.0, 0.2, 1.0);
        let fut = InstrumentSpec::future(1.0, 1.0).unwrap();
        let err = implied_volatility(&fut, &m, 100.0).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_expired_rejected() {
        let m = market(100.0, 0.2, 0.0);
        let call = InstrumentSpec::call(90.0, 1.0, 1.0).unwrap();
        match implied_volatility(&call, &m, 10.0) {
            Err(PricingError::InvalidInput { field, .. }) => assert_eq!(field, "time_to_expiry"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_non_finite_price_rejected() {
        let m = market(100.0, 0.2, 1.0);
        let call = InstrumentSpec::call(100.0, 1.0, 1.0).unwrap();
        assert!(implied_volatility(&call, &m, f64::NAN).unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let solver = ImpliedVolatilitySolver::new(ImpliedVolConfig {
            price_tolerance: 0.0,
            ..ImpliedVolConfig::default()
        });
        let m = market(100.0, 0.2, 1.0);
        let call = InstrumentSpec::call(100.0, 1.0, 1.0).unwrap();
        assert!(solver.solve(&call, &m, 10.0).unwrap_err().is_invalid_input());
    }

    // ==========================================================
    // Solver Phase Tests
    // ==========================================================

    #[test]
    fn test_bisection_fallback_when_vega_floor_high() {
        // A vega floor above any attainable vega forces bisection at once
        let solver = ImpliedVolatilitySolver::new(ImpliedVolConfig {
            min_vega: 1e6,
            ..ImpliedVolConfig::default()
        });
        let m = market(100.0, 0.3, 1.0);
        let call = InstrumentSpec::call(100.0, 1.0, 1.0).unwrap();
        let observed = price(&call, &m).unwrap().price;
        let vol = solver.solve(&call, &m, observed).unwrap();
        assert_relative_eq!(vol, 0.3, epsilon = 1e-6);
    }

    #[test]
    fn test_no_convergence_reports_budget() {
        let solver = ImpliedVolatilitySolver::new(ImpliedVolConfig {
            max_iterations: 2,
            min_vega: 1e6,
            ..ImpliedVolConfig::default()
        });
        let m = market(100.0, 0.3, 1.0);
        let call = InstrumentSpec::call(100.0, 1.0, 1.0).unwrap();
        let observed = price(&call, &m).unwrap().price;
        match solver.solve(&call, &m, observed) {
            Err(PricingError::NoConvergence {
                iterations,
                last_volatility,
                ..
            }) => {
                assert_eq!(iterations, 2);
                assert!(last_volatility > 0.0 && last_volatility < 5.0);
            }
            other => panic!("Expected NoConvergence, got {other:?}"),
        }
    }

    #[test]
    fn test_bracket_widens_beyond_default_upper() {
        // σ = 8 lies above the initial [0, 5] bracket
        let m = market(100.0, 8.0, 1.0);
        let call = InstrumentSpec::call(100.0, 1.0, 1.0).unwrap();
        let observed = price(&call, &m).unwrap().price;
        let vol = implied_volatility(&call, &m, observed).unwrap();
        let repriced = price(&call, &m.with_volatility(vol)).unwrap().price;
        assert!((repriced - observed).abs() < 1e-6);
    }
}
