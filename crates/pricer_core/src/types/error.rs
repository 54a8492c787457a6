//! Error types for structured error handling.
//!
//! This module provides:
//! - `PricingError`: Errors from valuation and implied-volatility inversion
//! - `SolverError`: Errors from the generic root-finding solvers

use thiserror::Error;

/// Categorised pricing errors.
///
/// Every variant carries the offending values so callers can display them
/// without re-deriving anything.
///
/// # Variants
/// - `InvalidInput`: A market or instrument invariant is violated
/// - `ArbitrageViolation`: An observed price lies outside the no-arbitrage bounds
/// - `NoConvergence`: The implied-volatility search exhausted its budget
///
/// # Examples
/// ```
/// use pricer_core::types::PricingError;
///
/// let err = PricingError::invalid_input("spot", -1.0, "must be positive");
/// assert_eq!(format!("{}", err), "Invalid input: spot = -1 (must be positive)");
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PricingError {
    /// A market or instrument field failed validation.
    #[error("Invalid input: {field} = {value} ({reason})")]
    InvalidInput {
        /// Name of the offending field
        field: String,
        /// The rejected value
        value: f64,
        /// Which constraint was violated
        reason: String,
    },

    /// Observed price outside `[lower, upper]`.
    #[error("Arbitrage violation: observed price {observed} outside [{lower}, {upper}]")]
    ArbitrageViolation {
        /// The observed option price
        observed: f64,
        /// Lower no-arbitrage bound
        lower: f64,
        /// Upper no-arbitrage bound
        upper: f64,
    },

    /// Implied-volatility search did not meet tolerance.
    #[error(
        "No convergence after {iterations} iterations: last volatility {last_volatility}, residual {residual}"
    )]
    NoConvergence {
        /// Iterations spent across all solver phases
        iterations: usize,
        /// Last volatility iterate
        last_volatility: f64,
        /// Pricing residual at the last iterate
        residual: f64,
    },
}

impl PricingError {
    /// Shorthand for an [`PricingError::InvalidInput`].
    pub fn invalid_input(field: impl Into<String>, value: f64, reason: impl Into<String>) -> Self {
        PricingError::InvalidInput {
            field: field.into(),
            value,
            reason: reason.into(),
        }
    }

    /// Returns `true` for validation failures.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, PricingError::InvalidInput { .. })
    }
}

/// Root-finding solver errors.
///
/// Newton failures carry the iteration count so a caller that falls back to
/// another method can charge them against a shared budget.
///
/// # Examples
/// ```
/// use pricer_core::types::SolverError;
///
/// let err = SolverError::MaxIterationsExceeded { iterations: 100 };
/// assert!(format!("{}", err).contains("100 iterations"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolverError {
    /// Solver failed to converge within maximum iterations.
    #[error("Failed to converge after {iterations} iterations")]
    MaxIterationsExceeded {
        /// Number of iterations attempted
        iterations: usize,
    },

    /// Derivative near zero (division by zero risk in Newton-Raphson).
    #[error("Derivative near zero at x = {x}")]
    DerivativeNearZero {
        /// The x value where derivative was near zero
        x: f64,
        /// Iterations spent before stalling
        iterations: usize,
    },

    /// Newton step landed outside the safe bracket.
    #[error("Step to x = {x} left bracket [{lower}, {upper}]")]
    OutsideBracket {
        /// Rejected iterate
        x: f64,
        /// Bracket lower end at the time of the step
        lower: f64,
        /// Bracket upper end at the time of the step
        upper: f64,
        /// Iterations spent before leaving
        iterations: usize,
    },

    /// No valid bracket (function values at endpoints have same sign).
    #[error("No bracket: f({a}) and f({b}) have same sign")]
    NoBracket {
        /// Left bracket endpoint
        a: f64,
        /// Right bracket endpoint
        b: f64,
    },

    /// Numerical instability during computation.
    #[error("Numerical instability: {message}")]
    NumericalInstability {
        /// Description of the numerical issue
        message: String,
        /// Iterations spent before the failure
        iterations: usize,
    },
}

impl SolverError {
    /// Iterations consumed before the error was raised.
    pub fn iterations(&self) -> usize {
        match self {
            SolverError::MaxIterationsExceeded { iterations }
            | SolverError::DerivativeNearZero { iterations, .. }
            | SolverError::OutsideBracket { iterations, .. }
            | SolverError::NumericalInstability { iterations, .. } => *iterations,
            SolverError::NoBracket { .. } => 0,
        }
    }
}
