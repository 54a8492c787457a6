//! Bisection root-finding solver.

use super::{Bracket, RootResult, SolverConfig};
use crate::types::SolverError;
use num_traits::Float;

/// Bisection root finder for increasing functions.
///
/// Halves the bracket until `|f(mid)| < tolerance` or the half-width falls
/// below `x_tolerance`. Slow but cannot diverge, which makes it the fallback
/// when Newton's safeguards trip.
///
/// # Example
///
/// ```
/// use pricer_core::math::solvers::{BisectionSolver, Bracket, SolverConfig};
///
/// let solver = BisectionSolver::new(SolverConfig::default());
///
/// // Solve x³ - x - 2 = 0 in bracket [1, 2]
/// let f = |x: f64| x * x * x - x - 2.0;
///
/// let result = solver.find_root(f, Bracket::new(1.0, 2.0)).unwrap();
/// assert!(f(result.root).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct BisectionSolver<T: Float> {
    /// Solver configuration
    config: SolverConfig<T>,
}

impl<T: Float> BisectionSolver<T> {
    /// Create a new bisection solver with the given configuration.
    pub fn new(config: SolverConfig<T>) -> Self {
        Self { config }
    }

    /// Find a root of `f` in `bracket`.
    ///
    /// The function must be increasing across the bracket: `f(lower) <= 0`
    /// and `f(upper) >= 0`. Endpoint evaluations are not counted as
    /// iterations.
    ///
    /// # Errors
    ///
    /// * `SolverError::NoBracket` - the endpoint values do not straddle zero
    /// * `SolverError::MaxIterationsExceeded` - budget exhausted
    pub fn find_root<F>(&self, f: F, bracket: Bracket<T>) -> Result<RootResult<T>, SolverError>
    where
        F: Fn(T) -> T,
    {
        let to_f64 = |v: T| v.to_f64().unwrap_or(f64::NAN);
        let mut bracket = bracket;
        let f_lower = f(bracket.lower());
        let f_upper = f(bracket.upper());

        if f_lower > T::zero() || f_upper < T::zero() {
            return Err(SolverError::NoBracket {
                a: to_f64(bracket.lower()),
                b: to_f64(bracket.upper()),
            });
        }
        if f_lower.abs() < self.config.tolerance {
            return Ok(RootResult {
                root: bracket.lower(),
                iterations: 0,
                residual: f_lower,
            });
        }
        if f_upper.abs() < self.config.tolerance {
            return Ok(RootResult {
                root: bracket.upper(),
                iterations: 0,
                residual: f_upper,
            });
        }

        let two = T::one() + T::one();
        for iteration in 1..=self.config.max_iterations {
            let mid = bracket.midpoint();
            let f_mid = f(mid);

            if f_mid.abs() < self.config.tolerance
                || bracket.width() / two < self.config.x_tolerance
            {
                return Ok(RootResult {
                    root: mid,
                    iterations: iteration,
                    residual: f_mid,
                });
            }

            bracket.narrow(mid, f_mid);
        }

        Err(SolverError::MaxIterationsExceeded {
            iterations: self.config.max_iterations,
        })
    }

    /// Returns a reference to the solver configuration.
    pub fn config(&self) -> &SolverConfig<T> {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_sqrt_2() {
        let solver = BisectionSolver::new(SolverConfig::new(1e-12, 1e-12, 200));
        let f = |x: f64| x * x - 2.0;

        let result = solver.find_root(f, Bracket::new(0.0, 2.0)).unwrap();
        assert!((result.root - std::f64::consts::SQRT_2).abs() < 1e-10);
    }

    #[test]
    fn test_root_at_endpoint() {
        let solver = BisectionSolver::new(SolverConfig::default());
        let f = |x: f64| x - 1.0;

        let result = solver.find_root(f, Bracket::new(1.0, 3.0)).unwrap();
        assert_eq!(result.root, 1.0);
        assert_eq!(result.iterations, 0);
    }

    #[test]
    fn test_no_bracket() {
        let solver = BisectionSolver::new(SolverConfig::default());
        let f = |x: f64| x * x + 1.0;

        match solver.find_root(f, Bracket::new(-1.0, 1.0)) {
            Err(SolverError::NoBracket { a, b }) => {
                assert_eq!(a, -1.0);
                assert_eq!(b, 1.0);
            }
            other => panic!("Expected NoBracket error, got {:?}", other),
        }
    }

    #[test]
    fn test_max_iterations_exceeded() {
        let solver = BisectionSolver::new(SolverConfig::new(1e-300, 1e-300, 5));
        let f = |x: f64| x - 0.3;

        let err = solver.find_root(f, Bracket::new(0.0, 1.0)).unwrap_err();
        assert_eq!(err, SolverError::MaxIterationsExceeded { iterations: 5 });
    }

    #[test]
    fn test_iteration_count_matches_width() {
        // Width 1 halves to below 1e-3 after about ten midpoints
        let solver = BisectionSolver::new(SolverConfig::new(1e-300, 1e-3, 100));
        let f = |x: f64| x - 0.123456;

        let result = solver.find_root(f, Bracket::new(0.0, 1.0)).unwrap();
        assert!(result.iterations >= 9 && result.iterations <= 11);
        assert!((result.root - 0.123456).abs() < 2e-3);
    }
}
