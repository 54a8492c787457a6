//! Safeguarded Newton-Raphson root-finding solver.

use super::{Bracket, RootResult, SolverConfig};
use crate::types::SolverError;
use num_traits::Float;

/// Newton-Raphson root finder with step capping and bracket safeguards.
///
/// Uses Newton's method `x_{n+1} = x_n - f(x_n) / f'(x_n)` for fast
/// quadratic convergence on smooth increasing functions. Each step is
/// capped at `max_step` in absolute size and must stay inside a shared
/// [`Bracket`], which every evaluation narrows. When the iteration cannot
/// continue safely it stops with an error that records the iterations
/// spent, so the caller can fall back to bisection on the narrowed bracket
/// with the remaining budget.
///
/// # Type Parameters
///
/// * `T` - Floating-point type (e.g., `f64`)
///
/// # Example
///
/// ```
/// use pricer_core::math::solvers::{Bracket, NewtonRaphsonSolver, SolverConfig};
///
/// // Solve x² - 2 = 0 (find √2)
/// let solver = NewtonRaphsonSolver::new(SolverConfig::default());
/// let mut bracket = Bracket::new(0.0, 4.0);
///
/// let f = |x: f64| x * x - 2.0;
/// let f_prime = |x: f64| 2.0 * x;
///
/// let result = solver.find_root(f, f_prime, 1.0, &mut bracket).unwrap();
/// assert!((result.root - std::f64::consts::SQRT_2).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct NewtonRaphsonSolver<T: Float> {
    /// Solver configuration
    config: SolverConfig<T>,
    /// Largest absolute step per iteration
    max_step: T,
    /// Derivatives smaller than this stop the iteration
    min_derivative: T,
    /// Extra Newton steps taken once the residual test passes
    polish_steps: usize,
}

impl<T: Float> NewtonRaphsonSolver<T> {
    /// Create a new solver with no step cap and a near-zero derivative floor.
    ///
    /// # Example
    ///
    /// ```
    /// use pricer_core::math::solvers::{NewtonRaphsonSolver, SolverConfig};
    ///
    /// let solver: NewtonRaphsonSolver<f64> = NewtonRaphsonSolver::new(SolverConfig::default());
    /// ```
    pub fn new(config: SolverConfig<T>) -> Self {
        Self {
            config,
            max_step: T::infinity(),
            min_derivative: T::from(1e-30).unwrap_or_else(T::min_positive_value),
            polish_steps: 0,
        }
    }

    /// Caps the absolute size of every step.
    pub fn with_max_step(mut self, max_step: T) -> Self {
        self.max_step = max_step;
        self
    }

    /// Sets the derivative magnitude below which the solver gives up.
    pub fn with_min_derivative(mut self, min_derivative: T) -> Self {
        self.min_derivative = min_derivative;
        self
    }

    /// Keeps stepping up to `steps` times after `|f(x)| < tolerance`, until
    /// a step is smaller than `x_tolerance`.
    ///
    /// A small residual only bounds the error in `x` by `tolerance / |f'|`.
    /// Polishing turns a residual-converged point into one accurate in `x`.
    pub fn with_polish_steps(mut self, steps: usize) -> Self {
        self.polish_steps = steps;
        self
    }

    /// Find a root of the increasing function `f` inside `bracket`.
    ///
    /// The start point is clamped into the bracket. The iteration stops
    /// successfully when `|f(x)| < tolerance` or the accepted step is
    /// smaller than `x_tolerance`. A residual stop is followed by up to
    /// `polish_steps` further steps, see [`Self::with_polish_steps`].
    ///
    /// # Errors
    ///
    /// * `SolverError::DerivativeNearZero` - `|f'(x)| < min_derivative`
    /// * `SolverError::OutsideBracket` - the capped step leaves the bracket
    /// * `SolverError::NumericalInstability` - a non-finite value appeared
    /// * `SolverError::MaxIterationsExceeded` - budget exhausted
    ///
    /// On every error `bracket` holds the narrowest interval found so far.
    pub fn find_root<F, G>(
        &self,
        f: F,
        f_prime: G,
        x0: T,
        bracket: &mut Bracket<T>,
    ) -> Result<RootResult<T>, SolverError>
    where
        F: Fn(T) -> T,
        G: Fn(T) -> T,
    {
        let to_f64 = |v: T| v.to_f64().unwrap_or(f64::NAN);
        let mut x = bracket.clamp(x0);

        for iteration in 1..=self.config.max_iterations {
            let f_val = f(x);
            if !f_val.is_finite() {
                return Err(SolverError::NumericalInstability {
                    message: format!("f({}) is not finite", to_f64(x)),
                    iterations: iteration,
                });
            }

            bracket.narrow(x, f_val);

            // Check for convergence
            if f_val.abs() < self.config.tolerance {
                return Ok(self.polish(&f, &f_prime, x, f_val, iteration, bracket));
            }

            let f_prime_val = f_prime(x);
            if !(f_prime_val.abs() >= self.min_derivative) {
                return Err(SolverError::DerivativeNearZero {
                    x: to_f64(x),
                    iterations: iteration,
                });
            }

            let raw_step = f_val / f_prime_val;
            let step = raw_step.max(-self.max_step).min(self.max_step);
            let next = x - step;

            if !next.is_finite() {
                return Err(SolverError::NumericalInstability {
                    message: "Newton iteration produced non-finite value".to_string(),
                    iterations: iteration,
                });
            }
            if !bracket.contains(next) {
                return Err(SolverError::OutsideBracket {
                    x: to_f64(next),
                    lower: to_f64(bracket.lower()),
                    upper: to_f64(bracket.upper()),
                    iterations: iteration,
                });
            }
            if (next - x).abs() < self.config.x_tolerance {
                return Ok(RootResult {
                    root: next,
                    iterations: iteration,
                    residual: f_val,
                });
            }

            x = next;
        }

        Err(SolverError::MaxIterationsExceeded {
            iterations: self.config.max_iterations,
        })
    }

    /// Unsafeguarded refinement of a residual-converged point.
    ///
    /// Stops at the first step that is non-finite, leaves the bracket or
    /// meets a flat derivative, returning the last good point.
    fn polish<F, G>(
        &self,
        f: &F,
        f_prime: &G,
        mut x: T,
        mut f_val: T,
        mut iterations: usize,
        bracket: &mut Bracket<T>,
    ) -> RootResult<T>
    where
        F: Fn(T) -> T,
        G: Fn(T) -> T,
    {
        for _ in 0..self.polish_steps {
            if f_val == T::zero() {
                break;
            }
            let f_prime_val = f_prime(x);
            if !(f_prime_val.abs() >= self.min_derivative) {
                break;
            }
            let next = x - f_val / f_prime_val;
            if !next.is_finite() || !bracket.contains(next) {
                break;
            }
            let f_next = f(next);
            if !f_next.is_finite() {
                break;
            }

            iterations += 1;
            let step = (next - x).abs();
            bracket.narrow(next, f_next);
            x = next;
            f_val = f_next;
            if step < self.config.x_tolerance {
                break;
            }
        }

        RootResult {
            root: x,
            iterations,
            residual: f_val,
        }
    }

    /// Returns a reference to the solver configuration.
    pub fn config(&self) -> &SolverConfig<T> {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================
    // Basic Functionality Tests
    // ========================================

    #[test]
    fn test_find_sqrt_2() {
        let solver = NewtonRaphsonSolver::new(SolverConfig::default());
        let mut bracket = Bracket::new(0.0, 10.0);

        let f = |x: f64| x * x - 2.0;
        let f_prime = |x: f64| 2.0 * x;

        let result = solver.find_root(f, f_prime, 1.0, &mut bracket).unwrap();
        assert!(
            (result.root - std::f64::consts::SQRT_2).abs() < 1e-10,
            "Expected √2 ≈ {}, got {}",
            std::f64::consts::SQRT_2,
            result.root
        );
        assert!(result.iterations <= 10);
    }

    #[test]
    fn test_find_exp_root() {
        let solver = NewtonRaphsonSolver::new(SolverConfig::default());
        let mut bracket = Bracket::new(-5.0, 5.0);

        // Solve e^x - 2 = 0 (find ln(2))
        let f = |x: f64| x.exp() - 2.0;
        let f_prime = |x: f64| x.exp();

        let result = solver.find_root(f, f_prime, 0.5, &mut bracket).unwrap();
        assert!((result.root - 2.0_f64.ln()).abs() < 1e-10);
    }

    #[test]
    fn test_start_point_clamped_into_bracket() {
        let solver = NewtonRaphsonSolver::new(SolverConfig::default());
        let mut bracket = Bracket::new(1.0, 3.0);

        let f = |x: f64| x - 2.0;
        let f_prime = |_x: f64| 1.0;

        let result = solver.find_root(f, f_prime, 100.0, &mut bracket).unwrap();
        assert!((result.root - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_step_cap_limits_progress() {
        let config = SolverConfig::new(1e-12, 1e-14, 3);
        let solver = NewtonRaphsonSolver::new(config).with_max_step(0.5);
        let mut bracket = Bracket::new(0.0, 10.0);

        // Root at 9: three capped steps from 0 only reach 1.5
        let f = |x: f64| x - 9.0;
        let f_prime = |_x: f64| 1.0;

        let err = solver.find_root(f, f_prime, 0.0, &mut bracket).unwrap_err();
        assert_eq!(err, SolverError::MaxIterationsExceeded { iterations: 3 });
        assert_eq!(bracket.lower(), 1.0);
    }

    // ========================================
    // Safeguard Tests
    // ========================================

    #[test]
    fn test_derivative_near_zero() {
        let solver = NewtonRaphsonSolver::new(SolverConfig::default()).with_min_derivative(1e-8);
        let mut bracket = Bracket::new(0.0, 1.0);

        let f = |x: f64| x * x * x - 0.001;
        let f_prime = |_x: f64| 0.0;

        match solver.find_root(f, f_prime, 0.5, &mut bracket) {
            Err(SolverError::DerivativeNearZero { x, iterations }) => {
                assert_eq!(x, 0.5);
                assert_eq!(iterations, 1);
            }
            other => panic!("Expected DerivativeNearZero error, got {:?}", other),
        }
        // f(0.5) > 0 so the bracket shrank from above
        assert_eq!(bracket.upper(), 0.5);
    }

    #[test]
    fn test_step_outside_bracket() {
        let solver = NewtonRaphsonSolver::new(SolverConfig::default());
        let mut bracket = Bracket::new(0.0, 1.0);

        // Flat derivative sends the first step far past the upper end
        let f = |x: f64| x - 0.9;
        let f_prime = |_x: f64| 1e-3;

        match solver.find_root(f, f_prime, 0.1, &mut bracket) {
            Err(SolverError::OutsideBracket { iterations, lower, .. }) => {
                assert_eq!(iterations, 1);
                assert_eq!(lower, 0.1);
            }
            other => panic!("Expected OutsideBracket error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_value() {
        let solver = NewtonRaphsonSolver::new(SolverConfig::default());
        let mut bracket = Bracket::new(0.0, 1.0);

        let f = |_x: f64| f64::NAN;
        let f_prime = |_x: f64| 1.0;

        let err = solver.find_root(f, f_prime, 0.5, &mut bracket).unwrap_err();
        assert!(matches!(err, SolverError::NumericalInstability { iterations: 1, .. }));
    }

    #[test]
    fn test_step_tolerance_convergence() {
        // Residual tolerance unreachable, step tolerance stops the loop
        let config = SolverConfig::new(1e-300, 1e-8, 100);
        let solver = NewtonRaphsonSolver::new(config);
        let mut bracket = Bracket::new(0.0, 4.0);

        let f = |x: f64| x * x - 2.0;
        let f_prime = |x: f64| 2.0 * x;

        let result = solver.find_root(f, f_prime, 1.0, &mut bracket).unwrap();
        assert!((result.root - std::f64::consts::SQRT_2).abs() < 1e-8);
    }

    #[test]
    fn test_polish_refines_residual_stop() {
        // Shallow slope: the residual test passes about 2e-6 away from the root
        let config = SolverConfig::new(1e-6, 1e-12, 100);
        let f = |x: f64| 0.01 * (x * x - 2.0);
        let f_prime = |x: f64| 0.02 * x;

        let plain = NewtonRaphsonSolver::new(config)
            .find_root(f, f_prime, 1.0, &mut Bracket::new(0.0, 4.0))
            .unwrap();
        let polished = NewtonRaphsonSolver::new(config)
            .with_polish_steps(3)
            .find_root(f, f_prime, 1.0, &mut Bracket::new(0.0, 4.0))
            .unwrap();

        assert!((polished.root - std::f64::consts::SQRT_2).abs() < 1e-12);
        assert!(polished.iterations > plain.iterations);
        assert!(
            (polished.root - std::f64::consts::SQRT_2).abs()
                <= (plain.root - std::f64::consts::SQRT_2).abs()
        );
    }

    #[test]
    fn test_with_f32() {
        let config = SolverConfig::new(1e-5_f32, 1e-6, 50);
        let solver = NewtonRaphsonSolver::new(config);
        let mut bracket = Bracket::new(0.0_f32, 4.0);

        let f = |x: f32| x * x - 2.0;
        let f_prime = |x: f32| 2.0 * x;

        let result = solver.find_root(f, f_prime, 1.0, &mut bracket).unwrap();
        assert!((result.root - std::f32::consts::SQRT_2).abs() < 1e-4);
    }
}
