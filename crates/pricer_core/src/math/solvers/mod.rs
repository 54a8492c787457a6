//! Root-finding solvers for numerical computation.
//!
//! Both solvers work on increasing scalar functions, the shape of an
//! option price as a function of volatility, and share a [`Bracket`] so
//! that a derivative-based search can hand over to bisection without
//! losing progress.
//!
//! ## Available Solvers
//!
//! - [`NewtonRaphsonSolver`]: Quadratic convergence with step capping and
//!   bracket safeguards
//! - [`BisectionSolver`]: Guaranteed progress on a valid bracket
//!
//! ## Configuration
//!
//! Both use [`SolverConfig`]:
//! - `tolerance`: Residual tolerance (default: 1e-10)
//! - `x_tolerance`: Step tolerance (default: 1e-12)
//! - `max_iterations`: Maximum iteration count (default: 100)
//!
//! ## Example
//!
//! ```
//! use pricer_core::math::solvers::{BisectionSolver, Bracket, NewtonRaphsonSolver, SolverConfig};
//!
//! let config = SolverConfig::default();
//! let f = |x: f64| x * x - 2.0;
//! let f_prime = |_x: f64| 0.0;
//!
//! // Newton stalls on the zero derivative, bisection finishes the job
//! let mut bracket = Bracket::new(0.0, 2.0);
//! let newton = NewtonRaphsonSolver::new(config);
//! let err = newton.find_root(f, f_prime, 1.0, &mut bracket).unwrap_err();
//!
//! let remaining = config.max_iterations - err.iterations();
//! let bisection = BisectionSolver::new(config.with_max_iterations(remaining));
//! let result = bisection.find_root(f, bracket).unwrap();
//! assert!((result.root - std::f64::consts::SQRT_2).abs() < 1e-9);
//! ```

mod bisection;
mod bracket;
mod config;
mod newton_raphson;

// Re-export public types at module level
pub use bisection::BisectionSolver;
pub use bracket::{Bracket, RootResult};
pub use config::SolverConfig;
pub use newton_raphson::NewtonRaphsonSolver;
