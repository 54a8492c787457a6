//! Analytical pricing formulas for European options.
//!
//! This module provides:
//! - Black-Scholes-Merton model with continuous dividend yield
//! - Analytical Greeks (Delta, Gamma, Vega, Theta, Rho)
//! - Implied volatility inversion (Newton-Raphson with bisection fallback)
//!
//! ## Design Principles
//!
//! - **Generic over `T: Float`**: The model works for `f32` and `f64`
//! - **Numerical Stability**: Double-precision normal CDF from `pricer_core`
//! - **Degenerate markets excluded**: `σ = 0` and `T = 0` are valued by the
//!   [`crate::pricer`] branches, never by the closed form

pub mod black_scholes;
pub mod implied_vol;

// Re-export main types at module level
pub use black_scholes::BlackScholes;
pub use implied_vol::{implied_volatility, ImpliedVolConfig, ImpliedVolatilitySolver};
