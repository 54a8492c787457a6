//! Numerical building blocks.
//!
//! - `distributions`: standard normal CDF, PDF and quantile
//! - `solvers`: bracketed Newton-Raphson and bisection root finders

pub mod distributions;
pub mod solvers;
