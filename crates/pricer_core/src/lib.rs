//! # pricer_core: Foundation types and numerics for the derivatives engine
//!
//! ## Layer 1 (Foundation) Role
//!
//! pricer_core is the bottom layer of the workspace and provides:
//! - The market snapshot and position legs (`types::market`, `types::instrument`)
//! - Act/365 day-count helpers (`types::time`)
//! - Error types: `PricingError`, `SolverError` (`types::error`)
//! - Standard normal distribution functions (`math::distributions`)
//! - Bracketed root finders (`math::solvers`)
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 has no dependencies on other pricer_* crates, with minimal external dependencies:
//! - num-traits: Traits for generic numerical computation
//! - chrono: Date arithmetic
//! - thiserror: Error derivation
//! - serde: Serialisation support (optional)
//!
//! ## Usage Examples
//!
//! ```rust
//! use pricer_core::math::distributions::norm_cdf;
//! use pricer_core::types::{InstrumentSpec, MarketState};
//!
//! let market = MarketState::from_days(100.0, 0.05, 0.0, 0.2, 30.0).unwrap();
//! assert!((market.time_to_expiry() - 30.0 / 365.0).abs() < 1e-12);
//!
//! let leg = InstrumentSpec::call(105.0, 10.0, 100.0).unwrap();
//! assert_eq!(leg.weight(), 1000.0);
//!
//! assert!((norm_cdf(0.0_f64) - 0.5).abs() < 1e-15);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): Enable serialisation for market states, legs and errors

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod math;
pub mod types;
