//! # Pricer Models (L2: Business Logic)
//!
//! Closed-form valuation of European options and futures.
//!
//! This crate provides:
//! - The Black-Scholes-Merton model with analytical Greeks (`analytical`)
//! - Implied volatility inversion (`analytical::implied_vol`)
//! - The [`Pricer`] entry point with its degenerate-market branches (`pricer`)
//!
//! ## Usage
//!
//! ```
//! use pricer_core::types::{InstrumentSpec, MarketState};
//! use pricer_models::{implied_volatility, price};
//!
//! let market = MarketState::new(100.0, 0.05, 0.0, 0.2, 1.0).unwrap();
//! let put = InstrumentSpec::put(100.0, 1.0, 1.0).unwrap();
//!
//! let result = price(&put, &market).unwrap();
//! assert!((result.price - 5.5735).abs() < 1e-3);
//!
//! let vol = implied_volatility(&put, &market, result.price).unwrap();
//! assert!((vol - 0.2).abs() < 1e-6);
//! ```
//!
//! ## Design Principles
//!
//! - **Enum-based instruments** for exhaustive static dispatch
//! - **Validation first**: invalid inputs fail before any numerical work
//! - **Pure functions**: no state, no I/O, only `tracing` events

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod analytical;
pub mod pricer;

pub use analytical::{implied_volatility, ImpliedVolConfig, ImpliedVolatilitySolver};
pub use pricer::{price, Pricer, PricingResult, ValuationBranch};
