//! Core data model and error types.
//!
//! This module provides:
//! - `market`: [`MarketState`], the immutable market snapshot
//! - `instrument`: [`InstrumentSpec`] and [`InstrumentKind`], one position leg each
//! - `time`: Act/365 year-fraction helpers
//! - `error`: [`PricingError`] and [`SolverError`]
//!
//! Both data types validate on construction and expose `validate()` so that
//! values built elsewhere (deserialised, or shocked copies) can be checked
//! before any numerical work.

pub mod error;
pub mod instrument;
pub mod market;
pub mod time;

pub use error::{PricingError, SolverError};
pub use instrument::{InstrumentKind, InstrumentSpec, Side};
pub use market::MarketState;
pub use time::{days_to_years, time_to_maturity, DAYS_PER_YEAR};
