//! # Pricer Risk
//!
//! Portfolio aggregation, risk metrics and scenario analysis on top of
//! [`pricer_models`].
//!
//! This crate provides:
//! - Portfolio snapshots: per-leg valuations, weighted totals and failures
//! - Risk metrics: gross value, delta-normal VaR, diversification score
//! - Spot × volatility P&L grids, time decay and preset shocks
//! - Greek and P&L profiles across spot
//! - Rayon-based parallel evaluation of legs and scenario cells
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              pricer_risk                │
//! ├─────────────────────────────────────────┤
//! │  portfolio/  - Aggregator, snapshot,    │
//! │                risk metrics             │
//! │  scenarios/  - Grid, time decay,        │
//! │                presets, profiles        │
//! │  parallel/   - Rayon utilities          │
//! └─────────────────────────────────────────┘
//!          ↓
//! ┌─────────────────────────────────────────┐
//! │             pricer_models               │
//! │  Black-Scholes pricer, implied vol      │
//! └─────────────────────────────────────────┘
//! ```
//!
//! Aggregation and scenario runs never fail as a whole. Legs and cells
//! that cannot be valued are collected next to the results.
//!
//! ## Example
//!
//! ```
//! use pricer_core::types::{InstrumentSpec, MarketState};
//! use pricer_risk::{aggregate, run_scenario, run_time_decay};
//!
//! let market = MarketState::new(100.0, 0.05, 0.0, 0.2, 30.0 / 365.0).unwrap();
//! let legs = vec![
//!     InstrumentSpec::call(105.0, 10.0, 100.0).unwrap().with_label("CALL_105"),
//!     InstrumentSpec::put(95.0, -5.0, 100.0).unwrap().with_label("PUT_95"),
//! ];
//!
//! let snapshot = aggregate(&legs, &market);
//! assert!(snapshot.is_complete());
//!
//! let grid = run_scenario(&legs, &market, &[0.9, 1.0, 1.1], &[-0.05, 0.0, 0.05]);
//! assert_eq!(grid.pnl(1, 1), Some(0.0));
//!
//! let decay = run_time_decay(&legs, &market, 30).unwrap();
//! assert_eq!(decay.len(), 31);
//! assert_eq!(decay[30].time_to_expiry, 0.0);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod parallel;
pub mod portfolio;
pub mod scenarios;

// Re-export commonly used types
pub use parallel::{ParallelConfig, DEFAULT_BATCH_SIZE};
pub use portfolio::{
    aggregate, PortfolioAggregator, PortfolioSnapshot, PositionFailure, PositionValuation,
    RiskMetrics,
};
pub use scenarios::{
    run_scenario, run_time_decay, MarketShock, PresetScenario, ScenarioEngine, ScenarioGrid,
    TimeDecayPoint,
};
