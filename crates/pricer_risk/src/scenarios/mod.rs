//! Scenario analysis.
//!
//! This module provides infrastructure for:
//! - Spot × volatility P&L grids and time decay ([`ScenarioEngine`])
//! - Single combined shocks and the preset comparison set
//! - Greek and P&L profiles across spot
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │              Scenario Engine                 │
//! ├──────────────────────────────────────────────┤
//! │  MarketShock     - Spot, vol and day shifts  │
//! │  ScenarioGrid    - P&L matrix with failures  │
//! │  PresetScenario  - Named standard shocks     │
//! │  SpotProfiler    - Measures along spot       │
//! └──────────────────────────────────────────────┘
//! ```

mod engine;
mod grid;
mod presets;
mod sensitivity;

pub use engine::{
    run_scenario, run_time_decay, MarketShock, PositionPnl, ScenarioEngine, ShockResult,
};
pub use grid::{CellFailure, ScenarioGrid, TimeDecayPoint};
pub use presets::PresetScenario;
pub use sensitivity::{
    pnl_profile, sensitivity_profile, Greek, ProfilePoint, SpotProfiler, DEFAULT_PROFILE_LOWER,
    DEFAULT_PROFILE_POINTS, DEFAULT_PROFILE_UPPER,
};
