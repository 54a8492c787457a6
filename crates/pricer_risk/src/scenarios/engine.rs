//! Scenario execution engine.
//!
//! Revalues a portfolio under shocked copies of a base market and reports
//! P&L against the base valuation.

use super::grid::{CellFailure, ScenarioGrid, TimeDecayPoint};
use super::presets::PresetScenario;
use crate::parallel::ParallelConfig;
use crate::portfolio::{PortfolioAggregator, PortfolioSnapshot, PositionFailure};
use pricer_core::types::{days_to_years, InstrumentSpec, MarketState, PricingError};
use tracing::{debug, warn};

/// A combined spot, volatility and calendar shock.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MarketShock {
    /// Relative spot move, `-0.10` for a 10% fall
    pub spot_change: f64,
    /// Absolute volatility shift
    pub vol_change: f64,
    /// Calendar days that pass (Act/365)
    pub days_passed: f64,
}

impl MarketShock {
    /// Creates a shock.
    pub fn new(spot_change: f64, vol_change: f64, days_passed: f64) -> Self {
        Self {
            spot_change,
            vol_change,
            days_passed,
        }
    }

    /// A pure relative spot move.
    pub fn spot(spot_change: f64) -> Self {
        Self {
            spot_change,
            ..Self::default()
        }
    }

    /// A pure volatility shift.
    pub fn volatility(vol_change: f64) -> Self {
        Self {
            vol_change,
            ..Self::default()
        }
    }

    /// Pure passage of time.
    pub fn days(days_passed: f64) -> Self {
        Self {
            days_passed,
            ..Self::default()
        }
    }

    /// Applies the shock to `market`.
    ///
    /// Volatility and time to expiry are floored at 0. The result is not
    /// validated.
    pub fn apply(&self, market: &MarketState) -> MarketState {
        let shocked = shock_market(market, 1.0 + self.spot_change, self.vol_change);
        let remaining = market.time_to_expiry() - days_to_years(self.days_passed);
        shocked.with_time_to_expiry(floor_at_zero(remaining))
    }
}

/// P&L of one leg under a [`MarketShock`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionPnl {
    /// Position in the input slice
    pub index: usize,
    /// Label or generated description of the leg
    pub name: String,
    /// Position value in the base market
    pub base_value: f64,
    /// Position value in the shocked market
    pub shocked_value: f64,
    /// `shocked_value - base_value`
    pub pnl: f64,
    /// P&L in percent of `|base_value|`, 0 when the base value is 0
    pub pnl_percent: f64,
}

impl PositionPnl {
    fn new(index: usize, name: String, base_value: f64, shocked_value: f64) -> Self {
        let pnl = shocked_value - base_value;
        let pnl_percent = if base_value != 0.0 {
            100.0 * pnl / base_value.abs()
        } else {
            0.0
        };
        Self {
            index,
            name,
            base_value,
            shocked_value,
            pnl,
            pnl_percent,
        }
    }
}

/// Result of [`ScenarioEngine::run_shock`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShockResult {
    /// The applied shock
    pub shock: MarketShock,
    /// Legs priced in both markets, in input order
    pub positions: Vec<PositionPnl>,
    /// Sum of `positions[..].pnl`
    pub total_pnl: f64,
    /// Legs that failed in either market
    pub failures: Vec<PositionFailure>,
}

/// Revalues portfolios under shocked markets.
///
/// # Examples
/// ```
/// use pricer_core::types::{InstrumentSpec, MarketState};
/// use pricer_risk::scenarios::ScenarioEngine;
///
/// let market = MarketState::new(100.0, 0.05, 0.0, 0.2, 1.0).unwrap();
/// let legs = vec![InstrumentSpec::call(100.0, 1.0, 1.0).unwrap()];
///
/// let grid = ScenarioEngine::default().run_grid(&legs, &market, &[0.9, 1.0, 1.1], &[-0.05, 0.0, 0.05]);
/// assert_eq!(grid.pnl(1, 1), Some(0.0));
/// assert!(grid.pnl(2, 1).unwrap() > 0.0);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ScenarioEngine {
    parallel: ParallelConfig,
    aggregator: PortfolioAggregator,
}

impl ScenarioEngine {
    /// Creates an engine that parallelises cells and legs per `parallel`.
    pub fn new(parallel: ParallelConfig) -> Self {
        Self {
            aggregator: PortfolioAggregator::new(parallel.clone()),
            parallel,
        }
    }

    /// P&L over every `(spot_factor, vol_shift)` pair.
    ///
    /// Each cell multiplies spot by the factor and adds the shift to
    /// volatility, floored at 0. Cells whose shocked market is bitwise equal
    /// to the base report exactly 0. Invalid cells report `NaN` and are
    /// listed in [`ScenarioGrid::failures`].
    pub fn run_grid(
        &self,
        instruments: &[InstrumentSpec],
        base_market: &MarketState,
        spot_shocks: &[f64],
        vol_shocks: &[f64],
    ) -> ScenarioGrid {
        let base = self.aggregator.aggregate(instruments, base_market);
        let base_error = base_market.validate().err();
        let columns = vol_shocks.len();

        let cells = self
            .parallel
            .map_indices(spot_shocks.len() * columns, |k| {
                let (i, j) = (k / columns, k % columns);
                let market = shock_market(base_market, spot_shocks[i], vol_shocks[j]);
                let outcome = match &base_error {
                    Some(error) => Err((None, error.clone())),
                    None => self.cell_pnl(instruments, base_market, &base, &market),
                };
                outcome.map_err(|(instrument, error)| CellFailure {
                    spot_index: i,
                    vol_index: j,
                    market,
                    instrument,
                    error,
                })
            });

        let mut pnl = vec![Vec::with_capacity(columns); spot_shocks.len()];
        let mut failures = Vec::new();
        for (k, cell) in cells.into_iter().enumerate() {
            let value = match cell {
                Ok(value) => value,
                Err(failure) => {
                    warn!(
                        spot_factor = spot_shocks[failure.spot_index],
                        vol_shift = vol_shocks[failure.vol_index],
                        error = %failure.error,
                        "scenario cell could not be valued"
                    );
                    failures.push(failure);
                    f64::NAN
                }
            };
            pnl[k / columns].push(value);
        }

        debug!(
            rows = spot_shocks.len(),
            columns,
            failed = failures.len(),
            "scenario grid assembled"
        );
        ScenarioGrid::new(
            spot_shocks.to_vec(),
            vol_shocks.to_vec(),
            base.value(),
            pnl,
            failures,
        )
    }

    /// Values the portfolio at `horizon_steps + 1` evenly spaced times from
    /// the base time to expiry down to 0, spot and volatility fixed.
    ///
    /// # Errors
    /// `PricingError::InvalidInput` when `horizon_steps == 0` or the base
    /// market is invalid.
    pub fn run_time_decay(
        &self,
        instruments: &[InstrumentSpec],
        base_market: &MarketState,
        horizon_steps: usize,
    ) -> Result<Vec<TimeDecayPoint>, PricingError> {
        if horizon_steps == 0 {
            return Err(PricingError::invalid_input(
                "horizon_steps",
                0.0,
                "must be at least 1",
            ));
        }
        base_market.validate()?;

        let base = self.aggregator.aggregate(instruments, base_market);
        let expiry = base_market.time_to_expiry();
        let steps = horizon_steps as f64;

        let time_at = |step: usize| match step {
            0 => expiry,
            s if s == horizon_steps => 0.0,
            s => expiry * (1.0 - s as f64 / steps),
        };

        let points = self.parallel.map_indices(horizon_steps + 1, |step| {
            let time_to_expiry = time_at(step);
            let total = if step == 0 {
                *base.total()
            } else {
                let decayed = base_market.with_time_to_expiry(time_to_expiry);
                *self.aggregator.aggregate(instruments, &decayed).total()
            };
            TimeDecayPoint {
                step,
                time_to_expiry,
                value: total.price,
                pnl: total.price - base.value(),
                theta: total.theta,
            }
        });

        debug!(steps = horizon_steps, "time decay evaluated");
        Ok(points)
    }

    /// Per-leg and total P&L under one combined shock.
    pub fn run_shock(
        &self,
        instruments: &[InstrumentSpec],
        base_market: &MarketState,
        shock: MarketShock,
    ) -> ShockResult {
        let base = self.aggregator.aggregate(instruments, base_market);
        let shocked = self.aggregator.aggregate(instruments, &shock.apply(base_market));

        let positions: Vec<PositionPnl> = base
            .positions()
            .iter()
            .filter_map(|before| {
                shocked.position(before.index).map(|after| {
                    PositionPnl::new(
                        before.index,
                        before.instrument.display_name(),
                        before.position.price,
                        after.position.price,
                    )
                })
            })
            .collect();
        let total_pnl = positions.iter().map(|p| p.pnl).sum();

        let mut failures: Vec<PositionFailure> = base.failures().to_vec();
        for failure in shocked.failures() {
            if !failures.iter().any(|f| f.index == failure.index) {
                failures.push(failure.clone());
            }
        }
        failures.sort_by_key(|f| f.index);

        ShockResult {
            shock,
            positions,
            total_pnl,
            failures,
        }
    }

    /// Total P&L of each preset, in the given order.
    pub fn run_presets(
        &self,
        instruments: &[InstrumentSpec],
        base_market: &MarketState,
        presets: &[PresetScenario],
    ) -> Vec<(&'static str, f64)> {
        presets
            .iter()
            .map(|preset| {
                let result = self.run_shock(instruments, base_market, preset.shock());
                (preset.name(), result.total_pnl)
            })
            .collect()
    }

    fn cell_pnl(
        &self,
        instruments: &[InstrumentSpec],
        base_market: &MarketState,
        base: &PortfolioSnapshot,
        market: &MarketState,
    ) -> Result<f64, (Option<InstrumentSpec>, PricingError)> {
        market.validate().map_err(|e| (None, e))?;
        if bitwise_eq(market, base_market) {
            return Ok(0.0);
        }

        let shocked = self.aggregator.aggregate(instruments, market);
        let new_failure = shocked
            .failures()
            .iter()
            .find(|f| !base.failures().iter().any(|b| b.index == f.index));
        if let Some(failure) = new_failure {
            return Err((Some(failure.instrument.clone()), failure.error.clone()));
        }
        Ok(shocked.value() - base.value())
    }
}

/// P&L grid with default parallel settings. See [`ScenarioEngine::run_grid`].
pub fn run_scenario(
    instruments: &[InstrumentSpec],
    base_market: &MarketState,
    spot_shocks: &[f64],
    vol_shocks: &[f64],
) -> ScenarioGrid {
    ScenarioEngine::default().run_grid(instruments, base_market, spot_shocks, vol_shocks)
}

/// Time decay with default parallel settings. See [`ScenarioEngine::run_time_decay`].
pub fn run_time_decay(
    instruments: &[InstrumentSpec],
    base_market: &MarketState,
    horizon_steps: usize,
) -> Result<Vec<TimeDecayPoint>, PricingError> {
    ScenarioEngine::default().run_time_decay(instruments, base_market, horizon_steps)
}

fn shock_market(market: &MarketState, spot_factor: f64, vol_shift: f64) -> MarketState {
    market
        .with_spot(market.spot() * spot_factor)
        .with_volatility(floor_at_zero(market.volatility() + vol_shift))
}

// Keeps NaN so that validation rejects it
fn floor_at_zero(x: f64) -> f64 {
    if x < 0.0 {
        0.0
    } else {
        x
    }
}

fn bitwise_eq(a: &MarketState, b: &MarketState) -> bool {
    a.spot().to_bits() == b.spot().to_bits()
        && a.rate().to_bits() == b.rate().to_bits()
        && a.dividend_yield().to_bits() == b.dividend_yield().to_bits()
        && a.volatility().to_bits() == b.volatility().to_bits()
        && a.time_to_expiry().to_bits() == b.time_to_expiry().to_bits()
}
