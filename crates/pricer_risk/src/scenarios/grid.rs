//! Result containers for scenario runs.

use pricer_core::types::{InstrumentSpec, MarketState, PricingError};

/// A grid cell that could not be valued.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellFailure {
    /// Row of the cell (spot shock index)
    pub spot_index: usize,
    /// Column of the cell (volatility shift index)
    pub vol_index: usize,
    /// The shocked market of the cell
    pub market: MarketState,
    /// The leg that failed, or `None` when the shocked market itself is invalid
    pub instrument: Option<InstrumentSpec>,
    /// Why the cell failed
    pub error: PricingError,
}

/// P&L matrix over spot and volatility shocks.
///
/// Row `i` belongs to `spot_shocks[i]`, column `j` to `vol_shocks[j]`.
/// Cells that could not be valued hold `NaN` and have a matching entry in
/// [`ScenarioGrid::failures`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScenarioGrid {
    spot_shocks: Vec<f64>,
    vol_shocks: Vec<f64>,
    base_value: f64,
    pnl: Vec<Vec<f64>>,
    failures: Vec<CellFailure>,
}

impl ScenarioGrid {
    pub(crate) fn new(
        spot_shocks: Vec<f64>,
        vol_shocks: Vec<f64>,
        base_value: f64,
        pnl: Vec<Vec<f64>>,
        failures: Vec<CellFailure>,
    ) -> Self {
        Self {
            spot_shocks,
            vol_shocks,
            base_value,
            pnl,
            failures,
        }
    }

    /// Multiplicative spot factors, one per row.
    pub fn spot_shocks(&self) -> &[f64] {
        &self.spot_shocks
    }

    /// Additive volatility shifts, one per column.
    pub fn vol_shocks(&self) -> &[f64] {
        &self.vol_shocks
    }

    /// Net value of the unshocked portfolio.
    pub fn base_value(&self) -> f64 {
        self.base_value
    }

    /// The P&L rows.
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.pnl
    }

    /// P&L of cell `(spot_index, vol_index)`.
    pub fn pnl(&self, spot_index: usize, vol_index: usize) -> Option<f64> {
        self.pnl.get(spot_index)?.get(vol_index).copied()
    }

    /// Cells that could not be valued.
    pub fn failures(&self) -> &[CellFailure] {
        &self.failures
    }

    /// `(rows, columns)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.spot_shocks.len(), self.vol_shocks.len())
    }

    /// Cell with the largest loss as `(spot_index, vol_index, pnl)`; NaN cells are skipped.
    pub fn worst_case(&self) -> Option<(usize, usize, f64)> {
        self.cells()
            .filter(|(_, _, pnl)| !pnl.is_nan())
            .min_by(|a, b| a.2.total_cmp(&b.2))
    }

    /// Cell with the largest gain as `(spot_index, vol_index, pnl)`; NaN cells are skipped.
    pub fn best_case(&self) -> Option<(usize, usize, f64)> {
        self.cells()
            .filter(|(_, _, pnl)| !pnl.is_nan())
            .max_by(|a, b| a.2.total_cmp(&b.2))
    }

    fn cells(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.pnl.iter().enumerate().flat_map(|(i, row)| {
            row.iter().enumerate().map(move |(j, &pnl)| (i, j, pnl))
        })
    }
}

/// Portfolio value at one step of a time-decay run.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeDecayPoint {
    /// Step number, 0 for the base market
    pub step: usize,
    /// Remaining time to expiry in years
    pub time_to_expiry: f64,
    /// Net portfolio value
    pub value: f64,
    /// `value` minus the base value
    pub pnl: f64,
    /// Net portfolio theta
    pub theta: f64,
}
