//! Portfolio aggregation and risk metrics.
//!
//! - [`PortfolioAggregator`]: prices each leg and sums the weighted results
//! - [`PortfolioSnapshot`]: positions in input order, totals and failures
//! - [`RiskMetrics`]: gross value, delta-normal VaR, diversification

mod aggregator;
mod metrics;
mod snapshot;

pub use aggregator::{aggregate, PortfolioAggregator};
pub use metrics::{
    diversification_score, RiskMetrics, DEFAULT_VAR_CONFIDENCE, TRADING_DAYS_PER_YEAR,
};
pub use snapshot::{PortfolioSnapshot, PositionFailure, PositionValuation};
