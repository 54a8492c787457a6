//! Risk command implementation
//!
//! Prints portfolio Greeks and summary risk metrics.

use pricer_core::types::MarketState;
use pricer_models::PricingResult;
use pricer_risk::{PortfolioAggregator, PortfolioSnapshot, RiskMetrics};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::config::EngineConfig;
use crate::input::PortfolioFile;
use crate::output::{money, num, percent, write_json, OutputFormat, Table};
use crate::Result;

/// Portfolio Greeks and risk metrics
#[derive(Debug, Clone, Serialize)]
pub struct RiskReport {
    pub greeks: PricingResult,
    pub metrics: RiskMetrics,
    pub unrealised_pnl: f64,
    pub unpriced_positions: usize,
}

impl RiskReport {
    /// Build the report for one snapshot
    pub fn new(snapshot: &PortfolioSnapshot, market: &MarketState, confidence: f64) -> Result<Self> {
        Ok(Self {
            greeks: *snapshot.total(),
            metrics: RiskMetrics::from_snapshot(snapshot, market, confidence)?,
            unrealised_pnl: snapshot.unrealised_pnl(),
            unpriced_positions: snapshot.failures().len(),
        })
    }
}

/// Run the risk command
pub fn run(
    portfolio: &Path,
    format: OutputFormat,
    config: &EngineConfig,
    out: &mut impl Write,
) -> Result<()> {
    info!("Computing risk metrics...");
    info!("  Portfolio: {}", portfolio.display());

    let file = PortfolioFile::load(portfolio)?;
    let snapshot =
        PortfolioAggregator::new(config.parallel.clone()).aggregate(&file.positions, &file.market);
    let report = RiskReport::new(&snapshot, &file.market, config.scenario.var_confidence)?;

    match format {
        OutputFormat::Json => write_json(&report, out),
        OutputFormat::Table => report_table(&report).render(out),
        OutputFormat::Csv => report_table(&report).write_csv(out),
    }
}

fn report_table(report: &RiskReport) -> Table {
    let g = &report.greeks;
    let m = &report.metrics;
    let var_label = format!("1-Day VaR ({})", percent(m.confidence));

    let mut table = Table::new(["Metric", "Value"]);
    table.push_row(["Delta".to_string(), num(g.delta, 4)]);
    table.push_row(["Gamma".to_string(), num(g.gamma, 4)]);
    table.push_row(["Vega".to_string(), num(g.vega, 4)]);
    table.push_row(["Theta".to_string(), num(g.theta, 4)]);
    table.push_row(["Rho".to_string(), num(g.rho, 4)]);
    table.push_row(["Portfolio Value".to_string(), money(m.portfolio_value)]);
    table.push_row(["Net Value".to_string(), money(m.net_value)]);
    table.push_row(["Delta Exposure".to_string(), money(m.delta_exposure)]);
    table.push_row([var_label, money(m.var)]);
    table.push_row(["Position Count".to_string(), m.position_count.to_string()]);
    table.push_row(["Diversification Score".to_string(), percent(m.diversification_score)]);
    table.push_row(["Unrealised P&L".to_string(), money(report.unrealised_pnl)]);
    if report.unpriced_positions > 0 {
        table.push_row(["Unpriced Positions".to_string(), report.unpriced_positions.to_string()]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::tests::sample;
    use pricer_risk::aggregate;

    #[test]
    fn test_report_matches_snapshot() {
        let file = sample();
        let snapshot = aggregate(&file.positions, &file.market);
        let report = RiskReport::new(&snapshot, &file.market, 0.95).unwrap();

        assert_eq!(report.greeks, *snapshot.total());
        assert_eq!(report.metrics.position_count, 3);
        assert!(report.metrics.var > 0.0);
        assert_eq!(report.unpriced_positions, 0);
    }

    #[test]
    fn test_table_output() {
        let file = sample();
        let snapshot = aggregate(&file.positions, &file.market);
        let report = RiskReport::new(&snapshot, &file.market, 0.95).unwrap();

        let mut out = Vec::new();
        report_table(&report).render(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("1-Day VaR (95.0%)"));
        assert!(text.contains("Diversification Score"));
        assert!(!text.contains("Unpriced Positions"));
    }
}
