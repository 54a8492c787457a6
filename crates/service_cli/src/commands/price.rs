//! Price command implementation
//!
//! Prices every leg of a portfolio file and prints per-position values,
//! Greeks and the aggregate.

use pricer_risk::{PortfolioAggregator, PortfolioSnapshot};
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::input::PortfolioFile;
use crate::output::{money, num, write_json, OutputFormat, Table};
use crate::Result;

/// Run the price command
pub fn run(
    portfolio: &Path,
    format: OutputFormat,
    config: &EngineConfig,
    out: &mut impl Write,
) -> Result<()> {
    info!("Starting pricing...");
    info!("  Portfolio: {}", portfolio.display());
    info!("  Output format: {:?}", format);

    let file = PortfolioFile::load(portfolio)?;
    let snapshot =
        PortfolioAggregator::new(config.parallel.clone()).aggregate(&file.positions, &file.market);

    render(&snapshot, format, out)?;
    info!("Pricing complete");
    Ok(())
}

/// Write a snapshot in the requested format
pub fn render(snapshot: &PortfolioSnapshot, format: OutputFormat, out: &mut impl Write) -> Result<()> {
    for failure in snapshot.failures() {
        warn!(
            index = failure.index,
            leg = %failure.instrument.display_name(),
            "{}",
            failure.error
        );
    }

    match format {
        OutputFormat::Json => write_json(snapshot, out),
        OutputFormat::Csv => positions_table(snapshot).write_csv(out),
        OutputFormat::Table => {
            positions_table(snapshot).render(out)?;
            writeln!(out, "Net value:           {}", money(snapshot.value()))?;
            writeln!(out, "Net delta exposure:  {}", money(snapshot.net_delta_exposure()))?;
            if snapshot.positions().iter().any(|p| p.instrument.entry_price().is_some()) {
                writeln!(out, "Unrealised P&L:      {}", money(snapshot.unrealised_pnl()))?;
            }
            for failure in snapshot.failures() {
                writeln!(
                    out,
                    "Not priced: #{} {}: {}",
                    failure.index,
                    failure.instrument.display_name(),
                    failure.error
                )?;
            }
            Ok(())
        }
    }
}

fn positions_table(snapshot: &PortfolioSnapshot) -> Table {
    let mut table = Table::new([
        "Position", "Kind", "Qty", "Mult", "Branch", "Unit Price", "Value", "Delta", "Gamma",
        "Vega", "Theta", "Rho",
    ]);

    for p in snapshot.positions() {
        let leg = &p.instrument;
        table.push_row([
            leg.display_name(),
            leg.kind().to_string(),
            num(leg.quantity(), 2),
            num(leg.multiplier(), 0),
            p.branch.to_string(),
            num(p.unit.price, 4),
            num(p.position.price, 2),
            num(p.position.delta, 4),
            num(p.position.gamma, 4),
            num(p.position.vega, 4),
            num(p.position.theta, 4),
            num(p.position.rho, 4),
        ]);
    }

    let total = snapshot.total();
    table.push_row([
        "TOTAL".to_string(),
        String::new(),
        String::new(),
        String::new(),
        String::new(),
        String::new(),
        num(total.price, 2),
        num(total.delta, 4),
        num(total.gamma, 4),
        num(total.vega, 4),
        num(total.theta, 4),
        num(total.rho, 4),
    ]);
    table
}
