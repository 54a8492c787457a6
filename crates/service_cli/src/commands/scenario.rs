//! Scenario command implementation
//!
//! Prints the spot × volatility P&L grid, the time decay of the portfolio,
//! the preset comparison and, when requested, one custom shock.

use pricer_core::types::DAYS_PER_YEAR;
use pricer_risk::scenarios::{
    MarketShock, PresetScenario, ScenarioEngine, ScenarioGrid, ShockResult, TimeDecayPoint,
};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::config::EngineConfig;
use crate::input::PortfolioFile;
use crate::output::{money, num, write_json, OutputFormat, Table};
use crate::Result;

/// Total P&L of one preset
#[derive(Debug, Clone, Serialize)]
pub struct PresetPnl {
    pub name: &'static str,
    pub description: &'static str,
    pub total_pnl: f64,
}

/// Everything the scenario command computes
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub grid: ScenarioGrid,
    pub time_decay: Vec<TimeDecayPoint>,
    pub presets: Vec<PresetPnl>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shock: Option<ShockResult>,
}

impl ScenarioReport {
    /// Run all analyses for one portfolio
    pub fn build(file: &PortfolioFile, config: &EngineConfig, shock: Option<MarketShock>) -> Result<Self> {
        let engine = ScenarioEngine::new(config.parallel.clone());
        let legs = &file.positions;
        let market = &file.market;
        let scenario = &config.scenario;

        let grid = engine.run_grid(legs, market, &scenario.spot_shocks, &scenario.vol_shocks);
        let time_decay = engine.run_time_decay(legs, market, scenario.horizon_steps)?;
        let standard = PresetScenario::standard();
        let presets = standard
            .iter()
            .zip(engine.run_presets(legs, market, &standard))
            .map(|(preset, (name, total_pnl))| PresetPnl {
                name,
                description: preset.description(),
                total_pnl,
            })
            .collect();
        let shock = shock.map(|s| engine.run_shock(legs, market, s));

        Ok(Self {
            grid,
            time_decay,
            presets,
            shock,
        })
    }
}

/// Run the scenario command
pub fn run(
    portfolio: &Path,
    shock: Option<MarketShock>,
    format: OutputFormat,
    config: &EngineConfig,
    out: &mut impl Write,
) -> Result<()> {
    info!("Running scenario analysis...");
    info!("  Portfolio: {}", portfolio.display());

    let file = PortfolioFile::load(portfolio)?;
    let report = ScenarioReport::build(&file, config, shock)?;
    render(&report, format, out)
}

/// Write a report in the requested format
///
/// CSV output carries the P&L grid only.
pub fn render(report: &ScenarioReport, format: OutputFormat, out: &mut impl Write) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(report, out),
        OutputFormat::Csv => grid_table(&report.grid, false).write_csv(out),
        OutputFormat::Table => {
            writeln!(out, "P&L grid (base value {})", money(report.grid.base_value()))?;
            grid_table(&report.grid, true).render(out)?;
            for failure in report.grid.failures() {
                writeln!(
                    out,
                    "  n/a at spot x{} vol {:+}: {}",
                    report.grid.spot_shocks()[failure.spot_index],
                    report.grid.vol_shocks()[failure.vol_index],
                    failure.error
                )?;
            }

            writeln!(out, "\nTime decay")?;
            decay_table(&report.time_decay).render(out)?;

            writeln!(out, "\nScenario comparison")?;
            let mut presets = Table::new(["Scenario", "Description", "P&L"]);
            for preset in &report.presets {
                presets.push_row([
                    preset.name.to_string(),
                    preset.description.to_string(),
                    money(preset.total_pnl),
                ]);
            }
            presets.render(out)?;

            if let Some(shock) = &report.shock {
                writeln!(
                    out,
                    "\nCustom shock: spot {:+.1}%, vol {:+.2}, {} days",
                    100.0 * shock.shock.spot_change,
                    shock.shock.vol_change,
                    shock.shock.days_passed
                )?;
                shock_table(shock).render(out)?;
            }
            Ok(())
        }
    }
}

fn grid_table(grid: &ScenarioGrid, pretty: bool) -> Table {
    let mut headers = vec!["spot_factor".to_string()];
    headers.extend(grid.vol_shocks().iter().map(|v| {
        if pretty {
            format!("vol {:+.2}", v)
        } else {
            format!("{}", v)
        }
    }));
    let mut table = Table::new(headers);

    for (factor, row) in grid.spot_shocks().iter().zip(grid.rows()) {
        let mut cells = vec![if pretty {
            format!("{:.0}%", 100.0 * factor)
        } else {
            format!("{}", factor)
        }];
        cells.extend(row.iter().map(|pnl| if pretty { money(*pnl) } else { num(*pnl, 6) }));
        table.push_row(cells);
    }
    table
}

fn decay_table(points: &[TimeDecayPoint]) -> Table {
    let mut table = Table::new(["Step", "Days Left", "Value", "P&L", "Theta"]);
    for p in points {
        table.push_row([
            p.step.to_string(),
            num(p.time_to_expiry * DAYS_PER_YEAR, 1),
            money(p.value),
            money(p.pnl),
            num(p.theta, 2),
        ]);
    }
    table
}

fn shock_table(result: &ShockResult) -> Table {
    let mut table = Table::new(["Position", "P&L", "P&L (%)"]);
    for p in &result.positions {
        table.push_row([p.name.clone(), money(p.pnl), format!("{:.2}%", p.pnl_percent)]);
    }
    table.push_row(["TOTAL".to_string(), money(result.total_pnl), String::new()]);
    table
}
