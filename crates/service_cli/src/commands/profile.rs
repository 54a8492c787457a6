//! Profile command implementation
//!
//! Prints an aggregated Greek, or the P&L against today's value, across a
//! range of spot prices.

use pricer_risk::scenarios::{Greek, ProfilePoint, SpotProfiler};
use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::config::EngineConfig;
use crate::input::PortfolioFile;
use crate::output::{num, write_json, OutputFormat, Table};
use crate::Result;

/// What to evaluate along spot
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProfileMeasure {
    /// One aggregated Greek
    Greek(Greek),
    /// Net value minus the value at the current spot
    Pnl,
}

/// Spot range of a profile, as factors of the current spot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotRange {
    pub lower: f64,
    pub upper: f64,
    pub points: usize,
}

/// Run the profile command
pub fn run(
    portfolio: &Path,
    measure: ProfileMeasure,
    range: SpotRange,
    format: OutputFormat,
    config: &EngineConfig,
    out: &mut impl Write,
) -> Result<()> {
    info!("Building spot profile...");
    info!("  Portfolio: {}", portfolio.display());

    let file = PortfolioFile::load(portfolio)?;
    let points = evaluate(&file, measure, range, config)?;

    let label = match measure {
        ProfileMeasure::Greek(greek) => greek.as_str(),
        ProfileMeasure::Pnl => "pnl",
    };
    match format {
        OutputFormat::Json => write_json(&points, out),
        OutputFormat::Table => profile_table(&points, label).render(out),
        OutputFormat::Csv => profile_table(&points, label).write_csv(out),
    }
}

/// Evaluate the profile of one portfolio
pub fn evaluate(
    file: &PortfolioFile,
    measure: ProfileMeasure,
    range: SpotRange,
    config: &EngineConfig,
) -> Result<Vec<ProfilePoint>> {
    let profiler = SpotProfiler::new(config.parallel.clone());
    let (legs, market) = (&file.positions, &file.market);
    let points = match measure {
        ProfileMeasure::Greek(greek) => {
            profiler.greek(legs, market, greek, range.lower, range.upper, range.points)?
        }
        ProfileMeasure::Pnl => profiler.pnl(legs, market, range.lower, range.upper, range.points)?,
    };
    Ok(points)
}

fn profile_table(points: &[ProfilePoint], label: &str) -> Table {
    let mut table = Table::new(["spot", label]);
    for p in points {
        table.push_row([num(p.spot, 2), num(p.value, 6)]);
    }
    table
}
