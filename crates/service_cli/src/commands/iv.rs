//! Implied volatility command implementation
//!
//! Inverts an observed option price to the Black-Scholes volatility and
//! reports the Greeks at that volatility.

use pricer_core::types::{InstrumentKind, InstrumentSpec, MarketState};
use pricer_models::{price, ImpliedVolatilitySolver, PricingResult};
use serde::Serialize;
use std::io::Write;
use tracing::info;

use crate::config::EngineConfig;
use crate::output::{num, percent, write_json, OutputFormat, Table};
use crate::{CliError, Result};

/// Inputs of one implied volatility query
#[derive(Debug, Clone)]
pub struct IvRequest {
    /// Call or put
    pub kind: InstrumentKind,
    /// Spot price
    pub spot: f64,
    /// Strike price
    pub strike: f64,
    /// Calendar days to expiry
    pub expiry_days: f64,
    /// Observed option price
    pub price: f64,
    /// Continuous dividend yield
    pub dividend_yield: f64,
    /// Risk-free rate, configuration value when `None`
    pub rate: Option<f64>,
}

/// Implied volatility and Greeks at the solution
#[derive(Debug, Clone, Serialize)]
pub struct IvReport {
    pub kind: InstrumentKind,
    pub spot: f64,
    pub strike: f64,
    pub rate: f64,
    pub dividend_yield: f64,
    pub time_to_expiry: f64,
    pub observed_price: f64,
    pub implied_volatility: f64,
    pub greeks: PricingResult,
}

/// Run the iv command
pub fn run(
    request: &IvRequest,
    format: OutputFormat,
    config: &EngineConfig,
    out: &mut impl Write,
) -> Result<()> {
    info!("Solving implied volatility...");
    let report = solve(request, config)?;
    info!("  Implied volatility: {:.6}", report.implied_volatility);

    match format {
        OutputFormat::Json => write_json(&report, out),
        OutputFormat::Table => report_table(&report).render(out),
        OutputFormat::Csv => report_table(&report).write_csv(out),
    }
}

/// Solve one request
pub fn solve(request: &IvRequest, config: &EngineConfig) -> Result<IvReport> {
    if !request.kind.is_option() {
        return Err(CliError::invalid_argument(
            "implied volatility needs a call or a put",
        ));
    }

    let rate = request.rate.unwrap_or(config.risk_free_rate);
    // Volatility is the unknown; the solver ignores the market value
    let market = MarketState::from_days(
        request.spot,
        rate,
        request.dividend_yield,
        0.0,
        request.expiry_days,
    )?;
    let option = InstrumentSpec::new(request.kind, request.strike, 1.0, 1.0)?;

    let implied_volatility =
        ImpliedVolatilitySolver::new(config.implied_vol).solve(&option, &market, request.price)?;
    let greeks = price(&option, &market.with_volatility(implied_volatility))?;

    Ok(IvReport {
        kind: request.kind,
        spot: request.spot,
        strike: request.strike,
        rate,
        dividend_yield: request.dividend_yield,
        time_to_expiry: market.time_to_expiry(),
        observed_price: request.price,
        implied_volatility,
        greeks,
    })
}

fn report_table(report: &IvReport) -> Table {
    let mut table = Table::new(["Field", "Value"]);
    table.push_row(["Option".to_string(), format!("{} {}", report.kind, report.strike)]);
    table.push_row(["Observed price".to_string(), num(report.observed_price, 4)]);
    table.push_row(["Implied volatility".to_string(), percent(report.implied_volatility)]);
    table.push_row(["Model price".to_string(), num(report.greeks.price, 4)]);
    table.push_row(["Delta".to_string(), num(report.greeks.delta, 4)]);
    table.push_row(["Gamma".to_string(), num(report.greeks.gamma, 4)]);
    table.push_row(["Vega".to_string(), num(report.greeks.vega, 4)]);
    table.push_row(["Theta".to_string(), num(report.greeks.theta, 4)]);
    table.push_row(["Rho".to_string(), num(report.greeks.rho, 4)]);
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricer_core::types::PricingError;

    fn request(kind: InstrumentKind, observed: f64) -> IvRequest {
        IvRequest {
            kind,
            spot: 100.0,
            strike: 100.0,
            expiry_days: 365.0,
            price: observed,
            dividend_yield: 0.0,
            rate: None,
        }
    }

    #[test]
    fn test_recovers_reference_volatility() {
        let report = solve(&request(InstrumentKind::Call, 10.450_583_572), &EngineConfig::default()).unwrap();
        assert!((report.implied_volatility - 0.2).abs() < 1e-6);
        assert!((report.greeks.delta - 0.6368).abs() < 1e-3);
        assert_eq!(report.rate, 0.05);
    }

    #[test]
    fn test_arbitrage_violation_surfaces() {
        let mut req = request(InstrumentKind::Call, 5.0);
        req.spot = 120.0;
        let err = solve(&req, &EngineConfig::default()).unwrap_err();
        assert!(matches!(err, CliError::Pricing(PricingError::ArbitrageViolation { .. })));
    }

    #[test]
    fn test_future_rejected() {
        let err = solve(&request(InstrumentKind::Future, 1.0), &EngineConfig::default()).unwrap_err();
        assert!(matches!(err, CliError::InvalidArgument(_)));
    }

    #[test]
    fn test_table_output() {
        let report = solve(&request(InstrumentKind::Put, 5.573_526_022), &EngineConfig::default()).unwrap();
        let mut out = Vec::new();
        report_table(&report).render(&mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("20.0%"));
    }
}
