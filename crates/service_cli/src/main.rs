//! deriv - command-line derivative pricing and risk
//!
//! # Commands
//!
//! - `deriv price --portfolio <file>` - Price every leg and the aggregate
//! - `deriv iv --kind call --spot .. --strike .. --expiry-days .. --price ..` - Implied volatility
//! - `deriv risk --portfolio <file>` - Portfolio Greeks and risk metrics
//! - `deriv scenario --portfolio <file>` - P&L grid, time decay and presets
//! - `deriv profile --portfolio <file> --greek delta` - Greek across spot
//! - `deriv check` - Print the effective configuration
//!
//! # Configuration
//!
//! Defaults, then `deriv.toml` (or `--config`), then `DERIV_*` environment
//! variables, then command-line flags. `RUST_LOG` overrides the log level.

use clap::{Parser, Subcommand};
use pricer_core::types::InstrumentKind;
use pricer_risk::scenarios::{
    Greek, MarketShock, DEFAULT_PROFILE_LOWER, DEFAULT_PROFILE_POINTS, DEFAULT_PROFILE_UPPER,
};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod error;
mod input;
mod output;

pub use error::{CliError, Result};

use commands::iv::IvRequest;
use commands::profile::{ProfileMeasure, SpotRange};
use config::{build_config, CliOverrides, LogLevel};
use output::OutputFormat;

/// Derivative pricing and risk CLI
#[derive(Parser)]
#[command(name = "deriv")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path [default: deriv.toml, optional]
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    /// Minimum item count before evaluation runs in parallel
    #[arg(long, global = true)]
    parallel_threshold: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Price every leg of a portfolio
    Price {
        /// Path to portfolio file (JSON)
        #[arg(short, long)]
        portfolio: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Implied volatility of an observed option price
    Iv {
        /// Option kind (call or put)
        #[arg(short, long)]
        kind: InstrumentKind,

        /// Spot price
        #[arg(long)]
        spot: f64,

        /// Strike price
        #[arg(long)]
        strike: f64,

        /// Calendar days to expiry
        #[arg(long)]
        expiry_days: f64,

        /// Observed option price
        #[arg(long)]
        price: f64,

        /// Continuous dividend yield
        #[arg(long, default_value_t = 0.0)]
        dividend_yield: f64,

        /// Risk-free rate [default: configured risk_free_rate]
        #[arg(long, allow_hyphen_values = true)]
        rate: Option<f64>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Portfolio Greeks and risk metrics
    Risk {
        /// Path to portfolio file (JSON)
        #[arg(short, long)]
        portfolio: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// P&L grid, time decay and scenario comparison
    Scenario {
        /// Path to portfolio file (JSON)
        #[arg(short, long)]
        portfolio: PathBuf,

        /// Relative spot move of a custom shock, e.g. -0.1
        #[arg(long, allow_hyphen_values = true)]
        spot_change: Option<f64>,

        /// Absolute volatility shift of a custom shock
        #[arg(long, allow_hyphen_values = true)]
        vol_change: Option<f64>,

        /// Days passed in a custom shock
        #[arg(long)]
        days: Option<f64>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Aggregated Greek or P&L across a spot range
    Profile {
        /// Path to portfolio file (JSON)
        #[arg(short, long)]
        portfolio: PathBuf,

        /// Greek to profile (price, delta, gamma, vega, theta, rho)
        #[arg(short, long, default_value = "delta", conflicts_with = "pnl")]
        greek: Greek,

        /// Profile P&L against the current value instead of a Greek
        #[arg(long)]
        pnl: bool,

        /// Lowest spot as a factor of the current spot
        #[arg(long, default_value_t = DEFAULT_PROFILE_LOWER)]
        lower: f64,

        /// Highest spot as a factor of the current spot
        #[arg(long, default_value_t = DEFAULT_PROFILE_UPPER)]
        upper: f64,

        /// Number of spot points
        #[arg(long, default_value_t = DEFAULT_PROFILE_POINTS)]
        points: usize,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Print the effective configuration
    Check,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let overrides = CliOverrides {
        config_file: cli.config.clone(),
        log_level: if cli.verbose {
            Some(LogLevel::Debug)
        } else {
            cli.log_level
        },
        parallel_threshold: cli.parallel_threshold,
    };
    let config = build_config(&overrides)?;

    // Initialise tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_filter_str()));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if cli.verbose {
        info!("Verbose mode enabled");
    }
    debug!(?config, "configuration loaded");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Price { portfolio, format } => {
            commands::price::run(&portfolio, format, &config, &mut out)
        }
        Commands::Iv {
            kind,
            spot,
            strike,
            expiry_days,
            price,
            dividend_yield,
            rate,
            format,
        } => {
            let request = IvRequest {
                kind,
                spot,
                strike,
                expiry_days,
                price,
                dividend_yield,
                rate,
            };
            commands::iv::run(&request, format, &config, &mut out)
        }
        Commands::Risk { portfolio, format } => {
            commands::risk::run(&portfolio, format, &config, &mut out)
        }
        Commands::Scenario {
            portfolio,
            spot_change,
            vol_change,
            days,
            format,
        } => {
            let shock = if spot_change.is_some() || vol_change.is_some() || days.is_some() {
                Some(MarketShock::new(
                    spot_change.unwrap_or(0.0),
                    vol_change.unwrap_or(0.0),
                    days.unwrap_or(0.0),
                ))
            } else {
                None
            };
            commands::scenario::run(&portfolio, shock, format, &config, &mut out)
        }
        Commands::Profile {
            portfolio,
            greek,
            pnl,
            lower,
            upper,
            points,
            format,
        } => {
            let measure = if pnl {
                ProfileMeasure::Pnl
            } else {
                ProfileMeasure::Greek(greek)
            };
            let range = SpotRange {
                lower,
                upper,
                points,
            };
            commands::profile::run(&portfolio, measure, range, format, &config, &mut out)
        }
        Commands::Check => commands::check::run(&config, &mut out),
    }
}
