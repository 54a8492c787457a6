//! Engine configuration management
//!
//! Loads configuration from (lowest to highest precedence) defaults, a TOML
//! file, `DERIV_` environment variables and CLI arguments.

use pricer_models::ImpliedVolConfig;
use pricer_risk::ParallelConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Configuration file read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "deriv.toml";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "DERIV";

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("Configuration source error: {0}")]
    Source(#[from] config::ConfigError),
}

/// Log levels supported by the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl LogLevel {
    /// Convert log level to tracing filter string
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        LogLevel::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Scenario analysis settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Multiplicative spot factors (grid rows)
    pub spot_shocks: Vec<f64>,
    /// Additive volatility shifts (grid columns)
    pub vol_shocks: Vec<f64>,
    /// Time decay steps between today and expiry
    pub horizon_steps: usize,
    /// Confidence level of the one-day VaR
    pub var_confidence: f64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            spot_shocks: vec![0.8, 0.85, 0.9, 0.95, 1.0, 1.05, 1.1, 1.15, 1.2],
            vol_shocks: vec![-0.1, -0.05, 0.0, 0.05, 0.1],
            horizon_steps: 30,
            var_confidence: 0.95,
        }
    }
}

/// Engine configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Risk-free rate used when a command does not read it from a portfolio file
    pub risk_free_rate: f64,
    /// Log level
    pub log_level: LogLevel,
    /// Implied volatility solver settings
    pub implied_vol: ImpliedVolConfig,
    /// Parallel evaluation settings
    pub parallel: ParallelConfig,
    /// Scenario analysis settings
    pub scenario: ScenarioConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.05,
            log_level: LogLevel::Info,
            implied_vol: ImpliedVolConfig::default(),
            parallel: ParallelConfig::default(),
            scenario: ScenarioConfig::default(),
        }
    }
}

/// `DERIV_RISK_FREE_RATE`, `DERIV_SCENARIO__HORIZON_STEPS`, ...
fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

impl EngineConfig {
    /// Load configuration from the TOML file and the environment
    ///
    /// An explicitly given file must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        let builder = config::Config::builder()
            .add_source(config::File::from(path).format(config::FileFormat::Toml).required(required))
            .add_source(environment());
        Self::from_builder(builder)
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        let config: EngineConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.risk_free_rate.is_finite() {
            return Err(ConfigError::InvalidValue {
                field: "risk_free_rate",
                reason: format!("{} is not finite", self.risk_free_rate),
            });
        }

        self.implied_vol
            .validate()
            .map_err(|e| ConfigError::InvalidValue {
                field: "implied_vol",
                reason: e.to_string(),
            })?;

        if self.parallel.batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "parallel.batch_size",
                reason: "must be at least 1".to_string(),
            });
        }

        let scenario = &self.scenario;
        if scenario.horizon_steps == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scenario.horizon_steps",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(scenario.var_confidence >= 0.5 && scenario.var_confidence < 1.0) {
            return Err(ConfigError::InvalidValue {
                field: "scenario.var_confidence",
                reason: format!("{} is not in [0.5, 1)", scenario.var_confidence),
            });
        }
        if scenario.spot_shocks.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "scenario.spot_shocks",
                reason: "factors must be positive and finite".to_string(),
            });
        }
        if scenario.vol_shocks.iter().any(|s| !s.is_finite()) {
            return Err(ConfigError::InvalidValue {
                field: "scenario.vol_shocks",
                reason: "shifts must be finite".to_string(),
            });
        }

        Ok(())
    }

    /// Merge with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli: &CliOverrides) {
        if let Some(level) = cli.log_level {
            self.log_level = level;
        }
        if let Some(threshold) = cli.parallel_threshold {
            self.parallel.parallel_threshold = threshold;
        }
    }
}

/// CLI arguments that override configuration values
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// Config file path
    pub config_file: Option<PathBuf>,
    /// Log level override
    pub log_level: Option<LogLevel>,
    /// Parallel threshold override
    pub parallel_threshold: Option<usize>,
}

/// Build configuration from all sources
///
/// Priority (highest to lowest):
/// 1. CLI arguments
/// 2. Environment variables
/// 3. Config file
/// 4. Default values
pub fn build_config(cli: &CliOverrides) -> Result<EngineConfig, ConfigError> {
    let mut config = EngineConfig::load(cli.config_file.as_deref())?;
    config.merge_with_cli(cli);
    config.validate()?;
    Ok(config)
}
