//! Portfolio file loading.
//!
//! Portfolio files are JSON:
//!
//! ```json
//! {
//!   "market": { "spot": 100.0, "rate": 0.05, "volatility": 0.2, "time_to_expiry": 0.25 },
//!   "positions": [
//!     { "kind": "call", "strike": 105.0, "quantity": 10, "multiplier": 100, "label": "CALL_105" },
//!     { "kind": "future", "quantity": -2 }
//!   ]
//! }
//! ```

use pricer_core::types::{InstrumentSpec, MarketState};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::{CliError, Result};

/// Market state and position legs read from a portfolio file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioFile {
    /// Market all legs are valued against
    pub market: MarketState,
    /// Position legs in file order
    #[serde(default)]
    pub positions: Vec<InstrumentSpec>,
}

impl PortfolioFile {
    /// Read and parse a portfolio file.
    ///
    /// The market is validated here. Invalid legs are kept and reported
    /// per position by the commands.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CliError::FileNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        let file = Self::parse(&content)?;
        debug!(
            path = %path.display(),
            positions = file.positions.len(),
            "portfolio loaded"
        );
        Ok(file)
    }

    /// Parse portfolio JSON.
    pub fn parse(content: &str) -> Result<Self> {
        let file: PortfolioFile = serde_json::from_str(content)?;
        file.market.validate()?;
        Ok(file)
    }
}
