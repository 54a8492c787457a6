//! Check command implementation
//!
//! Prints the effective configuration after all sources are merged.

use std::io::Write;
use tracing::info;

use crate::config::EngineConfig;
use crate::Result;

/// Run the check command
pub fn run(config: &EngineConfig, out: &mut impl Write) -> Result<()> {
    info!("Checking configuration...");
    let rendered = toml::to_string_pretty(config)?;
    write!(out, "{}", rendered)?;
    info!("Configuration is valid");
    Ok(())
}
