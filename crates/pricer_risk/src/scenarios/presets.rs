//! Preset scenarios for quick what-if comparisons.
//!
//! Provides the standard set compared side by side:
//! - Spot moves of ±10%
//! - A ten-point volatility spike
//! - One week of time decay

use super::engine::MarketShock;

/// Named market shocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PresetScenario {
    /// No change
    BaseCase,
    /// Spot +10%
    MarketUp10Pct,
    /// Spot -10%
    MarketDown10Pct,
    /// Volatility +10 points
    VolatilitySpike,
    /// Seven calendar days pass
    OneWeekDecay,
}

impl PresetScenario {
    /// The standard comparison set, in display order.
    pub fn standard() -> Vec<Self> {
        vec![
            Self::BaseCase,
            Self::MarketUp10Pct,
            Self::MarketDown10Pct,
            Self::VolatilitySpike,
            Self::OneWeekDecay,
        ]
    }

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::BaseCase => "Base Case",
            Self::MarketUp10Pct => "Market Up 10%",
            Self::MarketDown10Pct => "Market Down 10%",
            Self::VolatilitySpike => "Volatility Spike",
            Self::OneWeekDecay => "1 Week Decay",
        }
    }

    /// Get description.
    pub fn description(&self) -> &'static str {
        match self {
            Self::BaseCase => "Unchanged market",
            Self::MarketUp10Pct => "Underlying rises 10%",
            Self::MarketDown10Pct => "Underlying falls 10%",
            Self::VolatilitySpike => "Volatility increases 10 percentage points",
            Self::OneWeekDecay => "Seven calendar days pass with spot and volatility fixed",
        }
    }

    /// The shock applied by this preset.
    pub fn shock(&self) -> MarketShock {
        match self {
            Self::BaseCase => MarketShock::default(),
            Self::MarketUp10Pct => MarketShock::spot(0.10),
            Self::MarketDown10Pct => MarketShock::spot(-0.10),
            Self::VolatilitySpike => MarketShock::volatility(0.10),
            Self::OneWeekDecay => MarketShock::days(7.0),
        }
    }
}
