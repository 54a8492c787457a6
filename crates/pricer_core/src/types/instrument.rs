//! Position leg descriptions.

use super::error::PricingError;
use std::fmt;

/// Closed set of supported instrument kinds.
///
/// Pricing code matches exhaustively on this enum, so a new kind is a
/// compile-time checked extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum InstrumentKind {
    /// European call option
    Call,
    /// European put option
    Put,
    /// Future on the underlying
    Future,
}

impl InstrumentKind {
    /// Returns `true` for calls and puts.
    #[inline]
    pub fn is_option(&self) -> bool {
        matches!(self, InstrumentKind::Call | InstrumentKind::Put)
    }

    /// Lowercase name used in labels and output.
    pub fn as_str(&self) -> &'static str {
        match self {
            InstrumentKind::Call => "call",
            InstrumentKind::Put => "put",
            InstrumentKind::Future => "future",
        }
    }
}

impl fmt::Display for InstrumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InstrumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "call" | "c" => Ok(InstrumentKind::Call),
            "put" | "p" => Ok(InstrumentKind::Put),
            "future" | "futures" | "f" => Ok(InstrumentKind::Future),
            _ => Err(format!(
                "Unknown instrument kind: {}. Expected call, put or future",
                s
            )),
        }
    }
}

/// Direction of a position, derived from the sign of its quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Positive quantity
    Long,
    /// Negative quantity
    Short,
}

/// Immutable description of a single position leg.
///
/// `quantity` is signed (long positive, short negative) and every pricing
/// contribution is weighted by `quantity * multiplier`. The strike is only
/// meaningful for options.
///
/// # Examples
/// ```
/// use pricer_core::types::{InstrumentSpec, InstrumentKind, Side};
///
/// let call = InstrumentSpec::call(105.0, -2.0, 100.0).unwrap();
/// assert_eq!(call.kind(), InstrumentKind::Call);
/// assert_eq!(call.side(), Side::Short);
/// assert_eq!(call.weight(), -200.0);
///
/// assert!(InstrumentSpec::put(0.0, 1.0, 1.0).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InstrumentSpec {
    kind: InstrumentKind,
    #[cfg_attr(feature = "serde", serde(default))]
    strike: f64,
    quantity: f64,
    #[cfg_attr(feature = "serde", serde(default = "default_multiplier"))]
    multiplier: f64,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    label: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    entry_price: Option<f64>,
}

#[cfg(feature = "serde")]
fn default_multiplier() -> f64 {
    1.0
}

impl InstrumentSpec {
    /// Creates a validated leg.
    ///
    /// # Errors
    /// `PricingError::InvalidInput` if the strike of an option is not
    /// positive, the multiplier is not positive, or a value is not finite.
    pub fn new(
        kind: InstrumentKind,
        strike: f64,
        quantity: f64,
        multiplier: f64,
    ) -> Result<Self, PricingError> {
        let spec = Self {
            kind,
            strike,
            quantity,
            multiplier,
            label: None,
            entry_price: None,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// European call leg.
    pub fn call(strike: f64, quantity: f64, multiplier: f64) -> Result<Self, PricingError> {
        Self::new(InstrumentKind::Call, strike, quantity, multiplier)
    }

    /// European put leg.
    pub fn put(strike: f64, quantity: f64, multiplier: f64) -> Result<Self, PricingError> {
        Self::new(InstrumentKind::Put, strike, quantity, multiplier)
    }

    /// Futures leg. Has no strike.
    pub fn future(quantity: f64, multiplier: f64) -> Result<Self, PricingError> {
        Self::new(InstrumentKind::Future, 0.0, quantity, multiplier)
    }

    /// Attaches a display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Attaches the per-unit price paid when the position was opened.
    pub fn with_entry_price(mut self, entry_price: f64) -> Self {
        self.entry_price = Some(entry_price);
        self
    }

    /// Checks every invariant.
    pub fn validate(&self) -> Result<(), PricingError> {
        if !self.quantity.is_finite() {
            return Err(PricingError::invalid_input(
                "quantity",
                self.quantity,
                "must be finite",
            ));
        }
        if !(self.multiplier.is_finite() && self.multiplier > 0.0) {
            return Err(PricingError::invalid_input(
                "multiplier",
                self.multiplier,
                "must be positive",
            ));
        }
        if self.kind.is_option() && !(self.strike.is_finite() && self.strike > 0.0) {
            return Err(PricingError::invalid_input(
                "strike",
                self.strike,
                "must be positive for options",
            ));
        }
        if let Some(entry) = self.entry_price {
            if !entry.is_finite() {
                return Err(PricingError::invalid_input(
                    "entry_price",
                    entry,
                    "must be finite",
                ));
            }
        }
        Ok(())
    }

    /// Instrument kind.
    #[inline]
    pub fn kind(&self) -> InstrumentKind {
        self.kind
    }

    /// Strike (zero for futures).
    #[inline]
    pub fn strike(&self) -> f64 {
        self.strike
    }

    /// Signed quantity.
    #[inline]
    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    /// Contract size.
    #[inline]
    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Position weight `quantity * multiplier`.
    #[inline]
    pub fn weight(&self) -> f64 {
        self.quantity * self.multiplier
    }

    /// Long or short.
    pub fn side(&self) -> Side {
        if self.quantity < 0.0 {
            Side::Short
        } else {
            Side::Long
        }
    }

    /// Optional display label.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Optional per-unit entry price.
    pub fn entry_price(&self) -> Option<f64> {
        self.entry_price
    }

    /// Label if set, otherwise a generated description such as `call 105`.
    pub fn display_name(&self) -> String {
        match (&self.label, self.kind) {
            (Some(label), _) => label.clone(),
            (None, InstrumentKind::Future) => "future".to_string(),
            (None, kind) => format!("{} {}", kind, self.strike),
        }
    }
}
