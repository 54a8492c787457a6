//! Valuation output.

use std::iter::Sum;
use std::ops::Add;

/// Price and first-order Greeks of one instrument.
///
/// Values are per unit of underlying until [`PricingResult::scaled`] applies
/// a position weight. Vega is per unit of volatility (not per point) and
/// theta is per year of calendar time.
///
/// # Examples
/// ```
/// use pricer_models::PricingResult;
///
/// let unit = PricingResult {
///     price: 2.0,
///     delta: 0.5,
///     ..PricingResult::zero()
/// };
/// let position = unit.scaled(-100.0);
/// assert_eq!(position.price, -200.0);
/// assert_eq!(position.delta, -50.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PricingResult {
    /// Present value
    pub price: f64,
    /// ∂V/∂S
    pub delta: f64,
    /// ∂²V/∂S²
    pub gamma: f64,
    /// ∂V/∂σ
    pub vega: f64,
    /// ∂V/∂t (calendar, per year)
    pub theta: f64,
    /// ∂V/∂r
    pub rho: f64,
}

impl PricingResult {
    /// All fields zero.
    pub const fn zero() -> Self {
        Self {
            price: 0.0,
            delta: 0.0,
            gamma: 0.0,
            vega: 0.0,
            theta: 0.0,
            rho: 0.0,
        }
    }

    /// Multiplies every field by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            price: self.price * factor,
            delta: self.delta * factor,
            gamma: self.gamma * factor,
            vega: self.vega * factor,
            theta: self.theta * factor,
            rho: self.rho * factor,
        }
    }

    /// Whether every field is finite.
    pub fn is_finite(&self) -> bool {
        self.price.is_finite()
            && self.delta.is_finite()
            && self.gamma.is_finite()
            && self.vega.is_finite()
            && self.theta.is_finite()
            && self.rho.is_finite()
    }
}

impl Add for PricingResult {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            price: self.price + rhs.price,
            delta: self.delta + rhs.delta,
            gamma: self.gamma + rhs.gamma,
            vega: self.vega + rhs.vega,
            theta: self.theta + rhs.theta,
            rho: self.rho + rhs.rho,
        }
    }
}

impl Sum for PricingResult {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), Add::add)
    }
}

impl<'a> Sum<&'a PricingResult> for PricingResult {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}
