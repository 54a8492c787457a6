//! Bracketing interval and solver outcome types.

use num_traits::Float;

/// Interval `[lower, upper]` known to contain a root of an increasing function.
///
/// Every evaluation of the function narrows the interval: a negative value
/// moves the lower end up, anything else moves the upper end down. A
/// derivative-based solver that shares the bracket with a bisection fallback
/// therefore hands over everything it has learned.
///
/// # Example
///
/// ```
/// use pricer_core::math::solvers::Bracket;
///
/// let mut bracket = Bracket::new(0.0, 5.0);
/// bracket.narrow(1.0, -0.3);
/// bracket.narrow(2.0, 0.4);
/// assert_eq!((bracket.lower(), bracket.upper()), (1.0, 2.0));
/// assert_eq!(bracket.midpoint(), 1.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket<T: Float> {
    lower: T,
    upper: T,
}

impl<T: Float> Bracket<T> {
    /// Creates a bracket, swapping the ends if given in reverse order.
    pub fn new(a: T, b: T) -> Self {
        if a <= b {
            Self { lower: a, upper: b }
        } else {
            Self { lower: b, upper: a }
        }
    }

    /// Lower end.
    #[inline]
    pub fn lower(&self) -> T {
        self.lower
    }

    /// Upper end.
    #[inline]
    pub fn upper(&self) -> T {
        self.upper
    }

    /// Midpoint of the interval.
    #[inline]
    pub fn midpoint(&self) -> T {
        self.lower + (self.upper - self.lower) / (T::one() + T::one())
    }

    /// Width of the interval.
    #[inline]
    pub fn width(&self) -> T {
        self.upper - self.lower
    }

    /// Whether `x` lies inside the closed interval.
    #[inline]
    pub fn contains(&self, x: T) -> bool {
        x >= self.lower && x <= self.upper
    }

    /// Clamps `x` into the interval.
    pub fn clamp(&self, x: T) -> T {
        x.max(self.lower).min(self.upper)
    }

    /// Shrinks the interval using `f(x)` of an increasing function.
    ///
    /// Points outside the interval are ignored.
    pub fn narrow(&mut self, x: T, fx: T) {
        if !self.contains(x) {
            return;
        }
        if fx < T::zero() {
            self.lower = x;
        } else {
            self.upper = x;
        }
    }
}

/// A converged root with its diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootResult<T: Float> {
    /// Root estimate
    pub root: T,
    /// Iterations spent
    pub iterations: usize,
    /// `f` at the last evaluated point
    pub residual: T,
}
