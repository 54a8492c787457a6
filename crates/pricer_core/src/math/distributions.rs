//! Standard normal distribution functions.
//!
//! This module provides:
//! - `norm_cdf`: Cumulative distribution function (CDF)
//! - `norm_pdf`: Probability density function (PDF)
//! - `norm_inv`: Quantile function (inverse CDF)
//!
//! All functions are generic over `T: Float`.

use num_traits::Float;

/// 1 / sqrt(2 * pi)
const FRAC_1_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

/// sqrt(2 * pi)
const SQRT_2PI: f64 = 2.506_628_274_631_000_7;

/// Beyond this the tail probability underflows double precision.
const TAIL_CUTOFF: f64 = 37.0;

/// Switch point between the rational approximation and the continued fraction.
const RATIONAL_LIMIT: f64 = 7.071_067_811_865_47;

/// Standard normal cumulative distribution function.
///
/// Computes P(X <= x) where X ~ N(0, 1) using Hart's double-precision
/// algorithm (rational approximation in the body, continued fraction in
/// the tails).
///
/// # Accuracy
/// Absolute error below 1e-14 over the real line, which keeps put-call
/// parity and implied-volatility round trips well inside 1e-8.
///
/// # Examples
/// ```
/// use pricer_core::math::distributions::norm_cdf;
///
/// let cdf_0 = norm_cdf(0.0_f64);
/// assert!((cdf_0 - 0.5).abs() < 1e-14);
///
/// let cdf_neg = norm_cdf(-3.0_f64);
/// assert!(cdf_neg < 0.01);
/// ```
pub fn norm_cdf<T: Float>(x: T) -> T {
    let c = |v: f64| T::from(v).unwrap_or_else(T::zero);
    let abs_x = x.abs();

    // Lower-tail probability of -|x|
    let tail = if abs_x > c(TAIL_CUTOFF) {
        T::zero()
    } else {
        let e = (-abs_x * abs_x / c(2.0)).exp();
        if abs_x < c(RATIONAL_LIMIT) {
            let mut num = c(3.526_249_659_989_11e-2) * abs_x + c(0.700_383_064_443_688);
            num = num * abs_x + c(6.373_962_203_531_65);
            num = num * abs_x + c(33.912_866_078_383);
            num = num * abs_x + c(112.079_291_497_871);
            num = num * abs_x + c(221.213_596_169_931);
            num = num * abs_x + c(220.206_867_912_376);

            let mut den = c(8.838_834_764_831_84e-2) * abs_x + c(1.755_667_163_182_64);
            den = den * abs_x + c(16.064_177_579_207);
            den = den * abs_x + c(86.780_732_202_946_1);
            den = den * abs_x + c(296.564_248_779_674);
            den = den * abs_x + c(637.333_633_378_831);
            den = den * abs_x + c(793.826_512_519_948);
            den = den * abs_x + c(440.413_735_824_752);

            e * num / den
        } else {
            let mut b = abs_x + c(0.65);
            b = abs_x + c(4.0) / b;
            b = abs_x + c(3.0) / b;
            b = abs_x + c(2.0) / b;
            b = abs_x + T::one() / b;
            e / b / c(SQRT_2PI)
        }
    };

    if x > T::zero() {
        T::one() - tail
    } else {
        tail
    }
}

/// Standard normal probability density function.
///
/// Computes the density φ(x) = (1 / sqrt(2π)) * exp(-x² / 2).
///
/// # Examples
/// ```
/// use pricer_core::math::distributions::norm_pdf;
///
/// let pdf_0 = norm_pdf(0.0_f64);
/// assert!((pdf_0 - 0.3989422804).abs() < 1e-7);
/// ```
#[inline]
pub fn norm_pdf<T: Float>(x: T) -> T {
    let frac_1_sqrt_2pi = T::from(FRAC_1_SQRT_2PI).unwrap_or_else(T::zero);
    let half = T::from(0.5).unwrap_or_else(T::zero);
    frac_1_sqrt_2pi * (-half * x * x).exp()
}

/// Standard normal quantile function.
///
/// Acklam's rational approximation followed by one Halley refinement
/// step against [`norm_cdf`]. Returns ±infinity at 0 and 1 and NaN
/// outside `[0, 1]`.
///
/// # Examples
/// ```
/// use pricer_core::math::distributions::norm_inv;
///
/// assert!((norm_inv(0.95_f64) - 1.6448536269514722).abs() < 1e-9);
/// ```
pub fn norm_inv(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969_683_028_665_376e1,
        2.209_460_984_245_205e2,
        -2.759_285_104_469_687e2,
        1.383_577_518_672_69e2,
        -3.066_479_806_614_716e1,
        2.506_628_277_459_239,
    ];
    const B: [f64; 5] = [
        -5.447_609_879_822_406e1,
        1.615_858_368_580_409e2,
        -1.556_989_798_598_866e2,
        6.680_131_188_771_972e1,
        -1.328_068_155_288_572e1,
    ];
    const C: [f64; 6] = [
        -7.784_894_002_430_293e-3,
        -3.223_964_580_411_365e-1,
        -2.400_758_277_161_838,
        -2.549_732_539_343_734,
        4.374_664_141_464_968,
        2.938_163_982_698_783,
    ];
    const D: [f64; 4] = [
        7.784_695_709_041_462e-3,
        3.224_671_290_700_398e-1,
        2.445_134_137_142_996,
        3.754_408_661_907_416,
    ];
    const P_LOW: f64 = 0.02425;

    if p.is_nan() || !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    if p == 0.0 {
        return f64::NEG_INFINITY;
    }
    if p == 1.0 {
        return f64::INFINITY;
    }

    let x = if p < P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -(((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    };

    // Halley step
    let e = norm_cdf(x) - p;
    let u = e * SQRT_2PI * (x * x / 2.0).exp();
    x - u / (1.0 + x * u / 2.0)
}
