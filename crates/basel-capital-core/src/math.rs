//! Decimal transcendental helpers used by the IRB formula.
//!
//! Everything here is pure `rust_decimal::Decimal` arithmetic: series
//! expansions with range reduction, Newton iterations, and a Halley-refined
//! inverse normal. No `f64` is involved, so results are reproducible to the
//! last digit on every platform.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const LN_2: Decimal = dec!(0.6931471805599453094172321215);
const SQRT_2PI: Decimal = dec!(2.5066282746310005024157652848);
const INV_SQRT_2PI: Decimal = dec!(0.3989422804014326779399460599);

/// Below this magnitude a series term no longer moves a 28-digit sum.
const SERIES_EPSILON: Decimal = dec!(0.0000000000000000000000000001);

/// |x| above which the CDF series hands over to the tail continued fraction.
const TAIL_SWITCH: Decimal = dec!(5);

/// |x| above which the CDF is 0 or 1 at Decimal precision.
const CDF_CUTOFF: Decimal = dec!(12);

// ---------------------------------------------------------------------------
// Elementary functions
// ---------------------------------------------------------------------------

/// Exponential via range reduction `x = n·ln2 + r` and a Taylor series on `r`.
pub fn exp(x: Decimal) -> Decimal {
    let n_raw = x / LN_2;
    let n = if n_raw >= Decimal::ZERO {
        n_raw.floor()
    } else {
        n_raw.ceil() - Decimal::ONE
    };
    let r = x - n * LN_2;

    let mut term = Decimal::ONE;
    let mut sum = Decimal::ONE;
    for i in 1u32..48 {
        term = term * r / Decimal::from(i);
        if term.abs() < SERIES_EPSILON {
            break;
        }
        sum += term;
    }

    // 2^n itself leaves Decimal range for |n| > 96.
    let shift = n.to_i64().unwrap_or(0);
    for _ in 0..shift.unsigned_abs() {
        if shift >= 0 {
            match sum.checked_mul(dec!(2)) {
                Some(v) => sum = v,
                None => return Decimal::MAX,
            }
        } else {
            sum /= dec!(2);
            if sum.is_zero() {
                break;
            }
        }
    }
    sum
}

/// Natural log for strictly positive values; `None` otherwise.
///
/// Reduces into [0.5, 2] by powers of two, then sums the atanh series
/// `ln(v) = 2·Σ z^(2k+1)/(2k+1)` with `z = (v-1)/(v+1)`.
pub fn ln(x: Decimal) -> Option<Decimal> {
    if x <= Decimal::ZERO {
        return None;
    }
    let mut val = x;
    let mut adjust = Decimal::ZERO;
    while val > dec!(2) {
        val /= dec!(2);
        adjust += LN_2;
    }
    while val < dec!(0.5) {
        val *= dec!(2);
        adjust -= LN_2;
    }
    let z = (val - Decimal::ONE) / (val + Decimal::ONE);
    let z2 = z * z;
    let mut term = z;
    let mut sum = z;
    for k in 1u32..60 {
        term *= z2;
        let step = term / Decimal::from(2 * k + 1);
        if step.abs() < SERIES_EPSILON {
            break;
        }
        sum += step;
    }
    Some(dec!(2) * sum + adjust)
}

/// Square root via Newton's method; `None` for negative input.
pub fn sqrt(x: Decimal) -> Option<Decimal> {
    if x < Decimal::ZERO {
        return None;
    }
    if x.is_zero() {
        return Some(Decimal::ZERO);
    }
    let mut guess = if x > Decimal::ONE { x / dec!(2) } else { Decimal::ONE };
    for _ in 0..100 {
        let next = (guess + x / guess) / dec!(2);
        if (next - guess).abs() < SERIES_EPSILON {
            return Some(next);
        }
        guess = next;
    }
    Some(guess)
}

// ---------------------------------------------------------------------------
// Standard normal distribution
// ---------------------------------------------------------------------------

/// Standard normal density φ(x).
pub fn norm_pdf(x: Decimal) -> Decimal {
    exp(-(x * x) / dec!(2)) * INV_SQRT_2PI
}

/// Standard normal cumulative distribution Φ(x).
///
/// Central region: Marsaglia's series `Φ(x) = ½ + φ(x)·Σ x^(2n+1)/(2n+1)!!`.
/// Tails (|x| > 5): Laplace continued fraction for the Mills ratio.
pub fn norm_cdf(x: Decimal) -> Decimal {
    if x <= -CDF_CUTOFF {
        return Decimal::ZERO;
    }
    if x >= CDF_CUTOFF {
        return Decimal::ONE;
    }

    if x.abs() > TAIL_SWITCH {
        let tail = upper_tail(x.abs());
        return if x < Decimal::ZERO {
            tail
        } else {
            Decimal::ONE - tail
        };
    }

    let x2 = x * x;
    let mut term = x;
    let mut sum = x;
    for n in 1u32..600 {
        term = term * x2 / Decimal::from(2 * n + 1);
        if term.abs() < SERIES_EPSILON {
            break;
        }
        sum += term;
    }
    let cdf = dec!(0.5) + norm_pdf(x) * sum;
    cdf.max(Decimal::ZERO).min(Decimal::ONE)
}

/// 1 − Φ(x) for x > 0 via the continued fraction
/// `φ(x) / (x + 1/(x + 2/(x + 3/(x + …))))`, evaluated bottom-up.
fn upper_tail(x: Decimal) -> Decimal {
    let mut frac = x;
    for k in (1u32..=80).rev() {
        frac = x + Decimal::from(k) / frac;
    }
    norm_pdf(x) / frac
}

/// Inverse standard normal Φ⁻¹(p) for p ∈ (0, 1); `None` outside.
///
/// Acklam's rational approximation seeds three Halley steps against
/// [`norm_cdf`], which takes the ~1e-9 seed to full Decimal precision.
pub fn norm_inv(p: Decimal) -> Option<Decimal> {
    if p <= Decimal::ZERO || p >= Decimal::ONE {
        return None;
    }

    let mut x = acklam_seed(p)?;
    for _ in 0..3 {
        let e = norm_cdf(x) - p;
        let u = e * SQRT_2PI * exp(x * x / dec!(2));
        let step = u / (Decimal::ONE + x * u / dec!(2));
        x -= step;
        if step.abs() < SERIES_EPSILON {
            break;
        }
    }
    Some(x)
}

fn acklam_seed(p: Decimal) -> Option<Decimal> {
    let a = [
        dec!(-39.69683028665376),
        dec!(220.9460984245205),
        dec!(-275.9285104469687),
        dec!(138.3577518672690),
        dec!(-30.66479806614716),
        dec!(2.506628277459239),
    ];
    let b = [
        dec!(-54.47609879822406),
        dec!(161.5858368580409),
        dec!(-155.6989798598866),
        dec!(66.80131188771972),
        dec!(-13.28068155288572),
    ];
    let c = [
        dec!(-0.007784894002430293),
        dec!(-0.3223964580411365),
        dec!(-2.400758277161838),
        dec!(-2.549671039984934),
        dec!(4.374664141464968),
        dec!(2.938163982698783),
    ];
    let d = [
        dec!(0.007784695709041462),
        dec!(0.3224671290700398),
        dec!(2.445134137142996),
        dec!(3.754408661907416),
    ];
    let p_low = dec!(0.02425);
    let p_high = Decimal::ONE - p_low;

    let tail = |q: Decimal| {
        (((((c[0] * q + c[1]) * q + c[2]) * q + c[3]) * q + c[4]) * q + c[5])
            / ((((d[0] * q + d[1]) * q + d[2]) * q + d[3]) * q + Decimal::ONE)
    };

    if p < p_low {
        let q = sqrt(dec!(-2) * ln(p)?)?;
        Some(tail(q))
    } else if p <= p_high {
        let q = p - dec!(0.5);
        let r = q * q;
        Some(
            (((((a[0] * r + a[1]) * r + a[2]) * r + a[3]) * r + a[4]) * r + a[5]) * q
                / (((((b[0] * r + b[1]) * r + b[2]) * r + b[3]) * r + b[4]) * r + Decimal::ONE),
        )
    } else {
        let q = sqrt(dec!(-2) * ln(Decimal::ONE - p)?)?;
        Some(-tail(q))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
