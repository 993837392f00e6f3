//! Asymptotic Single Risk Factor capital formula.
//!
//! ```text
//! R  = correlation(PD)
//! b  = (0.11852 − 0.05478 · ln PD)²
//! MA = (1 + (M − 2.5) · b) / (1 − 1.5 · b)
//! K  = [LGD · Φ(Φ⁻¹(PD)/√(1−R) + √(R/(1−R)) · Φ⁻¹(0.999)) − PD · LGD] · MA
//! ```

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::CapitalError;
use crate::math;
use crate::parameters::{CorrelationRule, SmeAdjustment};
use crate::types::{Money, Rate, Years};
use crate::CapitalResult;

/// Supervisory confidence level of the unexpected-loss quantile.
pub const CONFIDENCE_LEVEL: Decimal = dec!(0.999);

/// Reciprocal of the 8% minimum ratio; turns K into a risk weight.
pub const RISK_WEIGHT_MULTIPLIER: Decimal = dec!(12.5);

const SLOPE_INTERCEPT: Decimal = dec!(0.11852);
const SLOPE_COEFFICIENT: Decimal = dec!(0.05478);
const MATURITY_PIVOT: Years = dec!(2.5);

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Adjustments to the base correlation that depend on the borrower.
#[derive(Debug, Clone, Copy, Default)]
pub struct CorrelationAdjustments<'a> {
    /// Firm-size adjustment together with the borrower's annual revenue
    pub sme: Option<(&'a SmeAdjustment, Money)>,
    /// Large financial institution multiplier
    pub multiplier: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationTerms {
    pub base: Rate,
    pub sme_reduction: Rate,
    pub multiplier: Decimal,
    pub used: Rate,
}

/// Asset correlation R for a (floored) PD.
pub fn asset_correlation(
    pd: Rate,
    rule: &CorrelationRule,
    adjustments: CorrelationAdjustments<'_>,
) -> CorrelationTerms {
    let base = match rule {
        CorrelationRule::Fixed { value } => *value,
        CorrelationRule::PdWeighted {
            lower,
            upper,
            decay,
        } => {
            let weight =
                (Decimal::ONE - math::exp(-*decay * pd)) / (Decimal::ONE - math::exp(-*decay));
            *lower * weight + *upper * (Decimal::ONE - weight)
        }
    };

    let sme_reduction = adjustments
        .sme
        .map_or(Decimal::ZERO, |(sme, revenue)| sme_reduction(sme, revenue));
    let multiplier = adjustments.multiplier.unwrap_or(Decimal::ONE);

    CorrelationTerms {
        base,
        sme_reduction,
        multiplier,
        used: (base - sme_reduction) * multiplier,
    }
}

/// `max_reduction · (1 − (S − lower)/(upper − lower))`, S clamped to
/// `[lower, upper]`; zero at or above `upper`.
fn sme_reduction(sme: &SmeAdjustment, revenue: Money) -> Rate {
    if revenue >= sme.upper_revenue {
        return Decimal::ZERO;
    }
    let span = sme.upper_revenue - sme.lower_revenue;
    let s = revenue.clamp(sme.lower_revenue, sme.upper_revenue);
    sme.max_reduction * (Decimal::ONE - (s - sme.lower_revenue) / span)
}

// ---------------------------------------------------------------------------
// Maturity
// ---------------------------------------------------------------------------

/// Maturity slope b(PD).
pub fn maturity_slope(pd: Rate) -> CapitalResult<Decimal> {
    let ln_pd = math::ln(pd)
        .ok_or_else(|| CapitalError::invalid_input("pd", "ln(PD) is undefined for PD <= 0."))?;
    let inner = SLOPE_INTERCEPT - SLOPE_COEFFICIENT * ln_pd;
    Ok(inner * inner)
}

/// Maturity adjustment MA(M, b) for an already clamped maturity.
///
/// For PD below roughly 2.9e-6 the denominator turns negative and so does
/// MA; the resulting negative K is clamped to zero downstream.
pub fn maturity_adjustment(maturity: Years, slope: Decimal) -> CapitalResult<Decimal> {
    let denominator = Decimal::ONE - dec!(1.5) * slope;
    if denominator.is_zero() {
        return Err(CapitalError::invalid_input(
            "pd",
            "Maturity adjustment is undefined where 1 − 1.5·b(PD) = 0.",
        ));
    }
    Ok((Decimal::ONE + (maturity - MATURITY_PIVOT) * slope) / denominator)
}

// ---------------------------------------------------------------------------
// Capital requirement
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapitalFactor {
    pub unclamped: Decimal,
    /// K, never negative
    pub k: Decimal,
    pub clamped: bool,
}

/// Capital requirement K per unit of EAD.
pub fn capital_requirement_k(
    pd: Rate,
    lgd: Rate,
    correlation: Rate,
    maturity_adjustment: Decimal,
) -> CapitalResult<CapitalFactor> {
    if correlation <= Decimal::ZERO || correlation >= Decimal::ONE {
        return Err(CapitalError::invalid_input(
            "correlation",
            format!("Asset correlation must be in (0, 1), got {}.", correlation),
        ));
    }
    let g_pd = math::norm_inv(pd).ok_or_else(|| {
        CapitalError::invalid_input("pd", "Inverse normal of PD requires PD in (0, 1).")
    })?;
    let g_conf = math::norm_inv(CONFIDENCE_LEVEL).ok_or_else(|| {
        CapitalError::invalid_input("confidence_level", "Inverse normal is undefined.")
    })?;

    let one_minus_r = Decimal::ONE - correlation;
    let undefined = || CapitalError::invalid_input("correlation", "Square root is undefined.");
    let pd_scale = math::sqrt(Decimal::ONE / one_minus_r).ok_or_else(undefined)?;
    let factor_scale = math::sqrt(correlation / one_minus_r).ok_or_else(undefined)?;

    let conditional_pd = math::norm_cdf(g_pd * pd_scale + factor_scale * g_conf);
    let unclamped = (lgd * conditional_pd - pd * lgd) * maturity_adjustment;
    let clamped = unclamped < Decimal::ZERO;

    Ok(CapitalFactor {
        unclamped,
        k: unclamped.max(Decimal::ZERO),
        clamped,
    })
}
