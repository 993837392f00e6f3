//! IRB engine: risk-parameter preparation followed by the ASRF formula.
//!
//! The order of operations is fixed: PD floor, LGD, maturity clamp,
//! correlation, maturity adjustment (on the floored PD), K, RWA. Every step
//! is written to the audit trail as it happens.

pub mod asrf;
pub mod risk_parameters;

pub use asrf::{
    asset_correlation, capital_requirement_k, maturity_adjustment, maturity_slope, CapitalFactor,
    CorrelationAdjustments, CorrelationTerms,
};
pub use risk_parameters::{
    apply_pd_floor, clamp_maturity, resolve_lgd, LgdDecision, MaturityDecision, PdDecision,
};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::audit::{AppliedOverride, AuditEvent, AuditTrailBuilder, LgdSource, OverrideKind};
use crate::classifier::CalculationPath;
use crate::exposure::{CollateralType, Exposure, ExposureClass};
use crate::parameters::ParameterSet;
use crate::types::{Money, Rate, Years};
use crate::CapitalResult;

/// Which LGD regime the IRB pipeline runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IrbVariant {
    /// Supervisory LGD
    Foundation,
    /// Bank-estimated LGD, floored
    Advanced,
}

impl IrbVariant {
    pub fn from_path(path: &CalculationPath) -> Option<Self> {
        match path {
            CalculationPath::FoundationIrb => Some(IrbVariant::Foundation),
            CalculationPath::AdvancedIrb => Some(IrbVariant::Advanced),
            CalculationPath::Standardized | CalculationPath::Unsupported { .. } => None,
        }
    }
}

/// Every intermediate of one IRB calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrbOutcome {
    pub variant: IrbVariant,
    pub pd_raw: Rate,
    pub pd_used: Rate,
    pub lgd_used: Rate,
    pub lgd_source: LgdSource,
    pub maturity_used: Years,
    pub correlation: Rate,
    pub maturity_slope: Decimal,
    pub maturity_adjustment: Decimal,
    pub capital_k: Decimal,
    pub risk_weight: Rate,
    pub scaling_factor: Decimal,
    pub rwa: Money,
    /// PD × LGD × EAD
    pub expected_loss: Money,
}

/// Run the IRB pipeline for one exposure against a resolved parameter set.
pub fn compute_irb(
    exposure: &Exposure,
    variant: IrbVariant,
    params: &ParameterSet,
    audit: &mut AuditTrailBuilder,
    overrides: &mut Vec<AppliedOverride>,
) -> CapitalResult<IrbOutcome> {
    let class = params.class_parameters(exposure.exposure_class)?;
    let ead = exposure.ead();

    // PD floor
    let pd = apply_pd_floor(exposure.pd, class.pd_floor)?;
    tracing::debug!(raw = %pd.raw, used = %pd.used, bound = pd.bound, "PD floor");
    audit.record(AuditEvent::PdFloor {
        raw: pd.raw,
        floor: pd.floor,
        used: pd.used,
        bound: pd.bound,
    });
    if pd.bound {
        overrides.push(AppliedOverride {
            kind: OverrideKind::PdFloor,
            original: Some(pd.raw),
            applied: pd.used,
            reason: format!("{} PD floor", class.key),
        });
    }

    // LGD
    let lgd = resolve_lgd(variant, exposure, &class)?;
    tracing::debug!(source = ?lgd.source, used = %lgd.used, bound = lgd.bound, "LGD");
    audit.record(AuditEvent::Lgd {
        source: lgd.source,
        input: lgd.input,
        floor: lgd.floor,
        used: lgd.used,
        bound: lgd.bound,
    });
    match variant {
        IrbVariant::Advanced if lgd.bound => overrides.push(AppliedOverride {
            kind: OverrideKind::LgdFloor,
            original: lgd.input,
            applied: lgd.used,
            reason: format!(
                "{} LGD floor for {:?} collateral",
                class.key,
                exposure.collateral_type.unwrap_or(CollateralType::Unsecured)
            ),
        }),
        IrbVariant::Foundation if lgd.input.is_some_and(|i| i != lgd.used) => {
            overrides.push(AppliedOverride {
                kind: OverrideKind::SupervisoryLgd,
                original: lgd.input,
                applied: lgd.used,
                reason: "F-IRB replaces the bank LGD estimate with the supervisory value".into(),
            })
        }
        IrbVariant::Advanced | IrbVariant::Foundation => {}
    }

    // Maturity
    let maturity = clamp_maturity(exposure.maturity_years);
    audit.record(AuditEvent::Maturity {
        raw: maturity.raw,
        used: maturity.used,
        clamped: maturity.clamped,
    });
    if maturity.clamped {
        overrides.push(AppliedOverride {
            kind: OverrideKind::MaturityClamp,
            original: Some(maturity.raw),
            applied: maturity.used,
            reason: "effective maturity clamped to [1, 5] years".into(),
        });
    }

    // Correlation
    let correlation = asset_correlation(
        pd.used,
        &class.correlation,
        correlation_adjustments(exposure, params),
    );
    tracing::debug!(r = %correlation.used, "asset correlation");
    audit.record(AuditEvent::Correlation {
        base: correlation.base,
        sme_reduction: correlation.sme_reduction,
        multiplier: correlation.multiplier,
        used: correlation.used,
    });

    // Maturity adjustment on the floored PD
    let slope = maturity_slope(pd.used)?;
    let adjustment = maturity_adjustment(maturity.used, slope)?;
    audit.record(AuditEvent::MaturityAdjustment { slope, adjustment });

    // K
    let factor = capital_requirement_k(pd.used, lgd.used, correlation.used, adjustment)?;
    audit.record(AuditEvent::CapitalFactor {
        unclamped: factor.unclamped,
        k: factor.k,
        clamped: factor.clamped,
    });
    if factor.clamped {
        overrides.push(AppliedOverride {
            kind: OverrideKind::CapitalFactorClamp,
            original: Some(factor.unclamped),
            applied: factor.k,
            reason: "negative capital requirement clamped to zero".into(),
        });
    }

    // RWA
    let risk_weight = factor.k * asrf::RISK_WEIGHT_MULTIPLIER;
    let rwa = exposure.weighted_ead(&[risk_weight, params.rwa_scaling_factor])?;
    tracing::debug!(k = %factor.k, %risk_weight, %rwa, "IRB RWA");
    audit.record(AuditEvent::IrbRwa {
        risk_weight,
        scaling_factor: params.rwa_scaling_factor,
        rwa,
    });

    Ok(IrbOutcome {
        variant,
        pd_raw: pd.raw,
        pd_used: pd.used,
        lgd_used: lgd.used,
        lgd_source: lgd.source,
        maturity_used: maturity.used,
        correlation: correlation.used,
        maturity_slope: slope,
        maturity_adjustment: adjustment,
        capital_k: factor.k,
        risk_weight,
        scaling_factor: params.rwa_scaling_factor,
        rwa,
        expected_loss: pd.used * lgd.used * ead,
    })
}

/// SME adjustment applies to corporates with a reported revenue; the large
/// FI multiplier to flagged banks and corporates.
fn correlation_adjustments<'a>(
    exposure: &Exposure,
    params: &'a ParameterSet,
) -> CorrelationAdjustments<'a> {
    let sme = match (
        exposure.exposure_class,
        params.sme_adjustment.as_ref(),
        exposure.annual_revenue,
    ) {
        (ExposureClass::Corporate, Some(sme), Some(revenue)) => Some((sme, revenue)),
        _ => None,
    };
    let multiplier = match exposure.exposure_class {
        ExposureClass::Bank | ExposureClass::Corporate if exposure.large_financial_institution => {
            params.large_fi_multiplier
        }
        _ => None,
    };
    CorrelationAdjustments { sme, multiplier }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exposure::Approach;
    use crate::parameters::builtin;
    use rust_decimal_macros::dec;

    fn exposure(class: ExposureClass, pd: Decimal) -> Exposure {
        let mut exp = Exposure::new(class, Approach::FoundationIrb, dec!(1_000_000), dec!(2.5));
        exp.pd = Some(pd);
        exp
    }

    fn run(
        exp: &Exposure,
        variant: IrbVariant,
        params: &ParameterSet,
    ) -> (IrbOutcome, Vec<AppliedOverride>) {
        let mut audit = AuditTrailBuilder::new();
        let mut overrides = Vec::new();
        let outcome = compute_irb(exp, variant, params, &mut audit, &mut overrides).unwrap();
        (outcome, overrides)
    }

    fn assert_close(actual: Decimal, expected: Decimal, tol: Decimal, label: &str) {
        let diff = (actual - expected).abs();
        assert!(
            diff <= tol,
            "{}: expected ~{}, got {} (diff {})",
            label,
            expected,
            actual,
            diff
        );
    }

    #[test]
    fn test_basel2_firb_corporate_reference() {
        let exp = exposure(ExposureClass::Corporate, dec!(0.01));
        let (out, overrides) = run(&exp, IrbVariant::Foundation, &builtin::bcbs_basel2());
        assert_eq!(out.lgd_used, dec!(0.45));
        assert_close(out.capital_k, dec!(0.073853441), dec!(0.000001), "K");
        // 0.92316801 × 1,000,000 × 1.06
        assert_close(out.rwa, dec!(978558.09), dec!(2), "RWA");
        assert_eq!(out.expected_loss, dec!(4500));
        assert!(overrides.is_empty());
    }

    #[test]
    fn test_basel3_firb_uses_forty_percent_corporate_lgd() {
        let exp = exposure(ExposureClass::Corporate, dec!(0.01));
        let (out, _) = run(&exp, IrbVariant::Foundation, &builtin::bcbs_basel3_final());
        assert_eq!(out.lgd_used, dec!(0.40));
        assert_eq!(out.scaling_factor, Decimal::ONE);
        assert_close(out.rwa, dec!(820593.79), dec!(2), "RWA");
    }

    #[test]
    fn test_pd_floor_binds_and_is_recorded() {
        let exp = exposure(ExposureClass::Corporate, dec!(0.0001));
        let (out, overrides) = run(&exp, IrbVariant::Foundation, &builtin::bcbs_basel3_final());
        assert_eq!(out.pd_used, dec!(0.0005));
        assert_eq!(out.pd_raw, dec!(0.0001));
        // Slope uses the floored PD
        assert_eq!(out.maturity_slope, maturity_slope(dec!(0.0005)).unwrap());
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides[0].kind, OverrideKind::PdFloor);
    }

    #[test]
    fn test_sovereign_pd_never_floored() {
        let exp = exposure(ExposureClass::Sovereign, dec!(0.0001));
        for params in builtin::all() {
            let (out, overrides) = run(&exp, IrbVariant::Foundation, &params);
            assert_eq!(out.pd_used, out.pd_raw, "{}", params.key());
            assert!(overrides.is_empty());
        }
    }

    #[test]
    fn test_airb_lgd_floor_override() {
        let mut exp = exposure(ExposureClass::Corporate, dec!(0.01));
        exp.requested_approach = Approach::AdvancedIrb;
        exp.lgd = Some(dec!(0.05));
        exp.collateral_type = Some(CollateralType::Financial);
        let (out, overrides) = run(&exp, IrbVariant::Advanced, &builtin::eu_crr3_2025());
        // Financial collateral floor is zero, so the estimate stands
        assert_eq!(out.lgd_used, dec!(0.05));
        assert!(overrides.is_empty());

        exp.collateral_type = None;
        let (out, overrides) = run(&exp, IrbVariant::Advanced, &builtin::eu_crr3_2025());
        assert_eq!(out.lgd_used, dec!(0.25));
        assert_eq!(overrides[0].kind, OverrideKind::LgdFloor);
        assert_eq!(overrides[0].original, Some(dec!(0.05)));
    }

    #[test]
    fn test_firb_supervisory_override_when_estimate_supplied() {
        let mut exp = exposure(ExposureClass::Bank, dec!(0.01));
        exp.lgd = Some(dec!(0.20));
        let (out, overrides) = run(&exp, IrbVariant::Foundation, &builtin::bcbs_basel3_final());
        assert_eq!(out.lgd_used, dec!(0.45));
        assert_eq!(overrides[0].kind, OverrideKind::SupervisoryLgd);
    }

    #[test]
    fn test_large_fi_multiplier_raises_rwa() {
        let plain = exposure(ExposureClass::Bank, dec!(0.01));
        let mut large = plain.clone();
        large.large_financial_institution = true;
        let params = builtin::bcbs_basel3_final();
        let (a, _) = run(&plain, IrbVariant::Foundation, &params);
        let (b, _) = run(&large, IrbVariant::Foundation, &params);
        assert_close(b.correlation, dec!(0.24097960), dec!(0.000001), "R");
        assert_close(b.capital_k, dec!(0.094359512), dec!(0.000001), "K");
        assert!(b.rwa > a.rwa);
    }

    #[test]
    fn test_sme_adjustment_only_for_corporates() {
        let params = builtin::bcbs_basel3_final();
        let mut corp = exposure(ExposureClass::Corporate, dec!(0.01));
        corp.annual_revenue = Some(dec!(20_000_000));
        let (out, _) = run(&corp, IrbVariant::Foundation, &params);
        assert_close(out.correlation, dec!(0.16611701), dec!(0.000001), "SME R");

        let mut bank = exposure(ExposureClass::Bank, dec!(0.01));
        bank.annual_revenue = Some(dec!(20_000_000));
        let (out, _) = run(&bank, IrbVariant::Foundation, &params);
        assert_close(out.correlation, dec!(0.19278368), dec!(0.000001), "bank R");
    }

    #[test]
    fn test_maturity_clamp_recorded() {
        let mut exp = exposure(ExposureClass::Corporate, dec!(0.02));
        exp.maturity_years = dec!(0.5);
        let mut audit = AuditTrailBuilder::new();
        let mut overrides = Vec::new();
        let out = compute_irb(
            &exp,
            IrbVariant::Foundation,
            &builtin::bcbs_basel2(),
            &mut audit,
            &mut overrides,
        )
        .unwrap();
        assert_eq!(out.maturity_used, dec!(1));
        assert_close(out.maturity_adjustment, Decimal::ONE, dec!(0.0000000001), "MA");
        assert_eq!(overrides[0].kind, OverrideKind::MaturityClamp);
        let trail = audit.finish();
        assert!(trail.events().any(|e| matches!(
            e,
            AuditEvent::Maturity { clamped: true, .. }
        )));
    }

    #[test]
    fn test_audit_order_is_fixed() {
        let exp = exposure(ExposureClass::Corporate, dec!(0.01));
        let mut audit = AuditTrailBuilder::new();
        let mut overrides = Vec::new();
        compute_irb(
            &exp,
            IrbVariant::Foundation,
            &builtin::bcbs_basel3_final(),
            &mut audit,
            &mut overrides,
        )
        .unwrap();
        let names: Vec<&str> = audit
            .finish()
            .events()
            .map(|e| match e {
                AuditEvent::PdFloor { .. } => "pd",
                AuditEvent::Lgd { .. } => "lgd",
                AuditEvent::Maturity { .. } => "maturity",
                AuditEvent::Correlation { .. } => "r",
                AuditEvent::MaturityAdjustment { .. } => "ma",
                AuditEvent::CapitalFactor { .. } => "k",
                AuditEvent::IrbRwa { .. } => "rwa",
                _ => "other",
            })
            .collect();
        assert_eq!(names, vec!["pd", "lgd", "maturity", "r", "ma", "k", "rwa"]);
    }

    #[test]
    fn test_missing_pd_rejected() {
        let exp = Exposure::new(
            ExposureClass::Corporate,
            Approach::FoundationIrb,
            dec!(1_000_000),
            dec!(2.5),
        );
        let mut audit = AuditTrailBuilder::new();
        let mut overrides = Vec::new();
        assert!(compute_irb(
            &exp,
            IrbVariant::Foundation,
            &builtin::bcbs_basel3_final(),
            &mut audit,
            &mut overrides
        )
        .is_err());
    }
}
