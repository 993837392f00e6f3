use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::IrbVariant;
use crate::audit::LgdSource;
use crate::error::CapitalError;
use crate::exposure::{CollateralType, Exposure, Seniority};
use crate::parameters::ClassParameters;
use crate::types::{Rate, Years};
use crate::CapitalResult;

/// Effective maturity bounds of the IRB maturity adjustment.
pub const MIN_MATURITY: Years = dec!(1);
pub const MAX_MATURITY: Years = dec!(5);

// ---------------------------------------------------------------------------
// PD
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdDecision {
    pub raw: Rate,
    /// `None` when the class is never floored
    pub floor: Option<Rate>,
    pub used: Rate,
    /// Floor strictly above the raw PD
    pub bound: bool,
}

/// Floor the PD where the class carries a floor and check it is usable by
/// the ASRF formula, i.e. strictly inside (0, 1) after flooring.
pub fn apply_pd_floor(pd: Option<Rate>, floor: Option<Rate>) -> CapitalResult<PdDecision> {
    let raw = pd.ok_or_else(|| {
        CapitalError::invalid_input("pd", "Probability of default is required on IRB paths.")
    })?;
    if raw < Decimal::ZERO {
        return Err(CapitalError::invalid_input(
            "pd",
            "Probability of default cannot be negative.",
        ));
    }
    if raw >= Decimal::ONE {
        return Err(CapitalError::invalid_input(
            "pd",
            "PD of 100% denotes a defaulted exposure, which the ASRF formula does not cover.",
        ));
    }

    let used = match floor {
        Some(f) => raw.max(f),
        None => raw,
    };
    if used <= Decimal::ZERO {
        return Err(CapitalError::invalid_input(
            "pd",
            "PD must be strictly positive for exposure classes without a PD floor; \
             ln(PD) and the inverse normal are undefined at zero.",
        ));
    }

    Ok(PdDecision {
        raw,
        floor,
        used,
        bound: floor.is_some_and(|f| f > raw),
    })
}

// ---------------------------------------------------------------------------
// LGD
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LgdDecision {
    pub source: LgdSource,
    /// Bank estimate as supplied, if any
    pub input: Option<Rate>,
    pub floor: Option<Rate>,
    pub used: Rate,
    pub bound: bool,
}

/// LGD fed into the capital formula.
///
/// F-IRB always takes the supervisory value for the claim's seniority; a
/// bank estimate supplied alongside is recorded but not used. A-IRB requires
/// the bank estimate and floors it by collateral type when the set carries
/// LGD floors (unsecured when no collateral type is given).
pub fn resolve_lgd(
    variant: IrbVariant,
    exposure: &Exposure,
    params: &ClassParameters,
) -> CapitalResult<LgdDecision> {
    match variant {
        IrbVariant::Foundation => {
            let (source, used) = match exposure.seniority {
                Seniority::Senior => (LgdSource::SupervisorySenior, params.supervisory_lgd_senior),
                Seniority::Subordinated => (
                    LgdSource::SupervisorySubordinated,
                    params.supervisory_lgd_subordinated,
                ),
            };
            Ok(LgdDecision {
                source,
                input: exposure.lgd,
                floor: None,
                used,
                bound: false,
            })
        }
        IrbVariant::Advanced => {
            let estimate = exposure.lgd.ok_or_else(|| {
                CapitalError::invalid_input("lgd", "A bank-estimated LGD is required under A-IRB.")
            })?;
            let floor = match &params.lgd_floors {
                None => None,
                Some(table) => {
                    let collateral = exposure.collateral_type.unwrap_or(CollateralType::Unsecured);
                    let floor = table.get(&collateral).copied().ok_or_else(|| {
                        CapitalError::ParameterResolution {
                            jurisdiction: params.key.jurisdiction.to_string(),
                            version: params.key.version.clone(),
                            reason: format!("no LGD floor for collateral type {:?}", collateral),
                        }
                    })?;
                    Some(floor)
                }
            };
            let used = floor.map_or(estimate, |f| estimate.max(f));
            Ok(LgdDecision {
                source: LgdSource::BankEstimate,
                input: Some(estimate),
                floor,
                used,
                bound: floor.is_some_and(|f| f > estimate),
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Maturity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaturityDecision {
    pub raw: Years,
    pub used: Years,
    pub clamped: bool,
}

/// Clamp effective maturity to [1, 5] years.
pub fn clamp_maturity(maturity: Years) -> MaturityDecision {
    let used = maturity.clamp(MIN_MATURITY, MAX_MATURITY);
    MaturityDecision {
        raw: maturity,
        used,
        clamped: used != maturity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exposure::{Approach, ExposureClass};
    use crate::parameters::builtin;

    fn corporate(approach: Approach) -> Exposure {
        Exposure::new(ExposureClass::Corporate, approach, dec!(1_000_000), dec!(2.5))
    }

    fn class_params() -> ClassParameters {
        builtin::bcbs_basel3_final()
            .class_parameters(ExposureClass::Corporate)
            .unwrap()
    }

    // -- PD --

    #[test]
    fn test_pd_floor_binds_below_floor() {
        let d = apply_pd_floor(Some(dec!(0.0001)), Some(dec!(0.0005))).unwrap();
        assert_eq!(d.used, dec!(0.0005));
        assert!(d.bound);
    }

    #[test]
    fn test_pd_floor_not_bound_when_equal() {
        let d = apply_pd_floor(Some(dec!(0.0005)), Some(dec!(0.0005))).unwrap();
        assert_eq!(d.used, dec!(0.0005));
        assert!(!d.bound);
    }

    #[test]
    fn test_unfloored_pd_passes_through() {
        let d = apply_pd_floor(Some(dec!(0.0001)), None).unwrap();
        assert_eq!(d.used, d.raw);
        assert!(!d.bound);
    }

    #[test]
    fn test_zero_pd_without_floor_rejected() {
        match apply_pd_floor(Some(Decimal::ZERO), None).unwrap_err() {
            CapitalError::InvalidInput { field, .. } => assert_eq!(field, "pd"),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_pd_with_floor_is_floored() {
        let d = apply_pd_floor(Some(Decimal::ZERO), Some(dec!(0.0003))).unwrap();
        assert_eq!(d.used, dec!(0.0003));
        assert!(d.bound);
    }

    #[test]
    fn test_defaulted_and_missing_pd_rejected() {
        assert!(apply_pd_floor(Some(Decimal::ONE), Some(dec!(0.0005))).is_err());
        assert!(apply_pd_floor(None, Some(dec!(0.0005))).is_err());
    }

    // -- LGD --

    #[test]
    fn test_firb_uses_supervisory_lgd_and_ignores_estimate() {
        let mut exp = corporate(Approach::FoundationIrb);
        exp.lgd = Some(dec!(0.20));
        let d = resolve_lgd(IrbVariant::Foundation, &exp, &class_params()).unwrap();
        assert_eq!(d.source, LgdSource::SupervisorySenior);
        assert_eq!(d.used, dec!(0.40));
        assert_eq!(d.input, Some(dec!(0.20)));
    }

    #[test]
    fn test_firb_subordinated_lgd() {
        let mut exp = corporate(Approach::FoundationIrb);
        exp.seniority = Seniority::Subordinated;
        let d = resolve_lgd(IrbVariant::Foundation, &exp, &class_params()).unwrap();
        assert_eq!(d.source, LgdSource::SupervisorySubordinated);
        assert_eq!(d.used, dec!(0.75));
    }

    #[test]
    fn test_airb_lgd_floor_by_collateral() {
        let mut exp = corporate(Approach::AdvancedIrb);
        exp.lgd = Some(dec!(0.05));
        exp.collateral_type = Some(CollateralType::Receivables);
        let d = resolve_lgd(IrbVariant::Advanced, &exp, &class_params()).unwrap();
        assert_eq!(d.floor, Some(dec!(0.10)));
        assert_eq!(d.used, dec!(0.10));
        assert!(d.bound);
    }

    #[test]
    fn test_airb_defaults_to_unsecured_floor() {
        let mut exp = corporate(Approach::AdvancedIrb);
        exp.lgd = Some(dec!(0.30));
        let d = resolve_lgd(IrbVariant::Advanced, &exp, &class_params()).unwrap();
        assert_eq!(d.floor, Some(dec!(0.25)));
        assert_eq!(d.used, dec!(0.30));
        assert!(!d.bound);
    }

    #[test]
    fn test_airb_without_floor_table_uses_estimate() {
        let params = builtin::bcbs_basel2()
            .class_parameters(ExposureClass::Corporate)
            .unwrap();
        let mut exp = corporate(Approach::AdvancedIrb);
        exp.lgd = Some(dec!(0.05));
        let d = resolve_lgd(IrbVariant::Advanced, &exp, &params).unwrap();
        assert_eq!(d.floor, None);
        assert_eq!(d.used, dec!(0.05));
    }

    #[test]
    fn test_airb_missing_lgd_rejected() {
        let exp = corporate(Approach::AdvancedIrb);
        match resolve_lgd(IrbVariant::Advanced, &exp, &class_params()).unwrap_err() {
            CapitalError::InvalidInput { field, .. } => assert_eq!(field, "lgd"),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_airb_missing_floor_entry_is_resolution_error() {
        let mut params = class_params();
        if let Some(table) = params.lgd_floors.as_mut() {
            table.remove(&CollateralType::Intangibles);
        }
        let mut exp = corporate(Approach::AdvancedIrb);
        exp.lgd = Some(dec!(0.30));
        exp.collateral_type = Some(CollateralType::Intangibles);
        assert!(matches!(
            resolve_lgd(IrbVariant::Advanced, &exp, &params),
            Err(CapitalError::ParameterResolution { .. })
        ));
    }

    // -- Maturity --

    #[test]
    fn test_maturity_clamped_to_bounds() {
        assert_eq!(clamp_maturity(dec!(0.25)).used, dec!(1));
        assert!(clamp_maturity(dec!(0.25)).clamped);
        assert_eq!(clamp_maturity(dec!(7)).used, dec!(5));
        let inside = clamp_maturity(dec!(2.5));
        assert_eq!(inside.used, dec!(2.5));
        assert!(!inside.clamped);
    }
}
