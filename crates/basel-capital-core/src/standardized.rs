//! Standardized approach risk weights.
//!
//! Every weight and every CRE cut point comes from the parameter set; this
//! module only selects among them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CapitalError;
use crate::exposure::{Exposure, ExposureClass, RatingBucket};
use crate::parameters::{CreWeight, LtvBucket, ParameterSet};
use crate::types::{Money, Rate};
use crate::CapitalResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardizedOutcome {
    pub risk_weight: Rate,
    pub rwa: Money,
    /// Human-readable description of the table entry applied
    pub rule: String,
    /// LTV used for CRE weights
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ltv: Option<Rate>,
}

/// Standardized RWA = risk weight × EAD.
pub fn compute_standardized(
    exposure: &Exposure,
    params: &ParameterSet,
) -> CapitalResult<StandardizedOutcome> {
    let (risk_weight, rule, ltv) = match exposure.exposure_class {
        ExposureClass::CommercialRealEstate => cre_weight(exposure, params)?,
        ExposureClass::Corporate
        | ExposureClass::Bank
        | ExposureClass::Sovereign
        | ExposureClass::Retail
        | ExposureClass::ResidentialMortgage
        | ExposureClass::Other => {
            let (rw, rule) = class_weight(exposure.exposure_class, exposure, params)?;
            (rw, rule, None)
        }
    };
    let rwa = exposure.weighted_ead(&[risk_weight])?;
    tracing::debug!(%risk_weight, %rwa, rule = %rule, "standardized weight");

    Ok(StandardizedOutcome {
        risk_weight,
        rwa,
        rule,
        ltv,
    })
}

/// Weight for a non-CRE class. Also used for the counterparty leg of CRE.
fn class_weight(
    class: ExposureClass,
    exposure: &Exposure,
    params: &ParameterSet,
) -> CapitalResult<(Rate, String)> {
    let table = &params.standardized;
    match class {
        ExposureClass::Sovereign | ExposureClass::Bank | ExposureClass::Corporate => {
            rated_weight(class, exposure.rating, params)
        }
        ExposureClass::Retail => Ok(if exposure.regulatory_retail {
            (table.retail.qualifying, "Regulatory retail".to_string())
        } else {
            (table.retail.other, "Other retail".to_string())
        }),
        ExposureClass::ResidentialMortgage => Ok(if exposure.prudent_mortgage {
            (
                table.residential_mortgage.qualifying,
                "Residential mortgage, prudently underwritten".to_string(),
            )
        } else {
            (
                table.residential_mortgage.other,
                "Residential mortgage, other".to_string(),
            )
        }),
        ExposureClass::Other => Ok((table.other, "Other assets".to_string())),
        ExposureClass::CommercialRealEstate => Err(CapitalError::invalid_input(
            "counterparty_class",
            "A CRE counterparty cannot itself be commercial real estate.",
        )),
    }
}

fn rated_weight(
    class: ExposureClass,
    rating: RatingBucket,
    params: &ParameterSet,
) -> CapitalResult<(Rate, String)> {
    let weight = params
        .rating_weights(class)
        .and_then(|table| table.get(&rating))
        .copied()
        .ok_or_else(|| {
            params.missing(format!(
                "no standardized weight for {} rated {}",
                class.label(),
                rating.label()
            ))
        })?;
    Ok((weight, format!("{} rated {}", class.label(), rating.label())))
}

/// LTV supplied directly, otherwise EAD over property value.
fn loan_to_value(exposure: &Exposure) -> Option<Rate> {
    exposure.ltv.or_else(|| {
        exposure
            .property_value
            .filter(|pv| *pv > Decimal::ZERO)
            .and_then(|pv| exposure.ead().checked_div(pv))
    })
}

fn cre_weight(
    exposure: &Exposure,
    params: &ParameterSet,
) -> CapitalResult<(Rate, String, Option<Rate>)> {
    let (buckets, table_name) = if exposure.income_producing {
        (
            &params.standardized.cre_income_producing,
            "Income-producing CRE",
        )
    } else {
        (&params.standardized.cre_general, "General CRE")
    };

    let ltv = loan_to_value(exposure);
    let bucket = select_bucket(buckets, ltv).ok_or_else(|| {
        if buckets.len() > 1 && ltv.is_none() {
            CapitalError::invalid_input(
                "ltv",
                "CRE exposures need an LTV or a property value under this parameter set.",
            )
        } else {
            params.missing(format!("{} table has no bucket for LTV", table_name))
        }
    })?;

    let band = match bucket.max_ltv {
        Some(max) => format!("LTV <= {}", max),
        None if buckets.len() > 1 => "LTV above top cut point".to_string(),
        None => "any LTV".to_string(),
    };

    let counterparty = || {
        let class = exposure
            .counterparty_class
            .unwrap_or(ExposureClass::Corporate);
        class_weight(class, exposure, params)
    };

    let (weight, treatment) = match &bucket.weight {
        CreWeight::Fixed { risk_weight } => (*risk_weight, String::from("fixed")),
        CreWeight::LesserOfCounterparty { cap } => {
            let (cp, cp_rule) = counterparty()?;
            (
                (*cap).min(cp),
                format!("lesser of {} and counterparty ({})", cap, cp_rule),
            )
        }
        CreWeight::Counterparty => {
            let (cp, cp_rule) = counterparty()?;
            (cp, format!("counterparty ({})", cp_rule))
        }
    };

    Ok((weight, format!("{}, {}: {}", table_name, band, treatment), ltv))
}

/// First bucket whose cut point covers `ltv`. A single open bucket needs no
/// LTV at all.
fn select_bucket(buckets: &[LtvBucket], ltv: Option<Rate>) -> Option<&LtvBucket> {
    match (buckets, ltv) {
        ([only], _) if only.max_ltv.is_none() => Some(only),
        (_, None) => None,
        (_, Some(ltv)) => buckets
            .iter()
            .find(|b| b.max_ltv.map_or(true, |max| ltv <= max)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exposure::Approach;
    use crate::parameters::builtin;
    use rust_decimal_macros::dec;

    fn exposure(class: ExposureClass) -> Exposure {
        Exposure::new(class, Approach::Standardized, dec!(1_000_000), dec!(2.5))
    }

    fn cre(ltv: Option<Decimal>, income_producing: bool) -> Exposure {
        let mut exp = exposure(ExposureClass::CommercialRealEstate);
        exp.ltv = ltv;
        exp.income_producing = income_producing;
        exp
    }

    #[test]
    fn test_corporate_bbb_differs_between_regimes() {
        let mut exp = exposure(ExposureClass::Corporate);
        exp.rating = RatingBucket::Bbb;
        let b2 = compute_standardized(&exp, &builtin::bcbs_basel2()).unwrap();
        let b3 = compute_standardized(&exp, &builtin::bcbs_basel3_final()).unwrap();
        assert_eq!(b2.risk_weight, dec!(1.00));
        assert_eq!(b3.risk_weight, dec!(0.75));
        assert_eq!(b3.rwa, dec!(750_000));
    }

    #[test]
    fn test_sovereign_aaa_zero_weight() {
        let mut exp = exposure(ExposureClass::Sovereign);
        exp.rating = RatingBucket::AaaAa;
        let out = compute_standardized(&exp, &builtin::bcbs_basel3_final()).unwrap();
        assert_eq!(out.rwa, Decimal::ZERO);
    }

    #[test]
    fn test_unrated_bank() {
        let exp = exposure(ExposureClass::Bank);
        let out = compute_standardized(&exp, &builtin::bcbs_basel3_final()).unwrap();
        assert_eq!(out.risk_weight, dec!(0.40));
        assert!(out.rule.contains("Unrated"));
    }

    #[test]
    fn test_retail_and_mortgage_flags() {
        let params = builtin::bcbs_basel3_final();
        let mut retail = exposure(ExposureClass::Retail);
        assert_eq!(
            compute_standardized(&retail, &params).unwrap().risk_weight,
            dec!(1.00)
        );
        retail.regulatory_retail = true;
        assert_eq!(
            compute_standardized(&retail, &params).unwrap().risk_weight,
            dec!(0.75)
        );

        let mut mortgage = exposure(ExposureClass::ResidentialMortgage);
        mortgage.prudent_mortgage = true;
        assert_eq!(
            compute_standardized(&mortgage, &params).unwrap().risk_weight,
            dec!(0.35)
        );
    }

    #[test]
    fn test_cre_general_low_ltv_takes_lesser_of_cap() {
        // Unrated corporate counterparty at 100%, capped at 60%
        let out =
            compute_standardized(&cre(Some(dec!(0.50)), false), &builtin::bcbs_basel3_final())
                .unwrap();
        assert_eq!(out.risk_weight, dec!(0.60));
        assert_eq!(out.ltv, Some(dec!(0.50)));
    }

    #[test]
    fn test_cre_general_low_ltv_better_counterparty() {
        let mut exp = cre(Some(dec!(0.50)), false);
        exp.counterparty_class = Some(ExposureClass::Bank);
        exp.rating = RatingBucket::AaaAa;
        let out = compute_standardized(&exp, &builtin::bcbs_basel3_final()).unwrap();
        assert_eq!(out.risk_weight, dec!(0.20));
    }

    #[test]
    fn test_cre_general_high_ltv_takes_counterparty() {
        let mut exp = cre(Some(dec!(0.75)), false);
        exp.rating = RatingBucket::B;
        let out = compute_standardized(&exp, &builtin::bcbs_basel3_final()).unwrap();
        assert_eq!(out.risk_weight, dec!(1.50));
    }

    #[test]
    fn test_cre_cut_point_is_inclusive() {
        let out =
            compute_standardized(&cre(Some(dec!(0.60)), true), &builtin::bcbs_basel3_final())
                .unwrap();
        assert_eq!(out.risk_weight, dec!(0.70));
        let out =
            compute_standardized(&cre(Some(dec!(0.6001)), true), &builtin::bcbs_basel3_final())
                .unwrap();
        assert_eq!(out.risk_weight, dec!(0.90));
        let out =
            compute_standardized(&cre(Some(dec!(0.95)), true), &builtin::bcbs_basel3_final())
                .unwrap();
        assert_eq!(out.risk_weight, dec!(1.10));
    }

    #[test]
    fn test_cre_ltv_derived_from_property_value() {
        let mut exp = cre(None, true);
        exp.property_value = Some(dec!(1_250_000));
        let out = compute_standardized(&exp, &builtin::bcbs_basel3_final()).unwrap();
        assert_eq!(out.ltv, Some(dec!(0.8)));
        assert_eq!(out.risk_weight, dec!(0.90));
    }

    #[test]
    fn test_cre_missing_ltv_rejected_when_table_is_bucketed() {
        match compute_standardized(&cre(None, false), &builtin::bcbs_basel3_final()).unwrap_err() {
            CapitalError::InvalidInput { field, .. } => assert_eq!(field, "ltv"),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_basel2_cre_needs_no_ltv() {
        let out = compute_standardized(&cre(None, false), &builtin::bcbs_basel2()).unwrap();
        assert_eq!(out.risk_weight, dec!(1.00));
    }

    #[test]
    fn test_cre_cut_points_come_from_parameters() {
        let mut params = builtin::bcbs_basel3_final();
        params.standardized.cre_income_producing[0].max_ltv = Some(dec!(0.55));
        let out = compute_standardized(&cre(Some(dec!(0.58)), true), &params).unwrap();
        assert_eq!(out.risk_weight, dec!(0.90));
    }

    #[test]
    fn test_missing_rating_entry_is_resolution_error() {
        let mut params = builtin::bcbs_basel3_final();
        params.standardized.corporate.remove(&RatingBucket::Unrated);
        let exp = exposure(ExposureClass::Corporate);
        assert!(matches!(
            compute_standardized(&exp, &params),
            Err(CapitalError::ParameterResolution { .. })
        ));
    }
}
