//! Parameter sets shipped with the engine.
//!
//! Values follow the BCBS framework (Basel II: BCBS 128; Basel III final:
//! CRE20, CRE31, CRE32) and the national implementations named in each
//! set's description.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::{
    CorrelationRule, CreWeight, LtvBucket, ParameterSet, QualifyingWeights, Regime,
    SmeAdjustment, StandardizedTable, SupervisoryLgd,
};
use crate::exposure::{CollateralType, ExposureClass, RatingBucket};
use crate::types::{Jurisdiction, Rate};

/// Every built-in set, in registry order.
pub fn all() -> Vec<ParameterSet> {
    vec![
        bcbs_basel2(),
        bcbs_basel3_final(),
        us_advanced_2013(),
        us_bcbs_baseline(),
        osfi_car_2024(),
        eu_crr3_2025(),
    ]
}

/// BCBS Basel II (June 2006 comprehensive version).
pub fn bcbs_basel2() -> ParameterSet {
    ParameterSet {
        jurisdiction: Jurisdiction::BCBS,
        version: "basel2".into(),
        regime: Regime::BaselII,
        effective_from: date(2007, 1, 1),
        description: "BCBS 128 Basel II framework; no output floor, 1.06 IRB scaling".into(),
        pd_floor: dec!(0.0003),
        lgd_floors: None,
        supervisory_lgd: basel2_supervisory_lgd(),
        output_floor_pct: Decimal::ZERO,
        correlation: standard_correlation(),
        large_fi_multiplier: None,
        sme_adjustment: Some(sme_adjustment()),
        large_corporate_revenue_threshold: None,
        rwa_scaling_factor: dec!(1.06),
        capital_ratio: dec!(0.08),
        standardized: basel2_standardized(),
    }
}

/// BCBS Basel III final reforms (December 2017), fully phased-in floor.
pub fn bcbs_basel3_final() -> ParameterSet {
    ParameterSet {
        description: "BCBS d424 Basel III final; 72.5% output floor, A-IRB LGD floors".into(),
        large_corporate_revenue_threshold: Some(dec!(500_000_000)),
        ..basel3_common(Jurisdiction::BCBS, "basel3-final")
    }
}

/// US advanced approaches rule (12 CFR 217 subpart E) with the Collins floor.
pub fn us_advanced_2013() -> ParameterSet {
    ParameterSet {
        jurisdiction: Jurisdiction::US,
        version: "us-advanced-2013".into(),
        regime: Regime::BaselII,
        effective_from: date(2014, 1, 1),
        description: "US advanced approaches; Collins floor at 100% of standardized RWA, \
                      no A-IRB LGD floors"
            .into(),
        pd_floor: dec!(0.0003),
        lgd_floors: None,
        supervisory_lgd: basel2_supervisory_lgd(),
        output_floor_pct: Decimal::ONE,
        correlation: standard_correlation(),
        large_fi_multiplier: Some(dec!(1.25)),
        sme_adjustment: None,
        large_corporate_revenue_threshold: None,
        rwa_scaling_factor: dec!(1.06),
        capital_ratio: dec!(0.08),
        standardized: basel2_standardized(),
    }
}

/// US run with the BCBS baseline input floors switched on.
pub fn us_bcbs_baseline() -> ParameterSet {
    ParameterSet {
        effective_from: date(2025, 7, 1),
        description: "US modeled with BCBS Basel III baseline input and output floors".into(),
        large_corporate_revenue_threshold: Some(dec!(500_000_000)),
        ..basel3_common(Jurisdiction::US, "us-bcbs-baseline")
    }
}

/// OSFI Capital Adequacy Requirements 2024 (Canada).
pub fn osfi_car_2024() -> ParameterSet {
    ParameterSet {
        effective_from: date(2024, 1, 1),
        description: "OSFI CAR 2024; 67.5% output floor, CAD 750m large corporate threshold"
            .into(),
        output_floor_pct: dec!(0.675),
        large_corporate_revenue_threshold: Some(dec!(750_000_000)),
        ..basel3_common(Jurisdiction::CAN, "osfi-car-2024")
    }
}

/// EU CRR3, first year of the output floor phase-in.
pub fn eu_crr3_2025() -> ParameterSet {
    ParameterSet {
        effective_from: date(2025, 1, 1),
        description: "EU CRR3 (Regulation 2024/1623); 50% transitional output floor".into(),
        output_floor_pct: dec!(0.50),
        large_corporate_revenue_threshold: Some(dec!(500_000_000)),
        ..basel3_common(Jurisdiction::EU, "crr3-2025")
    }
}

// ---------------------------------------------------------------------------
// Shared building blocks
// ---------------------------------------------------------------------------

fn basel3_common(jurisdiction: Jurisdiction, version: &str) -> ParameterSet {
    ParameterSet {
        jurisdiction,
        version: version.into(),
        regime: Regime::BaselIII,
        effective_from: date(2023, 1, 1),
        description: String::new(),
        pd_floor: dec!(0.0005),
        lgd_floors: Some(basel3_lgd_floors()),
        supervisory_lgd: SupervisoryLgd {
            senior: BTreeMap::from([
                (ExposureClass::Corporate, dec!(0.40)),
                (ExposureClass::Bank, dec!(0.45)),
                (ExposureClass::Sovereign, dec!(0.45)),
            ]),
            subordinated: dec!(0.75),
        },
        output_floor_pct: dec!(0.725),
        correlation: standard_correlation(),
        large_fi_multiplier: Some(dec!(1.25)),
        sme_adjustment: Some(sme_adjustment()),
        large_corporate_revenue_threshold: None,
        rwa_scaling_factor: Decimal::ONE,
        capital_ratio: dec!(0.08),
        standardized: basel3_standardized(),
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
}

fn standard_correlation() -> BTreeMap<ExposureClass, CorrelationRule> {
    let rule = CorrelationRule::PdWeighted {
        lower: dec!(0.12),
        upper: dec!(0.24),
        decay: dec!(50),
    };
    BTreeMap::from([
        (ExposureClass::Corporate, rule.clone()),
        (ExposureClass::Bank, rule.clone()),
        (ExposureClass::Sovereign, rule),
    ])
}

fn sme_adjustment() -> SmeAdjustment {
    SmeAdjustment {
        lower_revenue: dec!(5_000_000),
        upper_revenue: dec!(50_000_000),
        max_reduction: dec!(0.04),
    }
}

fn basel2_supervisory_lgd() -> SupervisoryLgd {
    SupervisoryLgd {
        senior: BTreeMap::from([
            (ExposureClass::Corporate, dec!(0.45)),
            (ExposureClass::Bank, dec!(0.45)),
            (ExposureClass::Sovereign, dec!(0.45)),
        ]),
        subordinated: dec!(0.75),
    }
}

/// CRE32.17 floors; intangibles are not eligible collateral.
fn basel3_lgd_floors() -> BTreeMap<CollateralType, Rate> {
    BTreeMap::from([
        (CollateralType::Unsecured, dec!(0.25)),
        (CollateralType::Financial, dec!(0)),
        (CollateralType::Receivables, dec!(0.10)),
        (CollateralType::RealEstate, dec!(0.10)),
        (CollateralType::OtherPhysical, dec!(0.15)),
        (CollateralType::Intangibles, dec!(0.25)),
    ])
}

fn rating_table(weights: [Rate; 7]) -> BTreeMap<RatingBucket, Rate> {
    let buckets = [
        RatingBucket::AaaAa,
        RatingBucket::A,
        RatingBucket::Bbb,
        RatingBucket::Bb,
        RatingBucket::B,
        RatingBucket::BelowB,
        RatingBucket::Unrated,
    ];
    buckets.into_iter().zip(weights).collect()
}

fn sovereign_weights() -> BTreeMap<RatingBucket, Rate> {
    rating_table([
        dec!(0),
        dec!(0.20),
        dec!(0.50),
        dec!(1.00),
        dec!(1.00),
        dec!(1.50),
        dec!(1.00),
    ])
}

fn basel2_standardized() -> StandardizedTable {
    StandardizedTable {
        sovereign: sovereign_weights(),
        // Option 2 (rating of the bank itself)
        bank: rating_table([
            dec!(0.20),
            dec!(0.50),
            dec!(0.50),
            dec!(1.00),
            dec!(1.00),
            dec!(1.50),
            dec!(0.50),
        ]),
        corporate: rating_table([
            dec!(0.20),
            dec!(0.50),
            dec!(1.00),
            dec!(1.00),
            dec!(1.50),
            dec!(1.50),
            dec!(1.00),
        ]),
        retail: QualifyingWeights {
            qualifying: dec!(0.75),
            other: dec!(1.00),
        },
        residential_mortgage: QualifyingWeights {
            qualifying: dec!(0.35),
            other: dec!(1.00),
        },
        other: dec!(1.00),
        cre_general: vec![LtvBucket {
            max_ltv: None,
            weight: CreWeight::Fixed {
                risk_weight: dec!(1.00),
            },
        }],
        cre_income_producing: vec![LtvBucket {
            max_ltv: None,
            weight: CreWeight::Fixed {
                risk_weight: dec!(1.00),
            },
        }],
    }
}

fn basel3_standardized() -> StandardizedTable {
    StandardizedTable {
        sovereign: sovereign_weights(),
        // ECRA; unrated banks take SCRA grade A
        bank: rating_table([
            dec!(0.20),
            dec!(0.30),
            dec!(0.50),
            dec!(1.00),
            dec!(1.00),
            dec!(1.50),
            dec!(0.40),
        ]),
        corporate: rating_table([
            dec!(0.20),
            dec!(0.50),
            dec!(0.75),
            dec!(1.00),
            dec!(1.50),
            dec!(1.50),
            dec!(1.00),
        ]),
        retail: QualifyingWeights {
            qualifying: dec!(0.75),
            other: dec!(1.00),
        },
        residential_mortgage: QualifyingWeights {
            qualifying: dec!(0.35),
            other: dec!(1.00),
        },
        other: dec!(1.00),
        // CRE20.85
        cre_general: vec![
            LtvBucket {
                max_ltv: Some(dec!(0.60)),
                weight: CreWeight::LesserOfCounterparty { cap: dec!(0.60) },
            },
            LtvBucket {
                max_ltv: None,
                weight: CreWeight::Counterparty,
            },
        ],
        // CRE20.87
        cre_income_producing: vec![
            LtvBucket {
                max_ltv: Some(dec!(0.60)),
                weight: CreWeight::Fixed {
                    risk_weight: dec!(0.70),
                },
            },
            LtvBucket {
                max_ltv: Some(dec!(0.80)),
                weight: CreWeight::Fixed {
                    risk_weight: dec!(0.90),
                },
            },
            LtvBucket {
                max_ltv: None,
                weight: CreWeight::Fixed {
                    risk_weight: dec!(1.10),
                },
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_builtin_keys_are_unique() {
        let keys: BTreeSet<_> = all().iter().map(|s| s.key()).collect();
        assert_eq!(keys.len(), all().len());
    }

    #[test]
    fn test_basel2_sets_scale_irb_rwa() {
        assert_eq!(bcbs_basel2().rwa_scaling_factor, dec!(1.06));
        assert_eq!(us_advanced_2013().rwa_scaling_factor, dec!(1.06));
        assert_eq!(bcbs_basel3_final().rwa_scaling_factor, Decimal::ONE);
    }

    #[test]
    fn test_output_floor_percentages() {
        assert_eq!(bcbs_basel3_final().output_floor_pct, dec!(0.725));
        assert_eq!(osfi_car_2024().output_floor_pct, dec!(0.675));
        assert_eq!(eu_crr3_2025().output_floor_pct, dec!(0.50));
        assert_eq!(us_advanced_2013().output_floor_pct, Decimal::ONE);
        assert_eq!(bcbs_basel2().output_floor_pct, Decimal::ZERO);
    }

    #[test]
    fn test_rating_tables_cover_every_bucket() {
        for set in all() {
            for class in [
                ExposureClass::Sovereign,
                ExposureClass::Bank,
                ExposureClass::Corporate,
            ] {
                let table = set.rating_weights(class).unwrap();
                assert_eq!(table.len(), 7, "{} {:?}", set.key(), class);
            }
        }
    }
}
