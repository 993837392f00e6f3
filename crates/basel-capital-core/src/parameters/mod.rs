//! Jurisdiction- and version-keyed regulatory parameter tables.
//!
//! A [`ParameterSet`] is an immutable snapshot of every constant the engines
//! consume. Sets are either compiled in ([`builtin`]) or deserialized from a
//! collaborator-supplied file, validated once, and then shared read-only
//! through a [`ParameterRegistry`].

pub mod builtin;
pub mod registry;

pub use registry::ParameterRegistry;

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CapitalError;
use crate::exposure::{CollateralType, ExposureClass, RatingBucket};
use crate::types::{Jurisdiction, Money, Rate};
use crate::CapitalResult;

// ---------------------------------------------------------------------------
// Keys and enums
// ---------------------------------------------------------------------------

/// Regulatory framework a parameter set implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Regime {
    BaselII,
    BaselIII,
}

/// Lookup key of a parameter set.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ParameterKey {
    pub jurisdiction: Jurisdiction,
    pub version: String,
}

impl ParameterKey {
    pub fn new(jurisdiction: Jurisdiction, version: impl Into<String>) -> Self {
        ParameterKey {
            jurisdiction,
            version: version.into(),
        }
    }
}

impl fmt::Display for ParameterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.jurisdiction, self.version)
    }
}

/// Asset correlation rule for one exposure class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum CorrelationRule {
    /// `R = lower·f + upper·(1−f)`, `f = (1−e^(−decay·PD)) / (1−e^(−decay))`
    PdWeighted {
        lower: Rate,
        upper: Rate,
        decay: Decimal,
    },
    Fixed { value: Rate },
}

/// Firm-size adjustment to corporate correlation (revenue in currency units).
///
/// `R − max_reduction · (1 − (S − lower)/(upper − lower))` with S clamped to
/// `[lower, upper]`, applied only when revenue is below `upper`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmeAdjustment {
    pub lower_revenue: Money,
    pub upper_revenue: Money,
    pub max_reduction: Rate,
}

/// F-IRB supervisory LGD values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupervisoryLgd {
    /// Senior unsecured LGD by exposure class
    pub senior: BTreeMap<ExposureClass, Rate>,
    pub subordinated: Rate,
}

/// Risk weight attached to one CRE loan-to-value bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CreWeight {
    Fixed { risk_weight: Rate },
    /// min(cap, counterparty risk weight)
    LesserOfCounterparty { cap: Rate },
    /// Risk weight of the counterparty
    Counterparty,
}

/// LTV bucket: applies when `ltv <= max_ltv`; `None` is the open top bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LtvBucket {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_ltv: Option<Rate>,
    pub weight: CreWeight,
}

/// Pair of weights for classes with a single qualifying criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualifyingWeights {
    pub qualifying: Rate,
    pub other: Rate,
}

/// Standardized approach risk-weight tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardizedTable {
    pub sovereign: BTreeMap<RatingBucket, Rate>,
    pub bank: BTreeMap<RatingBucket, Rate>,
    pub corporate: BTreeMap<RatingBucket, Rate>,
    pub retail: QualifyingWeights,
    pub residential_mortgage: QualifyingWeights,
    pub other: Rate,
    pub cre_general: Vec<LtvBucket>,
    pub cre_income_producing: Vec<LtvBucket>,
}

// ---------------------------------------------------------------------------
// ParameterSet
// ---------------------------------------------------------------------------

/// Versioned, immutable snapshot of regulatory constants for one jurisdiction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    pub jurisdiction: Jurisdiction,
    pub version: String,
    pub regime: Regime,
    pub effective_from: NaiveDate,
    #[serde(default)]
    pub description: String,
    /// IRB PD floor for Corporate and Bank exposures
    pub pd_floor: Rate,
    /// A-IRB LGD floors by collateral type; `None` when not in force
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lgd_floors: Option<BTreeMap<CollateralType, Rate>>,
    pub supervisory_lgd: SupervisoryLgd,
    /// Output floor as a share of standardized RWA (0 disables it)
    pub output_floor_pct: Rate,
    pub correlation: BTreeMap<ExposureClass, CorrelationRule>,
    /// Correlation multiplier for large financial institutions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub large_fi_multiplier: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sme_adjustment: Option<SmeAdjustment>,
    /// Revenue above which corporates may not use A-IRB
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub large_corporate_revenue_threshold: Option<Money>,
    /// Multiplier on IRB RWA (1.06 under Basel II)
    pub rwa_scaling_factor: Decimal,
    /// Minimum total capital ratio applied to final RWA
    pub capital_ratio: Rate,
    pub standardized: StandardizedTable,
}

/// Constants in force for one exposure class, as resolved from a set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassParameters {
    pub key: ParameterKey,
    pub exposure_class: ExposureClass,
    /// `None` for classes the PD floor never applies to
    pub pd_floor: Option<Rate>,
    pub lgd_floors: Option<BTreeMap<CollateralType, Rate>>,
    pub supervisory_lgd_senior: Rate,
    pub supervisory_lgd_subordinated: Rate,
    pub output_floor_pct: Rate,
    pub correlation: CorrelationRule,
}

impl ParameterSet {
    pub fn key(&self) -> ParameterKey {
        ParameterKey::new(self.jurisdiction.clone(), self.version.clone())
    }

    /// IRB constants for `class`. Fails when the set has no IRB entry for it.
    pub fn class_parameters(&self, class: ExposureClass) -> CapitalResult<ClassParameters> {
        let correlation = self
            .correlation
            .get(&class)
            .cloned()
            .ok_or_else(|| self.missing(format!("no correlation rule for {}", class.label())))?;
        let supervisory_lgd_senior = self
            .supervisory_lgd
            .senior
            .get(&class)
            .copied()
            .ok_or_else(|| self.missing(format!("no supervisory LGD for {}", class.label())))?;

        Ok(ClassParameters {
            key: self.key(),
            exposure_class: class,
            pd_floor: class.has_pd_floor().then_some(self.pd_floor),
            lgd_floors: self.lgd_floors.clone(),
            supervisory_lgd_senior,
            supervisory_lgd_subordinated: self.supervisory_lgd.subordinated,
            output_floor_pct: self.output_floor_pct,
            correlation,
        })
    }

    /// Standardized rating table for a rating-driven class.
    pub fn rating_weights(&self, class: ExposureClass) -> Option<&BTreeMap<RatingBucket, Rate>> {
        match class {
            ExposureClass::Sovereign => Some(&self.standardized.sovereign),
            ExposureClass::Bank => Some(&self.standardized.bank),
            ExposureClass::Corporate => Some(&self.standardized.corporate),
            ExposureClass::CommercialRealEstate
            | ExposureClass::Retail
            | ExposureClass::ResidentialMortgage
            | ExposureClass::Other => None,
        }
    }

    pub(crate) fn missing(&self, reason: impl Into<String>) -> CapitalError {
        CapitalError::ParameterResolution {
            jurisdiction: self.jurisdiction.to_string(),
            version: self.version.clone(),
            reason: reason.into(),
        }
    }

    /// Structural checks run once when a set enters a registry.
    pub fn validate(&self) -> CapitalResult<()> {
        if self.version.trim().is_empty() {
            return Err(self.invalid("version must not be empty"));
        }
        self.check_rate("pd_floor", self.pd_floor)?;
        self.check_rate("output_floor_pct", self.output_floor_pct)?;
        self.check_rate("supervisory_lgd.subordinated", self.supervisory_lgd.subordinated)?;
        for (class, lgd) in &self.supervisory_lgd.senior {
            self.check_rate(&format!("supervisory_lgd.senior.{:?}", class), *lgd)?;
        }
        if let Some(floors) = &self.lgd_floors {
            for (collateral, floor) in floors {
                self.check_rate(&format!("lgd_floors.{:?}", collateral), *floor)?;
            }
        }
        if self.capital_ratio <= Decimal::ZERO || self.capital_ratio > Decimal::ONE {
            return Err(self.invalid("capital_ratio must be in (0, 1]"));
        }
        if self.rwa_scaling_factor <= Decimal::ZERO {
            return Err(self.invalid("rwa_scaling_factor must be positive"));
        }
        if let Some(m) = self.large_fi_multiplier {
            if m <= Decimal::ZERO {
                return Err(self.invalid("large_fi_multiplier must be positive"));
            }
        }
        if let Some(sme) = &self.sme_adjustment {
            if sme.lower_revenue < Decimal::ZERO || sme.upper_revenue <= sme.lower_revenue {
                return Err(self.invalid("sme_adjustment requires 0 <= lower_revenue < upper_revenue"));
            }
            self.check_rate("sme_adjustment.max_reduction", sme.max_reduction)?;
        }
        for (class, rule) in &self.correlation {
            self.check_correlation(*class, rule)?;
        }

        let sa = &self.standardized;
        for (name, table) in [
            ("sovereign", &sa.sovereign),
            ("bank", &sa.bank),
            ("corporate", &sa.corporate),
        ] {
            for (bucket, rw) in table {
                self.check_weight(&format!("standardized.{}.{:?}", name, bucket), *rw)?;
            }
        }
        self.check_weight("standardized.retail.qualifying", sa.retail.qualifying)?;
        self.check_weight("standardized.retail.other", sa.retail.other)?;
        self.check_weight(
            "standardized.residential_mortgage.qualifying",
            sa.residential_mortgage.qualifying,
        )?;
        self.check_weight(
            "standardized.residential_mortgage.other",
            sa.residential_mortgage.other,
        )?;
        self.check_weight("standardized.other", sa.other)?;
        self.check_ltv_buckets("standardized.cre_general", &sa.cre_general)?;
        self.check_ltv_buckets("standardized.cre_income_producing", &sa.cre_income_producing)?;
        Ok(())
    }

    fn invalid(&self, reason: impl Into<String>) -> CapitalError {
        CapitalError::InvalidParameterSet {
            key: self.key().to_string(),
            reason: reason.into(),
        }
    }

    fn check_rate(&self, field: &str, value: Rate) -> CapitalResult<()> {
        if value < Decimal::ZERO || value > Decimal::ONE {
            return Err(self.invalid(format!("{} must be in [0, 1], got {}", field, value)));
        }
        Ok(())
    }

    /// Risk weights may exceed 100% (up to 1250%).
    fn check_weight(&self, field: &str, value: Rate) -> CapitalResult<()> {
        if value < Decimal::ZERO || value > Decimal::new(125, 1) {
            return Err(self.invalid(format!("{} must be in [0, 12.5], got {}", field, value)));
        }
        Ok(())
    }

    fn check_correlation(&self, class: ExposureClass, rule: &CorrelationRule) -> CapitalResult<()> {
        let field = format!("correlation.{:?}", class);
        match rule {
            CorrelationRule::PdWeighted {
                lower,
                upper,
                decay,
            } => {
                if *lower <= Decimal::ZERO || *upper >= Decimal::ONE || lower > upper {
                    return Err(self.invalid(format!(
                        "{} requires 0 < lower <= upper < 1",
                        field
                    )));
                }
                if *decay <= Decimal::ZERO {
                    return Err(self.invalid(format!("{}.decay must be positive", field)));
                }
            }
            CorrelationRule::Fixed { value } => {
                if *value <= Decimal::ZERO || *value >= Decimal::ONE {
                    return Err(self.invalid(format!("{} fixed value must be in (0, 1)", field)));
                }
            }
        }
        Ok(())
    }

    fn check_ltv_buckets(&self, field: &str, buckets: &[LtvBucket]) -> CapitalResult<()> {
        let Some((last, bounded)) = buckets.split_last() else {
            return Err(self.invalid(format!("{} must contain at least one bucket", field)));
        };
        if last.max_ltv.is_some() {
            return Err(self.invalid(format!("{} must end with an open-ended bucket", field)));
        }
        let mut previous: Option<Rate> = None;
        for bucket in bounded {
            let Some(cut) = bucket.max_ltv else {
                return Err(self.invalid(format!(
                    "{}: only the last bucket may be open-ended",
                    field
                )));
            };
            if cut <= Decimal::ZERO || previous.is_some_and(|p| cut <= p) {
                return Err(self.invalid(format!(
                    "{}: cut points must be positive and strictly ascending",
                    field
                )));
            }
            previous = Some(cut);
        }
        for bucket in buckets {
            match &bucket.weight {
                CreWeight::Fixed { risk_weight } => self.check_weight(field, *risk_weight)?,
                CreWeight::LesserOfCounterparty { cap } => self.check_weight(field, *cap)?,
                CreWeight::Counterparty => {}
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
