use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CapitalError;
use crate::types::{Jurisdiction, Money, Rate, Years};
use crate::CapitalResult;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Basel credit risk exposure classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ExposureClass {
    Corporate,
    Bank,
    Sovereign,
    CommercialRealEstate,
    Retail,
    ResidentialMortgage,
    Other,
}

impl ExposureClass {
    pub fn label(&self) -> &'static str {
        match self {
            ExposureClass::Corporate => "Corporate",
            ExposureClass::Bank => "Bank",
            ExposureClass::Sovereign => "Sovereign / Central Bank",
            ExposureClass::CommercialRealEstate => "Commercial Real Estate",
            ExposureClass::Retail => "Retail",
            ExposureClass::ResidentialMortgage => "Residential Mortgage",
            ExposureClass::Other => "Other",
        }
    }

    /// Classes subject to the IRB PD floor. Sovereigns are never floored.
    pub fn has_pd_floor(&self) -> bool {
        matches!(self, ExposureClass::Corporate | ExposureClass::Bank)
    }
}

/// Capital approach requested by the caller (or effectively applied).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Approach {
    Standardized,
    FoundationIrb,
    AdvancedIrb,
}

impl Approach {
    pub fn label(&self) -> &'static str {
        match self {
            Approach::Standardized => "Standardized",
            Approach::FoundationIrb => "IRB (Foundation)",
            Approach::AdvancedIrb => "IRB (Advanced)",
        }
    }

    pub fn is_irb(&self) -> bool {
        !matches!(self, Approach::Standardized)
    }
}

/// External rating buckets used by the standardized risk-weight tables.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RatingBucket {
    /// AAA to AA-
    AaaAa,
    /// A+ to A-
    A,
    /// BBB+ to BBB-
    Bbb,
    /// BB+ to BB-
    Bb,
    /// B+ to B-
    B,
    /// Below B-
    BelowB,
    #[default]
    Unrated,
}

impl RatingBucket {
    pub fn label(&self) -> &'static str {
        match self {
            RatingBucket::AaaAa => "AAA to AA-",
            RatingBucket::A => "A+ to A-",
            RatingBucket::Bbb => "BBB+ to BBB-",
            RatingBucket::Bb => "BB+ to BB-",
            RatingBucket::B => "B+ to B-",
            RatingBucket::BelowB => "Below B-",
            RatingBucket::Unrated => "Unrated",
        }
    }
}

/// Collateral securing the exposure; selects the A-IRB LGD floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollateralType {
    Unsecured,
    Financial,
    Receivables,
    RealEstate,
    OtherPhysical,
    Intangibles,
}

/// Claim seniority; selects the supervisory LGD under F-IRB.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Seniority {
    #[default]
    Senior,
    Subordinated,
}

/// How exposure at default is measured. Only the drawn balance is modeled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "basis", rename_all = "snake_case")]
pub enum EadBasis {
    Balance { balance: Money },
}

impl EadBasis {
    pub fn ead(&self) -> Money {
        match self {
            EadBasis::Balance { balance } => *balance,
        }
    }
}

// ---------------------------------------------------------------------------
// Exposure
// ---------------------------------------------------------------------------

/// A single credit exposure submitted for a capital calculation.
///
/// Constructed once per request and never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exposure {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exposure_id: Option<String>,
    pub exposure_class: ExposureClass,
    pub requested_approach: Approach,
    pub ead_basis: EadBasis,
    /// Probability of default, required on IRB paths
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pd: Option<Rate>,
    /// Bank-estimated LGD, required on the A-IRB path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lgd: Option<Rate>,
    pub maturity_years: Years,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collateral_type: Option<CollateralType>,
    /// Loan-to-value ratio for CRE; derived from `property_value` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ltv: Option<Rate>,
    /// Selects the parameter tables; never defaulted
    pub jurisdiction: Jurisdiction,
    #[serde(default)]
    pub rating: RatingBucket,
    #[serde(default)]
    pub seniority: Seniority,
    /// Consolidated annual revenue (currency units), drives the SME
    /// correlation adjustment and the large-corporate A-IRB restriction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_revenue: Option<Money>,
    /// Large regulated or unregulated financial institution (AVC multiplier)
    #[serde(default)]
    pub large_financial_institution: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_value: Option<Money>,
    /// CRE repayment materially dependent on cash flows from the property
    #[serde(default)]
    pub income_producing: bool,
    /// Counterparty class used by CRE weights that defer to the borrower
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counterparty_class: Option<ExposureClass>,
    #[serde(default)]
    pub regulatory_retail: bool,
    #[serde(default)]
    pub prudent_mortgage: bool,
}

impl Exposure {
    /// Minimal exposure with every optional attribute unset.
    pub fn new(
        exposure_class: ExposureClass,
        requested_approach: Approach,
        balance: Money,
        maturity_years: Years,
    ) -> Self {
        Exposure {
            exposure_id: None,
            exposure_class,
            requested_approach,
            ead_basis: EadBasis::Balance { balance },
            pd: None,
            lgd: None,
            maturity_years,
            collateral_type: None,
            ltv: None,
            jurisdiction: Jurisdiction::default(),
            rating: RatingBucket::default(),
            seniority: Seniority::default(),
            annual_revenue: None,
            large_financial_institution: false,
            property_value: None,
            income_producing: false,
            counterparty_class: None,
            regulatory_retail: false,
            prudent_mortgage: false,
        }
    }

    pub fn ead(&self) -> Money {
        self.ead_basis.ead()
    }

    /// EAD scaled by a risk weight and any further factors. Fails instead of
    /// overflowing Decimal range.
    pub fn weighted_ead(&self, factors: &[Decimal]) -> CapitalResult<Money> {
        factors
            .iter()
            .try_fold(self.ead(), |acc, f| acc.checked_mul(*f))
            .ok_or_else(|| {
                CapitalError::invalid_input(
                    "ead_basis.balance",
                    "Exposure at default is too large: risk-weighted amount overflows.",
                )
            })
    }

    /// Range checks shared by every path. Path-specific requirements (PD
    /// present, LGD present, LTV derivable) are enforced by the engines.
    pub fn validate(&self) -> CapitalResult<()> {
        if self.ead() < Decimal::ZERO {
            return Err(CapitalError::invalid_input(
                "ead_basis.balance",
                "Exposure at default cannot be negative.",
            ));
        }
        if self.maturity_years <= Decimal::ZERO {
            return Err(CapitalError::invalid_input(
                "maturity_years",
                "Maturity must be greater than zero.",
            ));
        }
        check_unit_interval("pd", self.pd)?;
        check_unit_interval("lgd", self.lgd)?;
        if let Some(ltv) = self.ltv {
            if ltv < Decimal::ZERO {
                return Err(CapitalError::invalid_input(
                    "ltv",
                    "Loan-to-value cannot be negative.",
                ));
            }
        }
        if let Some(pv) = self.property_value {
            if pv <= Decimal::ZERO {
                return Err(CapitalError::invalid_input(
                    "property_value",
                    "Property value must be greater than zero.",
                ));
            }
        }
        if let Some(rev) = self.annual_revenue {
            if rev < Decimal::ZERO {
                return Err(CapitalError::invalid_input(
                    "annual_revenue",
                    "Annual revenue cannot be negative.",
                ));
            }
        }
        Ok(())
    }
}

fn check_unit_interval(field: &str, value: Option<Rate>) -> CapitalResult<()> {
    match value {
        Some(v) if v < Decimal::ZERO || v > Decimal::ONE => Err(CapitalError::invalid_input(
            field,
            format!("{} must be in [0, 1], got {}.", field.to_uppercase(), v),
        )),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
