//! Resolution of (exposure class × requested approach) to a calculation path.
//!
//! The table below is written without wildcard arms: adding an exposure class
//! or an approach fails to compile until every new combination is given an
//! explicit path, so nothing can fall through to a formula it was never
//! meant for.

use serde::{Deserialize, Serialize};

use crate::exposure::{Approach, Exposure, ExposureClass};
use crate::parameters::ParameterSet;

/// Effective rule path for one exposure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "path", rename_all = "snake_case")]
pub enum CalculationPath {
    Standardized,
    FoundationIrb,
    AdvancedIrb,
    /// Combination not implemented; no engine runs and no number is produced.
    Unsupported { reason: String },
}

impl CalculationPath {
    /// Approach the path computes under; `None` for unsupported paths.
    pub fn approach(&self) -> Option<Approach> {
        match self {
            CalculationPath::Standardized => Some(Approach::Standardized),
            CalculationPath::FoundationIrb => Some(Approach::FoundationIrb),
            CalculationPath::AdvancedIrb => Some(Approach::AdvancedIrb),
            CalculationPath::Unsupported { .. } => None,
        }
    }

    pub fn is_irb(&self) -> bool {
        matches!(
            self,
            CalculationPath::FoundationIrb | CalculationPath::AdvancedIrb
        )
    }
}

/// Informational flag: the approach applied differs from the one requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproachDowngradeNotice {
    pub requested: Approach,
    pub effective: Approach,
    pub reason: String,
}

/// Classifier outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub requested: Approach,
    pub path: CalculationPath,
    pub notices: Vec<ApproachDowngradeNotice>,
}

impl Classification {
    fn direct(requested: Approach, path: CalculationPath) -> Self {
        Classification {
            requested,
            path,
            notices: Vec::new(),
        }
    }

    fn unsupported(requested: Approach, reason: &str) -> Self {
        Self::direct(
            requested,
            CalculationPath::Unsupported {
                reason: reason.to_string(),
            },
        )
    }

    fn downgraded(requested: Approach, path: CalculationPath, reason: String) -> Self {
        let mut c = Self::direct(requested, path);
        c.push_notice(reason);
        c
    }

    fn push_notice(&mut self, reason: String) {
        if let Some(effective) = self.path.approach() {
            self.notices.push(ApproachDowngradeNotice {
                requested: self.requested,
                effective,
                reason,
            });
        }
    }

    pub fn effective_approach(&self) -> Option<Approach> {
        self.path.approach()
    }
}

/// Map an exposure onto its calculation path.
pub fn classify(exposure: &Exposure) -> Classification {
    use Approach::{AdvancedIrb, FoundationIrb, Standardized};
    use ExposureClass::*;

    let requested = exposure.requested_approach;
    match (exposure.exposure_class, requested) {
        (
            Corporate | Bank | Sovereign | CommercialRealEstate | Retail | ResidentialMortgage
            | Other,
            Standardized,
        ) => Classification::direct(requested, CalculationPath::Standardized),

        (Corporate | Bank | Sovereign, FoundationIrb) => {
            Classification::direct(requested, CalculationPath::FoundationIrb)
        }

        (Corporate | Sovereign, AdvancedIrb) => {
            Classification::direct(requested, CalculationPath::AdvancedIrb)
        }

        (Bank, AdvancedIrb) => Classification::downgraded(
            requested,
            CalculationPath::FoundationIrb,
            "A-IRB is not permitted for bank exposures; supervisory LGD applied (F-IRB)".into(),
        ),

        (CommercialRealEstate, FoundationIrb | AdvancedIrb) => Classification::unsupported(
            requested,
            "IRB treatment for commercial real estate is not implemented",
        ),

        (Retail, FoundationIrb | AdvancedIrb) => Classification::unsupported(
            requested,
            "IRB treatment for retail exposures is not implemented",
        ),

        (ResidentialMortgage, FoundationIrb | AdvancedIrb) => Classification::unsupported(
            requested,
            "IRB treatment for residential mortgages is not implemented",
        ),

        (Other, FoundationIrb | AdvancedIrb) => Classification::unsupported(
            requested,
            "IRB treatment for other assets is not implemented",
        ),
    }
}

/// Apply restrictions that depend on the parameter set in force.
///
/// Corporates whose annual revenue exceeds the set's large-corporate
/// threshold may not use A-IRB and are moved to F-IRB with a notice.
pub fn restrict_for_parameters(
    mut classification: Classification,
    exposure: &Exposure,
    params: &ParameterSet,
) -> Classification {
    if classification.path != CalculationPath::AdvancedIrb
        || exposure.exposure_class != ExposureClass::Corporate
    {
        return classification;
    }
    let (Some(threshold), Some(revenue)) = (
        params.large_corporate_revenue_threshold,
        exposure.annual_revenue,
    ) else {
        return classification;
    };
    if revenue > threshold {
        classification.path = CalculationPath::FoundationIrb;
        classification.push_notice(format!(
            "annual revenue {} exceeds the {} large-corporate threshold of {}; \
             A-IRB replaced by F-IRB",
            revenue,
            params.key(),
            threshold
        ));
    }
    classification
}
