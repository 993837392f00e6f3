//! Append-only record of every decision behind a calculation result.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::classifier::CalculationPath;
use crate::exposure::Approach;
use crate::parameters::{ParameterKey, Regime};
use crate::types::{Money, Rate, Years};

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Where the LGD fed into the ASRF formula came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LgdSource {
    SupervisorySenior,
    SupervisorySubordinated,
    BankEstimate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuditEvent {
    InputConsumed {
        field: String,
        value: String,
    },
    Classified {
        requested: Approach,
        path: CalculationPath,
    },
    ParametersResolved {
        key: ParameterKey,
        regime: Regime,
        effective_from: NaiveDate,
    },
    ApproachDowngraded {
        requested: Approach,
        effective: Approach,
        reason: String,
    },
    /// `floor` is `None` when the class is never PD-floored.
    PdFloor {
        raw: Rate,
        floor: Option<Rate>,
        used: Rate,
        bound: bool,
    },
    Lgd {
        source: LgdSource,
        input: Option<Rate>,
        floor: Option<Rate>,
        used: Rate,
        bound: bool,
    },
    Maturity {
        raw: Years,
        used: Years,
        clamped: bool,
    },
    Correlation {
        base: Rate,
        sme_reduction: Rate,
        multiplier: Decimal,
        used: Rate,
    },
    MaturityAdjustment {
        slope: Decimal,
        adjustment: Decimal,
    },
    CapitalFactor {
        unclamped: Decimal,
        k: Decimal,
        clamped: bool,
    },
    IrbRwa {
        risk_weight: Rate,
        scaling_factor: Decimal,
        rwa: Money,
    },
    StandardizedWeight {
        rule: String,
        risk_weight: Rate,
        rwa: Money,
    },
    OutputFloor {
        floor_pct: Rate,
        floor_term: Money,
        irb_rwa: Money,
        final_rwa: Money,
        bound: bool,
    },
    EnginesSkipped {
        reason: String,
    },
    CapitalRequirement {
        capital_ratio: Rate,
        capital: Money,
    },
}

/// One ordered entry of the trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub step: u32,
    #[serde(flatten)]
    pub event: AuditEvent,
}

// ---------------------------------------------------------------------------
// Overrides
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideKind {
    PdFloor,
    LgdFloor,
    SupervisoryLgd,
    MaturityClamp,
    CapitalFactorClamp,
    OutputFloor,
}

/// A floor or substitution that changed a value fed into the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedOverride {
    pub kind: OverrideKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original: Option<Decimal>,
    pub applied: Decimal,
    pub reason: String,
}

// ---------------------------------------------------------------------------
// Builder and finished trail
// ---------------------------------------------------------------------------

/// Accumulates events in the order decisions are made.
#[derive(Debug, Default)]
pub struct AuditTrailBuilder {
    entries: Vec<AuditEntry>,
}

impl AuditTrailBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: AuditEvent) -> &mut Self {
        let step = self.entries.len() as u32 + 1;
        self.entries.push(AuditEntry { step, event });
        self
    }

    pub fn input(&mut self, field: &str, value: impl ToString) -> &mut Self {
        self.record(AuditEvent::InputConsumed {
            field: field.to_string(),
            value: value.to_string(),
        })
    }

    /// Seal the trail. The builder is consumed, so nothing can be appended
    /// once a result carries it.
    pub fn finish(self) -> AuditTrail {
        AuditTrail {
            entries: self.entries,
        }
    }
}

/// Immutable audit record attached to a `CalculationResult`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditTrail {
    entries: Vec<AuditEntry>,
}

impl AuditTrail {
    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn events(&self) -> impl Iterator<Item = &AuditEvent> {
        self.entries.iter().map(|e| &e.event)
    }

    /// Value recorded for a consumed input field.
    pub fn input(&self, field: &str) -> Option<&str> {
        self.events().find_map(|e| match e {
            AuditEvent::InputConsumed { field: f, value } if f == field => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn output_floor_bound(&self) -> Option<bool> {
        self.events().find_map(|e| match e {
            AuditEvent::OutputFloor { bound, .. } => Some(*bound),
            _ => None,
        })
    }

    pub fn parameter_key(&self) -> Option<&ParameterKey> {
        self.events().find_map(|e| match e {
            AuditEvent::ParametersResolved { key, .. } => Some(key),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Jurisdiction;
    use rust_decimal_macros::dec;

    #[test]
    fn test_steps_are_sequential() {
        let mut builder = AuditTrailBuilder::new();
        builder
            .input("pd", dec!(0.01))
            .record(AuditEvent::Classified {
                requested: Approach::FoundationIrb,
                path: CalculationPath::FoundationIrb,
            })
            .record(AuditEvent::EnginesSkipped {
                reason: "test".into(),
            });
        let trail = builder.finish();
        let steps: Vec<u32> = trail.entries().iter().map(|e| e.step).collect();
        assert_eq!(steps, vec![1, 2, 3]);
        assert_eq!(trail.input("pd"), Some("0.01"));
        assert_eq!(trail.input("lgd"), None);
    }

    #[test]
    fn test_lookup_helpers() {
        let key = ParameterKey::new(Jurisdiction::BCBS, "basel3-final");
        let mut builder = AuditTrailBuilder::new();
        builder.record(AuditEvent::ParametersResolved {
            key: key.clone(),
            regime: Regime::BaselIII,
            effective_from: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        });
        builder.record(AuditEvent::OutputFloor {
            floor_pct: dec!(0.725),
            floor_term: dec!(725),
            irb_rwa: dec!(500),
            final_rwa: dec!(725),
            bound: true,
        });
        let trail = builder.finish();
        assert_eq!(trail.parameter_key(), Some(&key));
        assert_eq!(trail.output_floor_bound(), Some(true));
    }

    #[test]
    fn test_entry_serializes_flat() {
        let mut builder = AuditTrailBuilder::new();
        builder.record(AuditEvent::EnginesSkipped {
            reason: "not implemented".into(),
        });
        let value = serde_json::to_value(builder.finish()).unwrap();
        let entry = &value["entries"][0];
        assert_eq!(entry["step"], 1);
        assert_eq!(entry["event"], "engines_skipped");
        assert_eq!(entry["reason"], "not implemented");
    }
}
