//! Per-exposure orchestration: validate, classify, resolve parameters, run
//! the engines the path calls for, floor, and assemble an audited result.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::audit::{AppliedOverride, AuditEvent, AuditTrail, AuditTrailBuilder, OverrideKind};
use crate::classifier::{self, ApproachDowngradeNotice, CalculationPath};
use crate::exposure::{Approach, Exposure, ExposureClass};
use crate::irb::{self, IrbOutcome, IrbVariant};
use crate::output_floor::{self, OutputFloorOutcome};
use crate::parameters::{ParameterKey, ParameterRegistry, ParameterSet};
use crate::standardized::{self, StandardizedOutcome};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::CapitalResult;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Numbers produced for a supported path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapitalFigures {
    pub ead: Money,
    /// Always computed, also on IRB paths where it feeds the output floor
    pub standardized: StandardizedOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub irb: Option<IrbOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_floor: Option<OutputFloorOutcome>,
    pub final_rwa: Money,
    pub capital_ratio: Rate,
    pub capital_required: Money,
    pub overrides: Vec<AppliedOverride>,
}

impl CapitalFigures {
    /// IRB capital factor K, if the IRB engine ran.
    pub fn capital_k(&self) -> Option<Rate> {
        self.irb.as_ref().map(|i| i.capital_k)
    }

    pub fn irb_rwa(&self) -> Option<Money> {
        self.irb.as_ref().map(|i| i.rwa)
    }
}

/// Either figures, or an explicit "not implemented" marker carrying no
/// number at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CalculationOutcome {
    Computed(CapitalFigures),
    Unsupported { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exposure_id: Option<String>,
    pub exposure_class: ExposureClass,
    pub requested_approach: Approach,
    /// `None` when the path is unsupported
    pub effective_approach: Option<Approach>,
    pub notices: Vec<ApproachDowngradeNotice>,
    pub parameter_key: ParameterKey,
    pub outcome: CalculationOutcome,
    pub audit: AuditTrail,
}

impl CalculationResult {
    pub fn figures(&self) -> Option<&CapitalFigures> {
        match &self.outcome {
            CalculationOutcome::Computed(figures) => Some(figures),
            CalculationOutcome::Unsupported { .. } => None,
        }
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self.outcome, CalculationOutcome::Unsupported { .. })
    }

    pub fn unsupported_reason(&self) -> Option<&str> {
        match &self.outcome {
            CalculationOutcome::Unsupported { reason } => Some(reason),
            CalculationOutcome::Computed(_) => None,
        }
    }

    pub fn final_rwa(&self) -> Option<Money> {
        self.figures().map(|f| f.final_rwa)
    }

    pub fn capital_required(&self) -> Option<Money> {
        self.figures().map(|f| f.capital_required)
    }

    pub fn was_downgraded(&self) -> bool {
        !self.notices.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Calculator
// ---------------------------------------------------------------------------

/// Stateless capital calculator over a read-only parameter registry.
///
/// Cheap to clone and safe to share across threads; every call works on its
/// own exposure and its own parameter snapshot.
#[derive(Debug, Clone)]
pub struct CapitalCalculator {
    registry: ParameterRegistry,
}

impl Default for CapitalCalculator {
    fn default() -> Self {
        CapitalCalculator::new(ParameterRegistry::builtin())
    }
}

impl CapitalCalculator {
    pub fn new(registry: ParameterRegistry) -> Self {
        CapitalCalculator { registry }
    }

    pub fn registry(&self) -> &ParameterRegistry {
        &self.registry
    }

    /// Calculate under the exposure's jurisdiction and the given version.
    /// Input errors are reported before parameter resolution.
    pub fn calculate(
        &self,
        exposure: &Exposure,
        parameter_version: &str,
    ) -> CapitalResult<CalculationResult> {
        exposure.validate()?;
        let params = self
            .registry
            .resolve(&exposure.jurisdiction, parameter_version)?;
        calculate_validated(exposure, &params)
    }
}

/// Calculate against a parameter snapshot the caller already holds.
pub fn calculate_with_parameters(
    exposure: &Exposure,
    params: &ParameterSet,
) -> CapitalResult<CalculationResult> {
    exposure.validate()?;
    calculate_validated(exposure, params)
}

fn calculate_validated(
    exposure: &Exposure,
    params: &ParameterSet,
) -> CapitalResult<CalculationResult> {
    let mut audit = AuditTrailBuilder::new();
    record_inputs(exposure, &mut audit);

    let classification = classifier::classify(exposure);
    audit.record(AuditEvent::Classified {
        requested: classification.requested,
        path: classification.path.clone(),
    });

    let key = params.key();
    audit.record(AuditEvent::ParametersResolved {
        key: key.clone(),
        regime: params.regime,
        effective_from: params.effective_from,
    });
    tracing::debug!(%key, path = ?classification.path, "classified exposure");

    let classification = classifier::restrict_for_parameters(classification, exposure, params);
    for notice in &classification.notices {
        tracing::warn!(
            requested = notice.requested.label(),
            effective = notice.effective.label(),
            reason = %notice.reason,
            "approach downgraded"
        );
        audit.record(AuditEvent::ApproachDowngraded {
            requested: notice.requested,
            effective: notice.effective,
            reason: notice.reason.clone(),
        });
    }

    let outcome = match &classification.path {
        CalculationPath::Unsupported { reason } => {
            tracing::warn!(class = exposure.exposure_class.label(), %reason, "unsupported path");
            audit.record(AuditEvent::EnginesSkipped {
                reason: reason.clone(),
            });
            CalculationOutcome::Unsupported {
                reason: reason.clone(),
            }
        }
        path @ (CalculationPath::Standardized
        | CalculationPath::FoundationIrb
        | CalculationPath::AdvancedIrb) => {
            CalculationOutcome::Computed(compute_figures(exposure, path, params, &mut audit)?)
        }
    };

    Ok(CalculationResult {
        exposure_id: exposure.exposure_id.clone(),
        exposure_class: exposure.exposure_class,
        requested_approach: exposure.requested_approach,
        effective_approach: classification.effective_approach(),
        notices: classification.notices,
        parameter_key: key,
        outcome,
        audit: audit.finish(),
    })
}

fn compute_figures(
    exposure: &Exposure,
    path: &CalculationPath,
    params: &ParameterSet,
    audit: &mut AuditTrailBuilder,
) -> CapitalResult<CapitalFigures> {
    let mut overrides = Vec::new();

    let sa = standardized::compute_standardized(exposure, params)?;
    audit.record(AuditEvent::StandardizedWeight {
        rule: sa.rule.clone(),
        risk_weight: sa.risk_weight,
        rwa: sa.rwa,
    });

    let (irb, floor) = match IrbVariant::from_path(path) {
        Some(variant) => {
            let irb = irb::compute_irb(exposure, variant, params, audit, &mut overrides)?;
            let floor = output_floor::apply_floor(irb.rwa, sa.rwa, params.output_floor_pct);
            audit.record(AuditEvent::OutputFloor {
                floor_pct: floor.floor_pct,
                floor_term: floor.floor_term,
                irb_rwa: floor.irb_rwa,
                final_rwa: floor.final_rwa,
                bound: floor.floor_bound,
            });
            if floor.floor_bound {
                overrides.push(AppliedOverride {
                    kind: OverrideKind::OutputFloor,
                    original: Some(floor.irb_rwa),
                    applied: floor.final_rwa,
                    reason: format!(
                        "{} output floor of {} × standardized RWA",
                        params.key(),
                        floor.floor_pct
                    ),
                });
            }
            (Some(irb), Some(floor))
        }
        None => (None, None),
    };

    let final_rwa = floor.as_ref().map_or(sa.rwa, |f| f.final_rwa);
    let capital_required = final_rwa * params.capital_ratio;
    audit.record(AuditEvent::CapitalRequirement {
        capital_ratio: params.capital_ratio,
        capital: capital_required,
    });
    tracing::info!(
        class = exposure.exposure_class.label(),
        %final_rwa,
        %capital_required,
        "capital calculated"
    );

    Ok(CapitalFigures {
        ead: exposure.ead(),
        standardized: sa,
        irb,
        output_floor: floor,
        final_rwa,
        capital_ratio: params.capital_ratio,
        capital_required,
        overrides,
    })
}

/// Every input the calculation consumes, in a stable order.
fn record_inputs(exposure: &Exposure, audit: &mut AuditTrailBuilder) {
    if let Some(id) = &exposure.exposure_id {
        audit.input("exposure_id", id);
    }
    audit
        .input("exposure_class", format!("{:?}", exposure.exposure_class))
        .input(
            "requested_approach",
            format!("{:?}", exposure.requested_approach),
        )
        .input("jurisdiction", &exposure.jurisdiction)
        .input("ead", exposure.ead())
        .input("maturity_years", exposure.maturity_years);
    if let Some(pd) = exposure.pd {
        audit.input("pd", pd);
    }
    if let Some(lgd) = exposure.lgd {
        audit.input("lgd", lgd);
    }
    if let Some(collateral) = exposure.collateral_type {
        audit.input("collateral_type", format!("{:?}", collateral));
    }
    audit
        .input("rating", exposure.rating.label())
        .input("seniority", format!("{:?}", exposure.seniority));
    if let Some(ltv) = exposure.ltv {
        audit.input("ltv", ltv);
    }
    if let Some(pv) = exposure.property_value {
        audit.input("property_value", pv);
    }
    if let Some(revenue) = exposure.annual_revenue {
        audit.input("annual_revenue", revenue);
    }
    if let Some(cp) = exposure.counterparty_class {
        audit.input("counterparty_class", format!("{:?}", cp));
    }
    if exposure.large_financial_institution {
        audit.input("large_financial_institution", true);
    }
    if exposure.income_producing {
        audit.input("income_producing", true);
    }
    if exposure.regulatory_retail {
        audit.input("regulatory_retail", true);
    }
    if exposure.prudent_mortgage {
        audit.input("prudent_mortgage", true);
    }
}

// ---------------------------------------------------------------------------
// Enveloped entry point
// ---------------------------------------------------------------------------

/// Request accepted by the CLI and bindings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapitalCalculationInput {
    pub exposure: Exposure,
    pub parameter_version: String,
    /// Extra parameter sets registered on top of the built-in ones
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_sets: Option<Vec<ParameterSet>>,
}

/// Calculate one exposure and wrap the result in the standard envelope.
pub fn calculate_capital(
    input: &CapitalCalculationInput,
) -> CapitalResult<ComputationOutput<CalculationResult>> {
    let start = Instant::now();

    let registry = build_registry(input.parameter_sets.as_deref())?;
    let result =
        CapitalCalculator::new(registry).calculate(&input.exposure, &input.parameter_version)?;

    let warnings = result_warnings(&result);
    let assumptions = serde_json::json!({
        "parameter_set": result.parameter_key.to_string(),
        "model": "Basel ASRF (99.9% confidence)",
        "ead_basis": "drawn balance",
        "output_floor": "IRB paths only; max(IRB RWA, floor % × standardized RWA)",
    });

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Basel II/III credit risk capital (Standardized / F-IRB / A-IRB)",
        &assumptions,
        warnings,
        elapsed,
        result,
    ))
}

/// Built-in sets plus any collaborator-supplied ones.
pub fn build_registry(extra: Option<&[ParameterSet]>) -> CapitalResult<ParameterRegistry> {
    match extra {
        Some(sets) if !sets.is_empty() => ParameterRegistry::builtin().with_sets(sets.to_vec()),
        _ => Ok(ParameterRegistry::builtin()),
    }
}

/// Human-readable notes on anything a reader of the numbers must know.
pub fn result_warnings(result: &CalculationResult) -> Vec<String> {
    let mut warnings = Vec::new();
    let label = result
        .exposure_id
        .as_deref()
        .map(|id| format!("Exposure '{}': ", id))
        .unwrap_or_default();

    if let Some(reason) = result.unsupported_reason() {
        warnings.push(format!("{}not calculated: {}.", label, reason));
    }
    for notice in &result.notices {
        warnings.push(format!(
            "{}{} requested, {} applied: {}.",
            label,
            notice.requested.label(),
            notice.effective.label(),
            notice.reason
        ));
    }
    if let Some(figures) = result.figures() {
        if figures.output_floor.as_ref().is_some_and(|f| f.floor_bound) {
            warnings.push(format!(
                "{}output floor is binding; final RWA exceeds IRB RWA.",
                label
            ));
        }
        if figures
            .overrides
            .iter()
            .any(|o| o.kind == OverrideKind::SupervisoryLgd)
        {
            warnings.push(format!(
                "{}bank-estimated LGD ignored under F-IRB.",
                label
            ));
        }
    }
    warnings
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
