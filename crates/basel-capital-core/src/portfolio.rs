//! Batch calculation of a list of exposures under one parameter version.

use std::time::Instant;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculator::{build_registry, result_warnings, CalculationResult, CapitalCalculator};
use crate::error::CapitalError;
use crate::exposure::Exposure;
use crate::parameters::ParameterSet;
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::CapitalResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioInput {
    pub exposures: Vec<Exposure>,
    pub parameter_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_sets: Option<Vec<ParameterSet>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioTotals {
    pub exposure_count: usize,
    pub computed_count: usize,
    pub unsupported_count: usize,
    pub downgraded_count: usize,
    pub floor_binding_count: usize,
    /// EAD of computed exposures
    pub total_ead: Money,
    pub total_standardized_rwa: Money,
    /// IRB RWA of exposures on an IRB path
    pub total_irb_rwa: Money,
    pub total_final_rwa: Money,
    pub total_capital_required: Money,
    pub total_expected_loss: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioOutput {
    pub results: Vec<CalculationResult>,
    pub totals: PortfolioTotals,
}

/// Calculate every exposure. The first failing exposure aborts the batch;
/// its index is prefixed to the error's field path.
pub fn calculate_portfolio(
    input: &PortfolioInput,
) -> CapitalResult<ComputationOutput<PortfolioOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.exposures.is_empty() {
        warnings.push("Portfolio contains no exposures; all totals are zero.".into());
    }

    let registry = build_registry(input.parameter_sets.as_deref())?;
    let calculator = CapitalCalculator::new(registry);

    let mut results = Vec::with_capacity(input.exposures.len());
    for (index, exposure) in input.exposures.iter().enumerate() {
        let result = calculator
            .calculate(exposure, &input.parameter_version)
            .map_err(|e| at_index(index, e))?;
        warnings.extend(result_warnings(&result));
        results.push(result);
    }

    let totals = aggregate(&results);
    tracing::info!(
        exposures = totals.exposure_count,
        unsupported = totals.unsupported_count,
        total_final_rwa = %totals.total_final_rwa,
        "portfolio calculated"
    );

    let assumptions = serde_json::json!({
        "parameter_version": input.parameter_version,
        "aggregation": "simple sum of per-exposure results; unsupported exposures excluded",
    });
    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Basel II/III credit risk capital, portfolio batch",
        &assumptions,
        warnings,
        elapsed,
        PortfolioOutput { results, totals },
    ))
}

/// Sum per-exposure figures. Unsupported exposures add to the count only.
pub fn aggregate(results: &[CalculationResult]) -> PortfolioTotals {
    let mut totals = PortfolioTotals {
        exposure_count: results.len(),
        ..PortfolioTotals::default()
    };
    for result in results {
        if result.was_downgraded() {
            totals.downgraded_count += 1;
        }
        let Some(figures) = result.figures() else {
            totals.unsupported_count += 1;
            continue;
        };
        totals.computed_count += 1;
        totals.total_ead += figures.ead;
        totals.total_standardized_rwa += figures.standardized.rwa;
        totals.total_irb_rwa += figures.irb_rwa().unwrap_or(Decimal::ZERO);
        totals.total_final_rwa += figures.final_rwa;
        totals.total_capital_required += figures.capital_required;
        totals.total_expected_loss += figures
            .irb
            .as_ref()
            .map_or(Decimal::ZERO, |irb| irb.expected_loss);
        if figures.output_floor.as_ref().is_some_and(|f| f.floor_bound) {
            totals.floor_binding_count += 1;
        }
    }
    totals
}

fn at_index(index: usize, error: CapitalError) -> CapitalError {
    match error {
        CapitalError::InvalidInput { field, reason } => CapitalError::InvalidInput {
            field: format!("exposures[{}].{}", index, field),
            reason,
        },
        CapitalError::ParameterResolution {
            jurisdiction,
            version,
            reason,
        } => CapitalError::ParameterResolution {
            jurisdiction,
            version,
            reason: format!("exposures[{}]: {}", index, reason),
        },
        other @ (CapitalError::InvalidParameterSet { .. } | CapitalError::SerializationError(_)) => {
            other
        }
    }
}
