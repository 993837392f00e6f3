use napi::Result as NapiResult;
use napi_derive::napi;

use basel_capital_core::calculator::build_registry;
use basel_capital_core::parameters::ParameterSet;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Capital
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_capital(input_json: String) -> NapiResult<String> {
    let input: basel_capital_core::CapitalCalculationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = basel_capital_core::calculate_capital(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn calculate_portfolio(input_json: String) -> NapiResult<String> {
    let input: basel_capital_core::PortfolioInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = basel_capital_core::calculate_portfolio(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Summaries of the built-in sets plus any sets passed as a JSON array.
#[napi]
pub fn list_parameter_sets(extra_sets_json: Option<String>) -> NapiResult<String> {
    let extra: Vec<ParameterSet> = match extra_sets_json {
        Some(json) => serde_json::from_str(&json).map_err(to_napi_error)?,
        None => Vec::new(),
    };
    let registry = build_registry(Some(&extra)).map_err(to_napi_error)?;
    serde_json::to_string(&registry.summaries()).map_err(to_napi_error)
}

