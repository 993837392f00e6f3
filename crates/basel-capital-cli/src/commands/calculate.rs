use clap::Args;
use serde_json::Value;

use basel_capital_core::{calculate_capital, CapitalCalculationInput, Exposure, Jurisdiction};

use crate::input;

/// Arguments for a single-exposure capital calculation
#[derive(Args)]
pub struct CalculateArgs {
    /// Path to JSON input: a bare exposure or `{ exposure, parameter_version }`
    #[arg(long)]
    pub input: Option<String>,

    /// Parameter set version, e.g. basel3-final or osfi-car-2024
    #[arg(long = "parameter-version", short = 'p')]
    pub parameter_version: Option<String>,

    /// Override the exposure's jurisdiction code (BCBS, US, CAN, EU, ...)
    #[arg(long)]
    pub jurisdiction: Option<String>,

    /// Extra parameter set files (JSON or YAML); repeatable
    #[arg(long = "parameters")]
    pub parameters: Vec<String>,
}

pub fn run_calculate(args: CalculateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let data = input::stdin::read_input(args.input.as_deref(), "capital calculation")?;
    let mut calc_input = parse_input(data, args.parameter_version.as_deref())?;

    if let Some(code) = &args.jurisdiction {
        calc_input.exposure.jurisdiction = Jurisdiction::from_code(code);
    }
    if !args.parameters.is_empty() {
        let extra = input::file::read_all_parameter_sets(&args.parameters)?;
        calc_input
            .parameter_sets
            .get_or_insert_with(Vec::new)
            .extend(extra);
    }

    let result = calculate_capital(&calc_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Accept either the full request envelope or a bare exposure; a version
/// given on the command line wins over one in the file.
fn parse_input(
    data: Value,
    cli_version: Option<&str>,
) -> Result<CapitalCalculationInput, Box<dyn std::error::Error>> {
    if data.get("exposure").is_some() {
        let mut calc_input: CapitalCalculationInput = serde_json::from_value(data)?;
        if let Some(version) = cli_version {
            calc_input.parameter_version = version.to_string();
        }
        return Ok(calc_input);
    }

    let exposure: Exposure = serde_json::from_value(data)?;
    let parameter_version = cli_version
        .ok_or("--parameter-version is required when the input is a bare exposure")?
        .to_string();
    Ok(CapitalCalculationInput {
        exposure,
        parameter_version,
        parameter_sets: None,
    })
}
