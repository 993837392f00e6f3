use clap::Args;
use serde_json::Value;

use basel_capital_core::{calculate_portfolio, Exposure, Jurisdiction, PortfolioInput};

use crate::input;

/// Arguments for a portfolio batch calculation
#[derive(Args)]
pub struct PortfolioArgs {
    /// Path to JSON input: an array of exposures or `{ exposures, parameter_version }`
    #[arg(long)]
    pub input: Option<String>,

    /// Parameter set version applied to every exposure
    #[arg(long = "parameter-version", short = 'p')]
    pub parameter_version: Option<String>,

    /// Override every exposure's jurisdiction code
    #[arg(long)]
    pub jurisdiction: Option<String>,

    /// Extra parameter set files (JSON or YAML); repeatable
    #[arg(long = "parameters")]
    pub parameters: Vec<String>,
}

pub fn run_portfolio(args: PortfolioArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let data = input::stdin::read_input(args.input.as_deref(), "portfolio calculation")?;

    let mut portfolio: PortfolioInput = match data {
        Value::Array(_) => {
            let exposures: Vec<Exposure> = serde_json::from_value(data)?;
            let parameter_version = args
                .parameter_version
                .clone()
                .ok_or("--parameter-version is required when the input is a bare exposure list")?;
            PortfolioInput {
                exposures,
                parameter_version,
                parameter_sets: None,
            }
        }
        other => serde_json::from_value(other)?,
    };

    if let Some(version) = args.parameter_version {
        portfolio.parameter_version = version;
    }
    if let Some(code) = &args.jurisdiction {
        let jurisdiction = Jurisdiction::from_code(code);
        for exposure in &mut portfolio.exposures {
            exposure.jurisdiction = jurisdiction.clone();
        }
    }
    if !args.parameters.is_empty() {
        let extra = input::file::read_all_parameter_sets(&args.parameters)?;
        portfolio
            .parameter_sets
            .get_or_insert_with(Vec::new)
            .extend(extra);
    }

    let result = calculate_portfolio(&portfolio)?;
    Ok(serde_json::to_value(result)?)
}
