use clap::{Args, Subcommand};
use serde_json::Value;

use basel_capital_core::calculator::build_registry;
use basel_capital_core::Jurisdiction;

use crate::input;

/// Arguments for parameter set inspection
#[derive(Args)]
pub struct ParametersArgs {
    #[command(subcommand)]
    pub action: ParametersAction,

    /// Extra parameter set files (JSON or YAML) to include; repeatable
    #[arg(long = "parameters", global = true)]
    pub parameters: Vec<String>,
}

#[derive(Subcommand)]
pub enum ParametersAction {
    /// List every registered (jurisdiction, version) pair
    List,
    /// Print one parameter set in full
    Show {
        /// Jurisdiction code
        #[arg(long)]
        jurisdiction: String,
        /// Parameter set version
        #[arg(long = "parameter-version", short = 'p')]
        parameter_version: String,
    },
}

pub fn run_parameters(args: ParametersArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let extra = input::file::read_all_parameter_sets(&args.parameters)?;
    let registry = build_registry(Some(&extra))?;

    match args.action {
        ParametersAction::List => Ok(serde_json::to_value(registry.summaries())?),
        ParametersAction::Show {
            jurisdiction,
            parameter_version,
        } => {
            let set = registry.resolve(&Jurisdiction::from_code(&jurisdiction), &parameter_version)?;
            Ok(serde_json::to_value(set.as_ref())?)
        }
    }
}
