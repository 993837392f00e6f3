mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::calculate::CalculateArgs;
use commands::parameters::ParametersArgs;
use commands::portfolio::PortfolioArgs;

/// Basel II/III credit risk capital calculations
#[derive(Parser)]
#[command(
    name = "bcap",
    version,
    about = "Basel II/III credit risk capital and RWA calculations",
    long_about = "Computes regulatory capital and risk-weighted assets for credit exposures \
                  under the Standardized, Foundation IRB and Advanced IRB approaches, with \
                  jurisdiction-versioned parameter sets, PD/LGD/output floors and a full \
                  audit trail of every rule applied."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log every calculation step to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate capital for a single exposure
    Calculate(CalculateArgs),
    /// Calculate capital for a list of exposures under one parameter version
    Portfolio(PortfolioArgs),
    /// List or show regulatory parameter sets
    Parameters(ParametersArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Calculate(args) => commands::calculate::run_calculate(args),
        Commands::Portfolio(args) => commands::portfolio::run_portfolio(args),
        Commands::Parameters(args) => commands::parameters::run_parameters(args),
        Commands::Version => {
            println!("bcap {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
