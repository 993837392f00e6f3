pub mod audit;
pub mod calculator;
pub mod classifier;
pub mod error;
pub mod exposure;
pub mod irb;
pub mod math;
pub mod output_floor;
pub mod parameters;
pub mod portfolio;
pub mod standardized;
pub mod types;

pub use calculator::{
    calculate_capital, calculate_with_parameters, CalculationOutcome, CalculationResult,
    CapitalCalculationInput, CapitalCalculator, CapitalFigures,
};
pub use error::CapitalError;
pub use exposure::{Approach, Exposure, ExposureClass};
pub use parameters::{ParameterKey, ParameterRegistry, ParameterSet};
pub use portfolio::{calculate_portfolio, PortfolioInput, PortfolioOutput};
pub use types::*;

/// Standard result type for all capital operations
pub type CapitalResult<T> = Result<T, CapitalError>;
