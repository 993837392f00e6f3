pub mod calculate;
pub mod parameters;
pub mod portfolio;
