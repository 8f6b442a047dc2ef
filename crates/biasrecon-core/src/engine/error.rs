use thiserror::Error;

use super::config::ConfigError;
use crate::core::bias::kernels::KernelError;
use crate::core::input::parser::BiasInputError;
use crate::core::io::error::TableError;
use crate::core::models::grid::GridError;
use crate::core::models::hills::HillError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Sorry, the \"{0}\" method is not yet supported")]
    UnsupportedMethod(String),

    #[error("Invalid project options: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to read simulation output: {0}")]
    Table(#[from] TableError),

    #[error("Failed to parse bias input: {0}")]
    Input(#[from] BiasInputError),

    #[error("Invalid bias parameters: {0}")]
    Grid(#[from] GridError),

    #[error("Invalid hills data: {0}")]
    Hill(#[from] HillError),

    #[error("Hill summation failed: {0}")]
    Kernel(#[from] KernelError),

    #[error("Project has no enhanced-sampling method; bias reconstruction is unavailable")]
    MethodRequired,

    #[error("No bias parameters attached; supply a PLUMED input file")]
    MissingBiasParameters,

    #[error("No hills found for collective variable '{0}'")]
    MissingHills(String),

    #[error("COLVAR has no column for collective variable '{0}'")]
    MissingColumn(String),

    #[error("A temperature is required for reweighting (set TEMP in the input or pass one)")]
    MissingTemperature,

    #[error("Temperature must be positive and finite, got {0}")]
    InvalidTemperature(f64),
}
