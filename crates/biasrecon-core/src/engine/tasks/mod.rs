//! Per-method bias reconstruction and frame reweighting.
//!
//! Each submodule implements [`BiasReconstruction`](super::method::BiasReconstruction)
//! for one enhanced-sampling method.

pub mod metad;
pub mod pbmetad;

use super::error::EngineError;
use super::method::ReconstructionInputs;
use crate::core::bias::surface::BiasAxis;
use crate::core::models::grid::GridError;
use crate::core::models::table::TimeSeriesTable;

/// Evaluation axis of a biased CV, from its registered grid parameters.
pub(crate) fn bias_axis(cv: &str, inputs: &ReconstructionInputs<'_>) -> Result<BiasAxis, EngineError> {
    let params = inputs
        .registry
        .get(cv)
        .ok_or_else(|| GridError::UnknownCv(cv.to_string()))?;
    Ok(BiasAxis {
        name: cv.to_string(),
        points: inputs.registry.grid_points(cv, inputs.arguments)?,
        sigma: params.sigma,
        periodic: inputs.registry.is_periodic(cv),
    })
}

pub(crate) fn colvar_column<'a>(colvar: &'a TimeSeriesTable, cv: &str) -> Result<&'a [f64], EngineError> {
    colvar
        .column(cv)
        .ok_or_else(|| EngineError::MissingColumn(cv.to_string()))
}
