use super::{bias_axis, colvar_column};
use crate::core::bias::surface::{StaticBias, accumulate_bias_nd};
use crate::core::models::hills::extract_hills;
use crate::engine::error::EngineError;
use crate::engine::method::{BiasReconstruction, ReconstructionInputs};
use tracing::{debug, info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A single bias over every CV in `ARG`, summed from one hills table.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadReconstruction;

impl BiasReconstruction for MetadReconstruction {
    #[instrument(skip_all, name = "metad_reconstruction")]
    fn reconstruct(&self, inputs: &ReconstructionInputs<'_>) -> Result<Vec<StaticBias>, EngineError> {
        let cvs: Vec<&str> = inputs.registry.cv_names().collect();
        let first = *cvs.first().ok_or(EngineError::MissingBiasParameters)?;

        let table = inputs
            .hills
            .for_cv(first)
            .ok_or_else(|| EngineError::MissingHills(first.to_string()))?;
        let hills = extract_hills(table, &cvs)?;

        let axes = cvs
            .iter()
            .map(|cv| bias_axis(cv, inputs))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(
            "Grid shape: {:?}",
            axes.iter().map(|a| a.points.len()).collect::<Vec<_>>()
        );

        let bias = accumulate_bias_nd(axes, &hills)?;
        info!(
            dims = bias.dims(),
            hills = hills.len(),
            grid_points = bias.values().len(),
            "MetaD bias reconstructed."
        );
        Ok(vec![bias])
    }

    /// `w = exp(V(s) / kT)` with `V` interpolated at each frame's CV values.
    /// Frames with a non-finite CV value get a NaN weight.
    fn frame_weights(
        &self,
        inputs: &ReconstructionInputs<'_>,
        biases: &[StaticBias],
        kt: f64,
    ) -> Result<Vec<f64>, EngineError> {
        let bias = biases.first().ok_or(EngineError::MissingBiasParameters)?;
        let columns = bias
            .axes()
            .iter()
            .map(|axis| colvar_column(inputs.colvar, &axis.name))
            .collect::<Result<Vec<_>, _>>()?;

        #[cfg(not(feature = "parallel"))]
        let rows = 0..inputs.colvar.len();

        #[cfg(feature = "parallel")]
        let rows = (0..inputs.colvar.len()).into_par_iter();

        Ok(rows
            .map(|row| {
                let point: Vec<f64> = columns.iter().map(|col| col[row]).collect();
                bias.value_at(&point).map_or(f64::NAN, |v| (v / kt).exp())
            })
            .collect())
    }
}
