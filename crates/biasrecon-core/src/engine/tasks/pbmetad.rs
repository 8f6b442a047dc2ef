use super::{bias_axis, colvar_column};
use crate::core::bias::surface::{StaticBias, accumulate_bias_nd};
use crate::core::models::hills::extract_hills;
use crate::engine::error::EngineError;
use crate::engine::method::{BiasReconstruction, ReconstructionInputs};
use tracing::{info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// One 1-D bias per CV, each summed from that CV's own hills table.
#[derive(Debug, Clone, Copy, Default)]
pub struct PbMetadReconstruction;

/// Parallel-bias potential `-kT ln sum_i exp(-V_i / kT)` of one frame.
pub fn combined_bias(values: &[f64], kt: f64) -> f64 {
    let scaled: Vec<f64> = values.iter().map(|v| -v / kt).collect();
    let max = scaled.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return -kt * max;
    }
    let sum: f64 = scaled.iter().map(|x| (x - max).exp()).sum();
    -kt * (max + sum.ln())
}

impl BiasReconstruction for PbMetadReconstruction {
    #[instrument(skip_all, name = "pbmetad_reconstruction")]
    fn reconstruct(&self, inputs: &ReconstructionInputs<'_>) -> Result<Vec<StaticBias>, EngineError> {
        let cvs: Vec<&str> = inputs.registry.cv_names().collect();
        if cvs.is_empty() {
            return Err(EngineError::MissingBiasParameters);
        }

        #[cfg(not(feature = "parallel"))]
        let iterator = cvs.iter();

        #[cfg(feature = "parallel")]
        let iterator = cvs.par_iter();

        let biases = iterator
            .map(|&cv| -> Result<StaticBias, EngineError> {
                let table = inputs
                    .hills
                    .for_cv(cv)
                    .ok_or_else(|| EngineError::MissingHills(cv.to_string()))?;
                let hills = extract_hills(table, &[cv])?;
                let axis = bias_axis(cv, inputs)?;
                Ok(accumulate_bias_nd(vec![axis], &hills)?)
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            biases = biases.len(),
            hills_files = inputs.hills.file_count(),
            "PBMetaD biases reconstructed."
        );
        Ok(biases)
    }

    /// `w = exp(V_PB(s) / kT)` where `V_PB` combines the per-CV biases.
    /// Frames with a non-finite CV value get a NaN weight.
    fn frame_weights(
        &self,
        inputs: &ReconstructionInputs<'_>,
        biases: &[StaticBias],
        kt: f64,
    ) -> Result<Vec<f64>, EngineError> {
        if biases.is_empty() {
            return Err(EngineError::MissingBiasParameters);
        }
        let columns = biases
            .iter()
            .map(|bias| {
                let name = bias
                    .axes()
                    .first()
                    .map(|axis| axis.name.as_str())
                    .unwrap_or_default();
                colvar_column(inputs.colvar, name)
            })
            .collect::<Result<Vec<_>, _>>()?;

        #[cfg(not(feature = "parallel"))]
        let rows = 0..inputs.colvar.len();

        #[cfg(feature = "parallel")]
        let rows = (0..inputs.colvar.len()).into_par_iter();

        Ok(rows
            .map(|row| {
                biases
                    .iter()
                    .zip(&columns)
                    .map(|(bias, col)| bias.value_at(&[col[row]]))
                    .collect::<Option<Vec<f64>>>()
                    .map_or(f64::NAN, |values| (combined_bias(&values, kt) / kt).exp())
            })
            .collect())
    }
}
