use crate::core::bias::surface::StaticBias;
use crate::core::input::arguments::BiasArguments;
use crate::core::input::parser::parse_bias;
use crate::core::io::colvar::read_colvar;
use crate::core::io::hills::{HillsTables, read_hills};
use crate::core::models::grid::BiasedCvRegistry;
use crate::core::models::table::TimeSeriesTable;
use crate::engine::config::ProjectOptions;
use crate::engine::error::EngineError;
use crate::engine::method::{BOLTZMANN_KJ_MOL_K, Method, ReconstructionInputs};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{info, instrument};

/// Output of a PLUMED run, with the bias parameters it was run with once attached.
#[derive(Debug, Clone)]
pub struct SamplingProject {
    method: Option<Method>,
    colvar: TimeSeriesTable,
    hills: HillsTables,
    bias_params: Option<BiasArguments>,
    biased_cvs: BiasedCvRegistry,
    input_temperature: Option<f64>,
    temperature_override: Option<f64>,
}

/// Assembles a project from a `COLVAR` file and every file starting with `hills`.
///
/// `method` is matched case-insensitively against the supported methods before
/// any file is read; `None` assembles a base project without a reconstruction
/// strategy.
///
/// # Errors
///
/// Returns [`EngineError::UnsupportedMethod`] for an unknown method name, and
/// propagates every ingestion and parsing error unchanged.
pub fn load_project(
    colvar: &Path,
    hills: &Path,
    method: Option<&str>,
    options: ProjectOptions,
) -> Result<SamplingProject, EngineError> {
    let method = method.map(str::parse::<Method>).transpose()?;
    SamplingProject::new(colvar, hills, method, &options)
}

impl SamplingProject {
    #[instrument(skip_all, name = "load_project")]
    pub fn new(
        colvar: &Path,
        hills: &Path,
        method: Option<Method>,
        options: &ProjectOptions,
    ) -> Result<Self, EngineError> {
        options.validate()?;
        info!(method = ?method, "Assembling sampling project.");

        let colvar_table = read_colvar(colvar, options.multi, options.unbiased)?;
        let hills = read_hills(hills)?;
        info!(
            frames = colvar_table.len(),
            hills_files = hills.file_count(),
            "Simulation output loaded."
        );

        let mut project = Self {
            method,
            colvar: colvar_table,
            hills,
            bias_params: None,
            biased_cvs: BiasedCvRegistry::default(),
            input_temperature: None,
            temperature_override: options.temperature,
        };

        if let Some(input) = &options.input_file {
            project.attach_bias_params(input, options.bias_type.as_deref())?;
        }
        Ok(project)
    }

    /// Parses the bias section of a PLUMED input and replaces the project's bias
    /// parameters, biased-CV registry and input temperature.
    ///
    /// `bias_type` defaults to the section marker of the project's method. On
    /// error the project is left unchanged.
    pub fn attach_bias_params(
        &mut self,
        input: &Path,
        bias_type: Option<&str>,
    ) -> Result<(), EngineError> {
        let bias_type = bias_type.or(self.method.map(Method::section_marker));
        let args = parse_bias(Some(input), bias_type)?;
        let registry = BiasedCvRegistry::from_arguments(&args)?;
        let temperature = args.temperature()?;

        info!(
            biased_cvs = registry.len(),
            periodic_cvs = registry.periodic().len(),
            "Bias parameters attached from {:?}.",
            input
        );
        self.bias_params = Some(args);
        self.biased_cvs = registry;
        self.input_temperature = temperature;
        Ok(())
    }

    pub fn method(&self) -> Option<Method> {
        self.method
    }

    pub fn colvar(&self) -> &TimeSeriesTable {
        &self.colvar
    }

    pub fn hills(&self) -> &HillsTables {
        &self.hills
    }

    pub fn bias_params(&self) -> Option<&BiasArguments> {
        self.bias_params.as_ref()
    }

    pub fn biased_cvs(&self) -> &BiasedCvRegistry {
        &self.biased_cvs
    }

    pub fn periodic_cvs(&self) -> &BTreeSet<String> {
        self.biased_cvs.periodic()
    }

    /// Temperature in K: the configured override, else `TEMP` from the input.
    pub fn temperature(&self) -> Option<f64> {
        self.temperature_override.or(self.input_temperature)
    }

    /// `BIASFACTOR` of a well-tempered run, if present in the bias parameters.
    pub fn bias_factor(&self) -> Result<Option<f64>, EngineError> {
        match &self.bias_params {
            Some(args) => Ok(args.bias_factor()?),
            None => Ok(None),
        }
    }

    fn inputs(&self) -> Result<ReconstructionInputs<'_>, EngineError> {
        let arguments = self
            .bias_params
            .as_ref()
            .ok_or(EngineError::MissingBiasParameters)?;
        Ok(ReconstructionInputs {
            colvar: &self.colvar,
            hills: &self.hills,
            arguments,
            registry: &self.biased_cvs,
        })
    }

    /// Static bias surfaces summed from the hills; recomputed on every call.
    #[instrument(skip_all, name = "reconstruct_bias")]
    pub fn reconstruct_bias(&self) -> Result<Vec<StaticBias>, EngineError> {
        let method = self.method.ok_or(EngineError::MethodRequired)?;
        let inputs = self.inputs()?;
        method.reconstruction().reconstruct(&inputs)
    }

    /// Free-energy estimate of every reconstructed surface.
    pub fn free_energy(&self) -> Result<Vec<Vec<f64>>, EngineError> {
        let bias_factor = self.bias_factor()?;
        Ok(self
            .reconstruct_bias()?
            .iter()
            .map(|bias| bias.free_energy(bias_factor))
            .collect())
    }

    /// Unnormalized weight of every `COLVAR` frame under the static bias.
    ///
    /// `temperature` takes precedence over [`temperature`](Self::temperature).
    #[instrument(skip_all, name = "weight_frames")]
    pub fn weight_frames(&self, temperature: Option<f64>) -> Result<Vec<f64>, EngineError> {
        let method = self.method.ok_or(EngineError::MethodRequired)?;
        let temperature = temperature
            .or(self.temperature())
            .ok_or(EngineError::MissingTemperature)?;
        if !(temperature.is_finite() && temperature > 0.0) {
            return Err(EngineError::InvalidTemperature(temperature));
        }
        let kt = BOLTZMANN_KJ_MOL_K * temperature;

        let inputs = self.inputs()?;
        let strategy = method.reconstruction();
        let biases = strategy.reconstruct(&inputs)?;
        let weights = strategy.frame_weights(&inputs, &biases, kt)?;
        info!(frames = weights.len(), kt, "Frames reweighted.");
        Ok(weights)
    }
}
