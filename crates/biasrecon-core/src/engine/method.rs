use super::error::EngineError;
use super::tasks::{metad::MetadReconstruction, pbmetad::PbMetadReconstruction};
use crate::core::bias::surface::StaticBias;
use crate::core::input::arguments::BiasArguments;
use crate::core::io::hills::HillsTables;
use crate::core::models::grid::BiasedCvRegistry;
use crate::core::models::table::TimeSeriesTable;
use phf::{Map, phf_map};
use std::fmt;
use std::str::FromStr;

/// Boltzmann constant in kJ/(mol K), the PLUMED default energy unit.
pub const BOLTZMANN_KJ_MOL_K: f64 = 0.0083144621;

static METHOD_NAMES: Map<&'static str, Method> = phf_map! {
    "metad" => Method::MetaD,
    "pbmetad" => Method::PbMetaD,
};

/// Enhanced-sampling method a project was run with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Standard (possibly multi-dimensional, possibly well-tempered) metadynamics.
    MetaD,
    /// Parallel-bias metadynamics: one 1-D bias per collective variable.
    PbMetaD,
}

impl Method {
    pub const ALL: [Method; 2] = [Method::MetaD, Method::PbMetaD];

    /// Name of the PLUMED action holding this method's bias parameters.
    pub fn section_marker(self) -> &'static str {
        match self {
            Method::MetaD => "METAD",
            Method::PbMetaD => "PBMETAD",
        }
    }

    pub fn reconstruction(self) -> &'static dyn BiasReconstruction {
        match self {
            Method::MetaD => &MetadReconstruction,
            Method::PbMetaD => &PbMetadReconstruction,
        }
    }
}

impl FromStr for Method {
    type Err = EngineError;

    /// Case-insensitive; anything but `metad` or `pbmetad` is unsupported.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        METHOD_NAMES
            .get(s.to_ascii_lowercase().as_str())
            .copied()
            .ok_or_else(|| EngineError::UnsupportedMethod(s.to_string()))
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::MetaD => write!(f, "MetaD"),
            Method::PbMetaD => write!(f, "PBMetaD"),
        }
    }
}

/// Everything a reconstruction strategy reads from a loaded project.
#[derive(Debug, Clone, Copy)]
pub struct ReconstructionInputs<'a> {
    pub colvar: &'a TimeSeriesTable,
    pub hills: &'a HillsTables,
    pub arguments: &'a BiasArguments,
    pub registry: &'a BiasedCvRegistry,
}

/// Method-specific reconstruction of the static bias and frame weights.
pub trait BiasReconstruction: Sync {
    /// Static bias surfaces of the run, one per independent bias.
    fn reconstruct(&self, inputs: &ReconstructionInputs<'_>) -> Result<Vec<StaticBias>, EngineError>;

    /// Unnormalized weight of every `COLVAR` frame under the static `biases`.
    fn frame_weights(
        &self,
        inputs: &ReconstructionInputs<'_>,
        biases: &[StaticBias],
        kt: f64,
    ) -> Result<Vec<f64>, EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_names_parse_case_insensitively() {
        assert_eq!("metad".parse::<Method>().unwrap(), Method::MetaD);
        assert_eq!("MetaD".parse::<Method>().unwrap(), Method::MetaD);
        assert_eq!("PBMETAD".parse::<Method>().unwrap(), Method::PbMetaD);
    }

    #[test]
    fn unknown_method_is_reported_by_name() {
        let err = "bogus".parse::<Method>().unwrap_err();
        assert!(matches!(&err, EngineError::UnsupportedMethod(name) if name == "bogus"));
        assert!(err.to_string().contains("\"bogus\""));
    }

    #[test]
    fn section_markers_match_plumed_actions() {
        assert_eq!(Method::MetaD.section_marker(), "METAD");
        assert_eq!(Method::PbMetaD.section_marker(), "PBMETAD");
        for method in Method::ALL {
            assert_eq!(
                method.section_marker().parse::<Method>().unwrap(),
                method
            );
        }
    }
}
