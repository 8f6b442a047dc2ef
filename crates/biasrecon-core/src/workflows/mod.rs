//! # Workflows Module
//!
//! Top-level entry points: assembling a [`SamplingProject`](project::SamplingProject)
//! from PLUMED output files and reconstructing its bias.
//!
//! - **Project Assembly** ([`project`]) - Reads `COLVAR` and `HILLS`, attaches the bias
//!   parameters of a PLUMED input and dispatches reconstruction on the method.
//!
//! ```ignore
//! use biasrecon::workflows::project::load_project;
//!
//! let project = load_project(colvar, hills, Some("metad"), options)?;
//! let weights = project.weight_frames(None)?;
//! ```

pub mod project;
