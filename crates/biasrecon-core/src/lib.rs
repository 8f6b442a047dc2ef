//! # biasrecon Core Library
//!
//! Reconstruction of the static bias potential deposited during a metadynamics run,
//! starting from the PLUMED `COLVAR`/`HILLS` output and the PLUMED input file.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`TimeSeriesTable`, `GridParameters`),
//!   the PLUMED input tokenizer, the Gaussian hill kernels and the tabular readers.
//!
//! - **[`engine`]: The Logic Core.** Project options, the closed set of supported
//!   enhanced-sampling methods together with their reconstruction strategies, and the
//!   error type surfaced to callers.
//!
//! - **[`workflows`]: The Public API.** Assembles a [`workflows::project::SamplingProject`]
//!   from file paths and dispatches on the method name.

pub mod core;
pub mod engine;
pub mod workflows;
