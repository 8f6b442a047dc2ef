//! # Engine Module
//!
//! Method selection and the reconstruction strategies built on top of the core layer.
//!
//! - **Configuration** ([`config`]) - Project options, their builder and TOML loading
//! - **Methods** ([`method`]) - Supported enhanced-sampling methods and the
//!   [`BiasReconstruction`](method::BiasReconstruction) seam each one implements
//! - **Error Handling** ([`error`]) - Engine-level errors wrapping every lower layer
//!
//! With the `parallel` feature, per-CV reconstruction and per-frame reweighting run on
//! the rayon thread pool.

pub mod config;
pub mod error;
pub mod method;
pub(crate) mod tasks;
