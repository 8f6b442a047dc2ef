//! # Core Module
//!
//! Fundamental building blocks for bias reconstruction.
//!
//! - **Tabular Ingestion** ([`io`]) - PLUMED `COLVAR`/`HILLS` readers and replica concatenation
//! - **Configuration Parsing** ([`input`]) - Extraction of bias arguments from a PLUMED input
//! - **Data Models** ([`models`]) - Time series tables, grid parameters and hill records
//! - **Hill Summation** ([`bias`]) - Gaussian kernels and accumulated bias surfaces

pub mod bias;
pub mod input;
pub mod io;
pub mod models;
