//! # Models Module
//!
//! Data structures shared by the ingestion, parsing and reconstruction layers.
//!
//! - [`table`] - Time-indexed tables of named columns (`COLVAR`, `HILLS`)
//! - [`grid`] - Per-CV grid parameters and the registry of biased CVs
//! - [`hills`] - Deposited hill records read back from a hills table

pub mod grid;
pub mod hills;
pub mod table;
