//! Provides input functionality for PLUMED output files.
//!
//! `COLVAR` and `HILLS` files share one layout: a `#! FIELDS` header naming the
//! columns, then whitespace-delimited numeric rows. This module reads them into
//! [`crate::core::models::table::TimeSeriesTable`]s, concatenates multi-replica
//! runs and gathers hills files sharing a common prefix.

pub mod colvar;
pub mod error;
pub mod hills;
pub mod traits;
