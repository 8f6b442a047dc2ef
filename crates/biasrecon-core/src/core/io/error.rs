use super::colvar::ColvarError;
use crate::core::models::table::SchemaError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while ingesting one or more PLUMED output files.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("Failed to read '{}': {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: ColvarError,
    },

    #[error(
        "Replica '{}' cannot be combined with the previous ones: {source}",
        .path.display()
    )]
    Replica {
        path: PathBuf,
        #[source]
        source: SchemaError,
    },

    #[error("Inconsistent table: {0}")]
    Schema(#[from] SchemaError),

    #[error("No files match '{pattern}'")]
    NoMatchingFiles { pattern: String },

    #[error("Invalid file pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Failed to list matching files: {0}")]
    Glob(#[from] glob::GlobError),

    #[error("Table '{}' has no data columns", .path.display())]
    NoColumns { path: PathBuf },
}
