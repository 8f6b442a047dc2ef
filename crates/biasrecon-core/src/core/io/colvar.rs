use super::error::TableError;
use super::traits::TabularFile;
use crate::core::models::table::{SchemaError, TimeSeriesTable};
use std::ffi::OsString;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub const WEIGHT_COLUMN: &str = "weight";

/// Number of leading header tokens (`#!` and `FIELDS`) before the column names.
const HEADER_PREFIX_TOKENS: usize = 2;

#[derive(Debug, Error)]
pub enum ColvarError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: ColvarParseErrorKind,
    },
    #[error("Missing or malformed header line (expected '#! FIELDS <index> <columns...>')")]
    MissingHeader,
    #[error("Inconsistent table: {0}")]
    Schema(#[from] SchemaError),
}

#[derive(Debug, Error, PartialEq)]
pub enum ColvarParseErrorKind {
    #[error("Invalid float in field {field} (value: '{value}')")]
    InvalidFloat { field: usize, value: String },
    #[error("Expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },
}

/// Reader for PLUMED `COLVAR`-style files: a `#! FIELDS` header followed by
/// whitespace-delimited numeric rows. The first field becomes the time index.
pub struct ColvarFile;

impl TabularFile for ColvarFile {
    type Error = ColvarError;

    fn read_from(reader: &mut impl BufRead) -> Result<TimeSeriesTable, Self::Error> {
        let mut lines = reader.lines();

        let header = lines.next().transpose()?.ok_or(ColvarError::MissingHeader)?;
        if !header.trim_start().starts_with('#') {
            return Err(ColvarError::MissingHeader);
        }
        let fields: Vec<String> = header
            .split_whitespace()
            .skip(HEADER_PREFIX_TOKENS)
            .map(str::to_string)
            .collect();
        if fields.is_empty() {
            return Err(ColvarError::MissingHeader);
        }

        let mut index = Vec::new();
        let mut columns: Vec<Vec<f64>> = vec![Vec::new(); fields.len() - 1];

        for (line_num, line_res) in lines.enumerate() {
            let line = line_res?;
            let line_num = line_num + 2;

            let data = line.split('#').next().unwrap_or("");
            let values: Vec<&str> = data.split_whitespace().collect();
            if values.is_empty() {
                continue;
            }
            if values.len() != fields.len() {
                return Err(ColvarError::Parse {
                    line: line_num,
                    kind: ColvarParseErrorKind::FieldCount {
                        expected: fields.len(),
                        found: values.len(),
                    },
                });
            }

            for (field, value) in values.iter().enumerate() {
                let number: f64 = value.parse().map_err(|_| ColvarError::Parse {
                    line: line_num,
                    kind: ColvarParseErrorKind::InvalidFloat {
                        field: field + 1,
                        value: value.to_string(),
                    },
                })?;
                match field {
                    0 => index.push(number),
                    _ => columns[field - 1].push(number),
                }
            }
        }

        let names = fields.into_iter().skip(1).collect();
        Ok(TimeSeriesTable::new(index, names, columns)?)
    }
}

/// Path of replica `i` of `base`, following the `<base>.<i>` convention.
pub fn replica_path(base: &Path, replica: usize) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(format!(".{replica}"));
    PathBuf::from(name)
}

fn read_table(path: &Path, unbiased: bool) -> Result<TimeSeriesTable, TableError> {
    let mut table = ColvarFile::read_from_path(path).map_err(|e| TableError::File {
        path: path.to_path_buf(),
        source: e,
    })?;

    if unbiased {
        if table.has_column(WEIGHT_COLUMN) {
            warn!(
                "Overwriting existing '{}' column of {:?} with unit weights",
                WEIGHT_COLUMN, path
            );
        }
        table.set_column(WEIGHT_COLUMN, vec![1.0; table.len()])?;
    }
    debug!("Read {} row(s) from {:?}", table.len(), path);
    Ok(table)
}

/// Reads a `COLVAR` file, or `multi` replicas `<filename>.0 .. <filename>.<multi-1>`
/// concatenated in replica order.
///
/// With `unbiased`, every row receives a `weight` of 1.
pub fn read_colvar(
    filename: &Path,
    multi: usize,
    unbiased: bool,
) -> Result<TimeSeriesTable, TableError> {
    if multi == 0 {
        let table = read_table(filename, unbiased)?;
        info!("Loaded {} frame(s) from {:?}", table.len(), filename);
        return Ok(table);
    }

    let paths: Vec<PathBuf> = (0..multi).map(|i| replica_path(filename, i)).collect();

    #[cfg(not(feature = "parallel"))]
    let tables: Result<Vec<_>, _> = paths.iter().map(|p| read_table(p, unbiased)).collect();

    #[cfg(feature = "parallel")]
    let tables: Result<Vec<_>, _> = paths.par_iter().map(|p| read_table(p, unbiased)).collect();

    let tables = tables?;
    for (path, table) in paths.iter().zip(&tables).skip(1) {
        if table.columns() != tables[0].columns() {
            return Err(TableError::Replica {
                path: path.clone(),
                source: SchemaError::ColumnMismatch {
                    expected: tables[0].columns().to_vec(),
                    found: table.columns().to_vec(),
                },
            });
        }
    }

    let table = TimeSeriesTable::concat(tables)?;
    info!(
        "Loaded {} frame(s) from {} replica(s) of {:?}",
        table.len(),
        multi,
        filename
    );
    Ok(table)
}
