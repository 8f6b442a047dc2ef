use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Time,     // First column of the source file (simulation time)
    RowOrder, // 0..n, used once several sources have been concatenated
}

#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("Duplicate column name: '{0}'")]
    DuplicateColumn(String),
    #[error("Column '{name}' has {found} rows, table has {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("Cannot concatenate tables with different columns: {expected:?} vs {found:?}")]
    ColumnMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[error("Cannot concatenate an empty list of tables")]
    Empty,
}

/// A time-indexed table of named `f64` columns, stored column-major.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesTable {
    index: Vec<f64>,
    index_kind: IndexKind,
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
    lookup: HashMap<String, usize>,
}

impl TimeSeriesTable {
    pub fn new(
        index: Vec<f64>,
        names: Vec<String>,
        columns: Vec<Vec<f64>>,
    ) -> Result<Self, SchemaError> {
        let mut lookup = HashMap::with_capacity(names.len());
        for (idx, name) in names.iter().enumerate() {
            if lookup.insert(name.clone(), idx).is_some() {
                return Err(SchemaError::DuplicateColumn(name.clone()));
            }
        }
        for (name, column) in names.iter().zip(&columns) {
            if column.len() != index.len() {
                return Err(SchemaError::LengthMismatch {
                    name: name.clone(),
                    expected: index.len(),
                    found: column.len(),
                });
            }
        }
        Ok(Self {
            index,
            index_kind: IndexKind::Time,
            names,
            columns,
            lookup,
        })
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn index(&self) -> &[f64] {
        &self.index
    }

    pub fn index_kind(&self) -> IndexKind {
        self.index_kind
    }

    pub fn columns(&self) -> &[String] {
        &self.names
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.lookup.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.lookup.get(name).map(|&idx| self.columns[idx].as_slice())
    }

    /// Inserts a column, or overwrites it when the name already exists.
    pub fn set_column(&mut self, name: &str, values: Vec<f64>) -> Result<(), SchemaError> {
        if values.len() != self.len() {
            return Err(SchemaError::LengthMismatch {
                name: name.to_string(),
                expected: self.len(),
                found: values.len(),
            });
        }
        match self.lookup.get(name) {
            Some(&idx) => self.columns[idx] = values,
            None => {
                self.lookup.insert(name.to_string(), self.names.len());
                self.names.push(name.to_string());
                self.columns.push(values);
            }
        }
        Ok(())
    }

    /// Stacks tables vertically in the given order. The time index is dropped in
    /// favour of the row order, since replica times overlap.
    pub fn concat(tables: Vec<TimeSeriesTable>) -> Result<Self, SchemaError> {
        let mut iter = tables.into_iter();
        let mut merged = iter.next().ok_or(SchemaError::Empty)?;

        for table in iter {
            if table.names != merged.names {
                return Err(SchemaError::ColumnMismatch {
                    expected: merged.names.clone(),
                    found: table.names,
                });
            }
            for (dst, src) in merged.columns.iter_mut().zip(table.columns) {
                dst.extend(src);
            }
            merged.index.extend(table.index);
        }

        merged.index = (0..merged.index.len()).map(|i| i as f64).collect();
        merged.index_kind = IndexKind::RowOrder;
        Ok(merged)
    }
}
