use crate::core::models::table::TimeSeriesTable;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Defines the interface for reading whitespace-delimited PLUMED output tables.
///
/// Implementors handle format-specific header and row parsing; opening files
/// and buffering are provided here.
pub trait TabularFile {
    /// The error type for read operations.
    type Error: Error + From<io::Error>;

    /// Reads a table from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the header is missing, a row cannot be parsed, or
    /// the reader fails.
    fn read_from(reader: &mut impl BufRead) -> Result<TimeSeriesTable, Self::Error>;

    /// Reads a table from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<TimeSeriesTable, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }
}
