use super::colvar::ColvarFile;
use super::error::TableError;
use super::traits::TabularFile;
use crate::core::models::table::TimeSeriesTable;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Hills read from every file sharing the base `HILLS` name.
#[derive(Debug, Clone, PartialEq)]
pub enum HillsTables {
    /// Exactly one hills file matched (e.g. standard or multi-dimensional MetaD).
    SingleTable(TimeSeriesTable),
    /// Several files matched (e.g. PBMetaD); keyed by each table's first column.
    TableByName(BTreeMap<String, TimeSeriesTable>),
}

impl HillsTables {
    /// The table holding the hill centres of `cv`.
    pub fn for_cv(&self, cv: &str) -> Option<&TimeSeriesTable> {
        match self {
            HillsTables::SingleTable(table) if table.has_column(cv) => Some(table),
            HillsTables::SingleTable(_) => None,
            HillsTables::TableByName(tables) => tables.get(cv),
        }
    }

    /// Number of hills files that were read.
    pub fn file_count(&self) -> usize {
        match self {
            HillsTables::SingleTable(_) => 1,
            HillsTables::TableByName(tables) => tables.len(),
        }
    }
}

/// Files whose path starts with `base`, in lexical order.
fn matching_files(base: &Path) -> Result<Vec<PathBuf>, TableError> {
    let pattern = format!("{}*", glob::Pattern::escape(&base.to_string_lossy()));
    let entries = glob::glob(&pattern).map_err(|e| TableError::Pattern {
        pattern: pattern.clone(),
        source: e,
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry?;
        if path.is_file() {
            paths.push(path);
        }
    }
    if paths.is_empty() {
        return Err(TableError::NoMatchingFiles { pattern });
    }
    Ok(paths)
}

/// Reads every hills file whose name starts with `filename`.
pub fn read_hills(filename: &Path) -> Result<HillsTables, TableError> {
    let paths = matching_files(filename)?;

    let mut tables = Vec::with_capacity(paths.len());
    for path in &paths {
        let table = ColvarFile::read_from_path(path).map_err(|e| TableError::File {
            path: path.clone(),
            source: e,
        })?;
        tables.push((path, table));
    }
    info!("Read {} hills file(s) matching {:?}", tables.len(), filename);

    if tables.len() == 1 {
        let (_, table) = tables.remove(0);
        return Ok(HillsTables::SingleTable(table));
    }

    let mut by_name = BTreeMap::new();
    for (path, table) in tables {
        let cv = table
            .columns()
            .first()
            .cloned()
            .ok_or_else(|| TableError::NoColumns { path: path.clone() })?;
        if by_name.insert(cv.clone(), table).is_some() {
            warn!("Hills for '{}' in {:?} replace an earlier file", cv, path);
        }
    }
    Ok(HillsTables::TableByName(by_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_hills(path: &Path, cv: &str) {
        let content = format!(
            "#! FIELDS time {cv} sigma_{cv} height biasf\n#! SET multivariate false\n\
             1.0 -1.0 0.35 1.2 10\n2.0 0.5 0.35 1.1 10\n"
        );
        fs::write(path, content).unwrap();
    }

    #[test]
    fn single_match_returns_single_table() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("HILLS");
        write_hills(&base, "phi");

        let hills = read_hills(&base).unwrap();
        assert_eq!(hills.file_count(), 1);
        assert!(matches!(&hills, HillsTables::SingleTable(t) if t.len() == 2));
        assert!(hills.for_cv("phi").is_some());
        assert!(hills.for_cv("psi").is_none());
    }

    #[test]
    fn several_matches_are_keyed_by_first_column() {
        let dir = tempdir().unwrap();
        write_hills(&dir.path().join("HILLS.phi"), "phi");
        write_hills(&dir.path().join("HILLS.psi"), "psi");
        fs::write(dir.path().join("COLVAR"), "#! FIELDS time phi\n").unwrap();

        let hills = read_hills(&dir.path().join("HILLS")).unwrap();
        match &hills {
            HillsTables::TableByName(tables) => {
                assert_eq!(tables.keys().collect::<Vec<_>>(), vec!["phi", "psi"]);
            }
            HillsTables::SingleTable(_) => panic!("expected one table per CV"),
        }
        assert_eq!(hills.for_cv("psi").unwrap().column("height").unwrap(), &[1.2, 1.1]);
    }

    #[test]
    fn no_match_is_an_error() {
        let dir = tempdir().unwrap();
        let result = read_hills(&dir.path().join("HILLS"));
        assert!(matches!(result, Err(TableError::NoMatchingFiles { .. })));
    }

    #[test]
    fn unreadable_match_reports_its_path() {
        let dir = tempdir().unwrap();
        let bad = dir.path().join("HILLS");
        fs::write(&bad, "no header here\n").unwrap();
        let result = read_hills(&bad);
        assert!(matches!(result, Err(TableError::File { path, .. }) if path == bad));
    }
}
