use super::table::TimeSeriesTable;
use thiserror::Error;

pub const HEIGHT_COLUMN: &str = "height";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HillError {
    #[error("Hills table has no column for collective variable '{0}'")]
    MissingCenter(String),
}

/// Name of the column holding the per-hill width of `cv`.
pub fn width_column(cv: &str) -> String {
    format!("sigma_{cv}")
}

/// A single deposited Gaussian, one coordinate per biased CV.
#[derive(Debug, Clone, PartialEq)]
pub struct HillRecord {
    pub time: f64,
    pub centers: Vec<f64>,
    /// Per-hill `sigma_<cv>` values as written by PLUMED. Informational only:
    /// reconstruction always uses the `SIGMA` of the bias parameters.
    pub widths: Option<Vec<f64>>,
    pub height: Option<f64>,
}

impl HillRecord {
    /// Scaling factor of the hill; unscaled kernels when the file has no height.
    pub fn scale(&self) -> f64 {
        self.height.unwrap_or(1.0)
    }
}

/// Reads the hills of `table` for `cvs`, in row order.
///
/// Widths are only reported when every CV has a `sigma_<cv>` column.
pub fn extract_hills(table: &TimeSeriesTable, cvs: &[&str]) -> Result<Vec<HillRecord>, HillError> {
    let centers = cvs
        .iter()
        .map(|cv| {
            table
                .column(cv)
                .ok_or_else(|| HillError::MissingCenter(cv.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let widths = cvs
        .iter()
        .map(|cv| table.column(&width_column(cv)))
        .collect::<Option<Vec<_>>>();
    let heights = table.column(HEIGHT_COLUMN);

    Ok((0..table.len())
        .map(|row| HillRecord {
            time: table.index()[row],
            centers: centers.iter().map(|col| col[row]).collect(),
            widths: widths
                .as_ref()
                .map(|cols| cols.iter().map(|col| col[row]).collect()),
            height: heights.map(|col| col[row]),
        })
        .collect())
}
