use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum KernelError {
    #[error("Hill width must be strictly positive, got {0}")]
    NonPositiveWidth(f64),
    #[error("Cannot broadcast {grid} grid point(s) against {hills} hill center(s)")]
    ShapeMismatch { grid: usize, hills: usize },
}

#[inline]
pub fn gaussian(square_dist: f64, sigma: f64) -> f64 {
    (-square_dist / (2.0 * sigma * sigma)).exp()
}

/// Squared distance, optionally replaced by the squared distance to the single
/// periodic image one `period` away when that one is shorter.
#[inline]
pub fn square_distance(dist: f64, period: Option<f64>) -> f64 {
    let square = dist * dist;
    match period {
        Some(period) => {
            let wrapped = dist.abs() - period;
            square.min(wrapped * wrapped)
        }
        None => square,
    }
}

/// Gaussian kernel value of each aligned (grid point, hill center) pair.
///
/// The two slices are combined element-wise; a slice of length one is
/// broadcast against the other. With `periodic`, the span of `grid_points`
/// (last minus first) is taken as the period and only one image is tried,
/// which under-corrects for wide hills away from the domain edges.
///
/// # Errors
///
/// Returns an error when `sigma` is not strictly positive or the slices
/// cannot be broadcast together.
pub fn sum_hills(
    grid_points: &[f64],
    hill_centers: &[f64],
    sigma: f64,
    periodic: bool,
) -> Result<Vec<f64>, KernelError> {
    if !(sigma > 0.0) {
        return Err(KernelError::NonPositiveWidth(sigma));
    }

    let (n_grid, n_hills) = (grid_points.len(), hill_centers.len());
    let len = match (n_grid, n_hills) {
        (g, h) if g == h => g,
        (1, h) => h,
        (g, 1) => g,
        (g, h) => return Err(KernelError::ShapeMismatch { grid: g, hills: h }),
    };
    if len == 0 {
        return Ok(Vec::new());
    }

    let period = match (periodic, grid_points.first(), grid_points.last()) {
        (true, Some(first), Some(last)) => Some(last - first),
        _ => None,
    };
    let at = |values: &[f64], i: usize| if values.len() == 1 { values[0] } else { values[i] };

    Ok((0..len)
        .map(|i| {
            let dist = at(grid_points, i) - at(hill_centers, i);
            gaussian(square_distance(dist, period), sigma)
        })
        .collect())
}
