use super::kernels::{KernelError, sum_hills};
use crate::core::models::hills::HillRecord;
use itertools::Itertools;

/// One dimension of a bias grid, with the kernel settings of its CV.
#[derive(Debug, Clone, PartialEq)]
pub struct BiasAxis {
    pub name: String,
    pub points: Vec<f64>,
    pub sigma: f64,
    pub periodic: bool,
}

/// Accumulated bias on a Cartesian grid, stored row-major (last axis fastest).
#[derive(Debug, Clone, PartialEq)]
pub struct StaticBias {
    axes: Vec<BiasAxis>,
    values: Vec<f64>,
}

impl StaticBias {
    pub fn axes(&self) -> &[BiasAxis] {
        &self.axes
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn dims(&self) -> usize {
        self.axes.len()
    }

    fn strides(&self) -> Vec<usize> {
        let mut strides = vec![1; self.axes.len()];
        for d in (0..self.axes.len().saturating_sub(1)).rev() {
            strides[d] = strides[d + 1] * self.axes[d + 1].points.len();
        }
        strides
    }

    /// Multilinear interpolation of the bias at `point`, clamped to the grid.
    ///
    /// Returns `None` when `point` has the wrong dimensionality or a non-finite
    /// coordinate (PLUMED writes `nan` for undefined CVs), or the grid is empty.
    pub fn value_at(&self, point: &[f64]) -> Option<f64> {
        if point.len() != self.dims()
            || self.values.is_empty()
            || point.iter().any(|x| !x.is_finite())
        {
            return None;
        }

        let brackets: Vec<(usize, usize, f64)> = self
            .axes
            .iter()
            .zip(point)
            .map(|(axis, &x)| bracket(&axis.points, x))
            .collect();
        let strides = self.strides();

        let value = (0..self.dims())
            .map(|_| [false, true])
            .multi_cartesian_product()
            .map(|corner| {
                corner
                    .iter()
                    .zip(&brackets)
                    .zip(&strides)
                    .fold((1.0, 0), |(weight, flat), ((&upper, &(lo, hi, t)), &stride)| {
                        if upper {
                            (weight * t, flat + hi * stride)
                        } else {
                            (weight * (1.0 - t), flat + lo * stride)
                        }
                    })
            })
            .filter(|&(weight, _)| weight != 0.0)
            .map(|(weight, flat)| weight * self.values[flat])
            .sum();
        Some(value)
    }

    /// Free energy estimate `-V`, rescaled by `gamma / (gamma - 1)` for
    /// well-tempered runs with bias factor `gamma > 1`.
    pub fn free_energy(&self, bias_factor: Option<f64>) -> Vec<f64> {
        let factor = match bias_factor {
            Some(gamma) if gamma > 1.0 => gamma / (gamma - 1.0),
            _ => 1.0,
        };
        self.values.iter().map(|v| -v * factor).collect()
    }
}

/// Indices of the grid points enclosing `x` and the fractional position between them.
fn bracket(points: &[f64], x: f64) -> (usize, usize, f64) {
    let last = points.len() - 1;
    if last == 0 || x <= points[0] {
        return (0, 0, 0.0);
    }
    if x >= points[last] {
        return (last, last, 0.0);
    }
    let hi = points.partition_point(|&p| p <= x).min(last);
    let lo = hi - 1;
    let span = points[hi] - points[lo];
    let t = if span > 0.0 { (x - points[lo]) / span } else { 0.0 };
    (lo, hi, t)
}

/// Bias on `grid` from hills at `centers` scaled by `heights`.
///
/// # Errors
///
/// Returns an error when `sigma` is not strictly positive or `heights` does not
/// hold one value per hill.
pub fn accumulate_bias(
    grid: &[f64],
    centers: &[f64],
    heights: &[f64],
    sigma: f64,
    periodic: bool,
) -> Result<Vec<f64>, KernelError> {
    if !(sigma > 0.0) {
        return Err(KernelError::NonPositiveWidth(sigma));
    }
    if centers.len() != heights.len() {
        return Err(KernelError::ShapeMismatch {
            grid: heights.len(),
            hills: centers.len(),
        });
    }

    let mut total = vec![0.0; grid.len()];
    for (&center, &height) in centers.iter().zip(heights) {
        let kernel = sum_hills(grid, &[center], sigma, periodic)?;
        for (acc, k) in total.iter_mut().zip(kernel) {
            *acc += height * k;
        }
    }
    Ok(total)
}

/// Bias on the Cartesian product of `axes`, each hill contributing the product
/// of its per-axis kernels.
pub fn accumulate_bias_nd(
    axes: Vec<BiasAxis>,
    hills: &[HillRecord],
) -> Result<StaticBias, KernelError> {
    if axes.is_empty() {
        return Ok(StaticBias {
            axes,
            values: Vec::new(),
        });
    }
    if let Some(axis) = axes.iter().find(|axis| !(axis.sigma > 0.0)) {
        return Err(KernelError::NonPositiveWidth(axis.sigma));
    }

    let lengths: Vec<usize> = axes.iter().map(|axis| axis.points.len()).collect();
    let size: usize = lengths.iter().product();
    let mut values = vec![0.0; size];
    let mut index = vec![0usize; axes.len()];

    for hill in hills {
        if hill.centers.len() != axes.len() {
            return Err(KernelError::ShapeMismatch {
                grid: axes.len(),
                hills: hill.centers.len(),
            });
        }
        let kernels = axes
            .iter()
            .zip(&hill.centers)
            .map(|(axis, &center)| sum_hills(&axis.points, &[center], axis.sigma, axis.periodic))
            .collect::<Result<Vec<_>, _>>()?;
        let scale = hill.scale();

        index.iter_mut().for_each(|i| *i = 0);
        for value in values.iter_mut() {
            *value += index
                .iter()
                .zip(&kernels)
                .fold(scale, |acc, (&i, kernel)| acc * kernel[i]);

            for d in (0..index.len()).rev() {
                index[d] += 1;
                if index[d] < lengths[d] {
                    break;
                }
                index[d] = 0;
            }
        }
    }

    Ok(StaticBias { axes, values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    fn axis(name: &str, points: Vec<f64>, periodic: bool) -> BiasAxis {
        BiasAxis {
            name: name.into(),
            points,
            sigma: 0.5,
            periodic,
        }
    }

    fn hill(centers: Vec<f64>, height: f64) -> HillRecord {
        HillRecord {
            time: 0.0,
            centers,
            widths: None,
            height: Some(height),
        }
    }

    #[test]
    fn accumulate_bias_sums_scaled_kernels() {
        let grid = vec![-1.0, 0.0, 1.0];
        let bias = accumulate_bias(&grid, &[0.0, 0.0], &[1.0, 2.0], 0.5, false).unwrap();
        assert!(f64_approx_equal(bias[1], 3.0));
        assert!(f64_approx_equal(bias[0], bias[2]));
        assert!(f64_approx_equal(bias[0], 3.0 * (-2.0f64).exp()));
    }

    #[test]
    fn accumulate_bias_without_hills_is_flat_zero() {
        let bias = accumulate_bias(&[0.0, 1.0], &[], &[], 0.5, false).unwrap();
        assert_eq!(bias, vec![0.0, 0.0]);
    }

    #[test]
    fn accumulate_bias_rejects_mismatched_heights() {
        let result = accumulate_bias(&[0.0], &[0.0, 1.0], &[1.0], 0.5, false);
        assert!(matches!(result, Err(KernelError::ShapeMismatch { .. })));
    }

    #[test]
    fn one_dimensional_grid_matches_accumulate_bias() {
        let points: Vec<f64> = (0..21).map(|i| -PI + PI * i as f64 / 10.0).collect();
        let hills = vec![hill(vec![-3.0], 1.2), hill(vec![0.4], 0.8)];

        let nd = accumulate_bias_nd(vec![axis("phi", points.clone(), true)], &hills).unwrap();
        let flat = accumulate_bias(&points, &[-3.0, 0.4], &[1.2, 0.8], 0.5, true).unwrap();
        for (a, b) in nd.values().iter().zip(&flat) {
            assert!(f64_approx_equal(*a, *b));
        }
    }

    #[test]
    fn two_dimensional_grid_is_row_major_product_of_kernels() {
        let axes = vec![
            axis("x", vec![0.0, 1.0], false),
            axis("y", vec![0.0, 1.0, 2.0], false),
        ];
        let bias = accumulate_bias_nd(axes, &[hill(vec![0.0, 2.0], 1.0)]).unwrap();

        assert_eq!(bias.values().len(), 6);
        assert!(f64_approx_equal(bias.values()[2], 1.0));
        let kx = (-2.0f64).exp();
        let ky = (-8.0f64).exp();
        assert!(f64_approx_equal(bias.values()[3], kx * ky));
    }

    #[test]
    fn accumulate_bias_nd_checks_hill_dimensionality() {
        let axes = vec![axis("x", vec![0.0, 1.0], false)];
        let result = accumulate_bias_nd(axes, &[hill(vec![0.0, 1.0], 1.0)]);
        assert_eq!(result, Err(KernelError::ShapeMismatch { grid: 1, hills: 2 }));
    }

    #[test]
    fn value_at_interpolates_and_clamps() {
        let bias = StaticBias {
            axes: vec![axis("x", vec![0.0, 1.0, 2.0], false)],
            values: vec![0.0, 2.0, 4.0],
        };
        assert!(f64_approx_equal(bias.value_at(&[0.5]).unwrap(), 1.0));
        assert!(f64_approx_equal(bias.value_at(&[1.0]).unwrap(), 2.0));
        assert!(f64_approx_equal(bias.value_at(&[7.0]).unwrap(), 4.0));
        assert!(f64_approx_equal(bias.value_at(&[-1.0]).unwrap(), 0.0));
        assert_eq!(bias.value_at(&[0.5, 0.5]), None);
    }

    #[test]
    fn value_at_non_finite_coordinate_is_none() {
        let bias = accumulate_bias_nd(
            vec![axis("x", vec![0.0, 1.0, 2.0], false)],
            &[hill(vec![1.0], 1.0)],
        )
        .unwrap();
        assert_eq!(bias.value_at(&[f64::NAN]), None);
        assert_eq!(bias.value_at(&[f64::INFINITY]), None);
        assert_eq!(bias.value_at(&[f64::NEG_INFINITY]), None);
        assert!(bias.value_at(&[1.0]).is_some());
    }

    #[test]
    fn value_at_is_bilinear_in_two_dimensions() {
        let bias = StaticBias {
            axes: vec![
                axis("x", vec![0.0, 1.0], false),
                axis("y", vec![0.0, 1.0], false),
            ],
            values: vec![0.0, 1.0, 2.0, 3.0],
        };
        assert!(f64_approx_equal(bias.value_at(&[0.5, 0.5]).unwrap(), 1.5));
        assert!(f64_approx_equal(bias.value_at(&[1.0, 0.0]).unwrap(), 2.0));
    }

    #[test]
    fn free_energy_rescales_well_tempered_bias() {
        let bias = StaticBias {
            axes: vec![axis("x", vec![0.0, 1.0], false)],
            values: vec![1.0, 2.0],
        };
        assert_eq!(bias.free_energy(None), vec![-1.0, -2.0]);
        let wt = bias.free_energy(Some(10.0));
        assert!(f64_approx_equal(wt[1], -2.0 * 10.0 / 9.0));
    }
}
