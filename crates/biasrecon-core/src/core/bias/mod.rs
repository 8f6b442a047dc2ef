//! # Bias Module
//!
//! Gaussian hill kernels and the reconstruction of accumulated bias surfaces.
//!
//! - [`kernels`] - Element-wise Gaussian kernel with the single-image periodic correction
//! - [`surface`] - Summation of many hills onto 1-D and N-D grids, interpolation and
//!   free-energy estimates
//!
//! ```ignore
//! use biasrecon::core::bias::kernels::sum_hills;
//!
//! let contribution = sum_hills(&grid, &[center], sigma, true)?;
//! ```

pub mod kernels;
pub mod surface;
