use crate::core::input::arguments::BiasArguments;
use std::collections::BTreeSet;
use std::f64::consts::PI;
use thiserror::Error;

/// Default number of grid points per hill width when neither `GRID_BIN` nor
/// `GRID_SPACING` is given.
const POINTS_PER_SIGMA: f64 = 5.0;

/// Largest number of grid points accepted along a single axis.
pub const MAX_GRID_POINTS: usize = 1 << 20;

#[derive(Debug, Error, PartialEq)]
pub enum GridError {
    #[error("Missing required bias argument '{0}'")]
    MissingKey(&'static str),
    #[error("Bias argument '{key}' has no value for collective variable '{cv}' (position {index})")]
    MissingValue {
        key: &'static str,
        cv: String,
        index: usize,
    },
    #[error("Cannot resolve '{value}' to a number")]
    InvalidNumber { value: String },
    #[error("Invalid grid for '{cv}': grid_min ({grid_min}) must be below grid_max ({grid_max})")]
    InvalidBounds {
        cv: String,
        grid_min: f64,
        grid_max: f64,
    },
    #[error("Invalid hill width for '{cv}': sigma must be positive, got {sigma}")]
    InvalidSigma { cv: String, sigma: f64 },
    #[error("Grid for '{cv}' would hold {requested} points, above the per-axis limit")]
    TooManyPoints { cv: String, requested: f64 },
    #[error("Collective variable '{0}' is not biased")]
    UnknownCv(String),
}

/// Resolves a bias argument token, mapping the symbolic bounds `pi` and `-pi`.
pub fn resolve_value(token: &str) -> Result<f64, GridError> {
    match token {
        "pi" => Ok(PI),
        "-pi" => Ok(-PI),
        _ => token.parse::<f64>().map_err(|_| GridError::InvalidNumber {
            value: token.to_string(),
        }),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridParameters {
    pub sigma: f64,
    pub grid_min: f64,
    pub grid_max: f64,
}

impl GridParameters {
    pub fn new(cv: &str, sigma: f64, grid_min: f64, grid_max: f64) -> Result<Self, GridError> {
        if !(grid_min < grid_max) {
            return Err(GridError::InvalidBounds {
                cv: cv.to_string(),
                grid_min,
                grid_max,
            });
        }
        if !(sigma > 0.0) {
            return Err(GridError::InvalidSigma {
                cv: cv.to_string(),
                sigma,
            });
        }
        Ok(Self {
            sigma,
            grid_min,
            grid_max,
        })
    }

    /// Periodic CVs are recognised by an upper bound of exactly `pi`.
    pub fn is_periodic(&self) -> bool {
        self.grid_max == PI
    }

    pub fn extent(&self) -> f64 {
        self.grid_max - self.grid_min
    }

    /// Evenly spaced points from `grid_min` to `grid_max`, both inclusive.
    pub fn linspace(&self, num_points: usize) -> Vec<f64> {
        match num_points {
            0 => Vec::new(),
            1 => vec![self.grid_min],
            n => {
                let step = self.extent() / (n - 1) as f64;
                (0..n)
                    .map(|i| {
                        if i == n - 1 {
                            self.grid_max
                        } else {
                            self.grid_min + step * i as f64
                        }
                    })
                    .collect()
            }
        }
    }
}

/// Grid parameters of every biased collective variable, in `ARG` order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BiasedCvRegistry {
    entries: Vec<(String, GridParameters)>,
    periodic: BTreeSet<String>,
}

impl BiasedCvRegistry {
    pub fn from_arguments(args: &BiasArguments) -> Result<Self, GridError> {
        let cv_names = args.get("arg").ok_or(GridError::MissingKey("arg"))?;

        let mut entries = Vec::with_capacity(cv_names.len());
        for (idx, cv) in cv_names.iter().enumerate() {
            let sigma = Self::lookup(args, "sigma", cv, idx)?;
            let grid_min = Self::lookup(args, "grid_min", cv, idx)?;
            let grid_max = Self::lookup(args, "grid_max", cv, idx)?;
            entries.push((cv.clone(), GridParameters::new(cv, sigma, grid_min, grid_max)?));
        }

        let periodic = entries
            .iter()
            .filter(|(_, params)| params.is_periodic())
            .map(|(cv, _)| cv.clone())
            .collect();

        Ok(Self { entries, periodic })
    }

    fn lookup(
        args: &BiasArguments,
        key: &'static str,
        cv: &str,
        idx: usize,
    ) -> Result<f64, GridError> {
        if !args.contains_key(key) {
            return Err(GridError::MissingKey(key));
        }
        let token = args.value_at(key, idx).ok_or_else(|| GridError::MissingValue {
            key,
            cv: cv.to_string(),
            index: idx,
        })?;
        resolve_value(token)
    }

    pub fn get(&self, cv: &str) -> Option<&GridParameters> {
        self.entries
            .iter()
            .find(|(name, _)| name == cv)
            .map(|(_, params)| params)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &GridParameters)> {
        self.entries.iter().map(|(name, params)| (name.as_str(), params))
    }

    pub fn cv_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn periodic(&self) -> &BTreeSet<String> {
        &self.periodic
    }

    pub fn is_periodic(&self, cv: &str) -> bool {
        self.periodic.contains(cv)
    }

    /// Evaluation grid of a biased CV.
    ///
    /// `GRID_BIN` (a positive integer) takes priority over `GRID_SPACING`; without
    /// either, the grid holds five points per hill width. Grids above
    /// [`MAX_GRID_POINTS`] along one axis are rejected.
    pub fn grid_points(&self, cv: &str, args: &BiasArguments) -> Result<Vec<f64>, GridError> {
        let idx = self
            .entries
            .iter()
            .position(|(name, _)| name == cv)
            .ok_or_else(|| GridError::UnknownCv(cv.to_string()))?;
        let params = &self.entries[idx].1;

        let num_points = if let Some(token) = args.value_at("grid_bin", idx) {
            let bins = token
                .parse::<usize>()
                .ok()
                .filter(|&bins| bins >= 1)
                .ok_or_else(|| GridError::InvalidNumber {
                    value: token.to_string(),
                })?;
            bins.checked_add(1)
                .ok_or_else(|| GridError::TooManyPoints {
                    cv: cv.to_string(),
                    requested: bins as f64,
                })?
        } else if let Some(spacing) = args.value_at("grid_spacing", idx) {
            let spacing = resolve_value(spacing)?;
            if !(spacing > 0.0) {
                return Err(GridError::InvalidNumber {
                    value: spacing.to_string(),
                });
            }
            Self::point_count(cv, (params.extent() / spacing).ceil() + 1.0)?
        } else {
            Self::point_count(cv, (POINTS_PER_SIGMA * params.extent() / params.sigma).ceil())?
                .max(2)
        };
        if num_points > MAX_GRID_POINTS {
            return Err(GridError::TooManyPoints {
                cv: cv.to_string(),
                requested: num_points as f64,
            });
        }

        Ok(params.linspace(num_points))
    }

    fn point_count(cv: &str, requested: f64) -> Result<usize, GridError> {
        if requested.is_finite() && requested <= MAX_GRID_POINTS as f64 {
            Ok(requested as usize)
        } else {
            Err(GridError::TooManyPoints {
                cv: cv.to_string(),
                requested,
            })
        }
    }
}
