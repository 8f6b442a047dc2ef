use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum OptionsLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Invalid options in '{path}': {source}")]
    Invalid { path: String, source: ConfigError },
}

/// Options of a sampling project beyond the `COLVAR` and `HILLS` paths.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct ProjectOptions {
    /// PLUMED input holding the bias action. Without it no bias parameters are parsed.
    pub input_file: Option<PathBuf>,
    /// Bias action to look for; defaults to the section marker of the project method.
    pub bias_type: Option<String>,
    /// Number of replicas (`COLVAR.0`, `COLVAR.1`, ...); 0 reads a single file.
    #[serde(default)]
    pub multi: usize,
    /// Adds a unit `weight` column for unbiased runs.
    #[serde(default)]
    pub unbiased: bool,
    /// Overrides the `TEMP` argument of the PLUMED input (K).
    pub temperature: Option<f64>,
}

impl ProjectOptions {
    pub fn load(path: &Path) -> Result<Self, OptionsLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| OptionsLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let options: Self = toml::from_str(&content).map_err(|e| OptionsLoadError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        options.validate().map_err(|e| OptionsLoadError::Invalid {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(t) = self.temperature {
            if !(t.is_finite() && t > 0.0) {
                return Err(ConfigError::InvalidParameter {
                    name: "temperature",
                    reason: format!("must be positive and finite, got {t}"),
                });
            }
        }
        if self.bias_type.as_deref().is_some_and(str::is_empty) {
            return Err(ConfigError::InvalidParameter {
                name: "bias_type",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct ProjectOptionsBuilder {
    input_file: Option<PathBuf>,
    bias_type: Option<String>,
    multi: Option<usize>,
    unbiased: Option<bool>,
    temperature: Option<f64>,
}

impl ProjectOptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input_file(mut self, path: PathBuf) -> Self {
        self.input_file = Some(path);
        self
    }
    pub fn bias_type(mut self, bias_type: impl Into<String>) -> Self {
        self.bias_type = Some(bias_type.into());
        self
    }
    pub fn multi(mut self, replicas: usize) -> Self {
        self.multi = Some(replicas);
        self
    }
    pub fn unbiased(mut self, unbiased: bool) -> Self {
        self.unbiased = Some(unbiased);
        self
    }
    pub fn temperature(mut self, kelvin: f64) -> Self {
        self.temperature = Some(kelvin);
        self
    }

    pub fn build(self) -> Result<ProjectOptions, ConfigError> {
        let options = ProjectOptions {
            input_file: self.input_file,
            bias_type: self.bias_type,
            multi: self.multi.unwrap_or(0),
            unbiased: self.unbiased.unwrap_or(false),
            temperature: self.temperature,
        };
        options.validate()?;
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn builder_defaults_to_single_biased_run() {
        let options = ProjectOptionsBuilder::new().build().unwrap();
        assert_eq!(options, ProjectOptions::default());
        assert_eq!(options.multi, 0);
        assert!(!options.unbiased);
    }

    #[test]
    fn builder_sets_every_field() {
        let options = ProjectOptionsBuilder::new()
            .input_file(PathBuf::from("plumed.dat"))
            .bias_type("metad")
            .multi(3)
            .unbiased(true)
            .temperature(300.0)
            .build()
            .unwrap();
        assert_eq!(options.input_file, Some(PathBuf::from("plumed.dat")));
        assert_eq!(options.bias_type.as_deref(), Some("metad"));
        assert_eq!(options.multi, 3);
        assert!(options.unbiased);
        assert_eq!(options.temperature, Some(300.0));
    }

    #[test]
    fn builder_rejects_non_positive_temperature() {
        let result = ProjectOptionsBuilder::new().temperature(0.0).build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidParameter { name: "temperature", .. })
        ));
        assert!(ProjectOptionsBuilder::new().temperature(f64::NAN).build().is_err());
    }

    #[test]
    fn builder_rejects_empty_bias_type() {
        let result = ProjectOptionsBuilder::new().bias_type("").build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidParameter { name: "bias_type", .. })
        ));
    }

    #[test]
    fn load_succeeds_with_valid_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("project.toml");
        fs::write(
            &path,
            r#"
            input-file = "plumed.dat"
            bias-type = "pbmetad"
            multi = 4
            temperature = 298.0
            "#,
        )
        .unwrap();

        let options = ProjectOptions::load(&path).unwrap();
        assert_eq!(options.input_file, Some(PathBuf::from("plumed.dat")));
        assert_eq!(options.bias_type.as_deref(), Some("pbmetad"));
        assert_eq!(options.multi, 4);
        assert!(!options.unbiased);
        assert_eq!(options.temperature, Some(298.0));
    }

    #[test]
    fn load_fails_for_unknown_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("project.toml");
        fs::write(&path, "replicas = 2\n").unwrap();
        assert!(matches!(
            ProjectOptions::load(&path),
            Err(OptionsLoadError::Toml { .. })
        ));
    }

    #[test]
    fn load_fails_for_missing_file() {
        let dir = tempdir().unwrap();
        let result = ProjectOptions::load(&dir.path().join("missing.toml"));
        assert!(matches!(result, Err(OptionsLoadError::Io { .. })));
    }

    #[test]
    fn load_validates_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("project.toml");
        fs::write(&path, "temperature = -5.0\n").unwrap();
        assert!(matches!(
            ProjectOptions::load(&path),
            Err(OptionsLoadError::Invalid { .. })
        ));
    }
}
