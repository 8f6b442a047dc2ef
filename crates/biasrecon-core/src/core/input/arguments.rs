use crate::core::models::grid::{GridError, resolve_value};

/// Bias arguments extracted from a PLUMED input, keyed by lowercased name.
///
/// Insertion order is preserved. CV-specific arguments (`sigma`, `grid_min`,
/// `grid_max`, ...) hold one token per entry of `arg`, at the same position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BiasArguments {
    entries: Vec<(String, Vec<String>)>,
}

impl BiasArguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `key`, replacing the value of an existing entry in place.
    pub fn insert(&mut self, key: &str, values: Vec<String>) {
        let key = key.to_lowercase();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = values,
            None => self.entries.push((key, values)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_slice())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names of the biased collective variables, in `ARG` order.
    pub fn cv_names(&self) -> &[String] {
        self.get("arg").unwrap_or(&[])
    }

    /// The token at `idx` for a CV-specific argument.
    pub fn value_at(&self, key: &str, idx: usize) -> Option<&str> {
        self.get(key)
            .and_then(|values| values.get(idx))
            .map(String::as_str)
    }

    /// First `TEMP` token, resolved to a number.
    pub fn temperature(&self) -> Result<Option<f64>, GridError> {
        self.first_number("temp")
    }

    /// First `BIASFACTOR` token, resolved to a number.
    pub fn bias_factor(&self) -> Result<Option<f64>, GridError> {
        self.first_number("biasfactor")
    }

    fn first_number(&self, key: &str) -> Result<Option<f64>, GridError> {
        self.value_at(key, 0).map(resolve_value).transpose()
    }
}
