use crate::{error::LoaderError, fetch::ResourceAttributes};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Loader-wide settings. Per-call load options take precedence over these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Whether resources of single load are fetched in parallel by default.
    pub asynchronous: bool,
    /// Passthrough attributes applied to every request.
    pub attributes: ResourceAttributes,
    /// First index used for anonymous bundle ids.
    pub first_anonymous_id: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            asynchronous: true,
            attributes: Default::default(),
            first_anonymous_id: 0,
        }
    }
}

impl LoaderConfig {
    pub fn from_json(content: &str) -> Result<Self, LoaderError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LoaderError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn asynchronous(mut self, value: bool) -> Self {
        self.asynchronous = value;
        self
    }

    pub fn attribute(mut self, key: impl AsRef<str>, value: impl ToString) -> Self {
        self.attributes.set(key, value);
        self
    }
}
