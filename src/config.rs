use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{rows::ROW_TOLERANCE, Error, Result};

/// Words that mark a line as part of a nutrition label.
pub const NUTRITION_KEYWORDS: &[&str] = &[
    "calories",
    "sugar",
    "fat",
    "saturated",
    "salt",
    "serving",
    "energy",
    "nutrition",
    "facts",
];

/// On-disk form of the filter settings. Missing fields fall back to the
/// nutrition label defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RowFilterConfig {
    pub tolerance: f64,
    pub keywords: Vec<String>,
}

impl Default for RowFilterConfig {
    fn default() -> Self {
        Self {
            tolerance: ROW_TOLERANCE,
            keywords: NUTRITION_KEYWORDS.iter().map(|it| it.to_string()).collect(),
        }
    }
}

impl RowFilterConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&raw)?;
        log::debug!("Loaded filter config from {path:?}: {config:?}");
        Ok(config)
    }
}
