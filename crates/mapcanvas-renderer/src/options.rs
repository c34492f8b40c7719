use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decoration::ArrowTable;

#[derive(Error, Debug)]
pub enum OptionsError {
    #[error("Invalid render options: {0}")]
    Json(#[from] serde_json::Error),
}

/// Renderer-wide settings. Every field has a default, so partial JSON is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// No display attached; missing-image warnings are suppressed.
    pub headless: bool,
    /// Split shapes that wrap the antimeridian.
    pub antimeridian: bool,
    #[serde(flatten)]
    pub arrows: ArrowTable,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            headless: false,
            antimeridian: true,
            arrows: ArrowTable::default(),
        }
    }
}

impl RenderOptions {
    pub fn from_json(json: &str) -> Result<Self, OptionsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, OptionsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
