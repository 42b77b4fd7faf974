use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use mirage_core::metrics::MetricParams;
use mirage_core::overlay::OverlayConfig;

/// On-disk tool configuration (TOML), shared by `compare` and `overlay`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub metrics: MetricParams,
    pub overlay: OverlayConfig,
}

impl ToolConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }

    /// Load from an optional path, falling back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}
