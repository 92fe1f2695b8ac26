//! Render Configuration

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::id::PositionalId;

/// Settings shared by a renderer and its render target.
///
/// Every field has a default, so `{}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Positional path of the render root.
    pub root: Vec<usize>,

    /// Attributes starting with this prefix are event listeners.
    pub event_prefix: String,

    /// Emit a `trace!` event for each applied patch.
    pub trace_patches: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            root: vec![0],
            event_prefix: "on".to_string(),
            trace_patches: true,
        }
    }
}

impl RenderConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: RenderConfig = serde_json::from_str(json)?;
        if config.root.is_empty() {
            return Err(Error::InvalidConfig("root path must not be empty"));
        }
        if config.event_prefix.is_empty() {
            return Err(Error::InvalidConfig("event prefix must not be empty"));
        }
        Ok(config)
    }

    /// The configured root as a positional id.
    pub fn root_id(&self) -> PositionalId {
        PositionalId::from_path(&self.root)
    }
}
