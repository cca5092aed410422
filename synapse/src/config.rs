//! Engine configuration.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File looked up in the working directory when no config path is given.
pub const DEFAULT_CONFIG_FILE: &str = "synapse.json";

/// Static configuration for an [`Engine`](crate::Engine).
///
/// Every field is optional in the JSON form; missing fields take their
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory of hook manifests loaded at startup.
    pub hooks_dir: Option<PathBuf>,

    /// Where protocol outcomes are written. Nothing is written when unset.
    pub results_dir: Option<PathBuf>,

    /// Register the built-in cognitive protocols.
    pub cognitive_tools: bool,

    /// Default `tracing` filter for the CLI. `RUST_LOG` overrides it.
    pub log_filter: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hooks_dir: None,
            results_dir: None,
            cognitive_tools: true,
            log_filter: "info".into(),
        }
    }
}

impl EngineConfig {
    /// Read a JSON config file.
    pub fn from_path(path: &Path) -> Result<Self, EngineError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("{}: {e}", path.display())))?;
        serde_json::from_str(&contents)
            .map_err(|e| EngineError::Config(format!("{}: {e}", path.display())))
    }

    /// Resolve the config the way the CLI does: an explicit path if given,
    /// else `synapse.json` in `dir` if it exists, else defaults.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self, EngineError> {
        if let Some(path) = explicit {
            return Self::from_path(path);
        }
        let default_path = dir.join(DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            Self::from_path(&default_path)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"results_dir": "out"}"#).unwrap();
        assert_eq!(config.results_dir, Some(PathBuf::from("out")));
        assert!(config.cognitive_tools);
        assert_eq!(config.log_filter, "info");
        assert!(config.hooks_dir.is_none());
    }

    #[test]
    fn discover_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::discover(None, dir.path()).unwrap();
        assert_eq!(config, EngineConfig::default());
    }
}
