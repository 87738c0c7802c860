//! Accessor settings, stored as YAML.
//!
//! ```yaml
//! invoke_policy: strict
//! update_policy: lenient
//! pretty: false
//! ```
//!
//! Every key is optional; missing keys take the value from
//! [`default_settings`].

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::access::Policy;


#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Policy for `invoke` when the path does not end in a callable.
    pub invoke_policy: Policy,
    /// Policy for `update` when a key along the path is missing.
    pub update_policy: Policy,
    /// Pretty-print rendered documents and values.
    pub pretty: bool,
}

impl Default for Settings {
    fn default() -> Self {
        default_settings()
    }
}


#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings: {0}")]
    Yaml(#[from] serde_yaml::Error),
}


/// Returns the defaults for all settings fields.
pub fn default_settings() -> Settings {
    Settings {
        invoke_policy: Policy::Strict,
        update_policy: Policy::Strict,
        pretty: true,
    }
}


/// Load `Settings` from a YAML file.
pub fn load(path: &Path) -> Result<Settings, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let settings = parse(&content)?;
    tracing::debug!(path = %path.display(), ?settings, "loaded settings");
    Ok(settings)
}


/// Save `Settings` to a YAML file.
pub fn save(path: &Path, settings: &Settings) -> Result<(), ConfigError> {
    let content = serialize(settings)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Write {
        path: path.display().to_string(),
        source,
    })
}


/// Parse settings from a YAML string. An empty document yields the defaults.
pub fn parse(content: &str) -> Result<Settings, ConfigError> {
    if content.trim().is_empty() {
        return Ok(default_settings());
    }
    Ok(serde_yaml::from_str(content)?)
}


pub fn serialize(settings: &Settings) -> Result<String, ConfigError> {
    Ok(serde_yaml::to_string(settings)?)
}
