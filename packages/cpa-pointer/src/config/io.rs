//! Configuration I/O (YAML loading and export)
//!
//! Schema v1:
//! ```yaml
//! version: 1
//! preset: fast
//! overrides:
//!   struct_strategy: all_fields
//!   offset_sensitive: true
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::analysis_config::{PointerAnalysisConfig, PointerAnalysisConfigPatch};
use super::error::{ConfigError, ConfigResult};
use super::preset::Preset;

/// Schema versions this build reads
pub const SUPPORTED_VERSIONS: &[u64] = &[1];

/// YAML Schema v1
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileV1 {
    /// Schema version (always 1 for v1)
    pub version: u64,

    /// Base preset
    pub preset: String,

    /// Fine-grained overrides
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overrides: Option<PointerAnalysisConfigPatch>,
}

impl PointerAnalysisConfig {
    /// Parse and validate a v1 YAML document
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let document: serde_yaml::Value = serde_yaml::from_str(content)?;

        let version = match document.get("version") {
            None => return Err(ConfigError::MissingVersion),
            Some(value) => value.as_u64(),
        };
        match version {
            Some(v) if SUPPORTED_VERSIONS.contains(&v) => {}
            Some(v) => {
                return Err(ConfigError::UnsupportedVersion {
                    found: v,
                    supported: SUPPORTED_VERSIONS.to_vec(),
                })
            }
            None => return Err(ConfigError::MissingVersion),
        }

        let file: ConfigFileV1 = serde_yaml::from_value(document)?;
        let preset: Preset = file.preset.parse()?;

        let mut config = Self::from_preset(preset);
        if let Some(overrides) = &file.overrides {
            config = config.patched(overrides);
        }
        config.validate()?;

        tracing::debug!(
            preset = %preset,
            struct_strategy = ?config.struct_strategy,
            offset_sensitive = config.offset_sensitive,
            "Loaded pointer analysis configuration"
        );
        Ok(config)
    }

    /// Load from a YAML file
    pub fn from_yaml(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Export as a v1 document (custom preset + every field as override)
    pub fn to_yaml(&self) -> ConfigResult<String> {
        let file = ConfigFileV1 {
            version: 1,
            preset: Preset::Custom.to_string(),
            overrides: Some(PointerAnalysisConfigPatch::from(self)),
        };
        serde_yaml::to_string(&file).map_err(ConfigError::Yaml)
    }
}
