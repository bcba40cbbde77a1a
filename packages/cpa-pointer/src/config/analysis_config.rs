//! Pointer analysis configuration
//!
//! Two precision switches plus a resource limit:
//! - `struct_strategy`: one location per struct instance, or one per field
//! - `offset_sensitive`: whether pointer arithmetic moves between array cells
//! - `max_path_edges`: longest path the path analyzer replays

use serde::{Deserialize, Deserializer, Serialize};

use super::error::{ConfigError, ConfigResult};
use super::preset::Preset;

/// How struct instances are split into locations (unions always merge)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructHandlingStrategy {
    /// One merged location per instance; field writes accumulate
    JustStruct,
    /// One location per field; field writes can be strong
    #[default]
    AllFields,
}

/// Pointer analysis configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerAnalysisConfig {
    pub struct_strategy: StructHandlingStrategy,

    /// Shift declared-variable offsets on pointer arithmetic; when off every
    /// cell of an array collapses onto its base location
    pub offset_sensitive: bool,

    /// Max edges replayed per path (None=unlimited)
    pub max_path_edges: Option<usize>,
}

impl PointerAnalysisConfig {
    /// Upper bound accepted for `max_path_edges`
    pub const MAX_PATH_EDGES_LIMIT: usize = 10_000_000;

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(n) = self.max_path_edges {
            if n == 0 || n > Self::MAX_PATH_EDGES_LIMIT {
                return Err(ConfigError::PathLimitOutOfRange {
                    value: n,
                    limit: Self::MAX_PATH_EDGES_LIMIT,
                });
            }
        }
        Ok(())
    }

    /// Builder: Set struct_strategy
    pub fn struct_strategy(mut self, v: StructHandlingStrategy) -> Self {
        self.struct_strategy = v;
        self
    }

    /// Builder: Set offset_sensitive
    pub fn offset_sensitive(mut self, v: bool) -> Self {
        self.offset_sensitive = v;
        self
    }

    /// Builder: Set max_path_edges
    pub fn max_path_edges(mut self, v: Option<usize>) -> Self {
        self.max_path_edges = v;
        self
    }

    /// Get preset configuration
    pub fn from_preset(preset: Preset) -> Self {
        match preset {
            Preset::Fast => Self {
                struct_strategy: StructHandlingStrategy::JustStruct,
                offset_sensitive: false,
                max_path_edges: Some(10_000),
            },
            Preset::Balanced | Preset::Custom => Self {
                struct_strategy: StructHandlingStrategy::AllFields,
                offset_sensitive: false,
                max_path_edges: Some(100_000),
            },
            Preset::Thorough => Self {
                struct_strategy: StructHandlingStrategy::AllFields,
                offset_sensitive: true,
                max_path_edges: None,
            },
        }
    }

    /// Apply the fields set in `patch`, keep the rest
    pub fn patched(mut self, patch: &PointerAnalysisConfigPatch) -> Self {
        if let Some(v) = patch.struct_strategy {
            self.struct_strategy = v;
        }
        if let Some(v) = patch.offset_sensitive {
            self.offset_sensitive = v;
        }
        if let Some(v) = patch.max_path_edges {
            self.max_path_edges = v;
        }
        self
    }
}

impl Default for PointerAnalysisConfig {
    fn default() -> Self {
        Self::from_preset(Preset::Balanced)
    }
}

/// Patch type for PointerAnalysisConfig
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PointerAnalysisConfigPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub struct_strategy: Option<StructHandlingStrategy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset_sensitive: Option<bool>,
    /// `Some(None)` (YAML `null`) lifts the limit
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present_or_null")]
    pub max_path_edges: Option<Option<usize>>,
}

/// Keeps an explicit `null` apart from a missing field
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl From<&PointerAnalysisConfig> for PointerAnalysisConfigPatch {
    fn from(config: &PointerAnalysisConfig) -> Self {
        Self {
            struct_strategy: Some(config.struct_strategy),
            offset_sensitive: Some(config.offset_sensitive),
            max_path_edges: Some(config.max_path_edges),
        }
    }
}
