//! Configuration System
//!
//! Three levels, most users only need the first:
//! - Level 1: Preset - `PointerAnalysisConfig::from_preset(Preset::Fast)`
//! - Level 2: Builder overrides on top of a preset
//! - Level 3: Versioned YAML file (`version: 1`, `preset`, `overrides`)
//!
//! # Examples
//!
//! ```rust,ignore
//! use cpa_pointer::config::{PointerAnalysisConfig, Preset, StructHandlingStrategy};
//!
//! let config = PointerAnalysisConfig::from_preset(Preset::Balanced)
//!     .struct_strategy(StructHandlingStrategy::JustStruct);
//! config.validate()?;
//!
//! let config = PointerAnalysisConfig::from_yaml("pointer-analysis.yaml")?;
//! ```

pub mod analysis_config;
pub mod error;
pub mod io;
pub mod preset;

// Re-exports
pub use analysis_config::{PointerAnalysisConfig, PointerAnalysisConfigPatch, StructHandlingStrategy};
pub use error::{ConfigError, ConfigResult};
pub use io::{ConfigFileV1, SUPPORTED_VERSIONS};
pub use preset::Preset;
