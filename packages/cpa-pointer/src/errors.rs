//! Error types for cpa-pointer
//!
//! Feature and configuration errors keep their own enums; this is the
//! umbrella callers get when they use both.

use thiserror::Error;

use crate::config::ConfigError;
use crate::features::points_to::PointerAnalysisError;

/// Main error type for cpa-pointer operations
#[derive(Debug, Error)]
pub enum CpaError {
    /// Analysis error
    #[error("Analysis error: {0}")]
    Analysis(#[from] PointerAnalysisError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl CpaError {
    pub fn is_config(&self) -> bool {
        matches!(self, CpaError::Config(_))
    }
}

/// Result type alias for cpa-pointer operations
pub type Result<T> = std::result::Result<T, CpaError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn load_and_fail() -> Result<()> {
        let config = crate::config::PointerAnalysisConfig::from_yaml_str("version: 7\npreset: fast\n")?;
        config.validate()?;
        Ok(())
    }

    #[test]
    fn test_conversions() {
        let err = load_and_fail().expect_err("unsupported version");
        assert!(err.is_config());
        assert!(err.to_string().starts_with("Configuration error"));

        let err: CpaError = PointerAnalysisError::PathTooLong { length: 3, limit: 2 }.into();
        assert!(!err.is_config());
        assert_eq!(err.to_string(), "Analysis error: Path of 3 edges exceeds the limit of 2");
    }
}
