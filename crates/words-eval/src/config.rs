//! Engine configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default bound on loop iterations per program run or tick.
pub const DEFAULT_STEP_LIMIT: u64 = 1_000_000;

/// Tunables for an [`Evaluator`](crate::Evaluator).
///
/// Every field has a default, so a partial JSON document is enough:
/// `{"step_limit": 5000}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Loop iterations allowed before `StepLimitExceeded`; `0` disables the check.
    pub step_limit: u64,
    /// Alias bound to the invoking object inside custom actions and class
    /// listeners.
    pub bind_self_as: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            step_limit: DEFAULT_STEP_LIMIT,
            bind_self_as: "me".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid engine configuration: {0}")]
    Json(#[from] serde_json::Error),
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_step_limit(mut self, step_limit: u64) -> Self {
        self.step_limit = step_limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EngineConfig::from_json(r#"{"step_limit": 50}"#).unwrap();
        assert_eq!(config.step_limit, 50);
        assert_eq!(config.bind_self_as, "me");
    }

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(EngineConfig::from_json("{}").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let err = EngineConfig::from_json(r#"{"step_limit": "lots"}"#).unwrap_err();
        assert!(err.to_string().starts_with("invalid engine configuration"));
    }
}
