use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_NEXT_STEP_ROUTE: &str = "/career-assessment";
pub const DEFAULT_FALLBACK_ERROR: &str = "Failed to save details";
pub const DEFAULT_WIZARD_STEP: u8 = 1;
pub const MAX_WIZARD_STEP: u8 = 16;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Validation(String),
}

/// Per-session settings supplied by the shell when the form opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Route the wizard advances to after a successful save.
    pub next_step_route: String,
    /// Shown when a failed save carries no message of its own.
    pub fallback_error_message: String,
    pub wizard_step: u8,
    pub enforce_required_fields: bool,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            next_step_route: DEFAULT_NEXT_STEP_ROUTE.to_string(),
            fallback_error_message: DEFAULT_FALLBACK_ERROR.to_string(),
            wizard_step: DEFAULT_WIZARD_STEP,
            enforce_required_fields: true,
        }
    }
}

impl FormConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.next_step_route.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "next_step_route must be an absolute path, got '{}'",
                self.next_step_route
            )));
        }
        if self.fallback_error_message.trim().is_empty() {
            return Err(ConfigError::Validation(
                "fallback_error_message must not be empty".into(),
            ));
        }
        if self.wizard_step == 0 || self.wizard_step > MAX_WIZARD_STEP {
            return Err(ConfigError::Validation(format!(
                "wizard_step must be in 1..={MAX_WIZARD_STEP}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = FormConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.next_step_route, "/career-assessment");
        assert_eq!(config.fallback_error_message, "Failed to save details");
        assert_eq!(config.wizard_step, 1);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = FormConfig::from_json(r#"{"wizard_step": 2}"#).unwrap();
        assert_eq!(config.wizard_step, 2);
        assert_eq!(config.next_step_route, DEFAULT_NEXT_STEP_ROUTE);
        assert!(config.enforce_required_fields);
    }

    #[test]
    fn test_relative_route_rejected() {
        let err = FormConfig::from_json(r#"{"next_step_route": "career"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_blank_fallback_rejected() {
        let config = FormConfig {
            fallback_error_message: "   ".into(),
            ..FormConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_step_rejected() {
        assert!(FormConfig::from_json(r#"{"wizard_step": 0}"#).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(
            FormConfig::from_json("not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
