//! Error types
//!
//! Only configuration and startup can fail. Everything the player can do
//! during a session is a policy no-op when illegal, never an error.

use thiserror::Error;

/// Invalid or unparsable game configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config field `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// A required collaborator was unavailable at startup
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("no global window")]
    NoWindow,
    #[error("no document on window")]
    NoDocument,
    #[error("missing required element `#{0}`")]
    MissingElement(String),
    #[error("element `#{0}` is not a canvas")]
    NotACanvas(String),
    #[error("failed to create render surface: {0}")]
    Surface(String),
    #[error("no suitable GPU adapter: {0}")]
    NoAdapter(String),
    #[error("failed to create GPU device: {0}")]
    Device(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_messages() {
        let err = ConfigError::invalid("miss_limit", "must be at least 1");
        assert_eq!(
            err.to_string(),
            "invalid config field `miss_limit`: must be at least 1"
        );

        let err: StartupError = err.into();
        assert!(matches!(err, StartupError::Config(_)));
        assert!(err.to_string().contains("miss_limit"));
    }

    #[test]
    fn test_missing_element_message() {
        let err = StartupError::MissingElement("game-canvas".to_string());
        assert_eq!(err.to_string(), "missing required element `#game-canvas`");
    }
}
