//! Error types for analysis request/poll operations

use thiserror::Error;

/// Analysis lifecycle errors
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The symbol was blank after normalization; nothing was submitted
    #[error("Invalid symbol: {0:?}")]
    InvalidSymbol(String),

    /// The create call failed
    #[error("Submission failed: {0}")]
    SubmissionFailed(String),

    /// A fetch call failed
    #[error("Poll failed: {0}")]
    PollFailed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl AnalysisError {
    /// Whether this is a local validation failure rather than a remote one
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidSymbol(_))
    }
}

/// Result type alias for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

impl From<tradex_utils::EnvError> for AnalysisError {
    fn from(err: tradex_utils::EnvError) -> Self {
        AnalysisError::ConfigError(err.to_string())
    }
}

impl From<url::ParseError> for AnalysisError {
    fn from(err: url::ParseError) -> Self {
        AnalysisError::ConfigError(format!("invalid URL: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AnalysisError::InvalidSymbol("   ".to_string());
        assert_eq!(err.to_string(), "Invalid symbol: \"   \"");
        assert!(err.is_validation());

        let err = AnalysisError::PollFailed("HTTP 502".to_string());
        assert_eq!(err.to_string(), "Poll failed: HTTP 502");
        assert!(!err.is_validation());
    }

    #[test]
    fn test_error_conversion() {
        let parse_err = url::Url::parse("not a url").unwrap_err();
        let err: AnalysisError = parse_err.into();

        match err {
            AnalysisError::ConfigError(msg) => assert!(msg.contains("invalid URL")),
            _ => panic!("Expected ConfigError variant"),
        }
    }
}
