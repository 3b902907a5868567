//! Configuration for the analysis client and poller

use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tradex_utils::{env_flag, env_parse, env_var};
use url::Url;

/// Local backend address used when nothing else is configured
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

/// Fixed interval between two polls of the same analysis
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3000);

pub const ENV_API_BASE: &str = "TRADEX_API_BASE_URL";
pub const ENV_POLL_INTERVAL_MS: &str = "TRADEX_POLL_INTERVAL_MS";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "TRADEX_REQUEST_TIMEOUT_SECS";
pub const ENV_STOP_ON_LLM_FAILURE: &str = "TRADEX_STOP_ON_LLM_FAILURE";

/// Configuration for analysis operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Base URL of the analysis backend
    pub api_base: String,

    /// Cadence between fetches while polling
    pub poll_interval: Duration,

    /// Timeout for a single create or fetch call
    pub request_timeout: Duration,

    /// Stop polling once the backend reports the interpretation as failed
    pub stop_on_llm_failure: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: Duration::from_secs(30),
            stop_on_llm_failure: true,
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration builder
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Defaults overlaid with any `TRADEX_*` environment overrides
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    /// Apply environment overrides on top of the current values
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Some(base) = env_var(ENV_API_BASE) {
            self.api_base = base;
        }
        if let Some(ms) = env_parse::<u64>(ENV_POLL_INTERVAL_MS)? {
            self.poll_interval = Duration::from_millis(ms);
        }
        if let Some(secs) = env_parse::<u64>(ENV_REQUEST_TIMEOUT_SECS)? {
            self.request_timeout = Duration::from_secs(secs);
        }
        if let Some(stop) = env_flag(ENV_STOP_ON_LLM_FAILURE)? {
            self.stop_on_llm_failure = stop;
        }
        self.validate()?;
        Ok(self)
    }

    /// Parsed base URL, always ending in a slash so relative joins append
    pub fn api_base_url(&self) -> Result<Url> {
        let mut raw = self.api_base.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let url = Url::parse(&raw)?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(AnalysisError::ConfigError(format!(
                "unsupported scheme '{other}' in {ENV_API_BASE}"
            ))),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.api_base_url()?;

        if self.poll_interval.is_zero() {
            return Err(AnalysisError::ConfigError(
                "poll_interval must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(AnalysisError::ConfigError(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for AnalysisConfig
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    api_base: Option<String>,
    poll_interval: Option<Duration>,
    request_timeout: Option<Duration>,
    stop_on_llm_failure: Option<bool>,
}

impl AnalysisConfigBuilder {
    /// Set the backend base URL
    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = Some(base.into());
        self
    }

    /// Set the poll cadence
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn stop_on_llm_failure(mut self, stop: bool) -> Self {
        self.stop_on_llm_failure = Some(stop);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AnalysisConfig> {
        let defaults = AnalysisConfig::default();

        let config = AnalysisConfig {
            api_base: self.api_base.unwrap_or(defaults.api_base),
            poll_interval: self.poll_interval.unwrap_or(defaults.poll_interval),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            stop_on_llm_failure: self
                .stop_on_llm_failure
                .unwrap_or(defaults.stop_on_llm_failure),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.api_base, "http://localhost:8000");
        assert_eq!(config.poll_interval, Duration::from_millis(3000));
        assert!(config.stop_on_llm_failure);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = AnalysisConfig::builder()
            .api_base("https://api.example.com/v1")
            .poll_interval(Duration::from_millis(500))
            .stop_on_llm_failure(false)
            .build()
            .unwrap();

        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert!(!config.stop_on_llm_failure);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let config = AnalysisConfig::builder()
            .api_base("https://api.example.com/v1")
            .build()
            .unwrap();

        let url = config.api_base_url().unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/");
        assert_eq!(
            url.join("analysis/").unwrap().as_str(),
            "https://api.example.com/v1/analysis/"
        );
    }

    #[test]
    fn test_invalid_config() {
        assert!(AnalysisConfig::builder().api_base("not a url").build().is_err());
        assert!(
            AnalysisConfig::builder()
                .api_base("ftp://example.com")
                .build()
                .is_err()
        );
        assert!(
            AnalysisConfig::builder()
                .poll_interval(Duration::ZERO)
                .build()
                .is_err()
        );
    }

    // Only test in this crate that touches TRADEX_* variables
    #[test]
    #[allow(unsafe_code)]
    fn test_env_overrides() {
        let vars = [
            (ENV_API_BASE, "https://analysis.internal:9443"),
            (ENV_POLL_INTERVAL_MS, "750"),
            (ENV_REQUEST_TIMEOUT_SECS, " 12 "),
            (ENV_STOP_ON_LLM_FAILURE, "off"),
        ];
        // SAFETY: no other test in this binary reads or writes these variables
        unsafe {
            for (name, value) in vars {
                std::env::set_var(name, value);
            }
        }

        let config = AnalysisConfig::from_env();

        unsafe {
            std::env::set_var(ENV_POLL_INTERVAL_MS, "soon");
        }
        let malformed = AnalysisConfig::default().with_env_overrides();

        unsafe {
            std::env::set_var(ENV_POLL_INTERVAL_MS, "0");
        }
        let zero = AnalysisConfig::from_env();

        unsafe {
            for (name, _) in vars {
                std::env::remove_var(name);
            }
        }

        let config = config.unwrap();
        assert_eq!(config.api_base, "https://analysis.internal:9443");
        assert_eq!(config.poll_interval, Duration::from_millis(750));
        assert_eq!(config.request_timeout, Duration::from_secs(12));
        assert!(!config.stop_on_llm_failure);

        match malformed {
            Err(AnalysisError::ConfigError(msg)) => {
                assert!(msg.contains(ENV_POLL_INTERVAL_MS));
                assert!(msg.contains("soon"));
            }
            other => panic!("expected ConfigError, got {other:?}"),
        }
        assert!(matches!(zero, Err(AnalysisError::ConfigError(_))));
    }
}
