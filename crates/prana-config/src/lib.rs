//! Runner configuration: the handful of knobs the outer runner needs that
//! aren't part of a workflow definition itself.

use thiserror::Error;
use url::Url;

/// Environment variable consulted by [`RunnerConfig::from_env`].
pub const BASE_URL_VAR: &str = "PRANA_BASE_URL";
const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_WAIT_INLINE_THRESHOLD_MS: u64 = 60_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var}='{value}' is not a valid URL: {source}")]
    InvalidUrl { var: &'static str, value: String, #[source] source: url::ParseError },
}

/// Runner-level settings: where webhook URLs are rooted, and how long a
/// `wait` node may block in-process before it must suspend instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    pub base_url: Url,
    pub wait_inline_threshold_ms: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url is valid"),
            wait_inline_threshold_ms: DEFAULT_WAIT_INLINE_THRESHOLD_MS,
        }
    }
}

impl RunnerConfig {
    /// Load from the environment, falling back to defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Ok(value) = std::env::var(BASE_URL_VAR) {
            config.base_url = parse_base_url(&value)?;
        }
        Ok(config)
    }

    #[must_use]
    pub fn builder() -> RunnerConfigBuilder {
        RunnerConfigBuilder::default()
    }
}

fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|source| ConfigError::InvalidUrl { var: BASE_URL_VAR, value: value.to_string(), source })
}

/// Builder for overriding defaults in tests without touching the environment.
#[derive(Debug, Default)]
pub struct RunnerConfigBuilder {
    base_url: Option<Url>,
    wait_inline_threshold_ms: Option<u64>,
}

impl RunnerConfigBuilder {
    #[must_use]
    pub fn base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    #[must_use]
    pub fn wait_inline_threshold_ms(mut self, ms: u64) -> Self {
        self.wait_inline_threshold_ms = Some(ms);
        self
    }

    #[must_use]
    pub fn build(self) -> RunnerConfig {
        let defaults = RunnerConfig::default();
        RunnerConfig {
            base_url: self.base_url.unwrap_or(defaults.base_url),
            wait_inline_threshold_ms: self.wait_inline_threshold_ms.unwrap_or(defaults.wait_inline_threshold_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_uses_localhost_and_sixty_second_threshold() {
        let config = RunnerConfig::default();
        assert_eq!(config.base_url.as_str(), "http://localhost:8080/");
        assert_eq!(config.wait_inline_threshold_ms, 60_000);
    }

    #[test]
    fn builder_overrides_only_what_is_set() {
        let config = RunnerConfig::builder().wait_inline_threshold_ms(5_000).build();
        assert_eq!(config.wait_inline_threshold_ms, 5_000);
        assert_eq!(config.base_url, RunnerConfig::default().base_url);
    }

    #[test]
    fn parse_base_url_rejects_malformed_urls() {
        let err = parse_base_url("not a url").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));
    }

    #[test]
    fn parse_base_url_accepts_a_well_formed_url() {
        let url = parse_base_url("https://runner.example.com").unwrap();
        assert_eq!(url.host_str(), Some("runner.example.com"));
    }
}
