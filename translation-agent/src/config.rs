//! Configuration for the completion client and the pipeline.
//!
//! Settings are read once at startup, validated, and then passed down
//! explicitly. Nothing here is global and nothing is reloaded.

use crate::errors::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Environment variable holding the provider API key (required).
pub const ENV_API_KEY: &str = "TAIDE_API_KEY";
/// Environment variable overriding the endpoint base URL.
pub const ENV_BASE_URL: &str = "TRANSLATION_BASE_URL";
/// Environment variable overriding the model identifier.
pub const ENV_MODEL: &str = "TRANSLATION_MODEL";
/// Environment variable overriding the request timeout, in whole seconds.
pub const ENV_TIMEOUT_SECS: &str = "TRANSLATION_TIMEOUT_SECS";
/// Environment variable overriding the source size limit; `0` disables it.
pub const ENV_MAX_SOURCE_TOKENS: &str = "TRANSLATION_MAX_SOURCE_TOKENS";

/// Settings for the HTTP completion client.
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Endpoint root; `/chat/completions` is appended.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer credential.
    #[serde(skip_serializing)]
    pub api_key: String,
    /// Model identifier sent with every call.
    #[serde(default = "default_model")]
    pub model: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// User agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "https://td.nchc.org.tw/api/v1".to_string()
}

fn default_model() -> String {
    "taide-llama2-70b".to_string()
}

fn default_timeout() -> u64 {
    120
}

fn default_user_agent() -> String {
    concat!("translation-agent/", env!("CARGO_PKG_VERSION")).to_string()
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"***")
            .field("model", &self.model)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl ClientConfig {
    /// Creates a client configuration with defaults and the given key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: default_base_url(),
            api_key: api_key.into(),
            model: default_model(),
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
        }
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the model identifier.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the timeout.
    #[must_use]
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Gets timeout as Duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Full URL of the chat completions endpoint.
    #[must_use]
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// Checks that the client can be built from these settings.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigurationError::missing(ENV_API_KEY));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigurationError::invalid(
                ENV_BASE_URL,
                format!("expected an http(s) URL, got '{}'", self.base_url),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigurationError::invalid(ENV_MODEL, "model identifier is empty"));
        }
        if self.timeout_seconds == 0 {
            return Err(ConfigurationError::invalid(
                ENV_TIMEOUT_SECS,
                "timeout must be at least one second",
            ));
        }
        Ok(())
    }
}

/// Sampling settings shared by every stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Sampling temperature, `0..=1`.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Nucleus sampling mass, `0 < top_p <= 1`.
    #[serde(default = "default_top_p")]
    pub top_p: f32,
}

fn default_temperature() -> f32 {
    0.3
}

fn default_top_p() -> f32 {
    1.0
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            top_p: default_top_p(),
        }
    }
}

impl SamplingConfig {
    /// Checks both values are in range.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(ConfigurationError::invalid(
                "temperature",
                format!("must be within [0, 1], got {}", self.temperature),
            ));
        }
        if !(self.top_p > 0.0 && self.top_p <= 1.0) {
            return Err(ConfigurationError::invalid(
                "top_p",
                format!("must be within (0, 1], got {}", self.top_p),
            ));
        }
        Ok(())
    }
}

/// Settings for the translation pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Sampling values applied to every stage call.
    #[serde(default)]
    pub sampling: SamplingConfig,
    /// Largest accepted source, in estimated tokens. `None` accepts anything.
    #[serde(default = "default_max_source_tokens")]
    pub max_source_tokens: Option<usize>,
}

#[allow(clippy::unnecessary_wraps)]
fn default_max_source_tokens() -> Option<usize> {
    Some(1000)
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sampling: SamplingConfig::default(),
            max_source_tokens: default_max_source_tokens(),
        }
    }
}

impl PipelineConfig {
    /// Creates a pipeline configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source size limit.
    #[must_use]
    pub fn with_max_source_tokens(mut self, limit: Option<usize>) -> Self {
        self.max_source_tokens = limit;
        self
    }

    /// Sets the sampling values.
    #[must_use]
    pub fn with_sampling(mut self, sampling: SamplingConfig) -> Self {
        self.sampling = sampling;
        self
    }

    /// Checks the sampling values.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.sampling.validate()
    }
}

/// Everything the application needs at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Completion client settings.
    pub client: ClientConfig,
    /// Pipeline settings.
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl AppConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_key = get(ENV_API_KEY).ok_or_else(|| ConfigurationError::missing(ENV_API_KEY))?;
        let mut client = ClientConfig::new(api_key);

        if let Some(base_url) = get(ENV_BASE_URL) {
            client.base_url = base_url;
        }
        if let Some(model) = get(ENV_MODEL) {
            client.model = model;
        }
        if let Some(raw) = get(ENV_TIMEOUT_SECS) {
            client.timeout_seconds = parse_number(ENV_TIMEOUT_SECS, &raw)?;
        }

        let mut pipeline = PipelineConfig::default();
        if let Some(raw) = get(ENV_MAX_SOURCE_TOKENS) {
            let limit: usize = parse_number(ENV_MAX_SOURCE_TOKENS, &raw)?;
            pipeline.max_source_tokens = (limit > 0).then_some(limit);
        }

        let config = Self { client, pipeline };
        config.validate()?;
        Ok(config)
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.client.validate()?;
        self.pipeline.validate()
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigurationError> {
    raw.parse()
        .map_err(|_| ConfigurationError::invalid(key, format!("expected a non-negative integer, got '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[(ENV_API_KEY, "secret")])).unwrap();

        assert_eq!(config.client.base_url, "https://td.nchc.org.tw/api/v1");
        assert_eq!(config.client.model, "taide-llama2-70b");
        assert_eq!(config.client.timeout(), Duration::from_secs(120));
        assert_eq!(config.pipeline.max_source_tokens, Some(1000));
        assert_eq!(config.pipeline.sampling, SamplingConfig::default());
    }

    #[test]
    fn test_missing_key_fails() {
        let err = AppConfig::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err.key, ENV_API_KEY);

        let err = AppConfig::from_lookup(lookup(&[(ENV_API_KEY, "   ")])).unwrap_err();
        assert_eq!(err.key, ENV_API_KEY);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            (ENV_API_KEY, "secret"),
            (ENV_BASE_URL, "http://localhost:8080/v1/"),
            (ENV_MODEL, "llama3"),
            (ENV_TIMEOUT_SECS, "30"),
            (ENV_MAX_SOURCE_TOKENS, "0"),
        ]))
        .unwrap();

        assert_eq!(config.client.completions_url(), "http://localhost:8080/v1/chat/completions");
        assert_eq!(config.client.model, "llama3");
        assert_eq!(config.client.timeout_seconds, 30);
        assert_eq!(config.pipeline.max_source_tokens, None);
    }

    #[test]
    fn test_bad_numbers_rejected() {
        let err = AppConfig::from_lookup(lookup(&[(ENV_API_KEY, "k"), (ENV_TIMEOUT_SECS, "soon")]))
            .unwrap_err();
        assert_eq!(err.key, ENV_TIMEOUT_SECS);

        let err = AppConfig::from_lookup(lookup(&[(ENV_API_KEY, "k"), (ENV_TIMEOUT_SECS, "0")]))
            .unwrap_err();
        assert_eq!(err.key, ENV_TIMEOUT_SECS);

        let err = AppConfig::from_lookup(lookup(&[(ENV_API_KEY, "k"), (ENV_MAX_SOURCE_TOKENS, "-5")]))
            .unwrap_err();
        assert_eq!(err.key, ENV_MAX_SOURCE_TOKENS);
    }

    #[test]
    fn test_bad_base_url_rejected() {
        let err = AppConfig::from_lookup(lookup(&[(ENV_API_KEY, "k"), (ENV_BASE_URL, "td.nchc.org.tw")]))
            .unwrap_err();
        assert_eq!(err.key, ENV_BASE_URL);
    }

    #[test]
    fn test_sampling_ranges() {
        assert!(SamplingConfig::default().validate().is_ok());
        assert!(SamplingConfig { temperature: 0.0, top_p: 1.0 }.validate().is_ok());
        assert!(SamplingConfig { temperature: 1.5, top_p: 1.0 }.validate().is_err());
        assert!(SamplingConfig { temperature: -0.1, top_p: 1.0 }.validate().is_err());
        assert!(SamplingConfig { temperature: 0.3, top_p: 0.0 }.validate().is_err());
        assert!(SamplingConfig { temperature: 0.3, top_p: 1.01 }.validate().is_err());
    }

    #[test]
    fn test_debug_masks_api_key() {
        let config = ClientConfig::new("sk-very-secret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-very-secret"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn test_serialize_omits_api_key() {
        let json = serde_json::to_value(ClientConfig::new("sk-very-secret")).unwrap();
        assert!(json.get("api_key").is_none());
        assert_eq!(json["model"], "taide-llama2-70b");
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"client": {"api_key": "k"}}"#).unwrap();
        assert_eq!(config.client.timeout_seconds, 120);
        assert_eq!(config.pipeline.max_source_tokens, Some(1000));
        assert!(config.validate().is_ok());
    }
}
