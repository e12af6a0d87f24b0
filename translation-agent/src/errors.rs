//! Error types for the translation pipeline.
//!
//! Two failures matter to callers: a model call that could not produce text
//! ([`GenerationFailure`]) and a startup configuration problem
//! ([`ConfigurationError`]). Everything else is a usage error.

use crate::core::{PipelinePhase, StageKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// The main error type returned by the pipeline.
#[derive(Debug, Error)]
pub enum TranslationError {
    /// A model call failed. The run was aborted at that stage.
    #[error("{0}")]
    Generation(#[from] GenerationFailure),

    /// Credentials, endpoint or sampling settings are missing or invalid.
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),

    /// The source text is above the configured single-pass budget.
    #[error(
        "Source text too large: about {estimated_tokens} tokens, limit is {max_tokens}"
    )]
    SourceTooLarge {
        /// Estimated token count of the source text.
        estimated_tokens: usize,
        /// Configured limit.
        max_tokens: usize,
    },

    /// A stage result was recorded out of order.
    #[error("{0}")]
    InvalidState(#[from] StateTransitionError),
}

impl TranslationError {
    /// Returns the generation failure, if that is what this is.
    #[must_use]
    pub fn as_generation_failure(&self) -> Option<&GenerationFailure> {
        match self {
            Self::Generation(failure) => Some(failure),
            _ => None,
        }
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        match self {
            Self::Generation(failure) => failure.to_dict(),
            Self::Configuration(err) => err.to_dict(),
            Self::SourceTooLarge {
                estimated_tokens,
                max_tokens,
            } => {
                let mut map = HashMap::new();
                map.insert("type".to_string(), serde_json::json!("SourceTooLarge"));
                map.insert("estimated_tokens".to_string(), serde_json::json!(estimated_tokens));
                map.insert("max_tokens".to_string(), serde_json::json!(max_tokens));
                map.insert("message".to_string(), serde_json::json!(self.to_string()));
                map
            }
            Self::InvalidState(err) => {
                let mut map = HashMap::new();
                map.insert("type".to_string(), serde_json::json!("InvalidState"));
                map.insert("phase".to_string(), serde_json::json!(err.phase));
                map.insert("stage".to_string(), serde_json::json!(err.stage));
                map.insert("message".to_string(), serde_json::json!(self.to_string()));
                map
            }
        }
    }
}

/// Broad cause of a [`GenerationFailure`].
///
/// The pipeline does not branch on this; it exists for diagnostics and for
/// front ends that want a friendlier message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationFailureKind {
    /// Connection could not be established or was dropped.
    Network,
    /// The request did not complete within the client timeout.
    Timeout,
    /// The provider rejected the credential.
    Authentication,
    /// The provider throttled the request.
    RateLimited,
    /// The provider answered with a non-success status.
    Provider,
    /// The response body did not contain generated text.
    MalformedResponse,
}

impl fmt::Display for GenerationFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network => write!(f, "network"),
            Self::Timeout => write!(f, "timeout"),
            Self::Authentication => write!(f, "authentication"),
            Self::RateLimited => write!(f, "rate_limited"),
            Self::Provider => write!(f, "provider"),
            Self::MalformedResponse => write!(f, "malformed_response"),
        }
    }
}

/// A model call could not produce text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationFailure {
    /// Broad cause.
    pub kind: GenerationFailureKind,
    /// Human-readable detail.
    pub message: String,
    /// HTTP status, when the provider returned one.
    pub status: Option<u16>,
    /// Stage that issued the call, filled in by the pipeline.
    pub stage: Option<StageKind>,
}

impl fmt::Display for GenerationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Generation failed ({})", self.kind)?;
        if let Some(stage) = self.stage {
            write!(f, " during {stage} stage")?;
        }
        if let Some(status) = self.status {
            write!(f, " [HTTP {status}]")?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for GenerationFailure {}

impl GenerationFailure {
    /// Creates a new generation failure.
    #[must_use]
    pub fn new(kind: GenerationFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            stage: None,
        }
    }

    /// Creates a network failure.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GenerationFailureKind::Network, message)
    }

    /// Creates a timeout failure.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(GenerationFailureKind::Timeout, message)
    }

    /// Creates an authentication failure.
    #[must_use]
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(GenerationFailureKind::Authentication, message)
    }

    /// Creates a rate-limit failure.
    #[must_use]
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(GenerationFailureKind::RateLimited, message)
    }

    /// Creates a provider-side failure.
    #[must_use]
    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(GenerationFailureKind::Provider, message)
    }

    /// Creates a malformed-response failure.
    #[must_use]
    pub fn malformed_response(message: impl Into<String>) -> Self {
        Self::new(GenerationFailureKind::MalformedResponse, message)
    }

    /// Sets the HTTP status.
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Records the stage that issued the failing call.
    #[must_use]
    pub fn at_stage(mut self, stage: StageKind) -> Self {
        self.stage = Some(stage);
        self
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("type".to_string(), serde_json::json!("GenerationFailure"));
        map.insert("kind".to_string(), serde_json::json!(self.kind));
        map.insert("message".to_string(), serde_json::json!(self.message));
        if let Some(status) = self.status {
            map.insert("status".to_string(), serde_json::json!(status));
        }
        if let Some(stage) = self.stage {
            map.insert("stage".to_string(), serde_json::json!(stage));
        }
        map
    }
}

/// Missing or invalid configuration, detected before any translation runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Configuration error for '{key}': {message}")]
pub struct ConfigurationError {
    /// The offending setting (usually an environment variable name).
    pub key: String,
    /// What is wrong with it.
    pub message: String,
}

impl ConfigurationError {
    /// Creates a new configuration error.
    #[must_use]
    pub fn new(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            message: message.into(),
        }
    }

    /// A required setting is absent.
    #[must_use]
    pub fn missing(key: impl Into<String>) -> Self {
        Self::new(key, "required setting is not set")
    }

    /// A setting is present but unusable.
    #[must_use]
    pub fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(key, message)
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("type".to_string(), serde_json::json!("ConfigurationError"));
        map.insert("key".to_string(), serde_json::json!(self.key));
        map.insert("message".to_string(), serde_json::json!(self.message));
        map
    }
}

/// A stage result arrived while the run was in the wrong phase.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Cannot record {stage} output while the run is {phase}")]
pub struct StateTransitionError {
    /// Phase the run was in.
    pub phase: PipelinePhase,
    /// Stage whose output was offered.
    pub stage: StageKind,
}

impl StateTransitionError {
    /// Creates a new transition error.
    #[must_use]
    pub fn new(phase: PipelinePhase, stage: StageKind) -> Self {
        Self { phase, stage }
    }
}

/// Result alias used across the crate.
pub type TranslationResult<T> = Result<T, TranslationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_failure_display() {
        let err = GenerationFailure::rate_limited("slow down")
            .with_status(429)
            .at_stage(StageKind::Reflect);

        let msg = err.to_string();
        assert!(msg.contains("rate_limited"));
        assert!(msg.contains("reflect"));
        assert!(msg.contains("429"));
        assert!(msg.ends_with("slow down"));
    }

    #[test]
    fn test_generation_failure_display_minimal() {
        let err = GenerationFailure::network("connection refused");
        assert_eq!(err.to_string(), "Generation failed (network): connection refused");
    }

    #[test]
    fn test_generation_failure_to_dict() {
        let err = GenerationFailure::authentication("bad key").with_status(401);
        let dict = err.to_dict();

        assert_eq!(dict.get("type").unwrap(), "GenerationFailure");
        assert_eq!(dict.get("kind").unwrap(), "authentication");
        assert_eq!(dict.get("status").unwrap(), 401);
        assert!(!dict.contains_key("stage"));
    }

    #[test]
    fn test_configuration_error() {
        let err = ConfigurationError::missing("TAIDE_API_KEY");
        assert!(err.to_string().contains("TAIDE_API_KEY"));
        assert_eq!(err.to_dict().get("key").unwrap(), "TAIDE_API_KEY");
    }

    #[test]
    fn test_translation_error_from_generation() {
        let err: TranslationError = GenerationFailure::provider("boom").into();
        assert!(err.as_generation_failure().is_some());
        assert_eq!(err.to_dict().get("kind").unwrap(), "provider");
    }

    #[test]
    fn test_source_too_large_dict() {
        let err = TranslationError::SourceTooLarge {
            estimated_tokens: 1200,
            max_tokens: 1000,
        };
        let dict = err.to_dict();
        assert_eq!(dict.get("type").unwrap(), "SourceTooLarge");
        assert!(err.as_generation_failure().is_none());
    }

    #[test]
    fn test_state_transition_error() {
        let err = StateTransitionError::new(PipelinePhase::Start, StageKind::Improve);
        assert_eq!(
            err.to_string(),
            "Cannot record improve output while the run is start"
        );
    }
}
