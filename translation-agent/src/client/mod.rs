//! The completion client boundary.
//!
//! The pipeline talks to the language model through [`CompletionClient`]
//! only. Implementations:
//! - [`OpenAiCompatibleClient`]: chat completions over HTTP (`http` feature)
//! - [`ScriptedCompletionClient`]: deterministic replies for tests and dry runs

#[cfg(feature = "http")]
mod openai;
mod scripted;

#[cfg(feature = "http")]
pub use openai::OpenAiCompatibleClient;
pub use scripted::{ScriptedCompletionClient, ScriptedReply};

use crate::core::ModelCallParameters;
use crate::errors::GenerationFailure;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Generates text from a system message and a user prompt.
///
/// One long-lived instance is shared by every translation, so
/// implementations must be safe to call from concurrent tasks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Runs one completion and returns the generated text.
    ///
    /// The text is returned as-is; it may be empty.
    async fn generate(&self, params: &ModelCallParameters) -> Result<String, GenerationFailure>;

    /// Short name of the backing provider, for logs.
    fn provider_name(&self) -> &'static str;
}

/// A completion together with what the provider reported about it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Generated text.
    pub content: String,
    /// Model that answered, as reported by the provider.
    pub model: String,
    /// Provider name.
    pub provider: String,
    /// Prompt tokens, if reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u32>,
    /// Completion tokens, if reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u32>,
    /// Round-trip time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<f64>,
    /// Why generation stopped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

impl CompletionResponse {
    /// Returns total tokens.
    #[must_use]
    pub fn total_tokens(&self) -> u32 {
        self.input_tokens.unwrap_or(0) + self.output_tokens.unwrap_or(0)
    }

    /// Flattens usage into log attributes.
    #[must_use]
    pub fn usage_attributes(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("llm.model".to_string(), serde_json::json!(self.model));
        map.insert("llm.provider".to_string(), serde_json::json!(self.provider));
        if let Some(t) = self.input_tokens {
            map.insert("llm.input_tokens".to_string(), serde_json::json!(t));
        }
        if let Some(t) = self.output_tokens {
            map.insert("llm.output_tokens".to_string(), serde_json::json!(t));
        }
        map.insert("llm.total_tokens".to_string(), serde_json::json!(self.total_tokens()));
        if let Some(l) = self.latency_ms {
            map.insert("llm.latency_ms".to_string(), serde_json::json!(l));
        }
        map
    }
}
