//! Parameters for a single model call.

use serde::{Deserialize, Serialize};

/// System message used when the caller does not supply one.
pub const DEFAULT_SYSTEM_MESSAGE: &str = "You are a helpful assistant.";

/// Everything a [`CompletionClient`](crate::client::CompletionClient) needs for one call.
///
/// This is the only shape that crosses into the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelCallParameters {
    /// User prompt.
    pub prompt: String,
    /// System instruction sent ahead of the prompt.
    pub system_message: String,
    /// Backing model identifier.
    pub model_identifier: String,
    /// Sampling temperature in `[0, 1]`.
    pub temperature: f32,
    /// Nucleus sampling mass.
    pub top_p: f32,
    /// Ask the provider for a JSON object instead of free text.
    #[serde(default)]
    pub json_mode: bool,
}

impl ModelCallParameters {
    /// Creates parameters with the default system message, temperature 0.3 and `top_p` 1.
    #[must_use]
    pub fn new(prompt: impl Into<String>, model_identifier: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system_message: DEFAULT_SYSTEM_MESSAGE.to_string(),
            model_identifier: model_identifier.into(),
            temperature: 0.3,
            top_p: 1.0,
            json_mode: false,
        }
    }

    /// Sets the system message.
    #[must_use]
    pub fn with_system_message(mut self, system_message: impl Into<String>) -> Self {
        self.system_message = system_message.into();
        self
    }

    /// Sets the temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets `top_p`.
    #[must_use]
    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p;
        self
    }

    /// Enables or disables JSON output.
    #[must_use]
    pub fn with_json_mode(mut self, json_mode: bool) -> Self {
        self.json_mode = json_mode;
        self
    }
}
