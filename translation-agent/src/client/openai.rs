//! OpenAI-compatible chat completions client.

use super::{CompletionClient, CompletionResponse};
use crate::config::ClientConfig;
use crate::core::ModelCallParameters;
use crate::errors::{ConfigurationError, GenerationFailure};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

const PROVIDER: &str = "openai-compatible";

/// Longest provider error body kept in a failure message.
const MAX_ERROR_BODY_CHARS: usize = 300;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    top_p: f32,
    messages: [ChatMessage<'a>; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: Option<u32>,
    #[serde(default)]
    completion_tokens: Option<u32>,
}

/// Calls `POST {base_url}/chat/completions` on an OpenAI-compatible endpoint.
///
/// No retries: every failure is returned to the caller on first sight.
#[derive(Clone)]
pub struct OpenAiCompatibleClient {
    config: ClientConfig,
    http: reqwest::Client,
}

impl std::fmt::Debug for OpenAiCompatibleClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatibleClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl OpenAiCompatibleClient {
    /// Builds a client from validated settings.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ConfigurationError::invalid("http_client", e.to_string()))?;

        Ok(Self { config, http })
    }

    /// Returns the settings this client was built with.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Runs one completion and returns it with usage details.
    pub async fn complete(
        &self,
        params: &ModelCallParameters,
    ) -> Result<CompletionResponse, GenerationFailure> {
        let started = Instant::now();
        let response = self
            .http
            .post(self.config.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&request_body(params))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_transport_error)?;

        if !status.is_success() {
            return Err(map_status(status.as_u16(), &body));
        }

        let mut completion = parse_response(&body, &params.model_identifier)?;
        completion.latency_ms = Some(started.elapsed().as_secs_f64() * 1000.0);

        debug!(usage = ?completion.usage_attributes(), "Completion received");

        Ok(completion)
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompatibleClient {
    async fn generate(&self, params: &ModelCallParameters) -> Result<String, GenerationFailure> {
        self.complete(params).await.map(|c| c.content)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

fn request_body(params: &ModelCallParameters) -> ChatRequest<'_> {
    ChatRequest {
        model: &params.model_identifier,
        temperature: params.temperature,
        top_p: params.top_p,
        messages: [
            ChatMessage {
                role: "system",
                content: &params.system_message,
            },
            ChatMessage {
                role: "user",
                content: &params.prompt,
            },
        ],
        response_format: params.json_mode.then_some(ResponseFormat {
            kind: "json_object",
        }),
    }
}

fn parse_response(body: &str, requested_model: &str) -> Result<CompletionResponse, GenerationFailure> {
    let parsed: ChatResponse = serde_json::from_str(body).map_err(|e| {
        GenerationFailure::malformed_response(format!("response is not valid completion JSON: {e}"))
    })?;

    let choice = parsed.choices.into_iter().next().ok_or_else(|| {
        GenerationFailure::malformed_response("response contains no choices")
    })?;
    let content = choice
        .message
        .and_then(|m| m.content)
        .ok_or_else(|| GenerationFailure::malformed_response("first choice has no message content"))?;

    Ok(CompletionResponse {
        content,
        model: parsed.model.unwrap_or_else(|| requested_model.to_string()),
        provider: PROVIDER.to_string(),
        input_tokens: parsed.usage.as_ref().and_then(|u| u.prompt_tokens),
        output_tokens: parsed.usage.as_ref().and_then(|u| u.completion_tokens),
        latency_ms: None,
        finish_reason: choice.finish_reason,
    })
}

fn map_status(status: u16, body: &str) -> GenerationFailure {
    let detail: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
    let failure = match status {
        401 | 403 => GenerationFailure::authentication(format!("provider rejected the credential: {detail}")),
        429 => GenerationFailure::rate_limited(format!("provider is throttling requests: {detail}")),
        _ => GenerationFailure::provider(format!("provider returned an error: {detail}")),
    };
    failure.with_status(status)
}

fn map_transport_error(err: reqwest::Error) -> GenerationFailure {
    if err.is_timeout() {
        GenerationFailure::timeout(err.to_string())
    } else if err.is_decode() {
        GenerationFailure::malformed_response(err.to_string())
    } else {
        GenerationFailure::network(err.to_string())
    }
}
