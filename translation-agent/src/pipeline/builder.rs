//! Pipeline builder with validation.

use super::TranslationPipeline;
use crate::client::CompletionClient;
use crate::config::{PipelineConfig, SamplingConfig};
use crate::errors::ConfigurationError;
use crate::events::{EventSink, NoOpEventSink};
use std::sync::Arc;

/// Model used when the builder is not given one.
pub const DEFAULT_MODEL: &str = "taide-llama2-70b";

/// Builder for [`TranslationPipeline`].
#[derive(Default)]
pub struct TranslationPipelineBuilder {
    client: Option<Arc<dyn CompletionClient>>,
    events: Option<Arc<dyn EventSink>>,
    model: Option<String>,
    config: PipelineConfig,
}

impl std::fmt::Debug for TranslationPipelineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationPipelineBuilder")
            .field("has_client", &self.client.is_some())
            .field("has_events", &self.events.is_some())
            .field("model", &self.model)
            .field("config", &self.config)
            .finish()
    }
}

impl TranslationPipelineBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the completion client. Required.
    #[must_use]
    pub fn client(mut self, client: Arc<dyn CompletionClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Sets the event sink. Defaults to [`NoOpEventSink`].
    #[must_use]
    pub fn events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = Some(events);
        self
    }

    /// Sets the model identifier.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Replaces the whole pipeline configuration.
    #[must_use]
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the sampling values.
    #[must_use]
    pub fn sampling(mut self, sampling: SamplingConfig) -> Self {
        self.config.sampling = sampling;
        self
    }

    /// Sets the source size limit. `None` disables the check.
    #[must_use]
    pub fn max_source_tokens(mut self, limit: Option<usize>) -> Self {
        self.config.max_source_tokens = limit;
        self
    }

    /// Builds the pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if no client was set, the model is blank, or the
    /// sampling values are out of range.
    pub fn build(self) -> Result<TranslationPipeline, ConfigurationError> {
        let client = self.client.ok_or_else(|| ConfigurationError::missing("client"))?;

        let model = self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string());
        if model.trim().is_empty() {
            return Err(ConfigurationError::invalid("model", "model identifier is empty"));
        }
        self.config.validate()?;

        Ok(TranslationPipeline {
            client,
            events: self.events.unwrap_or_else(|| Arc::new(NoOpEventSink)),
            model,
            config: self.config,
        })
    }
}

#[cfg(feature = "http")]
impl TranslationPipeline {
    /// Builds a pipeline backed by the HTTP client described in `config`.
    pub fn from_config(
        config: &crate::config::AppConfig,
        events: Arc<dyn EventSink>,
    ) -> Result<Self, ConfigurationError> {
        let client = crate::client::OpenAiCompatibleClient::new(config.client.clone())?;
        Self::builder()
            .client(Arc::new(client))
            .events(events)
            .model(config.client.model.clone())
            .config(config.pipeline.clone())
            .build()
    }
}
