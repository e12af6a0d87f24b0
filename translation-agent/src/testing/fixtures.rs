//! Test fixtures for pipeline testing.

use std::sync::Arc;

use crate::client::{ScriptedCompletionClient, ScriptedReply};
use crate::core::{ModelCallParameters, TranslationRequest};
use crate::events::CollectingEventSink;
use crate::pipeline::{TranslationPipeline, TranslationPipelineBuilder};

/// The reference request: English to Chinese, "Hello, world.".
#[must_use]
pub fn hello_world_request(locale_hint: &str) -> TranslationRequest {
    TranslationRequest::new("English", "Chinese", "Hello, world.").with_locale_hint(locale_hint)
}

/// A pipeline wired to a scripted client and a collecting event sink.
#[derive(Debug)]
pub struct TestFixture {
    /// The client; inspect it for recorded calls.
    pub client: Arc<ScriptedCompletionClient>,
    /// The sink; inspect it for emitted events.
    pub events: Arc<CollectingEventSink>,
    /// The pipeline under test.
    pub pipeline: TranslationPipeline,
}

impl TestFixture {
    /// Builds a fixture whose client replays `replies`.
    #[must_use]
    pub fn scripted<I, R>(replies: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<ScriptedReply>,
    {
        Self::with_client(ScriptedCompletionClient::new(replies), |b| b)
    }

    /// Builds a fixture whose client echoes each prompt.
    #[must_use]
    pub fn echo() -> Self {
        Self::with_client(ScriptedCompletionClient::echo(), |b| b)
    }

    /// Builds a fixture around `client`, letting the caller adjust the builder.
    ///
    /// # Panics
    ///
    /// Panics if the adjusted builder does not produce a valid pipeline.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn with_client(
        client: ScriptedCompletionClient,
        configure: impl FnOnce(TranslationPipelineBuilder) -> TranslationPipelineBuilder,
    ) -> Self {
        let client = Arc::new(client);
        let events = Arc::new(CollectingEventSink::new());
        let builder = TranslationPipeline::builder()
            .client(client.clone())
            .events(events.clone());
        let pipeline = configure(builder).build().expect("test pipeline configuration");

        Self {
            client,
            events,
            pipeline,
        }
    }

    /// Calls made so far.
    #[must_use]
    pub fn calls(&self) -> Vec<ModelCallParameters> {
        self.client.calls()
    }

    /// User prompts sent so far.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.client.prompts()
    }

    /// Event types emitted so far.
    #[must_use]
    pub fn event_types(&self) -> Vec<String> {
        self.events.event_types()
    }
}
