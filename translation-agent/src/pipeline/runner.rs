//! The reflect-and-revise translation pipeline.

use super::digest::prompt_digest;
use super::TranslationPipelineBuilder;
use crate::client::CompletionClient;
use crate::config::PipelineConfig;
use crate::core::{ModelCallParameters, PipelineState, RunIdentity, StageKind, TranslationRequest};
use crate::errors::{StateTransitionError, TranslationError, TranslationResult};
use crate::events::{EventSink, TranslationEvent};
use crate::prompts::{self, Prompt};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};

/// Runs draft, reflect and improve as three dependent model calls.
///
/// Each call waits for the previous one; there is no branching, retry or
/// timeout at this level. The first failure ends the run and is returned
/// as-is. Separate runs share nothing but the client and the event sink,
/// so one pipeline can serve concurrent requests.
#[derive(Clone)]
pub struct TranslationPipeline {
    pub(super) client: Arc<dyn CompletionClient>,
    pub(super) events: Arc<dyn EventSink>,
    pub(super) model: String,
    pub(super) config: PipelineConfig,
}

impl std::fmt::Debug for TranslationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationPipeline")
            .field("provider", &self.client.provider_name())
            .field("model", &self.model)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TranslationPipeline {
    /// Returns a builder.
    #[must_use]
    pub fn builder() -> TranslationPipelineBuilder {
        TranslationPipelineBuilder::new()
    }

    /// Model identifier sent with every call.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Pipeline settings.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Translates `source_text`. An empty or blank `locale_hint` means none.
    pub async fn translate_text(
        &self,
        source_lang: &str,
        target_lang: &str,
        source_text: &str,
        locale_hint: &str,
    ) -> TranslationResult<String> {
        let request =
            TranslationRequest::new(source_lang, target_lang, source_text).with_locale_hint(locale_hint);
        self.translate(&request).await
    }

    /// Runs the pipeline and returns the improved translation.
    pub async fn translate(&self, request: &TranslationRequest) -> TranslationResult<String> {
        let state = self.run(request).await?;
        let phase = state.phase();
        state
            .into_final_translation()
            .ok_or_else(|| StateTransitionError::new(phase, StageKind::Improve).into())
    }

    /// Runs the pipeline and returns every intermediate result.
    pub async fn run(&self, request: &TranslationRequest) -> TranslationResult<PipelineState> {
        self.run_with_identity(request, RunIdentity::new()).await
    }

    /// Like [`run`](Self::run), under a caller-chosen identity.
    pub async fn run_with_identity(
        &self,
        request: &TranslationRequest,
        identity: RunIdentity,
    ) -> TranslationResult<PipelineState> {
        let run_id = identity.pipeline_run_id;
        let span = info_span!(
            "translation",
            run_id = %run_id,
            source_lang = %request.source_lang,
            target_lang = %request.target_lang,
            model = %self.model,
        );

        async move {
            let started = Instant::now();
            self.events
                .emit_event(&TranslationEvent::pipeline_started(
                    &identity,
                    &request.source_lang,
                    &request.target_lang,
                    &self.model,
                ))
                .await;

            match self.execute(request, identity).await {
                Ok(state) => {
                    let duration_ms = elapsed_ms(started);
                    let stage_duration_ms = state.total_duration_ms();
                    info!(duration_ms, stage_duration_ms, "Translation completed");
                    self.events
                        .emit_event(&TranslationEvent::pipeline_completed(
                            run_id,
                            duration_ms,
                            stage_duration_ms,
                        ))
                        .await;
                    Ok(state)
                }
                Err(err) => {
                    let stage = err.as_generation_failure().and_then(|f| f.stage);
                    warn!(error = %err, "Translation failed");
                    self.events
                        .emit_event(&TranslationEvent::pipeline_failed(run_id, &err.to_string(), stage))
                        .await;
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn execute(
        &self,
        request: &TranslationRequest,
        identity: RunIdentity,
    ) -> TranslationResult<PipelineState> {
        self.check_source_size(request)?;
        warn_on_collisions("source_text", &request.source_text);

        let mut state = PipelineState::new(identity, request.clone());
        let (source, target, text) = (
            request.source_lang.as_str(),
            request.target_lang.as_str(),
            request.source_text.as_str(),
        );

        let prompt = prompts::build_initial_translation(source, target, text);
        let draft = self.run_stage(&mut state, StageKind::Draft, prompt).await?;
        warn_on_collisions("draft", &draft);

        let prompt = prompts::build_reflection(source, target, text, &draft, request.locale_hint());
        let critique = self.run_stage(&mut state, StageKind::Reflect, prompt).await?;
        warn_on_collisions("critique", &critique);

        let prompt = prompts::build_improvement(source, target, text, &draft, &critique);
        self.run_stage(&mut state, StageKind::Improve, prompt).await?;

        Ok(state)
    }

    fn check_source_size(&self, request: &TranslationRequest) -> TranslationResult<()> {
        let Some(max_tokens) = self.config.max_source_tokens else {
            return Ok(());
        };
        let estimated_tokens = request.estimated_source_tokens();
        if estimated_tokens > max_tokens {
            return Err(TranslationError::SourceTooLarge {
                estimated_tokens,
                max_tokens,
            });
        }
        Ok(())
    }

    fn call_parameters(&self, prompt: Prompt) -> ModelCallParameters {
        prompt
            .into_params(self.model.clone())
            .with_temperature(self.config.sampling.temperature)
            .with_top_p(self.config.sampling.top_p)
            .with_json_mode(false)
    }

    async fn run_stage(
        &self,
        state: &mut PipelineState,
        stage: StageKind,
        prompt: Prompt,
    ) -> TranslationResult<String> {
        let run_id = state.identity().pipeline_run_id;
        let params = self.call_parameters(prompt);

        debug!(
            stage = %stage,
            prompt_digest = %prompt_digest(&params),
            prompt_chars = params.prompt.chars().count(),
            "Stage started"
        );
        self.events
            .emit_event(&TranslationEvent::stage_started(run_id, stage))
            .await;

        let started_at = Utc::now();
        let timer = Instant::now();

        match self.client.generate(&params).await {
            Ok(output) => {
                let duration_ms = elapsed_ms(timer);
                let output_chars = output.chars().count();
                info!(stage = %stage, duration_ms, output_chars, "Stage completed");
                self.events
                    .emit_event(&TranslationEvent::stage_completed(run_id, stage, duration_ms, output_chars))
                    .await;

                let record = state.record(stage, output, started_at)?;
                Ok(record.output.clone())
            }
            Err(failure) => {
                let duration_ms = elapsed_ms(timer);
                let failure = failure.at_stage(stage);
                warn!(stage = %stage, duration_ms, kind = %failure.kind, error = %failure, "Stage failed");
                self.events
                    .emit_event(&TranslationEvent::stage_failed(
                        run_id,
                        stage,
                        duration_ms,
                        &failure.to_string(),
                    ))
                    .await;
                Err(failure.into())
            }
        }
    }
}

fn warn_on_collisions(field: &str, text: &str) {
    let collisions = prompts::delimiter_collisions(text);
    if !collisions.is_empty() {
        warn!(
            field,
            markers = ?collisions,
            "Text contains prompt delimiter markers; sending it unchanged"
        );
    }
}

fn elapsed_ms(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1000.0
}
