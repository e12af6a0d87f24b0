//! Per-run pipeline state.

use super::{PipelinePhase, RunIdentity, StageKind, TranslationRequest};
use crate::errors::StateTransitionError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Output of one stage together with its timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageRecord {
    /// Which stage produced this.
    pub stage: StageKind,
    /// Generated text, exactly as the client returned it.
    pub output: String,
    /// When the stage call was issued.
    pub started_at: DateTime<Utc>,
    /// When the response arrived.
    pub completed_at: DateTime<Utc>,
}

impl StageRecord {
    /// Wall-clock duration of the stage in milliseconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration_ms(&self) -> f64 {
        (self.completed_at - self.started_at)
            .num_microseconds()
            .map_or(0.0, |us| us as f64 / 1000.0)
    }
}

/// Everything one translation run has produced so far.
///
/// Owned by a single `translate` invocation and dropped when it returns.
/// Each stage's output is written once, in order; there is no way to
/// overwrite or skip ahead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineState {
    identity: RunIdentity,
    request: TranslationRequest,
    phase: PipelinePhase,
    records: Vec<StageRecord>,
}

impl PipelineState {
    /// Creates the state for a fresh run.
    #[must_use]
    pub fn new(identity: RunIdentity, request: TranslationRequest) -> Self {
        Self {
            identity,
            request,
            phase: PipelinePhase::Start,
            records: Vec::with_capacity(StageKind::ORDER.len()),
        }
    }

    /// Returns the run identity.
    #[must_use]
    pub fn identity(&self) -> &RunIdentity {
        &self.identity
    }

    /// Returns the original request.
    #[must_use]
    pub fn request(&self) -> &TranslationRequest {
        &self.request
    }

    /// Returns the current phase.
    #[must_use]
    pub fn phase(&self) -> PipelinePhase {
        self.phase
    }

    /// Records a stage's output and advances the phase.
    ///
    /// # Errors
    ///
    /// Returns `StateTransitionError` if `stage` is not the next stage to run.
    pub fn record(
        &mut self,
        stage: StageKind,
        output: String,
        started_at: DateTime<Utc>,
    ) -> Result<&StageRecord, StateTransitionError> {
        if stage.requires_phase() != self.phase {
            return Err(StateTransitionError::new(self.phase, stage));
        }

        self.records.push(StageRecord {
            stage,
            output,
            started_at,
            completed_at: Utc::now(),
        });
        self.phase = stage.completes_into();

        Ok(&self.records[self.records.len() - 1])
    }

    /// Returns the record for a stage, if it has run.
    #[must_use]
    pub fn record_for(&self, stage: StageKind) -> Option<&StageRecord> {
        self.records.iter().find(|r| r.stage == stage)
    }

    /// Returns all records in execution order.
    #[must_use]
    pub fn records(&self) -> &[StageRecord] {
        &self.records
    }

    /// The initial translation.
    #[must_use]
    pub fn draft(&self) -> Option<&str> {
        self.output_of(StageKind::Draft)
    }

    /// The critique of the draft.
    #[must_use]
    pub fn critique(&self) -> Option<&str> {
        self.output_of(StageKind::Reflect)
    }

    /// The improved translation.
    #[must_use]
    pub fn final_translation(&self) -> Option<&str> {
        self.output_of(StageKind::Improve)
    }

    /// Consumes the state and returns the final translation, if the run finished.
    #[must_use]
    pub fn into_final_translation(self) -> Option<String> {
        self.records
            .into_iter()
            .find(|r| r.stage == StageKind::Improve)
            .map(|r| r.output)
    }

    /// Total time spent in stage calls, in milliseconds.
    #[must_use]
    pub fn total_duration_ms(&self) -> f64 {
        self.records.iter().map(StageRecord::duration_ms).sum()
    }

    fn output_of(&self, stage: StageKind) -> Option<&str> {
        self.record_for(stage).map(|r| r.output.as_str())
    }
}
