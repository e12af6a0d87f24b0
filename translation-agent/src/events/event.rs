//! Lifecycle events of a translation run.

use crate::core::{RunIdentity, StageKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Event type names.
pub mod types {
    /// A run accepted its request.
    pub const PIPELINE_STARTED: &str = "pipeline.started";
    /// A run returned its final translation.
    pub const PIPELINE_COMPLETED: &str = "pipeline.completed";
    /// A run aborted.
    pub const PIPELINE_FAILED: &str = "pipeline.failed";
    /// A stage issued its model call.
    pub const STAGE_STARTED: &str = "stage.started";
    /// A stage received its output.
    pub const STAGE_COMPLETED: &str = "stage.completed";
    /// A stage's model call failed.
    pub const STAGE_FAILED: &str = "stage.failed";
}

/// An event emitted while a run progresses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationEvent {
    /// The event type (e.g., "stage.started").
    #[serde(rename = "type")]
    pub event_type: String,

    /// When the event occurred (RFC 3339).
    pub timestamp: String,

    /// The event payload.
    #[serde(default)]
    pub data: HashMap<String, serde_json::Value>,
}

impl TranslationEvent {
    /// Creates an event for a run.
    #[must_use]
    pub fn new(event_type: impl Into<String>, pipeline_run_id: Uuid) -> Self {
        let mut data = HashMap::new();
        data.insert(
            "pipeline_run_id".to_string(),
            serde_json::json!(pipeline_run_id.to_string()),
        );
        Self {
            event_type: event_type.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            data,
        }
    }

    /// Adds a data field to the event.
    #[must_use]
    pub fn add_data(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    /// Returns the payload as a JSON object, timestamp included.
    #[must_use]
    pub fn payload(&self) -> serde_json::Value {
        let mut map: serde_json::Map<String, serde_json::Value> =
            self.data.clone().into_iter().collect();
        map.insert("timestamp".to_string(), serde_json::json!(self.timestamp));
        serde_json::Value::Object(map)
    }

    /// Creates a "pipeline.started" event. Carries the caller's request ID when set.
    #[must_use]
    pub fn pipeline_started(identity: &RunIdentity, source_lang: &str, target_lang: &str, model: &str) -> Self {
        let mut event = Self::new(types::PIPELINE_STARTED, identity.pipeline_run_id);
        event.data.extend(identity.to_dict());
        event
            .add_data("source_lang", serde_json::json!(source_lang))
            .add_data("target_lang", serde_json::json!(target_lang))
            .add_data("model", serde_json::json!(model))
    }

    /// Creates a "pipeline.completed" event.
    ///
    /// `duration_ms` is the whole run; `stage_duration_ms` only the time spent
    /// waiting on model calls.
    #[must_use]
    pub fn pipeline_completed(run_id: Uuid, duration_ms: f64, stage_duration_ms: f64) -> Self {
        Self::new(types::PIPELINE_COMPLETED, run_id)
            .add_data("duration_ms", serde_json::json!(duration_ms))
            .add_data("stage_duration_ms", serde_json::json!(stage_duration_ms))
    }

    /// Creates a "pipeline.failed" event.
    #[must_use]
    pub fn pipeline_failed(run_id: Uuid, error: &str, stage: Option<StageKind>) -> Self {
        let event = Self::new(types::PIPELINE_FAILED, run_id).add_data("error", serde_json::json!(error));
        match stage {
            Some(stage) => event.add_data("stage", serde_json::json!(stage)),
            None => event,
        }
    }

    /// Creates a "stage.started" event.
    #[must_use]
    pub fn stage_started(run_id: Uuid, stage: StageKind) -> Self {
        Self::new(types::STAGE_STARTED, run_id).add_data("stage", serde_json::json!(stage))
    }

    /// Creates a "stage.completed" event.
    #[must_use]
    pub fn stage_completed(run_id: Uuid, stage: StageKind, duration_ms: f64, output_chars: usize) -> Self {
        Self::new(types::STAGE_COMPLETED, run_id)
            .add_data("stage", serde_json::json!(stage))
            .add_data("duration_ms", serde_json::json!(duration_ms))
            .add_data("output_chars", serde_json::json!(output_chars))
    }

    /// Creates a "stage.failed" event.
    #[must_use]
    pub fn stage_failed(run_id: Uuid, stage: StageKind, duration_ms: f64, error: &str) -> Self {
        Self::new(types::STAGE_FAILED, run_id)
            .add_data("stage", serde_json::json!(stage))
            .add_data("duration_ms", serde_json::json!(duration_ms))
            .add_data("error", serde_json::json!(error))
    }
}
