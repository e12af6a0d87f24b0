//! Test assertions for pipeline runs.

use crate::core::ModelCallParameters;
use crate::errors::{GenerationFailure, GenerationFailureKind, TranslationError};
use crate::events::CollectingEventSink;

/// Asserts that a call's user prompt contains `needle`.
pub fn assert_prompt_contains(call: &ModelCallParameters, needle: &str) {
    assert!(
        call.prompt.contains(needle),
        "Expected prompt to contain {needle:?}, got:\n{}",
        call.prompt
    );
}

/// Asserts that a call's user prompt does not contain `needle`.
pub fn assert_prompt_lacks(call: &ModelCallParameters, needle: &str) {
    assert!(
        !call.prompt.contains(needle),
        "Expected prompt not to contain {needle:?}, got:\n{}",
        call.prompt
    );
}

/// Asserts the fixed stage sampling: temperature 0.3, `top_p` 1, text output.
pub fn assert_stage_sampling(call: &ModelCallParameters) {
    assert!(
        (call.temperature - 0.3).abs() < f32::EPSILON,
        "Expected temperature 0.3, got {}",
        call.temperature
    );
    assert!(
        (call.top_p - 1.0).abs() < f32::EPSILON,
        "Expected top_p 1, got {}",
        call.top_p
    );
    assert!(!call.json_mode, "Expected json_mode to be off");
}

/// Asserts the sink saw exactly these event types, in order.
pub fn assert_event_sequence(sink: &CollectingEventSink, expected: &[&str]) {
    let actual = sink.event_types();
    assert_eq!(
        actual, expected,
        "Expected events {expected:?}, got {actual:?}"
    );
}

/// Asserts the error is a generation failure of `kind` and returns it.
///
/// # Panics
///
/// Panics if the error is anything else.
pub fn assert_generation_failure(err: &TranslationError, kind: GenerationFailureKind) -> &GenerationFailure {
    let Some(failure) = err.as_generation_failure() else {
        panic!("Expected a generation failure, got: {err}");
    };
    assert_eq!(failure.kind, kind, "Expected {kind} failure, got {}", failure.kind);
    failure
}
