//! Testing utilities for translation pipelines.
//!
//! This module provides:
//! - A fixture that wires a scripted client and a collecting sink into a pipeline
//! - Assertions over recorded calls, events and failures

mod assertions;
mod fixtures;

pub use assertions::{
    assert_event_sequence, assert_generation_failure, assert_prompt_contains,
    assert_prompt_lacks, assert_stage_sampling,
};
pub use fixtures::{hello_world_request, TestFixture};
