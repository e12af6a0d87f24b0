//! # Translation Agent
//!
//! Reflect-and-revise machine translation over a chat completion endpoint.
//!
//! A translation runs as three dependent model calls:
//!
//! - **Draft**: translate the source text
//! - **Reflect**: critique the draft for accuracy, fluency, style and terminology,
//!   optionally toward the colloquial register of a given locale
//! - **Improve**: rewrite the draft taking the critique into account
//!
//! The model is reached through the [`CompletionClient`](client::CompletionClient)
//! trait, injected at construction together with an optional event sink.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use translation_agent::prelude::*;
//!
//! let config = AppConfig::from_env()?;
//! let pipeline = TranslationPipeline::from_config(&config, Arc::new(LoggingEventSink::default()))?;
//!
//! let text = pipeline
//!     .translate_text("English", "Chinese", "Hello, world.", "Taiwan")
//!     .await?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod client;
pub mod config;
pub mod core;
pub mod errors;
pub mod events;
pub mod pipeline;
pub mod prompts;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    #[cfg(feature = "http")]
    pub use crate::client::OpenAiCompatibleClient;
    pub use crate::client::{CompletionClient, CompletionResponse, ScriptedCompletionClient};
    pub use crate::config::{AppConfig, ClientConfig, PipelineConfig, SamplingConfig};
    pub use crate::core::{
        ModelCallParameters, PipelinePhase, PipelineState, RunIdentity, StageKind,
        TranslationRequest,
    };
    pub use crate::errors::{
        ConfigurationError, GenerationFailure, GenerationFailureKind, TranslationError,
        TranslationResult,
    };
    pub use crate::events::{EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::pipeline::{TranslationPipeline, TranslationPipelineBuilder};
    pub use crate::prompts::{
        build_improvement, build_initial_translation, build_reflection, CritiqueDimension, Prompt,
    };
    pub use std::sync::Arc;
}
