//! The translation pipeline.
//!
//! This module provides:
//! - [`TranslationPipeline`], which runs draft, reflect and improve in order
//! - A builder that wires in the client, event sink and configuration
//! - Prompt fingerprints for logs

mod builder;
mod digest;
mod runner;

pub use builder::{TranslationPipelineBuilder, DEFAULT_MODEL};
pub use digest::prompt_digest;
pub use runner::TranslationPipeline;
