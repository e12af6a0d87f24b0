//! Core domain model types.
//!
//! This module contains the value records that flow through a translation run:
//! - The request and the per-call model parameters
//! - Stage kinds and the linear pipeline phase
//! - The per-run state that collects stage outputs

mod identity;
mod params;
mod request;
mod state;
mod status;

pub use identity::RunIdentity;
pub use params::{ModelCallParameters, DEFAULT_SYSTEM_MESSAGE};
pub use request::TranslationRequest;
pub use state::{PipelineState, StageRecord};
pub use status::{PipelinePhase, StageKind};
