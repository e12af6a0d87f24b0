//! Stage kind and pipeline phase enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The three model invocations of a translation run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// Initial translation of the source text.
    Draft,
    /// Critique of the draft against the source.
    Reflect,
    /// Revised translation that applies the critique.
    Improve,
}

impl StageKind {
    /// All stages in the order the pipeline runs them.
    pub const ORDER: [Self; 3] = [Self::Draft, Self::Reflect, Self::Improve];

    /// Returns the phase the pipeline enters once this stage has produced output.
    #[must_use]
    pub const fn completes_into(self) -> PipelinePhase {
        match self {
            Self::Draft => PipelinePhase::Drafted,
            Self::Reflect => PipelinePhase::Critiqued,
            Self::Improve => PipelinePhase::Finalized,
        }
    }

    /// Returns the phase the pipeline must be in for this stage to run.
    #[must_use]
    pub const fn requires_phase(self) -> PipelinePhase {
        match self {
            Self::Draft => PipelinePhase::Start,
            Self::Reflect => PipelinePhase::Drafted,
            Self::Improve => PipelinePhase::Critiqued,
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Reflect => write!(f, "reflect"),
            Self::Improve => write!(f, "improve"),
        }
    }
}

/// Where a translation run currently stands.
///
/// `Start -> Drafted -> Critiqued -> Finalized`, with no branches and no way back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelinePhase {
    /// Nothing has been generated yet.
    Start,
    /// The draft translation is available.
    Drafted,
    /// The critique is available.
    Critiqued,
    /// The final translation is available.
    Finalized,
}

impl Default for PipelinePhase {
    fn default() -> Self {
        Self::Start
    }
}

impl fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Drafted => write!(f, "drafted"),
            Self::Critiqued => write!(f, "critiqued"),
            Self::Finalized => write!(f, "finalized"),
        }
    }
}

impl PipelinePhase {
    /// Returns true once the final translation exists.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finalized)
    }

    /// Returns the stage that runs next, if any.
    #[must_use]
    pub const fn next_stage(self) -> Option<StageKind> {
        match self {
            Self::Start => Some(StageKind::Draft),
            Self::Drafted => Some(StageKind::Reflect),
            Self::Critiqued => Some(StageKind::Improve),
            Self::Finalized => None,
        }
    }
}
