//! A deterministic completion client.

use super::CompletionClient;
use crate::core::ModelCallParameters;
use crate::errors::GenerationFailure;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

/// One scripted reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedReply {
    /// Return this text.
    Text(String),
    /// Fail with this error.
    Failure(GenerationFailure),
}

impl From<&str> for ScriptedReply {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for ScriptedReply {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<GenerationFailure> for ScriptedReply {
    fn from(failure: GenerationFailure) -> Self {
        Self::Failure(failure)
    }
}

#[derive(Debug)]
enum Mode {
    Script(Mutex<VecDeque<ScriptedReply>>),
    Echo,
    Fixed(String),
}

/// Replies from a script, echoes prompts, or returns one fixed text.
///
/// Every call's parameters are recorded, so tests can inspect exactly what
/// the pipeline sent.
#[derive(Debug)]
pub struct ScriptedCompletionClient {
    mode: Mode,
    calls: Mutex<Vec<ModelCallParameters>>,
}

impl ScriptedCompletionClient {
    /// Replies with `replies` in order, one per call.
    ///
    /// A call after the script runs out fails with a provider error.
    #[must_use]
    pub fn new<I, R>(replies: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<ScriptedReply>,
    {
        Self::with_mode(Mode::Script(Mutex::new(
            replies.into_iter().map(Into::into).collect(),
        )))
    }

    /// Returns each call's user prompt unchanged.
    #[must_use]
    pub fn echo() -> Self {
        Self::with_mode(Mode::Echo)
    }

    /// Returns `text` for every call.
    #[must_use]
    pub fn fixed(text: impl Into<String>) -> Self {
        Self::with_mode(Mode::Fixed(text.into()))
    }

    fn with_mode(mode: Mode) -> Self {
        Self {
            mode,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Returns the parameters of every call so far.
    #[must_use]
    pub fn calls(&self) -> Vec<ModelCallParameters> {
        self.calls.lock().clone()
    }

    /// Returns the user prompt of every call so far.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.calls.lock().iter().map(|c| c.prompt.clone()).collect()
    }

    /// Returns the number of calls.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Returns the number of scripted replies not yet used.
    #[must_use]
    pub fn remaining(&self) -> usize {
        match &self.mode {
            Mode::Script(queue) => queue.lock().len(),
            Mode::Echo | Mode::Fixed(_) => usize::MAX,
        }
    }

    /// Forgets recorded calls.
    pub fn reset(&self) {
        self.calls.lock().clear();
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletionClient {
    async fn generate(&self, params: &ModelCallParameters) -> Result<String, GenerationFailure> {
        let call_number = {
            let mut calls = self.calls.lock();
            calls.push(params.clone());
            calls.len()
        };

        match &self.mode {
            Mode::Echo => Ok(params.prompt.clone()),
            Mode::Fixed(text) => Ok(text.clone()),
            Mode::Script(queue) => match queue.lock().pop_front() {
                Some(ScriptedReply::Text(text)) => Ok(text),
                Some(ScriptedReply::Failure(failure)) => Err(failure),
                None => Err(GenerationFailure::provider(format!(
                    "no scripted reply left for call {call_number}"
                ))),
            },
        }
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}
