//! Prompt fingerprints for logs.

use crate::core::ModelCallParameters;
use sha2::{Digest, Sha256};

/// Returns a short hex SHA-256 fingerprint of a call's system message and prompt.
///
/// Logs carry this instead of the prompt text. Identical prompts give
/// identical digests.
#[must_use]
pub fn prompt_digest(params: &ModelCallParameters) -> String {
    let mut hasher = Sha256::new();
    hasher.update(params.system_message.as_bytes());
    hasher.update([0u8]);
    hasher.update(params.prompt.as_bytes());
    let result = hasher.finalize();
    hex::encode(&result[..8])
}
