//! The translation request value.

use serde::{Deserialize, Serialize};

/// ASCII characters per token used for the rough source-size estimate.
/// Every other character counts as a token of its own.
const ASCII_CHARS_PER_TOKEN: usize = 4;

/// What the caller wants translated.
///
/// Language names are free-form display names ("English", "Chinese"), not
/// ISO codes, and the source and target may be equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRequest {
    /// Source language display name.
    pub source_lang: String,
    /// Target language display name.
    pub target_lang: String,
    /// Text to translate, passed through verbatim.
    pub source_text: String,
    /// Optional country or region whose colloquial register the result should follow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale_hint: Option<String>,
}

impl TranslationRequest {
    /// Creates a request without a locale hint.
    #[must_use]
    pub fn new(
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
        source_text: impl Into<String>,
    ) -> Self {
        Self {
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
            source_text: source_text.into(),
            locale_hint: None,
        }
    }

    /// Sets the locale hint. An empty string clears it.
    #[must_use]
    pub fn with_locale_hint(mut self, hint: impl Into<String>) -> Self {
        let hint = hint.into();
        self.locale_hint = if hint.is_empty() { None } else { Some(hint) };
        self
    }

    /// Returns the locale hint when it carries any non-whitespace text.
    #[must_use]
    pub fn locale_hint(&self) -> Option<&str> {
        self.locale_hint
            .as_deref()
            .map(str::trim)
            .filter(|hint| !hint.is_empty())
    }

    /// Rough token count of the source text.
    ///
    /// ASCII text counts `ceil(chars / 4)`. Each non-ASCII character counts
    /// as one token, which keeps CJK sources from being underestimated.
    #[must_use]
    pub fn estimated_source_tokens(&self) -> usize {
        let (ascii, other) = self
            .source_text
            .chars()
            .fold((0usize, 0usize), |(ascii, other), c| {
                if c.is_ascii() {
                    (ascii + 1, other)
                } else {
                    (ascii, other + 1)
                }
            });
        ascii.div_ceil(ASCII_CHARS_PER_TOKEN) + other
    }
}
