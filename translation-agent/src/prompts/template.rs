//! Prompt templates with named `{{slot}}` placeholders.

use regex::Regex;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([a-z_]+)\s*\}\}").expect("placeholder regex"));

/// A named value a template can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Source language display name.
    SourceLang,
    /// Target language display name.
    TargetLang,
    /// The user's source text.
    SourceText,
    /// The draft translation.
    Translation,
    /// The critique of the draft.
    Critique,
    /// Optional locale sentence; renders empty when there is no hint.
    LocaleClause,
    /// The locale hint itself.
    Locale,
    /// Numbered list of critique dimensions.
    Criteria,
}

impl Slot {
    /// Every slot, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::SourceLang,
        Self::TargetLang,
        Self::SourceText,
        Self::Translation,
        Self::Critique,
        Self::LocaleClause,
        Self::Locale,
        Self::Criteria,
    ];

    /// The placeholder name used inside `{{...}}`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SourceLang => "source_lang",
            Self::TargetLang => "target_lang",
            Self::SourceText => "source_text",
            Self::Translation => "translation",
            Self::Critique => "critique",
            Self::LocaleClause => "locale_clause",
            Self::Locale => "locale",
            Self::Criteria => "criteria",
        }
    }

    /// Looks a slot up by placeholder name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.name() == name)
    }
}

/// Values to substitute into a template. Unset slots render as empty text.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlotValues<'a> {
    /// Value for [`Slot::SourceLang`].
    pub source_lang: &'a str,
    /// Value for [`Slot::TargetLang`].
    pub target_lang: &'a str,
    /// Value for [`Slot::SourceText`].
    pub source_text: &'a str,
    /// Value for [`Slot::Translation`].
    pub translation: &'a str,
    /// Value for [`Slot::Critique`].
    pub critique: &'a str,
    /// Value for [`Slot::LocaleClause`].
    pub locale_clause: &'a str,
    /// Value for [`Slot::Locale`].
    pub locale: &'a str,
    /// Value for [`Slot::Criteria`].
    pub criteria: &'a str,
}

impl<'a> SlotValues<'a> {
    /// Values carrying only the language pair.
    #[must_use]
    pub fn languages(source_lang: &'a str, target_lang: &'a str) -> Self {
        Self {
            source_lang,
            target_lang,
            ..Self::default()
        }
    }

    /// Returns the value for a slot.
    #[must_use]
    pub const fn get(&self, slot: Slot) -> &'a str {
        match slot {
            Slot::SourceLang => self.source_lang,
            Slot::TargetLang => self.target_lang,
            Slot::SourceText => self.source_text,
            Slot::Translation => self.translation,
            Slot::Critique => self.critique,
            Slot::LocaleClause => self.locale_clause,
            Slot::Locale => self.locale,
            Slot::Criteria => self.criteria,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Slot(Slot),
}

/// A parsed prompt template.
///
/// Placeholders are resolved once at parse time. Substituted values are
/// never scanned again, so user text that happens to contain `{{...}}`
/// comes out exactly as it went in. Placeholders with unknown names stay
/// in the output literally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    segments: Vec<Segment>,
}

impl PromptTemplate {
    /// Parses template text.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut cursor = 0;

        for caps in PLACEHOLDER_RE.captures_iter(text) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let Some(slot) = Slot::from_name(name.as_str()) else {
                continue;
            };

            literal.push_str(&text[cursor..whole.start()]);
            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(Segment::Slot(slot));
            cursor = whole.end();
        }

        literal.push_str(&text[cursor..]);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Self { segments }
    }

    /// Renders the template.
    #[must_use]
    pub fn render(&self, values: &SlotValues<'_>) -> String {
        let capacity = self
            .segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(text) => text.len(),
                Segment::Slot(slot) => values.get(*slot).len(),
            })
            .sum();

        let mut out = String::with_capacity(capacity);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Slot(slot) => out.push_str(values.get(*slot)),
            }
        }
        out
    }
}
