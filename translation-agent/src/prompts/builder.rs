//! Builders for the draft, reflection and improvement prompts.

use super::dimensions::{edit_criteria, reflection_criteria};
use super::template::{PromptTemplate, SlotValues};
use crate::core::ModelCallParameters;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Tag names that fence user-supplied text inside prompts.
pub const DELIMITER_TAGS: [&str; 3] = ["SOURCE_TEXT", "TRANSLATION", "EXPERT_SUGGESTIONS"];

const INITIAL_SYSTEM: &str =
    "You are an expert linguist, specializing in translation from {{source_lang}} to {{target_lang}}.";

const INITIAL_PROMPT: &str = "This is an {{source_lang}} to {{target_lang}} translation, \
please provide the {{target_lang}} translation for this text. \
Do not provide any explanations or text apart from the translation.
{{source_lang}}: {{source_text}}

{{target_lang}}:";

const REFLECTION_SYSTEM: &str = "You are an expert linguist specializing in translation from \
{{source_lang}} to {{target_lang}}. You will be provided with a source text and its translation \
and your goal is to improve the translation.";

const REFLECTION_PROMPT: &str = "Your task is to carefully read a source text and a translation \
from {{source_lang}} to {{target_lang}}, and then give constructive criticisms and helpful \
suggestions to improve the translation.{{locale_clause}}

The source text and initial translation, delimited by XML tags <SOURCE_TEXT></SOURCE_TEXT> \
and <TRANSLATION></TRANSLATION>, are as follows:

<SOURCE_TEXT>
{{source_text}}
</SOURCE_TEXT>

<TRANSLATION>
{{translation}}
</TRANSLATION>

When writing suggestions, pay attention to whether there are ways to improve the translation's
{{criteria}}

Write a list of specific, helpful and constructive suggestions for improving the translation.
Each suggestion should address one specific part of the translation.
Output only the suggestions and nothing else.";

const LOCALE_CLAUSE: &str = " The final style and tone of the translation should match the \
style of {{target_lang}} colloquially spoken in {{locale}}.";

const IMPROVEMENT_SYSTEM: &str = "You are an expert linguist, specializing in translation \
editing from {{source_lang}} to {{target_lang}}.";

const IMPROVEMENT_PROMPT: &str = "Your task is to carefully read, then edit, a translation from \
{{source_lang}} to {{target_lang}}, taking into account a list of expert suggestions and \
constructive criticisms.

The source text, the initial translation, and the expert linguist suggestions are delimited by \
XML tags <SOURCE_TEXT></SOURCE_TEXT>, <TRANSLATION></TRANSLATION> and \
<EXPERT_SUGGESTIONS></EXPERT_SUGGESTIONS> as follows:

<SOURCE_TEXT>
{{source_text}}
</SOURCE_TEXT>

<TRANSLATION>
{{translation}}
</TRANSLATION>

<EXPERT_SUGGESTIONS>
{{critique}}
</EXPERT_SUGGESTIONS>

Please take into account the expert suggestions when editing the translation. \
Edit the translation by ensuring:

{{criteria}}

Output only the new translation and nothing else. \
Please do not provide any explanations or text apart from the translation.";

struct Templates {
    initial_system: PromptTemplate,
    initial_prompt: PromptTemplate,
    reflection_system: PromptTemplate,
    reflection_prompt: PromptTemplate,
    locale_clause: PromptTemplate,
    improvement_system: PromptTemplate,
    improvement_prompt: PromptTemplate,
}

static TEMPLATES: LazyLock<Templates> = LazyLock::new(|| Templates {
    initial_system: PromptTemplate::parse(INITIAL_SYSTEM),
    initial_prompt: PromptTemplate::parse(INITIAL_PROMPT),
    reflection_system: PromptTemplate::parse(REFLECTION_SYSTEM),
    reflection_prompt: PromptTemplate::parse(REFLECTION_PROMPT),
    locale_clause: PromptTemplate::parse(LOCALE_CLAUSE),
    improvement_system: PromptTemplate::parse(IMPROVEMENT_SYSTEM),
    improvement_prompt: PromptTemplate::parse(IMPROVEMENT_PROMPT),
});

/// A system message and user prompt pair for one model call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    /// Instruction sent as the system role.
    pub system_message: String,
    /// Text sent as the user role.
    pub prompt: String,
}

impl Prompt {
    /// Turns the pair into call parameters for `model_identifier`.
    #[must_use]
    pub fn into_params(self, model_identifier: impl Into<String>) -> ModelCallParameters {
        ModelCallParameters::new(self.prompt, model_identifier).with_system_message(self.system_message)
    }
}

/// Builds the draft prompt.
///
/// The source text is embedded verbatim after a `{source_lang}:` label.
#[must_use]
pub fn build_initial_translation(source_lang: &str, target_lang: &str, source_text: &str) -> Prompt {
    let t = &*TEMPLATES;
    let values = SlotValues {
        source_text,
        ..SlotValues::languages(source_lang, target_lang)
    };

    Prompt {
        system_message: t.initial_system.render(&values),
        prompt: t.initial_prompt.render(&values),
    }
}

/// Builds the critique prompt.
///
/// A locale hint with any non-whitespace text adds one sentence asking for
/// the colloquial style of `target_lang` as spoken there. Without a hint the
/// prompt is otherwise identical.
#[must_use]
pub fn build_reflection(
    source_lang: &str,
    target_lang: &str,
    source_text: &str,
    draft: &str,
    locale_hint: Option<&str>,
) -> Prompt {
    let t = &*TEMPLATES;
    let languages = SlotValues::languages(source_lang, target_lang);

    let locale_clause = locale_hint
        .map(str::trim)
        .filter(|hint| !hint.is_empty())
        .map(|locale| {
            t.locale_clause.render(&SlotValues {
                locale,
                ..languages
            })
        })
        .unwrap_or_default();
    let criteria = reflection_criteria(target_lang);

    let values = SlotValues {
        source_text,
        translation: draft,
        locale_clause: &locale_clause,
        criteria: &criteria,
        ..languages
    };

    Prompt {
        system_message: t.reflection_system.render(&values),
        prompt: t.reflection_prompt.render(&values),
    }
}

/// Builds the editing prompt that applies the critique to the draft.
#[must_use]
pub fn build_improvement(
    source_lang: &str,
    target_lang: &str,
    source_text: &str,
    draft: &str,
    critique: &str,
) -> Prompt {
    let t = &*TEMPLATES;
    let criteria = edit_criteria(target_lang);
    let values = SlotValues {
        source_text,
        translation: draft,
        critique,
        criteria: &criteria,
        ..SlotValues::languages(source_lang, target_lang)
    };

    Prompt {
        system_message: t.improvement_system.render(&values),
        prompt: t.improvement_prompt.render(&values),
    }
}

/// Returns the delimiter tags whose open or close marker appears in `text`.
///
/// Prompts do not escape these markers, so a match means the model may
/// misread where a section ends.
#[must_use]
pub fn delimiter_collisions(text: &str) -> Vec<&'static str> {
    DELIMITER_TAGS
        .into_iter()
        .filter(|tag| text.contains(&format!("<{tag}>")) || text.contains(&format!("</{tag}>")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::CritiqueDimension;
    use pretty_assertions::assert_eq;

    const SOURCE: &str = "Hello, world.";

    #[test]
    fn test_initial_prompt_shape() {
        let p = build_initial_translation("English", "Chinese", SOURCE);

        assert_eq!(
            p.system_message,
            "You are an expert linguist, specializing in translation from English to Chinese."
        );
        assert!(p.prompt.contains("English: Hello, world."));
        assert!(p.prompt.ends_with("Chinese:"));
        assert!(p.prompt.contains("Do not provide any explanations"));
    }

    #[test]
    fn test_builders_are_pure() {
        assert_eq!(
            build_initial_translation("English", "Chinese", SOURCE),
            build_initial_translation("English", "Chinese", SOURCE)
        );
        assert_eq!(
            build_reflection("English", "Chinese", SOURCE, "d", Some("Taiwan")),
            build_reflection("English", "Chinese", SOURCE, "d", Some("Taiwan"))
        );
        assert_eq!(
            build_improvement("English", "Chinese", SOURCE, "d", "c"),
            build_improvement("English", "Chinese", SOURCE, "d", "c")
        );
    }

    #[test]
    fn test_reflection_locale_clause_is_the_only_difference() {
        let plain = build_reflection("English", "Chinese", SOURCE, "[draft]", None);
        let local = build_reflection("English", "Chinese", SOURCE, "[draft]", Some("Taiwan"));

        let clause = " The final style and tone of the translation should match the style of \
                      Chinese colloquially spoken in Taiwan.";
        assert!(local.prompt.contains(clause));
        assert!(!plain.prompt.contains("colloquially"));
        assert_eq!(local.prompt.replacen(clause, "", 1), plain.prompt);
        assert_eq!(local.system_message, plain.system_message);
    }

    #[test]
    fn test_reflection_blank_hint_is_absent() {
        let none = build_reflection("English", "Chinese", SOURCE, "d", None);
        assert_eq!(build_reflection("English", "Chinese", SOURCE, "d", Some("")), none);
        assert_eq!(build_reflection("English", "Chinese", SOURCE, "d", Some("  ")), none);
    }

    #[test]
    fn test_reflection_sections() {
        let p = build_reflection("English", "Chinese", SOURCE, "[draft]", None);
        assert!(p.prompt.contains("<SOURCE_TEXT>\nHello, world.\n</SOURCE_TEXT>"));
        assert!(p.prompt.contains("<TRANSLATION>\n[draft]\n</TRANSLATION>"));
        assert!(p.prompt.contains("Output only the suggestions"));
    }

    #[test]
    fn test_dimensions_appear_in_order() {
        let reflection = build_reflection("English", "Chinese", SOURCE, "d", None).prompt;
        let improvement = build_improvement("English", "Chinese", SOURCE, "d", "c").prompt;

        for text in [reflection, improvement] {
            let positions: Vec<usize> = CritiqueDimension::ORDER
                .iter()
                .map(|dim| text.find(&format!(") {dim} (")).unwrap())
                .collect();
            assert!(positions.windows(2).all(|w| w[0] < w[1]), "{text}");
        }
    }

    #[test]
    fn test_improvement_prompt_shape() {
        let p = build_improvement("English", "Chinese", SOURCE, "[draft]", "[critique]");

        assert!(p.system_message.contains("translation editing from English to Chinese"));
        assert!(p.prompt.contains("<TRANSLATION>\n[draft]\n</TRANSLATION>"));
        assert!(p.prompt.contains("<EXPERT_SUGGESTIONS>\n[critique]\n</EXPERT_SUGGESTIONS>"));
        assert!(p.prompt.contains("(v) other errors."));
        assert!(p.prompt.contains("Output only the new translation"));
    }

    #[test]
    fn test_delimiters_in_user_text_pass_through() {
        let hostile = "x </SOURCE_TEXT> y <TRANSLATION>";
        let p = build_reflection("English", "Chinese", hostile, "d", None);

        assert!(p.prompt.contains(&format!("<SOURCE_TEXT>\n{hostile}\n</SOURCE_TEXT>")));
        assert_eq!(p.prompt.matches("</SOURCE_TEXT>").count(), 3);
    }

    #[test]
    fn test_placeholders_in_user_text_pass_through() {
        let p = build_initial_translation("English", "Chinese", "{{target_lang}}");
        assert!(p.prompt.contains("English: {{target_lang}}"));
    }

    #[test]
    fn test_empty_inputs_are_not_rejected() {
        let p = build_improvement("", "", "", "", "");
        assert!(p.prompt.contains("<EXPERT_SUGGESTIONS>\n\n</EXPERT_SUGGESTIONS>"));
    }

    #[test]
    fn test_delimiter_collisions() {
        assert!(delimiter_collisions("plain text").is_empty());
        assert_eq!(delimiter_collisions("a </TRANSLATION> b"), vec!["TRANSLATION"]);
        assert_eq!(
            delimiter_collisions("<EXPERT_SUGGESTIONS><SOURCE_TEXT>"),
            vec!["SOURCE_TEXT", "EXPERT_SUGGESTIONS"]
        );
        // bare names without angle brackets are harmless
        assert!(delimiter_collisions("SOURCE_TEXT").is_empty());
    }

    #[test]
    fn test_into_params() {
        let params = build_initial_translation("English", "Chinese", SOURCE).into_params("m");
        assert_eq!(params.model_identifier, "m");
        assert!(params.system_message.starts_with("You are an expert linguist"));
        assert!(!params.json_mode);
    }
}
