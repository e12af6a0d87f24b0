//! The four critique dimensions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Roman numerals used to number criteria in prompts.
const NUMERALS: [&str; 5] = ["i", "ii", "iii", "iv", "v"];

/// An aspect of the draft that the critique and the edit look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CritiqueDimension {
    /// Errors of addition, mistranslation, omission or untranslated text.
    Accuracy,
    /// Grammar, spelling, punctuation and repetition in the target language.
    Fluency,
    /// Faithfulness to the source's style and cultural context.
    Style,
    /// Consistent, domain-appropriate terms and idioms.
    Terminology,
}

impl CritiqueDimension {
    /// The dimensions in the order every prompt lists them.
    pub const ORDER: [Self; 4] = [Self::Accuracy, Self::Fluency, Self::Style, Self::Terminology];

    /// Lower-case label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Accuracy => "accuracy",
            Self::Fluency => "fluency",
            Self::Style => "style",
            Self::Terminology => "terminology",
        }
    }

    /// What to look for when critiquing a draft.
    #[must_use]
    pub fn reflection_guidance(self, target_lang: &str) -> String {
        match self {
            Self::Accuracy => {
                "by correcting errors of addition, mistranslation, omission, or untranslated text"
                    .to_string()
            }
            Self::Fluency => format!(
                "by applying {target_lang} grammar, spelling and punctuation rules, \
                 and ensuring there are no unnecessary repetitions"
            ),
            Self::Style => "by ensuring the translations reflect the style of the source text \
                            and take into account any cultural context"
                .to_string(),
            Self::Terminology => format!(
                "by ensuring terminology use is consistent and reflects the source text domain; \
                 and by only ensuring you use equivalent idioms {target_lang}"
            ),
        }
    }

    /// What to fix when editing a draft.
    #[must_use]
    pub fn edit_guidance(self, target_lang: &str) -> String {
        match self {
            Self::Accuracy => {
                "by correcting errors of addition, mistranslation, omission, or untranslated text"
                    .to_string()
            }
            Self::Fluency => format!(
                "by applying {target_lang} grammar, spelling and punctuation rules \
                 and ensuring there are no unnecessary repetitions"
            ),
            Self::Style => "by ensuring the translations reflect the style of the source text".to_string(),
            Self::Terminology => "inappropriate for context, inconsistent use".to_string(),
        }
    }
}

impl fmt::Display for CritiqueDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Numbered reflection criteria, one per line, closed by a full stop.
pub(crate) fn reflection_criteria(target_lang: &str) -> String {
    let lines: Vec<String> = CritiqueDimension::ORDER
        .iter()
        .zip(NUMERALS)
        .map(|(dim, numeral)| format!("({numeral}) {dim} ({})", dim.reflection_guidance(target_lang)))
        .collect();
    format!("{}.", lines.join(",\n"))
}

/// Numbered edit criteria, ending with the catch-all "other errors" entry.
pub(crate) fn edit_criteria(target_lang: &str) -> String {
    let mut lines: Vec<String> = CritiqueDimension::ORDER
        .iter()
        .zip(NUMERALS)
        .map(|(dim, numeral)| {
            let tail = match dim {
                CritiqueDimension::Style => "",
                CritiqueDimension::Terminology => ", or",
                _ => ",",
            };
            format!("({numeral}) {dim} ({}){tail}", dim.edit_guidance(target_lang))
        })
        .collect();
    lines.push(format!("({}) other errors.", NUMERALS[CritiqueDimension::ORDER.len()]));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn positions(text: &str) -> Vec<usize> {
        CritiqueDimension::ORDER
            .iter()
            .map(|dim| text.find(&format!(") {dim} (")).unwrap())
            .collect()
    }

    #[test]
    fn test_labels() {
        let labels: Vec<&str> = CritiqueDimension::ORDER.iter().map(|d| d.label()).collect();
        assert_eq!(labels, vec!["accuracy", "fluency", "style", "terminology"]);
    }

    #[test]
    fn test_reflection_criteria_order() {
        let text = reflection_criteria("Chinese");
        let pos = positions(&text);
        assert!(pos.windows(2).all(|w| w[0] < w[1]));
        assert!(text.starts_with("(i) accuracy"));
        assert_eq!(text.lines().count(), 4);
    }

    #[test]
    fn test_reflection_criteria_punctuation() {
        let text = reflection_criteria("Chinese");
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[..3].iter().all(|line| line.ends_with("),")));
        assert_eq!(
            lines[3],
            "(iv) terminology (by ensuring terminology use is consistent and reflects the source \
             text domain; and by only ensuring you use equivalent idioms Chinese)."
        );
    }

    #[test]
    fn test_edit_criteria_punctuation() {
        let text = edit_criteria("English");
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].ends_with("untranslated text),"));
        assert!(lines[1].ends_with("repetitions),"));
        assert_eq!(
            lines[2],
            "(iii) style (by ensuring the translations reflect the style of the source text)"
        );
        assert_eq!(lines[3], "(iv) terminology (inappropriate for context, inconsistent use), or");
    }

    #[test]
    fn test_reflection_mentions_target_language() {
        let text = reflection_criteria("Chinese");
        let fluency = text.lines().nth(1).unwrap();
        let terminology = text.lines().nth(3).unwrap();
        assert!(fluency.contains("Chinese grammar"));
        assert!(terminology.contains("idioms Chinese"));
    }

    #[test]
    fn test_edit_criteria_ends_with_other_errors() {
        let text = edit_criteria("English");
        let pos = positions(&text);
        assert!(pos.windows(2).all(|w| w[0] < w[1]));

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[3].ends_with("or"));
        assert_eq!(lines[4], "(v) other errors.");
    }

    #[test]
    fn test_dimension_serialize() {
        let json = serde_json::to_string(&CritiqueDimension::Terminology).unwrap();
        assert_eq!(json, r#""terminology""#);
    }
}
