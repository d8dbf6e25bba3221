//! Dictionary entry model and headword/reading extraction.

use serde::Serialize;

use crate::kana::to_hiragana;

/// Gloss language assumed when the source omits `xml:lang`.
pub const DEFAULT_GLOSS_LANG: &str = "eng";

/// One translation of a sense.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Gloss {
    pub lang: Option<String>,
    pub text: String,
}

impl Gloss {
    pub fn new(text: impl Into<String>) -> Self {
        Gloss {
            lang: None,
            text: text.into(),
        }
    }

    pub fn with_lang(lang: impl Into<String>, text: impl Into<String>) -> Self {
        Gloss {
            lang: Some(lang.into()),
            text: text.into(),
        }
    }

    pub fn is_english(&self) -> bool {
        self.lang
            .as_deref()
            .unwrap_or(DEFAULT_GLOSS_LANG)
            .eq_ignore_ascii_case(DEFAULT_GLOSS_LANG)
    }
}

/// One meaning of a headword. An empty `pos` means "same as the previous sense".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sense {
    pub pos: Vec<String>,
    pub misc: Vec<String>,
    pub field: Vec<String>,
    pub glosses: Vec<Gloss>,
}

/// The field groups of one dictionary entry, in source order.
///
/// `priorities` holds the expression-group tags followed by the
/// reading-group tags.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DictionaryEntry {
    pub expressions: Vec<String>,
    pub readings: Vec<String>,
    pub senses: Vec<Sense>,
    pub priorities: Vec<String>,
}

fn first_candidate(candidates: &[String]) -> Option<String> {
    candidates
        .iter()
        .map(|c| c.trim())
        .find(|c| !c.is_empty())
        .map(str::to_string)
}

impl DictionaryEntry {
    /// Preferred headword: the first listed expression, else the first
    /// reading, else empty.
    pub fn pick_expression(&self) -> String {
        first_candidate(&self.expressions)
            .or_else(|| first_candidate(&self.readings))
            .unwrap_or_default()
    }

    /// Preferred reading in hiragana, empty when the entry has none.
    pub fn pick_reading(&self) -> String {
        first_candidate(&self.readings)
            .map(|r| to_hiragana(&r))
            .unwrap_or_default()
    }
}

/// An entry that made it into the word list. `level` is filled in later,
/// outside this crate, and is always `None` here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcceptedRecord {
    pub word: String,
    pub reading: String,
    pub meaning: String,
    pub level: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn expression_prefers_first_non_empty_keb() {
        let entry = DictionaryEntry {
            expressions: strings(&["  ", " 猫 ", "ネコ"]),
            readings: strings(&["ねこ"]),
            ..Default::default()
        };
        assert_eq!(entry.pick_expression(), "猫");
    }

    #[test]
    fn expression_falls_back_to_reading() {
        let entry = DictionaryEntry {
            readings: strings(&["", "コーヒー"]),
            ..Default::default()
        };
        assert_eq!(entry.pick_expression(), "コーヒー");
        assert_eq!(entry.pick_reading(), "こーひー");
    }

    #[test]
    fn missing_fields_give_empty_strings() {
        let entry = DictionaryEntry::default();
        assert_eq!(entry.pick_expression(), "");
        assert_eq!(entry.pick_reading(), "");
    }

    #[test]
    fn reading_uses_first_listed_candidate() {
        let entry = DictionaryEntry {
            expressions: strings(&["日本"]),
            readings: strings(&["にほん", "にっぽん"]),
            ..Default::default()
        };
        assert_eq!(entry.pick_reading(), "にほん");
    }

    #[test]
    fn candidates_are_trimmed_but_not_recomposed() {
        // こ + combining dakuten, and a CJK compatibility ideograph
        let entry = DictionaryEntry {
            expressions: strings(&[" \u{F91D}干 "]),
            readings: strings(&["こと\u{3099}も"]),
            ..Default::default()
        };
        assert_eq!(entry.pick_expression(), "\u{F91D}干");
        assert_eq!(entry.pick_reading(), "こと\u{3099}も");
    }

    #[test]
    fn gloss_language_defaults_to_english() {
        assert!(Gloss::new("cat").is_english());
        assert!(Gloss::with_lang("ENG", "cat").is_english());
        assert!(!Gloss::with_lang("ger", "Katze").is_english());
    }
}
