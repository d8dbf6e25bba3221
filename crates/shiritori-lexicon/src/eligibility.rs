//! Structural and script checks on an (expression, reading) pair.

use std::fmt;

use regex::Regex;

use crate::config::Limits;
use crate::error::Result;
use crate::kana::{end_phoneme, start_phoneme};

/// Kanji, hiragana, katakana, the long-vowel mark, 々/〆 and ヵ/ヶ.
const WORD_SCRIPT_PATTERN: &str = r"^[ぁ-ゖァ-ヺー々〆ヵヶ一-龯㐀-䶿]+$";

/// Hiragana and the long-vowel mark.
const READING_SCRIPT_PATTERN: &str = r"^[ぁ-ゖゔー]+$";

/// The first rule an entry failed. Rules are checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    MissingField,
    ExpressionLength,
    ReadingLength,
    ExpressionScript,
    ReadingScript,
    NoStartPhoneme,
    NoEndPhoneme,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Rejection::MissingField => "missing expression or reading",
            Rejection::ExpressionLength => "expression length out of range",
            Rejection::ReadingLength => "reading too long",
            Rejection::ExpressionScript => "expression has characters outside the word script",
            Rejection::ReadingScript => "reading is not pure hiragana",
            Rejection::NoStartPhoneme => "no start phoneme",
            Rejection::NoEndPhoneme => "no end phoneme",
        };
        f.write_str(text)
    }
}

/// A playable word with its chain points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedWord {
    pub expression: String,
    pub reading: String,
    pub start_phoneme: String,
    pub end_phoneme: String,
}

#[derive(Debug)]
pub struct EligibilityRules {
    limits: Limits,
    word_script: Regex,
    reading_script: Regex,
}

impl EligibilityRules {
    pub fn new(limits: Limits) -> Result<Self> {
        Ok(EligibilityRules {
            limits,
            word_script: Regex::new(WORD_SCRIPT_PATTERN)?,
            reading_script: Regex::new(READING_SCRIPT_PATTERN)?,
        })
    }

    /// Check the pair, stopping at the first failing rule.
    pub fn check(
        &self,
        expression: &str,
        reading: &str,
    ) -> std::result::Result<NormalizedWord, Rejection> {
        if expression.is_empty() || reading.is_empty() {
            return Err(Rejection::MissingField);
        }

        let expression_chars = expression.chars().count();
        if expression_chars < self.limits.min_expression_chars
            || expression_chars > self.limits.max_expression_chars
        {
            return Err(Rejection::ExpressionLength);
        }
        if reading.chars().count() > self.limits.max_reading_chars {
            return Err(Rejection::ReadingLength);
        }

        if !self.word_script.is_match(expression) {
            return Err(Rejection::ExpressionScript);
        }
        if !self.reading_script.is_match(reading) {
            return Err(Rejection::ReadingScript);
        }

        let start = start_phoneme(reading);
        if start.is_empty() {
            return Err(Rejection::NoStartPhoneme);
        }
        let end = end_phoneme(reading);
        if end.is_empty() {
            return Err(Rejection::NoEndPhoneme);
        }

        Ok(NormalizedWord {
            expression: expression.to_string(),
            reading: reading.to_string(),
            start_phoneme: start,
            end_phoneme: end,
        })
    }

    pub fn is_eligible(&self, expression: &str, reading: &str) -> bool {
        self.check(expression, reading).is_ok()
    }
}
