//! Single-pass driver: one entry in, at most one record out.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use tracing::{debug, trace};

use crate::config::Rules;
use crate::eligibility::Rejection;
use crate::entry::{AcceptedRecord, DictionaryEntry};
use crate::error::Result;
use crate::meaning::select_meaning;
use crate::output::RecordSink;

/// Why an entry was left out. Every skipped entry has exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Invalid(Rejection),
    Uncommon,
    Duplicate,
    Excluded,
    NoMeaning,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Invalid(rejection) => write!(f, "invalid: {rejection}"),
            SkipReason::Uncommon => f.write_str("invalid: not a common word"),
            SkipReason::Duplicate => f.write_str("duplicate word"),
            SkipReason::Excluded => f.write_str("excluded word"),
            SkipReason::NoMeaning => f.write_str("no usable meaning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Accepted(AcceptedRecord),
    Skipped(SkipReason),
}

/// `skipped_invalid` split by cause. Diagnostic only; the six run counters
/// keep structural and commonality failures merged.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidBreakdown {
    pub missing_field: usize,
    pub expression_length: usize,
    pub reading_length: usize,
    pub expression_script: usize,
    pub reading_script: usize,
    pub no_start_phoneme: usize,
    pub no_end_phoneme: usize,
    pub uncommon: usize,
}

impl InvalidBreakdown {
    fn record(&mut self, rejection: Rejection) {
        let counter = match rejection {
            Rejection::MissingField => &mut self.missing_field,
            Rejection::ExpressionLength => &mut self.expression_length,
            Rejection::ReadingLength => &mut self.reading_length,
            Rejection::ExpressionScript => &mut self.expression_script,
            Rejection::ReadingScript => &mut self.reading_script,
            Rejection::NoStartPhoneme => &mut self.no_start_phoneme,
            Rejection::NoEndPhoneme => &mut self.no_end_phoneme,
        };
        *counter += 1;
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub entries: usize,
    pub written: usize,
    pub skipped_invalid: usize,
    pub skipped_no_meaning: usize,
    pub skipped_duplicate: usize,
    pub skipped_excluded: usize,
    pub invalid_reasons: InvalidBreakdown,
}

impl RunStats {
    fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::Invalid(rejection) => {
                self.skipped_invalid += 1;
                self.invalid_reasons.record(rejection);
            }
            SkipReason::Uncommon => {
                self.skipped_invalid += 1;
                self.invalid_reasons.uncommon += 1;
            }
            SkipReason::Duplicate => self.skipped_duplicate += 1,
            SkipReason::Excluded => self.skipped_excluded += 1,
            SkipReason::NoMeaning => self.skipped_no_meaning += 1,
        }
    }
}

/// Owns the seen-word set and the counters for one run.
pub struct Pipeline<'a> {
    rules: &'a Rules,
    exclusions: Option<&'a HashSet<String>>,
    max_rows: Option<usize>,
    seen: HashSet<String>,
    stats: RunStats,
}

impl<'a> Pipeline<'a> {
    pub fn new(rules: &'a Rules) -> Self {
        Pipeline {
            rules,
            exclusions: None,
            max_rows: None,
            seen: HashSet::new(),
            stats: RunStats::default(),
        }
    }

    pub fn with_exclusions(mut self, exclusions: &'a HashSet<String>) -> Self {
        self.exclusions = Some(exclusions);
        self
    }

    /// Stop after this many written rows. `None` or `Some(0)` means no limit.
    pub fn with_max_rows(mut self, max_rows: Option<usize>) -> Self {
        self.max_rows = max_rows.filter(|&n| n > 0);
        self
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// True once the row limit has been reached.
    pub fn is_done(&self) -> bool {
        self.max_rows
            .is_some_and(|max_rows| self.stats.written >= max_rows)
    }

    fn skip(&mut self, expression: &str, reason: SkipReason) -> Outcome {
        trace!(expression, %reason, "skipped entry");
        self.stats.record_skip(reason);
        Outcome::Skipped(reason)
    }

    /// Classify one entry and update the counters.
    pub fn process(&mut self, entry: &DictionaryEntry) -> Outcome {
        self.stats.entries += 1;

        let expression = entry.pick_expression();
        let reading = entry.pick_reading();

        let word = match self.rules.eligibility.check(&expression, &reading) {
            Ok(word) => word,
            Err(rejection) => return self.skip(&expression, SkipReason::Invalid(rejection)),
        };
        if !self.rules.filter.is_common(&entry.priorities) {
            return self.skip(&expression, SkipReason::Uncommon);
        }
        if self.seen.contains(&word.expression) {
            return self.skip(&expression, SkipReason::Duplicate);
        }
        if self
            .exclusions
            .is_some_and(|excluded| excluded.contains(&word.expression))
        {
            return self.skip(&expression, SkipReason::Excluded);
        }

        let meaning = select_meaning(entry, &self.rules.filter);
        if meaning.is_empty() {
            return self.skip(&expression, SkipReason::NoMeaning);
        }

        trace!(
            expression = %word.expression,
            start = %word.start_phoneme,
            end = %word.end_phoneme,
            "accepted entry"
        );
        self.seen.insert(word.expression.clone());
        self.stats.written += 1;
        Outcome::Accepted(AcceptedRecord {
            word: word.expression,
            reading: word.reading,
            meaning,
            level: None,
        })
    }

    /// Drive `entries` into `sink` in source order. `on_entry` sees the
    /// counters after every entry. The first input or output error aborts
    /// the run.
    pub fn run<I, S, F>(mut self, entries: I, sink: &mut S, mut on_entry: F) -> Result<RunStats>
    where
        I: IntoIterator<Item = Result<DictionaryEntry>>,
        S: RecordSink + ?Sized,
        F: FnMut(&RunStats),
    {
        for entry in entries {
            let entry = entry?;
            if let Outcome::Accepted(record) = self.process(&entry) {
                sink.accept(&record)?;
            }
            on_entry(&self.stats);

            if self.is_done() {
                debug!(written = self.stats.written, "row limit reached");
                break;
            }
        }
        Ok(self.stats)
    }
}
