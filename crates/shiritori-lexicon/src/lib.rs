//! Builds a shiritori word list from JMdict.
//!
//! Each dictionary entry is reduced to a headword and hiragana reading,
//! checked for length, script and usable chain points, filtered for
//! commonality and part of speech, and emitted with a short English meaning.
//!
//! ```no_run
//! use shiritori_lexicon::{Config, CsvRecordWriter, EntryReader, Pipeline};
//! use std::path::Path;
//!
//! # fn main() -> shiritori_lexicon::Result<()> {
//! let rules = Config::builtin()?.compile()?;
//! let input = shiritori_lexicon::open_input(Path::new("JMdict_e.xml"))?;
//! let mut sink = CsvRecordWriter::new(std::io::stdout(), true)?;
//! let stats = Pipeline::new(&rules).run(EntryReader::new(input), &mut sink, |_| {})?;
//! sink.flush()?;
//! println!("{} words", stats.written);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod eligibility;
pub mod entry;
pub mod error;
pub mod filter;
pub mod jmdict;
pub mod kana;
pub mod meaning;
pub mod output;
pub mod pipeline;

pub use config::{Config, Rules};
pub use eligibility::{EligibilityRules, NormalizedWord, Rejection};
pub use entry::{AcceptedRecord, DictionaryEntry, Gloss, Sense};
pub use error::{Error, Result};
pub use filter::SemanticFilter;
pub use jmdict::{open_input, EntryReader};
pub use meaning::select_meaning;
pub use output::{load_exclusions, CsvRecordWriter, RecordSink};
pub use pipeline::{InvalidBreakdown, Outcome, Pipeline, RunStats, SkipReason};
