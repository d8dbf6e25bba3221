//! Record sinks and the optional exclusion word set.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::entry::AcceptedRecord;
use crate::error::{Error, Result};

/// Column names of the word list, in row order.
pub const HEADER: [&str; 4] = ["word", "reading", "meaning", "level"];

/// Receives accepted records in acceptance order.
pub trait RecordSink {
    fn accept(&mut self, record: &AcceptedRecord) -> Result<()>;
}

impl RecordSink for Vec<AcceptedRecord> {
    fn accept(&mut self, record: &AcceptedRecord) -> Result<()> {
        self.push(record.clone());
        Ok(())
    }
}

/// Writes `word,reading,meaning,level` rows.
pub struct CsvRecordWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvRecordWriter<W> {
    /// The header row, when requested, is written immediately so an empty
    /// run still produces it.
    pub fn new(writer: W, with_header: bool) -> Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        if with_header {
            writer.write_record(HEADER)?;
        }
        Ok(CsvRecordWriter { writer })
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer.into_inner().map_err(|e| {
            let source = e.error();
            Error::Io(std::io::Error::new(source.kind(), source.to_string()))
        })
    }
}

impl<W: Write> RecordSink for CsvRecordWriter<W> {
    fn accept(&mut self, record: &AcceptedRecord) -> Result<()> {
        self.writer.serialize(record)?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct WordRow {
    word: Option<String>,
}

/// Words to leave out of the output.
///
/// A `.csv` file is read with its header and its `word` column is used, so a
/// previous run's output can be fed back in. Any other file holds one word per
/// line; blank lines and `#` comments are skipped.
pub fn load_exclusions(path: &Path) -> Result<HashSet<String>> {
    let file = File::open(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut words = HashSet::new();
    if path.to_string_lossy().ends_with(".csv") {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(file);
        for row in reader.deserialize::<WordRow>() {
            if let Some(word) = row?.word {
                let word = word.trim();
                if !word.is_empty() {
                    words.insert(word.to_string());
                }
            }
        }
    } else {
        for line in BufReader::new(file).lines() {
            let line = line?;
            let word = line.trim();
            if word.is_empty() || word.starts_with('#') {
                continue;
            }
            words.insert(word.to_string());
        }
    }

    debug!(path = %path.display(), words = words.len(), "loaded exclusion words");
    Ok(words)
}
