//! Streaming reader for JMdict XML.
//!
//! The dump is scanned in fixed-size chunks and cut into `<entry>` elements,
//! which are parsed one at a time with regexes over the element text. Only the
//! field groups the word pipeline consumes are extracted.
//!
//! JMdict writes tag values such as parts of speech as DTD entities
//! (`<pos>&n;</pos>`). The `<!ENTITY ...>` declarations in the prologue are
//! collected before the first entry and references are expanded to their
//! declared text, so filters see "noun (common) (futsuumeishi)".

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use bzip2::read::BzDecoder;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::entry::{DictionaryEntry, Gloss, Sense};
use crate::error::{Error, Result};

const CHUNK_SIZE: usize = 1024 * 1024;
const READ_BUFFER_CAPACITY: usize = 256 * 1024;

const ENTRY_OPEN: &[u8] = b"<entry>";
const ENTRY_CLOSE: &[u8] = b"</entry>";

lazy_static! {
    static ref ENTITY_DECL: Regex = Regex::new(r#"<!ENTITY\s+([^\s"]+)\s+"([^"]*)"\s*>"#).unwrap();
    static ref ENTITY_REF: Regex =
        Regex::new(r"&(#x[0-9A-Fa-f]+|#[0-9]+|[A-Za-z_][A-Za-z0-9_.-]*);").unwrap();

    // Entry-level field groups
    static ref KEB: Regex = Regex::new(r"<keb>([^<]*)</keb>").unwrap();
    static ref KE_PRI: Regex = Regex::new(r"<ke_pri>([^<]*)</ke_pri>").unwrap();
    static ref REB: Regex = Regex::new(r"<reb>([^<]*)</reb>").unwrap();
    static ref RE_PRI: Regex = Regex::new(r"<re_pri>([^<]*)</re_pri>").unwrap();

    // Sense-level field groups
    static ref SENSE: Regex = Regex::new(r"(?s)<sense>(.*?)</sense>").unwrap();
    static ref POS: Regex = Regex::new(r"<pos>([^<]*)</pos>").unwrap();
    static ref MISC: Regex = Regex::new(r"<misc>([^<]*)</misc>").unwrap();
    static ref FIELD: Regex = Regex::new(r"<field>([^<]*)</field>").unwrap();
    static ref GLOSS: Regex = Regex::new(r"<gloss(\s[^>]*)?>([^<]*)</gloss>").unwrap();
    static ref XML_LANG: Regex = Regex::new(r#"xml:lang\s*=\s*"([^"]*)""#).unwrap();
}

/// Open a JMdict file, decompressing `.bz2` on the fly.
pub fn open_input(path: &Path) -> Result<Box<dyn BufRead + Send>> {
    let file = File::open(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let reader: Box<dyn BufRead + Send> = if path.to_string_lossy().ends_with(".bz2") {
        Box::new(BufReader::with_capacity(
            READ_BUFFER_CAPACITY,
            BzDecoder::new(file),
        ))
    } else {
        Box::new(BufReader::with_capacity(READ_BUFFER_CAPACITY, file))
    };
    Ok(reader)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn resolve_entity(name: &str, entities: &HashMap<String, String>) -> Result<String> {
    let predefined = match name {
        "amp" => Some("&"),
        "lt" => Some("<"),
        "gt" => Some(">"),
        "quot" => Some("\""),
        "apos" => Some("'"),
        _ => None,
    };
    if let Some(text) = predefined {
        return Ok(text.to_string());
    }

    let code = if let Some(hex) = name.strip_prefix("#x") {
        Some(u32::from_str_radix(hex, 16).ok())
    } else {
        name.strip_prefix('#').map(|dec| dec.parse::<u32>().ok())
    };
    match code {
        Some(code) => code
            .and_then(char::from_u32)
            .map(|ch| ch.to_string())
            .ok_or_else(|| Error::UnknownEntity(name.to_string())),
        None => entities
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownEntity(name.to_string())),
    }
}

/// Expand entity and character references in element text.
fn decode_text(raw: &str, entities: &HashMap<String, String>) -> Result<String> {
    if !raw.contains('&') {
        return Ok(raw.to_string());
    }

    let mut out = String::with_capacity(raw.len());
    let mut last = 0;
    for cap in ENTITY_REF.captures_iter(raw) {
        let (Some(whole), Some(name)) = (cap.get(0), cap.get(1)) else {
            continue;
        };
        out.push_str(&raw[last..whole.start()]);
        out.push_str(&resolve_entity(name.as_str(), entities)?);
        last = whole.end();
    }
    out.push_str(&raw[last..]);
    Ok(out)
}

/// Decoded, trimmed, non-empty values of every match of `pattern`.
fn collect_values(
    pattern: &Regex,
    xml: &str,
    entities: &HashMap<String, String>,
) -> Result<Vec<String>> {
    let mut values = Vec::new();
    for cap in pattern.captures_iter(xml) {
        let text = decode_text(&cap[1], entities)?;
        let text = text.trim();
        if !text.is_empty() {
            values.push(text.to_string());
        }
    }
    Ok(values)
}

fn parse_sense(xml: &str, entities: &HashMap<String, String>) -> Result<Sense> {
    let mut glosses = Vec::new();
    for cap in GLOSS.captures_iter(xml) {
        let text = decode_text(&cap[2], entities)?;
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        let lang = cap
            .get(1)
            .and_then(|attrs| XML_LANG.captures(attrs.as_str()))
            .map(|lang| lang[1].to_string())
            .filter(|lang| !lang.is_empty());
        glosses.push(Gloss {
            lang,
            text: text.to_string(),
        });
    }

    Ok(Sense {
        pos: collect_values(&POS, xml, entities)?,
        misc: collect_values(&MISC, xml, entities)?,
        field: collect_values(&FIELD, xml, entities)?,
        glosses,
    })
}

/// Parse one `<entry>...</entry>` element.
pub fn parse_entry(xml: &str, entities: &HashMap<String, String>) -> Result<DictionaryEntry> {
    let mut priorities = collect_values(&KE_PRI, xml, entities)?;
    priorities.extend(collect_values(&RE_PRI, xml, entities)?);

    let senses = SENSE
        .captures_iter(xml)
        .map(|cap| parse_sense(&cap[1], entities))
        .collect::<Result<Vec<_>>>()?;

    Ok(DictionaryEntry {
        expressions: collect_values(&KEB, xml, entities)?,
        readings: collect_values(&REB, xml, entities)?,
        senses,
        priorities,
    })
}

/// Forward-only iterator over the entries of a JMdict document.
///
/// Holds at most one chunk plus one entry in memory. The first error ends the
/// iteration.
pub struct EntryReader<R> {
    reader: R,
    buffer: Vec<u8>,
    /// Start of the unconsumed part of `buffer`.
    pos: usize,
    chunk: Vec<u8>,
    entities: HashMap<String, String>,
    prologue_read: bool,
    entries_read: usize,
    finished: bool,
}

impl<R: Read> EntryReader<R> {
    pub fn new(reader: R) -> Self {
        Self::with_chunk_size(reader, CHUNK_SIZE)
    }

    pub fn with_chunk_size(reader: R, chunk_size: usize) -> Self {
        EntryReader {
            reader,
            buffer: Vec::new(),
            pos: 0,
            chunk: vec![0u8; chunk_size.max(1)],
            entities: HashMap::new(),
            prologue_read: false,
            entries_read: 0,
            finished: false,
        }
    }

    /// Entity declarations seen so far.
    pub fn entities(&self) -> &HashMap<String, String> {
        &self.entities
    }

    fn malformed(&self, reason: impl Into<String>) -> Error {
        Error::MalformedEntry {
            index: self.entries_read + 1,
            reason: reason.into(),
        }
    }

    fn read_prologue(&mut self, end: usize) -> Result<()> {
        let prologue = std::str::from_utf8(&self.buffer[..end])
            .map_err(|e| self.malformed(format!("invalid UTF-8 in prologue: {e}")))?;
        for cap in ENTITY_DECL.captures_iter(prologue) {
            self.entities.insert(cap[1].to_string(), cap[2].to_string());
        }
        self.prologue_read = true;
        debug!(entities = self.entities.len(), "read JMdict prologue");
        Ok(())
    }

    /// Read one more chunk into the buffer, dropping consumed bytes first.
    /// `false` at end of input.
    fn fill(&mut self) -> Result<bool> {
        let bytes_read = self.reader.read(&mut self.chunk)?;
        if bytes_read == 0 {
            return Ok(false);
        }
        if self.pos > 0 {
            self.buffer.drain(..self.pos);
            self.pos = 0;
        }
        self.buffer.extend_from_slice(&self.chunk[..bytes_read]);
        Ok(true)
    }

    fn next_element(&mut self) -> Result<Option<String>> {
        loop {
            if let Some(offset) = find(&self.buffer[self.pos..], ENTRY_OPEN) {
                let start = self.pos + offset;
                if !self.prologue_read {
                    self.read_prologue(start)?;
                }
                if let Some(end_offset) = find(&self.buffer[start..], ENTRY_CLOSE) {
                    let end = start + end_offset + ENTRY_CLOSE.len();
                    let xml = std::str::from_utf8(&self.buffer[start..end])
                        .map_err(|e| self.malformed(format!("invalid UTF-8: {e}")))?
                        .to_string();
                    self.pos = end;
                    return Ok(Some(xml));
                }
                self.pos = start;
            } else if self.prologue_read {
                // Keep just enough to complete an "<entry>" split across chunks.
                let keep = ENTRY_OPEN.len() - 1;
                self.pos = self.pos.max(self.buffer.len().saturating_sub(keep));
            }

            if !self.fill()? {
                if find(&self.buffer[self.pos..], ENTRY_OPEN).is_some() {
                    return Err(self.malformed("<entry> not closed before end of input"));
                }
                if !self.prologue_read {
                    let end = self.buffer.len();
                    self.read_prologue(end)?;
                }
                return Ok(None);
            }
        }
    }
}

impl<R: Read> Iterator for EntryReader<R> {
    type Item = Result<DictionaryEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let parsed = match self.next_element() {
            Ok(Some(xml)) => {
                self.entries_read += 1;
                parse_entry(&xml, &self.entities)
            }
            Ok(None) => {
                self.finished = true;
                debug!(entries = self.entries_read, "reached end of JMdict input");
                return None;
            }
            Err(e) => Err(e),
        };

        if parsed.is_err() {
            self.finished = true;
        }
        Some(parsed)
    }
}
