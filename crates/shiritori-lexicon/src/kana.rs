//! Kana script conversion and shiritori phoneme normalization.
//!
//! Shiritori links words by sound, not spelling: "ぱ" and "は" are the same
//! link point, as are "ゃ" and "や". Everything that compares edge characters
//! goes through [`normalize_for_shiritori`].

/// Long-vowel mark (chōonpu). Carries no sound of its own at a word edge.
pub const LONG_VOWEL_MARK: char = 'ー';

/// Distance between a katakana code point and its hiragana counterpart.
const KATAKANA_OFFSET: u32 = 0x60;

/// Small kana collapsed to their full-size form.
const SMALL_KANA: [(char, char); 10] = [
    ('ぁ', 'あ'),
    ('ぃ', 'い'),
    ('ぅ', 'う'),
    ('ぇ', 'え'),
    ('ぉ', 'お'),
    ('っ', 'つ'),
    ('ゃ', 'や'),
    ('ゅ', 'ゆ'),
    ('ょ', 'よ'),
    ('ゎ', 'わ'),
];

/// Voiced (dakuten) and semi-voiced (handakuten) kana collapsed to the
/// unvoiced base consonant.
const VOICED_KANA: [(char, char); 25] = [
    ('が', 'か'),
    ('ぎ', 'き'),
    ('ぐ', 'く'),
    ('げ', 'け'),
    ('ご', 'こ'),
    ('ざ', 'さ'),
    ('じ', 'し'),
    ('ず', 'す'),
    ('ぜ', 'せ'),
    ('ぞ', 'そ'),
    ('だ', 'た'),
    ('ぢ', 'ち'),
    ('づ', 'つ'),
    ('で', 'て'),
    ('ど', 'と'),
    ('ば', 'は'),
    ('び', 'ひ'),
    ('ぶ', 'ふ'),
    ('べ', 'へ'),
    ('ぼ', 'ほ'),
    ('ぱ', 'は'),
    ('ぴ', 'ひ'),
    ('ぷ', 'ふ'),
    ('ぺ', 'へ'),
    ('ぽ', 'ほ'),
];

fn lookup(table: &[(char, char)], ch: char) -> char {
    table
        .iter()
        .find(|(from, _)| *from == ch)
        .map(|&(_, to)| to)
        .unwrap_or(ch)
}

/// Map one katakana character (ァ..=ヶ) to hiragana; anything else is returned as is.
pub fn katakana_to_hiragana(ch: char) -> char {
    match ch {
        'ァ'..='ヶ' => char::from_u32(ch as u32 - KATAKANA_OFFSET).unwrap_or(ch),
        _ => ch,
    }
}

/// Convert every katakana character in `text` to hiragana.
pub fn to_hiragana(text: &str) -> String {
    text.chars().map(katakana_to_hiragana).collect()
}

/// Collapse small kana first, then voicing. Characters in neither table pass through.
pub fn collapse_phonetic_variant(ch: char) -> char {
    lookup(&VOICED_KANA, lookup(&SMALL_KANA, ch))
}

/// Canonical comparison form of `text`: hiragana with small and voiced
/// variants collapsed. Empty in, empty out.
pub fn normalize_for_shiritori(text: &str) -> String {
    text.chars()
        .map(|ch| collapse_phonetic_variant(katakana_to_hiragana(ch)))
        .collect()
}

/// First character used for chaining. A leading long-vowel mark is skipped
/// when something follows it.
pub fn effective_start_char(reading: &str) -> Option<char> {
    let mut chars = reading.chars();
    let first = chars.next()?;
    match chars.next() {
        Some(second) if first == LONG_VOWEL_MARK => Some(second),
        _ => Some(first),
    }
}

/// Last character used for chaining. A trailing long-vowel mark is skipped
/// when something precedes it.
pub fn effective_end_char(reading: &str) -> Option<char> {
    let mut chars = reading.chars().rev();
    let last = chars.next()?;
    match chars.next() {
        Some(before) if last == LONG_VOWEL_MARK => Some(before),
        _ => Some(last),
    }
}

fn edge_phoneme(reading: &str, edge: Option<char>) -> String {
    // A reading of nothing but long-vowel marks has no phonetic base. A mark
    // left at the edge after skipping one (`あーー`) is kept as the phoneme.
    if reading.chars().all(|ch| ch == LONG_VOWEL_MARK) {
        return String::new();
    }
    edge.map(|ch| collapse_phonetic_variant(katakana_to_hiragana(ch)).to_string())
        .unwrap_or_default()
}

/// Normalized start phoneme of `reading`, empty when it has none.
pub fn start_phoneme(reading: &str) -> String {
    edge_phoneme(reading, effective_start_char(reading))
}

/// Normalized end phoneme of `reading`, empty when it has none.
pub fn end_phoneme(reading: &str) -> String {
    edge_phoneme(reading, effective_end_char(reading))
}
