//! Byte-grammar matching over hex-digit strings.
//!
//! Each encoding defines a grammar describing what a plausible encoded run
//! looks like, expressed as a regular expression over the hex-digit
//! alphabet. The grammars are empirically tuned against real game dumps,
//! with some margin for non-standard characters. The compatibility target
//! is observed behavior, not conformance to the encoding standards.
//!
//! Three post-filters are applied outside the grammars so they stay
//! testable in isolation:
//!
//! 1. the terminating zero run is stripped from the match (a terminator is
//!    not part of the decodable payload),
//! 2. any match containing the literal digits `ffff` is discarded entirely
//!    (uninitialized memory filler, not real data),
//! 3. any match starting at an odd digit offset is discarded (byte
//!    alignment).

use crate::encoding::Encoding;
use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

/// Hex filler pattern marking uninitialized memory
const FILLER: &str = "ffff";

/// Shift-JIS-looking runs: a restricted lead byte, one or more trail byte
/// pairs, a zero byte or end of input.
static SJIS_GRAMMAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new("(?:8[1-9a-f]|9[0-9a-f]|23)(?:[1-9a-f][0-9a-f]|0[1-9a-f])+(?:00|$)")
        .expect("static grammar")
});

/// UTF-16 runs: 2-byte code units up to a zero code unit or end of input.
/// Big and little endian share the grammar; only decoding differs.
static UTF16_GRAMMAR: Lazy<Regex> =
    Lazy::new(|| Regex::new("(?:[0-9a-f]{4})+?(?:0000|$)").expect("static grammar"));

/// UTF-8 runs: valid lead+continuation sequences for code points up to
/// U+10FFFF, repeated until a zero byte or end of input.
static UTF8_GRAMMAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        "(?:",
        // U+0000 to U+007F: 0xxxxxxx
        "[0-7][0-9a-f]|",
        // U+0080 to U+07FF: 110xxxxx 10xxxxxx
        "(?:c[0-2]|d[0-9a-f])[8-9a-b][0-9a-f]|",
        // U+0800 to U+0FFF: 11100000 101xxxxx 10xxxxxx
        "e0[a-b][0-9a-f][8-9a-b][0-9a-f]|",
        // U+1000 to U+CFFF: 1110xxxx 10xxxxxx 10xxxxxx
        "e[1-9a-c](?:[8-9a-b][0-9a-f]){2}|",
        // U+D000 to U+D7FF: 11101101 100xxxxx 10xxxxxx
        "ed[8-9][0-9a-f][8-9a-b][0-9a-f]|",
        // U+E000 to U+FFFF: 1110111x 10xxxxxx 10xxxxxx
        "e[e-f](?:[8-9a-b][0-9a-f]){2}|",
        // U+10000 to U+3FFFF: 11110000 10(01|10|11)xxxx 10xxxxxx 10xxxxxx
        "f0[9a-b][0-9a-f](?:[8-9a-b][0-9a-f]){2}|",
        // U+40000 to U+FFFFF: 111100xx 10xxxxxx 10xxxxxx 10xxxxxx
        "f[1-3](?:[8-9a-b][0-9a-f]){3}|",
        // U+100000 to U+10FFFF: 11110100 1000xxxx 10xxxxxx 10xxxxxx
        "f48[0-9a-f](?:[8-9a-b][0-9a-f]){2}",
        ")+?(?:00|$)",
    ))
    .expect("static grammar")
});

/// A byte-aligned candidate encoded run extracted from a hex string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Hex digits of the run, terminator already stripped
    pub hex: String,
    /// Digit offset of the run within the scanned string (always even)
    pub offset: usize,
}

impl Chunk {
    /// Creates a new chunk
    pub fn new(hex: impl Into<String>, offset: usize) -> Self {
        Self {
            hex: hex.into(),
            offset,
        }
    }

    /// Digit offset one past the end of the payload within the scanned
    /// string (terminator excluded)
    pub fn end(&self) -> usize {
        self.offset + self.hex.len()
    }
}

/// Normalizes raw hex input: lowercase, whitespace stripped.
///
/// Rejects input whose remaining characters are not an even number of hex
/// digits. No partial extraction is attempted on malformed input.
pub fn normalize(raw: &str) -> Result<String> {
    let hex: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if hex.len() % 2 != 0 {
        return Err(Error::invalid_input("odd number of hex digits"));
    }
    if let Some(bad) = hex.chars().find(|c| !matches!(c, '0'..='9' | 'a'..='f')) {
        return Err(Error::invalid_input(format!(
            "character '{bad}' is not a hex digit"
        )));
    }
    Ok(hex)
}

/// Zero-run terminator unit for an encoding's grammar
fn terminator(encoding: Encoding) -> &'static str {
    match encoding {
        Encoding::ShiftJis | Encoding::Utf8 => "00",
        Encoding::Utf16Be | Encoding::Utf16Le => "0000",
    }
}

fn grammar(encoding: Encoding) -> &'static Regex {
    match encoding {
        Encoding::ShiftJis => &SJIS_GRAMMAR,
        Encoding::Utf16Be | Encoding::Utf16Le => &UTF16_GRAMMAR,
        Encoding::Utf8 => &UTF8_GRAMMAR,
    }
}

/// Extracts candidate chunks from a hex string under an encoding's grammar.
///
/// Matching is greedy per position and scanning resumes after each match.
/// The terminating zero run is stripped, matches containing `ffff` or
/// starting at an odd offset are discarded, and empty payloads (a bare
/// terminator) never become chunks.
pub fn extract(hex: &str, encoding: Encoding) -> Vec<Chunk> {
    let re = grammar(encoding);
    let term = terminator(encoding);
    let mut chunks = Vec::new();

    for m in re.find_iter(hex) {
        let mut payload = m.as_str();
        while let Some(stripped) = payload.strip_suffix(term) {
            payload = stripped;
        }
        if payload.is_empty() {
            continue;
        }
        if payload.contains(FILLER) {
            trace!("discarding filler match at offset {}", m.start());
            continue;
        }
        if m.start() % 2 != 0 {
            trace!("discarding misaligned match at offset {}", m.start());
            continue;
        }
        chunks.push(Chunk::new(payload, m.start()));
    }

    chunks
}
