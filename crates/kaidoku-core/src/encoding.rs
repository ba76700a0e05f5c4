//! Candidate encodings and best-effort byte decoding.
//!
//! The set of supported encodings is fixed and closed: these are the
//! encodings actually observed in the game memory dumps this tool was
//! built for. Detection order matters: when two encodings score equally
//! during auto-detection, the earlier-declared one wins.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// A supported text encoding.
///
/// The declaration order of the variants is the candidate order used by
/// auto-detection; see [`crate::detect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// Shift-JIS (double-byte, used by most older Japanese games)
    ShiftJis,
    /// UTF-16, big-endian code units
    Utf16Be,
    /// UTF-16, little-endian code units
    Utf16Le,
    /// UTF-8
    Utf8,
}

/// All candidate encodings, in detection order.
pub const DETECTION_ORDER: [Encoding; 4] = [
    Encoding::ShiftJis,
    Encoding::Utf16Be,
    Encoding::Utf16Le,
    Encoding::Utf8,
];

impl Encoding {
    /// Canonical name, as accepted by [`Encoding::from_str`]
    pub fn name(self) -> &'static str {
        match self {
            Encoding::ShiftJis => "sjis",
            Encoding::Utf16Be => "utf16-be",
            Encoding::Utf16Le => "utf16-le",
            Encoding::Utf8 => "utf8",
        }
    }

    /// Human-readable label used in debug output
    pub fn label(self) -> &'static str {
        match self {
            Encoding::ShiftJis => "Shift_JIS",
            Encoding::Utf16Be => "UTF-16BE",
            Encoding::Utf16Le => "UTF-16LE",
            Encoding::Utf8 => "UTF-8",
        }
    }

    fn decoder(self) -> &'static encoding_rs::Encoding {
        match self {
            Encoding::ShiftJis => encoding_rs::SHIFT_JIS,
            Encoding::Utf16Be => encoding_rs::UTF_16BE,
            Encoding::Utf16Le => encoding_rs::UTF_16LE,
            Encoding::Utf8 => encoding_rs::UTF_8,
        }
    }

    /// Decodes a run of hex digits into text under this encoding.
    ///
    /// Decoding is total and deterministic: malformed code points become
    /// replacement characters, a trailing unpaired hex digit is dropped,
    /// and anything that is not a hex digit pair is skipped. This never
    /// panics regardless of what replacement rules injected upstream.
    pub fn decode_hex(self, hex: &str) -> String {
        let bytes = hex_to_bytes(hex);
        // no BOM sniffing: a stray BOM in a dump must not flip the encoding
        let (text, _) = self.decoder().decode_without_bom_handling(&bytes);
        text.into_owned()
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sjis" | "shift-jis" | "shift_jis" => Ok(Encoding::ShiftJis),
            "utf16-be" | "utf-16be" => Ok(Encoding::Utf16Be),
            "utf16-le" | "utf-16le" => Ok(Encoding::Utf16Le),
            "utf8" | "utf-8" => Ok(Encoding::Utf8),
            other => Err(Error::unsupported_encoding(other)),
        }
    }
}

/// Encoding selection: a fixed encoding, or auto-detection over all
/// candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncodingChoice {
    /// Run the pipeline under every candidate and keep the best attempt
    #[default]
    Detect,
    /// Decode under exactly one encoding
    Fixed(Encoding),
}

impl FromStr for EncodingChoice {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s == "detect" {
            Ok(EncodingChoice::Detect)
        } else {
            Ok(EncodingChoice::Fixed(s.parse()?))
        }
    }
}

/// Converts hex digit pairs to bytes, two digits per byte.
///
/// Invalid pairs are skipped and a trailing lone digit is dropped, so
/// this is safe to call on strings that replacement rules have already
/// touched.
fn hex_to_bytes(hex: &str) -> Vec<u8> {
    let digits: Vec<u8> = hex
        .bytes()
        .filter_map(|b| (b as char).to_digit(16).map(|d| d as u8))
        .collect();
    digits
        .chunks_exact(2)
        .map(|pair| (pair[0] << 4) | pair[1])
        .collect()
}
