//! Output rendering: debug traces, strictness filtering and decorations.
//!
//! Rendering is where the strictness threshold applies. The pipeline keeps
//! every line it decoded; the renderer drops the ones whose validity falls
//! below the threshold, unless the rejected-lines debug flag asks for them.

use crate::detect::{Conversion, DecodingAttempt};
use crate::error::{Error, Result};
use crate::line::{DecodedLine, LineList};
use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;

/// A set of debug trace flags.
///
/// Each flag enables one trace in the rendered output and is addressed by
/// a one-letter name. Detail flags imply their summary flag: asking for
/// the derivation of a mark always prints the mark too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DebugFlags(u32);

impl DebugFlags {
    /// `i`: hex chunk of each line
    pub const LINE_HEX: Self = Self(1 << 0);
    /// `g`: whole normalized hex input
    pub const LIST_HEX_INPUT: Self = Self(1 << 1);
    /// `7`: validity mark of each line's hex chunk
    pub const LINE_HEX_VALIDITY: Self = Self(1 << 2);
    /// `v`: validity mark of each line's decoded text
    pub const LINE_TEXT_VALIDITY: Self = Self(1 << 3);
    /// `6`: derivation of the hex mark (implies `7`)
    pub const LINE_HEX_VALIDITY_DETAILS: Self = Self(1 << 4 | 1 << 2);
    /// `d`: derivation of the text mark (implies `v`)
    pub const LINE_TEXT_VALIDITY_DETAILS: Self = Self(1 << 5 | 1 << 3);
    /// `n`: decoded text before text replacements
    pub const LINE_UNFORMATTED: Self = Self(1 << 6);
    /// `f`: lines rejected by the strictness threshold
    pub const LINE_REJECTED: Self = Self(1 << 7);
    /// `e`: detected encoding
    pub const LIST_ENCODING: Self = Self(1 << 8);
    /// `s`: validity mark of the detected encoding
    pub const LIST_ENCODING_VALIDITY: Self = Self(1 << 9);
    /// `r`: derivation of the encoding mark (implies `s`)
    pub const LIST_ENCODING_VALIDITY_DETAILS: Self = Self(1 << 10 | 1 << 9);
    /// `x`: attempts decoded with a losing encoding
    pub const LIST_ENCODING_REJECTED: Self = Self(1 << 11);
    /// `h`: hex chunk after hex-to-hex replacements
    pub const LINE_HEX_AFTER_HEX_REPL: Self = Self(1 << 12);
    /// `t`: hex chunk after hex-to-text replacements
    pub const LINE_HEX_AFTER_STR_REPL: Self = Self(1 << 13);

    /// No flags set
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Whether no flag is set
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether every flag of `other` is set in `self`
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether any flag of `other` is set in `self`
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for DebugFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl FromStr for DebugFlags {
    type Err = Error;

    /// Parses a string of one-letter flag names, e.g. `"ivd"`.
    ///
    /// `V` is shorthand for both validity marks, `D` for both derivations.
    fn from_str(s: &str) -> Result<Self> {
        let mut flags = Self::empty();
        for c in s.chars() {
            flags = flags
                | match c {
                    'i' => Self::LINE_HEX,
                    'g' => Self::LIST_HEX_INPUT,
                    '7' => Self::LINE_HEX_VALIDITY,
                    'v' => Self::LINE_TEXT_VALIDITY,
                    'V' => Self::LINE_HEX_VALIDITY | Self::LINE_TEXT_VALIDITY,
                    '6' => Self::LINE_HEX_VALIDITY_DETAILS,
                    'd' => Self::LINE_TEXT_VALIDITY_DETAILS,
                    'D' => Self::LINE_HEX_VALIDITY_DETAILS | Self::LINE_TEXT_VALIDITY_DETAILS,
                    'n' => Self::LINE_UNFORMATTED,
                    'f' => Self::LINE_REJECTED,
                    'e' => Self::LIST_ENCODING,
                    's' => Self::LIST_ENCODING_VALIDITY,
                    'r' => Self::LIST_ENCODING_VALIDITY_DETAILS,
                    'x' => Self::LIST_ENCODING_REJECTED,
                    'h' => Self::LINE_HEX_AFTER_HEX_REPL,
                    't' => Self::LINE_HEX_AFTER_STR_REPL,
                    other => return Err(Error::invalid_debug_flag(other)),
                };
        }
        Ok(flags)
    }
}

impl fmt::Display for DebugFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

/// Decorations placed around the rendered output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatter {
    /// Before the whole line group
    pub before_all: &'static str,
    /// Between two lines
    pub between: &'static str,
    /// After the whole line group
    pub after_all: &'static str,
    /// Before each line
    pub line_before: &'static str,
    /// After each line
    pub line_after: &'static str,
}

impl Formatter {
    /// Plain output: lines separated by a dashed rule
    pub fn standard() -> Self {
        Self {
            before_all: "",
            between: "\n----------\n",
            after_all: "",
            line_before: "",
            line_after: "",
        }
    }

    /// Machine-friendly output: a bracketed list of quoted lines
    pub fn fixture() -> Self {
        Self {
            before_all: "[",
            between: ",\n",
            after_all: "]",
            line_before: "\"",
            line_after: "\"",
        }
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::standard()
    }
}

fn indent(s: &str) -> String {
    s.lines()
        .map(|l| format!("\t{l}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders conversions to text according to flags, strictness and
/// decorations.
#[derive(Debug, Clone)]
pub struct Renderer {
    flags: DebugFlags,
    strictness: i32,
    formatter: Formatter,
}

impl Renderer {
    /// Creates a renderer
    pub fn new(flags: DebugFlags, strictness: i32, formatter: Formatter) -> Self {
        Self {
            flags,
            strictness,
            formatter,
        }
    }

    /// Renders a whole conversion.
    ///
    /// Only the winning attempt is shown unless the rejected-encodings
    /// flag is set, in which case the losing attempts follow it.
    pub fn render(&self, conversion: &Conversion) -> String {
        let mut out = String::new();

        if self.flags.contains(DebugFlags::LIST_ENCODING_REJECTED) {
            out.push_str("Lines with detected encoding: \n");
        }
        out.push_str(&self.render_attempt(conversion.winner()));
        if self.flags.contains(DebugFlags::LIST_ENCODING_REJECTED) {
            out.push_str("\nFailed attempts at decoding: \n");
            for attempt in conversion.attempts.iter().filter(|a| !a.winner) {
                out.push_str(&self.render_attempt(attempt));
                out.push('\n');
            }
        }

        out.trim().to_owned()
    }

    fn render_attempt(&self, attempt: &DecodingAttempt) -> String {
        let mut out = String::new();

        if self.flags.contains(DebugFlags::LIST_ENCODING) {
            out.push_str(&format!("Encoding: {}\n", attempt.encoding.label()));
        }
        if self.flags.contains(DebugFlags::LIST_ENCODING_VALIDITY) {
            out.push_str(&format!(
                "Encoding validity: {}\n",
                attempt.evaluation.mark
            ));
            if self
                .flags
                .contains(DebugFlags::LIST_ENCODING_VALIDITY_DETAILS)
            {
                out.push_str("details:\n");
                out.push_str(&indent(&attempt.evaluation.details));
                out.push('\n');
            }
        }
        out.push_str(&self.render_lines(&attempt.lines));

        out
    }

    /// Renders a line list with decorations and the strictness filter
    pub fn render_lines(&self, lines: &LineList) -> String {
        let mut out = String::new();

        if self.flags.contains(DebugFlags::LIST_HEX_INPUT) {
            out.push_str(&format!("input: 0x{}\n", lines.hex_input));
        }

        let displayed: Vec<&DecodedLine> = if self.flags.contains(DebugFlags::LINE_REJECTED) {
            lines.lines.iter().collect()
        } else {
            lines
                .lines
                .iter()
                .filter(|l| l.validity() >= self.strictness)
                .collect()
        };

        out.push_str(self.formatter.before_all);
        if !self.flags.is_empty() {
            out.push('\n');
        }
        for (i, line) in displayed.iter().enumerate() {
            out.push_str(&self.render_line(line));
            if i + 1 < displayed.len() {
                out.push_str(self.formatter.between);
            }
            if !self.flags.is_empty() {
                out.push('\n');
            }
        }
        out.push_str(self.formatter.after_all);

        out.trim().to_owned()
    }

    fn render_line(&self, line: &DecodedLine) -> String {
        let mut out = String::new();

        if self.flags.contains(DebugFlags::LINE_HEX) {
            out.push_str(&format!("hex: \n0x{}\n", line.hex));
        }
        if self.flags.contains(DebugFlags::LINE_HEX_AFTER_HEX_REPL) {
            out.push_str(&format!(
                "hex after hex replacements: \n0x{}\n",
                line.hex_after_hex_replacements
            ));
        }
        if self.flags.contains(DebugFlags::LINE_HEX_AFTER_STR_REPL) {
            out.push_str(&format!(
                "hex after str replacements: \n0x{}\n",
                line.hex_after_str_replacements
            ));
        }

        if self.flags.contains(DebugFlags::LINE_HEX_VALIDITY) {
            out.push_str(&format!(
                "hex validity: {}\n",
                line.hex_evaluation.mark
            ));
            if self.flags.contains(DebugFlags::LINE_HEX_VALIDITY_DETAILS) {
                out.push_str("details: \n");
                out.push_str(&indent(&line.hex_evaluation.details));
                out.push('\n');
            }
        }
        if self.flags.contains(DebugFlags::LINE_TEXT_VALIDITY) {
            out.push_str(&format!(
                "string validity: {}\n",
                line.text_evaluation.mark
            ));
            if self.flags.contains(DebugFlags::LINE_TEXT_VALIDITY_DETAILS) {
                out.push_str("details: \n");
                out.push_str(&indent(&line.text_evaluation.details));
                out.push('\n');
            }
        }

        if self.flags.contains(DebugFlags::LINE_UNFORMATTED) {
            out.push_str(&format!("non formatted: \n{}\n", line.text));
        }

        if !self.flags.is_empty() {
            out.push_str("result: \n");
        }
        out.push_str(self.formatter.line_before);
        out.push_str(&line.text_after_replacements);
        out.push_str(self.formatter.line_after);

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::Detector;
    use crate::encoding::{Encoding, EncodingChoice};
    use crate::replace::Rules;
    use pretty_assertions::assert_eq;

    fn convert(raw: &str, encoding: Encoding) -> Conversion {
        Detector::default()
            .convert(raw, &Rules::new(), EncodingChoice::Fixed(encoding))
            .unwrap()
    }

    #[test]
    fn test_parse_flags() {
        let flags: DebugFlags = "iv".parse().unwrap();
        assert!(flags.contains(DebugFlags::LINE_HEX));
        assert!(flags.contains(DebugFlags::LINE_TEXT_VALIDITY));
        assert!(!flags.contains(DebugFlags::LINE_UNFORMATTED));
    }

    #[test]
    fn test_details_flag_implies_summary_flag() {
        let flags: DebugFlags = "6".parse().unwrap();
        assert!(flags.contains(DebugFlags::LINE_HEX_VALIDITY));
        let flags: DebugFlags = "r".parse().unwrap();
        assert!(flags.contains(DebugFlags::LIST_ENCODING_VALIDITY));
    }

    #[test]
    fn test_uppercase_shorthand() {
        let flags: DebugFlags = "V".parse().unwrap();
        assert!(flags.contains(DebugFlags::LINE_HEX_VALIDITY));
        assert!(flags.contains(DebugFlags::LINE_TEXT_VALIDITY));
    }

    #[test]
    fn test_unknown_flag_rejected() {
        assert!("iz".parse::<DebugFlags>().is_err());
    }

    #[test]
    fn test_plain_render_filters_by_strictness() {
        // "Hello" has validity -14, under the default threshold
        let conversion = convert("48656c6c6f00", Encoding::Utf8);
        let strict = Renderer::new(DebugFlags::empty(), 20, Formatter::standard());
        assert_eq!(strict.render(&conversion), "");

        let lenient = Renderer::new(DebugFlags::empty(), -100, Formatter::standard());
        assert_eq!(lenient.render(&conversion), "Hello");
    }

    #[test]
    fn test_rejected_flag_shows_filtered_lines() {
        let conversion = convert("48656c6c6f00", Encoding::Utf8);
        let renderer = Renderer::new(DebugFlags::LINE_REJECTED, 20, Formatter::standard());
        assert!(renderer.render(&conversion).contains("Hello"));
    }

    #[test]
    fn test_between_decoration_separates_lines() {
        // two zero-terminated runs
        let conversion = convert("41424344004546474800", Encoding::Utf8);
        let renderer = Renderer::new(DebugFlags::empty(), -100, Formatter::standard());
        assert_eq!(renderer.render(&conversion), "ABCD\n----------\nEFGH");
    }

    #[test]
    fn test_fixture_formatter() {
        let conversion = convert("41424344004546474800", Encoding::Utf8);
        let renderer = Renderer::new(DebugFlags::empty(), -100, Formatter::fixture());
        assert_eq!(renderer.render(&conversion), "[\"ABCD\",\n\"EFGH\"]");
    }

    #[test]
    fn test_hex_trace() {
        let conversion = convert("48656c6c6f00", Encoding::Utf8);
        let renderer = Renderer::new(
            "ig".parse().unwrap(),
            -100,
            Formatter::standard(),
        );
        let output = renderer.render(&conversion);
        assert!(output.contains("input: 0x48656c6c6f00"));
        assert!(output.contains("hex: \n0x48656c6c6f"));
        assert!(output.contains("result: \nHello"));
    }

    #[test]
    fn test_validity_traces_with_details() {
        let conversion = convert("48656c6c6f00", Encoding::Utf8);
        let renderer = Renderer::new(
            "6d".parse().unwrap(),
            -100,
            Formatter::standard(),
        );
        let output = renderer.render(&conversion);
        assert!(output.contains("hex validity: 10"));
        assert!(output.contains("string validity: -24"));
        assert!(output.contains("\tlength=10"));
    }

    #[test]
    fn test_encoding_traces() {
        let conversion = Detector::default()
            .convert("48656c6c6f00", &Rules::new(), EncodingChoice::Detect)
            .unwrap();
        let renderer = Renderer::new(
            "esx".parse().unwrap(),
            -100,
            Formatter::standard(),
        );
        let output = renderer.render(&conversion);
        assert!(output.contains("Encoding: "));
        assert!(output.contains("Encoding validity: "));
        assert!(output.contains("Failed attempts at decoding: "));
    }
}
