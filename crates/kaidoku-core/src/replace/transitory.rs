//! The transitory hex/text representation.
//!
//! Hex-to-text rules substitute literal text into a hex string before
//! chunk extraction. The result is a *transitory string*: alternating hex
//! and literal segments delimited by `-`. Delimiters occurring inside
//! literal content are backslash-escaped so the split is lossless.
//!
//! Splitting is an explicit escape-aware tokenizer rather than a single
//! regular expression: clearer, and immune to pathological backtracking
//! on adversarial input.

use crate::encoding::Encoding;

/// Segment delimiter in transitory strings
pub const DELIMITER: char = '-';

/// Wraps literal replacement text for insertion into a hex string.
///
/// The delimiter itself is escaped inside the content so it survives the
/// later split.
pub fn wrap_replacement(replacement: &str) -> String {
    format!("-{}-", escape_literal(replacement))
}

/// Wraps a pattern replacement for insertion into a hex string.
///
/// On top of [`wrap_replacement`], every unescaped `$n` group reference
/// is itself delimiter-wrapped: the text a group expands to is hex and
/// must land back in a hex segment, where the grammar scan can reach it.
pub fn wrap_pattern_replacement(replacement: &str) -> String {
    format!("-{}-", isolate_group_refs(&escape_literal(replacement)))
}

fn escape_literal(s: &str) -> String {
    s.replace('-', "\\-")
}

/// Resolves escaped delimiters inside a literal segment
pub fn unescape_literal(s: &str) -> String {
    s.replace("\\-", "-")
}

fn isolate_group_refs(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_backslash = false;
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '$' && !prev_backslash {
            out.push(DELIMITER);
            out.push('$');
            while let Some(&d) = chars.peek().filter(|d| d.is_ascii_digit()) {
                out.push(d);
                chars.next();
            }
            out.push(DELIMITER);
            prev_backslash = false;
        } else {
            prev_backslash = c == '\\';
            out.push(c);
        }
    }
    out
}

/// Splits a transitory string into its segments, in order.
///
/// Even-indexed segments (0-based) are hex, odd-indexed segments are
/// literal; the first segment is always hex, empty if the string starts
/// with a delimiter. Escaped delimiters do not split and are kept
/// verbatim in the segment (resolve them with [`unescape_literal`]).
pub fn split(s: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut buf = String::new();
    let mut prev_backslash = false;
    for c in s.chars() {
        if c == DELIMITER {
            if prev_backslash {
                buf.push(c);
                prev_backslash = false;
            } else {
                parts.push(std::mem::take(&mut buf));
            }
        } else {
            prev_backslash = c == '\\';
            buf.push(c);
        }
    }
    parts.push(buf);
    parts
}

/// Converts a transitory string into completely readable text: hex
/// segments are decoded under the encoding, literal segments are
/// unescaped and kept as-is.
pub fn to_readable_string(s: &str, encoding: Encoding) -> String {
    let mut out = String::new();
    for (i, part) in split(s).iter().enumerate() {
        if i % 2 == 0 {
            out.push_str(&encoding.decode_hex(part));
        } else {
            out.push_str(&unescape_literal(part));
        }
    }
    out
}
