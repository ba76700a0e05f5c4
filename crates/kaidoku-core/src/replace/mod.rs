//! Ordered hex/text replacement rules.
//!
//! Rules run in three phases along the pipeline:
//!
//! - `Hex2Hex` rewrites the raw hex before chunk extraction,
//! - `Hex2Str` substitutes hex sequences with literal text, producing the
//!   transitory representation described in [`transitory`],
//! - `Str2Str` rewrites the decoded text of each line.
//!
//! Within a phase, rules apply in registration order, each on the result
//! of the previous one. A phase with no rules is the identity.

pub mod transitory;

use crate::error::{Error, Result};
use regex::Regex;
use tracing::trace;

/// The pipeline phase a rule belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Hex rewritten as hex, before extraction
    Hex2Hex,
    /// Hex substituted with literal text, before extraction
    Hex2Str,
    /// Decoded text rewritten as text, after decoding
    Str2Str,
}

/// A single replacement rule.
///
/// `pattern` is a literal sequence unless `is_regex` is set, in which case
/// `replacement` may carry `$n` references to capture groups. When
/// `escape_backslashes` is set, backslash sequences (`\n`, `\t`, `\uXXXX`,
/// ...) in both sides are resolved before use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Sequence or pattern to be replaced
    pub pattern: String,
    /// Replacement text
    pub replacement: String,
    /// Resolve backslash escape sequences in both sides
    pub escape_backslashes: bool,
    /// Interpret `pattern` as a regular expression
    pub is_regex: bool,
    /// Phase this rule runs in
    pub phase: Phase,
}

impl Rule {
    /// Creates a new rule
    pub fn new(
        pattern: impl Into<String>,
        replacement: impl Into<String>,
        phase: Phase,
    ) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
            escape_backslashes: false,
            is_regex: false,
            phase,
        }
    }

    /// Enables backslash escape processing
    pub fn escaped(mut self) -> Self {
        self.escape_backslashes = true;
        self
    }

    /// Marks the pattern as a regular expression
    pub fn regex(mut self) -> Self {
        self.is_regex = true;
        self
    }

    fn processed_pattern(&self) -> String {
        if self.escape_backslashes {
            unescape(&self.pattern)
        } else {
            self.pattern.clone()
        }
    }

    fn processed_replacement(&self) -> String {
        if self.escape_backslashes {
            unescape(&self.replacement)
        } else {
            self.replacement.clone()
        }
    }

    /// Applies this rule to a working string
    pub fn apply(&self, s: &str) -> Result<String> {
        let pattern = self.processed_pattern();
        let replacement = self.processed_replacement();
        trace!(phase = ?self.phase, pattern = %pattern, "applying replacement");

        match self.phase {
            Phase::Hex2Hex | Phase::Str2Str => {
                if self.is_regex {
                    let re = compile(&pattern)?;
                    Ok(re.replace_all(s, replacement.as_str()).into_owned())
                } else {
                    Ok(s.replace(&pattern, &replacement))
                }
            }
            Phase::Hex2Str => {
                if self.is_regex {
                    let re = compile(&pattern)?;
                    let wrapped = transitory::wrap_pattern_replacement(&replacement);
                    Ok(re.replace_all(s, wrapped.as_str()).into_owned())
                } else {
                    let wrapped = transitory::wrap_replacement(&replacement);
                    Ok(s.replace(&pattern, &wrapped))
                }
            }
        }
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::replacement(pattern, e))
}

/// Resolves backslash escape sequences in rule text.
///
/// Supports `\b \t \n \f \r \" \' \\` and `\uXXXX`; an unrecognized
/// sequence is kept verbatim.
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('b') => out.push('\u{8}'),
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('f') => out.push('\u{c}'),
            Some('r') => out.push('\r'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some('\\') => out.push('\\'),
            Some('u') => {
                let digits: String = chars.clone().take(4).collect();
                match (digits.len() == 4).then_some(&digits).and_then(|d| {
                    u32::from_str_radix(d, 16).ok().and_then(char::from_u32)
                }) {
                    Some(decoded) => {
                        out.push(decoded);
                        for _ in 0..4 {
                            chars.next();
                        }
                    }
                    None => out.push_str("\\u"),
                }
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// An insertion-ordered collection of replacement rules.
///
/// Long-lived configuration: the collection is swapped between
/// conversions by the configuration layer, never mutated during one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rules {
    rules: Vec<Rule>,
}

impl Rules {
    /// Creates an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule at the end of the collection
    pub fn add(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Removes the rule at the given index
    pub fn remove(&mut self, index: usize) -> Rule {
        self.rules.remove(index)
    }

    /// Empties the collection
    pub fn clear(&mut self) {
        self.rules.clear();
    }

    /// Changes the phase of the rule at the given index
    pub fn set_phase(&mut self, index: usize, phase: Phase) {
        self.rules[index].phase = phase;
    }

    /// All rules, in insertion order
    pub fn all(&self) -> &[Rule] {
        &self.rules
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the collection is empty
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Applies every rule of the given phase, in insertion order.
    ///
    /// Each rule operates on the cumulative result of the previous one.
    /// A malformed pattern aborts with [`Error::Replacement`] rather than
    /// being skipped.
    pub fn apply_phase(&self, s: &str, phase: Phase) -> Result<String> {
        let mut result = s.to_owned();
        for rule in self.rules.iter().filter(|r| r.phase == phase) {
            result = rule.apply(&result)?;
        }
        Ok(result)
    }
}

impl FromIterator<Rule> for Rules {
    fn from_iter<T: IntoIterator<Item = Rule>>(iter: T) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_phase_is_identity() {
        let rules = Rules::new();
        assert_eq!(rules.apply_phase("4142", Phase::Hex2Hex).unwrap(), "4142");
    }

    #[test]
    fn test_literal_hex2hex() {
        let mut rules = Rules::new();
        rules.add(Rule::new("41", "61", Phase::Hex2Hex));
        assert_eq!(
            rules.apply_phase("414241", Phase::Hex2Hex).unwrap(),
            "614261"
        );
    }

    #[test]
    fn test_rules_chain_in_insertion_order() {
        let mut rules = Rules::new();
        rules.add(Rule::new("41", "42", Phase::Hex2Hex));
        rules.add(Rule::new("42", "43", Phase::Hex2Hex));
        // the second rule sees the output of the first
        assert_eq!(rules.apply_phase("41", Phase::Hex2Hex).unwrap(), "43");
    }

    #[test]
    fn test_regex_str2str_with_captures() {
        let mut rules = Rules::new();
        rules.add(Rule::new("<r>(.*?)</r>", "[$1]", Phase::Str2Str).regex());
        assert_eq!(
            rules.apply_phase("a<r>ruby</r>b", Phase::Str2Str).unwrap(),
            "a[ruby]b"
        );
    }

    #[test]
    fn test_hex2str_wraps_in_delimiters() {
        let mut rules = Rules::new();
        rules.add(Rule::new("0a", "\n", Phase::Hex2Str));
        assert_eq!(
            rules.apply_phase("410a42", Phase::Hex2Str).unwrap(),
            "41-\n-42"
        );
    }

    #[test]
    fn test_hex2str_escapes_delimiter_in_replacement() {
        let mut rules = Rules::new();
        rules.add(Rule::new("0a", "a-b", Phase::Hex2Str));
        assert_eq!(
            rules.apply_phase("0a", Phase::Hex2Str).unwrap(),
            "-a\\-b-"
        );
    }

    #[test]
    fn test_malformed_pattern_aborts() {
        let mut rules = Rules::new();
        rules.add(Rule::new("(unclosed", "x", Phase::Str2Str).regex());
        let err = rules.apply_phase("input", Phase::Str2Str).unwrap_err();
        assert!(matches!(err, Error::Replacement { .. }));
    }

    #[test]
    fn test_unescape_sequences() {
        assert_eq!(unescape("a\\nb"), "a\nb");
        assert_eq!(unescape("a\\\\n"), "a\\n");
        assert_eq!(unescape("\\u3042"), "あ");
        assert_eq!(unescape("\\u304"), "\\u304");
        assert_eq!(unescape("\\x"), "\\x");
    }

    #[test]
    fn test_escaped_rule_resolves_unicode() {
        let mut rules = Rules::new();
        rules.add(Rule::new("8745", "\\u2049", Phase::Hex2Str).escaped());
        assert_eq!(
            rules.apply_phase("8745", Phase::Hex2Str).unwrap(),
            "-\u{2049}-"
        );
    }

    #[test]
    fn test_phase_filtering() {
        let mut rules = Rules::new();
        rules.add(Rule::new("41", "61", Phase::Hex2Hex));
        rules.add(Rule::new("A", "B", Phase::Str2Str));
        assert_eq!(rules.apply_phase("A41", Phase::Str2Str).unwrap(), "B41");
    }
}
