//! Evaluator for decoded text, tuned for Japanese game script.

use super::EvaluationResult;

/// Malus per character outside the allow-list
pub const INVALID_CHAR_MALUS: i32 = 4;

/// Bonus per punctuation character
pub const PUNCTUATION_BONUS: i32 = 8;

/// One-time bonus when the text ends on a punctuation character
pub const FINAL_PUNCTUATION_BONUS: i32 = 24;

/// One-time malus when no kana is present at all
pub const NO_KANA_MALUS: i32 = 24;

/// Bonus per kana character
pub const KANA_BONUS: i32 = 4;

/// Character ranges considered plausible in decoded game text.
///
/// ASCII alphanumerics, full-width alphanumerics, CJK punctuation, kana,
/// half/full-width forms, the common kanji block, plus a handful of
/// symbols that show up in real scripts (stars, arrows, reference mark).
/// Empirically tuned; widen before tightening when in doubt.
const ALLOWED_RANGES: &[(char, char)] = &[
    ('a', 'z'),
    ('A', 'Z'),
    ('0', '9'),
    ('ａ', 'ｚ'),
    ('Ａ', 'Ｚ'),
    ('０', '９'),
    ('\u{3000}', '\u{303f}'), // CJK punctuation
    ('\u{3040}', '\u{309f}'), // hiragana
    ('\u{30a0}', '\u{30ff}'), // katakana
    ('\u{ff00}', '\u{ffef}'), // half/full-width forms
    ('\u{4e00}', '\u{9faf}'), // CJK unified ideographs
    ('\u{2605}', '\u{2606}'), // stars
    ('\u{2190}', '\u{2195}'), // arrows
];

/// Individually allowed characters outside the ranges above
const ALLOWED_CHARS: &[char] = &['#', '\u{2048}', '\u{2049}', '“', '”', '…', '—', '\u{203b}'];

/// Punctuation that plausibly ends or structures a line of script
const PUNCTUATION: &[char] = &[
    '”', '—', '。', '！', '？', '…', '、', '）', '】', '」', '』', '〜', '\u{2048}', '\u{2049}',
];

const KANA_RANGES: &[(char, char)] = &[('\u{3040}', '\u{309f}'), ('\u{30a0}', '\u{30ff}')];

fn in_ranges(c: char, ranges: &[(char, char)]) -> bool {
    ranges.iter().any(|&(lo, hi)| c >= lo && c <= hi)
}

fn is_allowed(c: char) -> bool {
    in_ranges(c, ALLOWED_RANGES) || ALLOWED_CHARS.contains(&c)
}

fn is_kana(c: char) -> bool {
    in_ranges(c, KANA_RANGES)
}

fn is_punctuation(c: char) -> bool {
    PUNCTUATION.contains(&c)
}

/// Scores decoded text on natural-language plausibility.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextEvaluator;

impl TextEvaluator {
    /// Creates a new text evaluator
    pub fn new() -> Self {
        Self
    }

    /// Evaluates a decoded string.
    ///
    /// Four terms: invalid characters, punctuation, final punctuation and
    /// kana presence. Line breaks are ignored by the character counts.
    pub fn evaluate(&self, text: &str) -> EvaluationResult {
        let chars: Vec<char> = text.chars().filter(|&c| c != '\n').collect();

        let invalid = chars.iter().filter(|&&c| !is_allowed(c)).count() as i32;
        let punctuation = chars.iter().filter(|&&c| is_punctuation(c)).count() as i32;
        let kana = chars.iter().filter(|&&c| is_kana(c)).count() as i32;
        let final_punctuation = text
            .chars()
            .last()
            .map(is_punctuation)
            .unwrap_or(false);

        let mut points = Vec::new();
        let mut details = String::new();

        points.push(-invalid * INVALID_CHAR_MALUS);
        details.push_str(&format!(
            "{invalid} invalid characters; applying malus of {INVALID_CHAR_MALUS} for every invalid character: {}\n",
            points[points.len() - 1]
        ));

        points.push(punctuation * PUNCTUATION_BONUS);
        details.push_str(&format!(
            "{punctuation} punctuation symbols; applying bonus of {PUNCTUATION_BONUS} for every punctuation symbol: +{}\n",
            points[points.len() - 1]
        ));

        if final_punctuation {
            points.push(FINAL_PUNCTUATION_BONUS);
            details.push_str(&format!(
                "final punctuation detected; applying bonus of {FINAL_PUNCTUATION_BONUS} once: +{FINAL_PUNCTUATION_BONUS}\n"
            ));
        } else {
            details.push_str("no final punctuation; no bonus applied\n");
        }

        if kana == 0 {
            points.push(-NO_KANA_MALUS);
            details.push_str(&format!(
                "0 kana; applying malus of {NO_KANA_MALUS} once: -{NO_KANA_MALUS}\n"
            ));
        } else {
            points.push(kana * KANA_BONUS);
            details.push_str(&format!(
                "{kana} kana; applying bonus of {KANA_BONUS} for every kana: +{}\n",
                points[points.len() - 1]
            ));
        }

        let mark: i32 = points.iter().sum();
        details.push_str("Total: ");
        for point in &points {
            if *point >= 0 {
                details.push('+');
            }
            details.push_str(&point.to_string());
        }
        details.push_str(&format!("={mark}"));

        EvaluationResult::new(mark, details)
    }
}
