//! Line decoding: from a hex input to a scored list of decoded lines.
//!
//! One decoded line per extracted chunk. The decoder orchestrates the
//! replacement phases around extraction and decoding:
//!
//! 1. normalize the raw input,
//! 2. apply the HEX2HEX phase to the whole input,
//! 3. apply the HEX2STR phase, producing a transitory string,
//! 4. split it, run the grammar on hex segments, and re-glue literal
//!    segments that border an adjacent chunk,
//! 5. decode each item, apply the STR2STR phase, and score the result
//!    with both evaluators.

use crate::encoding::Encoding;
use crate::error::Result;
use crate::evaluate::{EvaluationResult, HexEvaluator, TextEvaluator};
use crate::grammar;
use crate::replace::{transitory, Phase, Rules};
use tracing::{debug, trace};

/// One decoded line and every intermediate artifact that produced it.
///
/// Immutable after construction; rendering decorations are handled by the
/// renderer, not stored here.
#[derive(Debug, Clone)]
pub struct DecodedLine {
    /// Transitory chunk this line originates from
    pub hex: String,
    /// Same chunk after HEX2HEX replacements
    pub hex_after_hex_replacements: String,
    /// Same chunk after HEX2HEX and HEX2STR replacements
    pub hex_after_str_replacements: String,
    /// Decoded text, before STR2STR replacements
    pub text: String,
    /// Decoded text after STR2STR replacements
    pub text_after_replacements: String,
    /// Evaluation of the raw hex payload
    pub hex_evaluation: EvaluationResult,
    /// Evaluation of the decoded text
    pub text_evaluation: EvaluationResult,
}

impl DecodedLine {
    /// Combined validity of this line: hex mark plus text mark
    pub fn validity(&self) -> i32 {
        self.hex_evaluation.mark + self.text_evaluation.mark
    }
}

/// The decoded lines of one hex input under one encoding.
///
/// Also owns the whole-input intermediate strings for debugging.
#[derive(Debug, Clone)]
pub struct LineList {
    /// Normalized hex input
    pub hex_input: String,
    /// Whole input after HEX2HEX replacements
    pub hex_after_hex_replacements: String,
    /// Whole input after HEX2HEX and HEX2STR replacements (transitory)
    pub hex_after_str_replacements: String,
    /// Decoded lines, in extraction order
    pub lines: Vec<DecodedLine>,
}

impl LineList {
    /// Sum of the validity of all lines at or above the threshold.
    ///
    /// Lines below the threshold are excluded from the sum entirely; they
    /// never subtract.
    pub fn total_validity(&self, threshold: i32) -> i32 {
        self.lines
            .iter()
            .map(DecodedLine::validity)
            .filter(|&v| v >= threshold)
            .sum()
    }
}

/// Decodes hex input into scored lines under a fixed encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineDecoder {
    hex_evaluator: HexEvaluator,
    text_evaluator: TextEvaluator,
}

impl LineDecoder {
    /// Creates a new line decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the full per-encoding pipeline on a raw hex input
    pub fn decode(&self, raw: &str, rules: &Rules, encoding: Encoding) -> Result<LineList> {
        let hex_input = grammar::normalize(raw)?;
        let after_hex = rules.apply_phase(&hex_input, Phase::Hex2Hex)?;
        let after_str = rules.apply_phase(&after_hex, Phase::Hex2Str)?;

        let items = convertible_items(&after_str, encoding);
        debug!(encoding = %encoding, items = items.len(), "extracted convertible items");

        let mut lines = Vec::with_capacity(items.len());
        for item in items {
            let text = transitory::to_readable_string(&item, encoding);
            let text_after = rules.apply_phase(&text, Phase::Str2Str)?;

            // the hex evaluator scores only the hex payload of the item,
            // not the literal segments spliced into it
            let payload: String = transitory::split(&item)
                .iter()
                .enumerate()
                .filter(|(i, _)| i % 2 == 0)
                .map(|(_, part)| part.as_str())
                .collect();

            let hex_evaluation = self.hex_evaluator.evaluate(&payload);
            let text_evaluation = self.text_evaluator.evaluate(&text_after);
            trace!(
                hex = %item,
                text = %text_after,
                validity = hex_evaluation.mark + text_evaluation.mark,
                "decoded line"
            );

            lines.push(DecodedLine {
                hex: item.clone(),
                hex_after_hex_replacements: item.clone(),
                hex_after_str_replacements: item,
                text,
                text_after_replacements: text_after,
                hex_evaluation,
                text_evaluation,
            });
        }

        Ok(LineList {
            hex_input,
            hex_after_hex_replacements: after_hex,
            hex_after_str_replacements: after_str,
            lines,
        })
    }
}

/// Extracts convertible items from a transitory string.
///
/// Hex segments go through the grammar; a literal segment is glued onto
/// the preceding item when the last chunk of the preceding hex segment
/// reaches that segment's end, and the following hex segment's first
/// chunk is glued onto a trailing literal when it starts at offset zero.
/// Literals bordering no chunk become items of their own.
fn convertible_items(mixed: &str, encoding: Encoding) -> Vec<String> {
    let parts = transitory::split(mixed);
    let mut items: Vec<String> = Vec::new();

    // whether the last item ends with a literal segment that the next
    // chunk may attach to
    let mut last_ends_with_literal = false;
    // whether the last chunk of the previous hex segment reached the
    // segment's end (so a following literal borders it)
    let mut prev_tail_reaches_end = false;

    for (i, part) in parts.iter().enumerate() {
        if i % 2 == 0 {
            let chunks = grammar::extract(part, encoding);
            prev_tail_reaches_end = chunks
                .last()
                .map(|c| c.end() == part.len())
                .unwrap_or(false);

            let mut rest = chunks.as_slice();
            if last_ends_with_literal {
                if let ([first, tail @ ..], Some(last)) = (rest, items.last_mut()) {
                    if first.offset == 0 {
                        last.push_str(&first.hex);
                        rest = tail;
                    }
                }
            }
            items.extend(rest.iter().map(|c| c.hex.clone()));
            last_ends_with_literal = false;
        } else {
            // restore the delimiters removed by the split
            let restored = format!("-{part}-");
            match items.last_mut() {
                Some(last) if prev_tail_reaches_end => last.push_str(&restored),
                _ => items.push(restored),
            }
            last_ends_with_literal = true;
            prev_tail_reaches_end = false;
        }
    }

    items
}
