//! Plausibility scoring for extracted runs and decoded text.
//!
//! Evaluators assign an integer mark to an object so the pipeline can
//! decide whether it is worth keeping in the final output. Higher marks
//! are more plausible. Every evaluation also records a textual derivation
//! trail of its terms; the trail is part of the contract, because tuning
//! the heuristics without it is guesswork.

mod encoding;
mod hex;
mod text;

pub use encoding::{EncodingEvaluator, DEFAULT_LINE_VALIDITY_THRESHOLD};
pub use hex::{HexEvaluator, HEX_LENGTH_WEIGHT, SMALL_LENGTH_MALUS, SMALL_LENGTH_THRESHOLD};
pub use text::{
    TextEvaluator, FINAL_PUNCTUATION_BONUS, INVALID_CHAR_MALUS, KANA_BONUS, NO_KANA_MALUS,
    PUNCTUATION_BONUS,
};

/// The outcome of one evaluation: an integer mark plus the derivation
/// trail that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationResult {
    /// Plausibility mark; higher is more plausible
    pub mark: i32,
    /// Human-readable derivation of each term
    pub details: String,
}

impl EvaluationResult {
    /// Creates a new evaluation result
    pub fn new(mark: i32, details: impl Into<String>) -> Self {
        Self {
            mark,
            details: details.into(),
        }
    }
}
