//! Encoding auto-detection over the candidate set.
//!
//! Detection is exhaustive rather than clever: the full pipeline runs
//! once per candidate encoding and the attempt with the highest mark
//! wins. A later candidate must beat the current best strictly; on a tie
//! the earlier-declared encoding keeps the win.

use crate::encoding::{Encoding, EncodingChoice, DETECTION_ORDER};
use crate::error::Result;
use crate::evaluate::{EncodingEvaluator, EvaluationResult};
use crate::line::{LineDecoder, LineList};
use crate::replace::Rules;
use tracing::debug;

/// One pipeline run under one candidate encoding.
#[derive(Debug, Clone)]
pub struct DecodingAttempt {
    /// The candidate encoding
    pub encoding: Encoding,
    /// The decoded lines this candidate produced
    pub lines: LineList,
    /// The attempt's overall mark and derivation trail
    pub evaluation: EvaluationResult,
    /// Whether this attempt won the detection
    pub winner: bool,
}

/// The outcome of one conversion: every attempt, plus which encoding won.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// All attempts, in candidate order
    pub attempts: Vec<DecodingAttempt>,
    /// The winning encoding
    pub detected: Encoding,
}

impl Conversion {
    /// The winning attempt
    pub fn winner(&self) -> &DecodingAttempt {
        self.attempts
            .iter()
            .find(|a| a.winner)
            .unwrap_or(&self.attempts[0])
    }
}

/// Runs the pipeline under one or all candidate encodings and picks the
/// most plausible result.
#[derive(Debug, Clone, Copy)]
pub struct Detector {
    decoder: LineDecoder,
    evaluator: EncodingEvaluator,
}

impl Default for Detector {
    fn default() -> Self {
        Self::new(EncodingEvaluator::new())
    }
}

impl Detector {
    /// Creates a detector with the given attempt evaluator
    pub fn new(evaluator: EncodingEvaluator) -> Self {
        Self {
            decoder: LineDecoder::new(),
            evaluator,
        }
    }

    /// Converts a raw hex input under the given encoding choice.
    ///
    /// With a fixed encoding the conversion holds a single attempt, marked
    /// as the winner regardless of its evaluation.
    pub fn convert(&self, raw: &str, rules: &Rules, choice: EncodingChoice) -> Result<Conversion> {
        match choice {
            EncodingChoice::Fixed(encoding) => {
                let mut attempt = self.attempt(raw, rules, encoding)?;
                attempt.winner = true;
                Ok(Conversion {
                    detected: encoding,
                    attempts: vec![attempt],
                })
            }
            EncodingChoice::Detect => {
                let mut attempts = Vec::with_capacity(DETECTION_ORDER.len());
                for encoding in DETECTION_ORDER {
                    attempts.push(self.attempt(raw, rules, encoding)?);
                }

                // strictly-greater keeps the earliest candidate on ties
                let mut best = 0;
                for (i, attempt) in attempts.iter().enumerate() {
                    if attempt.evaluation.mark > attempts[best].evaluation.mark {
                        best = i;
                    }
                    debug!(
                        encoding = %attempt.encoding,
                        mark = attempt.evaluation.mark,
                        "detection attempt"
                    );
                }
                attempts[best].winner = true;
                let detected = attempts[best].encoding;
                debug!(encoding = %detected, "detected encoding");

                Ok(Conversion { attempts, detected })
            }
        }
    }

    fn attempt(&self, raw: &str, rules: &Rules, encoding: Encoding) -> Result<DecodingAttempt> {
        let lines = self.decoder.decode(raw, rules, encoding)?;
        let evaluation = self.evaluator.evaluate(&lines);
        Ok(DecodingAttempt {
            encoding,
            lines,
            evaluation,
            winner: false,
        })
    }
}
