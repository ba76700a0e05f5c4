//! Evaluator for raw hex runs.

use super::EvaluationResult;

/// Bonus per hex digit; long runs are increasingly unlikely to be
/// accidental
pub const HEX_LENGTH_WEIGHT: i32 = 1;

/// Run length (in hex digits) at or under which the malus applies
pub const SMALL_LENGTH_THRESHOLD: usize = 6;

/// One-time malus for short runs; garbage chunks tend to be short
pub const SMALL_LENGTH_MALUS: i32 = 24;

/// Scores a raw hex run on its length alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct HexEvaluator;

impl HexEvaluator {
    /// Creates a new hex evaluator
    pub fn new() -> Self {
        Self
    }

    /// Evaluates a run of hex digits
    pub fn evaluate(&self, hex: &str) -> EvaluationResult {
        let length = hex.chars().count();
        let mut details = format!("length={length}");
        let mark;

        if length <= SMALL_LENGTH_THRESHOLD {
            mark = -SMALL_LENGTH_MALUS;
            details.push_str(&format!(
                ", <= {SMALL_LENGTH_THRESHOLD}; applying malus of {SMALL_LENGTH_MALUS} once: {mark}"
            ));
        } else {
            mark = length as i32 * HEX_LENGTH_WEIGHT;
            details.push_str(&format!(
                ", > {SMALL_LENGTH_THRESHOLD}; applying bonus of {HEX_LENGTH_WEIGHT} for every digit: +{mark}"
            ));
        }
        details.push_str(&format!("\nTotal: {mark}"));

        EvaluationResult::new(mark, details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_short_run_malus() {
        assert_eq!(HexEvaluator::new().evaluate("abcdef").mark, -24);
        assert_eq!(HexEvaluator::new().evaluate("").mark, -24);
    }

    #[test]
    fn test_length_bonus() {
        assert_eq!(HexEvaluator::new().evaluate("abcdef0").mark, 7);
        assert_eq!(HexEvaluator::new().evaluate(&"a".repeat(20)).mark, 20);
    }

    #[test]
    fn test_details_trail() {
        let result = HexEvaluator::new().evaluate("48656c6c6f");
        assert!(result.details.contains("length=10"));
        assert!(result.details.contains("Total: 10"));
    }
}
