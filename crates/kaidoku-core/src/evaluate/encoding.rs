//! Evaluator for a whole decoding attempt.

use super::EvaluationResult;
use crate::line::LineList;

/// Default combined-validity threshold for a line to count towards its
/// encoding's mark
pub const DEFAULT_LINE_VALIDITY_THRESHOLD: i32 = 0;

/// Scores a whole decoding attempt from its lines.
///
/// The mark is the sum of the combined validity of every line at or above
/// the threshold. Implausible lines are excluded rather than subtracted:
/// one garbage chunk must not sink an otherwise convincing encoding.
#[derive(Debug, Clone, Copy)]
pub struct EncodingEvaluator {
    threshold: i32,
}

impl Default for EncodingEvaluator {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_LINE_VALIDITY_THRESHOLD,
        }
    }
}

impl EncodingEvaluator {
    /// Creates an evaluator with the default threshold
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an evaluator with a custom line validity threshold
    pub fn with_threshold(threshold: i32) -> Self {
        Self { threshold }
    }

    /// Evaluates a decoded line list
    pub fn evaluate(&self, lines: &LineList) -> EvaluationResult {
        let mut mark = 0;
        let mut counted = 0usize;
        let mut details = String::new();

        for line in &lines.lines {
            let validity = line.validity();
            if validity >= self.threshold {
                mark += validity;
                counted += 1;
                details.push_str(&format!(
                    "line \"{}\": validity {validity} >= {}; counted\n",
                    line.text_after_replacements, self.threshold
                ));
            } else {
                details.push_str(&format!(
                    "line \"{}\": validity {validity} < {}; ignored\n",
                    line.text_after_replacements, self.threshold
                ));
            }
        }

        details.push_str(&format!(
            "Total: {counted} of {} lines counted, mark {mark}",
            lines.lines.len()
        ));
        EvaluationResult::new(mark, details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::Encoding;
    use crate::line::LineDecoder;
    use crate::replace::Rules;
    use pretty_assertions::assert_eq;

    fn lines(raw: &str, encoding: Encoding) -> LineList {
        LineDecoder::new()
            .decode(raw, &Rules::new(), encoding)
            .unwrap()
    }

    #[test]
    fn test_empty_list_scores_zero() {
        let list = lines("", Encoding::Utf8);
        assert_eq!(EncodingEvaluator::new().evaluate(&list).mark, 0);
    }

    #[test]
    fn test_implausible_line_is_excluded_not_subtracted() {
        // "Hello" decodes at validity -14; the default threshold drops it
        let list = lines("48656c6c6f00", Encoding::Utf8);
        assert_eq!(EncodingEvaluator::new().evaluate(&list).mark, 0);
    }

    #[test]
    fn test_plausible_line_counts() {
        // こんにちは in UTF-8: well above the threshold
        let list = lines("e38193e38293e381abe381a1e381af00", Encoding::Utf8);
        let result = EncodingEvaluator::new().evaluate(&list);
        assert!(result.mark > 0);
        assert_eq!(result.mark, list.lines[0].validity());
    }

    #[test]
    fn test_custom_threshold_admits_weak_lines() {
        let list = lines("48656c6c6f00", Encoding::Utf8);
        let result = EncodingEvaluator::with_threshold(-20).evaluate(&list);
        assert_eq!(result.mark, -14);
    }

    #[test]
    fn test_details_name_each_line() {
        let list = lines("48656c6c6f00", Encoding::Utf8);
        let details = EncodingEvaluator::new().evaluate(&list).details;
        assert!(details.contains("Hello"));
        assert!(details.contains("ignored"));
        assert!(details.contains("Total: 0 of 1 lines counted"));
    }
}
