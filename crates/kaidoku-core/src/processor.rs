//! The conversion front door: options plus a stateful processor.

use crate::detect::Detector;
use crate::encoding::EncodingChoice;
use crate::error::Result;
use crate::evaluate::{EncodingEvaluator, DEFAULT_LINE_VALIDITY_THRESHOLD};
use crate::render::{DebugFlags, Formatter, Renderer};
use crate::replace::Rules;
use std::sync::Mutex;
use tracing::debug;

/// Default validity threshold below which a line is dropped from the
/// output
pub const DEFAULT_STRICTNESS: i32 = 20;

/// Everything that configures one conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Encoding selection
    pub encoding: EncodingChoice,
    /// Validity threshold for a line to appear in the output
    pub strictness: i32,
    /// Replacement rules, all phases
    pub rules: Rules,
    /// Debug traces to include in the output
    pub flags: DebugFlags,
    /// Validity threshold for a line to count towards encoding detection
    pub detection_threshold: i32,
    /// Output decorations
    pub formatter: Formatter,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            encoding: EncodingChoice::default(),
            strictness: DEFAULT_STRICTNESS,
            rules: Rules::new(),
            flags: DebugFlags::empty(),
            detection_threshold: DEFAULT_LINE_VALIDITY_THRESHOLD,
            formatter: Formatter::standard(),
        }
    }
}

#[derive(Debug)]
struct ProcessorState {
    opts: ConvertOptions,
    previous: Option<String>,
}

/// A stateful hex-to-text processor.
///
/// Holds the current options and the previously rendered output, so
/// callers polling a memory region can suppress repeats. Conversions are
/// serialized; the processor is safe to share between threads.
#[derive(Debug)]
pub struct HexProcessor {
    state: Mutex<ProcessorState>,
}

impl HexProcessor {
    /// Creates a processor with the given options
    pub fn new(opts: ConvertOptions) -> Self {
        Self {
            state: Mutex::new(ProcessorState {
                opts,
                previous: None,
            }),
        }
    }

    /// Replaces the options; the repeat-suppression memory is kept
    pub fn set_options(&self, opts: ConvertOptions) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.opts = opts;
    }

    /// Converts a raw hex input into rendered text
    pub fn convert(&self, raw: &str) -> Result<String> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let output = convert_with(&state.opts, raw)?;
        state.previous = Some(output.clone());
        Ok(output)
    }

    /// Converts a raw hex input, returning `None` when the rendered output
    /// is identical to the previous one.
    ///
    /// Lets callers polling a memory region avoid republishing the same
    /// result over and over.
    pub fn convert_if_changed(&self, raw: &str) -> Result<Option<String>> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let output = convert_with(&state.opts, raw)?;
        if state.previous.as_deref() == Some(output.as_str()) {
            debug!("output unchanged, suppressing repeat");
            return Ok(None);
        }
        state.previous = Some(output.clone());
        Ok(Some(output))
    }
}

impl Default for HexProcessor {
    fn default() -> Self {
        Self::new(ConvertOptions::default())
    }
}

fn convert_with(opts: &ConvertOptions, raw: &str) -> Result<String> {
    let detector = Detector::new(EncodingEvaluator::with_threshold(opts.detection_threshold));
    let conversion = detector.convert(raw, &opts.rules, opts.encoding)?;
    let renderer = Renderer::new(opts.flags, opts.strictness, opts.formatter.clone());
    Ok(renderer.render(&conversion))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::Encoding;
    use pretty_assertions::assert_eq;

    fn lenient() -> ConvertOptions {
        ConvertOptions {
            encoding: EncodingChoice::Fixed(Encoding::Utf8),
            strictness: -100,
            ..ConvertOptions::default()
        }
    }

    #[test]
    fn test_convert_renders_text() {
        let processor = HexProcessor::new(lenient());
        assert_eq!(processor.convert("48656c6c6f00").unwrap(), "Hello");
    }

    #[test]
    fn test_default_strictness_drops_implausible_lines() {
        let processor = HexProcessor::default();
        assert_eq!(processor.convert("48656c6c6f00").unwrap(), "");
    }

    #[test]
    fn test_repeat_suppression() {
        let processor = HexProcessor::new(lenient());
        assert_eq!(
            processor.convert_if_changed("48656c6c6f00").unwrap(),
            Some("Hello".to_owned())
        );
        assert_eq!(processor.convert_if_changed("48656c6c6f00").unwrap(), None);
        assert_eq!(
            processor.convert_if_changed("4142434400").unwrap(),
            Some("ABCD".to_owned())
        );
    }

    #[test]
    fn test_convert_always_runs() {
        let processor = HexProcessor::new(lenient());
        assert_eq!(processor.convert("48656c6c6f00").unwrap(), "Hello");
        assert_eq!(processor.convert("48656c6c6f00").unwrap(), "Hello");
    }

    #[test]
    fn test_set_options_applies_to_next_conversion() {
        let processor = HexProcessor::new(lenient());
        assert_eq!(processor.convert("48656c6c6f00").unwrap(), "Hello");
        processor.set_options(ConvertOptions::default());
        assert_eq!(processor.convert("48656c6c6f00").unwrap(), "");
    }

    #[test]
    fn test_invalid_input_is_an_error() {
        let processor = HexProcessor::default();
        assert!(processor.convert("xyz!").is_err());
    }
}
