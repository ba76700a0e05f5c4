//! End-to-end tests of the conversion pipeline.

use kaidoku_core::{
    grammar, ConvertOptions, DebugFlags, Detector, Encoding, EncodingChoice, Formatter,
    HexProcessor, LineDecoder, Phase, Renderer, Rule, Rules, DETECTION_ORDER,
};
use pretty_assertions::assert_eq;

// こんにちは。 as zero-terminated UTF-8
const HELLO_UTF8: &str = "e38193e38293e381abe381a1e381afe3808200";
// こんにちは。 as zero-terminated Shift-JIS
const HELLO_SJIS: &str = "82b182f182c982bf82cd814200";

fn utf8_options() -> ConvertOptions {
    ConvertOptions {
        encoding: EncodingChoice::Fixed(Encoding::Utf8),
        ..ConvertOptions::default()
    }
}

#[test]
fn test_japanese_text_survives_default_strictness() {
    let processor = HexProcessor::new(ConvertOptions::default());
    assert_eq!(processor.convert(HELLO_UTF8).unwrap(), "こんにちは。");
    assert_eq!(processor.convert(HELLO_SJIS).unwrap(), "こんにちは。");
}

#[test]
fn test_ascii_noise_is_filtered_at_default_strictness() {
    let processor = HexProcessor::new(utf8_options());
    assert_eq!(processor.convert("48656c6c6f00").unwrap(), "");
}

#[test]
fn test_lenient_strictness_admits_ascii() {
    let processor = HexProcessor::new(ConvertOptions {
        strictness: -100,
        ..utf8_options()
    });
    assert_eq!(processor.convert("48656c6c6f00").unwrap(), "Hello");
}

#[test]
fn test_rejected_lines_flag_bypasses_strictness() {
    let processor = HexProcessor::new(ConvertOptions {
        flags: "f".parse().unwrap(),
        ..utf8_options()
    });
    let output = processor.convert("48656c6c6f00").unwrap();
    assert!(output.contains("Hello"));
}

#[test]
fn test_detection_picks_the_source_encoding() {
    let detector = Detector::default();
    let utf8 = detector
        .convert(HELLO_UTF8, &Rules::new(), EncodingChoice::Detect)
        .unwrap();
    assert_eq!(utf8.detected, Encoding::Utf8);

    let sjis = detector
        .convert(HELLO_SJIS, &Rules::new(), EncodingChoice::Detect)
        .unwrap();
    assert_eq!(sjis.detected, Encoding::ShiftJis);
}

#[test]
fn test_detection_tie_breaks_in_candidate_order() {
    // all attempts score zero here
    let conversion = Detector::default()
        .convert("4142434400", &Rules::new(), EncodingChoice::Detect)
        .unwrap();
    assert_eq!(conversion.detected, DETECTION_ORDER[0]);
}

#[test]
fn test_conversion_is_idempotent() {
    let processor = HexProcessor::new(ConvertOptions::default());
    let first = processor.convert(HELLO_UTF8).unwrap();
    let second = processor.convert(HELLO_UTF8).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_extraction_offsets_are_even_under_every_encoding() {
    // 'a8140000' carries a Shift-JIS-looking pair at an odd offset
    for encoding in DETECTION_ORDER {
        for chunk in grammar::extract("a8140000", encoding) {
            assert_eq!(chunk.offset % 2, 0, "odd offset under {encoding}");
        }
    }
}

#[test]
fn test_filler_runs_never_become_lines() {
    let lines = LineDecoder::new()
        .decode("ffffffffffff00", &Rules::new(), Encoding::Utf16Be)
        .unwrap();
    assert!(lines.lines.is_empty());
}

#[test]
fn test_replacement_phases_run_in_pipeline_order() {
    // the HEX2HEX rewrite must happen before the HEX2STR match can see it
    let mut rules = Rules::new();
    rules.add(Rule::new("0d0a", "2020", Phase::Hex2Hex));
    rules.add(Rule::new("2020", "\n", Phase::Hex2Str));
    let lines = LineDecoder::new()
        .decode("410d0a42", &rules, Encoding::Utf8)
        .unwrap();
    assert_eq!(lines.lines.len(), 1);
    assert_eq!(lines.lines[0].text, "A\nB");
}

#[test]
fn test_control_code_replacement_recovers_full_line() {
    // a name tag control code spliced into Japanese text
    let mut rules = Rules::new();
    rules.add(Rule::new("1b4e", "【名】", Phase::Hex2Str));
    let processor = HexProcessor::new(ConvertOptions {
        rules,
        ..utf8_options()
    });
    let hex = format!("1b4e{}", &HELLO_UTF8);
    let output = processor.convert(&hex).unwrap();
    assert_eq!(output, "【名】こんにちは。");
}

#[test]
fn test_str2str_cleanup_applies_last() {
    let mut rules = Rules::new();
    rules.add(Rule::new("。", "。\n", Phase::Str2Str));
    let processor = HexProcessor::new(ConvertOptions {
        rules,
        ..ConvertOptions::default()
    });
    assert_eq!(processor.convert(HELLO_UTF8).unwrap(), "こんにちは。");
}

#[test]
fn test_fixture_format_wraps_lines() {
    let processor = HexProcessor::new(ConvertOptions {
        formatter: Formatter::fixture(),
        ..ConvertOptions::default()
    });
    assert_eq!(
        processor.convert(HELLO_UTF8).unwrap(),
        "[\"こんにちは。\"]"
    );
}

#[test]
fn test_debug_render_names_the_winner() {
    let processor = HexProcessor::new(ConvertOptions {
        flags: "e".parse().unwrap(),
        ..ConvertOptions::default()
    });
    let output = processor.convert(HELLO_UTF8).unwrap();
    assert!(output.contains("Encoding: UTF-8"));
    assert!(output.contains("こんにちは。"));
}

#[test]
fn test_repeat_suppression_keys_on_rendered_output() {
    let processor = HexProcessor::new(ConvertOptions::default());
    assert!(processor.convert_if_changed(HELLO_UTF8).unwrap().is_some());
    assert!(processor.convert_if_changed(HELLO_UTF8).unwrap().is_none());
    // a different input rendering the same text is still a repeat
    assert!(processor.convert_if_changed(HELLO_SJIS).unwrap().is_none());
    // a different rendering resets the memory
    let shorter = "e38193e38293e381abe381a1e381af00";
    assert!(processor.convert_if_changed(shorter).unwrap().is_some());
    assert!(processor.convert_if_changed(HELLO_UTF8).unwrap().is_some());
}

#[test]
fn test_whitespace_in_input_is_tolerated() {
    let processor = HexProcessor::new(ConvertOptions::default());
    let spaced = "e3 81 93 e3 82 93 e3 81 ab e3 81 a1 e3 81 af e3 80 82 00";
    assert_eq!(processor.convert(spaced).unwrap(), "こんにちは。");
}

#[test]
fn test_invalid_hex_is_a_configuration_error() {
    let processor = HexProcessor::new(ConvertOptions::default());
    assert!(processor.convert("not hex").is_err());
    assert!(processor.convert("abc").is_err());
}

#[test]
fn test_debug_flags_do_not_change_the_result_line() {
    let plain = HexProcessor::new(ConvertOptions::default());
    let traced = HexProcessor::new(ConvertOptions {
        flags: DebugFlags::LINE_HEX | DebugFlags::LINE_TEXT_VALIDITY,
        ..ConvertOptions::default()
    });
    let expected = plain.convert(HELLO_UTF8).unwrap();
    let output = traced.convert(HELLO_UTF8).unwrap();
    assert!(output.contains(&expected));
}

#[test]
fn test_renderer_reusable_across_conversions() {
    let detector = Detector::default();
    let renderer = Renderer::new(DebugFlags::empty(), 20, Formatter::standard());
    let a = detector
        .convert(HELLO_UTF8, &Rules::new(), EncodingChoice::Detect)
        .unwrap();
    let b = detector
        .convert(HELLO_SJIS, &Rules::new(), EncodingChoice::Detect)
        .unwrap();
    assert_eq!(renderer.render(&a), "こんにちは。");
    assert_eq!(renderer.render(&b), "こんにちは。");
}
