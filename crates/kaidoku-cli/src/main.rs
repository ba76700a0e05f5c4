//! kaidoku - Recover readable text from hexadecimal memory dumps
//!
//! This tool extracts plausible text runs from raw hex, decodes them under
//! a fixed or auto-detected encoding, and prints the surviving lines.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, ValueEnum};
use kaidoku_core::{
    ConvertOptions, DebugFlags, Encoding, EncodingChoice, Formatter, HexProcessor, Phase, Rule,
    Rules, DEFAULT_STRICTNESS,
};
use std::fs;
use std::io::Read;
use std::path::PathBuf;
use tracing::{debug, Level};
use tracing_subscriber::EnvFilter;

/// Recover readable text from hexadecimal memory dumps
#[derive(Parser, Debug)]
#[command(name = "kaidoku")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    input: InputMode,

    /// Text encoding of the dump
    #[arg(short, long, value_enum, default_value = "detect")]
    encoding: EncodingArg,

    /// Validity threshold below which a line is dropped from the output
    #[arg(short, long, default_value_t = DEFAULT_STRICTNESS)]
    strictness: i32,

    /// Validity threshold for a line to count towards encoding detection
    #[arg(long, default_value = "0")]
    detection_threshold: i32,

    /// Replacement rules: [0x]"seq">[0x]"repl"[e][r], comma-separated
    #[arg(short, long)]
    replacements: Option<String>,

    /// Debug traces to include, as one-letter flags (e.g. "igvd")
    #[arg(short, long)]
    debug: Option<String>,

    /// Render the output as a bracketed list of quoted lines
    #[arg(long)]
    fixture_format: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Args, Debug)]
#[group(required = false, multiple = false)]
struct InputMode {
    /// Hex input given directly on the command line
    #[arg(short = 'x', long)]
    hex: Option<String>,

    /// Path to a file containing the hex input
    #[arg(short, long)]
    file: Option<PathBuf>,
}

/// Encoding selection
#[derive(Debug, Clone, Copy, ValueEnum)]
enum EncodingArg {
    /// Try every candidate and keep the most plausible result
    Detect,
    /// Shift-JIS
    Sjis,
    /// UTF-16, big-endian
    Utf16Be,
    /// UTF-16, little-endian
    Utf16Le,
    /// UTF-8
    Utf8,
}

impl From<EncodingArg> for EncodingChoice {
    fn from(arg: EncodingArg) -> Self {
        match arg {
            EncodingArg::Detect => EncodingChoice::Detect,
            EncodingArg::Sjis => EncodingChoice::Fixed(Encoding::ShiftJis),
            EncodingArg::Utf16Be => EncodingChoice::Fixed(Encoding::Utf16Be),
            EncodingArg::Utf16Le => EncodingChoice::Fixed(Encoding::Utf16Le),
            EncodingArg::Utf8 => EncodingChoice::Fixed(Encoding::Utf8),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .init();

    let flags = match &cli.debug {
        Some(letters) => letters
            .parse::<DebugFlags>()
            .context("invalid --debug flags")?,
        None => DebugFlags::empty(),
    };
    let rules = match &cli.replacements {
        Some(spec) => parse_replacements(spec).context("invalid --replacements")?,
        None => Rules::new(),
    };

    let opts = ConvertOptions {
        encoding: cli.encoding.into(),
        strictness: cli.strictness,
        rules,
        flags,
        detection_threshold: cli.detection_threshold,
        formatter: if cli.fixture_format {
            Formatter::fixture()
        } else {
            Formatter::standard()
        },
    };

    let raw = read_input(&cli)?;
    debug!(bytes = raw.len(), "read hex input");

    let processor = HexProcessor::new(opts);
    let output = processor.convert(raw.trim())?;
    println!("{output}");

    Ok(())
}

/// Reads the hex input from the argument, a file, or stdin
fn read_input(cli: &Cli) -> Result<String> {
    if let Some(ref hex) = cli.input.hex {
        Ok(hex.clone())
    } else if let Some(ref file) = cli.input.file {
        fs::read_to_string(file)
            .with_context(|| format!("cannot read input file: {}", file.display()))
    } else {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("cannot read stdin")?;
        Ok(buf)
    }
}

/// Parses the replacements argument.
///
/// Grammar, LL(1): a comma-separated list of rules, each of the form
/// `[0x]"sequence">[0x]"replacement"[e][r]`. `0x` marks a side as hex;
/// hex cannot replace text. `e` resolves backslash escapes in both sides,
/// `r` makes the sequence a regular expression.
fn parse_replacements(spec: &str) -> Result<Rules> {
    let mut parser = ReplacementsParser::new(spec);
    let mut rules = Rules::new();
    loop {
        rules.add(parser.rule()?);
        if !parser.eat(',') {
            break;
        }
    }
    parser.end()?;
    Ok(rules)
}

struct ReplacementsParser<'a> {
    spec: &'a str,
    pos: usize,
}

impl<'a> ReplacementsParser<'a> {
    fn new(spec: &'a str) -> Self {
        Self { spec, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.spec[self.pos..]
    }

    /// Consumes the literal if it is next
    fn eat(&mut self, c: char) -> bool {
        if self.rest().starts_with(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn eat_str(&mut self, s: &str) -> bool {
        if self.rest().starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    /// One `[0x]"seq">[0x]"repl"[e][r]` rule
    fn rule(&mut self) -> Result<Rule> {
        let sequence_is_hex = self.eat_str("0x");
        let sequence = self.quoted()?;

        if !self.eat('>') {
            bail!("expected '>' at offset {}", self.pos);
        }

        let replacement_is_hex = self.eat_str("0x");
        let replacement = self.quoted()?;

        if !sequence_is_hex && replacement_is_hex {
            bail!("hex cannot be a replacement of text (offset {})", self.pos);
        }
        let phase = if replacement_is_hex {
            Phase::Hex2Hex
        } else if sequence_is_hex {
            Phase::Hex2Str
        } else {
            Phase::Str2Str
        };

        let mut rule = Rule::new(sequence, replacement, phase);
        if self.eat('e') {
            rule = rule.escaped();
        }
        if self.eat('r') {
            rule = rule.regex();
        }
        Ok(rule)
    }

    /// A double-quoted string; `\"` does not close it and is kept verbatim
    fn quoted(&mut self) -> Result<String> {
        if !self.eat('"') {
            bail!("expected '\"' at offset {}", self.pos);
        }
        let mut content = String::new();
        let mut escaped = false;
        for c in self.rest().chars() {
            self.pos += c.len_utf8();
            if c == '"' && !escaped {
                return Ok(content);
            }
            escaped = c == '\\' && !escaped;
            content.push(c);
        }
        bail!("unterminated string at offset {}", self.pos);
    }

    fn end(&mut self) -> Result<()> {
        if !self.rest().is_empty() {
            bail!("trailing input at offset {}", self.pos);
        }
        Ok(())
    }
}
