//! # kaidoku-core
//!
//! A library for recovering readable game text from hexadecimal memory
//! dumps.
//!
//! This crate provides the core functionality for:
//! - Extracting plausible text runs from raw hex with per-encoding grammars
//! - Scoring the extracted runs and their decoded text with tunable
//!   heuristics
//! - Rewriting hex and text through user-defined replacement rules
//! - Auto-detecting the text encoding of a dump
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`grammar`]: Per-encoding chunk extraction from raw hex
//! - [`evaluate`]: Plausibility scoring of hex runs, text and attempts
//! - [`replace`]: Replacement rules and the transitory representation
//! - [`line`]: The per-encoding decoding pipeline
//! - [`detect`]: Encoding auto-detection
//! - [`render`]: Output rendering, debug traces and filtering
//! - [`processor`]: The stateful conversion front door
//! - [`error`]: Error types and handling
//!
//! ## Example
//!
//! ```
//! use kaidoku_core::{ConvertOptions, HexProcessor};
//!
//! let processor = HexProcessor::new(ConvertOptions::default());
//! // こんにちは。 as zero-terminated UTF-8
//! let text = processor.convert("e38193e38293e381abe381a1e381afe3808200")?;
//! assert_eq!(text, "こんにちは。");
//! # Ok::<(), kaidoku_core::Error>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod detect;
pub mod encoding;
pub mod error;
pub mod evaluate;
pub mod grammar;
pub mod line;
pub mod processor;
pub mod render;
pub mod replace;

// Re-export primary types for convenience
pub use detect::{Conversion, DecodingAttempt, Detector};
pub use encoding::{Encoding, EncodingChoice, DETECTION_ORDER};
pub use error::{Error, Result};
pub use line::{DecodedLine, LineDecoder, LineList};
pub use processor::{ConvertOptions, HexProcessor, DEFAULT_STRICTNESS};
pub use render::{DebugFlags, Formatter, Renderer};
pub use replace::{Phase, Rule, Rules};

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
