//! Error types for the kaidoku-core library.
//!
//! This module provides comprehensive error handling using the `thiserror` crate,
//! with detailed error variants for different failure modes.

use thiserror::Error;

/// Result type alias for kaidoku operations
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error type for all kaidoku operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Malformed hexadecimal input (odd length or non-hex characters)
    #[error("invalid hex input: {details}")]
    InvalidInput {
        /// Description of what made the input invalid
        details: String,
    },

    /// An encoding name requested through configuration is not supported
    #[error("unsupported encoding: '{name}'")]
    UnsupportedEncoding {
        /// The unrecognized encoding name
        name: String,
    },

    /// A replacement rule carries a malformed pattern
    ///
    /// This aborts the whole conversion: silently skipping a rule could
    /// desynchronize hex/text alignment for the rules that follow it.
    #[error("malformed replacement pattern '{pattern}': {source}")]
    Replacement {
        /// The pattern that failed to compile
        pattern: String,
        /// Underlying regex compilation error
        #[source]
        source: regex::Error,
    },

    /// An unknown letter in a debug flag specification
    #[error("unknown debug flag: '{flag}'")]
    InvalidDebugFlag {
        /// The unrecognized flag letter
        flag: char,
    },
}

impl Error {
    /// Creates a new invalid input error
    pub fn invalid_input(details: impl Into<String>) -> Self {
        Self::InvalidInput {
            details: details.into(),
        }
    }

    /// Creates a new unsupported encoding error
    pub fn unsupported_encoding(name: impl Into<String>) -> Self {
        Self::UnsupportedEncoding { name: name.into() }
    }

    /// Creates a new replacement pattern error
    pub fn replacement(pattern: impl Into<String>, source: regex::Error) -> Self {
        Self::Replacement {
            pattern: pattern.into(),
            source,
        }
    }

    /// Creates a new debug flag error
    pub fn invalid_debug_flag(flag: char) -> Self {
        Self::InvalidDebugFlag { flag }
    }

    /// Returns true if the error was caused by the caller's configuration
    /// rather than by the hex input itself
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedEncoding { .. }
                | Self::Replacement { .. }
                | Self::InvalidDebugFlag { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::invalid_input("odd number of hex digits");
        assert!(err.to_string().contains("invalid hex input"));
        assert!(err.to_string().contains("odd number"));
    }

    #[test]
    fn test_is_configuration() {
        assert!(Error::unsupported_encoding("latin-1").is_configuration());
        assert!(!Error::invalid_input("bad").is_configuration());
    }
}
