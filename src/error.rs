//! Error types for the Brood War replay parser.
//!
//! This module defines a comprehensive error hierarchy for handling all
//! failure cases during replay parsing, including I/O errors, format
//! validation failures, decompression issues, and cooperative
//! cancellation.
//!
//! Single-command parse failures are not represented here: they are always
//! recovered locally by the command parser and surface only as a
//! `parse_errors` count on the result.

use thiserror::Error;

/// The main error type for replay parsing operations.
///
/// This enum covers the fatal error cases that can abort a parse:
/// - File I/O failures from decoder internals
/// - Invalid or unrecognized replay magic
/// - Inputs below the minimum viable replay size
/// - Truncated data
/// - Decompression failures on required sections
/// - Structurally malformed sections
/// - Cooperative cancellation by the caller
///
/// # Example
///
/// ```
/// use bwrep_parser::error::{ParserError, Result};
///
/// fn example_operation() -> Result<()> {
///     // Operations that may fail return Result<T>
///     Err(ParserError::MalformedSection {
///         reason: "header section decompressed to the wrong size".to_string(),
///     })
/// }
/// ```
#[derive(Error, Debug)]
pub enum ParserError {
    /// An I/O error occurred while decoding replay data.
    ///
    /// This wraps standard library I/O errors from the decompression
    /// readers for seamless propagation using the `?` operator.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The replay magic at offset 0x0C does not match any known variant.
    ///
    /// Brood War replays must carry either `reRS` (pre-1.21) or `seRS`
    /// (1.21+) at offset 12.
    #[error("Invalid magic bytes: expected {expected}, found {found}")]
    InvalidMagic {
        /// The expected magic bytes (as hex string for display).
        expected: String,
        /// The actual bytes found at the magic offset (as hex string).
        found: String,
    },

    /// The input buffer is below the minimum viable replay size.
    ///
    /// A replay must hold at least the container prefix, the magic, and
    /// a complete header section; anything under 1000 bytes cannot.
    #[error("Input too small: {size} bytes, need at least {minimum}")]
    TooSmall {
        /// The actual input size in bytes.
        size: usize,
        /// The minimum acceptable input size in bytes.
        minimum: usize,
    },

    /// The data ended unexpectedly before the required bytes could be read.
    ///
    /// This typically indicates a truncated replay file.
    #[error("Unexpected end of data: expected {expected} bytes, but only {available} available")]
    UnexpectedEof {
        /// The number of bytes that were expected to be available.
        expected: usize,
        /// The actual number of bytes available.
        available: usize,
    },

    /// Decompression of a required section failed.
    ///
    /// Every decompression strategy was tried and none produced output
    /// that passed stream validation.
    #[error("Decompression failed: {reason}")]
    DecompressionError {
        /// A description of the decompression failure.
        reason: String,
    },

    /// A section's structure disagrees with its declaration.
    ///
    /// Either the declared and decoded sizes differ beyond tolerance, or
    /// the ReplayID section does not carry the replay magic.
    #[error("Malformed section: {reason}")]
    MalformedSection {
        /// A description of what makes the section invalid.
        reason: String,
    },

    /// The parse was cancelled cooperatively by the caller.
    ///
    /// No partial result is produced.
    #[error("Parse cancelled")]
    Cancelled,
}

impl ParserError {
    /// Creates an `InvalidMagic` error with the given byte slices.
    ///
    /// The bytes are converted to hex strings for human-readable display.
    ///
    /// # Example
    ///
    /// ```
    /// use bwrep_parser::error::ParserError;
    ///
    /// let err = ParserError::invalid_magic(b"reRS", b"junk");
    /// assert!(err.to_string().contains("Invalid magic bytes"));
    /// ```
    #[must_use]
    pub fn invalid_magic(expected: &[u8], found: &[u8]) -> Self {
        ParserError::InvalidMagic {
            expected: bytes_to_hex(expected),
            found: bytes_to_hex(found),
        }
    }

    /// Creates an `UnexpectedEof` error with the given sizes.
    #[must_use]
    pub fn unexpected_eof(expected: usize, available: usize) -> Self {
        ParserError::UnexpectedEof {
            expected,
            available,
        }
    }

    /// Creates a `TooSmall` error for the given input size.
    #[must_use]
    pub fn too_small(size: usize, minimum: usize) -> Self {
        ParserError::TooSmall { size, minimum }
    }

    /// Returns whether this error aborts the whole parse.
    ///
    /// Section-level errors on non-header sections are recoverable: the
    /// pipeline continues with partial data and a degraded reliability
    /// grade. Everything else is fatal.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ParserError::MalformedSection { .. })
    }
}

/// Converts a byte slice to a hexadecimal string representation.
///
/// If the slice is 8 bytes or less, formats as space-separated hex values.
/// If longer, shows the first 8 bytes followed by "...".
fn bytes_to_hex(bytes: &[u8]) -> String {
    if bytes.len() <= 8 {
        bytes
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        let prefix: String = bytes[..8]
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(" ");
        format!("{prefix}... ({} bytes total)", bytes.len())
    }
}

/// A specialized Result type for replay parsing operations.
///
/// This is a convenience alias that uses `ParserError` as the error type.
pub type Result<T> = std::result::Result<T, ParserError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_error_display() {
        let err = ParserError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file not found",
        ));
        assert!(err.to_string().contains("I/O error"));

        let err = ParserError::invalid_magic(b"reRS", b"\x00\x01\x02\x03");
        assert!(err.to_string().contains("Invalid magic bytes"));

        let err = ParserError::too_small(123, 1000);
        assert!(err.to_string().contains("123 bytes"));
        assert!(err.to_string().contains("1000"));

        let err = ParserError::DecompressionError {
            reason: "invalid zlib stream".to_string(),
        };
        assert!(err.to_string().contains("Decompression failed"));

        let err = ParserError::MalformedSection {
            reason: "size mismatch".to_string(),
        };
        assert!(err.to_string().contains("Malformed section"));
        assert!(err.to_string().contains("size mismatch"));

        let err = ParserError::unexpected_eof(128, 64);
        assert!(err.to_string().contains("expected 128 bytes"));
        assert!(err.to_string().contains("64 available"));

        assert!(ParserError::Cancelled.to_string().contains("cancelled"));
    }

    #[test]
    fn test_bytes_to_hex_short() {
        let result = bytes_to_hex(b"reRS");
        assert_eq!(result, "72 65 52 53");
    }

    #[test]
    fn test_bytes_to_hex_long() {
        let bytes = b"a much longer byte string";
        let result = bytes_to_hex(bytes);
        assert!(result.contains("..."));
        assert!(result.contains("25 bytes total"));
    }

    #[test]
    fn test_invalid_magic_helper() {
        let err = ParserError::invalid_magic(b"seRS", b"BAD!");
        match err {
            ParserError::InvalidMagic { expected, found } => {
                assert_eq!(expected, "73 65 52 53");
                assert_eq!(found, "42 41 44 21");
            }
            _ => panic!("Expected InvalidMagic variant"),
        }
    }

    #[test]
    fn test_fatality() {
        assert!(ParserError::Cancelled.is_fatal());
        assert!(ParserError::invalid_magic(b"reRS", b"junk").is_fatal());
        assert!(ParserError::unexpected_eof(4, 0).is_fatal());
        assert!(!ParserError::MalformedSection {
            reason: "bad chunk".to_string(),
        }
        .is_fatal());
    }

    #[test]
    fn test_error_is_send_sync() {
        // Ensure our error type can be used across threads
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ParserError>();
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "test error");
        let parser_err: ParserError = io_err.into();
        match parser_err {
            ParserError::IoError(_) => {}
            _ => panic!("Expected IoError variant"),
        }
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_result() -> Result<u32> {
            Ok(42)
        }
        assert_eq!(returns_result().unwrap(), 42);
    }
}
