//! PKWARE-DCL "explode" decompression for legacy replay chunks.
//!
//! Replays recorded before patch 1.18 compress their sections with the
//! PKWARE Data Compression Library ("implode"). The [`explode`] crate
//! provides the matching decompressor; this module wraps it with the
//! same size limiting applied to zlib chunks.

use std::io::Read;

use explode::ExplodeReader;

use super::MAX_CHUNK_DECOMPRESSED;
use crate::error::{ParserError, Result};

/// Returns whether the slice starts with a plausible PKWARE-DCL header.
///
/// An imploded stream begins with the literal mode byte (0 for binary,
/// 1 for ASCII) followed by the dictionary size exponent (4–6).
#[must_use]
pub fn is_pkware_header(bytes: &[u8]) -> bool {
    bytes.len() >= 2 && bytes[0] <= 1 && (4..=6).contains(&bytes[1])
}

/// Decompresses one PKWARE-imploded chunk.
///
/// # Errors
///
/// Returns `ParserError::DecompressionError` if the stream is not valid
/// PKWARE-DCL data or decodes to nothing.
pub fn explode_chunk(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut reader = ExplodeReader::new(data).take(MAX_CHUNK_DECOMPRESSED);
    match reader.read_to_end(&mut out) {
        Ok(n) if n > 0 => Ok(out),
        Ok(_) => Err(ParserError::DecompressionError {
            reason: "PKWARE chunk decoded to nothing".to_string(),
        }),
        Err(e) => Err(ParserError::DecompressionError {
            reason: format!("PKWARE explode failed: {e}"),
        }),
    }
}
