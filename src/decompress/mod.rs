//! Decompression for Brood War replay sections.
//!
//! Replay sections are stored as sequences of independently compressed
//! chunks. The compression family depends on the format generation:
//!
//! - **Legacy** (pre-1.18): PKWARE-DCL "explode"
//! - **Modern / Modern121** (1.18+): zlib deflate
//!
//! Tiny chunks (such as the 4-byte ReplayID) are stored raw; a chunk is
//! only run through a decompressor when its leading bytes look like the
//! family's stream header, otherwise it passes through untouched.
//!
//! Real-world `.rep` files are not always well-formed zlib: some tools
//! strip the 2-byte header or prepend junk. [`zlib::inflate_chunk`]
//! therefore tries a declared sequence of strategies, and for the
//! commands section ranks the surviving candidates with the
//! [`validate`] heuristics.

pub mod pkware;
pub mod validate;
pub mod zlib;

pub use validate::{validate_command_stream, StreamScore};
pub use zlib::is_zlib_header;

use crate::error::Result;
use crate::format::{CompressionKind, ReplayFormat};

/// Upper bound on a single chunk's decompressed size.
///
/// A legitimate section chunk decompresses to a few KB; the bound stops
/// decompression bombs long before they hurt.
pub const MAX_CHUNK_DECOMPRESSED: u64 = 16 * 1024 * 1024;

/// Decompresses one section chunk according to the replay format.
///
/// Chunks whose leading bytes do not match the family's stream header
/// pass through as-is (the ReplayID chunk of legacy replays is stored
/// raw, for example).
///
/// When `prefer_commands` is set, all zlib strategies are tried and the
/// candidate scoring highest under command-stream validation is chosen;
/// otherwise the first strategy producing output wins.
///
/// # Errors
///
/// Returns `ParserError::DecompressionError` if the chunk looks
/// compressed but no strategy produced output.
pub fn decompress_chunk(
    format: ReplayFormat,
    chunk: &[u8],
    prefer_commands: bool,
) -> Result<Vec<u8>> {
    match format.compression() {
        CompressionKind::Zlib => {
            if zlib::is_zlib_header(chunk) {
                zlib::inflate_chunk(chunk, prefer_commands)
            } else {
                Ok(chunk.to_vec())
            }
        }
        CompressionKind::Pkware => {
            if pkware::is_pkware_header(chunk) {
                pkware::explode_chunk(chunk)
            } else {
                Ok(chunk.to_vec())
            }
        }
    }
}
