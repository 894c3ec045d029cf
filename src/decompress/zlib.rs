//! Zlib inflate strategies for modern replay chunks.
//!
//! Well-formed 1.18+ replays compress every chunk as a standard zlib
//! stream. Files that passed through third-party tooling sometimes carry
//! raw deflate data, a stripped header, or a few bytes of leading junk.
//! [`inflate_chunk`] tries the strategies in declared order:
//!
//! 1. standard zlib inflate
//! 2. raw deflate inflate
//! 3. raw deflate after skipping the 2-byte zlib header
//! 4. raw deflate at offsets 1–9
//!
//! The first strategy that produces output wins; when the chunk feeds
//! the commands section, every candidate is scored with the
//! command-stream heuristics and the best one wins instead.

use std::io::Read;

use flate2::read::{DeflateDecoder, ZlibDecoder};

use super::validate::validate_command_stream;
use super::MAX_CHUNK_DECOMPRESSED;
use crate::error::{ParserError, Result};

/// Returns whether the slice starts with a valid zlib stream header.
///
/// A zlib header is two bytes: CMF with a deflate compression method
/// (`CMF & 0x0F == 8`) and FLG such that the pair is a multiple of 31.
///
/// # Example
///
/// ```
/// use bwrep_parser::decompress::is_zlib_header;
///
/// assert!(is_zlib_header(&[0x78, 0x9C]));
/// assert!(is_zlib_header(&[0x78, 0x01]));
/// assert!(!is_zlib_header(&[0x78, 0x00]));
/// assert!(!is_zlib_header(&[0x72, 0x65]));
/// ```
#[must_use]
pub fn is_zlib_header(bytes: &[u8]) -> bool {
    if bytes.len() < 2 {
        return false;
    }
    let cmf = bytes[0];
    let flg = bytes[1];
    (cmf & 0x0F) == 8 && (u16::from(cmf) << 8 | u16::from(flg)) % 31 == 0
}

/// One inflate attempt; `None` when the decoder errors or yields nothing.
fn try_decode<R: Read>(decoder: R) -> Option<Vec<u8>> {
    let mut out = Vec::new();
    let mut limited = decoder.take(MAX_CHUNK_DECOMPRESSED);
    match limited.read_to_end(&mut out) {
        Ok(n) if n > 0 => Some(out),
        _ => None,
    }
}

fn try_zlib(data: &[u8]) -> Option<Vec<u8>> {
    try_decode(ZlibDecoder::new(data))
}

fn try_raw(data: &[u8]) -> Option<Vec<u8>> {
    try_decode(DeflateDecoder::new(data))
}

/// Runs the strategy chain, yielding every successful decode in order.
fn candidates(data: &[u8]) -> Vec<Vec<u8>> {
    let mut found = Vec::new();

    if let Some(out) = try_zlib(data) {
        found.push(out);
    }
    if let Some(out) = try_raw(data) {
        found.push(out);
    }
    if data.len() > 2 {
        if let Some(out) = try_raw(&data[2..]) {
            found.push(out);
        }
    }
    for offset in 1..=9usize {
        if offset == 2 || offset >= data.len() {
            continue;
        }
        if let Some(out) = try_raw(&data[offset..]) {
            found.push(out);
        }
    }

    found
}

/// Inflates one chunk through the strategy chain.
///
/// With `prefer_commands` unset, the first successful decode wins. With
/// it set, all candidates are collected and the one scoring highest
/// under command-stream validation is returned; candidates failing
/// validation are kept only as a last resort.
///
/// # Errors
///
/// Returns `ParserError::DecompressionError` when no strategy produces
/// any output.
pub fn inflate_chunk(data: &[u8], prefer_commands: bool) -> Result<Vec<u8>> {
    if !prefer_commands {
        // Cheap path: stop at the first strategy that decodes.
        if let Some(out) = try_zlib(data) {
            return Ok(out);
        }
        if let Some(out) = try_raw(data) {
            return Ok(out);
        }
        if data.len() > 2 {
            if let Some(out) = try_raw(&data[2..]) {
                return Ok(out);
            }
        }
        for offset in 1..=9usize {
            if offset == 2 || offset >= data.len() {
                continue;
            }
            if let Some(out) = try_raw(&data[offset..]) {
                return Ok(out);
            }
        }
        return Err(ParserError::DecompressionError {
            reason: format!("no inflate strategy decoded a {}-byte chunk", data.len()),
        });
    }

    let all = candidates(data);
    if all.is_empty() {
        return Err(ParserError::DecompressionError {
            reason: format!(
                "no inflate strategy decoded a {}-byte commands chunk",
                data.len()
            ),
        });
    }

    let mut fallback: Option<Vec<u8>> = None;
    let mut best: Option<(f64, Vec<u8>)> = None;
    for out in all {
        match validate_command_stream(&out) {
            Some(score) => {
                let better = best
                    .as_ref()
                    .map_or(true, |(existing, _)| score.score > *existing);
                if better {
                    best = Some((score.score, out));
                }
            }
            None => {
                if fallback.is_none() {
                    fallback = Some(out);
                }
            }
        }
    }

    if let Some((score, out)) = best {
        log::debug!(
            "commands chunk decoded to {} bytes (score {score:.2})",
            out.len()
        );
        Ok(out)
    } else if let Some(out) = fallback {
        // No candidate looks like a command stream; single chunks of a
        // larger section legitimately fail the whole-stream checks.
        Ok(out)
    } else {
        Err(ParserError::DecompressionError {
            reason: format!("no usable decode for a {}-byte commands chunk", data.len()),
        })
    }
}
