//! Heuristic validation of candidate command streams.
//!
//! The inflate strategy chain can produce several plausible decodings of
//! a chunk; only one of them is the real command stream. A genuine
//! stream has recognizable texture: frame-sync zero bytes at a sensible
//! rate, a healthy density of known opcodes, and enough byte diversity
//! to rule out runs of padding. [`validate_command_stream`] applies the
//! acceptance floor and produces a [`StreamScore`] for ranking the
//! survivors.

use crate::commands::opcodes::is_known_opcode;

/// Minimum length a candidate command stream must have.
pub const MIN_STREAM_LEN: usize = 50;

/// Minimum fraction of 0x00 bytes (frame-sync candidates).
pub const MIN_SYNC_RATIO: f64 = 0.01;

/// Maximum fraction of 0x00 bytes.
pub const MAX_SYNC_RATIO: f64 = 0.80;

/// Minimum known-opcode bytes within the leading window.
pub const MIN_WINDOW_OPCODES: usize = 5;

/// Size of the leading window scanned for early opcodes.
pub const OPCODE_WINDOW: usize = 256;

/// Minimum known-opcode bytes across the full stream.
pub const MIN_TOTAL_OPCODES: usize = 20;

/// Texture metrics of an accepted candidate stream.
///
/// Higher [`StreamScore::score`] means a more plausible command stream;
/// the score only orders candidates of the same section and has no
/// absolute meaning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamScore {
    /// Stream length in bytes.
    pub len: usize,
    /// Fraction of 0x00 bytes.
    pub sync_ratio: f64,
    /// Fraction of bytes matching the known opcode set.
    pub opcode_density: f64,
    /// Fraction of the 256 byte values present in the stream.
    pub diversity: f64,
    /// Combined ranking score.
    pub score: f64,
}

/// Validates a candidate command stream, returning its score when it
/// passes the acceptance floor.
///
/// Acceptance requires:
/// - length ≥ [`MIN_STREAM_LEN`]
/// - 0x00 fraction within `[MIN_SYNC_RATIO, MAX_SYNC_RATIO]`
/// - at least [`MIN_WINDOW_OPCODES`] known opcodes in the first
///   [`OPCODE_WINDOW`] bytes and [`MIN_TOTAL_OPCODES`] overall
///
/// # Example
///
/// ```
/// use bwrep_parser::decompress::validate_command_stream;
///
/// // A run of identical bytes is not a command stream
/// assert!(validate_command_stream(&[0xEE; 400]).is_none());
/// ```
#[must_use]
pub fn validate_command_stream(data: &[u8]) -> Option<StreamScore> {
    if data.len() < MIN_STREAM_LEN {
        return None;
    }

    let len = data.len();
    let zeroes = data.iter().filter(|&&b| b == 0).count();
    #[allow(clippy::cast_precision_loss)]
    let sync_ratio = zeroes as f64 / len as f64;
    if !(MIN_SYNC_RATIO..=MAX_SYNC_RATIO).contains(&sync_ratio) {
        return None;
    }

    let window = &data[..OPCODE_WINDOW.min(len)];
    let window_opcodes = window.iter().filter(|&&b| is_known_opcode(b)).count();
    if window_opcodes < MIN_WINDOW_OPCODES {
        return None;
    }

    let total_opcodes = data.iter().filter(|&&b| is_known_opcode(b)).count();
    if total_opcodes < MIN_TOTAL_OPCODES {
        return None;
    }

    let mut seen = [false; 256];
    for &b in data {
        seen[b as usize] = true;
    }
    #[allow(clippy::cast_precision_loss)]
    let diversity = seen.iter().filter(|&&s| s).count() as f64 / 256.0;

    #[allow(clippy::cast_precision_loss)]
    let opcode_density = total_opcodes as f64 / len as f64;

    // Streams with a sync ratio near the middle of the plausible band
    // score higher than ones hugging either edge.
    let sync_bonus = 1.0 - (sync_ratio - 0.3).abs();

    #[allow(clippy::cast_precision_loss)]
    let score =
        opcode_density * 40.0 + sync_bonus * 20.0 + (len as f64).ln() * 2.0 + diversity * 20.0;

    Some(StreamScore {
        len,
        sync_ratio,
        opcode_density,
        diversity,
        score,
    })
}
