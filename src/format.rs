//! Format detection and routing for Brood War replay files.
//!
//! This module classifies a `.rep` file into one of three format
//! generations based on the replay magic at offset 0x0C and the
//! compression probe byte at the start of the ReplayID section data:
//!
//! - **Legacy** (pre-1.18): `reRS` magic, PKWARE "explode" compression
//! - **Modern** (1.18–1.20): `reRS` magic, zlib compression
//! - **Modern121** (1.21+): `seRS` magic, zlib compression, enlarged
//!   selection/targeting command bodies and an extra length prefix
//!   between the header and commands sections
//!
//! # Example
//!
//! ```
//! use bwrep_parser::format::{detect_format, ReplayFormat};
//!
//! let mut data = vec![0u8; 32];
//! data[12..16].copy_from_slice(b"seRS");
//! assert!(matches!(detect_format(&data), Ok(ReplayFormat::Modern121)));
//! ```

use serde::Serialize;

use crate::error::{ParserError, Result};

/// The replay magic used by versions before 1.21.
pub const MAGIC_LEGACY: &[u8; 4] = b"reRS";

/// The replay magic used by version 1.21 and later.
pub const MAGIC_121: &[u8; 4] = b"seRS";

/// The byte offset of the replay magic within the file.
pub const MAGIC_OFFSET: usize = 0x0C;

/// The byte offset where the section sequence begins.
pub const SECTIONS_OFFSET: usize = 0x10;

/// Offset of the compression probe byte: the first data byte of the
/// ReplayID section's first chunk. 0x78 (zlib CMF) there means the
/// section is deflate-compressed, which only 1.18+ clients produce.
pub const COMPRESSION_PROBE_OFFSET: usize = 0x1C;

/// Bytes of prefix the detector inspects.
pub const DETECT_PREFIX_LEN: usize = 32;

/// The compression family a replay format uses for its sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionKind {
    /// PKWARE-DCL "explode", used by pre-1.18 replays.
    Pkware,
    /// Zlib deflate, used by 1.18+ replays.
    Zlib,
}

/// The format generation of a Brood War replay file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ReplayFormat {
    /// Created by a version before 1.18. PKWARE-compressed sections.
    Legacy,

    /// Created by a version between 1.18 and 1.20. Zlib-compressed
    /// sections, original command sizes.
    Modern,

    /// Created by version 1.21 or later. Zlib-compressed sections; the
    /// right-click, targeted-order and selection commands carry extra
    /// padding words, and a 4-byte length sits between the header and
    /// commands sections.
    Modern121,
}

impl ReplayFormat {
    /// Returns the compression family used by this format's sections.
    #[must_use]
    pub const fn compression(&self) -> CompressionKind {
        match self {
            ReplayFormat::Legacy => CompressionKind::Pkware,
            ReplayFormat::Modern | ReplayFormat::Modern121 => CompressionKind::Zlib,
        }
    }

    /// Returns whether the right-click and targeted-order commands carry
    /// a pad u16 after the unit tag (11-byte bodies instead of 9).
    #[must_use]
    pub const fn has_extended_orders(&self) -> bool {
        matches!(self, ReplayFormat::Modern121)
    }

    /// Returns whether each unit tag in a selection command is followed
    /// by a pad u16.
    #[must_use]
    pub const fn has_extended_selections(&self) -> bool {
        matches!(self, ReplayFormat::Modern121)
    }

    /// Returns whether a 4-byte length is inserted between the header
    /// section and the commands section.
    #[must_use]
    pub const fn has_intersection_length(&self) -> bool {
        matches!(self, ReplayFormat::Modern121)
    }

    /// Returns the replay magic this format writes at offset 0x0C.
    #[must_use]
    pub const fn magic(&self) -> &'static [u8; 4] {
        match self {
            ReplayFormat::Legacy | ReplayFormat::Modern => MAGIC_LEGACY,
            ReplayFormat::Modern121 => MAGIC_121,
        }
    }
}

/// Returns whether the 4 bytes are a valid replay magic.
#[must_use]
pub fn is_replay_magic(bytes: &[u8]) -> bool {
    bytes == MAGIC_LEGACY || bytes == MAGIC_121
}

/// Detects the format generation of a replay file from its raw bytes.
///
/// Only the first [`DETECT_PREFIX_LEN`] bytes are inspected, so detection
/// is stable under irrelevant trailing bytes.
///
/// # Arguments
///
/// * `data` - The raw bytes of the replay file (at least 32 bytes)
///
/// # Errors
///
/// - `ParserError::InvalidMagic` if offset 0x0C holds neither `reRS` nor
///   `seRS`
/// - `ParserError::UnexpectedEof` if the file is too short to inspect
///
/// # Example
///
/// ```
/// use bwrep_parser::format::{detect_format, ReplayFormat};
///
/// let mut data = vec![0u8; 32];
/// data[12..16].copy_from_slice(b"reRS");
/// data[28] = 0x78; // zlib CMF in the ReplayID chunk
/// assert!(matches!(detect_format(&data), Ok(ReplayFormat::Modern)));
/// ```
pub fn detect_format(data: &[u8]) -> Result<ReplayFormat> {
    if data.len() < MAGIC_OFFSET + 4 {
        return Err(ParserError::unexpected_eof(MAGIC_OFFSET + 4, data.len()));
    }

    let magic = &data[MAGIC_OFFSET..MAGIC_OFFSET + 4];

    // 1.21+ writes `seRS`; everything older writes `reRS`.
    if magic == MAGIC_121 {
        return Ok(ReplayFormat::Modern121);
    }
    if magic != MAGIC_LEGACY {
        return Err(ParserError::invalid_magic(MAGIC_LEGACY, magic));
    }

    // `reRS` files split on the compression probe: a zlib CMF byte at the
    // first ReplayID chunk byte marks a 1.18+ client.
    if data.len() <= COMPRESSION_PROBE_OFFSET {
        return Err(ParserError::unexpected_eof(
            COMPRESSION_PROBE_OFFSET + 1,
            data.len(),
        ));
    }

    if data[COMPRESSION_PROBE_OFFSET] == 0x78 {
        Ok(ReplayFormat::Modern)
    } else {
        Ok(ReplayFormat::Legacy)
    }
}
