//! Binary reading utilities for parsing Brood War replay files.
//!
//! This module provides [`ByteReader`], a cursor over an immutable byte
//! buffer with bounds-checked little-endian primitive reads, fixed-length
//! string reads, and a hex dump helper. All reads perform bounds checking
//! and return [`ParserError::UnexpectedEof`] for truncated data; nothing
//! is ever silently truncated.
//!
//! # Endianness
//!
//! All Brood War replay structures use little-endian byte order for
//! multi-byte integers. The reader handles the conversion automatically.
//!
//! # String decoding
//!
//! Player names, map titles and chat messages in `.rep` files are stored
//! in whatever encoding the player's system used: UTF-8 on Remastered,
//! Windows-1252 or EUC-KR-adjacent legacy data on older clients. The
//! [`decode_string`] chain is explicit and deterministic: strict UTF-8
//! first, then Windows-1252, then a byte-by-byte filter of printable
//! ranges as the terminal fallback.
//!
//! # Example
//!
//! ```
//! use bwrep_parser::binary::ByteReader;
//!
//! let data = [0x26, 0x89, 0x01, 0x00, b'H', b'i', 0x00];
//! let mut reader = ByteReader::new(&data);
//!
//! let value = reader.read_u32().unwrap();
//! assert_eq!(value, 0x00018926);
//!
//! let s = reader.read_fixed_string(3).unwrap();
//! assert_eq!(s, "Hi");
//! assert_eq!(reader.remaining(), 0);
//! ```

use crate::error::{ParserError, Result};

/// A bounds-checked cursor over a byte buffer.
///
/// The cursor position always satisfies `pos <= len`. Reads advance the
/// cursor; failed reads leave it untouched.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Creates a new reader over the given buffer, positioned at 0.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Creates a new reader positioned at `offset`.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::UnexpectedEof` if `offset` is past the end
    /// of the buffer.
    pub fn at(data: &'a [u8], offset: usize) -> Result<Self> {
        if offset > data.len() {
            return Err(ParserError::unexpected_eof(offset, data.len()));
        }
        Ok(Self { data, pos: offset })
    }

    /// Returns the current cursor position.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Moves the cursor to an absolute position.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::UnexpectedEof` if `pos` is past the end of
    /// the buffer.
    pub fn set_pos(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(ParserError::unexpected_eof(pos, self.data.len()));
        }
        self.pos = pos;
        Ok(())
    }

    /// Returns the number of bytes between the cursor and the end.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns whether `n` more bytes can be read from the cursor.
    #[must_use]
    pub fn can_read(&self, n: usize) -> bool {
        self.remaining() >= n
    }

    /// Advances the cursor by `n` bytes without reading them.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::UnexpectedEof` if fewer than `n` bytes
    /// remain.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        if !self.can_read(n) {
            return Err(ParserError::unexpected_eof(
                self.pos + n,
                self.data.len(),
            ));
        }
        self.pos += n;
        Ok(())
    }

    /// Reads a single byte.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::UnexpectedEof` at the end of the buffer.
    pub fn read_u8(&mut self) -> Result<u8> {
        if !self.can_read(1) {
            return Err(ParserError::unexpected_eof(
                self.pos + 1,
                self.data.len(),
            ));
        }
        let value = self.data[self.pos];
        self.pos += 1;
        Ok(value)
    }

    /// Reads a little-endian u16.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::UnexpectedEof` if fewer than 2 bytes remain.
    pub fn read_u16(&mut self) -> Result<u16> {
        const SIZE: usize = 2;
        if !self.can_read(SIZE) {
            return Err(ParserError::unexpected_eof(
                self.pos + SIZE,
                self.data.len(),
            ));
        }
        let slice = &self.data[self.pos..self.pos + SIZE];
        self.pos += SIZE;
        Ok(u16::from_le_bytes([slice[0], slice[1]]))
    }

    /// Reads a little-endian u32.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::UnexpectedEof` if fewer than 4 bytes remain.
    pub fn read_u32(&mut self) -> Result<u32> {
        const SIZE: usize = 4;
        if !self.can_read(SIZE) {
            return Err(ParserError::unexpected_eof(
                self.pos + SIZE,
                self.data.len(),
            ));
        }
        let slice = &self.data[self.pos..self.pos + SIZE];
        self.pos += SIZE;
        Ok(u32::from_le_bytes([slice[0], slice[1], slice[2], slice[3]]))
    }

    /// Reads `n` bytes as a slice borrowed from the underlying buffer.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::UnexpectedEof` if fewer than `n` bytes
    /// remain.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if !self.can_read(n) {
            return Err(ParserError::unexpected_eof(
                self.pos + n,
                self.data.len(),
            ));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Reads a fixed-length string field of exactly `n` bytes.
    ///
    /// The field is consumed in full; the decoded string is cut at the
    /// first NUL byte and run through [`decode_string`].
    ///
    /// # Errors
    ///
    /// Returns `ParserError::UnexpectedEof` if fewer than `n` bytes
    /// remain.
    ///
    /// # Example
    ///
    /// ```
    /// use bwrep_parser::binary::ByteReader;
    ///
    /// let data = b"Lost Temple\x00\x00\x00\x00\x00";
    /// let mut reader = ByteReader::new(data);
    /// assert_eq!(reader.read_fixed_string(16).unwrap(), "Lost Temple");
    /// assert_eq!(reader.remaining(), 0);
    /// ```
    pub fn read_fixed_string(&mut self, n: usize) -> Result<String> {
        let raw = self.read_bytes(n)?;
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        Ok(decode_string(&raw[..end]))
    }

    /// Renders `len` bytes starting at `offset` as a hex dump string.
    ///
    /// Each line shows 16 bytes: the absolute offset, the hex bytes, and
    /// a printable-ASCII gutter. The range is clamped to the buffer, so
    /// this never fails; it is a diagnostics helper, not a read.
    #[must_use]
    pub fn hex_dump(&self, offset: usize, len: usize) -> String {
        let start = offset.min(self.data.len());
        let end = offset.saturating_add(len).min(self.data.len());
        let mut out = String::new();
        for (i, chunk) in self.data[start..end].chunks(16).enumerate() {
            let base = start + i * 16;
            let hex: Vec<String> = chunk.iter().map(|b| format!("{b:02X}")).collect();
            let ascii: String = chunk
                .iter()
                .map(|&b| {
                    if (0x20..0x7F).contains(&b) {
                        b as char
                    } else {
                        '.'
                    }
                })
                .collect();
            out.push_str(&format!("{base:08X}  {:<47}  {ascii}\n", hex.join(" ")));
        }
        out
    }
}

/// Decodes raw string bytes through the deterministic encoding chain.
///
/// The chain, in order:
///
/// 1. Strict UTF-8 (covers Remastered names, including Hangul).
/// 2. Windows-1252 without replacement (covers most legacy western
///    names; fails only on the code points 1252 leaves undefined).
/// 3. Terminal fallback: keep only bytes in the printable ranges
///    0x20–0x7E and 0xA0–0xFF, decoded as Latin-1.
///
/// The result is trimmed of surrounding whitespace.
#[must_use]
pub fn decode_string(raw: &[u8]) -> String {
    if let Ok(s) = std::str::from_utf8(raw) {
        return s.trim().to_string();
    }

    if let Some(s) = encoding_rs::WINDOWS_1252.decode_without_bom_handling_and_without_replacement(raw)
    {
        return s.trim().to_string();
    }

    raw.iter()
        .filter(|&&b| (0x20..=0x7E).contains(&b) || b >= 0xA0)
        .map(|&b| b as char)
        .collect::<String>()
        .trim()
        .to_string()
}
