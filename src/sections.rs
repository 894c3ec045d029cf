//! Section-based container parsing.
//!
//! After the 16-byte prefix a replay is a fixed sequence of standard
//! sections, each a checksum, a chunk count, and that many
//! independently compressed chunks:
//!
//! | id | name | decompressed size |
//! |----|------|-------------------|
//! | 0 | ReplayID | 0x04 (the replay magic) |
//! | 1 | Header | 0x279 |
//! | 2 | Commands | variable (u32 size prefix) |
//! | 3 | MapData | variable (u32 size prefix) |
//! | 4 | PlayerNames | 0x300 |
//!
//! Modern121 files insert one u32 length between the Header and
//! Commands sections; it is read and discarded.
//!
//! Remastered appends optional **modern sections** after the standard
//! five: a four-byte ASCII id, a u32 raw size, and the raw bytes,
//! tentatively inflated when they start with a zlib header. Unknown ids
//! are kept as opaque blobs.
//!
//! Chunk decompression failures inside the Commands or MapData sections
//! are recoverable: the chunk's bytes are skipped (chunk sizes are on
//! disk, so the walk stays aligned) and the failure is recorded for the
//! reliability grade. Structural failures abandon the remaining
//! sections.

use log::{debug, warn};
use serde::Serialize;

use crate::binary::{decode_string, ByteReader};
use crate::decompress::{self, is_zlib_header};
use crate::error::{ParserError, Result};
use crate::format::{ReplayFormat, SECTIONS_OFFSET};
use crate::header::HEADER_SIZE;
use crate::replay::CancelToken;

/// Decompressed size of the ReplayID section.
pub const REPLAY_ID_SIZE: usize = 4;

/// Decompressed size of the PlayerNames section.
pub const PLAYER_NAMES_SIZE: usize = 0x300;

/// Bytes per entry in the PlayerNames section.
pub const PLAYER_NAME_ENTRY_SIZE: usize = PLAYER_NAMES_SIZE / 12;

/// Upper bound accepted for a section's declared decompressed size.
pub const MAX_SECTION_SIZE: usize = 64 * 1024 * 1024;

/// Upper bound accepted for a section's chunk count.
pub const MAX_CHUNK_COUNT: u32 = 4096;

/// The known trailing modern section ids and their expected sizes.
pub const MODERN_SECTION_NAMES: [(&[u8; 4], &str, usize); 5] = [
    (b"SKIN", "skins", 0x15E0),
    (b"LMTS", "limits", 0x1C),
    (b"BFIX", "bugfixes", 0x08),
    (b"CCLR", "custom colors", 0xC0),
    (b"GCFG", "game config", 0x19),
];

/// One trailing modern section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModernSection {
    /// Four ASCII id bytes as stored on disk.
    pub id: [u8; 4],
    /// Section payload, inflated when possible, raw otherwise.
    pub data: Vec<u8>,
}

impl ModernSection {
    /// Returns the human-readable name for a known id.
    #[must_use]
    pub fn name(&self) -> Option<&'static str> {
        MODERN_SECTION_NAMES
            .iter()
            .find(|(id, _, _)| *id == &self.id)
            .map(|(_, name, _)| *name)
    }

    /// Returns the expected decompressed size for a known id.
    #[must_use]
    pub fn expected_size(&self) -> Option<usize> {
        MODERN_SECTION_NAMES
            .iter()
            .find(|(id, _, _)| *id == &self.id)
            .map(|(_, _, size)| *size)
    }
}

/// The decompressed payloads of every section in the file.
#[derive(Debug, Clone, Default)]
pub struct RawSections {
    /// ReplayID payload (the 4 magic bytes).
    pub replay_id: Vec<u8>,
    /// Header payload (0x279 bytes).
    pub header: Vec<u8>,
    /// Commands payload.
    pub commands: Vec<u8>,
    /// MapData payload.
    pub map_data: Vec<u8>,
    /// PlayerNames payload; empty when the file predates the section.
    pub player_names: Vec<u8>,
    /// Trailing modern sections in file order.
    pub modern_sections: Vec<ModernSection>,
    /// Recoverable failures encountered along the way.
    pub section_errors: Vec<String>,
}

/// Payload and error count of one decoded standard section.
struct SectionData {
    data: Vec<u8>,
    chunk_errors: u32,
}

/// Reads all sections of the replay.
///
/// The ReplayID and Header sections are load-bearing: any failure there
/// is returned as an error. Later sections degrade gracefully into
/// [`RawSections::section_errors`] entries.
///
/// # Errors
///
/// - `ParserError::InvalidMagic` if the ReplayID payload is not the
///   replay magic
/// - `ParserError::UnexpectedEof` / `ParserError::MalformedSection` on
///   structural failures in the first two sections
/// - `ParserError::DecompressionError` if the header section cannot be
///   decompressed
/// - `ParserError::Cancelled` when the token fires
pub fn read_sections(
    data: &[u8],
    format: ReplayFormat,
    cancel: &CancelToken,
) -> Result<RawSections> {
    let mut reader = ByteReader::at(data, SECTIONS_OFFSET)?;
    let mut sections = RawSections::default();

    // Section 0: ReplayID. Exactly 4 bytes, must be the magic.
    let replay_id = read_standard(&mut reader, format, Some(REPLAY_ID_SIZE), false, cancel)?;
    if replay_id.data.len() != REPLAY_ID_SIZE
        || !crate::format::is_replay_magic(&replay_id.data)
    {
        return Err(ParserError::invalid_magic(
            format.magic(),
            &replay_id.data,
        ));
    }
    sections.replay_id = replay_id.data;

    // Section 1: Header. Fatal on any shortfall.
    let header = read_standard(&mut reader, format, Some(HEADER_SIZE), false, cancel)?;
    if header.data.len() != HEADER_SIZE {
        if header.chunk_errors > 0 {
            return Err(ParserError::DecompressionError {
                reason: format!(
                    "header section decoded {} of {HEADER_SIZE} bytes with {} failed chunks",
                    header.data.len(),
                    header.chunk_errors
                ),
            });
        }
        return Err(ParserError::MalformedSection {
            reason: format!(
                "header section decompressed to {} bytes, expected {HEADER_SIZE}",
                header.data.len()
            ),
        });
    }
    sections.header = header.data;

    // Modern121 carries an extra length word here; its value is unused.
    if format.has_intersection_length() {
        let skipped = reader.read_u32()?;
        debug!("inter-section length prefix: {skipped}");
    }

    // Section 2: Commands. Recoverable from here on.
    match read_sized_section(&mut reader, format, true, cancel) {
        Ok(commands) => {
            if commands.chunk_errors > 0 {
                sections.section_errors.push(format!(
                    "commands section lost {} chunks",
                    commands.chunk_errors
                ));
            }
            sections.commands = commands.data;
        }
        Err(ParserError::Cancelled) => return Err(ParserError::Cancelled),
        Err(e) => {
            warn!("commands section unreadable: {e}");
            sections
                .section_errors
                .push(format!("commands section unreadable: {e}"));
            return Ok(sections);
        }
    }

    // Section 3: MapData.
    match read_sized_section(&mut reader, format, false, cancel) {
        Ok(map_data) => {
            if map_data.chunk_errors > 0 {
                sections.section_errors.push(format!(
                    "map data section lost {} chunks",
                    map_data.chunk_errors
                ));
            }
            sections.map_data = map_data.data;
        }
        Err(ParserError::Cancelled) => return Err(ParserError::Cancelled),
        Err(e) => {
            warn!("map data section unreadable: {e}");
            sections
                .section_errors
                .push(format!("map data section unreadable: {e}"));
            return Ok(sections);
        }
    }

    // Section 4: PlayerNames. Absent entirely in older files.
    if reader.remaining() > 0 {
        match read_standard(&mut reader, format, Some(PLAYER_NAMES_SIZE), false, cancel) {
            Ok(names) => sections.player_names = names.data,
            Err(ParserError::Cancelled) => return Err(ParserError::Cancelled),
            Err(e) => {
                debug!("player names section unreadable: {e}");
                sections
                    .section_errors
                    .push(format!("player names section unreadable: {e}"));
                return Ok(sections);
            }
        }
    }

    // Trailing modern sections until the file runs out.
    while reader.remaining() >= 8 {
        if cancel.is_cancelled() {
            return Err(ParserError::Cancelled);
        }
        let mut id = [0u8; 4];
        id.copy_from_slice(reader.read_bytes(4)?);
        let size = reader.read_u32()? as usize;
        if size > reader.remaining() {
            sections.section_errors.push(format!(
                "modern section {:?} claims {size} bytes, {} remain",
                String::from_utf8_lossy(&id),
                reader.remaining()
            ));
            break;
        }
        let raw = reader.read_bytes(size)?;
        let data = if is_zlib_header(raw) {
            // Tentative inflate; keep the raw bytes when it fails.
            decompress::zlib::inflate_chunk(raw, false).unwrap_or_else(|_| raw.to_vec())
        } else {
            raw.to_vec()
        };
        let section = ModernSection { id, data };
        debug!(
            "modern section {:?} ({}): {} bytes",
            String::from_utf8_lossy(&id),
            section.name().unwrap_or("unknown"),
            section.data.len()
        );
        sections.modern_sections.push(section);
    }

    Ok(sections)
}

/// Reads a section prefixed with its u32 decompressed size.
fn read_sized_section(
    reader: &mut ByteReader<'_>,
    format: ReplayFormat,
    prefer_commands: bool,
    cancel: &CancelToken,
) -> Result<SectionData> {
    let declared = reader.read_u32()? as usize;
    if declared > MAX_SECTION_SIZE {
        return Err(ParserError::MalformedSection {
            reason: format!("section declares {declared} decompressed bytes"),
        });
    }
    read_standard(reader, format, Some(declared), prefer_commands, cancel)
}

/// Reads one standard section: checksum, chunk count, chunks.
///
/// Failed chunk decompressions leave a gap and are counted; the walk
/// itself stays aligned because chunk sizes are stored on disk. The
/// payload is truncated to the declared size when one is known.
fn read_standard(
    reader: &mut ByteReader<'_>,
    format: ReplayFormat,
    declared: Option<usize>,
    prefer_commands: bool,
    cancel: &CancelToken,
) -> Result<SectionData> {
    let _checksum = reader.read_u32()?;
    let chunk_count = reader.read_u32()?;
    if chunk_count > MAX_CHUNK_COUNT {
        return Err(ParserError::MalformedSection {
            reason: format!("section declares {chunk_count} chunks"),
        });
    }

    let mut data = Vec::with_capacity(declared.unwrap_or(0));
    let mut chunk_errors = 0u32;

    for index in 0..chunk_count {
        if cancel.is_cancelled() {
            return Err(ParserError::Cancelled);
        }
        let chunk_size = reader.read_u32()? as usize;
        let chunk = reader.read_bytes(chunk_size)?;

        match decompress::decompress_chunk(format, chunk, prefer_commands) {
            Ok(decompressed) => data.extend_from_slice(&decompressed),
            Err(e) => {
                warn!("chunk {index} of {chunk_count} failed to decompress: {e}");
                chunk_errors += 1;
            }
        }
    }

    // Truncation of the final chunk is permitted.
    if let Some(limit) = declared {
        if data.len() > limit {
            data.truncate(limit);
        }
    }

    Ok(SectionData { data, chunk_errors })
}

/// Decodes the PlayerNames section into 12 name overrides.
///
/// Remastered stores each name as a fixed 64-byte UTF-8 field; empty
/// fields leave the header name in force. A short or missing section
/// yields an empty list.
#[must_use]
pub fn decode_player_names(data: &[u8]) -> Vec<String> {
    if data.len() < PLAYER_NAMES_SIZE {
        return Vec::new();
    }
    data.chunks(PLAYER_NAME_ENTRY_SIZE)
        .take(12)
        .map(|entry| {
            let end = entry.iter().position(|&b| b == 0).unwrap_or(entry.len());
            decode_string(&entry[..end])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn zlib_compress(data: &[u8]) -> Vec<u8> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn push_standard_section(out: &mut Vec<u8>, chunks: &[&[u8]]) {
        out.extend_from_slice(&0u32.to_le_bytes()); // checksum, ignored
        out.extend_from_slice(&u32::try_from(chunks.len()).unwrap().to_le_bytes());
        for chunk in chunks {
            out.extend_from_slice(&u32::try_from(chunk.len()).unwrap().to_le_bytes());
            out.extend_from_slice(chunk);
        }
    }

    /// Builds a complete Modern file with the given section payloads.
    fn build_file(header_payload: &[u8], commands_payload: &[u8]) -> Vec<u8> {
        let mut file = vec![0u8; SECTIONS_OFFSET];
        file[crate::format::MAGIC_OFFSET..crate::format::MAGIC_OFFSET + 4]
            .copy_from_slice(b"reRS");

        push_standard_section(&mut file, &[&zlib_compress(b"reRS")]);
        push_standard_section(&mut file, &[&zlib_compress(header_payload)]);

        file.extend_from_slice(
            &u32::try_from(commands_payload.len()).unwrap().to_le_bytes(),
        );
        push_standard_section(&mut file, &[&zlib_compress(commands_payload)]);

        // Empty map data
        file.extend_from_slice(&0u32.to_le_bytes());
        push_standard_section(&mut file, &[]);

        file
    }

    #[test]
    fn test_read_sections_happy_path() {
        let header = vec![0x11u8; HEADER_SIZE];
        let commands = b"command bytes".to_vec();
        let file = build_file(&header, &commands);

        let sections =
            read_sections(&file, ReplayFormat::Modern, &CancelToken::new()).unwrap();

        assert_eq!(sections.replay_id, b"reRS");
        assert_eq!(sections.header, header);
        assert_eq!(sections.commands, commands);
        assert!(sections.map_data.is_empty());
        assert!(sections.section_errors.is_empty());
    }

    #[test]
    fn test_replay_id_magic_enforced() {
        let mut file = vec![0u8; SECTIONS_OFFSET];
        file[crate::format::MAGIC_OFFSET..crate::format::MAGIC_OFFSET + 4]
            .copy_from_slice(b"reRS");
        push_standard_section(&mut file, &[&zlib_compress(b"XXXX")]);

        let result = read_sections(&file, ReplayFormat::Modern, &CancelToken::new());
        assert!(matches!(result, Err(ParserError::InvalidMagic { .. })));
    }

    #[test]
    fn test_header_wrong_size_is_fatal() {
        let file = build_file(&[0x11u8; 100], b"");
        let result = read_sections(&file, ReplayFormat::Modern, &CancelToken::new());
        assert!(matches!(result, Err(ParserError::MalformedSection { .. })));
    }

    #[test]
    fn test_header_bad_chunks_fail_as_decompression() {
        let mut file = vec![0u8; SECTIONS_OFFSET];
        file[crate::format::MAGIC_OFFSET..crate::format::MAGIC_OFFSET + 4]
            .copy_from_slice(b"reRS");
        push_standard_section(&mut file, &[&zlib_compress(b"reRS")]);
        // A zlib-looking chunk that cannot decode
        let mut bad = vec![0x78, 0x9C];
        bad.extend_from_slice(&[0xFF; 32]);
        push_standard_section(&mut file, &[&bad]);

        let result = read_sections(&file, ReplayFormat::Modern, &CancelToken::new());
        assert!(matches!(
            result,
            Err(ParserError::DecompressionError { .. })
        ));
    }

    #[test]
    fn test_truncated_header_is_eof() {
        let full = build_file(&[0x11u8; HEADER_SIZE], b"");
        // Cut the file in the middle of the header section
        let cut = &full[..SECTIONS_OFFSET + 30];
        let result = read_sections(cut, ReplayFormat::Modern, &CancelToken::new());
        assert!(matches!(result, Err(ParserError::UnexpectedEof { .. })));
    }

    #[test]
    fn test_commands_failure_is_recoverable() {
        let mut file = vec![0u8; SECTIONS_OFFSET];
        file[crate::format::MAGIC_OFFSET..crate::format::MAGIC_OFFSET + 4]
            .copy_from_slice(b"reRS");
        push_standard_section(&mut file, &[&zlib_compress(b"reRS")]);
        push_standard_section(&mut file, &[&zlib_compress(&vec![0x22u8; HEADER_SIZE])]);
        // Commands section with an absurd declared size
        file.extend_from_slice(&u32::MAX.to_le_bytes());

        let sections =
            read_sections(&file, ReplayFormat::Modern, &CancelToken::new()).unwrap();
        assert_eq!(sections.header.len(), HEADER_SIZE);
        assert!(sections.commands.is_empty());
        assert_eq!(sections.section_errors.len(), 1);
    }

    #[test]
    fn test_modern121_intersection_length() {
        let mut file = vec![0u8; SECTIONS_OFFSET];
        file[crate::format::MAGIC_OFFSET..crate::format::MAGIC_OFFSET + 4]
            .copy_from_slice(b"seRS");
        push_standard_section(&mut file, &[&zlib_compress(b"seRS")]);
        push_standard_section(&mut file, &[&zlib_compress(&vec![0x33u8; HEADER_SIZE])]);
        // The extra length word 1.21+ inserts here
        file.extend_from_slice(&0xDEAD_BEEFu32.to_le_bytes());
        let commands = b"cmds".to_vec();
        file.extend_from_slice(&u32::try_from(commands.len()).unwrap().to_le_bytes());
        push_standard_section(&mut file, &[&zlib_compress(&commands)]);
        file.extend_from_slice(&0u32.to_le_bytes());
        push_standard_section(&mut file, &[]);

        let sections =
            read_sections(&file, ReplayFormat::Modern121, &CancelToken::new()).unwrap();
        assert_eq!(sections.commands, commands);
    }

    #[test]
    fn test_modern_trailing_sections() {
        let mut file = build_file(&[0x11u8; HEADER_SIZE], b"");
        // PlayerNames section
        let names = vec![0u8; PLAYER_NAMES_SIZE];
        push_standard_section(&mut file, &[&zlib_compress(&names)]);
        // A known modern section, compressed
        let limits = zlib_compress(&[0x07u8; 0x1C]);
        file.extend_from_slice(b"LMTS");
        file.extend_from_slice(&u32::try_from(limits.len()).unwrap().to_le_bytes());
        file.extend_from_slice(&limits);
        // An unknown modern section kept raw
        file.extend_from_slice(b"WHAT");
        file.extend_from_slice(&3u32.to_le_bytes());
        file.extend_from_slice(&[9, 9, 9]);

        let sections =
            read_sections(&file, ReplayFormat::Modern, &CancelToken::new()).unwrap();

        assert_eq!(sections.player_names.len(), PLAYER_NAMES_SIZE);
        assert_eq!(sections.modern_sections.len(), 2);
        assert_eq!(sections.modern_sections[0].id, *b"LMTS");
        assert_eq!(sections.modern_sections[0].name(), Some("limits"));
        assert_eq!(sections.modern_sections[0].data, vec![0x07u8; 0x1C]);
        assert_eq!(sections.modern_sections[0].expected_size(), Some(0x1C));
        assert_eq!(sections.modern_sections[1].id, *b"WHAT");
        assert_eq!(sections.modern_sections[1].name(), None);
        assert_eq!(sections.modern_sections[1].data, vec![9, 9, 9]);
    }

    #[test]
    fn test_cancellation_between_chunks() {
        let file = build_file(&[0x11u8; HEADER_SIZE], b"data");
        let token = CancelToken::new();
        token.cancel();
        let result = read_sections(&file, ReplayFormat::Modern, &token);
        assert!(matches!(result, Err(ParserError::Cancelled)));
    }

    #[test]
    fn test_decode_player_names() {
        let mut data = vec![0u8; PLAYER_NAMES_SIZE];
        data[..5].copy_from_slice(b"Probe");
        data[PLAYER_NAME_ENTRY_SIZE..PLAYER_NAME_ENTRY_SIZE + 4].copy_from_slice(b"Ling");

        let names = decode_player_names(&data);
        assert_eq!(names.len(), 12);
        assert_eq!(names[0], "Probe");
        assert_eq!(names[1], "Ling");
        assert_eq!(names[2], "");

        assert!(decode_player_names(&[0u8; 10]).is_empty());
    }
}
