//! Command parsing for Brood War replay files.
//!
//! The decompressed commands section is a frame-synchronized stream of
//! player commands. Each command carries the issuing player's slot id,
//! a one-byte opcode, and an opcode-specific body.
//!
//! # Overview
//!
//! - [`opcodes`] - opcode constants, names, and per-format body lengths
//! - [`types`] - the [`Command`] struct and [`CommandKind`] tagged enum
//! - [`parser`] - the [`CommandParser`] state machine over a section
//!
//! # Framing
//!
//! Two framings exist in the wild and the parser tolerates both:
//!
//! - **Block framing**: `u32` frame, `u8` block size, then that many
//!   bytes of contiguous commands.
//! - **Inline framing**: sync markers 0x00/0x01/0x02 advance the frame
//!   counter and commands follow directly, with no size prefix.
//!
//! # Example
//!
//! ```
//! use bwrep_parser::commands::CommandParser;
//! use bwrep_parser::format::ReplayFormat;
//!
//! // One block at frame 100 holding a single Stop command by player 1
//! let section = [100, 0, 0, 0, 3, 1, 0x10, 0xFF];
//! let mut parser = CommandParser::new(&section, ReplayFormat::Modern);
//! let commands = parser.parse_all();
//!
//! assert_eq!(commands.len(), 1);
//! assert_eq!(commands[0].frame.get(), 100);
//! assert_eq!(commands[0].player_id, 1);
//! ```

pub mod opcodes;
pub mod parser;
pub mod types;

pub use opcodes::{body_len, is_known_opcode, opcode_name, BodyLen};
pub use parser::CommandParser;
pub use types::{Command, CommandKind, HotkeyKind, IneffKind, SelectKind};
