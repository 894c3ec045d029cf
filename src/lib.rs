//! # bwrep-parser
//!
//! A comprehensive StarCraft: Brood War replay (.rep) parser library.
//!
//! This library decodes replays across all three format generations:
//! - **Legacy** (pre-1.18) with PKWARE "explode" compression
//! - **Modern** (1.18–1.20) with zlib compression
//! - **Modern121** (1.21+/Remastered) with enlarged command bodies and
//!   trailing metadata sections
//!
//! and analyzes the command stream into per-player APM/EAPM metrics,
//! build orders, and a chat log.
//!
//! ## Quick Start
//!
//! ```no_run
//! use bwrep_parser::error::Result;
//!
//! fn analyze(data: &[u8]) -> Result<()> {
//!     let replay = bwrep_parser::parse(data)?;
//!
//!     println!("Map: {}", replay.header.map_name);
//!     println!("Duration: {}", replay.header.duration_string());
//!     for metrics in &replay.metrics {
//!         println!(
//!             "{}: {:.0} APM / {:.0} EAPM",
//!             metrics.name, metrics.apm, metrics.eapm
//!         );
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! - [`error`] - Error types and result alias for parser operations
//! - [`binary`] - Bounds-checked cursor over replay bytes
//! - [`format`] - Format-generation detection
//! - [`frame`] - Game-time frames and time strings
//! - [`decompress`] - Zlib and PKWARE chunk decompression
//! - [`sections`] - Section-based container parsing
//! - [`header`] - The 0x279-byte header and player slots
//! - [`commands`] - The frame-synchronized command stream
//! - [`data`] - Unit, technology and upgrade tables
//! - [`effectiveness`] - EAPM classification and player metrics
//! - [`build_order`] - Build-order timelines
//! - [`replay`] - The `parse` pipeline and its result
//!
//! ## Format Reference
//!
//! A replay is a 16-byte prefix (magic `reRS`/`seRS` at offset 0x0C)
//! followed by five standard sections (ReplayID, Header, Commands,
//! MapData, PlayerNames), each stored as independently compressed
//! chunks, then optional Remastered metadata sections. All multi-byte
//! integers are little-endian.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod binary;
pub mod build_order;
pub mod commands;
pub mod data;
pub mod decompress;
pub mod effectiveness;
pub mod error;
pub mod format;
pub mod frame;
pub mod header;
pub mod replay;
pub mod sections;

// Re-export commonly used types at the crate root
pub use build_order::{BuildAction, BuildOrderItem, PlayerBuildOrder};
pub use commands::{Command, CommandKind, CommandParser, HotkeyKind, IneffKind, SelectKind};
pub use effectiveness::{CommandCounts, PlayerMetrics};
pub use error::{ParserError, Result};
pub use format::{detect_format, is_replay_magic, ReplayFormat};
pub use frame::Frame;
pub use header::{GameSpeed, GameType, PlayerSlot, PlayerType, Race, ReplayHeader};
pub use replay::{parse, parse_with, CancelToken, ChatMessage, ParsedReplay, Reliability};
pub use sections::ModernSection;
