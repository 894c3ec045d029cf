//! The parse pipeline and its aggregate result.
//!
//! [`parse`] is the crate's primary operation: one pass over an
//! immutable byte buffer producing a [`ParsedReplay`] or a fatal error.
//! The pipeline runs format detection, section decoding, header
//! parsing, command parsing, effectiveness classification, and the
//! derived analyses, in that order.
//!
//! When the structured parse yields no commands, two bounded fallback
//! scans run: first a sweep for zlib streams anywhere in the body,
//! then a last-ditch sweep for plausible command byte patterns.
//!
//! The pipeline never panics across the public boundary: callers see
//! either a fatal [`ParserError`] or a result with honest
//! `parse_errors` and `reliability` fields.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, info, warn};
use serde::Serialize;

use crate::build_order::{extract_build_orders, PlayerBuildOrder};
use crate::commands::{opcodes, parser, Command, CommandKind, CommandParser};
use crate::decompress::{validate_command_stream, zlib};
use crate::effectiveness::{classify, compute_metrics, PlayerMetrics};
use crate::error::{ParserError, Result};
use crate::format::{detect_format, ReplayFormat, SECTIONS_OFFSET};
use crate::frame::Frame;
use crate::header::ReplayHeader;
use crate::sections::{decode_player_names, read_sections, ModernSection};

/// Minimum viable replay size in bytes.
pub const MIN_REPLAY_SIZE: usize = 1000;

/// Budget for the zlib-magic fallback sweep.
pub const MAX_ZLIB_SCAN_ATTEMPTS: usize = 256;

/// Budget for the raw command-context fallback sweep.
pub const MAX_RAW_SCAN_COMMANDS: usize = 10_000;

/// Coordinate bound used by the raw sweep's build plausibility check.
const RAW_SCAN_MAX_COORD: u16 = 2048;

/// A cooperative cancellation token.
///
/// The pipeline checks the token between sections and between chunks; a
/// fired token makes [`parse_with`] return [`ParserError::Cancelled`]
/// with no partial result.
///
/// # Example
///
/// ```
/// use bwrep_parser::replay::CancelToken;
///
/// let token = CancelToken::new();
/// let handle = token.clone();
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token in the not-cancelled state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Safe to call from another thread.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Returns whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// How much to trust a parse result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Reliability {
    /// Nothing was lost or recovered.
    Poor,
    /// Heavy recovery; treat derived numbers as rough.
    Fair,
    /// Minor recovery along the way.
    Good,
    /// Clean parse of a normal-looking game.
    Excellent,
}

impl Reliability {
    /// Grades a parse from its recovery counters and stream shape.
    #[must_use]
    pub fn grade(
        parse_errors: u32,
        commands: usize,
        efficiency: f64,
        commands_per_minute: f64,
        player_count: usize,
    ) -> Self {
        if commands == 0 {
            return Reliability::Poor;
        }
        #[allow(clippy::cast_precision_loss)]
        let error_ratio = f64::from(parse_errors) / commands as f64;

        if parse_errors == 0
            && player_count >= 2
            && commands_per_minute >= 30.0
            && efficiency >= 40.0
        {
            Reliability::Excellent
        } else if error_ratio < 0.02 && commands_per_minute >= 10.0 {
            Reliability::Good
        } else if error_ratio < 0.10 {
            Reliability::Fair
        } else {
            Reliability::Poor
        }
    }
}

/// One chat line, resolved against the player roster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    /// Frame the message was sent on.
    pub frame: Frame,
    /// The frame rendered as a time string.
    pub time: String,
    /// Slot id of the sender.
    pub sender_id: u8,
    /// Sender name, when the slot id maps to a player.
    pub sender_name: Option<String>,
    /// The message text.
    pub message: String,
}

/// The complete result of parsing one replay.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedReplay {
    /// The detected format generation.
    pub format: ReplayFormat,
    /// The decoded header.
    pub header: ReplayHeader,
    /// All commands, ordered by frame then in-frame order.
    pub commands: Vec<Command>,
    /// Per-player APM/EAPM metrics.
    pub metrics: Vec<PlayerMetrics>,
    /// Per-player build orders.
    pub build_orders: Vec<PlayerBuildOrder>,
    /// The chat log.
    pub chat: Vec<ChatMessage>,
    /// Unknown-opcode commands kept for diagnostics.
    pub unknown_commands: Vec<Command>,
    /// Trailing modern sections.
    pub modern_sections: Vec<ModernSection>,
    /// Recovered errors across sections and commands.
    pub parse_errors: u32,
    /// Overall confidence in the result.
    pub reliability: Reliability,
    /// The decompressed map data section, kept raw.
    #[serde(skip)]
    pub map_data: Vec<u8>,
}

impl ParsedReplay {
    /// Returns the metrics entry for a player id, if present.
    #[must_use]
    pub fn metrics_for(&self, player_id: u8) -> Option<&PlayerMetrics> {
        self.metrics.iter().find(|m| m.player_id == player_id)
    }

    /// Returns the build order for a player id, if present.
    #[must_use]
    pub fn build_order_for(&self, player_id: u8) -> Option<&PlayerBuildOrder> {
        self.build_orders.iter().find(|b| b.player_id == player_id)
    }
}

/// Parses a replay from its raw bytes.
///
/// # Errors
///
/// - [`ParserError::TooSmall`] for inputs under [`MIN_REPLAY_SIZE`]
/// - [`ParserError::InvalidMagic`] when the replay magic is absent
/// - [`ParserError::UnexpectedEof`] when the header is truncated
/// - [`ParserError::DecompressionError`] when the header section cannot
///   be decoded
/// - [`ParserError::MalformedSection`] when the header section is
///   structurally wrong
pub fn parse(data: &[u8]) -> Result<ParsedReplay> {
    parse_with(data, &CancelToken::new())
}

/// Parses a replay with cooperative cancellation.
///
/// # Errors
///
/// As [`parse`], plus [`ParserError::Cancelled`] when the token fires.
pub fn parse_with(data: &[u8], cancel: &CancelToken) -> Result<ParsedReplay> {
    if data.len() < MIN_REPLAY_SIZE {
        return Err(ParserError::too_small(data.len(), MIN_REPLAY_SIZE));
    }

    let format = detect_format(data)?;
    debug!("detected format {format:?}");

    let sections = read_sections(data, format, cancel)?;
    let mut header = ReplayHeader::parse(&sections.header)?;

    // Remastered keeps long UTF-8 names in their own section; they win
    // over the header's truncated fields.
    let overrides = decode_player_names(&sections.player_names);
    for (slot, name) in header.player_slots.iter_mut().zip(overrides) {
        if !name.is_empty() {
            slot.name = name;
        }
    }

    if cancel.is_cancelled() {
        return Err(ParserError::Cancelled);
    }

    let mut command_parser = CommandParser::new(&sections.commands, format);
    let mut commands = command_parser.parse_all();
    let mut parse_errors =
        command_parser.parse_errors() + u32::try_from(sections.section_errors.len()).unwrap_or(0);
    let unknown_commands = command_parser.unknown_commands().to_vec();

    if commands.is_empty() {
        info!("structured parse found no commands, starting fallback scans");
        if let Some(stream) = scan_for_zlib_streams(data) {
            let mut fallback_parser = CommandParser::new(&stream, format);
            commands = fallback_parser.parse_all();
            parse_errors += fallback_parser.parse_errors();
        }
    }
    if commands.is_empty() {
        commands = scan_for_raw_commands(data, format);
        if !commands.is_empty() {
            parse_errors += 1;
        }
    }

    // A command must come from a present slot or it is discarded.
    let before = commands.len();
    commands.retain(|c| header.slot_for_player(c.player_id).is_some());
    if commands.len() != before {
        debug!("discarded {} commands from absent slots", before - commands.len());
    }

    classify(&mut commands);

    let players = header.players();
    let roster: Vec<(u8, String)> = players.iter().map(|p| (p.id, p.name.clone())).collect();
    let races: Vec<(u8, crate::header::Race)> = players.iter().map(|p| (p.id, p.race)).collect();

    let metrics = compute_metrics(&commands, &roster, header.frames);
    let build_orders = extract_build_orders(&commands, &races);
    let chat = collect_chat(&commands, &header);

    let minutes = header.frames.to_minutes();
    #[allow(clippy::cast_precision_loss)]
    let commands_per_minute = if minutes > 0.0 {
        commands.len() as f64 / minutes
    } else {
        0.0
    };
    let mean_efficiency = if metrics.is_empty() {
        0.0
    } else {
        #[allow(clippy::cast_precision_loss)]
        let sum: f64 = metrics.iter().map(|m| m.efficiency).sum();
        sum / metrics.len() as f64
    };
    let mut reliability = Reliability::grade(
        parse_errors,
        commands.len(),
        mean_efficiency,
        commands_per_minute,
        roster.len(),
    );
    if !sections.section_errors.is_empty() {
        // Lost sections cap the grade no matter how clean the rest is.
        reliability = reliability.min(Reliability::Fair);
        warn!(
            "parse degraded by section errors: {:?}",
            sections.section_errors
        );
    }

    Ok(ParsedReplay {
        format,
        header,
        commands,
        metrics,
        build_orders,
        chat,
        unknown_commands,
        modern_sections: sections.modern_sections,
        parse_errors,
        reliability,
        map_data: sections.map_data,
    })
}

/// Collects chat commands into a resolved chat log.
fn collect_chat(commands: &[Command], header: &ReplayHeader) -> Vec<ChatMessage> {
    commands
        .iter()
        .filter_map(|cmd| match &cmd.kind {
            CommandKind::Chat { sender, message } => Some(ChatMessage {
                frame: cmd.frame,
                time: cmd.frame.time_string(),
                sender_id: *sender,
                sender_name: header.slot_for_player(*sender).map(|s| s.name.clone()),
                message: message.clone(),
            }),
            _ => None,
        })
        .collect()
}

/// Sweeps the file body for zlib streams that decode to something
/// shaped like a command stream, returning the best-scoring one.
fn scan_for_zlib_streams(data: &[u8]) -> Option<Vec<u8>> {
    let mut attempts = 0usize;
    let mut best: Option<(f64, Vec<u8>)> = None;

    for offset in SECTIONS_OFFSET..data.len().saturating_sub(2) {
        if !zlib::is_zlib_header(&data[offset..]) {
            continue;
        }
        attempts += 1;
        if attempts > MAX_ZLIB_SCAN_ATTEMPTS {
            break;
        }
        let Ok(stream) = zlib::inflate_chunk(&data[offset..], false) else {
            continue;
        };
        if let Some(score) = validate_command_stream(&stream) {
            debug!(
                "fallback stream at offset {offset}: {} bytes, score {:.2}",
                stream.len(),
                score.score
            );
            if best.as_ref().map_or(true, |(s, _)| score.score > *s) {
                best = Some((score.score, stream));
            }
        }
    }

    best.map(|(_, stream)| stream)
}

/// Last-ditch sweep for bare command byte patterns.
///
/// Only production commands are collected (they are what downstream
/// analyses need most), and a Build must carry plausible coordinates.
/// Frames are unknown in this mode and stay at zero.
fn scan_for_raw_commands(data: &[u8], format: ReplayFormat) -> Vec<Command> {
    let mut commands = Vec::new();
    let mut offset = SECTIONS_OFFSET;

    while offset + 1 < data.len() && commands.len() < MAX_RAW_SCAN_COMMANDS {
        let player = data[offset];
        let opcode = data[offset + 1];
        if player <= 11 && is_production_opcode(opcode) {
            if let Some((cmd, consumed)) = parser::parse_one(&data[offset..], format) {
                if raw_command_plausible(&cmd) {
                    commands.push(cmd);
                    offset += consumed;
                    continue;
                }
            }
        }
        offset += 1;
    }

    if !commands.is_empty() {
        warn!(
            "raw scan assembled {} best-effort commands with no frame data",
            commands.len()
        );
    }
    commands
}

fn is_production_opcode(opcode: u8) -> bool {
    matches!(
        opcode,
        opcodes::BUILD
            | opcodes::TRAIN
            | opcodes::TRAIN_UNIT
            | opcodes::UNIT_MORPH
            | opcodes::BUILDING_MORPH
            | opcodes::RESEARCH
            | opcodes::UPGRADE
    )
}

fn raw_command_plausible(cmd: &Command) -> bool {
    match &cmd.kind {
        CommandKind::Build { x, y, unit, .. } => {
            *x < RAW_SCAN_MAX_COORD
                && *y < RAW_SCAN_MAX_COORD
                && usize::from(*unit) < crate::data::UNIT_NAMES.len()
        }
        CommandKind::Train { unit }
        | CommandKind::UnitMorph { unit }
        | CommandKind::BuildingMorph { unit } => {
            usize::from(*unit) < crate::data::UNIT_NAMES.len()
        }
        _ => true,
    }
}
