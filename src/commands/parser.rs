//! The command-stream state machine.
//!
//! [`CommandParser`] walks a decompressed commands section and produces
//! the ordered command list. It understands both framings found in real
//! replays:
//!
//! - **Block framing**: `u32` frame, `u8` block size, then that many
//!   bytes of commands. Attempted first at every step.
//! - **Inline framing**: sync markers 0x00 (advance one frame), 0x01
//!   (advance by the next u8) and 0x02 (advance by the next u16)
//!   interleaved with bare commands. Used whenever the block header at
//!   the cursor is implausible.
//!
//! Malformed commands never abort the parse: they are counted, logged,
//! and skipped. Ten consecutive unrecognized opcodes end the section,
//! on the theory that the stream has desynchronized beyond repair.

use log::{debug, warn};

use super::opcodes::{self, body_len, BodyLen};
use super::types::{Command, CommandKind, HotkeyKind, SelectKind};
use crate::binary::{decode_string, ByteReader};
use crate::error::Result;
use crate::format::ReplayFormat;
use crate::frame::Frame;

/// Abort the section after this many consecutive unknown opcodes.
pub const MAX_CONSECUTIVE_UNKNOWN: u32 = 10;

/// Bytes consumed (at most) while skipping an unknown opcode's body.
pub const UNKNOWN_SKIP_LEN: usize = 4;

/// Largest plausible frame jump between consecutive blocks.
const MAX_FRAME_JUMP: u32 = 10_000_000;

/// Highest valid player slot id in a command.
const MAX_PLAYER_ID: u8 = 11;

/// A state machine over one decompressed commands section.
///
/// # Example
///
/// ```
/// use bwrep_parser::commands::CommandParser;
/// use bwrep_parser::format::ReplayFormat;
///
/// // Frame 100, 3-byte block: player 1 issues Stop (body 0xFF)
/// let section = [100, 0, 0, 0, 3, 1, 0x10, 0xFF];
/// let mut parser = CommandParser::new(&section, ReplayFormat::Modern);
/// let commands = parser.parse_all();
/// assert_eq!(commands.len(), 1);
/// assert_eq!(parser.parse_errors(), 0);
/// ```
pub struct CommandParser<'a> {
    data: &'a [u8],
    pos: usize,
    format: ReplayFormat,
    frame: u32,
    parse_errors: u32,
    consecutive_unknown: u32,
    unknowns: Vec<Command>,
    finished: bool,
}

impl<'a> CommandParser<'a> {
    /// Creates a parser over a decompressed commands section.
    #[must_use]
    pub fn new(data: &'a [u8], format: ReplayFormat) -> Self {
        Self {
            data,
            pos: 0,
            format,
            frame: 0,
            parse_errors: 0,
            consecutive_unknown: 0,
            unknowns: Vec::new(),
            finished: false,
        }
    }

    /// Returns the number of malformed or unknown commands recovered
    /// from so far.
    #[must_use]
    pub fn parse_errors(&self) -> u32 {
        self.parse_errors
    }

    /// Returns the frame counter at the current position.
    #[must_use]
    pub fn current_frame(&self) -> u32 {
        self.frame
    }

    /// Returns the unknown-opcode commands recorded for diagnostics.
    ///
    /// These never enter the main command list; their raw bytes are in
    /// [`CommandKind::Unknown`].
    #[must_use]
    pub fn unknown_commands(&self) -> &[Command] {
        &self.unknowns
    }

    /// Parses the whole section, returning the ordered command list.
    ///
    /// Frames are guaranteed non-decreasing in the output.
    pub fn parse_all(&mut self) -> Vec<Command> {
        let mut commands = Vec::new();

        while !self.finished && self.pos < self.data.len() {
            if let Some((block_frame, block_end)) = self.plausible_block() {
                self.frame = block_frame;
                self.pos += 5;
                self.parse_block(block_end, &mut commands);
            } else {
                self.step_inline(&mut commands);
            }
        }

        commands
    }

    /// Checks whether the bytes at the cursor form a plausible frame
    /// block header, returning the block's frame and end offset.
    ///
    /// A header is plausible when the declared size stays inside the
    /// section, the size is nonzero, and the frame does not run
    /// backwards or jump absurdly far forwards.
    fn plausible_block(&self) -> Option<(u32, usize)> {
        if self.data.len() - self.pos < 5 {
            return None;
        }
        let d = &self.data[self.pos..];
        let frame = u32::from_le_bytes([d[0], d[1], d[2], d[3]]);
        let size = d[4] as usize;

        if size == 0 {
            return None;
        }
        let block_end = self.pos + 5 + size;
        if block_end > self.data.len() {
            return None;
        }
        if frame < self.frame || frame - self.frame > MAX_FRAME_JUMP {
            return None;
        }
        Some((frame, block_end))
    }

    /// Parses the commands of one block; a malformed command abandons
    /// the rest of the block.
    fn parse_block(&mut self, block_end: usize, commands: &mut Vec<Command>) {
        while self.pos < block_end && !self.finished {
            match self.parse_command(block_end) {
                StepResult::Command(cmd) => commands.push(cmd),
                StepResult::Recorded => {}
                StepResult::Malformed => {
                    warn!(
                        "malformed command at offset {} in block ending {block_end}, skipping block remainder",
                        self.pos
                    );
                    self.parse_errors += 1;
                    self.pos = block_end;
                }
            }
        }
        // A well-formed block consumes itself exactly; anything else was
        // already counted above.
        self.pos = self.pos.max(block_end);
    }

    /// One step of the inline framing: a sync marker or a bare command.
    fn step_inline(&mut self, commands: &mut Vec<Command>) {
        match self.data[self.pos] {
            0x00 => {
                self.frame += 1;
                self.pos += 1;
            }
            0x01 => {
                if self.pos + 1 < self.data.len() {
                    self.frame += u32::from(self.data[self.pos + 1]);
                    self.pos += 2;
                } else {
                    self.pos = self.data.len();
                }
            }
            0x02 => {
                if self.pos + 2 < self.data.len() {
                    let lo = self.data[self.pos + 1];
                    let hi = self.data[self.pos + 2];
                    self.frame += u32::from(u16::from_le_bytes([lo, hi]));
                    self.pos += 3;
                } else {
                    self.pos = self.data.len();
                }
            }
            player if player > MAX_PLAYER_ID => {
                // Not a slot id: the stream is desynchronized here.
                self.note_unrecognized(&[player]);
                self.pos += 1;
            }
            _ => match self.parse_command(self.data.len()) {
                StepResult::Command(cmd) => commands.push(cmd),
                StepResult::Recorded => {}
                StepResult::Malformed => {
                    warn!(
                        "malformed command at stream offset {}, ending section",
                        self.pos
                    );
                    self.parse_errors += 1;
                    self.pos = self.data.len();
                }
            },
        }
    }

    /// Parses one `player_id, opcode, body` command ending no later than
    /// `bounds`.
    fn parse_command(&mut self, bounds: usize) -> StepResult {
        let mut reader = match ByteReader::at(&self.data[..bounds], self.pos) {
            Ok(reader) => reader,
            Err(_) => return StepResult::Malformed,
        };

        let Ok(player_id) = reader.read_u8() else {
            return StepResult::Malformed;
        };
        let Ok(opcode) = reader.read_u8() else {
            return StepResult::Malformed;
        };

        if body_len(opcode, self.format).is_none() {
            return self.record_unknown(player_id, opcode, bounds);
        }

        match self.decode_body(&mut reader, opcode) {
            Ok(kind) => {
                self.pos = reader.pos();
                self.consecutive_unknown = 0;
                StepResult::Command(Command::new(Frame::new(self.frame), player_id, opcode, kind))
            }
            Err(_) => StepResult::Malformed,
        }
    }

    /// Records an unknown opcode, consuming up to [`UNKNOWN_SKIP_LEN`]
    /// body bytes, and aborts the section after too many in a row.
    fn record_unknown(&mut self, player_id: u8, opcode: u8, bounds: usize) -> StepResult {
        let body_start = self.pos + 2;
        let body_end = (body_start + UNKNOWN_SKIP_LEN).min(bounds);
        let raw = self.data[body_start..body_end].to_vec();

        debug!(
            "unknown opcode 0x{opcode:02X} from player {player_id} at offset {}, skipping {} bytes",
            self.pos,
            raw.len()
        );

        self.unknowns.push(Command::new(
            Frame::new(self.frame),
            player_id,
            opcode,
            CommandKind::Unknown { raw },
        ));
        self.pos = body_end;
        self.note_unrecognized(&[opcode]);
        StepResult::Recorded
    }

    /// Counts a desynchronization byte and enforces the abort threshold.
    fn note_unrecognized(&mut self, bytes: &[u8]) {
        self.parse_errors += 1;
        self.consecutive_unknown += 1;
        if self.consecutive_unknown >= MAX_CONSECUTIVE_UNKNOWN {
            warn!(
                "{MAX_CONSECUTIVE_UNKNOWN} consecutive unknown opcodes (last {bytes:02X?}), ending section"
            );
            self.finished = true;
        }
    }

    /// Decodes the body of a known opcode.
    fn decode_body(&self, reader: &mut ByteReader<'_>, opcode: u8) -> Result<CommandKind> {
        use opcodes::{
            ATTACK_MOVE, BUILD, BUILDING_MORPH, CANCEL_CONSTRUCTION, CANCEL_MORPH, CANCEL_TRAIN,
            CHAT, CHAT_MESSAGE_LEN, HOTKEY, LEAVE_GAME, LIFT_OFF, RESEARCH, RIGHT_CLICK, SELECT,
            SHIFT_DESELECT, SHIFT_SELECT, SYNC, TARGETED_ORDER, TRAIN, TRAIN_UNIT, UNIT_MORPH,
            UNLOAD, UNLOAD_ALL_AT, UNLOAD_ALT, UPGRADE, VISION,
        };

        let kind = match opcode {
            SELECT | SHIFT_SELECT | SHIFT_DESELECT => {
                let kind = match opcode {
                    SELECT => SelectKind::Select,
                    SHIFT_SELECT => SelectKind::ShiftSelect,
                    _ => SelectKind::ShiftDeselect,
                };
                let count = reader.read_u8()?;
                let mut tags = Vec::with_capacity(usize::from(count));
                for _ in 0..count {
                    tags.push(reader.read_u16()?);
                    if self.format.has_extended_selections() {
                        reader.skip(2)?;
                    }
                }
                CommandKind::Select { kind, tags }
            }
            BUILD => CommandKind::Build {
                order: reader.read_u8()?,
                x: reader.read_u16()?,
                y: reader.read_u16()?,
                unit: reader.read_u16()?,
            },
            VISION => CommandKind::Vision {
                mask: reader.read_u16()?,
            },
            CANCEL_CONSTRUCTION => CommandKind::CancelConstruction {
                tag: reader.read_u32()?,
            },
            CANCEL_MORPH => CommandKind::CancelMorph {
                tag: reader.read_u16()?,
            },
            ATTACK_MOVE => {
                let x = reader.read_u16()?;
                let y = reader.read_u16()?;
                let unit_tag = reader.read_u16()?;
                let target_unit = reader.read_u16()?;
                let order = reader.read_u8()?;
                CommandKind::TargetedOrder {
                    x,
                    y,
                    unit_tag,
                    target_unit,
                    order,
                    queued: false,
                }
            }
            RIGHT_CLICK | TARGETED_ORDER => {
                let x = reader.read_u16()?;
                let y = reader.read_u16()?;
                let unit_tag = reader.read_u16()?;
                if self.format.has_extended_orders() {
                    let pad = reader.read_u16()?;
                    if pad != 0 {
                        debug!("nonzero pad word 0x{pad:04X} in ordered command");
                    }
                }
                let target_unit = reader.read_u16()?;
                let last = reader.read_u8()?;
                if opcode == RIGHT_CLICK {
                    // Right clicks carry no order id; the engine derives
                    // one from the target. The trailing byte is queued.
                    CommandKind::TargetedOrder {
                        x,
                        y,
                        unit_tag,
                        target_unit,
                        order: 0,
                        queued: last != 0,
                    }
                } else {
                    CommandKind::TargetedOrder {
                        x,
                        y,
                        unit_tag,
                        target_unit,
                        order: last,
                        queued: false,
                    }
                }
            }
            TRAIN | TRAIN_UNIT => CommandKind::Train {
                unit: reader.read_u16()?,
            },
            CANCEL_TRAIN => CommandKind::CancelTrain {
                tag: reader.read_u16()?,
            },
            UNIT_MORPH => CommandKind::UnitMorph {
                unit: reader.read_u16()?,
            },
            BUILDING_MORPH => CommandKind::BuildingMorph {
                unit: reader.read_u16()?,
            },
            HOTKEY => CommandKind::Hotkey {
                kind: HotkeyKind::from_byte(reader.read_u8()?),
                group: reader.read_u8()?,
            },
            CHAT => {
                let sender = reader.read_u8()?;
                let raw = reader.read_bytes(CHAT_MESSAGE_LEN)?;
                let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
                CommandKind::Chat {
                    sender,
                    message: decode_string(&raw[..end]),
                }
            }
            RESEARCH => CommandKind::Research {
                tech: reader.read_u8()?,
            },
            UPGRADE => CommandKind::Upgrade {
                upgrade: reader.read_u8()?,
            },
            LIFT_OFF => CommandKind::LiftOff {
                x: reader.read_u16()?,
                y: reader.read_u16()?,
            },
            UNLOAD | UNLOAD_ALT | UNLOAD_ALL_AT => CommandKind::Unload {
                tag: reader.read_u16()?,
            },
            SYNC => {
                let raw = reader.read_bytes(6)?;
                let mut data = [0u8; 6];
                data.copy_from_slice(raw);
                CommandKind::Sync { data }
            }
            LEAVE_GAME => CommandKind::LeaveGame {
                reason: reader.read_u8()?,
            },
            _ => {
                // Remaining opcodes are parameterless at the model level
                // but still consume their declared bodies.
                if let Some(BodyLen::Fixed(n)) = body_len(opcode, self.format) {
                    reader.skip(n)?;
                }
                CommandKind::Simple
            }
        };

        Ok(kind)
    }
}

/// Parses a single command at the start of `data`, for the raw-scan
/// fallback. Returns the command (at frame 0) and the bytes consumed.
pub(crate) fn parse_one(data: &[u8], format: ReplayFormat) -> Option<(Command, usize)> {
    let mut parser = CommandParser::new(data, format);
    match parser.parse_command(data.len()) {
        StepResult::Command(cmd) => Some((cmd, parser.pos)),
        StepResult::Recorded | StepResult::Malformed => None,
    }
}

/// Outcome of one parse step.
enum StepResult {
    /// A command for the main list.
    Command(Command),
    /// An unknown opcode, recorded on the diagnostics list.
    Recorded,
    /// The bytes at the cursor do not decode; recovery is contextual.
    Malformed,
}
