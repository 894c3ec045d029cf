//! Core command types and structures.
//!
//! This module defines the [`Command`] struct and the [`CommandKind`]
//! tagged enum with one arm per command family. Unknown opcodes keep
//! their raw bytes for diagnostics and forward compatibility.

use serde::Serialize;
use std::fmt;

use super::opcodes;
use crate::frame::Frame;

/// The build order id that means "land the building here".
pub const ORDER_BUILDING_LAND: u8 = 36;

/// A parsed player command.
///
/// Each command carries the frame it was issued on, the issuing
/// player's slot id, the raw opcode, the decoded parameters, and the
/// effectiveness verdict assigned by the classifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Command {
    /// Frame the command was issued on.
    pub frame: Frame,

    /// Slot id of the issuing player (0–11).
    pub player_id: u8,

    /// Raw opcode byte.
    pub opcode: u8,

    /// Decoded opcode-specific parameters.
    pub kind: CommandKind,

    /// Whether the classifier judged this command effective.
    pub effective: bool,

    /// The ineffectiveness kind assigned by the classifier.
    pub ineff_kind: IneffKind,
}

impl Command {
    /// Creates a command with the effectiveness verdict still unset
    /// (commands start effective; the classifier downgrades them).
    #[must_use]
    pub fn new(frame: Frame, player_id: u8, opcode: u8, kind: CommandKind) -> Self {
        Self {
            frame,
            player_id,
            opcode,
            kind,
            effective: true,
            ineff_kind: IneffKind::Effective,
        }
    }

    /// Returns the human-readable name of this command.
    ///
    /// Build commands carrying the landing order report "Land" instead
    /// of "Build".
    #[must_use]
    pub fn name(&self) -> &'static str {
        if let CommandKind::Build { order, .. } = self.kind {
            if order == ORDER_BUILDING_LAND {
                return "Land";
            }
        }
        opcodes::opcode_name(self.opcode)
    }

    /// Returns whether this is a network sync marker rather than a
    /// player action.
    #[must_use]
    pub fn is_sync(&self) -> bool {
        self.opcode == opcodes::SYNC
    }

    /// Returns whether this command counts toward APM.
    ///
    /// All non-sync commands count, including ones later classified as
    /// ineffective.
    #[must_use]
    pub fn counts_for_apm(&self) -> bool {
        !self.is_sync()
    }

    /// Returns whether this is a selection command (0x09/0x0A), the
    /// pair the fast-reselection rule watches.
    #[must_use]
    pub fn is_reselection_candidate(&self) -> bool {
        matches!(self.opcode, opcodes::SELECT | opcodes::SHIFT_SELECT)
    }

    /// Returns whether this command has the same opcode and parameters
    /// as another, ignoring frame and verdict.
    #[must_use]
    pub fn same_action(&self, other: &Command) -> bool {
        self.opcode == other.opcode && self.kind == other.kind
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[P{} @{}] {}", self.player_id, self.frame, self.name())
    }
}

/// Which selection opcode produced a selection command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SelectKind {
    /// Replace the current selection (0x09).
    Select,
    /// Add to the current selection (0x0A).
    ShiftSelect,
    /// Remove from the current selection (0x0B).
    ShiftDeselect,
}

/// Type of control-group operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HotkeyKind {
    /// Assign the current selection to the group.
    Assign,
    /// Select the group.
    Select,
    /// Add the current selection to the group.
    Add,
    /// Unrecognized operation byte.
    Unknown(u8),
}

impl HotkeyKind {
    /// Decodes the operation byte.
    #[must_use]
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0 => HotkeyKind::Assign,
            1 => HotkeyKind::Select,
            2 => HotkeyKind::Add,
            n => HotkeyKind::Unknown(n),
        }
    }

    /// Returns whether this operation writes to the group.
    #[must_use]
    pub fn is_assign_or_add(&self) -> bool {
        matches!(self, HotkeyKind::Assign | HotkeyKind::Add)
    }
}

/// Decoded parameters, one arm per command family.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CommandKind {
    /// Selection change (0x09/0x0A/0x0B).
    Select {
        /// Which selection opcode this was.
        kind: SelectKind,
        /// Tags of the affected units.
        tags: Vec<u16>,
    },

    /// Building placement (0x0C).
    Build {
        /// Build order id; 36 means "land here".
        order: u8,
        /// Target tile X.
        x: u16,
        /// Target tile Y.
        y: u16,
        /// Unit type id of the building.
        unit: u16,
    },

    /// Unit training (0x14/0x1D).
    Train {
        /// Unit type id.
        unit: u16,
    },

    /// Zerg unit morph (0x21).
    UnitMorph {
        /// Unit type id of the morph target.
        unit: u16,
    },

    /// Zerg building morph (0x34).
    BuildingMorph {
        /// Unit type id of the morph target.
        unit: u16,
    },

    /// Ordered command with a target (0x11/0x13/0x15).
    TargetedOrder {
        /// Target map X in pixels.
        x: u16,
        /// Target map Y in pixels.
        y: u16,
        /// Tag of the acting unit, or 0xFFFF.
        unit_tag: u16,
        /// Type id of the targeted unit, or 0xFFFF for ground.
        target_unit: u16,
        /// Order id; 0 for an implicit right-click order.
        order: u8,
        /// Whether the order was shift-queued.
        queued: bool,
    },

    /// Control-group operation (0x12).
    Hotkey {
        /// Operation kind.
        kind: HotkeyKind,
        /// Group number (0–9).
        group: u8,
    },

    /// Chat message (0x5C).
    Chat {
        /// Slot id of the sender.
        sender: u8,
        /// Message text, cut at the first NUL.
        message: String,
    },

    /// Vision sharing (0x0D).
    Vision {
        /// Raw bitfield; each of the low 12 bits marks a shared slot.
        mask: u16,
    },

    /// Research start (0x2F).
    Research {
        /// Technology id.
        tech: u8,
    },

    /// Upgrade start (0x31).
    Upgrade {
        /// Upgrade id.
        upgrade: u8,
    },

    /// Cancel a queued training slot (0x1E).
    CancelTrain {
        /// Tag of the cancelled slot.
        tag: u16,
    },

    /// Cancel a building under construction (0x0E).
    CancelConstruction {
        /// Tag of the cancelled building.
        tag: u32,
    },

    /// Cancel a morphing unit (0x0F).
    CancelMorph {
        /// Tag of the cancelled unit.
        tag: u16,
    },

    /// Building lift-off (0x2E).
    LiftOff {
        /// Target map X.
        x: u16,
        /// Target map Y.
        y: u16,
    },

    /// Transport unload (0x22/0x28/0x27).
    Unload {
        /// Tag of the unloaded unit or target.
        tag: u16,
    },

    /// Network sync marker (0x36).
    Sync {
        /// Opaque sync payload.
        data: [u8; 6],
    },

    /// A player left the game (0x57).
    LeaveGame {
        /// Leave reason byte.
        reason: u8,
    },

    /// Parameterless command (stops, toggles, cancels without a body
    /// worth decoding). The opcode on the [`Command`] tells them apart.
    Simple,

    /// Opcode outside the known set; body bytes kept raw.
    Unknown {
        /// The bytes consumed while resynchronizing.
        raw: Vec<u8>,
    },
}

impl CommandKind {
    /// Returns the slot ids marked in a vision mask.
    #[must_use]
    pub fn vision_slots(mask: u16) -> Vec<u8> {
        (0u8..12).filter(|&bit| mask & (1 << bit) != 0).collect()
    }
}

/// The ineffectiveness verdict for a command.
///
/// `Effective` commands count toward EAPM; everything else only counts
/// toward APM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub enum IneffKind {
    /// No ineffectiveness rule matched.
    #[default]
    Effective,
    /// Train issued into an already-full production queue.
    UnitQueueOverflow,
    /// Cancel issued moments after the matching issue.
    FastCancel,
    /// Identical command repeated within the fast window.
    FastRepetition,
    /// More than two selections inside the window.
    FastReselection,
    /// Identical command repeated within the window.
    Repetition,
    /// Hotkey assign/add repeated within the window.
    RepetitionHotkeyAddAssign,
}

impl IneffKind {
    /// Returns whether this verdict keeps the command effective.
    #[must_use]
    pub fn is_effective(&self) -> bool {
        matches!(self, IneffKind::Effective)
    }
}
