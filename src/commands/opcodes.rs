//! Opcode constants, names, and body lengths.
//!
//! The body-length table follows the BWAPI-corrected values. The
//! Modern121 (1.21+) format enlarges the right-click and targeted-order
//! bodies by a pad u16 and inserts the same pad after every unit tag in
//! selection commands; everything else is format-independent.

use crate::format::ReplayFormat;

/// Select units (replaces the current selection).
pub const SELECT: u8 = 0x09;
/// Add units to the current selection.
pub const SHIFT_SELECT: u8 = 0x0A;
/// Remove units from the current selection.
pub const SHIFT_DESELECT: u8 = 0x0B;
/// Place a building.
pub const BUILD: u8 = 0x0C;
/// Share vision with other slots.
pub const VISION: u8 = 0x0D;
/// Cancel a building under construction.
pub const CANCEL_CONSTRUCTION: u8 = 0x0E;
/// Cancel a morphing unit.
pub const CANCEL_MORPH: u8 = 0x0F;
/// Stop the selected units.
pub const STOP: u8 = 0x10;
/// Attack-move to a position.
pub const ATTACK_MOVE: u8 = 0x11;
/// Control-group operation.
pub const HOTKEY: u8 = 0x12;
/// Right-click order.
pub const RIGHT_CLICK: u8 = 0x13;
/// Train a unit.
pub const TRAIN: u8 = 0x14;
/// Targeted order with an explicit order id.
pub const TARGETED_ORDER: u8 = 0x15;
/// Alternate stop.
pub const STOP_ALT: u8 = 0x18;
/// Carrier stop.
pub const CARRIER_STOP: u8 = 0x19;
/// Reaver stop.
pub const REAVER_STOP: u8 = 0x1A;
/// Order nothing (idle).
pub const ORDER_NOTHING: u8 = 0x1B;
/// Return cargo.
pub const RETURN_CARGO: u8 = 0x1C;
/// Train a unit (alternate opcode).
pub const TRAIN_UNIT: u8 = 0x1D;
/// Cancel a queued training slot.
pub const CANCEL_TRAIN: u8 = 0x1E;
/// Cloak the selected units.
pub const CLOAK: u8 = 0x1F;
/// Decloak the selected units.
pub const DECLOAK: u8 = 0x20;
/// Morph a unit (Zerg).
pub const UNIT_MORPH: u8 = 0x21;
/// Unload one unit from a transport.
pub const UNLOAD: u8 = 0x22;
/// Leave siege mode.
pub const UNSIEGE: u8 = 0x23;
/// Enter siege mode.
pub const SIEGE: u8 = 0x24;
/// Train an interceptor or scarab.
pub const TRAIN_FIGHTER: u8 = 0x25;
/// Unload all carried units.
pub const UNLOAD_ALL: u8 = 0x26;
/// Unload all carried units at a position.
pub const UNLOAD_ALL_AT: u8 = 0x27;
/// Unload one unit (alternate opcode).
pub const UNLOAD_ALT: u8 = 0x28;
/// Merge two templar into an archon.
pub const MERGE_ARCHON: u8 = 0x29;
/// Hold position.
pub const HOLD_POSITION: u8 = 0x2A;
/// Burrow.
pub const BURROW: u8 = 0x2B;
/// Unburrow.
pub const UNBURROW: u8 = 0x2C;
/// Cancel a nuclear strike.
pub const CANCEL_NUKE: u8 = 0x2D;
/// Lift off a building.
pub const LIFT_OFF: u8 = 0x2E;
/// Start researching a technology.
pub const RESEARCH: u8 = 0x2F;
/// Cancel an in-progress research.
pub const CANCEL_RESEARCH: u8 = 0x30;
/// Start an upgrade.
pub const UPGRADE: u8 = 0x31;
/// Cancel an in-progress upgrade.
pub const CANCEL_UPGRADE: u8 = 0x32;
/// Cancel an addon.
pub const CANCEL_ADDON: u8 = 0x33;
/// Morph a building (Zerg).
pub const BUILDING_MORPH: u8 = 0x34;
/// Use a stim pack.
pub const STIM: u8 = 0x35;
/// Network sync marker.
pub const SYNC: u8 = 0x36;
/// A player left the game.
pub const LEAVE_GAME: u8 = 0x57;
/// In-game chat message.
pub const CHAT: u8 = 0x5C;

/// Length of a chat message body after the sender byte.
pub const CHAT_MESSAGE_LEN: usize = 80;

/// The declared body length of an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyLen {
    /// A fixed number of body bytes.
    Fixed(usize),
    /// Selection body: `u8` count then `count` unit tags (each tag
    /// gaining a pad u16 on Modern121).
    Select,
    /// Chat body: sender byte plus an 80-byte NUL-terminated message.
    Chat,
}

/// Returns the body length for an opcode under the given format, or
/// `None` for opcodes outside the known set.
///
/// # Example
///
/// ```
/// use bwrep_parser::commands::{body_len, BodyLen};
/// use bwrep_parser::format::ReplayFormat;
///
/// assert_eq!(body_len(0x0C, ReplayFormat::Modern), Some(BodyLen::Fixed(8)));
/// assert_eq!(body_len(0x13, ReplayFormat::Modern), Some(BodyLen::Fixed(9)));
/// assert_eq!(body_len(0x13, ReplayFormat::Modern121), Some(BodyLen::Fixed(11)));
/// assert_eq!(body_len(0xF0, ReplayFormat::Modern), None);
/// ```
#[must_use]
pub fn body_len(opcode: u8, format: ReplayFormat) -> Option<BodyLen> {
    use BodyLen::{Chat, Fixed, Select};

    let ordered = if format.has_extended_orders() {
        Fixed(11)
    } else {
        Fixed(9)
    };

    Some(match opcode {
        SELECT | SHIFT_SELECT | SHIFT_DESELECT => Select,
        BUILD => Fixed(8),
        VISION => Fixed(2),
        CANCEL_CONSTRUCTION => Fixed(4),
        CANCEL_MORPH => Fixed(2),
        STOP => Fixed(1),
        ATTACK_MOVE => Fixed(9),
        HOTKEY => Fixed(2),
        RIGHT_CLICK | TARGETED_ORDER => ordered,
        TRAIN | TRAIN_UNIT | CANCEL_TRAIN => Fixed(2),
        STOP_ALT | CARRIER_STOP | REAVER_STOP | ORDER_NOTHING | RETURN_CARGO => Fixed(1),
        CLOAK | DECLOAK => Fixed(1),
        UNIT_MORPH | BUILDING_MORPH => Fixed(2),
        UNLOAD | UNLOAD_ALT | UNLOAD_ALL_AT => Fixed(2),
        UNSIEGE | SIEGE => Fixed(1),
        TRAIN_FIGHTER | MERGE_ARCHON | BURROW | UNBURROW | CANCEL_NUKE | CANCEL_RESEARCH
        | CANCEL_UPGRADE | CANCEL_ADDON | STIM => Fixed(0),
        UNLOAD_ALL | HOLD_POSITION => Fixed(1),
        LIFT_OFF => Fixed(4),
        RESEARCH | UPGRADE => Fixed(1),
        SYNC => Fixed(6),
        LEAVE_GAME => Fixed(1),
        CHAT => Chat,
        _ => return None,
    })
}

/// Returns whether the byte is in the known opcode set.
///
/// Used both by the command parser and by the decompression heuristics
/// that judge whether a candidate byte stream looks like commands.
#[must_use]
pub fn is_known_opcode(byte: u8) -> bool {
    // Format choice cannot change set membership, only lengths.
    body_len(byte, ReplayFormat::Modern).is_some()
}

/// Returns a human-readable name for an opcode.
#[must_use]
pub fn opcode_name(opcode: u8) -> &'static str {
    match opcode {
        SELECT => "Select",
        SHIFT_SELECT => "Shift Select",
        SHIFT_DESELECT => "Shift Deselect",
        BUILD => "Build",
        VISION => "Vision",
        CANCEL_CONSTRUCTION => "Cancel Construction",
        CANCEL_MORPH => "Cancel Morph",
        STOP => "Stop",
        ATTACK_MOVE => "Attack Move",
        HOTKEY => "Hotkey",
        RIGHT_CLICK => "Right Click",
        TRAIN => "Train",
        TARGETED_ORDER => "Targeted Order",
        STOP_ALT => "Stop",
        CARRIER_STOP => "Carrier Stop",
        REAVER_STOP => "Reaver Stop",
        ORDER_NOTHING => "Idle",
        RETURN_CARGO => "Return Cargo",
        TRAIN_UNIT => "Train Unit",
        CANCEL_TRAIN => "Cancel Train",
        CLOAK => "Cloak",
        DECLOAK => "Decloak",
        UNIT_MORPH => "Unit Morph",
        UNLOAD | UNLOAD_ALT => "Unload",
        UNSIEGE => "Unsiege",
        SIEGE => "Siege",
        TRAIN_FIGHTER => "Train Fighter",
        UNLOAD_ALL => "Unload All",
        UNLOAD_ALL_AT => "Unload All At",
        MERGE_ARCHON => "Merge Archon",
        HOLD_POSITION => "Hold Position",
        BURROW => "Burrow",
        UNBURROW => "Unburrow",
        CANCEL_NUKE => "Cancel Nuke",
        LIFT_OFF => "Lift Off",
        RESEARCH => "Research",
        CANCEL_RESEARCH => "Cancel Research",
        UPGRADE => "Upgrade",
        CANCEL_UPGRADE => "Cancel Upgrade",
        CANCEL_ADDON => "Cancel Addon",
        BUILDING_MORPH => "Building Morph",
        STIM => "Stim",
        SYNC => "Sync",
        LEAVE_GAME => "Leave Game",
        CHAT => "Chat",
        _ => "Unknown",
    }
}
