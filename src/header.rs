//! Replay header parsing.
//!
//! The header section decompresses to exactly 0x279 bytes and holds the
//! game metadata and the 12 player slots.
//!
//! # Header Layout (0x279 bytes)
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0x00 | 1 | `engine` |
//! | 0x01 | 4 | `frames` |
//! | 0x08 | 4 | `start_time` (unix seconds) |
//! | 0x18 | 28 | `title` (NUL-terminated) |
//! | 0x34 | 2 | `map_width` (tiles) |
//! | 0x36 | 2 | `map_height` (tiles) |
//! | 0x39 | 1 | `avail_slots` |
//! | 0x3A | 1 | `speed` |
//! | 0x3C | 2 | `game_type` |
//! | 0x3E | 2 | `sub_type` |
//! | 0x48 | 24 | `host` |
//! | 0x61 | 26 | `map_name` |
//! | 0xA1 | 432 | 12 × 36-byte player slots |
//! | 0x251 | 32 | 8 × u32 player colors |
//!
//! Each 36-byte player slot: slot id (u16), id (u8), type (u8), race
//! (u8), team (u8), name (25 bytes), padding.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::binary::ByteReader;
use crate::error::{ParserError, Result};
use crate::frame::Frame;

/// Decompressed size of the header section.
pub const HEADER_SIZE: usize = 0x279;

/// Number of player slots in the header.
pub const PLAYER_SLOT_COUNT: usize = 12;

/// On-disk size of one player slot.
pub const PLAYER_SLOT_SIZE: usize = 36;

/// Offset of the player slot array within the header.
pub const PLAYER_SLOTS_OFFSET: usize = 0xA1;

/// Offset of the player color array within the header.
pub const PLAYER_COLORS_OFFSET: usize = 0x251;

/// Side length of one map tile in pixels.
pub const TILE_PIXELS: u16 = 32;

/// The player color palette: name and RGB for each color index.
///
/// The first 16 entries are the classic palette; the rest were added by
/// Remastered. Out-of-range indices render as the last entry.
pub const COLOR_PALETTE: [(&str, (u8, u8, u8)); 24] = [
    ("Red", (244, 4, 4)),
    ("Blue", (12, 72, 204)),
    ("Teal", (44, 180, 148)),
    ("Purple", (136, 64, 156)),
    ("Orange", (248, 140, 20)),
    ("Brown", (112, 48, 20)),
    ("White", (204, 224, 208)),
    ("Yellow", (252, 252, 56)),
    ("Green", (8, 128, 8)),
    ("Pale Yellow", (252, 252, 124)),
    ("Tan", (236, 196, 132)),
    ("Aqua", (64, 104, 212)),
    ("Pale Green", (116, 252, 20)),
    ("Blueish Grey", (144, 144, 184)),
    ("Pale Light Yellow", (252, 252, 188)),
    ("Cyan", (0, 228, 252)),
    ("Pink", (252, 176, 236)),
    ("Olive", (140, 140, 52)),
    ("Lime", (180, 252, 52)),
    ("Navy", (44, 52, 124)),
    ("Dark Aqua", (36, 116, 128)),
    ("Magenta", (208, 16, 168)),
    ("Grey", (116, 116, 116)),
    ("Black", (60, 60, 60)),
];

/// The game engine that recorded the replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Engine {
    /// Original StarCraft.
    StarCraft,
    /// Brood War expansion.
    BroodWar,
    /// Unrecognized engine byte.
    Unknown(u8),
}

impl Engine {
    /// Decodes the engine byte.
    #[must_use]
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0 => Engine::StarCraft,
            1 => Engine::BroodWar,
            n => Engine::Unknown(n),
        }
    }
}

/// The game speed setting (0–6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameSpeed {
    /// Speed 0.
    Slowest,
    /// Speed 1.
    Slower,
    /// Speed 2.
    Slow,
    /// Speed 3.
    Normal,
    /// Speed 4.
    Fast,
    /// Speed 5.
    Faster,
    /// Speed 6, the competitive standard.
    Fastest,
    /// Unrecognized speed byte.
    Unknown(u8),
}

impl GameSpeed {
    /// Decodes the speed byte.
    #[must_use]
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0 => GameSpeed::Slowest,
            1 => GameSpeed::Slower,
            2 => GameSpeed::Slow,
            3 => GameSpeed::Normal,
            4 => GameSpeed::Fast,
            5 => GameSpeed::Faster,
            6 => GameSpeed::Fastest,
            n => GameSpeed::Unknown(n),
        }
    }
}

/// The lobby game type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameType {
    /// Standard melee.
    Melee,
    /// Free for all.
    FreeForAll,
    /// One on one.
    OneOnOne,
    /// Capture the flag.
    CaptureTheFlag,
    /// Greed.
    Greed,
    /// Slaughter.
    Slaughter,
    /// Sudden death.
    SuddenDeath,
    /// Ladder game.
    Ladder,
    /// Use map settings.
    UseMapSettings,
    /// Team melee.
    TeamMelee,
    /// Team free for all.
    TeamFreeForAll,
    /// Team capture the flag.
    TeamCaptureTheFlag,
    /// Top versus bottom.
    TopVsBottom,
    /// Unrecognized game type value.
    Unknown(u16),
}

impl GameType {
    /// Decodes the game type word.
    #[must_use]
    pub fn from_u16(value: u16) -> Self {
        match value {
            0x02 => GameType::Melee,
            0x03 => GameType::FreeForAll,
            0x04 => GameType::OneOnOne,
            0x05 => GameType::CaptureTheFlag,
            0x06 => GameType::Greed,
            0x07 => GameType::Slaughter,
            0x08 => GameType::SuddenDeath,
            0x09 => GameType::Ladder,
            0x0A => GameType::UseMapSettings,
            0x0B => GameType::TeamMelee,
            0x0C => GameType::TeamFreeForAll,
            0x0D => GameType::TeamCaptureTheFlag,
            0x0F => GameType::TopVsBottom,
            n => GameType::Unknown(n),
        }
    }
}

/// What occupies a player slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlayerType {
    /// Slot not in use.
    Inactive,
    /// AI player.
    Computer,
    /// Human player.
    Human,
    /// Rescuable neutral player.
    Rescue,
    /// Open slot.
    Open,
    /// Neutral player.
    Neutral,
    /// Closed slot.
    Closed,
    /// Unrecognized type byte.
    Unknown(u8),
}

impl PlayerType {
    /// Decodes the slot type byte.
    #[must_use]
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0 => PlayerType::Inactive,
            1 => PlayerType::Computer,
            2 => PlayerType::Human,
            3 => PlayerType::Rescue,
            6 => PlayerType::Open,
            7 => PlayerType::Neutral,
            8 => PlayerType::Closed,
            n => PlayerType::Unknown(n),
        }
    }

    /// Returns whether the slot holds a participant whose commands
    /// appear in the stream.
    #[must_use]
    pub fn is_participant(&self) -> bool {
        matches!(self, PlayerType::Human | PlayerType::Computer)
    }
}

/// A player's race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Race {
    /// Zerg (0).
    Zerg,
    /// Terran (1).
    Terran,
    /// Protoss (2).
    Protoss,
    /// Random (6).
    Random,
    /// Anything else.
    Invalid(u8),
}

impl Race {
    /// Decodes the race byte.
    #[must_use]
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0 => Race::Zerg,
            1 => Race::Terran,
            2 => Race::Protoss,
            6 => Race::Random,
            n => Race::Invalid(n),
        }
    }

    /// Returns the race's display name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Race::Zerg => "Zerg",
            Race::Terran => "Terran",
            Race::Protoss => "Protoss",
            Race::Random => "Random",
            Race::Invalid(_) => "Invalid",
        }
    }
}

/// One of the 12 player slots in the header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSlot {
    /// Slot id as stored on disk.
    pub slot_id: u16,
    /// Player id; commands reference this value.
    pub id: u8,
    /// What occupies the slot.
    pub player_type: PlayerType,
    /// The player's race.
    pub race: Race,
    /// Team number.
    pub team: u8,
    /// Player name, decoded through the encoding chain.
    pub name: String,
    /// Index into [`COLOR_PALETTE`].
    pub color: u32,
}

impl PlayerSlot {
    /// Returns whether this slot holds an actual participant.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.player_type.is_participant() && !self.name.is_empty()
    }

    /// Returns the slot's color name.
    #[must_use]
    pub fn color_name(&self) -> &'static str {
        palette_entry(self.color).0
    }

    /// Returns the slot's color as RGB.
    #[must_use]
    pub fn color_rgb(&self) -> (u8, u8, u8) {
        palette_entry(self.color).1
    }
}

fn palette_entry(index: u32) -> (&'static str, (u8, u8, u8)) {
    let clamped = (index as usize).min(COLOR_PALETTE.len() - 1);
    COLOR_PALETTE[clamped]
}

/// The decoded replay header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayHeader {
    /// The recording engine.
    pub engine: Engine,
    /// Total game length in frames.
    pub frames: Frame,
    /// Game start time.
    pub start_time: DateTime<Utc>,
    /// Game title.
    pub title: String,
    /// Map width in 32-pixel tiles.
    pub map_width: u16,
    /// Map height in 32-pixel tiles.
    pub map_height: u16,
    /// Number of available slots.
    pub avail_slots: u8,
    /// Game speed setting.
    pub speed: GameSpeed,
    /// Lobby game type.
    pub game_type: GameType,
    /// Game sub-type (team layout for team game types).
    pub sub_type: u16,
    /// Host name.
    pub host: String,
    /// Map name.
    pub map_name: String,
    /// All 12 player slots, active or not.
    pub player_slots: Vec<PlayerSlot>,
}

impl ReplayHeader {
    /// Parses the decompressed header section.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::MalformedSection` if `data` is not exactly
    /// [`HEADER_SIZE`] bytes, and `ParserError::UnexpectedEof` if an
    /// inner read fails (which a correctly sized buffer precludes).
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() != HEADER_SIZE {
            return Err(ParserError::MalformedSection {
                reason: format!(
                    "header section is {} bytes, expected {HEADER_SIZE}",
                    data.len()
                ),
            });
        }

        let mut reader = ByteReader::new(data);
        let engine = Engine::from_byte(reader.read_u8()?);
        let frames = Frame::new(reader.read_u32()?);

        reader.set_pos(0x08)?;
        let start_unix = reader.read_u32()?;
        let start_time =
            DateTime::from_timestamp(i64::from(start_unix), 0).unwrap_or(DateTime::UNIX_EPOCH);

        reader.set_pos(0x18)?;
        let title = reader.read_fixed_string(28)?;

        reader.set_pos(0x34)?;
        let map_width = reader.read_u16()?;
        let map_height = reader.read_u16()?;

        reader.set_pos(0x39)?;
        let avail_slots = reader.read_u8()?;
        let speed = GameSpeed::from_byte(reader.read_u8()?);

        reader.set_pos(0x3C)?;
        let game_type = GameType::from_u16(reader.read_u16()?);
        let sub_type = reader.read_u16()?;

        reader.set_pos(0x48)?;
        let host = reader.read_fixed_string(24)?;

        reader.set_pos(0x61)?;
        let map_name = reader.read_fixed_string(26)?;

        reader.set_pos(PLAYER_SLOTS_OFFSET)?;
        let mut player_slots = Vec::with_capacity(PLAYER_SLOT_COUNT);
        for _ in 0..PLAYER_SLOT_COUNT {
            player_slots.push(Self::parse_slot(&mut reader)?);
        }

        reader.set_pos(PLAYER_COLORS_OFFSET)?;
        for i in 0..8 {
            let color = reader.read_u32()?;
            player_slots[i].color = color;
        }

        Ok(ReplayHeader {
            engine,
            frames,
            start_time,
            title,
            map_width,
            map_height,
            avail_slots,
            speed,
            game_type,
            sub_type,
            host,
            map_name,
            player_slots,
        })
    }

    fn parse_slot(reader: &mut ByteReader<'_>) -> Result<PlayerSlot> {
        let start = reader.pos();
        let slot_id = reader.read_u16()?;
        let id = reader.read_u8()?;
        let player_type = PlayerType::from_byte(reader.read_u8()?);
        let race = Race::from_byte(reader.read_u8()?);
        let team = reader.read_u8()?;
        let name = reader.read_fixed_string(25)?;
        reader.set_pos(start + PLAYER_SLOT_SIZE)?;

        Ok(PlayerSlot {
            slot_id,
            id,
            player_type,
            race,
            team,
            name,
            color: 0,
        })
    }

    /// Returns the active participants (human or computer slots with a
    /// name).
    #[must_use]
    pub fn players(&self) -> Vec<&PlayerSlot> {
        self.player_slots.iter().filter(|s| s.is_active()).collect()
    }

    /// Returns the slot a command's player id maps to, if any.
    #[must_use]
    pub fn slot_for_player(&self, player_id: u8) -> Option<&PlayerSlot> {
        self.player_slots
            .iter()
            .find(|s| s.is_active() && s.id == player_id)
    }

    /// Returns the map size in pixels.
    #[must_use]
    pub fn map_pixel_size(&self) -> (u32, u32) {
        (
            u32::from(self.map_width) * u32::from(TILE_PIXELS),
            u32::from(self.map_height) * u32::from(TILE_PIXELS),
        )
    }

    /// Returns the game duration formatted as a time string.
    #[must_use]
    pub fn duration_string(&self) -> String {
        self.frames.time_string()
    }

    /// Returns the game duration as (hours, minutes, seconds).
    #[must_use]
    pub fn duration_parts(&self) -> (u64, u64, u64) {
        let total = self.frames.to_seconds();
        (total / 3600, (total / 60) % 60, total % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a minimal valid header buffer with one Protoss player.
    pub(crate) fn build_test_header() -> Vec<u8> {
        let mut data = vec![0u8; HEADER_SIZE];
        data[0x00] = 1; // Brood War
        data[0x01..0x05].copy_from_slice(&1440u32.to_le_bytes());
        data[0x08..0x0C].copy_from_slice(&1_600_000_000u32.to_le_bytes());
        data[0x18..0x22].copy_from_slice(b"test game\x00");
        data[0x34..0x36].copy_from_slice(&128u16.to_le_bytes());
        data[0x36..0x38].copy_from_slice(&128u16.to_le_bytes());
        data[0x39] = 8;
        data[0x3A] = 6; // Fastest
        data[0x3C..0x3E].copy_from_slice(&2u16.to_le_bytes()); // Melee
        data[0x48..0x4D].copy_from_slice(b"Probe");
        data[0x61..0x6C].copy_from_slice(b"Lost Temple");

        // Slot 0: human Protoss "Probe"
        let slot = PLAYER_SLOTS_OFFSET;
        data[slot..slot + 2].copy_from_slice(&0u16.to_le_bytes());
        data[slot + 2] = 0; // player id
        data[slot + 3] = 2; // human
        data[slot + 4] = 2; // protoss
        data[slot + 5] = 1; // team
        data[slot + 6..slot + 11].copy_from_slice(b"Probe");

        // Color 0 (red) for the first slot
        data[PLAYER_COLORS_OFFSET..PLAYER_COLORS_OFFSET + 4]
            .copy_from_slice(&0u32.to_le_bytes());
        data
    }

    #[test]
    fn test_parse_header_fields() {
        let header = ReplayHeader::parse(&build_test_header()).unwrap();

        assert_eq!(header.engine, Engine::BroodWar);
        assert_eq!(header.frames.get(), 1440);
        assert_eq!(header.start_time.timestamp(), 1_600_000_000);
        assert_eq!(header.title, "test game");
        assert_eq!(header.map_width, 128);
        assert_eq!(header.map_height, 128);
        assert_eq!(header.avail_slots, 8);
        assert_eq!(header.speed, GameSpeed::Fastest);
        assert_eq!(header.game_type, GameType::Melee);
        assert_eq!(header.host, "Probe");
        assert_eq!(header.map_name, "Lost Temple");
        assert_eq!(header.player_slots.len(), PLAYER_SLOT_COUNT);
    }

    #[test]
    fn test_parse_header_wrong_size() {
        let result = ReplayHeader::parse(&[0u8; 100]);
        assert!(matches!(
            result,
            Err(ParserError::MalformedSection { .. })
        ));

        let result = ReplayHeader::parse(&[0u8; HEADER_SIZE + 1]);
        assert!(matches!(
            result,
            Err(ParserError::MalformedSection { .. })
        ));
    }

    #[test]
    fn test_active_players() {
        let header = ReplayHeader::parse(&build_test_header()).unwrap();
        let players = header.players();

        assert_eq!(players.len(), 1);
        assert_eq!(players[0].name, "Probe");
        assert_eq!(players[0].race, Race::Protoss);
        assert_eq!(players[0].player_type, PlayerType::Human);
        assert_eq!(players[0].team, 1);
    }

    #[test]
    fn test_slot_for_player() {
        let header = ReplayHeader::parse(&build_test_header()).unwrap();

        assert!(header.slot_for_player(0).is_some());
        assert!(header.slot_for_player(1).is_none());
        assert!(header.slot_for_player(11).is_none());
    }

    #[test]
    fn test_player_color() {
        let header = ReplayHeader::parse(&build_test_header()).unwrap();
        let player = &header.players()[0];

        assert_eq!(player.color, 0);
        assert_eq!(player.color_name(), "Red");
        assert_eq!(player.color_rgb(), (244, 4, 4));
    }

    #[test]
    fn test_palette_clamps_out_of_range() {
        let slot = PlayerSlot {
            slot_id: 0,
            id: 0,
            player_type: PlayerType::Human,
            race: Race::Zerg,
            team: 0,
            name: "x".to_string(),
            color: 999,
        };
        assert_eq!(slot.color_name(), "Black");
    }

    #[test]
    fn test_map_pixel_size() {
        let header = ReplayHeader::parse(&build_test_header()).unwrap();
        assert_eq!(header.map_pixel_size(), (4096, 4096));
    }

    #[test]
    fn test_duration() {
        let header = ReplayHeader::parse(&build_test_header()).unwrap();
        // 1440 frames * 42 ms = 60.48 s
        assert_eq!(header.duration_string(), "1:00");
        assert_eq!(header.duration_parts(), (0, 1, 0));
    }

    #[test]
    fn test_enum_decoding() {
        assert_eq!(Engine::from_byte(0), Engine::StarCraft);
        assert_eq!(Engine::from_byte(9), Engine::Unknown(9));
        assert_eq!(GameSpeed::from_byte(3), GameSpeed::Normal);
        assert_eq!(GameSpeed::from_byte(7), GameSpeed::Unknown(7));
        assert_eq!(GameType::from_u16(0x0F), GameType::TopVsBottom);
        assert_eq!(GameType::from_u16(0x0B), GameType::TeamMelee);
        assert_eq!(GameType::from_u16(0x99), GameType::Unknown(0x99));
        assert_eq!(PlayerType::from_byte(8), PlayerType::Closed);
        assert_eq!(Race::from_byte(6), Race::Random);
        assert_eq!(Race::from_byte(5), Race::Invalid(5));
        assert_eq!(Race::Terran.name(), "Terran");
    }

    #[test]
    fn test_inactive_slots_not_players() {
        let mut data = build_test_header();
        // Give slot 1 a name but leave it inactive
        let slot = PLAYER_SLOTS_OFFSET + PLAYER_SLOT_SIZE;
        data[slot + 6..slot + 10].copy_from_slice(b"ghos");
        let header = ReplayHeader::parse(&data).unwrap();
        assert_eq!(header.players().len(), 1);
    }
}
