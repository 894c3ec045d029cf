//! End-to-end integration tests for the parse pipeline.
//!
//! These tests build complete synthetic replays, byte for byte, and
//! validate the documented end-to-end scenarios: the minimal Modern
//! replay, parse idempotence, Modern121 command sizing, effectiveness
//! classification, truncation behavior, and magic rejection.

use std::io::Write as _;

use bwrep_parser::commands::opcodes;
use bwrep_parser::header::{HEADER_SIZE, PLAYER_SLOTS_OFFSET};
use bwrep_parser::replay::MIN_REPLAY_SIZE;
use bwrep_parser::{
    parse, BuildAction, CommandKind, ParserError, Reliability, ReplayFormat,
};

/// Offset of the replay magic.
const MAGIC_OFFSET: usize = 0x0C;

/// Offset where sections begin.
const SECTIONS_OFFSET: usize = 0x10;

fn zlib_compress(data: &[u8]) -> Vec<u8> {
    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn push_standard_section(out: &mut Vec<u8>, chunks: &[&[u8]]) {
    out.extend_from_slice(&0u32.to_le_bytes()); // checksum, not validated
    out.extend_from_slice(&u32::try_from(chunks.len()).unwrap().to_le_bytes());
    for chunk in chunks {
        out.extend_from_slice(&u32::try_from(chunk.len()).unwrap().to_le_bytes());
        out.extend_from_slice(chunk);
    }
}

fn frame_block(frame: u32, body: &[u8]) -> Vec<u8> {
    let mut out = frame.to_le_bytes().to_vec();
    out.push(u8::try_from(body.len()).unwrap());
    out.extend_from_slice(body);
    out
}

/// A builder for complete synthetic replay files.
struct ReplayBuilder {
    magic: &'static [u8; 4],
    intersection_length: bool,
    players: Vec<(u8, u8, &'static str)>, // (id, race, name)
    frames: u32,
    map_name: &'static str,
    commands: Vec<u8>,
}

impl ReplayBuilder {
    fn modern() -> Self {
        Self {
            magic: b"reRS",
            intersection_length: false,
            players: vec![(0, 2, "Probe")],
            frames: 1440,
            map_name: "Lost Temple",
            commands: Vec::new(),
        }
    }

    fn modern121() -> Self {
        Self {
            magic: b"seRS",
            intersection_length: true,
            ..Self::modern()
        }
    }

    fn with_players(mut self, players: Vec<(u8, u8, &'static str)>) -> Self {
        self.players = players;
        self
    }

    fn with_frames(mut self, frames: u32) -> Self {
        self.frames = frames;
        self
    }

    fn with_commands(mut self, commands: Vec<u8>) -> Self {
        self.commands = commands;
        self
    }

    fn header_payload(&self) -> Vec<u8> {
        let mut data = vec![0u8; HEADER_SIZE];
        data[0x00] = 1; // Brood War engine
        data[0x01..0x05].copy_from_slice(&self.frames.to_le_bytes());
        data[0x08..0x0C].copy_from_slice(&1_600_000_000u32.to_le_bytes());
        data[0x34..0x36].copy_from_slice(&128u16.to_le_bytes());
        data[0x36..0x38].copy_from_slice(&128u16.to_le_bytes());
        data[0x39] = 8;
        data[0x3A] = 6; // fastest
        data[0x3C..0x3E].copy_from_slice(&2u16.to_le_bytes()); // melee
        let map = self.map_name.as_bytes();
        data[0x61..0x61 + map.len()].copy_from_slice(map);

        for (index, (id, race, name)) in self.players.iter().enumerate() {
            let slot = PLAYER_SLOTS_OFFSET + index * 36;
            data[slot..slot + 2].copy_from_slice(&u16::try_from(index).unwrap().to_le_bytes());
            data[slot + 2] = *id;
            data[slot + 3] = 2; // human
            data[slot + 4] = *race;
            data[slot + 5] = 1;
            data[slot + 6..slot + 6 + name.len()].copy_from_slice(name.as_bytes());
        }
        data
    }

    fn build(&self) -> Vec<u8> {
        let mut file = vec![0u8; SECTIONS_OFFSET];
        file[MAGIC_OFFSET..MAGIC_OFFSET + 4].copy_from_slice(self.magic);

        push_standard_section(&mut file, &[&zlib_compress(self.magic)]);
        push_standard_section(&mut file, &[&zlib_compress(&self.header_payload())]);

        if self.intersection_length {
            file.extend_from_slice(&0u32.to_le_bytes());
        }

        file.extend_from_slice(&u32::try_from(self.commands.len()).unwrap().to_le_bytes());
        push_standard_section(&mut file, &[&zlib_compress(&self.commands)]);

        file.extend_from_slice(&0u32.to_le_bytes());
        push_standard_section(&mut file, &[]);

        if file.len() + 8 < MIN_REPLAY_SIZE {
            let pad = MIN_REPLAY_SIZE - file.len() - 8;
            file.extend_from_slice(b"PADD");
            file.extend_from_slice(&u32::try_from(pad).unwrap().to_le_bytes());
            file.extend_from_slice(&vec![0u8; pad]);
        }
        file
    }
}

// ============================================================================
// Scenario 1: minimal Modern replay
// ============================================================================

#[test]
fn test_minimal_modern_replay() {
    let mut commands = frame_block(100, &[0, opcodes::BUILD, 25, 64, 0, 64, 0, 156, 0]);
    commands.extend_from_slice(&frame_block(150, &[0, opcodes::TRAIN, 64, 0]));

    let file = ReplayBuilder::modern().with_commands(commands).build();
    let replay = parse(&file).unwrap();

    assert_eq!(replay.format, ReplayFormat::Modern);
    assert_eq!(replay.header.frames.get(), 1440);
    assert_eq!(replay.header.map_name, "Lost Temple");
    assert_eq!(replay.header.players().len(), 1);
    assert_eq!(replay.header.players()[0].name, "Probe");
    assert_eq!(replay.commands.len(), 2);

    // Build order: Pylon at 0:04, then the Probe
    let build = replay.build_order_for(0).unwrap();
    assert_eq!(build.items.len(), 2);
    assert_eq!(build.items[0].time, "0:04");
    assert_eq!(build.items[0].action, BuildAction::Build);
    assert_eq!(build.items[0].name, "Pylon");
    assert_eq!(build.items[1].name, "Probe");

    // APM = 2 commands / (1440 frames / 23.81 fps / 60 s)
    let metrics = replay.metrics_for(0).unwrap();
    let expected = 2.0 / (1440.0 / 23.81 / 60.0);
    assert!((metrics.apm - expected).abs() < 1e-9);
}

// ============================================================================
// Scenario 2: idempotence
// ============================================================================

#[test]
fn test_parse_twice_is_byte_identical() {
    let mut commands = frame_block(100, &[0, opcodes::BUILD, 25, 64, 0, 64, 0, 156, 0]);
    commands.extend_from_slice(&frame_block(150, &[0, opcodes::TRAIN, 64, 0]));
    let file = ReplayBuilder::modern().with_commands(commands).build();

    let first = serde_json::to_string(&parse(&file).unwrap()).unwrap();
    let second = serde_json::to_string(&parse(&file).unwrap()).unwrap();
    assert_eq!(first, second);
}

// ============================================================================
// Scenario 3: Modern121 right-click sizing
// ============================================================================

#[test]
fn test_modern121_right_click_consumes_eleven_bytes() {
    // x=64, y=128, tag=1, pad=0, target=0x00E4, queued=1, then a Stop
    // that only parses if exactly 11 body bytes were consumed
    let body = [
        0,
        opcodes::RIGHT_CLICK,
        0x40,
        0x00,
        0x80,
        0x00,
        0x01,
        0x00,
        0x00,
        0x00,
        0xE4,
        0x00,
        0x01,
        0,
        opcodes::STOP,
        0x00,
    ];
    let file = ReplayBuilder::modern121()
        .with_commands(frame_block(10, &body))
        .build();
    let replay = parse(&file).unwrap();

    assert_eq!(replay.format, ReplayFormat::Modern121);
    assert_eq!(replay.commands.len(), 2);
    assert_eq!(replay.parse_errors, 0);

    match replay.commands[0].kind {
        CommandKind::TargetedOrder {
            x,
            y,
            unit_tag,
            target_unit,
            order,
            queued,
        } => {
            assert_eq!((x, y), (64, 128));
            assert_eq!(unit_tag, 1);
            assert_eq!(target_unit, 0x00E4);
            assert_eq!(order, 0);
            assert!(queued);
        }
        ref other => panic!("expected TargetedOrder, got {other:?}"),
    }
    assert_eq!(replay.commands[1].opcode, opcodes::STOP);
}

// ============================================================================
// Scenario 4: fast repetition classification
// ============================================================================

#[test]
fn test_fast_repetition_excluded_from_eapm() {
    let mut commands = frame_block(100, &[0, opcodes::STOP, 0x00]);
    commands.extend_from_slice(&frame_block(106, &[0, opcodes::STOP, 0x00]));
    let file = ReplayBuilder::modern().with_commands(commands).build();
    let replay = parse(&file).unwrap();

    assert_eq!(replay.commands.len(), 2);
    assert!(replay.commands[0].effective);
    assert!(!replay.commands[1].effective);

    let metrics = replay.metrics_for(0).unwrap();
    assert_eq!(metrics.total_commands, 2);
    assert_eq!(metrics.effective_commands, 1);
    assert!(metrics.eapm < metrics.apm);
}

// ============================================================================
// Scenario 5: truncation
// ============================================================================

#[test]
fn test_truncated_mid_header_yields_eof() {
    // Store the header one byte per chunk so the header section spans
    // past the minimum-size gate, then cut inside it.
    let mut file = vec![0u8; SECTIONS_OFFSET];
    file[MAGIC_OFFSET..MAGIC_OFFSET + 4].copy_from_slice(b"reRS");
    push_standard_section(&mut file, &[&zlib_compress(b"reRS")]);
    let payload = ReplayBuilder::modern().header_payload();
    let chunks: Vec<&[u8]> = payload.chunks(1).collect();
    push_standard_section(&mut file, &chunks);

    file.truncate(MIN_REPLAY_SIZE + 100);
    assert!(matches!(
        parse(&file),
        Err(ParserError::UnexpectedEof { .. })
    ));
}

#[test]
fn test_undersized_input_rejected() {
    assert!(matches!(
        parse(&[0u8; 999]),
        Err(ParserError::TooSmall { .. })
    ));
}

// ============================================================================
// Scenario 6: invalid magic
// ============================================================================

#[test]
fn test_junk_magic_rejected_immediately() {
    let mut file = ReplayBuilder::modern().build();
    file[MAGIC_OFFSET..MAGIC_OFFSET + 4].copy_from_slice(b"junk");
    assert!(matches!(
        parse(&file),
        Err(ParserError::InvalidMagic { .. })
    ));
}

// ============================================================================
// Cross-cutting invariants
// ============================================================================

#[test]
fn test_universal_invariants_on_busy_replay() {
    let mut commands = Vec::new();
    // A spread of command families over 1000 frames from two players
    for i in 0..50u32 {
        let frame = i * 20;
        let player = u8::try_from(i % 2).unwrap();
        commands.extend_from_slice(&frame_block(
            frame,
            &[player, opcodes::SELECT, 1, 0x10, 0x00],
        ));
        commands.extend_from_slice(&frame_block(
            frame + 5,
            &[
                player,
                opcodes::RIGHT_CLICK,
                0x40,
                0x00,
                0x40,
                0x00,
                0xFF,
                0xFF,
                0xFF,
                0xFF,
                0x00,
            ],
        ));
        if i % 10 == 0 {
            commands.extend_from_slice(&frame_block(
                frame + 7,
                &[player, opcodes::TRAIN, 0x00, 0x00],
            ));
        }
    }

    let file = ReplayBuilder::modern()
        .with_players(vec![(0, 1, "Marine"), (1, 0, "Ling")])
        .with_frames(4_000)
        .with_commands(commands)
        .build();
    let replay = parse(&file).unwrap();

    // Every command maps to a present slot
    for cmd in &replay.commands {
        assert!(cmd.player_id < 12);
        assert!(replay.header.slot_for_player(cmd.player_id).is_some());
    }

    // Frames are non-decreasing
    for pair in replay.commands.windows(2) {
        assert!(pair[0].frame <= pair[1].frame);
    }

    // Rate invariants
    for metrics in &replay.metrics {
        assert!(metrics.eapm <= metrics.apm);
        assert!((0.0..=100.0).contains(&metrics.efficiency));
    }

    assert_eq!(replay.parse_errors, 0);
    assert_eq!(replay.reliability, Reliability::Excellent);
}

#[test]
fn test_sync_commands_are_excluded_from_apm() {
    let mut commands = frame_block(10, &[0, opcodes::SYNC, 0, 0, 0, 0, 0, 0]);
    commands.extend_from_slice(&frame_block(20, &[0, opcodes::STOP, 0x00]));
    let file = ReplayBuilder::modern().with_commands(commands).build();
    let replay = parse(&file).unwrap();

    assert_eq!(replay.commands.len(), 2);
    assert_eq!(replay.metrics_for(0).unwrap().total_commands, 1);
}

#[test]
fn test_chat_resolves_sender() {
    let mut body = vec![0, opcodes::CHAT, 0];
    let mut message = "gg".as_bytes().to_vec();
    message.resize(80, 0);
    body.extend_from_slice(&message);
    let file = ReplayBuilder::modern()
        .with_commands(frame_block(2400, &body))
        .build();
    let replay = parse(&file).unwrap();

    assert_eq!(replay.chat.len(), 1);
    assert_eq!(replay.chat[0].message, "gg");
    assert_eq!(replay.chat[0].sender_name.as_deref(), Some("Probe"));
    assert_eq!(replay.chat[0].time, "1:40");
}

#[test]
fn test_format_detection_stable_under_trailing_bytes() {
    let mut file = ReplayBuilder::modern121().build();
    let before = parse(&file).unwrap().format;
    file.extend_from_slice(&[0xFF; 2048]);
    let after = parse(&file).unwrap().format;
    assert_eq!(before, after);
}
