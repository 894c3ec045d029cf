//! Effectiveness classification and per-player rate metrics.
//!
//! APM counts every non-sync command a player issues. EAPM counts only
//! the commands that plausibly did something: spam clicking, redundant
//! reselection, instant cancels and queue hammering are filtered out by
//! the rules below, each applied over a small per-player window of
//! recent commands (24 frames, about one second).
//!
//! | Verdict | Trigger |
//! |---------|---------|
//! | `UnitQueueOverflow` | train issued after the queue cap was hit |
//! | `FastCancel` | cancel within the window of the matching issue |
//! | `FastRepetition` | identical command within 12 frames |
//! | `FastReselection` | third selection within the window |
//! | `Repetition` | identical command within the window |
//! | `RepetitionHotkeyAddAssign` | repeated assign/add of a group |
//!
//! The first matching rule wins; everything else stays `Effective`.

use std::collections::VecDeque;

use serde::Serialize;

use crate::commands::{opcodes, Command, CommandKind, IneffKind};
use crate::frame::Frame;

/// The classification window in frames (about one second).
pub const WINDOW_FRAMES: u32 = 24;

/// The tighter window for fast repetitions.
pub const FAST_WINDOW_FRAMES: u32 = 12;

/// Selections tolerated inside one window before the rest are spam.
pub const RESELECTION_LIMIT: usize = 2;

/// A production building's queue capacity.
pub const QUEUE_CAP: u32 = 5;

/// Per-player sliding-window state.
#[derive(Default)]
struct PlayerWindow {
    /// Recent commands, pruned to [`WINDOW_FRAMES`].
    recent: VecDeque<(u32, Command)>,
    /// Frames of recent 0x09/0x0A selections.
    recent_selects: VecDeque<u32>,
    /// Frames and groups of recent hotkey assign/add operations.
    recent_hotkey_writes: VecDeque<(u32, u8)>,
    /// Train commands issued since the selection last changed.
    train_streak: u32,
}

impl PlayerWindow {
    fn prune(&mut self, frame: u32) {
        let cutoff = frame.saturating_sub(WINDOW_FRAMES);
        while self
            .recent
            .front()
            .is_some_and(|(f, _)| *f < cutoff)
        {
            self.recent.pop_front();
        }
        while self.recent_selects.front().is_some_and(|f| *f < cutoff) {
            self.recent_selects.pop_front();
        }
        while self
            .recent_hotkey_writes
            .front()
            .is_some_and(|(f, _)| *f < cutoff)
        {
            self.recent_hotkey_writes.pop_front();
        }
    }

    fn classify(&self, cmd: &Command) -> IneffKind {
        let frame = cmd.frame.get();

        if is_train(cmd) && self.train_streak >= QUEUE_CAP {
            return IneffKind::UnitQueueOverflow;
        }

        if let Some(issue_matcher) = cancel_matches(cmd) {
            let cancelled_fast = self
                .recent
                .iter()
                .any(|(f, earlier)| frame - f <= WINDOW_FRAMES && issue_matcher(earlier));
            if cancelled_fast {
                return IneffKind::FastCancel;
            }
        }

        let repeated_at = self
            .recent
            .iter()
            .rev()
            .find(|(_, earlier)| earlier.same_action(cmd))
            .map(|(f, _)| *f);
        if let Some(f) = repeated_at {
            if frame - f <= FAST_WINDOW_FRAMES {
                return IneffKind::FastRepetition;
            }
        }

        if cmd.is_reselection_candidate() && self.recent_selects.len() >= RESELECTION_LIMIT {
            return IneffKind::FastReselection;
        }

        if let CommandKind::Hotkey { kind, group } = &cmd.kind {
            if kind.is_assign_or_add()
                && self
                    .recent_hotkey_writes
                    .iter()
                    .any(|(_, g)| g == group)
            {
                return IneffKind::RepetitionHotkeyAddAssign;
            }
        }

        if repeated_at.is_some() {
            return IneffKind::Repetition;
        }

        IneffKind::Effective
    }

    fn record(&mut self, cmd: &Command) {
        let frame = cmd.frame.get();

        if is_train(cmd) {
            self.train_streak += 1;
        } else if is_selection_change(cmd) {
            self.train_streak = 0;
        }

        if cmd.is_reselection_candidate() {
            self.recent_selects.push_back(frame);
        }
        if let CommandKind::Hotkey { kind, group } = &cmd.kind {
            if kind.is_assign_or_add() {
                self.recent_hotkey_writes.push_back((frame, *group));
            }
        }

        self.recent.push_back((frame, cmd.clone()));
    }
}

fn is_train(cmd: &Command) -> bool {
    matches!(cmd.opcode, opcodes::TRAIN | opcodes::TRAIN_UNIT)
}

fn is_selection_change(cmd: &Command) -> bool {
    matches!(
        cmd.opcode,
        opcodes::SELECT | opcodes::SHIFT_SELECT | opcodes::SHIFT_DESELECT
    ) || matches!(
        &cmd.kind,
        CommandKind::Hotkey { kind, .. } if matches!(kind, crate::commands::HotkeyKind::Select)
    )
}

/// Maps a cancel command to a predicate matching its issuing command.
#[allow(clippy::type_complexity)]
fn cancel_matches(cmd: &Command) -> Option<fn(&Command) -> bool> {
    match cmd.opcode {
        opcodes::CANCEL_TRAIN => Some(is_train),
        opcodes::CANCEL_CONSTRUCTION | opcodes::CANCEL_ADDON => {
            Some(|c| c.opcode == opcodes::BUILD)
        }
        opcodes::CANCEL_MORPH => Some(|c| {
            matches!(c.opcode, opcodes::UNIT_MORPH | opcodes::BUILDING_MORPH)
        }),
        opcodes::CANCEL_RESEARCH => Some(|c| c.opcode == opcodes::RESEARCH),
        opcodes::CANCEL_UPGRADE => Some(|c| c.opcode == opcodes::UPGRADE),
        _ => None,
    }
}

/// Classifies every command in stream order, setting `effective` and
/// `ineff_kind` in place.
///
/// Sync markers are never classified; they stay `Effective` but are
/// excluded from both APM and EAPM by [`Command::counts_for_apm`].
pub fn classify(commands: &mut [Command]) {
    let mut windows: [PlayerWindow; 12] = Default::default();

    for cmd in commands.iter_mut() {
        if cmd.is_sync() {
            continue;
        }
        let Some(window) = windows.get_mut(usize::from(cmd.player_id)) else {
            continue;
        };
        window.prune(cmd.frame.get());

        let verdict = window.classify(cmd);
        cmd.ineff_kind = verdict;
        cmd.effective = verdict.is_effective();

        window.record(cmd);
    }
}

/// Per-family command counts for one player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CommandCounts {
    /// Selection commands (0x09–0x0B).
    pub selects: u32,
    /// Ordered commands (attack-move, right-click, targeted orders).
    pub orders: u32,
    /// Build commands.
    pub builds: u32,
    /// Train and morph commands.
    pub trains: u32,
    /// Research and upgrade commands.
    pub research_upgrades: u32,
    /// Hotkey operations.
    pub hotkeys: u32,
    /// Chat messages.
    pub chats: u32,
    /// Everything else.
    pub other: u32,
}

impl CommandCounts {
    fn record(&mut self, cmd: &Command) {
        match &cmd.kind {
            CommandKind::Select { .. } => self.selects += 1,
            CommandKind::TargetedOrder { .. } => self.orders += 1,
            CommandKind::Build { .. } => self.builds += 1,
            CommandKind::Train { .. }
            | CommandKind::UnitMorph { .. }
            | CommandKind::BuildingMorph { .. } => self.trains += 1,
            CommandKind::Research { .. } | CommandKind::Upgrade { .. } => {
                self.research_upgrades += 1;
            }
            CommandKind::Hotkey { .. } => self.hotkeys += 1,
            CommandKind::Chat { .. } => self.chats += 1,
            _ => self.other += 1,
        }
    }
}

/// Rate metrics for one player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerMetrics {
    /// The player's slot id.
    pub player_id: u8,
    /// The player's name from the header.
    pub name: String,
    /// Actions per minute (all non-sync commands).
    pub apm: f64,
    /// Effective actions per minute.
    pub eapm: f64,
    /// Share of effective commands, 0–100.
    pub efficiency: f64,
    /// Non-sync commands issued.
    pub total_commands: u32,
    /// Commands judged effective.
    pub effective_commands: u32,
    /// Per-family command counts.
    pub counts: CommandCounts,
}

/// Computes per-player metrics over a classified command stream.
///
/// `game_length` is the header's frame count; when it is zero the last
/// command's frame is used instead.
#[must_use]
pub fn compute_metrics(
    commands: &[Command],
    players: &[(u8, String)],
    game_length: Frame,
) -> Vec<PlayerMetrics> {
    let effective_length = if game_length.get() == 0 {
        commands.last().map_or(Frame::new(0), |c| c.frame)
    } else {
        game_length
    };
    let minutes = effective_length.to_minutes();

    players
        .iter()
        .map(|(player_id, name)| {
            let mut total = 0u32;
            let mut effective = 0u32;
            let mut counts = CommandCounts::default();

            for cmd in commands.iter().filter(|c| c.player_id == *player_id) {
                if !cmd.counts_for_apm() {
                    continue;
                }
                total += 1;
                counts.record(cmd);
                if cmd.effective {
                    effective += 1;
                }
            }

            let (apm, eapm) = if minutes > 0.0 {
                (f64::from(total) / minutes, f64::from(effective) / minutes)
            } else {
                (0.0, 0.0)
            };
            let efficiency = if total > 0 {
                f64::from(effective) / f64::from(total) * 100.0
            } else {
                100.0
            };

            PlayerMetrics {
                player_id: *player_id,
                name: name.clone(),
                apm,
                eapm,
                efficiency,
                total_commands: total,
                effective_commands: effective,
                counts,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::SelectKind;

    fn stop(frame: u32, player: u8) -> Command {
        Command::new(Frame::new(frame), player, opcodes::STOP, CommandKind::Simple)
    }

    fn train(frame: u32, player: u8, unit: u16) -> Command {
        Command::new(
            Frame::new(frame),
            player,
            opcodes::TRAIN,
            CommandKind::Train { unit },
        )
    }

    fn select(frame: u32, player: u8, tag: u16) -> Command {
        Command::new(
            Frame::new(frame),
            player,
            opcodes::SELECT,
            CommandKind::Select {
                kind: SelectKind::Select,
                tags: vec![tag],
            },
        )
    }

    #[test]
    fn test_effective_by_default() {
        let mut commands = vec![stop(0, 0), train(100, 0, 64), select(200, 0, 1)];
        classify(&mut commands);
        assert!(commands.iter().all(|c| c.effective));
    }

    #[test]
    fn test_fast_repetition() {
        // Identical command 6 frames apart
        let mut commands = vec![stop(100, 0), stop(106, 0)];
        classify(&mut commands);

        assert!(commands[0].effective);
        assert!(!commands[1].effective);
        assert_eq!(commands[1].ineff_kind, IneffKind::FastRepetition);
    }

    #[test]
    fn test_repetition_outside_fast_window() {
        // Identical command 20 frames apart: slow enough to not be a
        // twitch, still inside the window
        let mut commands = vec![stop(100, 0), stop(120, 0)];
        classify(&mut commands);

        assert_eq!(commands[1].ineff_kind, IneffKind::Repetition);
    }

    #[test]
    fn test_repetition_expires_with_window() {
        let mut commands = vec![stop(100, 0), stop(200, 0)];
        classify(&mut commands);
        assert!(commands[1].effective);
    }

    #[test]
    fn test_repetition_is_per_player() {
        let mut commands = vec![stop(100, 0), stop(106, 1)];
        classify(&mut commands);
        assert!(commands[1].effective);
    }

    #[test]
    fn test_fast_reselection() {
        let mut commands = vec![
            select(100, 0, 1),
            select(105, 0, 2),
            select(110, 0, 3),
            select(115, 0, 4),
        ];
        classify(&mut commands);

        assert!(commands[0].effective);
        assert!(commands[1].effective);
        assert_eq!(commands[2].ineff_kind, IneffKind::FastReselection);
        assert_eq!(commands[3].ineff_kind, IneffKind::FastReselection);
    }

    #[test]
    fn test_fast_cancel() {
        let mut commands = vec![
            train(100, 0, 0),
            Command::new(
                Frame::new(110),
                0,
                opcodes::CANCEL_TRAIN,
                CommandKind::CancelTrain { tag: 0 },
            ),
        ];
        classify(&mut commands);

        assert_eq!(commands[1].ineff_kind, IneffKind::FastCancel);
    }

    #[test]
    fn test_cancel_without_issue_is_effective() {
        let mut commands = vec![Command::new(
            Frame::new(500),
            0,
            opcodes::CANCEL_TRAIN,
            CommandKind::CancelTrain { tag: 0 },
        )];
        classify(&mut commands);
        assert!(commands[0].effective);
    }

    #[test]
    fn test_queue_overflow() {
        // Six trains of alternating units, no selection change: the
        // sixth exceeds the five-slot queue
        let mut commands: Vec<Command> = (0..6)
            .map(|i| train(100 + i * 30, 0, if i % 2 == 0 { 0 } else { 1 }))
            .collect();
        classify(&mut commands);

        assert!(commands[..5].iter().all(|c| c.effective));
        assert_eq!(commands[5].ineff_kind, IneffKind::UnitQueueOverflow);
    }

    #[test]
    fn test_queue_overflow_reset_by_selection() {
        let mut commands: Vec<Command> = (0..5)
            .map(|i| train(100 + i * 30, 0, if i % 2 == 0 { 0 } else { 1 }))
            .collect();
        commands.push(select(260, 0, 9));
        commands.push(train(270, 0, 1));
        classify(&mut commands);

        assert!(commands.last().unwrap().effective);
    }

    #[test]
    fn test_hotkey_repeat_assign() {
        let assign = |frame, group| {
            Command::new(
                Frame::new(frame),
                0,
                opcodes::HOTKEY,
                CommandKind::Hotkey {
                    kind: crate::commands::HotkeyKind::Assign,
                    group,
                },
            )
        };
        let mut commands = vec![assign(100, 1), assign(115, 1), assign(130, 2)];
        classify(&mut commands);

        assert!(commands[0].effective);
        assert_eq!(
            commands[1].ineff_kind,
            IneffKind::RepetitionHotkeyAddAssign
        );
        // Different group is fine
        assert!(commands[2].effective);
    }

    #[test]
    fn test_metrics_apm_eapm() {
        let mut commands = vec![stop(100, 0), stop(106, 0)];
        classify(&mut commands);

        let players = vec![(0u8, "Probe".to_string())];
        // 1440 frames ≈ 1.008 minutes
        let metrics = compute_metrics(&commands, &players, Frame::new(1440));

        assert_eq!(metrics.len(), 1);
        let m = &metrics[0];
        assert_eq!(m.total_commands, 2);
        assert_eq!(m.effective_commands, 1);
        assert!(m.eapm <= m.apm);
        assert!((m.efficiency - 50.0).abs() < f64::EPSILON);
        assert!((m.apm - 2.0 / (1440.0 / 23.81 / 60.0)).abs() < 1e-9);
    }

    #[test]
    fn test_metrics_exclude_sync() {
        let mut commands = vec![
            stop(100, 0),
            Command::new(
                Frame::new(101),
                0,
                opcodes::SYNC,
                CommandKind::Sync { data: [0; 6] },
            ),
        ];
        classify(&mut commands);
        let metrics = compute_metrics(
            &commands,
            &[(0u8, "Probe".to_string())],
            Frame::new(1440),
        );
        assert_eq!(metrics[0].total_commands, 1);
    }

    #[test]
    fn test_metrics_zero_length_uses_last_frame() {
        let mut commands = vec![stop(1440, 0)];
        classify(&mut commands);
        let metrics =
            compute_metrics(&commands, &[(0u8, "P".to_string())], Frame::new(0));
        assert!(metrics[0].apm > 0.0);
    }

    #[test]
    fn test_counts_by_family() {
        let mut commands = vec![
            select(100, 0, 1),
            train(130, 0, 64),
            Command::new(
                Frame::new(160),
                0,
                opcodes::BUILD,
                CommandKind::Build {
                    order: 25,
                    x: 1,
                    y: 1,
                    unit: 156,
                },
            ),
        ];
        classify(&mut commands);
        let metrics =
            compute_metrics(&commands, &[(0u8, "P".to_string())], Frame::new(1440));
        let counts = metrics[0].counts;
        assert_eq!(counts.selects, 1);
        assert_eq!(counts.trains, 1);
        assert_eq!(counts.builds, 1);
        assert_eq!(counts.orders, 0);
    }
}
