//! Build-order extraction.
//!
//! The build order is the chronological subset of a player's commands
//! that produce buildings, units, research or upgrades, annotated with
//! a running supply estimate and resource costs.
//!
//! The supply numbers are an estimate from the command stream alone:
//! the replay does not record unit deaths or cancelled production, so
//! the counter only ever grows. It starts at the race's initial supply,
//! grows by each produced unit's cost, and raises the cap for each
//! supply-providing structure.

use serde::Serialize;

use crate::commands::{Command, CommandKind};
use crate::data;
use crate::frame::Frame;
use crate::header::Race;

/// What a build-order item produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BuildAction {
    /// A building placement or building morph.
    Build,
    /// A unit train or unit morph.
    Train,
    /// A technology research.
    Research,
    /// An upgrade.
    Upgrade,
}

/// One entry in a player's build order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildOrderItem {
    /// Frame the command was issued on.
    pub frame: Frame,
    /// The frame rendered as a time string.
    pub time: String,
    /// Estimated supply in use when the command was issued, in halves.
    pub supply_used: u16,
    /// Estimated supply cap at that moment, in halves.
    pub supply_total: u16,
    /// What kind of production this is.
    pub action: BuildAction,
    /// Display name of the unit, technology or upgrade.
    pub name: String,
    /// The raw unit, technology or upgrade id.
    pub id: u16,
    /// Mineral cost, when the cost table knows the unit.
    pub minerals: Option<u16>,
    /// Gas cost, when the cost table knows the unit.
    pub gas: Option<u16>,
}

impl BuildOrderItem {
    /// Formats the supply estimate as "used/total" in whole supply.
    #[must_use]
    pub fn supply_string(&self) -> String {
        format!(
            "{}/{}",
            data::supply_string(self.supply_used),
            data::supply_string(self.supply_total)
        )
    }
}

/// The build order of one player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerBuildOrder {
    /// The player's slot id.
    pub player_id: u8,
    /// Build-order entries in frame order.
    pub items: Vec<BuildOrderItem>,
}

/// Extracts the build order for every listed player.
#[must_use]
pub fn extract_build_orders(
    commands: &[Command],
    players: &[(u8, Race)],
) -> Vec<PlayerBuildOrder> {
    players
        .iter()
        .map(|(player_id, race)| PlayerBuildOrder {
            player_id: *player_id,
            items: extract_for_player(commands, *player_id, *race),
        })
        .collect()
}

/// Extracts one player's build order with its running supply estimate.
#[must_use]
pub fn extract_for_player(commands: &[Command], player_id: u8, race: Race) -> Vec<BuildOrderItem> {
    let (mut used, mut total) = data::initial_supply(race);
    let mut items = Vec::new();

    for cmd in commands.iter().filter(|c| c.player_id == player_id) {
        let Some((action, unit)) = production_target(cmd) else {
            continue;
        };

        let (name, minerals, gas, consumes_supply) = match action {
            BuildAction::Research => {
                let id = u8::try_from(unit).unwrap_or(u8::MAX);
                let name = data::tech_name(id)
                    .map_or_else(|| format!("Tech 0x{id:02X}"), ToString::to_string);
                (name, None, None, false)
            }
            BuildAction::Upgrade => {
                let id = u8::try_from(unit).unwrap_or(u8::MAX);
                let name = data::upgrade_name(id)
                    .map_or_else(|| format!("Upgrade 0x{id:02X}"), ToString::to_string);
                (name, None, None, false)
            }
            BuildAction::Build | BuildAction::Train => {
                let landing = matches!(
                    cmd.kind,
                    CommandKind::Build {
                        order: crate::commands::types::ORDER_BUILDING_LAND,
                        ..
                    }
                );
                if landing {
                    // Landing relocates an existing building; nothing is
                    // produced, so the costs stay out of the estimate.
                    ("Land".to_string(), None, None, false)
                } else {
                    let cost = data::unit_cost(unit);
                    (
                        data::unit_name(unit).to_string(),
                        cost.map(|(m, _)| m),
                        cost.map(|(_, g)| g),
                        true,
                    )
                }
            }
        };

        items.push(BuildOrderItem {
            frame: cmd.frame,
            time: cmd.frame.time_string(),
            supply_used: used,
            supply_total: total,
            action,
            name,
            id: unit,
            minerals,
            gas,
        });

        if consumes_supply {
            used += data::supply_cost(unit);
            total += data::supply_provided(unit);
        }
    }

    items
}

/// Maps a command to its production action and target id, if any.
fn production_target(cmd: &Command) -> Option<(BuildAction, u16)> {
    match &cmd.kind {
        CommandKind::Build { unit, .. } => Some((BuildAction::Build, *unit)),
        CommandKind::BuildingMorph { unit } => Some((BuildAction::Build, *unit)),
        CommandKind::Train { unit } | CommandKind::UnitMorph { unit } => {
            Some((BuildAction::Train, *unit))
        }
        CommandKind::Research { tech } => Some((BuildAction::Research, u16::from(*tech))),
        CommandKind::Upgrade { upgrade } => Some((BuildAction::Upgrade, u16::from(*upgrade))),
        _ => None,
    }
}
