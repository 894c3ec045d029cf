//! Static game data tables.
//!
//! Unit, technology and upgrade ids in the command stream are bare
//! numbers; these tables map them to display names, mineral/gas costs,
//! and supply effects for the build-order extractor.
//!
//! Supply is tracked in halves throughout (a Zergling costs one half),
//! matching how the game engine stores it.

use crate::header::Race;

/// Display names for the 228 unit type ids.
pub const UNIT_NAMES: [&str; 228] = [
    "Marine",
    "Ghost",
    "Vulture",
    "Goliath",
    "Goliath Turret",
    "Siege Tank (Tank Mode)",
    "Siege Tank Turret",
    "SCV",
    "Wraith",
    "Science Vessel",
    "Gui Montag",
    "Dropship",
    "Battlecruiser",
    "Spider Mine",
    "Nuclear Missile",
    "Civilian",
    "Sarah Kerrigan",
    "Alan Schezar",
    "Alan Schezar Turret",
    "Jim Raynor (Vulture)",
    "Jim Raynor (Marine)",
    "Tom Kazansky",
    "Magellan",
    "Edmund Duke (Tank Mode)",
    "Edmund Duke Turret (Tank Mode)",
    "Edmund Duke (Siege Mode)",
    "Edmund Duke Turret (Siege Mode)",
    "Arcturus Mengsk",
    "Hyperion",
    "Norad II",
    "Siege Tank (Siege Mode)",
    "Siege Tank Turret (Siege Mode)",
    "Firebat",
    "Scanner Sweep",
    "Medic",
    "Larva",
    "Egg",
    "Zergling",
    "Hydralisk",
    "Ultralisk",
    "Broodling",
    "Drone",
    "Overlord",
    "Mutalisk",
    "Guardian",
    "Queen",
    "Defiler",
    "Scourge",
    "Torrasque",
    "Matriarch",
    "Infested Terran",
    "Infested Kerrigan",
    "Unclean One",
    "Hunter Killer",
    "Devouring One",
    "Kukulza (Mutalisk)",
    "Kukulza (Guardian)",
    "Yggdrasill",
    "Valkyrie",
    "Mutalisk Cocoon",
    "Corsair",
    "Dark Templar",
    "Devourer",
    "Dark Archon",
    "Probe",
    "Zealot",
    "Dragoon",
    "High Templar",
    "Archon",
    "Shuttle",
    "Scout",
    "Arbiter",
    "Carrier",
    "Interceptor",
    "Dark Templar (Hero)",
    "Zeratul",
    "Tassadar/Zeratul Archon",
    "Fenix (Zealot)",
    "Fenix (Dragoon)",
    "Tassadar",
    "Mojo",
    "Warbringer",
    "Gantrithor",
    "Reaver",
    "Observer",
    "Scarab",
    "Danimoth",
    "Aldaris",
    "Artanis",
    "Rhynadon",
    "Bengalaas",
    "Cargo Ship",
    "Mercenary Gunship",
    "Scantid",
    "Kakaru",
    "Ragnasaur",
    "Ursadon",
    "Lurker Egg",
    "Raszagal",
    "Samir Duran",
    "Alexei Stukov",
    "Map Revealer",
    "Gerard DuGalle",
    "Lurker",
    "Infested Duran",
    "Disruption Web",
    "Command Center",
    "Comsat Station",
    "Nuclear Silo",
    "Supply Depot",
    "Refinery",
    "Barracks",
    "Academy",
    "Factory",
    "Starport",
    "Control Tower",
    "Science Facility",
    "Covert Ops",
    "Physics Lab",
    "Starbase",
    "Machine Shop",
    "Repair Bay",
    "Engineering Bay",
    "Armory",
    "Missile Turret",
    "Bunker",
    "Norad II (Crashed)",
    "Ion Cannon",
    "Uraj Crystal",
    "Khalis Crystal",
    "Infested Command Center",
    "Hatchery",
    "Lair",
    "Hive",
    "Nydus Canal",
    "Hydralisk Den",
    "Defiler Mound",
    "Greater Spire",
    "Queen's Nest",
    "Evolution Chamber",
    "Ultralisk Cavern",
    "Spire",
    "Spawning Pool",
    "Creep Colony",
    "Spore Colony",
    "Unused Zerg Building",
    "Sunken Colony",
    "Overmind (With Shell)",
    "Overmind",
    "Extractor",
    "Mature Chrysalis",
    "Cerebrate",
    "Cerebrate Daggoth",
    "Unused Zerg Building 2",
    "Nexus",
    "Robotics Facility",
    "Pylon",
    "Assimilator",
    "Unused Protoss Building",
    "Observatory",
    "Gateway",
    "Unused Protoss Building 2",
    "Photon Cannon",
    "Citadel of Adun",
    "Cybernetics Core",
    "Templar Archives",
    "Forge",
    "Stargate",
    "Stasis Cell/Prison",
    "Fleet Beacon",
    "Arbiter Tribunal",
    "Robotics Support Bay",
    "Shield Battery",
    "Khaydarin Crystal Formation",
    "Protoss Temple",
    "Xel'Naga Temple",
    "Mineral Field (Type 1)",
    "Mineral Field (Type 2)",
    "Mineral Field (Type 3)",
    "Cave",
    "Cave-in",
    "Cantina",
    "Mining Platform",
    "Independent Command Center",
    "Independent Starport",
    "Independent Jump Gate",
    "Ruins",
    "Khaydarin Crystal Formation (Unused)",
    "Vespene Geyser",
    "Warp Gate",
    "Psi Disrupter",
    "Zerg Marker",
    "Terran Marker",
    "Protoss Marker",
    "Zerg Beacon",
    "Terran Beacon",
    "Protoss Beacon",
    "Zerg Flag Beacon",
    "Terran Flag Beacon",
    "Protoss Flag Beacon",
    "Power Generator",
    "Overmind Cocoon",
    "Dark Swarm",
    "Floor Missile Trap",
    "Floor Hatch",
    "Left Upper Level Door",
    "Right Upper Level Door",
    "Left Pit Door",
    "Right Pit Door",
    "Floor Gun Trap",
    "Left Wall Missile Trap",
    "Left Wall Flame Trap",
    "Right Wall Missile Trap",
    "Right Wall Flame Trap",
    "Start Location",
    "Flag",
    "Young Chrysalis",
    "Psi Emitter",
    "Data Disc",
    "Khaydarin Crystal",
    "Mineral Cluster (Type 1)",
    "Mineral Cluster (Type 2)",
    "Protoss Vespene Gas Orb (Type 1)",
    "Protoss Vespene Gas Orb (Type 2)",
    "Zerg Vespene Gas Sac (Type 1)",
    "Zerg Vespene Gas Sac (Type 2)",
    "Terran Vespene Gas Tank (Type 1)",
    "Terran Vespene Gas Tank (Type 2)",
];

/// Returns the display name of a unit type id.
#[must_use]
pub fn unit_name(unit: u16) -> &'static str {
    UNIT_NAMES
        .get(usize::from(unit))
        .copied()
        .unwrap_or("Unknown")
}

/// Returns the mineral and gas cost of a unit type, when known.
///
/// Morphs list the morph cost, not the cumulative cost of the base
/// unit. Units outside the table (heroes, critters, doodads) return
/// `None`.
#[must_use]
pub fn unit_cost(unit: u16) -> Option<(u16, u16)> {
    let cost = match unit {
        // Terran units
        0 => (50, 0),    // Marine
        1 => (25, 75),   // Ghost
        2 => (75, 0),    // Vulture
        3 => (100, 50),  // Goliath
        5 => (150, 100), // Siege Tank
        7 => (50, 0),    // SCV
        8 => (150, 100), // Wraith
        9 => (100, 225), // Science Vessel
        11 => (100, 100), // Dropship
        12 => (400, 300), // Battlecruiser
        32 => (50, 25),  // Firebat
        34 => (50, 25),  // Medic
        58 => (250, 125), // Valkyrie
        // Zerg units
        37 => (50, 0),   // Zergling pair
        38 => (75, 25),  // Hydralisk
        39 => (200, 200), // Ultralisk
        41 => (50, 0),   // Drone
        42 => (100, 0),  // Overlord
        43 => (100, 100), // Mutalisk
        44 => (50, 100), // Guardian morph
        45 => (100, 100), // Queen
        46 => (50, 150), // Defiler
        47 => (25, 75),  // Scourge pair
        62 => (150, 50), // Devourer morph
        103 => (50, 100), // Lurker morph
        // Protoss units
        60 => (150, 100), // Corsair
        61 => (125, 100), // Dark Templar
        64 => (50, 0),   // Probe
        65 => (100, 0),  // Zealot
        66 => (125, 50), // Dragoon
        67 => (50, 150), // High Templar
        69 => (200, 0),  // Shuttle
        70 => (275, 125), // Scout
        71 => (100, 350), // Arbiter
        72 => (350, 250), // Carrier
        73 => (25, 0),   // Interceptor
        83 => (200, 100), // Reaver
        84 => (25, 75),  // Observer
        85 => (15, 0),   // Scarab
        // Terran buildings
        106 => (400, 0),  // Command Center
        107 => (50, 50),  // Comsat Station
        108 => (100, 100), // Nuclear Silo
        109 => (100, 0),  // Supply Depot
        110 => (100, 0),  // Refinery
        111 => (150, 0),  // Barracks
        112 => (150, 0),  // Academy
        113 => (200, 100), // Factory
        114 => (150, 100), // Starport
        115 => (50, 50),  // Control Tower
        116 => (100, 150), // Science Facility
        117 => (50, 50),  // Covert Ops
        118 => (50, 50),  // Physics Lab
        120 => (50, 50),  // Machine Shop
        122 => (125, 0),  // Engineering Bay
        123 => (100, 50), // Armory
        124 => (75, 0),   // Missile Turret
        125 => (100, 0),  // Bunker
        // Zerg buildings
        131 => (300, 0),  // Hatchery
        132 => (150, 100), // Lair morph
        133 => (200, 150), // Hive morph
        134 => (150, 0),  // Nydus Canal
        135 => (100, 50), // Hydralisk Den
        136 => (100, 100), // Defiler Mound
        137 => (100, 150), // Greater Spire morph
        138 => (150, 100), // Queen's Nest
        139 => (75, 0),   // Evolution Chamber
        140 => (150, 200), // Ultralisk Cavern
        141 => (200, 150), // Spire
        142 => (200, 0),  // Spawning Pool
        143 => (75, 0),   // Creep Colony
        144 => (50, 0),   // Spore Colony morph
        146 => (50, 0),   // Sunken Colony morph
        149 => (50, 0),   // Extractor
        // Protoss buildings
        154 => (400, 0),  // Nexus
        155 => (200, 200), // Robotics Facility
        156 => (100, 0),  // Pylon
        157 => (100, 0),  // Assimilator
        159 => (50, 100), // Observatory
        160 => (150, 0),  // Gateway
        162 => (150, 0),  // Photon Cannon
        163 => (150, 100), // Citadel of Adun
        164 => (200, 0),  // Cybernetics Core
        165 => (150, 200), // Templar Archives
        166 => (150, 0),  // Forge
        167 => (150, 150), // Stargate
        169 => (300, 200), // Fleet Beacon
        170 => (200, 150), // Arbiter Tribunal
        171 => (150, 100), // Robotics Support Bay
        172 => (100, 0),  // Shield Battery
        _ => return None,
    };
    Some(cost)
}

/// Returns the supply a unit consumes, in halves.
///
/// Paired morphs (Zerglings, Scourge) report the whole egg's cost.
/// Units with no supply cost, including everything outside the table,
/// return 0.
#[must_use]
pub fn supply_cost(unit: u16) -> u16 {
    match unit {
        0 | 1 | 7 | 32 | 34 => 2,        // infantry, SCV
        2 | 3 | 5 | 8 | 9 | 11 => 4,     // Terran vehicles and ships
        58 => 6,                          // Valkyrie
        12 => 12,                         // Battlecruiser
        37 | 47 => 2,                     // Zergling / Scourge pair
        38 | 41 => 2,                     // Hydralisk, Drone
        43 | 45 | 46 => 4,                // Mutalisk, Queen, Defiler
        39 => 8,                          // Ultralisk
        103 => 2,                         // Lurker (beyond the Hydralisk)
        64 | 84 => 2,                     // Probe, Observer
        65 | 66 | 67 | 61 | 69 | 60 => 4, // gateway units, Shuttle, Corsair
        70 => 6,                          // Scout
        71 | 83 => 8,                     // Arbiter, Reaver
        72 => 12,                         // Carrier
        _ => 0,
    }
}

/// Returns the supply a unit provides, in halves.
#[must_use]
pub fn supply_provided(unit: u16) -> u16 {
    match unit {
        42 | 109 | 156 => 16, // Overlord, Supply Depot, Pylon
        106 => 20,            // Command Center
        154 => 18,            // Nexus
        131 | 132 | 133 => 2, // Hatchery, Lair, Hive
        _ => 0,
    }
}

/// Returns a race's starting supply as (used, total), in halves.
///
/// Every race starts with four workers; the totals come from the town
/// hall (plus the Overlord for Zerg).
#[must_use]
pub fn initial_supply(race: Race) -> (u16, u16) {
    match race {
        Race::Terran => (8, 20),
        Race::Protoss => (8, 18),
        Race::Zerg => (8, 18),
        Race::Random | Race::Invalid(_) => (8, 18),
    }
}

/// Formats a half-supply count for display ("4" or "4.5").
#[must_use]
pub fn supply_string(halves: u16) -> String {
    if halves % 2 == 0 {
        format!("{}", halves / 2)
    } else {
        format!("{}.5", halves / 2)
    }
}

/// Returns the display name of a technology id, when known.
#[must_use]
pub fn tech_name(tech: u8) -> Option<&'static str> {
    let name = match tech {
        0 => "Stim Packs",
        1 => "Lockdown",
        2 => "EMP Shockwave",
        3 => "Spider Mines",
        4 => "Scanner Sweep",
        5 => "Tank Siege Mode",
        6 => "Defensive Matrix",
        7 => "Irradiate",
        8 => "Yamato Gun",
        9 => "Cloaking Field",
        10 => "Personnel Cloaking",
        11 => "Burrowing",
        12 => "Infestation",
        13 => "Spawn Broodlings",
        14 => "Dark Swarm",
        15 => "Plague",
        16 => "Consume",
        17 => "Ensnare",
        18 => "Parasite",
        19 => "Psionic Storm",
        20 => "Hallucination",
        21 => "Recall",
        22 => "Stasis Field",
        23 => "Archon Warp",
        24 => "Restoration",
        25 => "Disruption Web",
        27 => "Mind Control",
        28 => "Dark Archon Meld",
        29 => "Feedback",
        30 => "Optical Flare",
        31 => "Maelstrom",
        32 => "Lurker Aspect",
        34 => "Healing",
        _ => return None,
    };
    Some(name)
}

/// Returns the display name of an upgrade id, when known.
#[must_use]
pub fn upgrade_name(upgrade: u8) -> Option<&'static str> {
    let name = match upgrade {
        0 => "Terran Infantry Armor",
        1 => "Terran Vehicle Plating",
        2 => "Terran Ship Plating",
        3 => "Zerg Carapace",
        4 => "Zerg Flyer Carapace",
        5 => "Protoss Ground Armor",
        6 => "Protoss Air Armor",
        7 => "Terran Infantry Weapons",
        8 => "Terran Vehicle Weapons",
        9 => "Terran Ship Weapons",
        10 => "Zerg Melee Attacks",
        11 => "Zerg Missile Attacks",
        12 => "Zerg Flyer Attacks",
        13 => "Protoss Ground Weapons",
        14 => "Protoss Air Weapons",
        15 => "Protoss Plasma Shields",
        16 => "U-238 Shells",
        17 => "Ion Thrusters",
        19 => "Titan Reactor",
        20 => "Ocular Implants",
        21 => "Moebius Reactor",
        22 => "Apollo Reactor",
        23 => "Colossus Reactor",
        24 => "Ventral Sacs",
        25 => "Antennae",
        26 => "Pneumatized Carapace",
        27 => "Metabolic Boost",
        28 => "Adrenal Glands",
        29 => "Muscular Augments",
        30 => "Grooved Spines",
        31 => "Gamete Meiosis",
        32 => "Metasynaptic Node",
        33 => "Singularity Charge",
        34 => "Leg Enhancements",
        35 => "Scarab Damage",
        36 => "Reaver Capacity",
        37 => "Gravitic Drive",
        38 => "Sensor Array",
        39 => "Gravitic Boosters",
        40 => "Khaydarin Amulet",
        41 => "Apial Sensors",
        42 => "Gravitic Thrusters",
        43 => "Carrier Capacity",
        44 => "Khaydarin Core",
        47 => "Argus Jewel",
        49 => "Argus Talisman",
        51 => "Caduceus Reactor",
        52 => "Chitinous Plating",
        53 => "Anabolic Synthesis",
        54 => "Charon Boosters",
        _ => return None,
    };
    Some(name)
}
