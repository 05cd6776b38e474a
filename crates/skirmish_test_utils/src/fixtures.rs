//! Test fixtures and helpers.
//!
//! The documented example battles with their known results, for
//! regression tests across all crates.

use skirmish_core::factions::Faction;
use skirmish_core::simulation::Simulation;

/// A documented battle and what it must produce under default rules.
#[derive(Debug, Clone, Copy)]
pub struct Fixture {
    /// Short name used in test output.
    pub name: &'static str,
    /// Starting battlefield.
    pub map: &'static str,
    /// Full rounds before combat ends.
    pub rounds: u32,
    /// Health left on the winning side.
    pub remaining_health: u64,
    /// `rounds * remaining_health`.
    pub score: u64,
    /// Faction left standing.
    pub winner: Faction,
    /// Rendered end state, rows with units annotated with health.
    pub final_state: &'static str,
    /// Minimal flawless elf attack power and the score it yields, where documented.
    pub calibration: Option<(u32, u64)>,
}

impl Fixture {
    /// Fresh simulation of this battle with default rules.
    ///
    /// # Panics
    ///
    /// Panics if the fixture map does not parse, which is a fixture bug.
    #[must_use]
    pub fn simulation(&self) -> Simulation {
        self.map
            .parse()
            .unwrap_or_else(|e| panic!("fixture {} does not parse: {e}", self.name))
    }
}

/// The 47-round walkthrough battle.
pub const WALKTHROUGH: Fixture = Fixture {
    name: "walkthrough",
    map: "\
#######
#.G...#
#...EG#
#.#.#G#
#..G#E#
#.....#
#######",
    rounds: 47,
    remaining_health: 590,
    score: 27730,
    winner: Faction::Goblin,
    final_state: "\
#######
#G....#   G(200)
#.G...#   G(131)
#.#.#G#   G(59)
#...#.#
#....G#   G(200)
#######",
    calibration: Some((15, 4988)),
};

/// Elves overwhelm a split goblin force.
pub const ELVES_HOLD: Fixture = Fixture {
    name: "elves_hold",
    map: "\
#######
#G..#E#
#E#E.E#
#G.##.#
#...#E#
#...E.#
#######",
    rounds: 37,
    remaining_health: 982,
    score: 36334,
    winner: Faction::Elf,
    final_state: "\
#######
#...#E#   E(200)
#E#...#   E(197)
#.E##.#   E(185)
#E..#E#   E(200), E(200)
#.....#
#######",
    calibration: None,
};

/// Elves win; four attack power is already flawless.
pub const ELVES_SWEEP: Fixture = Fixture {
    name: "elves_sweep",
    map: "\
#######
#E..EG#
#.#G.E#
#E.##E#
#G..#.#
#..E#.#
#######",
    rounds: 46,
    remaining_health: 859,
    score: 39514,
    winner: Faction::Elf,
    final_state: "\
#######
#.E.E.#   E(164), E(197)
#.#E..#   E(200)
#E.##.#   E(98)
#.E.#.#   E(200)
#...#.#
#######",
    calibration: Some((4, 31284)),
};

/// Goblins win a cramped fight.
pub const GOBLINS_CRAMPED: Fixture = Fixture {
    name: "goblins_cramped",
    map: "\
#######
#E.G#.#
#.#G..#
#G.#.G#
#G..#.#
#...E.#
#######",
    rounds: 35,
    remaining_health: 793,
    score: 27755,
    winner: Faction::Goblin,
    final_state: "\
#######
#G.G#.#   G(200), G(98)
#.#G..#   G(200)
#..#..#
#...#G#   G(95)
#...G.#   G(200)
#######",
    calibration: Some((15, 3478)),
};

/// Goblins win through narrow corridors.
pub const GOBLINS_CORRIDORS: Fixture = Fixture {
    name: "goblins_corridors",
    map: "\
#######
#.E...#
#.#..G#
#.###.#
#E#G#G#
#...#G#
#######",
    rounds: 54,
    remaining_health: 536,
    score: 28944,
    winner: Faction::Goblin,
    final_state: "\
#######
#.....#
#.#G..#   G(200)
#.###.#
#.#.#.#
#G.G#G#   G(98), G(38), G(200)
#######",
    calibration: Some((12, 6474)),
};

/// Goblins converge on two elves in an open hall.
pub const GOBLINS_HALL: Fixture = Fixture {
    name: "goblins_hall",
    map: "\
#########
#G......#
#.E.#...#
#..##..G#
#...##..#
#...#...#
#.G...G.#
#.....G.#
#########",
    rounds: 20,
    remaining_health: 937,
    score: 18740,
    winner: Faction::Goblin,
    final_state: "\
#########
#.G.....#   G(137)
#G.G#...#   G(200), G(200)
#.G##...#   G(200)
#...##..#
#.G.#...#   G(200)
#.......#
#.......#
#########",
    calibration: Some((34, 1140)),
};

/// Every documented battle.
pub const ALL: [Fixture; 6] = [
    WALKTHROUGH,
    ELVES_HOLD,
    ELVES_SWEEP,
    GOBLINS_CRAMPED,
    GOBLINS_CORRIDORS,
    GOBLINS_HALL,
];

/// Battlefield where the two sides are walled off from each other.
pub const SEALED_OFF: &str = "\
#########
#E..#..G#
#...#...#
#########";

/// Battlefield where elves win flawlessly at power 25 but lose a unit again
/// at 29 through 33.
pub const RELAPSING_LOSSES: &str = "\
#########
#.#..G.##
#...G.G.#
##.GG##.#
#G......#
#.#.#.E.#
#..EG..G#
#########";
