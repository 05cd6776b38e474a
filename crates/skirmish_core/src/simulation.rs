//! Round scheduler.
//!
//! Combat proceeds in rounds. At the start of a round every living unit is
//! queued in reading order of its position; each then takes a turn:
//!
//! 1. **Skip** if it died earlier this round.
//! 2. **Check** that an enemy is still alive anywhere. If not, combat is
//!    over and the current round does not count.
//! 3. **Move** one step towards the closest reachable enemy
//!    ([`crate::pathfinding`]).
//! 4. **Attack** the weakest adjacent enemy ([`crate::combat`]).
//!
//! A round that runs through its whole queue increments the round counter.
//!
//! # Determinism
//!
//! The simulation is single-threaded and free of randomness and hash-order
//! iteration: the same battlefield always produces the same outcome.
//!
//! # Example
//!
//! ```
//! use skirmish_core::simulation::Simulation;
//!
//! let mut sim: Simulation = "\
//! ########
//! #.G...#
//! #...EG#
//! #.#.#G#
//! #..G#E#
//! #.....#
//! ########"
//!     .parse()
//!     .unwrap();
//!
//! let outcome = sim.run_to_completion().unwrap();
//! assert_eq!(outcome.completed_rounds, 47);
//! assert_eq!(outcome.score, 27730);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::battlefield::Battlefield;
use crate::combat::{resolve_attack, AttackEvent};
use crate::components::{Position, Unit, UnitId};
use crate::config::SimConfig;
use crate::error::{Result, SimError};
use crate::factions::Faction;
use crate::outcome::Outcome;
use crate::parse::{parse_battlefield, ParsedBattlefield};
use crate::pathfinding::plan_step;

/// Where the round state machine currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Next transition builds the turn order.
    RoundStart,
    /// Next transition handles the unit at this index of the turn order.
    UnitTurn {
        /// Index into the current turn order.
        next: usize,
    },
    /// Every queued unit has had its turn.
    RoundComplete,
    /// A unit found no enemies left. Terminal.
    CombatOver,
}

/// A unit stepping from one cell to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveEvent {
    /// Unit that moved.
    pub unit: UnitId,
    /// Cell it left.
    pub from: Position,
    /// Cell it entered.
    pub to: Position,
}

/// Everything that happened during one round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundReport {
    /// Zero-based index of the round.
    pub round: u32,
    /// Moves, in turn order.
    pub moves: Vec<MoveEvent>,
    /// Attacks, in turn order.
    pub attacks: Vec<AttackEvent>,
    /// True when the round ran to the end and was counted.
    pub completed: bool,
}

impl RoundReport {
    fn new(round: u32) -> Self {
        Self {
            round,
            ..Self::default()
        }
    }

    /// Units killed this round, in the order they fell.
    pub fn deaths(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.attacks.iter().filter(|a| a.killed).map(|a| a.target)
    }

    /// No unit moved or attacked.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.moves.is_empty() && self.attacks.is_empty()
    }
}

/// A complete battle: terrain, units and the round state machine.
///
/// Cloning a simulation that has not started yet gives an independent,
/// identical battle, which is how calibration re-runs the fight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Simulation {
    /// Terrain and occupancy.
    battlefield: Battlefield,
    /// Unit arena, indexed by [`UnitId`]. Dead units stay in place.
    units: Vec<Unit>,
    /// Rounds fully completed so far.
    completed_rounds: u32,
    /// State machine position.
    phase: Phase,
    /// Turn order of the round in progress.
    turn_order: Vec<UnitId>,
    /// Events of the round in progress.
    report: RoundReport,
}

impl Simulation {
    /// Place parsed units on their battlefield using `config` for their stats.
    pub fn new(parsed: ParsedBattlefield, config: &SimConfig) -> Result<Self> {
        config.validate()?;

        let ParsedBattlefield {
            mut battlefield,
            spawns,
        } = parsed;

        let mut units = Vec::with_capacity(spawns.len());
        for (index, (faction, position)) in spawns.into_iter().enumerate() {
            let id = UnitId(u32::try_from(index).map_err(|_| {
                SimError::InvalidState("too many units for 32-bit identifiers".into())
            })?);
            battlefield.place(id, position)?;
            units.push(Unit::new(
                id,
                faction,
                position,
                config.starting_health,
                config.attack_power,
            ));
        }

        debug!(
            width = battlefield.width(),
            height = battlefield.height(),
            units = units.len(),
            "battlefield ready"
        );

        Ok(Self {
            battlefield,
            units,
            completed_rounds: 0,
            phase: Phase::RoundStart,
            turn_order: Vec::new(),
            report: RoundReport::default(),
        })
    }

    /// Parse a battlefield description and build a simulation from it.
    pub fn from_map(input: &str, config: &SimConfig) -> Result<Self> {
        Self::new(parse_battlefield(input)?, config)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Terrain and occupancy.
    #[must_use]
    pub fn battlefield(&self) -> &Battlefield {
        &self.battlefield
    }

    /// Every unit, dead or alive, indexed by id.
    #[must_use]
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Look up a unit by id.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(id.index())
    }

    /// The living unit on a cell.
    #[must_use]
    pub fn unit_at(&self, pos: Position) -> Option<&Unit> {
        self.battlefield
            .occupant(pos)
            .map(|id| &self.units[id.index()])
    }

    /// Living units in arena order.
    pub fn living_units(&self) -> impl Iterator<Item = &Unit> + '_ {
        self.units.iter().filter(|u| u.is_alive())
    }

    /// Number of living units of a faction.
    #[must_use]
    pub fn living_count(&self, faction: Faction) -> usize {
        self.living_units().filter(|u| u.faction == faction).count()
    }

    /// Number of units of a faction that have died.
    #[must_use]
    pub fn losses(&self, faction: Faction) -> usize {
        self.units
            .iter()
            .filter(|u| u.faction == faction && !u.is_alive())
            .count()
    }

    /// Rounds fully completed so far.
    #[must_use]
    pub const fn completed_rounds(&self) -> u32 {
        self.completed_rounds
    }

    /// Current state machine position.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// True once a unit has found no enemies left.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.phase == Phase::CombatOver
    }

    /// Hash of the full simulation state, for determinism checks.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.completed_rounds.hash(&mut hasher);
        self.phase.hash(&mut hasher);
        self.units.hash(&mut hasher);
        self.battlefield.hash(&mut hasher);
        hasher.finish()
    }

    // ------------------------------------------------------------------
    // Setup
    // ------------------------------------------------------------------

    /// Give every unit of `faction` a new attack power.
    pub fn set_attack_power(&mut self, faction: Faction, power: u32) -> Result<()> {
        if power == 0 {
            return Err(SimError::InvalidState("attack power must be positive".into()));
        }
        for unit in self.units.iter_mut().filter(|u| u.faction == faction) {
            unit.attack_power = power;
        }
        Ok(())
    }

    /// Builder form of [`Self::set_attack_power`].
    pub fn with_attack_power(mut self, faction: Faction, power: u32) -> Result<Self> {
        self.set_attack_power(faction, power)?;
        Ok(self)
    }

    // ------------------------------------------------------------------
    // State machine
    // ------------------------------------------------------------------

    /// Perform one state machine transition and return the new phase.
    ///
    /// A transition is one of: building the turn order, handling one queued
    /// unit, or closing a completed round. Errors are terminal for this
    /// simulation.
    pub fn advance(&mut self) -> Result<Phase> {
        let phase = self.phase;
        self.phase = match phase {
            Phase::RoundStart => self.begin_round(),
            Phase::UnitTurn { next } => match self.turn_order.get(next).copied() {
                None => Phase::RoundComplete,
                Some(id) if !self.units[id.index()].is_alive() => Phase::UnitTurn { next: next + 1 },
                Some(id) => {
                    let faction = self.units[id.index()].faction;
                    if self.living_count(faction.enemy()) == 0 {
                        info!(
                            rounds = self.completed_rounds,
                            winner = %faction,
                            "combat over"
                        );
                        Phase::CombatOver
                    } else {
                        self.take_turn(id)?;
                        Phase::UnitTurn { next: next + 1 }
                    }
                }
            },
            Phase::RoundComplete => {
                if self.report.is_idle() {
                    return Err(SimError::Stalemate {
                        round: self.completed_rounds,
                    });
                }
                self.completed_rounds += 1;
                self.report.completed = true;
                debug!(round = self.completed_rounds, "round complete");
                Phase::RoundStart
            }
            Phase::CombatOver => Phase::CombatOver,
        };
        Ok(self.phase)
    }

    fn begin_round(&mut self) -> Phase {
        let mut order: Vec<(Position, UnitId)> =
            self.living_units().map(|u| (u.position, u.id)).collect();
        order.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        self.turn_order = order.into_iter().map(|(_, id)| id).collect();
        self.report = RoundReport::new(self.completed_rounds);

        if self.turn_order.is_empty() {
            info!("no units on the battlefield");
            return Phase::CombatOver;
        }
        Phase::UnitTurn { next: 0 }
    }

    fn take_turn(&mut self, id: UnitId) -> Result<()> {
        let unit = &self.units[id.index()];
        if let Some(plan) = plan_step(&self.battlefield, &self.units, unit)? {
            let from = unit.position;
            self.battlefield.relocate(id, from, plan.step)?;
            self.units[id.index()].position = plan.step;
            debug!(unit = %id, %from, to = %plan.step, target = %plan.target, "move");
            self.report.moves.push(MoveEvent {
                unit: id,
                from,
                to: plan.step,
            });
        }

        if let Some(attack) = resolve_attack(&mut self.battlefield, &mut self.units, id)? {
            self.report.attacks.push(attack);
        }

        #[cfg(feature = "debug-validation")]
        self.validate()?;

        Ok(())
    }

    /// Run until the current round ends, either completed or cut short.
    pub fn run_round(&mut self) -> Result<RoundReport> {
        if self.is_over() {
            return Err(SimError::InvalidState("combat is already over".into()));
        }
        loop {
            match self.advance()? {
                Phase::RoundStart | Phase::CombatOver => break,
                Phase::UnitTurn { .. } | Phase::RoundComplete => {}
            }
        }
        Ok(std::mem::take(&mut self.report))
    }

    /// Run until combat ends and score the result.
    pub fn run_to_completion(&mut self) -> Result<Outcome> {
        while !self.is_over() {
            self.run_round()?;
        }
        self.outcome()
    }

    /// Run until combat ends, giving up as soon as `faction` loses a unit.
    ///
    /// Returns `Ok(None)` when the run was abandoned.
    pub fn run_without_losses(&mut self, faction: Faction) -> Result<Option<Outcome>> {
        while !self.is_over() {
            self.advance()?;
            if self.losses(faction) > 0 {
                debug!(
                    %faction,
                    round = self.completed_rounds,
                    "first loss, abandoning run"
                );
                return Ok(None);
            }
        }
        self.outcome().map(Some)
    }

    /// Score a finished battle.
    pub fn outcome(&self) -> Result<Outcome> {
        Outcome::evaluate(self)
    }

    /// Draw the battlefield with unit health, as [`fmt::Display`] does.
    #[must_use]
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Check occupancy against the unit arena.
    pub fn validate(&self) -> Result<()> {
        let mut living = 0;
        for unit in self.living_units() {
            living += 1;
            if self.battlefield.occupant(unit.position) != Some(unit.id) {
                return Err(SimError::InvariantViolation(format!(
                    "unit {} believes it is at {} but the grid disagrees",
                    unit.id, unit.position
                )));
            }
        }
        if self.battlefield.occupied_count() != living {
            return Err(SimError::InvariantViolation(format!(
                "{} occupied cells for {living} living units",
                self.battlefield.occupied_count()
            )));
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn units_mut(&mut self) -> &mut [Unit] {
        &mut self.units
    }

    #[cfg(test)]
    pub(crate) fn parts_mut(&mut self) -> (&mut Battlefield, &mut [Unit]) {
        (&mut self.battlefield, &mut self.units)
    }
}

impl FromStr for Simulation {
    type Err = SimError;

    /// Parse with the default rules.
    fn from_str(s: &str) -> Result<Self> {
        Self::from_map(s, &SimConfig::default())
    }
}

impl fmt::Display for Simulation {
    /// Draws the grid. Each row holding units is followed by three spaces
    /// and the health of those units, left to right.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.battlefield.height() {
            let mut line = String::with_capacity(self.battlefield.width());
            let mut roster = Vec::new();
            for col in 0..self.battlefield.width() {
                let pos = Position::new(row, col);
                if let Some(unit) = self.unit_at(pos) {
                    line.push(unit.faction.marker());
                    roster.push(format!(
                        "{}({})",
                        unit.faction.marker(),
                        unit.health.current
                    ));
                } else if let Some(cell) = self.battlefield.cell(pos) {
                    line.push(cell.glyph());
                }
            }
            if roster.is_empty() {
                writeln!(f, "{line}")?;
            } else {
                writeln!(f, "{line}   {}", roster.join(", "))?;
            }
        }
        Ok(())
    }
}
