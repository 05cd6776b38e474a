//! Scoring a finished battle.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::factions::Faction;
use crate::simulation::Simulation;

/// Final result of a battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// Faction left standing. `None` only for a battlefield without units.
    pub winner: Option<Faction>,
    /// Rounds that ran to the end before combat stopped.
    pub completed_rounds: u32,
    /// Sum of the health of every surviving unit.
    pub remaining_health: u64,
    /// `remaining_health * completed_rounds`.
    pub score: u64,
    /// Units lost per faction.
    pub losses: BTreeMap<Faction, usize>,
}

impl Outcome {
    /// Score a simulation that has reached the end of combat.
    pub fn evaluate(sim: &Simulation) -> Result<Self> {
        if !sim.is_over() {
            return Err(SimError::InvalidState(format!(
                "combat still running after {} rounds",
                sim.completed_rounds()
            )));
        }

        let remaining_health: u64 = sim.living_units().map(|u| u64::from(u.health.current)).sum();
        let winner = sim.living_units().next().map(|u| u.faction);
        let losses = Faction::ALL
            .iter()
            .map(|&faction| (faction, sim.losses(faction)))
            .collect();
        let completed_rounds = sim.completed_rounds();

        Ok(Self {
            winner,
            completed_rounds,
            remaining_health,
            score: remaining_health * u64::from(completed_rounds),
            losses,
        })
    }

    /// Units `faction` lost.
    #[must_use]
    pub fn losses_for(&self, faction: Faction) -> usize {
        self.losses.get(&faction).copied().unwrap_or(0)
    }

    /// True when `faction` finished without losing a unit.
    #[must_use]
    pub fn is_flawless_for(&self, faction: Faction) -> bool {
        self.losses_for(faction) == 0
    }
}
