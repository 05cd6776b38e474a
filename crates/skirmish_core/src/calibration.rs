//! Attack-power calibration.
//!
//! Finds the smallest attack power that lets one faction win without losing
//! a single unit. Every candidate is simulated from a fresh copy of the
//! starting battlefield, so runs are independent of each other.
//!
//! The scan is linear and ascending. Nothing guarantees that more attack
//! power never costs the faction a unit (an earlier kill can reshape every
//! later path), so a bisection could skip the true minimum.
//! [`audit_monotonicity`] reports how a given battlefield behaves.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{CalibrationConfig, DEFAULT_STARTING_HEALTH};
use crate::error::{Result, SimError};
use crate::factions::Faction;
use crate::outcome::Outcome;
use crate::simulation::{Phase, Simulation};

/// Minimal qualifying power and the battle it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationResult {
    /// Faction whose attack power was searched.
    pub faction: Faction,
    /// Smallest power with zero losses.
    pub attack_power: u32,
    /// Outcome of the battle at that power.
    pub outcome: Outcome,
    /// Number of candidate powers simulated.
    pub candidates_tried: u32,
}

fn ensure_pristine(base: &Simulation) -> Result<()> {
    if base.phase() != Phase::RoundStart || base.completed_rounds() != 0 {
        return Err(SimError::InvalidState(
            "calibration needs a simulation that has not started".into(),
        ));
    }
    Ok(())
}

/// Simulate one candidate power from a fresh copy of `base`.
///
/// Returns `Ok(None)` as soon as `faction` loses a unit, or when the battle
/// stalls before anyone wins.
pub fn evaluate_candidate(base: &Simulation, faction: Faction, power: u32) -> Result<Option<Outcome>> {
    ensure_pristine(base)?;
    let mut sim = base.clone().with_attack_power(faction, power)?;
    let result = match sim.run_without_losses(faction) {
        Err(SimError::Stalemate { round }) => {
            warn!(%faction, power, round, "candidate stalled");
            None
        }
        other => other?,
    };
    debug!(%faction, power, passed = result.is_some(), "candidate evaluated");
    Ok(result)
}

/// Health of the sturdiest unit in `base`. An attack power this high kills
/// anything in one hit.
#[must_use]
pub fn one_shot_health(base: &Simulation) -> u32 {
    base.units()
        .iter()
        .map(|u| u.health.max)
        .max()
        .unwrap_or(DEFAULT_STARTING_HEALTH)
}

/// Sequential calibration driver.
#[derive(Debug, Clone)]
pub struct Calibrator {
    config: CalibrationConfig,
}

impl Calibrator {
    /// Create a calibrator for a validated search range.
    pub fn new(config: CalibrationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Search settings in use.
    #[must_use]
    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Candidate powers for `base`, in the order they are tried.
    #[must_use]
    pub fn candidates(&self, base: &Simulation) -> RangeInclusive<u32> {
        self.config.candidates(one_shot_health(base))
    }

    /// Scan candidates upwards and return the first one without losses.
    pub fn calibrate(&self, base: &Simulation) -> Result<CalibrationResult> {
        ensure_pristine(base)?;
        let faction = self.config.faction;

        for (tried, power) in (1u32..).zip(self.candidates(base)) {
            if let Some(outcome) = evaluate_candidate(base, faction, power)? {
                info!(
                    %faction,
                    power,
                    score = outcome.score,
                    rounds = outcome.completed_rounds,
                    "calibration found flawless attack power"
                );
                return Ok(CalibrationResult {
                    faction,
                    attack_power: power,
                    outcome,
                    candidates_tried: tried,
                });
            }
        }

        Err(SimError::NoQualifyingPower {
            faction,
            max_power: self.config.upper_bound(one_shot_health(base)),
        })
    }
}

/// Full-length result of one candidate in a monotonicity audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Attack power simulated.
    pub attack_power: u32,
    /// Units the audited faction lost.
    pub losses: usize,
    /// Outcome of the full battle.
    pub outcome: Outcome,
}

/// Loss profile of a faction over a range of attack powers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonotonicityAudit {
    /// Faction audited.
    pub faction: Faction,
    /// One entry per power, ascending.
    pub entries: Vec<AuditEntry>,
    /// Powers that lose units although a lower power was flawless.
    pub violations: Vec<u32>,
}

impl MonotonicityAudit {
    /// Build an audit from entries sorted by power.
    #[must_use]
    pub fn from_entries(faction: Faction, entries: Vec<AuditEntry>) -> Self {
        let mut seen_flawless = false;
        let mut violations = Vec::new();
        for entry in &entries {
            if entry.losses == 0 {
                seen_flawless = true;
            } else if seen_flawless {
                violations.push(entry.attack_power);
            }
        }
        Self {
            faction,
            entries,
            violations,
        }
    }

    /// True if no loss reappears above a flawless power.
    #[must_use]
    pub fn is_monotonic(&self) -> bool {
        self.violations.is_empty()
    }

    /// Smallest audited power without losses.
    #[must_use]
    pub fn first_flawless(&self) -> Option<u32> {
        self.entries
            .iter()
            .find(|e| e.losses == 0)
            .map(|e| e.attack_power)
    }
}

/// Run one complete battle for `faction` at `power`, without early exit.
pub fn audit_candidate(base: &Simulation, faction: Faction, power: u32) -> Result<AuditEntry> {
    ensure_pristine(base)?;
    let mut sim = base.clone().with_attack_power(faction, power)?;
    let outcome = sim.run_to_completion()?;
    Ok(AuditEntry {
        attack_power: power,
        losses: outcome.losses_for(faction),
        outcome,
    })
}

/// Simulate every power in `powers` to the end and check whether losses
/// ever come back after a flawless power.
pub fn audit_monotonicity(
    base: &Simulation,
    faction: Faction,
    powers: RangeInclusive<u32>,
) -> Result<MonotonicityAudit> {
    let entries = powers
        .map(|power| audit_candidate(base, faction, power))
        .collect::<Result<Vec<_>>>()?;
    Ok(MonotonicityAudit::from_entries(faction, entries))
}
