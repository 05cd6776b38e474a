//! Simulation parameters.
//!
//! Defaults reproduce the standard rules: every unit starts with 200 health
//! and 3 attack power, and calibration searches elf attack power from 4.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::factions::Faction;

/// Starting health of every unit.
pub const DEFAULT_STARTING_HEALTH: u32 = 200;

/// Attack power of every unit before calibration.
pub const DEFAULT_ATTACK_POWER: u32 = 3;

/// First attack power the calibration driver tries.
pub const DEFAULT_CALIBRATION_START: u32 = 4;

/// Rules applied when building a simulation from a battlefield.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Health every unit starts with.
    pub starting_health: u32,
    /// Attack power every unit starts with.
    pub attack_power: u32,
    /// Calibration search settings.
    pub calibration: CalibrationConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            starting_health: DEFAULT_STARTING_HEALTH,
            attack_power: DEFAULT_ATTACK_POWER,
            calibration: CalibrationConfig::default(),
        }
    }
}

impl SimConfig {
    /// Reject parameters the simulation cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.starting_health == 0 {
            return Err(SimError::InvalidState(
                "starting_health must be positive".into(),
            ));
        }
        if self.attack_power == 0 {
            return Err(SimError::InvalidState("attack_power must be positive".into()));
        }
        self.calibration.validate()
    }
}

/// Settings for the attack-power search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Faction whose attack power is searched.
    pub faction: Faction,
    /// First candidate power.
    pub start_power: u32,
    /// Last candidate power (inclusive). `None` searches up to the power
    /// that kills the healthiest unit of the battle in one hit.
    pub max_attack_power: Option<u32>,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            faction: Faction::Elf,
            start_power: DEFAULT_CALIBRATION_START,
            max_attack_power: None,
        }
    }
}

impl CalibrationConfig {
    /// Reject an empty or zero-based search range.
    pub fn validate(&self) -> Result<()> {
        if self.start_power == 0 {
            return Err(SimError::InvalidState("start_power must be positive".into()));
        }
        match self.max_attack_power {
            Some(max) if self.start_power > max => Err(SimError::InvalidState(format!(
                "start_power {} exceeds max_attack_power {max}",
                self.start_power
            ))),
            _ => Ok(()),
        }
    }

    /// Last candidate power for a battle whose healthiest unit has
    /// `one_shot_health` points. Above that every hit kills, so more power
    /// changes nothing.
    #[must_use]
    pub fn upper_bound(&self, one_shot_health: u32) -> u32 {
        self.max_attack_power
            .unwrap_or_else(|| one_shot_health.max(self.start_power))
    }

    /// Candidate powers in the order they are tried.
    #[must_use]
    pub fn candidates(&self, one_shot_health: u32) -> RangeInclusive<u32> {
        self.start_power..=self.upper_bound(one_shot_health)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SimConfig::default();
        assert_eq!(config.starting_health, 200);
        assert_eq!(config.attack_power, 3);
        assert_eq!(config.calibration.start_power, 4);
        assert_eq!(config.calibration.faction, Faction::Elf);
        config.validate().unwrap();
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let config = CalibrationConfig {
            start_power: 10,
            max_attack_power: Some(5),
            ..CalibrationConfig::default()
        };
        assert!(matches!(config.validate(), Err(SimError::InvalidState(_))));
    }

    #[test]
    fn test_zero_attack_is_rejected() {
        let config = SimConfig {
            attack_power: 0,
            ..SimConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bound_follows_starting_health() {
        let config = CalibrationConfig::default();
        assert_eq!(config.upper_bound(DEFAULT_STARTING_HEALTH), 200);
        assert_eq!(config.upper_bound(500), 500);
        assert_eq!(config.candidates(500), 4..=500);
    }

    #[test]
    fn test_explicit_bound_wins() {
        let config = CalibrationConfig {
            max_attack_power: Some(40),
            ..CalibrationConfig::default()
        };
        assert_eq!(config.upper_bound(500), 40);
        assert_eq!(config.candidates(500), 4..=40);
    }

    #[test]
    fn test_bound_never_below_start() {
        let config = CalibrationConfig {
            start_power: 10,
            ..CalibrationConfig::default()
        };
        assert_eq!(config.candidates(3), 10..=10);
    }
}
