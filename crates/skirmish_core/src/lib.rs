//! # Skirmish Core
//!
//! Deterministic turn-based grid combat between elves and goblins.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering beyond a plain-text dump of the grid
//! - No IO
//! - No randomness
//! - No threads
//!
//! This separation enables:
//! - Parallel what-if runs in the headless runner (each owns a clone)
//! - Reproducible regression fixtures
//! - Determinism testing via [`simulation::Simulation::state_hash`]
//!
//! ## Crate Structure
//!
//! - [`battlefield`] - Terrain grid and occupancy index
//! - [`components`] - Units, positions and reading order
//! - [`pathfinding`] - BFS movement planning
//! - [`combat`] - Target selection and damage
//! - [`simulation`] - Round scheduler state machine
//! - [`outcome`] - Scoring a finished battle
//! - [`calibration`] - Minimal flawless attack-power search

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod battlefield;
pub mod calibration;
pub mod combat;
pub mod components;
pub mod config;
pub mod error;
pub mod factions;
pub mod outcome;
pub mod parse;
pub mod pathfinding;
pub mod simulation;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::battlefield::{Battlefield, Cell};
    pub use crate::calibration::{CalibrationResult, Calibrator, MonotonicityAudit};
    pub use crate::combat::AttackEvent;
    pub use crate::components::{Health, Position, Unit, UnitId};
    pub use crate::config::{CalibrationConfig, SimConfig};
    pub use crate::error::{ParseError, Result, SimError};
    pub use crate::factions::Faction;
    pub use crate::outcome::Outcome;
    pub use crate::parse::{parse_battlefield, ParsedBattlefield};
    pub use crate::simulation::{MoveEvent, Phase, RoundReport, Simulation};
}
