//! Error types for the combat simulation.

use thiserror::Error;

use crate::factions::Faction;

/// Result type alias using [`SimError`].
pub type Result<T> = std::result::Result<T, SimError>;

/// Reasons a battlefield description can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The input contained no grid rows.
    #[error("battlefield is empty")]
    Empty,

    /// A row's length differs from the first row.
    #[error("line {line} has {found} cells, expected {expected}")]
    RaggedRow {
        /// One-based line number.
        line: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },

    /// A character that is neither terrain nor a faction marker.
    #[error("unrecognised character {character:?} at line {line}, column {column}")]
    UnknownCell {
        /// One-based line number.
        line: usize,
        /// One-based column number.
        column: usize,
        /// The character found.
        character: char,
    },
}

/// Top-level error type for all simulation errors.
#[derive(Debug, Error)]
pub enum SimError {
    /// The battlefield text could not be turned into a grid.
    #[error("Malformed battlefield: {0}")]
    MalformedBattlefield(#[from] ParseError),

    /// Internal consistency check failed. Indicates a logic bug.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Calibration exhausted its search bound.
    #[error("No attack power up to {max_power} lets the {faction} side win without losses")]
    NoQualifyingPower {
        /// Faction whose attack power was searched.
        faction: Faction,
        /// Highest power that was tried.
        max_power: u32,
    },

    /// A full round passed with no movement and no attack.
    #[error("Stalemate: round {round} changed nothing, combat can never end")]
    Stalemate {
        /// Zero-based index of the idle round.
        round: u32,
    },

    /// Operation not valid in the current simulation state.
    #[error("Invalid simulation state: {0}")]
    InvalidState(String),
}
