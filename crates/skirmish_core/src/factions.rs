//! Faction definitions and identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the two opposing sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Faction {
    /// Elves, drawn as `E`. The side calibrated by default.
    Elf,
    /// Goblins, drawn as `G`.
    Goblin,
}

impl Faction {
    /// Both factions, in a fixed order.
    pub const ALL: [Faction; 2] = [Faction::Elf, Faction::Goblin];

    /// The opposing faction.
    #[must_use]
    pub const fn enemy(self) -> Self {
        match self {
            Self::Elf => Self::Goblin,
            Self::Goblin => Self::Elf,
        }
    }

    /// Map marker character for this faction.
    #[must_use]
    pub const fn marker(self) -> char {
        match self {
            Self::Elf => 'E',
            Self::Goblin => 'G',
        }
    }

    /// Faction for a map marker, if the character is one.
    #[must_use]
    pub const fn from_marker(c: char) -> Option<Self> {
        match c {
            'E' => Some(Self::Elf),
            'G' => Some(Self::Goblin),
            _ => None,
        }
    }

    /// Lowercase name used in config files and on the command line.
    #[must_use]
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::Elf => "elf",
            Self::Goblin => "goblin",
        }
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for Faction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "elf" | "elves" | "e" => Ok(Self::Elf),
            "goblin" | "goblins" | "g" => Ok(Self::Goblin),
            other => Err(format!("unknown faction '{other}' (expected elf or goblin)")),
        }
    }
}
