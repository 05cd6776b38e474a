//! Unit data: identifiers, grid positions, health.
//!
//! Components are plain data. Behaviour that needs the battlefield
//! lives in [`crate::pathfinding`], [`crate::combat`] and
//! [`crate::simulation`].

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::factions::Faction;

/// Stable index of a unit in the simulation's unit arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub u32);

impl UnitId {
    /// Index into the unit arena.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A cell coordinate on the battlefield.
///
/// Ordering is *reading order*: rows top to bottom, then columns left to
/// right. Every tie-break in the simulation goes through this ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Zero-based row, growing downwards.
    pub row: usize,
    /// Zero-based column, growing to the right.
    pub col: usize,
}

impl Position {
    /// Create a position from a row and column.
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// The four orthogonal neighbours, in reading order (up, left, right, down).
    ///
    /// Neighbours that would fall off the top or left edge are omitted;
    /// callers bounds-check the bottom and right edges against the grid.
    pub fn neighbors(self) -> impl Iterator<Item = Position> {
        let up = self.row.checked_sub(1).map(|row| Position::new(row, self.col));
        let left = self.col.checked_sub(1).map(|col| Position::new(self.row, col));
        let right = Some(Position::new(self.row, self.col + 1));
        let down = Some(Position::new(self.row + 1, self.col));
        [up, left, right, down].into_iter().flatten()
    }

    /// Manhattan distance between two positions.
    #[must_use]
    pub const fn manhattan(self, other: Position) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    /// True when `other` is one orthogonal step away.
    #[must_use]
    pub const fn is_adjacent(self, other: Position) -> bool {
        self.manhattan(other) == 1
    }
}

impl Ord for Position {
    /// Row first, then column. Both ascending.
    fn cmp(&self, other: &Self) -> Ordering {
        match self.row.cmp(&other.row) {
            Ordering::Equal => self.col.cmp(&other.col),
            ord => ord,
        }
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Health of a unit. Never goes below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Health {
    /// Current health points.
    pub current: u32,
    /// Health the unit started with.
    pub max: u32,
}

impl Health {
    /// Create new health at full value.
    #[must_use]
    pub const fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Check if the unit is dead (health == 0).
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.current == 0
    }

    /// Apply damage, returning actual damage dealt.
    /// Uses saturating subtraction to prevent underflow.
    pub fn apply_damage(&mut self, amount: u32) -> u32 {
        let actual = amount.min(self.current);
        self.current = self.current.saturating_sub(actual);
        actual
    }
}

/// A combatant on the battlefield.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unit {
    /// Arena index, stable for the whole simulation.
    pub id: UnitId,
    /// Side this unit fights for.
    pub faction: Faction,
    /// Current cell.
    pub position: Position,
    /// Remaining health.
    pub health: Health,
    /// Damage dealt per attack.
    pub attack_power: u32,
}

impl Unit {
    /// Create a unit at full health.
    #[must_use]
    pub const fn new(
        id: UnitId,
        faction: Faction,
        position: Position,
        health: u32,
        attack_power: u32,
    ) -> Self {
        Self {
            id,
            faction,
            position,
            health: Health::new(health),
            attack_power,
        }
    }

    /// Alive while health is above zero.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        !self.health.is_dead()
    }

    /// True when `other` fights for the opposing side.
    #[must_use]
    pub fn is_enemy_of(&self, other: &Unit) -> bool {
        self.faction != other.faction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_reading_order_row_dominates() {
        assert!(Position::new(0, 9) < Position::new(1, 0));
        assert!(Position::new(2, 1) < Position::new(2, 3));
        assert_eq!(Position::new(4, 4).cmp(&Position::new(4, 4)), Ordering::Equal);
    }

    #[test]
    fn test_neighbors_in_reading_order() {
        let n: Vec<_> = Position::new(2, 2).neighbors().collect();
        assert_eq!(
            n,
            vec![
                Position::new(1, 2),
                Position::new(2, 1),
                Position::new(2, 3),
                Position::new(3, 2),
            ]
        );
        let mut sorted = n.clone();
        sorted.sort();
        assert_eq!(n, sorted);
    }

    #[test]
    fn test_neighbors_at_origin() {
        let n: Vec<_> = Position::new(0, 0).neighbors().collect();
        assert_eq!(n, vec![Position::new(0, 1), Position::new(1, 0)]);
    }

    #[test]
    fn test_adjacency_is_one_orthogonal_step() {
        let center = Position::new(3, 3);
        for n in center.neighbors() {
            assert!(center.is_adjacent(n));
        }
        assert!(!center.is_adjacent(center));
        assert!(!center.is_adjacent(Position::new(4, 4)));
        assert_eq!(center.manhattan(Position::new(0, 5)), 5);
    }

    #[test]
    fn test_health_saturates_at_zero() {
        let mut health = Health::new(5);
        assert_eq!(health.apply_damage(3), 3);
        assert!(!health.is_dead());
        assert_eq!(health.apply_damage(10), 2);
        assert!(health.is_dead());
        assert_eq!(health.current, 0);
    }

    proptest! {
        #[test]
        fn prop_reading_order_is_strict_total(
            r1 in 0usize..50, c1 in 0usize..50,
            r2 in 0usize..50, c2 in 0usize..50,
        ) {
            let a = Position::new(r1, c1);
            let b = Position::new(r2, c2);
            let less = a < b;
            let greater = b < a;
            if a == b {
                prop_assert!(!less && !greater);
            } else {
                prop_assert!(less ^ greater);
                prop_assert_eq!(less, (r1, c1) < (r2, c2));
            }
        }

        #[test]
        fn prop_health_is_non_increasing(hits in proptest::collection::vec(0u32..300, 0..20)) {
            let mut health = Health::new(200);
            let mut previous = health.current;
            for hit in hits {
                health.apply_damage(hit);
                prop_assert!(health.current <= previous);
                previous = health.current;
            }
        }
    }
}
