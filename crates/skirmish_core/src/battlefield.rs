//! Terrain grid plus the live occupancy index.
//!
//! Terrain is fixed once the battlefield is built. Occupancy maps each cell
//! to the living unit standing on it and is updated on every move and death.

use serde::{Deserialize, Serialize};

use crate::components::{Position, UnitId};
use crate::error::{Result, SimError};

/// Terrain type of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    /// Walkable floor.
    #[default]
    Open,
    /// Wall.
    Blocked,
}

impl Cell {
    /// Returns true if units may stand on this cell.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }

    /// Map character for this terrain.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Open => '.',
            Self::Blocked => '#',
        }
    }
}

/// The battle grid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Battlefield {
    /// Grid width in cells.
    width: usize,
    /// Grid height in cells.
    height: usize,
    /// Terrain stored in row-major order.
    cells: Vec<Cell>,
    /// Living unit per cell, row-major.
    occupancy: Vec<Option<UnitId>>,
}

impl Battlefield {
    /// Create a battlefield from row-major terrain with no units placed.
    ///
    /// # Panics
    ///
    /// Panics if `cells.len() != width * height`.
    #[must_use]
    pub fn new(width: usize, height: usize, cells: Vec<Cell>) -> Self {
        assert_eq!(
            cells.len(),
            width * height,
            "Battlefield terrain must have width * height cells"
        );
        Self {
            width,
            height,
            occupancy: vec![None; cells.len()],
            cells,
        }
    }

    /// Grid width in cells.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Grid height in cells.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn index(&self, pos: Position) -> Option<usize> {
        self.in_bounds(pos).then(|| pos.row * self.width + pos.col)
    }

    /// Check if a position lies on the grid.
    #[must_use]
    pub const fn in_bounds(&self, pos: Position) -> bool {
        pos.row < self.height && pos.col < self.width
    }

    /// Terrain at a position. `None` if out of bounds.
    #[must_use]
    pub fn cell(&self, pos: Position) -> Option<Cell> {
        self.index(pos).map(|i| self.cells[i])
    }

    /// True for in-bounds open terrain, regardless of occupancy.
    #[must_use]
    pub fn is_open(&self, pos: Position) -> bool {
        self.cell(pos).is_some_and(Cell::is_open)
    }

    /// The living unit standing on a cell, if any.
    #[must_use]
    pub fn occupant(&self, pos: Position) -> Option<UnitId> {
        self.index(pos).and_then(|i| self.occupancy[i])
    }

    /// Open and not occupied by a living unit.
    #[must_use]
    pub fn is_free(&self, pos: Position) -> bool {
        self.index(pos)
            .is_some_and(|i| self.cells[i].is_open() && self.occupancy[i].is_none())
    }

    /// In-bounds orthogonal neighbours of a position, in reading order.
    pub fn neighbors(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        pos.neighbors().filter(|p| self.in_bounds(*p))
    }

    /// Free orthogonal neighbours of a position, in reading order.
    pub fn free_neighbors(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        pos.neighbors().filter(|p| self.is_free(*p))
    }

    /// Put a unit on a free cell.
    pub fn place(&mut self, id: UnitId, pos: Position) -> Result<()> {
        let index = self.free_index(id, pos)?;
        self.occupancy[index] = Some(id);
        Ok(())
    }

    /// Move a unit between cells, keeping occupancy consistent.
    pub fn relocate(&mut self, id: UnitId, from: Position, to: Position) -> Result<()> {
        let to_index = self.free_index(id, to)?;
        self.remove(id, from)?;
        self.occupancy[to_index] = Some(id);
        Ok(())
    }

    /// Clear a unit's cell, for example when it dies.
    pub fn remove(&mut self, id: UnitId, pos: Position) -> Result<()> {
        match self.index(pos) {
            Some(i) if self.occupancy[i] == Some(id) => {
                self.occupancy[i] = None;
                Ok(())
            }
            _ => Err(SimError::InvariantViolation(format!(
                "unit {id} is not recorded at {pos}"
            ))),
        }
    }

    fn free_index(&self, id: UnitId, pos: Position) -> Result<usize> {
        let index = self.index(pos).ok_or_else(|| {
            SimError::InvariantViolation(format!("unit {id} sent off the grid to {pos}"))
        })?;
        if !self.cells[index].is_open() {
            return Err(SimError::InvariantViolation(format!(
                "unit {id} sent into the wall at {pos}"
            )));
        }
        if let Some(other) = self.occupancy[index] {
            return Err(SimError::InvariantViolation(format!(
                "unit {id} sent to {pos}, already held by unit {other}"
            )));
        }
        Ok(index)
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.occupancy.iter().filter(|o| o.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_field(width: usize, height: usize) -> Battlefield {
        Battlefield::new(width, height, vec![Cell::Open; width * height])
    }

    #[test]
    fn test_bounds_and_terrain() {
        let mut cells = vec![Cell::Open; 9];
        cells[4] = Cell::Blocked;
        let field = Battlefield::new(3, 3, cells);

        assert!(field.in_bounds(Position::new(2, 2)));
        assert!(!field.in_bounds(Position::new(3, 0)));
        assert_eq!(field.cell(Position::new(1, 1)), Some(Cell::Blocked));
        assert_eq!(field.cell(Position::new(0, 5)), None);
        assert!(!field.is_free(Position::new(1, 1)));
    }

    #[test]
    fn test_place_and_relocate() {
        let mut field = open_field(3, 3);
        let id = UnitId(0);
        field.place(id, Position::new(0, 0)).unwrap();
        assert_eq!(field.occupant(Position::new(0, 0)), Some(id));
        assert!(!field.is_free(Position::new(0, 0)));

        field
            .relocate(id, Position::new(0, 0), Position::new(0, 1))
            .unwrap();
        assert_eq!(field.occupant(Position::new(0, 0)), None);
        assert_eq!(field.occupant(Position::new(0, 1)), Some(id));
        assert_eq!(field.occupied_count(), 1);
    }

    #[test]
    fn test_double_occupancy_is_rejected() {
        let mut field = open_field(2, 1);
        field.place(UnitId(0), Position::new(0, 0)).unwrap();
        field.place(UnitId(1), Position::new(0, 1)).unwrap();

        let err = field
            .relocate(UnitId(0), Position::new(0, 0), Position::new(0, 1))
            .unwrap_err();
        assert!(matches!(err, SimError::InvariantViolation(_)));
        // Failed move leaves both units where they were.
        assert_eq!(field.occupant(Position::new(0, 0)), Some(UnitId(0)));
        assert_eq!(field.occupant(Position::new(0, 1)), Some(UnitId(1)));
    }

    #[test]
    fn test_walls_are_rejected() {
        let mut field = Battlefield::new(1, 1, vec![Cell::Blocked]);
        assert!(field.place(UnitId(0), Position::new(0, 0)).is_err());
    }

    #[test]
    fn test_remove_wrong_unit_fails() {
        let mut field = open_field(2, 2);
        field.place(UnitId(3), Position::new(1, 1)).unwrap();
        assert!(field.remove(UnitId(4), Position::new(1, 1)).is_err());
        field.remove(UnitId(3), Position::new(1, 1)).unwrap();
        assert!(field.is_free(Position::new(1, 1)));
    }

    #[test]
    fn test_free_neighbors_skip_walls_and_units() {
        let mut cells = vec![Cell::Open; 9];
        cells[1] = Cell::Blocked; // (0, 1)
        let mut field = Battlefield::new(3, 3, cells);
        field.place(UnitId(0), Position::new(1, 0)).unwrap();

        let free: Vec<_> = field.free_neighbors(Position::new(1, 1)).collect();
        assert_eq!(free, vec![Position::new(1, 2), Position::new(2, 1)]);
    }
}
