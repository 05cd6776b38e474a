//! Breadth-first movement planning on the battle grid.
//!
//! Movement is unweighted and orthogonal, so a plain BFS gives exact
//! distances. A unit walks towards the closest *target cell* (a free cell
//! next to a living enemy). Ties are broken in reading order twice: first
//! among equally close target cells, then among the first steps that lie on
//! a shortest path to the chosen one.
//!
//! Everything here is a pure function of the battlefield and unit arena.

use std::cmp::Ordering;
use std::collections::VecDeque;

use crate::battlefield::Battlefield;
use crate::components::{Position, Unit};
use crate::error::{Result, SimError};

/// Shortest walking distance from one origin to every reachable free cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceMap {
    width: usize,
    distances: Vec<Option<u32>>,
}

impl DistanceMap {
    /// Distance to a cell, `None` if unreachable or off the grid.
    #[must_use]
    pub fn get(&self, pos: Position) -> Option<u32> {
        if pos.col >= self.width {
            return None;
        }
        self.distances
            .get(pos.row * self.width + pos.col)
            .copied()
            .flatten()
    }

    /// Number of reachable cells, including the origin.
    #[must_use]
    pub fn reachable_count(&self) -> usize {
        self.distances.iter().filter(|d| d.is_some()).count()
    }
}

/// Breadth-first search over free cells.
///
/// The origin is always at distance 0, even when occupied (it is normally
/// the moving unit's own cell). Every other visited cell must be open and
/// unoccupied.
#[must_use]
pub fn distances_from(battlefield: &Battlefield, origin: Position) -> DistanceMap {
    let width = battlefield.width();
    let mut distances = vec![None; width * battlefield.height()];

    if !battlefield.in_bounds(origin) {
        return DistanceMap { width, distances };
    }

    let mut queue = VecDeque::new();
    distances[origin.row * width + origin.col] = Some(0);
    queue.push_back((origin, 0u32));

    while let Some((current, distance)) = queue.pop_front() {
        for next in battlefield.free_neighbors(current) {
            let slot = &mut distances[next.row * width + next.col];
            if slot.is_none() {
                *slot = Some(distance + 1);
                queue.push_back((next, distance + 1));
            }
        }
    }

    DistanceMap { width, distances }
}

/// Living enemies standing next to `unit`, in reading order.
pub fn adjacent_enemies<'a>(
    battlefield: &'a Battlefield,
    units: &'a [Unit],
    unit: &'a Unit,
) -> impl Iterator<Item = &'a Unit> + 'a {
    battlefield
        .neighbors(unit.position)
        .filter_map(|pos| battlefield.occupant(pos))
        .map(|id| &units[id.index()])
        .filter(move |other| other.is_alive() && unit.is_enemy_of(other))
}

/// True when `unit` can attack without moving.
#[must_use]
pub fn in_range_of_enemy(battlefield: &Battlefield, units: &[Unit], unit: &Unit) -> bool {
    adjacent_enemies(battlefield, units, unit).next().is_some()
}

/// Free cells next to any living enemy of `unit`, sorted in reading order.
#[must_use]
pub fn target_cells(battlefield: &Battlefield, units: &[Unit], unit: &Unit) -> Vec<Position> {
    let mut cells: Vec<Position> = units
        .iter()
        .filter(|other| other.is_alive() && unit.is_enemy_of(other))
        .flat_map(|enemy| battlefield.free_neighbors(enemy.position))
        .collect();
    cells.sort_unstable();
    cells.dedup();
    cells
}

/// Closest first, then earliest in reading order.
fn compare_targets(a: &(u32, Position), b: &(u32, Position)) -> Ordering {
    match a.0.cmp(&b.0) {
        Ordering::Equal => a.1.cmp(&b.1),
        ord => ord,
    }
}

/// A single movement decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepPlan {
    /// Target cell the unit is walking towards.
    pub target: Position,
    /// Walking distance to the target before this step.
    pub distance: u32,
    /// Cell the unit moves into this turn.
    pub step: Position,
}

/// Decide where `unit` steps this turn.
///
/// Returns `Ok(None)` when the unit should stay put: it is already next to
/// an enemy, or no target cell is reachable.
pub fn plan_step(battlefield: &Battlefield, units: &[Unit], unit: &Unit) -> Result<Option<StepPlan>> {
    if in_range_of_enemy(battlefield, units, unit) {
        return Ok(None);
    }

    let targets = target_cells(battlefield, units, unit);
    if targets.is_empty() {
        return Ok(None);
    }

    let outbound = distances_from(battlefield, unit.position);
    let Some((distance, target)) = targets
        .iter()
        .filter_map(|&cell| outbound.get(cell).map(|d| (d, cell)))
        .min_by(compare_targets)
    else {
        return Ok(None);
    };

    // Walk back from the target: a first step is on a shortest path exactly
    // when its distance to the target is one less than the unit's.
    let inbound = distances_from(battlefield, target);
    let step = battlefield
        .free_neighbors(unit.position)
        .find(|&cell| inbound.get(cell) == Some(distance - 1))
        .ok_or_else(|| {
            SimError::InvariantViolation(format!(
                "unit {} at {} found {} at distance {} but no first step towards it",
                unit.id, unit.position, target, distance
            ))
        })?;

    Ok(Some(StepPlan {
        target,
        distance,
        step,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::Simulation;

    fn sim(map: &str) -> Simulation {
        map.parse().unwrap()
    }

    fn plan_for(sim: &Simulation, pos: Position) -> Option<StepPlan> {
        let unit = sim.unit_at(pos).unwrap();
        plan_step(sim.battlefield(), sim.units(), unit).unwrap()
    }

    #[test]
    fn test_distances_avoid_walls_and_units() {
        let sim = sim("#######\n#E..#.#\n#.G.#.#\n#######");
        let map = distances_from(sim.battlefield(), Position::new(1, 1));
        assert_eq!(map.get(Position::new(1, 1)), Some(0));
        assert_eq!(map.get(Position::new(1, 3)), Some(2));
        // Goblin cell is occupied, so it is never entered.
        assert_eq!(map.get(Position::new(2, 2)), None);
        assert_eq!(map.get(Position::new(2, 3)), Some(3));
        // Behind the wall.
        assert_eq!(map.get(Position::new(1, 5)), None);
        assert_eq!(map.get(Position::new(0, 99)), None);
        assert_eq!(map.reachable_count(), 5);
    }

    #[test]
    fn test_target_cell_selection() {
        // Documented example: the elf picks the closest target cell, breaking
        // the tie between the three at distance 2 by reading order.
        let sim = sim(
            "#######\n\
             #E..G.#\n\
             #...#.#\n\
             #.G.#G#\n\
             #######",
        );
        let plan = plan_for(&sim, Position::new(1, 1)).unwrap();
        assert_eq!(plan.target, Position::new(1, 3));
        assert_eq!(plan.distance, 2);
        assert_eq!(plan.step, Position::new(1, 2));
    }

    #[test]
    fn test_first_step_tie_break() {
        // Documented example: both the right and the down step reach the
        // target in three moves; right wins in reading order.
        let sim = sim(
            "#######\n\
             #.E...#\n\
             #.....#\n\
             #...G.#\n\
             #######",
        );
        let plan = plan_for(&sim, Position::new(1, 2)).unwrap();
        assert_eq!(plan.target, Position::new(2, 4));
        assert_eq!(plan.step, Position::new(1, 3));
        assert!(plan.step.is_adjacent(Position::new(1, 2)));
        assert_eq!(plan.target.manhattan(Position::new(1, 2)), 3);
    }

    #[test]
    fn test_no_move_when_adjacent() {
        let sim = sim("#####\n#EG.#\n#####");
        assert_eq!(plan_for(&sim, Position::new(1, 1)), None);
    }

    #[test]
    fn test_no_move_when_unreachable() {
        let sim = sim("#######\n#E.#.G#\n#######");
        assert_eq!(plan_for(&sim, Position::new(1, 1)), None);
    }

    #[test]
    fn test_target_cells_are_sorted_and_unique() {
        let sim = sim("#####\n#.E.#\n#G.G#\n#####");
        let goblin = sim.unit_at(Position::new(2, 1)).unwrap();
        let cells = target_cells(sim.battlefield(), sim.units(), goblin);
        assert_eq!(
            cells,
            vec![Position::new(1, 1), Position::new(1, 3), Position::new(2, 2)]
        );

        // (2,2) sits between both goblins but is listed once.
        let elf = sim.unit_at(Position::new(1, 2)).unwrap();
        let cells = target_cells(sim.battlefield(), sim.units(), elf);
        assert_eq!(
            cells,
            vec![Position::new(1, 1), Position::new(1, 3), Position::new(2, 2)]
        );
    }

    #[test]
    fn test_plan_is_deterministic() {
        let sim = sim(
            "#########\n\
             #G..G..G#\n\
             #.......#\n\
             #.......#\n\
             #G..E..G#\n\
             #.......#\n\
             #.......#\n\
             #G..G..G#\n\
             #########",
        );
        for unit in sim.units() {
            let first = plan_step(sim.battlefield(), sim.units(), unit).unwrap();
            let second = plan_step(sim.battlefield(), sim.units(), unit).unwrap();
            assert_eq!(first, second);
        }
    }
}
