//! Replay harness for battles.
//!
//! Every tie in a battle is broken by reading order, so fighting the same
//! battlefield twice must give bit-identical states after every round. The
//! helpers here replay battles sequentially, on threads, and round by round
//! to find where two runs part ways.
//!
//! Things that would break this and are worth a replay test when touched:
//! turn order or target choice drawn from a `HashMap`, state shared between
//! calibration runs, and parallel runs that disagree with sequential ones.

use std::thread;

use skirmish_core::simulation::Simulation;
use tracing::warn;

/// Final hashes of several replays of one battle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayCheck {
    /// True if every replay ended in the same state.
    pub is_deterministic: bool,
    /// Final state hash per replay.
    pub hashes: Vec<u64>,
    /// Rounds each replay was allowed.
    pub rounds: u64,
}

impl ReplayCheck {
    /// Distinct final hashes, sorted.
    #[must_use]
    pub fn distinct_hashes(&self) -> Vec<u64> {
        let mut distinct = self.hashes.clone();
        distinct.sort_unstable();
        distinct.dedup();
        distinct
    }

    /// # Panics
    ///
    /// Panics if the replays did not all agree.
    pub fn assert_deterministic(&self) {
        assert!(
            self.is_deterministic,
            "replays diverged after {} rounds: {} distinct hashes in {:?}",
            self.rounds,
            self.distinct_hashes().len(),
            self.hashes
        );
    }
}

/// Build a state `runs` times, step it `rounds` times, and compare hashes.
pub fn replay<S>(
    runs: usize,
    rounds: u64,
    setup: impl Fn() -> S,
    step: impl Fn(&mut S),
    hash: impl Fn(&S) -> u64,
) -> ReplayCheck {
    let hashes: Vec<u64> = (0..runs)
        .map(|_| {
            let mut state = setup();
            (0..rounds).for_each(|_| step(&mut state));
            hash(&state)
        })
        .collect();

    ReplayCheck {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        rounds,
    }
}

/// Advance a battle by one round, doing nothing once it has ended or failed.
fn step_round(sim: &mut Simulation) {
    if !sim.is_over() && sim.run_round().is_err() {
        warn!(round = sim.completed_rounds(), "round failed during replay");
    }
}

/// Replay a battle `runs` times for up to `rounds` rounds.
pub fn replay_battle(setup: impl Fn() -> Simulation, runs: usize, rounds: u64) -> ReplayCheck {
    replay(runs, rounds, setup, step_round, Simulation::state_hash)
}

/// Result of parallel battle runs.
#[derive(Debug, Clone)]
pub struct ParallelBattleResult {
    /// Final state hash from each battle.
    pub hashes: Vec<u64>,
    /// Score of each battle, `None` if it failed.
    pub scores: Vec<Option<u64>>,
}

impl ParallelBattleResult {
    /// Every thread ended in the same state with the same score.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
            && self.scores.windows(2).all(|w| w[0] == w[1])
    }

    /// # Panics
    ///
    /// Panics if any two threads disagreed.
    pub fn assert_deterministic(&self) {
        assert!(
            self.is_deterministic(),
            "threaded battles disagree: hashes {:?}, scores {:?}",
            self.hashes,
            self.scores
        );
    }
}

/// Fight the same battle on `num_battles` scoped threads.
pub fn run_parallel_battles<F>(setup_fn: F, num_battles: usize) -> ParallelBattleResult
where
    F: Fn() -> Simulation + Sync,
{
    let results: Vec<(u64, Option<u64>)> = thread::scope(|s| {
        let handles: Vec<_> = (0..num_battles)
            .map(|_| {
                s.spawn(|| {
                    let mut sim = setup_fn();
                    let score = sim.run_to_completion().ok().map(|o| o.score);
                    (sim.state_hash(), score)
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|_| panic!("battle thread panicked")))
            .collect()
    });

    let (hashes, scores): (Vec<u64>, Vec<Option<u64>>) = results.into_iter().unzip();
    ParallelBattleResult { hashes, scores }
}

/// Replay a battle twice round by round and report the first round whose
/// state differs, or `None` if they never diverge.
pub fn find_first_divergence<F>(setup_fn: F, max_rounds: u32) -> Option<u32>
where
    F: Fn() -> Simulation,
{
    let mut sim1 = setup_fn();
    let mut sim2 = setup_fn();

    if sim1.state_hash() != sim2.state_hash() {
        return Some(0);
    }

    for round in 1..=max_rounds {
        step_round(&mut sim1);
        step_round(&mut sim2);

        if sim1.state_hash() != sim2.state_hash() {
            warn!(round, "battles diverged");
            return Some(round);
        }
        if sim1.is_over() && sim2.is_over() {
            break;
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::strategies::arb_battlefield;
    use proptest::prelude::*;
    use skirmish_core::pathfinding::plan_step;

    #[test]
    fn test_counter_replays_agree() {
        let result = replay(3, 100, || 0u64, |n| *n += 1, |n| *n);

        assert!(result.is_deterministic);
        assert_eq!(result.hashes, vec![100, 100, 100]);
    }

    #[test]
    fn test_detects_divergent_setup() {
        let counter = std::cell::Cell::new(0u64);
        let result = replay(
            2,
            1,
            || {
                counter.set(counter.get() + 1);
                counter.get()
            },
            |_| {},
            |n| *n,
        );
        assert!(!result.is_deterministic);
        assert_eq!(result.distinct_hashes().len(), 2);
    }

    #[test]
    fn test_fixture_battles_are_deterministic() {
        for fixture in fixtures::ALL {
            replay_battle(|| fixture.simulation(), 3, 100).assert_deterministic();
        }
    }

    #[test]
    fn test_parallel_battles_match() {
        let result = run_parallel_battles(|| fixtures::GOBLINS_HALL.simulation(), 4);
        result.assert_deterministic();
        assert_eq!(result.scores[0], Some(fixtures::GOBLINS_HALL.score));
    }

    #[test]
    fn test_no_divergence_on_fixture() {
        assert_eq!(
            find_first_divergence(|| fixtures::WALKTHROUGH.simulation(), 60),
            None
        );
    }

    #[test]
    fn test_stalemate_is_still_deterministic() {
        let result = replay_battle(
            || fixtures::SEALED_OFF.parse().unwrap(),
            2,
            5,
        );
        result.assert_deterministic();
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Planning the same move twice on the same state gives the same step.
        #[test]
        fn prop_step_plan_is_pure(map in arb_battlefield(6, 8)) {
            let sim: Simulation = map.parse().unwrap();
            for unit in sim.units() {
                let first = plan_step(sim.battlefield(), sim.units(), unit).unwrap();
                let second = plan_step(sim.battlefield(), sim.units(), unit).unwrap();
                prop_assert_eq!(first, second);
            }
        }

        /// Random battlefields replay identically.
        #[test]
        fn prop_random_battles_are_deterministic(map in arb_battlefield(6, 8)) {
            let result = replay_battle(|| map.parse().unwrap(), 2, 200);
            prop_assert!(result.is_deterministic);
        }
    }
}
