//! Parallel batch runner.
//!
//! Calibration candidates, audit entries and determinism replays are all
//! independent battles fought on their own clone of the starting state, so
//! they are farmed out to a rayon pool. Results are always collected in
//! candidate order, which keeps every answer identical to the sequential
//! one in `skirmish_core`.

use std::ops::RangeInclusive;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use skirmish_core::calibration::{
    audit_candidate, evaluate_candidate, one_shot_health, CalibrationResult, MonotonicityAudit,
};
use skirmish_core::config::CalibrationConfig;
use skirmish_core::error::SimError;
use skirmish_core::factions::Faction;
use skirmish_core::simulation::Simulation;
use tracing::{debug, info, warn};

use crate::error::Result;

/// Build a dedicated pool. Zero threads means the rayon default.
fn build_pool(threads: usize) -> Result<ThreadPool> {
    Ok(ThreadPoolBuilder::new().num_threads(threads).build()?)
}

/// Find the minimal flawless attack power, evaluating one window of
/// candidates per pool-width at a time.
///
/// Within a window, results are inspected in ascending order and the first
/// pass (or the first error) wins, so the answer and `candidates_tried`
/// match [`skirmish_core::calibration::Calibrator::calibrate`].
pub fn calibrate_parallel(
    base: &Simulation,
    config: &CalibrationConfig,
    threads: usize,
) -> Result<CalibrationResult> {
    config.validate()?;
    let pool = build_pool(threads)?;
    let window = pool.current_num_threads().max(1);
    let faction = config.faction;
    let health = one_shot_health(base);
    let max_power = config.upper_bound(health);
    let candidates: Vec<u32> = config.candidates(health).collect();

    info!(
        %faction,
        from = config.start_power,
        to = max_power,
        threads = window,
        "parallel calibration started"
    );

    for (chunk_index, chunk) in candidates.chunks(window).enumerate() {
        let results: Vec<_> = pool.install(|| {
            chunk
                .par_iter()
                .map(|&power| evaluate_candidate(base, faction, power))
                .collect()
        });

        for (offset, (&power, result)) in chunk.iter().zip(results).enumerate() {
            if let Some(outcome) = result? {
                let tried = u32::try_from(chunk_index * window + offset + 1)
                    .unwrap_or(u32::MAX);
                info!(
                    %faction,
                    power,
                    score = outcome.score,
                    "parallel calibration found flawless attack power"
                );
                return Ok(CalibrationResult {
                    faction,
                    attack_power: power,
                    outcome,
                    candidates_tried: tried,
                });
            }
            debug!(%faction, power, "candidate rejected");
        }
    }

    warn!(%faction, max_power, "no flawless attack power");
    Err(SimError::NoQualifyingPower { faction, max_power }.into())
}

/// Fight every power in `powers` to the end, in parallel.
pub fn audit_parallel(
    base: &Simulation,
    faction: Faction,
    powers: RangeInclusive<u32>,
    threads: usize,
) -> Result<MonotonicityAudit> {
    let pool = build_pool(threads)?;
    let entries = pool.install(|| {
        powers
            .into_par_iter()
            .map(|power| audit_candidate(base, faction, power))
            .collect::<std::result::Result<Vec<_>, SimError>>()
    })?;
    let audit = MonotonicityAudit::from_entries(faction, entries);
    if !audit.is_monotonic() {
        warn!(%faction, violations = ?audit.violations, "losses return above a flawless power");
    }
    Ok(audit)
}

/// Outcome of replaying one battle several times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyReport {
    /// Number of replays.
    pub runs: usize,
    /// Final state hash of each replay.
    pub hashes: Vec<u64>,
    /// Score of each replay, `None` if it failed.
    pub scores: Vec<Option<u64>>,
    /// Whether every replay agreed.
    pub deterministic: bool,
}

/// Replay `base` `runs` times across the pool and compare the final states.
pub fn verify_parallel(base: &Simulation, runs: usize, threads: usize) -> Result<VerifyReport> {
    let pool = build_pool(threads)?;
    let results: Vec<(u64, Option<u64>)> = pool.install(|| {
        (0..runs)
            .into_par_iter()
            .map(|run| {
                let mut sim = base.clone();
                let score = match sim.run_to_completion() {
                    Ok(outcome) => Some(outcome.score),
                    Err(e) => {
                        warn!(run, error = %e, "replay failed");
                        None
                    }
                };
                (sim.state_hash(), score)
            })
            .collect()
    });

    let (hashes, scores): (Vec<u64>, Vec<Option<u64>>) = results.into_iter().unzip();
    let deterministic = hashes.windows(2).all(|w| w[0] == w[1])
        && scores.windows(2).all(|w| w[0] == w[1]);
    info!(runs, deterministic, "verification complete");

    Ok(VerifyReport {
        runs,
        hashes,
        scores,
        deterministic,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::calibration::{audit_monotonicity, Calibrator};
    use skirmish_test_utils::fixtures;

    #[test]
    fn test_parallel_matches_sequential() {
        let config = CalibrationConfig::default();
        let calibrator = Calibrator::new(config.clone()).unwrap();
        for fixture in [fixtures::WALKTHROUGH, fixtures::GOBLINS_CORRIDORS] {
            let base = fixture.simulation();
            let sequential = calibrator.calibrate(&base).unwrap();
            for threads in [1, 3, 8] {
                let parallel = calibrate_parallel(&base, &config, threads).unwrap();
                assert_eq!(parallel, sequential, "{} on {threads} threads", fixture.name);
            }
        }
    }

    #[test]
    fn test_exhausted_range() {
        let config = CalibrationConfig {
            max_attack_power: Some(10),
            ..CalibrationConfig::default()
        };
        let err = calibrate_parallel(&fixtures::WALKTHROUGH.simulation(), &config, 4).unwrap_err();
        assert!(matches!(
            err,
            crate::HeadlessError::Simulation(SimError::NoQualifyingPower { max_power: 10, .. })
        ));
    }

    #[test]
    fn test_audit_matches_sequential() {
        let base = fixtures::WALKTHROUGH.simulation();
        let parallel = audit_parallel(&base, Faction::Elf, 10..=16, 4).unwrap();
        let sequential = audit_monotonicity(&base, Faction::Elf, 10..=16).unwrap();
        assert_eq!(parallel, sequential);
        assert_eq!(parallel.first_flawless(), Some(15));
    }

    #[test]
    fn test_verify_fixture() {
        let report = verify_parallel(&fixtures::GOBLINS_HALL.simulation(), 4, 2).unwrap();
        assert!(report.deterministic);
        assert_eq!(report.scores, vec![Some(fixtures::GOBLINS_HALL.score); 4]);
    }
}
