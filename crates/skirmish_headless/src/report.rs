//! JSON reports for finished runs.

use std::path::Path;

use serde::{Deserialize, Serialize};
use skirmish_core::calibration::CalibrationResult;
use skirmish_core::outcome::Outcome;
use tracing::{info, warn};

use crate::batch::calibrate_parallel;
use crate::error::Result;
use crate::scenario::Scenario;

/// Both answers for one battlefield: the battle at default rules, and the
/// minimal flawless attack power with the battle it produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveReport {
    /// Scenario name.
    pub scenario: String,
    /// Battle at the configured attack power.
    pub battle: Outcome,
    /// Calibration answer, if one exists in range.
    pub calibration: Option<CalibrationResult>,
    /// Why calibration has no answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calibration_error: Option<String>,
}

impl SolveReport {
    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Save results to JSON file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Load results from JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Fight the scenario at its configured rules, then calibrate.
///
/// A failed calibration is recorded in the report rather than discarding
/// the first answer.
pub fn solve(scenario: &Scenario, threads: usize) -> Result<SolveReport> {
    let base = scenario.simulation()?;
    let battle = base.clone().run_to_completion()?;
    info!(
        scenario = %scenario.name,
        rounds = battle.completed_rounds,
        score = battle.score,
        "battle resolved"
    );

    let (calibration, calibration_error) =
        match calibrate_parallel(&base, &scenario.config.calibration, threads) {
            Ok(result) => (Some(result), None),
            Err(e) => {
                warn!(scenario = %scenario.name, error = %e, "calibration failed");
                (None, Some(e.to_string()))
            }
        };

    Ok(SolveReport {
        scenario: scenario.name.clone(),
        battle,
        calibration,
        calibration_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::config::{CalibrationConfig, SimConfig};
    use skirmish_test_utils::fixtures;

    #[test]
    fn test_solve_walkthrough() {
        let scenario = Scenario::from_map("walkthrough", fixtures::WALKTHROUGH.map).unwrap();
        let report = solve(&scenario, 2).unwrap();
        assert_eq!(report.battle.score, 27730);
        let calibration = report.calibration.unwrap();
        assert_eq!(calibration.attack_power, 15);
        assert_eq!(calibration.outcome.score, 4988);
        assert!(report.calibration_error.is_none());
    }

    #[test]
    fn test_failed_calibration_keeps_battle() {
        let config = SimConfig {
            calibration: CalibrationConfig {
                max_attack_power: Some(5),
                ..CalibrationConfig::default()
            },
            ..SimConfig::default()
        };
        let scenario = Scenario::from_map("walkthrough", fixtures::WALKTHROUGH.map)
            .unwrap()
            .with_config(config)
            .unwrap();
        let report = solve(&scenario, 1).unwrap();
        assert_eq!(report.battle.score, 27730);
        assert!(report.calibration.is_none());
        assert!(report.calibration_error.is_some());
    }

    #[test]
    fn test_json_shape() {
        let scenario = Scenario::from_map("hall", fixtures::GOBLINS_HALL.map).unwrap();
        let json = solve(&scenario, 1).unwrap().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["battle"]["score"], 18740);
        assert_eq!(value["calibration"]["attack_power"], 34);
        assert!(value.get("calibration_error").is_none());
    }
}
