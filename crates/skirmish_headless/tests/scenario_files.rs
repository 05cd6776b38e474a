//! File-based runs: maps and rule files on disk, reports written back.

use std::io::Write;

use skirmish_core::calibration::Calibrator;
use skirmish_core::factions::Faction;
use skirmish_headless::{
    calibrate_parallel, load_config, solve, HeadlessError, Scenario, ScenarioError, SolveReport,
};
use skirmish_test_utils::fixtures;
use tempfile::{tempdir, NamedTempFile};

fn map_file(map: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{map}\n\n").unwrap();
    file
}

#[test]
fn solve_from_map_file() {
    let file = map_file(fixtures::GOBLINS_CORRIDORS.map);
    let scenario = Scenario::load(file.path()).unwrap();
    let report = solve(&scenario, 4).unwrap();

    assert_eq!(report.battle.score, fixtures::GOBLINS_CORRIDORS.score);
    assert_eq!(report.battle.winner, Some(Faction::Goblin));
    let calibration = report.calibration.unwrap();
    assert_eq!(calibration.attack_power, 12);
    assert_eq!(calibration.outcome.score, 6474);
}

#[test]
fn windows_line_endings_are_accepted() {
    let file = map_file(&fixtures::WALKTHROUGH.map.replace('\n', "\r\n"));
    let mut sim = Scenario::load(file.path()).unwrap().simulation().unwrap();
    assert_eq!(sim.run_to_completion().unwrap().score, 27730);
}

#[test]
fn rules_file_changes_calibration() {
    let dir = tempdir().unwrap();
    let rules = dir.path().join("rules.ron");
    std::fs::write(
        &rules,
        "(calibration: (faction: Elf, start_power: 16, max_attack_power: Some(40)))",
    )
    .unwrap();

    let config = load_config(&rules).unwrap();
    let base = fixtures::WALKTHROUGH.simulation();
    let result = calibrate_parallel(&base, &config.calibration, 2).unwrap();

    // The documented minimum of 15 is below the configured range.
    let sequential = Calibrator::new(config.calibration).unwrap().calibrate(&base).unwrap();
    assert_eq!(result, sequential);
    assert!(result.attack_power >= 16);
}

#[test]
fn malformed_rules_file() {
    let dir = tempdir().unwrap();
    let rules = dir.path().join("rules.ron");
    std::fs::write(&rules, "(attack_power: \"lots\")").unwrap();
    assert!(matches!(
        load_config(&rules),
        Err(ScenarioError::ParseError(_))
    ));
}

#[test]
fn ragged_map_file_is_rejected() {
    let file = map_file("#####\n#E.G#\n####");
    let err = Scenario::load(file.path()).unwrap_err();
    assert!(matches!(err, ScenarioError::Simulation(_)));
}

#[test]
fn report_round_trips_through_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out").join("report.json");
    let scenario = Scenario::from_map("sweep", fixtures::ELVES_SWEEP.map).unwrap();
    let report = solve(&scenario, 1).unwrap();

    report.save(&path).unwrap();
    assert_eq!(SolveReport::load(&path).unwrap(), report);
}

#[test]
fn missing_report_is_an_io_error() {
    let dir = tempdir().unwrap();
    let err = SolveReport::load(&dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, HeadlessError::Io(_)));
}
