//! BDD tests for the runner
//!
//! These tests verify:
//! - Parallel and sequential trials produce identical results
//! - Same master seed reproduces a study exactly
//! - Parameter records drive a uniform and a Gaussian study per line
//! - Artifacts land on disk and reload, price paths on request

use std::fs;

use stocksim_runner::reporting::import_json;
use stocksim_core::ShockKind;
use stocksim_runner::{
    default_template, load_records, run_trials, save_artifacts, SimulationConfig, StudyReport,
    TrialError, TrialOptions,
};

fn options(trials: usize, master_seed: u64, parallel: bool) -> TrialOptions {
    TrialOptions { trials, master_seed, parallel, ..TrialOptions::default() }
}

fn small_sector_study() -> SimulationConfig {
    let mut config = SimulationConfig::sector_study();
    config.num_days = 120;
    config.num_groups = 3;
    config.group_size = 15;
    config
}

#[test]
fn bdd_scenario_parallel_matches_sequential() {
    // GIVEN a sector study and a fixed master seed
    let config = small_sector_study();
    let parallel = options(4, 11, true);
    let sequential = TrialOptions { parallel: false, ..parallel };

    // WHEN the same study runs on the thread pool and on one thread
    let a = run_trials(&config, &parallel).expect("parallel trials should succeed");
    let b = run_trials(&config, &sequential).expect("sequential trials should succeed");

    // THEN every trial is identical, in the same order
    assert_eq!(a.trials, b.trials);
    assert_eq!(a.mean_closing, b.mean_closing);
}

#[test]
fn bdd_scenario_master_seed_controls_reproducibility() {
    // GIVEN one configuration
    let config = small_sector_study();

    // WHEN run twice with the same seed and once with another
    let first = run_trials(&config, &options(2, 5, true)).unwrap();
    let again = run_trials(&config, &options(2, 5, true)).unwrap();
    let other = run_trials(&config, &options(2, 6, true)).unwrap();

    // THEN the same seed reproduces and a different seed diverges
    assert_eq!(first, again);
    assert_ne!(first.trials[0].daily_means, other.trials[0].daily_means);
}

#[test]
fn bdd_scenario_zero_volatility_study_is_flat() {
    // GIVEN no volatility, no drift, no momentum
    let mut config = SimulationConfig::random_walk_study();
    config.num_days = 5;
    config.group_size = 3;
    config.volatility_upper_bound = 0.0;

    // WHEN the study runs
    let report = run_trials(&config, &TrialOptions::default()).unwrap();

    // THEN every trial's mean series is exactly flat at the initial price
    for trial in &report.trials {
        assert_eq!(trial.daily_means, vec![100.0; 5]);
        assert_eq!(trial.summary.stdev, 0.0);
    }
    assert_eq!(report.mean_closing, 100.0);
}

#[test]
fn bdd_scenario_invalid_configuration_fails_fast() {
    // GIVEN a configuration with negative volatility
    let mut config = SimulationConfig::random_walk_study();
    config.volatility_upper_bound = -0.5;

    // WHEN trials are requested
    let err = run_trials(&config, &TrialOptions::default()).unwrap_err();

    // THEN validation fails before any trial runs
    assert!(matches!(err, TrialError::Invalid(_)));
}

#[test]
fn bdd_scenario_records_file_drives_studies() {
    // GIVEN a records file with two parameter lines
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("params.txt");
    fs::write(&path, "30,10,0,0\n40,5,0.001,1\n").unwrap();

    // WHEN each record runs under both shock families
    let records = load_records(&path, &default_template()).expect("records should parse");
    let reports: Vec<Vec<StudyReport>> = records
        .iter()
        .map(|r| {
            r.studies()
                .iter()
                .map(|(_, config)| run_trials(config, &options(1, 3, false)).unwrap())
                .collect()
        })
        .collect();

    // THEN each record yields a uniform and a Gaussian report shaped by the record
    assert_eq!(reports.len(), 2);
    for pair in &reports {
        assert_eq!(pair.len(), 2);
        assert_eq!(pair[0].config.shock_kind, ShockKind::Uniform);
        assert_eq!(pair[1].config.shock_kind, ShockKind::Gaussian);
        assert_ne!(pair[0].run_id, pair[1].run_id);
    }
    assert_eq!(reports[0][0].trials[0].daily_means.len(), 30);
    assert_eq!(reports[0][1].trials[0].final_prices.len(), 10);
    assert_eq!(reports[1][1].trials[0].daily_means.len(), 40);
    assert!(reports[1][0].config.momentum_enabled);
}

#[test]
fn bdd_scenario_artifacts_written_and_reloadable() {
    // GIVEN a finished study
    let mut config = SimulationConfig::daily_bias_study();
    config.num_days = 20;
    config.group_size = 25;
    let report = run_trials(&config, &options(2, 1, true)).unwrap();

    // WHEN artifacts are saved
    let dir = tempfile::tempdir().unwrap();
    let paths = save_artifacts(&report, dir.path()).expect("artifacts should save");

    // THEN every file exists and the JSON report reloads unchanged
    for p in [&paths.manifest, &paths.report, &paths.daily_means, &paths.final_prices, &paths.histogram, &paths.summary] {
        assert!(p.exists(), "missing {}", p.display());
    }
    let reloaded = import_json(&fs::read_to_string(&paths.report).unwrap()).unwrap();
    assert_eq!(reloaded, report);

    let daily = fs::read_to_string(&paths.daily_means).unwrap();
    assert_eq!(daily.lines().count(), 1 + 2 * 20);
}

#[test]
fn bdd_scenario_price_paths_saved_on_request() {
    // GIVEN a study that keeps every instrument's history
    let mut config = SimulationConfig::random_walk_study();
    config.num_days = 8;
    config.group_size = 5;
    let keep = TrialOptions { keep_histories: true, ..options(3, 9, true) };
    let report = run_trials(&config, &keep).unwrap();

    // WHEN artifacts are saved
    let dir = tempfile::tempdir().unwrap();
    let paths = save_artifacts(&report, dir.path()).unwrap();

    // THEN price_paths.csv holds trials × instruments × (days + 1) rows
    let file = paths.price_paths.expect("price paths should be written");
    let rows = fs::read_to_string(&file).unwrap().lines().count() - 1;
    assert_eq!(rows, 3 * 5 * (8 + 1));
}

#[test]
fn bdd_scenario_non_ascii_run_id_saves() {
    // GIVEN a reloaded report whose run id is not plain ASCII
    let mut config = SimulationConfig::random_walk_study();
    config.num_days = 3;
    config.group_size = 2;
    let mut report = run_trials(&config, &options(1, 2, false)).unwrap();
    report.run_id = format!("a{}", "é".repeat(20));

    // WHEN artifacts are saved
    let dir = tempfile::tempdir().unwrap();
    let paths = save_artifacts(&report, dir.path()).expect("artifacts should save");

    // THEN the directory is named after the first 12 characters
    let name = paths.dir.file_name().unwrap().to_string_lossy().into_owned();
    assert_eq!(name.chars().count(), 12);
    assert!(paths.price_paths.is_none());
}
