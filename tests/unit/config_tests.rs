use std::fs;

use banditry::BanditError;
use banditry::bandit::SelectionPolicy;
use banditry::config::{Config, PROJECT_CONFIG_FILE};
use banditry::test_utils::{TestCase, run_table_tests};
use tempfile::tempdir;

#[test]
fn config_sections_from_toml() -> Result<(), String> {
    let cases = vec![
        TestCase {
            name: "empty file keeps defaults",
            input: "",
            expected: (0.05, 0.95, 1000u64, 0.01, SelectionPolicy::EstimatedBest, 5000usize, None),
            should_panic: false,
        },
        TestCase {
            name: "experiment section only",
            input: "[experiment]\nstop_alpha = 0.1\nmax_rounds = 0\npolicy = \"thompson\"\n",
            expected: (0.1, 0.95, 0u64, 0.01, SelectionPolicy::Thompson, 5000usize, None),
            should_panic: false,
        },
        TestCase {
            name: "sampling section only",
            input: "[sampling]\nmc_samples = 2000\nseed = 9\n",
            expected: (0.05, 0.95, 1000u64, 0.01, SelectionPolicy::EstimatedBest, 2000usize, Some(9u64)),
            should_panic: false,
        },
        TestCase {
            name: "unknown policy",
            input: "[experiment]\npolicy = \"greedy\"\n",
            expected: (0.0, 0.0, 0u64, 0.0, SelectionPolicy::EstimatedBest, 0usize, None),
            should_panic: true,
        },
    ];

    run_table_tests(cases, |raw| {
        let config: Config = toml::from_str(raw).expect("parse config");
        (
            config.experiment.stop_alpha,
            config.experiment.stop_value,
            config.experiment.max_rounds,
            config.experiment.value_threshold,
            config.experiment.policy,
            config.sampling.mc_samples,
            config.sampling.seed,
        )
    })
}

#[test]
fn explicit_path_skips_project_file() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join(PROJECT_CONFIG_FILE), "[experiment]\nmax_rounds = 5\n").unwrap();
    let explicit = dir.path().join("explicit.toml");
    fs::write(&explicit, "[experiment]\nstop_value = 0.9\n").unwrap();

    let config = Config::load(Some(&explicit), dir.path()).unwrap();
    assert!((config.experiment.stop_value - 0.9).abs() < 1e-12);
    assert_eq!(config.experiment.max_rounds, 1000);
}

#[test]
fn missing_explicit_file_uses_defaults() {
    let dir = tempdir().unwrap();
    let config = Config::load(Some(&dir.path().join("nope.toml")), dir.path()).unwrap();
    assert_eq!(config.sampling.mc_samples, 5000);
}

#[test]
fn malformed_file_is_config_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[experiment\nstop_alpha = ").unwrap();

    let err = Config::load(Some(&path), dir.path()).unwrap_err();
    assert!(matches!(err, BanditError::Config(msg) if msg.contains("parse config")));
}

#[test]
fn out_of_range_values_rejected_on_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("range.toml");
    fs::write(&path, "[experiment]\nstop_value = 1.0\n").unwrap();

    assert!(matches!(
        Config::load(Some(&path), dir.path()),
        Err(BanditError::Config(_))
    ));
}

#[test]
fn unset_budget_maps_to_none() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("unbounded.toml");
    fs::write(&path, "[experiment]\nmax_rounds = 0\nround_cap = 500\n").unwrap();

    let config = Config::load(Some(&path), dir.path()).unwrap();
    let rules = config.stopping_rules().unwrap();
    assert_eq!(rules.max_rounds, None);
    assert_eq!(config.experiment.round_cap, 500);
}
