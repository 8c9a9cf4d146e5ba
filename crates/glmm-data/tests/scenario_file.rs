//! Integration tests for scenario files and scenario output.
//!
//! These tests validate loading scenario sets from disk and the files
//! written for a generated scenario.

#![expect(
    clippy::expect_used,
    reason = "test code uses expect for clear failure messages"
)]


use camino::Utf8Path;
use cap_std::{ambient_authority, fs::Dir};
use glmm_data::persist::{read_dataset, write_generated};
use glmm_data::{DEFAULT_N_OBS, FamilyRegistry, ScenarioError, ScenarioSet, generate};
use rstest::rstest;
use test_support::{read_file, unique_temp_dir, write_file};

const TWO_SCENARIOS: &str = r#"{
    "version": 1,
    "scenarios": [
        {"name": "plain", "seed": 3, "formula": "y ~ 2 + 0.5*x1"},
        {"name": "skewed", "seed": 4, "formula": "y ~ 0.1 + 0.3*x1 + -0.2*x2",
         "nObs": 250, "nGroups": 5, "groupSd": 0.4, "phi": 0.25,
         "family": "Gamma", "link": "log", "centerSample": false}
    ]
}"#;

#[test]
fn loads_scenario_set_from_path() {
    let root = unique_temp_dir("scenario-file").expect("temp dir");
    let path = write_file(&root, "scenarios.json", TWO_SCENARIOS).expect("write scenarios");

    let set = ScenarioSet::from_path(&path).expect("load scenarios");

    assert_eq!(set.scenarios().len(), 2);
    assert_eq!(set.find("plain").expect("plain").params().n_obs, DEFAULT_N_OBS);
    let skewed = set.find("skewed").expect("skewed").params();
    assert_eq!(skewed.family, "Gamma");
    assert!(!skewed.center_sample);
}

#[test]
fn missing_scenario_file_reports_io_error() {
    let root = unique_temp_dir("scenario-missing").expect("temp dir");
    let path = root.join("absent.json");

    let err = ScenarioSet::from_path(&path).expect_err("missing file");

    assert!(matches!(err, ScenarioError::IoError { .. }));
}

#[rstest]
#[case::plain("plain", 1000)]
#[case::skewed("skewed", 250)]
fn written_scenario_round_trips(#[case] name: &str, #[case] rows: usize) {
    let root = unique_temp_dir("scenario-output").expect("temp dir");
    let set = ScenarioSet::from_json(TWO_SCENARIOS).expect("valid scenarios");
    let scenario = set.find(name).expect("scenario exists");
    let data = generate(&FamilyRegistry::new(), scenario.params(), scenario.seed())
        .expect("generation succeeds");
    let dir = Dir::open_ambient_dir(&root, ambient_authority()).expect("open temp dir");

    let files = write_generated(&dir, scenario, &data).expect("write output");
    let dataset = read_dataset(&dir, &files.data).expect("read dataset");

    assert_eq!(dataset.n_obs(), rows);
    assert_eq!(&dataset, data.dataset());

    let metadata: serde_json::Value =
        serde_json::from_str(&read_file(&root, &files.metadata).expect("read metadata"))
            .expect("metadata is JSON");
    assert_eq!(metadata["formula"], scenario.params().formula.as_str());
    assert_eq!(metadata["seed"], scenario.seed());
    for (group, intercept) in data.group_effects().iter() {
        assert_eq!(metadata["grp_to_b"][group.to_string()], intercept);
    }
}

#[test]
fn rewriting_a_scenario_replaces_its_files() {
    let root = unique_temp_dir("scenario-rewrite").expect("temp dir");
    let set = ScenarioSet::from_json(TWO_SCENARIOS).expect("valid scenarios");
    let scenario = set.find("plain").expect("scenario exists");
    let data = generate(&FamilyRegistry::new(), scenario.params(), scenario.seed())
        .expect("generation succeeds");
    let dir = Dir::open_ambient_dir(&root, ambient_authority()).expect("open temp dir");

    write_generated(&dir, scenario, &data).expect("first write");
    let files = write_generated(&dir, scenario, &data).expect("second write");

    let first = read_file(&root, &files.data).expect("read dataset");
    assert_eq!(
        first,
        data.dataset().to_csv().expect("encode dataset"),
        "rewritten file should hold the same dataset"
    );
    assert!(read_file(&root, Utf8Path::new("plain_data.csv")).is_ok());
}
