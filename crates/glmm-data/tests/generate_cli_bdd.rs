//! Behavioural tests for the scenario generation CLI.
//!
//! These scenarios validate that the CLI writes datasets and metadata for
//! built-in and file-based scenarios and reports configuration failures.

#![expect(
    clippy::expect_used,
    reason = "test code uses expect for clear failure messages"
)]


use camino::{Utf8Path, Utf8PathBuf};
use test_support::{read_file, unique_temp_dir, write_file};

use glmm_data::generate_cli::{CliError, Outcome, ParseOutcome, parse_args, run, success_message};
use glmm_data::{Dataset, ScenarioError};
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::{ScenarioState, given, scenario, then, when};

#[derive(Default, ScenarioState)]
struct World {
    root: Slot<Utf8PathBuf>,
    scenarios_path: Slot<Utf8PathBuf>,
    command_result: Slot<CommandResult>,
}

#[derive(Debug, Clone)]
struct CommandResult {
    outcome: Result<Vec<Outcome>, CliError>,
    messages: Vec<String>,
}

impl World {
    fn root(&self) -> Utf8PathBuf {
        self.root.get().expect("output root should be set")
    }

    fn out_dir(&self) -> Utf8PathBuf {
        self.root().join("out")
    }

    fn outcomes(&self) -> Vec<Outcome> {
        let result = self.command_result.get().expect("command result set");
        result.outcome.expect("CLI should succeed")
    }

    fn single_outcome(&self) -> Outcome {
        let mut outcomes = self.outcomes();
        assert_eq!(outcomes.len(), 1, "expected one scenario to run");
        outcomes.pop().expect("one outcome")
    }
}

#[fixture]
fn world() -> World {
    World::default()
}

#[given("an empty output directory")]
fn an_empty_output_directory(world: &World) {
    let root = unique_temp_dir("generate-cli-bdd").expect("create temp dir");
    world.root.set(root);
}

#[given("a scenario file with one minimal scenario named \"{name}\"")]
fn a_scenario_file_with_one_minimal_scenario(world: &World, name: String) {
    let json = format!(
        r#"{{"version": 1, "scenarios": [
            {{"name": "{name}", "seed": 5, "formula": "y ~ 0.5 + 1.5*x1"}}
        ]}}"#
    );
    let path = write_file(&world.root(), "scenarios.json", &json).expect("write scenarios");
    world.scenarios_path.set(path);
}

#[given("a scenario file with version {version:u32}")]
fn a_scenario_file_with_version(world: &World, version: u32) {
    let json = format!(
        r#"{{"version": {version}, "scenarios": [
            {{"name": "future", "seed": 5, "formula": "y ~ 0.5 + 1.5*x1"}}
        ]}}"#
    );
    let path = write_file(&world.root(), "scenarios.json", &json).expect("write scenarios");
    world.scenarios_path.set(path);
}

#[when("the generation CLI runs the built-in scenario \"{name}\"")]
fn the_cli_runs_a_builtin_scenario(world: &World, name: String) {
    let out_dir = world.out_dir();
    let result = run_cli(&["--scenario", &name, "--out-dir", out_dir.as_str()]);
    world.command_result.set(result);
}

#[when("the generation CLI runs the scenario file")]
fn the_cli_runs_the_scenario_file(world: &World) {
    let out_dir = world.out_dir();
    let scenarios = world.scenarios_path.get().expect("scenario file set");
    let result = run_cli(&[
        "--scenarios",
        scenarios.as_str(),
        "--out-dir",
        out_dir.as_str(),
    ]);
    world.command_result.set(result);
}

#[then("the CLI reports success for \"{name}\"")]
fn the_cli_reports_success(world: &World, name: String) {
    let result = world.command_result.get().expect("command result set");
    let outcome = world.single_outcome();

    assert_eq!(outcome.scenario, name);
    assert_eq!(
        result.messages,
        vec![success_message(&outcome, &world.out_dir())]
    );
}

#[then("the output directory contains \"{file_name}\"")]
fn the_output_directory_contains(world: &World, file_name: String) {
    let contents =
        read_file(&world.out_dir(), Utf8Path::new(&file_name)).expect("output file readable");

    assert!(!contents.is_empty());
}

#[then("the written dataset has {rows:usize} rows")]
fn the_written_dataset_has_rows(world: &World, rows: usize) {
    let outcome = world.single_outcome();
    let csv = read_file(&world.out_dir(), &outcome.files.data).expect("dataset readable");
    let dataset = Dataset::from_csv(&csv).expect("dataset decodes");

    assert_eq!(outcome.n_obs, rows);
    assert_eq!(dataset.n_obs(), rows);
}

#[then("the metadata records {n_groups:usize} groups")]
fn the_metadata_records_groups(world: &World, n_groups: usize) {
    let outcome = world.single_outcome();
    let json = read_file(&world.out_dir(), &outcome.files.metadata).expect("metadata readable");
    let metadata: serde_json::Value = serde_json::from_str(&json).expect("metadata is JSON");

    assert_eq!(metadata["n_groups"], n_groups);
    assert_eq!(
        metadata["grp_to_b"].as_object().map(serde_json::Map::len),
        Some(n_groups)
    );
}

#[then("the CLI reports an unsupported version error")]
fn the_cli_reports_an_unsupported_version_error(world: &World) {
    let result = world.command_result.get().expect("command result set");

    match result.outcome {
        Err(CliError::Scenario {
            source: ScenarioError::UnsupportedVersion { expected, actual },
        }) => {
            assert_eq!(expected, 1);
            assert_eq!(actual, 2);
        }
        other => panic!("Expected UnsupportedVersion, got: {other:?}"),
    }
    assert!(result.messages.is_empty());
}

#[scenario(path = "tests/features/generate_cli.feature", index = 0)]
fn builtin_scenarios_write_datasets_and_metadata(world: World) {
    let _ = world;
}

#[scenario(path = "tests/features/generate_cli.feature", index = 1)]
fn scenario_files_fill_omitted_parameters(world: World) {
    let _ = world;
}

#[scenario(path = "tests/features/generate_cli.feature", index = 2)]
fn unsupported_scenario_file_version_is_reported(world: World) {
    let _ = world;
}

fn run_cli(args: &[&str]) -> CommandResult {
    let ParseOutcome::Options(options) =
        parse_args(args.iter().map(|&arg| arg.to_owned())).expect("parse args")
    else {
        panic!("expected options");
    };

    let outcome = run(&options);
    let messages = outcome
        .as_ref()
        .map(|outcomes| {
            outcomes
                .iter()
                .map(|o| success_message(o, options.out_dir()))
                .collect()
        })
        .unwrap_or_default();

    CommandResult { outcome, messages }
}
