//! CLI support for writing scenario datasets to disk.
//!
//! The binary delegates to these functions so parsing and generation can be
//! exercised in tests without spawning a subprocess.

mod error;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs::Dir};
use clap::Parser;
use clap::error::ErrorKind;

pub use error::CliError;

use crate::persist::{WrittenFiles, write_generated};
use crate::pipeline::generate;
use crate::registry::FamilyRegistry;
use crate::scenario::{Scenario, ScenarioSet};

const BIN_NAME: &str = "glmm-data-generate";

/// Parsed options for the generation CLI.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "glmm-data-generate",
    about = "Generate multilevel GLM datasets and their metadata from named scenarios",
    version
)]
pub struct Options {
    /// Scenario file to load. Defaults to the built-in demonstration set.
    #[arg(long = "scenarios", value_name = "path")]
    scenarios: Option<Utf8PathBuf>,
    /// Scenario to generate; repeat to select several. Defaults to all.
    #[arg(long = "scenario", value_name = "name")]
    scenario: Vec<String>,
    /// Directory receiving the CSV and metadata files.
    #[arg(long = "out-dir", value_name = "dir", default_value = "data")]
    out_dir: Utf8PathBuf,
}

impl Options {
    /// Returns the scenario file, if one was supplied.
    #[must_use]
    pub fn scenarios_path(&self) -> Option<&Utf8Path> {
        self.scenarios.as_deref()
    }

    /// Returns the selected scenario names.
    #[must_use]
    pub fn scenario_names(&self) -> &[String] {
        &self.scenario
    }

    /// Returns the output directory.
    ///
    /// # Example
    ///
    /// ```
    /// use glmm_data::generate_cli::{ParseOutcome, parse_args};
    ///
    /// let args = vec!["--out-dir".to_string(), "target/demo".to_string()];
    /// let ParseOutcome::Options(options) = parse_args(args.into_iter()).expect("parse") else {
    ///     panic!("expected options");
    /// };
    ///
    /// assert_eq!(options.out_dir(), "target/demo");
    /// ```
    #[must_use]
    pub fn out_dir(&self) -> &Utf8Path {
        &self.out_dir
    }
}

/// Outcome of parsing CLI arguments.
#[derive(Debug, Clone)]
pub enum ParseOutcome {
    /// Print the rendered help or version text and exit successfully.
    Help(String),
    /// Continue with the parsed options.
    Options(Options),
}

/// Result of generating one scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Scenario name.
    pub scenario: String,
    /// Number of rows written.
    pub n_obs: usize,
    /// Files written, relative to the output directory.
    pub files: WrittenFiles,
}

/// Parses CLI arguments, excluding the program name.
///
/// # Errors
///
/// Returns [`CliError::Usage`] when a flag is unknown or missing its value.
///
/// # Example
///
/// ```
/// use glmm_data::generate_cli::{ParseOutcome, parse_args};
///
/// let args = vec![
///     "--scenario".to_string(),
///     "Gamma_log".to_string(),
/// ];
///
/// let outcome = parse_args(args.into_iter()).expect("parse args");
/// assert!(matches!(outcome, ParseOutcome::Options(_)));
/// ```
pub fn parse_args<I>(args: I) -> Result<ParseOutcome, CliError>
where
    I: Iterator<Item = String>,
{
    match Options::try_parse_from(std::iter::once(BIN_NAME.to_owned()).chain(args)) {
        Ok(options) => Ok(ParseOutcome::Options(options)),
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            Ok(ParseOutcome::Help(err.to_string()))
        }
        Err(err) => Err(CliError::Usage {
            message: err.to_string(),
        }),
    }
}

/// Generates every selected scenario and writes its files.
///
/// Scenarios run in selection order; the first failure stops the run.
///
/// # Errors
///
/// Returns [`CliError`] when the scenario file cannot be loaded, a name is
/// unknown, generation fails, or output cannot be written.
pub fn run(options: &Options) -> Result<Vec<Outcome>, CliError> {
    let set = match options.scenarios_path() {
        Some(path) => ScenarioSet::from_path(path)?,
        None => ScenarioSet::builtin(),
    };
    let selected = set.select(options.scenario_names())?;
    let dir = open_output_dir(options.out_dir())?;
    let registry = FamilyRegistry::new();

    selected
        .into_iter()
        .map(|scenario| run_scenario(&registry, &dir, scenario))
        .collect()
}

/// Formats the success message emitted for one scenario.
///
/// # Example
///
/// ```
/// use glmm_data::generate_cli::{Outcome, success_message};
/// use glmm_data::persist::{data_file_name, metadata_file_name, WrittenFiles};
/// use camino::Utf8Path;
///
/// let outcome = Outcome {
///     scenario: "Gamma_log".to_string(),
///     n_obs: 10,
///     files: WrittenFiles {
///         data: data_file_name("Gamma_log"),
///         metadata: metadata_file_name("Gamma_log"),
///     },
/// };
/// let message = success_message(&outcome, Utf8Path::new("data"));
///
/// assert!(message.contains("data/Gamma_log_data.csv"));
/// ```
#[must_use]
pub fn success_message(outcome: &Outcome, out_dir: &Utf8Path) -> String {
    format!(
        "Generated scenario \"{}\" ({} rows): {} and {}",
        outcome.scenario,
        outcome.n_obs,
        out_dir.join(&outcome.files.data),
        out_dir.join(&outcome.files.metadata)
    )
}

fn run_scenario(
    registry: &FamilyRegistry,
    dir: &Dir,
    scenario: &Scenario,
) -> Result<Outcome, CliError> {
    let data = generate(registry, scenario.params(), scenario.seed()).map_err(|source| {
        CliError::Generation {
            scenario: scenario.name().to_owned(),
            source,
        }
    })?;
    let files = write_generated(dir, scenario, &data)?;

    Ok(Outcome {
        scenario: scenario.name().to_owned(),
        n_obs: data.dataset().n_obs(),
        files,
    })
}

fn open_output_dir(path: &Utf8Path) -> Result<Dir, CliError> {
    let dir_error = |err: std::io::Error| CliError::OutputDir {
        path: path.to_path_buf(),
        message: err.to_string(),
    };
    Dir::create_ambient_dir_all(path, ambient_authority()).map_err(dir_error)?;
    Dir::open_ambient_dir(path, ambient_authority()).map_err(dir_error)
}
