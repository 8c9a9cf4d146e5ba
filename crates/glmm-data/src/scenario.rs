//! Scenario files describing named generation runs.
//!
//! A scenario file is versioned JSON listing named runs, each with a seed and
//! the generation parameters. Omitted parameters take the pipeline defaults.
//!
//! ```json
//! {
//!     "version": 1,
//!     "scenarios": [
//!         {"name": "Gamma_log", "seed": 123456789,
//!          "formula": "y ~ 1.4 + 3.15 * x1", "family": "Gamma", "link": "log"}
//!     ]
//! }
//! ```

use std::collections::HashSet;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use serde::Deserialize;

use crate::error::ScenarioError;
use crate::pipeline::{
    DEFAULT_FAMILY, DEFAULT_GROUP_SD, DEFAULT_LINK, DEFAULT_N_GROUPS, DEFAULT_N_OBS, DEFAULT_PHI,
    GenerationParams,
};

/// Current supported scenario file version.
pub const SUPPORTED_VERSION: u32 = 1;

/// Seed of the built-in demonstration scenarios.
pub const DEMO_SEED: u64 = 123_456_789;

/// Formula of the built-in demonstration scenarios.
pub const DEMO_FORMULA: &str = "y ~ 1.4 + 3.15 * x1 + 2.5 * x2 + 0.6 * x3";

/// A named generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    name: String,
    seed: u64,
    params: GenerationParams,
}

impl Scenario {
    /// Creates a scenario.
    #[must_use]
    pub const fn new(name: String, seed: u64, params: GenerationParams) -> Self {
        Self { name, seed, params }
    }

    /// Returns the scenario name, used as the output file prefix.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the RNG seed.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns the generation parameters.
    #[must_use]
    pub const fn params(&self) -> &GenerationParams {
        &self.params
    }
}

/// A validated set of uniquely named scenarios.
///
/// # Example
///
/// ```
/// use glmm_data::ScenarioSet;
///
/// let json = r#"{
///     "version": 1,
///     "scenarios": [{"name": "small", "seed": 42, "formula": "y ~ 1 + 2*x1", "nObs": 20}]
/// }"#;
///
/// let set = ScenarioSet::from_json(json).expect("valid scenarios");
/// let scenario = set.find("small").expect("scenario exists");
///
/// assert_eq!(scenario.params().n_obs, 20);
/// assert_eq!(scenario.params().family, "Gaussian");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioSet {
    version: u32,
    scenarios: Vec<Scenario>,
}

impl ScenarioSet {
    /// Parses a scenario set from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError`] if:
    /// - The JSON is malformed or a required field is missing
    /// - The version is unsupported
    /// - The scenario list is empty
    /// - Two scenarios share a name
    pub fn from_json(json: &str) -> Result<Self, ScenarioError> {
        let raw: RawScenarioSet =
            serde_json::from_str(json).map_err(|e| ScenarioError::ParseError {
                message: e.to_string(),
            })?;

        Self::from_raw(raw)
    }

    /// Loads a scenario set from a file path.
    ///
    /// The file is read through a capability handle on its parent directory.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::IoError`] if the file cannot be read, and any
    /// error of [`ScenarioSet::from_json`].
    pub fn from_path(path: &Utf8Path) -> Result<Self, ScenarioError> {
        let io_error = |message: String| ScenarioError::IoError {
            path: path.to_path_buf(),
            message,
        };
        let parent = match path.parent() {
            Some(parent) if !parent.as_str().is_empty() => parent,
            _ => Utf8Path::new("."),
        };
        let file_name = path
            .file_name()
            .ok_or_else(|| io_error("scenario path must be a file".to_owned()))?;
        let dir = Dir::open_ambient_dir(parent, ambient_authority())
            .map_err(|e| io_error(e.to_string()))?;

        Self::from_file(&dir, Utf8Path::new(file_name))
    }

    /// Loads a scenario set from a file inside `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::IoError`] if the file cannot be read, and any
    /// error of [`ScenarioSet::from_json`].
    pub fn from_file(dir: &Dir, path: &Utf8Path) -> Result<Self, ScenarioError> {
        let contents = dir
            .read_to_string(path)
            .map_err(|e| ScenarioError::IoError {
                path: Utf8PathBuf::from(path),
                message: e.to_string(),
            })?;

        Self::from_json(&contents)
    }

    /// Returns the demonstration set: the reference formula generated once
    /// as `Gaussian_identity` and once as `Gamma_log`.
    #[must_use]
    pub fn builtin() -> Self {
        let scenarios = [("Gaussian", "identity"), ("Gamma", "log")]
            .into_iter()
            .map(|(family, link)| {
                let params = GenerationParams::new(DEMO_FORMULA)
                    .with_n_obs(10_000)
                    .with_groups(8, 3.0)
                    .with_phi(0.6)
                    .with_family(family, link);
                Scenario::new(format!("{family}_{link}"), DEMO_SEED, params)
            })
            .collect();

        Self {
            version: SUPPORTED_VERSION,
            scenarios,
        }
    }

    fn from_raw(raw: RawScenarioSet) -> Result<Self, ScenarioError> {
        if raw.version != SUPPORTED_VERSION {
            return Err(ScenarioError::UnsupportedVersion {
                expected: SUPPORTED_VERSION,
                actual: raw.version,
            });
        }

        if raw.scenarios.is_empty() {
            return Err(ScenarioError::EmptyScenarios);
        }

        let mut seen = HashSet::new();
        let scenarios = raw
            .scenarios
            .into_iter()
            .map(|s| {
                let (name, seed, params) = s.into_parts();
                if !is_file_safe_name(&name) {
                    return Err(ScenarioError::InvalidScenarioName { name });
                }
                if !seen.insert(name.clone()) {
                    return Err(ScenarioError::DuplicateScenario { name });
                }
                Ok(Scenario::new(name, seed, params))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            version: raw.version,
            scenarios,
        })
    }

    /// Returns the file format version.
    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }

    /// Returns all scenarios in file order.
    #[must_use]
    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Finds a scenario by name.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::ScenarioNotFound`] if no scenario has the
    /// given name.
    pub fn find(&self, name: &str) -> Result<&Scenario, ScenarioError> {
        self.scenarios
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| ScenarioError::ScenarioNotFound {
                name: name.to_owned(),
            })
    }

    /// Selects scenarios by name, keeping the order of `names`.
    ///
    /// An empty selection returns every scenario.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::ScenarioNotFound`] for the first unknown
    /// name.
    pub fn select(&self, names: &[String]) -> Result<Vec<&Scenario>, ScenarioError> {
        if names.is_empty() {
            return Ok(self.scenarios.iter().collect());
        }
        names.iter().map(|name| self.find(name)).collect()
    }
}

/// Raw JSON representation for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawScenarioSet {
    version: u32,
    scenarios: Vec<RawScenario>,
}

/// Raw JSON representation of a scenario.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawScenario {
    name: String,
    seed: u64,
    #[serde(flatten)]
    params: RawParams,
}

/// Raw generation parameters with pipeline defaults.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawParams {
    formula: String,
    #[serde(default = "default_n_obs")]
    n_obs: usize,
    #[serde(default = "default_n_groups")]
    n_groups: usize,
    #[serde(default = "default_group_sd")]
    group_sd: f64,
    #[serde(default = "default_phi")]
    phi: f64,
    #[serde(default = "default_family")]
    family: String,
    #[serde(default = "default_link")]
    link: String,
    #[serde(default = "default_center_sample")]
    center_sample: bool,
}

impl From<RawParams> for GenerationParams {
    fn from(raw: RawParams) -> Self {
        Self {
            formula: raw.formula,
            n_obs: raw.n_obs,
            n_groups: raw.n_groups,
            group_sd: raw.group_sd,
            phi: raw.phi,
            family: raw.family,
            link: raw.link,
            center_sample: raw.center_sample,
        }
    }
}

impl RawScenario {
    fn into_parts(self) -> (String, u64, GenerationParams) {
        (self.name, self.seed, self.params.into())
    }
}

/// Returns `true` if `name` can prefix a file name in the output directory.
fn is_file_safe_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['/', '\\'])
}

const fn default_n_obs() -> usize {
    DEFAULT_N_OBS
}

const fn default_n_groups() -> usize {
    DEFAULT_N_GROUPS
}

const fn default_group_sd() -> f64 {
    DEFAULT_GROUP_SD
}

const fn default_phi() -> f64 {
    DEFAULT_PHI
}

fn default_family() -> String {
    DEFAULT_FAMILY.to_owned()
}

fn default_link() -> String {
    DEFAULT_LINK.to_owned()
}

const fn default_center_sample() -> bool {
    true
}
