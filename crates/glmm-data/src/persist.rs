//! CSV and metadata output for generated datasets.
//!
//! Each scenario produces two files in the output directory:
//!
//! - `<name>_data.csv`: an unnamed row-index column followed by the dataset
//!   columns in export order. Reals use Rust's shortest round-trip
//!   formatting, so reading the file back reproduces every value exactly.
//! - `<name>_metadata.json`: the generation parameters, the seed, and the
//!   group intercepts under `grp_to_b`.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::fs::Dir;
use ndarray::{Array1, Array2};
use serde::Serialize;
use tracing::info;

use crate::atomic_io::write_atomic;
use crate::dataset::{
    Dataset, ETA_COLUMN, GROUP_INDEX_COLUMN, INTERCEPT_COLUMN, RESPONSE_COLUMN,
};
use crate::error::PersistError;
use crate::pipeline::GeneratedData;
use crate::random_effects::GroupEffects;
use crate::scenario::Scenario;

/// Paths written for one scenario, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFiles {
    /// The dataset CSV.
    pub data: Utf8PathBuf,
    /// The metadata JSON.
    pub metadata: Utf8PathBuf,
}

/// Generation parameters recorded next to a dataset.
#[derive(Debug, Clone, Serialize)]
pub struct Metadata<'a> {
    /// Formula as supplied.
    pub formula: &'a str,
    /// Number of observations.
    pub n_obs: usize,
    /// Number of groups.
    pub n_groups: usize,
    /// Standard deviation of the group intercepts.
    pub group_sd: f64,
    /// Dispersion.
    pub phi: f64,
    /// Family name.
    pub family: &'a str,
    /// Link name.
    pub link: &'a str,
    /// Whether the group intercepts were centred.
    pub center_sample: bool,
    /// RNG seed.
    pub seed: u64,
    /// Group intercepts keyed by group index.
    pub grp_to_b: &'a GroupEffects,
}

impl<'a> Metadata<'a> {
    /// Collects the metadata of a scenario run.
    #[must_use]
    pub fn new(scenario: &'a Scenario, data: &'a GeneratedData) -> Self {
        let params = scenario.params();
        Self {
            formula: &params.formula,
            n_obs: params.n_obs,
            n_groups: params.n_groups,
            group_sd: params.group_sd,
            phi: params.phi,
            family: &params.family,
            link: &params.link,
            center_sample: params.center_sample,
            seed: scenario.seed(),
            grp_to_b: data.group_effects(),
        }
    }
}

/// Returns the CSV file name for a scenario.
#[must_use]
pub fn data_file_name(scenario_name: &str) -> Utf8PathBuf {
    Utf8PathBuf::from(format!("{scenario_name}_data.csv"))
}

/// Returns the metadata file name for a scenario.
#[must_use]
pub fn metadata_file_name(scenario_name: &str) -> Utf8PathBuf {
    Utf8PathBuf::from(format!("{scenario_name}_metadata.json"))
}

/// Writes the dataset CSV and metadata JSON of a scenario run into `dir`.
///
/// # Errors
///
/// Returns [`PersistError`] if encoding fails or a file cannot be written.
pub fn write_generated(
    dir: &Dir,
    scenario: &Scenario,
    data: &GeneratedData,
) -> Result<WrittenFiles, PersistError> {
    let files = WrittenFiles {
        data: data_file_name(scenario.name()),
        metadata: metadata_file_name(scenario.name()),
    };

    let csv = dataset_to_csv(data.dataset())?;
    write_atomic(dir, &files.data, csv.as_bytes())?;

    let metadata = serde_json::to_string_pretty(&Metadata::new(scenario, data)).map_err(|e| {
        PersistError::MetadataError {
            message: e.to_string(),
        }
    })?;
    write_atomic(dir, &files.metadata, metadata.as_bytes())?;

    info!(
        scenario = scenario.name(),
        data = %files.data,
        metadata = %files.metadata,
        "scenario output written"
    );

    Ok(files)
}

/// Reads a dataset CSV from `dir`.
///
/// # Errors
///
/// Returns [`PersistError::ReadError`] if the file cannot be read and any
/// error of [`dataset_from_csv`].
pub fn read_dataset(dir: &Dir, path: &Utf8Path) -> Result<Dataset, PersistError> {
    let contents = dir
        .read_to_string(path)
        .map_err(|e| PersistError::ReadError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    dataset_from_csv(&contents)
}

impl Dataset {
    /// Encodes the dataset as CSV text. See [`dataset_to_csv`].
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::CsvError`] if the CSV writer fails.
    pub fn to_csv(&self) -> Result<String, PersistError> {
        dataset_to_csv(self)
    }

    /// Decodes a dataset from CSV text. See [`dataset_from_csv`].
    ///
    /// # Errors
    ///
    /// Returns [`PersistError`] if the text is not a dataset CSV.
    ///
    /// # Example
    ///
    /// ```
    /// use glmm_data::{Dataset, FamilyRegistry, GenerationParams, generate};
    ///
    /// let params = GenerationParams::new("y ~ 0.5 + 2*x1").with_n_obs(20);
    /// let data = generate(&FamilyRegistry::new(), &params, 9).expect("generated");
    ///
    /// let csv = data.dataset().to_csv().expect("encoded");
    /// assert_eq!(&Dataset::from_csv(&csv).expect("decoded"), data.dataset());
    /// ```
    pub fn from_csv(text: &str) -> Result<Self, PersistError> {
        dataset_from_csv(text)
    }
}

/// Encodes a dataset as CSV text.
///
/// # Errors
///
/// Returns [`PersistError::CsvError`] if the CSV writer fails.
pub fn dataset_to_csv(dataset: &Dataset) -> Result<String, PersistError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(std::iter::once("").chain(dataset.column_names()))
        .map_err(csv_error)?;

    let design = dataset.design();
    let rows = design
        .rows()
        .into_iter()
        .zip(dataset.eta())
        .zip(dataset.group_index().iter().zip(dataset.response()));
    for (row, ((x, &eta), (&group, &y))) in rows.enumerate() {
        let record: Vec<String> = std::iter::once(row.to_string())
            .chain(x.iter().map(f64::to_string))
            .chain([eta.to_string(), group.to_string(), y.to_string()])
            .collect();
        writer.write_record(&record).map_err(csv_error)?;
    }

    let bytes = writer.into_inner().map_err(|e| PersistError::CsvError {
        message: e.to_string(),
    })?;
    String::from_utf8(bytes).map_err(|e| PersistError::CsvError {
        message: e.to_string(),
    })
}

/// Decodes a dataset from CSV text written by [`dataset_to_csv`].
///
/// A leading column with an empty header is treated as the row index and
/// skipped. Every column except `eta`, `group_index`, and `y` is a
/// design column, kept in file order; `Intercept` must be among them.
///
/// # Errors
///
/// Returns [`PersistError`] if a required column is missing, a row has the
/// wrong width, or a cell does not parse.
pub fn dataset_from_csv(text: &str) -> Result<Dataset, PersistError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());
    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(str::to_owned)
        .collect();
    let layout = ColumnLayout::from_headers(&headers)?;

    let mut design_values: Vec<f64> = Vec::new();
    let mut eta: Vec<f64> = Vec::new();
    let mut group_index: Vec<usize> = Vec::new();
    let mut response: Vec<f64> = Vec::new();

    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(csv_error)?;
        let cell = |position: usize| -> Result<&str, PersistError> {
            record.get(position).ok_or_else(|| PersistError::CsvError {
                message: format!("row {row} has {} fields", record.len()),
            })
        };
        for &position in &layout.design {
            design_values.push(parse_cell(cell(position)?, &headers, position, row)?);
        }
        eta.push(parse_cell(cell(layout.eta)?, &headers, layout.eta, row)?);
        group_index.push(parse_cell(
            cell(layout.group_index)?,
            &headers,
            layout.group_index,
            row,
        )?);
        response.push(parse_cell(cell(layout.response)?, &headers, layout.response, row)?);
    }

    let design_names: Vec<String> = layout
        .design
        .iter()
        .filter_map(|&position| headers.get(position).cloned())
        .collect();
    let design = Array2::from_shape_vec((eta.len(), design_names.len()), design_values)
        .map_err(|e| PersistError::CsvError {
            message: e.to_string(),
        })?;

    Ok(Dataset::from_parts(
        design_names,
        design,
        Array1::from(eta),
        group_index,
        Array1::from(response),
    ))
}

/// Header positions of each dataset column.
struct ColumnLayout {
    design: Vec<usize>,
    eta: usize,
    group_index: usize,
    response: usize,
}

impl ColumnLayout {
    fn from_headers(headers: &[String]) -> Result<Self, PersistError> {
        let find = |name: &'static str| {
            headers
                .iter()
                .position(|header| header == name)
                .ok_or(PersistError::MissingColumn { name })
        };
        let eta = find(ETA_COLUMN)?;
        let group_index = find(GROUP_INDEX_COLUMN)?;
        let response = find(RESPONSE_COLUMN)?;
        find(INTERCEPT_COLUMN)?;

        let skip_index = usize::from(headers.first().is_some_and(String::is_empty));
        let design = (skip_index..headers.len())
            .filter(|position| ![eta, group_index, response].contains(position))
            .collect();

        Ok(Self {
            design,
            eta,
            group_index,
            response,
        })
    }
}

fn parse_cell<T>(text: &str, headers: &[String], position: usize, row: usize) -> Result<T, PersistError>
where
    T: std::str::FromStr,
{
    text.parse::<T>().map_err(|_| PersistError::MalformedValue {
        column: headers.get(position).cloned().unwrap_or_default(),
        row,
        value: text.to_owned(),
    })
}

fn csv_error(err: csv::Error) -> PersistError {
    PersistError::CsvError {
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    //! Covers CSV layout, exact round trips, and malformed input.

    use rstest::rstest;

    use super::*;
    use crate::pipeline::{GenerationParams, generate};
    use crate::registry::FamilyRegistry;

    fn generated(n_obs: usize) -> GeneratedData {
        let params = GenerationParams::new("y ~ 1.4 + 3.15*x1 + 2.5*x2")
            .with_n_obs(n_obs)
            .with_groups(3, 1.5)
            .with_family("Gamma", "log")
            .with_phi(0.6);
        generate(&FamilyRegistry::new(), &params, 31).expect("generated")
    }

    #[test]
    fn header_matches_the_column_contract() {
        let csv = dataset_to_csv(generated(3).dataset()).expect("encoded");
        let header = csv.lines().next().expect("header line");

        assert_eq!(header, ",Intercept,x1,x2,eta,group_index,y");
        assert_eq!(csv.lines().count(), 4);
    }

    #[test]
    fn csv_round_trip_is_exact() {
        let data = generated(200);

        let csv = dataset_to_csv(data.dataset()).expect("encoded");
        let decoded = dataset_from_csv(&csv).expect("decoded");

        assert_eq!(&decoded, data.dataset());
    }

    #[test]
    fn csv_without_index_column_is_accepted() {
        let csv = "Intercept,x1,eta,group_index,y\n1,0.5,2,0,2.25\n";

        let decoded = dataset_from_csv(csv).expect("decoded");

        assert_eq!(decoded.design_names(), &["Intercept", "x1"]);
        assert_eq!(decoded.group_index(), &[0]);
    }

    #[rstest]
    #[case::missing_eta(",Intercept,x1,group_index,y\n0,1,0.5,0,1\n", PersistError::MissingColumn { name: "eta" })]
    #[case::missing_intercept(",x1,eta,group_index,y\n0,0.5,1,0,1\n", PersistError::MissingColumn { name: "Intercept" })]
    #[case::bad_group(
        ",Intercept,eta,group_index,y\n0,1,1,-1,1\n",
        PersistError::MalformedValue { column: "group_index".to_owned(), row: 0, value: "-1".to_owned() }
    )]
    #[case::bad_real(
        ",Intercept,eta,group_index,y\n0,1,abc,0,1\n",
        PersistError::MalformedValue { column: "eta".to_owned(), row: 0, value: "abc".to_owned() }
    )]
    fn malformed_csv_is_rejected(#[case] csv: &str, #[case] expected: PersistError) {
        assert_eq!(dataset_from_csv(csv), Err(expected));
    }

    #[test]
    fn metadata_records_parameters_and_group_effects() {
        let data = generated(10);
        let scenario = Scenario::new(
            "Gamma_log".to_owned(),
            31,
            GenerationParams::new("y ~ 1.4 + 3.15*x1 + 2.5*x2")
                .with_n_obs(10)
                .with_groups(3, 1.5)
                .with_family("Gamma", "log")
                .with_phi(0.6),
        );

        let value = serde_json::to_value(Metadata::new(&scenario, &data)).expect("serialize");

        assert_eq!(value["formula"], "y ~ 1.4 + 3.15*x1 + 2.5*x2");
        assert_eq!(value["n_obs"], 10);
        assert_eq!(value["n_groups"], 3);
        assert_eq!(value["family"], "Gamma");
        assert_eq!(value["seed"], 31);
        let groups = value["grp_to_b"].as_object().expect("grp_to_b object");
        assert_eq!(groups.len(), 3);
        assert!(groups.contains_key("0"));
    }

    #[test]
    fn file_names_follow_scenario_name() {
        assert_eq!(data_file_name("Gaussian_identity"), "Gaussian_identity_data.csv");
        assert_eq!(
            metadata_file_name("Gaussian_identity"),
            "Gaussian_identity_metadata.json"
        );
    }
}
