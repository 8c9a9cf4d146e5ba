//! Error types for the glmm-data crate.
//!
//! This module defines semantic error enums for formula parsing, data
//! generation, scenario configuration, and dataset persistence, following the
//! project's error handling conventions with `thiserror`.

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::family::Family;

/// Grammar failures raised while parsing a linear-predictor formula.
///
/// Term indices count from zero, so the intercept term is index `0`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    /// The formula contains a character outside the grammar.
    #[error("unexpected character '{ch}' at position {position}")]
    UnexpectedCharacter {
        /// The offending character.
        ch: char,
        /// Byte offset of the character in the formula.
        position: usize,
    },

    /// The formula has no `~` separating response and predictor.
    #[error("formula is missing '~'")]
    MissingTilde,

    /// The left-hand side is not a single response name.
    #[error("formula must start with a single response name before '~'")]
    MissingResponse,

    /// A `+` separated term is empty.
    #[error("term {index} is empty")]
    EmptyTerm {
        /// Position of the empty term.
        index: usize,
    },

    /// The first term carries a variable; the intercept must be a bare number.
    #[error("the intercept term must be a bare coefficient without '*'")]
    InterceptHasVariable,

    /// A non-intercept term has no `*<variable>` part.
    #[error("term {index} must have the form '<coefficient>*<variable>'")]
    MissingVariable {
        /// Position of the offending term.
        index: usize,
    },

    /// A term multiplies more than one variable.
    #[error("term {index} contains more than one '*'")]
    TooManyFactors {
        /// Position of the offending term.
        index: usize,
    },

    /// A coefficient does not parse as a real number.
    #[error("invalid coefficient '{text}'")]
    InvalidCoefficient {
        /// The text that failed to parse.
        text: String,
    },

    /// The same variable appears in more than one term.
    #[error("variable '{name}' appears more than once")]
    DuplicateVariable {
        /// The repeated variable name.
        name: String,
    },

    /// A variable collides with a generated dataset column.
    #[error("variable name '{name}' is reserved for a generated column")]
    ReservedName {
        /// The reserved name.
        name: String,
    },

    /// A token appears where the grammar does not allow it.
    #[error("unexpected token in term {index}")]
    UnexpectedToken {
        /// Position of the term containing the token.
        index: usize,
    },
}

/// Errors raised while generating a synthetic dataset.
///
/// Every variant aborts the pipeline; no partial dataset is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerationError {
    /// The requested family is not registered.
    #[error("unknown family '{name}'")]
    UnknownFamily {
        /// The requested family name.
        name: String,
    },

    /// The requested link is not registered.
    #[error("unknown link '{name}'")]
    UnknownLink {
        /// The requested link name.
        name: String,
    },

    /// The formula could not be parsed.
    #[error("formula syntax error: {0}")]
    FormulaSyntax(#[from] FormulaError),

    /// A numeric parameter is outside its admissible range.
    #[error("invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        /// Parameter name as it appears in the generation request.
        name: &'static str,
        /// The rejected value.
        value: String,
        /// The constraint that was violated.
        reason: &'static str,
    },

    /// A per-observation quantity left the family's admissible domain.
    #[error("{family} {quantity} out of domain at observation {index}: {value} ({reason})")]
    Domain {
        /// Family whose domain was violated.
        family: Family,
        /// Name of the quantity (`mean`, `variance`, or `sd`).
        quantity: &'static str,
        /// Index of the first offending observation.
        index: usize,
        /// The offending value.
        value: f64,
        /// Description of the violated constraint.
        reason: String,
    },
}

/// Errors that can occur when loading or querying a scenario file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScenarioError {
    /// The scenario file could not be read.
    #[error("failed to read scenario file at '{path}': {message}")]
    IoError {
        /// Path to the scenario file.
        path: Utf8PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    /// The scenario JSON is malformed or missing required fields.
    #[error("invalid scenario JSON: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
    },

    /// The scenario file version is not supported.
    #[error("unsupported scenario file version: expected {expected}, found {actual}")]
    UnsupportedVersion {
        /// Expected version number.
        expected: u32,
        /// Actual version found in the file.
        actual: u32,
    },

    /// The scenario file lists no scenarios.
    #[error("scenario file contains no scenarios")]
    EmptyScenarios,

    /// Two scenarios share a name.
    #[error("scenario '{name}' is defined more than once")]
    DuplicateScenario {
        /// The repeated scenario name.
        name: String,
    },

    /// A scenario name cannot be used as an output file-name prefix.
    #[error("scenario name '{name}' must be non-empty and contain no path separators")]
    InvalidScenarioName {
        /// The rejected scenario name.
        name: String,
    },

    /// The requested scenario does not exist.
    #[error("scenario '{name}' not found")]
    ScenarioNotFound {
        /// The scenario name that was not found.
        name: String,
    },
}

/// Errors raised while writing or reading persisted datasets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistError {
    /// A file could not be written.
    #[error("failed to write '{path}': {message}")]
    WriteError {
        /// Path of the file being written.
        path: Utf8PathBuf,
        /// Description of the failure.
        message: String,
    },

    /// A file could not be read.
    #[error("failed to read '{path}': {message}")]
    ReadError {
        /// Path of the file being read.
        path: Utf8PathBuf,
        /// Description of the failure.
        message: String,
    },

    /// The CSV payload could not be encoded or decoded.
    #[error("csv error: {message}")]
    CsvError {
        /// Description of the failure.
        message: String,
    },

    /// A required column is absent from the CSV header.
    #[error("missing column '{name}'")]
    MissingColumn {
        /// Name of the absent column.
        name: &'static str,
    },

    /// A CSV cell does not hold a value of the column's type.
    #[error("malformed value '{value}' in column '{column}' at row {row}")]
    MalformedValue {
        /// Column containing the cell.
        column: String,
        /// Zero-based data row.
        row: usize,
        /// Raw cell text.
        value: String,
    },

    /// Metadata could not be encoded as JSON.
    #[error("metadata encoding failed: {message}")]
    MetadataError {
        /// Description of the failure.
        message: String,
    },
}
