//! Error types for the dataset generation CLI.

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::error::{GenerationError, PersistError, ScenarioError};

/// Errors surfaced by the CLI parsing and generation flow.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CliError {
    /// The arguments could not be parsed.
    #[error("{message}")]
    Usage {
        /// Rendered parser message.
        message: String,
    },
    /// The scenario file could not be loaded or a scenario was not found.
    #[error("scenario error: {source}")]
    Scenario {
        /// Underlying scenario error.
        #[from]
        #[source]
        source: ScenarioError,
    },
    /// A scenario failed to generate.
    #[error("scenario '{scenario}' failed: {source}")]
    Generation {
        /// Name of the failing scenario.
        scenario: String,
        /// Underlying generation error.
        #[source]
        source: GenerationError,
    },
    /// Output files could not be written.
    #[error("output error: {source}")]
    Persist {
        /// Underlying persistence error.
        #[from]
        #[source]
        source: PersistError,
    },
    /// The output directory could not be created or opened.
    #[error("output directory {path}: {message}")]
    OutputDir {
        /// Directory that was requested.
        path: Utf8PathBuf,
        /// Operating system error message.
        message: String,
    },
}
