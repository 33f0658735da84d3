//! Error types emitted by the gispub CLI.
//!
//! Keep this error type reasonably small, as most CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use gispub_core::{CollaboratorError, SynthesisError};
use gispub_data::import::ImportError;
use gispub_data::{BackendBuildError, ScanError};
use thiserror::Error;

/// Errors emitted by the gispub CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Missing option.
        field: &'static str,
        /// Environment variable that can supply it.
        env: &'static str,
    },
    /// The dataset folder does not exist or is not a directory.
    #[error("dataset folder {path:?} does not exist or is not a directory")]
    MissingFolder {
        /// Folder given on the command line.
        path: Utf8PathBuf,
    },
    /// Opening the project configuration failed.
    #[error("failed to open project configuration at {path:?}: {source}")]
    OpenProjectConfig {
        /// Configuration path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Project configuration JSON could not be decoded.
    #[error("failed to parse project configuration at {path:?}: {source}")]
    ParseProjectConfig {
        /// Configuration path.
        path: Utf8PathBuf,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },
    /// A generation input named by the project configuration is unreadable.
    #[error("failed to read {field} from {path:?}: {source}")]
    ReadGenerationInput {
        /// Configuration key naming the file.
        field: &'static str,
        /// File path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The platform configuration is not valid JSON.
    #[error("platform configuration at {path:?} is not valid JSON: {source}")]
    ParsePlatformConfig {
        /// File path.
        path: Utf8PathBuf,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },
    /// Scanning the dataset folder failed.
    #[error(transparent)]
    Scan(#[from] ScanError),
    /// Synthesising specification text failed.
    #[error("failed to synthesise specification: {0}")]
    Synthesis(#[from] SynthesisError),
    /// An external collaborator failed.
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
    /// Serialising a compiled descriptor failed.
    #[error("failed to serialise descriptor for {instance}: {source}")]
    SerialiseDescriptor {
        /// Instance the descriptor belongs to.
        instance: String,
        /// Encoder error.
        #[source]
        source: serde_json::Error,
    },
    /// Writing a run artifact failed.
    #[error("failed to write {path:?}: {source}")]
    WriteArtifact {
        /// Artifact path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Constructing the backend client failed.
    #[error("failed to build backend client: {0}")]
    BuildBackend(#[from] BackendBuildError),
    /// The import run was aborted.
    #[error("import failed: {0}")]
    Import(#[from] ImportError),
    /// The log subscriber could not be installed.
    #[error("failed to initialise logging: {message}")]
    Logging {
        /// Rendered cause.
        message: String,
    },
}
