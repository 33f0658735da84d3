//! Error types shared by the synthesis pipeline and its collaborators.

use std::fmt;

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors raised while building specification text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthesisError {
    /// A header was emitted while another instance was still open.
    #[error("cannot open instance {requested} while {open} is still open")]
    InstanceAlreadyOpen {
        /// Instance awaiting its trailer.
        open: String,
        /// Instance the caller tried to open.
        requested: String,
    },
    /// Blocks or a trailer were emitted outside any instance.
    #[error("no GIS instance is open")]
    NoOpenInstance,
    /// The text was finished before the open instance was closed.
    #[error("instance {name} was never closed")]
    UnclosedInstance {
        /// Instance missing its trailer.
        name: String,
    },
    /// The instance name is not a bare identifier.
    #[error("instance name {name:?} must start with a letter and contain only letters, digits or underscores")]
    InvalidInstanceName {
        /// Rejected name.
        name: String,
    },
    /// A batch granularity string was not recognised.
    #[error("unknown batch granularity {value:?}; expected per-run or per-directory")]
    UnknownGranularity {
        /// Rejected value.
        value: String,
    },
}

/// External programs the pipeline delegates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collaborator {
    /// Parses specification text into a compiled descriptor.
    SpecCompiler,
    /// Reads dataset schemas from staged files.
    SchemaExtractor,
    /// Materialises the product from a compiled descriptor.
    ProductEngine,
    /// Ships generated output to its target.
    Deployer,
}

impl fmt::Display for Collaborator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SpecCompiler => "spec compiler",
            Self::SchemaExtractor => "schema extractor",
            Self::ProductEngine => "product engine",
            Self::Deployer => "deployer",
        })
    }
}

/// Errors surfaced by external collaborators.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// The collaborator ran but rejected its input.
    #[error("{collaborator} rejected its input: {message}")]
    Rejected {
        /// Which collaborator failed.
        collaborator: Collaborator,
        /// Diagnostic reported by the collaborator.
        message: String,
    },
    /// The collaborator could not be invoked or its files could not be read.
    #[error("failed to run {collaborator}: {source}")]
    Io {
        /// Which collaborator failed.
        collaborator: Collaborator,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The collaborator produced output that is not the expected JSON.
    #[error("{collaborator} produced unreadable output: {source}")]
    Decode {
        /// Which collaborator failed.
        collaborator: Collaborator,
        /// JSON decoding failure.
        #[source]
        source: serde_json::Error,
    },
    /// A file the collaborator relies on is missing.
    #[error("{collaborator} expected {path} to exist")]
    MissingInput {
        /// Which collaborator failed.
        collaborator: Collaborator,
        /// Missing path.
        path: Utf8PathBuf,
    },
}

impl CollaboratorError {
    /// Collaborator that raised the error.
    #[must_use]
    pub const fn collaborator(&self) -> Collaborator {
        match self {
            Self::Rejected { collaborator, .. }
            | Self::Io { collaborator, .. }
            | Self::Decode { collaborator, .. }
            | Self::MissingInput { collaborator, .. } => *collaborator,
        }
    }
}
