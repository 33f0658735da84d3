//! Staging, transport and import orchestration for gispub.
//!
//! Collections are directories of datasets whose extracted files sit in an
//! `output` staging directory. [`scan_collections`] finds them,
//! [`StagedPartition`] decides which staged files are importable and
//! [`import::ImportOrchestrator`] drives the upload protocol against a
//! [`Backend`].

pub mod backend;
pub mod import;
mod scan;
mod staging;
#[doc(hidden)]
pub mod test_support;

pub use backend::{
    Backend, BackendBuildError, DEFAULT_USER_AGENT, HttpBackend, HttpBackendConfig,
    ImportSubmission, Readiness, TemporaryUpload, TransportError, UploadBody,
};
pub use import::{DEFAULT_POLL_DELAY, ImportOrchestrator, wait_until_ready};
pub use scan::{STAGING_DIR, ScanError, list_staged_files, scan_collections, staging_dir};
pub use staging::{StagedFile, StagedKind, StagedPartition, StagedVector, VectorFormat};
