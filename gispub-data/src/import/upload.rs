//! Vector and raster upload protocols.
//!
//! A vector file is imported in two phases. [`UploadedVector::upload`] sends
//! the raw file and yields the server's temporary handle; failure here aborts
//! the file. [`UploadedVector::submit`] consumes the handle, sends the column
//! mapping and always yields a [`SubmittedVector`], recording a transport
//! failure in its [`SubmissionOutcome`] instead of propagating it.

use std::io;

use camino::Utf8PathBuf;
use gispub_core::{ColumnMapping, RemoteEntity, naming::pascal_case};
use thiserror::Error;

use crate::backend::{Backend, ImportSubmission, TemporaryUpload, TransportError, UploadBody};
use crate::staging::{StagedFile, StagedVector};

/// Errors that abort the import of a single file.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The staged file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Staged file path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The backend rejected the upload.
    #[error("failed to upload {file}: {source}")]
    Transport {
        /// Staged file name.
        file: String,
        /// Transport failure.
        #[source]
        source: TransportError,
    },
}

fn open_staged(file: &StagedFile) -> Result<UploadBody, UploadError> {
    UploadBody::open(&file.path).map_err(|source| UploadError::Read {
        path: file.path.clone(),
        source,
    })
}

/// A vector file whose raw contents the backend has accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedVector {
    file: StagedFile,
    handle: TemporaryUpload,
}

impl UploadedVector {
    /// Run the first phase for `staged`.
    ///
    /// # Errors
    /// Returns [`UploadError`] when the file cannot be read or the backend
    /// rejects it.
    pub async fn upload<B: Backend + ?Sized>(
        backend: &B,
        staged: &StagedVector,
    ) -> Result<Self, UploadError> {
        let body = open_staged(&staged.file)?;
        let handle = backend
            .upload_temporary(&staged.file.name, staged.format, body)
            .await
            .map_err(|source| UploadError::Transport {
                file: staged.file.name.clone(),
                source,
            })?;
        Ok(Self {
            file: staged.file.clone(),
            handle,
        })
    }

    /// Staged file behind the upload.
    #[must_use]
    pub const fn file(&self) -> &StagedFile {
        &self.file
    }

    /// Temporary handle returned by the backend.
    #[must_use]
    pub const fn handle(&self) -> &TemporaryUpload {
        &self.handle
    }

    /// Run the second phase, mapping columns onto `entity`.
    ///
    /// Without an entity the submission names `PascalCase(file stem)` and
    /// leaves every column unresolved.
    pub async fn submit<B: Backend + ?Sized>(
        self,
        backend: &B,
        entity: Option<&RemoteEntity>,
    ) -> SubmittedVector {
        let columns = ColumnMapping::reconcile(&self.handle.values, entity);
        let entity_name = entity.map_or_else(
            || pascal_case(self.file.stem()),
            |found| found.name.clone(),
        );
        let submission = ImportSubmission::new(entity_name, &self.handle, columns);
        let outcome = backend
            .submit_import(&submission)
            .await
            .map_or_else(SubmissionOutcome::Failed, |()| SubmissionOutcome::Accepted);
        SubmittedVector {
            file: self.file,
            submission,
            outcome,
        }
    }
}

/// Result of the second vector phase.
#[derive(Debug)]
pub enum SubmissionOutcome {
    /// The backend accepted the column mapping.
    Accepted,
    /// The request failed; the failure was not propagated.
    Failed(TransportError),
}

impl SubmissionOutcome {
    /// Whether the backend accepted the submission.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// A vector file after both phases have run.
#[derive(Debug)]
pub struct SubmittedVector {
    /// Staged file that was imported.
    pub file: StagedFile,
    /// Body sent in the second phase.
    pub submission: ImportSubmission,
    /// How the second phase ended.
    pub outcome: SubmissionOutcome,
}

/// Upload a raster file as a map layer.
///
/// # Errors
/// Returns [`UploadError`] when the file cannot be read or the backend
/// rejects it.
pub async fn upload_raster<B: Backend + ?Sized>(
    backend: &B,
    file: &StagedFile,
) -> Result<(), UploadError> {
    let body = open_staged(file)?;
    backend
        .upload_raster(&file.name, body)
        .await
        .map_err(|source| UploadError::Transport {
            file: file.name.clone(),
            source,
        })
}
