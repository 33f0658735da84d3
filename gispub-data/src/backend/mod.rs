//! Client surface of the import backend.
//!
//! [`Backend`] captures the six requests an import run issues. The HTTP
//! implementation lives in [`HttpBackend`]; tests script responses with
//! [`crate::test_support::StubBackend`].
#![forbid(unsafe_code)]

mod error;
mod http;

use std::io;

use async_trait::async_trait;
use camino::Utf8Path;
use gispub_core::{ColumnMapping, RemoteEntity};
use serde::{Deserialize, Serialize};
use tokio_util::io::ReaderStream;

use crate::staging::VectorFormat;

pub use error::{BackendBuildError, TransportError};
pub use http::{DEFAULT_USER_AGENT, HttpBackend, HttpBackendConfig};

/// Character encoding declared for every vector import.
pub const IMPORT_ENCODING: &str = "utf-8";
/// Import type declared when submitting a column mapping.
pub const GEOGRAPHIC_FILE_IMPORT: &str = "geographicFile";

/// Outcome of a liveness check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    /// The backend answered with anything but a gateway error.
    Ready,
    /// The backend is still starting.
    NotReady {
        /// Why the check failed.
        reason: String,
    },
}

impl Readiness {
    /// Whether the backend accepted the check.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// Staged file opened for a streamed multipart upload.
///
/// The payload is read in chunks while the request is sent, so archives
/// are never held in memory whole.
#[derive(Debug)]
pub struct UploadBody {
    file: tokio::fs::File,
    size: u64,
}

impl UploadBody {
    /// Open `path` and record its length.
    ///
    /// # Errors
    /// Returns the I/O error when the file cannot be opened or inspected.
    pub fn open(path: &Utf8Path) -> io::Result<Self> {
        let file = gispub_fs::open_for_streaming(path)?;
        let size = file.metadata()?.len();
        Ok(Self {
            file: tokio::fs::File::from_std(file),
            size,
        })
    }

    /// Payload length in bytes.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Chunked reader over the payload.
    #[must_use]
    pub fn into_stream(self) -> ReaderStream<tokio::fs::File> {
        ReaderStream::new(self.file)
    }
}

/// Server-issued reference to a freshly uploaded vector file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporaryUpload {
    /// Temporary file identifier to quote when submitting the import.
    pub temporary_file: String,
    /// Raw attribute names found in the file, in column order.
    #[serde(default)]
    pub values: Vec<String>,
}

/// Body of the second vector import phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSubmission {
    /// Entity property fed by each raw column.
    pub columns: ColumnMapping,
    /// Source encoding.
    pub encoding: String,
    /// Entity receiving the rows.
    pub entity_name: String,
    /// Temporary file returned by the first phase.
    pub file: String,
    /// Number of raw columns.
    pub ncolumns: usize,
    /// Import type tag.
    #[serde(rename = "type")]
    pub import_type: String,
}

impl ImportSubmission {
    /// Build the submission for `upload` targeting `entity_name`.
    #[must_use]
    pub fn new(
        entity_name: impl Into<String>,
        upload: &TemporaryUpload,
        columns: ColumnMapping,
    ) -> Self {
        Self {
            ncolumns: columns.len(),
            columns,
            encoding: IMPORT_ENCODING.to_owned(),
            entity_name: entity_name.into(),
            file: upload.temporary_file.clone(),
            import_type: GEOGRAPHIC_FILE_IMPORT.to_owned(),
        }
    }
}

/// Requests issued against the backend during an import run.
#[async_trait(?Send)]
pub trait Backend {
    /// Base URL of the backend host.
    fn host(&self) -> &str;
    /// Check liveness. Never fails; unreachable hosts are not ready.
    async fn check_readiness(&self) -> Readiness;
    /// Fetch the entity catalog.
    async fn fetch_entities(&self) -> Result<Vec<RemoteEntity>, TransportError>;
    /// Upload a vector file and receive its temporary handle.
    async fn upload_temporary(
        &self,
        file_name: &str,
        format: VectorFormat,
        body: UploadBody,
    ) -> Result<TemporaryUpload, TransportError>;
    /// Submit the column mapping for a temporary upload.
    async fn submit_import(&self, submission: &ImportSubmission) -> Result<(), TransportError>;
    /// Upload a raster file as a layer.
    async fn upload_raster(&self, file_name: &str, body: UploadBody) -> Result<(), TransportError>;
    /// Recompute the bounding box cached for the entity behind `segment`.
    async fn refresh_bbox(&self, segment: &str) -> Result<(), TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use gispub_core::{EntityProperty, RemoteEntity};
    use rstest::rstest;

    #[rstest]
    fn submission_uses_backend_field_names() {
        let entity = RemoteEntity::new(
            "app.model.Parcel",
            vec![EntityProperty::new("geometry", "MultiPolygon")],
        );
        let upload = TemporaryUpload {
            temporary_file: "tmp-123".to_owned(),
            values: vec!["the_geom".to_owned(), "misc".to_owned()],
        };
        let columns = ColumnMapping::reconcile(&upload.values, Some(&entity));
        let submission = ImportSubmission::new(&entity.name, &upload, columns);
        let json = serde_json::to_value(&submission).expect("submission should serialise");
        assert_eq!(
            json,
            serde_json::json!({
                "columns": [{"name": "geometry", "type": "MultiPolygon"}, null],
                "encoding": "utf-8",
                "entityName": "app.model.Parcel",
                "file": "tmp-123",
                "ncolumns": 2,
                "type": "geographicFile"
            })
        );
    }

    #[rstest]
    fn temporary_upload_tolerates_missing_values() {
        let upload: TemporaryUpload =
            serde_json::from_str(r#"{"temporaryFile": "t1"}"#).expect("decode");
        assert!(upload.values.is_empty());
    }
}
