//! Scripted backend and pacing doubles used by unit and behaviour tests.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::future::Future;

use async_trait::async_trait;
use gispub_core::RemoteEntity;

use crate::backend::{
    Backend, ImportSubmission, Readiness, TemporaryUpload, TransportError, UploadBody,
};
use crate::import::Pacer;
use crate::staging::VectorFormat;

/// A request observed by [`StubBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    /// Liveness check.
    ReadinessCheck,
    /// Entity catalog fetch.
    FetchEntities,
    /// First vector phase.
    UploadTemporary {
        /// Uploaded file name.
        file_name: String,
        /// Declared container format.
        format: VectorFormat,
        /// Payload size in bytes.
        size: u64,
    },
    /// Second vector phase.
    SubmitImport(ImportSubmission),
    /// Raster layer upload.
    UploadRaster {
        /// Uploaded file name.
        file_name: String,
    },
    /// Bounding-box refresh.
    RefreshBbox {
        /// Entity path segment.
        segment: String,
    },
}

/// In-memory [`Backend`] with scripted readiness, catalog and failures.
///
/// # Examples
/// ```
/// use gispub_data::test_support::{BackendCall, StubBackend, block_on_for_tests};
/// use gispub_data::Backend;
///
/// let backend = StubBackend::new(Vec::new()).with_unready_checks(1);
/// assert!(!block_on_for_tests(backend.check_readiness()).is_ready());
/// assert!(block_on_for_tests(backend.check_readiness()).is_ready());
/// assert_eq!(backend.calls(), vec![BackendCall::ReadinessCheck, BackendCall::ReadinessCheck]);
/// ```
#[derive(Debug, Default)]
pub struct StubBackend {
    catalog: Vec<RemoteEntity>,
    unready_checks: Cell<usize>,
    catalog_fails: bool,
    uploads: HashMap<String, TemporaryUpload>,
    failing_uploads: HashSet<String>,
    failing_rasters: HashSet<String>,
    submissions_fail: bool,
    refreshes_fail: bool,
    calls: RefCell<Vec<BackendCall>>,
}

impl StubBackend {
    /// Serve `catalog` from the entity endpoint.
    #[must_use]
    pub fn new(catalog: Vec<RemoteEntity>) -> Self {
        Self {
            catalog,
            ..Self::default()
        }
    }

    /// Answer the first `count` checks as not ready.
    #[must_use]
    pub fn with_unready_checks(self, count: usize) -> Self {
        self.unready_checks.set(count);
        self
    }

    /// Fail the catalog fetch.
    #[must_use]
    pub const fn with_catalog_failure(mut self) -> Self {
        self.catalog_fails = true;
        self
    }

    /// Return `upload` when `file_name` is uploaded.
    ///
    /// Unregistered files receive a handle named after the file with no
    /// attribute values.
    #[must_use]
    pub fn with_upload(mut self, file_name: &str, upload: TemporaryUpload) -> Self {
        self.uploads.insert(file_name.to_owned(), upload);
        self
    }

    /// Fail the first phase for `file_name`.
    #[must_use]
    pub fn with_failing_upload(mut self, file_name: &str) -> Self {
        self.failing_uploads.insert(file_name.to_owned());
        self
    }

    /// Fail the raster upload for `file_name`.
    #[must_use]
    pub fn with_failing_raster(mut self, file_name: &str) -> Self {
        self.failing_rasters.insert(file_name.to_owned());
        self
    }

    /// Fail every second-phase submission.
    #[must_use]
    pub const fn with_failing_submissions(mut self) -> Self {
        self.submissions_fail = true;
        self
    }

    /// Fail every bounding-box refresh.
    #[must_use]
    pub const fn with_failing_refreshes(mut self) -> Self {
        self.refreshes_fail = true;
        self
    }

    /// Requests observed so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: BackendCall) {
        self.calls.borrow_mut().push(call);
    }

    fn failure(path: &str) -> TransportError {
        TransportError::Http {
            url: format!("http://stub{path}"),
            status: 500,
            message: "scripted failure".to_owned(),
        }
    }
}

#[async_trait(?Send)]
impl Backend for StubBackend {
    fn host(&self) -> &str {
        "http://stub"
    }

    async fn check_readiness(&self) -> Readiness {
        self.record(BackendCall::ReadinessCheck);
        let remaining = self.unready_checks.get();
        if remaining == 0 {
            return Readiness::Ready;
        }
        self.unready_checks.set(remaining - 1);
        Readiness::NotReady {
            reason: "502 Bad Gateway".to_owned(),
        }
    }

    async fn fetch_entities(&self) -> Result<Vec<RemoteEntity>, TransportError> {
        self.record(BackendCall::FetchEntities);
        if self.catalog_fails {
            return Err(Self::failure("/backend/api/entities"));
        }
        Ok(self.catalog.clone())
    }

    async fn upload_temporary(
        &self,
        file_name: &str,
        format: VectorFormat,
        body: UploadBody,
    ) -> Result<TemporaryUpload, TransportError> {
        self.record(BackendCall::UploadTemporary {
            file_name: file_name.to_owned(),
            format,
            size: body.size(),
        });
        if self.failing_uploads.contains(file_name) {
            return Err(Self::failure("/backend/api/import"));
        }
        Ok(self
            .uploads
            .get(file_name)
            .cloned()
            .unwrap_or_else(|| TemporaryUpload {
                temporary_file: format!("tmp-{file_name}"),
                values: Vec::new(),
            }))
    }

    async fn submit_import(&self, submission: &ImportSubmission) -> Result<(), TransportError> {
        self.record(BackendCall::SubmitImport(submission.clone()));
        if self.submissions_fail {
            return Err(Self::failure("/backend/api/import"));
        }
        Ok(())
    }

    async fn upload_raster(
        &self,
        file_name: &str,
        _body: UploadBody,
    ) -> Result<(), TransportError> {
        self.record(BackendCall::UploadRaster {
            file_name: file_name.to_owned(),
        });
        if self.failing_rasters.contains(file_name) {
            return Err(Self::failure("/backend/api/import/layer"));
        }
        Ok(())
    }

    async fn refresh_bbox(&self, segment: &str) -> Result<(), TransportError> {
        self.record(BackendCall::RefreshBbox {
            segment: segment.to_owned(),
        });
        if self.refreshes_fail {
            return Err(Self::failure("/backend/api/entities/geom/restart"));
        }
        Ok(())
    }
}

/// Pacer that returns immediately and counts its pauses.
#[derive(Debug, Default)]
pub struct CountingPacer {
    pauses: Cell<usize>,
}

impl CountingPacer {
    /// Number of pauses taken so far.
    #[must_use]
    pub fn pauses(&self) -> usize {
        self.pauses.get()
    }
}

#[async_trait(?Send)]
impl Pacer for CountingPacer {
    async fn pause(&self) {
        self.pauses.set(self.pauses.get() + 1);
    }
}

/// Drive `future` to completion on a fresh current-thread runtime.
///
/// # Panics
/// Panics when the runtime cannot be created.
#[expect(
    clippy::expect_used,
    reason = "test helpers abort when the runtime cannot start"
)]
pub fn block_on_for_tests<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("test runtime should build")
        .block_on(future)
}
