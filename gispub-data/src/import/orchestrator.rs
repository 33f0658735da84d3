//! Sequencing of a whole import run.

use std::time::Duration;

use camino::Utf8PathBuf;
use gispub_core::{
    DatasetBatch, EntityResolver, RemoteEntity, SuffixEntityResolver, refresh_segment,
};
use thiserror::Error;

use super::pacing::Pacer;
use super::poller::{DEFAULT_POLL_DELAY, wait_until_ready};
use super::upload::{SubmissionOutcome, UploadedVector, upload_raster};
use crate::backend::{Backend, TransportError};
use crate::scan::list_staged_files;
use crate::staging::{StagedFile, StagedPartition, StagedVector};

/// Errors that abort an import run.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The entity catalog could not be fetched.
    #[error("failed to fetch entity catalog: {source}")]
    Catalog {
        /// Transport failure.
        #[source]
        source: TransportError,
    },
}

/// Outcome of a best-effort step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    /// The step succeeded.
    Done,
    /// The step did not apply.
    Skipped,
    /// The step failed; the run continued.
    Failed(String),
}

/// What happened to one staged file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// Both vector phases ran.
    Vector {
        /// Entity the file was mapped onto, if one matched.
        entity: Option<String>,
        /// Number of raw columns.
        columns: usize,
        /// Columns mapped to an entity property.
        resolved: usize,
        /// Second phase result.
        submission: StepStatus,
        /// Bounding-box refresh result.
        refresh: StepStatus,
    },
    /// The raster layer was uploaded.
    Raster,
    /// The file was abandoned.
    Failed {
        /// Rendered cause.
        message: String,
    },
}

/// Per-file record of an import run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    /// Collection the file belongs to.
    pub directory: Utf8PathBuf,
    /// Staged file name.
    pub file_name: String,
    /// Outcome.
    pub status: FileStatus,
}

/// Everything an import run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Files in processing order.
    pub files: Vec<FileReport>,
    /// Staged files that were not importable, by collection.
    pub skipped: Vec<(Utf8PathBuf, String)>,
    /// Collections whose staging directory could not be listed.
    pub unreadable: Vec<Utf8PathBuf>,
}

impl ImportReport {
    /// Number of files abandoned during the run.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.files
            .iter()
            .filter(|report| matches!(report.status, FileStatus::Failed { .. }))
            .count()
    }
}

/// Drives readiness, catalog fetch and per-file uploads for a set of
/// collections.
///
/// Files are processed one at a time: vectors of a collection first, then its
/// rasters. The pacer runs between consecutive files of the run.
///
/// # Examples
/// ```
/// use gispub_core::DatasetBatch;
/// use gispub_data::import::ImportOrchestrator;
/// use gispub_data::test_support::{CountingPacer, StubBackend, block_on_for_tests};
///
/// let backend = StubBackend::new(Vec::new());
/// let pacer = CountingPacer::default();
/// let orchestrator = ImportOrchestrator::new(&backend, &pacer);
/// let batches = [DatasetBatch::new("/nonexistent/collection", Vec::new())];
/// let report = block_on_for_tests(orchestrator.run(&batches))?;
/// assert!(report.files.is_empty());
/// # Ok::<(), gispub_data::import::ImportError>(())
/// ```
pub struct ImportOrchestrator<'a> {
    backend: &'a dyn Backend,
    pacer: &'a dyn Pacer,
    resolver: &'a dyn EntityResolver,
    poll_delay: Duration,
    debug: bool,
}

impl<'a> ImportOrchestrator<'a> {
    /// Orchestrate uploads to `backend`, pacing files with `pacer`.
    #[must_use]
    pub const fn new(backend: &'a dyn Backend, pacer: &'a dyn Pacer) -> Self {
        Self {
            backend,
            pacer,
            resolver: &SuffixEntityResolver,
            poll_delay: DEFAULT_POLL_DELAY,
            debug: false,
        }
    }

    /// Replace the entity resolution strategy.
    #[must_use]
    pub const fn with_resolver(mut self, resolver: &'a dyn EntityResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Set the delay between readiness checks.
    #[must_use]
    pub const fn with_poll_delay(mut self, delay: Duration) -> Self {
        self.poll_delay = delay;
        self
    }

    /// Log request payloads at debug level.
    #[must_use]
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Import the staged files of every batch.
    ///
    /// Per-file failures are logged and recorded in the report.
    ///
    /// # Errors
    /// Returns [`ImportError::Catalog`] when the entity catalog cannot be
    /// fetched.
    pub async fn run(&self, batches: &[DatasetBatch]) -> Result<ImportReport, ImportError> {
        log::info!("starting the import of geographic files");
        wait_until_ready(self.backend, self.poll_delay).await;
        let catalog = self
            .backend
            .fetch_entities()
            .await
            .map_err(|source| ImportError::Catalog { source })?;
        log::info!("fetched {} entities from {}", catalog.len(), self.backend.host());

        let mut run = Run {
            report: ImportReport::default(),
            started: false,
        };
        for batch in batches {
            let partition = match list_staged_files(&batch.directory) {
                Ok(names) => StagedPartition::classify(&batch.directory, &names, &batch.datasets),
                Err(err) => {
                    log::warn!("{err}");
                    run.report.unreadable.push(batch.directory.clone());
                    continue;
                }
            };
            for name in &partition.skipped {
                log::debug!("skipping {name} in {}", batch.directory);
                run.report.skipped.push((batch.directory.clone(), name.clone()));
            }
            if partition.is_empty() {
                log::info!("nothing to import from {}", batch.directory);
                continue;
            }
            log::info!(
                "importing {} file(s) from {}",
                partition.len(),
                batch.directory
            );
            for vector in &partition.vector {
                self.pace(&mut run).await;
                let status = self.import_vector(vector, &catalog).await;
                run.record(batch, &vector.file, status);
            }
            for raster in &partition.raster {
                self.pace(&mut run).await;
                let status = self.import_raster(raster).await;
                run.record(batch, raster, status);
            }
        }
        Ok(run.report)
    }

    async fn pace(&self, run: &mut Run) {
        if run.started {
            self.pacer.pause().await;
        }
        run.started = true;
    }

    async fn import_vector(&self, staged: &StagedVector, catalog: &[RemoteEntity]) -> FileStatus {
        let uploaded = match UploadedVector::upload(self.backend, staged).await {
            Ok(uploaded) => uploaded,
            Err(err) => {
                log::warn!("{err}");
                return FileStatus::Failed {
                    message: err.to_string(),
                };
            }
        };
        let entity = self.resolver.resolve(staged.file.stem(), catalog);
        let target = entity.map_or("no matching entity", |found| found.name.as_str());
        log::info!("uploading data from {} into {target}", staged.file.name);
        let submitted = uploaded.submit(self.backend, entity).await;
        if self.debug {
            let payload = serde_json::to_string(&submitted.submission)
                .unwrap_or_else(|err| format!("<unrenderable: {err}>"));
            log::debug!("import submission for {}: {payload}", staged.file.name);
        }
        let submission = match &submitted.outcome {
            SubmissionOutcome::Accepted => StepStatus::Done,
            SubmissionOutcome::Failed(err) => {
                log::warn!("import of {} was not accepted: {err}", staged.file.name);
                StepStatus::Failed(err.to_string())
            }
        };
        let refresh = self.refresh(entity).await;
        FileStatus::Vector {
            entity: entity.map(|found| found.name.clone()),
            columns: submitted.submission.ncolumns,
            resolved: submitted.submission.columns.resolved_count(),
            submission,
            refresh,
        }
    }

    async fn refresh(&self, entity: Option<&RemoteEntity>) -> StepStatus {
        let Some(found) = entity else {
            return StepStatus::Skipped;
        };
        let segment = refresh_segment(&found.name);
        if let Err(err) = self.backend.refresh_bbox(&segment).await {
            log::warn!("bounding box refresh for {} failed: {err}", found.name);
            return StepStatus::Failed(err.to_string());
        }
        StepStatus::Done
    }

    async fn import_raster(&self, file: &StagedFile) -> FileStatus {
        if let Err(err) = upload_raster(self.backend, file).await {
            log::warn!("{err}");
            return FileStatus::Failed {
                message: err.to_string(),
            };
        }
        log::info!("uploaded raster layer {}", file.name);
        FileStatus::Raster
    }
}

struct Run {
    report: ImportReport,
    started: bool,
}

impl Run {
    fn record(&mut self, batch: &DatasetBatch, file: &StagedFile, status: FileStatus) {
        self.report.files.push(FileReport {
            directory: batch.directory.clone(),
            file_name: file.name.clone(),
            status,
        });
    }
}
