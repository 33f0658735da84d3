//! Import of staged collections into the backend.
//!
//! [`ImportOrchestrator`] waits for the backend, fetches the entity catalog
//! once and then uploads each collection's staged files one at a time.

mod orchestrator;
mod pacing;
mod poller;
mod upload;

pub use orchestrator::{
    FileReport, FileStatus, ImportError, ImportOrchestrator, ImportReport, StepStatus,
};
pub use pacing::{DEFAULT_PACING, FixedDelayPacer, Pacer};
pub use poller::{DEFAULT_POLL_DELAY, wait_until_ready};
pub use upload::{SubmissionOutcome, SubmittedVector, UploadError, UploadedVector, upload_raster};
