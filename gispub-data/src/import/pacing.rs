//! Delays inserted between consecutive file uploads.

use std::time::Duration;

use async_trait::async_trait;

/// Pause taken between files when nothing else is configured.
pub const DEFAULT_PACING: Duration = Duration::from_secs(15);

/// Waits between consecutive uploads so the backend can settle.
#[async_trait(?Send)]
pub trait Pacer {
    /// Suspend until the next file may be uploaded.
    async fn pause(&self);
}

/// Sleeps for a fixed duration on every pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDelayPacer {
    delay: Duration,
}

impl FixedDelayPacer {
    /// Pace uploads `delay` apart.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Configured delay.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for FixedDelayPacer {
    fn default() -> Self {
        Self::new(DEFAULT_PACING)
    }
}

#[async_trait(?Send)]
impl Pacer for FixedDelayPacer {
    async fn pause(&self) {
        if !self.delay.is_zero() {
            log::debug!("pausing {}s before the next upload", self.delay.as_secs());
            tokio::time::sleep(self.delay).await;
        }
    }
}
