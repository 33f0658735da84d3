//! Blocking wait for the backend to accept requests.

use std::time::Duration;

use crate::backend::{Backend, Readiness};

/// Delay between liveness checks when nothing else is configured.
pub const DEFAULT_POLL_DELAY: Duration = Duration::from_secs(5);

/// Check `backend` until it is ready, sleeping `delay` between attempts.
///
/// There is no retry bound: a backend that never comes up keeps the caller
/// waiting. Returns the number of checks issued.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use gispub_data::test_support::{StubBackend, block_on_for_tests};
/// use gispub_data::wait_until_ready;
///
/// let backend = StubBackend::new(Vec::new()).with_unready_checks(2);
/// let attempts = block_on_for_tests(wait_until_ready(&backend, Duration::ZERO));
/// assert_eq!(attempts, 3);
/// ```
pub async fn wait_until_ready<B: Backend + ?Sized>(backend: &B, delay: Duration) -> usize {
    let mut attempts = 0;
    loop {
        attempts += 1;
        match backend.check_readiness().await {
            Readiness::Ready => {
                log::debug!("backend at {} ready after {attempts} check(s)", backend.host());
                return attempts;
            }
            Readiness::NotReady { reason } => {
                log::info!("server not available ({reason}); retrying connection");
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{BackendCall, StubBackend, block_on_for_tests};
    use rstest::rstest;

    #[rstest]
    #[case(0, 1)]
    #[case(1, 2)]
    #[case(4, 5)]
    fn checks_until_ready(#[case] unready: usize, #[case] expected: usize) {
        let backend = StubBackend::new(Vec::new()).with_unready_checks(unready);
        let attempts = block_on_for_tests(wait_until_ready(&backend, Duration::ZERO));
        assert_eq!(attempts, expected);
        assert!(backend.calls().iter().all(|call| *call == BackendCall::ReadinessCheck));
    }
}
