//! Off-loop execution of blocking vendor calls.
//!
//! Vendor client libraries talk to their devices synchronously. Every call
//! runs on tokio's blocking pool and is bounded by a timeout so a dead
//! device cannot stall the host.

use std::time::Duration;

use devicehub_domain::error::DeviceError;

/// Default upper bound for a single vendor call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs blocking closures on the blocking pool with a timeout.
#[derive(Debug, Clone, Copy)]
pub struct BlockingExecutor {
    timeout: Duration,
}

impl Default for BlockingExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_CALL_TIMEOUT)
    }
}

impl BlockingExecutor {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `f` on the blocking pool and wait at most the configured timeout.
    ///
    /// A timed-out call keeps running in the background; its result is
    /// discarded.
    ///
    /// # Errors
    ///
    /// Returns the closure's own error, [`DeviceError::Timeout`] when the
    /// deadline passes first, or [`DeviceError::Panicked`] when the closure
    /// panics.
    pub async fn run<T, F>(&self, operation: &'static str, f: F) -> Result<T, DeviceError>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, DeviceError> + Send + 'static,
    {
        let task = tokio::task::spawn_blocking(f);
        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => {
                tracing::error!(operation, error = %join_err, "vendor call panicked");
                Err(DeviceError::Panicked { operation })
            }
            Err(_) => {
                tracing::warn!(operation, timeout = ?self.timeout, "vendor call timed out");
                Err(DeviceError::Timeout {
                    operation,
                    after: self.timeout,
                })
            }
        }
    }
}
