//! Serialized access to a device handle.
//!
//! Vendor handles are not safe for concurrent use. [`LockedHandle`] owns a
//! handle and guarantees that at most one call (poll or command) touches it
//! at a time, in the order callers acquired the lock.

use std::sync::{Arc, Mutex, PoisonError};

use devicehub_domain::error::DeviceError;

use crate::executor::BlockingExecutor;

/// A device handle behind a per-device lock.
///
/// The async gate orders callers fairly; the inner mutex is held by the
/// blocking worker for the whole vendor call, so a call that outlives its
/// timeout still finishes before the next one starts.
pub struct LockedHandle<H> {
    handle: Arc<Mutex<Option<H>>>,
    gate: tokio::sync::Mutex<()>,
    executor: BlockingExecutor,
}

impl<H: Send + 'static> LockedHandle<H> {
    #[must_use]
    pub fn new(handle: H, executor: BlockingExecutor) -> Self {
        Self {
            handle: Arc::new(Mutex::new(Some(handle))),
            gate: tokio::sync::Mutex::new(()),
            executor,
        }
    }

    /// Run `f` against the handle on the blocking pool.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::Released`] once [`release`](Self::release) has
    /// run, or whatever the executor or `f` reports.
    pub async fn call<T, F>(&self, operation: &'static str, f: F) -> Result<T, DeviceError>
    where
        T: Send + 'static,
        F: FnOnce(&mut H) -> Result<T, DeviceError> + Send + 'static,
    {
        let _turn = self.gate.lock().await;
        let handle = Arc::clone(&self.handle);
        self.executor
            .run(operation, move || {
                let mut guard = handle.lock().unwrap_or_else(PoisonError::into_inner);
                match guard.as_mut() {
                    Some(h) => f(h),
                    None => Err(DeviceError::Released),
                }
            })
            .await
    }

    /// Drop the handle, waiting for any in-flight call to finish.
    ///
    /// Idempotent. Returns `true` when this call released the handle.
    pub async fn release(&self) -> bool {
        let _turn = self.gate.lock().await;
        let handle = Arc::clone(&self.handle);
        let released = tokio::task::spawn_blocking(move || {
            handle
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take()
                .is_some()
        })
        .await;
        released.unwrap_or(false)
    }

    #[must_use]
    pub fn is_released(&self) -> bool {
        self.handle
            .try_lock()
            .map(|guard| guard.is_none())
            .unwrap_or(false)
    }
}
