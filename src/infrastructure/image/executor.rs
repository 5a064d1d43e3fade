//! Bounded pool running texture fetches in the background.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::domain::errors::FetchError;

/// Workers used when only official textures are fetched.
pub const DEFAULT_WORKERS: usize = 14;

/// Workers used when third-party capes are queried as well.
pub const THIRD_PARTY_WORKERS: usize = 21;

/// A cloneable handle to a result that may still be computing.
/// Every clone observes the same outcome.
pub type Pending<T> = Shared<BoxFuture<'static, Result<T, FetchError>>>;

/// Wraps an already known value as a completed handle.
#[must_use]
pub fn resolved<T>(value: T) -> Pending<T>
where
    T: Clone + Send + Sync + 'static,
{
    futures_util::future::ready(Ok(value)).boxed().shared()
}

/// Wraps `work` so it runs on whichever task awaits the handle, outside the
/// pool.
#[must_use]
pub fn deferred<T, F>(work: F) -> Pending<T>
where
    F: Future<Output = T> + Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    work.map(Ok::<T, FetchError>).boxed().shared()
}

/// Waits up to `timeout` for `handle`. Returns `default` on timeout or task
/// failure; the underlying work keeps running either way.
pub async fn await_with_default<T>(handle: Pending<T>, default: T, timeout: Duration) -> T
where
    T: Clone + Send + Sync + 'static,
{
    match tokio::time::timeout(timeout, handle).await {
        Ok(Ok(value)) => value,
        Ok(Err(e)) => {
            warn!(error = %e, "Fetch failed, using default");
            default
        }
        Err(_) => {
            debug!(timeout_ms = timeout.as_millis(), "Fetch timed out, using default");
            default
        }
    }
}

/// Runs fetch work on the tokio runtime with at most `workers` jobs active.
#[derive(Debug, Clone)]
pub struct FetchExecutor {
    permits: Arc<Semaphore>,
    workers: usize,
}

impl FetchExecutor {
    /// Creates an executor allowing `workers` concurrent jobs.
    #[must_use]
    pub fn new(workers: usize) -> Self {
        let workers = workers.max(1);
        Self {
            permits: Arc::new(Semaphore::new(workers)),
            workers,
        }
    }

    /// Sizes the pool for the configured provider set, unless overridden.
    #[must_use]
    pub fn for_config(allow_third_party_capes: bool, workers: Option<usize>) -> Self {
        let default = if allow_third_party_capes {
            THIRD_PARTY_WORKERS
        } else {
            DEFAULT_WORKERS
        };
        Self::new(workers.unwrap_or(default))
    }

    /// Schedules `work` and returns immediately. The work runs to completion
    /// even if every handle is dropped.
    pub fn spawn<F, T>(&self, work: F) -> Pending<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Clone + Send + Sync + 'static,
    {
        let permits = Arc::clone(&self.permits);
        let task = tokio::spawn(async move {
            let _permit = permits.acquire_owned().await;
            work.await
        });
        async move {
            task.await
                .map_err(|e| FetchError::Task(e.to_string()))
        }
        .boxed()
        .shared()
    }

    /// Configured pool size.
    #[must_use]
    pub const fn workers(&self) -> usize {
        self.workers
    }

    /// Jobs that could start right now without waiting.
    #[must_use]
    pub fn idle_workers(&self) -> usize {
        self.permits.available_permits()
    }
}

impl Default for FetchExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_WORKERS)
    }
}
