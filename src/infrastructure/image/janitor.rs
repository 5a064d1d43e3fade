//! Periodic removal of stale disk cache files.

use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use tokio::fs;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Delay before the first sweep after start-up.
pub const INITIAL_DELAY: Duration = Duration::from_secs(10 * 60);

/// Time between sweeps.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(SECS_PER_DAY);

/// Outcome of a single sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Files deleted.
    pub removed: usize,
    /// Files that were stale but could not be deleted.
    pub failed: usize,
}

/// Deletes cache files whose modification time is older than the retention.
#[derive(Debug, Clone)]
pub struct DiskJanitor {
    cache_dir: PathBuf,
    retention: Duration,
}

impl DiskJanitor {
    /// Creates a janitor keeping files for `retention`.
    #[must_use]
    pub const fn new(cache_dir: PathBuf, retention: Duration) -> Self {
        Self {
            cache_dir,
            retention,
        }
    }

    /// Creates a janitor keeping files for `days` days, or `None` when disk
    /// caching is disabled (`days <= 0`).
    #[must_use]
    pub fn for_days(cache_dir: PathBuf, days: i64) -> Option<Self> {
        let days = u64::try_from(days).ok().filter(|d| *d > 0)?;
        Some(Self::new(
            cache_dir,
            Duration::from_secs(days.saturating_mul(SECS_PER_DAY)),
        ))
    }

    /// Runs one sweep over the cache directory. Deletion failures are logged
    /// and counted, never retried.
    pub async fn sweep(&self) -> SweepReport {
        let mut report = SweepReport::default();
        let Some(cutoff) = SystemTime::now().checked_sub(self.retention) else {
            return report;
        };

        let Ok(mut entries) = fs::read_dir(&self.cache_dir).await else {
            debug!(dir = %self.cache_dir.display(), "Cache directory missing, nothing to sweep");
            return report;
        };

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!(
                        dir = %self.cache_dir.display(),
                        error = %e,
                        "Failed to read cache directory entry, stopping sweep"
                    );
                    break;
                }
            };
            let path = entry.path();
            let Ok(meta) = entry.metadata().await else {
                continue;
            };
            if !meta.is_file() {
                continue;
            }
            let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            if modified >= cutoff {
                continue;
            }

            match fs::remove_file(&path).await {
                Ok(()) => report.removed += 1,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to remove expired cache file");
                    report.failed += 1;
                }
            }
        }

        if report.removed > 0 {
            debug!(
                removed = report.removed,
                "Removed cached image files as they have expired"
            );
        }
        report
    }

    /// Spawns the daily sweep loop.
    #[must_use]
    pub fn spawn(self) -> JoinHandle<()> {
        info!(
            dir = %self.cache_dir.display(),
            retention_secs = self.retention.as_secs(),
            "Scheduling disk cache sweep"
        );
        tokio::spawn(async move {
            let start = tokio::time::Instant::now() + INITIAL_DELAY;
            let mut ticker = tokio::time::interval_at(start, SWEEP_INTERVAL);
            loop {
                ticker.tick().await;
                self.sweep().await;
            }
        })
    }
}
