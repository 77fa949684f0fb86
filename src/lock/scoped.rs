//! Driving [`FsLock`] from async code.
//!
//! A blocking `flock` parks its thread, so every lock call here runs on
//! `spawn_blocking` and never on a runtime worker. The handle is moved into the
//! blocking task and handed back once the call returns.

use super::{FsLock, LockKind};
use crate::constants::{MAX_BACKOFF_DELAY_MS, STARTING_BACKOFF_DELAY_MS};
use crate::core::LockError;
use std::time::{Duration, Instant};
use tokio_retry::strategy::ExponentialBackoff;
use tracing::debug;

/// Acquire `kind` on `lock`, waiting as long as it takes.
///
/// # Errors
///
/// Whatever the blocking acquire reports.
pub async fn acquire_async(lock: FsLock, kind: LockKind) -> Result<FsLock, LockError> {
    let (lock, result) = attempt(lock, kind, true).await?;
    result.map(|_| lock)
}

/// Shorthand for [`acquire_async`] with [`LockKind::Exclusive`].
///
/// # Errors
///
/// Whatever the blocking acquire reports.
pub async fn acquire_write_async(lock: FsLock) -> Result<FsLock, LockError> {
    acquire_async(lock, LockKind::Exclusive).await
}

/// Shorthand for [`acquire_async`] with [`LockKind::Shared`].
///
/// # Errors
///
/// Whatever the blocking acquire reports.
pub async fn acquire_read_async(lock: FsLock) -> Result<FsLock, LockError> {
    acquire_async(lock, LockKind::Shared).await
}

/// Poll for `kind` with non-blocking attempts until `timeout` runs out.
///
/// Delays grow exponentially from 10ms up to 500ms.
///
/// # Errors
///
/// [`LockError::Timeout`] when the lock stays busy, or whatever an attempt
/// reports.
pub async fn acquire_with_timeout(lock: FsLock, kind: LockKind, timeout: Duration) -> Result<FsLock, LockError> {
    acquire_with_backoff(lock, kind, timeout, Duration::from_millis(MAX_BACKOFF_DELAY_MS)).await
}

/// [`acquire_with_timeout`] with an explicit cap on the delay between attempts.
///
/// # Errors
///
/// As for [`acquire_with_timeout`].
pub async fn acquire_with_backoff(
    mut lock: FsLock,
    kind: LockKind,
    timeout: Duration,
    max_delay: Duration,
) -> Result<FsLock, LockError> {
    debug!(path = %lock.path().display(), ?kind, ?timeout, "Waiting for lock");

    let start = Instant::now();
    let backoff = ExponentialBackoff::from_millis(STARTING_BACKOFF_DELAY_MS).max_delay(max_delay);

    for delay in backoff {
        let (returned, result) = attempt(lock, kind, false).await?;
        lock = returned;

        if result? {
            debug!(
                path = %lock.path().display(),
                wait_ms = start.elapsed().as_millis(),
                "Lock acquired after polling"
            );
            return Ok(lock);
        }

        let remaining = timeout.saturating_sub(start.elapsed());
        if remaining.is_zero() {
            break;
        }
        tokio::time::sleep(delay.min(remaining)).await;
    }

    Err(LockError::Timeout {
        path: lock.path().to_path_buf(),
        timeout,
    })
}

async fn attempt(
    mut lock: FsLock,
    kind: LockKind,
    blocking: bool,
) -> Result<(FsLock, Result<bool, LockError>), LockError> {
    let path = lock.path().to_path_buf();
    tokio::task::spawn_blocking(move || {
        let result = lock.acquire(kind, blocking);
        (lock, result)
    })
    .await
    .map_err(|e| LockError::GenericFailed {
        path,
        source: std::io::Error::other(e),
    })
}
