//! The `lock` command.

use super::CommandContext;
use crate::constants::EXIT_LOCK_BUSY;
use crate::lock::scoped::{acquire_async, acquire_with_backoff};
use crate::lock::{FsLock, LockKind};
use anyhow::{Context, Result};
use clap::Args;
use std::os::unix::process::ExitStatusExt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Run a command while holding an advisory lock on a path.
///
/// The lock is released once the command exits, and the command's exit status
/// is passed through. A command killed by a signal yields `128 + signal`.
///
/// Waits for the lock by default. `--nonblock` gives up at once with exit
/// status 75; `--timeout-ms` (or `[lock] timeout_ms` in the config) polls
/// until the budget is spent and then fails.
#[derive(Args)]
pub struct LockCommand {
    /// File or directory to lock
    path: PathBuf,

    /// Take a shared (read) lock instead of an exclusive one
    #[arg(short, long)]
    shared: bool,

    /// Create the lock file if missing; its directory must exist
    #[arg(long)]
    create: bool,

    /// Fail immediately if the lock is held elsewhere
    #[arg(short, long, conflicts_with = "timeout_ms")]
    nonblock: bool,

    /// Poll for at most this many milliseconds
    #[arg(short, long)]
    timeout_ms: Option<u64>,

    /// Command to run, after `--`
    #[arg(last = true, required = true)]
    command: Vec<String>,
}

impl LockCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<i32> {
        let kind = if self.shared {
            LockKind::Shared
        } else {
            LockKind::Exclusive
        };

        let mut lock = FsLock::new(&self.path, self.create)?;
        let timeout = self.timeout_ms.map(Duration::from_millis).or_else(|| ctx.config.lock.timeout());

        let lock = if self.nonblock {
            if !lock.acquire(kind, false)? {
                if !ctx.quiet {
                    eprintln!("{} is locked by another process", self.path.display());
                }
                return Ok(EXIT_LOCK_BUSY);
            }
            lock
        } else if let Some(timeout) = timeout {
            acquire_with_backoff(lock, kind, timeout, ctx.config.lock.max_backoff()).await?
        } else {
            acquire_async(lock, kind).await?
        };

        let status = self.run().await;
        debug!(path = %lock.path().display(), "Releasing lock after command");
        drop(lock);
        status
    }

    async fn run(&self) -> Result<i32> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| anyhow::anyhow!("No command given"))?;

        let status = tokio::process::Command::new(program)
            .args(args)
            .status()
            .await
            .with_context(|| format!("Failed to run {program}"))?;

        Ok(status.code().unwrap_or_else(|| 128 + status.signal().unwrap_or(0)))
    }
}
