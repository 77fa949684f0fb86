//! The `access` command.

use crate::utils::fs::{AccessChecker, AccessMode, AccessStrategy};
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

/// Check whether this process may access a path.
///
/// Prints `yes` or `no`; the exit status is 0 for yes and 1 for no. Without
/// any of `-r`, `-w`, `-x` only existence is checked.
#[derive(Args)]
pub struct AccessCommand {
    /// Path to check
    path: PathBuf,

    /// Require read permission
    #[arg(short, long)]
    read: bool,

    /// Require write permission
    #[arg(short, long)]
    write: bool,

    /// Require execute (search) permission
    #[arg(short = 'x', long)]
    execute: bool,

    /// Compute the answer from file metadata instead of asking the kernel
    #[arg(long)]
    fallback: bool,
}

impl AccessCommand {
    pub fn execute(self) -> Result<i32> {
        let checker = if self.fallback {
            AccessChecker::new(AccessStrategy::Fallback)
        } else {
            AccessChecker::default()
        };

        let granted = checker.access(&self.path, self.mode());
        println!("{}", if granted { "yes" } else { "no" });
        Ok(if granted { 0 } else { 1 })
    }

    fn mode(&self) -> AccessMode {
        let mut mode = AccessMode::EXISTS;
        if self.read {
            mode |= AccessMode::READ;
        }
        if self.write {
            mode |= AccessMode::WRITE;
        }
        if self.execute {
            mode |= AccessMode::EXECUTE;
        }
        mode
    }
}
