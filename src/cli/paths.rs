//! Path canonicalization commands.

use crate::utils::fs::{join_path, normalize_path, resolve_absolute_path};
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

/// Print the lexically normalized form of a path.
#[derive(Args)]
pub struct NormalizeCommand {
    /// Path to normalize
    path: PathBuf,
}

impl NormalizeCommand {
    pub fn execute(self) -> Result<i32> {
        println!("{}", normalize_path(&self.path).display());
        Ok(0)
    }
}

/// Print the segments joined with the OS separator.
#[derive(Args)]
pub struct JoinCommand {
    /// Segments to join, in order
    #[arg(required = true)]
    segments: Vec<PathBuf>,
}

impl JoinCommand {
    pub fn execute(self) -> Result<i32> {
        println!("{}", join_path(&self.segments).display());
        Ok(0)
    }
}

/// Print the absolute form of a path.
///
/// When the path is a symlink its target is printed instead, resolved one
/// level only.
#[derive(Args)]
pub struct AbspathCommand {
    /// Path to resolve
    path: PathBuf,
}

impl AbspathCommand {
    pub fn execute(self) -> Result<i32> {
        let resolved = resolve_absolute_path(&self.path)
            .with_context(|| format!("Failed to resolve {}", self.path.display()))?;
        println!("{}", resolved.display());
        Ok(0)
    }
}
