//! The `ensure-dir` command.

use super::CommandContext;
use crate::utils::fs::DirEnsurer;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

/// Create or repair a directory with exact mode and ownership.
///
/// Missing components are created with `--mode` regardless of the umask.
/// Existing directories only gain missing bits unless `--exact` is given.
/// Intermediate directories the walk had to open up are restored afterwards.
#[derive(Args)]
pub struct EnsureDirCommand {
    /// Directory to ensure
    path: PathBuf,

    /// Octal mode, e.g. 755 or 0o2775 (defaults to the configured mode)
    #[arg(short, long, value_parser = parse_mode)]
    mode: Option<u32>,

    /// Numeric owner to apply
    #[arg(long)]
    uid: Option<u32>,

    /// Numeric group to apply
    #[arg(long)]
    gid: Option<u32>,

    /// Set the mode exactly on an existing directory instead of adding bits
    #[arg(long)]
    exact: bool,
}

impl EnsureDirCommand {
    pub fn execute(self, ctx: &CommandContext) -> Result<i32> {
        let mode = self.mode.unwrap_or(ctx.config.default_dir_mode);
        let ensurer = DirEnsurer::new(mode)
            .with_ids(self.uid, self.gid)
            .minimal(ctx.config.minimal && !self.exact);

        let outcome = ensurer
            .try_ensure(&self.path)
            .with_context(|| format!("Failed to ensure directory {} with mode {mode:o}", self.path.display()))?;

        if !ctx.quiet {
            for created in &outcome.created {
                println!("{} {}", "created".green(), created.display());
            }
            if outcome.created.is_empty() {
                println!("{} {}", "ok".green(), self.path.display());
            }
        }
        Ok(0)
    }
}

/// Parse an octal mode with or without a `0o`/`0` prefix.
pub(crate) fn parse_mode(value: &str) -> Result<u32, String> {
    let digits = value.strip_prefix("0o").unwrap_or(value);
    let mode = u32::from_str_radix(digits, 8).map_err(|e| format!("invalid octal mode '{value}': {e}"))?;
    if mode > 0o7777 {
        return Err(format!("mode '{value}' has bits outside 0o7777"));
    }
    Ok(mode)
}
