//! Command-line interface for fsguard.
//!
//! Each subcommand is a thin layer over a library operation: it loads the global
//! configuration, calls into [`crate::utils::fs`] or [`crate::lock`], and
//! reports the result. Commands return the process exit status so that
//! "answer is no" outcomes (`access`, a busy `lock --nonblock`) are not errors.
//!
//! # Commands
//!
//! - `normalize`, `join`, `abspath` - path canonicalization
//! - `ensure-dir` - create or repair a directory with exact permissions
//! - `access` - permission queries
//! - `lock` - run a command under an advisory lock
//! - `read` - print a file with a chosen encoding
//!
//! # Exit Status
//!
//! - `0` success, or `access` answered yes
//! - `1` any error, or `access` answered no
//! - `75` `lock --nonblock` found the lock held
//! - otherwise the status of the command run by `lock`

mod access;
mod ensure;
mod lock;
mod paths;
mod read;


use crate::config::GlobalConfig;
use crate::utils::fs::access::select_process_strategy;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Runtime settings derived from the global flags.
///
/// Kept separate from [`Cli`] so tests can build one without parsing.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter directive; `None` defers to `RUST_LOG`.
    pub log_level: Option<String>,

    /// Suppress informational output.
    pub quiet: bool,

    /// Config file location overriding the default.
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the global tracing subscriber, writing to stderr.
    ///
    /// Uses `log_level` when set, otherwise `RUST_LOG`, otherwise `warn`. A
    /// subscriber that is already installed is left in place.
    pub fn init_tracing(&self) {
        let filter = match &self.log_level {
            Some(level) => EnvFilter::new(level),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Shared state handed to every subcommand.
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Loaded global configuration
    pub config: GlobalConfig,
    /// Suppress informational output
    pub quiet: bool,
}

/// Filesystem guard utilities: exact directory permissions, advisory locks,
/// path canonicalization, and access checks.
#[derive(Parser)]
#[command(
    name = "fsguard",
    about = "Permission-aware directories, advisory locks, and path utilities",
    version,
    author
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging on stderr.
    ///
    /// Equivalent to `RUST_LOG=debug`. Mutually exclusive with `--quiet`.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all output except errors and command results.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to a custom global configuration file.
    ///
    /// Overrides `$FSGUARD_CONFIG` and the platform default location.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a path lexically, without touching the filesystem.
    Normalize(paths::NormalizeCommand),

    /// Join path segments; an absolute segment discards earlier ones.
    Join(paths::JoinCommand),

    /// Print the absolute form of a path, following one level of symlink.
    Abspath(paths::AbspathCommand),

    /// Create or repair a directory with exact mode and ownership.
    ///
    /// See [`ensure::EnsureDirCommand`] for the permission rules.
    EnsureDir(ensure::EnsureDirCommand),

    /// Check whether this process may access a path.
    Access(access::AccessCommand),

    /// Run a command while holding an advisory lock on a path.
    Lock(lock::LockCommand),

    /// Print a file's contents.
    Read(read::ReadCommand),
}

impl Cli {
    /// Build a [`CliConfig`] from the parsed global flags.
    ///
    /// - `--verbose` selects `debug`
    /// - `--quiet` selects `error`
    /// - otherwise `RUST_LOG` applies
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            Some("error".to_string())
        } else {
            None
        };

        CliConfig {
            log_level,
            quiet: self.quiet,
            config_path: self.config.clone(),
        }
    }

    /// Execute the parsed command, returning the process exit status.
    ///
    /// # Errors
    ///
    /// The configuration cannot be loaded or the command failed.
    pub async fn execute(self) -> Result<i32> {
        let config = self.build_config();
        config.init_tracing();
        self.execute_with_config(config).await
    }

    /// Execute with an explicit [`CliConfig`], skipping tracing setup.
    ///
    /// # Errors
    ///
    /// The configuration cannot be loaded or the command failed.
    pub async fn execute_with_config(self, cli_config: CliConfig) -> Result<i32> {
        let config = GlobalConfig::load_with_optional(cli_config.config_path.clone()).await?;
        select_process_strategy(config.access_strategy.resolve());

        let ctx = CommandContext {
            config,
            quiet: cli_config.quiet,
        };

        match self.command {
            Commands::Normalize(cmd) => cmd.execute(),
            Commands::Join(cmd) => cmd.execute(),
            Commands::Abspath(cmd) => cmd.execute(),
            Commands::EnsureDir(cmd) => cmd.execute(&ctx),
            Commands::Access(cmd) => cmd.execute(),
            Commands::Lock(cmd) => cmd.execute(&ctx).await,
            Commands::Read(cmd) => cmd.execute(),
        }
    }
}
