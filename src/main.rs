//! fsguard CLI entry point
//!
//! Parses arguments, runs the command, and turns its result into the process
//! exit status. Errors are rendered with a suggestion where one is known.

use anyhow::Result;
use clap::Parser;
use fsguard::cli;
use fsguard::core::error::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Execute the command
    match cli.execute().await {
        Ok(0) => Ok(()),
        Ok(code) => std::process::exit(code),
        Err(e) => {
            // Convert to user-friendly error with context and suggestions
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
