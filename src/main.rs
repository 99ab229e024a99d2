//! defcache CLI entry point
//!
//! Parses arguments, runs the command, and prints user-friendly errors.
//!
//! - `render` - render items through one renderer and report cache counter changes
//! - `check` - compile every registration in a registry file

use anyhow::Result;
use clap::Parser;
use defcache::cli;
use defcache::core::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
