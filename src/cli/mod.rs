//! Command-line interface for defcache.
//!
//! The CLI loads a registry file and drives a renderer over it, which makes the
//! cache's behavior visible from the shell.
//!
//! # Commands
//!
//! - `render` - render a sequence of components/helpers with one renderer and
//!   print the counter changes caused by each step
//! - `check` - compile every registration once and report failures
//!
//! # Example
//!
//! ```bash
//! defcache render --registry registry.toml helper:foo-bar helper:baz-qux helper:foo-bar
//! defcache --verbose check --registry registry.toml
//! ```
//!
//! # Global Options
//!
//! - `--verbose` - debug logging
//! - `--quiet` - errors only
//! - `--config` - renderer config file (see [`crate::config`])

mod check;
mod render;

pub use check::CheckCommand;
pub use render::{OutputFormat, RenderCommand, RenderItem};

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::RendererConfig;

/// Settings derived from the global flags.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Default log filter when `RUST_LOG` is not set
    pub log_level: String,
    /// Explicit renderer config file
    pub config_path: Option<PathBuf>,
}

#[derive(Parser)]
#[command(
    name = "defcache",
    about = "Inspect the definition cache behind component and helper rendering",
    version,
    long_about = "defcache renders registered components and helpers through an identity-keyed definition cache and reports cache hits, misses and definition counts."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to a renderer config file
    #[arg(short, long, global = true, env = "DEFCACHE_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render components and helpers in order, printing counter changes per step
    Render(RenderCommand),
    /// Compile every registration once and report failures
    Check(CheckCommand),
}

impl Cli {
    /// Execute the parsed command.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Translate global flags into a [`CliConfig`].
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        };

        CliConfig {
            log_level: log_level.to_string(),
            config_path: self.config.clone(),
        }
    }

    /// Execute with an explicit configuration.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        init_logging(&config.log_level);

        let renderer_config = RendererConfig::load(config.config_path.as_deref()).await?;
        tracing::debug!("Renderer config: {:?}", renderer_config);

        match self.command {
            Commands::Render(cmd) => cmd.execute(renderer_config).await,
            Commands::Check(cmd) => cmd.execute(renderer_config).await,
        }
    }
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `default_level`.
fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
