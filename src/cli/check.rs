//! `check` command: compile every registration once.

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use crate::config::RendererConfig;
use crate::registry::RegistryFile;
use crate::templating::Renderer;

#[derive(Args, Debug)]
pub struct CheckCommand {
    /// Registry file with [components] and [helpers] tables
    #[arg(long, value_name = "FILE")]
    pub registry: PathBuf,
}

impl CheckCommand {
    pub async fn execute(self, config: RendererConfig) -> Result<()> {
        let registry = RegistryFile::load(&self.registry).await?.into_registry();
        let total = registry.len();
        let mut renderer = Renderer::new(registry, config);

        let failures = renderer.precompile_all();
        for failure in &failures {
            let cause = std::error::Error::source(&failure.error)
                .map_or_else(|| failure.error.to_string(), |e| e.to_string());
            println!("{} {} {}: {}", "✗".red(), failure.kind, failure.name, cause);
        }

        if !failures.is_empty() {
            bail!("{} of {} registrations failed to compile", failures.len(), total);
        }

        println!("{} {} registrations compiled", "✓".green(), total);
        Ok(())
    }
}
