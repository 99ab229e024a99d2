//! Common fixtures for defcache integration tests

// Not every test file uses every fixture
#![allow(dead_code)]

use anyhow::{Context, Result};
use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Two helpers and two components, one with a backing class.
pub const SAMPLE_REGISTRY: &str = r#"
[components.component-one]
template = "One"

[components.component-two]
template = "Two"
class = { name = "ComponentTwo" }

[helpers.foo-bar]
output = "foo-bar helper!"

[helpers.baz-qux]
output = "baz-qux helper!"
"#;

/// Temporary project directory holding a registry and optional config file.
pub struct TestProject {
    dir: TempDir,
}

impl TestProject {
    pub fn new() -> Result<Self> {
        let dir = TempDir::new().context("Failed to create temp dir")?;
        Ok(Self {
            dir,
        })
    }

    /// Project with [`SAMPLE_REGISTRY`] written to `registry.toml`.
    pub fn with_sample_registry() -> Result<Self> {
        let project = Self::new()?;
        project.write_registry(SAMPLE_REGISTRY)?;
        Ok(project)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn registry_path(&self) -> PathBuf {
        self.path().join("registry.toml")
    }

    pub fn write_registry(&self, content: &str) -> Result<()> {
        fs::write(self.registry_path(), content).context("Failed to write registry")
    }

    pub fn write_config(&self, content: &str) -> Result<PathBuf> {
        let path = self.path().join("defcache.toml");
        fs::write(&path, content).context("Failed to write config")?;
        Ok(path)
    }

    /// `defcache` command running inside the project directory with a clean environment.
    pub fn defcache(&self) -> Command {
        let mut cmd = Command::cargo_bin("defcache").expect("defcache binary should be built");
        cmd.current_dir(self.path())
            .env_remove("RUST_LOG")
            .env_remove("DEFCACHE_CONFIG")
            .env_remove("DEFCACHE_DEBUG_RENDER_TREE")
            .env("NO_COLOR", "1");
        cmd
    }
}
