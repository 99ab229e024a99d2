//! Renderer configuration.
//!
//! Configuration is read from a TOML file:
//!
//! ```toml
//! # Record a render tree and look every rendered definition up again
//! debug_render_tree = true
//! # Escape HTML in every component template
//! autoescape = false
//! ```
//!
//! # File Location
//!
//! The first of these that applies is used:
//!
//! 1. An explicit path (the CLI's `--config`)
//! 2. The `DEFCACHE_CONFIG` environment variable
//! 3. `defcache.toml` in the current directory, if it exists
//! 4. Built-in defaults
//!
//! An explicitly named file must exist. After loading,
//! `DEFCACHE_DEBUG_RENDER_TREE` (`1`/`true`/`0`/`false`) overrides
//! `debug_render_tree`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::DefCacheError;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "DEFCACHE_CONFIG";

/// Environment variable overriding `debug_render_tree`.
pub const DEBUG_RENDER_TREE_ENV: &str = "DEFCACHE_DEBUG_RENDER_TREE";

/// Config file looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "defcache.toml";

/// Settings for a [`Renderer`](crate::templating::Renderer).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RendererConfig {
    /// After each render, record a render-tree node by looking the rendered
    /// definition up again (a guaranteed cache hit).
    pub debug_render_tree: bool,

    /// Escape HTML in component templates.
    pub autoescape: bool,
}

impl RendererConfig {
    /// Load configuration following the lookup order described in the module
    /// docs, then apply environment overrides.
    pub async fn load(explicit: Option<&Path>) -> Result<Self> {
        let config = match Self::config_path(explicit) {
            Some(path) => Self::load_from(&path).await?,
            None => {
                let local = PathBuf::from(DEFAULT_CONFIG_FILE);
                if tokio::fs::try_exists(&local).await.unwrap_or(false) {
                    Self::load_from(&local).await?
                } else {
                    tracing::debug!("No config file found, using defaults");
                    Self::default()
                }
            }
        };

        Ok(config.with_overrides(|key| std::env::var(key).ok())?)
    }

    /// Read and parse one config file.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse config TOML.
    pub fn from_toml(content: &str) -> Result<Self, DefCacheError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply overrides read through `lookup` (normally the process environment).
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, DefCacheError> {
        if let Some(value) = lookup(DEBUG_RENDER_TREE_ENV) {
            self.debug_render_tree =
                parse_flag(&value).ok_or_else(|| DefCacheError::ConfigError {
                    message: format!(
                        "{DEBUG_RENDER_TREE_ENV} must be one of 1, 0, true, false (got '{value}')"
                    ),
                })?;
        }
        Ok(self)
    }

    fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
