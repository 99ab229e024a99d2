//! TOML registry files.
//!
//! ```toml
//! [components.component-one]
//! template = "One"
//!
//! [components.component-two]
//! template = "Two {{ greeting }}"
//! class = { name = "ComponentTwo", defaults = { greeting = "hello" } }
//!
//! [helpers.foo-bar]
//! output = "foo-bar helper!"
//!
//! [helpers.shout]
//! output = "{0}!"
//! ```
//!
//! A file-defined helper returns its `output` with `{0}`, `{1}`, ... replaced by
//! its positional arguments.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

use super::{ComponentClass, Registry};
use crate::core::DefCacheError;

/// Parsed registry file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryFile {
    #[serde(default)]
    pub components: BTreeMap<String, ComponentEntry>,
    #[serde(default)]
    pub helpers: BTreeMap<String, HelperEntry>,
}

/// `[components.<name>]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentEntry {
    pub template: String,
    #[serde(default)]
    pub class: Option<ComponentClass>,
}

/// `[helpers.<name>]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HelperEntry {
    pub output: String,
}

impl RegistryFile {
    /// Read and parse a registry file.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read registry file: {}", path.display()))?;
        Ok(Self::parse(&content, &path.display().to_string())?)
    }

    /// Parse registry TOML. `file` is only used in error messages.
    pub fn parse(content: &str, file: &str) -> Result<Self, DefCacheError> {
        let parsed: Self = toml::from_str(content).map_err(|e| DefCacheError::RegistryParseError {
            file: file.to_string(),
            reason: e.message().to_string(),
        })?;
        tracing::debug!(
            "Parsed registry {}: {} components, {} helpers",
            file,
            parsed.components.len(),
            parsed.helpers.len()
        );
        Ok(parsed)
    }

    /// Register every entry into a fresh [`Registry`].
    #[must_use]
    pub fn into_registry(self) -> Registry {
        let mut registry = Registry::new();
        for (name, entry) in self.components {
            registry.register_component(name, entry.template, entry.class);
        }
        for (name, entry) in self.helpers {
            let output = entry.output;
            registry.register_helper(name, move |args| substitute_args(&output, args));
        }
        registry
    }
}

/// Replace `{N}` placeholders with positional arguments.
///
/// Strings are inserted without quotes; other values use their JSON form.
/// Placeholders without a matching argument are left untouched. Inserted
/// argument text is never scanned for placeholders.
fn substitute_args(output: &str, args: &[Value]) -> String {
    let mut result = String::with_capacity(output.len());
    let mut rest = output;

    while let Some(open) = rest.find('{') {
        result.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let digits = after.find(|c: char| !c.is_ascii_digit()).unwrap_or(after.len());

        let arg = if digits > 0 && after[digits..].starts_with('}') {
            after[..digits].parse::<usize>().ok().and_then(|i| args.get(i))
        } else {
            None
        };

        match arg {
            Some(Value::String(s)) => {
                result.push_str(s);
                rest = &after[digits + 1..];
            }
            Some(other) => {
                result.push_str(&other.to_string());
                rest = &after[digits + 1..];
            }
            None => {
                result.push('{');
                rest = after;
            }
        }
    }

    result.push_str(rest);
    result
}
