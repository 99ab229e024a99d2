//! `render` command.
//!
//! Renders each item in order with a single renderer, so later items hit the
//! definitions compiled by earlier ones. After every step the counter changes
//! caused by that step are printed.
//!
//! ```bash
//! $ defcache render --registry registry.toml helper:foo-bar helper:baz-qux helper:foo-bar
//! helper:foo-bar => foo-bar helper!  {cacheMiss: +1, helperDefinitionCount: +1}
//! helper:baz-qux => baz-qux helper!  {cacheMiss: +1, helperDefinitionCount: +1}
//! helper:foo-bar => foo-bar helper!  {cacheHit: +1}
//! ```

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::config::RendererConfig;
use crate::core::{DefCacheError, DefinitionKind};
use crate::registry::RegistryFile;
use crate::telemetry::{Counter, CounterDiff, CounterSnapshot};
use crate::templating::{RenderNode, Renderer};

/// Output format for `render`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One line per step
    #[default]
    Text,
    /// A single JSON document
    Json,
}

/// `kind:name`, or a bare `name` for a component.
///
/// Only the first `:` separates the kind, so a component whose name contains
/// a colon is written with its kind, e.g. `component:ns:card`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderItem {
    pub kind: DefinitionKind,
    pub name: String,
}

impl std::str::FromStr for RenderItem {
    type Err = DefCacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, name) = match s.split_once(':') {
            Some((kind, name)) => (kind.parse::<DefinitionKind>()?, name),
            None => (DefinitionKind::Component, s),
        };
        Ok(Self {
            kind,
            name: name.to_string(),
        })
    }
}

impl fmt::Display for RenderItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.name)
    }
}

#[derive(Args, Debug)]
pub struct RenderCommand {
    /// Registry file with [components] and [helpers] tables
    #[arg(long, value_name = "FILE")]
    pub registry: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Items to render, e.g. `component:card` or `helper:foo-bar`.
    /// Names containing `:` need the kind prefix (`component:ns:card`)
    #[arg(required = true, value_name = "ITEM")]
    pub items: Vec<RenderItem>,
}

#[derive(Debug, Serialize)]
struct RenderStep<'a> {
    kind: DefinitionKind,
    name: &'a str,
    output: String,
    changes: CounterDiff,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RenderReport<'a> {
    steps: Vec<RenderStep<'a>>,
    totals: CounterSnapshot,
    render_tree: &'a [RenderNode],
}

impl RenderCommand {
    pub async fn execute(self, config: RendererConfig) -> Result<()> {
        let registry = RegistryFile::load(&self.registry).await?.into_registry();
        let mut renderer = Renderer::new(registry, config);

        let start = renderer.cache().counters().snapshot();
        let mut last = start;
        let mut steps = Vec::with_capacity(self.items.len());

        for item in &self.items {
            let output = renderer
                .render(item.kind, &item.name)
                .with_context(|| format!("Failed to render {item}"))?;

            let current = renderer.cache().counters().snapshot();
            let changes = current.diff(&last);
            last = current;

            if self.format == OutputFormat::Text {
                println!("{} => {}  {}", item.to_string().bold(), output, changes);
            }
            steps.push(RenderStep {
                kind: item.kind,
                name: &item.name,
                output,
                changes,
            });
        }

        let totals = last.diff(&start);
        match self.format {
            OutputFormat::Text => {
                println!(
                    "{} {} definitions cached, {} hits, {} misses ({:.1}% hit rate)",
                    "summary:".green(),
                    renderer.cache().len(),
                    totals.get(Counter::CacheHit),
                    totals.get(Counter::CacheMiss),
                    run_hit_rate(&totals),
                );
                if renderer.config().debug_render_tree {
                    println!("{}", "render tree:".green());
                    for node in renderer.render_tree() {
                        match &node.class {
                            Some(class) => println!("  {} {} ({})", node.kind, node.name, class),
                            None => println!("  {} {}", node.kind, node.name),
                        }
                    }
                }
            }
            OutputFormat::Json => {
                let report = RenderReport {
                    steps,
                    totals: last,
                    render_tree: renderer.render_tree(),
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
        }

        Ok(())
    }
}

/// Hit rate of the lookups made during this run.
fn run_hit_rate(totals: &CounterDiff) -> f64 {
    let run = CounterSnapshot {
        cache_hit: u64::try_from(totals.get(Counter::CacheHit)).unwrap_or(0),
        cache_miss: u64::try_from(totals.get(Counter::CacheMiss)).unwrap_or(0),
        ..CounterSnapshot::default()
    };
    run.hit_rate()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_render_item() {
        let item: RenderItem = "helper:foo-bar".parse().unwrap();
        assert_eq!(item.kind, DefinitionKind::Helper);
        assert_eq!(item.name, "foo-bar");

        let item: RenderItem = "component-one".parse().unwrap();
        assert_eq!(item.kind, DefinitionKind::Component);
        assert_eq!(item.to_string(), "component:component-one");
    }

    #[test]
    fn test_parse_render_item_name_with_colon() {
        let item: RenderItem = "component:ns:card".parse().unwrap();
        assert_eq!(item.kind, DefinitionKind::Component);
        assert_eq!(item.name, "ns:card");
        assert_eq!(item.to_string(), "component:ns:card");

        let item: RenderItem = "helper:ns:fmt".parse().unwrap();
        assert_eq!(item.kind, DefinitionKind::Helper);
        assert_eq!(item.name, "ns:fmt");

        let err = "ns:card".parse::<RenderItem>().unwrap_err();
        assert!(matches!(err, DefCacheError::UnknownKind { ref kind } if kind == "ns"));
    }

    #[test]
    fn test_run_hit_rate() {
        let totals = CounterDiff::from_expected([(Counter::CacheHit, 2), (Counter::CacheMiss, 2)]);
        assert_eq!(run_hit_rate(&totals), 50.0);
        assert_eq!(run_hit_rate(&CounterDiff::default()), 0.0);
    }

    #[test]
    fn test_parse_render_item_unknown_kind() {
        let err = "modifier:on-click".parse::<RenderItem>().unwrap_err();
        assert!(matches!(err, DefCacheError::UnknownKind { .. }));
    }
}
