//! Render driver.
//!
//! [`Renderer`] owns one render context: a registry, a definition cache and a
//! compiler. Every render resolves a name to a descriptor, asks the cache for
//! its definition and produces output. Switching between names and back only
//! compiles each registration once.

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tera::Context as TeraContext;

use super::compiler::DefinitionCompiler;
use crate::cache::{Definition, DefinitionCache};
use crate::config::RendererConfig;
use crate::core::{DefCacheError, DefinitionKind};
use crate::registry::{Descriptor, Registry};

/// One entry of the debug render tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderNode {
    pub kind: DefinitionKind,
    pub name: String,
    /// Backing class name, for components that have one
    pub class: Option<String>,
}

/// A registration that failed to compile during [`Renderer::precompile_all`].
#[derive(Debug)]
pub struct PrecompileFailure {
    pub kind: DefinitionKind,
    pub name: String,
    pub error: DefCacheError,
}

/// Render context with a definition cache.
///
/// # Examples
///
/// ```rust
/// use defcache::config::RendererConfig;
/// use defcache::core::DefinitionKind;
/// use defcache::registry::Registry;
/// use defcache::templating::Renderer;
///
/// let mut registry = Registry::new();
/// registry.register_helper("foo-bar", |_| "foo-bar helper!".to_string());
///
/// let mut renderer = Renderer::new(registry, RendererConfig::default());
/// let output = renderer.render(DefinitionKind::Helper, "foo-bar").unwrap();
/// assert_eq!(output, "foo-bar helper!");
/// ```
#[derive(Debug)]
pub struct Renderer {
    registry: Registry,
    cache: DefinitionCache,
    compiler: DefinitionCompiler,
    config: RendererConfig,
    render_tree: Vec<RenderNode>,
}

impl Renderer {
    /// Renderer whose cache reports to the process-wide counters.
    #[must_use]
    pub fn new(registry: Registry, config: RendererConfig) -> Self {
        Self::with_cache(registry, config, DefinitionCache::new())
    }

    /// Renderer using a caller-provided cache.
    #[must_use]
    pub fn with_cache(registry: Registry, config: RendererConfig, cache: DefinitionCache) -> Self {
        let compiler = DefinitionCompiler::new(config.autoescape);
        Self {
            registry,
            cache,
            compiler,
            config,
            render_tree: Vec::new(),
        }
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Mutable registry access, for registering or replacing entries between renders.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    #[must_use]
    pub fn cache(&self) -> &DefinitionCache {
        &self.cache
    }

    #[must_use]
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Nodes recorded so far when `debug_render_tree` is on.
    #[must_use]
    pub fn render_tree(&self) -> &[RenderNode] {
        &self.render_tree
    }

    /// Resolve `(kind, name)` and return its definition, compiling on first use.
    pub fn definition(
        &mut self,
        kind: DefinitionKind,
        name: &str,
    ) -> Result<Arc<Definition>, DefCacheError> {
        let descriptor = self.registry.resolve(kind, name)?;
        self.lookup(kind, &descriptor)
    }

    /// Render a component with the given template values.
    pub fn render_component(
        &mut self,
        name: &str,
        context: &TeraContext,
    ) -> Result<String, DefCacheError> {
        let descriptor = self.registry.resolve(DefinitionKind::Component, name)?;
        let definition = self.lookup(DefinitionKind::Component, &descriptor)?;
        let component = definition.as_component().ok_or_else(|| DefCacheError::InvalidDescriptor {
            name: name.to_string(),
            expected: DefinitionKind::Component,
            actual: definition.kind(),
        })?;
        let output = component.render(context)?;
        self.capture_render_node(DefinitionKind::Component, &descriptor)?;
        Ok(output)
    }

    /// Invoke a helper with positional arguments.
    pub fn render_helper(&mut self, name: &str, args: &[Value]) -> Result<String, DefCacheError> {
        let descriptor = self.registry.resolve(DefinitionKind::Helper, name)?;
        let definition = self.lookup(DefinitionKind::Helper, &descriptor)?;
        let helper = definition.as_helper().ok_or_else(|| DefCacheError::InvalidDescriptor {
            name: name.to_string(),
            expected: DefinitionKind::Helper,
            actual: definition.kind(),
        })?;
        let output = helper.invoke(args);
        self.capture_render_node(DefinitionKind::Helper, &descriptor)?;
        Ok(output)
    }

    /// Render a component with no values, or a helper with no arguments.
    pub fn render(&mut self, kind: DefinitionKind, name: &str) -> Result<String, DefCacheError> {
        match kind {
            DefinitionKind::Component => self.render_component(name, &TeraContext::new()),
            DefinitionKind::Helper => self.render_helper(name, &[]),
        }
    }

    /// Compile every registration once. Returns the ones that failed.
    pub fn precompile_all(&mut self) -> Vec<PrecompileFailure> {
        let descriptors: Vec<Descriptor> = self.registry.descriptors().cloned().collect();
        let mut failures = Vec::new();

        for descriptor in descriptors {
            let kind = descriptor.kind();
            if let Err(error) = self.lookup(kind, &descriptor) {
                failures.push(PrecompileFailure {
                    kind,
                    name: descriptor.name().to_string(),
                    error,
                });
            }
        }

        tracing::info!(
            "Precompiled {} registrations, {} failed",
            self.registry.len(),
            failures.len()
        );
        failures
    }

    fn lookup(
        &mut self,
        kind: DefinitionKind,
        descriptor: &Descriptor,
    ) -> Result<Arc<Definition>, DefCacheError> {
        let compiler = &self.compiler;
        self.cache.get_or_create(kind, descriptor, |d| compiler.compile(d))
    }

    /// Record what was just rendered. Goes through the cache, so it is always a hit.
    fn capture_render_node(
        &mut self,
        kind: DefinitionKind,
        descriptor: &Descriptor,
    ) -> Result<(), DefCacheError> {
        if !self.config.debug_render_tree {
            return Ok(());
        }

        let definition = self.lookup(kind, descriptor)?;
        let class = definition
            .as_component()
            .and_then(|c| c.class())
            .map(|class| class.name.clone());
        self.render_tree.push(RenderNode {
            kind,
            name: definition.name().to_string(),
            class,
        });
        Ok(())
    }
}
