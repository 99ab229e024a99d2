//! Compiled definitions.
//!
//! A [`Definition`] is what the cache stores: the expensive-to-build,
//! cheap-to-reuse artifact produced from a descriptor. Components hold a parsed
//! tera template; helpers hold their function.

use serde_json::Value;
use tera::{Context as TeraContext, Tera};

use crate::core::{DefCacheError, DefinitionKind};
use crate::registry::{ComponentClass, HelperFn};

/// A compiled component.
#[derive(Debug, Clone)]
pub struct ComponentDefinition {
    name: String,
    tera: Tera,
    class: Option<ComponentClass>,
}

impl ComponentDefinition {
    /// Wrap a tera instance that already holds a template named `name`.
    pub fn new(name: impl Into<String>, tera: Tera, class: Option<ComponentClass>) -> Self {
        Self {
            name: name.into(),
            tera,
            class,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn class(&self) -> Option<&ComponentClass> {
        self.class.as_ref()
    }

    /// Render with the class defaults overlaid by `context`.
    pub fn render(&self, context: &TeraContext) -> Result<String, DefCacheError> {
        let mut merged = TeraContext::new();
        if let Some(class) = &self.class {
            for (key, value) in &class.defaults {
                merged.insert(key.as_str(), value);
            }
        }
        merged.extend(context.clone());

        self.tera.render(&self.name, &merged).map_err(|e| DefCacheError::RenderFailed {
            kind: DefinitionKind::Component,
            name: self.name.clone(),
            reason: format_tera_error(&e),
        })
    }
}

/// A compiled helper.
#[derive(Debug, Clone)]
pub struct HelperDefinition {
    name: String,
    function: HelperFn,
}

impl HelperDefinition {
    pub fn new(name: impl Into<String>, function: HelperFn) -> Self {
        Self {
            name: name.into(),
            function,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the helper with positional arguments.
    #[must_use]
    pub fn invoke(&self, args: &[Value]) -> String {
        self.function.call(args)
    }
}

/// A compiled, renderer-consumable artifact.
#[derive(Debug, Clone)]
pub enum Definition {
    Component(ComponentDefinition),
    Helper(HelperDefinition),
}

impl Definition {
    #[must_use]
    pub const fn kind(&self) -> DefinitionKind {
        match self {
            Self::Component(_) => DefinitionKind::Component,
            Self::Helper(_) => DefinitionKind::Helper,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Component(c) => c.name(),
            Self::Helper(h) => h.name(),
        }
    }

    #[must_use]
    pub const fn as_component(&self) -> Option<&ComponentDefinition> {
        match self {
            Self::Component(c) => Some(c),
            Self::Helper(_) => None,
        }
    }

    #[must_use]
    pub const fn as_helper(&self) -> Option<&HelperDefinition> {
        match self {
            Self::Helper(h) => Some(h),
            Self::Component(_) => None,
        }
    }
}

/// Flatten a tera error chain into one line.
///
/// Tera reports the useful part (line, column, expected token) in nested
/// sources; the top-level message only names the template.
pub(crate) fn format_tera_error(error: &tera::Error) -> String {
    use std::error::Error;

    let mut messages = vec![error.to_string()];
    let mut current: Option<&dyn Error> = error.source();
    while let Some(err) = current {
        messages.push(err.to_string());
        current = err.source();
    }

    let messages: Vec<String> = messages
        .into_iter()
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .collect();
    messages.join(" → ")
}
