//! Registry of component and helper registrations.
//!
//! The registry maps names to [`Descriptor`]s. Every call to
//! [`Registry::register_component`] or [`Registry::register_helper`] mints a new
//! descriptor, so re-registering a name gives it a new identity and the next
//! render compiles a fresh definition.
//!
//! Registrations can also be loaded from a TOML file, see [`RegistryFile`].
//!
//! # Examples
//!
//! ```rust
//! use defcache::core::DefinitionKind;
//! use defcache::registry::Registry;
//!
//! let mut registry = Registry::new();
//! registry.register_helper("foo-bar", |_| "foo-bar helper!".to_string());
//! registry.register_component("component-one", "One", None);
//!
//! let helper = registry.resolve(DefinitionKind::Helper, "foo-bar").unwrap();
//! assert_eq!(helper.name(), "foo-bar");
//!
//! // Names live in separate namespaces per kind
//! assert!(registry.resolve(DefinitionKind::Component, "foo-bar").is_err());
//! ```

pub mod descriptor;
pub mod file;

pub use descriptor::{ComponentClass, ComponentSource, Descriptor, DescriptorPayload, HelperFn};
pub use file::RegistryFile;

use serde_json::Value;
use std::collections::BTreeMap;
use strsim::levenshtein;

use crate::core::{DefCacheError, DefinitionKind};

/// Maximum Levenshtein distance, as a percentage of the name length, for a
/// registered name to be suggested.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// Named registrations, one namespace per [`DefinitionKind`].
#[derive(Debug, Default, Clone)]
pub struct Registry {
    components: BTreeMap<String, Descriptor>,
    helpers: BTreeMap<String, Descriptor>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component and return its new descriptor.
    pub fn register_component(
        &mut self,
        name: impl Into<String>,
        template: impl Into<String>,
        class: Option<ComponentClass>,
    ) -> Descriptor {
        let descriptor = Descriptor::component(name, template, class);
        self.insert(descriptor.clone());
        descriptor
    }

    /// Register a helper and return its new descriptor.
    pub fn register_helper(
        &mut self,
        name: impl Into<String>,
        f: impl Fn(&[Value]) -> String + Send + Sync + 'static,
    ) -> Descriptor {
        let descriptor = Descriptor::helper(name, f);
        self.insert(descriptor.clone());
        descriptor
    }

    /// Register an existing descriptor under its own name and kind.
    ///
    /// Returns the descriptor it replaced, if any.
    pub fn insert(&mut self, descriptor: Descriptor) -> Option<Descriptor> {
        let name = descriptor.name().to_string();
        let kind = descriptor.kind();
        let replaced = self.namespace_mut(kind).insert(name, descriptor);
        if let Some(old) = &replaced {
            tracing::debug!("Replaced {} registration '{}'", kind, old.name());
        }
        replaced
    }

    /// Resolve `(kind, name)` to the current descriptor.
    pub fn resolve(&self, kind: DefinitionKind, name: &str) -> Result<Descriptor, DefCacheError> {
        self.namespace(kind).get(name).cloned().ok_or_else(|| DefCacheError::NotRegistered {
            kind,
            name: name.to_string(),
            suggestions: self.find_similar_names(kind, name),
        })
    }

    /// Whether `name` is registered as a `kind`.
    #[must_use]
    pub fn contains(&self, kind: DefinitionKind, name: &str) -> bool {
        self.namespace(kind).contains_key(name)
    }

    /// Registered names of one kind, sorted.
    pub fn names(&self, kind: DefinitionKind) -> impl Iterator<Item = &str> + '_ {
        self.namespace(kind).keys().map(String::as_str)
    }

    /// All descriptors, components first, each kind sorted by name.
    pub fn descriptors(&self) -> impl Iterator<Item = &Descriptor> + '_ {
        self.components.values().chain(self.helpers.values())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len() + self.helpers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty() && self.helpers.is_empty()
    }

    fn namespace(&self, kind: DefinitionKind) -> &BTreeMap<String, Descriptor> {
        match kind {
            DefinitionKind::Component => &self.components,
            DefinitionKind::Helper => &self.helpers,
        }
    }

    fn namespace_mut(&mut self, kind: DefinitionKind) -> &mut BTreeMap<String, Descriptor> {
        match kind {
            DefinitionKind::Component => &mut self.components,
            DefinitionKind::Helper => &mut self.helpers,
        }
    }

    /// Find similar registered names using Levenshtein distance
    fn find_similar_names(&self, kind: DefinitionKind, target: &str) -> Vec<String> {
        let mut scored: Vec<_> =
            self.names(kind).map(|name| (name.to_string(), levenshtein(target, name))).collect();

        // Closest first
        scored.sort_by_key(|(_, dist)| *dist);

        scored
            .into_iter()
            .filter(|(_, dist)| *dist <= target.len() * SIMILARITY_THRESHOLD_PERCENT / 100)
            .take(3)
            .map(|(name, _)| name)
            .collect()
    }
}
