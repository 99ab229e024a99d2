//! Identity-keyed definition cache.
//!
//! The cache sits between the renderer and the registry. Each render resolves a
//! name to a [`Descriptor`] and asks the cache for its compiled [`Definition`]:
//!
//! - **Hit**: the descriptor was compiled before. `cacheHit` is incremented and
//!   the stored definition is returned; nothing else happens.
//! - **Miss**: `cacheMiss` is incremented, the compiler callback builds a new
//!   definition, it is stored under the descriptor, and the matching
//!   definition counter (`componentDefinitionCount` or `helperDefinitionCount`)
//!   is incremented.
//!
//! Entries are keyed by descriptor identity, not content. They are never evicted;
//! the cache lives as long as the render context that owns it. A failed compile
//! stores nothing, so the next lookup for the same descriptor compiles again.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use defcache::cache::DefinitionCache;
//! use defcache::core::DefinitionKind;
//! use defcache::registry::Descriptor;
//! use defcache::telemetry::{CacheCounters, Counter};
//! use defcache::templating::DefinitionCompiler;
//!
//! let counters = Arc::new(CacheCounters::new());
//! let mut cache = DefinitionCache::with_counters(Arc::clone(&counters));
//! let compiler = DefinitionCompiler::default();
//! let one = Descriptor::component("component-one", "One", None);
//!
//! let first = cache.get_or_create(DefinitionKind::Component, &one, |d| compiler.compile(d)).unwrap();
//! let second = cache.get_or_create(DefinitionKind::Component, &one, |d| compiler.compile(d)).unwrap();
//!
//! assert!(Arc::ptr_eq(&first, &second));
//! assert_eq!(counters.get(Counter::ComponentDefinitionCount), 1);
//! assert_eq!(counters.get(Counter::CacheHit), 1);
//! ```

pub mod definition;

pub use definition::{ComponentDefinition, Definition, HelperDefinition};

use std::collections::HashMap;
use std::sync::Arc;

use crate::core::{DefCacheError, DefinitionKind};
use crate::registry::Descriptor;
use crate::telemetry::{CacheCounters, Counter, global_counters};

/// Memo table from descriptor identity to compiled definition.
///
/// Keys hold a clone of the descriptor handle, so a registration's identity
/// cannot be reused while its entry lives.
#[derive(Debug)]
pub struct DefinitionCache {
    entries: HashMap<Descriptor, Arc<Definition>>,
    counters: Arc<CacheCounters>,
}

impl Default for DefinitionCache {
    fn default() -> Self {
        Self::new()
    }
}

impl DefinitionCache {
    /// Empty cache reporting to the process-wide counters.
    #[must_use]
    pub fn new() -> Self {
        Self::with_counters(global_counters())
    }

    /// Empty cache reporting to a private counter set.
    #[must_use]
    pub fn with_counters(counters: Arc<CacheCounters>) -> Self {
        Self {
            entries: HashMap::new(),
            counters,
        }
    }

    /// The counter set this cache reports to.
    #[must_use]
    pub fn counters(&self) -> &Arc<CacheCounters> {
        &self.counters
    }

    /// Return the definition for `descriptor`, compiling it on first use.
    ///
    /// # Errors
    ///
    /// - [`DefCacheError::InvalidDescriptor`] if `descriptor` is not a `kind`,
    ///   or `compile` produced a definition of the other kind. Nothing is
    ///   stored and, for the first case, no counter moves.
    /// - [`DefCacheError::CompilationFailure`] if `compile` fails. Nothing is
    ///   stored; the next call compiles again and counts as another miss.
    pub fn get_or_create<F>(
        &mut self,
        kind: DefinitionKind,
        descriptor: &Descriptor,
        compile: F,
    ) -> Result<Arc<Definition>, DefCacheError>
    where
        F: FnOnce(&Descriptor) -> anyhow::Result<Definition>,
    {
        descriptor.expect_kind(kind)?;

        if let Some(definition) = self.entries.get(descriptor) {
            self.counters.record(Counter::CacheHit);
            tracing::trace!("Definition cache hit for {} '{}'", kind, descriptor.name());
            return Ok(Arc::clone(definition));
        }

        self.counters.record(Counter::CacheMiss);
        tracing::debug!("Definition cache miss for {} '{}', compiling", kind, descriptor.name());

        let definition = compile(descriptor).map_err(|source| {
            tracing::warn!("Failed to compile {} '{}': {:#}", kind, descriptor.name(), source);
            DefCacheError::CompilationFailure {
                kind,
                name: descriptor.name().to_string(),
                source: source.into(),
            }
        })?;

        if definition.kind() != kind {
            return Err(DefCacheError::InvalidDescriptor {
                name: descriptor.name().to_string(),
                expected: kind,
                actual: definition.kind(),
            });
        }

        let definition = Arc::new(definition);
        self.entries.insert(descriptor.clone(), Arc::clone(&definition));
        self.counters.record(match kind {
            DefinitionKind::Component => Counter::ComponentDefinitionCount,
            DefinitionKind::Helper => Counter::HelperDefinitionCount,
        });

        Ok(definition)
    }

    /// Stored definition for `descriptor`, without touching the counters.
    #[must_use]
    pub fn get(&self, descriptor: &Descriptor) -> Option<Arc<Definition>> {
        self.entries.get(descriptor).cloned()
    }

    #[must_use]
    pub fn contains(&self, descriptor: &Descriptor) -> bool {
        self.entries.contains_key(descriptor)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry. Used when the owning render context is torn down.
    pub fn clear(&mut self) {
        tracing::debug!("Clearing definition cache ({} entries)", self.entries.len());
        self.entries.clear();
    }
}
