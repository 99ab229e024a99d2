//! defcache - identity-keyed definition cache for components and helpers
//!
//! A renderer that resolves component and helper names on every pass should not
//! recompile the same registration on every pass. defcache memoizes compiled
//! definitions by registration identity: the first lookup of a descriptor
//! compiles it, every later lookup returns the same definition instance.
//!
//! # Architecture Overview
//!
//! ```text
//!  name ──► Registry ──► Descriptor ──► DefinitionCache ──► Arc<Definition> ──► output
//!                                         │        ▲
//!                                  miss   ▼        │ store
//!                                       DefinitionCompiler (tera)
//! ```
//!
//! - A [`registry::Descriptor`] is the identity of one registration. Two
//!   registrations with identical content are still two descriptors.
//! - The [`cache::DefinitionCache`] maps descriptors to compiled
//!   [`cache::Definition`]s. No eviction; a failed compile is never stored.
//! - [`telemetry`] counts hits, misses and definitions created, process-wide,
//!   with snapshot/diff for tests.
//!
//! # Core Modules
//!
//! - [`cache`] - the definition cache and definition types
//! - [`registry`] - registrations, descriptors, registry files
//! - [`templating`] - compiler callback and render driver
//! - [`telemetry`] - cache counters
//! - [`config`] - renderer configuration
//! - [`core`] - errors and the component/helper kind
//! - [`cli`] - the `defcache` command-line tool
//!
//! # Example
//!
//! ```rust
//! use defcache::config::RendererConfig;
//! use defcache::core::DefinitionKind;
//! use defcache::registry::Registry;
//! use defcache::templating::Renderer;
//!
//! let mut registry = Registry::new();
//! registry.register_component("component-one", "One", None);
//! registry.register_component("component-two", "Two", None);
//!
//! let mut renderer = Renderer::new(registry, RendererConfig::default());
//! for name in ["component-one", "component-two", "component-one"] {
//!     renderer.render(DefinitionKind::Component, name).unwrap();
//! }
//! assert_eq!(renderer.cache().len(), 2);
//! ```

pub mod cache;
pub mod cli;
pub mod config;
pub mod core;
pub mod registry;
pub mod telemetry;
pub mod templating;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
