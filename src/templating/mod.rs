//! Template compilation and rendering.
//!
//! - [`DefinitionCompiler`] parses component templates with Tera and wraps
//!   helpers; it is the compiler callback handed to the definition cache.
//! - [`Renderer`] is the render context: resolve a name, fetch or build its
//!   definition through the cache, produce output.
//!
//! Component templates are plain Tera templates. A component's backing class
//! may supply default values:
//!
//! ```rust
//! use defcache::config::RendererConfig;
//! use defcache::registry::{ComponentClass, Registry};
//! use defcache::templating::Renderer;
//! use tera::Context;
//!
//! let mut registry = Registry::new();
//! registry.register_component(
//!     "greeting",
//!     "Hello {{ who }}",
//!     Some(ComponentClass::new("Greeting").with_default("who", "world")),
//! );
//!
//! let mut renderer = Renderer::new(registry, RendererConfig::default());
//! assert_eq!(renderer.render_component("greeting", &Context::new()).unwrap(), "Hello world");
//! ```

pub mod compiler;
pub mod renderer;

pub use compiler::DefinitionCompiler;
pub use renderer::{PrecompileFailure, RenderNode, Renderer};
