//! Descriptor compiler.
//!
//! Turns a [`Descriptor`] into a [`Definition`]. Component templates are parsed
//! by Tera here, which is the expensive step the cache exists to avoid repeating;
//! helpers are wrapped as they are.

use anyhow::{Result, anyhow};
use tera::Tera;

use crate::cache::{ComponentDefinition, Definition, HelperDefinition};
use crate::cache::definition::format_tera_error;
use crate::registry::{Descriptor, DescriptorPayload};

/// Compiler callback used by the renderer.
#[derive(Debug, Clone, Default)]
pub struct DefinitionCompiler {
    /// Escape HTML in every component template
    autoescape: bool,
}

impl DefinitionCompiler {
    #[must_use]
    pub const fn new(autoescape: bool) -> Self {
        Self {
            autoescape,
        }
    }

    /// Build a definition for `descriptor`.
    ///
    /// # Errors
    ///
    /// Returns an error if a component template does not parse.
    pub fn compile(&self, descriptor: &Descriptor) -> Result<Definition> {
        match descriptor.payload() {
            DescriptorPayload::Component(source) => {
                let mut tera = Tera::default();
                // Template names carry no extension, so an empty suffix matches all of them
                if self.autoescape {
                    tera.autoescape_on(vec![""]);
                } else {
                    tera.autoescape_on(vec![]);
                }
                tera.add_raw_template(descriptor.name(), &source.template)
                    .map_err(|e| anyhow!("Template syntax error: {}", format_tera_error(&e)))?;

                tracing::debug!(
                    "Compiled component '{}' ({} bytes)",
                    descriptor.name(),
                    source.template.len()
                );
                Ok(Definition::Component(ComponentDefinition::new(
                    descriptor.name(),
                    tera,
                    source.class.clone(),
                )))
            }
            DescriptorPayload::Helper(function) => {
                tracing::debug!("Compiled helper '{}'", descriptor.name());
                Ok(Definition::Helper(HelperDefinition::new(descriptor.name(), function.clone())))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DefinitionKind;
    use tera::Context as TeraContext;

    #[test]
    fn test_compile_component() {
        let descriptor = Descriptor::component("component-one", "One", None);
        let def = DefinitionCompiler::default().compile(&descriptor).unwrap();
        assert_eq!(def.kind(), DefinitionKind::Component);
        assert_eq!(def.name(), "component-one");
        assert_eq!(def.as_component().unwrap().render(&TeraContext::new()).unwrap(), "One");
    }

    #[test]
    fn test_compile_helper() {
        let descriptor = Descriptor::helper("foo-bar", |_| "foo-bar helper!".to_string());
        let def = DefinitionCompiler::default().compile(&descriptor).unwrap();
        assert_eq!(def.as_helper().unwrap().invoke(&[]), "foo-bar helper!");
    }

    #[test]
    fn test_syntax_error_fails_compile() {
        let descriptor = Descriptor::component("broken", "{% if %}", None);
        let err = DefinitionCompiler::default().compile(&descriptor).unwrap_err();
        assert!(err.to_string().starts_with("Template syntax error"), "got: {err}");
    }

    #[test]
    fn test_autoescape() {
        let descriptor = Descriptor::component("escaped", "{{ value }}", None);
        let mut ctx = TeraContext::new();
        ctx.insert("value", "<b>");

        let escaped = DefinitionCompiler::new(true).compile(&descriptor).unwrap();
        assert_eq!(escaped.as_component().unwrap().render(&ctx).unwrap(), "&lt;b&gt;");

        let raw = DefinitionCompiler::new(false).compile(&descriptor).unwrap();
        assert_eq!(raw.as_component().unwrap().render(&ctx).unwrap(), "<b>");
    }
}
