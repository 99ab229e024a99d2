//! Descriptors: identity keys for registrations.
//!
//! A [`Descriptor`] is a shared handle to one registration. Cloning it is cheap
//! and keeps the same identity; equality and hashing use that identity, never
//! the content. Two registrations with the same template are two different
//! descriptors.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::core::{DefCacheError, DefinitionKind};

/// Optional backing class of a component.
///
/// `defaults` are merged into the render context before the caller's values,
/// so callers can override them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentClass {
    /// Class name, reported in the debug render tree
    pub name: String,
    /// Default template values
    #[serde(default)]
    pub defaults: serde_json::Map<String, Value>,
}

impl ComponentClass {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            defaults: serde_json::Map::new(),
        }
    }

    /// Add a default template value.
    #[must_use]
    pub fn with_default(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defaults.insert(key.into(), value.into());
        self
    }
}

/// Source of a component registration.
#[derive(Debug, Clone)]
pub struct ComponentSource {
    /// Template text, compiled on first use
    pub template: String,
    /// Optional backing class
    pub class: Option<ComponentClass>,
}

/// A helper function taking positional arguments.
#[derive(Clone)]
pub struct HelperFn(Arc<dyn Fn(&[Value]) -> String + Send + Sync>);

impl HelperFn {
    pub fn new(f: impl Fn(&[Value]) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Invoke the helper.
    #[must_use]
    pub fn call(&self, args: &[Value]) -> String {
        (self.0)(args)
    }
}

impl fmt::Debug for HelperFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HelperFn(..)")
    }
}

/// Tagged payload of a registration.
#[derive(Debug, Clone)]
pub enum DescriptorPayload {
    Component(ComponentSource),
    Helper(HelperFn),
}

impl DescriptorPayload {
    #[must_use]
    pub const fn kind(&self) -> DefinitionKind {
        match self {
            Self::Component(_) => DefinitionKind::Component,
            Self::Helper(_) => DefinitionKind::Helper,
        }
    }
}

#[derive(Debug)]
struct Registration {
    name: String,
    payload: DescriptorPayload,
}

/// Identity key for one component or helper registration.
///
/// # Examples
///
/// ```rust
/// use defcache::registry::Descriptor;
///
/// let one = Descriptor::component("greeting", "Hello", None);
/// let same = one.clone();
/// let twin = Descriptor::component("greeting", "Hello", None);
///
/// assert_eq!(one, same);
/// assert_ne!(one, twin);
/// ```
#[derive(Clone)]
pub struct Descriptor(Arc<Registration>);

impl Descriptor {
    /// Mint a component descriptor.
    pub fn component(
        name: impl Into<String>,
        template: impl Into<String>,
        class: Option<ComponentClass>,
    ) -> Self {
        Self::from_payload(
            name,
            DescriptorPayload::Component(ComponentSource {
                template: template.into(),
                class,
            }),
        )
    }

    /// Mint a helper descriptor.
    pub fn helper(
        name: impl Into<String>,
        f: impl Fn(&[Value]) -> String + Send + Sync + 'static,
    ) -> Self {
        Self::from_payload(name, DescriptorPayload::Helper(HelperFn::new(f)))
    }

    /// Mint a descriptor from an already-built payload.
    pub fn from_payload(name: impl Into<String>, payload: DescriptorPayload) -> Self {
        Self(Arc::new(Registration {
            name: name.into(),
            payload,
        }))
    }

    /// Registered name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    #[must_use]
    pub fn kind(&self) -> DefinitionKind {
        self.0.payload.kind()
    }

    #[must_use]
    pub fn payload(&self) -> &DescriptorPayload {
        &self.0.payload
    }

    /// Fail with [`DefCacheError::InvalidDescriptor`] unless this is a `kind`.
    pub fn expect_kind(&self, kind: DefinitionKind) -> Result<(), DefCacheError> {
        let actual = self.kind();
        if actual == kind {
            Ok(())
        } else {
            Err(DefCacheError::InvalidDescriptor {
                name: self.name().to_string(),
                expected: kind,
                actual,
            })
        }
    }

    /// Whether both handles refer to the same registration.
    #[must_use]
    pub fn same_registration(&self, other: &Descriptor) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

impl PartialEq for Descriptor {
    fn eq(&self, other: &Self) -> bool {
        self.same_registration(other)
    }
}

impl Eq for Descriptor {}

impl Hash for Descriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("kind", &self.kind())
            .field("name", &self.name())
            .field("id", &format_args!("{:#x}", self.addr()))
            .finish()
    }
}
