//! Definition kinds
//!
//! Every registration the cache knows about is either a component (a template,
//! optionally backed by a class) or a helper (a plain function). The kind is a
//! closed set: anything else is rejected at the parsing boundary.
//!
//! # Examples
//!
//! ```rust
//! use defcache::core::DefinitionKind;
//!
//! let kind: DefinitionKind = "helper".parse().unwrap();
//! assert_eq!(kind, DefinitionKind::Helper);
//! assert_eq!(kind.to_string(), "helper");
//!
//! assert!("modifier".parse::<DefinitionKind>().is_err());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::DefCacheError;

/// The two kinds of registration a definition can be compiled from.
///
/// Serializes as lowercase strings (`"component"`, `"helper"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefinitionKind {
    /// A template with an optional backing class
    Component,
    /// A function invoked with positional arguments
    Helper,
}

impl DefinitionKind {
    /// Both kinds, in display order.
    pub const ALL: [DefinitionKind; 2] = [DefinitionKind::Component, DefinitionKind::Helper];

    /// Lowercase name used in CLI items, registry files and messages.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Component => "component",
            Self::Helper => "helper",
        }
    }

    /// Plural form used for registry file tables (`[components]`, `[helpers]`).
    #[must_use]
    pub const fn plural(&self) -> &'static str {
        match self {
            Self::Component => "components",
            Self::Helper => "helpers",
        }
    }
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DefinitionKind {
    type Err = DefCacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "component" | "components" => Ok(Self::Component),
            "helper" | "helpers" => Ok(Self::Helper),
            _ => Err(DefCacheError::UnknownKind {
                kind: s.to_string(),
            }),
        }
    }
}
