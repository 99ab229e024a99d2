//! Error handling for defcache
//!
//! The error system follows two rules:
//! 1. **Strongly-typed errors** ([`DefCacheError`]) for library callers that need to
//!    match on a failure mode
//! 2. **User-friendly messages** ([`ErrorContext`]) with details and suggestions for
//!    the command-line tool
//!
//! Library functions return `Result<_, DefCacheError>`. Application code (the CLI,
//! file loading) works in [`anyhow::Result`] and converts at the edge with
//! [`user_friendly_error`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use defcache::core::{DefCacheError, DefinitionKind, user_friendly_error};
//!
//! let err = DefCacheError::NotRegistered {
//!     kind: DefinitionKind::Helper,
//!     name: "foo-baz".to_string(),
//!     suggestions: vec!["foo-bar".to_string()],
//! };
//!
//! let ctx = user_friendly_error(anyhow::Error::from(err));
//! ctx.display(); // colored output on stderr
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

use super::DefinitionKind;

/// The main error type for definition cache operations.
///
/// # Failure modes
///
/// - [`CompilationFailure`] - the compiler callback failed; nothing was cached
/// - [`InvalidDescriptor`] - a descriptor was looked up as the wrong kind
/// - [`UnknownKind`] - a kind string is neither `component` nor `helper`
/// - [`NotRegistered`] - no registration under the requested name
/// - [`RenderFailed`] - a compiled definition failed while producing output
///
/// [`CompilationFailure`]: DefCacheError::CompilationFailure
/// [`InvalidDescriptor`]: DefCacheError::InvalidDescriptor
/// [`UnknownKind`]: DefCacheError::UnknownKind
/// [`NotRegistered`]: DefCacheError::NotRegistered
/// [`RenderFailed`]: DefCacheError::RenderFailed
#[derive(Error, Debug)]
pub enum DefCacheError {
    /// The compiler callback failed for a descriptor.
    ///
    /// The cache never stores a partial entry for the descriptor, so the next
    /// lookup compiles again.
    #[error("Failed to compile {kind} '{name}'")]
    CompilationFailure {
        /// Kind that was requested
        kind: DefinitionKind,
        /// Registered name of the descriptor
        name: String,
        /// The original compiler error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A descriptor cannot be classified as the requested kind.
    #[error("Descriptor '{name}' is a {actual}, but a {expected} was requested")]
    InvalidDescriptor {
        /// Registered name of the descriptor
        name: String,
        /// Kind the caller asked for
        expected: DefinitionKind,
        /// Kind the descriptor (or the compiled definition) actually has
        actual: DefinitionKind,
    },

    /// A kind string that is neither `component` nor `helper`.
    #[error("Unknown definition kind: '{kind}'")]
    UnknownKind {
        /// The rejected input
        kind: String,
    },

    /// Nothing is registered under the requested name.
    #[error("No {kind} registered under '{name}'")]
    NotRegistered {
        /// Kind that was looked up
        kind: DefinitionKind,
        /// Name that was looked up
        name: String,
        /// Registered names close to `name`
        suggestions: Vec<String>,
    },

    /// A compiled definition failed while rendering.
    #[error("Failed to render {kind} '{name}': {reason}")]
    RenderFailed {
        /// Kind of the definition
        kind: DefinitionKind,
        /// Registered name
        name: String,
        /// Flattened engine error chain
        reason: String,
    },

    /// Invalid configuration value or file.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// What is wrong with the configuration
        message: String,
    },

    /// A registry file could not be parsed.
    #[error("Invalid registry file {file}: {reason}")]
    RegistryParseError {
        /// Path of the registry file
        file: String,
        /// Parser message
        reason: String,
    },

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl DefCacheError {
    /// Whether this error came out of the compile step.
    #[must_use]
    pub const fn is_compilation_failure(&self) -> bool {
        matches!(self, Self::CompilationFailure { .. })
    }
}

/// Error wrapper carrying user-facing details and a suggestion.
///
/// Details are shown in yellow, suggestions in green.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: anyhow::Error,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Wrap an error with no details or suggestion.
    #[must_use]
    pub fn new(error: impl Into<anyhow::Error>) -> Self {
        Self {
            error: error.into(),
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error, details and suggestion to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

/// Convert any error into an [`ErrorContext`] with details and suggestions.
///
/// Known [`DefCacheError`] variants anywhere in the chain get tailored advice;
/// everything else falls back to the full error chain as details.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let chain = error_chain(&error);

    let found = error.chain().find_map(|e| e.downcast_ref::<DefCacheError>());
    let Some(def_error) = found else {
        let missing_file = error
            .downcast_ref::<std::io::Error>()
            .is_some_and(|e| e.kind() == std::io::ErrorKind::NotFound);
        if missing_file {
            return ErrorContext::new(error)
                .with_suggestion("Check that the file exists and the path is correct");
        }
        return match chain {
            Some(chain) => ErrorContext::new(error).with_details(chain),
            None => ErrorContext::new(error),
        };
    };

    let (details, suggestion) = match def_error {
        DefCacheError::CompilationFailure {
            kind,
            ..
        } => (
            chain,
            Some(format!(
                "Fix the {kind} source and render again; failed compilations are never cached"
            )),
        ),
        DefCacheError::InvalidDescriptor {
            expected,
            actual,
            ..
        } => (
            Some(format!("A {actual} registration cannot be used where a {expected} is expected")),
            Some(format!("Reference it as '{actual}:<name>' instead")),
        ),
        DefCacheError::UnknownKind {
            ..
        } => (None, Some("Use 'component' or 'helper'".to_string())),
        DefCacheError::NotRegistered {
            kind,
            suggestions,
            ..
        } => {
            let suggestion = if suggestions.is_empty() {
                format!("Register the {kind} under [{}] in the registry file", kind.plural())
            } else {
                format!("Did you mean: {}?", suggestions.join(", "))
            };
            (None, Some(suggestion))
        }
        DefCacheError::RenderFailed {
            ..
        } => (
            None,
            Some("Check that every variable used by the template has a value or a class default"
                .to_string()),
        ),
        DefCacheError::RegistryParseError {
            ..
        }
        | DefCacheError::TomlError(_) => (
            chain,
            Some("Check the TOML syntax. Verify quotes, brackets, and table names".to_string()),
        ),
        DefCacheError::ConfigError {
            ..
        }
        | DefCacheError::IoError(_) => (chain, None),
    };

    let mut ctx = ErrorContext::new(error);
    if let Some(details) = details {
        ctx = ctx.with_details(details);
    }
    if let Some(suggestion) = suggestion {
        ctx = ctx.with_suggestion(suggestion);
    }
    ctx
}

/// Joined messages of everything below the top-level error, if anything.
fn error_chain(error: &anyhow::Error) -> Option<String> {
    let causes: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();
    if causes.is_empty() {
        None
    } else {
        Some(causes.join(": "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_error_display() {
        let err = DefCacheError::InvalidDescriptor {
            name: "foo-bar".to_string(),
            expected: DefinitionKind::Component,
            actual: DefinitionKind::Helper,
        };
        assert_eq!(err.to_string(), "Descriptor 'foo-bar' is a helper, but a component was requested");

        let err = DefCacheError::UnknownKind {
            kind: "modifier".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown definition kind: 'modifier'");
    }

    #[test]
    fn test_compilation_failure_keeps_source() {
        let err = DefCacheError::CompilationFailure {
            kind: DefinitionKind::Component,
            name: "broken".to_string(),
            source: anyhow::anyhow!("unexpected end of template").into(),
        };
        assert!(err.is_compilation_failure());
        let source = std::error::Error::source(&err).expect("source should be set");
        assert_eq!(source.to_string(), "unexpected end of template");
    }

    #[test]
    fn test_user_friendly_not_registered_suggests_names() {
        let err = DefCacheError::NotRegistered {
            kind: DefinitionKind::Helper,
            name: "foo-baz".to_string(),
            suggestions: vec!["foo-bar".to_string()],
        };
        let ctx = user_friendly_error(err.into());
        assert_eq!(ctx.suggestion.as_deref(), Some("Did you mean: foo-bar?"));
    }

    #[test]
    fn test_user_friendly_finds_error_below_context() {
        let result: anyhow::Result<()> = Err(DefCacheError::UnknownKind {
            kind: "x".to_string(),
        })
        .context("while parsing render items");
        let ctx = user_friendly_error(result.unwrap_err());
        assert_eq!(ctx.suggestion.as_deref(), Some("Use 'component' or 'helper'"));
        assert!(ctx.to_string().starts_with("while parsing render items"));
    }

    #[test]
    fn test_user_friendly_generic_error_shows_chain() {
        let err = anyhow::anyhow!("root cause").context("outer");
        let ctx = user_friendly_error(err);
        assert_eq!(ctx.details.as_deref(), Some("root cause"));
        assert!(ctx.suggestion.is_none());
    }
}
