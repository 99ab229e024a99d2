//! Core types for defcache
//!
//! - [`DefCacheError`] - strongly-typed failure modes for the library
//! - [`ErrorContext`] / [`user_friendly_error`] - CLI-facing error presentation
//! - [`DefinitionKind`] - the component/helper split every lookup is tagged with

pub mod error;
pub mod kind;

pub use error::{DefCacheError, ErrorContext, user_friendly_error};
pub use kind::DefinitionKind;
