//! Shared error taxonomy, configuration, domain value types, and the
//! namespace resolver used by every other `noetic-*` crate.

pub mod config;
pub mod error;
pub mod namespace;
pub mod types;

pub use config::NoeticConfig;
pub use error::{Error, Result};
pub use namespace::NamespaceResolver;
