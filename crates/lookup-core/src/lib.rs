//! Lookup Core - Foundation crate for the people-search aggregator.
//!
//! This crate provides the canonical record shapes every search backend must
//! produce, shared identifiers, error handling and configuration that all
//! other Lookup crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Record model (`Person`, `SearchResult`) and shared newtypes
//! - [`capabilities`] - Per-backend search capability sets
//!
//! # Example
//!
//! ```rust
//! use lookup_core::{Person, SearchMode, SearchResult};
//!
//! let person = Person::new("abc-123", "John Smith");
//! let result = SearchResult::new(vec![person.clone(), person]);
//! assert_eq!(result.dedup().len(), 1);
//! assert_eq!(SearchMode::Name.as_str(), "name");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod capabilities;
pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use capabilities::SearchCapabilities;
pub use config::{AppConfig, BrowserConfig, ProxyConfig, SearchConfig};
pub use error::{ConfigError, ConfigResult, LookupError, Result};
pub use types::{Person, SearchMode, SearchResult, SourceId};
