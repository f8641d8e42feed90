//! Lookup Sources - Declarative definitions of the people-search sites.
//!
//! Each search backend is described by a TOML file: where the site lives,
//! how its pages are acquired (through the bypass proxy or by driving a
//! browser), which URL templates answer which search mode, and which CSS
//! selectors locate result cards and detail fields. Selector choice is data,
//! so adding or repairing a source never touches Rust code.
//!
//! # Architecture
//!
//! - **Definition Types** ([`definition`]): Strongly-typed source metadata and configuration
//! - **Loader** ([`loader`]): TOML file loading from `source-definitions/` directory
//! - **Registry** ([`registry`]): In-memory cache ordered by backend priority
//! - **Errors** ([`error`]): Source-specific error types
//!
//! # Example
//!
//! ```rust,no_run
//! use lookup_sources::{SourceLoader, SourceRegistry};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let loader = SourceLoader::with_default_dir()?;
//! let registry = SourceRegistry::load_from(&loader)?;
//!
//! for definition in registry.enabled() {
//!     println!("{} (priority {})", definition.name(), definition.source.priority);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod definition;
pub mod error;
pub mod loader;
pub mod registry;

// Re-export commonly used types
pub use definition::{
    AcquisitionMethod, DetailSelectors, ListingSelectors, SourceDefinition, SourceMetadata,
    UrlTemplates,
};
pub use error::{Result, SourceError};
pub use loader::SourceLoader;
pub use registry::SourceRegistry;
