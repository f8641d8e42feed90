//! Lookup Search - Multi-source people search.
//!
//! Queries several independent, unreliable people-search sources at once and
//! merges what they return into one deduplicated result.
//!
//! # Architecture
//!
//! - [`SearchBackend`] is the uniform contract: four search verbs plus lookup
//!   by id, with a default empty answer for anything a source cannot do.
//! - [`ProxyBackend`] fetches pages through the bypass proxy inside one
//!   long-lived session; [`AutomationBackend`] fills in a site's search form
//!   in a fresh browser per query.
//! - [`ListingExtractor`] and [`DetailExtractor`] turn pages into
//!   [`Person`](lookup_core::Person) records, dropping anything malformed.
//! - [`SearchOrchestrator`] fans a query out to every backend, absorbs
//!   failures and timeouts, and merges the survivors in priority order.
//!
//! # Example
//!
//! ```rust,ignore
//! use lookup_core::AppConfig;
//! use lookup_search::BackendFactory;
//! use lookup_sources::{SourceLoader, SourceRegistry};
//!
//! let config = AppConfig::load_with_env()?;
//! let registry = SourceRegistry::load_from(&SourceLoader::with_default_dir()?)?;
//! let orchestrator = BackendFactory::new(config).orchestrator(&registry);
//!
//! orchestrator.initialize().await;
//! let result = orchestrator.search_by_name("John Smith").await;
//! orchestrator.shutdown().await;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod backend;
pub mod backends;
#[allow(missing_docs)]
pub mod error;
#[allow(missing_docs)]
pub mod extract;
pub mod factory;
pub mod orchestrator;
#[allow(missing_docs)]
pub mod url_builder;

pub use backend::SearchBackend;
pub use backends::{AutomationBackend, ProxyBackend};
pub use error::{Result, SearchError};
pub use extract::{DetailExtractor, DetailPage, ListingExtractor, ListingPage};
pub use factory::BackendFactory;
pub use orchestrator::{BackendOutcome, SearchOrchestrator, SearchReport};
pub use url_builder::{build_person_url, build_search_url};
