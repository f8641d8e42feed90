//! The contract every search source implements.

use crate::error::Result;
use async_trait::async_trait;
use lookup_core::{Person, SearchCapabilities, SearchMode, SearchResult, SourceId};

/// One data source behind the uniform search contract.
///
/// A mode the backend does not support answers with an empty result, never
/// an error, so callers can fan out without checking capabilities first.
/// Any error returned is scoped to this backend and means "contributed
/// nothing this round".
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Stable identifier of the source
    fn id(&self) -> &SourceId;

    /// Which searches this backend can actually answer
    fn capabilities(&self) -> &SearchCapabilities;

    /// Run a search keyed on `mode`.
    async fn search(&self, mode: SearchMode, query: &str) -> Result<SearchResult>;

    /// Fetch one record by its source-specific id.
    ///
    /// `Ok(None)` means the source does not know the id, or cannot look
    /// records up at all.
    async fn get_person_by_id(&self, id: &str) -> Result<Option<Person>>;

    /// Acquire long-lived resources before the first query.
    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    /// Release long-lived resources. Must be safe to call more than once.
    async fn shutdown(&self) {}

    /// Search by full name.
    async fn search_by_name(&self, name: &str) -> Result<SearchResult> {
        self.search(SearchMode::Name, name).await
    }

    /// Search by postal address.
    async fn search_by_address(&self, address: &str) -> Result<SearchResult> {
        self.search(SearchMode::Address, address).await
    }

    /// Search by phone number.
    async fn search_by_phone(&self, phone: &str) -> Result<SearchResult> {
        self.search(SearchMode::Phone, phone).await
    }

    /// Search by email address.
    async fn search_by_email(&self, email: &str) -> Result<SearchResult> {
        self.search(SearchMode::Email, email).await
    }
}
