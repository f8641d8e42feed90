//! Backend that fetches pages through the bypass proxy.

use crate::backend::SearchBackend;
use crate::error::{Result, SearchError};
use crate::extract::{DetailExtractor, DetailPage, ListingExtractor, ListingPage};
use crate::url_builder::{build_person_url, build_search_url};
use async_trait::async_trait;
use lookup_core::{Person, SearchCapabilities, SearchMode, SearchResult, SourceId};
use lookup_proxy::{BypassClient, ProxyError, RawDocument};
use lookup_sources::{AcquisitionMethod, SourceDefinition, UrlTemplates};
use std::time::Instant;
use tracing::{debug, error, info};

/// A source reached through one long-lived bypass-proxy session.
///
/// The session is created by [`SearchBackend::initialize`] and destroyed by
/// [`SearchBackend::shutdown`]. Until initialization succeeds every query
/// fails with [`SearchError::NotInitialized`]; after shutdown every query
/// fails with [`ProxyError::SessionDestroyed`]. Concurrent queries share the
/// session.
pub struct ProxyBackend {
    id: SourceId,
    base_url: String,
    templates: UrlTemplates,
    capabilities: SearchCapabilities,
    listing: ListingExtractor,
    detail: Option<DetailExtractor>,
    client: BypassClient,
}

impl ProxyBackend {
    /// Build a backend for a `bypass-proxy` definition.
    pub fn new(definition: &SourceDefinition, client: BypassClient) -> Result<Self> {
        let AcquisitionMethod::BypassProxy { templates } = &definition.acquisition else {
            return Err(lookup_sources::SourceError::ValidationError {
                source_id: definition.id().to_string(),
                reason: "proxy backend requires the bypass-proxy strategy".to_string(),
            }
            .into());
        };

        let detail = definition
            .detail
            .as_ref()
            .map(DetailExtractor::new)
            .transpose()?;

        Ok(Self {
            id: definition.id().clone(),
            base_url: definition.base_url().to_string(),
            templates: templates.clone(),
            capabilities: definition.capabilities(),
            listing: ListingExtractor::new(&definition.listing)?,
            detail,
            client,
        })
    }

    async fn fetch_page(&self, url: &str) -> Result<RawDocument> {
        let started = Instant::now();
        let page = self.client.fetch(url, None).await.map_err(|e| match e {
            ProxyError::SessionNotEstablished => SearchError::NotInitialized {
                backend: self.id.clone(),
            },
            other => SearchError::Proxy(other),
        })?;

        debug!(
            backend = %self.id,
            url,
            status = page.status,
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "page acquired"
        );
        Ok(page)
    }

    fn interpret_listing(&self, url: &str, page: &RawDocument) -> Result<SearchResult> {
        match self.listing.interpret(&page.body) {
            ListingPage::Blocked => Err(SearchError::Blocked {
                backend: self.id.clone(),
                url: url.to_string(),
            }),
            ListingPage::NoResults => Ok(SearchResult::empty()),
            ListingPage::Matches(result) => Ok(result),
        }
    }
}

#[async_trait]
impl SearchBackend for ProxyBackend {
    fn id(&self) -> &SourceId {
        &self.id
    }

    fn capabilities(&self) -> &SearchCapabilities {
        &self.capabilities
    }

    async fn search(&self, mode: SearchMode, query: &str) -> Result<SearchResult> {
        let template = match self.templates.for_mode(mode) {
            Some(template) if self.capabilities.supports(mode) => template,
            _ => {
                debug!(
                    backend = %self.id,
                    %mode,
                    "search mode not supported, returning no matches"
                );
                return Ok(SearchResult::empty());
            }
        };

        let Some(url) = build_search_url(template, &self.base_url, mode, query) else {
            debug!(backend = %self.id, %mode, "blank query, returning no matches");
            return Ok(SearchResult::empty());
        };

        let page = self.fetch_page(&url).await?;
        let result = self.interpret_listing(&url, &page)?;

        debug!(backend = %self.id, %mode, matches = result.len(), "search completed");
        Ok(result)
    }

    async fn get_person_by_id(&self, id: &str) -> Result<Option<Person>> {
        let (Some(template), Some(detail)) = (self.templates.person.as_deref(), &self.detail)
        else {
            debug!(backend = %self.id, "lookup by id not supported");
            return Ok(None);
        };

        let Some(url) = build_person_url(template, &self.base_url, id) else {
            return Ok(None);
        };

        let page = self.fetch_page(&url).await?;
        match detail.interpret(&page.body, id.trim()) {
            DetailPage::Blocked => Err(SearchError::Blocked {
                backend: self.id.clone(),
                url,
            }),
            DetailPage::Missing => {
                debug!(backend = %self.id, id, status = page.status, "no record on detail page");
                Ok(None)
            }
            DetailPage::Found(person) => Ok(Some(person)),
        }
    }

    async fn initialize(&self) -> Result<()> {
        match self.client.create_session().await {
            Ok(session) => {
                info!(backend = %self.id, %session, "backend ready");
                Ok(())
            }
            Err(e) => {
                error!(backend = %self.id, error = %e, "failed to establish bypass session");
                Err(e.into())
            }
        }
    }

    async fn shutdown(&self) {
        self.client.destroy_session().await;
    }
}
