//! Backend that drives a site's search form in a fresh browser per query.

use crate::backend::SearchBackend;
use crate::error::{Result, SearchError};
use crate::extract::{ListingExtractor, ListingPage};
use async_trait::async_trait;
use lookup_browser::{AutomationDriver, BrowserError, DriverLauncher, DriverSession};
use lookup_core::{Person, SearchCapabilities, SearchMode, SearchResult, SourceId};
use lookup_sources::{AcquisitionMethod, SourceDefinition};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// A source searched by filling in its form in a real browser.
///
/// Every query launches its own browser and releases it on every exit path;
/// nothing is shared between queries. Lookup by id is never supported.
pub struct AutomationBackend {
    id: SourceId,
    form_url: String,
    input_selector: String,
    submit_selector: String,
    record_selector: String,
    capabilities: SearchCapabilities,
    listing: ListingExtractor,
    launcher: Arc<dyn DriverLauncher>,
    wait_timeout: Duration,
}

impl AutomationBackend {
    /// Build a backend for an `automation` definition.
    pub fn new(
        definition: &SourceDefinition,
        launcher: Arc<dyn DriverLauncher>,
        wait_timeout: Duration,
    ) -> Result<Self> {
        let AcquisitionMethod::Automation {
            form_url,
            input_selector,
            submit_selector,
            ..
        } = &definition.acquisition
        else {
            return Err(lookup_sources::SourceError::ValidationError {
                source_id: definition.id().to_string(),
                reason: "automation backend requires the automation strategy".to_string(),
            }
            .into());
        };

        Ok(Self {
            id: definition.id().clone(),
            form_url: form_url.clone(),
            input_selector: input_selector.clone(),
            submit_selector: submit_selector.clone(),
            record_selector: definition.listing.record.clone(),
            capabilities: definition.capabilities(),
            listing: ListingExtractor::new(&definition.listing)?,
            launcher,
            wait_timeout,
        })
    }

    /// Fill in and submit the form, returning the rendered result page.
    async fn submit_form(&self, driver: &dyn AutomationDriver, query: &str) -> Result<String> {
        driver.navigate(&self.form_url).await?;
        driver
            .wait_for_selector(&self.input_selector, self.wait_timeout)
            .await?;
        driver.fill_field(&self.input_selector, query).await?;
        driver.click(&self.submit_selector).await?;

        match driver
            .wait_for_selector(&self.record_selector, self.wait_timeout)
            .await
        {
            Ok(()) => {}
            Err(BrowserError::Timeout { .. }) => {
                debug!(backend = %self.id, "no result records appeared, reading page as is");
            }
            Err(e) => return Err(e.into()),
        }

        Ok(driver.content().await?)
    }
}

#[async_trait]
impl SearchBackend for AutomationBackend {
    fn id(&self) -> &SourceId {
        &self.id
    }

    fn capabilities(&self) -> &SearchCapabilities {
        &self.capabilities
    }

    async fn search(&self, mode: SearchMode, query: &str) -> Result<SearchResult> {
        if !self.capabilities.supports(mode) {
            debug!(backend = %self.id, %mode, "search mode not supported, returning no matches");
            return Ok(SearchResult::empty());
        }

        let query = query.trim();
        if query.is_empty() {
            debug!(backend = %self.id, %mode, "blank query, returning no matches");
            return Ok(SearchResult::empty());
        }

        let session = DriverSession::open(self.launcher.as_ref()).await?;
        let outcome = self.submit_form(session.driver(), query).await;
        session.release().await;

        let html = outcome?;
        let result = match self.listing.interpret(&html) {
            ListingPage::Blocked => {
                return Err(SearchError::Blocked {
                    backend: self.id.clone(),
                    url: self.form_url.clone(),
                })
            }
            ListingPage::NoResults => SearchResult::empty(),
            ListingPage::Matches(result) => result,
        };

        debug!(backend = %self.id, %mode, matches = result.len(), "search completed");
        Ok(result)
    }

    async fn get_person_by_id(&self, _id: &str) -> Result<Option<Person>> {
        debug!(backend = %self.id, "lookup by id not supported");
        Ok(None)
    }
}
