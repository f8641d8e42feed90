//! Source definition types and structures.
//!
//! This module defines the data structures for source definitions loaded from TOML files.

use crate::error::{Result, SourceError};
use chrono::NaiveDate;
use lookup_core::{SearchCapabilities, SearchMode, SourceId};
use serde::{Deserialize, Serialize};

/// Complete source definition loaded from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDefinition {
    /// Core source metadata
    pub source: SourceMetadata,

    /// How raw pages are obtained
    pub acquisition: AcquisitionMethod,

    /// Selectors for search result listings
    pub listing: ListingSelectors,

    /// Selectors for single-record detail pages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<DetailSelectors>,
}

impl SourceDefinition {
    /// Get the source ID.
    #[must_use]
    pub fn id(&self) -> &SourceId {
        &self.source.id
    }

    /// Get the source name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.source.name
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.source.url.trim_end_matches('/')
    }

    /// Search modes and lookups this definition can answer.
    #[must_use]
    pub fn capabilities(&self) -> SearchCapabilities {
        match &self.acquisition {
            AcquisitionMethod::BypassProxy { templates } => {
                let mut caps = SearchCapabilities::with_modes(
                    SearchMode::ALL
                        .into_iter()
                        .filter(|mode| templates.for_mode(*mode).is_some()),
                );
                caps.set_lookup_by_id(templates.person.is_some() && self.detail.is_some());
                caps
            }
            AcquisitionMethod::Automation { modes, .. } => {
                SearchCapabilities::with_modes(modes.iter().copied())
            }
        }
    }

    /// Validate the source definition for completeness and correctness.
    pub fn validate(&self) -> Result<()> {
        let id = &self.source.id;

        if self.source.name.is_empty() {
            return Err(invalid(id, "source name cannot be empty"));
        }

        if !self.source.url.starts_with("http://") && !self.source.url.starts_with("https://") {
            return Err(invalid(
                id,
                format!("source url must be http(s), got '{}'", self.source.url),
            ));
        }

        self.acquisition.validate(id, self.detail.is_some())?;
        self.listing.validate(id)?;

        if let Some(detail) = &self.detail {
            if detail.name.is_empty() {
                return Err(invalid(id, "detail.name selector cannot be empty"));
            }
        }

        Ok(())
    }
}

fn invalid(id: &SourceId, reason: impl Into<String>) -> SourceError {
    SourceError::ValidationError {
        source_id: id.to_string(),
        reason: reason.into(),
    }
}

/// Core source metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// Unique source identifier (e.g., "cyber-background-checks")
    pub id: SourceId,

    /// Human-readable source name
    pub name: String,

    /// Site base URL, substituted for `{base}` in templates
    pub url: String,

    /// Merge priority; lower values contribute first
    #[serde(default = "default_priority")]
    pub priority: u32,

    /// Disabled sources are loaded but never queried
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Date when the selectors were last checked against the live site
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_verified: Option<NaiveDate>,
}

fn default_priority() -> u32 {
    100
}

fn default_enabled() -> bool {
    true
}

/// Content-acquisition strategies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "kebab-case")]
pub enum AcquisitionMethod {
    /// Fetch URL templates through the anti-bot bypass proxy
    BypassProxy {
        /// URL templates per search mode
        templates: UrlTemplates,
    },

    /// Drive a browser through the site's search form
    Automation {
        /// Page holding the search form
        form_url: String,
        /// Selector for the query input (first match is used)
        #[serde(default = "default_input_selector")]
        input_selector: String,
        /// Selector for the submit control (first match is used)
        #[serde(default = "default_submit_selector")]
        submit_selector: String,
        /// Modes the form answers
        #[serde(default = "default_automation_modes")]
        modes: Vec<SearchMode>,
    },
}

fn default_input_selector() -> String {
    "input".to_string()
}

fn default_submit_selector() -> String {
    "button".to_string()
}

fn default_automation_modes() -> Vec<SearchMode> {
    vec![SearchMode::Name]
}

impl AcquisitionMethod {
    fn validate(&self, id: &SourceId, has_detail: bool) -> Result<()> {
        match self {
            Self::BypassProxy { templates } => {
                let mut any = false;
                for mode in SearchMode::ALL {
                    if let Some(template) = templates.for_mode(mode) {
                        any = true;
                        if !template.contains("{query}") {
                            return Err(invalid(
                                id,
                                format!("templates.{mode} must contain {{query}}"),
                            ));
                        }
                    }
                }

                if let Some(person) = &templates.person {
                    if !person.contains("{id}") {
                        return Err(invalid(id, "templates.person must contain {id}"));
                    }
                    if !has_detail {
                        return Err(invalid(
                            id,
                            "templates.person requires a [detail] selector section",
                        ));
                    }
                    any = true;
                }

                if !any {
                    return Err(invalid(id, "bypass-proxy requires at least one template"));
                }
            }
            Self::Automation {
                form_url,
                input_selector,
                submit_selector,
                modes,
            } => {
                if form_url.is_empty() {
                    return Err(invalid(id, "automation form_url cannot be empty"));
                }
                if input_selector.is_empty() || submit_selector.is_empty() {
                    return Err(invalid(id, "automation selectors cannot be empty"));
                }
                if modes.is_empty() {
                    return Err(invalid(id, "automation requires at least one mode"));
                }
            }
        }
        Ok(())
    }
}

/// URL templates per search mode.
///
/// Placeholders: `{base}` (source url), `{query}` (encoded query), `{id}`
/// (encoded record id, person template only). A missing template means the
/// mode is unsupported.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UrlTemplates {
    /// Search by name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Search by address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Search by phone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Search by email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Detail page for one record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person: Option<String>,
}

impl UrlTemplates {
    /// Template for a search mode, if the source supports it.
    #[must_use]
    pub fn for_mode(&self, mode: SearchMode) -> Option<&str> {
        match mode {
            SearchMode::Name => self.name.as_deref(),
            SearchMode::Address => self.address.as_deref(),
            SearchMode::Phone => self.phone.as_deref(),
            SearchMode::Email => self.email.as_deref(),
        }
    }
}

/// CSS selectors for a search results page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingSelectors {
    /// One match per result card
    pub record: String,
    /// Link inside a card whose href ends in the record id
    pub link: String,
    /// Name inside a card
    pub name: String,
    /// Age inside a card
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
    /// Address inside a card
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Present when the site reports no matches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_results: Option<String>,
    /// Present when the site served a challenge or block page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked: Option<String>,
}

impl ListingSelectors {
    fn validate(&self, id: &SourceId) -> Result<()> {
        if self.record.is_empty() || self.link.is_empty() || self.name.is_empty() {
            return Err(invalid(
                id,
                "listing.record, listing.link and listing.name are required",
            ));
        }
        Ok(())
    }
}

/// CSS selectors for a single-record detail page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailSelectors {
    /// Name; its absence marks the page as not a detail page
    pub name: String,
    /// Age
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
    /// Address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Phone number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Email address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Present when the site served a challenge or block page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked: Option<String>,
}
