//! Capability sets describing what a search backend can answer.
//!
//! The orchestrator fans every query out to every backend; a backend consults
//! its capability set and answers unsupported modes with an empty result
//! instead of failing.

use crate::types::SearchMode;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Search modes and lookups supported by one backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCapabilities {
    /// Supported search-by-field modes
    modes: HashSet<SearchMode>,
    /// Whether lookup-by-id is supported
    lookup_by_id: bool,
}

impl SearchCapabilities {
    /// A capability set with nothing supported.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Every search mode plus lookup-by-id.
    #[must_use]
    pub fn all() -> Self {
        Self {
            modes: SearchMode::ALL.into_iter().collect(),
            lookup_by_id: true,
        }
    }

    /// Build from a list of modes, without lookup-by-id.
    #[must_use]
    pub fn with_modes(modes: impl IntoIterator<Item = SearchMode>) -> Self {
        Self {
            modes: modes.into_iter().collect(),
            lookup_by_id: false,
        }
    }

    /// Enable a search mode.
    pub fn enable_mode(&mut self, mode: SearchMode) {
        tracing::debug!("Enabling search mode: {}", mode);
        self.modes.insert(mode);
    }

    /// Enable or disable lookup-by-id.
    pub fn set_lookup_by_id(&mut self, enabled: bool) {
        self.lookup_by_id = enabled;
    }

    /// Check whether a search mode is supported.
    #[must_use]
    pub fn supports(&self, mode: SearchMode) -> bool {
        self.modes.contains(&mode)
    }

    /// Check whether lookup-by-id is supported.
    #[must_use]
    pub fn supports_lookup(&self) -> bool {
        self.lookup_by_id
    }

    /// Supported modes in canonical order.
    #[must_use]
    pub fn modes(&self) -> Vec<SearchMode> {
        SearchMode::ALL
            .into_iter()
            .filter(|mode| self.supports(*mode))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_supports_nothing() {
        let caps = SearchCapabilities::none();
        assert!(SearchMode::ALL.iter().all(|m| !caps.supports(*m)));
        assert!(!caps.supports_lookup());
    }

    #[test]
    fn test_all_supports_everything() {
        let caps = SearchCapabilities::all();
        assert!(SearchMode::ALL.iter().all(|m| caps.supports(*m)));
        assert!(caps.supports_lookup());
    }

    #[test]
    fn test_with_modes() {
        let mut caps = SearchCapabilities::with_modes([SearchMode::Email, SearchMode::Name]);
        assert!(caps.supports(SearchMode::Name));
        assert!(!caps.supports(SearchMode::Phone));
        assert_eq!(caps.modes(), vec![SearchMode::Name, SearchMode::Email]);

        caps.enable_mode(SearchMode::Phone);
        caps.set_lookup_by_id(true);
        assert!(caps.supports(SearchMode::Phone));
        assert!(caps.supports_lookup());
    }
}
