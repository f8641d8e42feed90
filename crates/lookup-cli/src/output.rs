//! JSON shapes printed to stdout.

use lookup_core::SearchResult;
use lookup_search::{BackendOutcome, SearchReport};
use lookup_sources::{AcquisitionMethod, SourceDefinition};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct OutcomeView {
    pub source: String,
    pub matches: usize,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&BackendOutcome> for OutcomeView {
    fn from(outcome: &BackendOutcome) -> Self {
        Self {
            source: outcome.backend.to_string(),
            matches: outcome.matches,
            elapsed_ms: u64::try_from(outcome.elapsed.as_millis()).unwrap_or(u64::MAX),
            error: outcome.error.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReportView<'a> {
    pub result: &'a SearchResult,
    pub sources: Vec<OutcomeView>,
}

impl<'a> From<&'a SearchReport> for ReportView<'a> {
    fn from(report: &'a SearchReport) -> Self {
        Self {
            result: &report.result,
            sources: report.backends.iter().map(OutcomeView::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SourceView {
    pub id: String,
    pub name: String,
    pub strategy: &'static str,
    pub priority: u32,
    pub enabled: bool,
    pub modes: Vec<&'static str>,
    pub lookup_by_id: bool,
}

impl From<&SourceDefinition> for SourceView {
    fn from(definition: &SourceDefinition) -> Self {
        let capabilities = definition.capabilities();
        Self {
            id: definition.id().to_string(),
            name: definition.name().to_string(),
            strategy: match definition.acquisition {
                AcquisitionMethod::BypassProxy { .. } => "bypass-proxy",
                AcquisitionMethod::Automation { .. } => "automation",
            },
            priority: definition.source.priority,
            enabled: definition.source.enabled,
            modes: capabilities.modes().iter().map(|m| m.as_str()).collect(),
            lookup_by_id: capabilities.supports_lookup(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lookup_core::{Person, SourceId};
    use std::time::Duration;

    #[test]
    fn test_report_view_shape() {
        let report = SearchReport {
            result: SearchResult::new(vec![Person::new("1", "John Smith")]),
            backends: vec![BackendOutcome {
                backend: SourceId::new("source-a").unwrap(),
                matches: 1,
                error: None,
                elapsed: Duration::from_millis(1500),
            }],
        };

        let value = serde_json::to_value(ReportView::from(&report)).unwrap();
        assert_eq!(value["result"]["matches"][0]["id"], "1");
        assert_eq!(value["sources"][0]["source"], "source-a");
        assert_eq!(value["sources"][0]["elapsed_ms"], 1500);
        assert!(value["sources"][0].get("error").is_none());
    }
}
