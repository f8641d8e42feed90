//! Builds backends and the orchestrator from source definitions.

use crate::backend::SearchBackend;
use crate::backends::{AutomationBackend, ProxyBackend};
use crate::error::Result;
use crate::orchestrator::SearchOrchestrator;
use lookup_browser::{ChromiumLauncher, DriverLauncher};
use lookup_core::AppConfig;
use lookup_proxy::{BypassClient, ProxyTransport};
use lookup_sources::{AcquisitionMethod, SourceDefinition, SourceRegistry};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Turns source definitions into live backends.
///
/// Every proxy backend gets its own [`BypassClient`] and therefore its own
/// session, even when the transport is shared.
pub struct BackendFactory {
    config: AppConfig,
    transport: Option<Arc<dyn ProxyTransport>>,
    launcher: Arc<dyn DriverLauncher>,
}

impl BackendFactory {
    /// Create a factory using HTTP for the proxy and Chromium for automation.
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        let launcher = Arc::new(ChromiumLauncher::new(&config.browser));
        Self {
            config,
            transport: None,
            launcher,
        }
    }

    /// Send proxy commands over `transport` instead of HTTP.
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn ProxyTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Launch automation browsers with `launcher` instead of Chromium.
    #[must_use]
    pub fn with_launcher(mut self, launcher: Arc<dyn DriverLauncher>) -> Self {
        self.launcher = launcher;
        self
    }

    /// Build the backend for one definition.
    pub fn build(&self, definition: &SourceDefinition) -> Result<Arc<dyn SearchBackend>> {
        let backend: Arc<dyn SearchBackend> = match &definition.acquisition {
            AcquisitionMethod::BypassProxy { .. } => {
                Arc::new(ProxyBackend::new(definition, self.bypass_client()?)?)
            }
            AcquisitionMethod::Automation { .. } => Arc::new(AutomationBackend::new(
                definition,
                Arc::clone(&self.launcher),
                self.config.browser.wait_timeout(),
            )?),
        };
        Ok(backend)
    }

    /// Build backends for every enabled definition, in priority order.
    ///
    /// Definitions that cannot be turned into a backend, for example because
    /// a selector does not parse, are skipped with a warning.
    pub fn build_all(&self, registry: &SourceRegistry) -> Vec<Arc<dyn SearchBackend>> {
        registry
            .enabled()
            .iter()
            .filter_map(|definition| match self.build(definition) {
                Ok(backend) => Some(backend),
                Err(e) => {
                    warn!(source = %definition.id(), error = %e, "skipping source");
                    None
                }
            })
            .collect()
    }

    /// Build an orchestrator over every enabled definition.
    pub fn orchestrator(&self, registry: &SourceRegistry) -> SearchOrchestrator {
        let backends = self.build_all(registry);
        info!(backends = backends.len(), "search orchestrator ready");
        SearchOrchestrator::new(backends).with_backend_timeout(self.config.search.backend_timeout())
    }

    fn bypass_client(&self) -> Result<BypassClient> {
        let client = match &self.transport {
            Some(transport) => BypassClient::new(Arc::clone(transport))
                .with_default_timeout(self.config.proxy.max_timeout())
                .with_request_grace(Duration::from_secs(self.config.proxy.request_grace_secs)),
            None => BypassClient::from_config(&self.config.proxy)?,
        };
        Ok(client)
    }
}
