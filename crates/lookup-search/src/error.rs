use lookup_core::SourceId;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Backend {backend} is not initialized")]
    NotInitialized { backend: SourceId },

    #[error("Backend {backend} was blocked by an anti-bot page at {url}")]
    Blocked { backend: SourceId, url: String },

    #[error("Backend {backend} timed out after {timeout:?}")]
    TimedOut { backend: SourceId, timeout: Duration },

    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Proxy error: {0}")]
    Proxy(#[from] lookup_proxy::ProxyError),

    #[error("Browser error: {0}")]
    Browser(#[from] lookup_browser::BrowserError),

    #[error("Source error: {0}")]
    Source(#[from] lookup_sources::SourceError),
}

impl SearchError {
    /// Whether the same query could succeed on a later call.
    ///
    /// Timeouts and network-level proxy failures are retriable; a blocked
    /// page, a bad definition or a destroyed session is not.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        match self {
            Self::TimedOut { .. } => true,
            Self::Proxy(e) => e.is_transient(),
            Self::NotInitialized { .. }
            | Self::Blocked { .. }
            | Self::InvalidSelector { .. }
            | Self::Browser(_)
            | Self::Source(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;
