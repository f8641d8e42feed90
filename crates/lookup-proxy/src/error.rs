//! Error types for the bypass-proxy client.

use thiserror::Error;

/// Errors raised while talking to the bypass proxy.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// The proxy service could not be reached
    #[error("bypass proxy unavailable: {0}")]
    Unavailable(String),

    /// The proxy answered a session command with a non-ok status
    #[error("bypass proxy rejected the request: {0}")]
    Rejected(String),

    /// The proxy answered a fetch with a non-ok status
    #[error("fetch failed: {0}")]
    FetchFailed(String),

    /// The HTTP exchange with the proxy exceeded its deadline
    #[error("fetch timed out after {timeout_ms}ms")]
    FetchTimedOut {
        /// Deadline that was exceeded, in milliseconds
        timeout_ms: u64,
    },

    /// Network-level failure other than an unreachable host
    #[error("transport error: {0}")]
    Transport(String),

    /// The proxy answered with JSON that does not match the protocol
    #[error("malformed proxy response: {0}")]
    MalformedResponse(String),

    /// A fetch was attempted before a session was created
    #[error("no bypass session has been established")]
    SessionNotEstablished,

    /// The session was destroyed and cannot be used or re-created
    #[error("bypass session has been destroyed")]
    SessionDestroyed,
}

impl ProxyError {
    /// Whether the error is network-level and worth retrying on a later call.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Unavailable(_) | Self::Transport(_) | Self::FetchTimedOut { .. }
        )
    }

    /// Fold network-level failures into [`ProxyError::Unavailable`].
    ///
    /// Used for session commands, where any transport failure means the
    /// service cannot be used at all.
    #[must_use]
    pub fn into_unavailable(self) -> Self {
        match self {
            Self::Transport(message) => Self::Unavailable(message),
            Self::FetchTimedOut { timeout_ms } => {
                Self::Unavailable(format!("no answer within {timeout_ms}ms"))
            }
            other => other,
        }
    }
}

/// Result type alias for proxy operations.
pub type Result<T> = std::result::Result<T, ProxyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProxyError::FetchTimedOut { timeout_ms: 75_000 };
        assert_eq!(err.to_string(), "fetch timed out after 75000ms");

        let err = ProxyError::Rejected("Error creating session".to_string());
        assert!(err.to_string().contains("Error creating session"));
    }

    #[test]
    fn test_transient_classification() {
        assert!(ProxyError::Unavailable("refused".to_string()).is_transient());
        assert!(ProxyError::FetchTimedOut { timeout_ms: 1 }.is_transient());
        assert!(!ProxyError::FetchFailed("challenge".to_string()).is_transient());
        assert!(!ProxyError::SessionDestroyed.is_transient());
    }

    #[test]
    fn test_into_unavailable() {
        let err = ProxyError::Transport("reset by peer".to_string()).into_unavailable();
        assert!(matches!(err, ProxyError::Unavailable(m) if m == "reset by peer"));

        let err = ProxyError::Rejected("nope".to_string()).into_unavailable();
        assert!(matches!(err, ProxyError::Rejected(_)));
    }
}
