//! Transport seam between the client and the proxy service.

use crate::error::{ProxyError, Result};
use crate::wire::{ProxyCommand, ProxyResponse};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Delivers one protocol command and returns the decoded response.
///
/// Implementations only report network and decoding failures; a response
/// with `"status": "error"` is a successful exchange and is interpreted by
/// the caller.
#[async_trait]
pub trait ProxyTransport: Send + Sync {
    /// Send `command` and wait at most `timeout` for the answer.
    async fn send(&self, command: &ProxyCommand, timeout: Duration) -> Result<ProxyResponse>;
}

/// [`ProxyTransport`] that POSTs JSON over HTTP.
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    /// Create a transport for the given command endpoint, e.g.
    /// `http://localhost:8191/v1`.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| ProxyError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// The endpoint commands are sent to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ProxyTransport for HttpTransport {
    async fn send(&self, command: &ProxyCommand, timeout: Duration) -> Result<ProxyResponse> {
        tracing::trace!(cmd = command.name(), endpoint = %self.endpoint, "sending proxy command");

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(timeout)
            .json(command)
            .send()
            .await
            .map_err(|e| classify(&e, timeout))?;

        // The proxy reports command failures as HTTP 500 with a JSON body,
        // so the body is decoded before the HTTP status is looked at.
        let status = response.status();
        let body = response.text().await.map_err(|e| classify(&e, timeout))?;

        match serde_json::from_str::<ProxyResponse>(&body) {
            Ok(decoded) => Ok(decoded),
            Err(_) if !status.is_success() => Err(ProxyError::Transport(format!(
                "HTTP {}: {}",
                status.as_u16(),
                truncate(&body, 200)
            ))),
            Err(e) => Err(ProxyError::MalformedResponse(e.to_string())),
        }
    }
}

fn classify(error: &reqwest::Error, timeout: Duration) -> ProxyError {
    if error.is_timeout() {
        ProxyError::FetchTimedOut {
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    } else if error.is_connect() {
        ProxyError::Unavailable(error.to_string())
    } else {
        ProxyError::Transport(error.to_string())
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
