//! Session-scoped client for the bypass proxy.

use crate::error::{ProxyError, Result};
use crate::transport::{HttpTransport, ProxyTransport};
use crate::wire::ProxyCommand;
use lookup_core::ProxyConfig;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Timeout applied to session commands, which never wait on a target site.
const SESSION_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Opaque session id issued by the proxy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// The raw id string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A page fetched through the proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    /// Final URL after redirects
    pub url: String,
    /// HTTP status reported by the target site
    pub status: u16,
    /// Rendered HTML
    pub body: String,
    /// User agent the proxy presented to the target
    pub user_agent: String,
}

#[derive(Debug)]
enum SessionState {
    Idle,
    Active(SessionId),
    Destroyed,
}

/// Client owning at most one proxy session.
///
/// The session moves through `idle -> active -> destroyed`. Creation happens
/// at most once and is serialized with fetches, so a fetch never observes a
/// half-created session. Once destroyed the client stays destroyed.
pub struct BypassClient {
    transport: Arc<dyn ProxyTransport>,
    state: RwLock<SessionState>,
    default_timeout: Duration,
    request_grace: Duration,
}

impl BypassClient {
    /// Create a client over an arbitrary transport.
    #[must_use]
    pub fn new(transport: Arc<dyn ProxyTransport>) -> Self {
        let defaults = ProxyConfig::default();
        Self {
            transport,
            state: RwLock::new(SessionState::Idle),
            default_timeout: defaults.max_timeout(),
            request_grace: Duration::from_secs(defaults.request_grace_secs),
        }
    }

    /// Create an HTTP-backed client from configuration.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn from_config(config: &ProxyConfig) -> Result<Self> {
        let transport = HttpTransport::new(config.endpoint.clone())?;
        Ok(Self::new(Arc::new(transport))
            .with_default_timeout(config.max_timeout())
            .with_request_grace(Duration::from_secs(config.request_grace_secs)))
    }

    /// Set the proxy-side timeout used when a fetch does not name one.
    #[must_use]
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Set the extra time the HTTP exchange may take beyond the proxy-side
    /// timeout before it is abandoned.
    #[must_use]
    pub fn with_request_grace(mut self, grace: Duration) -> Self {
        self.request_grace = grace;
        self
    }

    /// Proxy-side timeout used when a fetch does not name one.
    #[must_use]
    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Id of the live session, if one is active.
    pub async fn session_id(&self) -> Option<SessionId> {
        match &*self.state.read().await {
            SessionState::Active(id) => Some(id.clone()),
            SessionState::Idle | SessionState::Destroyed => None,
        }
    }

    /// Whether the session has been destroyed.
    pub async fn is_destroyed(&self) -> bool {
        matches!(&*self.state.read().await, SessionState::Destroyed)
    }

    /// Create the proxy session, or return the one already created.
    ///
    /// A failed attempt leaves the client idle so it can be retried.
    ///
    /// # Errors
    /// - [`ProxyError::Unavailable`] if the proxy cannot be reached
    /// - [`ProxyError::Rejected`] if the proxy refuses or returns no id
    /// - [`ProxyError::SessionDestroyed`] after [`Self::destroy_session`]
    pub async fn create_session(&self) -> Result<SessionId> {
        let mut state = self.state.write().await;
        match &*state {
            SessionState::Active(id) => return Ok(id.clone()),
            SessionState::Destroyed => return Err(ProxyError::SessionDestroyed),
            SessionState::Idle => {}
        }

        let response = self
            .transport
            .send(&ProxyCommand::SessionCreate, SESSION_COMMAND_TIMEOUT)
            .await
            .map_err(ProxyError::into_unavailable)?;

        if !response.is_ok() {
            return Err(ProxyError::Rejected(response.message));
        }

        let id = match response.session {
            Some(id) if !id.is_empty() => SessionId(id),
            _ => {
                return Err(ProxyError::Rejected(
                    "proxy returned no session id".to_string(),
                ))
            }
        };

        info!(session = %id, "bypass session created");
        *state = SessionState::Active(id.clone());
        Ok(id)
    }

    /// Fetch `url` inside the active session.
    ///
    /// `timeout` bounds the time the proxy may spend on the page and defaults
    /// to [`Self::default_timeout`]. A non-2xx status from the target site is
    /// returned as a document, not an error.
    ///
    /// # Errors
    /// - [`ProxyError::SessionNotEstablished`] before [`Self::create_session`]
    /// - [`ProxyError::SessionDestroyed`] after [`Self::destroy_session`]
    /// - [`ProxyError::FetchFailed`] if the proxy reports an error
    /// - [`ProxyError::FetchTimedOut`] if the exchange exceeds its deadline
    pub async fn fetch(&self, url: &str, timeout: Option<Duration>) -> Result<RawDocument> {
        // The read guard is held for the whole request so destruction waits
        // for in-flight fetches.
        let state = self.state.read().await;
        let session = match &*state {
            SessionState::Active(id) => id.clone(),
            SessionState::Idle => return Err(ProxyError::SessionNotEstablished),
            SessionState::Destroyed => return Err(ProxyError::SessionDestroyed),
        };

        let timeout = timeout.unwrap_or(self.default_timeout);
        let command = ProxyCommand::RequestGet {
            url: url.to_string(),
            session: Some(session.0.clone()),
            max_timeout: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        };

        debug!(url, session = %session, "fetching through bypass proxy");
        let response = self
            .transport
            .send(&command, timeout + self.request_grace)
            .await?;
        drop(state);

        if !response.is_ok() {
            return Err(ProxyError::FetchFailed(response.message));
        }

        let solution = response.solution.ok_or_else(|| {
            ProxyError::MalformedResponse("ok response carried no solution".to_string())
        })?;

        debug!(
            url = %solution.url,
            status = solution.status,
            bytes = solution.response.len(),
            "page fetched"
        );

        Ok(RawDocument {
            url: solution.url,
            status: solution.status,
            body: solution.response,
            user_agent: solution.user_agent,
        })
    }

    /// Destroy the session.
    ///
    /// Idempotent and best-effort: a failure to reach the proxy is logged
    /// and the client is marked destroyed regardless.
    pub async fn destroy_session(&self) {
        let mut state = self.state.write().await;
        let previous = std::mem::replace(&mut *state, SessionState::Destroyed);

        let SessionState::Active(id) = previous else {
            return;
        };

        let command = ProxyCommand::SessionDestroy {
            session: id.0.clone(),
        };
        match self.transport.send(&command, SESSION_COMMAND_TIMEOUT).await {
            Ok(response) if response.is_ok() => {
                info!(session = %id, "bypass session destroyed");
            }
            Ok(response) => {
                warn!(
                    session = %id,
                    message = %response.message,
                    "proxy refused to destroy session"
                );
            }
            Err(e) => {
                warn!(session = %id, error = %e, "failed to destroy bypass session");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{ProxyResponse, ProxyStatus, Solution};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Default)]
    struct ScriptedTransport {
        replies: Mutex<VecDeque<Result<ProxyResponse>>>,
        sent: Mutex<Vec<(ProxyCommand, Duration)>>,
    }

    impl ScriptedTransport {
        fn reply(self, response: Result<ProxyResponse>) -> Self {
            self.replies.lock().unwrap().push_back(response);
            self
        }

        fn sent(&self) -> Vec<ProxyCommand> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .map(|(cmd, _)| cmd.clone())
                .collect()
        }
    }

    #[async_trait::async_trait]
    impl ProxyTransport for ScriptedTransport {
        async fn send(&self, command: &ProxyCommand, timeout: Duration) -> Result<ProxyResponse> {
            self.sent.lock().unwrap().push((command.clone(), timeout));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ProxyError::Unavailable("script exhausted".to_string())))
        }
    }

    fn session_ok(id: &str) -> Result<ProxyResponse> {
        Ok(ProxyResponse {
            status: ProxyStatus::Ok,
            message: String::new(),
            session: Some(id.to_string()),
            solution: None,
        })
    }

    fn page_ok(url: &str, status: u16, body: &str) -> Result<ProxyResponse> {
        Ok(ProxyResponse {
            status: ProxyStatus::Ok,
            message: "Challenge not detected!".to_string(),
            session: None,
            solution: Some(Solution {
                url: url.to_string(),
                status,
                response: body.to_string(),
                user_agent: "Mozilla/5.0".to_string(),
            }),
        })
    }

    fn proxy_error(message: &str) -> Result<ProxyResponse> {
        Ok(ProxyResponse {
            status: ProxyStatus::Error,
            message: message.to_string(),
            session: None,
            solution: None,
        })
    }

    fn client(transport: &Arc<ScriptedTransport>) -> BypassClient {
        BypassClient::new(transport.clone())
    }

    #[tokio::test]
    async fn test_create_session_once() {
        let transport = Arc::new(ScriptedTransport::default().reply(session_ok("s-1")));
        let client = client(&transport);

        let first = client.create_session().await.unwrap();
        let second = client.create_session().await.unwrap();

        assert_eq!(first.as_str(), "s-1");
        assert_eq!(first, second);
        assert_eq!(transport.sent(), vec![ProxyCommand::SessionCreate]);
        assert_eq!(client.session_id().await, Some(first));
    }

    #[tokio::test]
    async fn test_create_session_rejected() {
        let transport = Arc::new(ScriptedTransport::default().reply(proxy_error("busy")));
        let client = client(&transport);

        let err = client.create_session().await.unwrap_err();
        assert!(matches!(err, ProxyError::Rejected(m) if m == "busy"));
        assert!(client.session_id().await.is_none());
    }

    #[tokio::test]
    async fn test_create_session_without_id_rejected() {
        let transport = Arc::new(ScriptedTransport::default().reply(Ok(ProxyResponse {
            status: ProxyStatus::Ok,
            message: String::new(),
            session: None,
            solution: None,
        })));
        let client = client(&transport);

        assert!(matches!(
            client.create_session().await,
            Err(ProxyError::Rejected(_))
        ));
    }

    #[tokio::test]
    async fn test_create_session_unreachable_then_retry() {
        let transport = Arc::new(
            ScriptedTransport::default()
                .reply(Err(ProxyError::Transport("connection reset".to_string())))
                .reply(session_ok("s-2")),
        );
        let client = client(&transport);

        let err = client.create_session().await.unwrap_err();
        assert!(matches!(err, ProxyError::Unavailable(_)));

        let id = client.create_session().await.unwrap();
        assert_eq!(id.as_str(), "s-2");
    }

    #[tokio::test]
    async fn test_fetch_before_session() {
        let transport = Arc::new(ScriptedTransport::default());
        let client = client(&transport);

        let err = client.fetch("https://example.com", None).await.unwrap_err();
        assert!(matches!(err, ProxyError::SessionNotEstablished));
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_uses_session_and_timeout() {
        let transport = Arc::new(
            ScriptedTransport::default()
                .reply(session_ok("s-1"))
                .reply(page_ok("https://example.com/a", 200, "<html></html>")),
        );
        let client = BypassClient::new(transport.clone())
            .with_default_timeout(Duration::from_secs(60))
            .with_request_grace(Duration::from_secs(15));

        client.create_session().await.unwrap();
        let page = client.fetch("https://example.com/a", None).await.unwrap();

        assert_eq!(page.status, 200);
        assert_eq!(page.body, "<html></html>");
        assert_eq!(page.user_agent, "Mozilla/5.0");

        let sent = transport.sent.lock().unwrap();
        let (command, http_timeout) = &sent[1];
        assert_eq!(
            command,
            &ProxyCommand::RequestGet {
                url: "https://example.com/a".to_string(),
                session: Some("s-1".to_string()),
                max_timeout: 60_000,
            }
        );
        assert_eq!(*http_timeout, Duration::from_secs(75));
    }

    #[tokio::test]
    async fn test_fetch_explicit_timeout() {
        let transport = Arc::new(
            ScriptedTransport::default()
                .reply(session_ok("s-1"))
                .reply(page_ok("https://example.com/", 200, "")),
        );
        let client = client(&transport);

        client.create_session().await.unwrap();
        client
            .fetch("https://example.com/", Some(Duration::from_millis(2500)))
            .await
            .unwrap();

        assert!(matches!(
            &transport.sent()[1],
            ProxyCommand::RequestGet { max_timeout: 2500, .. }
        ));
    }

    #[tokio::test]
    async fn test_fetch_target_error_status_is_document() {
        let transport = Arc::new(
            ScriptedTransport::default()
                .reply(session_ok("s-1"))
                .reply(page_ok("https://example.com/missing", 404, "Not Found")),
        );
        let client = client(&transport);

        client.create_session().await.unwrap();
        let page = client
            .fetch("https://example.com/missing", None)
            .await
            .unwrap();
        assert_eq!(page.status, 404);
    }

    #[tokio::test]
    async fn test_fetch_proxy_error() {
        let transport = Arc::new(
            ScriptedTransport::default()
                .reply(session_ok("s-1"))
                .reply(proxy_error("Error solving the challenge.")),
        );
        let client = client(&transport);

        client.create_session().await.unwrap();
        let err = client.fetch("https://example.com", None).await.unwrap_err();
        assert!(matches!(err, ProxyError::FetchFailed(m) if m.contains("challenge")));
    }

    #[tokio::test]
    async fn test_fetch_timeout_propagates() {
        let transport = Arc::new(
            ScriptedTransport::default()
                .reply(session_ok("s-1"))
                .reply(Err(ProxyError::FetchTimedOut { timeout_ms: 75_000 })),
        );
        let client = client(&transport);

        client.create_session().await.unwrap();
        let err = client.fetch("https://example.com", None).await.unwrap_err();
        assert!(matches!(err, ProxyError::FetchTimedOut { timeout_ms: 75_000 }));
    }

    #[tokio::test]
    async fn test_ok_without_solution_is_malformed() {
        let transport = Arc::new(
            ScriptedTransport::default()
                .reply(session_ok("s-1"))
                .reply(session_ok("unexpected")),
        );
        let client = client(&transport);

        client.create_session().await.unwrap();
        assert!(matches!(
            client.fetch("https://example.com", None).await,
            Err(ProxyError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_destroy_is_idempotent() {
        let transport = Arc::new(
            ScriptedTransport::default()
                .reply(session_ok("s-1"))
                .reply(session_ok("s-1")),
        );
        let client = client(&transport);

        client.create_session().await.unwrap();
        client.destroy_session().await;
        client.destroy_session().await;

        let sent = transport.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(
            sent[1],
            ProxyCommand::SessionDestroy {
                session: "s-1".to_string()
            }
        );
        assert!(client.is_destroyed().await);
    }

    #[tokio::test]
    async fn test_destroy_without_session_sends_nothing() {
        let transport = Arc::new(ScriptedTransport::default());
        let client = client(&transport);

        client.destroy_session().await;

        assert!(transport.sent().is_empty());
        assert!(client.is_destroyed().await);
    }

    #[tokio::test]
    async fn test_destroy_failure_is_swallowed() {
        let transport = Arc::new(
            ScriptedTransport::default()
                .reply(session_ok("s-1"))
                .reply(Err(ProxyError::Unavailable("gone".to_string()))),
        );
        let client = client(&transport);

        client.create_session().await.unwrap();
        client.destroy_session().await;

        assert!(client.is_destroyed().await);
    }

    #[tokio::test]
    async fn test_no_use_after_destroy() {
        let transport = Arc::new(
            ScriptedTransport::default()
                .reply(session_ok("s-1"))
                .reply(session_ok("s-1")),
        );
        let client = client(&transport);

        client.create_session().await.unwrap();
        client.destroy_session().await;

        assert!(matches!(
            client.fetch("https://example.com", None).await,
            Err(ProxyError::SessionDestroyed)
        ));
        assert!(matches!(
            client.create_session().await,
            Err(ProxyError::SessionDestroyed)
        ));
        assert_eq!(transport.sent().len(), 2);
    }

    /// Answers every command successfully after a per-command delay and
    /// records when each exchange starts and ends.
    #[derive(Default)]
    struct PacedTransport {
        delays: Vec<(&'static str, Duration)>,
        log: Mutex<Vec<String>>,
    }

    impl PacedTransport {
        fn delay(mut self, command: &'static str, delay: Duration) -> Self {
            self.delays.push((command, delay));
            self
        }

        fn log(&self) -> Vec<String> {
            self.log.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl ProxyTransport for PacedTransport {
        async fn send(&self, command: &ProxyCommand, _timeout: Duration) -> Result<ProxyResponse> {
            let name = command.name();
            self.log.lock().unwrap().push(format!("start {name}"));

            let delay = self
                .delays
                .iter()
                .find(|(cmd, _)| *cmd == name)
                .map_or(Duration::ZERO, |(_, delay)| *delay);
            tokio::time::sleep(delay).await;

            self.log.lock().unwrap().push(format!("end {name}"));
            match command {
                ProxyCommand::RequestGet { url, .. } => page_ok(url, 200, "<html></html>"),
                ProxyCommand::SessionCreate | ProxyCommand::SessionDestroy { .. } => {
                    session_ok("s-1")
                }
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_destroy_waits_for_inflight_fetch() {
        let transport = Arc::new(
            PacedTransport::default().delay("request.get", Duration::from_secs(5)),
        );
        let client = Arc::new(BypassClient::new(transport.clone()));
        client.create_session().await.unwrap();

        let slow = tokio::spawn({
            let client = Arc::clone(&client);
            async move { client.fetch("https://example.com/slow", None).await }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;

        let destroy = tokio::spawn({
            let client = Arc::clone(&client);
            async move { client.destroy_session().await }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;

        let late = tokio::spawn({
            let client = Arc::clone(&client);
            async move { client.fetch("https://example.com/late", None).await }
        });

        let slow = slow.await.unwrap();
        destroy.await.unwrap();
        let late = late.await.unwrap();

        assert_eq!(slow.unwrap().url, "https://example.com/slow");
        assert!(matches!(late, Err(ProxyError::SessionDestroyed)));
        assert_eq!(
            transport.log(),
            vec![
                "start sessions.create",
                "end sessions.create",
                "start request.get",
                "end request.get",
                "start sessions.destroy",
                "end sessions.destroy",
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_waits_for_pending_session_create() {
        let transport = Arc::new(
            PacedTransport::default().delay("sessions.create", Duration::from_secs(5)),
        );
        let client = Arc::new(BypassClient::new(transport.clone()));

        let create = tokio::spawn({
            let client = Arc::clone(&client);
            async move { client.create_session().await }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;

        let fetch = tokio::spawn({
            let client = Arc::clone(&client);
            async move { client.fetch("https://example.com/a", None).await }
        });

        let id = create.await.unwrap().unwrap();
        let page = fetch.await.unwrap().unwrap();

        assert_eq!(id.as_str(), "s-1");
        assert_eq!(page.url, "https://example.com/a");
        assert_eq!(
            transport.log(),
            vec![
                "start sessions.create",
                "end sessions.create",
                "start request.get",
                "end request.get",
            ]
        );
    }
}
