//! JSON wire format of the bypass-proxy protocol.
//!
//! Every command is a single JSON object POSTed to the proxy endpoint, with
//! the command name carried in the `cmd` field. Responses share one shape:
//! a `status` of `"ok"` or `"error"`, a human-readable `message`, and either
//! a `session` id (session commands) or a `solution` (fetch commands).

use serde::{Deserialize, Serialize};

/// A command sent to the bypass proxy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "cmd")]
pub enum ProxyCommand {
    /// Open a new browser session inside the proxy
    #[serde(rename = "sessions.create")]
    SessionCreate,

    /// Close a previously created session
    #[serde(rename = "sessions.destroy")]
    SessionDestroy {
        /// Session id returned by `sessions.create`
        session: String,
    },

    /// Fetch a URL, solving any challenge in the way
    #[serde(rename = "request.get")]
    RequestGet {
        /// Target URL
        url: String,
        /// Session to reuse; a throwaway browser is used when absent
        #[serde(skip_serializing_if = "Option::is_none")]
        session: Option<String>,
        /// Time the proxy may spend on the page, in milliseconds
        #[serde(rename = "maxTimeout")]
        max_timeout: u64,
    },
}

impl ProxyCommand {
    /// Protocol name of the command, as sent in the `cmd` field.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::SessionCreate => "sessions.create",
            Self::SessionDestroy { .. } => "sessions.destroy",
            Self::RequestGet { .. } => "request.get",
        }
    }
}

/// Outcome reported by the proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyStatus {
    /// Command succeeded
    Ok,
    /// Command failed; see the message
    Error,
    /// Any status this client does not know about
    #[serde(other)]
    Unknown,
}

/// Response body returned for every command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyResponse {
    /// Command outcome
    pub status: ProxyStatus,

    /// Human-readable detail, mostly useful on errors
    #[serde(default)]
    pub message: String,

    /// Session id, present on `sessions.create` responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,

    /// Fetched page, present on successful `request.get` responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution: Option<Solution>,
}

impl ProxyResponse {
    /// Whether the proxy reported success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == ProxyStatus::Ok
    }
}

/// The page the proxy fetched on our behalf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    /// Final URL after redirects
    pub url: String,

    /// HTTP status of the target site, not of the proxy
    pub status: u16,

    /// Rendered HTML
    #[serde(default)]
    pub response: String,

    /// User agent the proxy's browser presented
    #[serde(rename = "userAgent", default)]
    pub user_agent: String,
}
