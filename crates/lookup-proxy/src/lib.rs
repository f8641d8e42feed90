//! Lookup Proxy - Client for the anti-bot bypass proxy.
//!
//! Some people-search sites sit behind browser-level challenges. Rather than
//! solving those locally, requests are routed through an external proxy
//! service that solves the challenge in a real browser and hands back the
//! rendered page. The service speaks a small JSON command protocol over a
//! single POST endpoint:
//!
//! - `sessions.create` / `sessions.destroy` manage a browser session whose
//!   solved challenge cookies are reused across fetches
//! - `request.get` fetches one URL, optionally inside a session
//!
//! [`BypassClient`] owns one session and hides its lifecycle from callers;
//! [`ProxyTransport`] is the seam to the network, with [`HttpTransport`] as
//! the reqwest implementation.
//!
//! # Example
//!
//! ```rust,no_run
//! use lookup_core::ProxyConfig;
//! use lookup_proxy::BypassClient;
//!
//! # async fn run() -> Result<(), lookup_proxy::ProxyError> {
//! let client = BypassClient::from_config(&ProxyConfig::default())?;
//! client.create_session().await?;
//!
//! let page = client.fetch("https://example.com/search/name/john-smith", None).await?;
//! println!("{} -> HTTP {}", page.url, page.status);
//!
//! client.destroy_session().await;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod client;
pub mod error;
pub mod transport;
pub mod wire;

pub use client::{BypassClient, RawDocument, SessionId};
pub use error::{ProxyError, Result};
pub use transport::{HttpTransport, ProxyTransport};
pub use wire::{ProxyCommand, ProxyResponse, ProxyStatus, Solution};
