//! Browser automation for form-driven people-search sites.
//!
//! Drives a real Chromium instance through a site's search form and hands
//! back the rendered result page. Every launched browser is owned by a
//! [`DriverSession`], which terminates it on every exit path.

pub mod actions;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod session;

pub use actions::{AutomationDriver, DriverLauncher};
pub use engine::{ChromiumDriver, ChromiumLauncher};
pub use error::{BrowserError, Result};
pub use fingerprint::FingerprintConfig;
pub use session::DriverSession;
