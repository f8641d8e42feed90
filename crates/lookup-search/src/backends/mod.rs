//! Acquisition strategies behind [`SearchBackend`](crate::SearchBackend).

pub mod automation;
pub mod proxy;

pub use automation::AutomationBackend;
pub use proxy::ProxyBackend;
