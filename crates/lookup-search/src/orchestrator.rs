//! Search orchestrator fanning one query out to every backend.
//!
//! Backends run concurrently and independently. A backend that fails or
//! exceeds the per-backend timeout contributes nothing; the others are never
//! cancelled on its account. Contributions are concatenated in backend
//! priority order and deduplicated by structural equality, keeping the first
//! occurrence, so the merged order is deterministic even though completion
//! order is not.

use crate::backend::SearchBackend;
use crate::error::{Result, SearchError};
use futures::future::{self, BoxFuture, FutureExt};
use futures::stream::{FuturesUnordered, StreamExt};
use lookup_core::{Person, SearchMode, SearchResult, SourceId};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Default time after which a backend is abandoned for a query.
const DEFAULT_BACKEND_TIMEOUT: Duration = Duration::from_secs(120);

/// How one backend fared on one query.
#[derive(Debug, Clone)]
pub struct BackendOutcome {
    /// Backend that was queried
    pub backend: SourceId,
    /// Number of records it contributed before deduplication
    pub matches: usize,
    /// Error message if it failed or timed out
    pub error: Option<String>,
    /// Time until it answered or was abandoned
    pub elapsed: Duration,
}

impl BackendOutcome {
    /// Whether the backend answered successfully.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Merged result of a search plus one outcome per backend.
#[derive(Debug, Clone, Default)]
pub struct SearchReport {
    /// Merged, deduplicated records
    pub result: SearchResult,
    /// Per-backend outcomes in backend priority order
    pub backends: Vec<BackendOutcome>,
}

impl SearchReport {
    /// Outcomes of the backends that failed.
    pub fn failures(&self) -> impl Iterator<Item = &BackendOutcome> {
        self.backends.iter().filter(|outcome| !outcome.succeeded())
    }
}

struct Completed<T> {
    backend: SourceId,
    elapsed: Duration,
    outcome: Result<T>,
}

/// Runs queries against every configured backend.
pub struct SearchOrchestrator {
    /// Backends in priority order
    backends: Vec<Arc<dyn SearchBackend>>,
    /// Per-backend deadline for a single call
    backend_timeout: Duration,
}

impl SearchOrchestrator {
    /// Create an orchestrator over backends given in priority order.
    #[must_use]
    pub fn new(backends: Vec<Arc<dyn SearchBackend>>) -> Self {
        Self {
            backends,
            backend_timeout: DEFAULT_BACKEND_TIMEOUT,
        }
    }

    /// Set the per-backend timeout.
    #[must_use]
    pub fn with_backend_timeout(mut self, timeout: Duration) -> Self {
        self.backend_timeout = timeout;
        self
    }

    /// Backends in priority order.
    #[must_use]
    pub fn backends(&self) -> &[Arc<dyn SearchBackend>] {
        &self.backends
    }

    /// Initialize every backend concurrently.
    ///
    /// Returns the backends that failed; they keep refusing queries until a
    /// later call succeeds.
    pub async fn initialize(&self) -> Vec<(SourceId, SearchError)> {
        let completed = self
            .fan_out("initialize", |backend| {
                async move { backend.initialize().await }.boxed()
            })
            .await;

        completed
            .into_iter()
            .filter_map(|done| done.outcome.err().map(|e| (done.backend, e)))
            .collect()
    }

    /// Shut every backend down concurrently.
    pub async fn shutdown(&self) {
        future::join_all(self.backends.iter().map(|backend| backend.shutdown())).await;
        debug!(backends = self.backends.len(), "all backends shut down");
    }

    /// Search every backend by name.
    pub async fn search_by_name(&self, name: &str) -> SearchResult {
        self.search(SearchMode::Name, name).await
    }

    /// Search every backend by postal address.
    pub async fn search_by_address(&self, address: &str) -> SearchResult {
        self.search(SearchMode::Address, address).await
    }

    /// Search every backend by phone number.
    pub async fn search_by_phone(&self, phone: &str) -> SearchResult {
        self.search(SearchMode::Phone, phone).await
    }

    /// Search every backend by email address.
    pub async fn search_by_email(&self, email: &str) -> SearchResult {
        self.search(SearchMode::Email, email).await
    }

    /// Search every backend and return only the merged records.
    ///
    /// Never fails: if every backend fails the result is empty.
    pub async fn search(&self, mode: SearchMode, query: &str) -> SearchResult {
        self.search_with_report(mode, query).await.result
    }

    /// Search every backend and report how each one fared.
    pub async fn search_with_report(&self, mode: SearchMode, query: &str) -> SearchReport {
        let completed = self
            .fan_out(mode.as_str(), move |backend| {
                async move { backend.search(mode, query).await }.boxed()
            })
            .await;

        let mut merged = Vec::new();
        let mut backends = Vec::with_capacity(completed.len());

        for done in completed {
            let (matches, error) = match done.outcome {
                Ok(result) => {
                    let count = result.len();
                    merged.extend(result);
                    (count, None)
                }
                Err(e) => (0, Some(e.to_string())),
            };
            backends.push(BackendOutcome {
                backend: done.backend,
                matches,
                error,
                elapsed: done.elapsed,
            });
        }

        let result = SearchResult::new(merged).dedup();
        let report = SearchReport { result, backends };

        info!(
            %mode,
            backends = report.backends.len(),
            failed = report.failures().count(),
            matches = report.result.len(),
            "search finished"
        );

        report
    }

    /// Look a record up by id on every backend.
    ///
    /// Returns the record from the highest-priority backend that knows the
    /// id, or `None` if none does or all fail.
    pub async fn get_person_by_id(&self, id: &str) -> Option<Person> {
        let id = id.trim();
        if id.is_empty() {
            return None;
        }

        let completed = self
            .fan_out("get_person_by_id", move |backend| {
                async move { backend.get_person_by_id(id).await }.boxed()
            })
            .await;

        completed.into_iter().find_map(|done| match done.outcome {
            Ok(Some(person)) => {
                debug!(backend = %done.backend, id, "record found");
                Some(person)
            }
            Ok(None) | Err(_) => None,
        })
    }

    /// Run `call` against every backend concurrently and collect the
    /// outcomes in backend priority order.
    async fn fan_out<'a, T, F>(&self, operation: &str, call: F) -> Vec<Completed<T>>
    where
        T: Send + 'a,
        F: Fn(Arc<dyn SearchBackend>) -> BoxFuture<'a, Result<T>>,
    {
        let timeout = self.backend_timeout;
        let mut pending: FuturesUnordered<_> = self
            .backends
            .iter()
            .enumerate()
            .map(|(index, backend)| {
                let backend_id = backend.id().clone();
                let call = call(Arc::clone(backend));
                async move {
                    let started = Instant::now();
                    let outcome = match tokio::time::timeout(timeout, call).await {
                        Ok(outcome) => outcome,
                        Err(_) => Err(SearchError::TimedOut {
                            backend: backend_id.clone(),
                            timeout,
                        }),
                    };
                    (
                        index,
                        Completed {
                            backend: backend_id,
                            elapsed: started.elapsed(),
                            outcome,
                        },
                    )
                }
            })
            .collect();

        let mut slots: Vec<Option<Completed<T>>> =
            std::iter::repeat_with(|| None).take(self.backends.len()).collect();

        while let Some((index, done)) = pending.next().await {
            match &done.outcome {
                Ok(_) => debug!(
                    backend = %done.backend,
                    operation,
                    elapsed_ms = u64::try_from(done.elapsed.as_millis()).unwrap_or(u64::MAX),
                    "backend answered"
                ),
                Err(e) => warn!(
                    backend = %done.backend,
                    operation,
                    error = %e,
                    retriable = e.is_retriable(),
                    "backend failed, contributing nothing"
                ),
            }
            slots[index] = Some(done);
        }

        slots.into_iter().flatten().collect()
    }
}
