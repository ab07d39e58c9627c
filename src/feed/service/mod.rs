//! Refresh pipeline and shared feed state.
//!
//! A refresh runs resolve, fetch, classify, decode, merge, persist, and
//! notify in sequence. Only one refresh may be outstanding at a time; the
//! in-flight flag is claimed before any work starts and released by a drop
//! guard once the observer has been told the outcome.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::github::error::FeedError;
use crate::github::gateway::{EventGateway, EventsResponse, FetchOutcome};
use crate::github::locator::{DiscoveryQuery, RepositoryIdentifier};
use crate::github::models::{Event, FetchMarker};
use crate::persistence::{FeedStore, PersistenceError};
use crate::telemetry::{NoopTelemetrySink, TelemetryEvent, TelemetrySink};

use super::merge::{DuplicatePolicy, merge_events};
use super::observer::{FeedObserver, NoopFeedObserver};

/// Default number of events requested per repository.
pub const DEFAULT_PAGE_SIZE: u8 = 5;

/// Default cache capacity.
pub const DEFAULT_MAX_CACHED_EVENTS: usize = 25;

/// Default bound on a single GitHub request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// What a refresh fetches events for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedTarget {
    /// One `owner/name` identifier, validated when the refresh runs.
    Repository(String),
    /// Repositories found by a language search.
    Discover(DiscoveryQuery),
}

/// Tunables for the refresh pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedOptions {
    /// Events requested per repository.
    pub page_size: u8,
    /// Cache capacity. Values below one are treated as one.
    pub max_cached_events: usize,
    /// Handling of incoming events whose id is already cached.
    pub duplicate_policy: DuplicatePolicy,
    /// Bound on each GitHub request.
    pub request_timeout: Duration,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_cached_events: DEFAULT_MAX_CACHED_EVENTS,
            duplicate_policy: DuplicatePolicy::KeepAll,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// What [`EventFeedService::initialize`] recovered from disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Events restored into the cache.
    pub events_loaded: usize,
    /// Whether a fetch marker was restored.
    pub marker_loaded: bool,
    /// Persistence failures that were replaced by empty state.
    pub degraded: Vec<PersistenceError>,
}

/// Outcome of a refresh that reached the observer's `events_updated`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    /// Repositories whose events were requested.
    pub candidates: usize,
    /// Events merged into the cache.
    pub new_events: usize,
    /// Candidates answered with "not modified".
    pub not_modified: usize,
    /// Items skipped because they did not decode.
    pub decode_failures: usize,
    /// Whether any response carried a fresh `Last-Modified` marker.
    pub marker_updated: bool,
    /// Candidates whose request failed, in request order.
    pub failures: Vec<(RepositoryIdentifier, FeedError)>,
    /// First failure to persist the marker or the cache.
    pub persistence_error: Option<PersistenceError>,
    /// The cache after the merge, newest first.
    pub snapshot: Vec<Event>,
}

impl RefreshReport {
    fn record_persistence_error(&mut self, error: PersistenceError) {
        if self.persistence_error.is_none() {
            self.persistence_error = Some(error);
        }
    }
}

#[derive(Debug, Default)]
struct FeedState {
    events: Vec<Event>,
    marker: Option<FetchMarker>,
}

struct Inner {
    gateway: Arc<dyn EventGateway>,
    store: FeedStore,
    observer: Arc<dyn FeedObserver>,
    telemetry: Arc<dyn TelemetrySink>,
    options: FeedOptions,
    state: Mutex<FeedState>,
    in_flight: AtomicBool,
}

/// Releases the in-flight flag when the refresh that claimed it ends,
/// including by panic.
struct InFlightGuard {
    inner: Arc<Inner>,
}

impl InFlightGuard {
    fn acquire(inner: &Arc<Inner>) -> Option<Self> {
        inner
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                inner: Arc::clone(inner),
            })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.inner.in_flight.store(false, Ordering::Release);
    }
}

/// Builder for [`EventFeedService`].
pub struct EventFeedServiceBuilder {
    gateway: Arc<dyn EventGateway>,
    store: FeedStore,
    observer: Arc<dyn FeedObserver>,
    telemetry: Arc<dyn TelemetrySink>,
    options: FeedOptions,
}

impl EventFeedServiceBuilder {
    /// Sets the observer notified after every refresh.
    #[must_use]
    pub fn observer(mut self, observer: Arc<dyn FeedObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Sets the telemetry sink.
    #[must_use]
    pub fn telemetry(mut self, telemetry: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Overrides the pipeline options.
    #[must_use]
    pub const fn options(mut self, options: FeedOptions) -> Self {
        self.options = options;
        self
    }

    /// Builds the service with an empty cache and no marker. Call
    /// [`EventFeedService::initialize`] to restore persisted state.
    #[must_use]
    pub fn build(self) -> EventFeedService {
        EventFeedService {
            inner: Arc::new(Inner {
                gateway: self.gateway,
                store: self.store,
                observer: self.observer,
                telemetry: self.telemetry,
                options: self.options,
                state: Mutex::new(FeedState::default()),
                in_flight: AtomicBool::new(false),
            }),
        }
    }
}

/// Owns the cached events and fetch marker for one feed.
///
/// Cloning is cheap; clones share the same state and in-flight flag.
///
/// # Examples
///
/// ```no_run
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// use std::sync::Arc;
///
/// use gitfeed::feed::{EventFeedService, FeedTarget};
/// use gitfeed::github::{ApiBase, OctocrabEventGateway};
/// use gitfeed::persistence::FeedStore;
///
/// let api_base = ApiBase::parse("https://api.github.com")?;
/// let gateway = OctocrabEventGateway::for_api_base(&api_base, None)?;
/// let store = FeedStore::new("/tmp/gitfeed")?;
/// let service = EventFeedService::builder(Arc::new(gateway), store).build();
///
/// service.initialize().await?;
/// let report = service
///     .refresh_now(FeedTarget::Repository("ReactiveX/RxSwift".to_owned()))
///     .await?;
/// println!("{} new events", report.new_events);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct EventFeedService {
    inner: Arc<Inner>,
}

impl EventFeedService {
    /// Starts building a service around a gateway and a store.
    #[must_use]
    pub fn builder(gateway: Arc<dyn EventGateway>, store: FeedStore) -> EventFeedServiceBuilder {
        EventFeedServiceBuilder {
            gateway,
            store,
            observer: Arc::new(NoopFeedObserver),
            telemetry: Arc::new(NoopTelemetrySink),
            options: FeedOptions::default(),
        }
    }

    /// Restores the cache and marker from the store.
    ///
    /// Missing files leave the corresponding state empty. Unreadable or
    /// corrupt files do the same and are listed in
    /// [`LoadSummary::degraded`].
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::RefreshInProgress`] when a refresh is running;
    /// restoring then would overwrite its merge.
    pub async fn initialize(&self) -> Result<LoadSummary, FeedError> {
        let guard = InFlightGuard::acquire(&self.inner).ok_or(FeedError::RefreshInProgress)?;
        let inner = &guard.inner;
        let mut summary = LoadSummary::default();

        let events = match inner.with_store(FeedStore::load_events).await {
            Ok(events) => events.unwrap_or_default(),
            Err(error) => {
                tracing::warn!("discarding cached events: {error}");
                summary.degraded.push(error);
                Vec::new()
            }
        };
        let marker = match inner.with_store(FeedStore::load_marker).await {
            Ok(marker) => marker,
            Err(error) => {
                tracing::warn!("discarding fetch marker: {error}");
                summary.degraded.push(error);
                None
            }
        };

        let mut state = inner.state.lock().await;
        state.events = events;
        state.events.truncate(inner.options.max_cached_events.max(1));
        state.marker = marker;

        summary.events_loaded = state.events.len();
        summary.marker_loaded = state.marker.is_some();
        drop(state);
        tracing::info!(
            events = summary.events_loaded,
            marker = summary.marker_loaded,
            directory = %inner.store.directory(),
            "feed state restored"
        );
        Ok(summary)
    }

    /// Starts a refresh on a background task.
    ///
    /// Returns `None` without notifying the observer when a refresh is
    /// already running. Must be called from within a Tokio runtime.
    #[must_use]
    pub fn refresh(
        &self,
        target: FeedTarget,
    ) -> Option<JoinHandle<Result<RefreshReport, FeedError>>> {
        let Some(guard) = InFlightGuard::acquire(&self.inner) else {
            tracing::debug!("refresh already in flight; ignoring trigger");
            return None;
        };

        Some(tokio::spawn(async move {
            let result = guard.inner.run(target).await;
            drop(guard);
            result
        }))
    }

    /// Runs a refresh on the caller's task.
    ///
    /// The observer is notified exactly as for [`Self::refresh`].
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::RefreshInProgress`] when another refresh is
    /// running, or the error that failed the refresh as a whole.
    pub async fn refresh_now(&self, target: FeedTarget) -> Result<RefreshReport, FeedError> {
        let guard = InFlightGuard::acquire(&self.inner).ok_or(FeedError::RefreshInProgress)?;
        let result = guard.inner.run(target).await;
        drop(guard);
        result
    }

    /// Returns a copy of the cached events, newest first.
    pub async fn current_events(&self) -> Vec<Event> {
        self.inner.state.lock().await.events.clone()
    }

    /// Returns the current fetch marker.
    pub async fn current_marker(&self) -> Option<FetchMarker> {
        self.inner.state.lock().await.marker.clone()
    }

    /// Whether a refresh is currently running.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.inner.in_flight.load(Ordering::Acquire)
    }
}

impl Inner {
    async fn run(&self, target: FeedTarget) -> Result<RefreshReport, FeedError> {
        let result = self.execute(target).await;
        match &result {
            Ok(report) => {
                tracing::info!(
                    candidates = report.candidates,
                    new_events = report.new_events,
                    not_modified = report.not_modified,
                    cached = report.snapshot.len(),
                    "refresh completed"
                );
                self.observer.events_updated(&report.snapshot, report);
                self.telemetry.record(TelemetryEvent::RefreshCompleted {
                    candidates: report.candidates,
                    new_events: report.new_events,
                    not_modified: report.not_modified,
                    cached_events: report.snapshot.len(),
                    failed_candidates: report.failures.len(),
                });
            }
            Err(error) => {
                tracing::warn!("refresh failed: {error}");
                self.observer.refresh_failed(error);
                self.telemetry.record(TelemetryEvent::RefreshFailed {
                    message: error.to_string(),
                    retry_after_seconds: retry_after_seconds(error),
                });
            }
        }
        result
    }

    async fn execute(&self, target: FeedTarget) -> Result<RefreshReport, FeedError> {
        let candidates = self.resolve_candidates(target).await?;
        let mut report = RefreshReport {
            candidates: candidates.len(),
            ..RefreshReport::default()
        };

        let mut incoming: Vec<Event> = Vec::new();
        let mut modified = false;
        let mut succeeded = 0_usize;

        for repository in candidates {
            let marker = self.state.lock().await.marker.clone();
            let response = match self.fetch_events(&repository, marker).await {
                Ok(response) => response,
                Err(error) => {
                    tracing::warn!(%repository, "event fetch failed: {error}");
                    report.failures.push((repository, error));
                    continue;
                }
            };
            succeeded += 1;
            modified |= self
                .absorb_response(&repository, response, &mut report, &mut incoming)
                .await;
        }

        if succeeded == 0 && !report.failures.is_empty() {
            let (_, error) = report.failures.swap_remove(0);
            return Err(error);
        }

        if !modified {
            report.snapshot = self.state.lock().await.events.clone();
            return Ok(report);
        }

        let snapshot = {
            let mut state = self.state.lock().await;
            let merged = merge_events(
                &state.events,
                incoming,
                self.options.max_cached_events,
                self.options.duplicate_policy,
            );
            if merged.skipped_duplicates > 0 {
                tracing::debug!(skipped = merged.skipped_duplicates, "skipped duplicate events");
            }
            report.new_events = merged.inserted;
            state.events = merged.events;
            state.events.clone()
        };

        let to_save = snapshot.clone();
        if let Err(error) = self
            .with_store(move |store| store.save_events(&to_save))
            .await
        {
            tracing::warn!("cache not persisted: {error}");
            report.record_persistence_error(error);
        }
        report.snapshot = snapshot;
        Ok(report)
    }

    /// Applies one successful response: adopts its marker and collects its
    /// events. Returns whether the body carried an events list.
    async fn absorb_response(
        &self,
        repository: &RepositoryIdentifier,
        response: EventsResponse,
        report: &mut RefreshReport,
        incoming: &mut Vec<Event>,
    ) -> bool {
        if let Some(rate_limit) = response.rate_limit {
            tracing::debug!(
                %repository,
                limit = rate_limit.limit(),
                remaining = rate_limit.remaining(),
                "rate limit after events request"
            );
        }
        if let Some(fresh) = response.marker {
            report.marker_updated = true;
            self.adopt_marker(repository, fresh, report).await;
        }

        match response.outcome {
            FetchOutcome::Modified(decoded) => {
                if decoded.failures > 0 {
                    tracing::warn!(
                        %repository,
                        skipped = decoded.failures,
                        "skipped events that did not decode"
                    );
                }
                report.decode_failures += decoded.failures;
                incoming.extend(decoded.events);
                true
            }
            FetchOutcome::NotModified => {
                report.not_modified += 1;
                false
            }
        }
    }

    async fn resolve_candidates(
        &self,
        target: FeedTarget,
    ) -> Result<Vec<RepositoryIdentifier>, FeedError> {
        match target {
            FeedTarget::Repository(identifier) => {
                RepositoryIdentifier::parse(&identifier).map(|repository| vec![repository])
            }
            FeedTarget::Discover(query) => {
                let repositories = self
                    .bounded("repository search", self.gateway.discover_repositories(&query))
                    .await?;
                tracing::debug!(
                    language = query.language(),
                    found = repositories.len(),
                    "resolved discovery candidates"
                );
                Ok(repositories)
            }
        }
    }

    async fn fetch_events(
        &self,
        repository: &RepositoryIdentifier,
        marker: Option<FetchMarker>,
    ) -> Result<EventsResponse, FeedError> {
        self.bounded(
            "repository events",
            self.gateway
                .repository_events(repository, self.options.page_size, marker),
        )
        .await
    }

    async fn adopt_marker(
        &self,
        repository: &RepositoryIdentifier,
        marker: FetchMarker,
        report: &mut RefreshReport,
    ) {
        let to_save = marker.clone();
        let persisted = match self
            .with_store(move |store| store.save_marker(&to_save))
            .await
        {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!("fetch marker not persisted: {error}");
                report.record_persistence_error(error);
                false
            }
        };
        self.state.lock().await.marker = Some(marker);
        self.telemetry.record(TelemetryEvent::MarkerAdopted {
            repository: repository.to_string(),
            persisted,
        });
    }

    /// Runs a store operation on the blocking pool.
    async fn with_store<T, F>(&self, operation: F) -> Result<T, PersistenceError>
    where
        F: FnOnce(&FeedStore) -> Result<T, PersistenceError> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || operation(&store))
            .await
            .map_err(|error| PersistenceError::TaskFailed {
                message: error.to_string(),
            })?
    }

    async fn bounded<T>(
        &self,
        operation: &str,
        request: impl Future<Output = Result<T, FeedError>>,
    ) -> Result<T, FeedError> {
        let limit = self.options.request_timeout;
        tokio::time::timeout(limit, request)
            .await
            .map_err(|_| FeedError::Network {
                message: format!("{operation} timed out after {}s", limit.as_secs()),
            })?
    }
}

/// Seconds to wait before GitHub accepts requests again, when `error` is an
/// exhausted rate limit that reported its reset time.
fn retry_after_seconds(error: &FeedError) -> Option<u64> {
    let FeedError::RateLimitExceeded {
        rate_limit: Some(rate_limit),
        ..
    } = error
    else {
        return None;
    };
    let wait = rate_limit.seconds_until_reset();
    tracing::warn!(
        limit = rate_limit.limit(),
        reset_at = rate_limit.reset_at(),
        retry_after = wait,
        "GitHub rate limit exhausted"
    );
    Some(wait)
}
