//! One list page's paginated remote collection.
//!
//! State lives behind a `parking_lot::Mutex` that is never held across an
//! `.await`. Every fetch carries the generation it was started under; a reset
//! bumps the generation, so late responses of an older query are dropped
//! without touching the current state. Reset also cancels the older request
//! through its `CancellationToken`.

use std::sync::Arc;

use paging_core::{QueryKey, FIRST_PAGE};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::contract::{
    error::FetchError,
    model::{CollectionView, FetchOutcome, Identified, Phase},
    transport::PageTransport,
};
use crate::domain::{accumulator::Accumulator, fetcher::PageFetcher, sort_search::SortSearchState};

struct Inner<T: Identified> {
    filters: SortSearchState,
    key: QueryKey,
    acc: Accumulator<T>,
    phase: Phase,
    error: Option<FetchError>,
    generation: u64,
    cancel: CancellationToken,
}

/// What a fetch captured when it started.
struct Ticket {
    generation: u64,
    page: u32,
    token: CancellationToken,
}

/// Puts the phase back when a fetch future is dropped before its result is applied.
struct InFlight<'a, T>
where
    T: Identified + Send + 'static,
{
    owner: &'a RemoteCollection<T>,
    generation: u64,
    armed: bool,
}

impl<T> InFlight<'_, T>
where
    T: Identified + Send + 'static,
{
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl<T> Drop for InFlight<'_, T>
where
    T: Identified + Send + 'static,
{
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let restored = {
            let mut inner = self.owner.inner.lock();
            if inner.generation == self.generation && matches!(inner.phase, Phase::Fetching { .. }) {
                inner.phase = settled_phase(&inner.acc);
                true
            } else {
                false
            }
        };
        if restored {
            tracing::debug!(
                endpoint = %self.owner.endpoint,
                generation = self.generation,
                "fetch dropped before completion"
            );
            self.owner.notify();
        }
    }
}

/// Phase of a collection with no request in flight and no fresh result.
fn settled_phase<T: Identified>(acc: &Accumulator<T>) -> Phase {
    if acc.pages_loaded() == 0 {
        Phase::Idle
    } else {
        Phase::Ready
    }
}

pub struct RemoteCollection<T: Identified> {
    endpoint: String,
    fetcher: PageFetcher<T>,
    inner: Mutex<Inner<T>>,
    revision: watch::Sender<u64>,
}

impl<T> RemoteCollection<T>
where
    T: Identified + Send + 'static,
{
    pub fn new(
        transport: Arc<dyn PageTransport<T>>,
        endpoint: impl Into<String>,
        page_size: u32,
    ) -> Result<Self, paging_core::Error> {
        let endpoint = endpoint.into();
        if endpoint.trim().is_empty() {
            return Err(paging_core::Error::EmptyEndpoint);
        }
        let fetcher = PageFetcher::new(transport, page_size)?;
        let filters = SortSearchState::new();
        let key = filters.key(&endpoint);
        let (revision, _) = watch::channel(0);

        Ok(Self {
            endpoint,
            fetcher,
            inner: Mutex::new(Inner {
                filters,
                key,
                acc: Accumulator::new(),
                phase: Phase::Idle,
                error: None,
                generation: 0,
                cancel: CancellationToken::new(),
            }),
            revision,
        })
    }

    /// Page size taken from `api.page_sizes` / `api.default_page_size`.
    pub fn from_config(
        transport: Arc<dyn PageTransport<T>>,
        endpoint: impl Into<String>,
        api: &runtime::ApiConfig,
    ) -> Result<Self, paging_core::Error> {
        let endpoint = endpoint.into();
        let page_size = api.page_size_for(&endpoint);
        Self::new(transport, endpoint, page_size)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn page_size(&self) -> u32 {
        self.fetcher.page_size()
    }

    /// Receiver bumped on every state change, for re-rendering.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn notify(&self) {
        self.revision.send_modify(|r| *r += 1);
    }

    /// Fetch the page at the accumulator's page index for the current query.
    pub async fn fetch_next_page(&self) -> Result<FetchOutcome, FetchError> {
        let (ticket, request) = {
            let mut inner = self.inner.lock();
            if let Phase::Fetching { .. } = inner.phase {
                return Ok(FetchOutcome::AlreadyFetching);
            }
            if !inner.acc.has_next_page() {
                return Ok(FetchOutcome::Exhausted);
            }
            let page = inner.acc.next_page();
            let cursor = inner.acc.next_cursor().map(str::to_string);
            let request = self.fetcher.request_for(&inner.key, page, cursor)?;

            inner.phase = Phase::Fetching { page };
            inner.error = None;
            let ticket = Ticket {
                generation: inner.generation,
                page,
                token: inner.cancel.clone(),
            };
            (ticket, request)
        };
        self.notify();

        let mut guard = InFlight {
            owner: self,
            generation: ticket.generation,
            armed: true,
        };

        let result = tokio::select! {
            biased;
            _ = ticket.token.cancelled() => None,
            r = self.fetcher.fetch(&request) => Some(r),
        };

        guard.disarm();
        let outcome = {
            let mut inner = self.inner.lock();
            if inner.generation != ticket.generation {
                match &result {
                    Some(Err(e)) => tracing::warn!(
                        endpoint = %self.endpoint,
                        page = ticket.page,
                        error = %e,
                        "dropping failure of superseded query"
                    ),
                    _ => tracing::debug!(
                        endpoint = %self.endpoint,
                        page = ticket.page,
                        "dropping response of superseded query"
                    ),
                }
                return Ok(FetchOutcome::Superseded);
            }

            match result {
                // Cancellation only happens together with a generation bump.
                None => return Ok(FetchOutcome::Superseded),
                Some(Ok(page)) => {
                    let count = inner.acc.append_page(page);
                    let has_next_page = inner.acc.has_next_page();
                    inner.phase = if has_next_page {
                        Phase::Ready
                    } else {
                        Phase::Exhausted
                    };
                    Ok(FetchOutcome::Appended {
                        page: ticket.page,
                        count,
                        has_next_page,
                    })
                }
                Some(Err(e)) => {
                    inner.phase = settled_phase(&inner.acc);
                    inner.error = Some(e.clone());
                    Err(e)
                }
            }
        };
        self.notify();
        outcome
    }

    /// Sort by `field`: same field toggles direction, a new one starts ascending.
    /// Always resets.
    pub fn set_sort(&self, field: &str) -> Result<(), paging_core::Error> {
        {
            let mut inner = self.inner.lock();
            inner.filters.set_sort(field)?;
            self.reset_locked(&mut inner, "sort");
        }
        self.notify();
        Ok(())
    }

    /// Returns whether a reset happened.
    pub fn clear_sort(&self) -> bool {
        self.mutate_filters("sort", |f| f.clear_sort())
    }

    /// Replace the search field and value. Resets only when the filter changed;
    /// returns whether it did.
    pub fn set_search(&self, field: &str, value: &str) -> bool {
        self.mutate_filters("search", |f| f.set_search(field, value))
    }

    pub fn clear_search(&self) -> bool {
        self.mutate_filters("search", |f| f.clear_search())
    }

    /// Sort and immediately load the first page of the new order.
    pub async fn sort_by(&self, field: &str) -> Result<FetchOutcome, FetchError> {
        self.set_sort(field)?;
        self.fetch_next_page().await
    }

    /// Search and load the first page when the filter changed.
    pub async fn search_by(&self, field: &str, value: &str) -> Result<Option<FetchOutcome>, FetchError> {
        if !self.set_search(field, value) {
            return Ok(None);
        }
        self.fetch_next_page().await.map(Some)
    }

    /// Discard loaded pages of the current query and load page 1 again.
    pub async fn refetch(&self) -> Result<FetchOutcome, FetchError> {
        {
            let mut inner = self.inner.lock();
            self.reset_locked(&mut inner, "refetch");
        }
        self.notify();
        self.fetch_next_page().await
    }

    fn mutate_filters(&self, reason: &str, f: impl FnOnce(&mut SortSearchState) -> bool) -> bool {
        let changed = {
            let mut inner = self.inner.lock();
            let before = inner.key.clone();
            f(&mut inner.filters);
            let changed = inner.filters.key(&self.endpoint) != before;
            if changed {
                self.reset_locked(&mut inner, reason);
            }
            changed
        };
        if changed {
            self.notify();
        }
        changed
    }

    fn reset_locked(&self, inner: &mut Inner<T>, reason: &str) {
        inner.generation += 1;
        inner.cancel.cancel();
        inner.cancel = CancellationToken::new();
        inner.key = inner.filters.key(&self.endpoint);
        inner.acc.reset();
        inner.error = None;
        inner.phase = Phase::Idle;
        tracing::info!(
            endpoint = %self.endpoint,
            reason,
            generation = inner.generation,
            key = %inner.key.fingerprint(),
            "collection reset"
        );
    }

    pub fn query_key(&self) -> QueryKey {
        self.inner.lock().key.clone()
    }

    pub fn phase(&self) -> Phase {
        self.inner.lock().phase
    }

    /// Number of resets so far.
    pub fn generation(&self) -> u64 {
        self.inner.lock().generation
    }

    pub fn len(&self) -> usize {
        self.inner.lock().acc.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().acc.is_empty()
    }

    /// Index of the page the next `fetch_next_page` will request.
    pub fn next_page(&self) -> u32 {
        self.inner.lock().acc.next_page()
    }

    pub fn has_next_page(&self) -> bool {
        self.inner.lock().acc.has_next_page()
    }

    pub fn is_fetching(&self) -> bool {
        matches!(self.inner.lock().phase, Phase::Fetching { .. })
    }

    pub fn error(&self) -> Option<FetchError> {
        self.inner.lock().error.clone()
    }

    /// True when nothing has been requested since the last reset.
    pub fn is_pristine(&self) -> bool {
        let inner = self.inner.lock();
        inner.phase == Phase::Idle && inner.acc.next_page() == FIRST_PAGE && inner.error.is_none()
    }
}

impl<T> RemoteCollection<T>
where
    T: Identified + Clone + Send + 'static,
{
    pub fn items(&self) -> Vec<T> {
        self.inner.lock().acc.items().to_vec()
    }

    pub fn view(&self) -> CollectionView<T> {
        let inner = self.inner.lock();
        CollectionView {
            items: inner.acc.items().to_vec(),
            phase: inner.phase,
            is_fetching: matches!(inner.phase, Phase::Fetching { .. }),
            is_error: inner.error.is_some(),
            error: inner.error.clone(),
            has_next_page: inner.acc.has_next_page(),
            sort_field: inner.filters.sort_field().map(str::to_string),
            sort_direction: inner.filters.sort_direction(),
            search_field: inner.filters.search_field().map(str::to_string),
            search_value: inner.filters.search_value().to_string(),
            query_key: inner.key.clone(),
        }
    }
}
