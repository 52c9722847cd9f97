use std::fmt::Debug;
use std::hash::Hash;

use paging_core::{QueryKey, SortDir};

use crate::contract::error::FetchError;

/// Minimal row shape of every console list: a stable identity.
pub trait Identified {
    type Id: Eq + Hash + Clone + Debug + Send + Sync;

    fn id(&self) -> Self::Id;
}

/// Lifecycle of one list page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Nothing loaded for the current query yet.
    Idle,
    /// A request for `page` of the current query is in flight.
    Fetching { page: u32 },
    /// At least one page loaded and more are available.
    Ready,
    /// The last page reported no continuation.
    Exhausted,
}

/// Result of a `fetch_next_page` call that did not fail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    Appended {
        page: u32,
        count: usize,
        has_next_page: bool,
    },
    /// A fetch for the current query is already running.
    AlreadyFetching,
    /// No more pages for the current query.
    Exhausted,
    /// The query changed while the request was in flight; the result was dropped.
    Superseded,
}

/// Snapshot handed to the presentation layer.
#[derive(Clone, Debug)]
pub struct CollectionView<T> {
    pub items: Vec<T>,
    pub phase: Phase,
    pub is_fetching: bool,
    pub is_error: bool,
    pub error: Option<FetchError>,
    pub has_next_page: bool,
    pub sort_field: Option<String>,
    pub sort_direction: SortDir,
    pub search_field: Option<String>,
    pub search_value: String,
    pub query_key: QueryKey,
}
