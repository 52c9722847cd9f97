//! Paginated remote collection behind every console list page.
//!
//! A [`RemoteCollection`] combines a single-column sort, a single-field
//! search and an infinite-scroll accumulator over a [`PageTransport`].
//! The transport is injected; [`HttpPageTransport`] is the REST one.
//!
//! ```rust,ignore
//! let session = Session::new(&config.api.base_url)?.with_bearer_token(token);
//! let transport = Arc::new(HttpPageTransport::from_config(&config.api, session)?);
//! let students = RemoteCollection::<Student>::from_config(transport, "/students", &config.api)?;
//!
//! students.fetch_next_page().await?;
//! students.search_by("lastName", "Ivanov").await?;
//! let view = students.view();
//! ```

pub mod contract;
pub mod domain;
pub mod gateways;

pub use contract::{
    error::FetchError,
    model::{CollectionView, FetchOutcome, Identified, Phase},
    transport::PageTransport,
};
pub use domain::{
    accumulator::Accumulator, collection::RemoteCollection, fetcher::PageFetcher,
    sort_search::SortSearchState,
};
pub use gateways::http::HttpPageTransport;
pub use paging_core::{Page, PageInfo, PageRequest, QueryKey, SearchSpec, SortDir, SortSpec};
