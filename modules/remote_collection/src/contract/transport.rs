use async_trait::async_trait;
use paging_core::{Page, PageRequest};

use crate::contract::error::FetchError;

/// Collaborator that performs one page request.
///
/// Implementations own transport concerns (URL building, auth headers,
/// timeouts) and classify failures into [`FetchError`].
#[async_trait]
pub trait PageTransport<T>: Send + Sync {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page<T>, FetchError>;
}
