use std::sync::Arc;

use paging_core::{validate_page_size, Page, PageRequest, QueryKey};
use tracing::Instrument;

use crate::contract::{error::FetchError, transport::PageTransport};

/// Issues one transport request per page of a query.
///
/// Errors are returned exactly as the transport produced them.
pub struct PageFetcher<T> {
    transport: Arc<dyn PageTransport<T>>,
    page_size: u32,
}

impl<T> Clone for PageFetcher<T> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            page_size: self.page_size,
        }
    }
}

impl<T: Send + 'static> PageFetcher<T> {
    pub fn new(transport: Arc<dyn PageTransport<T>>, page_size: u32) -> Result<Self, paging_core::Error> {
        validate_page_size(page_size)?;
        Ok(Self {
            transport,
            page_size,
        })
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn request_for(
        &self,
        key: &QueryKey,
        page: u32,
        cursor: Option<String>,
    ) -> Result<PageRequest, paging_core::Error> {
        Ok(PageRequest::new(key.clone(), page, self.page_size)?.with_cursor(cursor))
    }

    pub async fn fetch(&self, request: &PageRequest) -> Result<Page<T>, FetchError> {
        let span = tracing::debug_span!(
            "fetch_page",
            endpoint = %request.endpoint(),
            page = request.page,
            page_size = request.page_size,
            key = %request.key.fingerprint(),
        );

        async {
            tracing::debug!("requesting page");
            let result = self.transport.fetch_page(request).await;
            match &result {
                Ok(page) => tracing::debug!(
                    items = page.len(),
                    has_next_page = page.has_next_page(),
                    "page received"
                ),
                Err(e) => tracing::debug!(error = %e, "page request failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use paging_core::SortSpec;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<PageRequest>>,
    }

    #[async_trait]
    impl PageTransport<u32> for Recorder {
        async fn fetch_page(&self, request: &PageRequest) -> Result<Page<u32>, FetchError> {
            self.seen.lock().push(request.clone());
            if request.page > 1 {
                return Err(FetchError::terminal(403, "denied"));
            }
            Ok(Page::with_continuation(vec![1, 2], request.page, request.page_size, true))
        }
    }

    #[test]
    fn rejects_zero_page_size() {
        let t: Arc<dyn PageTransport<u32>> = Arc::new(Recorder::default());
        assert!(PageFetcher::new(t, 0).is_err());
    }

    #[tokio::test]
    async fn builds_requests_and_propagates_errors_untouched() {
        let recorder = Arc::new(Recorder::default());
        let fetcher = PageFetcher::new(recorder.clone() as Arc<dyn PageTransport<u32>>, 25).unwrap();
        let key = QueryKey::new("/groups").with_sort(Some(SortSpec::asc("name")));

        let first = fetcher.request_for(&key, 1, None).unwrap();
        let page = fetcher.fetch(&first).await.unwrap();
        assert_eq!(page.items, vec![1, 2]);

        let second = fetcher.request_for(&key, 2, Some("c2".into())).unwrap();
        let err = fetcher.fetch(&second).await.unwrap_err();
        assert_eq!(err, FetchError::terminal(403, "denied"));

        let seen = recorder.seen.lock();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].page_size, 25);
        assert_eq!(seen[1].cursor.as_deref(), Some("c2"));
        assert_eq!(seen[1].key, key);
    }
}
