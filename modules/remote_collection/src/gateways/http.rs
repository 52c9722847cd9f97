//! REST implementation of [`PageTransport`].
//!
//! `GET {base}/{endpoint}?page&pageSize&sortField&sortDirection&searchField&searchValue[&cursor]`
//! with the session's bearer token. Failures are classified here and nowhere else.

use async_trait::async_trait;
use console_kit::{describe_error_body, Session, TracedClient};
use paging_core::{Page, PageEnvelope, PageRequest};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::contract::{error::FetchError, transport::PageTransport};

#[derive(Clone)]
pub struct HttpPageTransport {
    client: TracedClient,
    session: Session,
}

impl HttpPageTransport {
    pub fn new(client: TracedClient, session: Session) -> Self {
        Self { client, session }
    }

    /// Client built from `api.timeout_sec` / `api.user_agent`.
    pub fn from_config(api: &runtime::ApiConfig, session: Session) -> Result<Self, FetchError> {
        let client = TracedClient::build(api.timeout(), api.user_agent.as_deref())
            .map_err(|e| FetchError::Invalid {
                message: format!("cannot build HTTP client: {e}"),
            })?;
        Ok(Self::new(client, session))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}

/// Map a non-success status to the fetch error taxonomy.
pub fn classify_status(status: StatusCode, detail: String) -> FetchError {
    let code = status.as_u16();
    match status {
        StatusCode::UNAUTHORIZED => FetchError::Auth {
            status: code,
            detail,
        },
        StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => FetchError::Transient {
            status: Some(code),
            message: detail,
        },
        s if s.is_server_error() => FetchError::Transient {
            status: Some(code),
            message: detail,
        },
        _ => FetchError::Terminal {
            status: code,
            detail,
        },
    }
}

fn classify_transport_error(e: reqwest::Error) -> FetchError {
    if e.is_builder() {
        return FetchError::Invalid {
            message: e.to_string(),
        };
    }
    if e.is_decode() {
        return FetchError::decode(e.to_string());
    }
    FetchError::Transient {
        status: e.status().map(|s| s.as_u16()),
        message: e.to_string(),
    }
}

#[async_trait]
impl<T> PageTransport<T> for HttpPageTransport
where
    T: DeserializeOwned + Send + 'static,
{
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page<T>, FetchError> {
        let url = self.session.resolve(request.endpoint())?;
        let query = request.query_pairs();

        let response = self
            .client
            .get_with_session(&self.session, url, &query)
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(classify_transport_error)?;

        if !status.is_success() {
            return Err(classify_status(status, describe_error_body(&body)));
        }

        let envelope: PageEnvelope<T> =
            serde_json::from_slice(&body).map_err(|e| FetchError::decode(e.to_string()))?;
        Ok(envelope.into_page(request.page, request.page_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED, "expired".into()),
            FetchError::Auth { status: 401, .. }
        ));
        assert!(classify_status(StatusCode::FORBIDDEN, "no".into()).is_access_denied());
        assert!(matches!(
            classify_status(StatusCode::NOT_FOUND, "gone".into()),
            FetchError::Terminal { status: 404, .. }
        ));
        assert!(classify_status(StatusCode::BAD_GATEWAY, "x".into()).is_retryable());
        assert!(classify_status(StatusCode::TOO_MANY_REQUESTS, "x".into()).is_retryable());
        assert!(classify_status(StatusCode::REQUEST_TIMEOUT, "x".into()).is_retryable());
        assert!(!classify_status(StatusCode::UNPROCESSABLE_ENTITY, "x".into()).is_retryable());
    }
}
