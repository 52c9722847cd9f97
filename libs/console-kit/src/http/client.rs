//! Traced HTTP client used by every console transport.
//!
//! Wraps `reqwest::Client`: each request gets an `outgoing_http` span, a
//! `traceparent` header and, when the session carries one, a bearer token.

use std::time::Duration;

use tracing::{field, Instrument, Level};

use crate::http::problem::APPLICATION_PROBLEM_JSON;
use crate::http::trace;
use crate::session::Session;

#[derive(Clone)]
pub struct TracedClient {
    inner: reqwest::Client,
}

impl TracedClient {
    /// Create a new TracedClient wrapping the provided reqwest::Client
    pub fn new(inner: reqwest::Client) -> Self {
        Self { inner }
    }

    /// Build a client with an optional request timeout and user agent.
    pub fn build(timeout: Option<Duration>, user_agent: Option<&str>) -> reqwest::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        if let Some(ua) = user_agent {
            builder = builder.user_agent(ua.to_string());
        }
        Ok(Self::new(builder.build()?))
    }

    /// Execute a built request inside an `outgoing_http` span.
    pub async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        let span = tracing::span!(
            Level::INFO, "outgoing_http",
            http.method = %req.method(),
            http.url = %req.url(),
            http.status_code = field::Empty,
            trace_id = field::Empty,
            otel.kind = "client",
        );

        if let Some(trace_id) = trace::inject_trace_context(req.headers_mut()) {
            span.record("trace_id", trace_id.as_str());
        }

        let response = self.inner.execute(req).instrument(span.clone()).await?;

        let status = response.status();
        span.record("http.status_code", status.as_u16());
        if status.is_client_error() || status.is_server_error() {
            tracing::debug!(parent: &span, %status, "request returned error status");
        }

        Ok(response)
    }

    /// GET `url` with query pairs, authenticated with the session token if any.
    pub async fn get_with_session(
        &self,
        session: &Session,
        url: url::Url,
        query: &[(&str, String)],
    ) -> reqwest::Result<reqwest::Response> {
        let mut builder = self
            .inner
            .get(url)
            .query(query)
            .header(
                reqwest::header::ACCEPT,
                format!("application/json, {APPLICATION_PROBLEM_JSON}"),
            );
        if let Some(token) = session.bearer_token() {
            builder = builder.bearer_auth(token);
        }
        self.execute(builder.build()?).await
    }

    /// Convenience method for GET requests
    pub async fn get(&self, url: &str) -> reqwest::Result<reqwest::Response> {
        let req = self.inner.get(url).build()?;
        self.execute(req).await
    }

    /// Get a reference to the underlying reqwest::Client for advanced usage
    pub fn inner(&self) -> &reqwest::Client {
        &self.inner
    }
}

impl From<reqwest::Client> for TracedClient {
    fn from(c: reqwest::Client) -> Self {
        Self::new(c)
    }
}

impl Default for TracedClient {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}
